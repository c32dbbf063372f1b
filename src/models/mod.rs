pub mod entity;
pub mod hit;
pub mod record;
pub mod transcript;

pub use entity::*;
pub use hit::*;
pub use record::*;
pub use transcript::*;
