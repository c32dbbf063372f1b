pub mod stage0_normalize;
pub mod stage1_match;
pub mod stage2_reconcile;
pub mod stage3_render;

pub use stage0_normalize::*;
pub use stage1_match::*;
pub use stage2_reconcile::*;
pub use stage3_render::*;
