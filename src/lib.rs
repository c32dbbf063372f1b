pub mod heuristics;
pub mod io;
pub mod models;
pub mod ner;
pub mod pipeline;
pub mod stages;

pub use heuristics::{attribute_speaker, MatcherConfig, PatternMatcher};
pub use io::{
    read_records_file, read_terms_file, write_export_file, HitReport, HitSummary, InputError,
    Roster,
};
pub use models::{Hit, HitKind, Mode, RecognizedEntity, Record, Source, Speaker, TranscriptDocument};
pub use ner::{
    AnthropicConfig, AnthropicRecognizer, EntityRecognizer, HttpNerConfig, HttpRecognizer,
    Recognizer,
};
pub use pipeline::{load_records, scan_records, ScanSummary};
pub use stages::{
    execute_stage1, execute_stage2, execute_stage3, normalize, Stage2Config, Stage3Config,
};
