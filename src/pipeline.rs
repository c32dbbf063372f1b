use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::heuristics::PatternMatcher;
use crate::io::read_records_file;
use crate::models::{Mode, Record};
use crate::ner::EntityRecognizer;
use crate::stages::{
    execute_stage1, execute_stage2, normalize, NormalizationResult, Stage1Result, Stage2Config,
    Stage2Result,
};

/// Counts gathered while scanning one batch of records
#[derive(Debug, Default)]
pub struct ScanSummary {
    pub normalization: NormalizationResult,
    pub matching: Stage1Result,
    /// `None` when entity detection was skipped
    pub entities: Option<Stage2Result>,
}

impl ScanSummary {
    pub fn total_hits(&self) -> usize {
        self.matching.hits + self.entities.as_ref().map_or(0, |e| e.hits)
    }
}

/// Read every input file of one mode into a single batch
pub fn load_records(inputs: &[PathBuf], mode: Mode) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for path in inputs {
        records.extend(read_records_file(path, mode)?);
    }
    info!("Loaded {} records from {} files", records.len(), inputs.len());
    Ok(records)
}

/// Run stages 0 to 2 over a batch of records
///
/// Matcher hits are appended before entity hits. Entity detection is skipped
/// when no recognizer is given.
pub async fn scan_records<R: EntityRecognizer>(
    records: &mut [Record],
    matcher: &PatternMatcher,
    recognizer: Option<&R>,
    stage2_config: &Stage2Config,
) -> Result<ScanSummary> {
    info!("Stage 0: Normalizing {} records...", records.len());
    let normalization = normalize(records);

    info!("Stage 1: Matching {} terms and patterns...", matcher.term_count());
    let matching = execute_stage1(records, matcher);

    let entities = match recognizer {
        Some(recognizer) => {
            info!("Stage 2: Detecting proper nouns...");
            Some(execute_stage2(records, recognizer, stage2_config).await?)
        }
        None => {
            info!("Skipping proper noun detection (no recognizer)");
            None
        }
    };

    Ok(ScanSummary {
        normalization,
        matching,
        entities,
    })
}
