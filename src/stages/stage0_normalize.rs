use tracing::debug;

use crate::models::{Line, Record};

/// Result of Stage 0 normalization
#[derive(Debug, Default)]
pub struct NormalizationResult {
    /// Records normalized
    pub records: usize,
    /// Non-empty lines produced across all records
    pub lines: usize,
}

/// Perform Stage 0: split every record's text into lines of word tokens
pub fn normalize(records: &mut [Record]) -> NormalizationResult {
    let mut result = NormalizationResult::default();

    for record in records.iter_mut() {
        normalize_record(record);
        result.records += 1;
        result.lines += record.lines.len();
    }

    debug!(
        "Stage 0: {} records normalized into {} lines",
        result.records, result.lines
    );

    result
}

/// Replace a record's raw text with its non-empty lines and reset its hits
pub fn normalize_record(record: &mut Record) {
    let text = std::mem::take(&mut record.text);
    record.lines = text
        .split('\n')
        .map(Line::from_text)
        .filter(|line| !line.is_empty())
        .collect();
    record.hits.clear();
}
