use std::time::Instant;

use tracing::{debug, info};

use crate::heuristics::{attribute_speaker, PatternMatcher};
use crate::models::{HitKind, Record};

/// Result of Stage 1 matching
#[derive(Debug, Default)]
pub struct Stage1Result {
    /// Lines the matcher looked at
    pub lines_scanned: usize,
    /// Lines skipped as system messages or the chat footer
    pub lines_ignored: usize,
    /// Hits appended across all records
    pub hits: usize,
}

/// Execute Stage 1: term and pattern matching over every line of every record
pub fn execute_stage1(records: &mut [Record], matcher: &PatternMatcher) -> Stage1Result {
    let start = Instant::now();
    let mut result = Stage1Result::default();

    for record in records.iter_mut() {
        for line_index in 0..record.lines.len() {
            if record.lines[line_index].len() < 2 {
                continue;
            }
            match match_line(record, line_index, matcher) {
                Some(hits) => {
                    result.lines_scanned += 1;
                    result.hits += hits;
                }
                None => result.lines_ignored += 1,
            }
        }
    }

    info!(
        "Querying took {:.3} seconds ({} lines, {} hits)",
        start.elapsed().as_secs_f64(),
        result.lines_scanned,
        result.hits
    );

    result
}

/// Match one line and append its hits to the record
///
/// Returns `None` when the line is a system message or the chat footer,
/// otherwise the number of hits appended.
pub fn match_line(record: &mut Record, line_index: usize, matcher: &PatternMatcher) -> Option<usize> {
    let line = record.lines.get(line_index)?;
    let full_line = line.render();
    let content = line.render_from(record.mode().metadata_tokens());

    if matcher.is_ignored(&full_line, &content) {
        debug!("Record {} line {}: ignored", record.id, line_index);
        return None;
    }

    let matches = matcher.find(&content);
    if matches.is_empty() {
        return Some(0);
    }

    let speaker = attribute_speaker(record, line_index);
    let count = matches.len();
    for m in matches {
        debug!(
            "Record {} line {}: {} {:?} ({})",
            record.id, line_index, m.kind, m.value, speaker
        );
        record.append_hit(m.kind, m.value, full_line.clone(), speaker, "");
    }

    Some(count)
}

/// Count a record's hits of one kind
pub fn count_hits(record: &Record, kind: HitKind) -> usize {
    record.hits.iter().filter(|h| h.kind == kind).count()
}
