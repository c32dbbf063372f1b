use crate::models::{ChatMeta, Record, Source, Speaker};

/// Decide who authored a line of a record
///
/// Ticket records have no dialogue and always yield `N/A`. For chat records
/// the search walks backwards from `line_index` to the nearest line whose
/// second token (the sender handle) identifies the operator or the patron.
/// Lines with fewer than two tokens are skipped. Running off the start of the
/// record yields `Unable to find`.
pub fn attribute_speaker(record: &Record, line_index: usize) -> Speaker {
    let meta = match &record.source {
        Source::Ticket(_) => return Speaker::NotApplicable,
        Source::Chat(meta) => meta,
    };

    let mut cursor = Some(line_index);
    while let Some(index) = cursor {
        let handle = record
            .lines
            .get(index)
            .and_then(|line| line.tokens.get(1));

        if let Some(speaker) = handle.and_then(|h| classify_handle(meta, h)) {
            return speaker;
        }

        cursor = index.checked_sub(1);
    }

    Speaker::UnableToFind
}

/// Classify a sender handle against the chat's operator and patron identifiers
fn classify_handle(meta: &ChatMeta, handle: &str) -> Option<Speaker> {
    let handle = handle.to_lowercase();
    let mentions = |needle: &str| !needle.is_empty() && handle.contains(&needle.to_lowercase());

    if handle.contains("operator")
        || mentions(&meta.profile)
        || mentions(&meta.queue)
        || mentions(&meta.operator)
    {
        return Some(Speaker::Operator);
    }

    if mentions(&meta.guest) || handle.contains("patron") {
        return Some(Speaker::Patron);
    }

    None
}
