use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::Speaker;

/// Inline tag written before each line of a synthetic transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptMarker {
    Operator,
    Patron,
    Neither,
}

impl TranscriptMarker {
    pub const ALL: [TranscriptMarker; 3] = [
        TranscriptMarker::Operator,
        TranscriptMarker::Patron,
        TranscriptMarker::Neither,
    ];

    pub fn literal(&self) -> &'static str {
        match self {
            TranscriptMarker::Operator => "chat_operator:",
            TranscriptMarker::Patron => "chat_patron:",
            TranscriptMarker::Neither => "chat_neither:",
        }
    }

    pub fn for_speaker(speaker: Speaker) -> Self {
        match speaker {
            Speaker::Operator => TranscriptMarker::Operator,
            Speaker::Patron => TranscriptMarker::Patron,
            _ => TranscriptMarker::Neither,
        }
    }

    /// Speaker reported for entities found after this marker
    pub fn speaker(&self) -> Speaker {
        match self {
            TranscriptMarker::Operator => Speaker::Operator,
            TranscriptMarker::Patron => Speaker::Patron,
            TranscriptMarker::Neither => Speaker::UnableToFind,
        }
    }

    /// Whether `text` contains any marker literal, ignoring the trailing colon
    pub fn appears_in(text: &str) -> bool {
        let lower = text.to_lowercase();
        Self::ALL
            .iter()
            .any(|m| lower.contains(m.literal().trim_end_matches(':')))
    }
}

/// A token of the synthetic transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptToken {
    /// Character offsets into the transcript text
    pub chars: Range<usize>,
    /// Byte offsets into the transcript text
    pub bytes: Range<usize>,
}

/// The stretch of transcript contributed by one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Character offsets, marker included
    pub chars: Range<usize>,
    /// Token indices, marker token included
    pub tokens: Range<usize>,
    pub marker: TranscriptMarker,
}

/// Synthetic transcript for one record, with speaker segments kept alongside the text
#[derive(Debug, Clone, Default)]
pub struct TranscriptDocument {
    text: String,
    char_len: usize,
    tokens: Vec<TranscriptToken>,
    segments: Vec<Segment>,
}

impl TranscriptDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line: the marker immediately followed by the rendered content
    pub fn push_line(&mut self, marker: TranscriptMarker, content: &[String]) {
        let seg_char_start = self.char_len;
        let seg_token_start = self.tokens.len();

        self.push_token(marker.literal());
        for word in content {
            self.push_token(word);
            self.text.push(' ');
            self.char_len += 1;
        }

        self.segments.push(Segment {
            chars: seg_char_start..self.char_len,
            tokens: seg_token_start..self.tokens.len(),
            marker,
        });
    }

    fn push_token(&mut self, word: &str) {
        let byte_start = self.text.len();
        let char_start = self.char_len;
        self.text.push_str(word);
        self.char_len += word.chars().count();
        self.tokens.push(TranscriptToken {
            chars: char_start..self.char_len,
            bytes: byte_start..self.text.len(),
        });
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[TranscriptToken] {
        &self.tokens
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Speaker of the nearest complete marker before the given character offset
    ///
    /// An offset inside a segment's marker belongs to the previous segment;
    /// `Error` when no complete marker precedes it or it lies past the text.
    pub fn speaker_at(&self, char_offset: usize) -> Speaker {
        let idx = self
            .segments
            .partition_point(|s| s.chars.end <= char_offset);
        let Some(segment) = self.segments.get(idx) else {
            return Speaker::Error;
        };
        if char_offset >= self.marker_end(segment) {
            return segment.marker.speaker();
        }
        idx.checked_sub(1)
            .and_then(|prev| self.segments.get(prev))
            .map_or(Speaker::Error, |prev| prev.marker.speaker())
    }

    fn marker_end(&self, segment: &Segment) -> usize {
        self.tokens
            .get(segment.tokens.start)
            .map_or(segment.chars.start, |marker| marker.chars.end)
    }

    /// Indices of the tokens overlapping a character span
    pub fn token_span(&self, start_char: usize, end_char: usize) -> Option<Range<usize>> {
        let first = self.tokens.partition_point(|t| t.chars.end <= start_char);
        let last = self.tokens.partition_point(|t| t.chars.start < end_char.max(start_char + 1));
        (first < last).then_some(first..last)
    }

    /// Text covering `radius` tokens either side of a token span
    pub fn context(&self, span: Range<usize>, radius: usize) -> String {
        let lo = span.start.saturating_sub(radius);
        let hi = (span.end + radius).min(self.tokens.len());
        if lo >= hi {
            return String::new();
        }
        let start = self.tokens[lo].bytes.start;
        let end = self.tokens[hi - 1].bytes.end;
        self.text[start..end].to_string()
    }

    /// Character offset of `needle` at or after `from_char`
    pub fn find_from(&self, needle: &str, from_char: usize) -> Option<usize> {
        find_chars(&self.text, needle, from_char)
    }
}

/// Character offset of `needle` in `haystack`, searching from character `from_char`
pub fn find_chars(haystack: &str, needle: &str, from_char: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let from_byte = haystack
        .char_indices()
        .nth(from_char)
        .map(|(b, _)| b)
        .unwrap_or(haystack.len());
    let byte = haystack[from_byte..].find(needle)? + from_byte;
    Some(haystack[..byte].chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn sample() -> TranscriptDocument {
        let mut doc = TranscriptDocument::new();
        doc.push_line(TranscriptMarker::Operator, &words("Hello John"));
        doc.push_line(TranscriptMarker::Patron, &words("Thanks John"));
        doc
    }

    #[test]
    fn test_text_layout() {
        let doc = sample();
        assert_eq!(doc.text(), "chat_operator:Hello John chat_patron:Thanks John ");
        assert_eq!(doc.tokens().len(), 6);
        assert_eq!(doc.segments().len(), 2);
        assert_eq!(doc.segments()[1].tokens, 3..6);
    }

    #[test]
    fn test_nearest_preceding_marker_wins() {
        let doc = sample();
        let first = doc.find_from("John", 0).unwrap();
        let second = doc.find_from("John", first + 1).unwrap();

        assert_eq!(doc.speaker_at(first), Speaker::Operator);
        assert_eq!(doc.speaker_at(second), Speaker::Patron);
    }

    #[test]
    fn test_offset_outside_segments_is_error() {
        let doc = sample();
        assert_eq!(doc.speaker_at(10_000), Speaker::Error);
        assert_eq!(TranscriptDocument::new().speaker_at(0), Speaker::Error);
    }

    #[test]
    fn test_offset_inside_marker() {
        let doc = sample();
        assert_eq!(doc.speaker_at(0), Speaker::Error);
        assert_eq!(doc.speaker_at(13), Speaker::Error);
        assert_eq!(doc.speaker_at(14), Speaker::Operator);
        let patron_marker = doc.find_from("chat_patron:", 0).unwrap();
        assert_eq!(doc.speaker_at(patron_marker), Speaker::Operator);
    }

    #[test]
    fn test_neither_marker_maps_to_unable_to_find() {
        let mut doc = TranscriptDocument::new();
        doc.push_line(TranscriptMarker::Neither, &words("ask Toronto"));
        let offset = doc.find_from("Toronto", 0).unwrap();
        assert_eq!(doc.speaker_at(offset), Speaker::UnableToFind);
    }

    #[test]
    fn test_token_span_and_context() {
        let mut doc = TranscriptDocument::new();
        doc.push_line(
            TranscriptMarker::Patron,
            &words("one two three four five six Robarts Library seven eight nine ten eleven twelve"),
        );
        let start = doc.find_from("Robarts", 0).unwrap();
        let end = start + "Robarts Library".len();
        let span = doc.token_span(start, end).unwrap();

        assert_eq!(span, 7..9);
        assert_eq!(
            doc.context(span, 5),
            "two three four five six Robarts Library seven eight nine ten eleven"
        );
    }

    #[test]
    fn test_context_clamps_at_start() {
        let doc = sample();
        let span = doc.token_span(14, 19).unwrap();
        assert_eq!(span, 1..2);
        assert_eq!(doc.context(span, 5), doc.text().trim_end());
    }

    #[test]
    fn test_multibyte_offsets_are_characters() {
        let mut doc = TranscriptDocument::new();
        doc.push_line(TranscriptMarker::Operator, &words("café Zoë"));
        let offset = doc.find_from("Zoë", 0).unwrap();
        assert_eq!(offset, "chat_operator:café ".chars().count());
        let span = doc.token_span(offset, offset + 3).unwrap();
        assert_eq!(doc.context(span, 0), "Zoë");
    }

    #[test]
    fn test_marker_detection() {
        assert!(TranscriptMarker::appears_in("Chat_Patron:Thanks"));
        assert!(!TranscriptMarker::appears_in("Robarts"));
    }
}
