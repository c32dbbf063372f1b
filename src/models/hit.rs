use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of signal a hit represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitKind {
    /// A configured term, grouped heuristic or degree reference
    #[serde(rename = "Query term")]
    QueryTerm,
    /// A file name extension such as `pdf`
    #[serde(rename = "File Extension")]
    FileExtension,
    /// A course code such as `CSC108H1F`
    #[serde(rename = "Course Code")]
    CourseCode,
    /// A named entity reported by the recognizer
    #[serde(rename = "Proper noun")]
    ProperNoun,
}

impl HitKind {
    pub fn label(&self) -> &'static str {
        match self {
            HitKind::QueryTerm => "Query term",
            HitKind::FileExtension => "File Extension",
            HitKind::CourseCode => "Course Code",
            HitKind::ProperNoun => "Proper noun",
        }
    }
}

impl fmt::Display for HitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who produced the line a hit was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    Operator,
    Patron,
    /// No line with an identifiable marker precedes the hit
    #[serde(rename = "Unable to find")]
    UnableToFind,
    /// Ticket records have no dialogue
    #[serde(rename = "N/A")]
    NotApplicable,
    /// An entity offset could not be placed in any transcript segment
    Error,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Operator => "Operator",
            Speaker::Patron => "Patron",
            Speaker::UnableToFind => "Unable to find",
            Speaker::NotApplicable => "N/A",
            Speaker::Error => "Error",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One detected occurrence of a term, pattern or entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub kind: HitKind,
    /// Normalized matched text
    pub value: String,
    /// The containing line, or a token window around an entity
    pub context: String,
    pub speaker: Speaker,
    /// Entity label; empty for non-entity hits
    pub category: String,
}

impl Hit {
    /// The hit as the five export columns: kind, value, context, speaker, category
    pub fn columns(&self) -> [&str; 5] {
        [
            self.kind.label(),
            &self.value,
            &self.context,
            self.speaker.label(),
            &self.category,
        ]
    }
}
