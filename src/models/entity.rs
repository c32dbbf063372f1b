use serde::{Deserialize, Serialize};

/// A named entity reported by an entity-recognition backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    /// Entity text as it appears in the submitted transcript
    pub text: String,
    /// Category label, e.g. `PERSON`, `ORG`, `PRODUCT`
    pub label: String,
    /// Character offset of the first character
    pub start_char: usize,
    /// Character offset one past the last character
    pub end_char: usize,
}

impl RecognizedEntity {
    pub fn new(text: impl Into<String>, label: impl Into<String>, start_char: usize) -> Self {
        let text = text.into();
        let end_char = start_char + text.chars().count();
        Self {
            text,
            label: label.into(),
            start_char,
            end_char,
        }
    }
}
