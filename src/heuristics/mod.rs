pub mod patterns;
pub mod speaker;

pub use patterns::*;
pub use speaker::*;

/// Substring triggers that all report the same canonical term
#[derive(Debug, Clone)]
pub struct GroupedTrigger {
    /// Lower-case substrings; any one of them fires the group
    pub triggers: Vec<String>,
    /// Hit value reported when the group fires
    pub value: String,
}

impl GroupedTrigger {
    pub fn new(triggers: &[&str], value: &str) -> Self {
        Self {
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
            value: value.to_string(),
        }
    }
}

/// Configuration for term and pattern matching
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Terms matched as plain substrings instead of whole words
    pub substring_terms: Vec<String>,
    /// Grouped heuristic terms, checked in order
    pub grouped_triggers: Vec<GroupedTrigger>,
    /// Web suffixes that never count as file extensions
    pub excluded_extensions: Vec<String>,
    /// Lines containing this (case-sensitive) are system messages
    pub system_message_marker: String,
    /// Generic chat-opening footer, compared lower-case
    pub footer_phrase: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            substring_terms: vec!["Utsc.utoronto.ca".to_string(), "Utoronto.ca".to_string()],
            grouped_triggers: vec![
                GroupedTrigger::new(&[" librar"], "Library"),
                GroupedTrigger::new(&[" nvivo", " nvivohub"], "Nvivo"),
                GroupedTrigger::new(&[" reference"], "Reference"),
                GroupedTrigger::new(&[" citation"], "Citation"),
                GroupedTrigger::new(&[" protocol"], "Library"),
                // Leading space keeps "undergraduate" out
                GroupedTrigger::new(&[" grad ", " gradu"], "Graduate"),
            ],
            excluded_extensions: [
                "com", "co", "ca", "org", "or", "net", "ne", "gov", "go", "edu", "ed", "html",
                "htm", "ht",
            ]
            .iter()
            .map(|e| e.to_string())
            .collect(),
            system_message_marker: "System message:".to_string(),
            footer_phrase: "ask a librarian".to_string(),
        }
    }
}
