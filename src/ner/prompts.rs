use crate::models::TranscriptMarker;

/// Entity labels the model may assign
pub const ENTITY_LABELS: [&str; 18] = [
    "PERSON",
    "NORP",
    "FAC",
    "ORG",
    "GPE",
    "LOC",
    "PRODUCT",
    "EVENT",
    "WORK_OF_ART",
    "LAW",
    "LANGUAGE",
    "DATE",
    "TIME",
    "PERCENT",
    "MONEY",
    "QUANTITY",
    "ORDINAL",
    "CARDINAL",
];

/// System prompt for entity extraction
pub const ENTITY_SYSTEM_PROMPT: &str = r#"You extract named entities from support chat transcripts. You MUST follow these rules:

1. Report entities exactly as they are written in the transcript. Do not correct spelling or casing.
2. Report every occurrence, in the order they appear.
3. Use only the provided labels.
4. Tokens of the form chat_operator:, chat_patron: and chat_neither: mark who is speaking. They are never entities.
5. If there are no entities, submit an empty list."#;

/// Build the user prompt for one transcript
pub fn build_entity_prompt(transcript: &str) -> String {
    let markers: Vec<&str> = TranscriptMarker::ALL.iter().map(|m| m.literal()).collect();

    let mut prompt = String::new();
    prompt.push_str("# Transcript\n");
    prompt.push_str(&format!("Speaker markers: {}\n\n", markers.join(", ")));
    prompt.push_str(transcript);
    prompt.push_str("\n\nSubmit the named entities using the submit_entities tool.\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_transcript_and_markers() {
        let prompt = build_entity_prompt("chat_patron:Where is Robarts? ");
        assert!(prompt.contains("chat_patron:Where is Robarts?"));
        assert!(prompt.contains("chat_operator:, chat_patron:, chat_neither:"));
    }
}
