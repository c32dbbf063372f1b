use std::time::Instant;

use anyhow::{ensure, Result};
use tracing::{debug, info};

use crate::heuristics::attribute_speaker;
use crate::models::{HitKind, RecognizedEntity, Record, TranscriptDocument, TranscriptMarker};
use crate::ner::EntityRecognizer;

/// Configuration for Stage 2 entity reconciliation
#[derive(Debug, Clone)]
pub struct Stage2Config {
    /// Entity labels that are never reported
    pub excluded_labels: Vec<String>,
    /// Lower-case entity texts that are never reported
    pub noise_words: Vec<String>,
    /// Tokens of context kept either side of an entity
    pub context_radius: usize,
}

impl Default for Stage2Config {
    fn default() -> Self {
        Self {
            excluded_labels: [
                "CARDINAL", "ORDINAL", "QUANTITY", "MONEY", "PERCENT", "TIME", "DATE",
            ]
            .iter()
            .map(|l| l.to_string())
            .collect(),
            noise_words: vec!["librarian".to_string()],
            context_radius: 5,
        }
    }
}

/// Result of Stage 2 reconciliation
#[derive(Debug, Default)]
pub struct Stage2Result {
    /// Transcripts submitted to the recognizer
    pub transcripts: usize,
    /// Entities returned by the recognizer
    pub entities_seen: usize,
    /// Entities dropped by label, noise word or marker filters
    pub entities_filtered: usize,
    /// Proper-noun hits appended
    pub hits: usize,
}

/// Build the synthetic transcript for one record
///
/// Links are removed from the record's lines in place. Each remaining line
/// with content contributes its speaker marker followed by its rendered
/// content; system messages are left out.
pub fn build_transcript(record: &mut Record) -> TranscriptDocument {
    for line in record.lines.iter_mut() {
        line.strip_links();
    }

    let mut doc = TranscriptDocument::new();
    for (line_index, line) in record.lines.iter().enumerate() {
        let content = record.content_tokens(line);
        if content.is_empty() || line.render().to_lowercase().contains("system message") {
            continue;
        }
        let speaker = attribute_speaker(record, line_index);
        doc.push_line(TranscriptMarker::for_speaker(speaker), content);
    }
    doc
}

/// Execute Stage 2: submit every transcript in one batch and reconcile the entities
pub async fn execute_stage2<R: EntityRecognizer>(
    records: &mut [Record],
    recognizer: &R,
    config: &Stage2Config,
) -> Result<Stage2Result> {
    let start = Instant::now();

    let documents: Vec<TranscriptDocument> = records.iter_mut().map(build_transcript).collect();
    let texts: Vec<String> = documents.iter().map(|d| d.text().to_string()).collect();

    info!(
        "Stage 2: submitting {} transcripts to {}",
        texts.len(),
        recognizer.name()
    );
    let batches = recognizer.recognize(&texts).await?;
    ensure!(
        batches.len() == texts.len(),
        "Recognizer {} returned {} results for {} transcripts",
        recognizer.name(),
        batches.len(),
        texts.len()
    );

    let mut result = Stage2Result {
        transcripts: texts.len(),
        ..Default::default()
    };

    for ((record, doc), entities) in records.iter_mut().zip(&documents).zip(&batches) {
        result.entities_seen += entities.len();
        let appended = reconcile(record, doc, entities, config);
        result.entities_filtered += entities.len() - appended;
        result.hits += appended;
    }

    info!(
        "Analyzing proper nouns took {:.3} seconds ({} entities, {} hits)",
        start.elapsed().as_secs_f64(),
        result.entities_seen,
        result.hits
    );

    Ok(result)
}

/// Map a transcript's entities back to speakers and append proper-noun hits
///
/// Returns the number of hits appended.
pub fn reconcile(
    record: &mut Record,
    doc: &TranscriptDocument,
    entities: &[RecognizedEntity],
    config: &Stage2Config,
) -> usize {
    let mut appended = 0;

    for entity in entities {
        if !is_reportable(entity, config) {
            continue;
        }

        let speaker = doc.speaker_at(entity.start_char);
        let context = match doc.token_span(entity.start_char, entity.end_char) {
            Some(span) => doc.context(span, config.context_radius),
            None => {
                debug!(
                    "Record {}: entity {:?} at {}..{} is outside the transcript",
                    record.id, entity.text, entity.start_char, entity.end_char
                );
                String::new()
            }
        };
        record.append_hit(
            HitKind::ProperNoun,
            entity.text.to_lowercase(),
            context,
            speaker,
            entity.label.clone(),
        );
        appended += 1;
    }

    appended
}

fn is_reportable(entity: &RecognizedEntity, config: &Stage2Config) -> bool {
    let lower = entity.text.to_lowercase();
    !config.excluded_labels.iter().any(|l| l == &entity.label)
        && !config.noise_words.iter().any(|w| w == &lower)
        && !TranscriptMarker::appears_in(&lower)
}
