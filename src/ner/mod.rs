pub mod client;
pub mod http;
pub mod prompts;

pub use client::*;
pub use http::*;
pub use prompts::*;

use std::future::Future;

use anyhow::Result;
use tracing::warn;

use crate::models::{find_chars, RecognizedEntity};

/// An external named-entity recognition capability
///
/// Implementations receive every transcript of a run in one call and must
/// return exactly one entity list per transcript, in submission order.
pub trait EntityRecognizer {
    /// Backend identifier used in logs
    fn name(&self) -> &str;

    /// Recognize entities in each text; offsets are character offsets into that text
    fn recognize(&self, texts: &[String])
    -> impl Future<Output = Result<Vec<Vec<RecognizedEntity>>>>;
}

/// The recognizer selected on the command line
pub enum Recognizer {
    Anthropic(AnthropicRecognizer),
    Http(HttpRecognizer),
}

impl EntityRecognizer for Recognizer {
    fn name(&self) -> &str {
        match self {
            Recognizer::Anthropic(r) => r.name(),
            Recognizer::Http(r) => r.name(),
        }
    }

    fn recognize(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<RecognizedEntity>>>> {
        async move {
            match self {
                Recognizer::Anthropic(r) => r.recognize(texts).await,
                Recognizer::Http(r) => r.recognize(texts).await,
            }
        }
    }
}

/// Place entities reported as bare text onto character offsets of `text`
///
/// Entities are searched for in report order, each starting where the
/// previous one was found and falling back to the start of the text.
/// Entities that do not occur in the text are dropped.
pub fn locate_entities(text: &str, found: Vec<(String, String)>) -> Vec<RecognizedEntity> {
    let mut located = Vec::with_capacity(found.len());
    let mut cursor = 0;

    for (entity_text, label) in found {
        let start = find_chars(text, &entity_text, cursor).or_else(|| find_chars(text, &entity_text, 0));
        match start {
            Some(start) => {
                let entity = RecognizedEntity::new(entity_text, label, start);
                cursor = entity.end_char;
                located.push(entity);
            }
            None => warn!("Entity {:?} not found in transcript; dropped", entity_text),
        }
    }

    located.sort_by_key(|e| e.start_char);
    located
}
