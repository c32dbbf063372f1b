use serde::{Deserialize, Serialize};

use super::{Hit, HitKind, Speaker};

/// Shape of the transcripts being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Mode {
    /// Live chat transcripts with operator/patron dialogue
    #[value(name = "ask_chat")]
    #[serde(rename = "ask_chat")]
    AskChat,
    /// Issue-tracker ticket exports
    #[value(name = "jira")]
    #[serde(rename = "jira")]
    Jira,
}

impl Mode {
    /// Leading tokens of each line that identify the sender rather than carry content
    pub fn metadata_tokens(&self) -> usize {
        match self {
            Mode::AskChat => 2,
            Mode::Jira => 0,
        }
    }
}

/// One physical line of a record's text, split into words
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub tokens: Vec<String>,
}

impl Line {
    pub fn from_text(text: &str) -> Self {
        Self {
            tokens: text.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Render every token followed by a single space
    pub fn render(&self) -> String {
        render_tokens(&self.tokens)
    }

    /// Render the tokens after the first `skip`
    pub fn render_from(&self, skip: usize) -> String {
        render_tokens(self.tokens.get(skip..).unwrap_or_default())
    }

    /// Remove tokens that look like links, returning how many were dropped
    pub fn strip_links(&mut self) -> usize {
        let before = self.tokens.len();
        self.tokens
            .retain(|token| !token.to_lowercase().contains("http"));
        before - self.tokens.len()
    }
}

/// Join tokens the way lines are rendered: each token followed by one space
pub fn render_tokens(tokens: &[String]) -> String {
    let mut output = String::with_capacity(tokens.iter().map(|t| t.len() + 1).sum());
    for token in tokens {
        output.push_str(token);
        output.push(' ');
    }
    output
}

/// Metadata carried by a chat transcript row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatMeta {
    /// Patron handle as it appears in the message lines
    pub guest: String,
    pub protocol: String,
    pub queue: String,
    pub profile: String,
    pub started: String,
    pub wait: String,
    pub duration: String,
    /// Operator identifier, `name_institution`
    pub operator: String,
    pub ip: String,
    pub referrer: String,
}

/// Metadata carried by a ticket row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketMeta {
    pub summary: String,
    pub issue_key: String,
    pub issue_type: String,
    pub status: String,
    pub project_key: String,
    pub project_name: String,
    pub project_type: String,
    pub project_url: String,
    pub priority: String,
    pub resolution: String,
    pub created: String,
    pub updated: String,
    pub last_viewed: String,
    pub resolved: String,
}

/// Mode-dependent metadata of a record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Source {
    Chat(ChatMeta),
    Ticket(TicketMeta),
}

impl Source {
    pub fn mode(&self) -> Mode {
        match self {
            Source::Chat(_) => Mode::AskChat,
            Source::Ticket(_) => Mode::Jira,
        }
    }
}

/// One chat transcript or ticket being scanned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Chat id or issue id
    pub id: String,
    pub source: Source,
    /// Raw text; emptied once the record is normalized into `lines`
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub lines: Vec<Line>,
    /// Hits in discovery order
    #[serde(default)]
    pub hits: Vec<Hit>,
}

impl Record {
    pub fn new(id: impl Into<String>, source: Source, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source,
            text: text.into(),
            lines: Vec::new(),
            hits: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.source.mode()
    }

    /// Tokens of a line that carry message content
    pub fn content_tokens<'a>(&self, line: &'a Line) -> &'a [String] {
        line.tokens
            .get(self.mode().metadata_tokens()..)
            .unwrap_or_default()
    }

    /// Append one hit to the record
    pub fn append_hit(
        &mut self,
        kind: HitKind,
        value: impl Into<String>,
        context: impl Into<String>,
        speaker: Speaker,
        category: impl Into<String>,
    ) {
        self.hits.push(Hit {
            kind,
            value: value.into(),
            context: context.into(),
            speaker,
            category: category.into(),
        });
    }
}
