use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::models::{ChatMeta, Mode, Record, Source, TicketMeta};

/// Number of positional columns a chat export row must have
pub const CHAT_COLUMNS: usize = 12;
const CHAT_TEXT_COLUMN: usize = 11;

/// Ticket column holding the text to scan
pub const TICKET_TEXT_HEADER: &str = "Description";
const TICKET_REQUIRED_HEADERS: [&str; 4] = [TICKET_TEXT_HEADER, "Summary", "Issue key", "Issue id"];

/// Structural problems with an input file
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("{source_name}: missing required column {column:?}")]
    MissingColumn { source_name: String, column: String },
    #[error("{source_name}: row {row} has {found} fields, expected at least {expected}")]
    ShortRow {
        source_name: String,
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Read a transcript export into records of the given mode
pub fn read_records_file(path: &Path, mode: Mode) -> Result<Vec<Record>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let source_name = path.display().to_string();
    let records = match mode {
        Mode::AskChat => read_chat_records(file, &source_name)?,
        Mode::Jira => read_ticket_records(file, &source_name)?,
    };
    info!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
}

/// Parse chat export rows; columns are positional
pub fn read_chat_records<R: Read>(reader: R, source_name: &str) -> Result<Vec<Record>> {
    let mut reader = csv_reader(reader);
    let mut records = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let row_data =
            result.with_context(|| format!("{}: failed to parse row {}", source_name, row + 1))?;
        if row_data.len() < CHAT_COLUMNS {
            return Err(InputError::ShortRow {
                source_name: source_name.to_string(),
                row: row + 1,
                found: row_data.len(),
                expected: CHAT_COLUMNS,
            }
            .into());
        }

        let field = |i: usize| row_data.get(i).unwrap_or_default().to_string();
        let meta = ChatMeta {
            guest: field(1),
            protocol: field(2),
            queue: field(3),
            profile: field(4),
            started: field(5),
            wait: field(6),
            duration: field(7),
            operator: field(8),
            ip: field(9),
            referrer: field(10),
        };
        records.push(Record::new(field(0), Source::Chat(meta), field(CHAT_TEXT_COLUMN)));
    }

    Ok(records)
}

/// Parse ticket export rows; columns are located by header name
pub fn read_ticket_records<R: Read>(reader: R, source_name: &str) -> Result<Vec<Record>> {
    let mut reader = csv_reader(reader);
    let headers: HashMap<String, usize> = reader
        .headers()
        .with_context(|| format!("{}: failed to read header row", source_name))?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect();

    for required in TICKET_REQUIRED_HEADERS {
        if !headers.contains_key(required) {
            return Err(InputError::MissingColumn {
                source_name: source_name.to_string(),
                column: required.to_string(),
            }
            .into());
        }
    }

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let row_data =
            result.with_context(|| format!("{}: failed to parse row {}", source_name, row + 1))?;
        let field = |name: &str| {
            headers
                .get(name)
                .and_then(|&i| row_data.get(i))
                .unwrap_or_default()
                .to_string()
        };

        let meta = TicketMeta {
            summary: field("Summary"),
            issue_key: field("Issue key"),
            issue_type: field("Issue Type"),
            status: field("Status"),
            project_key: field("Project key"),
            project_name: field("Project name"),
            project_type: field("Project type"),
            project_url: field("Project url"),
            priority: field("Priority"),
            resolution: field("Resolution"),
            created: field("Created"),
            updated: field("Updated"),
            last_viewed: field("Last Viewed"),
            resolved: field("Resolved"),
        };
        records.push(Record::new(
            field("Issue id"),
            Source::Ticket(meta),
            field(TICKET_TEXT_HEADER),
        ));
    }

    Ok(records)
}

/// Read the term list file
pub fn read_terms_file(path: &Path) -> Result<Vec<String>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Failed to read term list: {:?}", path))?;
    let terms = parse_terms(file).with_context(|| format!("Failed to parse term list: {:?}", path))?;
    info!("Loaded {} terms from {:?}", terms.len(), path);
    Ok(terms)
}

/// Terms are the first field of every row after the header row
pub fn parse_terms<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut reader = csv_reader(reader);
    let mut terms = Vec::new();
    for result in reader.records() {
        let row = result?;
        match row.get(0) {
            Some(term) if !term.is_empty() => terms.push(term.to_string()),
            _ => {}
        }
    }
    Ok(terms)
}

/// Role and campus of a known operator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterEntry {
    pub role: String,
    pub campus: String,
}

/// Operator roster used by the chat export
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: HashMap<String, RosterEntry>,
}

impl Roster {
    /// Load the roster; a missing file yields an empty roster
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Operator roster {:?} not found; operator role and campus will be empty",
                path
            );
            return Ok(Self::default());
        }
        let file =
            std::fs::File::open(path).with_context(|| format!("Failed to read roster: {:?}", path))?;
        let roster = Self::parse(file).with_context(|| format!("Failed to parse roster: {:?}", path))?;
        debug!("Loaded {} operators from {:?}", roster.len(), path);
        Ok(roster)
    }

    /// Rows are: operator id, suffix, real name, institution, role, campus
    pub fn parse<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv_reader(reader);
        let mut entries = HashMap::new();
        for result in reader.records() {
            let row = result?;
            let Some(operator) = row.get(0) else { continue };
            entries.entry(operator.to_string()).or_insert_with(|| RosterEntry {
                role: row.get(4).unwrap_or_default().to_string(),
                campus: row.get(5).unwrap_or_default().to_string(),
            });
        }
        Ok(Self { entries })
    }

    pub fn get(&self, operator: &str) -> Option<&RosterEntry> {
        self.entries.get(operator)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const CHAT_CSV: &str = "\
id,guest,protocol,queue,profile,started,wait,duration,operator,ip,referrer,text
101,555-guest,web,ScarboroughLib,utsc,2021-01-04 10:00,12,340,jane_lib,10.0.0.1,https://q.utoronto.ca/courses/1,\"10:00 jane_lib: Hello
10:01 555-guest: Hi\"
";

    #[test]
    fn test_read_chat_records() {
        let records = read_chat_records(CHAT_CSV.as_bytes(), "chats.csv").unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, "101");
        assert_eq!(record.text, "10:00 jane_lib: Hello\n10:01 555-guest: Hi");
        match &record.source {
            Source::Chat(meta) => {
                assert_eq!(meta.guest, "555-guest");
                assert_eq!(meta.queue, "ScarboroughLib");
                assert_eq!(meta.profile, "utsc");
                assert_eq!(meta.operator, "jane_lib");
                assert_eq!(meta.referrer, "https://q.utoronto.ca/courses/1");
            }
            Source::Ticket(_) => panic!("expected a chat record"),
        }
    }

    #[test]
    fn test_short_chat_row_is_an_error() {
        let csv = "id,guest\n1,2\n";
        let err = read_chat_records(csv.as_bytes(), "short.csv").unwrap_err();
        let input_err = err.downcast_ref::<InputError>().unwrap();
        assert!(matches!(input_err, InputError::ShortRow { found: 2, .. }));
    }

    #[test]
    fn test_read_ticket_records_by_header() {
        let csv = "Summary,Issue key,Issue id,Status,Description\n\
                   Login broken,LIB-7,9001,Open,Cannot open thesis.pdf\n";

        let records = read_ticket_records(csv.as_bytes(), "jira.csv").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "9001");
        assert_eq!(records[0].text, "Cannot open thesis.pdf");
        match &records[0].source {
            Source::Ticket(meta) => {
                assert_eq!(meta.issue_key, "LIB-7");
                assert_eq!(meta.status, "Open");
                assert!(meta.priority.is_empty());
            }
            Source::Chat(_) => panic!("expected a ticket record"),
        }
    }

    #[test]
    fn test_ticket_without_description_is_an_error() {
        let csv = "Summary,Issue key,Issue id\nx,LIB-1,1\n";
        let err = read_ticket_records(csv.as_bytes(), "jira.csv").unwrap_err();
        let input_err = err.downcast_ref::<InputError>().unwrap();
        match input_err {
            InputError::MissingColumn { column, .. } => assert_eq!(column, "Description"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_terms_skips_header_and_blanks() {
        let terms = parse_terms("Term\nLibrary\n\nRefWorks\nUtoronto.ca\n".as_bytes()).unwrap();
        assert_eq!(terms, vec!["Library", "RefWorks", "Utoronto.ca"]);
    }

    #[test]
    fn test_roster_lookup() {
        let csv = "name,suffix,real,institution,role,campus\n\
                   jane_lib,lib,Jane Doe,UofT,Librarian,UTSC\n";
        let roster = Roster::parse(csv.as_bytes()).unwrap();

        assert_eq!(roster.len(), 1);
        let entry = roster.get("jane_lib").unwrap();
        assert_eq!(entry.role, "Librarian");
        assert_eq!(entry.campus, "UTSC");
        assert!(roster.get("bob_tor").is_none());
    }

    #[test]
    fn test_missing_roster_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let roster = Roster::load(&dir.path().join("names.csv")).unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn test_read_records_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chats.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(CHAT_CSV.as_bytes()).unwrap();

        let records = read_records_file(&path, Mode::AskChat).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mode(), Mode::AskChat);
    }
}
