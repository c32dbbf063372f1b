use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use super::Roster;
use crate::models::{ChatMeta, Hit, HitKind, Mode, Record, Source, Speaker, TicketMeta};

/// Hit Type written for records without any hit
pub const NO_HIT: &str = "No hit!";

pub const CHAT_HEADERS: [&str; 20] = [
    "id",
    "guest",
    "protocol",
    "queue",
    "profile",
    "started",
    "wait",
    "duration",
    "referrer",
    "referrer domain",
    "Operator Institution",
    "UofT Operator Role",
    "UofT Operator Campus",
    "Redacted?",
    "Notes",
    "Hit Type",
    "Hit",
    "Hit Context",
    "Sent by",
    "Proper noun classification",
];

pub const TICKET_HEADERS: [&str; 21] = [
    "Summary",
    "Issue key",
    "Issue id",
    "Issue Type",
    "Status",
    "Project key",
    "Project name",
    "Project type",
    "Project url",
    "Priority",
    "Resolution",
    "Created",
    "Updated",
    "Last Viewed",
    "Resolved",
    "Redacted?",
    "Notes",
    "Hit Type",
    "Hit",
    "Hit Context",
    "Proper noun classification",
];

pub fn headers(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::AskChat => &CHAT_HEADERS,
        Mode::Jira => &TICKET_HEADERS,
    }
}

/// Scheme and host of a link: everything before the first `/` after `://`
///
/// Links without `://`, or without a path after the host, are returned whole.
pub fn referrer_domain(link: &str) -> &str {
    let Some(scheme_end) = link.find("://").map(|i| i + 3) else {
        return link;
    };
    match link[scheme_end..].find('/') {
        Some(slash) => &link[..scheme_end + slash],
        None => link,
    }
}

/// Institution suffix of an operator id such as `jane_lib`
pub fn operator_institution(operator: &str) -> &str {
    match operator.split_once('_') {
        Some((_, institution)) => institution,
        None => operator,
    }
}

/// Export rows for one chat record
pub fn chat_rows(id: &str, meta: &ChatMeta, hits: &[Hit], roster: &Roster) -> Vec<Vec<String>> {
    let base: [&str; 8] = [
        &meta.guest,
        &meta.protocol,
        &meta.queue,
        &meta.profile,
        &meta.started,
        &meta.wait,
        &meta.duration,
        &meta.referrer,
    ];

    if hits.is_empty() {
        let mut row = Vec::with_capacity(CHAT_HEADERS.len());
        row.push(id.to_string());
        row.extend(base.iter().map(|s| s.to_string()));
        row.extend(std::iter::repeat_n(String::new(), 6));
        row.push(NO_HIT.to_string());
        row.extend(std::iter::repeat_n(String::new(), 4));
        return vec![row];
    }

    let domain = referrer_domain(&meta.referrer);
    let institution = operator_institution(&meta.operator);
    let (role, campus) = roster
        .get(&meta.operator)
        .map(|e| (e.role.as_str(), e.campus.as_str()))
        .unwrap_or_default();

    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let mut row = Vec::with_capacity(CHAT_HEADERS.len());
            row.push(if i == 0 { id.to_string() } else { String::new() });
            row.extend(base.iter().map(|s| s.to_string()));
            row.extend([domain, institution, role, campus, "", ""].map(str::to_string));
            row.extend(hit.columns().map(str::to_string));
            row
        })
        .collect()
}

/// Export rows for one ticket record
pub fn ticket_rows(id: &str, meta: &TicketMeta, hits: &[Hit]) -> Vec<Vec<String>> {
    let row_for = |first: bool, hit: Option<&Hit>| {
        let fields: [&str; 17] = [
            &meta.summary,
            &meta.issue_key,
            if first { id } else { "" },
            &meta.issue_type,
            &meta.status,
            &meta.project_key,
            &meta.project_name,
            &meta.project_type,
            &meta.project_url,
            &meta.priority,
            &meta.resolution,
            &meta.created,
            &meta.updated,
            &meta.last_viewed,
            &meta.resolved,
            "",
            "",
        ];
        let mut row: Vec<String> = fields.iter().map(|s| s.to_string()).collect();
        match hit {
            Some(hit) => {
                let [kind, value, context, _, category] = hit.columns();
                row.extend([kind, value, context, category].map(str::to_string));
            }
            None => {
                row.push(NO_HIT.to_string());
                row.extend(std::iter::repeat_n(String::new(), 3));
            }
        }
        row
    };

    if hits.is_empty() {
        return vec![row_for(true, None)];
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| row_for(i == 0, Some(hit)))
        .collect()
}

/// Write the CSV export for `records`, returning the number of data rows
pub fn write_export<W: Write>(
    writer: W,
    mode: Mode,
    records: &[Record],
    roster: &Roster,
) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(headers(mode))?;

    let mut rows_written = 0;
    for record in records {
        let rows = match (&record.source, mode) {
            (Source::Chat(meta), Mode::AskChat) => chat_rows(&record.id, meta, &record.hits, roster),
            (Source::Ticket(meta), Mode::Jira) => ticket_rows(&record.id, meta, &record.hits),
            (source, _) => bail!(
                "Record {} is a {:?} record but the export mode is {:?}",
                record.id,
                source.mode(),
                mode
            ),
        };
        for row in rows {
            writer.write_record(&row)?;
            rows_written += 1;
        }
    }

    writer.flush().context("Failed to flush CSV export")?;
    Ok(rows_written)
}

/// Write the CSV export to a file
pub fn write_export_file(
    path: &Path,
    mode: Mode,
    records: &[Record],
    roster: &Roster,
) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    write_export(file, mode, records, roster)
        .with_context(|| format!("Failed to write export: {:?}", path))
}

/// Machine-readable dump of every record's hits
#[derive(Debug, Clone, Serialize)]
pub struct HitReport {
    pub mode: Mode,
    pub records: Vec<RecordHits>,
    pub summary: HitSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordHits {
    pub id: String,
    pub hits: Vec<Hit>,
}

/// Hit counts across a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct HitSummary {
    pub total_records: usize,
    pub records_with_hits: usize,
    pub total_hits: usize,
    pub by_kind: BTreeMap<String, usize>,
    pub by_speaker: BTreeMap<String, usize>,
}

impl HitSummary {
    pub fn from_records(records: &[Record]) -> Self {
        let mut summary = Self {
            total_records: records.len(),
            ..Default::default()
        };
        for record in records {
            if !record.hits.is_empty() {
                summary.records_with_hits += 1;
            }
            for hit in &record.hits {
                summary.total_hits += 1;
                *summary.by_kind.entry(hit.kind.label().to_string()).or_default() += 1;
                *summary
                    .by_speaker
                    .entry(hit.speaker.label().to_string())
                    .or_default() += 1;
            }
        }
        summary
    }

    pub fn count_kind(&self, kind: HitKind) -> usize {
        self.by_kind.get(kind.label()).copied().unwrap_or(0)
    }

    pub fn count_speaker(&self, speaker: Speaker) -> usize {
        self.by_speaker.get(speaker.label()).copied().unwrap_or(0)
    }
}

impl HitReport {
    pub fn from_records(mode: Mode, records: &[Record]) -> Self {
        Self {
            mode,
            records: records
                .iter()
                .map(|r| RecordHits {
                    id: r.id.clone(),
                    hits: r.hits.clone(),
                })
                .collect(),
            summary: HitSummary::from_records(records),
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}
