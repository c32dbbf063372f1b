use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{GroupedTrigger, MatcherConfig};
use crate::models::HitKind;

// Degree abbreviations are case-sensitive so the word "ma" does not fire.
static MASTERS_ABBREV_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^| )M\.?A\.?(?:$| |\n)").unwrap());
static MASTERS_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^| )master'?s(?:$| |\n)").unwrap());
static MSC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^| )(?:M\.?Sc|m\.?sc|M\.?sc)(?:$| |\.)").unwrap());
static FILE_EXTENSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^/.]\.([a-z]{2,5}) ").unwrap());
static COURSE_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:^| )((?:[A-Za-z]{3}[0-9]{3}|[A-Za-z]{3}[A-Da-d][0-9]{2})(?:[HYhy][0-9])?[FSYfsy]?)(?:$|[ .,;:!?)])",
    )
    .unwrap()
});

/// A single match found in a line, before speaker attribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub kind: HitKind,
    pub value: String,
}

impl PatternMatch {
    fn new(kind: HitKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone)]
enum TermRule {
    /// Bounded by start/space before and end/space/period after
    WholeWord(Regex),
    /// Lower-case substring
    Substring(String),
}

#[derive(Debug, Clone)]
struct CompiledTerm {
    term: String,
    rule: TermRule,
}

/// Matches configured terms and the structural patterns against line text
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    terms: Vec<CompiledTerm>,
    grouped: Vec<GroupedTrigger>,
    excluded_extensions: Vec<String>,
    system_message_marker: String,
    footer_phrase: String,
}

impl PatternMatcher {
    /// Compile the term list once for the whole run
    pub fn new(terms: &[String], config: &MatcherConfig) -> Result<Self> {
        let substring_terms: Vec<String> = config
            .substring_terms
            .iter()
            .map(|t| t.to_lowercase())
            .collect();

        let mut compiled = Vec::with_capacity(terms.len());
        for term in terms.iter().filter(|t| !t.is_empty()) {
            let lower = term.to_lowercase();
            let rule = if substring_terms.contains(&lower) {
                TermRule::Substring(lower)
            } else {
                let pattern = format!(r"(?:^| ){}(?:$| |\.)", regex::escape(&lower));
                let re = Regex::new(&pattern)
                    .with_context(|| format!("Failed to compile pattern for term {:?}", term))?;
                TermRule::WholeWord(re)
            };
            compiled.push(CompiledTerm {
                term: term.clone(),
                rule,
            });
        }

        Ok(Self {
            terms: compiled,
            grouped: config.grouped_triggers.clone(),
            excluded_extensions: config.excluded_extensions.clone(),
            system_message_marker: config.system_message_marker.clone(),
            footer_phrase: config.footer_phrase.to_lowercase(),
        })
    }

    /// Number of usable terms
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Whether a line is a system message or the chat-opening footer
    pub fn is_ignored(&self, full_line: &str, content: &str) -> bool {
        full_line.contains(&self.system_message_marker)
            || content.to_lowercase().contains(&self.footer_phrase)
    }

    /// Find every match in a line's content, in emission order
    ///
    /// `content` is the rendered line with sender metadata already stripped.
    pub fn find(&self, content: &str) -> Vec<PatternMatch> {
        let lower = content.to_lowercase();
        let mut matches = Vec::new();

        for term in &self.terms {
            let found = match &term.rule {
                TermRule::WholeWord(re) => re.is_match(&lower),
                TermRule::Substring(needle) => lower.contains(needle.as_str()),
            };
            if found {
                matches.push(PatternMatch::new(HitKind::QueryTerm, term.term.clone()));
            }
        }

        for group in &self.grouped {
            if group.triggers.iter().any(|t| lower.contains(t.as_str())) {
                matches.push(PatternMatch::new(HitKind::QueryTerm, group.value.clone()));
            }
        }

        if MASTERS_ABBREV_RE.is_match(content) || MASTERS_WORD_RE.is_match(&lower) {
            matches.push(PatternMatch::new(HitKind::QueryTerm, "Master's"));
        }

        if MSC_RE.is_match(content) {
            matches.push(PatternMatch::new(HitKind::QueryTerm, "MSC"));
        }

        if let Some(extension) = find_file_extension(content, &self.excluded_extensions) {
            matches.push(PatternMatch::new(HitKind::FileExtension, extension));
        }

        if let Some(code) = find_course_code(content) {
            matches.push(PatternMatch::new(HitKind::CourseCode, code));
        }

        matches
    }
}

/// First file extension in `text` that is not an excluded web suffix
///
/// A rejected candidate restarts the search one character later, so a valid
/// extension sharing the rejected candidate's delimiter is still found.
pub fn find_file_extension(text: &str, excluded: &[String]) -> Option<String> {
    let mut start = 0;
    while start < text.len() {
        let caps = FILE_EXTENSION_RE.captures_at(text, start)?;
        let whole = caps.get(0)?;
        let extension = caps.get(1)?.as_str();

        if !excluded.iter().any(|e| e == extension) {
            return Some(extension.to_string());
        }

        let first_char = text[whole.start()..].chars().next().map_or(1, char::len_utf8);
        start = whole.start() + first_char;
    }
    None
}

/// First course code in `text`, without surrounding space or punctuation
pub fn find_course_code(text: &str) -> Option<String> {
    COURSE_CODE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(terms: &[&str]) -> PatternMatcher {
        let terms: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
        PatternMatcher::new(&terms, &MatcherConfig::default()).unwrap()
    }

    fn values(matches: &[PatternMatch], kind: HitKind) -> Vec<&str> {
        matches
            .iter()
            .filter(|m| m.kind == kind)
            .map(|m| m.value.as_str())
            .collect()
    }

    fn excluded() -> Vec<String> {
        MatcherConfig::default().excluded_extensions
    }

    #[test]
    fn test_literal_term_is_whole_word() {
        let m = matcher(&["library"]);
        assert_eq!(
            values(&m.find("library science "), HitKind::QueryTerm),
            vec!["library"]
        );
        assert!(values(&m.find("librarysciences "), HitKind::QueryTerm).is_empty());
    }

    #[test]
    fn test_literal_term_case_insensitive_and_period_bounded() {
        let m = matcher(&["Robarts"]);
        assert_eq!(
            values(&m.find("try ROBARTS. "), HitKind::QueryTerm),
            vec!["Robarts"]
        );
    }

    #[test]
    fn test_term_with_regex_metacharacters() {
        let m = matcher(&["C++"]);
        assert_eq!(values(&m.find("learning c++ now "), HitKind::QueryTerm), vec!["C++"]);
    }

    #[test]
    fn test_substring_terms() {
        let m = matcher(&["Utoronto.ca"]);
        assert_eq!(
            values(&m.find("email me at x@mail.utoronto.ca "), HitKind::QueryTerm),
            vec!["Utoronto.ca"]
        );
    }

    #[test]
    fn test_empty_term_is_ignored() {
        let m = matcher(&["", "thesis"]);
        assert_eq!(m.term_count(), 1);
        assert!(m.find("  ").is_empty());
    }

    #[test]
    fn test_grouped_triggers() {
        let m = matcher(&[]);
        let found = m.find("the libraries have a citation guide and NVivo ");
        assert_eq!(
            values(&found, HitKind::QueryTerm),
            vec!["Library", "Nvivo", "Citation"]
        );
    }

    #[test]
    fn test_graduate_heuristic() {
        let m = matcher(&[]);
        assert_eq!(
            values(&m.find("i am a graduate student "), HitKind::QueryTerm),
            vec!["Graduate"]
        );
        assert_eq!(
            values(&m.find("as a grad student "), HitKind::QueryTerm),
            vec!["Graduate"]
        );
        assert!(values(&m.find("an undergraduate course "), HitKind::QueryTerm).is_empty());
    }

    #[test]
    fn test_degree_patterns() {
        let m = matcher(&[]);
        assert_eq!(values(&m.find("my M.A. thesis "), HitKind::QueryTerm), vec!["Master's"]);
        assert_eq!(values(&m.find("doing a masters degree "), HitKind::QueryTerm), vec!["Master's"]);
        assert_eq!(values(&m.find("the MSc. program "), HitKind::QueryTerm), vec!["MSC"]);
        assert!(m.find("my ma said hi ").is_empty());
    }

    #[test]
    fn test_degree_as_first_word() {
        let m = matcher(&[]);
        assert_eq!(values(&m.find("MA program deadline "), HitKind::QueryTerm), vec!["Master's"]);
        assert_eq!(values(&m.find("M.A. deadline "), HitKind::QueryTerm), vec!["Master's"]);
        assert_eq!(values(&m.find("Masters funding "), HitKind::QueryTerm), vec!["Master's"]);
        assert!(m.find("MAT program ").is_empty());
    }

    #[test]
    fn test_file_extension_excludes_web_suffixes() {
        assert_eq!(find_file_extension("see site.com ", &excluded()), None);
        assert_eq!(find_file_extension("open index.html ", &excluded()), None);
        assert_eq!(
            find_file_extension("file report.docx ", &excluded()),
            Some("docx".to_string())
        );
    }

    #[test]
    fn test_file_extension_requires_plain_predecessor() {
        assert_eq!(find_file_extension("see ../.bashrc ", &excluded()), None);
        assert_eq!(find_file_extension("path a/.txt ", &excluded()), None);
    }

    #[test]
    fn test_file_extension_after_rejected_candidate() {
        assert_eq!(
            find_file_extension("site.com .pdf ", &excluded()),
            Some("pdf".to_string())
        );
        assert_eq!(
            find_file_extension("go to site.ca then notes.pdf ", &excluded()),
            Some("pdf".to_string())
        );
    }

    #[test]
    fn test_course_codes() {
        assert_eq!(
            find_course_code("Take CSC108H1F next term "),
            Some("CSC108H1F".to_string())
        );
        assert_eq!(find_course_code("is csca04y. "), Some("csca04y".to_string()));
        assert_eq!(
            find_course_code("My course is CSC108H1F, see notes.pdf "),
            Some("CSC108H1F".to_string())
        );
        assert_eq!(find_course_code("code ABC1234 "), None);
    }

    #[test]
    fn test_ignored_lines() {
        let m = matcher(&[]);
        assert!(m.is_ignored("10:00 System message: patron joined ", "message: patron joined "));
        assert!(m.is_ignored("x y Welcome to Ask a Librarian ", "Welcome to Ask a Librarian "));
        assert!(!m.is_ignored("x y hello ", "hello "));
    }

    #[test]
    fn test_emission_order() {
        let m = matcher(&["thesis"]);
        let found = m.find("my thesis cites report.pdf for CSC108 ");
        let kinds: Vec<HitKind> = found.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![HitKind::QueryTerm, HitKind::FileExtension, HitKind::CourseCode]
        );
    }
}
