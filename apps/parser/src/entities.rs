//! Entity Extractor — tags candidate spans (names, emails, phones, dates,
//! URLs) in extracted text.
//!
//! The default backend is `RuleTagger`, a deterministic rule set standing in
//! for a pretrained NER pipeline. `EntityTagger` is the seam for swapping in
//! a model-backed implementation without touching the pipeline.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ParseError;
use crate::reader::ExtractedText;

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
const PHONE_PATTERN: &str = r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{3}\)|\d{3})[\s.-]\d{3}[\s.-]\d{4}";
const URL_PATTERN: &str = r"https?://[^\s<>()]+|\bwww\.[A-Za-z0-9.-]+\.[A-Za-z]{2,}[^\s<>()]*";
const DATE_PATTERN: &str =
    r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(?:19|20)\d{2}\b|\b(?:19|20)\d{2}\b";

/// A candidate name looks like 2-4 TitleCase words.
const NAME_LINE_PATTERN: &str = r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,3}$";

/// Separators that split a headline like "Jane Doe | Software Engineer".
const TITLE_SEPARATORS: &[&str] = &[" - ", " | ", " \u{2014} "];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityLabel {
    Person,
    Email,
    Phone,
    Url,
    Date,
}

/// A tagged span. Offsets are byte positions into the `ExtractedText` the
/// tagger was given; the entity does not own that text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub label: EntityLabel,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Seam for entity tagging backends. Implementations must be deterministic
/// for a given rule/model version and return entities ordered by start
/// offset.
pub trait EntityTagger: Send + Sync {
    fn tag(&self, text: &ExtractedText) -> Result<Vec<Entity>, ParseError>;
}

/// Deterministic regex + heuristic tagger.
#[derive(Debug)]
pub struct RuleTagger {
    email: Regex,
    phone: Regex,
    url: Regex,
    date: Regex,
    name_line: Regex,
}

impl RuleTagger {
    /// Builds the tagger. `email_override` replaces the built-in email rule;
    /// an invalid pattern is a fatal `ModelUnavailable`.
    pub fn new(email_override: Option<&str>) -> Result<Self, ParseError> {
        let email_pattern = email_override.unwrap_or(EMAIL_PATTERN);
        Ok(RuleTagger {
            email: compile(email_pattern)?,
            phone: compile(PHONE_PATTERN)?,
            url: compile(URL_PATTERN)?,
            date: compile(DATE_PATTERN)?,
            name_line: compile(NAME_LINE_PATTERN)?,
        })
    }

    /// Applies the first-line name heuristic: take the first non-empty line,
    /// strip a trailing job title after a separator, and accept it if it
    /// looks like a TitleCase name.
    fn tag_name(&self, text: &str) -> Option<Entity> {
        let mut offset = 0;
        for line in text.split('\n') {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                offset += line.len() + 1;
                continue;
            }

            let mut candidate = trimmed;
            for sep in TITLE_SEPARATORS {
                if let Some((head, _)) = candidate.split_once(sep) {
                    candidate = head.trim_end();
                }
            }

            if self.name_line.is_match(candidate) {
                let lead = line.len() - line.trim_start().len();
                let start = offset + lead;
                return Some(Entity {
                    label: EntityLabel::Person,
                    text: candidate.to_string(),
                    start,
                    end: start + candidate.len(),
                });
            }
            return None;
        }
        None
    }
}

impl EntityTagger for RuleTagger {
    fn tag(&self, extracted: &ExtractedText) -> Result<Vec<Entity>, ParseError> {
        let text = &extracted.text;
        let mut entities = Vec::new();

        if let Some(name) = self.tag_name(text) {
            entities.push(name);
        }
        for (regex, label) in [
            (&self.email, EntityLabel::Email),
            (&self.phone, EntityLabel::Phone),
            (&self.url, EntityLabel::Url),
            (&self.date, EntityLabel::Date),
        ] {
            for m in regex.find_iter(text) {
                entities.push(Entity {
                    label,
                    text: m.as_str().to_string(),
                    start: m.start(),
                    end: m.end(),
                });
            }
        }

        entities.sort_by_key(|e| (e.start, e.end));
        Ok(entities)
    }
}

fn compile(pattern: &str) -> Result<Regex, ParseError> {
    Regex::new(pattern)
        .map_err(|e| ParseError::ModelUnavailable(format!("invalid tagging pattern: {e}")))
}
