//! Field Resolver — sends extracted text (plus entity hints) to the LLM and
//! parses the structured response into partial resume fields.
//!
//! Schema validation is per section: a section that fails to validate
//! degrades to absent with a warning instead of failing the record, and a
//! fully unparseable response degrades to an empty `ResolvedFields`. Auth
//! and rate-limit failures propagate.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::entities::Entity;
use crate::errors::ParseError;
use crate::llm_client::LlmClient;
use crate::models::{Contact, EducationEntry, ExperienceEntry};
use crate::reader::ExtractedText;
use crate::resolver::prompts::{resume_parse_system, RESUME_PARSE_PROMPT_TEMPLATE};

pub mod prompts;

/// Character budget for the resume text embedded in the prompt. Resumes are
/// short; anything past this is boilerplate that only costs tokens.
const MAX_PROMPT_CHARS: usize = 12_000;
const MAX_HINTS: usize = 32;

/// Partial resume fields as returned by a resolver backend. `None` means the
/// backend produced nothing usable for that section.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFields {
    pub contact: Option<Contact>,
    pub education: Option<Vec<EducationEntry>>,
    pub experience: Option<Vec<ExperienceEntry>>,
    pub skills: Option<Vec<String>>,
}

/// Seam for field-resolution backends, async because the default backend is
/// a remote LLM call. Stub implementations keep the pipeline testable
/// without a network.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    async fn resolve(
        &self,
        text: &ExtractedText,
        entities: &[Entity],
    ) -> Result<ResolvedFields, ParseError>;
}

/// LLM-backed resolver.
pub struct LlmFieldResolver {
    llm: LlmClient,
}

impl LlmFieldResolver {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl FieldResolver for LlmFieldResolver {
    async fn resolve(
        &self,
        text: &ExtractedText,
        entities: &[Entity],
    ) -> Result<ResolvedFields, ParseError> {
        let prompt = build_prompt(text, entities);
        match self.llm.call_json::<Value>(&prompt, &resume_parse_system()).await {
            Ok(payload) => Ok(fields_from_payload(&payload)),
            Err(ParseError::MalformedResponse(msg)) => {
                warn!("unusable LLM response, degrading to empty fields: {msg}");
                Ok(ResolvedFields::default())
            }
            Err(e) => Err(e),
        }
    }
}

/// Builds the bounded prompt: truncated resume text plus a capped list of
/// entity hints.
fn build_prompt(text: &ExtractedText, entities: &[Entity]) -> String {
    let resume_text = truncate_at_char_boundary(&text.text, MAX_PROMPT_CHARS);

    let hints = if entities.is_empty() {
        "(none)".to_string()
    } else {
        entities
            .iter()
            .take(MAX_HINTS)
            .map(|e| format!("- {:?}: {}", e.label, e.text))
            .collect::<Vec<_>>()
            .join("\n")
    };

    // Substitute both placeholders in one pass over the template, so resume
    // text that itself contains a placeholder token is never re-expanded.
    let (before_text, rest) = RESUME_PARSE_PROMPT_TEMPLATE
        .split_once("{resume_text}")
        .expect("template contains {resume_text}");
    let (between, after) = rest
        .split_once("{entity_hints}")
        .expect("template contains {entity_hints}");

    let mut prompt =
        String::with_capacity(RESUME_PARSE_PROMPT_TEMPLATE.len() + resume_text.len() + hints.len());
    prompt.push_str(before_text);
    prompt.push_str(resume_text);
    prompt.push_str(between);
    prompt.push_str(&hints);
    prompt.push_str(after);
    prompt
}

/// Validates each section of the payload independently. Sections that fail
/// validation are dropped with a warning so one bad section never poisons
/// the rest of the record.
pub(crate) fn fields_from_payload(payload: &Value) -> ResolvedFields {
    ResolvedFields {
        contact: section(payload, "contact"),
        education: section(payload, "education"),
        experience: section(payload, "experience"),
        skills: section(payload, "skills"),
    }
}

fn section<T: serde::de::DeserializeOwned>(payload: &Value, key: &str) -> Option<T> {
    let value = payload.get(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("dropping malformed '{key}' section: {e}");
            None
        }
    }
}

fn truncate_at_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
