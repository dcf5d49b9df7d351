// LLM prompt constants for the field resolver.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt for resume field extraction.
pub fn resume_parse_system() -> String {
    format!(
        "You are an expert resume analyst extracting structured candidate data. {JSON_ONLY_SYSTEM} \
        Do NOT invent facts not present in the resume text."
    )
}

/// Resume parsing prompt template. Replace `{resume_text}` and
/// `{entity_hints}` before sending.
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"Extract structured resume data from the text below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "contact": {
    "name": "Jane Doe",
    "email": "jane@example.com",
    "phone": "+1 555 123 4567",
    "location": "Berlin, Germany"
  },
  "education": [
    {
      "institution": "MIT",
      "degree": "BSc",
      "field": "Computer Science",
      "start_date": "2015",
      "end_date": "2019"
    }
  ],
  "experience": [
    {
      "company": "Acme Corp",
      "title": "Software Engineer",
      "start_date": "Sep 2019",
      "end_date": "present",
      "highlights": ["Built the billing pipeline serving 2M users"]
    }
  ],
  "skills": ["Rust", "Docker", "PostgreSQL"]
}

Rules:
1. Use ONLY facts present in the resume text. Leave a field as an empty string
   (or empty array) when the text does not state it.
2. Keep dates exactly as written in the resume; do not normalize them.
3. `skills` is a flat array of distinct skill names, no duplicates.
4. `highlights` are the bullet points under each role, verbatim or lightly
   trimmed.
5. The entity hints below are noisy regex/NER candidates from a local tagger.
   Prefer the resume text when they disagree.

RESUME TEXT:
{resume_text}

ENTITY HINTS:
{entity_hints}"#;
