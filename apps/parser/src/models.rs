//! Output schema for the pipeline.
//!
//! Every field is present with an empty default when unresolved, so a
//! serialized record always carries the full shape regardless of how much
//! the resolver managed to extract.

use serde::{Deserialize, Serialize};

/// Contact details for the candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
}

/// One education entry. Dates are kept as free-form strings because resume
/// date formats are too irregular to normalize reliably ("2019", "Sep 2019",
/// "present").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// One work experience entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// The normalized structured output of the pipeline. Created once per
/// document and immutable after assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl ResumeRecord {
    /// Pretty-printed JSON representation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// True when nothing at all was resolved.
    pub fn is_empty(&self) -> bool {
        self.contact == Contact::default()
            && self.education.is_empty()
            && self.experience.is_empty()
            && self.skills.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ResumeRecord {
        ResumeRecord {
            contact: Contact {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "555-123-4567".to_string(),
                location: "Berlin".to_string(),
            },
            education: vec![EducationEntry {
                institution: "MIT".to_string(),
                degree: "BSc".to_string(),
                field: "Computer Science".to_string(),
                start_date: "2015".to_string(),
                end_date: "2019".to_string(),
            }],
            experience: vec![ExperienceEntry {
                company: "Acme".to_string(),
                title: "Engineer".to_string(),
                start_date: "2019".to_string(),
                end_date: "present".to_string(),
                highlights: vec!["Built the billing pipeline".to_string()],
            }],
            skills: vec!["Rust".to_string(), "Docker".to_string()],
        }
    }

    #[test]
    fn test_serde_round_trip_is_identity() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: ResumeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_default_record_serializes_all_fields() {
        let json = serde_json::to_string(&ResumeRecord::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in ["contact", "education", "experience", "skills"] {
            assert!(value.get(key).is_some(), "missing field {key}");
        }
    }

    #[test]
    fn test_deserialize_tolerates_missing_sections() {
        let record: ResumeRecord = serde_json::from_str(r#"{"skills": ["Go"]}"#).unwrap();
        assert_eq!(record.skills, vec!["Go".to_string()]);
        assert_eq!(record.contact, Contact::default());
        assert!(record.education.is_empty());
    }

    #[test]
    fn test_is_empty() {
        assert!(ResumeRecord::default().is_empty());
        assert!(!sample_record().is_empty());
    }

    #[test]
    fn test_to_json_is_valid_json() {
        let json = sample_record().to_json().unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
    }
}
