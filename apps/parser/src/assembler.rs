//! Resume Assembler — merges LLM-resolved fields and locally tagged entity
//! hints into one normalized `ResumeRecord`.
//!
//! Tie-break rule: an LLM-resolved field wins whenever it is present and
//! non-empty; an entity hint fills a contact field only when the LLM left it
//! blank. Pure function, no side effects.

use crate::entities::{Entity, EntityLabel};
use crate::models::ResumeRecord;
use crate::resolver::ResolvedFields;

pub fn assemble(resolved: ResolvedFields, entities: &[Entity]) -> ResumeRecord {
    let mut record = ResumeRecord::default();

    if let Some(contact) = resolved.contact {
        record.contact = contact;
    }
    fill_if_blank(&mut record.contact.name, entities, EntityLabel::Person);
    fill_if_blank(&mut record.contact.email, entities, EntityLabel::Email);
    fill_if_blank(&mut record.contact.phone, entities, EntityLabel::Phone);

    record.education = resolved.education.unwrap_or_default();
    record.experience = resolved.experience.unwrap_or_default();
    record.skills = normalize_skills(resolved.skills.unwrap_or_default());

    record
}

fn fill_if_blank(field: &mut String, entities: &[Entity], label: EntityLabel) {
    if field.trim().is_empty() {
        if let Some(entity) = entities.iter().find(|e| e.label == label) {
            *field = entity.text.clone();
        }
    }
}

/// Trims, drops empties, and dedups case-insensitively while preserving the
/// first-seen casing and order.
fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}
