//! Resume parsing pipeline: extracts structured resume data (contact,
//! skills, experience, education) from PDF and DOCX documents.
//!
//! The pipeline composes a document reader, a deterministic entity tagger,
//! and an LLM-backed field resolver, then assembles one normalized
//! [`ResumeRecord`] per document. See [`ResumeParser`] for the entry point.

pub mod assembler;
pub mod config;
pub mod entities;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod pipeline;
pub mod reader;
pub mod resolver;

pub use config::Config;
pub use errors::ParseError;
pub use models::ResumeRecord;
pub use pipeline::{parse_batch, ResumeParser};
pub use reader::DocumentFormat;
