//! Pipeline wiring: read -> tag entities -> resolve fields -> assemble.
//!
//! Documents are processed sequentially within one parse; batches run
//! independent parses in parallel with a shared semaphore bounding how many
//! are in flight at once, since the LLM rate budget is the only shared
//! resource.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::assembler::assemble;
use crate::config::Config;
use crate::entities::{EntityTagger, RuleTagger};
use crate::errors::ParseError;
use crate::llm_client::LlmClient;
use crate::models::ResumeRecord;
use crate::reader::{self, DocumentFormat, ExtractedText, RawDocument};
use crate::resolver::{FieldResolver, LlmFieldResolver};

/// One parser instance. Cheap to clone and share; holds no per-document
/// state.
#[derive(Clone)]
pub struct ResumeParser {
    tagger: Arc<dyn EntityTagger>,
    resolver: Arc<dyn FieldResolver>,
}

impl ResumeParser {
    /// Builds the default pipeline: rule tagger + LLM field resolver.
    pub fn new(config: &Config) -> Result<Self, ParseError> {
        let tagger = RuleTagger::new(config.email_pattern.as_deref())?;
        let resolver = LlmFieldResolver::new(LlmClient::new(config.anthropic_api_key.clone()));
        Ok(Self::with_components(Arc::new(tagger), Arc::new(resolver)))
    }

    /// Builds a pipeline from explicit components. Used by tests and by
    /// callers that swap in their own tagger or resolver backend.
    pub fn with_components(
        tagger: Arc<dyn EntityTagger>,
        resolver: Arc<dyn FieldResolver>,
    ) -> Self {
        Self { tagger, resolver }
    }

    /// Parses one resume file.
    pub async fn parse_path(&self, path: &Path) -> Result<ResumeRecord, ParseError> {
        let doc = reader::load_path(path)?;
        info!(path = %path.display(), format = doc.format.as_str(), "parsing resume");
        self.parse_document(&doc).await
    }

    /// Parses one resume file, trusting `format` over detection when given.
    /// Used for files with missing or misleading extensions.
    pub async fn parse_path_as(
        &self,
        path: &Path,
        format: Option<DocumentFormat>,
    ) -> Result<ResumeRecord, ParseError> {
        match format {
            None => self.parse_path(path).await,
            Some(format) => {
                let bytes = std::fs::read(path)?;
                info!(path = %path.display(), format = format.as_str(), "parsing resume");
                self.parse_bytes(bytes, format).await
            }
        }
    }

    /// Parses resume bytes with a declared format.
    pub async fn parse_bytes(
        &self,
        bytes: Vec<u8>,
        format: DocumentFormat,
    ) -> Result<ResumeRecord, ParseError> {
        self.parse_document(&RawDocument { bytes, format }).await
    }

    async fn parse_document(&self, doc: &RawDocument) -> Result<ResumeRecord, ParseError> {
        let text = reader::read_document(doc)?;
        self.parse_text(&text).await
    }

    /// Parses already-extracted text. An empty document short-circuits to an
    /// empty-but-valid record without spending an LLM call.
    pub async fn parse_text(&self, text: &ExtractedText) -> Result<ResumeRecord, ParseError> {
        if text.is_empty() {
            info!("document is empty, returning default record");
            return Ok(ResumeRecord::default());
        }

        let entities = self.tagger.tag(text)?;
        let resolved = self.resolver.resolve(text, &entities).await?;
        Ok(assemble(resolved, &entities))
    }
}

/// Parses a batch of files in parallel, at most `max_in_flight` at a time.
/// A declared `format` overrides per-file detection when given.
///
/// Results come back in input order; one document failing, or even panicking
/// inside a parser backend, leaves the others unaffected.
pub async fn parse_batch(
    parser: &ResumeParser,
    paths: Vec<PathBuf>,
    max_in_flight: usize,
    format: Option<DocumentFormat>,
) -> Vec<(PathBuf, Result<ResumeRecord, ParseError>)> {
    let limiter = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut tasks = Vec::with_capacity(paths.len());

    for path in paths {
        let parser = parser.clone();
        let limiter = Arc::clone(&limiter);
        let task_path = path.clone();
        let handle = tokio::spawn(async move {
            // Semaphore is never closed, acquire cannot fail.
            let _permit = limiter.acquire().await.expect("limiter closed");
            parser.parse_path_as(&task_path, format).await
        });
        tasks.push((path, handle));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for (path, handle) in tasks {
        // A panicked task (document parsers can panic on hostile input)
        // becomes that document's error instead of taking down the batch.
        let result = match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(ParseError::Internal(anyhow::anyhow!(
                "parse task panicked: {join_error}"
            ))),
        };
        if let Err(e) = &result {
            if e.is_fatal() {
                warn!(path = %path.display(), "parse failed: {e}");
            }
        }
        results.push((path, result));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::entities::Entity;
    use crate::models::Contact;
    use crate::resolver::ResolvedFields;

    struct StubResolver {
        calls: AtomicU32,
        fields: ResolvedFields,
    }

    impl StubResolver {
        fn returning(fields: ResolvedFields) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fields,
            }
        }
    }

    #[async_trait]
    impl FieldResolver for StubResolver {
        async fn resolve(
            &self,
            _text: &ExtractedText,
            _entities: &[Entity],
        ) -> Result<ResolvedFields, ParseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.fields.clone())
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl FieldResolver for FailingResolver {
        async fn resolve(
            &self,
            _text: &ExtractedText,
            _entities: &[Entity],
        ) -> Result<ResolvedFields, ParseError> {
            Err(ParseError::RateLimited { retries: 3 })
        }
    }

    fn parser_with(resolver: Arc<dyn FieldResolver>) -> ResumeParser {
        ResumeParser::with_components(Arc::new(RuleTagger::new(None).unwrap()), resolver)
    }

    fn text(content: &str) -> ExtractedText {
        ExtractedText {
            text: content.to_string(),
            blocks: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_text_yields_default_record_without_resolver_call() {
        let resolver = Arc::new(StubResolver::returning(ResolvedFields::default()));
        let parser = parser_with(resolver.clone());

        let record = parser.parse_text(&text("   \n  ")).await.unwrap();
        assert_eq!(record, ResumeRecord::default());
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolved_fields_and_hints_are_merged() {
        let resolver = Arc::new(StubResolver::returning(ResolvedFields {
            contact: Some(Contact {
                name: "Jane A. Doe".to_string(),
                ..Contact::default()
            }),
            skills: Some(vec!["Rust".to_string()]),
            ..ResolvedFields::default()
        }));
        let parser = parser_with(resolver);

        let record = parser
            .parse_text(&text("Jane Doe\njane@example.com"))
            .await
            .unwrap();

        // LLM name wins; tagged email fills the blank field.
        assert_eq!(record.contact.name, "Jane A. Doe");
        assert_eq!(record.contact.email, "jane@example.com");
        assert_eq!(record.skills, vec!["Rust"]);
    }

    #[tokio::test]
    async fn test_resolver_failure_fails_only_that_parse() {
        let parser = parser_with(Arc::new(FailingResolver));
        let err = parser.parse_text(&text("Jane Doe")).await.unwrap_err();
        assert!(matches!(err, ParseError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_batch_isolates_failures_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.docx");
        std::fs::write(&good, docx_fixture("Jane Doe")).unwrap();
        let missing = dir.path().join("missing.pdf");
        let unsupported = dir.path().join("notes.txt");
        std::fs::write(&unsupported, "plain text").unwrap();

        let parser = parser_with(Arc::new(StubResolver::returning(ResolvedFields::default())));
        let results = parse_batch(
            &parser,
            vec![good.clone(), missing.clone(), unsupported.clone()],
            2,
            None,
        )
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, good);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(ParseError::Io(_))));
        assert!(matches!(
            results[2].1,
            Err(ParseError::UnsupportedFormat(_))
        ));
    }

    /// Tagger that panics on a marker word, standing in for a document
    /// backend blowing up on hostile input.
    struct PanickingTagger;

    impl EntityTagger for PanickingTagger {
        fn tag(&self, text: &ExtractedText) -> Result<Vec<Entity>, ParseError> {
            if text.text.contains("Hostile") {
                panic!("tagger blew up on this document");
            }
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_batch_survives_panicking_document() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.docx");
        std::fs::write(&good, docx_fixture("Jane Doe")).unwrap();
        let hostile = dir.path().join("hostile.docx");
        std::fs::write(&hostile, docx_fixture("Hostile Input")).unwrap();

        let parser = ResumeParser::with_components(
            Arc::new(PanickingTagger),
            Arc::new(StubResolver::returning(ResolvedFields::default())),
        );
        let results = parse_batch(&parser, vec![good.clone(), hostile.clone()], 2, None).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, good);
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, hostile);
        assert!(matches!(results[1].1, Err(ParseError::Internal(_))));
    }

    #[tokio::test]
    async fn test_batch_with_declared_format_ignores_extension() {
        let dir = tempfile::tempdir().unwrap();
        let odd_name = dir.path().join("resume.bin");
        std::fs::write(&odd_name, docx_fixture("Jane Doe")).unwrap();

        let parser = parser_with(Arc::new(StubResolver::returning(ResolvedFields::default())));
        let results = parse_batch(
            &parser,
            vec![odd_name],
            2,
            Some(DocumentFormat::Docx),
        )
        .await;

        assert_eq!(results.len(), 1);
        assert!(results[0].1.is_ok());
    }

    /// Minimal one-paragraph DOCX fixture.
    fn docx_fixture(content: &str) -> Vec<u8> {
        use std::io::Write;
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{content}</w:t></w:r></w:p></w:body></w:document>"#
        );
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }
}
