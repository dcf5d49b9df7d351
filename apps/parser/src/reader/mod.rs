//! Document Reader — converts PDF and DOCX byte streams into plain text plus
//! block-level layout hints. Pure transforms: same bytes always yield the
//! same `ExtractedText`.

use std::path::Path;

use crate::errors::ParseError;

mod docx;
mod pdf;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detects the format from a file extension (`.pdf`, `.docx`, `.doc`).
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" | "doc" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    /// Sniffs the format from magic bytes: `%PDF` for PDF, the ZIP local
    /// file header for DOCX (a DOCX file is a ZIP archive).
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            Some(DocumentFormat::Pdf)
        } else if bytes.starts_with(b"PK\x03\x04") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

/// Raw file bytes plus detected format. Created on load, discarded once text
/// has been extracted.
#[derive(Debug)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub format: DocumentFormat,
}

/// What a block of extracted text was in the source layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Table,
}

/// A block span into `ExtractedText::text` (byte offsets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub start: usize,
    pub end: usize,
}

/// Plain text plus block metadata derived from a `RawDocument`.
/// Immutable once produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub blocks: Vec<TextBlock>,
}

impl ExtractedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// The text of one block.
    pub fn block_text(&self, block: &TextBlock) -> &str {
        &self.text[block.start..block.end]
    }
}

/// Accumulates blocks into an `ExtractedText`, joining them with single
/// newlines and recording byte offsets. Whitespace-only blocks are dropped,
/// so an empty document produces empty text rather than separator noise.
#[derive(Default)]
pub(crate) struct TextBuilder {
    text: String,
    blocks: Vec<TextBlock>,
}

impl TextBuilder {
    pub(crate) fn push_block(&mut self, kind: BlockKind, content: &str) {
        let content = content.trim();
        if content.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        let start = self.text.len();
        self.text.push_str(content);
        self.blocks.push(TextBlock {
            kind,
            start,
            end: self.text.len(),
        });
    }

    pub(crate) fn finish(self) -> ExtractedText {
        ExtractedText {
            text: self.text,
            blocks: self.blocks,
        }
    }
}

/// Loads a file and detects its format from the extension, falling back to
/// magic-byte sniffing for extensionless files.
pub fn load_path(path: &Path) -> Result<RawDocument, ParseError> {
    let bytes = std::fs::read(path)?;
    let format = DocumentFormat::from_extension(path)
        .or_else(|| DocumentFormat::sniff(&bytes))
        .ok_or_else(|| ParseError::UnsupportedFormat(path.display().to_string()))?;
    Ok(RawDocument { bytes, format })
}

/// Extracts text from a raw document. An empty document yields an
/// `ExtractedText` with empty text, not an error.
pub fn read_document(doc: &RawDocument) -> Result<ExtractedText, ParseError> {
    match doc.format {
        DocumentFormat::Pdf => pdf::extract(&doc.bytes),
        DocumentFormat::Docx => docx::extract(&doc.bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_extension(&PathBuf::from("cv.pdf")),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_extension(&PathBuf::from("cv.DOCX")),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::from_extension(&PathBuf::from("cv.doc")),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::from_extension(&PathBuf::from("cv.txt")), None);
        assert_eq!(DocumentFormat::from_extension(&PathBuf::from("cv")), None);
    }

    #[test]
    fn test_format_sniffing() {
        assert_eq!(DocumentFormat::sniff(b"%PDF-1.7 rest"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::sniff(b"PK\x03\x04rest"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::sniff(b"hello"), None);
        assert_eq!(DocumentFormat::sniff(b""), None);
    }

    #[test]
    fn test_load_path_unsupported_extension_and_bytes() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"plain text, not a resume container").unwrap();
        let err = load_path(file.path()).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_path_missing_file_is_io_error() {
        let err = load_path(&PathBuf::from("/nonexistent/resume.pdf")).unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }

    #[test]
    fn test_text_builder_offsets_and_separators() {
        let mut builder = TextBuilder::default();
        builder.push_block(BlockKind::Paragraph, "  Jane Doe  ");
        builder.push_block(BlockKind::Paragraph, "");
        builder.push_block(BlockKind::Table, "Rust Docker");
        let extracted = builder.finish();

        assert_eq!(extracted.text, "Jane Doe\nRust Docker");
        assert_eq!(extracted.blocks.len(), 2);
        assert_eq!(extracted.block_text(&extracted.blocks[0]), "Jane Doe");
        assert_eq!(extracted.block_text(&extracted.blocks[1]), "Rust Docker");
        assert_eq!(extracted.blocks[1].kind, BlockKind::Table);
    }

    #[test]
    fn test_empty_builder_yields_empty_text() {
        let extracted = TextBuilder::default().finish();
        assert!(extracted.is_empty());
        assert!(extracted.blocks.is_empty());
    }

    #[test]
    fn test_corrupt_pdf_is_corrupt_document() {
        let doc = RawDocument {
            bytes: b"%PDF-1.7 but truncated garbage".to_vec(),
            format: DocumentFormat::Pdf,
        };
        let err = read_document(&doc).unwrap_err();
        assert!(matches!(err, ParseError::CorruptDocument(_)));
    }
}
