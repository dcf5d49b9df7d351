//! PDF text extraction via the `pdf-extract` crate.

use tracing::debug;

use super::{BlockKind, ExtractedText, TextBuilder};
use crate::errors::ParseError;

/// Extracts text from PDF bytes. The library flattens layout to plain text;
/// blank-line runs are treated as paragraph boundaries.
pub fn extract(bytes: &[u8]) -> Result<ExtractedText, ParseError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ParseError::CorruptDocument(format!("pdf: {e}")))?;

    let extracted = paragraphs_from_plain_text(&text);
    debug!(
        chars = extracted.text.len(),
        blocks = extracted.blocks.len(),
        "extracted text from PDF"
    );
    Ok(extracted)
}

/// Splits flattened text into paragraph blocks on blank-line runs.
pub(crate) fn paragraphs_from_plain_text(text: &str) -> ExtractedText {
    let normalized = text.replace("\r\n", "\n");
    let mut builder = TextBuilder::default();
    for paragraph in normalized.split("\n\n") {
        builder.push_block(BlockKind::Paragraph, paragraph);
    }
    builder.finish()
}
