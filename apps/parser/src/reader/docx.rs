//! DOCX text extraction.
//!
//! A DOCX file is a ZIP archive whose main content lives in
//! `word/document.xml`. The XML is streamed with `quick-xml`, collecting
//! `w:t` runs into paragraphs. Table cell text is flattened into one block
//! per table, in body order, which matches how resume tables are usually
//! just layout for skill lists.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use super::{BlockKind, ExtractedText, TextBuilder};
use crate::errors::ParseError;

pub fn extract(bytes: &[u8]) -> Result<ExtractedText, ParseError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ParseError::CorruptDocument(format!("docx: not a zip archive: {e}")))?;

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ParseError::CorruptDocument(format!("docx: missing word/document.xml: {e}")))?
        .read_to_string(&mut document_xml)
        .map_err(|e| ParseError::CorruptDocument(format!("docx: unreadable document.xml: {e}")))?;

    let extracted = text_from_document_xml(&document_xml)?;
    debug!(
        chars = extracted.text.len(),
        blocks = extracted.blocks.len(),
        "extracted text from DOCX"
    );
    Ok(extracted)
}

/// Walks the WordprocessingML body and accumulates paragraph and table
/// blocks. Only `w:t` content is text; tabs and line breaks inside a run
/// become whitespace.
fn text_from_document_xml(xml: &str) -> Result<ExtractedText, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut builder = TextBuilder::default();

    let mut paragraph = String::new();
    let mut table_cells: Vec<String> = Vec::new();
    let mut table_depth = 0usize;
    let mut in_text_run = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ParseError::CorruptDocument(format!("docx: invalid xml: {e}")))?;

        match event {
            Event::Start(ref e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Event::Empty(ref e) => match e.name().as_ref() {
                b"w:tab" => paragraph.push(' '),
                b"w:br" => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(ref e) => {
                if in_text_run {
                    let run = e
                        .unescape()
                        .map_err(|e| ParseError::CorruptDocument(format!("docx: bad text run: {e}")))?;
                    paragraph.push_str(&run);
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    let content = std::mem::take(&mut paragraph);
                    if table_depth > 0 {
                        if !content.trim().is_empty() {
                            table_cells.push(content.trim().to_string());
                        }
                    } else {
                        builder.push_block(BlockKind::Paragraph, &content);
                    }
                }
                b"w:tbl" => {
                    table_depth = table_depth.saturating_sub(1);
                    if table_depth == 0 {
                        builder.push_block(BlockKind::Table, &table_cells.join(" "));
                        table_cells.clear();
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(builder.finish())
}
