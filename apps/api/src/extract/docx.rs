//! Word document extraction. Reads `word/document.xml` and emits every
//! body-level paragraph followed by one line break. Tables, text boxes,
//! headers and footers are not extracted.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::{DocumentKind, ExtractError};

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract(data: &[u8]) -> Result<String, ExtractError> {
    let malformed = |reason: String| ExtractError::Malformed {
        kind: DocumentKind::WordDocument,
        reason,
    };
    let xml = read_document_part(data).map_err(malformed)?;
    paragraphs_text(&xml).map_err(malformed)
}

fn read_document_part(data: &[u8]) -> Result<String, String> {
    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(|e| e.to_string())?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| format!("{DOCUMENT_PART}: {e}"))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml).map_err(|e| e.to_string())?;
    Ok(xml)
}

/// Walks the document XML and concatenates body-level paragraphs.
fn paragraphs_text(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();

    let mut depth = 0usize;
    // Depth at which direct children of <w:body> sit.
    let mut body_depth: Option<usize> = None;
    let mut paragraph: Option<String> = None;
    // Open <w:txbxContent> elements inside the current paragraph.
    let mut text_box = 0usize;
    let mut run = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML error at byte {}: {e}", reader.buffer_position()))?;

        match event {
            Event::Start(e) => {
                match e.name().as_ref() {
                    b"w:body" => body_depth = Some(depth + 1),
                    b"w:p" if paragraph.is_none() && body_depth == Some(depth) => {
                        paragraph = Some(String::new());
                    }
                    b"w:txbxContent" if paragraph.is_some() => text_box += 1,
                    b"w:r" if paragraph.is_some() && text_box == 0 => run += 1,
                    b"w:t" if paragraph.is_some() && text_box == 0 => in_text = true,
                    _ => {}
                }
                depth += 1;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match e.name().as_ref() {
                    b"w:p" if body_depth == Some(depth) => {
                        if let Some(text) = paragraph.take() {
                            out.push_str(&text);
                            out.push('\n');
                        }
                        run = 0;
                    }
                    b"w:txbxContent" if text_box > 0 => text_box -= 1,
                    b"w:r" if text_box == 0 => run = run.saturating_sub(1),
                    b"w:t" => in_text = false,
                    b"w:body" => body_depth = None,
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let in_run = paragraph.is_some() && text_box == 0 && run > 0;
                match e.name().as_ref() {
                    b"w:p" if paragraph.is_none() && body_depth == Some(depth) => out.push('\n'),
                    b"w:tab" if in_run => push_to(&mut paragraph, "\t"),
                    b"w:br" | b"w:cr" if in_run => push_to(&mut paragraph, "\n"),
                    _ => {}
                }
            }
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                push_to(&mut paragraph, &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

fn push_to(paragraph: &mut Option<String>, text: &str) {
    if let Some(p) = paragraph.as_mut() {
        p.push_str(text);
    }
}
