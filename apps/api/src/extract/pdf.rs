use super::{DocumentKind, ExtractError};

/// Extracts text page by page and concatenates in page order.
pub fn extract(data: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(data).map_err(|e| {
        ExtractError::Malformed {
            kind: DocumentKind::Pdf,
            reason: e.to_string(),
        }
    })?;
    Ok(join_pages(&pages))
}

/// No separator is inserted; whatever trailing whitespace a page carries is kept.
fn join_pages(pages: &[String]) -> String {
    pages.concat()
}
