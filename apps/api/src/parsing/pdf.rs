use tracing::debug;

use crate::parsing::ParseError;

/// Extracts raw text from PDF bytes. Line breaks are preserved; the field
/// extractors rely on them.
///
/// `pdf_extract` can panic on malformed fonts, so the call is isolated.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ParseError> {
    let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| ParseError::Pdf("extractor panicked on malformed document".to_string()))?
        .map_err(|e| ParseError::Pdf(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    debug!(component = "parsing", chars = text.len(), "extracted PDF text");
    Ok(text)
}
