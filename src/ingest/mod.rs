// src/ingest/mod.rs
use std::fs;
use std::path::Path;

use crate::utils::error::IngestError;

/// One uploaded report, reduced to plain text and a display name. The name
/// doubles as the period fallback label downstream.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub name: String,
    pub text: String,
}

/// Minimum number of non-whitespace characters we expect from a "real" text
/// PDF. Below this threshold we treat it as scanned / image-only, which is
/// out of scope (no OCR).
const MIN_TEXT_CHARS: usize = 30;

/// Reads one input file into a `RawDocument`. `.pdf` inputs go through the
/// PDF text layer; anything else is read as plain text. A failure here only
/// fails this document — the batch driver continues with the rest.
pub fn read_document(path: &Path) -> Result<RawDocument, IngestError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();

    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    let text = if is_pdf {
        let bytes = fs::read(path)?;
        pdf_text_from_bytes(&name, &bytes)?
    } else {
        fs::read_to_string(path)?
    };

    tracing::debug!("Read {} ({} bytes of text)", name, text.len());
    Ok(RawDocument { name, text })
}

/// Extracts the text layer from raw PDF bytes.
fn pdf_text_from_bytes(name: &str, bytes: &[u8]) -> Result<String, IngestError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| IngestError::SourceReadFailure(format!("{}: {}", name, e)))?;

    if text.chars().filter(|c| !c.is_whitespace()).count() < MIN_TEXT_CHARS {
        return Err(IngestError::SourceReadFailure(format!(
            "{}: no usable text layer (scanned image?)",
            name
        )));
    }
    Ok(text)
}
