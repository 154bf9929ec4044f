//! Upload text extraction.
//!
//! Turns an uploaded file into the text handed to the classifier.
//! Supports: TXT, PDF.

use tracing::{info, warn};

use crate::error::AppError;

/// File extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf"];

/// Lowercased extension of a file name, empty when there is none.
fn file_extension(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}

/// Rejects uploads with an unsupported extension or a size over the limit.
pub fn validate_upload(
    file_name: &str,
    size: usize,
    max_file_size: usize,
) -> Result<(), AppError> {
    if size > max_file_size {
        return Err(AppError::PayloadTooLarge(format!(
            "file exceeds the {:.1} MB limit",
            max_file_size as f64 / (1024.0 * 1024.0)
        )));
    }

    let extension = file_extension(file_name);
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::Validation(format!(
            "unsupported file type: {:?} (allowed: {})",
            extension,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    Ok(())
}

/// Extracts text content from uploaded file data based on the file extension.
pub fn extract_text(file_name: &str, file_data: &[u8]) -> Result<String, AppError> {
    let extension = file_extension(file_name);

    info!("Extracting text from file: {} (type: {})", file_name, extension);

    match extension.as_str() {
        "txt" => Ok(extract_txt(file_data)),
        "pdf" => extract_pdf(file_data),
        _ => Err(AppError::Validation(format!(
            "unsupported file type: {:?}",
            extension
        ))),
    }
}

/// Decodes plain text, falling back to Latin-1 when the bytes are not valid
/// UTF-8 (legacy mail exports are commonly Latin-1 encoded).
fn extract_txt(file_data: &[u8]) -> String {
    match String::from_utf8(file_data.to_vec()) {
        Ok(text) => text,
        Err(_) => file_data.iter().map(|&b| b as char).collect(),
    }
}

/// Extracts text from a PDF file.
fn extract_pdf(file_data: &[u8]) -> Result<String, AppError> {
    let text = pdf_extract::extract_text_from_mem(file_data).map_err(|e| {
        warn!("PDF extraction failed: {}", e);
        AppError::Validation(format!("failed to extract PDF text: {}", e))
    })?;

    let cleaned: String = text
        .replace('\0', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.trim().is_empty() {
        return Err(AppError::Validation(
            "no extractable text in PDF (file may be protected or scanned)".to_string(),
        ));
    }

    info!("PDF extraction successful: {} characters", cleaned.len());
    Ok(cleaned)
}

/// Truncates text to at most `max_length` characters, cutting at the last
/// space when one falls in the final 20% of the window, and appends an
/// ellipsis. Text already within the limit is returned unchanged.
pub fn truncate_at_word_boundary(text: &str, max_length: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_length {
        return text.to_string();
    }

    let window = &chars[..max_length];
    let cut = window
        .iter()
        .rposition(|c| *c == ' ')
        .filter(|pos| *pos > max_length * 4 / 5)
        .unwrap_or(max_length);

    let mut truncated: String = window[..cut].iter().collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_extraction() {
        let content = "Prezados, segue o relatório mensal.\nAtenciosamente.".as_bytes();
        let result = extract_text("email.txt", content);
        assert!(result.is_ok());
        assert!(result.unwrap().contains("relatório"));
    }

    #[test]
    fn test_txt_latin1_fallback() {
        // "café" encoded as Latin-1: the 0xE9 byte is not valid UTF-8.
        let content: &[u8] = b"caf\xe9";
        let result = extract_text("legacy.txt", content).unwrap();
        assert_eq!(result, "café");
    }

    #[test]
    fn test_empty_txt_file() {
        let result = extract_text("empty.txt", b"");
        assert_eq!(result.unwrap(), "");
    }

    #[test]
    fn test_unsupported_extension() {
        let result = extract_text("planilha.xlsx", b"dados");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_missing_extension() {
        let result = extract_text("semextensao", b"dados");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_corrupted_pdf_is_rejected() {
        let result = extract_text("quebrado.pdf", b"not a pdf at all");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_upload_accepts_txt_within_limit() {
        assert!(validate_upload("email.txt", 1024, 10 * 1024 * 1024).is_ok());
    }

    #[test]
    fn test_validate_upload_rejects_oversized_file() {
        let result = validate_upload("email.txt", 11 * 1024 * 1024, 10 * 1024 * 1024);
        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
    }

    #[test]
    fn test_validate_upload_rejects_unknown_extension() {
        let result = validate_upload("email.docx", 100, 10 * 1024 * 1024);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_truncate_short_text_is_unchanged() {
        assert_eq!(truncate_at_word_boundary("texto curto", 200), "texto curto");
    }

    #[test]
    fn test_truncate_cuts_at_word_boundary() {
        let text = "palavra ".repeat(50);
        let truncated = truncate_at_word_boundary(&text, 100);

        assert!(truncated.ends_with("..."));
        // The cut lands on a space inside the last 20% of the window, so no
        // word is split in half.
        assert!(!truncated.trim_end_matches("...").ends_with("palavr"));
        assert!(truncated.chars().count() <= 103);
    }

    #[test]
    fn test_truncate_hard_cuts_when_no_space_is_near() {
        let text = "a".repeat(300);
        let truncated = truncate_at_word_boundary(&text, 100);
        assert_eq!(truncated.chars().count(), 103);
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let text = "ação ".repeat(100);
        let truncated = truncate_at_word_boundary(&text, 50);
        assert!(truncated.chars().count() <= 53);
    }
}
