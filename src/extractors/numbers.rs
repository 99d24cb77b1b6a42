// src/extractors/numbers.rs
use crate::utils::error::ExtractError;

/// Parses a locale-formatted non-negative integer token like "3,727".
/// Thousands separators are stripped; any other residue is an error — an
/// empty or junk token must never silently become zero.
pub fn parse_count(token: &str) -> Result<u64, ExtractError> {
    let cleaned = token.trim().replace(',', "");
    if cleaned.is_empty() {
        return Err(ExtractError::MalformedNumber(token.to_string()));
    }
    cleaned
        .parse::<u64>()
        .map_err(|_| ExtractError::MalformedNumber(token.to_string()))
}

/// Parses a locale-formatted currency token like "1,234.50" or "(500.00)".
/// A parenthesized token denotes a negative value, as the report prints
/// credits.
pub fn parse_amount(token: &str) -> Result<f64, ExtractError> {
    let cleaned = token
        .trim()
        .replace(',', "")
        .replace('(', "-")
        .replace(')', "");
    if cleaned.is_empty() {
        return Err(ExtractError::MalformedNumber(token.to_string()));
    }
    cleaned
        .parse::<f64>()
        .map_err(|_| ExtractError::MalformedNumber(token.to_string()))
}
