// src/extractors/normalize.rs
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RUN_RE"));

/// Whitespace-collapsed single-line view of a report's extracted text.
///
/// Invariant: contains no run of whitespace other than a single space, and
/// preserves the original token order. Field-delimiting punctuation (quotes,
/// commas, dollar signs, parentheses) passes through untouched, so the
/// locator patterns can scan it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Replaces every maximal run of whitespace (including newlines) with a
/// single space. Pure and deterministic; `normalize(normalize(x))` equals
/// `normalize(x)`.
pub fn normalize(raw: &str) -> NormalizedText {
    NormalizedText(WHITESPACE_RUN_RE.replace_all(raw, " ").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs_to_single_spaces() {
        let raw = "Customer   Status\n\t,\"ACT\"  ,\r\n\"3,727\"";
        let text = normalize(raw);
        assert_eq!(text.as_str(), "Customer Status ,\"ACT\" , \"3,727\"");
    }

    #[test]
    fn is_idempotent() {
        let raw = "  a \n b\t\tc  ";
        let once = normalize(raw);
        let twice = normalize(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn preserves_delimiter_punctuation() {
        let text = normalize("$1,234.50 (\"VIP\")");
        assert_eq!(text.as_str(), "$1,234.50 (\"VIP\")");
    }
}
