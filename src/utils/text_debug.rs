// src/utils/text_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;
use crate::utils::error::AppError;

/// Saves normalized report text to a file with matched spans marked inline.
/// Each span is wrapped as `<<type|...>>` so the scan positions the locator
/// saw can be inspected after a bad parse.
pub fn save_debug_text(text: &str, filename: &str, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let path = Path::new(filename);
    let mut file = File::create(path)?;

    let mut annotated = String::with_capacity(text.len() + highlights.len() * 16);
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0); // Sort by position

    let mut last_pos = 0;
    for (start, end, mark_type) in sorted_highlights {
        // Overlapping matches (e.g. a currency token inside a wider total
        // line) are dropped rather than nested
        if start < last_pos {
            continue;
        }
        if start > last_pos {
            annotated.push_str(&text[last_pos..start]);
        }
        annotated.push_str(&format!("<<{}|", mark_type));
        annotated.push_str(&text[start..end]);
        annotated.push_str(">>");
        last_pos = end;
    }
    if last_pos < text.len() {
        annotated.push_str(&text[last_pos..]);
    }
    annotated.push('\n');

    file.write_all(annotated.as_bytes())?;

    tracing::info!("Saved debug text to {}", path.display());
    Ok(())
}

/// Creates a debug dump of normalized text with locations of the given regex
/// patterns marked.
pub fn create_debug_text(text: &str, filename: &str, patterns: &[(&str, &str)]) -> Result<(), AppError> {
    use regex::Regex;

    let mut highlights = Vec::new();

    for (pattern, mark_type) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(text) {
            highlights.push((mat.start(), mat.end(), *mark_type));
        }
    }

    save_debug_text(text, filename, &highlights)
}

#[cfg(test)]
mod tests {
    #[test]
    fn marks_are_inserted_in_position_order() {
        let text = "aaa bbb ccc";
        let highlights = vec![(8usize, 11usize, "two"), (0usize, 3usize, "one")];

        let mut sorted = highlights.clone();
        sorted.sort_by_key(|h| h.0);
        assert_eq!(sorted[0].2, "one");
        assert_eq!(&text[sorted[1].0..sorted[1].1], "ccc");
    }
}
