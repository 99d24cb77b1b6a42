// src/extractors/blocks.rs

use crate::extractors::normalize::NormalizedText;
use crate::extractors::numbers;
use crate::report::models::Category;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default backward scan distance (in bytes of normalized text) for a
/// revenue token preceding a category header. Tuned against the observed
/// "Subscriber Counts v2" family; override through `LocatorConfig` rather
/// than relying on it generalizing.
pub const DEFAULT_LOOKBACK_WINDOW: usize = 300;

/// Default forward scan distance for the alternate layout where the revenue
/// token trails the header row.
pub const DEFAULT_LOOKAHEAD_WINDOW: usize = 120;

// Category header, e.g.:
//   Customer Status ,"ACT","Active residential","3,727","3,727"
// Quotes may be present or absent, and fields may be separated by commas,
// spaces, or both. Group 3 is the subscriber count, group 4 the active
// count; the active count is the authoritative per-block figure.
static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)Customer Status\s*"?\s*,?\s*"?(ACT|COM|VIP)"?\s*,?\s*"?(Active residential|Active Commercial|VIP)"?\s*,?\s*"?([0-9][0-9,]*)"?\s*,?\s*"?([0-9][0-9,]*)"?"#,
    )
    .expect("Failed to compile HEADER_RE")
});

// A currency-prefixed numeric token, e.g. "$308,445.88".
static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([0-9][0-9,.()-]*)").expect("Failed to compile CURRENCY_RE"));

// Used to spot an intervening header between a candidate revenue token and
// the block it would be attributed to.
static HEADER_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Customer Status").expect("Failed to compile HEADER_MARKER_RE"));

/// Scan-window sizes for associating a revenue token with a header.
#[derive(Debug, Clone, Copy)]
pub struct LocatorConfig {
    pub lookback_window: usize,
    pub lookahead_window: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            lookback_window: DEFAULT_LOOKBACK_WINDOW,
            lookahead_window: DEFAULT_LOOKAHEAD_WINDOW,
        }
    }
}

/// One located occurrence of a category header with its associated fields.
/// The same category may appear in several blocks; callers sum them.
#[derive(Debug, Clone)]
pub struct BlockMatch {
    pub category: Category,
    pub active_count: u64,
    pub amount: f64,
    pub start: usize,
    pub end: usize,
}

/// Where the report revision places each block's revenue token relative to
/// its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountPlacement {
    BeforeHeader,
    AfterHeader,
}

struct HeaderMatch {
    category: Category,
    active_count: u64,
    start: usize,
    end: usize,
}

pub struct BlockLocator {
    config: LocatorConfig,
}

impl BlockLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Finds every category block in the normalized text and resolves each
    /// block's revenue amount. An unparsable active count skips the block;
    /// an unparsable or absent amount contributes 0.0 — neither poisons the
    /// rest of the document.
    pub fn locate(&self, text: &NormalizedText) -> Vec<BlockMatch> {
        let compact = text.as_str();

        let mut headers = Vec::new();
        for caps in HEADER_RE.captures_iter(compact) {
            let whole = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let category = match Category::from_code(&caps[1]) {
                Some(c) => c,
                None => continue, // unreachable given the alternation, but cheap to guard
            };
            let active_count = match numbers::parse_count(&caps[4]) {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(
                        "Skipping {} block at offset {}: {}",
                        category,
                        whole.start(),
                        e
                    );
                    continue;
                }
            };
            headers.push(HeaderMatch {
                category,
                active_count,
                start: whole.start(),
                end: whole.end(),
            });
        }

        if headers.is_empty() {
            tracing::warn!("No category blocks located in document text");
            return Vec::new();
        }

        // Revenue placement varies between report revisions but is uniform
        // within one document, so detect it once from the first header.
        let placement = self.detect_placement(compact, &headers[0]);
        tracing::debug!(
            "Located {} category header(s), revenue placement {:?}",
            headers.len(),
            placement
        );

        let mut blocks = Vec::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            let next_start = headers
                .get(i + 1)
                .map(|h| h.start)
                .unwrap_or(compact.len());
            let token = match placement {
                AmountPlacement::BeforeHeader => self.preceding_amount(compact, header.start),
                AmountPlacement::AfterHeader => {
                    self.trailing_amount(compact, header.end, next_start)
                }
            };
            let amount = match token {
                Some(tok) => numbers::parse_amount(&tok).unwrap_or_else(|e| {
                    tracing::warn!(
                        "Unparsable revenue token near {} block at offset {}: {}",
                        header.category,
                        header.start,
                        e
                    );
                    0.0
                }),
                None => {
                    tracing::debug!(
                        "No revenue token found for {} block at offset {}",
                        header.category,
                        header.start
                    );
                    0.0
                }
            };
            blocks.push(BlockMatch {
                category: header.category,
                active_count: header.active_count,
                amount,
                start: header.start,
                end: header.end,
            });
        }
        blocks
    }

    /// Policy choice: the amount-before layout is the primary observed
    /// family and wins every ambiguous case. Only when the first header has
    /// no revenue token within its lookback window, but one trails it before
    /// the next header marker, is the document treated as amount-after.
    fn detect_placement(&self, compact: &str, first: &HeaderMatch) -> AmountPlacement {
        if self.preceding_amount(compact, first.start).is_some() {
            return AmountPlacement::BeforeHeader;
        }
        let next_marker = HEADER_MARKER_RE
            .find_at(compact, first.end)
            .map(|m| m.start())
            .unwrap_or(compact.len());
        if self
            .trailing_amount(compact, first.end, next_marker)
            .is_some()
        {
            return AmountPlacement::AfterHeader;
        }
        AmountPlacement::BeforeHeader
    }

    /// Last currency token within the bounded window before the header —
    /// the match closest to the header wins the tie-break.
    fn preceding_amount(&self, compact: &str, header_start: usize) -> Option<String> {
        let mut lo = header_start.saturating_sub(self.config.lookback_window);
        while lo > 0 && !compact.is_char_boundary(lo) {
            lo -= 1;
        }
        let window = &compact[lo..header_start];
        CURRENCY_RE
            .captures_iter(window)
            .last()
            .map(|caps| caps[1].to_string())
    }

    /// First currency token after the header, bounded by the lookahead
    /// window and by the start of the next header.
    fn trailing_amount(&self, compact: &str, header_end: usize, next_start: usize) -> Option<String> {
        let mut hi = header_end
            .saturating_add(self.config.lookahead_window)
            .min(next_start)
            .min(compact.len());
        while hi < compact.len() && !compact.is_char_boundary(hi) {
            hi += 1;
        }
        if hi <= header_end {
            return None;
        }
        let window = &compact[header_end..hi];
        CURRENCY_RE
            .captures(window)
            .map(|caps| caps[1].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::normalize::normalize;

    fn locate(raw: &str) -> Vec<BlockMatch> {
        BlockLocator::new(LocatorConfig::default()).locate(&normalize(raw))
    }

    #[test]
    fn locates_quoted_blocks_with_preceding_amounts() {
        let raw = r#"
            $308,445.88 Customer Status ,"ACT","Active residential","3,727","3,727"
            $70,996.16 Customer Status ,"COM","Active Commercial","500","500"
            $1,994.18 Customer Status ,"VIP","VIP","12","12"
        "#;
        let blocks = locate(raw);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].category, Category::Act);
        assert_eq!(blocks[0].active_count, 3727);
        assert_eq!(blocks[0].amount, 308_445.88);
        assert_eq!(blocks[1].category, Category::Com);
        assert_eq!(blocks[1].amount, 70_996.16);
        assert_eq!(blocks[2].category, Category::Vip);
        assert_eq!(blocks[2].amount, 1_994.18);
        // Match spans come back in scan order
        assert!(blocks[0].start < blocks[0].end);
        assert!(blocks[0].end <= blocks[1].start);
    }

    #[test]
    fn tolerates_unquoted_space_separated_fields() {
        let raw = "$500.00 Customer Status ACT Active residential 120 118";
        let blocks = locate(raw);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].category, Category::Act);
        // The second numeric field is the authoritative active count
        assert_eq!(blocks[0].active_count, 118);
        assert_eq!(blocks[0].amount, 500.00);
    }

    #[test]
    fn lookback_picks_the_token_closest_to_the_header() {
        let raw = r#"$10.00 misc charge $308,445.88 Customer Status ,"ACT","Active residential","3,727","3,727""#;
        let blocks = locate(raw);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].amount, 308_445.88);
    }

    #[test]
    fn lookback_window_is_bounded() {
        let padding = "x ".repeat(400);
        let raw = format!(
            r#"$99.99 {}Customer Status ,"VIP","VIP","12","12""#,
            padding
        );
        let blocks = locate(&raw);
        assert_eq!(blocks.len(), 1);
        // The only currency token sits outside the 300-char window
        assert_eq!(blocks[0].amount, 0.0);
    }

    #[test]
    fn repeated_categories_yield_one_block_each() {
        let raw = r#"
            $100.00 Customer Status ,"ACT","Active residential","100","100"
            $50.00 Customer Status ,"ACT","Active residential","50","50"
        "#;
        let blocks = locate(raw);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.category == Category::Act));
        assert_eq!(blocks[0].active_count, 100);
        assert_eq!(blocks[1].active_count, 50);
    }

    #[test]
    fn detects_trailing_amount_layout() {
        let raw = r#"
            Customer Status ,"ACT","Active residential","3,727","3,727" $308,445.88
            Customer Status ,"COM","Active Commercial","500","500" $70,996.16
            Customer Status ,"VIP","VIP","12","12" $1,994.18
        "#;
        let blocks = locate(raw);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].amount, 308_445.88);
        assert_eq!(blocks[1].amount, 70_996.16);
        assert_eq!(blocks[2].amount, 1_994.18);
    }

    #[test]
    fn preceding_amount_wins_when_both_placements_match() {
        // In the amount-before family every header is trailed by the *next*
        // block's token; the before-placement must win or attributions
        // shift by one block.
        let raw = r#"
            $100.00 Customer Status ,"ACT","Active residential","10","10"
            $200.00 Customer Status ,"COM","Active Commercial","20","20"
        "#;
        let blocks = locate(raw);
        assert_eq!(blocks[0].amount, 100.00);
        assert_eq!(blocks[1].amount, 200.00);
    }

    #[test]
    fn missing_currency_token_contributes_zero() {
        let raw = r#"Customer Status ,"COM","Active Commercial","500","500""#;
        let blocks = locate(raw);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].amount, 0.0);
    }

    #[test]
    fn empty_document_yields_no_blocks() {
        assert!(locate("no subscriber data here").is_empty());
    }
}
