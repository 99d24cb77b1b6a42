// src/extractors/engine.rs

use std::collections::BTreeMap;

use crate::extractors::blocks::{BlockLocator, BlockMatch, LocatorConfig};
use crate::extractors::grand_total;
use crate::extractors::normalize;
use crate::extractors::period;
use crate::report::models::{Category, CategoryTotal, GrandTotal, Record};

/// The extraction engine: turns one report document's text into a finalized
/// `Record`. Pure CPU-bound text scanning, no I/O, no shared state between
/// documents.
pub struct ReportExtractor {
    locator: BlockLocator,
}

impl ReportExtractor {
    pub fn new(config: LocatorConfig) -> Self {
        Self {
            locator: BlockLocator::new(config),
        }
    }

    /// Normalizes, locates category blocks, aggregates totals, and labels
    /// the period. Degradation is handled internally: a document with no
    /// blocks yields an all-zero Record rather than an error, so a batch
    /// caller can always render something and see the absence.
    pub fn extract_record(&self, raw_text: &str, fallback_label: &str) -> Record {
        let text = normalize::normalize(raw_text);
        let blocks = self.locator.locate(&text);
        if blocks.is_empty() {
            tracing::warn!(
                "No category blocks found in '{}'; totals will be zero",
                fallback_label
            );
        }
        let (grand, by_category) = aggregate(&blocks, text.as_str());
        let period = period::extract_period(text.as_str(), fallback_label);
        tracing::debug!(
            "Built record for period '{}': active {}, amount {:.2}",
            period,
            grand.active_count,
            grand.amount
        );
        Record {
            period,
            grand,
            by_category,
        }
    }
}

/// Sums counts and amounts across every block sharing a category and
/// resolves the grand total. All three categories are always present in the
/// output (closed world), zeroed when absent. An explicit grand-total line
/// is authoritative even when it diverges from the sum of the parts; only
/// when no line matches is the grand total computed as that sum.
pub fn aggregate(
    blocks: &[BlockMatch],
    text: &str,
) -> (GrandTotal, BTreeMap<Category, CategoryTotal>) {
    let mut by_category: BTreeMap<Category, CategoryTotal> = Category::ALL
        .iter()
        .map(|c| (*c, CategoryTotal::default()))
        .collect();

    for block in blocks {
        let entry = by_category.entry(block.category).or_default();
        entry.active_count += block.active_count;
        entry.amount += block.amount;
    }

    let grand = grand_total::locate_grand_total(text).unwrap_or_else(|| GrandTotal {
        subscriber_count: None,
        active_count: by_category.values().map(|t| t.active_count).sum(),
        amount: by_category.values().map(|t| t.amount).sum(),
    });

    (grand, by_category)
}
