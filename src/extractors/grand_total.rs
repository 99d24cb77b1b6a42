// src/extractors/grand_total.rs

use crate::extractors::numbers;
use crate::report::models::GrandTotal;
use once_cell::sync::Lazy;
use regex::Regex;

/// One known grand-total line layout. Implementations attempt to read their
/// layout from the normalized text, yielding a value or nothing — a
/// malformed line is "nothing", so the caller can fall back to the computed
/// sum instead of failing the document.
pub trait GrandTotalLayout: Sync {
    fn name(&self) -> &'static str;
    fn try_extract(&self, text: &str) -> Option<GrandTotal>;
}

// "Total: 4,309 4,239 $381,436.22"
static LABEL_LEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Total\s*:\s*([0-9,]+)\s+([0-9,]+)\s+\$([0-9,.()-]+)")
        .expect("Failed to compile LABEL_LEADING_RE")
});

// "$381,436.22 4,309 4,239 Total"
static AMOUNT_LEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$([0-9,.()-]+)\s+([0-9,]+)\s+([0-9,]+)\s+Total\b")
        .expect("Failed to compile AMOUNT_LEADING_RE")
});

/// Layout with the "Total:" label first, then subscriber count, active
/// count, and the amount. This is the primary observed layout.
pub struct LabelLeadingLayout;

impl GrandTotalLayout for LabelLeadingLayout {
    fn name(&self) -> &'static str {
        "label-leading"
    }

    fn try_extract(&self, text: &str) -> Option<GrandTotal> {
        let caps = LABEL_LEADING_RE.captures(text)?;
        build_total(&caps[1], &caps[2], &caps[3], self.name())
    }
}

/// Alternate layout leading with the amount and trailing with the label.
pub struct AmountLeadingLayout;

impl GrandTotalLayout for AmountLeadingLayout {
    fn name(&self) -> &'static str {
        "amount-leading"
    }

    fn try_extract(&self, text: &str) -> Option<GrandTotal> {
        let caps = AMOUNT_LEADING_RE.captures(text)?;
        build_total(&caps[2], &caps[3], &caps[1], self.name())
    }
}

// Layouts are tried in this order; the primary layout must not be shadowed
// by the alternate.
static LAYOUTS: &[&dyn GrandTotalLayout] = &[&LabelLeadingLayout, &AmountLeadingLayout];

/// Tries each known grand-total layout in sequence; the first successfully
/// matched layout wins. Returns `None` when no layout matches or the
/// matched line is unparsable.
pub fn locate_grand_total(text: &str) -> Option<GrandTotal> {
    for layout in LAYOUTS {
        if let Some(total) = layout.try_extract(text) {
            tracing::debug!("Grand total matched by {} layout", layout.name());
            return Some(total);
        }
    }
    tracing::debug!("No explicit grand-total line matched");
    None
}

fn build_total(subs: &str, act: &str, amt: &str, layout: &'static str) -> Option<GrandTotal> {
    let subscriber_count = numbers::parse_count(subs);
    let active_count = numbers::parse_count(act);
    let amount = numbers::parse_amount(amt);
    match (subscriber_count, active_count, amount) {
        (Ok(subs), Ok(act), Ok(amt)) => Some(GrandTotal {
            subscriber_count: Some(subs),
            active_count: act,
            amount: amt,
        }),
        _ => {
            tracing::warn!(
                "Grand-total line matched {} layout but failed to parse, degrading to computed sum",
                layout
            );
            None
        }
    }
}
