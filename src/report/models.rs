// src/report/models.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Billing-status classification used by the "Subscriber Counts v2" report.
/// The set is closed: every report groups its subscribers under exactly
/// these three codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "ACT")]
    Act,
    #[serde(rename = "COM")]
    Com,
    #[serde(rename = "VIP")]
    Vip,
}

impl Category {
    /// All known categories, in report order.
    pub const ALL: [Category; 3] = [Category::Act, Category::Com, Category::Vip];

    /// The code printed in the report's header fields.
    pub fn code(&self) -> &'static str {
        match self {
            Category::Act => "ACT",
            Category::Com => "COM",
            Category::Vip => "VIP",
        }
    }

    /// The human label the report pairs with each code.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Act => "Active residential",
            Category::Com => "Active Commercial",
            Category::Vip => "VIP",
        }
    }

    pub fn from_code(code: &str) -> Option<Category> {
        match code.to_uppercase().as_str() {
            "ACT" => Some(Category::Act),
            "COM" => Some(Category::Com),
            "VIP" => Some(Category::Vip),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Accumulated count and revenue for one category. Mutable while blocks are
/// being summed, frozen once the Record is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub active_count: u64,
    pub amount: f64,
}

impl CategoryTotal {
    /// Revenue per active customer (ARPU). Zero when there are no customers.
    pub fn rate_per_customer(&self) -> f64 {
        if self.active_count == 0 {
            0.0
        } else {
            self.amount / self.active_count as f64
        }
    }
}

/// Document-level totals. When read from an explicit grand-total line the
/// values are authoritative and `subscriber_count` is populated; when
/// computed as a fallback sum over the categories, `subscriber_count` is
/// `None` and count/amount equal the sum of the parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrandTotal {
    pub subscriber_count: Option<u64>,
    pub active_count: u64,
    pub amount: f64,
}

impl GrandTotal {
    pub fn rate_per_customer(&self) -> f64 {
        if self.active_count == 0 {
            0.0
        } else {
            self.amount / self.active_count as f64
        }
    }
}

/// Finalized extraction result for one report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// ISO date when parsed from the report, otherwise the fallback label
    /// (typically the filename).
    pub period: String,
    pub grand: GrandTotal,
    /// Always carries all three categories, zeros for any that were absent.
    pub by_category: BTreeMap<Category, CategoryTotal>,
}

impl Record {
    /// Sum of per-category active counts, for reconciliation against an
    /// explicit grand-total line.
    pub fn category_active_sum(&self) -> u64 {
        self.by_category.values().map(|t| t.active_count).sum()
    }

    pub fn category_amount_sum(&self) -> f64 {
        self.by_category.values().map(|t| t.amount).sum()
    }
}

/// An ordered time series of Records.
///
/// Ordering is lexical on the period string, which matches chronological
/// order when all periods are ISO dates. Mixing ISO dates with opaque
/// fallback labels is permitted but their relative order is unspecified.
#[derive(Debug, Default)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and re-sorts the series by period.
    pub fn insert(&mut self, record: Record) {
        self.records.push(record);
        self.records.sort_by(|a, b| a.period.cmp(&b.period));
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The most recent record, i.e. the last after sorting.
    pub fn latest(&self) -> Option<&Record> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(period: &str, active: u64) -> Record {
        Record {
            period: period.to_string(),
            grand: GrandTotal {
                subscriber_count: None,
                active_count: active,
                amount: 0.0,
            },
            by_category: BTreeMap::new(),
        }
    }

    #[test]
    fn record_set_sorts_iso_periods_chronologically() {
        let mut set = RecordSet::new();
        set.insert(record("2024-03-31", 3));
        set.insert(record("2024-01-31", 1));
        set.insert(record("2024-02-29", 2));

        let periods: Vec<&str> = set.records().iter().map(|r| r.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-01-31", "2024-02-29", "2024-03-31"]);
        assert_eq!(set.latest().unwrap().grand.active_count, 3);
    }

    #[test]
    fn rate_per_customer_is_zero_without_customers() {
        let empty = CategoryTotal {
            active_count: 0,
            amount: 99.0,
        };
        assert_eq!(empty.rate_per_customer(), 0.0);

        let grand = GrandTotal {
            subscriber_count: None,
            active_count: 4,
            amount: 100.0,
        };
        assert_eq!(grand.rate_per_customer(), 25.0);
    }

    #[test]
    fn category_codes_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_code(cat.code()), Some(cat));
        }
        assert_eq!(Category::from_code("vip"), Some(Category::Vip));
        assert_eq!(Category::from_code("UNKNOWN"), None);
    }
}
