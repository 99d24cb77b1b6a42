// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::report::models::{Category, Record, RecordSet};
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self {
            base_dir: base_path,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Saves the per-category totals of one record as row-oriented CSV
    /// (category code, active count, amount, rate per customer).
    pub fn save_totals_csv(&self, record: &Record) -> Result<PathBuf, StorageError> {
        let file_path = self
            .base_dir
            .join(format!("{}_totals.csv", sanitize_label(&record.period)));

        fs::write(&file_path, totals_csv(record)).map_err(StorageError::IoError)?;

        tracing::info!("Saved totals CSV to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves the same rows in key/value form as JSON.
    pub fn save_totals_json(&self, record: &Record) -> Result<PathBuf, StorageError> {
        let file_path = self
            .base_dir
            .join(format!("{}_totals.json", sanitize_label(&record.period)));

        let rows: Vec<serde_json::Value> = Category::ALL
            .iter()
            .map(|cat| {
                let total = record.by_category.get(cat).copied().unwrap_or_default();
                serde_json::json!({
                    "category": cat.code(),
                    "active_count": total.active_count,
                    "amount": total.amount,
                    "rate_per_customer": total.rate_per_customer(),
                })
            })
            .collect();

        let json_str = serde_json::to_string_pretty(&rows)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, json_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved totals JSON to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves metadata about one record in JSON format
    pub fn save_record_metadata(&self, record: &Record) -> Result<PathBuf, StorageError> {
        let file_path = self
            .base_dir
            .join(format!("{}_meta.json", sanitize_label(&record.period)));

        let metadata = serde_json::json!({
            "period": record.period,
            "grand_subscriber_count": record.grand.subscriber_count,
            "grand_active_count": record.grand.active_count,
            "grand_amount": record.grand.amount,
            "category_active_sum": record.category_active_sum(),
            "category_amount_sum": record.category_amount_sum(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved record metadata to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves the grand-total time series across all records as CSV, one row
    /// per period in sorted order.
    pub fn save_series_csv(&self, set: &RecordSet) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join("series.csv");

        fs::write(&file_path, series_csv(set)).map_err(StorageError::IoError)?;

        tracing::info!("Saved time-series CSV to {}", file_path.display());
        Ok(file_path)
    }
}

fn totals_csv(record: &Record) -> String {
    let mut csv = String::from("category,active_count,amount,rate_per_customer\n");
    for cat in Category::ALL {
        let total = record.by_category.get(&cat).copied().unwrap_or_default();
        csv.push_str(&format!(
            "{},{},{:.2},{:.2}\n",
            cat.code(),
            total.active_count,
            total.amount,
            total.rate_per_customer()
        ));
    }
    csv
}

fn series_csv(set: &RecordSet) -> String {
    let mut csv = String::from("period,grand_active,grand_amount,avg_rate_per_customer\n");
    for record in set.records() {
        csv.push_str(&format!(
            "{},{},{:.2},{:.2}\n",
            record.period,
            record.grand.active_count,
            record.grand.amount,
            record.grand.rate_per_customer()
        ));
    }
    csv
}

/// Periods can be fallback labels (filenames, arbitrary strings); keep the
/// export filenames filesystem-safe.
fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::models::{CategoryTotal, GrandTotal};
    use std::collections::BTreeMap;

    fn sample_record() -> Record {
        let mut by_category = BTreeMap::new();
        by_category.insert(
            Category::Act,
            CategoryTotal {
                active_count: 4,
                amount: 100.0,
            },
        );
        by_category.insert(Category::Com, CategoryTotal::default());
        by_category.insert(
            Category::Vip,
            CategoryTotal {
                active_count: 2,
                amount: 50.0,
            },
        );
        Record {
            period: "2024-01-31".to_string(),
            grand: GrandTotal {
                subscriber_count: Some(6),
                active_count: 6,
                amount: 150.0,
            },
            by_category,
        }
    }

    #[test]
    fn totals_csv_has_one_row_per_category() {
        let csv = totals_csv(&sample_record());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4); // header + 3 categories
        assert_eq!(lines[0], "category,active_count,amount,rate_per_customer");
        assert_eq!(lines[1], "ACT,4,100.00,25.00");
        assert_eq!(lines[2], "COM,0,0.00,0.00");
        assert_eq!(lines[3], "VIP,2,50.00,25.00");
    }

    #[test]
    fn series_csv_lists_records_in_period_order() {
        let mut set = RecordSet::new();
        let mut second = sample_record();
        second.period = "2024-02-29".to_string();
        set.insert(second);
        set.insert(sample_record());

        let csv = series_csv(&set);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "2024-01-31,6,150.00,25.00");
        assert!(lines[2].starts_with("2024-02-29,"));
    }

    #[test]
    fn labels_are_sanitized_for_filenames() {
        assert_eq!(sanitize_label("2024-01-31"), "2024-01-31");
        assert_eq!(sanitize_label("my report (v2).pdf"), "my_report__v2_.pdf");
    }
}
