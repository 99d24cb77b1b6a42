// src/main.rs
mod extractors;
mod ingest;
mod report;
mod storage;
mod utils;

use std::path::PathBuf;

use clap::Parser;

use extractors::blocks::{LocatorConfig, DEFAULT_LOOKAHEAD_WINDOW, DEFAULT_LOOKBACK_WINDOW};
use extractors::engine::ReportExtractor;
use extractors::normalize;
use report::models::{Category, Record, RecordSet};
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the "Subscriber Counts v2" report extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Report files to process (.pdf with a text layer, or plain text)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output directory for exported totals
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Backward scan distance (chars) for a revenue token preceding a
    /// category header
    #[arg(long, default_value_t = DEFAULT_LOOKBACK_WINDOW)]
    lookback_window: usize,

    /// Forward scan distance (chars) for a revenue token trailing a
    /// category header
    #[arg(long, default_value_t = DEFAULT_LOOKAHEAD_WINDOW)]
    lookahead_window: usize,

    /// Debug mode - save annotated normalized text for each document
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 4. Initialize the extraction engine
    let extractor = ReportExtractor::new(LocatorConfig {
        lookback_window: args.lookback_window,
        lookahead_window: args.lookahead_window,
    });

    // 5. Process each report; per-document failures never abort the batch
    let mut series = RecordSet::new();
    let mut success_count = 0;
    let mut failure_count = 0;

    for path in &args.files {
        tracing::info!("Processing report: {}", path.display());

        let doc = match ingest::read_document(path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!("Failed to read {}: {}", path.display(), e);
                failure_count += 1;
                continue;
            }
        };

        if args.debug {
            if let Err(e) = save_debug_dump(&storage, &doc) {
                tracing::warn!("Failed to create debug dump for {}: {}", doc.name, e);
            }
        }

        let record = extractor.extract_record(&doc.text, &doc.name);
        tracing::info!(
            "Extracted record for period '{}': active {}, revenue ${:.2}",
            record.period,
            record.grand.active_count,
            record.grand.amount
        );

        match storage.save_totals_csv(&record) {
            Ok(path) => tracing::info!("Saved totals CSV to: {}", path.display()),
            Err(e) => tracing::error!("Failed to save totals CSV: {}", e),
        }
        match storage.save_totals_json(&record) {
            Ok(path) => tracing::info!("Saved totals JSON to: {}", path.display()),
            Err(e) => tracing::error!("Failed to save totals JSON: {}", e),
        }
        match storage.save_record_metadata(&record) {
            Ok(path) => tracing::info!("Saved record metadata to: {}", path.display()),
            Err(e) => tracing::error!("Failed to save record metadata: {}", e),
        }

        series.insert(record);
        success_count += 1;
    }

    // 6. Export the time series when more than one report parsed
    if series.len() > 1 {
        match storage.save_series_csv(&series) {
            Ok(path) => tracing::info!("Saved time series to: {}", path.display()),
            Err(e) => tracing::error!("Failed to save time series: {}", e),
        }
    }

    // 7. Render the latest record's KPI summary
    if let Some(current) = series.latest() {
        print_summary(current);
    }

    tracing::info!(
        "Processing finished. Success: {}, Failures: {}",
        success_count,
        failure_count
    );

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "Failed to extract any records from {} report(s)",
            failure_count
        )));
    }

    Ok(())
}

fn save_debug_dump(storage: &StorageManager, doc: &ingest::RawDocument) -> Result<(), AppError> {
    let debug_dir = storage.base_dir().join("debug");
    std::fs::create_dir_all(&debug_dir)?;

    let debug_patterns = [
        (r#"(?i)Customer Status\s*"?\s*,?\s*"?(ACT|COM|VIP)"#, "header"),
        (r"\$[0-9][0-9,.()-]*", "revenue"),
        (r"(?i)Total\s*:\s*[0-9,]+\s+[0-9,]+\s+\$[0-9,.()-]+", "total"),
        (r"(?i)Date:\s*[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}", "date"),
    ];

    let dump_path = debug_dir.join(format!("{}_normalized.txt", doc.name));
    let normalized = normalize::normalize(&doc.text);
    utils::text_debug::create_debug_text(
        normalized.as_str(),
        &dump_path.to_string_lossy(),
        &debug_patterns,
    )
}

fn print_summary(record: &Record) {
    println!();
    println!("Subscriber KPI summary for {}", record.period);
    for cat in Category::ALL {
        let total = record.by_category.get(&cat).copied().unwrap_or_default();
        println!(
            "  {:<3} {:<20} active {:>7}   revenue ${:>13.2}   ARPU ${:>9.2}",
            cat.code(),
            cat.label(),
            total.active_count,
            total.amount,
            total.rate_per_customer()
        );
    }
    println!(
        "  Grand total: active {}   revenue ${:.2}   avg revenue/active ${:.2}",
        record.grand.active_count,
        record.grand.amount,
        record.grand.rate_per_customer()
    );
    if let Some(subs) = record.grand.subscriber_count {
        println!("  Subscriber count on explicit total line: {}", subs);
        let sum = record.category_active_sum();
        if sum != record.grand.active_count {
            // Explicit line is authoritative; the delta stays visible
            println!(
                "  Reconciliation delta: explicit active {} vs sum of categories {}",
                record.grand.active_count, sum
            );
        }
    }
}
