use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use caterm_categorize::{categorize_records, CategorizationSummary, KeywordCategorizer};
use caterm_core::TransactionSet;
use caterm_import::{import_documents, BatchReport};
use caterm_storage::{write_categorized, CsvStore};

use crate::config::Config;

/// Import statements into the clean store. Transactions already in the store are
/// skipped.
pub fn parse(config: &Config, files: Vec<PathBuf>, output: Option<PathBuf>) -> Result<BatchReport> {
    let files = if files.is_empty() {
        config.statements.clone()
    } else {
        files
    };
    if files.is_empty() {
        bail!("no statements to parse (pass files or set `statements` in the config)");
    }

    let store = CsvStore::new(output.unwrap_or_else(|| config.clean_transactions.clone()));
    let hashes = store
        .load_hashes()
        .with_context(|| format!("read {}", store.path().display()))?;
    let mut set = TransactionSet::seeded(hashes);

    let report = import_documents(&files, &mut set);

    let written = store
        .append(&set)
        .with_context(|| format!("write {}", store.path().display()))?;
    tracing::info!("Wrote {} new transactions to {}", written, store.path().display());
    Ok(report)
}

/// Categorize the clean store into the categorized file.
pub fn categorize(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    threshold: Option<f64>,
) -> Result<CategorizationSummary> {
    let input = input.unwrap_or_else(|| config.clean_transactions.clone());
    let output = output.unwrap_or_else(|| config.categorized_transactions.clone());
    let threshold = threshold.unwrap_or(config.confidence_threshold);

    if config.categories.is_empty() {
        tracing::warn!("No categories configured; every transaction will be left to categorize");
    }
    let categorizer = KeywordCategorizer::new(config.categories.clone(), config.fuzzy_threshold)
        .context("build keyword categorizer")?;

    let records = CsvStore::new(&input)
        .read_records()
        .with_context(|| format!("read {}", input.display()))?;
    let (rows, summary) = categorize_records(records, &categorizer, threshold);

    write_categorized(&output, &rows).with_context(|| format!("write {}", output.display()))?;
    tracing::info!("Categorized transactions saved to {}", output.display());
    Ok(summary)
}

pub fn print_report(report: &BatchReport) {
    println!(
        "Processed {} statements: {} new transactions, {} duplicates skipped",
        report.documents_processed, report.transactions_emitted, report.duplicates_suppressed
    );
    for item in &report.documents_skipped {
        println!("  skipped {}: {}", item.document, item.reason);
    }
    for item in &report.records_skipped {
        let location = item.location.map(|l| l.to_string()).unwrap_or_default();
        println!(
            "  skipped {} {}: {} ({})",
            item.document,
            location,
            item.reason,
            item.raw.as_deref().unwrap_or_default()
        );
    }
}

pub fn print_summary(summary: &CategorizationSummary) {
    println!(
        "Categorized {} of {} transactions ({} below threshold, {} without amount, {} failed)",
        summary.categorized,
        summary.processed,
        summary.below_threshold,
        summary.without_amount,
        summary.failed
    );
}
