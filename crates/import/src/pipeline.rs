//! Batch import: load, detect, extract, normalize and merge a list of statements.

use serde::Serialize;
use std::path::Path;

use caterm_core::{Bank, Transaction, TransactionSet};

use crate::detect::detect_format;
use crate::document::Document;
use crate::error::{ImportError, Location};
use crate::normalize::normalize;

/// Normalized transactions of one document, in document order, plus the records that
/// were skipped along the way.
#[derive(Debug)]
pub struct ParsedDocument {
    pub bank: Bank,
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<ImportError>,
}

/// Parse a single statement. Only document-level failures are returned as `Err`.
pub fn parse_document(path: &Path) -> Result<ParsedDocument, ImportError> {
    let document = path.display().to_string();
    let doc = Document::load(path)?;
    let format = detect_format(&doc).ok_or_else(|| ImportError::UnsupportedFormat {
        document: document.clone(),
    })?;
    let extractor = format.extractor();
    let bank = extractor.bank();
    tracing::debug!(%document, ?format, "detected statement format");

    let extraction = extractor.extract(&doc);
    let mut skipped: Vec<ImportError> = extraction
        .rejected
        .into_iter()
        .map(|r| ImportError::MalformedTransaction {
            document: document.clone(),
            location: r.location,
            raw: r.raw,
            reason: r.reason,
        })
        .collect();

    let mut transactions = Vec::with_capacity(extraction.candidates.len());
    for sourced in extraction.candidates {
        match normalize(sourced.candidate, bank) {
            Ok(tx) => transactions.push(tx),
            Err(source) => skipped.push(ImportError::Normalization {
                document: document.clone(),
                location: sourced.location,
                raw: sourced.raw,
                source,
            }),
        }
    }

    Ok(ParsedDocument {
        bank,
        transactions,
        skipped,
    })
}

/// One entry in a [`BatchReport`]'s skip lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    pub reason: String,
}

impl From<&ImportError> for SkippedItem {
    fn from(err: &ImportError) -> Self {
        let (location, raw, reason) = match err {
            ImportError::UnreadableDocument { reason, .. } => (None, None, reason.clone()),
            ImportError::UnsupportedFormat { .. } => {
                (None, None, "unsupported statement format".to_string())
            }
            ImportError::MalformedTransaction {
                location,
                raw,
                reason,
                ..
            } => (Some(*location), Some(raw.clone()), reason.to_string()),
            ImportError::Normalization {
                location,
                raw,
                source,
                ..
            } => (Some(*location), Some(raw.clone()), source.to_string()),
        };
        SkippedItem {
            document: err.document().to_string(),
            location,
            raw,
            reason,
        }
    }
}

/// Outcome of [`import_documents`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub documents_processed: usize,
    pub documents_skipped: Vec<SkippedItem>,
    pub records_skipped: Vec<SkippedItem>,
    pub transactions_emitted: usize,
    pub duplicates_suppressed: usize,
}

impl BatchReport {
    fn record(&mut self, err: &ImportError) {
        tracing::warn!("{err}");
        let item = SkippedItem::from(err);
        if err.is_document_level() {
            self.documents_skipped.push(item);
        } else {
            self.records_skipped.push(item);
        }
    }
}

/// Import every document in order, merging into `set`. Failures are recorded in the
/// report and never stop the batch.
pub fn import_documents<P: AsRef<Path>>(paths: &[P], set: &mut TransactionSet) -> BatchReport {
    let mut report = BatchReport::default();

    for path in paths {
        let path = path.as_ref();
        tracing::info!("Processing statement: {}", path.display());

        let parsed = match parse_document(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                report.record(&e);
                continue;
            }
        };
        report.documents_processed += 1;
        for err in &parsed.skipped {
            report.record(err);
        }

        let mut emitted = 0;
        for tx in parsed.transactions {
            if set.insert(tx) {
                emitted += 1;
            } else {
                report.duplicates_suppressed += 1;
            }
        }
        report.transactions_emitted += emitted;
        tracing::info!(
            "{}: {} new {} transactions, {} records skipped",
            path.display(),
            emitted,
            parsed.bank,
            parsed.skipped.len()
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Malformed;
    use std::io::Write;
    use tempfile::TempDir;

    const ABN_CSV: &str = "\
Account statement,,,,,
,Date,Description,,Debit,Credit
,01-01-2023,SUPERMARKET GROCERY,,\"45,67\",
,05-01-2023,SALARY PAYMENT,,,\"2.000,00\"
,10-01-2023,INTERNET PROVIDER,,\"29,99\",
,Total,,,\"75,66\",\"2.000,00\"
";

    const ING_TXT: &str = "\
Statement Zakelijke Rekening
Date Name / Description / Notification Type Amount
01/03/2024 Shop purchase -12.50
extra note line
02/03/2024 Salary payment +2000.00
05/03/2024 Something without amount
";

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    #[test]
    fn parses_tabular_csv() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "abn.csv", ABN_CSV.as_bytes());
        let parsed = parse_document(&path).unwrap();
        assert_eq!(parsed.bank, Bank::AbnAmro);
        assert_eq!(parsed.transactions.len(), 3);
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.transactions[0].debit().unwrap().to_string(), "45.67");
        assert_eq!(parsed.transactions[1].credit().unwrap().to_string(), "2000.00");
        assert!(parsed.transactions.iter().all(|t| t.description() != "Total"));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn parses_tabular_pdf() {
        let dir = TempDir::new().unwrap();
        let pdf = crate::pdf::single_page_pdf(crate::pdf::ABN_TABLE_CONTENT);
        let path = write(&dir, "abn.pdf", &pdf);
        let parsed = parse_document(&path).unwrap();
        assert_eq!(parsed.bank, Bank::AbnAmro);
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.transactions.len(), 2);
        assert_eq!(parsed.transactions[0].description(), "Supermarket");
        assert_eq!(parsed.transactions[0].debit().unwrap().to_string(), "45.67");
        assert_eq!(parsed.transactions[1].description(), "Salary ACME");
        assert_eq!(parsed.transactions[1].credit().unwrap().to_string(), "2000.00");
    }

    #[test]
    fn parses_text_stream_and_reports_malformed_start() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "ing.txt", ING_TXT.as_bytes());
        let parsed = parse_document(&path).unwrap();
        assert_eq!(parsed.bank, Bank::Ing);
        assert_eq!(parsed.transactions.len(), 2);
        assert_eq!(parsed.transactions[0].description(), "Shop purchase extra note line");
        assert_eq!(parsed.skipped.len(), 1);
        assert!(matches!(
            &parsed.skipped[0],
            ImportError::MalformedTransaction {
                location: Location::Line(6),
                reason: Malformed::MissingAmount,
                ..
            }
        ));
    }

    #[test]
    fn unsupported_document_is_document_level() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.txt", b"just some notes\nnothing here");
        let err = parse_document(&path).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat { .. }));
    }

    #[test]
    fn importing_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "abn.csv", ABN_CSV.as_bytes());
        let mut set = TransactionSet::new();

        let first = import_documents(&[&path], &mut set);
        assert_eq!(first.transactions_emitted, 3);
        assert_eq!(set.len(), 3);

        let second = import_documents(&[&path], &mut set);
        assert_eq!(second.transactions_emitted, 0);
        assert_eq!(second.duplicates_suppressed, 3);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn batch_continues_past_bad_documents() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.csv");
        let junk = write(&dir, "junk.txt", b"hello");
        let ing = write(&dir, "ing.txt", ING_TXT.as_bytes());
        let abn = write(&dir, "abn.csv", ABN_CSV.as_bytes());

        let mut set = TransactionSet::new();
        let report = import_documents(&[missing, junk, ing, abn], &mut set);

        assert_eq!(report.documents_processed, 2);
        assert_eq!(report.documents_skipped.len(), 2);
        assert_eq!(report.records_skipped.len(), 1);
        assert_eq!(report.transactions_emitted, 5);
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn report_serializes_to_json() {
        let dir = TempDir::new().unwrap();
        let ing = write(&dir, "ing.txt", ING_TXT.as_bytes());
        let report = import_documents(&[ing], &mut TransactionSet::new());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["documents_processed"], 1);
        assert_eq!(json["transactions_emitted"], 2);
        let skipped = &json["records_skipped"][0];
        assert_eq!(skipped["location"]["line"], 6);
        assert_eq!(skipped["raw"], "05/03/2024 Something without amount");
        assert_eq!(skipped["reason"], "no amount found");
        assert!(json["documents_skipped"].as_array().unwrap().is_empty());
    }
}
