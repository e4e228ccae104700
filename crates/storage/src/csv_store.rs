use caterm_core::{EntryKind, Transaction};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column order of the clean-transactions file.
pub const COLUMNS: [&str; 6] = ["Date", "Description", "Debit", "Credit", "Bank", "Hash"];

/// Column order of the categorized file.
pub const CATEGORIZED_COLUMNS: [&str; 9] = [
    "Date",
    "Description",
    "Debit",
    "Credit",
    "Bank",
    "Hash",
    "Category",
    "Type",
    "Confidence",
];

const HASH_COLUMN: usize = 5;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Unexpected header in {path}: {found:?}")]
    UnexpectedHeader { path: String, found: Vec<String> },
}

/// A row of the clean-transactions file, as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub date: String,
    pub description: String,
    pub debit: Option<String>,
    pub credit: Option<String>,
    pub bank: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedRecord {
    pub record: StoredRecord,
    pub category: String,
    /// `None` when the row carries no usable amount.
    pub kind: Option<EntryKind>,
    pub confidence: f64,
}

/// Append-only CSV file of normalized transactions.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hashes already present in the store. A missing or empty file has none.
    pub fn load_hashes(&self) -> Result<HashSet<String>, StoreError> {
        let Some(mut reader) = self.open_reader()? else {
            return Ok(HashSet::new());
        };
        let mut hashes = HashSet::new();
        for result in reader.records() {
            let record = result?;
            if let Some(hash) = record.get(HASH_COLUMN).filter(|h| !h.is_empty()) {
                hashes.insert(hash.to_string());
            }
        }
        tracing::debug!(path = %self.path.display(), count = hashes.len(), "loaded stored hashes");
        Ok(hashes)
    }

    /// Append transactions, writing the header first when the file is new or empty.
    /// Returns the number of rows written.
    pub fn append<'a, I>(&self, transactions: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer.write_record(COLUMNS)?;
        }

        let mut written = 0;
        for tx in transactions {
            writer.write_record(transaction_row(tx))?;
            written += 1;
        }
        writer.flush()?;
        Ok(written)
    }

    pub fn read_records(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let Some(mut reader) = self.open_reader()? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;
            let cell = |i: usize| row.get(i).unwrap_or_default().to_string();
            let amount = |i: usize| Some(cell(i)).filter(|s| !s.is_empty());
            records.push(StoredRecord {
                date: cell(0),
                description: cell(1),
                debit: amount(2),
                credit: amount(3),
                bank: cell(4),
                hash: cell(HASH_COLUMN),
            });
        }
        Ok(records)
    }

    /// Opens the store for reading after checking its header. `None` when there is
    /// nothing to read yet.
    fn open_reader(&self) -> Result<Option<csv::Reader<fs::File>>, StoreError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let header = reader.headers()?;
        if header.is_empty() {
            return Ok(None);
        }
        if !header.iter().eq(COLUMNS) {
            return Err(StoreError::UnexpectedHeader {
                path: self.path.display().to_string(),
                found: header.iter().map(str::to_string).collect(),
            });
        }
        Ok(Some(reader))
    }
}

/// Overwrite `path` with categorized rows. Every field is quoted and descriptions are
/// kept on one line.
pub fn write_categorized(path: &Path, rows: &[CategorizedRecord]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_path(path)?;
    writer.write_record(CATEGORIZED_COLUMNS)?;

    for row in rows {
        let r = &row.record;
        let description = r.description.replace(['\n', '\r'], " ");
        let confidence = format!("{:.2}", row.confidence);
        let kind = row.kind.map_or_else(|| "unknown".to_string(), |k| k.to_string());
        writer.write_record([
            r.date.as_str(),
            description.as_str(),
            r.debit.as_deref().unwrap_or_default(),
            r.credit.as_deref().unwrap_or_default(),
            r.bank.as_str(),
            r.hash.as_str(),
            row.category.as_str(),
            kind.as_str(),
            confidence.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn transaction_row(tx: &Transaction) -> [String; 6] {
    [
        tx.date().format("%d-%m-%Y").to_string(),
        tx.description().to_string(),
        tx.debit().map(|a| a.to_string()).unwrap_or_default(),
        tx.credit().map(|a| a.to_string()).unwrap_or_default(),
        tx.bank().tag().to_string(),
        tx.hash().to_string(),
    ]
}
