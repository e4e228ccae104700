use caterm_core::Bank;

use crate::document::Document;
use crate::extract::StatementExtractor;
use crate::tabular::TabularExtractor;
use crate::text::TextStreamExtractor;

/// Marker phrase printed above the transaction list of text-stream statements.
pub const TEXT_FORMAT_MARKER: &str = "date name / description / notification type amount";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementFormat {
    /// Tabular layout with `Date` / `Description` / `Debit` / `Credit` columns.
    AbnAmroTable,
    /// Flat text layout with date-led transaction lines.
    IngText,
}

impl StatementFormat {
    pub fn bank(self) -> Bank {
        match self {
            StatementFormat::AbnAmroTable => Bank::AbnAmro,
            StatementFormat::IngText => Bank::Ing,
        }
    }

    pub fn extractor(self) -> Box<dyn StatementExtractor> {
        match self {
            StatementFormat::AbnAmroTable => Box::new(TabularExtractor),
            StatementFormat::IngText => Box::new(TextStreamExtractor),
        }
    }
}

/// Classify a loaded document, or `None` when neither layout's signature is present.
pub fn detect_format(doc: &Document) -> Option<StatementFormat> {
    match doc {
        Document::Table { header, .. } => {
            let has = |name: &str| header.iter().any(|h| h.trim().eq_ignore_ascii_case(name));
            (has("date") && has("description")).then_some(StatementFormat::AbnAmroTable)
        }
        Document::Lines(lines) => lines
            .iter()
            .any(|l| is_format_marker(&l.text))
            .then_some(StatementFormat::IngText),
    }
}

/// Whether `line` carries the text-format marker phrase (case and spacing insensitive).
pub fn is_format_marker(line: &str) -> bool {
    let line = caterm_core::collapse_whitespace(line).to_lowercase();
    line.contains(TEXT_FORMAT_MARKER)
}
