use caterm_core::NormalizationError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Where in a document a record came from. Numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Row(usize),
    Line(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Row(n) => write!(f, "row {n}"),
            Location::Line(n) => write!(f, "line {n}"),
        }
    }
}

/// Why a record that looked like a transaction start could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformed {
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("no amount found")]
    MissingAmount,
    #[error("amount has no sign or direction keyword")]
    UnknownDirection,
    #[error("both debit and credit are filled")]
    BothAmounts,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Cannot read {document}: {reason}")]
    UnreadableDocument { document: String, reason: String },
    #[error("Unsupported statement format: {document}")]
    UnsupportedFormat { document: String },
    #[error("Malformed transaction in {document} at {location}: {reason} ({raw:?})")]
    MalformedTransaction {
        document: String,
        location: Location,
        raw: String,
        reason: Malformed,
    },
    #[error("Cannot normalize transaction in {document} at {location}: {source} ({raw:?})")]
    Normalization {
        document: String,
        location: Location,
        raw: String,
        #[source]
        source: NormalizationError,
    },
}

impl ImportError {
    /// Whether the error made the whole document unusable (as opposed to one record).
    pub fn is_document_level(&self) -> bool {
        matches!(
            self,
            ImportError::UnreadableDocument { .. } | ImportError::UnsupportedFormat { .. }
        )
    }

    pub fn document(&self) -> &str {
        match self {
            ImportError::UnreadableDocument { document, .. }
            | ImportError::UnsupportedFormat { document }
            | ImportError::MalformedTransaction { document, .. }
            | ImportError::Normalization { document, .. } => document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display() {
        assert_eq!(Location::Row(3).to_string(), "row 3");
        assert_eq!(Location::Line(12).to_string(), "line 12");
    }

    #[test]
    fn malformed_message_carries_context() {
        let err = ImportError::MalformedTransaction {
            document: "march.pdf".into(),
            location: Location::Line(7),
            raw: "05/03/2024 Something".into(),
            reason: Malformed::MissingAmount,
        };
        let msg = err.to_string();
        assert!(msg.contains("march.pdf"));
        assert!(msg.contains("line 7"));
        assert!(msg.contains("05/03/2024 Something"));
        assert!(!err.is_document_level());
    }

    #[test]
    fn document_level_errors() {
        let err = ImportError::UnsupportedFormat { document: "x.txt".into() };
        assert!(err.is_document_level());
        assert_eq!(err.document(), "x.txt");
    }
}
