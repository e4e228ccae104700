use caterm_core::{Bank, TransactionCandidate};

use crate::document::Document;
use crate::error::{Location, Malformed};

/// A finalized candidate together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedCandidate {
    pub location: Location,
    pub raw: String,
    pub candidate: TransactionCandidate,
}

/// A record that matched a transaction start but could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub location: Location,
    pub raw: String,
    pub reason: Malformed,
}

/// Output of one extractor run over one document, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub candidates: Vec<SourcedCandidate>,
    pub rejected: Vec<RejectedRecord>,
}

/// Recovers transaction candidates from one statement layout.
pub trait StatementExtractor {
    fn bank(&self) -> Bank;

    /// Documents of the wrong shape yield an empty extraction.
    fn extract(&self, doc: &Document) -> Extraction;
}
