use std::collections::HashSet;

use super::transaction::Transaction;

/// Deduplicated, insertion-ordered collection of transactions keyed by hash.
///
/// Hashes seeded from an existing store block re-insertion but are not part of
/// [`iter`](Self::iter): only transactions inserted in this run are yielded.
#[derive(Debug, Default)]
pub struct TransactionSet {
    seen: HashSet<String>,
    items: Vec<Transaction>,
}

impl TransactionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a set that already knows the given hashes.
    pub fn seeded<I, S>(hashes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TransactionSet {
            seen: hashes.into_iter().map(Into::into).collect(),
            items: Vec::new(),
        }
    }

    /// Inserts `tx` unless its hash is already known. Returns whether it was inserted.
    pub fn insert(&mut self, tx: Transaction) -> bool {
        if !self.seen.insert(tx.hash().to_string()) {
            return false;
        }
        self.items.push(tx);
        true
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.seen.contains(hash)
    }

    /// Number of transactions inserted in this run.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a TransactionSet {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
