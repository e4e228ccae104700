use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use super::bank::Bank;
use super::hash::record_digest;
use super::money::{Amount, EntryKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("Transaction has no date")]
    MissingDate,
    #[error("Transaction has neither a debit nor a credit amount")]
    NoAmount,
    #[error("Transaction has both a debit ({debit}) and a credit ({credit}) amount")]
    BothAmounts { debit: Decimal, credit: Decimal },
    #[error("Transaction amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
}

/// In-progress accumulator for a transaction that has not been validated yet.
///
/// `None` and zero are different: `None` means the candidate is not of that kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionCandidate {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
}

impl TransactionCandidate {
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        TransactionCandidate {
            date: Some(date),
            description: description.into(),
            debit: None,
            credit: None,
        }
    }

    /// Sets the amount on the side named by `kind`. The magnitude is stored unsigned.
    pub fn with_amount(mut self, kind: EntryKind, amount: Decimal) -> Self {
        match kind {
            EntryKind::Debit => self.debit = Some(amount.abs()),
            EntryKind::Credit => self.credit = Some(amount.abs()),
        }
        self
    }

    /// Appends a continuation line to the description with a single-space join.
    pub fn append_description(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.description.is_empty() {
            self.description.push(' ');
        }
        self.description.push_str(text);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    kind: EntryKind,
    amount: Amount,
}

/// A finalized statement transaction. Immutable once built.
///
/// Exactly one of [`debit`](Self::debit) and [`credit`](Self::credit) is present, and
/// the hash is derived from the normalized fields only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    date: NaiveDate,
    description: String,
    entry: Entry,
    bank: Bank,
    hash: String,
}

impl Transaction {
    /// Validates the debit/credit pair and computes the content hash.
    ///
    /// The description is whitespace-collapsed here; identifier stripping is the
    /// caller's job and must happen before this call.
    pub fn new(
        date: NaiveDate,
        description: &str,
        debit: Option<Decimal>,
        credit: Option<Decimal>,
        bank: Bank,
    ) -> Result<Self, NormalizationError> {
        let entry = match (debit, credit) {
            (Some(debit), Some(credit)) => {
                return Err(NormalizationError::BothAmounts { debit, credit })
            }
            (None, None) => return Err(NormalizationError::NoAmount),
            (Some(d), None) => Entry {
                kind: EntryKind::Debit,
                amount: Amount::positive(d).ok_or(NormalizationError::NonPositiveAmount(d))?,
            },
            (None, Some(c)) => Entry {
                kind: EntryKind::Credit,
                amount: Amount::positive(c).ok_or(NormalizationError::NonPositiveAmount(c))?,
            },
        };

        let description = collapse_whitespace(description);
        let hash = content_hash(date, &description, entry, bank);

        Ok(Transaction {
            date,
            description,
            entry,
            bank,
            hash,
        })
    }

    pub fn from_candidate(
        candidate: TransactionCandidate,
        bank: Bank,
    ) -> Result<Self, NormalizationError> {
        let date = candidate.date.ok_or(NormalizationError::MissingDate)?;
        Self::new(
            date,
            &candidate.description,
            candidate.debit,
            candidate.credit,
            bank,
        )
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> EntryKind {
        self.entry.kind
    }

    pub fn amount(&self) -> Amount {
        self.entry.amount
    }

    pub fn debit(&self) -> Option<Amount> {
        (self.entry.kind == EntryKind::Debit).then_some(self.entry.amount)
    }

    pub fn credit(&self) -> Option<Amount> {
        (self.entry.kind == EntryKind::Credit).then_some(self.entry.amount)
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// Collapses every run of whitespace to one space and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Case is folded only inside the digest so that stored descriptions keep their casing.
fn content_hash(date: NaiveDate, description: &str, entry: Entry, bank: Bank) -> String {
    let date = date.format("%Y-%m-%d").to_string();
    let description = description.to_lowercase();
    let amount = entry.amount.to_string();
    let (debit, credit) = match entry.kind {
        EntryKind::Debit => (amount.as_str(), ""),
        EntryKind::Credit => ("", amount.as_str()),
    };
    record_digest([date.as_str(), description.as_str(), debit, credit, bank.tag()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn debit_transaction_has_no_credit() {
        let tx = Transaction::new(date(2024, 1, 15), "Supermarket", Some(dec("45.67")), None, Bank::AbnAmro)
            .unwrap();
        assert_eq!(tx.debit().unwrap().to_string(), "45.67");
        assert!(tx.credit().is_none());
        assert_eq!(tx.kind(), EntryKind::Debit);
    }

    #[test]
    fn rejects_both_amounts() {
        let err = Transaction::new(date(2024, 1, 15), "X", Some(dec("1")), Some(dec("2")), Bank::Ing)
            .unwrap_err();
        assert!(matches!(err, NormalizationError::BothAmounts { .. }));
    }

    #[test]
    fn rejects_no_amount() {
        assert_eq!(
            Transaction::new(date(2024, 1, 15), "X", None, None, Bank::Ing).unwrap_err(),
            NormalizationError::NoAmount
        );
    }

    #[test]
    fn rejects_zero_amount() {
        assert!(matches!(
            Transaction::new(date(2024, 1, 15), "X", Some(Decimal::ZERO), None, Bank::Ing),
            Err(NormalizationError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn from_candidate_requires_date() {
        let candidate = TransactionCandidate {
            credit: Some(dec("10")),
            ..Default::default()
        };
        assert_eq!(
            Transaction::from_candidate(candidate, Bank::Ing).unwrap_err(),
            NormalizationError::MissingDate
        );
    }

    #[test]
    fn append_description_single_space_join() {
        let mut c = TransactionCandidate::new(date(2024, 3, 1), "Shop purchase");
        c.append_description("  extra note line ");
        c.append_description("   ");
        assert_eq!(c.description, "Shop purchase extra note line");
    }

    #[test]
    fn with_amount_stores_magnitude() {
        let c = TransactionCandidate::new(date(2024, 3, 1), "x").with_amount(EntryKind::Debit, dec("-12.50"));
        assert_eq!(c.debit, Some(dec("12.50")));
        assert_eq!(c.credit, None);
    }

    #[test]
    fn hash_differs_by_date_and_bank() {
        let a = Transaction::new(date(2023, 1, 1), "Test Transaction", Some(dec("100")), None, Bank::Ing).unwrap();
        let b = Transaction::new(date(2023, 1, 2), "Test Transaction", Some(dec("100")), None, Bank::Ing).unwrap();
        let c = Transaction::new(date(2023, 1, 1), "Test Transaction", Some(dec("100")), None, Bank::AbnAmro).unwrap();
        assert_ne!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
    }

    #[test]
    fn hash_differs_by_side() {
        let d = Transaction::new(date(2023, 1, 1), "Refund", Some(dec("5")), None, Bank::Ing).unwrap();
        let c = Transaction::new(date(2023, 1, 1), "Refund", None, Some(dec("5")), Bank::Ing).unwrap();
        assert_ne!(d.hash(), c.hash());
    }

    #[test]
    fn description_keeps_case() {
        let tx = Transaction::new(date(2023, 1, 1), "  Albert   Heijn ", Some(dec("3")), None, Bank::Ing).unwrap();
        assert_eq!(tx.description(), "Albert Heijn");
    }

    proptest! {
        #[test]
        fn hash_stable_under_whitespace_and_case(
            words in proptest::collection::vec("[A-Za-z]{1,8}", 1..6),
            pad in "[ \t]{0,3}",
            cents in 1i64..10_000_000,
            upper in any::<bool>(),
        ) {
            let plain = words.join(" ");
            let noisy = format!("{pad}{}{pad}", words.join(format!(" {pad}").as_str()));
            let noisy = if upper { noisy.to_uppercase() } else { noisy.to_lowercase() };
            let amount = Decimal::new(cents, 2);
            let a = Transaction::new(date(2024, 5, 1), &plain, Some(amount), None, Bank::AbnAmro).unwrap();
            let b = Transaction::new(date(2024, 5, 1), &noisy, Some(amount), None, Bank::AbnAmro).unwrap();
            prop_assert_eq!(a.hash(), b.hash());
        }

        #[test]
        fn exactly_one_side_is_set(cents in -1_000_000i64..1_000_000, debit in any::<bool>()) {
            let amount = Decimal::new(cents, 2);
            let (d, c) = if debit { (Some(amount), None) } else { (None, Some(amount)) };
            match Transaction::new(date(2024, 5, 1), "x", d, c, Bank::Ing) {
                Ok(tx) => {
                    prop_assert!(tx.debit().is_some() != tx.credit().is_some());
                    prop_assert!(tx.amount().value() > Decimal::ZERO);
                }
                Err(e) => prop_assert_eq!(e, NormalizationError::NonPositiveAmount(amount)),
            }
        }
    }
}
