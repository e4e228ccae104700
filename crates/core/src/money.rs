use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A strictly positive monetary magnitude, rounded to cents.
///
/// Direction lives in which side (debit or credit) holds the amount, never in its sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    /// Returns `None` for zero or negative values, including values that round to zero.
    pub fn positive(value: Decimal) -> Option<Self> {
        let rounded = value.round_dp(2);
        (rounded > Decimal::ZERO).then_some(Amount(rounded))
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Which side of the statement a transaction is booked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Debit,
    Credit,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Debit => write!(f, "debit"),
            EntryKind::Credit => write!(f, "credit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert!(Amount::positive(Decimal::ZERO).is_none());
        assert!(Amount::positive(dec("-1.00")).is_none());
        assert!(Amount::positive(dec("0.001")).is_none());
    }

    #[test]
    fn display_always_two_places() {
        assert_eq!(Amount::positive(dec("2000")).unwrap().to_string(), "2000.00");
        assert_eq!(Amount::positive(dec("45.6")).unwrap().to_string(), "45.60");
        assert_eq!(Amount::positive(dec("12.345")).unwrap().to_string(), "12.34");
    }

    #[test]
    fn kind_display() {
        assert_eq!(EntryKind::Debit.to_string(), "debit");
        assert_eq!(EntryKind::Credit.to_string(), "credit");
    }
}
