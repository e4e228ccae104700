use caterm_core::EntryKind;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Label given to transactions no category claims with enough confidence.
pub const UNCATEGORIZED: &str = "to categorize";

#[derive(Debug, Error)]
pub enum CategorizeError {
    #[error("Categorizer backend error: {0}")]
    Backend(String),
    #[error("Invalid category configuration: {0}")]
    InvalidConfig(String),
}

/// What a categorizer sees of one transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategorizationRequest<'a> {
    pub description: &'a str,
    pub amount: Decimal,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Categorization {
    pub label: String,
    pub confidence: f64,
}

impl Categorization {
    /// Confidence is clamped to `[0, 1]`; NaN counts as zero.
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label: label.into(),
            confidence,
        }
    }

    pub fn uncategorized() -> Self {
        Self::new(UNCATEGORIZED, 0.0)
    }

    pub fn is_uncategorized(&self) -> bool {
        self.label == UNCATEGORIZED
    }
}

/// Abstraction over a categorization backend.
/// Implementations map a transaction to a category label and a confidence.
pub trait Categorizer: Send + Sync {
    fn categorize(
        &self,
        request: &CategorizationRequest<'_>,
    ) -> Result<Categorization, CategorizeError>;
}

/// Returns a pre-set answer for every request.
pub struct MockCategorizer {
    pub answer: Categorization,
}

impl MockCategorizer {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            answer: Categorization::new(label, confidence),
        }
    }
}

impl Categorizer for MockCategorizer {
    fn categorize(
        &self,
        _request: &CategorizationRequest<'_>,
    ) -> Result<Categorization, CategorizeError> {
        Ok(self.answer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(description: &str) -> CategorizationRequest<'_> {
        CategorizationRequest {
            description,
            amount: Decimal::new(350, 2),
            kind: EntryKind::Debit,
        }
    }

    #[test]
    fn mock_returns_preset_answer() {
        let c = MockCategorizer::new("Groceries", 0.9);
        let answer = c.categorize(&request("Albert Heijn")).unwrap();
        assert_eq!(answer.label, "Groceries");
        assert_eq!(answer.confidence, 0.9);
    }

    #[test]
    fn mock_ignores_request() {
        let c = MockCategorizer::new("Rent", 1.0);
        assert_eq!(c.categorize(&request("")).unwrap(), c.categorize(&request("anything")).unwrap());
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Categorization::new("x", 1.7).confidence, 1.0);
        assert_eq!(Categorization::new("x", -0.2).confidence, 0.0);
        assert_eq!(Categorization::new("x", f64::NAN).confidence, 0.0);
    }

    #[test]
    fn uncategorized_label() {
        let c = Categorization::uncategorized();
        assert!(c.is_uncategorized());
        assert_eq!(c.label, "to categorize");
        assert_eq!(c.confidence, 0.0);
    }
}
