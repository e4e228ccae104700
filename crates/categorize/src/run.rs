use std::str::FromStr;

use caterm_core::EntryKind;
use caterm_storage::{CategorizedRecord, StoredRecord};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::categorizer::{CategorizationRequest, Categorization, Categorizer};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 99.0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategorizationSummary {
    pub processed: usize,
    pub categorized: usize,
    pub below_threshold: usize,
    pub without_amount: usize,
    pub failed: usize,
}

/// Reads the booking side of a stored row: a non-zero debit wins, then a non-zero
/// credit. Rows with neither are not sent to the categorizer.
fn entry_of(record: &StoredRecord) -> Option<(EntryKind, Decimal)> {
    let parse = |cell: &Option<String>| {
        cell.as_deref()
            .and_then(|s| Decimal::from_str(s.trim()).ok())
            .filter(|d| !d.is_zero())
            .map(|d| d.abs())
    };
    parse(&record.debit)
        .map(|d| (EntryKind::Debit, d))
        .or_else(|| parse(&record.credit).map(|c| (EntryKind::Credit, c)))
}

/// Categorize every record. Answers below `threshold_percent` become
/// [`UNCATEGORIZED`](crate::UNCATEGORIZED); backend errors are logged and do the same.
pub fn categorize_records(
    records: Vec<StoredRecord>,
    categorizer: &dyn Categorizer,
    threshold_percent: f64,
) -> (Vec<CategorizedRecord>, CategorizationSummary) {
    let threshold = (threshold_percent / 100.0).clamp(0.0, 1.0);
    let mut summary = CategorizationSummary::default();
    let mut out = Vec::with_capacity(records.len());

    for record in records {
        summary.processed += 1;

        let Some((kind, amount)) = entry_of(&record) else {
            tracing::debug!(hash = %record.hash, "row has no amount, leaving uncategorized");
            summary.without_amount += 1;
            out.push(CategorizedRecord {
                record,
                category: crate::UNCATEGORIZED.to_string(),
                kind: None,
                confidence: 0.0,
            });
            continue;
        };

        let request = CategorizationRequest {
            description: &record.description,
            amount,
            kind,
        };
        let answer = match categorizer.categorize(&request) {
            Ok(answer) if answer.is_uncategorized() => answer,
            Ok(answer) if answer.confidence < threshold => {
                tracing::debug!(
                    "{}: {} at {:.2} is below threshold",
                    record.description,
                    answer.label,
                    answer.confidence
                );
                summary.below_threshold += 1;
                Categorization::new(crate::UNCATEGORIZED, answer.confidence)
            }
            Ok(answer) => {
                summary.categorized += 1;
                answer
            }
            Err(e) => {
                tracing::warn!("Categorization failed for {:?}: {e}", record.description);
                summary.failed += 1;
                Categorization::uncategorized()
            }
        };

        out.push(CategorizedRecord {
            record,
            category: answer.label,
            kind: Some(kind),
            confidence: answer.confidence,
        });
    }

    tracing::info!(
        "Categorized {} of {} transactions",
        summary.categorized,
        summary.processed
    );
    (out, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::{CategorizeError, MockCategorizer};
    use crate::keyword::{CategoryConfig, CategoryType, KeywordCategorizer};

    fn record(description: &str, debit: Option<&str>, credit: Option<&str>) -> StoredRecord {
        StoredRecord {
            date: "01-03-2024".into(),
            description: description.into(),
            debit: debit.map(str::to_string),
            credit: credit.map(str::to_string),
            bank: "ING".into(),
            hash: format!("hash-{description}"),
        }
    }

    struct FailingCategorizer;

    impl Categorizer for FailingCategorizer {
        fn categorize(
            &self,
            _request: &CategorizationRequest<'_>,
        ) -> Result<Categorization, CategorizeError> {
            Err(CategorizeError::Backend("offline".into()))
        }
    }

    #[test]
    fn debit_wins_over_zero_credit() {
        let r = record("x", Some("12.50"), Some("0.00"));
        assert_eq!(entry_of(&r), Some((EntryKind::Debit, Decimal::new(1250, 2))));
        let r = record("x", Some("0"), Some("4.00"));
        assert_eq!(entry_of(&r), Some((EntryKind::Credit, Decimal::new(400, 2))));
        assert_eq!(entry_of(&record("x", None, None)), None);
    }

    #[test]
    fn confident_answers_are_kept() {
        let (rows, summary) = categorize_records(
            vec![record("Albert Heijn", Some("12.50"), None)],
            &MockCategorizer::new("Groceries", 1.0),
            DEFAULT_CONFIDENCE_THRESHOLD,
        );
        assert_eq!(rows[0].category, "Groceries");
        assert_eq!(rows[0].kind, Some(EntryKind::Debit));
        assert_eq!(summary.categorized, 1);
        assert_eq!(summary.processed, 1);
    }

    #[test]
    fn answers_below_threshold_become_uncategorized() {
        let (rows, summary) = categorize_records(
            vec![record("Albert Hein", Some("12.50"), None)],
            &MockCategorizer::new("Groceries", 0.91),
            DEFAULT_CONFIDENCE_THRESHOLD,
        );
        assert_eq!(rows[0].category, "to categorize");
        assert_eq!(rows[0].confidence, 0.91);
        assert_eq!(summary.below_threshold, 1);
        assert_eq!(summary.categorized, 0);

        let (rows, _) = categorize_records(
            vec![record("Albert Hein", Some("12.50"), None)],
            &MockCategorizer::new("Groceries", 0.91),
            90.0,
        );
        assert_eq!(rows[0].category, "Groceries");
    }

    #[test]
    fn rows_without_amount_skip_the_categorizer() {
        let (rows, summary) = categorize_records(
            vec![record("Note", None, Some("0.00"))],
            &FailingCategorizer,
            DEFAULT_CONFIDENCE_THRESHOLD,
        );
        assert_eq!(rows[0].kind, None);
        assert_eq!(rows[0].category, "to categorize");
        assert_eq!(summary.without_amount, 1);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn backend_errors_do_not_stop_the_run() {
        let (rows, summary) = categorize_records(
            vec![record("a", Some("1.00"), None), record("b", None, Some("2.00"))],
            &FailingCategorizer,
            DEFAULT_CONFIDENCE_THRESHOLD,
        );
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.category == "to categorize"));
        assert_eq!(summary.failed, 2);
    }

    #[test]
    fn keyword_categorizer_end_to_end() {
        let categorizer = KeywordCategorizer::new(
            vec![(
                "Salary".to_string(),
                CategoryConfig {
                    kind: CategoryType::Credit,
                    keywords: vec!["salary".into()],
                },
            )],
            0.8,
        )
        .unwrap();
        let (rows, summary) = categorize_records(
            vec![
                record("SALARY PAYMENT", None, Some("2000.00")),
                record("SALARY CORRECTION", Some("10.00"), None),
            ],
            &categorizer,
            DEFAULT_CONFIDENCE_THRESHOLD,
        );
        assert_eq!(rows[0].category, "Salary");
        assert_eq!(rows[1].category, "to categorize");
        assert_eq!(summary.categorized, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["processed"], 2);
    }
}
