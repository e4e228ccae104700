//! ABN AMRO tabular statements: one row per transaction, separate debit and credit
//! columns, amounts in Dutch notation (`1.234,56`).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use caterm_core::{Bank, EntryKind, TransactionCandidate};

use crate::amount::parse_amount;
use crate::document::{Document, RawRow};
use crate::error::{Location, Malformed};
use crate::extract::{Extraction, RejectedRecord, SourcedCandidate, StatementExtractor};

re!(re_row_date, r"^\d{2}-\d{2}-\d{4}$");

pub struct TabularExtractor;

/// Column indexes resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    date: usize,
    description: usize,
    debit: usize,
    credit: usize,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Option<ColumnMap> {
        let find = |names: &[&str]| {
            header
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        let date = find(&["date", "datum"])?;
        let description = find(&["description", "omschrijving"])?;
        // Statements print a blank spacer column between description and amounts.
        let debit = find(&["debit", "debet", "af"]).unwrap_or(description + 2);
        let credit = find(&["credit", "bij"]).unwrap_or(debit + 1);

        Some(ColumnMap {
            date,
            description,
            debit,
            credit,
        })
    }
}

impl StatementExtractor for TabularExtractor {
    fn bank(&self) -> Bank {
        Bank::AbnAmro
    }

    fn extract(&self, doc: &Document) -> Extraction {
        let mut out = Extraction::default();
        let Document::Table { header, rows } = doc else {
            return out;
        };
        let Some(columns) = ColumnMap::from_header(header) else {
            return out;
        };

        for row in rows {
            match extract_row(row, columns) {
                Ok(Some(candidate)) => out.candidates.push(SourcedCandidate {
                    location: Location::Row(row.number),
                    raw: row.raw(),
                    candidate,
                }),
                Ok(None) => {}
                Err(reason) => out.rejected.push(RejectedRecord {
                    location: Location::Row(row.number),
                    raw: row.raw(),
                    reason,
                }),
            }
        }

        out
    }
}

/// `Ok(None)` for rows that are not transactions at all (blank, totals, header echoes).
fn extract_row(
    row: &RawRow,
    columns: ColumnMap,
) -> Result<Option<TransactionCandidate>, Malformed> {
    if row.is_blank() {
        return Ok(None);
    }

    let date_cell = row.cell(columns.date);
    if !re_row_date().is_match(date_cell) {
        debug!(row = row.number, cell = date_cell, "skipping non-transaction row");
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(date_cell, "%d-%m-%Y")
        .map_err(|_| Malformed::InvalidDate(date_cell.to_string()))?;

    let debit_cell = row.cell(columns.debit);
    let credit_cell = row.cell(columns.credit);
    let (kind, cell) = match (debit_cell.is_empty(), credit_cell.is_empty()) {
        (false, true) => (EntryKind::Debit, debit_cell),
        (true, false) => (EntryKind::Credit, credit_cell),
        (true, true) => {
            debug!(row = row.number, "skipping row without amounts");
            return Ok(None);
        }
        (false, false) => return Err(Malformed::BothAmounts),
    };
    let amount: Decimal =
        parse_amount(cell).ok_or_else(|| Malformed::InvalidAmount(cell.to_string()))?;

    let description = row.cell(columns.description);
    Ok(Some(
        TransactionCandidate::new(date, description).with_amount(kind, amount),
    ))
}
