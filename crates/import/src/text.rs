//! ING text statements: a flat stream of lines where a transaction starts with a
//! `DD/MM/YYYY` date and may continue over the following lines.

use chrono::NaiveDate;
use tracing::debug;

use caterm_core::{Bank, EntryKind, TransactionCandidate};

use crate::amount::parse_amount;
use crate::detect::is_format_marker;
use crate::document::{Document, RawLine};
use crate::error::{Location, Malformed};
use crate::extract::{Extraction, RejectedRecord, SourcedCandidate, StatementExtractor};

re!(re_start, r"^\s*(?P<date>\d{2}/\d{2}/\d{4})(?:\s+(?P<rest>.*))?$");

re!(re_trailing_amount, concat!(
    r"(?:^|\s)(?:(?:EUR|€)\s*)?(?P<sign>[+-])?\s*(?:(?:EUR|€)\s*)?",
    r"(?P<num>\d{1,3}(?:\.\d{3})+,\d{2}|\d{1,3}(?:,\d{3})+\.\d{2}|\d+[.,]\d{2})",
    r"\s*(?:EUR|€)?\s*$"
));

// Bank name, account-type boilerplate, column-header echoes, page numbers and
// balance summaries. Each form must fill the whole line, and none can match a
// date-led line.
re!(re_noise, r"(?ix)^\s*(?:
      ing (?:\s+bank (?:\s+n\.?v\.?)? )?
    | (?:statement\s+)? (?:zakelijke\s+rekening | betaalrekening | oranje\s+spaarrekening
        | spaarrekening | current\s+account | savings\s+account | business\s+account)
        (?:\s+[a-z]{2}\d{2}[a-z0-9\s]*)?
    | statement (?:\s+[a-z]{2}\d{2}[a-z0-9\s]*)?
    | date\s+name\s*/\s*description\b.*
    | datum\s+naam\s*/\s*omschrijving\b.*
    | (?:page | pagina)\s+\d+\s*(?:of | van | /)\s*\d+
    | \d+\s*/\s*\d+
    | (?:opening | closing | new | old)\s+balance [^a-z]* (?:eur [^a-z]*)?
    | (?:beginsaldo | eindsaldo) [^a-z]* (?:eur [^a-z]*)?
    | (?:total | totaal)(?:\s+amount\s+(?:debited | credited))? [^a-z]* (?:eur [^a-z]*)?
)\s*$");

pub struct TextStreamExtractor;

/// Accumulator state, moved through every line transition.
#[derive(Debug)]
enum State {
    /// Nothing pending; continuation lines are preamble.
    Idle,
    /// A transaction is open and collects continuation lines.
    Accumulating(SourcedCandidate),
    /// The last start line was malformed; its continuation lines are dropped.
    Discarding,
}

enum LineKind<'a> {
    Noise,
    Start(Result<TransactionCandidate, Malformed>),
    Continuation(&'a str),
}

impl StatementExtractor for TextStreamExtractor {
    fn bank(&self) -> Bank {
        Bank::Ing
    }

    fn extract(&self, doc: &Document) -> Extraction {
        let mut out = Extraction::default();
        let Document::Lines(lines) = doc else {
            return out;
        };

        let state = lines
            .iter()
            .fold(State::Idle, |state, line| step(state, line, &mut out));

        if let State::Accumulating(pending) = state {
            out.candidates.push(pending);
        }
        out
    }
}

fn step(state: State, line: &RawLine, out: &mut Extraction) -> State {
    match classify(&line.text) {
        LineKind::Noise => state,
        LineKind::Start(result) => {
            if let State::Accumulating(pending) = state {
                out.candidates.push(pending);
            }
            match result {
                Ok(candidate) => State::Accumulating(SourcedCandidate {
                    location: Location::Line(line.number),
                    raw: line.text.trim().to_string(),
                    candidate,
                }),
                Err(reason) => {
                    out.rejected.push(RejectedRecord {
                        location: Location::Line(line.number),
                        raw: line.text.trim().to_string(),
                        reason,
                    });
                    State::Discarding
                }
            }
        }
        LineKind::Continuation(text) => match state {
            State::Accumulating(mut pending) => {
                pending.candidate.append_description(text);
                State::Accumulating(pending)
            }
            other => {
                debug!(line = line.number, text, "discarding line outside a transaction");
                other
            }
        },
    }
}

fn classify(text: &str) -> LineKind<'_> {
    if text.trim().is_empty() || is_format_marker(text) || re_noise().is_match(text) {
        return LineKind::Noise;
    }
    match re_start().captures(text) {
        Some(caps) => {
            let date = caps.name("date").map_or("", |m| m.as_str());
            let rest = caps.name("rest").map_or("", |m| m.as_str());
            LineKind::Start(parse_start(date, rest))
        }
        None => LineKind::Continuation(text.trim()),
    }
}

fn parse_start(date: &str, rest: &str) -> Result<TransactionCandidate, Malformed> {
    let date = NaiveDate::parse_from_str(date, "%d/%m/%Y")
        .map_err(|_| Malformed::InvalidDate(date.to_string()))?;

    let caps = re_trailing_amount()
        .captures(rest)
        .ok_or(Malformed::MissingAmount)?;
    let whole = caps.get(0).ok_or(Malformed::MissingAmount)?;
    let num = caps.name("num").map_or("", |m| m.as_str());
    let magnitude = parse_amount(num).ok_or_else(|| Malformed::InvalidAmount(num.to_string()))?;

    let description = rest[..whole.start()].trim();
    let (kind, description) = match caps.name("sign").map(|m| m.as_str()) {
        Some("-") => (EntryKind::Debit, description),
        Some(_) => (EntryKind::Credit, description),
        None => direction_keyword(description).ok_or(Malformed::UnknownDirection)?,
    };

    Ok(TransactionCandidate::new(date, description).with_amount(kind, magnitude))
}

/// Reads an unsigned amount's direction from the word printed just before it and
/// returns the description without that word.
fn direction_keyword(description: &str) -> Option<(EntryKind, &str)> {
    let (head, last) = match description.rsplit_once(char::is_whitespace) {
        Some((head, last)) => (head.trim_end(), last),
        None => ("", description),
    };
    let kind = match last.to_lowercase().as_str() {
        "af" | "debit" | "debet" => EntryKind::Debit,
        "bij" | "credit" => EntryKind::Credit,
        _ => return None,
    };
    Some((kind, head))
}
