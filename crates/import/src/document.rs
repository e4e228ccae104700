use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::ImportError;

// Cells in layout-preserving text are separated by two or more spaces.
re!(re_cell, r"\S+(?: \S+)*");

/// One line of extracted text with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub number: usize,
    pub text: String,
}

/// One table row, cells aligned to the header columns, with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub number: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new(number: usize, cells: Vec<String>) -> Self {
        Self { number, cells }
    }

    /// The trimmed cell at `index`, or `""` when the row is shorter.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(|c| c.trim()).unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }

    /// Row text for error reports.
    pub fn raw(&self) -> String {
        self.cells.join(" | ")
    }
}

/// A loaded statement, before its format is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// The source exposes rows aligned to a header row.
    Table { header: Vec<String>, rows: Vec<RawRow> },
    /// The source is a flat stream of text lines.
    Lines(Vec<RawLine>),
}

impl Document {
    /// Load a statement from disk, choosing the reader by file extension.
    pub fn load(path: &Path) -> Result<Document, ImportError> {
        let document = path.display().to_string();
        let unreadable = |reason: String| ImportError::UnreadableDocument {
            document: document.clone(),
            reason,
        };

        let bytes = std::fs::read(path).map_err(|e| unreadable(e.to_string()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let doc = match ext.as_str() {
            "csv" | "tsv" => {
                let delimiter = if ext == "tsv" { b'\t' } else { b',' };
                Document::from_csv(bytes.as_slice(), delimiter)
                    .map_err(|e| unreadable(e.to_string()))?
            }
            "pdf" => from_pdf(bytes).map_err(unreadable)?,
            _ => {
                let text = String::from_utf8(bytes).map_err(|e| unreadable(e.to_string()))?;
                Document::from_text(&text)
            }
        };

        match &doc {
            Document::Table { rows, .. } => debug!(%document, rows = rows.len(), "loaded table"),
            Document::Lines(lines) => debug!(%document, lines = lines.len(), "loaded text"),
        }
        Ok(doc)
    }

    /// Read delimited records. The header is the first row with a `Date` cell, or
    /// failing that the first non-empty row; rows above it are dropped.
    pub fn from_csv<R: Read>(data: R, delimiter: u8) -> Result<Document, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(data);

        let mut rows = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let record = result?;
            let number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(i + 1);
            rows.push(RawRow::new(number, record.iter().map(str::to_string).collect()));
        }

        Ok(Document::from_rows(rows))
    }

    fn from_rows(mut rows: Vec<RawRow>) -> Document {
        let header_at = rows
            .iter()
            .position(|r| r.cells.iter().any(|c| c.trim().eq_ignore_ascii_case("date")))
            .or_else(|| rows.iter().position(|r| !r.is_blank()));

        match header_at {
            Some(at) => {
                let rest = rows.split_off(at + 1);
                let header = rows.pop().map(|r| r.cells).unwrap_or_default();
                Document::Table { header, rows: rest }
            }
            None => Document::Table {
                header: Vec::new(),
                rows: Vec::new(),
            },
        }
    }

    /// Split extracted text into lines. When one line reads as a column header with
    /// separate `Date` and `Description` cells, everything after it is read as a table
    /// aligned to that header.
    pub fn from_text(text: &str) -> Document {
        let text = text.replace('\u{000C}', "\n");
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| {
                let text = l.trim_end();
                LaidOutLine {
                    number: i + 1,
                    columns: Columns::of(text),
                    text: text.to_string(),
                }
            })
            .collect();
        Document::from_layout(lines)
    }

    /// Lines of positioned cells, as recovered from a PDF page.
    #[cfg_attr(not(feature = "pdf"), allow(dead_code))]
    fn from_cells(lines: Vec<Vec<Span>>) -> Document {
        let lines = lines
            .into_iter()
            .enumerate()
            .map(|(i, cells)| LaidOutLine {
                number: i + 1,
                text: cells
                    .iter()
                    .map(|c| c.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
                columns: Columns::Aligned(cells),
            })
            .collect();
        Document::from_layout(lines)
    }

    fn from_layout(lines: Vec<LaidOutLine>) -> Document {
        let header_at = lines.iter().position(|l| {
            let cells = l.columns.names();
            has_cell(&cells, "date") && has_cell(&cells, "description")
        });

        let Some(at) = header_at else {
            return Document::Lines(
                lines
                    .into_iter()
                    .map(|l| RawLine {
                        number: l.number,
                        text: l.text,
                    })
                    .collect(),
            );
        };

        let header = &lines[at].columns;
        let rows = lines[at + 1..]
            .iter()
            .filter(|l| !l.text.trim().is_empty())
            .map(|l| RawRow::new(l.number, header.align(&l.columns)))
            .collect();

        Document::Table {
            header: header.names(),
            rows,
        }
    }
}

fn has_cell(cells: &[String], name: &str) -> bool {
    cells.iter().any(|c| c.eq_ignore_ascii_case(name))
}

/// A cell of laid-out text with its horizontal extent `[start, end)`: character
/// columns for plain text, points for PDF pages.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Span {
    pub(crate) text: String,
    pub(crate) start: f64,
    pub(crate) end: f64,
}

fn spans(line: &str) -> Vec<Span> {
    re_cell()
        .find_iter(line)
        .map(|m| {
            let start = line[..m.start()].chars().count();
            Span {
                text: m.as_str().to_string(),
                start: start as f64,
                end: (start + m.as_str().chars().count()) as f64,
            }
        })
        .collect()
}

struct LaidOutLine {
    number: usize,
    text: String,
    columns: Columns,
}

/// Cell layout of one line.
enum Columns {
    /// Tab-separated: cells are positional.
    Tabs(Vec<String>),
    /// Cells with horizontal positions, matched to header cells by overlap.
    Aligned(Vec<Span>),
}

impl Columns {
    fn of(line: &str) -> Columns {
        if line.contains('\t') {
            Columns::Tabs(line.split('\t').map(|c| c.trim().to_string()).collect())
        } else {
            Columns::Aligned(spans(line))
        }
    }

    fn names(&self) -> Vec<String> {
        match self {
            Columns::Tabs(names) => names.clone(),
            Columns::Aligned(spans) => spans.iter().map(|s| s.text.clone()).collect(),
        }
    }

    /// Places each cell of `row` under the header column it sits beneath: the one it
    /// overlaps most, or the nearest one when it overlaps none. Without positions on
    /// both sides, cells are taken in order.
    fn align(&self, row: &Columns) -> Vec<String> {
        let (headers, cells) = match (self, row) {
            (Columns::Aligned(headers), Columns::Aligned(cells)) => (headers, cells),
            (_, row) => return row.names(),
        };

        let mut aligned = vec![String::new(); headers.len()];
        if headers.is_empty() {
            return aligned;
        }

        for span in cells {
            let overlap = |h: &Span| (span.end.min(h.end) - span.start.max(h.start)).max(0.0);
            let gap = |h: &Span| {
                if span.end <= h.start {
                    h.start - span.end
                } else {
                    (span.start - h.end).max(0.0)
                }
            };

            let best_overlap = headers
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| overlap(*a).total_cmp(&overlap(*b)));
            let column = match best_overlap {
                Some((i, h)) if overlap(h) > 0.0 => i,
                _ => headers
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| gap(*a).total_cmp(&gap(*b)))
                    .map_or(0, |(i, _)| i),
            };

            let cell = &mut aligned[column];
            if !cell.is_empty() {
                cell.push(' ');
            }
            cell.push_str(&span.text);
        }

        aligned
    }
}

#[cfg(feature = "pdf")]
fn from_pdf(bytes: Vec<u8>) -> Result<Document, String> {
    // pdf-extract can panic on unusual fonts; a joined thread turns that into an error.
    let lines = std::thread::spawn(move || crate::pdf::pdf_lines(&bytes))
        .join()
        .map_err(|_| "PDF text extraction panicked".to_string())??;
    Ok(Document::from_cells(lines))
}

#[cfg(not(feature = "pdf"))]
fn from_pdf(_bytes: Vec<u8>) -> Result<Document, String> {
    Err("PDF support is disabled; build with the `pdf` feature".to_string())
}
