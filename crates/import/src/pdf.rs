//! Positioned text from PDF pages. Glyphs are collected with their page coordinates
//! and regrouped into lines of cells, so table columns survive extraction.

use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};

use crate::document::Span;

/// Horizontal gap, in font sizes, that starts a new cell.
const CELL_GAP: f64 = 1.0;
/// Horizontal gap, in font sizes, read as a space inside a cell.
const WORD_GAP: f64 = 0.1;
/// Vertical distance, in font sizes, within which glyphs share a line.
const LINE_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone)]
struct Glyph {
    x: f64,
    /// Distance from the top of the page.
    y: f64,
    end: f64,
    size: f64,
    text: String,
}

#[derive(Default)]
struct GlyphCollector {
    pages: Vec<Vec<Glyph>>,
    page_top: f64,
}

impl OutputDev for GlyphCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.page_top = media_box.ury;
        self.pages.push(Vec::new());
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> Result<(), OutputError> {
        let size = glyph_size(trm, font_size);
        let glyph = Glyph {
            x: trm.m31,
            y: self.page_top - trm.m32,
            end: trm.m31 + width * size,
            size,
            text: char.to_string(),
        };
        if let Some(page) = self.pages.last_mut() {
            page.push(glyph);
        }
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Rendered glyph size: the side of the square with the area of the scaled font box.
fn glyph_size(trm: &Transform, font_size: f64) -> f64 {
    let sx = font_size * (trm.m11 + trm.m21);
    let sy = font_size * (trm.m12 + trm.m22);
    (sx * sy).abs().sqrt()
}

/// Every page's lines, top to bottom, each split into cells with their x extent in points.
pub(crate) fn pdf_lines(bytes: &[u8]) -> Result<Vec<Vec<Span>>, String> {
    let mut doc = pdf_extract::Document::load_mem(bytes).map_err(|e| e.to_string())?;
    if doc.is_encrypted() {
        doc.decrypt("").map_err(|e| e.to_string())?;
    }

    let mut collector = GlyphCollector::default();
    pdf_extract::output_doc(&doc, &mut collector).map_err(|e| e.to_string())?;

    Ok(collector.pages.into_iter().flat_map(page_lines).collect())
}

fn page_lines(mut glyphs: Vec<Glyph>) -> Vec<Vec<Span>> {
    glyphs.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<Glyph>> = Vec::new();
    for glyph in glyphs {
        match lines.last_mut() {
            Some(line) if same_line(&line[0], &glyph) => line.push(glyph),
            _ => lines.push(vec![glyph]),
        }
    }

    lines
        .into_iter()
        .map(cells)
        .filter(|cells| !cells.is_empty())
        .collect()
}

fn same_line(first: &Glyph, glyph: &Glyph) -> bool {
    (glyph.y - first.y).abs() <= first.size.max(glyph.size) * LINE_TOLERANCE
}

fn cells(mut line: Vec<Glyph>) -> Vec<Span> {
    line.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut cells: Vec<Span> = Vec::new();
    let mut spaced = false;
    for glyph in line {
        if glyph.text.trim().is_empty() {
            spaced = true;
            continue;
        }
        match cells.last_mut() {
            Some(cell) if glyph.x - cell.end <= CELL_GAP * glyph.size => {
                if spaced || glyph.x - cell.end > WORD_GAP * glyph.size {
                    cell.text.push(' ');
                }
                cell.text.push_str(&glyph.text);
                cell.end = cell.end.max(glyph.end);
            }
            _ => cells.push(Span {
                text: glyph.text,
                start: glyph.x,
                end: glyph.end,
            }),
        }
        spaced = false;
    }
    cells
}

/// A single-page PDF in Helvetica whose content stream is `content`.
#[cfg(test)]
pub(crate) fn single_page_pdf(content: &str) -> Vec<u8> {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref = pdf.len();
    let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        tail.push_str(&format!("{offset:010} 00000 n \n"));
    }
    tail.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    ));
    pdf.extend_from_slice(tail.as_bytes());
    pdf
}

/// Content stream of a two-transaction ABN AMRO table, one `Tm` per cell.
#[cfg(test)]
pub(crate) const ABN_TABLE_CONTENT: &str = "BT /F1 10 Tf
1 0 0 1 50 740 Tm (ABN AMRO Bank N.V.) Tj
1 0 0 1 50 700 Tm (Date) Tj
1 0 0 1 120 700 Tm (Description) Tj
1 0 0 1 300 700 Tm (Debit) Tj
1 0 0 1 380 700 Tm (Credit) Tj
1 0 0 1 50 685 Tm (15-01-2024) Tj
1 0 0 1 120 685 Tm (Supermarket) Tj
1 0 0 1 300 685 Tm (45,67) Tj
1 0 0 1 50 670 Tm (16-01-2024) Tj
1 0 0 1 120 670 Tm (Salary ACME) Tj
1 0 0 1 380 670 Tm (2.000,00) Tj
ET";

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &[Span]) -> Vec<&str> {
        line.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn table_cells_keep_their_columns() {
        let lines = pdf_lines(&single_page_pdf(ABN_TABLE_CONTENT)).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(texts(&lines[0]), ["ABN AMRO Bank N.V."]);
        assert_eq!(texts(&lines[1]), ["Date", "Description", "Debit", "Credit"]);
        assert_eq!(texts(&lines[2]), ["15-01-2024", "Supermarket", "45,67"]);
        assert_eq!(texts(&lines[3]), ["16-01-2024", "Salary ACME", "2.000,00"]);

        assert_eq!(lines[2][2].start, 300.0);
        assert_eq!(lines[3][2].start, 380.0);
        assert!(lines[3][2].end > 380.0);
    }

    #[test]
    fn glyphs_drawn_out_of_order_are_read_top_to_bottom_left_to_right() {
        let content = "BT /F1 10 Tf
1 0 0 1 200 600 Tm (right) Tj
1 0 0 1 50 700 Tm (top) Tj
1 0 0 1 50 600 Tm (left) Tj
ET";
        let lines = pdf_lines(&single_page_pdf(content)).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(texts(&lines[0]), ["top"]);
        assert_eq!(texts(&lines[1]), ["left", "right"]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(pdf_lines(b"not a pdf").is_err());
    }
}
