use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use super::report::{Report, TABLE_HEAD};
use crate::core::BackofficeError;

const PT_PER_MM: f32 = 72.0 / 25.4;

// A4, portrait
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;

const MARGIN_MM: f32 = 14.0;
const TITLE_Y_MM: f32 = 18.0;
const TITLE_SIZE: f32 = 18.0;
const FIELD_SIZE: f32 = 11.0;
/// Baselines of the header fields, from the top edge.
const FIELD_Y_MM: [f32; 7] = [28.0, 36.0, 43.0, 50.0, 57.0, 64.0, 71.0];
const FIELD_STEP_MM: f32 = 7.0;
const TABLE_Y_MM: f32 = 80.0;
const CELL_PADDING_MM: f32 = 2.5;
const LINE_SPACING: f32 = 1.15;
/// Column widths; they add up to the page width minus both margins.
const COLUMN_WIDTH_MM: [f32; 5] = [10.0, 22.0, 80.0, 30.0, 40.0];
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;
const STRIPE_GRAY: f32 = 0.96;
const BODY_TEXT_GRAY: f32 = 0.31;

fn mm(v: f32) -> f32 {
    v * PT_PER_MM
}

/// Distance from the top edge (mm) to a PDF y coordinate (pt).
fn from_top(v_mm: f32) -> f32 {
    PAGE_HEIGHT - mm(v_mm)
}

/// A PDF download: the file name and its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Report {
    /// Render into a PDF with one or more A4 pages.
    pub fn to_pdf(&self) -> Result<Vec<u8>, BackofficeError> {
        render_pdf(self)
    }

    /// Render and pair the bytes with the download name.
    pub fn render(&self) -> Result<RenderedReport, BackofficeError> {
        Ok(RenderedReport {
            file_name: self.file_name.clone(),
            bytes: self.to_pdf()?,
        })
    }
}

/// Encode text for a WinAnsi-encoded standard font. Characters outside
/// the code page become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '\t' | '\n' | '\r' => b' ',
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Break `text` into lines of at most `max_chars` characters, preferring
/// whitespace and hard-splitting longer words.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.chars().count() + 1 + word.len()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Content operations of a single page.
#[derive(Default)]
struct PageOps(Vec<Operation>);

impl PageOps {
    fn fill_color(&mut self, rgb: [f32; 3]) {
        self.0.push(Operation::new(
            "rg",
            vec![rgb[0].into(), rgb[1].into(), rgb[2].into()],
        ));
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.0.push(Operation::new(
            "re",
            vec![x.into(), y.into(), w.into(), h.into()],
        ));
        self.0.push(Operation::new("f", vec![]));
    }

    fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) {
        self.0.push(Operation::new("BT", vec![]));
        self.0
            .push(Operation::new("Tf", vec![font.into(), size.into()]));
        self.0.push(Operation::new("Td", vec![x.into(), y.into()]));
        self.0.push(Operation::new(
            "Tj",
            vec![Object::string_literal(win_ansi(text))],
        ));
        self.0.push(Operation::new("ET", vec![]));
    }
}

struct TableLayout {
    font_size: f32,
    padding: f32,
    line_height: f32,
    columns: [(f32, usize); 5],
}

impl TableLayout {
    fn new(font_size: f32) -> Self {
        let padding = mm(CELL_PADDING_MM);
        let glyph = font_size * AVG_GLYPH_EM;
        let columns = COLUMN_WIDTH_MM.map(|w| {
            let width = mm(w);
            let chars = ((width - 2.0 * padding) / glyph).floor().max(1.0) as usize;
            (width, chars)
        });
        Self {
            font_size,
            padding,
            line_height: font_size * LINE_SPACING,
            columns,
        }
    }

    fn wrap_row<S: AsRef<str>>(&self, cells: &[S]) -> Vec<Vec<String>> {
        cells
            .iter()
            .zip(self.columns.iter())
            .map(|(cell, (_, chars))| wrap(cell.as_ref(), *chars))
            .collect()
    }

    fn row_height(&self, wrapped: &[Vec<String>]) -> f32 {
        line_count(wrapped) as f32 * self.line_height + 2.0 * self.padding
    }

    /// How many text lines of a row fit between `top` and `bottom`.
    fn lines_fitting(&self, top: f32, bottom: f32) -> usize {
        ((top - bottom - 2.0 * self.padding) / self.line_height)
            .floor()
            .max(0.0) as usize
    }

    /// Draw one row whose top edge is at `top`.
    fn draw_row(
        &self,
        page: &mut PageOps,
        top: f32,
        wrapped: &[Vec<String>],
        fill: Option<[f32; 3]>,
        text_rgb: [f32; 3],
        font: &str,
    ) -> f32 {
        let height = self.row_height(wrapped);
        let table_width: f32 = self.columns.iter().map(|(w, _)| w).sum();
        if let Some(fill) = fill {
            page.fill_color(fill);
            page.rect(mm(MARGIN_MM), top - height, table_width, height);
        }
        page.fill_color(text_rgb);
        let mut x = mm(MARGIN_MM);
        for (lines, (width, _)) in wrapped.iter().zip(self.columns.iter()) {
            for (i, line) in lines.iter().enumerate() {
                let baseline =
                    top - self.padding - self.font_size * 0.8 - i as f32 * self.line_height;
                page.text(font, self.font_size, x + self.padding, baseline, line);
            }
            x += width;
        }
        height
    }
}

fn line_count(wrapped: &[Vec<String>]) -> usize {
    wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1)
}

/// Keep the first `lines` lines of every cell in `wrapped` and return the
/// rest as the continuation of the row.
fn split_row(wrapped: &mut [Vec<String>], lines: usize) -> Vec<Vec<String>> {
    wrapped
        .iter_mut()
        .map(|cell| {
            if cell.len() > lines {
                cell.split_off(lines)
            } else {
                Vec::new()
            }
        })
        .collect()
}

fn rgb(color: [u8; 3]) -> [f32; 3] {
    color.map(|c| f32::from(c) / 255.0)
}

fn layout_pages(report: &Report) -> Vec<PageOps> {
    let mut pages = Vec::new();
    let mut page = PageOps::default();

    page.fill_color([0.0, 0.0, 0.0]);
    page.text("F2", TITLE_SIZE, mm(MARGIN_MM), from_top(TITLE_Y_MM), &report.title);
    for (i, field) in report.fields.iter().enumerate() {
        let y_mm = FIELD_Y_MM.get(i).copied().unwrap_or_else(|| {
            FIELD_Y_MM[FIELD_Y_MM.len() - 1] + (i + 1 - FIELD_Y_MM.len()) as f32 * FIELD_STEP_MM
        });
        page.text(
            "F1",
            FIELD_SIZE,
            mm(MARGIN_MM),
            from_top(y_mm),
            &format!("{}: {}", field.label, field.value),
        );
    }

    let table = TableLayout::new(report.body_font_size);
    let head = table.wrap_row(&TABLE_HEAD);
    let head_fill = rgb(report.head_fill);
    let bottom = mm(MARGIN_MM);

    let extra_fields = report.fields.len().saturating_sub(FIELD_Y_MM.len()) as f32;
    let mut top = from_top(TABLE_Y_MM + extra_fields * FIELD_STEP_MM);
    top -= table.draw_row(&mut page, top, &head, Some(head_fill), [1.0, 1.0, 1.0], "F2");

    let page_room = from_top(MARGIN_MM) - table.row_height(&head) - bottom;
    let mut fresh_page = false;
    for (i, row) in report.rows.iter().enumerate() {
        let stripe = (i % 2 == 1).then_some([STRIPE_GRAY; 3]);
        let mut wrapped = table.wrap_row(row);
        loop {
            if top - table.row_height(&wrapped) >= bottom {
                top -= table.draw_row(&mut page, top, &wrapped, stripe, [BODY_TEXT_GRAY; 3], "F1");
                fresh_page = false;
                break;
            }
            // Rows that fit on a page of their own move there whole, taller
            // rows are split. A fresh page always takes at least one line.
            let fits = if fresh_page {
                table.lines_fitting(top, bottom).max(1)
            } else if table.row_height(&wrapped) <= page_room {
                0
            } else {
                table.lines_fitting(top, bottom)
            };
            if fits > 0 {
                let rest = split_row(&mut wrapped, fits);
                let height =
                    table.draw_row(&mut page, top, &wrapped, stripe, [BODY_TEXT_GRAY; 3], "F1");
                if rest.iter().all(Vec::is_empty) {
                    top -= height;
                    fresh_page = false;
                    break;
                }
                wrapped = rest;
            }
            pages.push(std::mem::take(&mut page));
            top = from_top(MARGIN_MM);
            top -= table.draw_row(&mut page, top, &head, Some(head_fill), [1.0, 1.0, 1.0], "F2");
            fresh_page = true;
        }
    }
    pages.push(page);
    pages
}

/// Render `report` as a PDF document.
pub fn render_pdf(report: &Report) -> Result<Vec<u8>, BackofficeError> {
    let pages = layout_pages(report);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for page in &pages {
        let content = Content {
            operations: page.0.clone(),
        }
        .encode()
        .map_err(|e| BackofficeError::Render(format!("failed to encode page content: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(win_ansi(&report.title)),
        "Producer" => Object::string_literal("backoffice"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| BackofficeError::Render(format!("failed to save PDF: {e}")))?;

    tracing::info!(
        file_name = %report.file_name,
        pages = pages.len(),
        rows = report.rows.len(),
        bytes = output.len(),
        "invoice PDF rendered"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_prefers_whitespace() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("", 5), vec![""]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("x abcdefgh", 4), vec!["x", "abcd", "efgh"]);
    }

    #[test]
    fn split_row_carries_remaining_lines() {
        let mut row = vec![
            vec!["1".to_string()],
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        ];
        let rest = split_row(&mut row, 2);
        assert_eq!(row[1], vec!["a", "b"]);
        assert_eq!(row[0], vec!["1"]);
        assert_eq!(rest, vec![Vec::<String>::new(), vec!["c".to_string()]]);
        assert_eq!(line_count(&rest), 1);
    }

    #[test]
    fn win_ansi_maps_latin1_and_euro() {
        assert_eq!(win_ansi("Café €5"), vec![b'C', b'a', b'f', 0xe9, b' ', 0x80, b'5']);
        assert_eq!(win_ansi("日"), vec![b'?']);
    }

    #[test]
    fn column_widths_fill_the_page() {
        let total: f32 = COLUMN_WIDTH_MM.iter().sum();
        assert!((mm(total + 2.0 * MARGIN_MM) - PAGE_WIDTH).abs() < 0.5);
    }
}
