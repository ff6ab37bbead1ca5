//! PDF report built directly with `lopdf`.
//!
//! The layout works in millimetres from the top of an A4 page (210 x 297 mm)
//! and converts to PDF points, origin bottom-left, when emitting text.
//! Text uses the standard Helvetica faces with `WinAnsiEncoding`, so Latin-1
//! characters such as `ç` and `ã` render without embedding a font.

use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use tasktimer_proto::{Category, Task};

use super::{ExportError, format_duration, total_seconds};

const PAGE_WIDTH_PT: i64 = 595;
const PAGE_HEIGHT_MM: i64 = 297;
const PAGE_HEIGHT_PT: i64 = mm_to_pt(PAGE_HEIGHT_MM);

/// Cursor position after a page break.
const TOP_MARGIN_MM: i64 = 30;
/// A task row past this line moves to a new page.
const ROW_LIMIT_MM: i64 = 270;
/// The second category section starts on a new page past this line.
const SECTION_LIMIT_MM: i64 = 250;
/// The statistics block starts on a new page past this line.
const STATS_LIMIT_MM: i64 = 220;
const FOOTER_MM: i64 = 285;

const FOOTER: &str = "Gerado pelo tasktimer";

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    const fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Italic => "F3",
        }
    }
}

/// Accumulates text operations page by page.
struct Layout {
    pages: Vec<Vec<Operation>>,
    y: i64,
}

impl Layout {
    fn new(start_y: i64) -> Self {
        Self {
            pages: vec![Vec::new()],
            y: start_y,
        }
    }

    fn break_page_if_past(&mut self, limit: i64) {
        if self.y > limit {
            self.pages.push(Vec::new());
            self.y = TOP_MARGIN_MM;
        }
    }

    fn text_at(&mut self, font: Font, size: i64, x_mm: i64, y_mm: i64, text: &str) {
        let ops = [
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.resource().into()), Object::Integer(size)],
            ),
            Operation::new(
                "Td",
                vec![
                    Object::Integer(mm_to_pt(x_mm)),
                    Object::Integer(PAGE_HEIGHT_PT - mm_to_pt(y_mm)),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ];
        if let Some(page) = self.pages.last_mut() {
            page.extend(ops);
        }
    }

    fn text(&mut self, font: Font, size: i64, x_mm: i64, text: &str) {
        self.text_at(font, size, x_mm, self.y, text);
    }
}

/// Renders the report and returns the encoded document.
///
/// # Errors
///
/// Returns [`ExportError::Pdf`] if a content stream or the document cannot
/// be encoded.
pub fn to_pdf(tasks: &[Task], title: &str, date: NaiveDate) -> Result<Vec<u8>, ExportError> {
    let mut layout = Layout::new(65);

    layout.text_at(Font::Bold, 20, 20, 30, title);
    layout.text_at(
        Font::Regular,
        12,
        20,
        45,
        &format!("Data: {}", date.format("%d/%m/%Y")),
    );

    let mut first_section = true;
    for category in Category::ALL {
        let members: Vec<&Task> = tasks.iter().filter(|t| t.category == category).collect();
        if members.is_empty() {
            continue;
        }
        if !first_section {
            layout.break_page_if_past(SECTION_LIMIT_MM);
        }

        layout.text(Font::Bold, 16, 20, &category.label().to_uppercase());
        layout.y += 15;
        for task in members {
            layout.break_page_if_past(ROW_LIMIT_MM);
            layout.text(Font::Regular, 10, 25, &format!("\u{2022} {}", task.name));
            layout.text(
                Font::Regular,
                10,
                140,
                &format!("Tempo: {}", format_duration(task.elapsed())),
            );
            layout.y += 10;
        }
        layout.y += if first_section { 10 } else { 15 };
        first_section = false;
    }

    layout.break_page_if_past(STATS_LIMIT_MM);
    layout.text(Font::Bold, 16, 20, "ESTATÍSTICAS FINAIS");
    layout.y += 20;
    layout.text(
        Font::Regular,
        12,
        25,
        &format!(
            "Tempo em Criação: {}",
            format_duration(total_seconds(tasks, Some(Category::Criacao)))
        ),
    );
    layout.y += 15;
    layout.text(
        Font::Regular,
        12,
        25,
        &format!(
            "Tempo em Ajustes: {}",
            format_duration(total_seconds(tasks, Some(Category::Ajustes)))
        ),
    );
    layout.y += 15;
    layout.text(
        Font::Bold,
        12,
        25,
        &format!("TEMPO TOTAL: {}", format_duration(total_seconds(tasks, None))),
    );
    layout.text_at(Font::Italic, 8, 20, FOOTER_MM, FOOTER);

    assemble(layout.pages)
}

fn assemble(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(font_dictionary("Helvetica"));
    let bold = doc.add_object(font_dictionary("Helvetica-Bold"));
    let italic = doc.add_object(font_dictionary("Helvetica-Oblique"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
            "F3" => italic,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = i64::try_from(kids.len()).map_err(|e| ExportError::Pdf(e.to_string()))?;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(count),
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH_PT),
            Object::Integer(PAGE_HEIGHT_PT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(out)
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Rounded conversion; the layout never needs sub-point precision.
const fn mm_to_pt(mm: i64) -> i64 {
    (mm * 7200 + 1270) / 2540
}

/// Encodes text for a `WinAnsiEncoding` font.
///
/// Latin-1 maps to itself; the bullet and dashes use their cp1252 slots.
/// Anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => {
                u8::try_from(c as u32).unwrap_or(b'?')
            }
            _ => b'?',
        })
        .collect()
}
