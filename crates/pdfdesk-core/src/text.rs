//! Text extraction and flowing-text PDF generation
//!
//! Extraction is best-effort and per page. Generation does not try to
//! reproduce the original layout: it typesets plain text in Helvetica on A4,
//! wrapping words by glyph width and breaking pages as they fill.

use crate::error::PdfDeskError;
use crate::page_tree::{self, PageWriter};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, StringFormat};

/// Extract the text of every page. Pages the backend cannot decode yield an
/// empty string rather than failing the document.
pub fn extract_pages_text(bytes: &[u8]) -> Result<Vec<String>, PdfDeskError> {
    let doc = page_tree::load(bytes)?;
    let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();

    Ok(page_numbers
        .into_iter()
        .map(|page| match doc.extract_text(&[page]) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(page, error = %e, "No extractable text on page");
                String::new()
            }
        })
        .collect())
}

/// Join per-page text with `--- Page N ---` markers. Page text is kept as
/// extracted.
pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| format!("--- Page {} ---\n{}\n", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Page geometry and type settings for [`render_text_document`], in points.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub font_size: f32,
    pub leading: f32,
}

impl Default for TextLayout {
    /// A4 with one-inch margins, 11 pt Helvetica on 14 pt leading.
    fn default() -> Self {
        Self {
            page_width: 595.276,
            page_height: 841.89,
            margin: 72.0,
            font_size: 11.0,
            leading: 14.0,
        }
    }
}

impl TextLayout {
    fn text_width(&self) -> f32 {
        (self.page_width - 2.0 * self.margin).max(self.font_size)
    }

    fn lines_per_page(&self) -> usize {
        let usable = self.page_height - 2.0 * self.margin;
        ((usable / self.leading).floor() as usize).max(1)
    }
}

/// Typeset `text` into a brand-new PDF. Hard line breaks are kept, long
/// lines are word-wrapped, and blank input still produces one empty page.
pub fn render_text_document(text: &str, layout: &TextLayout) -> Result<Vec<u8>, PdfDeskError> {
    let lines = wrap_text(text, layout);

    let mut writer = PageWriter::new();
    let font_id = writer.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));

    let chunks: Vec<&[Vec<u8>]> = if lines.is_empty() {
        vec![&[]]
    } else {
        lines.chunks(layout.lines_per_page()).collect()
    };

    for chunk in chunks {
        let content = page_content(chunk, layout)?;
        let fonts = Dictionary::from_iter(vec![("F1", Object::Reference(font_id))]);
        let resources = Dictionary::from_iter(vec![("Font", Object::Dictionary(fonts))]);
        writer.add_page(layout.page_width, layout.page_height, content, resources);
    }

    tracing::debug!(pages = writer.page_count(), "Rendered text document");
    writer.finish()
}

fn page_content(lines: &[Vec<u8>], layout: &TextLayout) -> Result<Vec<u8>, PdfDeskError> {
    let top = layout.page_height - layout.margin - layout.font_size;
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(b"F1".to_vec()), Object::Real(layout.font_size)],
        ),
        Operation::new("TL", vec![Object::Real(layout.leading)]),
        Operation::new("Td", vec![Object::Real(layout.margin), Object::Real(top)]),
    ];
    for line in lines {
        if !line.is_empty() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(line.clone(), StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    Content { operations }
        .encode()
        .map_err(|e| PdfDeskError::OperationError(format!("Content encoding failed: {}", e)))
}

/// Break `text` into WinAnsi-encoded lines that fit the layout's text width.
fn wrap_text(text: &str, layout: &TextLayout) -> Vec<Vec<u8>> {
    let max_width = layout.text_width() * 1000.0 / layout.font_size;
    let space = glyph_width(b' ');
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let encoded = encode_win_ansi(&raw_line.replace('\t', "    "));
        let mut line: Vec<u8> = Vec::new();
        let mut line_width = 0.0;

        for word in encoded.split(|&b| b == b' ').filter(|w| !w.is_empty()) {
            let word_width = string_width(word);

            if !line.is_empty() && line_width + space + word_width <= max_width {
                line.push(b' ');
                line.extend_from_slice(word);
                line_width += space + word_width;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }

            if word_width <= max_width {
                line.extend_from_slice(word);
                line_width = word_width;
            } else {
                // Hard-break a word wider than the column.
                line_width = 0.0;
                for &byte in word {
                    let width = glyph_width(byte);
                    if !line.is_empty() && line_width + width > max_width {
                        lines.push(std::mem::take(&mut line));
                        line_width = 0.0;
                    }
                    line.push(byte);
                    line_width += width;
                }
            }
        }
        lines.push(line);
    }

    lines
}

/// Encode to WinAnsi (CP-1252); anything without a code point becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| *c != '\r')
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\u{20AC}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2026}' => 0x85,
            _ => b'?',
        })
        .collect()
}

fn string_width(bytes: &[u8]) -> f32 {
    bytes.iter().map(|&b| glyph_width(b)).sum()
}

/// Helvetica advance widths (per 1000 em) for printable ASCII.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

fn glyph_width(byte: u8) -> f32 {
    match byte {
        b' '..=b'~' => HELVETICA_WIDTHS[(byte - b' ') as usize] as f32,
        _ => 556.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::tagged_pdf;
    use lopdf::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_join_pages_marks_boundaries() {
        let joined = join_pages(&["first\n".to_string(), String::new()]);
        assert_eq!(joined, "--- Page 1 ---\nfirst\n\n\n--- Page 2 ---\n\n");
    }

    #[test]
    fn test_extract_returns_one_entry_per_page() {
        let pdf = tagged_pdf(3, 4);
        let pages = extract_pages_text(&pdf).unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages[0].contains("Doc4 Page1"));
        assert!(pages[2].contains("Doc4 Page3"));
        assert!(!pages[0].contains("Page2"));
    }

    #[test]
    fn test_rendered_text_extracts_back() {
        let source = "Hello (with parens) back\\slash\nsecond line";
        let pdf = render_text_document(source, &TextLayout::default()).unwrap();
        let pages = extract_pages_text(&pdf).unwrap();

        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains("Hello (with parens) back\\slash"));
        assert!(pages[0].contains("second line"));
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert!(matches!(
            extract_pages_text(b"nope"),
            Err(PdfDeskError::ParseError(_))
        ));
    }

    #[test]
    fn test_render_produces_valid_pdf() {
        let pdf = render_text_document("Hello\n\nWorld (with parens)", &TextLayout::default()).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_render_blank_text_gives_one_page() {
        let pdf = render_text_document("", &TextLayout::default()).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_render_breaks_pages() {
        let layout = TextLayout::default();
        let text = "line\n".repeat(layout.lines_per_page() * 2 + 1);
        let pdf = render_text_document(&text, &layout).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_round_trip_through_extraction() {
        let pdf = tagged_pdf(2, 1);
        let text = join_pages(&extract_pages_text(&pdf).unwrap());
        let rebuilt = render_text_document(&text, &TextLayout::default()).unwrap();
        let doc = Document::load_mem(&rebuilt).unwrap();
        assert!(!doc.get_pages().is_empty());
    }

    #[test]
    fn test_wrap_respects_width() {
        let layout = TextLayout::default();
        let max_width = layout.text_width() * 1000.0 / layout.font_size;
        let text = "lorem ipsum dolor sit amet ".repeat(40);
        let lines = wrap_text(&text, &layout);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(string_width(line) <= max_width);
        }
    }

    #[test]
    fn test_wrap_hard_breaks_long_words() {
        let layout = TextLayout::default();
        let lines = wrap_text(&"W".repeat(200), &layout);
        assert!(lines.len() > 1);
        assert_eq!(lines.iter().map(Vec::len).sum::<usize>(), 200);
    }

    #[test]
    fn test_wrap_keeps_blank_lines() {
        let lines = wrap_text("a\n\nb", &TextLayout::default());
        assert_eq!(lines, vec![b"a".to_vec(), Vec::new(), b"b".to_vec()]);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("café €"), vec![b'c', b'a', b'f', 0xE9, b' ', 0x80]);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }
}
