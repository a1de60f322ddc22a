//! Server-rendered HTML pages

use html_escape::{encode_double_quoted_attribute, encode_text};

const STYLE: &str = "body{font-family:sans-serif;max-width:46rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin:.8rem 0 .2rem}input[type=text]{width:100%}\
textarea{width:100%;height:32rem;font-family:monospace}\
.flash{background:#fde8e8;border:1px solid #e0a0a0;padding:.5rem 1rem;margin:.5rem 0}\
nav a{margin-right:1rem}";

fn layout(title: &str, flashes: &[String], body: &str) -> String {
    let flashes: String = flashes
        .iter()
        .map(|message| format!("<p class=\"flash\">{}</p>", encode_text(message)))
        .collect();

    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - pdfdesk</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"/\">Home</a><a href=\"/merge\">Merge</a><a href=\"/split\">Split</a>\
         <a href=\"/img2pdf\">Images to PDF</a><a href=\"/edit_pages\">Edit pages</a>\
         <a href=\"/text_editor\">Text editor</a></nav>\n\
         <h1>{title}</h1>\n{flashes}\n{body}\n</body>\n</html>\n",
        title = encode_text(title),
    )
}

/// Form posting multipart data back to `action`.
fn upload_form(action: &str, fields: &str, submit: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\" enctype=\"multipart/form-data\">\n\
         {fields}\n<p><button type=\"submit\">{submit}</button></p>\n</form>"
    )
}

fn file_input(name: &str, accept: &str, multiple: bool) -> String {
    format!(
        "<input type=\"file\" name=\"{name}\" accept=\"{accept}\"{} required>",
        if multiple { " multiple" } else { "" }
    )
}

fn text_input(name: &str, label: &str, placeholder: &str) -> String {
    format!(
        "<label for=\"{name}\">{label}</label>\
         <input type=\"text\" id=\"{name}\" name=\"{name}\" placeholder=\"{placeholder}\">"
    )
}

pub fn index(flashes: &[String]) -> String {
    let body = "<ul>\n\
        <li><a href=\"/merge\">Merge PDFs</a> - combine several PDFs into one</li>\n\
        <li><a href=\"/split\">Split PDF</a> - keep selected pages</li>\n\
        <li><a href=\"/img2pdf\">Images to PDF</a> - one page per PNG or JPEG</li>\n\
        <li><a href=\"/edit_pages\">Edit pages</a> - delete, reorder and rotate</li>\n\
        <li><a href=\"/text_editor\">Text editor</a> - edit the text and rebuild a PDF</li>\n\
        </ul>\n<p>Uploaded files are deleted automatically after a few minutes.</p>";
    layout("PDF tools", flashes, body)
}

pub fn merge(flashes: &[String]) -> String {
    let fields = format!(
        "<label>PDF files, in order</label>{}",
        file_input("pdf_files", ".pdf", true)
    );
    layout("Merge PDFs", flashes, &upload_form("/merge", &fields, "Merge"))
}

pub fn split(flashes: &[String]) -> String {
    let fields = format!(
        "<label>PDF file</label>{}{}",
        file_input("pdf_file", ".pdf", false),
        text_input("pages", "Pages to keep", "1-3,5")
    );
    layout("Split PDF", flashes, &upload_form("/split", &fields, "Split"))
}

pub fn img2pdf(flashes: &[String]) -> String {
    let fields = format!(
        "<label>Images (PNG or JPEG), in order</label>{}",
        file_input("images", ".png,.jpg,.jpeg", true)
    );
    layout("Images to PDF", flashes, &upload_form("/img2pdf", &fields, "Convert"))
}

pub fn edit_pages(flashes: &[String]) -> String {
    let fields = format!(
        "<label>PDF file</label>{}{}{}{}{}",
        file_input("pdf_file", ".pdf", false),
        text_input("delete_pages", "Delete pages", "2,4-5"),
        text_input("new_order", "New order (leave blank to keep)", "3,1,2"),
        text_input("rotate_right", "Rotate 90\u{b0} clockwise", "1"),
        text_input("rotate_left", "Rotate 90\u{b0} counter-clockwise", "6-7"),
    );
    layout("Edit pages", flashes, &upload_form("/edit_pages", &fields, "Apply"))
}

pub fn text_upload(flashes: &[String]) -> String {
    let fields = format!(
        "<label>PDF file</label>{}",
        file_input("pdf_file", ".pdf", false)
    );
    layout(
        "Text editor",
        flashes,
        &upload_form("/text_editor", &fields, "Extract text"),
    )
}

/// Editor for text extracted from a document. Posting it builds a new PDF;
/// the original layout is not preserved.
pub fn text_editor(flashes: &[String], pdf_id: &str, text: &str) -> String {
    let body = format!(
        "<p>Edit the text below. The new PDF is typeset from this text; \
         the original layout, images and fonts are not kept.</p>\n\
         <form method=\"post\" action=\"/text_editor/apply\">\n\
         <input type=\"hidden\" name=\"pdf_id\" value=\"{}\">\n\
         <textarea name=\"updated_text\">{}</textarea>\n\
         <p><button type=\"submit\">Create PDF</button></p>\n</form>",
        encode_double_quoted_attribute(pdf_id),
        encode_text(text),
    );
    layout("Text editor", flashes, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashes_are_escaped() {
        let html = split(&["<script>alert(1)</script>".to_string()]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_editor_escapes_text_and_id() {
        let html = text_editor(&[], "\"x", "</textarea><b>");
        assert!(html.contains("value=\"&quot;x\""));
        assert!(html.contains("&lt;/textarea&gt;&lt;b&gt;"));
    }

    #[test]
    fn test_forms_post_to_their_routes() {
        assert!(merge(&[]).contains("action=\"/merge\""));
        assert!(img2pdf(&[]).contains("name=\"images\""));
        assert!(edit_pages(&[]).contains("name=\"rotate_left\""));
        assert!(text_upload(&[]).contains("action=\"/text_editor\""));
        assert!(index(&[]).contains("/edit_pages"));
    }
}
