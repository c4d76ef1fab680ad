//! Panel view model and HTML output.
//!
//! Content handed to these functions is already sanitized; titles, URLs and
//! other host strings are escaped here.

use super::urls::PanelUrls;
use crate::model::module::ModuleId;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// File name offered for the plain-text download.
pub const DOWNLOAD_FILE_NAME: &str = "adminnotes.txt";

static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break regex"));
static BLOCK_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(p|div|h[1-6]|li|tr|blockquote|pre|ul|ol|table|dt|dd|figcaption)\s*>")
        .expect("valid block end regex")
});
static ANY_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag strip regex"));
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9A-Fa-f]+|#[0-9]+|[A-Za-z]+);").expect("valid entity regex")
});
static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid blank lines regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    Edit,
    Read,
}

/// Everything the panel template needs for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub module_id: ModuleId,
    pub title: String,
    pub mode: PanelMode,
    /// Prepared (sanitized) content HTML.
    pub content: String,
    pub can_edit: bool,
    pub show_print: bool,
    pub show_download: bool,
    /// Rich-text editor plugin bound to the form field.
    pub editor: String,
    pub urls: PanelUrls,
    /// Name of the host's anti-forgery form field.
    pub form_token: String,
}

/// Renders the panel body.
pub fn render_html(view: &PanelView) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<div id=\"adminnotes-module\" class=\"m-3\" data-module-id=\"{}\">",
        view.module_id
    ));

    match view.mode {
        PanelMode::Edit => {
            html.push_str("<div id=\"printArea\" style=\"display: none;\">");
            html.push_str(&view.content);
            html.push_str("</div>");
            html.push_str(&format!(
                "<form action=\"{}\" method=\"post\" id=\"AdminnotesForm\">",
                escape_html(&view.urls.current)
            ));
            html.push_str(&format!(
                "<textarea name=\"data\" id=\"data\" class=\"adminnotes-editor\" data-editor=\"{}\" cols=\"60\" rows=\"20\" style=\"width: 100%; height: 500px;\">{}</textarea>",
                escape_html(&view.editor),
                escape_html(&view.content)
            ));
            html.push_str("<input type=\"hidden\" name=\"task\" value=\"save\">");
            html.push_str(&format!(
                "<input type=\"hidden\" name=\"{}\" value=\"1\">",
                escape_html(&view.form_token)
            ));
            html.push_str("<div class=\"buttons d-flex\"><div>");
            html.push_str(
                "<button type=\"submit\" class=\"btn btn-success mt-3\" id=\"save-button\">Apply</button>",
            );
            html.push_str("</div>");
            push_actions(&mut html, view);
            html.push_str("</div></form>");
        }
        PanelMode::Read => {
            html.push_str("<div id=\"printArea\">");
            html.push_str(&view.content);
            html.push_str("</div>");
            html.push_str("<div class=\"buttons d-flex\"><div>");
            if view.can_edit {
                html.push_str(&format!(
                    "<a class=\"btn btn-success mt-3\" href=\"{}\">Edit</a>",
                    escape_html(&view.urls.edit)
                ));
            }
            html.push_str("</div>");
            push_actions(&mut html, view);
            html.push_str("</div>");
        }
    }

    html.push_str("</div>");
    html
}

fn push_actions(html: &mut String, view: &PanelView) {
    html.push_str("<div class=\"ms-auto\">");
    if view.show_print {
        html.push_str(
            "<button type=\"button\" class=\"btn btn-primary mt-3\" data-action=\"print\">Print</button>",
        );
    }
    if view.show_download {
        html.push_str(&format!(
            "<button type=\"button\" class=\"btn btn-primary mt-3 ms-2\" data-action=\"download\" data-filename=\"{DOWNLOAD_FILE_NAME}\">Download</button>"
        ));
    }
    html.push_str("</div>");
}

/// Standalone printable page for the note content.
pub fn print_document(title: &str, site_name: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{} - {}</title><style>body {{ font-family: Arial, sans-serif; padding: 20px; }}</style></head><body><div>{}</div></body></html>",
        escape_html(title),
        escape_html(site_name),
        content
    )
}

/// Plain-text extraction of note content for the download action.
pub fn download_text(content: &str) -> String {
    let with_breaks = LINE_BREAK_RE.replace_all(content, "\n");
    let with_blocks = BLOCK_END_RE.replace_all(&with_breaks, "\n");
    let stripped = ANY_TAG_RE.replace_all(&with_blocks, "");
    let decoded = ENTITY_RE.replace_all(&stripped, |caps: &Captures<'_>| decode_entity(&caps[1]));
    let lines = decoded
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_LINES_RE
        .replace_all(&lines, "\n\n")
        .trim()
        .to_string()
}

fn decode_entity(entity: &str) -> String {
    let numeric = if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    if let Some(ch) = numeric.and_then(char::from_u32) {
        return ch.to_string();
    }

    let named = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        other => return format!("&{other};"),
    };
    named.to_string()
}

/// Escapes text for HTML element content and double-quoted attributes.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{download_text, escape_html, print_document};

    #[test]
    fn download_text_strips_markup_and_keeps_line_structure() {
        let text = download_text(
            "<h2>Todo</h2><p>Call <strong>Anna</strong> &amp; Piet<br>today</p><ul><li>one</li><li>two</li></ul>",
        );
        assert_eq!(text, "Todo\nCall Anna & Piet\ntoday\none\ntwo");
    }

    #[test]
    fn download_text_decodes_entities_once() {
        assert_eq!(download_text("a &amp;lt; b &#65;&#x42; &nbsp;c"), "a &lt; b AB  c");
        assert_eq!(download_text("&unknown;"), "&unknown;");
    }

    #[test]
    fn print_document_escapes_title_and_site_name() {
        let doc = print_document("<Notes>", "Site \"A\"", "<p>x</p>");
        assert!(doc.contains("<title>&lt;Notes&gt; - Site &quot;A&quot;</title>"));
        assert!(doc.contains("<body><div><p>x</p></div></body>"));
    }

    #[test]
    fn escape_html_covers_quotes() {
        assert_eq!(escape_html(r#"<a href="x">'"#), "&lt;a href=&quot;x&quot;&gt;&#39;");
    }
}
