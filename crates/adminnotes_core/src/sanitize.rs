//! Allow-list HTML filter applied to note content before persistence.
//!
//! # Responsibility
//! - Strip script-bearing and unknown markup from submitted HTML.
//! - Keep benign formatting tags produced by rich-text editors.
//!
//! # Invariants
//! - Output contains only allow-listed tags, re-emitted lower-case with
//!   double-quoted allow-listed attributes.
//! - `clean(clean(x)) == clean(x)`.
//! - Any `<` that does not open an emitted tag is escaped as `&lt;`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "caption", "code", "col", "colgroup", "dd", "del", "div", "dl",
    "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img",
    "ins", "li", "mark", "ol", "p", "pre", "s", "small", "span", "strike", "strong", "sub", "sup",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "u", "ul",
];

const ALLOWED_ATTRIBUTES: &[&str] = &[
    "align", "alt", "class", "colspan", "height", "href", "rel", "rowspan", "src", "style",
    "target", "title", "width",
];

/// Elements removed together with everything inside them.
const BLOCKED_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "applet", "noscript", "template", "frameset",
    "frame", "xml", "svg", "math", "title",
];

const URL_ATTRIBUTES: &[&str] = &["href", "src"];
const BLOCKED_SCHEMES: &[&str] = &["javascript", "vbscript", "livescript", "data"];
const BLOCKED_STYLE_FRAGMENTS: &[&str] =
    &["expression(", "javascript:", "url(", "behavior:", "-moz-binding"];

static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static BLOCKED_ELEMENT_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    BLOCKED_ELEMENTS
        .iter()
        .map(|name| {
            Regex::new(&format!(r"(?is)<{name}\b[^>]*>.*?</{name}\s*>"))
                .expect("valid blocked element regex")
        })
        .collect()
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)\b([^<>]*)>").expect("valid tag regex")
});
static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
    )
    .expect("valid attribute regex")
});
static STRAY_LT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z!/?])").expect("valid stray tag regex"));
static CHARACTER_REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#([0-9]+);?|#[xX]([0-9A-Fa-f]+);?|([A-Za-z][A-Za-z0-9]*);)")
        .expect("valid character reference regex")
});

/// Named references browsers decode inside attribute values that can hide
/// a scheme or a style keyword.
const NAMED_REFERENCES: &[(&str, char)] = &[
    ("Tab", '\t'),
    ("NewLine", '\n'),
    ("colon", ':'),
    ("nbsp", '\u{a0}'),
    ("lpar", '('),
    ("rpar", ')'),
    ("sol", '/'),
    ("bsol", '\\'),
    ("semi", ';'),
    ("period", '.'),
    ("amp", '&'),
    ("quot", '"'),
    ("apos", '\''),
    ("lt", '<'),
    ("gt", '>'),
];

/// Allow-list HTML filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFilter;

impl HtmlFilter {
    pub fn new() -> Self {
        Self
    }

    /// Returns `input` with disallowed markup removed.
    pub fn clean(&self, input: &str) -> String {
        let mut html = COMMENT_RE.replace_all(input, "").into_owned();
        for element in BLOCKED_ELEMENT_RES.iter() {
            html = element.replace_all(&html, "").into_owned();
        }

        let mut output = String::with_capacity(html.len());
        let mut last_end = 0;
        for caps in TAG_RE.captures_iter(&html) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            output.push_str(&escape_stray_tags(&html[last_end..whole.start()]));
            if let Some(tag) = rebuild_tag(&caps) {
                output.push_str(&tag);
            }
            last_end = whole.end();
        }
        output.push_str(&escape_stray_tags(&html[last_end..]));
        output
    }
}

fn rebuild_tag(caps: &Captures<'_>) -> Option<String> {
    let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    let name = caps.get(2)?.as_str().to_ascii_lowercase();
    if !ALLOWED_TAGS.contains(&name.as_str()) {
        return None;
    }
    if closing {
        return Some(format!("</{name}>"));
    }

    let mut tag = format!("<{name}");
    let raw_attributes = caps.get(3).map_or("", |m| m.as_str());
    for attr in ATTRIBUTE_RE.captures_iter(raw_attributes) {
        let Some(attr_name) = attr.get(1).map(|m| m.as_str().to_ascii_lowercase()) else {
            continue;
        };
        let value = attr.get(2).or(attr.get(3)).or(attr.get(4));
        let Some(value) = value.map(|m| m.as_str()) else {
            continue;
        };
        if !attribute_allowed(&attr_name, value) {
            continue;
        }
        tag.push(' ');
        tag.push_str(&attr_name);
        tag.push_str("=\"");
        tag.push_str(&value.replace('"', "&quot;"));
        tag.push('"');
    }
    tag.push('>');
    Some(tag)
}

fn attribute_allowed(name: &str, value: &str) -> bool {
    if !ALLOWED_ATTRIBUTES.contains(&name) {
        return false;
    }
    let normalized = normalize_attribute_value(value);
    if URL_ATTRIBUTES.contains(&name) {
        return url_allowed(&normalized);
    }
    if name == "style" {
        return !BLOCKED_STYLE_FRAGMENTS
            .iter()
            .any(|fragment| normalized.contains(fragment));
    }
    true
}

/// A `:` before any `/`, `?` or `#` ends the scheme. Schemes still holding
/// an undecoded reference are refused.
fn url_allowed(normalized: &str) -> bool {
    let Some((scheme, _)) = normalized.split_once(':') else {
        return true;
    };
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    !scheme.contains('&') && !BLOCKED_SCHEMES.contains(&scheme)
}

/// Decodes character references in one pass, lower-cases, then drops
/// whitespace and control characters, the way browsers tolerate them.
fn normalize_attribute_value(value: &str) -> String {
    let decoded = CHARACTER_REFERENCE_RE.replace_all(value, |caps: &Captures<'_>| {
        if let Some(decimal) = caps.get(1) {
            return code_point(decimal.as_str(), 10);
        }
        if let Some(hex) = caps.get(2) {
            return code_point(hex.as_str(), 16);
        }
        let name = caps.get(3).map_or("", |m| m.as_str());
        NAMED_REFERENCES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, ch)| ch.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    });
    decoded
        .to_ascii_lowercase()
        .chars()
        .filter(|ch| !ch.is_whitespace() && !ch.is_control())
        .collect()
}

fn code_point(digits: &str, radix: u32) -> String {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
        .to_string()
}

fn escape_stray_tags(text: &str) -> String {
    STRAY_LT_RE.replace_all(text, "&lt;$1").into_owned()
}
