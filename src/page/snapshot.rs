//! Lexical HTML snapshot: builds a [`MemoryPage`] from a captured document.
//!
//! This is deliberately not an HTML parser. The extraction is regex-based
//! and heuristic, the same posture as the script scanner: good enough to
//! surface inline scripts, iframes, hidden inputs, inline handlers and
//! style-hidden overlays from a saved page, with no attempt at full DOM
//! fidelity.

use super::{ComputedStyle, ElementInfo, MemoryPage};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<([a-zA-Z][a-zA-Z0-9-]*)((?:[^>\x22\x27]|\x22[^\x22]*\x22|\x27[^\x27]*\x27)*)>").unwrap());
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([a-zA-Z_][a-zA-Z0-9_:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});
static FOOTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(footer|address)\b[^>]*>(.*?)</(?:footer|address)>").unwrap());
static FOOTER_CONTAINER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(div|section|td|p)\b([^>]*)>(.*?)</(?:div|section|td|p)>").unwrap()
});
static STRIP_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Tags whose attributes and inline style are worth modeling.
const MODELED_TAGS: &[&str] = &["input", "iframe", "meta", "footer", "address", "div", "form", "a", "button", "img", "span"];

/// Build a page model from raw HTML. `hostname` is the host the document
/// was fetched from.
pub fn page_from_html(hostname: &str, html: &str) -> Arc<MemoryPage> {
    let page = Arc::new(MemoryPage::new(hostname));

    for caps in SCRIPT_RE.captures_iter(html) {
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        let body = caps.get(2).map_or("", |m| m.as_str());
        // External scripts have no same-document body to scan.
        if !attr_map(attrs).iter().any(|(n, _)| n == "src") && !body.trim().is_empty() {
            page.push_script(body.to_string());
        }
    }

    for caps in TAG_RE.captures_iter(html) {
        let tag = caps[1].to_ascii_lowercase();
        if tag == "script" || !MODELED_TAGS.contains(&tag.as_str()) {
            continue;
        }
        let attributes = attr_map(caps.get(2).map_or("", |m| m.as_str()));
        if !worth_modeling(&tag, &attributes) {
            continue;
        }

        let style = attributes
            .iter()
            .find(|(n, _)| n == "style")
            .map(|(_, v)| style_from_inline(v))
            .unwrap_or_default();

        let mut element = ElementInfo::new(tag);
        element.id = attr_value(&attributes, "id");
        element.name = attr_value(&attributes, "name");
        element.style = style;
        element.attributes = attributes;
        page.push_element(element);
    }

    // Footer/address text lands on dedicated elements so region-scoped
    // scans (business-number extraction) can see it.
    for caps in FOOTER_RE.captures_iter(html) {
        let mut element = ElementInfo::new(caps[1].to_ascii_lowercase());
        element.text = strip_tags(&caps[2]);
        page.push_element(element);
    }

    // Generic containers named like a footer get the same treatment.
    for caps in FOOTER_CONTAINER_RE.captures_iter(html) {
        let attributes = attr_map(caps.get(2).map_or("", |m| m.as_str()));
        let named_footer = attributes.iter().any(|(n, v)| {
            (n == "id" || n == "class") && v.to_ascii_lowercase().contains("footer")
        });
        if !named_footer {
            continue;
        }
        let mut element = ElementInfo::new(caps[1].to_ascii_lowercase());
        element.id = attr_value(&attributes, "id");
        element.text = strip_tags(&caps[3]);
        element.attributes = attributes;
        page.push_element(element);
    }

    page.set_text(html.to_string());
    page
}

fn worth_modeling(tag: &str, attributes: &[(String, String)]) -> bool {
    match tag {
        "input" | "iframe" => true,
        "meta" => attributes.iter().any(|(n, _)| n == "name"),
        // Footer/address bodies are modeled separately, with their text;
        // the open tag only matters when it carries handlers or style.
        _ => attributes
            .iter()
            .any(|(n, _)| n.starts_with("on") || n == "style"),
    }
}

fn attr_map(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map_or(String::new(), |m| m.as_str().to_string());
            (caps[1].to_ascii_lowercase(), value)
        })
        .collect()
}

fn attr_value(attributes: &[(String, String)], name: &str) -> Option<String> {
    attributes
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.clone())
}

/// Read the subset of declarations the overlay heuristics care about.
fn style_from_inline(style: &str) -> ComputedStyle {
    let mut computed = ComputedStyle::default();
    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match property.trim().to_ascii_lowercase().as_str() {
            "position" => computed.position = value,
            "z-index" => computed.z_index = value,
            "opacity" => computed.opacity = value,
            "visibility" => computed.visibility = value,
            _ => {}
        }
    }
    computed
}

fn strip_tags(html: &str) -> String {
    STRIP_TAG_RE.replace_all(html, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageAccessor;

    #[test]
    fn test_inline_scripts_extracted_external_skipped() {
        let html = r#"<html><script>eval(x);</script>
            <script src="https://cdn.example/app.js"></script></html>"#;
        let page = page_from_html("example.com", html);
        let scripts = page.scripts();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains("eval"));
    }

    #[test]
    fn test_hidden_input_and_iframe_modeled() {
        let html = r#"<form><input type="hidden" name="card"></form>
            <iframe src="https://evil.test/f"></iframe>"#;
        let page = page_from_html("example.com", html);
        let elements = page.elements();

        let input = elements.iter().find(|e| e.tag == "input").unwrap();
        assert_eq!(input.attr("type"), Some("hidden"));
        assert_eq!(input.name.as_deref(), Some("card"));

        let iframe = elements.iter().find(|e| e.tag == "iframe").unwrap();
        assert_eq!(iframe.attr("src"), Some("https://evil.test/f"));
    }

    #[test]
    fn test_inline_style_parsed() {
        let html = r#"<div style="position:fixed; z-index:9999; opacity:0"></div>"#;
        let page = page_from_html("example.com", html);
        let div = page.elements().into_iter().find(|e| e.tag == "div").unwrap();
        assert_eq!(div.style.position, "fixed");
        assert_eq!(div.style.z_index, "9999");
        assert_eq!(div.style.opacity, "0");
    }

    #[test]
    fn test_footer_text_captured() {
        let html = "<footer>사업자등록번호: 120-88-00767</footer>";
        let page = page_from_html("example.com", html);
        let footer = page.elements().into_iter().find(|e| e.tag == "footer").unwrap();
        assert!(footer.text.contains("120-88-00767"));
    }
}
