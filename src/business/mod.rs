//! Business registration number extraction and checksum validation.
//!
//! Finds 10-digit Korean business registration numbers
//! (###-##-#####) in page text, normalizes them and keeps only the
//! candidates whose weighted check digit is correct. Independent of the
//! script scanner and monitor.

use crate::page::{ElementInfo, PageAccessor};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// ###-##-##### with optional separators.
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{3}[-\s]?\d{2}[-\s]?\d{5}").unwrap());

/// The same shape anchored to a business/registration keyword, so prose
/// like "사업자등록번호: 120-88-00767" is found even in noisy text.
static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:사업자\s*등록\s*번호|사업자\s*번호|business\s*registration|registration\s*(?:number|no)|business\s*(?:number|no))\D{0,20}(\d{3}[-\s]?\d{2}[-\s]?\d{5})",
    )
    .unwrap()
});

const WEIGHTS: [u32; 9] = [1, 3, 7, 1, 3, 7, 1, 3, 5];

/// Meta names that plausibly carry company metadata.
const BUSINESS_META_NAMES: &[&str] = &["business", "company", "corp", "contact", "author"];

/// Validate a normalized 10-digit number against the weighted checksum:
/// sum the first nine digits times [1,3,7,1,3,7,1,3,5], add
/// floor(d9 * 5 / 10), and compare (10 - sum mod 10) mod 10 with the
/// tenth digit.
pub fn validate(number: &str) -> bool {
    if number.len() != 10 {
        return false;
    }
    let digits: Vec<u32> = number.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 10 {
        return false;
    }

    let mut sum: u32 = digits[..9]
        .iter()
        .zip(WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();
    sum += digits[8] * 5 / 10;

    (10 - sum % 10) % 10 == digits[9]
}

/// Strip separators; `None` unless exactly ten digits remain.
fn normalize(candidate: &str) -> Option<String> {
    let digits: String = candidate.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() == 10).then_some(digits)
}

/// Extract every checksum-valid business number from a text blob.
pub fn extract_from_text(text: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();

    for m in NUMBER_RE.find_iter(text) {
        collect_candidate(m.as_str(), &mut found);
    }
    for caps in KEYWORD_RE.captures_iter(text) {
        collect_candidate(&caps[1], &mut found);
    }

    found
}

/// Extract from a page model: the full page text plus the prioritized
/// regions (footer-like containers, business-related meta tags).
pub fn extract_from_page(page: &dyn PageAccessor) -> BTreeSet<String> {
    let mut found = extract_from_text(&page.text());

    for element in page.elements() {
        if footer_like(&element) {
            found.extend(extract_from_text(&element.text));
        } else if element.tag == "meta" {
            let business_meta = element.attr("name").map_or(false, |name| {
                let name = name.to_ascii_lowercase();
                BUSINESS_META_NAMES.iter().any(|k| name.contains(k))
            });
            if business_meta {
                if let Some(content) = element.attr("content") {
                    found.extend(extract_from_text(content));
                }
            }
        }
    }

    found
}

/// Footer/address tags, plus any container whose id or class names it a
/// footer.
fn footer_like(element: &ElementInfo) -> bool {
    if matches!(element.tag.as_str(), "footer" | "address") {
        return true;
    }
    let named = |value: &str| value.to_ascii_lowercase().contains("footer");
    element.id.as_deref().map_or(false, named)
        || element.attr("class").map_or(false, named)
}

fn collect_candidate(raw: &str, found: &mut BTreeSet<String>) {
    if let Some(normalized) = normalize(raw) {
        if validate(&normalized) {
            found.insert(normalized);
        }
    }
}
