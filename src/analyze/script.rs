//! Script scanner: applies the pattern catalog to one script body.
//!
//! The input is untrusted, attacker-controlled text and is only ever
//! matched against, never evaluated. Output ordering follows the
//! category enumeration, not match order.

use super::patterns::{catalog, CatalogEntry};
use crate::models::{AnalysisSnapshot, Category, DetectedPattern, Issue, Severity};
use anyhow::Result;
use tracing::debug;

/// Scan one script body against the catalog.
///
/// Never fails past this boundary: an unexpected internal error is
/// converted into a single synthetic high-severity obfuscation issue so
/// callers always receive a well-formed snapshot.
pub fn scan_script(code: &str) -> AnalysisSnapshot {
    if code.is_empty() {
        return AnalysisSnapshot::default();
    }

    match scan_inner(code) {
        Ok(snapshot) => snapshot,
        Err(err) => AnalysisSnapshot {
            issues: vec![Issue::new(
                Category::Obfuscation,
                Severity::High,
                format!("Analysis failed: {}", err),
            )],
            patterns: Vec::new(),
        },
    }
}

fn scan_inner(code: &str) -> Result<AnalysisSnapshot> {
    let mut issues = Vec::new();
    let mut patterns = Vec::new();

    for entry in catalog() {
        let offsets = match_offsets(entry, code);
        if offsets.is_empty() {
            continue;
        }

        debug!(
            category = entry.category.as_str(),
            matches = offsets.len(),
            "category hit"
        );

        issues.push(
            Issue::new(entry.category, entry.severity, entry.description)
                .with_location(location_info(code, &offsets)),
        );
        patterns.push(DetectedPattern {
            pattern: entry.signature().to_string(),
            count: offsets.len(),
            risk: 0,
        });
    }

    Ok(AnalysisSnapshot { issues, patterns })
}

/// Byte offsets of every non-overlapping match of any of the entry's rules.
fn match_offsets(entry: &CatalogEntry, code: &str) -> Vec<usize> {
    entry
        .rules()
        .iter()
        .flat_map(|rule| rule.find_iter(code).map(|m| m.start()))
        .collect()
}

/// Join the 1-based line numbers of all matches, deduplicated, in match order.
fn location_info(code: &str, offsets: &[usize]) -> String {
    let mut lines: Vec<usize> = Vec::new();
    for &offset in offsets {
        let line = line_from_offset(code, offset);
        if !lines.contains(&line) {
            lines.push(line);
        }
    }
    lines
        .iter()
        .map(|l| format!("Line {}", l))
        .collect::<Vec<_>>()
        .join(", ")
}

fn line_from_offset(code: &str, offset: usize) -> usize {
    code[..offset.min(code.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_code_yields_empty_snapshot() {
        let snapshot = scan_script("");
        assert!(snapshot.issues.is_empty());
        assert!(snapshot.patterns.is_empty());
    }

    #[test]
    fn test_benign_code_yields_empty_snapshot() {
        let snapshot = scan_script("const x = 1 + 2;\nconsole.log(x);\n");
        assert!(snapshot.issues.is_empty());
        assert!(snapshot.patterns.is_empty());
    }

    #[test]
    fn test_line_attribution() {
        let code = "var a = 1;\nvar b = 2;\ndocument.addEventListener('keydown', spy);\n";
        let snapshot = scan_script(code);

        let keylogger: Vec<_> = snapshot
            .issues
            .iter()
            .filter(|i| i.category == Category::Keylogger)
            .collect();
        assert_eq!(keylogger.len(), 1);
        assert_eq!(keylogger[0].severity, Severity::High);
        assert!(keylogger[0].location.as_deref().unwrap().contains("Line 3"));
    }

    #[test]
    fn test_one_issue_per_category_not_per_match() {
        let code = "eval(a);\neval(b);\natob(c);\n";
        let snapshot = scan_script(code);

        let obfuscation: Vec<_> = snapshot
            .issues
            .iter()
            .filter(|i| i.category == Category::Obfuscation)
            .collect();
        assert_eq!(obfuscation.len(), 1);

        let pattern = snapshot
            .patterns
            .iter()
            .find(|p| p.count >= 3)
            .expect("obfuscation pattern should count all three matches");
        assert_eq!(pattern.risk, 0);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let code = "window.location = phish;\neval(payload);\n";
        assert_eq!(scan_script(code), scan_script(code));
    }

    #[test]
    fn test_output_follows_category_order() {
        // Redirect enumerates before obfuscation even though the
        // obfuscation match appears first in the text.
        let code = "eval(x);\nwindow.location = y;\n";
        let snapshot = scan_script(code);
        let cats: Vec<Category> = snapshot.issues.iter().map(|i| i.category).collect();
        let redirect = cats.iter().position(|c| *c == Category::Redirect).unwrap();
        let obfuscation = cats.iter().position(|c| *c == Category::Obfuscation).unwrap();
        assert!(redirect < obfuscation);
    }

    #[test]
    fn test_duplicate_lines_deduplicated_in_location() {
        let code = "eval(a); eval(b);\n";
        let snapshot = scan_script(code);
        let issue = &snapshot.issues[0];
        assert_eq!(issue.location.as_deref(), Some("Line 1"));
    }
}
