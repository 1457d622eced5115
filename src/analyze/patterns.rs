//! Pattern catalog: the fixed taxonomy of malicious-behavior signatures.
//!
//! Each category owns an ordered rule list, one severity and one
//! description, defined here as static data and compiled once on first
//! use. Matching is lexical only; the catalog is a heuristic detector,
//! not a parser, and false negatives on heavily obfuscated code are
//! expected.

use crate::models::{Category, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

struct RawEntry {
    category: Category,
    severity: Severity,
    description: &'static str,
    rules: &'static [&'static str],
}

/// Raw rule table, in category enumeration order.
const RAW_CATALOG: &[RawEntry] = &[
    RawEntry {
        category: Category::BrowserExploit,
        severity: Severity::High,
        description: "Code abusing browser internals detected",
        rules: &[
            r"\.prototype\.(constructor|__proto__|__defineGetter__|__defineSetter__)",
            r"Object\.defineProperty",
            r"\.constructor\.constructor",
            r#"\[\s*['"]constructor['"]\s*\]"#,
            r"with\s*\(",
            r"debugger",
        ],
    },
    RawEntry {
        category: Category::DataExfiltration,
        severity: Severity::High,
        description: "Data exfiltration attempt detected",
        rules: &[
            r"\.send\(.*localStorage",
            r"\.send\(.*sessionStorage",
            r"navigator\.sendBeacon",
            r#"fetch\(\s*['"](https?:)?//"#,
            r"new\s+WebSocket\(",
            r"\.upload\(",
            r"\.ajax\(",
            r"\.post\(",
        ],
    },
    RawEntry {
        category: Category::Xss,
        severity: Severity::High,
        description: "Cross-site scripting attempt detected",
        rules: &[
            r"document\.write",
            r"\.innerHTML\s*=",
            r"\.outerHTML\s*=",
            r"\.insertAdjacentHTML",
            r#"\$\(['"].*['"]\)\.html\("#,
            r"execScript",
            r#"setInterval\(['"]"#,
            r#"setTimeout\(['"]"#,
            r#"new\s+Function\(['"]"#,
        ],
    },
    RawEntry {
        category: Category::Keylogger,
        severity: Severity::High,
        description: "Keyboard-input monitoring code detected",
        rules: &[
            r#"addEventListener\(['"](keydown|keyup|keypress)['"]"#,
            r"document\.onkeydown",
            r"document\.onkeyup",
            r"document\.onkeypress",
            r"\.keyCode",
            r"\.key\s*===",
            r"\.charCode",
        ],
    },
    RawEntry {
        category: Category::FormHijacking,
        severity: Severity::High,
        description: "Form-data interception code detected",
        rules: &[
            r#"addEventListener\(['"]submit['"]"#,
            r"\.submit\(\)",
            r"form\.elements",
            r"\.preventDefault\(\)",
            r"form\.action\s*=",
            r"new\s+FormData",
            r#"querySelector\(['"](input|form|select|textarea)"#,
        ],
    },
    RawEntry {
        category: Category::Redirect,
        severity: Severity::Medium,
        description: "Page redirection code detected",
        rules: &[
            r"window\.location",
            r"document\.location",
            r"location\.href",
            r"location\.replace",
            r"history\.pushState",
            r"history\.replaceState",
            r"window\.navigate",
        ],
    },
    RawEntry {
        category: Category::Obfuscation,
        severity: Severity::Medium,
        description: "Suspicious code obfuscation detected",
        rules: &[
            r"eval\(",
            r"Function\(",
            r"fromCharCode",
            r"atob\(",
            r"btoa\(",
            r"unescape\(",
            r"decodeURIComponent\(",
        ],
    },
    RawEntry {
        category: Category::Communication,
        severity: Severity::Medium,
        description: "Cross-window communication attempt detected",
        rules: &[r"postMessage", r"MessageChannel", r"BroadcastChannel"],
    },
    RawEntry {
        category: Category::SecurityViolation,
        severity: Severity::High,
        description: "Security policy violation detected",
        rules: &[r"SecurityPolicyViolation", r"SecurityError"],
    },
    RawEntry {
        category: Category::WorkerCreation,
        severity: Severity::Medium,
        description: "Web worker usage detected",
        rules: &[r"new\s+Worker", r"serviceWorker\.register", r"SharedWorker"],
    },
    RawEntry {
        category: Category::SensitiveApiUsage,
        severity: Severity::Medium,
        description: "Sensitive API usage detected",
        rules: &[
            r"navigator\.",
            r"window\.crypto",
            r"localStorage\.",
            r"sessionStorage\.",
        ],
    },
];

/// One catalog entry with its rules compiled.
pub struct CatalogEntry {
    pub category: Category,
    pub severity: Severity,
    pub description: &'static str,
    rules: Vec<Regex>,
    signature: String,
}

impl CatalogEntry {
    pub fn rules(&self) -> &[Regex] {
        &self.rules
    }

    /// Combined source text of the category's rules, used as the
    /// `DetectedPattern` signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

static CATALOG: Lazy<Vec<CatalogEntry>> = Lazy::new(|| {
    RAW_CATALOG
        .iter()
        .map(|raw| {
            // A rule that fails to compile is skipped, never fatal; the
            // rest of the category still matches.
            let rules: Vec<Regex> = raw
                .rules
                .iter()
                .filter_map(|source| match Regex::new(source) {
                    Ok(re) => Some(re),
                    Err(err) => {
                        warn!(
                            category = raw.category.as_str(),
                            %source,
                            %err,
                            "skipping invalid rule"
                        );
                        None
                    }
                })
                .collect();
            CatalogEntry {
                category: raw.category,
                severity: raw.severity,
                description: raw.description,
                signature: raw.rules.join("|"),
                rules,
            }
        })
        .collect()
});

/// The compiled catalog, in category enumeration order.
pub fn catalog() -> &'static [CatalogEntry] {
    &CATALOG
}

/// Severity of a category. Total, constant function.
pub fn severity_of(category: Category) -> Severity {
    RAW_CATALOG
        .iter()
        .find(|e| e.category == category)
        .map(|e| e.severity)
        .unwrap_or(Severity::Medium)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_total_over_categories() {
        // Every category appears exactly once, with rules and a description.
        for category in Category::ALL {
            let entries: Vec<_> = catalog()
                .iter()
                .filter(|e| e.category == category)
                .collect();
            assert_eq!(entries.len(), 1, "category {:?} must have one entry", category);
            assert!(!entries[0].rules().is_empty());
            assert!(!entries[0].description.is_empty());
        }
        assert_eq!(catalog().len(), Category::ALL.len());
    }

    #[test]
    fn test_catalog_follows_enumeration_order() {
        let order: Vec<Category> = catalog().iter().map(|e| e.category).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }

    #[test]
    fn test_all_rules_compile() {
        for (entry, raw) in catalog().iter().zip(RAW_CATALOG) {
            assert_eq!(entry.rules().len(), raw.rules.len());
        }
    }

    #[test]
    fn test_severity_is_constant() {
        for entry in catalog() {
            assert_eq!(severity_of(entry.category), entry.severity);
        }
    }
}
