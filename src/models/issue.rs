use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

/// Malicious-behavior classes detected by lexical or page-model matching.
///
/// The set is closed: every category owns exactly one severity and one
/// description in the pattern catalog, and scanner output is ordered by
/// this enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BrowserExploit,
    DataExfiltration,
    Xss,
    Keylogger,
    FormHijacking,
    Redirect,
    Obfuscation,
    Communication,
    SecurityViolation,
    WorkerCreation,
    SensitiveApiUsage,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::BrowserExploit,
        Category::DataExfiltration,
        Category::Xss,
        Category::Keylogger,
        Category::FormHijacking,
        Category::Redirect,
        Category::Obfuscation,
        Category::Communication,
        Category::SecurityViolation,
        Category::WorkerCreation,
        Category::SensitiveApiUsage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BrowserExploit => "browser-exploit",
            Category::DataExfiltration => "data-exfiltration",
            Category::Xss => "xss",
            Category::Keylogger => "keylogger",
            Category::FormHijacking => "form-hijacking",
            Category::Redirect => "redirect",
            Category::Obfuscation => "obfuscation",
            Category::Communication => "communication",
            Category::SecurityViolation => "security-violation",
            Category::WorkerCreation => "worker-creation",
            Category::SensitiveApiUsage => "sensitive-api-usage",
        }
    }
}

/// One reported finding. `location` is a best-effort human-readable pointer
/// (source lines, element descriptor, frame origin) and never part of the
/// category identity; duplicates collapse by full value equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    pub category: Category,
    pub severity: Severity,
    pub description: String,
    pub location: Option<String>,
}

impl Issue {
    pub fn new(category: Category, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            description: description.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Diagnostic telemetry about one matched category. Not used for verdicts;
/// `risk` is unscored and kept at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub pattern: String,
    pub count: usize,
    pub risk: u32,
}

/// Result of one scan invocation. Produced fresh every time; two scans of
/// the same input compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub issues: Vec<Issue>,
    pub patterns: Vec<DetectedPattern>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Safe,
    Warning,
    Danger,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Safe => "SAFE",
            Status::Warning => "WARNING",
            Status::Danger => "DANGER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_dedup_by_value() {
        let a = Issue::new(Category::Keylogger, Severity::High, "keylogger")
            .with_location("Line 3");
        let b = Issue::new(Category::Keylogger, Severity::High, "keylogger")
            .with_location("Line 3");
        let c = Issue::new(Category::Keylogger, Severity::High, "keylogger")
            .with_location("Line 4");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::High < Severity::Medium);
        assert!(Severity::Medium < Severity::Low);
    }
}
