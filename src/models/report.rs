use super::{AnalysisSnapshot, Severity, Status};
use serde::{Deserialize, Serialize};

/// Where an aggregate-level issue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSource {
    Url,
    Company,
    Javascript,
}

/// Verdict-level issue: script findings, reputation hits and registry
/// problems all normalize into this shape before status resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportIssue {
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    pub source: IssueSource,
}

impl ReportIssue {
    pub fn new(
        kind: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        source: IssueSource,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            description: description.into(),
            source,
        }
    }
}

/// Outcome of one reputation provider, kept for the report detail section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider: String,
    /// `None` means the check was unavailable (treated as unknown).
    pub malicious: Option<bool>,
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainReport {
    pub providers: Vec<ProviderResult>,
}

/// Registry answer for one business number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStatus {
    pub valid: bool,
    pub closed: bool,
    pub status_label: Option<String>,
    pub tax_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyReport {
    pub business_number: String,
    /// `None` when the registry was unreachable.
    pub registry: Option<RegistryStatus>,
}

/// Full analysis result for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    pub url: String,
    pub status: Status,
    pub issues: Vec<ReportIssue>,
    pub script: AnalysisSnapshot,
    pub domain: DomainReport,
    pub company: Option<CompanyReport>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}
