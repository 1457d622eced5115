mod issue;
mod report;

pub use issue::{AnalysisSnapshot, Category, DetectedPattern, Issue, Severity, Status};
pub use report::{
    CompanyReport, DomainReport, IssueSource, PageReport, ProviderResult, RegistryStatus,
    ReportIssue,
};
