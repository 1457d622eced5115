//! Analysis front door: runs the script scan, joins the reputation and
//! registry collaborators, and resolves the overall verdict.

pub mod patterns;
pub mod script;

use crate::business;
use crate::models::{
    CompanyReport, DomainReport, IssueSource, PageReport, ProviderResult, ReportIssue, Severity,
    Status,
};
use crate::page::PageAccessor;
use crate::reputation::{BusinessRegistry, DomainReputation, ReputationVerdict};
use futures::future::join_all;

/// Overall status from the merged issue list: danger on any high, warning
/// on any medium, else safe. Total over any sequence, including empty.
pub fn resolve_status(issues: &[ReportIssue]) -> Status {
    if issues.iter().any(|i| i.severity == Severity::High) {
        Status::Danger
    } else if issues.iter().any(|i| i.severity == Severity::Medium) {
        Status::Warning
    } else {
        Status::Safe
    }
}

#[derive(Default)]
pub struct Analyzer {
    providers: Vec<Box<dyn DomainReputation>>,
    registry: Option<Box<dyn BusinessRegistry>>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Box<dyn DomainReputation>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_registry(mut self, registry: Box<dyn BusinessRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Analyze one page: script sweep, concurrent reputation checks, and
    /// business-number validation when a number is known or extractable.
    pub async fn analyze_page(
        &self,
        url: &str,
        page: &dyn PageAccessor,
        business_number: Option<&str>,
    ) -> PageReport {
        let mut issues: Vec<ReportIssue> = Vec::new();

        // Reputation checks are independent; issue them all and join.
        let checks = join_all(self.providers.iter().map(|p| p.check(url))).await;
        let mut domain = DomainReport::default();
        for (provider, verdict) in self.providers.iter().zip(checks) {
            match &verdict {
                ReputationVerdict::Malicious(threats) => {
                    let description = if threats.is_empty() {
                        format!("{} flagged this page", provider.name())
                    } else {
                        format!("{} flagged this page: {}", provider.name(), threats.join(", "))
                    };
                    issues.push(ReportIssue::new(
                        provider.kind(),
                        provider.severity(),
                        description,
                        IssueSource::Url,
                    ));
                }
                ReputationVerdict::Clean | ReputationVerdict::Unknown => {}
            }
            domain.providers.push(ProviderResult {
                provider: provider.name().to_string(),
                malicious: match &verdict {
                    ReputationVerdict::Malicious(_) => Some(true),
                    ReputationVerdict::Clean => Some(false),
                    ReputationVerdict::Unknown => None,
                },
                threats: match verdict {
                    ReputationVerdict::Malicious(threats) => threats,
                    _ => Vec::new(),
                },
            });
        }

        // Business number: explicit argument wins, otherwise the first
        // extracted candidate.
        let extracted = business::extract_from_page(page);
        let number = business_number
            .map(|n| n.to_string())
            .or_else(|| extracted.iter().next().cloned());

        let company = match (&number, &self.registry) {
            (Some(number), Some(registry)) => {
                let registry_status = registry.lookup(number).await;
                if let Some(ref status) = registry_status {
                    if !status.valid {
                        issues.push(ReportIssue::new(
                            "INVALID_BUSINESS",
                            Severity::High,
                            "Business registration number is not valid",
                            IssueSource::Company,
                        ));
                    }
                    if status.closed {
                        issues.push(ReportIssue::new(
                            "CLOSED_BUSINESS",
                            Severity::High,
                            "Business registration has been closed",
                            IssueSource::Company,
                        ));
                    }
                }
                Some(CompanyReport {
                    business_number: number.clone(),
                    registry: registry_status,
                })
            }
            (Some(number), None) => Some(CompanyReport {
                business_number: number.clone(),
                registry: None,
            }),
            (None, _) => None,
        };

        // Script findings from every same-document script body.
        let mut script = crate::models::AnalysisSnapshot::default();
        for body in page.scripts() {
            let snapshot = script::scan_script(&body);
            script.issues.extend(snapshot.issues);
            script.patterns.extend(snapshot.patterns);
        }
        for issue in &script.issues {
            issues.push(ReportIssue::new(
                issue.category.as_str(),
                issue.severity,
                issue.description.clone(),
                IssueSource::Javascript,
            ));
        }

        PageReport {
            url: url.to_string(),
            status: resolve_status(&issues),
            issues,
            script,
            domain,
            company,
            checked_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity) -> ReportIssue {
        ReportIssue::new("TEST", severity, "test", IssueSource::Url)
    }

    #[test]
    fn test_empty_issue_list_is_safe() {
        assert_eq!(resolve_status(&[]), Status::Safe);
    }

    #[test]
    fn test_medium_issue_is_warning() {
        assert_eq!(resolve_status(&[issue(Severity::Medium)]), Status::Warning);
    }

    #[test]
    fn test_any_high_issue_is_danger() {
        assert_eq!(
            resolve_status(&[issue(Severity::Low), issue(Severity::High)]),
            Status::Danger
        );
    }

    #[test]
    fn test_low_only_is_safe() {
        assert_eq!(resolve_status(&[issue(Severity::Low)]), Status::Safe);
    }
}
