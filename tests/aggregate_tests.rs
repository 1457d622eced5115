use async_trait::async_trait;
use phishwatch::analyze::{resolve_status, Analyzer};
use phishwatch::models::{IssueSource, RegistryStatus, Severity, Status};
use phishwatch::page::snapshot::page_from_html;
use phishwatch::reputation::{BusinessRegistry, DomainReputation, ReputationVerdict};

struct StubProvider {
    name: &'static str,
    kind: &'static str,
    verdict: ReputationVerdict,
}

#[async_trait]
impl DomainReputation for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> &'static str {
        self.kind
    }

    async fn check(&self, _url: &str) -> ReputationVerdict {
        self.verdict.clone()
    }
}

struct StubRegistry {
    status: Option<RegistryStatus>,
}

#[async_trait]
impl BusinessRegistry for StubRegistry {
    async fn lookup(&self, _business_number: &str) -> Option<RegistryStatus> {
        self.status.clone()
    }
}

fn malicious(name: &'static str, kind: &'static str, threats: &[&str]) -> Box<StubProvider> {
    Box::new(StubProvider {
        name,
        kind,
        verdict: ReputationVerdict::Malicious(threats.iter().map(|t| t.to_string()).collect()),
    })
}

fn clean(name: &'static str, kind: &'static str) -> Box<StubProvider> {
    Box::new(StubProvider {
        name,
        kind,
        verdict: ReputationVerdict::Clean,
    })
}

fn unknown(name: &'static str, kind: &'static str) -> Box<StubProvider> {
    Box::new(StubProvider {
        name,
        kind,
        verdict: ReputationVerdict::Unknown,
    })
}

#[tokio::test]
async fn test_clean_page_is_safe() {
    let analyzer = Analyzer::new()
        .with_provider(clean("URLhaus", "MALICIOUS_URL"))
        .with_provider(unknown("Safe Browsing", "SAFE_BROWSING_THREAT"));

    let page = page_from_html("shop.example", "<html><body><p>hello</p></body></html>");
    let report = analyzer
        .analyze_page("https://shop.example/", page.as_ref(), None)
        .await;

    assert_eq!(report.status, Status::Safe);
    assert!(report.issues.is_empty());
    assert_eq!(report.domain.providers.len(), 2);
    assert_eq!(report.domain.providers[0].malicious, Some(false));
    assert_eq!(report.domain.providers[1].malicious, None);
}

#[tokio::test]
async fn test_flagged_domain_escalates_to_danger() {
    let analyzer = Analyzer::new()
        .with_provider(malicious("URLhaus", "MALICIOUS_URL", &["malware_download"]));

    let page = page_from_html("shop.example", "<html><body></body></html>");
    let report = analyzer
        .analyze_page("https://shop.example/", page.as_ref(), None)
        .await;

    assert_eq!(report.status, Status::Danger);
    let issue = &report.issues[0];
    assert_eq!(issue.kind, "MALICIOUS_URL");
    assert_eq!(issue.severity, Severity::High);
    assert_eq!(issue.source, IssueSource::Url);
    assert!(issue.description.contains("malware_download"));
}

#[tokio::test]
async fn test_unknown_provider_contributes_no_issue() {
    let analyzer = Analyzer::new().with_provider(unknown("DNSBL", "DNS_BLACKLIST"));

    let page = page_from_html("shop.example", "<html><body></body></html>");
    let report = analyzer
        .analyze_page("https://shop.example/", page.as_ref(), None)
        .await;

    assert_eq!(report.status, Status::Safe);
    assert!(report.issues.is_empty());
}

#[tokio::test]
async fn test_invalid_business_number_flagged() {
    let analyzer = Analyzer::new().with_registry(Box::new(StubRegistry {
        status: Some(RegistryStatus {
            valid: false,
            closed: false,
            status_label: None,
            tax_type: None,
        }),
    }));

    let page = page_from_html("shop.example", "<html><body></body></html>");
    let report = analyzer
        .analyze_page("https://shop.example/", page.as_ref(), Some("1208800767"))
        .await;

    assert_eq!(report.status, Status::Danger);
    assert!(report
        .issues
        .iter()
        .any(|i| i.kind == "INVALID_BUSINESS" && i.source == IssueSource::Company));
    assert_eq!(
        report.company.as_ref().map(|c| c.business_number.as_str()),
        Some("1208800767")
    );
}

#[tokio::test]
async fn test_closed_business_flagged() {
    let analyzer = Analyzer::new().with_registry(Box::new(StubRegistry {
        status: Some(RegistryStatus {
            valid: true,
            closed: true,
            status_label: Some("폐업자".into()),
            tax_type: None,
        }),
    }));

    let page = page_from_html("shop.example", "<html><body></body></html>");
    let report = analyzer
        .analyze_page("https://shop.example/", page.as_ref(), Some("1208800767"))
        .await;

    assert_eq!(report.status, Status::Danger);
    assert!(report
        .issues
        .iter()
        .any(|i| i.kind == "CLOSED_BUSINESS" && i.source == IssueSource::Company));
}

#[tokio::test]
async fn test_unreachable_registry_contributes_no_issue() {
    let analyzer = Analyzer::new().with_registry(Box::new(StubRegistry { status: None }));

    let page = page_from_html("shop.example", "<html><body></body></html>");
    let report = analyzer
        .analyze_page("https://shop.example/", page.as_ref(), Some("1208800767"))
        .await;

    assert_eq!(report.status, Status::Safe);
    assert!(report.company.as_ref().unwrap().registry.is_none());
}

#[tokio::test]
async fn test_business_number_extracted_from_footer() {
    let html = r#"
        <html><body>
            <footer>사업자등록번호: 120-88-00767</footer>
        </body></html>
    "#;
    let analyzer = Analyzer::new().with_registry(Box::new(StubRegistry {
        status: Some(RegistryStatus {
            valid: true,
            closed: false,
            status_label: Some("계속사업자".into()),
            tax_type: Some("부가가치세 일반과세자".into()),
        }),
    }));

    let page = page_from_html("shop.example", html);
    let report = analyzer
        .analyze_page("https://shop.example/", page.as_ref(), None)
        .await;

    assert_eq!(report.status, Status::Safe);
    let company = report.company.expect("company report");
    assert_eq!(company.business_number, "1208800767");
    assert!(company.registry.unwrap().valid);
}

#[tokio::test]
async fn test_script_findings_feed_the_verdict() {
    let html = r#"
        <html><body>
            <script>document.addEventListener('keydown', grab);</script>
        </body></html>
    "#;

    let page = page_from_html("shop.example", html);
    let report = Analyzer::new()
        .analyze_page("https://shop.example/", page.as_ref(), None)
        .await;

    assert_eq!(report.status, Status::Danger);
    assert!(report
        .issues
        .iter()
        .any(|i| i.kind == "keylogger" && i.source == IssueSource::Javascript));
    assert!(!report.script.issues.is_empty());
}

#[test]
fn test_resolve_status_severity_ladder() {
    use phishwatch::models::ReportIssue;

    let high = ReportIssue::new("A", Severity::High, "", IssueSource::Url);
    let medium = ReportIssue::new("B", Severity::Medium, "", IssueSource::Url);
    let low = ReportIssue::new("C", Severity::Low, "", IssueSource::Url);

    assert_eq!(resolve_status(&[]), Status::Safe);
    assert_eq!(resolve_status(&[low.clone()]), Status::Safe);
    assert_eq!(resolve_status(&[low.clone(), medium.clone()]), Status::Warning);
    assert_eq!(resolve_status(&[medium, high]), Status::Danger);
}
