//! Domain-reputation and business-registry collaborators.
//!
//! Every provider is an opaque async check returning a tri-state verdict:
//! malicious (with threat labels), clean, or unknown when the check could
//! not complete. Unknown never blocks or escalates the overall verdict.

pub mod certificate;
pub mod dnsbl;
pub mod registry;
pub mod safebrowsing;
pub mod urlhaus;

pub use certificate::CertificateProvider;
pub use dnsbl::{DnsBlacklistProvider, SurblProvider};
pub use registry::{BusinessRegistry, NtsRegistry};
pub use safebrowsing::SafeBrowsingProvider;
pub use urlhaus::UrlHausProvider;

use crate::models::Severity;
use async_trait::async_trait;
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReputationVerdict {
    Malicious(Vec<String>),
    Clean,
    /// The check failed or was unavailable; contributes no issue.
    Unknown,
}

#[async_trait]
pub trait DomainReputation: Send + Sync {
    fn name(&self) -> &'static str;

    /// Issue kind reported when this provider flags the domain.
    fn kind(&self) -> &'static str;

    fn severity(&self) -> Severity {
        Severity::High
    }

    async fn check(&self, url: &str) -> ReputationVerdict;
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("phishwatch/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}
