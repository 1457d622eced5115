use super::{http_client, DomainReputation, ReputationVerdict};
use crate::models::Severity;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct CrtShEntry {
    not_after: String,
}

/// Certificate freshness check via crt.sh. Flags the domain when no
/// current certificate is on record; lookup failures are unknown.
pub struct CertificateProvider {
    client: reqwest::Client,
}

impl CertificateProvider {
    pub fn new() -> Self {
        Self {
            client: http_client(),
        }
    }
}

impl Default for CertificateProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainReputation for CertificateProvider {
    fn name(&self) -> &'static str {
        "Certificate"
    }

    fn kind(&self) -> &'static str {
        "INVALID_SSL"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    async fn check(&self, url: &str) -> ReputationVerdict {
        let Some(domain) = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
        else {
            return ReputationVerdict::Unknown;
        };

        let request = self
            .client
            .get("https://crt.sh/")
            .query(&[("q", domain.as_str()), ("output", "json")]);

        let entries = match request.send().await {
            Ok(response) => match response.json::<Vec<CrtShEntry>>().await {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(%err, "certificate lookup response was not parseable");
                    return ReputationVerdict::Unknown;
                }
            },
            Err(err) => {
                warn!(%err, "certificate lookup failed");
                return ReputationVerdict::Unknown;
            }
        };

        let now = chrono::Utc::now().naive_utc();
        let has_current = entries.iter().any(|entry| {
            NaiveDateTime::parse_from_str(&entry.not_after, "%Y-%m-%dT%H:%M:%S")
                .map_or(false, |valid_to| valid_to > now)
        });

        if has_current {
            ReputationVerdict::Clean
        } else {
            ReputationVerdict::Malicious(vec!["no valid certificate on record".into()])
        }
    }
}
