use super::{http_client, DomainReputation, ReputationVerdict};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

const ENDPOINT: &str = "https://urlhaus-api.abuse.ch/v1/url/";

#[derive(Debug, Deserialize)]
struct UrlHausResponse {
    query_status: String,
    threat: Option<String>,
}

/// URLhaus malicious-URL lookup (abuse.ch).
pub struct UrlHausProvider {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl UrlHausProvider {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            api_key: std::env::var("URLHAUS_API_KEY").ok(),
        }
    }
}

impl Default for UrlHausProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainReputation for UrlHausProvider {
    fn name(&self) -> &'static str {
        "URLhaus"
    }

    fn kind(&self) -> &'static str {
        "MALICIOUS_URL"
    }

    async fn check(&self, url: &str) -> ReputationVerdict {
        let mut request = self.client.post(ENDPOINT).form(&[("url", url)]);
        if let Some(ref key) = self.api_key {
            request = request.header("API-Key", key);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(err) => {
                warn!(%err, "URLhaus check failed");
                return ReputationVerdict::Unknown;
            }
        };

        match response.json::<UrlHausResponse>().await {
            Ok(body) if body.query_status == "listed" => {
                ReputationVerdict::Malicious(body.threat.into_iter().collect())
            }
            Ok(_) => ReputationVerdict::Clean,
            Err(err) => {
                warn!(%err, "URLhaus response was not parseable");
                ReputationVerdict::Unknown
            }
        }
    }
}
