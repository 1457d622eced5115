use super::{http_client, DomainReputation, ReputationVerdict};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

const ENDPOINT: &str = "https://safebrowsing.googleapis.com/v4/threatMatches:find";

#[derive(Debug, Deserialize)]
struct ThreatMatch {
    #[serde(rename = "threatType")]
    threat_type: String,
}

#[derive(Debug, Default, Deserialize)]
struct SafeBrowsingResponse {
    #[serde(default)]
    matches: Vec<ThreatMatch>,
}

/// Google Safe Browsing v4 lookup. Requires `SAFE_BROWSING_API_KEY`;
/// without a key every check is unknown.
pub struct SafeBrowsingProvider {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl SafeBrowsingProvider {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            api_key: std::env::var("SAFE_BROWSING_API_KEY").ok(),
        }
    }
}

impl Default for SafeBrowsingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainReputation for SafeBrowsingProvider {
    fn name(&self) -> &'static str {
        "Safe Browsing"
    }

    fn kind(&self) -> &'static str {
        "SAFE_BROWSING_THREAT"
    }

    async fn check(&self, url: &str) -> ReputationVerdict {
        let Some(ref key) = self.api_key else {
            return ReputationVerdict::Unknown;
        };

        let body = json!({
            "client": {
                "clientId": "phishwatch",
                "clientVersion": env!("CARGO_PKG_VERSION"),
            },
            "threatInfo": {
                "threatTypes": ["MALWARE", "SOCIAL_ENGINEERING", "UNWANTED_SOFTWARE"],
                "platformTypes": ["ANY_PLATFORM"],
                "threatEntryTypes": ["URL"],
                "threatEntries": [{ "url": url }],
            },
        });

        let response = match self
            .client
            .post(format!("{}?key={}", ENDPOINT, key))
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                warn!(%err, "Safe Browsing check failed");
                return ReputationVerdict::Unknown;
            }
        };

        match response.json::<SafeBrowsingResponse>().await {
            Ok(body) if !body.matches.is_empty() => ReputationVerdict::Malicious(
                body.matches.into_iter().map(|m| m.threat_type).collect(),
            ),
            Ok(_) => ReputationVerdict::Clean,
            Err(err) => {
                warn!(%err, "Safe Browsing response was not parseable");
                ReputationVerdict::Unknown
            }
        }
    }
}
