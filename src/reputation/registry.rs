//! Business-registry validation against the Korean NTS open API, with a
//! 24-hour in-memory result cache and bounded retries.

use super::http_client;
use crate::models::RegistryStatus;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

const BASE_URL: &str = "https://api.odcloud.kr/api/nts-businessman/v1";
const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Business status code meaning the registration was closed.
const STATUS_CLOSED: &str = "03";

#[async_trait]
pub trait BusinessRegistry: Send + Sync {
    /// `None` means the registry could not be reached (unknown); unknown
    /// contributes no issue to the verdict.
    async fn lookup(&self, business_number: &str) -> Option<RegistryStatus>;
}

#[derive(Debug, Deserialize)]
struct NtsRecord {
    valid: Option<String>,
    b_stt: Option<String>,
    b_stt_cd: Option<String>,
    tax_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NtsResponse {
    data: Vec<NtsRecord>,
}

pub struct NtsRegistry {
    client: reqwest::Client,
    service_key: String,
    cache: Mutex<HashMap<String, (Instant, RegistryStatus)>>,
}

impl NtsRegistry {
    /// Build from `NTS_SERVICE_KEY`; `None` without a key.
    pub fn from_env() -> Option<Self> {
        let service_key = std::env::var("NTS_SERVICE_KEY").ok()?;
        Some(Self {
            client: http_client(),
            service_key,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn cached(&self, business_number: &str) -> Option<RegistryStatus> {
        let cache = self.cache.lock().unwrap();
        let (stored_at, status) = cache.get(business_number)?;
        (stored_at.elapsed() < CACHE_TTL).then(|| status.clone())
    }

    fn store(&self, business_number: &str, status: RegistryStatus) {
        self.cache
            .lock()
            .unwrap()
            .insert(business_number.to_string(), (Instant::now(), status));
    }

    async fn request(&self, endpoint: &str, business_number: &str) -> Option<NtsRecord> {
        let url = format!(
            "{}/{}?serviceKey={}",
            BASE_URL, endpoint, self.service_key
        );
        let body = json!({ "b_no": [business_number] });

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                tokio::time::sleep(RETRY_DELAY).await;
            }
            match self.client.post(&url).json(&body).send().await {
                Ok(response) => match response.json::<NtsResponse>().await {
                    Ok(mut parsed) if !parsed.data.is_empty() => {
                        return Some(parsed.data.remove(0));
                    }
                    Ok(_) => return None,
                    Err(err) => {
                        warn!(%err, endpoint, "registry response was not parseable");
                        return None;
                    }
                },
                Err(err) => {
                    warn!(%err, endpoint, attempt, "registry request failed");
                }
            }
        }
        None
    }
}

#[async_trait]
impl BusinessRegistry for NtsRegistry {
    async fn lookup(&self, business_number: &str) -> Option<RegistryStatus> {
        if let Some(status) = self.cached(business_number) {
            return Some(status);
        }

        // Validity and live status come from separate endpoints; issue
        // both together.
        let (validity, status) = tokio::join!(
            self.request("validate", business_number),
            self.request("status", business_number),
        );
        let validity = validity?;
        let status = status?;

        let result = RegistryStatus {
            valid: validity.valid.as_deref() == Some("Y"),
            closed: status.b_stt_cd.as_deref() == Some(STATUS_CLOSED),
            status_label: status.b_stt,
            tax_type: status.tax_type,
        };
        self.store(business_number, result.clone());
        Some(result)
    }
}
