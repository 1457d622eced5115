//! DNS-based blacklists: DNSBL (listed sending IPs) and SURBL (listed
//! domains). A zone lists an entry iff the constructed query name
//! resolves; resolution errors mean "not listed", an unresolvable target
//! host means the whole check is unknown.

use super::{DomainReputation, ReputationVerdict};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use tokio::net::lookup_host;
use tracing::debug;

const DNSBL_ZONES: &[&str] = &["zen.spamhaus.org", "bl.spamcop.net", "dnsbl.sorbs.net"];
const SURBL_ZONES: &[&str] = &["multi.surbl.org", "multi.uribl.com"];

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

async fn resolves(name: &str) -> bool {
    lookup_host((name, 80u16)).await.map_or(false, |mut addrs| addrs.next().is_some())
}

/// IP-based DNS blacklist check against the configured DNSBL zones.
pub struct DnsBlacklistProvider;

impl DnsBlacklistProvider {
    pub fn new() -> Self {
        Self
    }

    async fn resolve_ipv4(host: &str) -> Option<[u8; 4]> {
        let addrs: Vec<SocketAddr> = lookup_host((host, 80u16)).await.ok()?.collect();
        addrs.iter().find_map(|addr| match addr.ip() {
            IpAddr::V4(v4) => Some(v4.octets()),
            IpAddr::V6(_) => None,
        })
    }
}

impl Default for DnsBlacklistProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainReputation for DnsBlacklistProvider {
    fn name(&self) -> &'static str {
        "DNSBL"
    }

    fn kind(&self) -> &'static str {
        "DNS_BLACKLIST"
    }

    async fn check(&self, url: &str) -> ReputationVerdict {
        let Some(host) = host_of(url) else {
            return ReputationVerdict::Unknown;
        };
        let Some(octets) = Self::resolve_ipv4(&host).await else {
            debug!(%host, "host did not resolve to an IPv4 address");
            return ReputationVerdict::Unknown;
        };

        let reversed = format!("{}.{}.{}.{}", octets[3], octets[2], octets[1], octets[0]);
        let mut listed = Vec::new();
        for zone in DNSBL_ZONES {
            if resolves(&format!("{}.{}", reversed, zone)).await {
                listed.push(zone.to_string());
            }
        }

        if listed.is_empty() {
            ReputationVerdict::Clean
        } else {
            ReputationVerdict::Malicious(listed)
        }
    }
}

/// Domain-based SURBL check.
pub struct SurblProvider;

impl SurblProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SurblProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainReputation for SurblProvider {
    fn name(&self) -> &'static str {
        "SURBL"
    }

    fn kind(&self) -> &'static str {
        "SPAM_BLACKLIST"
    }

    async fn check(&self, url: &str) -> ReputationVerdict {
        let Some(host) = host_of(url) else {
            return ReputationVerdict::Unknown;
        };

        let mut listed = Vec::new();
        for zone in SURBL_ZONES {
            if resolves(&format!("{}.{}", host, zone)).await {
                listed.push(zone.to_string());
            }
        }

        if listed.is_empty() {
            ReputationVerdict::Clean
        } else {
            ReputationVerdict::Malicious(listed)
        }
    }
}
