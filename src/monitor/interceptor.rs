//! Interceptor registry: capability hooks installed at monitor start and
//! reverted at monitor stop.
//!
//! Each hook is observe-only. The registry remembers every handle it
//! installed so `uninstall_all` can restore the page exactly; a hook left
//! behind after `stop()` would keep instrumenting the host page.

use crate::models::{Category, Issue, Severity};
use crate::page::{HookId, PageAccessor};
use std::sync::{Arc, Mutex};

/// Capability surfaces the monitor observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Fetch,
    XmlHttpRequest,
    WebSocket,
    CookieAccess,
    LocalStorage,
    SessionStorage,
    Geolocation,
    SendBeacon,
    Worker,
    ServiceWorker,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::Fetch,
        Capability::XmlHttpRequest,
        Capability::WebSocket,
        Capability::CookieAccess,
        Capability::LocalStorage,
        Capability::SessionStorage,
        Capability::Geolocation,
        Capability::SendBeacon,
        Capability::Worker,
        Capability::ServiceWorker,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Capability::Fetch => "fetch",
            Capability::XmlHttpRequest => "XMLHttpRequest",
            Capability::WebSocket => "WebSocket",
            Capability::CookieAccess => "document.cookie",
            Capability::LocalStorage => "localStorage",
            Capability::SessionStorage => "sessionStorage",
            Capability::Geolocation => "navigator.geolocation",
            Capability::SendBeacon => "navigator.sendBeacon",
            Capability::Worker => "Worker",
            Capability::ServiceWorker => "ServiceWorker",
        }
    }
}

/// One observed invocation of a monitored capability. `detail` carries the
/// script URL for worker construction, or the call site otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityEvent {
    pub capability: Capability,
    pub detail: String,
}

impl CapabilityEvent {
    pub fn into_issue(self) -> Issue {
        match self.capability {
            Capability::Worker => Issue::new(
                Category::WorkerCreation,
                Severity::Medium,
                "Web worker construction attempt detected",
            )
            .with_location(format!("Worker Script: {}", self.detail)),
            Capability::ServiceWorker => Issue::new(
                Category::WorkerCreation,
                Severity::High,
                "Service worker registration attempt detected",
            )
            .with_location(format!("Service Worker: {}", self.detail)),
            other => Issue::new(
                Category::SensitiveApiUsage,
                Severity::Medium,
                format!("Sensitive API usage detected: {}", other.label()),
            )
            .with_location(self.detail),
        }
    }
}

/// Shared buffer the installed observers feed into; drained once per pass.
pub type EventSink = Arc<Mutex<Vec<CapabilityEvent>>>;

#[derive(Default)]
pub struct InterceptorRegistry {
    installed: Vec<HookId>,
}

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an observer for every capability the page exposes.
    /// Capabilities the page does not expose are skipped.
    pub fn install_all(&mut self, page: &dyn PageAccessor, sink: EventSink) {
        for capability in Capability::ALL {
            let sink = sink.clone();
            let observer = Arc::new(move |event: &CapabilityEvent| {
                sink.lock().unwrap().push(event.clone());
            });
            if let Some(id) = page.install_hook(capability, observer) {
                self.installed.push(id);
            }
        }
    }

    /// Remove every hook installed by this registry.
    pub fn uninstall_all(&mut self, page: &dyn PageAccessor) {
        for id in self.installed.drain(..) {
            page.remove_hook(id);
        }
    }

    pub fn installed_count(&self) -> usize {
        self.installed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;

    #[test]
    fn test_install_and_uninstall_round_trip() {
        let page = MemoryPage::new("example.com");
        let sink: EventSink = Arc::new(Mutex::new(Vec::new()));

        let mut registry = InterceptorRegistry::new();
        registry.install_all(&page, sink.clone());
        assert_eq!(registry.installed_count(), Capability::ALL.len());

        page.emit(Capability::ServiceWorker, "sw.js");
        assert_eq!(sink.lock().unwrap().len(), 1);

        registry.uninstall_all(&page);
        assert_eq!(page.hook_count(), 0);

        // Events after uninstall reach nothing.
        page.emit(Capability::ServiceWorker, "sw.js");
        assert_eq!(sink.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_worker_events_map_to_worker_issues() {
        let event = CapabilityEvent {
            capability: Capability::Worker,
            detail: "https://evil.test/miner.js".into(),
        };
        let issue = event.into_issue();
        assert_eq!(issue.category, Category::WorkerCreation);
        assert_eq!(issue.severity, Severity::Medium);
        assert!(issue.location.unwrap().contains("miner.js"));

        let event = CapabilityEvent {
            capability: Capability::ServiceWorker,
            detail: "sw.js".into(),
        };
        assert_eq!(event.into_issue().severity, Severity::High);
    }

    #[test]
    fn test_sensitive_api_events_are_medium() {
        let event = CapabilityEvent {
            capability: Capability::CookieAccess,
            detail: "at popup.js:10".into(),
        };
        let issue = event.into_issue();
        assert_eq!(issue.category, Category::SensitiveApiUsage);
        assert_eq!(issue.severity, Severity::Medium);
        assert!(issue.description.contains("document.cookie"));
    }
}
