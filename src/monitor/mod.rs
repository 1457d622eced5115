//! Live page monitor: repeated sweeps over the current page model.
//!
//! Lifecycle is Idle -> `start(callback)` -> Running -> `stop()` -> Idle.
//! `start` installs the capability interceptors, runs one immediate pass
//! and re-runs on a fixed cadence (default 5 s). `stop` aborts the timer
//! task, uninstalls every interceptor and clears the buffered state, so
//! no instrumentation outlives the monitoring session.

pub mod interceptor;

use crate::analyze::script::scan_script;
use crate::models::{AnalysisSnapshot, Category, DetectedPattern, Issue, Severity};
use crate::page::{ElementInfo, PageAccessor};
use anyhow::Result;
use interceptor::{CapabilityEvent, EventSink, InterceptorRegistry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Inline event attributes checked by the fixed-list sweep; the final
/// re-sweep covers every `on*` attribute.
const EVENT_ATTRIBUTES: &[&str] = &["onclick", "onsubmit", "onkeyup", "onkeydown", "onkeypress"];

pub type IssueCallback = Arc<dyn Fn(Vec<Issue>) + Send + Sync>;

pub struct PageMonitor {
    page: Arc<dyn PageAccessor>,
    interval: Duration,
    running: AtomicBool,
    pass_in_flight: AtomicBool,
    events: EventSink,
    registry: Mutex<InterceptorRegistry>,
    callback: Mutex<Option<IssueCallback>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PageMonitor {
    pub fn new(page: Arc<dyn PageAccessor>) -> Arc<Self> {
        Self::with_interval(page, DEFAULT_INTERVAL)
    }

    pub fn with_interval(page: Arc<dyn PageAccessor>, interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            page,
            interval,
            running: AtomicBool::new(false),
            pass_in_flight: AtomicBool::new(false),
            events: Arc::new(Mutex::new(Vec::new())),
            registry: Mutex::new(InterceptorRegistry::new()),
            callback: Mutex::new(None),
            task: Mutex::new(None),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Begin monitoring. No-op while already running. Must be called from
    /// within a tokio runtime; issues are delivered to `callback` after
    /// every pass that finds a non-empty set.
    pub fn start(self: &Arc<Self>, callback: impl Fn(Vec<Issue>) + Send + Sync + 'static) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        *self.callback.lock().unwrap() = Some(Arc::new(callback));
        self.registry
            .lock()
            .unwrap()
            .install_all(self.page.as_ref(), self.events.clone());

        self.tick();

        let monitor = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(monitor.interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            timer.tick().await; // first tick fires immediately; already ran
            loop {
                timer.tick().await;
                if !monitor.is_running() {
                    break;
                }
                monitor.tick();
            }
        });
        *self.task.lock().unwrap() = Some(handle);
    }

    /// Stop monitoring. No-op while idle. Guarantees no further callback
    /// invocations and restores every intercepted capability.
    pub fn stop(&self) {
        // Clearing the callback under its lock blocks on any in-flight
        // delivery; once this section exits, nothing can fire again.
        {
            let mut callback = self.callback.lock().unwrap();
            if !self.running.swap(false, Ordering::SeqCst) {
                return;
            }
            *callback = None;
        }

        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
        self.registry.lock().unwrap().uninstall_all(self.page.as_ref());
        self.events.lock().unwrap().clear();
    }

    /// One timer tick: skipped if a pass is still in flight.
    fn tick(&self) {
        if self.pass_in_flight.swap(true, Ordering::SeqCst) {
            debug!("pass still in flight, skipping tick");
            return;
        }
        let snapshot = self.run_pass();
        if !snapshot.issues.is_empty() {
            // Delivery holds the callback lock so it cannot outlive a
            // concurrent stop(): the running check and the invocation are
            // one atomic step with respect to teardown.
            let callback = self.callback.lock().unwrap();
            if self.is_running() {
                if let Some(callback) = callback.as_ref() {
                    callback(snapshot.issues);
                }
            }
        }
        self.pass_in_flight.store(false, Ordering::SeqCst);
    }

    /// One complete analysis pass over the page. Never fails past this
    /// boundary: a pass-level error becomes a single synthetic xss issue.
    pub fn run_pass(&self) -> AnalysisSnapshot {
        match self.run_pass_inner() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(%err, "analysis pass failed");
                AnalysisSnapshot {
                    issues: vec![Issue::new(
                        Category::Xss,
                        Severity::High,
                        format!("Analysis failed: {}", err),
                    )],
                    patterns: Vec::new(),
                }
            }
        }
    }

    fn run_pass_inner(&self) -> Result<AnalysisSnapshot> {
        let mut issues: Vec<Issue> = Vec::new();
        let mut patterns: Vec<DetectedPattern> = Vec::new();

        let elements = self.page.elements();

        self.sweep_dom_elements(&elements, &mut issues);
        self.sweep_event_attributes(&elements, &mut issues);
        self.sweep_frames(&mut issues);
        self.drain_capability_events(&mut issues);
        self.sweep_iframes(&elements, &mut issues);

        for body in self.page.scripts() {
            let snapshot = scan_script(&body);
            issues.extend(snapshot.issues);
            patterns.extend(snapshot.patterns);
        }

        self.sweep_inline_handlers(&elements, &mut issues);

        Ok(AnalysisSnapshot {
            issues: dedup(issues),
            patterns,
        })
    }

    /// Hidden full-screen overlays and hidden inputs (form hijacking).
    fn sweep_dom_elements(&self, elements: &[ElementInfo], issues: &mut Vec<Issue>) {
        for element in elements {
            if is_hidden_overlay(element) {
                issues.push(
                    Issue::new(
                        Category::FormHijacking,
                        Severity::High,
                        "Hidden overlay element detected",
                    )
                    .with_location(element.descriptor()),
                );
            }

            if element.tag.eq_ignore_ascii_case("input") && is_hidden_input(element) {
                let label = element
                    .name
                    .as_deref()
                    .or(element.id.as_deref())
                    .unwrap_or("unnamed");
                issues.push(
                    Issue::new(
                        Category::FormHijacking,
                        Severity::High,
                        "Hidden input field detected",
                    )
                    .with_location(format!("Input: {}", label)),
                );
            }
        }
    }

    fn sweep_event_attributes(&self, elements: &[ElementInfo], issues: &mut Vec<Issue>) {
        for element in elements {
            for attr in EVENT_ATTRIBUTES {
                if element.attr(attr).is_some() {
                    issues.push(inline_handler_issue(element, attr));
                }
            }
        }
    }

    /// Child frames: messaging capability and foreign origins. Frames that
    /// cannot be inspected are skipped, not reported.
    fn sweep_frames(&self, issues: &mut Vec<Issue>) {
        let own_origin = self.page.origin();
        for frame in self.page.frames() {
            let Some(origin) = frame.origin else {
                debug!("skipping inaccessible cross-origin frame");
                continue;
            };

            if frame.supports_messaging {
                issues.push(
                    Issue::new(
                        Category::DataExfiltration,
                        Severity::Medium,
                        "Cross-window communication attempt detected",
                    )
                    .with_location("Window Communication"),
                );
            }

            if origin != own_origin {
                issues.push(
                    Issue::new(
                        Category::BrowserExploit,
                        Severity::High,
                        "Frame from foreign origin detected",
                    )
                    .with_location(format!("Origin: {}", origin)),
                );
            }
        }
    }

    fn drain_capability_events(&self, issues: &mut Vec<Issue>) {
        let events: Vec<CapabilityEvent> = self.events.lock().unwrap().drain(..).collect();
        for event in events {
            issues.push(event.into_issue());
        }
    }

    /// `<iframe>` elements whose source host differs from the document's.
    fn sweep_iframes(&self, elements: &[ElementInfo], issues: &mut Vec<Issue>) {
        let own_host = self.page.hostname();
        for element in elements {
            if !element.tag.eq_ignore_ascii_case("iframe") {
                continue;
            }
            let Some(src) = element.attr("src") else {
                continue;
            };
            match resolve_host(&self.page.origin(), src) {
                Some(host) if host != own_host => {
                    issues.push(
                        Issue::new(
                            Category::Redirect,
                            Severity::Medium,
                            "Iframe from external domain detected",
                        )
                        .with_location(format!("iframe: {}", host)),
                    );
                }
                Some(_) => {}
                None => debug!(%src, "unresolvable iframe source, skipping"),
            }
        }
    }

    /// Attribute-by-attribute re-sweep for completeness; duplicates are
    /// collapsed by the final dedup.
    fn sweep_inline_handlers(&self, elements: &[ElementInfo], issues: &mut Vec<Issue>) {
        for element in elements {
            for (name, _) in &element.attributes {
                if name.to_ascii_lowercase().starts_with("on") {
                    issues.push(inline_handler_issue(element, name));
                }
            }
        }
    }
}

fn inline_handler_issue(element: &ElementInfo, attr: &str) -> Issue {
    Issue::new(
        Category::FormHijacking,
        Severity::Medium,
        format!("Inline event handler detected: {}", attr.to_ascii_lowercase()),
    )
    .with_location(element.descriptor())
}

/// Fixed position, stacking index in the top reserved range, and
/// near-invisible: the classic clickjacking overlay shape.
fn is_hidden_overlay(element: &ElementInfo) -> bool {
    let style = &element.style;
    let top_layer = style.z_index.parse::<i64>().map_or(false, |z| z >= 9999);
    style.position == "fixed" && top_layer && (near_zero_opacity(&style.opacity) || style.visibility == "hidden")
}

fn is_hidden_input(element: &ElementInfo) -> bool {
    let hidden_type = element
        .attr("type")
        .map_or(false, |t| t.eq_ignore_ascii_case("hidden"));
    hidden_type || near_zero_opacity(&element.style.opacity) || element.style.visibility == "hidden"
}

fn near_zero_opacity(opacity: &str) -> bool {
    opacity.parse::<f64>().map_or(false, |o| o <= 0.01)
}

fn resolve_host(base: &str, src: &str) -> Option<String> {
    let base = url::Url::parse(base).ok()?;
    let resolved = base.join(src).ok()?;
    resolved.host_str().map(|h| h.to_string())
}

/// Collapse duplicates by full value equality, preserving first-seen order.
fn dedup(issues: Vec<Issue>) -> Vec<Issue> {
    let mut out: Vec<Issue> = Vec::with_capacity(issues.len());
    for issue in issues {
        if !out.contains(&issue) {
            out.push(issue);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ComputedStyle, MemoryPage};

    fn overlay_element() -> ElementInfo {
        ElementInfo {
            tag: "div".into(),
            style: ComputedStyle {
                position: "fixed".into(),
                z_index: "9999".into(),
                opacity: "0".into(),
                visibility: "visible".into(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_hidden_overlay_detection() {
        assert!(is_hidden_overlay(&overlay_element()));

        let mut visible = overlay_element();
        visible.style.opacity = "1".into();
        assert!(!is_hidden_overlay(&visible));

        let mut low = overlay_element();
        low.style.z_index = "10".into();
        assert!(!is_hidden_overlay(&low));
    }

    #[test]
    fn test_pass_deduplicates_inline_handler_issues() {
        let page = Arc::new(MemoryPage::new("shop.example"));
        let mut element = ElementInfo::new("form");
        // onsubmit appears in both the fixed-list sweep and the re-sweep.
        element.attributes.push(("onsubmit".into(), "steal()".into()));
        page.push_element(element);

        let monitor = PageMonitor::new(page);
        let snapshot = monitor.run_pass();

        let handler_issues: Vec<_> = snapshot
            .issues
            .iter()
            .filter(|i| i.description.contains("onsubmit"))
            .collect();
        assert_eq!(handler_issues.len(), 1);
    }

    #[test]
    fn test_foreign_iframe_flagged_as_redirect() {
        let page = Arc::new(MemoryPage::new("shop.example"));
        let mut iframe = ElementInfo::new("iframe");
        iframe
            .attributes
            .push(("src".into(), "https://evil.test/login".into()));
        page.push_element(iframe);

        let monitor = PageMonitor::new(page);
        let snapshot = monitor.run_pass();
        assert!(snapshot.issues.iter().any(|i| {
            i.category == Category::Redirect
                && i.location.as_deref() == Some("iframe: evil.test")
        }));
    }

    #[test]
    fn test_same_host_iframe_not_flagged() {
        let page = Arc::new(MemoryPage::new("shop.example"));
        let mut iframe = ElementInfo::new("iframe");
        iframe.attributes.push(("src".into(), "/widget".into()));
        page.push_element(iframe);

        let monitor = PageMonitor::new(page);
        let snapshot = monitor.run_pass();
        assert!(snapshot.issues.is_empty());
    }

    #[test]
    fn test_inaccessible_frame_is_skipped() {
        let page = Arc::new(MemoryPage::new("shop.example"));
        page.push_frame(crate::page::FrameInfo {
            origin: None,
            supports_messaging: true,
        });

        let monitor = PageMonitor::new(page);
        assert!(monitor.run_pass().issues.is_empty());
    }
}
