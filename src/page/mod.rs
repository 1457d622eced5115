//! Page access boundary.
//!
//! The monitor and extractor never touch a real DOM; they operate against
//! [`PageAccessor`], so the same algorithms run over an in-memory model in
//! tests and over a lexical HTML snapshot in the CLI.

pub mod memory;
pub mod snapshot;

pub use memory::MemoryPage;
pub use snapshot::page_from_html;

use crate::monitor::interceptor::{Capability, CapabilityEvent};
use std::sync::Arc;

/// Computed-style snapshot for one element. Values mirror CSS defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedStyle {
    pub position: String,
    pub z_index: String,
    pub opacity: String,
    pub visibility: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            position: "static".into(),
            z_index: "auto".into(),
            opacity: "1".into(),
            visibility: "visible".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
    pub tag: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub style: ComputedStyle,
    pub text: String,
}

impl ElementInfo {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Human-readable pointer used as an issue location.
    pub fn descriptor(&self) -> String {
        format!("Element: {}", self.tag.to_uppercase())
    }
}

/// A child frame as far as same-origin rules allow it to be seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    /// `None` when cross-origin restrictions block inspection entirely.
    pub origin: Option<String>,
    pub supports_messaging: bool,
}

pub type HookObserver = Arc<dyn Fn(&CapabilityEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub u64);

/// Read-only view of the monitored page plus the capability hook points
/// the interceptor registry installs into.
pub trait PageAccessor: Send + Sync {
    fn elements(&self) -> Vec<ElementInfo>;
    fn frames(&self) -> Vec<FrameInfo>;
    /// Inline and same-document script bodies.
    fn scripts(&self) -> Vec<String>;
    fn hostname(&self) -> String;
    fn origin(&self) -> String;
    /// Full page text, used by the business-number extractor.
    fn text(&self) -> String;

    /// Attach an observer to a capability surface. Returns `None` when the
    /// page does not expose that capability. Observe-only: installing a
    /// hook never changes the capability's behavior.
    fn install_hook(&self, capability: Capability, observer: HookObserver) -> Option<HookId>;
    fn remove_hook(&self, id: HookId);
}
