//! In-memory page model implementing [`PageAccessor`].
//!
//! Used directly by tests and as the backing store for HTML snapshots.
//! Capability events are fanned out synchronously to installed hooks via
//! [`MemoryPage::emit`].

use super::{ElementInfo, FrameInfo, HookId, HookObserver, PageAccessor};
use crate::monitor::interceptor::{Capability, CapabilityEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct PageState {
    elements: Vec<ElementInfo>,
    frames: Vec<FrameInfo>,
    scripts: Vec<String>,
    text: String,
}

pub struct MemoryPage {
    hostname: String,
    origin: String,
    state: Mutex<PageState>,
    hooks: Mutex<Vec<(HookId, Capability, HookObserver)>>,
    next_hook: AtomicU64,
}

impl MemoryPage {
    pub fn new(hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        let origin = format!("https://{}", hostname);
        Self {
            hostname,
            origin,
            state: Mutex::new(PageState::default()),
            hooks: Mutex::new(Vec::new()),
            next_hook: AtomicU64::new(1),
        }
    }

    pub fn push_element(&self, element: ElementInfo) {
        self.state.lock().unwrap().elements.push(element);
    }

    pub fn push_frame(&self, frame: FrameInfo) {
        self.state.lock().unwrap().frames.push(frame);
    }

    pub fn push_script(&self, body: impl Into<String>) {
        self.state.lock().unwrap().scripts.push(body.into());
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.state.lock().unwrap().text = text.into();
    }

    /// Simulate one invocation of a monitored capability. Observers for
    /// that capability are notified; everything else is untouched.
    pub fn emit(&self, capability: Capability, detail: impl Into<String>) {
        let event = CapabilityEvent {
            capability,
            detail: detail.into(),
        };
        let hooks = self.hooks.lock().unwrap();
        for (_, hooked, observer) in hooks.iter() {
            if *hooked == capability {
                observer(&event);
            }
        }
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.lock().unwrap().len()
    }
}

impl PageAccessor for MemoryPage {
    fn elements(&self) -> Vec<ElementInfo> {
        self.state.lock().unwrap().elements.clone()
    }

    fn frames(&self) -> Vec<FrameInfo> {
        self.state.lock().unwrap().frames.clone()
    }

    fn scripts(&self) -> Vec<String> {
        self.state.lock().unwrap().scripts.clone()
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn text(&self) -> String {
        self.state.lock().unwrap().text.clone()
    }

    fn install_hook(&self, capability: Capability, observer: HookObserver) -> Option<HookId> {
        let id = HookId(self.next_hook.fetch_add(1, Ordering::Relaxed));
        self.hooks.lock().unwrap().push((id, capability, observer));
        Some(id)
    }

    fn remove_hook(&self, id: HookId) {
        self.hooks.lock().unwrap().retain(|(hook_id, _, _)| *hook_id != id);
    }
}
