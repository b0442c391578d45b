//! In-memory fakes for the controller's ports.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use softnav_types::backend::{Effects, NetResponse, Network, Platform};
use softnav_types::error::{Result, SoftnavError};
use softnav_types::path::{ContentFragment, HistoryRecord, NormalizedPath};

use crate::history::SessionHistory;

/// A minimal document with a title and a `<main>` region.
pub fn page(title: &str, main_inner: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><title>{title}</title></head>\
         <body><nav><a href=\"/\">Home</a></nav><main>{main_inner}</main></body></html>"
    )
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// Ordered record of every port call, shared by the fakes.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn record(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

// ---------------------------------------------------------------------------
// FakeNetwork
// ---------------------------------------------------------------------------

enum Reply {
    Response(NetResponse),
    TransportError,
}

/// Canned responses keyed by locator. Unknown locators answer 404.
#[derive(Default)]
pub struct FakeNetwork {
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    requests: RefCell<Vec<String>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, locator: &str, html: &str) -> Self {
        self.with_body(locator, 200, html)
    }

    pub fn with_status(self, locator: &str, status: u16) -> Self {
        self.with_body(locator, status, "")
    }

    pub fn with_body(self, locator: &str, status: u16, body: &str) -> Self {
        self.with_bytes(locator, status, body.as_bytes().to_vec())
    }

    pub fn with_bytes(mut self, locator: &str, status: u16, body: Vec<u8>) -> Self {
        self.replies
            .insert(locator.to_string(), Reply::Response(NetResponse::new(status, body)));
        self
    }

    pub fn with_transport_error(mut self, locator: &str) -> Self {
        self.replies.insert(locator.to_string(), Reply::TransportError);
        self
    }

    /// Hold the answer for `locator` back by `delay`.
    pub fn with_delay(mut self, locator: &str, delay: Duration) -> Self {
        self.delays.insert(locator.to_string(), delay);
        self
    }

    /// Every locator requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Network for FakeNetwork {
    async fn get(&self, locator: &str) -> Result<NetResponse> {
        self.requests.borrow_mut().push(locator.to_string());
        if let Some(delay) = self.delays.get(locator) {
            tokio::time::sleep(*delay).await;
        }
        match self.replies.get(locator) {
            Some(Reply::Response(resp)) => Ok(resp.clone()),
            Some(Reply::TransportError) => {
                Err(SoftnavError::Transport(format!("connection refused: {locator}")))
            },
            None => Ok(NetResponse::new(404, "not found")),
        }
    }
}

// ---------------------------------------------------------------------------
// FakePlatform
// ---------------------------------------------------------------------------

/// A document plus traversal stack, journaling every call.
pub struct FakePlatform {
    pub history: SessionHistory,
    pub content: String,
    pub title: String,
    pub reloads: Vec<Option<NormalizedPath>>,
    journal: Journal,
}

impl FakePlatform {
    pub fn new(address: &str, title: &str, journal: Journal) -> Self {
        Self {
            history: SessionHistory::with_initial(address),
            content: String::new(),
            title: title.to_string(),
            reloads: Vec::new(),
            journal,
        }
    }

    /// Browser back: returns the state payload of the entry moved to.
    pub fn back(&mut self) -> Option<Option<String>> {
        self.history.go_back().map(|e| e.state)
    }

    /// Browser forward.
    pub fn forward(&mut self) -> Option<Option<String>> {
        self.history.go_forward().map(|e| e.state)
    }
}

impl Platform for FakePlatform {
    fn swap_content(&mut self, fragment: &ContentFragment) {
        self.journal.record(format!("swap {}", fragment.as_str()));
        self.content = fragment.as_str().to_string();
    }

    fn push_record(&mut self, record: &HistoryRecord) {
        self.journal.record(format!("push {}", record.path));
        self.history
            .push(record.path.as_str(), Some(record.to_state().unwrap()));
    }

    fn replace_record(&mut self, record: &HistoryRecord) {
        self.journal.record(format!("replace {}", record.path));
        self.history
            .replace_current(record.path.as_str(), Some(record.to_state().unwrap()));
    }

    fn current_address(&self) -> String {
        self.history.current_address().unwrap_or("/").to_string()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.journal.record(format!("title {title}"));
        self.title = title.to_string();
    }

    fn reload(&mut self, path: Option<&NormalizedPath>) {
        match path {
            Some(p) => self.journal.record(format!("reload {p}")),
            None => self.journal.record("reload"),
        }
        self.reloads.push(path.cloned());
    }
}

// ---------------------------------------------------------------------------
// FakeEffects
// ---------------------------------------------------------------------------

pub struct FakeEffects {
    journal: Journal,
}

impl FakeEffects {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl Effects for FakeEffects {
    fn fade_out(&mut self) {
        self.journal.record("fade_out");
    }

    fn fade_in(&mut self) {
        self.journal.record("fade_in");
    }

    fn scroll_to_top(&mut self) {
        self.journal.record("scroll_to_top");
    }

    fn highlight_active(&mut self, displayed: &NormalizedPath) {
        self.journal.record(format!("highlight {displayed}"));
    }
}
