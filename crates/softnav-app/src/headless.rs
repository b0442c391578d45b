//! Headless implementations of the platform and effects ports.
//!
//! There is no document to render, so the content region is just held in
//! memory and cosmetic effects go to the log. A full page load cannot
//! happen from inside the controller; it is recorded as a pending
//! [`ReloadRequest`] for the session to carry out.

use softnav_core::SessionHistory;
use softnav_types::backend::{Effects, Platform};
use softnav_types::path::{ContentFragment, HistoryRecord, NormalizedPath};

/// A full page load the controller handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadRequest {
    /// Load this path as a new traversal entry.
    Navigate(NormalizedPath),
    /// Reload the current entry.
    Current,
}

pub struct HeadlessPlatform {
    history: SessionHistory,
    content: ContentFragment,
    title: String,
    pending_reload: Option<ReloadRequest>,
}

impl HeadlessPlatform {
    /// `history` must already contain the entry being loaded.
    pub fn new(mut history: SessionHistory, title: &str) -> Self {
        history.update_title(title);
        Self {
            history,
            content: ContentFragment::default(),
            title: title.to_string(),
            pending_reload: None,
        }
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn content(&self) -> &ContentFragment {
        &self.content
    }

    /// Browser back. `None` at the start of the stack, otherwise the state
    /// payload of the entry moved to.
    pub fn back(&mut self) -> Option<Option<String>> {
        self.history.go_back().map(|e| e.state)
    }

    pub fn forward(&mut self) -> Option<Option<String>> {
        self.history.go_forward().map(|e| e.state)
    }

    pub fn take_reload(&mut self) -> Option<ReloadRequest> {
        self.pending_reload.take()
    }

    fn state_of(record: &HistoryRecord) -> Option<String> {
        match record.to_state() {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("cannot serialize history record for {}: {e}", record.path);
                None
            },
        }
    }
}

impl Platform for HeadlessPlatform {
    fn swap_content(&mut self, fragment: &ContentFragment) {
        self.content = fragment.clone();
    }

    fn push_record(&mut self, record: &HistoryRecord) {
        let state = Self::state_of(record);
        self.history.push(record.path.as_str(), state);
        self.history.update_title(&self.title);
    }

    fn replace_record(&mut self, record: &HistoryRecord) {
        let state = Self::state_of(record);
        self.history.replace_current(record.path.as_str(), state);
    }

    fn current_address(&self) -> String {
        self.history.current_address().unwrap_or("/").to_string()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.history.update_title(title);
    }

    fn reload(&mut self, path: Option<&NormalizedPath>) {
        self.pending_reload = Some(match path {
            Some(p) => ReloadRequest::Navigate(p.clone()),
            None => ReloadRequest::Current,
        });
    }
}

/// Effects that only log.
#[derive(Debug, Default)]
pub struct LoggingEffects;

impl Effects for LoggingEffects {
    fn fade_out(&mut self) {
        log::trace!("fade out");
    }

    fn fade_in(&mut self) {
        log::trace!("fade in");
    }

    fn scroll_to_top(&mut self) {
        log::trace!("scroll to top");
    }

    fn highlight_active(&mut self, displayed: &NormalizedPath) {
        log::debug!("active link: {displayed}");
    }
}
