//! Port traits the navigation controller drives.
//!
//! The controller never touches a rendering environment directly. The host
//! (a browser binding, the headless driver, or a test fake) implements
//! these three traits:
//!
//! - [`Network`] issues text-returning requests.
//! - [`Platform`] owns the content region, the title, and the traversal stack.
//! - [`Effects`] performs cosmetic, side-effect-only work.
//!
//! All controller work happens on one thread, so the async trait is
//! `?Send`.

use async_trait::async_trait;

use crate::error::Result;
use crate::path::{ContentFragment, HistoryRecord, NormalizedPath};

/// A completed network response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl NetResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound network collaborator.
#[async_trait(?Send)]
pub trait Network {
    /// Fetch `locator` (a site-relative path such as `/about.html`).
    ///
    /// Any received response, whatever its status, is `Ok`; `Err` means
    /// the request never produced one.
    async fn get(&self, locator: &str) -> Result<NetResponse>;
}

/// The document and history side of the host.
pub trait Platform {
    /// Replace the content region's markup.
    fn swap_content(&mut self, fragment: &ContentFragment);

    /// Push a traversal entry carrying `record` and show its path in the
    /// address bar. Must not reload.
    fn push_record(&mut self, record: &HistoryRecord);

    /// Attach `record` to the current traversal entry and show its path.
    /// Must not reload.
    fn replace_record(&mut self, record: &HistoryRecord);

    /// The path currently shown in the address bar.
    fn current_address(&self) -> String;

    fn title(&self) -> String;

    fn set_title(&mut self, title: &str);

    /// Hand off to the native full-page loader. `None` reloads the current
    /// address.
    fn reload(&mut self, path: Option<&NormalizedPath>);
}

/// Cosmetic collaborator. Nothing it does feeds back into the controller.
pub trait Effects {
    fn fade_out(&mut self);

    fn fade_in(&mut self);

    fn scroll_to_top(&mut self);

    /// Restyle navigation links so the one matching `displayed` is active.
    fn highlight_active(&mut self, displayed: &NormalizedPath);
}
