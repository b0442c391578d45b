//! Networking for softnav: URL resolution and an HTTP client exposed
//! through the [`Network`] port.

pub mod client;
pub mod tls;
pub mod url;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use async_trait::async_trait;
use softnav_types::backend::{NetResponse, Network};
use softnav_types::error::{Result, SoftnavError};

pub use crate::tls::TlsProvider;
pub use crate::url::Url;

/// [`Network`] over HTTP against a fixed site origin.
///
/// Locators are resolved against the origin, and each request runs the
/// blocking client on tokio's blocking pool so the navigation task never
/// stalls the thread.
#[derive(Clone)]
pub struct HttpNetwork {
    origin: Url,
    tls: Option<Arc<dyn TlsProvider>>,
}

impl HttpNetwork {
    /// Build a client for `origin` (`scheme://host[:port]`).
    pub fn new(origin: &str) -> Result<Self> {
        let origin = Url::parse(origin)
            .ok_or_else(|| SoftnavError::Config(format!("invalid origin: {origin}")))?;
        Ok(Self { origin, tls: None })
    }

    /// Use `tls` for `https` requests.
    pub fn with_tls(mut self, tls: Arc<dyn TlsProvider>) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Build a client with the rustls provider when the feature is on.
    pub fn with_default_tls(self) -> Self {
        #[cfg(feature = "tls-rustls")]
        {
            self.with_tls(Arc::new(tls::RustlsTlsProvider::new()))
        }
        #[cfg(not(feature = "tls-rustls"))]
        {
            self
        }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Absolute URL for a site-relative locator.
    pub fn locate(&self, locator: &str) -> Result<Url> {
        self.origin
            .resolve(locator)
            .ok_or_else(|| SoftnavError::Transport(format!("cannot resolve locator: {locator}")))
    }
}

#[async_trait(?Send)]
impl Network for HttpNetwork {
    async fn get(&self, locator: &str) -> Result<NetResponse> {
        let url = self.locate(locator)?;
        let tls = self.tls.clone();
        log::debug!("GET {url}");

        let resp = tokio::task::spawn_blocking(move || client::http_get(&url, tls.as_deref()))
            .await
            .map_err(|e| SoftnavError::Transport(format!("request task failed: {e}")))??;

        Ok(NetResponse::new(resp.status_code, resp.body))
    }
}
