//! Fetch pipeline: path -> request(s) -> document -> content fragment.
//!
//! A site may be served as extensionless routes or as literal files, and
//! the caller never has to know which. The pipeline asks for the document
//! form first (`/about.html`) and falls back to the path exactly as given
//! (`/about`).

use softnav_types::backend::{NetResponse, Network};
use softnav_types::error::{Result, SoftnavError};
use softnav_types::path::{ContentFragment, NormalizedPath, PathRules};

use crate::html::{self, ContentSelector};

/// Which request served a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    /// The document form of the path (`/about.html`).
    Primary,
    /// The path exactly as given, after the primary request failed.
    RawPath,
}

/// A fully loaded page: its content region and, if present, its title.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub fragment: ContentFragment,
    pub title: Option<String>,
    pub source: DocumentSource,
}

impl Page {
    /// The title, if it came from the primary target. Titles are only ever
    /// taken from the document form of a path.
    pub fn primary_title(&self) -> Option<&str> {
        match self.source {
            DocumentSource::Primary => self.title.as_deref(),
            DocumentSource::RawPath => None,
        }
    }
}

/// Resolves paths to content fragments over a [`Network`].
pub struct FetchPipeline<N> {
    network: N,
    rules: PathRules,
    selector: ContentSelector,
}

impl<N: Network> FetchPipeline<N> {
    pub fn new(network: N, rules: PathRules, selector: ContentSelector) -> Self {
        Self {
            network,
            rules,
            selector,
        }
    }

    pub fn rules(&self) -> &PathRules {
        &self.rules
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Fetch `path`, extract its content region and read its title from
    /// the same document.
    ///
    /// Fails when neither request succeeds, when the body is not text, or
    /// when the document has no content region. Never returns a partial
    /// fragment.
    pub async fn fetch_page(&self, path: &NormalizedPath) -> Result<Page> {
        let (resp, source) = self.fetch_document(path).await?;
        let text = html::decode_body(&resp.body)?;
        let region = html::extract_region(text, &self.selector)
            .ok_or_else(|| SoftnavError::NoContentRegion(path.to_string()))?;
        Ok(Page {
            fragment: ContentFragment::new(region),
            title: html::extract_title(text),
            source,
        })
    }

    /// Primary target first; on a failed status or transport error, the
    /// raw path.
    async fn fetch_document(&self, path: &NormalizedPath) -> Result<(NetResponse, DocumentSource)> {
        let primary = self.rules.primary_target(path);
        match self.network.get(&primary).await {
            Ok(resp) if resp.is_success() => return Ok((resp, DocumentSource::Primary)),
            Ok(resp) => log::debug!("{primary} answered {}, retrying as {path}", resp.status),
            Err(e) => log::debug!("{primary} failed ({e}), retrying as {path}"),
        }

        let resp = self.network.get(path.as_str()).await?;
        if !resp.is_success() {
            return Err(SoftnavError::Status {
                locator: path.to_string(),
                status: resp.status,
            });
        }
        Ok((resp, DocumentSource::RawPath))
    }
}
