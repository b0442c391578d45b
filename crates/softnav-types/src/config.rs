//! Session configuration (`softnav.toml`).

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, SoftnavError};
use crate::path::PathRules;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SoftnavConfig {
    pub site: SiteConfig,
    pub paths: PathRules,
    pub content: ContentConfig,
    pub transition: TransitionConfig,
}

/// Where the site lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// `scheme://host[:port]`, no path.
    pub origin: String,
    /// Path loaded natively when the session boots.
    pub start_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8000".to_string(),
            start_path: "/".to_string(),
        }
    }
}

/// How the content region is found in a fetched document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// `tag`, `#id`, or `tag#id`.
    pub selector: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            selector: "main".to_string(),
        }
    }
}

/// Timing of the soft transition.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Fixed delay between fade-out and swap.
    pub swap_delay_ms: u64,
    /// Fetch and apply the target document's title after each swap.
    pub sync_title: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            swap_delay_ms: 100,
            sync_title: true,
        }
    }
}

impl TransitionConfig {
    pub fn swap_delay(&self) -> Duration {
        Duration::from_millis(self.swap_delay_ms)
    }
}

impl SoftnavConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let origin = &self.site.origin;
        let Some((scheme, rest)) = origin.split_once("://") else {
            return Err(SoftnavError::Config(format!(
                "origin has no scheme: {origin}"
            )));
        };
        if scheme != "http" && scheme != "https" {
            return Err(SoftnavError::Config(format!(
                "unsupported origin scheme: {scheme}"
            )));
        }
        if rest.is_empty() || rest.contains('/') {
            return Err(SoftnavError::Config(format!(
                "origin must be scheme://host[:port]: {origin}"
            )));
        }
        if !self.paths.document_suffix.starts_with('.') {
            return Err(SoftnavError::Config(format!(
                "document suffix must start with '.': {}",
                self.paths.document_suffix
            )));
        }
        if self.paths.index_document.is_empty() || self.paths.index_document.contains('/') {
            return Err(SoftnavError::Config(format!(
                "bad index document: {:?}",
                self.paths.index_document
            )));
        }
        if self.content.selector.trim().is_empty() {
            return Err(SoftnavError::Config("empty content selector".to_string()));
        }
        Ok(())
    }
}
