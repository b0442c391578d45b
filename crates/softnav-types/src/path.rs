//! Canonical paths, history records, and content fragments.
//!
//! Every cache key and every history entry is a [`NormalizedPath`], so two
//! spellings of the same location (`/` and `/index.html`) can never end up
//! as separate entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default document file suffix for extensionless routes.
pub const DEFAULT_DOCUMENT_SUFFIX: &str = ".html";

/// Default index document the root location aliases to.
pub const DEFAULT_INDEX_DOCUMENT: &str = "index.html";

// ---------------------------------------------------------------------------
// NormalizedPath
// ---------------------------------------------------------------------------

/// A canonical navigable location.
///
/// Always starts with `/`, never carries a query or fragment, and the root
/// index document is collapsed to `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct NormalizedPath(String);

impl NormalizedPath {
    /// Normalize `raw` with the default [`PathRules`].
    pub fn new(raw: &str) -> Self {
        PathRules::default().normalize(raw)
    }

    /// The canonical root path.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NormalizedPath {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for NormalizedPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<NormalizedPath> for String {
    fn from(path: NormalizedPath) -> Self {
        path.0
    }
}

impl AsRef<str> for NormalizedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// PathRules
// ---------------------------------------------------------------------------

/// The site's document-file convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathRules {
    /// Suffix appended to extensionless routes (`/about` -> `/about.html`).
    pub document_suffix: String,
    /// Index document name; `/<index_document>` is an alias of `/`.
    pub index_document: String,
}

impl Default for PathRules {
    fn default() -> Self {
        Self {
            document_suffix: DEFAULT_DOCUMENT_SUFFIX.to_string(),
            index_document: DEFAULT_INDEX_DOCUMENT.to_string(),
        }
    }
}

impl PathRules {
    /// Canonicalize a raw path.
    ///
    /// Strips query and fragment, ensures a leading `/`, and collapses the
    /// root index document to `/`. Only the root alias collapses.
    pub fn normalize(&self, raw: &str) -> NormalizedPath {
        let raw = raw.trim();
        let end = raw.find(['?', '#']).unwrap_or(raw.len());
        let path = &raw[..end];

        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        if path.strip_prefix('/') == Some(self.index_document.as_str()) {
            return NormalizedPath::root();
        }
        NormalizedPath(path)
    }

    /// The first request target for `path`.
    ///
    /// Paths already naming a document are used as-is, the root maps to
    /// its index document, anything else gets the document suffix.
    pub fn primary_target(&self, path: &NormalizedPath) -> String {
        if path.is_root() {
            format!("/{}", self.index_document)
        } else if path.as_str().ends_with(&self.document_suffix) {
            path.as_str().to_string()
        } else {
            format!("{}{}", path.as_str(), self.document_suffix)
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryRecord
// ---------------------------------------------------------------------------

/// The state attached to a traversal-stack entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub path: NormalizedPath,
}

impl HistoryRecord {
    pub fn new(path: NormalizedPath) -> Self {
        Self { path }
    }

    /// Serialize into the platform's history-state payload.
    pub fn to_state(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a history-state payload.
    ///
    /// Payloads written by something else (or not at all) are not usable
    /// records; the caller must not guess a path from them.
    pub fn from_state(state: &str) -> Option<Self> {
        match serde_json::from_str(state) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("ignoring untracked history state: {e}");
                None
            },
        }
    }
}

// ---------------------------------------------------------------------------
// ContentFragment
// ---------------------------------------------------------------------------

/// Markup spliced into the content region. Opaque to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentFragment(String);

impl ContentFragment {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for ContentFragment {
    fn from(markup: String) -> Self {
        Self(markup)
    }
}

impl From<&str> for ContentFragment {
    fn from(markup: &str) -> Self {
        Self(markup.to_string())
    }
}
