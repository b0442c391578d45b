//! Link interception rules.
//!
//! Decides whether an activated link is a soft navigation and, if so,
//! which [`NormalizedPath`] it leads to. Anything not intercepted keeps the
//! host's default behaviour.

use softnav_net::url::{self, Url};
use softnav_types::path::{NormalizedPath, PathRules};

/// An activated link, as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkActivation {
    /// The raw `href` attribute.
    pub href: String,
    /// The `target` attribute, if set.
    pub target: Option<String>,
    /// The link carries a `download` attribute.
    pub download: bool,
    /// The user asked for a new tab/window (modifier key, middle button).
    pub new_context: bool,
}

impl LinkActivation {
    pub fn new(href: &str) -> Self {
        Self {
            href: href.to_string(),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn with_download(mut self) -> Self {
        self.download = true;
        self
    }

    pub fn with_new_context(mut self) -> Self {
        self.new_context = true;
        self
    }

    /// Whether the link opens somewhere other than the current context.
    fn leaves_context(&self) -> bool {
        if self.download || self.new_context {
            return true;
        }
        match self.target.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(t) => !t.eq_ignore_ascii_case("_self"),
        }
    }
}

/// The URL of the page currently displayed.
pub fn page_url(origin: &Url, displayed: &NormalizedPath) -> Url {
    Url {
        path: displayed.as_str().to_string(),
        query: None,
        fragment: None,
        ..origin.clone()
    }
}

/// Resolve `href` against the displayed page and normalize its path.
///
/// `None` for fragment-only and non-http(s) references, and for anything
/// outside `origin`.
pub fn resolve_href(
    origin: &Url,
    displayed: &NormalizedPath,
    rules: &PathRules,
    href: &str,
) -> Option<NormalizedPath> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if let Some(scheme) = url::reference_scheme(href)
        && !scheme.eq_ignore_ascii_case("http")
        && !scheme.eq_ignore_ascii_case("https")
    {
        return None;
    }

    let resolved = page_url(origin, displayed).resolve(href)?;
    if !resolved.same_origin(origin) {
        return None;
    }
    Some(rules.normalize(&resolved.path))
}

/// Classify a link activation. `Some(path)` means intercept and navigate
/// softly to `path`.
pub fn classify_link(
    origin: &Url,
    displayed: &NormalizedPath,
    rules: &PathRules,
    link: &LinkActivation,
) -> Option<NormalizedPath> {
    if link.leaves_context() {
        return None;
    }
    resolve_href(origin, displayed, rules, &link.href)
}

/// Whether a navigation link pointing at `href` should be styled active.
pub fn is_active_link(
    origin: &Url,
    displayed: &NormalizedPath,
    rules: &PathRules,
    href: &str,
) -> bool {
    resolve_href(origin, displayed, rules, href).is_some_and(|p| &p == displayed)
}
