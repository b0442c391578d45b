//! URL parsing and resolution (simplified RFC 3986).
//!
//! Only what the navigation layer needs: absolute `http`/`https` URLs,
//! origins, and resolution of the references found in `href` attributes.

use std::fmt;

/// A parsed URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Url {
    /// Scheme component, lowercased (e.g. `"http"`, `"mailto"`).
    pub scheme: String,
    /// Host component (e.g. `"example.com"`).
    pub host: String,
    /// Optional explicit port number.
    pub port: Option<u16>,
    /// Path component starting with `/`.
    pub path: String,
    /// Optional query string (without the leading `?`).
    pub query: Option<String>,
    /// Optional fragment (without the leading `#`).
    pub fragment: Option<String>,
}

impl Url {
    /// Parse an absolute URL (`scheme://host[:port]/path?query#fragment`).
    ///
    /// Returns `None` for relative references and for empty input.
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }
        let idx = url.find("://")?;
        let scheme = &url[..idx];
        if !is_scheme(scheme) {
            return None;
        }
        Self::parse_authority_and_path(scheme, &url[idx + 3..])
    }

    /// Parse `host[:port]/path?query#fragment` after the scheme has been
    /// stripped.
    fn parse_authority_and_path(scheme: &str, rest: &str) -> Option<Url> {
        let (rest, query, fragment) = split_path_query_fragment(rest);

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest.as_str(), "/"),
        };
        if authority.is_empty() {
            return None;
        }

        let (host, port) = match authority.rfind(':') {
            Some(i) => match authority[i + 1..].parse::<u16>() {
                Ok(p) => (&authority[..i], Some(p)),
                Err(_) => (authority, None),
            },
            None => (authority, None),
        };

        Some(Url {
            scheme: scheme.to_lowercase(),
            host: host.to_lowercase(),
            port,
            path: path.to_string(),
            query,
            fragment,
        })
    }

    /// Resolve a reference against this base URL.
    ///
    /// Handles absolute URLs (returned as-is), protocol-relative
    /// (`//host/path`), absolute paths (`/path`), relative paths
    /// (`path`, `../path`), query-only (`?q=x`), and fragment-only
    /// (`#frag`) references. Non-hierarchical references such as
    /// `mailto:` have no URL form here and yield `None`.
    pub fn resolve(&self, relative: &str) -> Option<Url> {
        let relative = relative.trim();
        if relative.is_empty() {
            return Some(self.clone());
        }

        if let Some(scheme) = reference_scheme(relative) {
            return if relative[scheme.len() + 1..].starts_with("//") {
                Url::parse(relative)
            } else {
                None
            };
        }

        if relative.starts_with("//") {
            return Url::parse(&format!("{}:{}", self.scheme, relative));
        }

        if let Some(frag) = relative.strip_prefix('#') {
            let mut resolved = self.clone();
            resolved.fragment = Some(frag.to_string());
            return Some(resolved);
        }

        if let Some(query) = relative.strip_prefix('?') {
            let mut resolved = self.clone();
            resolved.query = Some(query.to_string());
            resolved.fragment = None;
            return Some(resolved);
        }

        let (rel_path, query, fragment) = split_path_query_fragment(relative);
        let path = if rel_path.starts_with('/') {
            resolve_path("/", &rel_path)
        } else {
            resolve_path(self.directory(), &rel_path)
        };
        Some(Url {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            port: self.port,
            path,
            query,
            fragment,
        })
    }

    /// The directory portion of the path (up to and including the last
    /// `/`).
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[..=i],
            None => "/",
        }
    }

    /// Port, or the scheme's default.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.default_port())
    }

    /// 443 for `https`, 80 otherwise.
    pub fn default_port(&self) -> u16 {
        if self.scheme == "https" { 443 } else { 80 }
    }

    /// Whether both URLs share scheme, host, and effective port.
    pub fn same_origin(&self, other: &Url) -> bool {
        self.scheme == other.scheme
            && self.host == other.host
            && self.effective_port() == other.effective_port()
    }

    /// Path plus query, as sent in a request line.
    pub fn request_target(&self) -> String {
        match self.query {
            Some(ref q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        write!(f, "{}", self.path)?;
        if let Some(ref q) = self.query {
            write!(f, "?{q}")?;
        }
        if let Some(ref frag) = self.fragment {
            write!(f, "#{frag}")?;
        }
        Ok(())
    }
}

/// The scheme of a reference like `mailto:x@y` or `https://...`, if it
/// has one.
pub fn reference_scheme(reference: &str) -> Option<&str> {
    let colon = reference.find(':')?;
    let candidate = &reference[..colon];
    // A `/`, `?`, or `#` before the colon means it is part of a path.
    if is_scheme(candidate) {
        Some(candidate)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Split a (possibly relative) path string into `(path, query, fragment)`.
fn split_path_query_fragment(s: &str) -> (String, Option<String>, Option<String>) {
    let (s, fragment) = match s.find('#') {
        Some(i) => (&s[..i], Some(s[i + 1..].to_string())),
        None => (s, None),
    };
    let (path, query) = match s.find('?') {
        Some(i) => (s[..i].to_string(), Some(s[i + 1..].to_string())),
        None => (s.to_string(), None),
    };
    (path, query, fragment)
}

/// Resolve a relative path against a base directory, handling `..` and
/// `.` segments. A trailing `/` on `relative` is kept.
fn resolve_path(base_dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();

    for seg in relative.split('/') {
        match seg {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            s => segments.push(s),
        }
    }

    let mut path = format!("/{}", segments.join("/"));
    let ends_in_dir = relative.ends_with('/') || relative.ends_with("/.") || relative.ends_with("/..");
    if ends_in_dir && path != "/" {
        path.push('/');
    }
    path
}
