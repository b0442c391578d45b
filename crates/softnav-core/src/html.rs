//! Tolerant HTML scanning for content-region and title extraction.
//!
//! This is not a tree builder. It walks the markup tag by tag, the way the
//! tokenization stage of an HTML parser does, and tracks just enough
//! nesting to find the first element matching a [`ContentSelector`] and
//! slice out its inner markup verbatim. Comments, DOCTYPE, and the raw text
//! of `<script>`, `<style>`, `<textarea>` and `<title>` are skipped, so a
//! tag name inside them never confuses the search. Malformed input never
//! fails; it only ever yields "not found".

use softnav_types::error::{Result, SoftnavError};

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

/// Which element is the content region: `tag`, `#id`, or `tag#id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSelector {
    tag: Option<String>,
    id: Option<String>,
}

impl ContentSelector {
    pub fn parse(selector: &str) -> Result<Self> {
        let selector = selector.trim();
        let (tag, id) = match selector.split_once('#') {
            Some((tag, id)) => (tag, Some(id)),
            None => (selector, None),
        };
        let valid = |s: &str| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
        };
        if !tag.is_empty() && !valid(tag) {
            return Err(SoftnavError::Config(format!("bad selector tag: {selector}")));
        }
        if let Some(id) = id
            && !valid(id)
        {
            return Err(SoftnavError::Config(format!("bad selector id: {selector}")));
        }
        if tag.is_empty() && id.is_none() {
            return Err(SoftnavError::Config("empty content selector".to_string()));
        }
        Ok(Self {
            tag: (!tag.is_empty()).then(|| tag.to_ascii_lowercase()),
            id: id.map(str::to_string),
        })
    }

    fn matches(&self, tag: &Tag) -> bool {
        if let Some(ref name) = self.tag
            && *name != tag.name
        {
            return false;
        }
        match self.id {
            Some(ref id) => tag.attribute("id") == Some(id.as_str()),
            None => true,
        }
    }
}

impl Default for ContentSelector {
    fn default() -> Self {
        Self {
            tag: Some("main".to_string()),
            id: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Decode a response body as document text.
///
/// A body that is not UTF-8 cannot be parsed. A leading BOM is dropped.
pub fn decode_body(body: &[u8]) -> Result<&str> {
    let text = std::str::from_utf8(body)
        .map_err(|e| SoftnavError::Parse(format!("body is not UTF-8: {e}")))?;
    Ok(text.strip_prefix('\u{FEFF}').unwrap_or(text))
}

/// Inner markup of the first element matching `selector`, verbatim.
///
/// An unclosed region ends at `</body>`, `</html>`, or end of input.
pub fn extract_region<'a>(html: &'a str, selector: &ContentSelector) -> Option<&'a str> {
    let mut scanner = Scanner::new(html);

    // (inner start offset, element name, same-name nesting depth)
    let mut open: Option<(usize, String, usize)> = None;

    while let Some(tag) = scanner.next_tag() {
        match open {
            None => {
                if tag.kind == TagKind::Start && selector.matches(&tag) {
                    if VOID_ELEMENTS.contains(&tag.name.as_str()) {
                        return Some("");
                    }
                    open = Some((tag.end, tag.name.clone(), 1));
                }
            },
            Some((inner, ref name, ref mut depth)) => {
                if tag.name == *name {
                    match tag.kind {
                        TagKind::Start => *depth += 1,
                        TagKind::End => {
                            *depth -= 1;
                            if *depth == 0 {
                                return Some(&html[inner..tag.start]);
                            }
                        },
                    }
                } else if tag.kind == TagKind::End && (tag.name == "body" || tag.name == "html") {
                    return Some(&html[inner..tag.start]);
                }
            },
        }
    }

    open.map(|(inner, _, _)| &html[inner..])
}

/// Text of the first `<title>` element.
///
/// Character references are decoded and whitespace collapsed. An empty
/// title counts as no title.
pub fn extract_title(html: &str) -> Option<String> {
    let mut scanner = Scanner::new(html);
    while let Some(tag) = scanner.next_tag() {
        if tag.kind == TagKind::Start && tag.name == "title" {
            let raw = scanner.take_raw_text();
            let text = collapse_whitespace(&decode_entities(raw));
            return (!text.is_empty()).then_some(text);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Start,
    End,
}

/// A tag found in the source, with byte offsets of `<` and one past `>`.
///
/// A trailing `/` is accepted and ignored, as HTML does for non-void
/// elements.
#[derive(Debug, Clone)]
struct Tag {
    kind: TagKind,
    name: String,
    attributes: Vec<(String, String)>,
    start: usize,
    end: usize,
}

impl Tag {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    /// Set after a raw-text start tag until its content is consumed.
    pending_raw: Option<String>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            pending_raw: None,
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    /// Consume the raw text of the element just opened, returning it.
    fn take_raw_text(&mut self) -> &'a str {
        let Some(name) = self.pending_raw.take() else {
            return "";
        };
        let start = self.pos;
        let end = self.find_end_tag(&name).unwrap_or(self.src.len());
        self.pos = end;
        &self.src[start..end]
    }

    /// Offset of the next `</name` (ASCII case-insensitive) from `pos`.
    fn find_end_tag(&self, name: &str) -> Option<usize> {
        let bytes = self.bytes();
        let mut i = self.pos;
        while let Some(off) = bytes[i..].windows(2).position(|w| w == b"</") {
            let at = i + off;
            let name_end = at + 2 + name.len();
            if name_end <= bytes.len()
                && bytes[at + 2..name_end].eq_ignore_ascii_case(name.as_bytes())
                && bytes
                    .get(name_end)
                    .is_none_or(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
            {
                return Some(at);
            }
            i = at + 2;
        }
        None
    }

    fn next_tag(&mut self) -> Option<Tag> {
        if self.pending_raw.is_some() {
            self.take_raw_text();
        }
        let bytes = self.bytes();

        loop {
            let lt = self.pos + bytes[self.pos..].iter().position(|&b| b == b'<')?;
            self.pos = lt + 1;
            let rest = &bytes[lt + 1..];

            if rest.starts_with(b"!--") {
                self.pos = match find(&bytes[lt + 4..], b"-->") {
                    Some(i) => lt + 4 + i + 3,
                    None => bytes.len(),
                };
                continue;
            }
            if rest.starts_with(b"!") || rest.starts_with(b"?") {
                self.pos = match bytes[lt..].iter().position(|&b| b == b'>') {
                    Some(i) => lt + i + 1,
                    None => bytes.len(),
                };
                continue;
            }

            let (kind, name_start) = match rest {
                [b'/', c, ..] if c.is_ascii_alphabetic() => (TagKind::End, lt + 2),
                [c, ..] if c.is_ascii_alphabetic() => (TagKind::Start, lt + 1),
                // A bare `<` is text.
                _ => continue,
            };

            let tag = self.read_tag(kind, lt, name_start);
            if tag.kind == TagKind::Start && RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) {
                self.pending_raw = Some(tag.name.clone());
            }
            return Some(tag);
        }
    }

    /// Read a tag whose name starts at `name_start`; leaves `pos` past `>`.
    fn read_tag(&mut self, kind: TagKind, start: usize, name_start: usize) -> Tag {
        let bytes = self.bytes();
        let mut i = name_start;
        while i < bytes.len() && !is_tag_delim(bytes[i]) {
            i += 1;
        }
        let name = self.src[name_start..i].to_ascii_lowercase();

        let mut attributes = Vec::new();
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i) {
                None => break,
                Some(b'>') => {
                    i += 1;
                    break;
                },
                Some(b'/') => {
                    i += 1;
                    continue;
                },
                Some(_) => {},
            }

            let attr_start = i;
            while i < bytes.len() && !is_tag_delim(bytes[i]) && bytes[i] != b'=' {
                i += 1;
            }
            if i == attr_start {
                // Stray `=`; skip it.
                i += 1;
                continue;
            }
            let attr_name = self.src[attr_start..i].to_ascii_lowercase();

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let mut value = String::new();
            if bytes.get(i) == Some(&b'=') {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                let (raw, next) = match bytes.get(i) {
                    Some(&q) if q == b'"' || q == b'\'' => {
                        let body = i + 1;
                        match bytes[body..].iter().position(|&b| b == q) {
                            Some(len) => (&self.src[body..body + len], body + len + 1),
                            None => (&self.src[body..], bytes.len()),
                        }
                    },
                    _ => {
                        let begin = i;
                        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>'
                        {
                            i += 1;
                        }
                        (&self.src[begin..i], i)
                    },
                };
                value = decode_entities(raw);
                i = next;
            }
            if kind == TagKind::Start && !attributes.iter().any(|(k, _)| *k == attr_name) {
                attributes.push((attr_name, value));
            }
        }

        self.pos = i;
        Tag {
            kind,
            name,
            attributes,
            start,
            end: i,
        }
    }
}

fn is_tag_delim(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'>' || b == b'/'
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Decode character references (`&amp;`, `&#39;`, `&#x2014;`).
///
/// Unknown or malformed references are left as written.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after.find(';').filter(|&semi| semi <= 32).and_then(|semi| {
            let name = &after[..semi];
            lookup_reference(name).map(|text| (text, semi + 1))
        });
        match decoded {
            Some((text, consumed)) => {
                out.push_str(&text);
                rest = &after[consumed..];
            },
            None => {
                out.push('&');
                rest = after;
            },
        }
    }
    out.push_str(rest);
    out
}

fn lookup_reference(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return Some(char::from_u32(code).unwrap_or('\u{FFFD}').to_string());
    }
    let text = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{00A0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "hellip" => "\u{2026}",
        "bull" => "\u{2022}",
        "middot" => "\u{00B7}",
        "laquo" => "\u{00AB}",
        "raquo" => "\u{00BB}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        "times" => "\u{00D7}",
        "deg" => "\u{00B0}",
        "euro" => "\u{20AC}",
        "pound" => "\u{00A3}",
        "larr" => "\u{2190}",
        "rarr" => "\u{2192}",
        _ => return None,
    };
    Some(text.to_string())
}

/// Collapse runs of ASCII whitespace to one space and trim.
fn collapse_whitespace(s: &str) -> String {
    s.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}
