//! Session content cache.
//!
//! Maps a [`NormalizedPath`] to the content fragment last loaded for it,
//! along with the title of the document it came from when that document
//! was the primary target. Unlike a resource cache there is no size budget and no eviction: the
//! map only grows with the number of distinct pages visited, and lives as
//! long as the session.

use std::collections::HashMap;

use softnav_types::path::{ContentFragment, NormalizedPath};

#[derive(Debug)]
struct Entry {
    fragment: ContentFragment,
    title: Option<String>,
}

/// Path-keyed fragment cache.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<NormalizedPath, Entry>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the fragment for `path`.
    pub fn get(&self, path: &NormalizedPath) -> Option<&ContentFragment> {
        self.entries.get(path).map(|e| &e.fragment)
    }

    /// Title stored with the fragment for `path`, if any.
    pub fn title(&self, path: &NormalizedPath) -> Option<&str> {
        self.entries.get(path).and_then(|e| e.title.as_deref())
    }

    /// Store `fragment` and `title` under `path`, replacing any previous
    /// entry whole.
    pub fn put(&mut self, path: NormalizedPath, fragment: ContentFragment, title: Option<String>) {
        log::debug!("cache put {path} ({} bytes)", fragment.len());
        self.entries.insert(path, Entry { fragment, title });
    }

    pub fn contains(&self, path: &NormalizedPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached paths in sorted order.
    pub fn paths(&self) -> Vec<&NormalizedPath> {
        let mut paths: Vec<_> = self.entries.keys().collect();
        paths.sort();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_returns_none() {
        let cache = ContentCache::new();
        assert!(cache.get(&"/about".into()).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn put_and_get() {
        let mut cache = ContentCache::new();
        cache.put("/about".into(), "<h1>About</h1>".into(), Some("About".into()));
        assert_eq!(
            cache.get(&"/about".into()).map(ContentFragment::as_str),
            Some("<h1>About</h1>")
        );
        assert_eq!(cache.title(&"/about".into()), Some("About"));
        assert!(cache.contains(&"/about".into()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn root_alias_hits_same_entry() {
        let mut cache = ContentCache::new();
        cache.put(NormalizedPath::new("/index.html"), "home".into(), None);
        assert_eq!(
            cache.get(&NormalizedPath::new("/")).map(ContentFragment::as_str),
            Some("home")
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_overwrites_whole_entry() {
        let mut cache = ContentCache::new();
        cache.put("/a".into(), "old".into(), Some("Old".into()));
        cache.put("/a".into(), "new".into(), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"/a".into()).map(ContentFragment::as_str), Some("new"));
        assert_eq!(cache.title(&"/a".into()), None);
    }

    #[test]
    fn paths_are_sorted() {
        let mut cache = ContentCache::new();
        cache.put("/b".into(), "b".into(), None);
        cache.put("/".into(), "root".into(), None);
        cache.put("/a".into(), "a".into(), None);
        let paths: Vec<&str> = cache.paths().into_iter().map(NormalizedPath::as_str).collect();
        assert_eq!(paths, vec!["/", "/a", "/b"]);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn len_equals_distinct_paths(names in proptest::collection::vec("[a-c]{1,2}", 0..20)) {
                let mut cache = ContentCache::new();
                for name in &names {
                    cache.put(NormalizedPath::new(name), ContentFragment::new(name.clone()), None);
                }
                let distinct: std::collections::HashSet<_> = names.iter().collect();
                prop_assert_eq!(cache.len(), distinct.len());
            }
        }
    }
}
