//! Session history: the traversal stack a host keeps for the controller.
//!
//! Browsers own this stack themselves. Hosts without one (the headless
//! driver, tests) use [`SessionHistory`] to get the same semantics: pushing
//! drops the forward entries, traversal moves between entries and hands
//! back the state payload stored with the target.

/// A single entry in the traversal stack.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Address shown while this entry is current.
    pub address: String,
    /// Opaque state payload (a serialized `HistoryRecord`), if any.
    pub state: Option<String>,
    pub title: String,
}

/// Back/forward stack around a current entry.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    back_stack: Vec<HistoryEntry>,
    forward_stack: Vec<HistoryEntry>,
    current: Option<HistoryEntry>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a single entry, as a freshly loaded document does.
    pub fn with_initial(address: &str) -> Self {
        let mut history = Self::new();
        history.push(address, None);
        history
    }

    /// Push a new entry. The current entry moves to the back stack and the
    /// forward stack is discarded.
    pub fn push(&mut self, address: &str, state: Option<String>) {
        if let Some(entry) = self.current.take() {
            self.back_stack.push(entry);
        }
        self.forward_stack.clear();
        self.current = Some(HistoryEntry {
            address: address.to_string(),
            state,
            title: String::new(),
        });
    }

    /// Overwrite the current entry's address and state in place.
    pub fn replace_current(&mut self, address: &str, state: Option<String>) {
        match self.current.as_mut() {
            Some(entry) => {
                entry.address = address.to_string();
                entry.state = state;
            },
            None => self.push(address, state),
        }
    }

    /// Step back. Returns the entry that became current.
    pub fn go_back(&mut self) -> Option<HistoryEntry> {
        let prev = self.back_stack.pop()?;
        if let Some(current) = self.current.take() {
            self.forward_stack.push(current);
        }
        self.current = Some(prev.clone());
        Some(prev)
    }

    /// Step forward. Returns the entry that became current.
    pub fn go_forward(&mut self) -> Option<HistoryEntry> {
        let next = self.forward_stack.pop()?;
        if let Some(current) = self.current.take() {
            self.back_stack.push(current);
        }
        self.current = Some(next.clone());
        Some(next)
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.current.as_ref()
    }

    pub fn current_address(&self) -> Option<&str> {
        self.current.as_ref().map(|e| e.address.as_str())
    }

    /// Update the current entry's title (after it resolves).
    pub fn update_title(&mut self, title: &str) {
        if let Some(entry) = self.current.as_mut() {
            entry.title = title.to_string();
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.back_stack.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward_stack.is_empty()
    }

    /// Total number of entries, including forward ones.
    pub fn len(&self) -> usize {
        self.back_stack.len() + self.forward_stack.len() + usize::from(self.current.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current entry followed by back-stack entries, most recent first.
    pub fn entries(&self) -> Vec<&HistoryEntry> {
        self.current
            .iter()
            .chain(self.back_stack.iter().rev())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_moves_current_to_back_stack() {
        let mut h = SessionHistory::with_initial("/");
        h.push("/a", Some("{}".into()));
        assert!(h.can_go_back());
        assert_eq!(h.current_address(), Some("/a"));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn go_back_returns_previous_entry_with_state() {
        let mut h = SessionHistory::new();
        h.push("/", Some("root".into()));
        h.push("/a", Some("a".into()));

        let entry = h.go_back().unwrap();
        assert_eq!(entry.address, "/");
        assert_eq!(entry.state.as_deref(), Some("root"));
        assert_eq!(h.current_address(), Some("/"));
    }

    #[test]
    fn forward_after_back() {
        let mut h = SessionHistory::with_initial("/");
        h.push("/a", None);
        h.go_back();
        assert!(h.can_go_forward());
        assert_eq!(h.go_forward().unwrap().address, "/a");
        assert!(!h.can_go_forward());
    }

    #[test]
    fn push_clears_forward_stack() {
        let mut h = SessionHistory::with_initial("/");
        h.push("/a", None);
        h.push("/b", None);
        h.go_back();
        h.push("/c", None);
        assert!(!h.can_go_forward());
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn replace_current_keeps_stack_shape() {
        let mut h = SessionHistory::with_initial("/index.html");
        h.replace_current("/", Some("state".into()));
        assert_eq!(h.len(), 1);
        assert_eq!(h.current().unwrap().state.as_deref(), Some("state"));
        assert_eq!(h.current_address(), Some("/"));
    }

    #[test]
    fn replace_on_empty_pushes() {
        let mut h = SessionHistory::new();
        h.replace_current("/", None);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn back_at_start_is_none() {
        let mut h = SessionHistory::with_initial("/");
        assert!(h.go_back().is_none());
        assert!(h.go_forward().is_none());
        assert_eq!(h.current_address(), Some("/"));
    }

    #[test]
    fn entries_most_recent_first() {
        let mut h = SessionHistory::with_initial("/");
        h.push("/a", None);
        h.update_title("A");
        h.push("/b", None);
        let entries = h.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].address, "/b");
        assert_eq!(entries[1].address, "/a");
        assert_eq!(entries[1].title, "A");
        assert_eq!(entries[2].address, "/");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_paths(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
            proptest::collection::vec("[a-z]{1,8}".prop_map(|s| format!("/{s}")), min..max)
        }

        proptest! {
            #[test]
            fn current_is_last_pushed(paths in arb_paths(1, 20)) {
                let mut h = SessionHistory::new();
                for p in &paths {
                    h.push(p, None);
                }
                prop_assert_eq!(h.current_address(), Some(paths.last().unwrap().as_str()));
                prop_assert_eq!(h.len(), paths.len());
            }

            #[test]
            fn back_then_forward_returns_to_same(paths in arb_paths(2, 10)) {
                let mut h = SessionHistory::new();
                for p in &paths {
                    h.push(p, None);
                }
                let before = h.current_address().unwrap().to_string();
                h.go_back().unwrap();
                h.go_forward().unwrap();
                prop_assert_eq!(h.current_address().unwrap(), before.as_str());
            }

            #[test]
            fn can_go_back_all_the_way(paths in arb_paths(1, 20)) {
                let mut h = SessionHistory::new();
                for p in &paths {
                    h.push(p, None);
                }
                let mut steps = 0;
                while h.can_go_back() {
                    h.go_back();
                    steps += 1;
                }
                prop_assert_eq!(steps, paths.len() - 1);
                prop_assert_eq!(h.current_address().unwrap(), paths[0].as_str());
                prop_assert_eq!(h.len(), paths.len());
            }
        }
    }
}
