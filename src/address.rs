//! Shareable address store
use crate::query::QuerySnapshot;
use std::collections::VecDeque;

/// Path the search view lives under.
pub const SEARCH_PATH: &str = "/search";

/// Where the current query is mirrored so it can be shared or reloaded.
pub trait AddressStore: Send {
    fn read(&self) -> String;
    fn write(&mut self, address: String);
}

/// Full address for a snapshot, e.g. `/search?query=water&page=1`.
pub fn address_for(snapshot: &QuerySnapshot) -> String {
    format!("{SEARCH_PATH}?{}", snapshot.to_query_string())
}

/// Address store that keeps a bounded navigation history.
#[derive(Debug, Clone)]
pub struct MemoryAddress {
    history: VecDeque<String>,
    max_history: usize,
}

impl MemoryAddress {
    pub fn new(initial: impl Into<String>) -> Self {
        let mut history = VecDeque::new();
        history.push_back(initial.into());
        Self {
            history,
            max_history: 100,
        }
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history.max(1);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
        self
    }

    /// Addresses written so far, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }
}

impl Default for MemoryAddress {
    fn default() -> Self {
        Self::new(SEARCH_PATH)
    }
}

impl AddressStore for MemoryAddress {
    fn read(&self) -> String {
        self.history.back().cloned().unwrap_or_default()
    }

    fn write(&mut self, address: String) {
        if self.history.back() == Some(&address) {
            return;
        }
        if self.history.len() >= self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(address);
    }
}
