//! The set of discovered URLs and their visit state
//!
//! Owned by the coordinator task only. Every URL gets exactly one entry; an
//! entry is marked visited when its page is handed out for dispatch and never
//! goes back. Undispatched URLs wait in a FIFO so every entry is eventually
//! scheduled.

use std::collections::{BTreeMap, HashMap, VecDeque};

/// One discovered URL
#[derive(Debug)]
struct Entry<P> {
    /// The page, held until it is dispatched
    page: Option<P>,

    /// Set once the page has been handed to a worker
    visited: bool,
}

/// Map of URL to entry, plus the queue of entries not yet dispatched
#[derive(Debug)]
pub struct Frontier<P> {
    entries: HashMap<String, Entry<P>>,
    pending: VecDeque<String>,
}

impl<P> Default for Frontier<P> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            pending: VecDeque::new(),
        }
    }
}

impl<P> Frontier<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `page` under `url` unless the URL is already known
    ///
    /// Returns true if a new entry was created.
    pub fn discover(&mut self, url: String, page: P) -> bool {
        use std::collections::hash_map::Entry as MapEntry;

        match self.entries.entry(url) {
            MapEntry::Occupied(_) => false,
            MapEntry::Vacant(slot) => {
                self.pending.push_back(slot.key().clone());
                slot.insert(Entry {
                    page: Some(page),
                    visited: false,
                });
                true
            }
        }
    }

    /// Marks the oldest undispatched entry visited and returns its page
    pub fn next_pending(&mut self) -> Option<P> {
        while let Some(url) = self.pending.pop_front() {
            let Some(entry) = self.entries.get_mut(&url) else {
                continue;
            };
            if entry.visited {
                continue;
            }
            entry.visited = true;
            if let Some(page) = entry.page.take() {
                return Some(page);
            }
        }
        None
    }

    /// True while at least one entry has not been dispatched
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of undispatched entries
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the frontier into a sorted map of URL to visited flag
    pub fn into_visit_map(self) -> BTreeMap<String, bool> {
        self.entries
            .into_iter()
            .map(|(url, entry)| (url, entry.visited))
            .collect()
    }
}
