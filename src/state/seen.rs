use std::collections::HashSet;

/// Ids already processed during the current run
///
/// Newest-first pagination drifts when papers are submitted mid-crawl: an
/// entry at the end of page N shows up again at the start of page N+1.
/// The set is never persisted; a resumed run rebuilds it from cached pages.
#[derive(Debug, Clone, Default)]
pub struct SeenIds {
    ids: HashSet<String>,
}

impl SeenIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an id, returning `true` the first time it is seen
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
