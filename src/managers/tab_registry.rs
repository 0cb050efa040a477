//! Registry of automated notebook tabs and the rotation cursor over them.
//!
//! The Coordinator adds an entry when a page announces itself and removes it
//! on the tab-close event. The cursor is an index kept apart from the
//! collection and recomputed against the live set on every step, so
//! membership changes mid-rotation are picked up on the next cycle.

use crate::types::status::{TabId, TabSnapshot};

/// Ordered set of registered notebook tabs.
pub struct TabRegistry {
    entries: Vec<TabSnapshot>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or refresh a tab snapshot. A page re-registering after a reload
    /// replaces its previous entry in place.
    pub fn insert(&mut self, snapshot: TabSnapshot) {
        match self.entries.iter_mut().find(|t| t.id == snapshot.id) {
            Some(existing) => *existing = snapshot,
            None => self.entries.push(snapshot),
        }
    }

    /// Remove a tab by id. Returns true if an entry was removed.
    pub fn remove(&mut self, tab: TabId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|t| t.id != tab);
        self.entries.len() != before
    }

    pub fn contains(&self, tab: TabId) -> bool {
        self.entries.iter().any(|t| t.id == tab)
    }

    pub fn get(&self, tab: TabId) -> Option<&TabSnapshot> {
        self.entries.iter().find(|t| t.id == tab)
    }

    pub fn get_at(&self, index: usize) -> Option<&TabSnapshot> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tabs(&self) -> &[TabSnapshot] {
        &self.entries
    }
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Restartable cyclic position over a `TabRegistry`.
///
/// Invalidated (reset to the start) whenever the registry mutates and
/// whenever rotation stops; wraps against the registry's current contents,
/// never a frozen snapshot.
pub struct RotationCursor {
    next: usize,
}

impl RotationCursor {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Reset to the beginning of the set.
    pub fn invalidate(&mut self) {
        self.next = 0;
    }

    /// Advance to the next registered tab, wrapping at the end of the
    /// current set. Returns `None` only when the registry is empty.
    pub fn advance(&mut self, registry: &TabRegistry) -> Option<TabSnapshot> {
        if registry.is_empty() {
            self.next = 0;
            return None;
        }
        if self.next >= registry.len() {
            self.next = 0;
        }
        let snapshot = registry.get_at(self.next).cloned();
        self.next += 1;
        snapshot
    }
}

impl Default for RotationCursor {
    fn default() -> Self {
        Self::new()
    }
}
