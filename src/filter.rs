//! Live filter/search over the tree, plus value-table search.
//!
//! The key filter preserves ancestry: a match three levels deep pulls its
//! parents into view too, so the result always reads as a tree rather than
//! a flat grep hit-list. It only engages once the query reaches three
//! characters, below which the cost of rescanning the whole tree isn't
//! worth it for a query that hasn't settled yet.

use std::time::{Duration, Instant};

use crate::hive::ValueStat;
use crate::tree::{Item, TreeState};

/// Minimum query length before the key filter activates.
pub const MIN_FILTER_LEN: usize = 3;

/// Debounce window for the global (cross-tree) value search.
pub const GLOBAL_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Live key-name filter state.
#[derive(Debug, Default)]
pub struct KeyFilter {
    query: String,
}

impl KeyFilter {
    /// An empty, inactive filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the filter is currently applied to the tree (i.e. the query
    /// has reached the activation threshold).
    pub fn is_active(&self) -> bool {
        self.query.chars().count() >= MIN_FILTER_LEN
    }

    /// Append a character and re-apply the filter to `tree`.
    pub fn push_char(&mut self, c: char, tree: &mut TreeState) {
        self.query.push(c);
        self.apply(tree);
    }

    /// Remove the last character and re-apply (or clear) the filter.
    pub fn pop_char(&mut self, tree: &mut TreeState) {
        self.query.pop();
        self.apply(tree);
    }

    /// Clear the query entirely and restore the pre-filter view.
    pub fn clear(&mut self, tree: &mut TreeState) {
        self.query.clear();
        if tree.has_pre_filter_snapshot() {
            tree.restore_pre_filter();
        }
    }

    fn apply(&mut self, tree: &mut TreeState) {
        if !self.is_active() {
            if tree.has_pre_filter_snapshot() {
                tree.restore_pre_filter();
            }
            return;
        }

        tree.snapshot_pre_filter();
        let candidates = tree.filterable_items().to_vec();
        let filtered = filter_by_query(&candidates, &self.query);
        *tree.items_mut() = filtered;
    }
}

/// Filter `candidates` down to items matching `query` (case-insensitive
/// substring on name and path) plus every ancestor of a match, preserving
/// the original depth-first order.
pub fn filter_by_query(candidates: &[Item], query: &str) -> Vec<Item> {
    let needle = query.to_lowercase();
    let mut keep: std::collections::HashSet<String> = std::collections::HashSet::new();

    for item in candidates {
        if item.name.to_lowercase().contains(&needle) || item.path.to_lowercase().contains(&needle) {
            keep.insert(item.path.clone());
            for ancestor in ancestors_of(&item.path) {
                keep.insert(ancestor);
            }
        }
    }

    candidates
        .iter()
        .filter(|item| keep.contains(&item.path))
        .cloned()
        .collect()
}

/// Every ancestor path of `path`, shallowest first (root-level first).
pub(crate) fn ancestors_of(path: &str) -> Vec<String> {
    let parts: Vec<&str> = path.split('\\').collect();
    let mut out = Vec::with_capacity(parts.len().saturating_sub(1));
    for i in 1..parts.len() {
        out.push(parts[..i].join("\\"));
    }
    out
}

/// Cyclic search over the value table attached to the currently selected
/// key (`n` / `N`).
#[derive(Debug, Default)]
pub struct ValueSearch {
    query: String,
    matches: Vec<usize>,
    cursor: usize,
}

impl ValueSearch {
    /// An empty search with no active query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute matches against `values` for `query` (name or type,
    /// case-insensitive substring).
    pub fn search(&mut self, query: &str, values: &[ValueStat]) {
        self.query = query.to_string();
        let needle = query.to_lowercase();
        self.matches = values
            .iter()
            .enumerate()
            .filter(|(_, v)| {
                v.name.to_lowercase().contains(&needle) || v.value_type.to_lowercase().contains(&needle)
            })
            .map(|(i, _)| i)
            .collect();
        self.cursor = 0;
    }

    /// Current query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Row indices of every current match, in table order.
    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    /// Advance to the next match, wrapping around. Returns the row index.
    pub fn next(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let idx = self.matches[self.cursor];
        self.cursor = (self.cursor + 1) % self.matches.len();
        Some(idx)
    }

    /// Step back to the previous match, wrapping around.
    pub fn prev(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + self.matches.len() - 1) % self.matches.len();
        Some(self.matches[self.cursor])
    }
}

/// Cross-tree value search (Ctrl+F): debounced so a burst of keystrokes
/// doesn't kick off a full-hive scan for every intermediate query.
#[derive(Debug, Default)]
pub struct GlobalValueSearch {
    buffer: String,
    last_input: Option<Instant>,
    fired: bool,
}

impl GlobalValueSearch {
    /// An empty, idle global search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current query buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Record a keystroke, resetting the debounce timer.
    pub fn push_char(&mut self, c: char) {
        self.buffer.push(c);
        self.last_input = Some(Instant::now());
        self.fired = false;
    }

    /// Remove the last character, resetting the debounce timer.
    pub fn pop_char(&mut self) {
        self.buffer.pop();
        self.last_input = Some(Instant::now());
        self.fired = false;
    }

    /// Reset to an idle state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.last_input = None;
        self.fired = false;
    }

    /// Whether the debounce window has elapsed since the last keystroke and
    /// a scan hasn't already fired for the current buffer. Calling this
    /// when it returns `true` is expected to be followed by marking the
    /// scan as fired via [`mark_fired`](Self::mark_fired).
    pub fn should_fire(&self) -> bool {
        if self.buffer.is_empty() || self.fired {
            return false;
        }
        match self.last_input {
            Some(t) => t.elapsed() >= GLOBAL_SEARCH_DEBOUNCE,
            None => false,
        }
    }

    /// Mark the current buffer's scan as dispatched so `should_fire` goes
    /// quiet until the next edit.
    pub fn mark_fired(&mut self) {
        self.fired = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hive::DiffStatus;

    fn item(path: &str) -> Item {
        let depth = path.matches('\\').count();
        Item {
            path: path.to_string(),
            name: path.rsplit('\\').next().unwrap().to_string(),
            depth,
            parent: path.rsplit_once('\\').map(|(p, _)| p.to_string()).unwrap_or_default(),
            node_id: None,
            old_node_id: None,
            new_node_id: None,
            subkey_count: 0,
            value_count: 0,
            last_write: 0,
            expanded: false,
            diff_status: DiffStatus::Unchanged,
        }
    }

    #[test]
    fn filter_below_threshold_does_not_touch_the_tree() {
        let mut tree = TreeState::new();
        tree.reset_with_roots(vec![item("Software"), item("System")]);
        let mut filter = KeyFilter::new();
        filter.push_char('s', &mut tree);
        filter.push_char('o', &mut tree);
        assert_eq!(tree.items().len(), 2);
        assert!(!tree.has_pre_filter_snapshot());
    }

    #[test]
    fn filter_keeps_ancestors_of_a_deep_match() {
        let candidates = vec![
            item("Software"),
            item("Software\\Adobe"),
            item("Software\\Adobe\\Reader"),
            item("System"),
        ];
        let filtered = filter_by_query(&candidates, "Reader");
        let paths: Vec<&str> = filtered.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["Software", "Software\\Adobe", "Software\\Adobe\\Reader"]);
    }

    #[test]
    fn clearing_filter_restores_the_pre_filter_view() {
        let mut tree = TreeState::new();
        tree.reset_with_roots(vec![item("Software"), item("System")]);
        let mut filter = KeyFilter::new();
        for c in "sys".chars() {
            filter.push_char(c, &mut tree);
        }
        assert_eq!(tree.items().len(), 1);
        filter.clear(&mut tree);
        assert_eq!(tree.items().len(), 2);
    }

    #[test]
    fn value_search_wraps_around_in_both_directions() {
        let values = vec![
            ValueStat { name: "Alpha".into(), value_type: "REG_SZ".into() },
            ValueStat { name: "Beta".into(), value_type: "REG_SZ".into() },
            ValueStat { name: "AlphaTwo".into(), value_type: "REG_SZ".into() },
        ];
        let mut search = ValueSearch::new();
        search.search("alpha", &values);
        assert_eq!(search.matches(), &[0, 2]);
        assert_eq!(search.next(), Some(0));
        assert_eq!(search.next(), Some(2));
        assert_eq!(search.next(), Some(0));
        assert_eq!(search.prev(), Some(2));
    }

    #[test]
    fn global_search_does_not_fire_before_debounce_elapses() {
        let mut search = GlobalValueSearch::new();
        search.push_char('a');
        assert!(!search.should_fire());
    }
}
