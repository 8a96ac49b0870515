//! Tree state & expand manager.
//!
//! Owns `allItems`, `items`, `expanded`, `loaded` and keeps the invariants
//! from the data model intact: the visible list is a prefix-ordered
//! depth-first projection of the expanded subtree, parents always precede
//! their visible children, and `expanded[path]` may only be true once the
//! children actually sit in `items`.

use std::collections::{HashMap, HashSet};

use crate::hive::{DiffStatus, NodeId};

/// One visible row in the tree.
#[derive(Debug, Clone)]
pub struct Item {
    /// Backslash-separated registry path. Root-level items have no backslash.
    pub path: String,
    /// Leaf component of `path`.
    pub name: String,
    /// Number of backslashes in `path`.
    pub depth: usize,
    /// Path of the parent item; empty string for root-level items.
    pub parent: String,
    /// Node id in normal mode.
    pub node_id: Option<NodeId>,
    /// Node id in the old hive (diff mode).
    pub old_node_id: Option<NodeId>,
    /// Node id in the new hive (diff mode).
    pub new_node_id: Option<NodeId>,
    /// Direct subkey count.
    pub subkey_count: u32,
    /// Attached value count.
    pub value_count: u32,
    /// Last-write time, Unix seconds; zero means unknown.
    pub last_write: i64,
    /// User has requested children be shown AND they have arrived.
    pub expanded: bool,
    /// Diff classification; pinned to `Unchanged` in normal mode.
    pub diff_status: DiffStatus,
}

impl Item {
    /// True iff this item has at least one subkey.
    pub fn has_children(&self) -> bool {
        self.subkey_count > 0
    }
}

/// What the caller must do after an expand/collapse request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// No state changed.
    NoOp,
    /// Children were spliced into view synchronously.
    Expanded,
    /// The subtree was removed from view.
    Collapsed,
    /// Item was already collapsed; caller should move the cursor to its parent.
    MoveToParent,
    /// Children are not available yet; caller must fetch them asynchronously
    /// and later call [`TreeState::apply_loaded_children`] (success) or
    /// [`TreeState::fail_load`] (failure).
    LoadRequested {
        /// Path of the key whose children are needed.
        path: String,
        /// Node id to pass to the hive reader.
        node_id: Option<NodeId>,
    },
}

/// Tree state: the complete inventory, the visible projection, and the
/// expand/load bookkeeping maps.
#[derive(Debug, Default)]
pub struct TreeState {
    /// The complete depth-ordered key inventory, when loaded up front.
    /// Empty in purely lazy mode.
    all_items: Vec<Item>,
    /// The currently visible subsequence.
    items: Vec<Item>,
    /// Snapshot of `items` captured the first time a search filter reaches
    /// effective length; used to restore on clear.
    pre_filter_items: Option<Vec<Item>>,
    /// path -> user wants children shown.
    expanded: HashMap<String, bool>,
    /// path -> children have been fetched.
    loaded: HashMap<String, bool>,
    /// Cache of fetched children, keyed by parent path, for lazy mode so a
    /// collapse-then-reexpand without an intervening `ClearLoadedDescendants`
    /// doesn't need to refetch.
    loaded_children: HashMap<String, Vec<Item>>,
    /// Bookmarked paths.
    bookmarks: HashSet<String>,
}

impl TreeState {
    /// Create an empty tree state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the visible list wholesale (used for initial load and diff
    /// reload). Resets expand/load bookkeeping.
    pub fn reset_with_roots(&mut self, roots: Vec<Item>) {
        self.all_items.clear();
        self.items = roots;
        self.pre_filter_items = None;
        self.expanded.clear();
        self.loaded.clear();
        self.loaded_children.clear();
    }

    /// Replace `allItems` with a fully-loaded, depth-ordered inventory and
    /// derive the initial visible list (depth-0 items only, all collapsed).
    pub fn load_all_items(&mut self, all_items: Vec<Item>) {
        self.items = all_items
            .iter()
            .filter(|it| it.depth == 0)
            .cloned()
            .collect();
        self.all_items = all_items;
        self.pre_filter_items = None;
        self.expanded.clear();
        self.loaded.clear();
        self.loaded_children.clear();
    }

    /// Currently visible items.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Mutable access, used by the filter/diff modules to splice in place.
    pub(crate) fn items_mut(&mut self) -> &mut Vec<Item> {
        &mut self.items
    }

    /// Whether a filter snapshot is currently held.
    pub fn has_pre_filter_snapshot(&self) -> bool {
        self.pre_filter_items.is_some()
    }

    /// Snapshot the current `items` as the pre-filter baseline.
    pub fn snapshot_pre_filter(&mut self) {
        if self.pre_filter_items.is_none() {
            self.pre_filter_items = Some(self.items.clone());
        }
    }

    /// Borrow the pre-filter snapshot, if any.
    pub fn pre_filter_items(&self) -> Option<&[Item]> {
        self.pre_filter_items.as_deref()
    }

    /// The item set a filter should search over: the complete inventory
    /// when the tree was loaded up front, otherwise whatever was visible
    /// (or already snapshotted) at the time filtering started. Lazily
    /// unfetched subtrees are not searchable until expanded.
    pub fn filterable_items(&self) -> &[Item] {
        if !self.all_items.is_empty() {
            &self.all_items
        } else if let Some(snapshot) = &self.pre_filter_items {
            snapshot
        } else {
            &self.items
        }
    }

    /// Restore `items` from the pre-filter snapshot and release it.
    pub fn restore_pre_filter(&mut self) {
        if let Some(items) = self.pre_filter_items.take() {
            self.items = items;
        }
    }

    /// Whether `path` is expanded.
    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.get(path).copied().unwrap_or(false)
    }

    /// Whether `path`'s children have been fetched.
    pub fn is_loaded(&self, path: &str) -> bool {
        self.loaded.get(path).copied().unwrap_or(false)
    }

    fn children_of(&self, path: &str) -> Option<Vec<Item>> {
        if !self.all_items.is_empty() {
            let mut children: Vec<Item> = self
                .all_items
                .iter()
                .filter(|it| it.parent == path)
                .cloned()
                .collect();
            children.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            Some(children)
        } else {
            self.loaded_children.get(path).cloned()
        }
    }

    fn splice_children(&mut self, cursor_pos: usize, children: Vec<Item>) {
        self.items.splice(cursor_pos + 1..cursor_pos + 1, children);
        self.items[cursor_pos].expanded = true;
    }

    /// Idempotent toggle-forward: expand the item at `cursor_pos`, or
    /// collapse it if already expanded, or request an async load if its
    /// children haven't arrived yet.
    pub fn expand(&mut self, cursor_pos: usize) -> ExpandOutcome {
        let Some(item) = self.items.get(cursor_pos).cloned() else {
            return ExpandOutcome::NoOp;
        };
        if !item.has_children() {
            return ExpandOutcome::NoOp;
        }
        if item.expanded {
            return self.collapse(cursor_pos);
        }
        if let Some(children) = self.children_of(&item.path) {
            self.splice_children(cursor_pos, children);
            self.expanded.insert(item.path.clone(), true);
            self.loaded.insert(item.path, true);
            ExpandOutcome::Expanded
        } else if !self.is_loaded(&item.path) {
            ExpandOutcome::LoadRequested {
                path: item.path,
                node_id: item.node_id,
            }
        } else {
            ExpandOutcome::NoOp
        }
    }

    /// Collapse the item at `cursor_pos`, or move to its parent if it was
    /// already collapsed.
    pub fn collapse(&mut self, cursor_pos: usize) -> ExpandOutcome {
        let Some(item) = self.items.get(cursor_pos).cloned() else {
            return ExpandOutcome::NoOp;
        };
        if !item.expanded {
            return if item.parent.is_empty() {
                ExpandOutcome::NoOp
            } else {
                ExpandOutcome::MoveToParent
            };
        }

        let level = item.depth;
        let mut end = cursor_pos + 1;
        while end < self.items.len() && self.items[end].depth > level {
            end += 1;
        }
        self.items.drain(cursor_pos + 1..end);
        self.items[cursor_pos].expanded = false;
        self.expanded.insert(item.path.clone(), false);
        self.clear_loaded_descendants(&item.path);
        ExpandOutcome::Collapsed
    }

    /// Called by the dispatcher once a background child-load completes
    /// successfully. Only sets `expanded = true` now that children actually
    /// exist, closing the "three-Enter" race.
    pub fn apply_loaded_children(&mut self, path: &str, mut children: Vec<Item>) {
        children.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        self.loaded.insert(path.to_string(), true);
        self.loaded_children
            .insert(path.to_string(), children.clone());

        if let Some(pos) = self.items.iter().position(|it| it.path == path) {
            self.splice_children(pos, children);
            self.expanded.insert(path.to_string(), true);
        }
    }

    /// Called by the dispatcher when a background child-load fails. Leaves
    /// `expanded[path] == false` and `loaded[path] == false` so a retry is
    /// possible, per the IOFailure taxonomy entry.
    pub fn fail_load(&mut self, path: &str) {
        self.expanded.insert(path.to_string(), false);
        self.loaded.insert(path.to_string(), false);
    }

    /// Remove `path` and every descendant from `expanded` and `loaded` in
    /// one pass, atomically.
    pub fn clear_loaded_descendants(&mut self, path: &str) {
        let prefix = format!("{}\\", path);
        self.expanded
            .retain(|p, _| p != path && !p.starts_with(&prefix));
        self.loaded
            .retain(|p, _| p != path && !p.starts_with(&prefix));
        self.loaded_children
            .retain(|p, _| p != path && !p.starts_with(&prefix));
    }

    /// Expand every descendant of `root_path` in one O(n) rebuild.
    ///
    /// Requires `allItems` to be populated (up-front tree load); in purely
    /// lazy mode this is a no-op, since there is nothing to precompute a
    /// parent -> children map from without issuing one fetch per level.
    pub fn expand_all_children(&mut self, root_path: &str) {
        if self.all_items.is_empty() {
            return;
        }

        let mut by_parent: HashMap<&str, Vec<&Item>> = HashMap::new();
        for it in &self.all_items {
            by_parent.entry(it.parent.as_str()).or_default().push(it);
        }

        let mut to_expand: Vec<String> = vec![root_path.to_string()];
        let mut queue = vec![root_path.to_string()];
        while let Some(p) = queue.pop() {
            if let Some(children) = by_parent.get(p.as_str()) {
                for child in children {
                    if child.has_children() {
                        to_expand.push(child.path.clone());
                        queue.push(child.path.clone());
                    }
                }
            }
        }
        for path in &to_expand {
            self.expanded.insert(path.clone(), true);
            self.loaded.insert(path.clone(), true);
        }

        // Single rebuild of the visible list rooted at root_path's position.
        if let Some(pos) = self.items.iter().position(|it| it.path == root_path) {
            let level = self.items[pos].depth;
            let mut end = pos + 1;
            while end < self.items.len() && self.items[end].depth > level {
                end += 1;
            }
            let mut rebuilt = Vec::new();
            Self::collect_expanded_subtree(&by_parent, root_path, &self.expanded, &mut rebuilt);
            self.items.splice(pos + 1..end, rebuilt);
            self.items[pos].expanded = true;
        }
    }

    fn collect_expanded_subtree(
        by_parent: &HashMap<&str, Vec<&Item>>,
        parent: &str,
        expanded: &HashMap<String, bool>,
        out: &mut Vec<Item>,
    ) {
        let Some(children) = by_parent.get(parent) else {
            return;
        };
        let mut sorted: Vec<&&Item> = children.iter().collect();
        sorted.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        for child in sorted {
            let mut item = (*child).clone();
            let is_expanded = expanded.get(&child.path).copied().unwrap_or(false);
            item.expanded = is_expanded && child.has_children();
            out.push(item);
            if item.expanded {
                Self::collect_expanded_subtree(by_parent, &child.path, expanded, out);
            }
        }
    }

    /// Retain only depth-0 items; clear all expand/load bookkeeping.
    pub fn collapse_all(&mut self) {
        self.items.retain(|it| it.depth == 0);
        for it in &mut self.items {
            it.expanded = false;
        }
        self.expanded.clear();
        self.loaded.clear();
        self.loaded_children.clear();
    }

    /// Expand every item whose depth equals `cursor_depth`.
    pub fn expand_current_level(&mut self, cursor_depth: usize) -> Vec<ExpandOutcome> {
        let positions: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, it)| it.depth == cursor_depth && it.has_children() && !it.expanded)
            .map(|(i, _)| i)
            .collect();

        let mut outcomes = Vec::new();
        // Expand from the bottom up so earlier splices don't invalidate
        // later indices.
        for pos in positions.into_iter().rev() {
            outcomes.push(self.expand(pos));
        }
        outcomes
    }

    /// Drop every item whose depth is greater than `cursor_depth`.
    pub fn collapse_to_current_level(&mut self, cursor_depth: usize) {
        let dropped_paths: Vec<String> = self
            .items
            .iter()
            .filter(|it| it.depth > cursor_depth)
            .map(|it| it.path.clone())
            .collect();
        self.items.retain(|it| it.depth <= cursor_depth);
        for it in &mut self.items {
            if it.depth == cursor_depth {
                it.expanded = false;
            }
        }
        for path in dropped_paths {
            self.expanded.remove(&path);
            self.loaded.remove(&path);
            self.loaded_children.remove(&path);
        }
    }

    /// Delete any item whose path begins with `path\`. Bookkeeping
    /// (expanded/loaded maps) is left untouched.
    pub fn remove_descendants_from_view(&mut self, path: &str) {
        let prefix = format!("{}\\", path);
        self.items.retain(|it| !it.path.starts_with(&prefix));
    }

    /// Toggle a bookmark on `path`.
    pub fn toggle_bookmark(&mut self, path: &str) {
        if !self.bookmarks.remove(path) {
            self.bookmarks.insert(path.to_string());
        }
    }

    /// Whether `path` is bookmarked.
    pub fn is_bookmarked(&self, path: &str) -> bool {
        self.bookmarks.contains(path)
    }

    /// Find the index of the next bookmarked item after `from_cursor`,
    /// wrapping around. Returns `None` if there are no bookmarks visible.
    pub fn next_bookmark(&self, from_cursor: usize) -> Option<usize> {
        if self.bookmarks.is_empty() || self.items.is_empty() {
            return None;
        }
        let n = self.items.len();
        for offset in 1..=n {
            let idx = (from_cursor + offset) % n;
            if self.bookmarks.contains(&self.items[idx].path) {
                return Some(idx);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(path: &str, depth: usize, parent: &str, subkeys: u32) -> Item {
        Item {
            path: path.to_string(),
            name: path.rsplit('\\').next().unwrap_or(path).to_string(),
            depth,
            parent: parent.to_string(),
            node_id: Some(NodeId(1)),
            old_node_id: None,
            new_node_id: None,
            subkey_count: subkeys,
            value_count: 0,
            last_write: 0,
            expanded: false,
            diff_status: DiffStatus::Unchanged,
        }
    }

    fn lazy_tree() -> TreeState {
        let mut t = TreeState::new();
        t.reset_with_roots(vec![
            item("Software", 0, "", 2),
            item("System", 0, "", 0),
        ]);
        t
    }

    #[test]
    fn expand_on_lazy_node_requests_load_then_stays_collapsed_until_applied() {
        let mut t = lazy_tree();

        match t.expand(0) {
            ExpandOutcome::LoadRequested { path, .. } => assert_eq!(path, "Software"),
            other => panic!("expected LoadRequested, got {:?}", other),
        }
        assert!(!t.items()[0].expanded);

        // Rapid repeat presses before the load completes must stay no-ops.
        assert!(matches!(
            t.expand(0),
            ExpandOutcome::LoadRequested { .. }
        ));
        assert!(!t.items()[0].expanded);

        t.apply_loaded_children(
            "Software",
            vec![
                item("Software\\Adobe", 1, "Software", 0),
                item("Software\\Microsoft", 1, "Software", 0),
            ],
        );

        assert!(t.items()[0].expanded);
        let paths: Vec<&str> = t.items().iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["Software", "Software\\Adobe", "Software\\Microsoft", "System"]);
    }

    #[test]
    fn collapse_then_reexpand_refetches_children() {
        let mut t = lazy_tree();
        t.apply_loaded_children(
            "Software",
            vec![item("Software\\Adobe", 1, "Software", 0)],
        );
        assert_eq!(t.items().len(), 3);

        t.collapse(0);
        assert_eq!(t.items().len(), 2);
        assert!(!t.is_expanded("Software"));
        assert!(!t.is_loaded("Software"));

        match t.expand(0) {
            ExpandOutcome::LoadRequested { path, .. } => assert_eq!(path, "Software"),
            other => panic!("expected a fresh load request, got {:?}", other),
        }
    }

    #[test]
    fn collapsing_an_already_collapsed_item_asks_caller_to_move_to_parent() {
        let mut t = lazy_tree();
        t.apply_loaded_children(
            "Software",
            vec![item("Software\\Adobe", 1, "Software", 0)],
        );
        assert_eq!(t.collapse(1), ExpandOutcome::MoveToParent);
    }

    #[test]
    fn clear_loaded_descendants_removes_whole_subtree_atomically() {
        let mut t = TreeState::new();
        t.expanded.insert("A".into(), true);
        t.expanded.insert("A\\B".into(), true);
        t.loaded.insert("A".into(), true);
        t.loaded.insert("A\\B".into(), true);
        t.loaded.insert("Other".into(), true);

        t.clear_loaded_descendants("A");

        assert!(!t.is_expanded("A"));
        assert!(!t.is_expanded("A\\B"));
        assert!(t.is_loaded("Other"));
    }

    #[test]
    fn bookmarks_cycle_and_wrap() {
        let mut t = TreeState::new();
        t.reset_with_roots(vec![
            item("A", 0, "", 0),
            item("B", 0, "", 0),
            item("C", 0, "", 0),
        ]);
        t.toggle_bookmark("C");
        assert_eq!(t.next_bookmark(0), Some(2));
        assert_eq!(t.next_bookmark(2), Some(2));
    }

    #[test]
    fn remove_descendants_from_view_drops_the_subtree_but_leaves_bookkeeping() {
        let mut t = TreeState::new();
        t.reset_with_roots(vec![
            item("Software", 0, "", 1),
            item("Software\\Adobe", 1, "Software", 0),
            item("System", 0, "", 0),
        ]);
        t.expanded.insert("Software".into(), true);
        t.loaded.insert("Software".into(), true);

        t.remove_descendants_from_view("Software");

        let paths: Vec<&str> = t.items().iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["Software", "System"]);
        assert!(t.is_expanded("Software"));
        assert!(t.is_loaded("Software"));
    }
}
