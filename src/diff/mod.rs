//! Diff-mode overlay: the stateful layer built on top of
//! [`crate::hive::diff_hives`] that the dispatcher drives through its
//! prompt/load/compare lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use crate::hive::{diff_hives, filter_diff_keys, DiffStatus, HiveReader, KeyDiff};
use crate::error::Result;
use crate::tree::Item;

/// Where the diff overlay currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMode {
    /// No comparison active; the tree shows the single open hive.
    Normal,
    /// Waiting for the user to type or accept a path to compare against.
    AwaitingComparePath,
    /// The second hive is being opened and diffed on a background thread.
    Loading,
    /// A comparison is active and the tree shows the overlaid result.
    Diff,
}

/// Which diff statuses are currently shown in the tree.
#[derive(Debug, Clone, Copy)]
pub struct DiffFlags {
    /// Show keys present only in the new hive.
    pub show_added: bool,
    /// Show keys present only in the old hive.
    pub show_removed: bool,
    /// Show keys present in both but with differing metadata.
    pub show_modified: bool,
    /// Show keys present in both, identical.
    pub show_unchanged: bool,
    /// When true, unchanged ancestors of a changed key are still shown (for
    /// tree continuity) but collapsed display of purely-unchanged subtrees
    /// is suppressed wherever possible.
    pub diff_only_view: bool,
}

impl Default for DiffFlags {
    fn default() -> Self {
        Self {
            show_added: true,
            show_removed: true,
            show_modified: true,
            show_unchanged: true,
            diff_only_view: false,
        }
    }
}

/// Drives the diff-mode state machine and holds the computed diff map.
///
/// Restoring the pre-diff tree on exit (cursor path, expanded ancestors) is
/// the dispatcher's job, not this type's — it reuses the same "pending
/// navigation target" machinery as go-to-path (§4.2), so this state only
/// needs to track its own lifecycle and the two readers it owns.
#[derive(Default)]
pub struct DiffState {
    mode: DiffMode,
    flags: DiffFlags,
    diff_map: Option<HashMap<String, KeyDiff>>,
    old_reader: Option<Arc<dyn HiveReader>>,
    new_reader: Option<Arc<dyn HiveReader>>,
}

impl Default for DiffMode {
    fn default() -> Self {
        DiffMode::Normal
    }
}

impl DiffState {
    /// A fresh, inactive diff overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn mode(&self) -> DiffMode {
        self.mode
    }

    /// Current visibility flags.
    pub fn flags(&self) -> DiffFlags {
        self.flags
    }

    /// Begin prompting the user for a compare path.
    pub fn start_prompt(&mut self) {
        self.mode = DiffMode::AwaitingComparePath;
    }

    /// Abandon the compare-path prompt and return to normal mode.
    pub fn cancel_prompt(&mut self) {
        if self.mode == DiffMode::AwaitingComparePath {
            self.mode = DiffMode::Normal;
        }
    }

    /// The user submitted a path; transition to `Loading`. The dispatcher is
    /// responsible for spawning the background open-and-diff task and later
    /// calling [`complete_load`](Self::complete_load) or
    /// [`fail_load`](Self::fail_load).
    pub fn submit_compare_path(&mut self) -> Result<()> {
        if self.mode != DiffMode::AwaitingComparePath {
            return Err(crate::error::HiveExplorerError::InvalidInput(
                "not awaiting a compare path".into(),
            ));
        }
        self.mode = DiffMode::Loading;
        Ok(())
    }

    /// Accept a diff map computed on a background thread (by
    /// [`crate::loaders::spawn_diff_loader`]) together with the two readers
    /// it was computed from, and transition to `Diff`. Returns the flattened
    /// item list a [`crate::tree::TreeState`] should be reloaded with via
    /// `load_all_items`.
    pub fn accept_diff(
        &mut self,
        diff: HashMap<String, KeyDiff>,
        old_reader: Arc<dyn HiveReader>,
        new_reader: Arc<dyn HiveReader>,
    ) -> Vec<Item> {
        let items = items_from_diff(&diff, &self.flags);
        self.old_reader = Some(old_reader);
        self.new_reader = Some(new_reader);
        self.diff_map = Some(diff);
        self.mode = DiffMode::Diff;
        items
    }

    /// The background load/diff failed; return to normal mode.
    pub fn fail_load(&mut self) {
        self.mode = DiffMode::Normal;
    }

    /// The reader for the "old" side of the comparison, once loaded.
    pub fn old_reader(&self) -> Option<Arc<dyn HiveReader>> {
        self.old_reader.clone()
    }

    /// The reader for the "new" side of the comparison, once loaded.
    pub fn new_reader(&self) -> Option<Arc<dyn HiveReader>> {
        self.new_reader.clone()
    }

    /// Toggle one of the four visibility flags and recompute the visible
    /// item list from the cached diff map.
    pub fn toggle_flag(&mut self, flag: DiffFlagKind) -> Option<Vec<Item>> {
        match flag {
            DiffFlagKind::Added => self.flags.show_added = !self.flags.show_added,
            DiffFlagKind::Removed => self.flags.show_removed = !self.flags.show_removed,
            DiffFlagKind::Modified => self.flags.show_modified = !self.flags.show_modified,
            DiffFlagKind::Unchanged => self.flags.show_unchanged = !self.flags.show_unchanged,
            DiffFlagKind::DiffOnlyView => {
                self.flags.diff_only_view = !self.flags.diff_only_view;
                if self.flags.diff_only_view {
                    self.flags.show_unchanged = false;
                } else {
                    self.flags.show_unchanged = true;
                }
            }
        }
        self.diff_map.as_ref().map(|diff| items_from_diff(diff, &self.flags))
    }

    /// Leave diff mode and drop the cached readers and diff map. The
    /// dispatcher is responsible for reloading the tree from the primary
    /// hive and re-navigating to whatever it snapshotted on entry.
    pub fn exit(&mut self) {
        self.mode = DiffMode::Normal;
        self.diff_map = None;
        self.old_reader = None;
        self.new_reader = None;
    }
}

/// Which flag a keypress toggles.
#[derive(Debug, Clone, Copy)]
pub enum DiffFlagKind {
    /// Added
    Added,
    /// Removed
    Removed,
    /// Modified
    Modified,
    /// Unchanged
    Unchanged,
    /// Diff-only view (collapses the unchanged flag along with it)
    DiffOnlyView,
}

/// Flatten a diff map into tree items under the given visibility flags.
/// Exposed for background loaders that compute the initial diff without
/// going through a live [`DiffState`].
pub fn items_from_diff(diff: &HashMap<String, KeyDiff>, flags: &DiffFlags) -> Vec<Item> {
    let filtered = filter_diff_keys(
        diff,
        flags.show_added,
        flags.show_removed,
        flags.show_modified,
        flags.show_unchanged,
    );

    filtered
        .into_iter()
        .map(|kd| {
            let depth = if kd.path.is_empty() { 0 } else { kd.path.matches('\\').count() };
            let (parent, name) = match kd.path.rsplit_once('\\') {
                Some((p, n)) => (p.to_string(), n.to_string()),
                None => (String::new(), kd.path.clone()),
            };
            Item {
                path: kd.path.clone(),
                name: if name.is_empty() { kd.name.clone() } else { name },
                depth,
                parent,
                node_id: None,
                old_node_id: kd.old_node_id,
                new_node_id: kd.new_node_id,
                subkey_count: kd.subkey_count,
                value_count: kd.value_count,
                last_write: kd.last_write,
                expanded: false,
                diff_status: kd.status,
            }
        })
        .collect()
}

/// Classification-to-glyph helper used by the status/legend bar.
pub fn status_glyph(status: DiffStatus) -> &'static str {
    match status {
        DiffStatus::Added => "+",
        DiffStatus::Removed => "-",
        DiffStatus::Modified => "~",
        DiffStatus::Unchanged => " ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_diff() -> HashMap<String, KeyDiff> {
        let mut map = HashMap::new();
        map.insert(
            "A".to_string(),
            KeyDiff {
                path: "A".into(),
                name: "A".into(),
                status: DiffStatus::Added,
                subkey_count: 0,
                value_count: 0,
                last_write: 0,
                old_node_id: None,
                new_node_id: Some(crate::hive::NodeId(1)),
            },
        );
        map
    }

    struct FakeReader;
    impl HiveReader for FakeReader {
        fn root(&self) -> crate::hive::NodeId {
            crate::hive::NodeId(1)
        }
        fn find(&self, _path: &str) -> Result<crate::hive::NodeId> {
            Ok(crate::hive::NodeId(1))
        }
        fn stat_key(&self, _id: crate::hive::NodeId) -> Result<crate::hive::KeyStat> {
            unimplemented!()
        }
        fn subkeys(&self, _id: crate::hive::NodeId) -> Result<Vec<crate::hive::NodeId>> {
            Ok(vec![])
        }
        fn path_of(&self, _id: crate::hive::NodeId) -> Result<String> {
            Ok(String::new())
        }
        fn values(&self, _id: crate::hive::NodeId) -> Result<Vec<crate::hive::ValueId>> {
            Ok(vec![])
        }
        fn stat_value(&self, _id: crate::hive::ValueId) -> Result<crate::hive::ValueStat> {
            unimplemented!()
        }
        fn value_bytes(
            &self,
            _id: crate::hive::ValueId,
            _opts: crate::hive::ValueReadOptions,
        ) -> Result<Vec<u8>> {
            Ok(vec![])
        }
    }

    #[test]
    fn prompt_lifecycle_reaches_diff_and_back_to_normal() {
        let mut state = DiffState::new();
        assert_eq!(state.mode(), DiffMode::Normal);
        state.start_prompt();
        assert_eq!(state.mode(), DiffMode::AwaitingComparePath);
        state.submit_compare_path().unwrap();
        assert_eq!(state.mode(), DiffMode::Loading);
        let old: Arc<dyn HiveReader> = Arc::new(FakeReader);
        let new: Arc<dyn HiveReader> = Arc::new(FakeReader);
        state.accept_diff(sample_diff(), old, new);
        assert_eq!(state.mode(), DiffMode::Diff);
        assert!(state.old_reader().is_some());
        state.exit();
        assert_eq!(state.mode(), DiffMode::Normal);
        assert!(state.old_reader().is_none());
    }

    #[test]
    fn toggling_diff_only_view_hides_unchanged() {
        let mut state = DiffState::new();
        state.diff_map = Some(sample_diff());
        assert!(state.flags().show_unchanged);
        state.toggle_flag(DiffFlagKind::DiffOnlyView);
        assert!(!state.flags().show_unchanged);
        assert!(state.flags().diff_only_view);
    }

    #[test]
    fn submit_compare_path_outside_prompt_is_rejected() {
        let mut state = DiffState::new();
        assert!(state.submit_compare_path().is_err());
    }
}
