//! Cursor & selection authority.
//!
//! `MoveTo` is the single funnel every cursor movement passes through: it
//! clamps the target into range, updates the cursor, and hands the new
//! selection to the [`crate::bus::SelectionBus`]. No other code may mutate
//! the cursor position directly.

use crate::tree::Item;

/// The item the cursor currently points at, cached so callers don't need to
/// re-index `items` after every movement.
#[derive(Debug, Clone, Default)]
pub struct PendingTarget {
    /// Path of the selected item.
    pub path: String,
    /// Hive this selection belongs to ("old" or "new") in diff mode; empty
    /// in normal mode.
    pub hive_path: String,
}

/// Owns the cursor position and the bookkeeping `MoveTo` needs to notify the
/// selection bus.
#[derive(Debug, Default)]
pub struct CursorManager {
    position: usize,
    pending_target: Option<PendingTarget>,
}

impl CursorManager {
    /// Create a cursor manager positioned at the start.
    pub fn new() -> Self {
        Self {
            position: 0,
            pending_target: None,
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The most recent pending target handed to the selection bus.
    pub fn pending_target(&self) -> Option<&PendingTarget> {
        self.pending_target.as_ref()
    }

    /// Move the cursor to `pos`, clamped into `[0, items.len() - 1]`.
    ///
    /// Returns `true` if the cursor actually changed position. Always
    /// updates `pendingTarget` and re-emits the selection signal, even when
    /// the position didn't change, since the item at that position may have
    /// been replaced by a tree mutation (e.g. a sibling's expand/collapse
    /// spliced rows in above it without shifting the cursor's own index is
    /// not possible, but a caller may intentionally re-select after a
    /// structural change).
    pub fn move_to(&mut self, pos: usize, items: &[Item]) -> bool {
        if items.is_empty() {
            self.pending_target = None;
            return false;
        }
        let clamped = pos.min(items.len() - 1);
        let changed = clamped != self.position;
        self.position = clamped;
        self.sync_pending_target(items);
        changed
    }

    /// Re-read the item at the current cursor position and push it to the
    /// selection bus without changing the cursor. Used after tree-structure
    /// mutations that don't move the cursor but may change what it points at.
    pub fn emit_signal(&mut self, items: &[Item]) {
        self.sync_pending_target(items);
    }

    fn sync_pending_target(&mut self, items: &[Item]) {
        self.pending_target = items.get(self.position).map(|item| PendingTarget {
            path: item.path.clone(),
            hive_path: String::new(),
        });
    }

    /// Move one row up.
    pub fn move_up(&mut self, items: &[Item]) -> bool {
        let target = self.position.saturating_sub(1);
        self.move_to(target, items)
    }

    /// Move one row down.
    pub fn move_down(&mut self, items: &[Item]) -> bool {
        self.move_to(self.position + 1, items)
    }

    /// Jump to the first row.
    pub fn jump_to_start(&mut self, items: &[Item]) -> bool {
        self.move_to(0, items)
    }

    /// Jump to the last row.
    pub fn jump_to_end(&mut self, items: &[Item]) -> bool {
        let last = items.len().saturating_sub(1);
        self.move_to(last, items)
    }

    /// Move to the current item's parent row, if any is visible.
    pub fn move_to_parent(&mut self, items: &[Item]) -> bool {
        let Some(current) = items.get(self.position) else {
            return false;
        };
        if current.depth == 0 {
            return false;
        }
        let target_depth = current.depth - 1;
        for idx in (0..self.position).rev() {
            if items[idx].depth == target_depth {
                return self.move_to(idx, items);
            }
        }
        false
    }

    /// Clamp the cursor into range after a structural mutation (splice,
    /// collapse, filter) without emitting a selection signal. Callers that
    /// want a signal too should follow with [`emit_signal`].
    pub fn clamp(&mut self, items_len: usize) {
        if items_len == 0 {
            self.position = 0;
        } else {
            self.position = self.position.min(items_len - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hive::DiffStatus;

    fn item(path: &str, depth: usize) -> Item {
        Item {
            path: path.to_string(),
            name: path.to_string(),
            depth,
            parent: String::new(),
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
    fn move_to_clamps_into_range() {
        let items = vec![item("A", 0), item("B", 0)];
        let mut cursor = CursorManager::new();
        assert!(cursor.move_to(50, &items));
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.pending_target().unwrap().path, "B");
    }

    #[test]
    fn move_to_on_empty_list_is_a_no_op() {
        let mut cursor = CursorManager::new();
        assert!(!cursor.move_to(3, &[]));
        assert!(cursor.pending_target().is_none());
    }

    #[test]
    fn move_to_parent_finds_nearest_shallower_row_above() {
        let items = vec![item("A", 0), item("A\\B", 1), item("A\\B\\C", 2)];
        let mut cursor = CursorManager::new();
        cursor.move_to(2, &items);
        assert!(cursor.move_to_parent(&items));
        assert_eq!(cursor.position(), 1);
        assert!(cursor.move_to_parent(&items));
        assert_eq!(cursor.position(), 0);
        assert!(!cursor.move_to_parent(&items));
    }

    #[test]
    fn clamp_pulls_cursor_back_after_collapse_shrinks_items() {
        let mut cursor = CursorManager::new();
        cursor.move_to(5, &[item("A", 0), item("B", 0), item("C", 0), item("D", 0), item("E", 0), item("F", 0)]);
        cursor.clamp(2);
        assert_eq!(cursor.position(), 1);
    }
}
