//! Virtual scrolling.
//!
//! Rendering never walks the full `items` list: [`VirtualListState`] tracks
//! only a scroll offset and the last known viewport height, and every frame
//! asks it for the visible slice instead of iterating everything and
//! clipping in the renderer.

pub mod tree_item;
pub mod value_row;

/// Scroll bookkeeping for a virtualized list. Independent of what the list
/// actually contains; the tree pane and the value pane each own one.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualListState {
    scroll_offset: usize,
    viewport_height: usize,
}

impl VirtualListState {
    /// A fresh state with no scroll and a zero-height viewport (populated on
    /// first render).
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scroll offset (index of the first visible row).
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Recompute the scroll offset so that `cursor` stays visible within a
    /// viewport of `viewport_height` rows over `total_len` items, then
    /// return the visible row range as `[start, end)`.
    ///
    /// Rules, applied in order:
    /// 1. If the cursor is above the viewport, scroll up until it's the
    ///    first visible row.
    /// 2. If the cursor is below the viewport, scroll down until it's the
    ///    last visible row.
    /// 3. Clamp the offset so the viewport never scrolls past the end of
    ///    the list (unless the list is shorter than the viewport).
    /// 4. The visible range is `[offset, min(offset + viewport_height,
    ///    total_len))`.
    pub fn sync(&mut self, cursor: usize, total_len: usize, viewport_height: usize) -> (usize, usize) {
        self.viewport_height = viewport_height;

        if viewport_height == 0 || total_len == 0 {
            self.scroll_offset = 0;
            return (0, 0);
        }

        if cursor < self.scroll_offset {
            self.scroll_offset = cursor;
        } else if cursor >= self.scroll_offset + viewport_height {
            self.scroll_offset = cursor + 1 - viewport_height;
        }

        let max_offset = total_len.saturating_sub(viewport_height);
        self.scroll_offset = self.scroll_offset.min(max_offset);

        let end = (self.scroll_offset + viewport_height).min(total_len);
        (self.scroll_offset, end)
    }

    /// Last viewport height passed to [`sync`](Self::sync).
    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }
}

/// Borrow the currently visible slice of `items` given a synced state.
pub fn visible_slice<'a, T>(items: &'a [T], state: &VirtualListState) -> &'a [T] {
    let start = state.scroll_offset.min(items.len());
    let end = (start + state.viewport_height).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrolls_down_to_keep_cursor_in_view() {
        let mut state = VirtualListState::new();
        let (start, end) = state.sync(0, 100, 10);
        assert_eq!((start, end), (0, 10));

        let (start, end) = state.sync(15, 100, 10);
        assert_eq!(start, 6);
        assert_eq!(end, 16);
    }

    #[test]
    fn scrolls_up_when_cursor_moves_above_viewport() {
        let mut state = VirtualListState::new();
        state.sync(50, 100, 10);
        let (start, _) = state.sync(3, 100, 10);
        assert_eq!(start, 3);
    }

    #[test]
    fn never_scrolls_past_the_end_of_a_short_list() {
        let mut state = VirtualListState::new();
        let (start, end) = state.sync(4, 5, 10);
        assert_eq!((start, end), (0, 5));
    }

    #[test]
    fn empty_list_yields_empty_range() {
        let mut state = VirtualListState::new();
        assert_eq!(state.sync(0, 0, 10), (0, 0));
    }
}
