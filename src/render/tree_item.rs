//! Renders one tree row as a ratatui `Line`.
//!
//! Follows the row contract: `<diffPrefix><bookmarkMark><indent><icon>
//! <name><counts?>` with a right-aligned timestamp, appended by the caller
//! once the column width is known (see [`render_row`]'s `width` parameter).

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::hive::DiffStatus;
use crate::tree::Item;
use crate::ui::formatters::{counts_suffix, format_timestamp};
use crate::ui::theme::ThemeColors;

fn diff_prefix(status: DiffStatus) -> &'static str {
    match status {
        DiffStatus::Added => "+",
        DiffStatus::Removed => "-",
        DiffStatus::Modified => "~",
        DiffStatus::Unchanged => " ",
    }
}

/// Render a single tree row for a pane `width` columns wide.
///
/// `selected` highlights the row with the theme's cursor colors;
/// `bookmarked` prefixes a marker glyph; diff status (when not `Unchanged`)
/// prefixes a `+`/`-`/`~` glyph and tints the row's foreground.
pub fn render_row(item: &Item, selected: bool, bookmarked: bool, width: usize, theme: &ThemeColors) -> Line<'static> {
    let indent = "  ".repeat(item.depth);
    let glyph = if !item.has_children() {
        "•"
    } else if item.expanded {
        "▼"
    } else {
        "▶"
    };
    let marker = if bookmarked { "★" } else { " " };
    let counts = counts_suffix(item.has_children(), item.subkey_count);

    let mut left = format!(
        "{}{}{}{} {}{}",
        diff_prefix(item.diff_status),
        marker,
        indent,
        glyph,
        item.name,
        counts
    );

    if item.last_write != 0 {
        let ts = format_timestamp(item.last_write);
        let pad = width.saturating_sub(left.chars().count() + ts.chars().count());
        if pad > 0 {
            left.push_str(&" ".repeat(pad));
        } else {
            left.push(' ');
        }
        left.push_str(&ts);
    }

    let fg = match item.diff_status {
        DiffStatus::Added => theme.value,
        DiffStatus::Removed => theme.error,
        DiffStatus::Modified => theme.warning,
        DiffStatus::Unchanged => theme.text,
    };

    let mut style = Style::default().fg(fg);
    if item.diff_status == DiffStatus::Modified {
        style = style.add_modifier(Modifier::BOLD);
    }
    if selected {
        style = style.fg(theme.cursor_fg).bg(theme.cursor_bg);
    }

    Line::from(Span::styled(left, style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Theme;

    fn item() -> Item {
        Item {
            path: "Software\\Microsoft".into(),
            name: "Microsoft".into(),
            depth: 1,
            parent: "Software".into(),
            node_id: None,
            old_node_id: None,
            new_node_id: None,
            subkey_count: 3,
            value_count: 0,
            last_write: 0,
            expanded: false,
            diff_status: DiffStatus::Unchanged,
        }
    }

    #[test]
    fn collapsed_item_with_children_gets_a_closed_triangle() {
        let theme = ThemeColors::from_theme(&Theme::GruvboxDark);
        let line = render_row(&item(), false, false, 80, &theme);
        assert!(line.spans[0].content.contains('▶'));
    }

    #[test]
    fn leaf_item_gets_no_disclosure_glyph() {
        let theme = ThemeColors::from_theme(&Theme::GruvboxDark);
        let mut leaf = item();
        leaf.subkey_count = 0;
        let line = render_row(&leaf, false, false, 80, &theme);
        assert!(!line.spans[0].content.contains('▶'));
        assert!(!line.spans[0].content.contains('▼'));
    }

    #[test]
    fn bookmarked_item_is_marked() {
        let theme = ThemeColors::from_theme(&Theme::GruvboxDark);
        let line = render_row(&item(), false, true, 80, &theme);
        assert!(line.spans[0].content.contains('★'));
    }

    #[test]
    fn modified_item_gets_the_tilde_prefix() {
        let theme = ThemeColors::from_theme(&Theme::GruvboxDark);
        let mut modified = item();
        modified.diff_status = DiffStatus::Modified;
        let line = render_row(&modified, false, false, 80, &theme);
        assert!(line.spans[0].content.starts_with('~'));
    }

    #[test]
    fn timestamp_is_right_aligned_within_width() {
        let theme = ThemeColors::from_theme(&Theme::GruvboxDark);
        let mut stamped = item();
        stamped.last_write = 1_705_321_800;
        let line = render_row(&stamped, false, false, 40, &theme);
        assert!(line.spans[0].content.ends_with("2024-01-15 12:30"));
        assert_eq!(line.spans[0].content.chars().count(), 40);
    }
}
