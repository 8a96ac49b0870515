//! Renders one value-table row as ratatui `Cell`s.

use ratatui::style::Style;
use ratatui::widgets::{Cell, Row};

use crate::hive::ValueStat;
use crate::ui::theme::ThemeColors;

/// Render one row of the value table: name, type, and a short preview.
pub fn render_row<'a>(
    stat: &ValueStat,
    preview: &str,
    selected: bool,
    theme: &ThemeColors,
) -> Row<'a> {
    let name = if stat.name.is_empty() {
        "(Default)".to_string()
    } else {
        stat.name.clone()
    };

    let style = if selected {
        Style::default().fg(theme.cursor_fg).bg(theme.cursor_bg)
    } else {
        Style::default().fg(theme.text)
    };

    Row::new(vec![
        Cell::from(name),
        Cell::from(stat.value_type.clone()),
        Cell::from(preview.to_string()),
    ])
    .style(style)
}

/// Truncate a value preview to `max_width` columns, appending an ellipsis
/// marker when truncated, so the table never reflows past its column.
pub fn truncate_preview(preview: &str, max_width: usize) -> String {
    if preview.chars().count() <= max_width {
        return preview.to_string();
    }
    let mut out: String = preview.chars().take(max_width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_value_name_is_rendered_specially() {
        let stat = ValueStat {
            name: String::new(),
            value_type: "REG_SZ".into(),
        };
        // Just confirm construction doesn't panic for the empty-name case.
        let _row = render_row(&stat, "hello", false, &fake_theme());
    }

    #[test]
    fn truncate_preview_appends_ellipsis_when_over_budget() {
        let long = "a".repeat(50);
        let short = truncate_preview(&long, 10);
        assert_eq!(short.chars().count(), 10);
        assert!(short.ends_with('…'));
    }

    #[test]
    fn truncate_preview_leaves_short_strings_untouched() {
        assert_eq!(truncate_preview("short", 10), "short");
    }

    fn fake_theme() -> ThemeColors {
        use crate::app::Theme;
        ThemeColors::from_theme(&Theme::GruvboxDark)
    }
}
