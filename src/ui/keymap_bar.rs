//! Keymap help bar UI component.

use crate::app::{App, FocusedPane, InputMode};
use crate::diff::DiffMode;
use crate::ui::ThemeColors;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

/// Draw the one-line keymap hint bar for the dispatcher's current mode.
pub fn draw_keymap(f: &mut Frame<'_>, area: Rect, app: &App, colors: &ThemeColors) {
    let text = match app.input_mode() {
        InputMode::Filter | InputMode::ValueSearch | InputMode::GlobalSearch => "Type to filter | Enter: apply | Esc: cancel",
        InputMode::GoToPath => "Type a key path | Enter: go | Esc: cancel",
        InputMode::DiffComparePath => "Type a hive path to compare | Enter: load | Esc: cancel",
        InputMode::Normal if app.diff().mode() == DiffMode::Diff => {
            "a/r/m/u: toggle added/removed/modified/unchanged | v: diff-only | d: exit diff | Tab: pane | q: quit"
        }
        InputMode::Normal => match app.focused_pane() {
            FocusedPane::Tree => {
                "jk: move | hl: (un)fold | gg/G: top/bottom | /: filter | Ctrl+G: go to | Ctrl+F: find value | d: diff | ?: help | q: quit"
            }
            FocusedPane::Values => "jk: move | /: search values | n/N: next/prev match | y: copy value | Tab: pane | q: quit",
        },
    };

    let paragraph = Paragraph::new(text).style(Style::default().fg(colors.text).bg(colors.bg));
    f.render_widget(paragraph, area);
}
