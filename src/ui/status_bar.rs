//! Status bar UI component.

use crate::app::{App, InputMode};
use crate::ui::ThemeColors;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

/// Draw the status bar: the active input-mode prompt and buffer while one is
/// open, otherwise the dispatcher's transient status message.
pub fn draw_status(f: &mut Frame<'_>, area: Rect, app: &App, colors: &ThemeColors) {
    let text = match app.input_mode() {
        InputMode::Filter => format!("/{}", app.input_buffer()),
        InputMode::ValueSearch => format!("/{}", app.input_buffer()),
        InputMode::GoToPath => format!("Go to path: {}", app.input_buffer()),
        InputMode::DiffComparePath => format!("Compare against: {}", app.input_buffer()),
        InputMode::GlobalSearch => format!("Find value: {}", app.input_buffer()),
        InputMode::Normal => app.status().to_string(),
    };

    let paragraph = Paragraph::new(text).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));
    f.render_widget(paragraph, area);
}
