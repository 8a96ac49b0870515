//! Terminal UI: layout, themes, and widgets.
//!
//! Rendering is read-only: nothing here mutates dispatcher state apart from
//! syncing the two [`crate::render::VirtualListState`]s to the current
//! viewport height, which is purely a function of the terminal size.

pub mod formatters;
mod keymap_bar;
mod status_bar;
pub mod theme;

use crate::app::{App, FocusedPane};
use crate::diff::DiffMode;
use crate::render::{tree_item, value_row, visible_slice};

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

pub use keymap_bar::draw_keymap;
pub use status_bar::draw_status;
pub use theme::ThemeColors;

const HELP_TEXT: &str = "\
Up/k Down/j        move cursor
Left/h             collapse, or move to parent
Right/l Enter      expand / collapse
g g, G             jump to top / bottom
p                  move to parent
E, C               expand all children / collapse all
Ctrl+E, Ctrl+L     expand current level / collapse to current level
/                  filter keys (tree) or search values (value table)
Ctrl+F             find a value anywhere in the hive
Ctrl+G             go to a key path
Esc                cancel input, or clear the active filter
n, N               next / previous match
b, B               toggle bookmark / jump to next bookmark
c, y               copy key path / copy selected value
d                  enter or exit diff mode
a r m u v          (diff) toggle added/removed/modified/unchanged/diff-only
F5                 re-emit selection for the current key
Tab                switch focused pane
?                  toggle this help
q, Ctrl+C          quit";

/// Draw the full UI for one frame.
pub fn draw(f: &mut Frame<'_>, app: &mut App) {
    let colors = ThemeColors::from_theme(&app.theme());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)])
        .split(f.area());

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    draw_tree(f, app, content[0], &colors);
    draw_values(f, app, content[1], &colors);

    draw_status(f, chunks[1], app, &colors);
    draw_keymap(f, chunks[2], app, &colors);

    if app.help_visible() {
        draw_help(f, f.area(), &colors);
    }
}

fn draw_tree(f: &mut Frame<'_>, app: &mut App, area: Rect, colors: &ThemeColors) {
    let focused = app.focused_pane() == FocusedPane::Tree;
    let title = if app.diff().mode() == DiffMode::Diff {
        let flags = app.diff().flags();
        format!(
            " Keys [diff: +{} -{} ~{} ={}{}] ",
            if flags.show_added { "on" } else { "off" },
            if flags.show_removed { "on" } else { "off" },
            if flags.show_modified { "on" } else { "off" },
            if flags.show_unchanged { "on" } else { "off" },
            if flags.diff_only_view { " diff-only" } else { "" },
        )
    } else {
        " Keys ".to_string()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { colors.heading } else { colors.border }))
        .style(Style::default().bg(colors.bg));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let cursor = app.cursor_position();
    let total = app.tree_items().len();
    let (start, _) = app.tree_scroll_mut().sync(cursor, total, inner.height as usize);

    let items = app.tree_items().to_vec();
    let width = inner.width as usize;
    let lines: Vec<Line<'static>> = visible_slice(&items, app.tree_scroll_mut())
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let idx = start + i;
            let bookmarked = app.is_bookmarked(&item.path);
            tree_item::render_row(item, idx == cursor, bookmarked, width, colors)
        })
        .collect();

    let paragraph = Paragraph::new(Text::from(lines)).style(Style::default().fg(colors.text));
    f.render_widget(paragraph, inner);
}

fn draw_values(f: &mut Frame<'_>, app: &mut App, area: Rect, colors: &ThemeColors) {
    let focused = app.focused_pane() == FocusedPane::Values;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    draw_key_info(f, app, layout[0], colors);

    let block = Block::default()
        .title(" Values ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { colors.heading } else { colors.border }))
        .style(Style::default().bg(colors.bg));

    let inner = block.inner(layout[1]);
    f.render_widget(block, layout[1]);

    let (values, previews) = app.values();
    let cursor = app.value_cursor();
    let preview_width = (inner.width as usize).saturating_sub(40).max(8);

    let header = Row::new(vec!["Name", "Type", "Preview"]).style(Style::default().fg(colors.label).add_modifier(Modifier::BOLD));
    let rows: Vec<Row<'_>> = values
        .iter()
        .zip(previews.iter())
        .enumerate()
        .map(|(i, (stat, preview))| {
            let truncated = value_row::truncate_preview(preview, preview_width);
            value_row::render_row(stat, &truncated, i == cursor, colors)
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(20), Constraint::Length(16), Constraint::Min(8)],
    )
    .header(header);

    f.render_widget(table, inner);
}

fn draw_key_info(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let text = match app.tree_items().get(app.cursor_position()) {
        Some(item) => {
            let last_write = if item.last_write != 0 {
                formatters::format_timestamp(item.last_write)
            } else {
                "unknown".to_string()
            };
            format!(
                "{}\n{} subkeys, {} values, last write {}",
                item.path, item.subkey_count, item.value_count, last_write
            )
        }
        None => "No key selected".to_string(),
    };

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(colors.border)))
        .style(Style::default().fg(colors.text))
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn draw_help(f: &mut Frame<'_>, area: Rect, colors: &ThemeColors) {
    let popup = centered_rect(60, 70, area);
    f.render_widget(Clear, popup);

    let paragraph = Paragraph::new(HELP_TEXT)
        .block(
            Block::default()
                .title(" Keymap (? to close) ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.heading))
                .style(Style::default().bg(colors.bg)),
        )
        .style(Style::default().fg(colors.text));

    f.render_widget(paragraph, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
