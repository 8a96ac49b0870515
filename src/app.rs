//! Event Dispatcher.
//!
//! The single mutable-state owner. Everything else in this crate is a
//! component `App` drives: it owns the primary [`HiveReader`], the
//! [`TreeState`] / [`CursorManager`] / [`SelectionBus`] triad, the filter and
//! diff overlays, and the inbox background loaders report back through.
//! [`App::handle_key`] is the keymap table from the external interface; the
//! poll/draw loop itself lives in `main.rs`.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::bus::SelectionBus;
use crate::cursor::CursorManager;
use crate::diff::{DiffFlagKind, DiffMode, DiffState};
use crate::error::Result;
use crate::filter::{self, GlobalValueSearch, KeyFilter, ValueSearch};
use crate::hive::{self, HiveReader, ValueStat};
use crate::loaders::{self, Message};
use crate::render::VirtualListState;
use crate::tree::{ExpandOutcome, Item, TreeState};

/// How long a transient status message stays on screen before clearing.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Application color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Gruvbox dark theme.
    GruvboxDark,
    /// Gruvbox light theme.
    GruvboxLight,
}

impl Theme {
    /// Get the next theme in the cycle.
    pub fn next(self) -> Self {
        match self {
            Theme::GruvboxDark => Theme::GruvboxLight,
            Theme::GruvboxLight => Theme::GruvboxDark,
        }
    }

    /// Get the theme name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::GruvboxDark => "Gruvbox Dark",
            Theme::GruvboxLight => "Gruvbox Light",
        }
    }
}

/// Presentation mode for the (out-of-scope) value-detail panel, read once
/// from `GOHIVEX_DETAIL_MODE` and threaded through without being branched on
/// by the core itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailMode {
    /// A centered popup modal.
    Modal,
    /// A persistent side pane.
    Pane,
}

impl DetailMode {
    fn from_env() -> Self {
        match std::env::var("GOHIVEX_DETAIL_MODE").as_deref() {
            Ok("pane") => DetailMode::Pane,
            _ => DetailMode::Modal,
        }
    }
}

/// Startup configuration, built once from CLI flags and the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the hive file to open.
    pub hive_path: PathBuf,
    /// Whether `--debug` was passed.
    pub debug: bool,
    /// Detail-panel presentation mode.
    pub detail_mode: DetailMode,
}

impl Config {
    /// Build a `Config` from CLI arguments, reading `GOHIVEX_DETAIL_MODE`
    /// from the environment.
    pub fn new(hive_path: PathBuf, debug: bool) -> Self {
        Self {
            hive_path,
            debug,
            detail_mode: DetailMode::from_env(),
        }
    }
}

/// Which pane has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    /// The key tree.
    Tree,
    /// The value table.
    Values,
}

/// What the next keystroke should be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Ordinary keymap dispatch.
    Normal,
    /// Typing a key-filter query (`/` while the tree is focused).
    Filter,
    /// Typing a value-table search query (`/` while values are focused).
    ValueSearch,
    /// Typing a go-to-path target (`Ctrl+G`).
    GoToPath,
    /// Typing a compare-hive path for diff mode (`d` from Normal).
    DiffComparePath,
    /// Typing a global value-search query (`Ctrl+F`).
    GlobalSearch,
}

/// The event dispatcher: owns every piece of mutable state in the program.
pub struct App {
    reader: Arc<dyn HiveReader>,
    config: Config,

    tree: TreeState,
    cursor: CursorManager,
    bus: SelectionBus,
    children_bus: SelectionBus,
    search_bus: SelectionBus,
    loading_children: HashSet<String>,

    msg_tx: Sender<Message>,
    msg_rx: Receiver<Message>,

    values: Vec<ValueStat>,
    value_previews: Vec<String>,
    value_cursor: usize,
    value_search: ValueSearch,
    value_search_input: String,

    global_search: GlobalValueSearch,
    global_matches: Vec<String>,
    global_match_cursor: usize,

    filter: KeyFilter,
    diff: DiffState,
    diff_compare_input: String,
    diff_restore_path: Option<String>,

    nav_input: String,
    pending_nav_target: Option<String>,

    focused_pane: FocusedPane,
    input_mode: InputMode,
    pending_g: bool,

    tree_scroll: VirtualListState,
    value_scroll: VirtualListState,

    theme: Theme,
    help_visible: bool,
    status: String,
    status_expires: Option<Instant>,
    should_quit: bool,
}

impl App {
    /// Open `config.hive_path` and build the dispatcher with its tree
    /// primed from the hive's root-level keys.
    pub fn new(config: Config) -> Result<Self> {
        let reader: Arc<dyn HiveReader> = Arc::new(hive::open(&config.hive_path)?);
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded();

        let mut app = Self {
            reader,
            config,
            tree: TreeState::new(),
            cursor: CursorManager::new(),
            bus: SelectionBus::new(),
            children_bus: SelectionBus::new(),
            search_bus: SelectionBus::new(),
            loading_children: HashSet::new(),
            msg_tx,
            msg_rx,
            values: Vec::new(),
            value_previews: Vec::new(),
            value_cursor: 0,
            value_search: ValueSearch::new(),
            value_search_input: String::new(),
            global_search: GlobalValueSearch::new(),
            global_matches: Vec::new(),
            global_match_cursor: 0,
            filter: KeyFilter::new(),
            diff: DiffState::new(),
            diff_compare_input: String::new(),
            diff_restore_path: None,
            nav_input: String::new(),
            pending_nav_target: None,
            focused_pane: FocusedPane::Tree,
            input_mode: InputMode::Normal,
            pending_g: false,
            tree_scroll: VirtualListState::new(),
            value_scroll: VirtualListState::new(),
            theme: Theme::GruvboxDark,
            help_visible: false,
            status: "Ready".to_string(),
            status_expires: None,
            should_quit: false,
        };

        let roots = app.fetch_root_items()?;
        app.tree.reset_with_roots(roots);
        app.cursor.move_to(0, app.tree.items());
        app.notify_selection();
        Ok(app)
    }

    fn fetch_root_items(&self) -> Result<Vec<Item>> {
        let root = self.reader.root();
        let mut items = self
            .reader
            .subkeys(root)?
            .into_iter()
            .map(|id| loaders::item_from_child(self.reader.as_ref(), id, ""))
            .collect::<Result<Vec<Item>>>()?;
        items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(items)
    }

    /// Currently visible tree rows.
    pub fn tree_items(&self) -> &[Item] {
        self.tree.items()
    }

    /// Index of the currently selected tree row.
    pub fn cursor_position(&self) -> usize {
        self.cursor.position()
    }

    /// Currently loaded value table, paired with its preview strings.
    pub fn values(&self) -> (&[ValueStat], &[String]) {
        (&self.values, &self.value_previews)
    }

    /// Index of the currently selected value row.
    pub fn value_cursor(&self) -> usize {
        self.value_cursor
    }

    /// Which pane has keyboard focus.
    pub fn focused_pane(&self) -> FocusedPane {
        self.focused_pane
    }

    /// The configuration the dispatcher was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current color theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Current transient status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether the help overlay should be drawn.
    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    /// Whether the dispatcher wants the process to exit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Diff overlay state, for the status/legend bar.
    pub fn diff(&self) -> &DiffState {
        &self.diff
    }

    /// Current input mode and whatever buffer it reads from.
    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Whatever the active input mode's buffer currently holds.
    pub fn input_buffer(&self) -> &str {
        match self.input_mode {
            InputMode::Filter => self.filter.query(),
            InputMode::ValueSearch => &self.value_search_input,
            InputMode::GoToPath => &self.nav_input,
            InputMode::DiffComparePath => &self.diff_compare_input,
            InputMode::GlobalSearch => self.global_search.buffer(),
            InputMode::Normal => "",
        }
    }

    /// Mutable scroll state for the tree pane.
    pub fn tree_scroll_mut(&mut self) -> &mut VirtualListState {
        &mut self.tree_scroll
    }

    /// Mutable scroll state for the value pane.
    pub fn value_scroll_mut(&mut self) -> &mut VirtualListState {
        &mut self.value_scroll
    }

    /// Whether `path` is bookmarked.
    pub fn is_bookmarked(&self, path: &str) -> bool {
        self.tree.is_bookmarked(path)
    }

    /// One tick of the dispatcher's run loop: drain finished background
    /// loads, fire a debounced global search if its timer has elapsed, and
    /// clear an expired status message.
    pub fn tick(&mut self) {
        self.drain_messages();

        if self.global_search.should_fire() {
            let query = self.global_search.buffer().to_string();
            self.global_search.mark_fired();
            let token = self.search_bus.notify(String::new(), String::new());
            loaders::spawn_global_search_loader(self.reader.clone(), query, token, self.msg_tx.clone());
        }

        if let Some(expires) = self.status_expires {
            if Instant::now() >= expires {
                self.status = String::new();
                self.status_expires = None;
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        self.status_expires = Some(Instant::now() + STATUS_TTL);
    }

    fn current_item_path(&self) -> Option<String> {
        self.tree.items().get(self.cursor.position()).map(|i| i.path.clone())
    }

    fn reader_for(&self, item: &Item) -> Option<(Arc<dyn HiveReader>, hive::NodeId)> {
        if self.diff.mode() == DiffMode::Diff {
            if let Some(id) = item.new_node_id {
                return self.diff.new_reader().map(|r| (r, id));
            }
            if let Some(id) = item.old_node_id {
                return self.diff.old_reader().map(|r| (r, id));
            }
            None
        } else {
            item.node_id.map(|id| (self.reader.clone(), id))
        }
    }

    /// Re-emit a selection signal for the current cursor position, spawning
    /// a fresh, cancellation-aware value-table load.
    fn notify_selection(&mut self) {
        self.values.clear();
        self.value_previews.clear();
        self.value_cursor = 0;
        self.value_scroll = VirtualListState::new();

        let Some(item) = self.tree.items().get(self.cursor.position()).cloned() else {
            return;
        };

        let hive_side = if self.diff.mode() == DiffMode::Diff {
            if item.new_node_id.is_some() { "new" } else { "old" }
        } else {
            ""
        };
        let token = self.bus.notify(item.path.clone(), hive_side);

        if let Some((reader, node_id)) = self.reader_for(&item) {
            loaders::spawn_values_loader(reader, node_id, item.path, token, self.msg_tx.clone());
        }
    }

    fn drain_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                Message::ChildrenLoaded { path, children } => {
                    self.loading_children.remove(&path);
                    self.tree.apply_loaded_children(&path, children);
                    self.cursor.clamp(self.tree.items().len());
                    self.advance_nav_target();
                }
                Message::ChildrenLoadFailed { path } => {
                    self.loading_children.remove(&path);
                    self.tree.fail_load(&path);
                    self.set_status(format!("failed to load {path}"));
                }
                Message::ValuesLoaded { path, values, previews } => {
                    if self.current_item_path().as_deref() == Some(path.as_str()) {
                        self.values = values;
                        self.value_previews = previews;
                        self.value_cursor = 0;
                    }
                }
                Message::ValuesLoadFailed { path } => {
                    if self.current_item_path().as_deref() == Some(path.as_str()) {
                        self.set_status("failed to load values");
                    }
                }
                Message::DiffReady { diff_map, old_reader, new_reader } => {
                    let items = self.diff.accept_diff(diff_map, old_reader, new_reader);
                    self.tree.load_all_items(items);
                    self.cursor.move_to(0, self.tree.items());
                    self.notify_selection();
                    self.set_status("diff ready");
                }
                Message::DiffFailed => {
                    self.diff.fail_load();
                    self.set_status("failed to open comparison hive");
                }
                Message::GlobalSearchDone { paths } => {
                    self.global_matches = paths;
                    self.global_match_cursor = 0;
                    match self.global_matches.first().cloned() {
                        Some(first) => {
                            self.set_status(format!("{} key(s) with matching values", self.global_matches.len()));
                            self.set_nav_target(first);
                        }
                        None => self.set_status("no value matches"),
                    }
                }
            }
        }
    }

    /// Navigate towards `path`, expanding ancestors one level at a time
    /// (synchronously in diff mode, asynchronously otherwise) until it
    /// becomes visible, then move the cursor there. Shared by go-to-path,
    /// global-search-to-first-match, and diff-exit restoration.
    fn set_nav_target(&mut self, path: String) {
        self.pending_nav_target = Some(path);
        self.advance_nav_target();
    }

    fn advance_nav_target(&mut self) {
        let Some(target) = self.pending_nav_target.clone() else {
            return;
        };

        if let Some(pos) = self.tree.items().iter().position(|i| i.path == target) {
            self.cursor.move_to(pos, self.tree.items());
            self.notify_selection();
            self.pending_nav_target = None;
            return;
        }

        for ancestor in filter::ancestors_of(&target) {
            let Some(pos) = self.tree.items().iter().position(|i| i.path == ancestor) else {
                continue;
            };
            if self.tree.items()[pos].expanded {
                continue;
            }
            match self.tree.expand(pos) {
                ExpandOutcome::LoadRequested { path, node_id } => self.spawn_children_load(path, node_id),
                ExpandOutcome::Expanded => self.advance_nav_target(),
                _ => {}
            }
            return;
        }

        self.pending_nav_target = None;
    }

    fn spawn_children_load(&mut self, path: String, node_id: Option<hive::NodeId>) {
        let Some(node_id) = node_id else { return };
        if self.loading_children.insert(path.clone()) {
            let token = self.children_bus.notify(path.clone(), "");
            loaders::spawn_children_loader(self.reader.clone(), node_id, path, token, self.msg_tx.clone());
        }
    }

    fn reload_primary_tree(&mut self) {
        match self.fetch_root_items() {
            Ok(items) => {
                self.tree.reset_with_roots(items);
                self.cursor.move_to(0, self.tree.items());
            }
            Err(_) => self.set_status("failed to reload hive"),
        }
    }

    fn expand_or_collapse(&mut self) {
        let pos = self.cursor.position();
        match self.tree.expand(pos) {
            ExpandOutcome::Expanded | ExpandOutcome::Collapsed => {
                self.cursor.clamp(self.tree.items().len());
                self.cursor.emit_signal(self.tree.items());
            }
            ExpandOutcome::MoveToParent => {
                if self.cursor.move_to_parent(self.tree.items()) {
                    self.notify_selection();
                }
            }
            ExpandOutcome::LoadRequested { path, node_id } => self.spawn_children_load(path, node_id),
            ExpandOutcome::NoOp => {}
        }
    }

    fn collapse_or_parent(&mut self) {
        let pos = self.cursor.position();
        match self.tree.collapse(pos) {
            ExpandOutcome::Collapsed => {
                self.cursor.clamp(self.tree.items().len());
                self.cursor.emit_signal(self.tree.items());
            }
            ExpandOutcome::MoveToParent => {
                if self.cursor.move_to_parent(self.tree.items()) {
                    self.notify_selection();
                }
            }
            _ => {}
        }
    }

    fn move_cursor<F>(&mut self, mv: F)
    where
        F: FnOnce(&mut CursorManager, &[Item]) -> bool,
    {
        let items = self.tree.items().to_vec();
        if mv(&mut self.cursor, &items) {
            self.notify_selection();
        }
    }

    fn toggle_diff_flag(&mut self, kind: DiffFlagKind) {
        let Some(items) = self.diff.toggle_flag(kind) else {
            return;
        };
        let cursor_path = self.current_item_path();
        self.tree.load_all_items(items);
        match cursor_path.and_then(|path| self.tree.items().iter().position(|i| i.path == path)) {
            Some(pos) => {
                self.cursor.move_to(pos, self.tree.items());
            }
            None => self.cursor.clamp(self.tree.items().len()),
        }
        self.notify_selection();
    }

    fn enter_diff_prompt(&mut self) {
        self.diff_restore_path = self.current_item_path();
        self.diff.start_prompt();
        self.diff_compare_input.clear();
        self.input_mode = InputMode::DiffComparePath;
    }

    fn submit_diff_compare_path(&mut self) {
        let path = PathBuf::from(self.diff_compare_input.trim());
        self.diff_compare_input.clear();
        self.input_mode = InputMode::Normal;
        if path.as_os_str().is_empty() {
            self.diff.cancel_prompt();
            self.set_status("compare path cannot be empty");
            return;
        }
        if let Err(e) = self.diff.submit_compare_path() {
            self.set_status(e.to_string());
            return;
        }
        self.set_status("loading comparison hive...");
        loaders::spawn_diff_loader(self.reader.clone(), path, self.msg_tx.clone());
    }

    fn exit_diff_mode(&mut self) {
        self.diff.exit();
        self.reload_primary_tree();
        if let Some(path) = self.diff_restore_path.take() {
            self.set_nav_target(path);
        } else {
            self.notify_selection();
        }
        self.set_status("exited diff mode");
    }

    fn submit_goto_path(&mut self) {
        let target = self.nav_input.trim().to_string();
        self.nav_input.clear();
        self.input_mode = InputMode::Normal;
        if target.is_empty() {
            return;
        }
        self.set_nav_target(target);
    }

    fn submit_value_search(&mut self) {
        self.value_search.search(&self.value_search_input, &self.values);
        self.value_search_input.clear();
        self.input_mode = InputMode::Normal;
        if let Some(idx) = self.value_search.matches().first().copied() {
            self.value_cursor = idx;
        } else {
            self.set_status("no matching values");
        }
    }

    fn next_match(&mut self) {
        match self.focused_pane {
            FocusedPane::Tree if !self.global_matches.is_empty() => {
                self.global_match_cursor = (self.global_match_cursor + 1) % self.global_matches.len();
                let path = self.global_matches[self.global_match_cursor].clone();
                self.set_nav_target(path);
            }
            FocusedPane::Values => {
                if let Some(idx) = self.value_search.next() {
                    self.value_cursor = idx;
                }
            }
            _ => {}
        }
    }

    fn prev_match(&mut self) {
        match self.focused_pane {
            FocusedPane::Tree if !self.global_matches.is_empty() => {
                self.global_match_cursor = if self.global_match_cursor == 0 {
                    self.global_matches.len() - 1
                } else {
                    self.global_match_cursor - 1
                };
                let path = self.global_matches[self.global_match_cursor].clone();
                self.set_nav_target(path);
            }
            FocusedPane::Values => {
                if let Some(idx) = self.value_search.prev() {
                    self.value_cursor = idx;
                }
            }
            _ => {}
        }
    }

    fn copy_path(&mut self) {
        let Some(path) = self.current_item_path() else {
            self.set_status("nothing selected");
            return;
        };
        match crate::util::copy_path(&path) {
            Ok(()) => self.set_status("copied path"),
            Err(e) => self.set_status(format!("copy failed: {e}")),
        }
    }

    fn copy_value(&mut self) {
        let Some(stat) = self.values.get(self.value_cursor) else {
            self.set_status("no value selected");
            return;
        };
        let preview = self.value_previews.get(self.value_cursor).map(String::as_str).unwrap_or("");
        match crate::util::copy_value(stat, preview) {
            Ok(()) => self.set_status("copied value"),
            Err(e) => self.set_status(format!("copy failed: {e}")),
        }
    }

    /// Route one keystroke through the dispatcher's keymap.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Filter => self.handle_filter_key(key),
            InputMode::ValueSearch => self.handle_value_search_key(key),
            InputMode::GoToPath => self.handle_goto_path_key(key),
            InputMode::DiffComparePath => self.handle_diff_compare_path_key(key),
            InputMode::GlobalSearch => self.handle_global_search_key(key),
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter.clear(&mut self.tree);
                self.input_mode = InputMode::Normal;
                self.cursor.move_to(0, self.tree.items());
                self.notify_selection();
            }
            KeyCode::Enter => self.input_mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.filter.pop_char(&mut self.tree);
                self.cursor.move_to(0, self.tree.items());
                self.notify_selection();
            }
            KeyCode::Char(c) => {
                self.filter.push_char(c, &mut self.tree);
                self.cursor.move_to(0, self.tree.items());
                self.notify_selection();
            }
            _ => {}
        }
    }

    fn handle_value_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.value_search_input.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.submit_value_search(),
            KeyCode::Backspace => {
                self.value_search_input.pop();
            }
            KeyCode::Char(c) => self.value_search_input.push(c),
            _ => {}
        }
    }

    fn handle_global_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.global_search.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.input_mode = InputMode::Normal,
            KeyCode::Backspace => self.global_search.pop_char(),
            KeyCode::Char(c) => self.global_search.push_char(c),
            _ => {}
        }
    }

    fn handle_goto_path_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.nav_input.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.submit_goto_path(),
            KeyCode::Backspace => {
                self.nav_input.pop();
            }
            KeyCode::Char(c) => self.nav_input.push(c),
            _ => {}
        }
    }

    fn handle_diff_compare_path_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.diff_compare_input.clear();
                self.diff.cancel_prompt();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.submit_diff_compare_path(),
            KeyCode::Backspace => {
                self.diff_compare_input.pop();
            }
            KeyCode::Char(c) => self.diff_compare_input.push(c),
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let g_was_pending = self.pending_g;
        self.pending_g = false;

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                self.should_quit = true;
            }

            (KeyModifiers::NONE, KeyCode::Up) | (KeyModifiers::NONE, KeyCode::Char('k')) => match self.focused_pane {
                FocusedPane::Tree => self.move_cursor(CursorManager::move_up),
                FocusedPane::Values => self.value_cursor = self.value_cursor.saturating_sub(1),
            },
            (KeyModifiers::NONE, KeyCode::Down) | (KeyModifiers::NONE, KeyCode::Char('j')) => match self.focused_pane {
                FocusedPane::Tree => self.move_cursor(CursorManager::move_down),
                FocusedPane::Values => {
                    if self.value_cursor + 1 < self.values.len() {
                        self.value_cursor += 1;
                    }
                }
            },
            (KeyModifiers::NONE, KeyCode::Left) | (KeyModifiers::NONE, KeyCode::Char('h')) => {
                if self.focused_pane == FocusedPane::Tree {
                    self.collapse_or_parent();
                }
            }
            (KeyModifiers::NONE, KeyCode::Right) | (KeyModifiers::NONE, KeyCode::Enter) | (KeyModifiers::NONE, KeyCode::Char('l')) => {
                if self.focused_pane == FocusedPane::Tree {
                    self.expand_or_collapse();
                }
            }

            (KeyModifiers::NONE, KeyCode::Char('g')) => {
                if g_was_pending {
                    self.move_cursor(CursorManager::jump_to_start);
                } else {
                    self.pending_g = true;
                }
            }
            (KeyModifiers::SHIFT, KeyCode::Char('G')) => self.move_cursor(CursorManager::jump_to_end),
            (KeyModifiers::NONE, KeyCode::Char('p')) => self.move_cursor(CursorManager::move_to_parent),

            (KeyModifiers::SHIFT, KeyCode::Char('E')) => {
                if let Some(path) = self.current_item_path() {
                    self.tree.expand_all_children(&path);
                    self.cursor.emit_signal(self.tree.items());
                }
            }
            (KeyModifiers::SHIFT, KeyCode::Char('C')) => {
                self.tree.collapse_all();
                self.cursor.clamp(self.tree.items().len());
                self.cursor.emit_signal(self.tree.items());
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                let depth = self.tree.items().get(self.cursor.position()).map(|i| i.depth).unwrap_or(0);
                let outcomes = self.tree.expand_current_level(depth);
                self.cursor.clamp(self.tree.items().len());
                self.cursor.emit_signal(self.tree.items());
                for outcome in outcomes {
                    if let ExpandOutcome::LoadRequested { path, node_id } = outcome {
                        self.spawn_children_load(path, node_id);
                    }
                }
            }
            (KeyModifiers::CONTROL, KeyCode::Char('l')) => {
                let depth = self.tree.items().get(self.cursor.position()).map(|i| i.depth).unwrap_or(0);
                self.tree.collapse_to_current_level(depth);
                self.cursor.clamp(self.tree.items().len());
                self.cursor.emit_signal(self.tree.items());
            }

            (KeyModifiers::NONE, KeyCode::Char('/')) => {
                self.input_mode = match self.focused_pane {
                    FocusedPane::Tree => InputMode::Filter,
                    FocusedPane::Values => InputMode::ValueSearch,
                };
            }
            (KeyModifiers::CONTROL, KeyCode::Char('f')) => {
                self.global_search.clear();
                self.input_mode = InputMode::GlobalSearch;
            }
            (KeyModifiers::CONTROL, KeyCode::Char('g')) => {
                self.nav_input.clear();
                self.input_mode = InputMode::GoToPath;
            }
            (KeyModifiers::NONE, KeyCode::Esc) => {
                if self.filter.is_active() {
                    self.filter.clear(&mut self.tree);
                    self.cursor.move_to(0, self.tree.items());
                    self.notify_selection();
                }
            }
            (KeyModifiers::NONE, KeyCode::Char('n')) => self.next_match(),
            (KeyModifiers::SHIFT, KeyCode::Char('N')) => self.prev_match(),

            (KeyModifiers::NONE, KeyCode::Char('b')) => {
                if let Some(path) = self.current_item_path() {
                    self.tree.toggle_bookmark(&path);
                }
            }
            (KeyModifiers::SHIFT, KeyCode::Char('B')) => {
                if let Some(pos) = self.tree.next_bookmark(self.cursor.position()) {
                    self.move_cursor(|c, items| c.move_to(pos, items));
                }
            }

            (KeyModifiers::NONE, KeyCode::Char('c')) => self.copy_path(),
            (KeyModifiers::NONE, KeyCode::Char('y')) => self.copy_value(),

            (KeyModifiers::NONE, KeyCode::Char('d')) => match self.diff.mode() {
                DiffMode::Normal => self.enter_diff_prompt(),
                DiffMode::Diff => self.exit_diff_mode(),
                _ => {}
            },
            (KeyModifiers::NONE, KeyCode::Char('a')) if self.diff.mode() == DiffMode::Diff => {
                self.toggle_diff_flag(DiffFlagKind::Added);
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) if self.diff.mode() == DiffMode::Diff => {
                self.toggle_diff_flag(DiffFlagKind::Removed);
            }
            (KeyModifiers::NONE, KeyCode::Char('m')) if self.diff.mode() == DiffMode::Diff => {
                self.toggle_diff_flag(DiffFlagKind::Modified);
            }
            (KeyModifiers::NONE, KeyCode::Char('u')) if self.diff.mode() == DiffMode::Diff => {
                self.toggle_diff_flag(DiffFlagKind::Unchanged);
            }
            (KeyModifiers::NONE, KeyCode::Char('v')) if self.diff.mode() == DiffMode::Diff => {
                self.toggle_diff_flag(DiffFlagKind::DiffOnlyView);
            }

            (KeyModifiers::NONE, KeyCode::F(5)) => self.notify_selection(),
            (KeyModifiers::NONE, KeyCode::Tab) => {
                self.focused_pane = match self.focused_pane {
                    FocusedPane::Tree => FocusedPane::Values,
                    FocusedPane::Values => FocusedPane::Tree,
                };
            }
            (KeyModifiers::NONE, KeyCode::Char('?')) => self.help_visible = !self.help_visible,
            (KeyModifiers::SHIFT, KeyCode::Char('T')) => {
                self.theme = self.theme.next();
                self.set_status(format!("theme: {}", self.theme.name()));
            }

            _ => {}
        }
    }
}
