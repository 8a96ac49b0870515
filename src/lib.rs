//! hiveexplorer - an interactive terminal viewer for Windows Registry hive files.
//!
//! hiveexplorer opens a raw hive (`NTUSER.DAT`, `SYSTEM`, `SOFTWARE`, ...) and
//! presents it as a lazily-expanded key tree with vim-style navigation, a
//! live key filter, cross-tree value search, and a hive-to-hive diff overlay.
//!
//! # Architecture
//!
//! - **`hive`**: the external reader interface (`notatin`-backed) plus
//!   hive-to-hive diffing.
//! - **`tree`**: the expand/collapse state machine over the visible row list.
//! - **`cursor`** / **`bus`**: cursor movement and the selection-signal bus
//!   that background loaders subscribe to.
//! - **`filter`**: live key filtering and value search.
//! - **`diff`**: the diff-mode overlay state machine.
//! - **`loaders`**: fire-and-forget background tasks that report back over a
//!   channel.
//! - **`app`**: the event dispatcher tying all of the above together.
//! - **`render`** / **`ui`**: rendering onto the terminal.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

/// Application state and event dispatch.
pub mod app;
/// Selection-signal bus and cancellation tokens.
pub mod bus;
/// Clipboard integration.
pub mod clipboard;
/// Cursor and selection authority.
pub mod cursor;
/// Diff-mode overlay.
pub mod diff;
/// Error types.
pub mod error;
/// Live key filter and value search.
pub mod filter;
/// Hive reader interface and diffing.
pub mod hive;
/// Background loaders.
pub mod loaders;
/// Virtual-scrolling rendering helpers.
pub mod render;
/// Tree state and expand manager.
pub mod tree;
/// Terminal UI: layout, themes, and widgets.
pub mod ui;
/// Clipboard-facing formatting helpers.
pub mod util;

pub use error::{HiveExplorerError, Result};
