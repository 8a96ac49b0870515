//! Small helpers that sit above [`crate::clipboard`] and format what the
//! dispatcher's `c`/`y` keys put on the system clipboard.

use crate::clipboard;
use crate::error::Result;
use crate::hive::ValueStat;

/// Copy a key's backslash-separated path to the clipboard verbatim.
pub fn copy_path(path: &str) -> Result<()> {
    clipboard::copy_to_clipboard(path)
}

/// Copy `name = preview` for a single value row to the clipboard.
pub fn copy_value(stat: &ValueStat, preview: &str) -> Result<()> {
    let name = if stat.name.is_empty() { "(Default)" } else { &stat.name };
    clipboard::copy_to_clipboard(&format!("{name} = {preview}"))
}
