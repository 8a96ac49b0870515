//! Background loaders.
//!
//! Every load is a fire-and-forget `std::thread::spawn`, not a task on an
//! async runtime: the dispatcher has no executor to drive, and a thread per
//! load keeps the cancellation story simple (check the token before doing
//! work, check it again before reporting back).

use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::bus::CancelToken;
use crate::hive::{HiveReader, NodeId, ValueReadOptions, ValueStat};
use crate::tree::Item;

/// Everything a background task can report back to the dispatcher.
#[derive(Debug)]
pub enum Message {
    /// A key's children finished loading.
    ChildrenLoaded {
        /// Path of the key that was expanded.
        path: String,
        /// Freshly fetched, unsorted children.
        children: Vec<Item>,
    },
    /// A key's children failed to load.
    ChildrenLoadFailed {
        /// Path of the key whose load failed.
        path: String,
    },
    /// The value table for the selected key finished loading.
    ValuesLoaded {
        /// Path the values belong to.
        path: String,
        /// Value metadata, in reader-native order.
        values: Vec<ValueStat>,
        /// Short display preview for each value, same order as `values`.
        previews: Vec<String>,
    },
    /// The value table failed to load.
    ValuesLoadFailed {
        /// Path whose values failed to load.
        path: String,
    },
    /// A hive-to-hive diff finished computing.
    DiffReady {
        /// Path-keyed diff classification, ready for
        /// `DiffState::accept_diff`.
        diff_map: std::collections::HashMap<String, crate::hive::KeyDiff>,
        /// Reader for the hive that was already open ("old" side).
        old_reader: Arc<dyn HiveReader>,
        /// Reader for the newly opened compare hive ("new" side).
        new_reader: Arc<dyn HiveReader>,
    },
    /// Opening or diffing the compared hive failed.
    DiffFailed,
    /// A global (cross-tree) value search finished scanning.
    GlobalSearchDone {
        /// Paths of keys with at least one matching value, sorted.
        paths: Vec<String>,
    },
}

/// Build a tree [`Item`] for `id`, a direct child of `parent_path`.
pub(crate) fn item_from_child(reader: &dyn HiveReader, id: NodeId, parent_path: &str) -> crate::error::Result<Item> {
    let stat = reader.stat_key(id)?;
    let path = reader.path_of(id)?;
    Ok(Item {
        path,
        name: stat.name,
        depth: parent_path.matches('\\').count() + usize::from(!parent_path.is_empty()),
        parent: parent_path.to_string(),
        node_id: Some(id),
        old_node_id: None,
        new_node_id: None,
        subkey_count: stat.subkey_count,
        value_count: stat.value_count,
        last_write: stat.last_write,
        expanded: false,
        diff_status: crate::hive::DiffStatus::Unchanged,
    })
}

/// Spawn a background fetch of `node_id`'s children. Sends
/// [`Message::ChildrenLoaded`] on success, [`Message::ChildrenLoadFailed`]
/// on error, and sends nothing at all if `token` is cancelled either before
/// the fetch starts or after it completes.
pub fn spawn_children_loader(
    reader: Arc<dyn HiveReader>,
    node_id: NodeId,
    path: String,
    token: CancelToken,
    tx: Sender<Message>,
) {
    std::thread::spawn(move || {
        if token.is_cancelled() {
            return;
        }

        let result = reader.subkeys(node_id).and_then(|ids| {
            ids.into_iter()
                .map(|id| item_from_child(reader.as_ref(), id, &path))
                .collect::<crate::error::Result<Vec<Item>>>()
        });

        if token.is_cancelled() {
            return;
        }

        match result {
            Ok(children) => {
                let _ = tx.send(Message::ChildrenLoaded { path, children });
            }
            Err(_) => {
                let _ = tx.send(Message::ChildrenLoadFailed { path });
            }
        }
    });
}

/// Spawn a background fetch of `node_id`'s value table.
pub fn spawn_values_loader(
    reader: Arc<dyn HiveReader>,
    node_id: NodeId,
    path: String,
    token: CancelToken,
    tx: Sender<Message>,
) {
    std::thread::spawn(move || {
        if token.is_cancelled() {
            return;
        }

        let result = reader.values(node_id).and_then(|ids| {
            ids.into_iter()
                .map(|id| {
                    let stat = reader.stat_value(id)?;
                    let bytes = reader
                        .value_bytes(id, ValueReadOptions { copy_data: true })
                        .unwrap_or_default();
                    let preview = crate::ui::formatters::preview_value(&stat.value_type, &bytes);
                    Ok((stat, preview))
                })
                .collect::<crate::error::Result<Vec<(ValueStat, String)>>>()
        });

        if token.is_cancelled() {
            return;
        }

        match result {
            Ok(pairs) => {
                let (values, previews) = pairs.into_iter().unzip();
                let _ = tx.send(Message::ValuesLoaded { path, values, previews });
            }
            Err(_) => {
                let _ = tx.send(Message::ValuesLoadFailed { path });
            }
        }
    });
}

/// Spawn a background scan of every key's values for `query`, matching on
/// value name, type string, or formatted preview (case-insensitive
/// substring). Checked against `token` between keys so a fast-typing user
/// can abandon a stale scan before it walks the whole hive.
pub fn spawn_global_search_loader(
    reader: Arc<dyn HiveReader>,
    query: String,
    token: CancelToken,
    tx: Sender<Message>,
) {
    std::thread::spawn(move || {
        let needle = query.to_lowercase();
        let mut matches = Vec::new();
        let mut stack = vec![reader.root()];

        while let Some(id) = stack.pop() {
            if token.is_cancelled() {
                return;
            }

            if let Ok(path) = reader.path_of(id) {
                if let Ok(value_ids) = reader.values(id) {
                    for value_id in value_ids {
                        let Ok(stat) = reader.stat_value(value_id) else {
                            continue;
                        };
                        let name_hit = stat.name.to_lowercase().contains(&needle)
                            || stat.value_type.to_lowercase().contains(&needle);
                        let value_hit = name_hit
                            || reader
                                .value_bytes(value_id, ValueReadOptions { copy_data: false })
                                .map(|bytes| {
                                    crate::ui::formatters::preview_value(&stat.value_type, &bytes)
                                        .to_lowercase()
                                        .contains(&needle)
                                })
                                .unwrap_or(false);
                        if value_hit {
                            matches.push(path.clone());
                            break;
                        }
                    }
                }
            }

            if let Ok(children) = reader.subkeys(id) {
                stack.extend(children);
            }
        }

        if token.is_cancelled() {
            return;
        }

        matches.sort();
        matches.dedup();
        let _ = tx.send(Message::GlobalSearchDone { paths: matches });
    });
}

/// Spawn a background open-and-diff of a second hive against `current`.
/// `current` becomes the diff's "old" side, the newly opened hive the "new"
/// side, matching `DiffHives(oldPath, newPath)` in the external interface.
pub fn spawn_diff_loader(
    current: Arc<dyn HiveReader>,
    compare_path: std::path::PathBuf,
    tx: Sender<Message>,
) {
    std::thread::spawn(move || {
        let outcome = crate::hive::open(&compare_path).and_then(|compared| {
            let compared: Arc<dyn HiveReader> = Arc::new(compared);
            let diff_map = crate::hive::diff_hives(current.as_ref(), compared.as_ref())?;
            Ok((diff_map, compared))
        });

        match outcome {
            Ok((diff_map, new_reader)) => {
                let _ = tx.send(Message::DiffReady {
                    diff_map,
                    old_reader: current,
                    new_reader,
                });
            }
            Err(_) => {
                let _ = tx.send(Message::DiffFailed);
            }
        }
    });
}

/// Fetch raw bytes for a single value, for the value-detail modal. Runs
/// synchronously on a background thread since value reads are bounded by a
/// single value's size rather than a subtree walk.
pub fn spawn_value_bytes_loader(
    reader: Arc<dyn HiveReader>,
    value_id: crate::hive::ValueId,
    token: CancelToken,
    on_done: Sender<crate::error::Result<Vec<u8>>>,
) {
    std::thread::spawn(move || {
        if token.is_cancelled() {
            return;
        }
        let bytes = reader.value_bytes(value_id, ValueReadOptions { copy_data: true });
        if token.is_cancelled() {
            return;
        }
        let _ = on_done.send(bytes);
    });
}
