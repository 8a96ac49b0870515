//! Hive-to-hive structural diff: `DiffHives` / `FilterDiffKeys` from the
//! external interface (spec §6). This module only computes the diff map;
//! the stateful overlay built on top of it (flags, state machine, view
//! reload) lives in [`crate::diff`].

use std::collections::{HashMap, HashSet};

use super::{HiveReader, NodeId};
use crate::error::Result;

/// Classification of a key when comparing two hives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    /// Present, identically, in both hives.
    Unchanged,
    /// Present only in the new hive.
    Added,
    /// Present only in the old hive.
    Removed,
    /// Present in both, but metadata (subkey/value counts, last-write) differs.
    Modified,
}

/// One entry of a computed hive diff.
#[derive(Debug, Clone)]
pub struct KeyDiff {
    /// Backslash-separated path, relative to each hive's root.
    pub path: String,
    /// Leaf name.
    pub name: String,
    /// Classification.
    pub status: DiffStatus,
    /// Subkey count (new-hive value when both sides exist, else whichever side has it).
    pub subkey_count: u32,
    /// Value count, same convention as `subkey_count`.
    pub value_count: u32,
    /// Last-write time, same convention as `subkey_count`.
    pub last_write: i64,
    /// Node id in the old hive, absent unless status is Removed/Modified/Unchanged.
    pub old_node_id: Option<NodeId>,
    /// Node id in the new hive, absent unless status is Added/Modified/Unchanged.
    pub new_node_id: Option<NodeId>,
}

fn walk_paths(reader: &dyn HiveReader, id: NodeId, out: &mut HashMap<String, NodeId>) -> Result<()> {
    let path = reader.path_of(id)?;
    out.insert(path, id);
    for child in reader.subkeys(id)? {
        walk_paths(reader, child, out)?;
    }
    Ok(())
}

/// Structurally compare two hives, classifying every key reachable from
/// either root as Added, Removed, Modified, or Unchanged.
pub fn diff_hives(
    old: &dyn HiveReader,
    new: &dyn HiveReader,
) -> Result<HashMap<String, KeyDiff>> {
    let mut old_paths = HashMap::new();
    walk_paths(old, old.root(), &mut old_paths)?;
    let mut new_paths = HashMap::new();
    walk_paths(new, new.root(), &mut new_paths)?;

    let all_paths: HashSet<&String> = old_paths.keys().chain(new_paths.keys()).collect();

    let mut result = HashMap::with_capacity(all_paths.len());
    for path in all_paths {
        let old_id = old_paths.get(path).copied();
        let new_id = new_paths.get(path).copied();

        let diff = match (old_id, new_id) {
            (Some(oid), None) => {
                let stat = old.stat_key(oid)?;
                KeyDiff {
                    path: path.clone(),
                    name: stat.name,
                    status: DiffStatus::Removed,
                    subkey_count: stat.subkey_count,
                    value_count: stat.value_count,
                    last_write: stat.last_write,
                    old_node_id: Some(oid),
                    new_node_id: None,
                }
            }
            (None, Some(nid)) => {
                let stat = new.stat_key(nid)?;
                KeyDiff {
                    path: path.clone(),
                    name: stat.name,
                    status: DiffStatus::Added,
                    subkey_count: stat.subkey_count,
                    value_count: stat.value_count,
                    last_write: stat.last_write,
                    old_node_id: None,
                    new_node_id: Some(nid),
                }
            }
            (Some(oid), Some(nid)) => {
                let old_stat = old.stat_key(oid)?;
                let new_stat = new.stat_key(nid)?;
                let modified = old_stat.subkey_count != new_stat.subkey_count
                    || old_stat.value_count != new_stat.value_count
                    || old_stat.last_write != new_stat.last_write;
                KeyDiff {
                    path: path.clone(),
                    name: new_stat.name,
                    status: if modified {
                        DiffStatus::Modified
                    } else {
                        DiffStatus::Unchanged
                    },
                    subkey_count: new_stat.subkey_count,
                    value_count: new_stat.value_count,
                    last_write: new_stat.last_write,
                    old_node_id: Some(oid),
                    new_node_id: Some(nid),
                }
            }
            (None, None) => unreachable!("path came from one of the two maps"),
        };

        result.insert(path.clone(), diff);
    }

    Ok(result)
}

/// Filter a diff map down to the statuses requested by the four flags.
pub fn filter_diff_keys(
    diff: &HashMap<String, KeyDiff>,
    show_added: bool,
    show_removed: bool,
    show_modified: bool,
    show_unchanged: bool,
) -> Vec<KeyDiff> {
    diff.values()
        .filter(|kd| match kd.status {
            DiffStatus::Added => show_added,
            DiffStatus::Removed => show_removed,
            DiffStatus::Modified => show_modified,
            DiffStatus::Unchanged => show_unchanged,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hive::{KeyStat, ValueId, ValueReadOptions, ValueStat};
    use std::collections::HashMap as Map;

    struct FakeReader {
        keys: Map<u64, (String, String, Vec<u64>, u32, u32, i64)>,
        root: u64,
    }

    impl HiveReader for FakeReader {
        fn root(&self) -> NodeId {
            NodeId(self.root)
        }
        fn find(&self, path: &str) -> Result<NodeId> {
            self.keys
                .iter()
                .find(|(_, (p, ..))| p == path)
                .map(|(id, _)| NodeId(*id))
                .ok_or_else(|| crate::error::HiveExplorerError::key_not_found(path))
        }
        fn stat_key(&self, id: NodeId) -> Result<KeyStat> {
            let (_, name, _, subk, valn, lw) = &self.keys[&id.0];
            Ok(KeyStat {
                name: name.clone(),
                subkey_count: *subk,
                value_count: *valn,
                last_write: *lw,
            })
        }
        fn subkeys(&self, id: NodeId) -> Result<Vec<NodeId>> {
            Ok(self.keys[&id.0].2.iter().map(|i| NodeId(*i)).collect())
        }
        fn path_of(&self, id: NodeId) -> Result<String> {
            Ok(self.keys[&id.0].0.clone())
        }
        fn values(&self, _id: NodeId) -> Result<Vec<ValueId>> {
            Ok(vec![])
        }
        fn stat_value(&self, _id: ValueId) -> Result<ValueStat> {
            unimplemented!()
        }
        fn value_bytes(&self, _id: ValueId, _opts: ValueReadOptions) -> Result<Vec<u8>> {
            unimplemented!()
        }
    }

    fn reader(entries: &[(u64, &str, &str, &[u64], u32, u32, i64)], root: u64) -> FakeReader {
        let mut keys = Map::new();
        for (id, path, name, children, subk, valn, lw) in entries {
            keys.insert(
                *id,
                (
                    path.to_string(),
                    name.to_string(),
                    children.to_vec(),
                    *subk,
                    *valn,
                    *lw,
                ),
            );
        }
        FakeReader { keys, root }
    }

    #[test]
    fn added_removed_modified_unchanged_classified_correctly() {
        let old = reader(
            &[
                (1, "", "root", &[2, 3], 2, 0, 100),
                (2, "Kept", "Kept", &[], 0, 1, 100),
                (3, "Gone", "Gone", &[], 0, 0, 100),
            ],
            1,
        );
        let new = reader(
            &[
                (1, "", "root", &[2, 4], 2, 0, 100),
                (2, "Kept", "Kept", &[], 0, 2, 200),
                (4, "New", "New", &[], 0, 0, 100),
            ],
            1,
        );

        let diff = diff_hives(&old, &new).unwrap();

        assert_eq!(diff["Gone"].status, DiffStatus::Removed);
        assert_eq!(diff["New"].status, DiffStatus::Added);
        assert_eq!(diff["Kept"].status, DiffStatus::Modified);
        assert_eq!(diff[""].status, DiffStatus::Unchanged);
    }

    #[test]
    fn filter_respects_flags() {
        let old = reader(&[(1, "", "root", &[2], 1, 0, 0), (2, "A", "A", &[], 0, 0, 0)], 1);
        let new = reader(&[(1, "", "root", &[3], 1, 0, 0), (3, "B", "B", &[], 0, 0, 0)], 1);
        let diff = diff_hives(&old, &new).unwrap();

        let only_added = filter_diff_keys(&diff, true, false, false, false);
        assert!(only_added.iter().all(|kd| kd.status == DiffStatus::Added));
        assert_eq!(only_added.len(), 1);
    }
}
