//! Hive reader interface.
//!
//! The hive file reader is an external collaborator: it opens a hive and
//! answers queries about nodes, subkeys, values, and metadata. This module
//! defines the interface the rest of the core consumes and is deliberately
//! thin — parsing the on-disk hive format is not the core's concern.

mod diff;
mod notatin_reader;

pub use diff::{diff_hives, filter_diff_keys, DiffStatus, KeyDiff};
pub use notatin_reader::NotatinHiveReader;

use crate::error::Result;
use std::fmt;

/// Opaque identifier assigned by the reader to a key node.
///
/// `0` is reserved for "absent" (used in diff mode for the side of a key
/// that was Added or Removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    /// The reserved "absent" id.
    pub const ABSENT: NodeId = NodeId(0);

    /// True if this id represents an absent node.
    pub fn is_absent(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier for a value attached to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub u64);

/// Key-level metadata returned by `StatKey`.
#[derive(Debug, Clone)]
pub struct KeyStat {
    /// Leaf name of the key.
    pub name: String,
    /// Number of direct subkeys.
    pub subkey_count: u32,
    /// Number of values attached to the key.
    pub value_count: u32,
    /// Last-write timestamp, Unix seconds. Zero means unknown/unset.
    pub last_write: i64,
}

/// Value-level metadata returned by `StatValue`.
#[derive(Debug, Clone)]
pub struct ValueStat {
    /// Value name (may be empty for the key's "default" value).
    pub name: String,
    /// Registry value type, e.g. `REG_SZ`, `REG_DWORD`.
    pub value_type: String,
}

/// Options controlling how value bytes are fetched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueReadOptions {
    /// If true, the returned bytes are an owned copy safe to use after the
    /// reader is dropped. If false, implementations may return a reference
    /// into reader-owned storage (not expressible across the trait object
    /// boundary here, so this flag is honored as a hint only).
    pub copy_data: bool,
}

/// The external hive-reading interface the core consumes.
///
/// Implementations must be safe to use concurrently from multiple
/// background threads: the core opens one reader per hive and shares it
/// (via `Arc`) across fire-and-forget load tasks.
pub trait HiveReader: Send + Sync {
    /// Identifier of the hive's root key.
    fn root(&self) -> NodeId;

    /// Resolve a backslash-separated path to a node id.
    fn find(&self, path: &str) -> Result<NodeId>;

    /// Key-level metadata for a node.
    fn stat_key(&self, id: NodeId) -> Result<KeyStat>;

    /// Direct subkeys of a node, in reader-native order (callers sort).
    fn subkeys(&self, id: NodeId) -> Result<Vec<NodeId>>;

    /// Path of a node, backslash-separated, relative to the hive root.
    fn path_of(&self, id: NodeId) -> Result<String>;

    /// Values attached to a node.
    fn values(&self, id: NodeId) -> Result<Vec<ValueId>>;

    /// Value-level metadata.
    fn stat_value(&self, id: ValueId) -> Result<ValueStat>;

    /// Raw bytes of a value, formatted for display by the caller.
    fn value_bytes(&self, id: ValueId, opts: ValueReadOptions) -> Result<Vec<u8>>;
}

/// Open a hive file and return a reader over it.
pub fn open(path: &std::path::Path) -> Result<NotatinHiveReader> {
    NotatinHiveReader::open(path)
}
