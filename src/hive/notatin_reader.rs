//! Concrete `HiveReader` backed by the `notatin` Windows-registry-hive parser.
//!
//! `notatin` walks a hive eagerly and hands back fully-populated key nodes,
//! so the simplest safe-for-concurrent-reads shape is to index the whole
//! tree once at open time into a flat table keyed by [`NodeId`], then answer
//! every trait method from that table. This keeps background load tasks
//! lock-free after open (the table is immutable once built).

use std::collections::HashMap;
use std::path::Path;

use notatin::cell_key_node::CellKeyNode;
use notatin::cell_key_value::CellKeyValue;
use notatin::parser_builder::ParserBuilder;

use super::{HiveReader, KeyStat, NodeId, ValueId, ValueReadOptions, ValueStat};
use crate::error::{HiveExplorerError, Result};

struct KeyRecord {
    name: String,
    path: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    values: Vec<ValueRecord>,
    last_write: i64,
}

struct ValueRecord {
    name: String,
    value_type: String,
    bytes: Vec<u8>,
}

/// A hive reader that has parsed the whole key/value tree up front.
pub struct NotatinHiveReader {
    keys: Vec<KeyRecord>,
    root: NodeId,
}

fn id_for(index: usize) -> NodeId {
    // Index 0 is the root; NodeId 0 is reserved for "absent", so shift by one.
    NodeId(index as u64 + 1)
}

fn index_for(id: NodeId) -> Option<usize> {
    if id.is_absent() {
        None
    } else {
        Some((id.0 - 1) as usize)
    }
}

impl NotatinHiveReader {
    /// Open and fully index a hive file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HiveExplorerError::hive_not_found(path.to_path_buf()));
        }

        let mut parser = ParserBuilder::from_path(path)
            .build()
            .map_err(|e| HiveExplorerError::HiveParse(e.to_string()))?;

        let mut keys: Vec<KeyRecord> = Vec::new();
        let mut path_index: HashMap<String, NodeId> = HashMap::new();

        let root_node = parser
            .get_root_key_node()
            .map_err(|e| HiveExplorerError::HiveParse(e.to_string()))?
            .ok_or_else(|| HiveExplorerError::HiveParse("hive has no root key".into()))?;

        let root_id = Self::index_subtree(&mut parser, &root_node, None, &mut keys, &mut path_index);

        Ok(Self {
            keys,
            root: root_id,
        })
    }

    fn index_subtree(
        parser: &mut notatin::parser::Parser,
        node: &CellKeyNode,
        parent: Option<NodeId>,
        keys: &mut Vec<KeyRecord>,
        path_index: &mut HashMap<String, NodeId>,
    ) -> NodeId {
        let path = normalize_path(&node.path);
        let values = node
            .sub_values
            .iter()
            .map(ValueRecord::from)
            .collect();

        let id = id_for(keys.len());
        keys.push(KeyRecord {
            name: node.key_name.clone(),
            path: path.clone(),
            parent,
            children: Vec::new(),
            values,
            last_write: node
                .last_key_written_date_and_time
                .timestamp(),
        });
        path_index.insert(path, id);

        let mut node = node.clone();
        let child_nodes = node.read_sub_keys(parser);
        let mut child_ids = Vec::with_capacity(child_nodes.len());
        for child in &child_nodes {
            let child_id = Self::index_subtree(parser, child, Some(id), keys, path_index);
            child_ids.push(child_id);
        }

        if let Some(rec) = keys.get_mut(index_for(id).expect("just-inserted id")) {
            rec.children = child_ids;
        }

        id
    }

    fn record(&self, id: NodeId) -> Result<&KeyRecord> {
        index_for(id)
            .and_then(|i| self.keys.get(i))
            .ok_or_else(|| HiveExplorerError::key_not_found(id.to_string()))
    }
}

fn normalize_path(raw: &str) -> String {
    raw.trim_start_matches('\\').replace('/', "\\")
}

impl From<&CellKeyValue> for ValueRecord {
    fn from(v: &CellKeyValue) -> Self {
        ValueRecord {
            name: v.value_name.clone(),
            value_type: format!("{:?}", v.data_type),
            bytes: v.value_bytes(),
        }
    }
}

impl HiveReader for NotatinHiveReader {
    fn root(&self) -> NodeId {
        self.root
    }

    fn find(&self, path: &str) -> Result<NodeId> {
        let normalized = normalize_path(path);
        self.keys
            .iter()
            .enumerate()
            .find(|(_, rec)| rec.path == normalized)
            .map(|(i, _)| id_for(i))
            .ok_or_else(|| HiveExplorerError::key_not_found(path))
    }

    fn stat_key(&self, id: NodeId) -> Result<KeyStat> {
        let rec = self.record(id)?;
        Ok(KeyStat {
            name: rec.name.clone(),
            subkey_count: rec.children.len() as u32,
            value_count: rec.values.len() as u32,
            last_write: rec.last_write,
        })
    }

    fn subkeys(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.record(id)?.children.clone())
    }

    fn path_of(&self, id: NodeId) -> Result<String> {
        Ok(self.record(id)?.path.clone())
    }

    fn values(&self, id: NodeId) -> Result<Vec<ValueId>> {
        let rec = self.record(id)?;
        Ok((0..rec.values.len())
            .map(|i| ValueId(((id.0) << 32) | i as u64))
            .collect())
    }

    fn stat_value(&self, id: ValueId) -> Result<ValueStat> {
        let (key_id, idx) = split_value_id(id);
        let rec = self.record(key_id)?;
        let v = rec
            .values
            .get(idx)
            .ok_or_else(|| HiveExplorerError::key_not_found(format!("value#{}", idx)))?;
        Ok(ValueStat {
            name: v.name.clone(),
            value_type: v.value_type.clone(),
        })
    }

    fn value_bytes(&self, id: ValueId, _opts: ValueReadOptions) -> Result<Vec<u8>> {
        let (key_id, idx) = split_value_id(id);
        let rec = self.record(key_id)?;
        let v = rec
            .values
            .get(idx)
            .ok_or_else(|| HiveExplorerError::key_not_found(format!("value#{}", idx)))?;
        Ok(v.bytes.clone())
    }
}

fn split_value_id(id: ValueId) -> (NodeId, usize) {
    (NodeId(id.0 >> 32), (id.0 & 0xFFFF_FFFF) as usize)
}
