//! Folder/file tree built from flat object listings
//!
//! Object keys are split on `/` and folded into nested [`TreeNode`]s. Each node is
//! keyed by its cumulative path, so keys sharing a prefix share the same folder
//! node. Sibling order is the order in which paths were first seen.

use crate::url::public_url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One object as returned by a listing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectRecord {
    pub key: String,
    pub size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(rename = "ETag")]
    pub etag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl ObjectRecord {
    /// Record with only a key, the rest left empty
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: 0,
            last_modified: None,
            etag: String::new(),
            storage_class: None,
        }
    }
}

/// A listing record paired with its public URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub record: ObjectRecord,
    pub url: String,
}

impl CatalogEntry {
    /// Derive the public URL of `record` under `public_base`
    pub fn new(record: ObjectRecord, public_base: &str) -> Self {
        let url = public_url(public_base, &record.key);
        Self { record, url }
    }

    pub fn key(&self) -> &str {
        &self.record.key
    }
}

/// One path segment of the tree
///
/// A node is either a file (`details` set) or a folder (`children` set), never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CatalogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    pub fn is_file(&self) -> bool {
        self.details.is_some()
    }

    pub fn is_folder(&self) -> bool {
        self.children.is_some()
    }

    /// Number of file nodes in this subtree, including this node
    pub fn file_count(&self) -> usize {
        let own = usize::from(self.is_file());
        own + self
            .children
            .iter()
            .flatten()
            .map(TreeNode::file_count)
            .sum::<usize>()
    }
}

#[derive(Debug)]
struct Slot {
    key: String,
    details: Option<CatalogEntry>,
    children: Option<Vec<usize>>,
}

/// Incremental tree builder
///
/// Nodes live in a flat arena indexed by cumulative path until [`TreeBuilder::finish`]
/// assembles them into owned [`TreeNode`]s.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
    shadowed: Vec<String>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one entry into the tree
    pub fn insert(&mut self, entry: CatalogEntry) {
        let key = entry.key().to_string();
        let segment_count = key.split('/').count();
        let mut parent: Option<usize> = None;
        let mut current_path = String::with_capacity(key.len());
        let mut entry = Some(entry);

        for (position, segment) in key.split('/').enumerate() {
            if position > 0 {
                current_path.push('/');
            }
            current_path.push_str(segment);

            let id = self.node_for(&current_path, parent);
            let slot = &mut self.slots[id];

            if position + 1 == segment_count {
                if slot.children.is_some() {
                    // A folder already lives at this path
                    self.shadowed.push(key.clone());
                } else {
                    slot.details = entry.take();
                }
            } else {
                if slot.details.take().is_some() {
                    self.shadowed.push(slot.key.clone());
                }
                slot.children.get_or_insert_with(Vec::new);
                parent = Some(id);
            }
        }
    }

    /// Assemble the root-level nodes
    pub fn finish(self) -> Vec<TreeNode> {
        let (roots, _) = self.finish_with_shadowed();
        roots
    }

    /// Assemble the root-level nodes and return the shadowed keys alongside
    pub fn finish_with_shadowed(self) -> (Vec<TreeNode>, Vec<String>) {
        let mut slots: Vec<Option<Slot>> = self.slots.into_iter().map(Some).collect();
        let roots = self
            .roots
            .iter()
            .filter_map(|&id| assemble(&mut slots, id))
            .collect();
        (roots, self.shadowed)
    }

    fn node_for(&mut self, path: &str, parent: Option<usize>) -> usize {
        if let Some(&id) = self.index.get(path) {
            return id;
        }

        let id = self.slots.len();
        self.slots.push(Slot {
            key: path.to_string(),
            details: None,
            children: None,
        });
        self.index.insert(path.to_string(), id);

        match parent {
            Some(parent) => self.slots[parent]
                .children
                .get_or_insert_with(Vec::new)
                .push(id),
            None => self.roots.push(id),
        }

        id
    }
}

fn assemble(slots: &mut [Option<Slot>], id: usize) -> Option<TreeNode> {
    let slot = slots.get_mut(id)?.take()?;
    let children = slot.children.map(|ids| {
        ids.into_iter()
            .filter_map(|child| assemble(slots, child))
            .collect()
    });

    Some(TreeNode {
        key: slot.key,
        details: slot.details,
        children,
    })
}

/// Build the folder/file tree for a sequence of entries
pub fn build_tree<I>(entries: I) -> Vec<TreeNode>
where
    I: IntoIterator<Item = CatalogEntry>,
{
    let mut builder = TreeBuilder::new();
    for entry in entries {
        builder.insert(entry);
    }
    builder.finish()
}
