//! The third-party dataset shown in the main table view.
//!
//! Each item carries a table row (`graphData`), a nested sub-table row
//! (`appData`) and a directory tree (`treeData`). The payload is not ours,
//! so every field is read leniently and shape drift degrades to blank cells
//! instead of an error.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::filter::{Age, FilterCriteria, apply_filters, lenient_text};
use crate::record::NOT_EXPANDABLE;

/// Top-level row of the dataset table
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphRow {
    pub key: Value,
    pub name: String,
    pub age: Age,
    pub address: String,
}

/// Row of the nested table shown when a dataset row is expanded
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppRow {
    pub field: String,
    pub income: String,
    pub profit: String,
}

impl AppRow {
    pub fn is_expandable(&self) -> bool {
        self.field != NOT_EXPANDABLE
    }
}

/// Node of the directory tree under a nested row.
///
/// `children` is always a list: a single child object is wrapped and a
/// missing value becomes empty. Any other node fields (icons, `isLeaf`,
/// and the like) are carried through untouched in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TreeNode {
    pub title: String,
    pub key: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let node = value.as_object().unwrap_or(&empty);

        let children = match node.get("children") {
            Some(Value::Array(items)) => items.iter().map(TreeNode::from_value).collect(),
            Some(child @ Value::Object(_)) => vec![TreeNode::from_value(child)],
            _ => Vec::new(),
        };

        let extra = node
            .iter()
            .filter(|(name, _)| !matches!(name.as_str(), "title" | "key" | "children"))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        TreeNode {
            title: lenient_text(node.get("title")),
            key: node.get("key").cloned().unwrap_or(Value::Null),
            extra,
            children,
        }
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// One element of the dataset payload
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatasetItem {
    pub graph: GraphRow,
    pub app: Option<AppRow>,
    pub tree: Option<TreeNode>,
}

impl DatasetItem {
    /// Read an item, defaulting every missing or malformed part
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let item = value.as_object().unwrap_or(&empty);

        let graph = match item.get("graphData").and_then(Value::as_object) {
            Some(graph) => GraphRow {
                key: graph.get("key").cloned().unwrap_or(Value::Null),
                name: lenient_text(graph.get("name")),
                age: Age::from_value(graph.get("age")),
                address: lenient_text(graph.get("address")),
            },
            None => GraphRow::default(),
        };

        let app = item
            .get("appData")
            .and_then(Value::as_object)
            .map(|app| AppRow {
                field: lenient_text(app.get("field")),
                income: lenient_text(app.get("income")),
                profit: lenient_text(app.get("profit")),
            });

        let tree = item
            .get("treeData")
            .filter(|tree| tree.is_object())
            .map(TreeNode::from_value);

        DatasetItem { graph, app, tree }
    }

    pub fn is_expandable(&self) -> bool {
        self.graph.name != NOT_EXPANDABLE
    }

    /// Rows of the nested table: the app row if present, else nothing
    pub fn app_rows(&self) -> Vec<AppRow> {
        self.app.iter().cloned().collect()
    }

    /// Roots of the directory tree shown under the nested row
    pub fn tree_roots(&self) -> Vec<TreeNode> {
        self.tree.iter().cloned().collect()
    }
}

/// The fetched dataset
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    items: Vec<DatasetItem>,
}

impl Dataset {
    /// Read a payload; anything other than an array is an empty dataset
    pub fn from_value(value: &Value) -> Self {
        let items = match value {
            Value::Array(items) => items.iter().map(DatasetItem::from_value).collect(),
            _ => Vec::new(),
        };
        Dataset { items }
    }

    /// Parse raw response bytes
    ///
    /// # Errors
    /// * Returns an error only when the bytes are not JSON at all
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Dataset::from_value(&value))
    }

    pub fn items(&self) -> &[DatasetItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item whose table row carries `key`, used when a row is expanded
    pub fn find_by_key(&self, key: &Value) -> Option<&DatasetItem> {
        self.items.iter().find(|item| &item.graph.key == key)
    }

    /// Items that pass every criterion
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<&DatasetItem> {
        apply_filters(&self.items, criteria)
    }
}
