//! Rich-document tree to Markdown.
//!
//! Data templates arrive as editor JSON (`{"type": "doc", "content": [...]}`).
//! [`to_markdown`] walks the tree once and maps every node and mark to a fixed
//! Markdown production. Unknown node or mark types are errors, never dropped.
//!
//! ```rust
//! use galley::markdown::to_markdown;
//! use serde_json::json;
//!
//! let tree = json!({
//!     "type": "doc",
//!     "content": [{
//!         "type": "paragraph",
//!         "content": [
//!             { "type": "text", "text": "Hello" },
//!             { "type": "text", "text": "World", "marks": [{ "type": "bold" }] }
//!         ]
//!     }]
//! });
//! assert_eq!(to_markdown(&tree).unwrap(), "Hello**World**");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{MarkdownError, MarkdownResult};

mod render;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub attrs: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub attrs: Value,
}

impl Node {
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name).filter(|value| !value.is_null())
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(Value::as_str)
    }

    pub fn to_markdown(&self) -> MarkdownResult<String> {
        render::node(self)
    }
}

impl Mark {
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(Value::as_str)
    }
}

/// Parse serialized tree bytes, keeping the raw JSON for storage.
pub fn parse_tree(bytes: &[u8]) -> MarkdownResult<Value> {
    serde_json::from_slice(bytes).map_err(|e| MarkdownError::InvalidTree(e.to_string()))
}

pub fn to_markdown(tree: &Value) -> MarkdownResult<String> {
    let node: Node = serde_json::from_value(tree.clone())
        .map_err(|e| MarkdownError::InvalidTree(e.to_string()))?;
    node.to_markdown()
}
