use thiserror::Error;

/// Document-tree conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkdownError {
    /// The tree contains a node type the converter has no production for
    #[error("Invalid node type: {0}")]
    InvalidNodeType(String),

    /// A text run carries a mark the converter does not know
    #[error("Invalid mark type: {0}")]
    InvalidMarkType(String),

    /// A node is missing an attribute its production needs
    #[error("Node '{node}' is missing attribute '{attribute}'")]
    MissingAttribute { node: String, attribute: String },

    /// The serialized tree is not valid JSON for a document node
    #[error("Invalid document tree: {0}")]
    InvalidTree(String),
}

impl MarkdownError {
    pub fn error_code(&self) -> &'static str {
        match self {
            MarkdownError::InvalidNodeType(_) => "INVALID_NODE_TYPE",
            MarkdownError::InvalidMarkType(_) => "INVALID_MARK_TYPE",
            MarkdownError::MissingAttribute { .. } => "MISSING_ATTRIBUTE",
            MarkdownError::InvalidTree(_) => "INVALID_TREE",
        }
    }
}
