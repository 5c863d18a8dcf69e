//! Pack modification operations.

use crate::format::{DecodeLimits, Node, NodeType};
use crate::{NodePath, Result};

use super::mutators;

/// A pending modification of a pack buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Append a new node to a container.
    Insert {
        /// Container receiving the node.
        container: NodePath,
        /// Kind of the new node.
        node_type: NodeType,
        /// Name of the new node.
        name: String,
        /// Payload bytes.
        payload: Vec<u8>,
        /// Dependency paths recorded in the header.
        dependencies: Vec<String>,
    },
    /// Remove a node and its subtree.
    Remove {
        /// Path to remove.
        path: NodePath,
    },
    /// Rename a node in place.
    Rename {
        /// Path of the node.
        path: NodePath,
        /// New name.
        new_name: String,
    },
    /// Change a node's kind.
    Retype {
        /// Path of the node.
        path: NodePath,
        /// New kind.
        node_type: NodeType,
    },
    /// Move a node into another container.
    Move {
        /// Node to move.
        source: NodePath,
        /// Destination container.
        dest: NodePath,
    },
}

impl Operation {
    /// Returns the path this operation acts on.
    ///
    /// For inserts this is the container, for moves the source node.
    pub fn target_path(&self) -> &NodePath {
        match self {
            Operation::Insert { container, .. } => container,
            Operation::Remove { path } => path,
            Operation::Rename { path, .. } => path,
            Operation::Retype { path, .. } => path,
            Operation::Move { source, .. } => source,
        }
    }

    /// Returns the destination container for inserts and moves.
    pub fn destination(&self) -> Option<&NodePath> {
        match self {
            Operation::Insert { container, .. } => Some(container),
            Operation::Move { dest, .. } => Some(dest),
            _ => None,
        }
    }

    /// Returns whether the operation only rewrites header bytes and never
    /// relocates a subtree.
    pub fn is_header_only(&self) -> bool {
        matches!(self, Operation::Rename { .. } | Operation::Retype { .. })
    }

    /// Returns the operation type as a string.
    pub fn operation_type(&self) -> &'static str {
        match self {
            Operation::Insert { .. } => "insert",
            Operation::Remove { .. } => "remove",
            Operation::Rename { .. } => "rename",
            Operation::Retype { .. } => "retype",
            Operation::Move { .. } => "move",
        }
    }

    /// Applies the operation to `buffer`, whose decoded form is `tree`.
    ///
    /// Returns `Ok(false)` when the edit is structurally refused; the buffer
    /// is then unchanged.
    pub(crate) fn apply_in(
        &self,
        buffer: &mut Vec<u8>,
        tree: &[Node],
        limits: &DecodeLimits,
    ) -> Result<bool> {
        match self {
            Operation::Insert {
                container,
                node_type,
                name,
                payload,
                dependencies,
            } => mutators::insert_in(
                buffer,
                tree,
                container,
                *node_type,
                name,
                payload,
                dependencies,
                limits,
            ),
            Operation::Remove { path } => mutators::remove_in(buffer, tree, path),
            Operation::Rename { path, new_name } => {
                mutators::rename_in(buffer, tree, path, new_name)
            }
            Operation::Retype { path, node_type } => {
                mutators::retype_in(buffer, tree, path, *node_type, limits)
            }
            Operation::Move { source, dest } => {
                mutators::move_in(buffer, tree, source, dest, limits)
            }
        }
    }
}

/// Builder for creating operations fluently.
#[derive(Debug, Default)]
pub struct OperationBuilder {
    operations: Vec<Operation>,
}

impl OperationBuilder {
    /// Creates a new operation builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an insert operation.
    pub fn insert(
        mut self,
        container: NodePath,
        node_type: NodeType,
        name: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        self.operations.push(Operation::Insert {
            container,
            node_type,
            name: name.into(),
            payload: payload.into(),
            dependencies: Vec::new(),
        });
        self
    }

    /// Adds an insert operation that records dependency paths.
    pub fn insert_with_dependencies<I, S>(
        mut self,
        container: NodePath,
        node_type: NodeType,
        name: impl Into<String>,
        payload: impl Into<Vec<u8>>,
        dependencies: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operations.push(Operation::Insert {
            container,
            node_type,
            name: name.into(),
            payload: payload.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds a remove operation.
    pub fn remove(mut self, path: NodePath) -> Self {
        self.operations.push(Operation::Remove { path });
        self
    }

    /// Adds a rename operation.
    pub fn rename(mut self, path: NodePath, new_name: impl Into<String>) -> Self {
        self.operations.push(Operation::Rename {
            path,
            new_name: new_name.into(),
        });
        self
    }

    /// Adds a retype operation.
    pub fn retype(mut self, path: NodePath, node_type: NodeType) -> Self {
        self.operations.push(Operation::Retype { path, node_type });
        self
    }

    /// Adds a move operation.
    pub fn move_node(mut self, source: NodePath, dest: NodePath) -> Self {
        self.operations.push(Operation::Move { source, dest });
        self
    }

    /// Builds the list of operations.
    pub fn build(self) -> Vec<Operation> {
        self.operations
    }
}
