//! Decoded node descriptors.

use std::ops::Range;

use super::{FIXED_HEADER_SIZE, NAME_OFFSET, NodeType};

/// A decoded node header plus its decoded children.
///
/// Descriptors are produced fresh by every decode and own their data, but
/// their `position` values describe the buffer *as it was decoded*. Any
/// mutation of the buffer makes previously decoded descriptors stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Node kind.
    pub node_type: NodeType,
    /// Payload length in bytes (children, for containers).
    pub size: u32,
    /// Absolute offset of the header's type byte.
    pub position: usize,
    /// Name, unique among siblings.
    pub name: String,
    /// Paths recorded in the header's dependency block.
    pub dependencies: Vec<String>,
    /// Decoded children; always empty for leaf kinds.
    pub children: Vec<Node>,
}

impl Node {
    /// Returns true if the node stores child nodes as payload.
    #[inline]
    pub fn is_container(&self) -> bool {
        self.node_type.is_container()
    }

    /// Returns the on-disk header length.
    ///
    /// `1 (type) + 1 (name_len) + name_len + 4 (size)` plus the dependency
    /// block, if the node has dependencies.
    pub fn header_size(&self) -> usize {
        FIXED_HEADER_SIZE + self.name.len() + dependency_block_size(&self.dependencies)
    }

    /// Returns the header length plus the payload length.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.header_size() + self.size as usize
    }

    /// Returns the absolute offset of the size field.
    #[inline]
    pub fn size_field_offset(&self) -> usize {
        self.position + NAME_OFFSET + self.name.len()
    }

    /// Returns the absolute offset of the first payload byte.
    #[inline]
    pub fn payload_start(&self) -> usize {
        self.position + self.header_size()
    }

    /// Returns the absolute offset just past this node, which is where the
    /// next sibling (or the end of the parent's children) begins.
    #[inline]
    pub fn end(&self) -> usize {
        self.position + self.total_size()
    }

    /// Returns the buffer range holding the payload.
    pub fn payload_range(&self) -> Range<usize> {
        self.payload_start()..self.end()
    }

    /// Returns the buffer range holding the whole node.
    pub fn byte_range(&self) -> Range<usize> {
        self.position..self.end()
    }

    /// Returns the payload bytes of this node within `buffer`.
    ///
    /// `buffer` must be the buffer this node was decoded from.
    pub fn payload<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.payload_range()]
    }

    /// Finds a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        find_child(&self.children, name)
    }

    /// Counts this node and all of its descendants.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Nesting levels spanned by this node and its descendants (a leaf is 1).
    pub fn height(&self) -> usize {
        1 + sequence_height(&self.children)
    }
}

/// Finds the first sibling named `name`.
pub(crate) fn find_child<'a>(siblings: &'a [Node], name: &str) -> Option<&'a Node> {
    siblings.iter().find(|n| n.name == name)
}

/// Byte length of a dependency block holding `dependencies`.
///
/// An empty list is not stored at all.
pub fn dependency_block_size<S: AsRef<str>>(dependencies: &[S]) -> usize {
    if dependencies.is_empty() {
        0
    } else {
        2 + dependencies
            .iter()
            .map(|d| 2 + d.as_ref().len())
            .sum::<usize>()
    }
}

/// Deepest nesting level below a sibling sequence (0 when empty).
pub fn sequence_height(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::height).max().unwrap_or(0)
}

/// Sum of the full byte lengths of `nodes`.
pub fn sequence_size(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::total_size).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, size: u32, position: usize, deps: &[&str]) -> Node {
        Node {
            node_type: NodeType::MeshData,
            size,
            position,
            name: name.to_string(),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_header_size_without_dependencies() {
        let node = leaf("cube", 100, 10, &[]);
        assert_eq!(node.header_size(), 1 + 1 + 4 + 4);
        assert_eq!(node.size_field_offset(), 16);
        assert_eq!(node.payload_start(), 20);
        assert_eq!(node.end(), 120);
    }

    #[test]
    fn test_header_size_with_dependencies() {
        let node = leaf("cube", 0, 0, &["/materials/stone", "x"]);
        let block = 2 + (2 + 16) + (2 + 1);
        assert_eq!(node.header_size(), 10 + block);
        assert_eq!(dependency_block_size::<&str>(&[]), 0);
    }

    #[test]
    fn test_count_and_child_lookup() {
        let mut parent = leaf("meshes", 0, 0, &[]);
        parent.node_type = NodeType::Parent;
        parent.children.push(leaf("a", 1, 12, &[]));
        parent.children.push(leaf("b", 1, 20, &[]));
        assert_eq!(parent.count(), 3);
        assert_eq!(parent.child("b").map(|n| n.position), Some(20));
        assert!(parent.child("c").is_none());
    }

    #[test]
    fn test_height() {
        let mut inner = leaf("inner", 0, 0, &[]);
        inner.node_type = NodeType::Parent;
        inner.children.push(leaf("x", 1, 0, &[]));
        let mut outer = leaf("outer", 0, 0, &[]);
        outer.node_type = NodeType::ModelTree;
        outer.children.push(leaf("y", 1, 0, &[]));
        outer.children.push(inner);

        assert_eq!(leaf("a", 0, 0, &[]).height(), 1);
        assert_eq!(outer.height(), 3);
        assert_eq!(sequence_height(&outer.children), 2);
        assert_eq!(sequence_height(&[]), 0);
    }
}
