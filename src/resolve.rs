//! Path resolution over decoded node trees.

use crate::NodePath;
use crate::format::node::{find_child, sequence_size};
use crate::format::{Node, NodeType};

/// The target of a successful [`resolve`].
///
/// The root container has no header of its own, so it is represented by its
/// children alone; its size is computed on demand.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    /// The implicit root container.
    Root(&'a [Node]),
    /// A stored node.
    Node(&'a Node),
}

impl<'a> Resolved<'a> {
    /// Returns true for the root container.
    pub fn is_root(&self) -> bool {
        matches!(self, Resolved::Root(_))
    }

    /// Returns the stored node, or `None` for the root.
    pub fn as_node(&self) -> Option<&'a Node> {
        match self {
            Resolved::Root(_) => None,
            Resolved::Node(node) => Some(node),
        }
    }

    /// Returns the node kind; [`NodeType::Root`] for the root.
    pub fn node_type(&self) -> NodeType {
        match self {
            Resolved::Root(_) => NodeType::Root,
            Resolved::Node(node) => node.node_type,
        }
    }

    /// Returns true if the target can hold children.
    pub fn is_container(&self) -> bool {
        self.node_type().is_container()
    }

    /// Returns the node name; empty for the root.
    pub fn name(&self) -> &'a str {
        match self {
            Resolved::Root(_) => "",
            Resolved::Node(node) => &node.name,
        }
    }

    /// Returns the payload size.
    ///
    /// For the root this is the sum of the full sizes of its children, which
    /// is also the buffer length.
    pub fn size(&self) -> usize {
        match self {
            Resolved::Root(children) => sequence_size(children),
            Resolved::Node(node) => node.size as usize,
        }
    }

    /// Returns the absolute header position; `0` for the root.
    pub fn position(&self) -> usize {
        match self {
            Resolved::Root(_) => 0,
            Resolved::Node(node) => node.position,
        }
    }

    /// Returns the header length; `0` for the root.
    pub fn header_size(&self) -> usize {
        match self {
            Resolved::Root(_) => 0,
            Resolved::Node(node) => node.header_size(),
        }
    }

    /// Returns the decoded children.
    pub fn children(&self) -> &'a [Node] {
        match self {
            Resolved::Root(children) => children,
            Resolved::Node(node) => &node.children,
        }
    }

    /// Returns the offset just past the last child, where a new child is
    /// appended.
    pub fn child_end(&self) -> usize {
        self.position() + self.header_size() + self.size()
    }

    /// Finds a direct child by name.
    pub fn child(&self, name: &str) -> Option<&'a Node> {
        find_child(self.children(), name)
    }
}

/// Resolves `path` against a decoded tree.
///
/// Each segment is matched against the current level's siblings by linear
/// scan; the first match wins. Returns `None` when any segment is missing.
///
/// ```
/// use assetpack::{NodePath, NodeType, edit, format, resolve::resolve};
///
/// let mut buffer = Vec::new();
/// edit::insert(&mut buffer, "/", NodeType::Parent, "meshes", &[], &[] as &[&str]).unwrap();
/// let tree = format::decode(&buffer).unwrap();
///
/// let meshes = resolve(&tree, &NodePath::parse("/meshes").unwrap()).unwrap();
/// assert_eq!(meshes.node_type(), NodeType::Parent);
/// assert!(resolve(&tree, &NodePath::parse("/meshes/knight").unwrap()).is_none());
/// ```
pub fn resolve<'a>(tree: &'a [Node], path: &NodePath) -> Option<Resolved<'a>> {
    if path.is_root() {
        return Some(Resolved::Root(tree));
    }
    let segments: Vec<&str> = path.components().collect();
    descend(tree, &segments).map(Resolved::Node)
}

fn descend<'a>(siblings: &'a [Node], segments: &[&str]) -> Option<&'a Node> {
    let (first, rest) = segments.split_first()?;
    let node = find_child(siblings, first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        descend(&node.children, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{decode, encode_node};

    fn sample() -> Vec<u8> {
        let none: &[&str] = &[];
        let cube = encode_node(NodeType::MeshData, "cube", &[7; 10], none).unwrap();
        let mut buffer = encode_node(NodeType::Parent, "meshes", &cube, none).unwrap();
        buffer.extend(encode_node(NodeType::String, "notes", b"hi", none).unwrap());
        buffer
    }

    fn path(s: &str) -> NodePath {
        NodePath::parse(s).unwrap()
    }

    #[test]
    fn test_root_size_is_sum_of_children() {
        let buffer = sample();
        let tree = decode(&buffer).unwrap();
        let root = resolve(&tree, &path("/")).unwrap();
        assert!(root.is_root());
        assert_eq!(root.node_type(), NodeType::Root);
        assert_eq!(root.size(), buffer.len());
        assert_eq!(root.child_end(), buffer.len());
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn test_nested_lookup() {
        let buffer = sample();
        let tree = decode(&buffer).unwrap();
        let cube = resolve(&tree, &path("meshes/cube")).unwrap();
        assert_eq!(cube.node_type(), NodeType::MeshData);
        assert_eq!(cube.size(), 10);
        assert_eq!(cube.as_node().unwrap().payload(&buffer), &[7; 10]);

        let meshes = resolve(&tree, &path("/meshes/")).unwrap();
        assert_eq!(meshes.child_end(), cube.as_node().unwrap().end());
    }

    #[test]
    fn test_missing_segments() {
        let buffer = sample();
        let tree = decode(&buffer).unwrap();
        assert!(resolve(&tree, &path("/textures")).is_none());
        assert!(resolve(&tree, &path("/meshes/cube/deeper")).is_none());
        assert!(resolve(&tree, &path("/notes/x")).is_none());
    }

    #[test]
    fn test_empty_tree() {
        let root = resolve(&[], &path("")).unwrap();
        assert_eq!(root.size(), 0);
        assert!(resolve(&[], &path("a")).is_none());
    }
}
