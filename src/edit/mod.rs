//! In-place structural editing of pack buffers.
//!
//! This module provides the mutators that change a pack buffer:
//! - [`insert`] a new node at the end of a container
//! - [`remove`] a node and its subtree
//! - [`rename`] a node, shifting everything after its name
//! - [`retype`] a node by overwriting its type byte
//! - [`move_node`] a subtree into another container
//!
//! Each call decodes the current buffer, resolves its targets, performs the
//! byte-level edit and patches the size field of every affected container.
//! Nothing is cached between calls; use [`PackArchive`] for a cached view.
//!
//! # Rejections
//!
//! Mutators return `Ok(true)` when the edit was applied and `Ok(false)` when
//! it was refused (missing target, illegal destination, duplicate name). A
//! refused or failed call leaves the buffer byte-for-byte unchanged.
//!
//! Edits that would leave the buffer undecodable under the default
//! [`DecodeLimits`] are refused as well, so every buffer produced here stays
//! editable. [`PackArchive`] and [`ArchiveEditor`] accept custom limits.
//!
//! # Example
//!
//! ```rust
//! use assetpack::{NodeType, edit};
//!
//! let none: &[&str] = &[];
//! let mut buffer = Vec::new();
//! assert!(edit::insert(&mut buffer, "/", NodeType::Parent, "a", &[], none)?);
//! assert!(edit::insert(&mut buffer, "/", NodeType::Parent, "b", &[], none)?);
//! assert!(edit::insert(&mut buffer, "/a", NodeType::MeshData, "x", &[1, 2, 3], none)?);
//!
//! assert!(edit::move_node(&mut buffer, "/a/x", "/b")?);
//! assert_eq!(edit::get_type(&buffer, "/b/x")?, NodeType::MeshData);
//! assert_eq!(edit::get_type(&buffer, "/a/x")?, NodeType::Undefined);
//!
//! // Moving a container into its own subtree is refused.
//! assert!(!edit::move_node(&mut buffer, "/b", "/b/x")?);
//! # Ok::<(), assetpack::Error>(())
//! ```
//!
//! [`PackArchive`]: crate::PackArchive

mod editor;
pub(crate) mod mutators;
mod operation;

pub use editor::{ArchiveEditor, EditResult};
pub use operation::{Operation, OperationBuilder};

use crate::format::{DecodeLimits, NodeType, decode};
use crate::{NodePath, Result};

/// Inserts a new node as the last child of `container_path`.
///
/// Refused when the container does not exist, is a leaf, already has a
/// child called `name`, or when the new node would nest deeper or push the
/// node count past the default [`DecodeLimits`]. A container `node_type` may
/// carry a non-empty `payload` only if it is itself a well-formed node
/// sequence.
///
/// # Errors
///
/// Returns an error for an invalid path, name, type or dependency list, a
/// payload beyond 4 GiB, or a corrupt buffer.
pub fn insert<S: AsRef<str>>(
    buffer: &mut Vec<u8>,
    container_path: &str,
    node_type: NodeType,
    name: &str,
    payload: &[u8],
    dependencies: &[S],
) -> Result<bool> {
    let container = NodePath::parse(container_path)?;
    let tree = decode(buffer)?;
    mutators::insert_in(
        buffer,
        &tree,
        &container,
        node_type,
        name,
        payload,
        dependencies,
        &DecodeLimits::default(),
    )
}

/// Removes the node at `path` together with its subtree.
///
/// Removing the root clears the whole buffer. Refused when the node does not
/// exist.
pub fn remove(buffer: &mut Vec<u8>, path: &str) -> Result<bool> {
    let path = NodePath::parse(path)?;
    let tree = decode(buffer)?;
    mutators::remove_in(buffer, &tree, &path)
}

/// Renames the node at `path`.
///
/// Refused for the root, a missing node, an unchanged name, or a name
/// already used by a sibling.
pub fn rename(buffer: &mut Vec<u8>, path: &str, new_name: &str) -> Result<bool> {
    let path = NodePath::parse(path)?;
    let tree = decode(buffer)?;
    mutators::rename_in(buffer, &tree, &path, new_name)
}

/// Changes the kind of the node at `path` without changing its bytes.
///
/// Refused for the root, a missing node, or a leaf with a payload that is
/// not a valid node sequence (within the depth left below the node) being
/// turned into a container.
pub fn retype(buffer: &mut Vec<u8>, path: &str, new_type: NodeType) -> Result<bool> {
    let path = NodePath::parse(path)?;
    let tree = decode(buffer)?;
    mutators::retype_in(buffer, &tree, &path, new_type, &DecodeLimits::default())
}

/// Moves the node at `source_path` to the end of container `dest_path`.
///
/// Refused when the source is the root or missing, the destination is the
/// source itself, lies inside the source, is not a container, is already the
/// source's parent, or already has a child with the source's name. Also
/// refused when the moved subtree would nest deeper than the default
/// [`DecodeLimits`] allow.
pub fn move_node(buffer: &mut Vec<u8>, source_path: &str, dest_path: &str) -> Result<bool> {
    let source = NodePath::parse(source_path)?;
    let dest = NodePath::parse(dest_path)?;
    let tree = decode(buffer)?;
    mutators::move_in(buffer, &tree, &source, &dest, &DecodeLimits::default())
}

/// Returns the kind of the node at `path`.
///
/// The root reports [`NodeType::Root`]; a missing node reports
/// [`NodeType::Undefined`].
pub fn get_type(buffer: &[u8], path: &str) -> Result<NodeType> {
    let path = NodePath::parse(path)?;
    let tree = decode(buffer)?;
    Ok(mutators::type_of(&tree, &path))
}
