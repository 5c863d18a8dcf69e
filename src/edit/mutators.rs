//! Structural edits over an already decoded tree.
//!
//! Every function here validates the complete edit (including the ancestor
//! size patches) before writing the first byte, so a rejected or failed call
//! leaves the buffer unchanged. Size patches are written in the coordinates
//! of the decoded tree, before any splice moves bytes around.

use crate::format::node::sequence_height;
use crate::format::{
    DEPENDENCY_FLAG, DecodeLimits, NAME_LEN_OFFSET, NAME_OFFSET, Node, NodeType, decode_range,
    decode_with_limits, encode_node,
};
use crate::node_path::validate_name;
use crate::propagate::{apply_size_patches, plan_size_delta, plan_size_deltas};
use crate::resolve::{Resolved, resolve};
use crate::{Error, NodePath, Result};

/// Logs why an edit was refused and reports it as a rejection.
macro_rules! reject {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
        return Ok(false);
    }};
}

fn insert_bytes(buffer: &mut Vec<u8>, at: usize, bytes: &[u8]) {
    log::trace!("splice {} bytes at {:#x}", bytes.len(), at);
    buffer.splice(at..at, bytes.iter().copied());
}

fn erase_bytes(buffer: &mut Vec<u8>, range: std::ops::Range<usize>) {
    log::trace!("erase {:#x}..{:#x}", range.start, range.end);
    buffer.drain(range);
}

// Buffer lengths are bounded by `isize::MAX`, so they always fit.
fn signed(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

fn node_count(tree: &[Node]) -> usize {
    tree.iter().map(Node::count).sum()
}

/// Whether `height` levels placed below a node at `parent_depth` would nest
/// deeper than the limits allow. The root is at depth 0.
fn too_deep(parent_depth: usize, height: usize, limits: &DecodeLimits) -> bool {
    parent_depth.saturating_add(height) > limits.max_depth
}

fn too_many(tree: &[Node], added: usize, limits: &DecodeLimits) -> bool {
    node_count(tree).saturating_add(added) > limits.max_nodes
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn insert_in<S: AsRef<str>>(
    buffer: &mut Vec<u8>,
    tree: &[Node],
    container: &NodePath,
    node_type: NodeType,
    name: &str,
    payload: &[u8],
    dependencies: &[S],
    limits: &DecodeLimits,
) -> Result<bool> {
    let bytes = encode_node(node_type, name, payload, dependencies)?;
    let children = if node_type.is_container() && !payload.is_empty() {
        decode_with_limits(payload, limits)?
    } else {
        Vec::new()
    };

    let Some(target) = resolve(tree, container) else {
        reject!("insert '{}': container {} does not exist", name, container);
    };
    if !target.is_container() {
        reject!(
            "insert '{}': {} is a {}, not a container",
            name,
            container,
            target.node_type()
        );
    }
    if target.child(name).is_some() {
        reject!("insert '{}': {} already has a child of that name", name, container);
    }
    if too_deep(container.depth(), 1 + sequence_height(&children), limits) {
        reject!(
            "insert '{}': nesting under {} would exceed depth {}",
            name,
            container,
            limits.max_depth
        );
    }
    if too_many(tree, 1 + node_count(&children), limits) {
        reject!("insert '{}': pack would exceed {} nodes", name, limits.max_nodes);
    }

    let at = target.child_end();
    let patches = plan_size_delta(tree, container, signed(bytes.len()))?;
    apply_size_patches(buffer, &patches)?;
    insert_bytes(buffer, at, &bytes);
    Ok(true)
}

pub(crate) fn remove_in(buffer: &mut Vec<u8>, tree: &[Node], path: &NodePath) -> Result<bool> {
    let Some(parent) = path.parent() else {
        log::trace!("remove /: clearing {} bytes", buffer.len());
        buffer.clear();
        return Ok(true);
    };
    let Some(node) = resolve(tree, path).and_then(|r| r.as_node()) else {
        reject!("remove: {} does not exist", path);
    };

    let patches = plan_size_delta(tree, &parent, -signed(node.total_size()))?;
    apply_size_patches(buffer, &patches)?;
    erase_bytes(buffer, node.byte_range());
    Ok(true)
}

pub(crate) fn rename_in(
    buffer: &mut Vec<u8>,
    tree: &[Node],
    path: &NodePath,
    new_name: &str,
) -> Result<bool> {
    validate_name(new_name)?;

    let Some(parent) = path.parent() else {
        reject!("rename: the root has no name");
    };
    let Some(node) = resolve(tree, path).and_then(|r| r.as_node()) else {
        reject!("rename: {} does not exist", path);
    };
    if node.name == new_name {
        reject!("rename: {} already has that name", path);
    }
    let siblings = resolve(tree, &parent).map_or(&[][..], |r| r.children());
    if siblings.iter().any(|s| s.name == new_name) {
        reject!("rename {}: sibling '{}' already exists", path, new_name);
    }

    let delta = signed(new_name.len()) - signed(node.name.len());
    let patches = plan_size_delta(tree, &parent, delta)?;
    apply_size_patches(buffer, &patches)?;

    let name_start = node.position + NAME_OFFSET;
    buffer[node.position + NAME_LEN_OFFSET] = new_name.len() as u8;
    buffer.splice(
        name_start..name_start + node.name.len(),
        new_name.bytes(),
    );
    Ok(true)
}

pub(crate) fn retype_in(
    buffer: &mut [u8],
    tree: &[Node],
    path: &NodePath,
    new_type: NodeType,
    limits: &DecodeLimits,
) -> Result<bool> {
    new_type.ensure_storable()?;

    let Some(node) = resolve(tree, path).and_then(|r| r.as_node()) else {
        reject!("retype: {} is the root or does not exist", path);
    };

    if new_type.is_container() && !node.is_container() && node.size > 0 {
        // The payload's top-level nodes become children at the node's depth + 1.
        let nested = DecodeLimits {
            max_depth: limits.max_depth.saturating_sub(path.depth()),
            ..limits.clone()
        };
        let start = node.payload_start();
        let children = match decode_range(buffer, start, node.size as usize, &nested) {
            Ok(children) => children,
            Err(e) => reject!(
                "retype {} to {}: payload is not a node sequence ({})",
                path,
                new_type,
                e
            ),
        };
        if too_many(tree, node_count(&children), limits) {
            reject!("retype {}: pack would exceed {} nodes", path, limits.max_nodes);
        }
    }

    let tag = &mut buffer[node.position];
    *tag = (*tag & DEPENDENCY_FLAG) | new_type.tag();
    Ok(true)
}

pub(crate) fn move_in(
    buffer: &mut Vec<u8>,
    tree: &[Node],
    source: &NodePath,
    dest: &NodePath,
    limits: &DecodeLimits,
) -> Result<bool> {
    let Some(source_parent) = source.parent() else {
        reject!("move: the root cannot be moved");
    };
    if source == dest {
        reject!("move {}: source and destination are the same", source);
    }
    if dest.starts_with(source) {
        reject!("move {} into its own subtree {}", source, dest);
    }
    let Some(target) = resolve(tree, dest).filter(Resolved::is_container) else {
        reject!("move {}: {} is not an existing container", source, dest);
    };
    if source_parent == *dest {
        reject!("move {}: already inside {}", source, dest);
    }
    let Some(node) = resolve(tree, source).and_then(|r| r.as_node()) else {
        reject!("move: {} does not exist", source);
    };
    if target.child(&node.name).is_some() {
        reject!("move {}: {} already has a child named '{}'", source, dest, node.name);
    }
    if too_deep(dest.depth(), node.height(), limits) {
        reject!(
            "move {} into {}: nesting would exceed depth {}",
            source,
            dest,
            limits.max_depth
        );
    }

    let copy_size = signed(node.total_size());
    let range = node.byte_range();
    let insert_at = target.child_end();
    if insert_at > range.start && insert_at < range.end {
        return Err(Error::corrupt(
            insert_at,
            format!("destination {} ends inside {}", dest, source),
        ));
    }

    let patches = plan_size_deltas(tree, &[(dest, copy_size), (&source_parent, -copy_size)])?;
    let staged = buffer[range.clone()].to_vec();
    apply_size_patches(buffer, &patches)?;

    if insert_at >= range.end {
        insert_bytes(buffer, insert_at, &staged);
        erase_bytes(buffer, range);
    } else {
        erase_bytes(buffer, range);
        insert_bytes(buffer, insert_at, &staged);
    }
    Ok(true)
}

pub(crate) fn type_of(tree: &[Node], path: &NodePath) -> NodeType {
    resolve(tree, path).map_or(NodeType::Undefined, |r| r.node_type())
}
