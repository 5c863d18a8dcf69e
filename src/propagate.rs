//! Ancestor size bookkeeping.
//!
//! Every container stores the byte length of its children in its header.
//! When a structural edit grows or shrinks a subtree by `delta` bytes, every
//! container on the path from the root down to the edited node's parent must
//! change by exactly `delta`. The implicit root has no size field.
//!
//! Patching is split in two steps so mutators can validate the whole edit
//! before touching the buffer: [`plan_size_delta`] computes the new field
//! values (failing on 32-bit overflow or underflow) and
//! [`apply_size_patches`] writes them.

use std::collections::BTreeMap;

use crate::format::node::find_child;
use crate::format::reader::write_u32_le_at;
use crate::format::{Node, SIZE_FIELD_LEN};
use crate::{Error, NodePath, Result};

/// A pending overwrite of one container's size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePatch {
    /// Absolute offset of the size field.
    pub offset: usize,
    /// Value to store.
    pub value: u32,
}

/// Computes the size patches for every container along `path`.
///
/// The root path yields no patches.
///
/// # Errors
///
/// - [`Error::NodeNotFound`] if a segment of `path` does not exist
/// - [`Error::CorruptArchive`] if a size would drop below zero
/// - [`Error::ResourceLimitExceeded`] if a size would exceed `u32::MAX`
pub fn plan_size_delta(tree: &[Node], path: &NodePath, delta: i64) -> Result<Vec<SizePatch>> {
    plan_size_deltas(tree, &[(path, delta)])
}

/// Computes the combined size patches for several `(path, delta)` changes.
///
/// Containers shared by more than one path receive the net delta once, and
/// containers whose net delta is zero are left alone. This is what a move
/// needs: the common ancestors of source and destination do not change size.
pub fn plan_size_deltas(tree: &[Node], changes: &[(&NodePath, i64)]) -> Result<Vec<SizePatch>> {
    let mut fields: BTreeMap<usize, Field<'_>> = BTreeMap::new();
    for (path, delta) in changes {
        let segments: Vec<&str> = path.components().collect();
        collect(tree, &segments, path, *delta, &mut fields)?;
    }

    let mut patches = Vec::with_capacity(fields.len());
    for (offset, field) in fields {
        if field.delta == 0 {
            continue;
        }
        let node = field.node;
        let resized = i64::from(node.size) + field.delta;
        if resized < 0 {
            return Err(Error::corrupt(
                node.position,
                format!(
                    "size of '{}' would drop below zero ({} {:+})",
                    node.name, node.size, field.delta
                ),
            ));
        }
        let value = u32::try_from(resized).map_err(|_| {
            Error::ResourceLimitExceeded(format!(
                "container '{}' would grow to {} bytes, beyond the 32-bit size field",
                node.name, resized
            ))
        })?;
        patches.push(SizePatch { offset, value });
    }
    Ok(patches)
}

struct Field<'a> {
    node: &'a Node,
    delta: i64,
}

fn collect<'a>(
    siblings: &'a [Node],
    segments: &[&str],
    path: &NodePath,
    delta: i64,
    fields: &mut BTreeMap<usize, Field<'a>>,
) -> Result<()> {
    let Some((first, rest)) = segments.split_first() else {
        return Ok(());
    };
    let node = find_child(siblings, first).ok_or_else(|| Error::NodeNotFound {
        path: path.to_string(),
    })?;

    fields
        .entry(node.size_field_offset())
        .or_insert(Field { node, delta: 0 })
        .delta += delta;
    collect(&node.children, rest, path, delta, fields)
}

/// Writes planned patches into `buffer`.
///
/// All offsets are checked before the first write.
pub fn apply_size_patches(buffer: &mut [u8], patches: &[SizePatch]) -> Result<()> {
    if let Some(bad) = patches
        .iter()
        .find(|p| p.offset.saturating_add(SIZE_FIELD_LEN) > buffer.len())
    {
        return Err(Error::corrupt(
            bad.offset,
            "size field lies outside the buffer",
        ));
    }
    for patch in patches {
        log::trace!("size field at {:#x} <- {}", patch.offset, patch.value);
        write_u32_le_at(buffer, patch.offset, patch.value)?;
    }
    Ok(())
}

/// Adds `delta` to the size field of every container along `path`.
///
/// `tree` must have been decoded from `buffer` and the field positions must
/// still be valid, i.e. any splice that shifts them has not happened yet or
/// happened after them in the buffer.
pub fn propagate_size_delta(
    buffer: &mut [u8],
    tree: &[Node],
    path: &NodePath,
    delta: i64,
) -> Result<()> {
    let patches = plan_size_delta(tree, path, delta)?;
    apply_size_patches(buffer, &patches)
}
