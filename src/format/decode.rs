//! Decoding of node sequences into descriptor trees.

use std::collections::HashSet;

use super::reader::SliceReader;
use super::{DEPENDENCY_FLAG, Node, NodeType};
use crate::node_path::validate_name;
use crate::{Error, Result};

/// Resource limits enforced while decoding.
///
/// The format itself puts no bound on nesting, so an adversarial buffer of
/// a few kilobytes can describe thousands of nested containers. The limits
/// keep decoding bounded in stack depth and memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum container nesting depth (top-level nodes are depth 1).
    pub max_depth: usize,
    /// Maximum total number of nodes.
    pub max_nodes: usize,
}

impl Default for DecodeLimits {
    /// Creates decode limits with the following default values:
    ///
    /// | Limit | Default Value |
    /// |-------|---------------|
    /// | `max_depth` | 64 |
    /// | `max_nodes` | 1,000,000 |
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 1_000_000,
        }
    }
}

impl DecodeLimits {
    /// Creates decode limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates decode limits with no restrictions.
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_nodes: usize::MAX,
        }
    }

    /// Sets the maximum nesting depth.
    pub fn max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    /// Sets the maximum node count.
    pub fn max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = max;
        self
    }
}

/// Decodes the whole buffer as the root's children, with default limits.
///
/// # Errors
///
/// Returns [`Error::CorruptArchive`] if the buffer is not a well-formed
/// node sequence.
pub fn decode(buffer: &[u8]) -> Result<Vec<Node>> {
    decode_with_limits(buffer, &DecodeLimits::default())
}

/// Decodes the whole buffer as the root's children.
pub fn decode_with_limits(buffer: &[u8], limits: &DecodeLimits) -> Result<Vec<Node>> {
    Decoder::new(buffer, limits).sequence(0, buffer.len(), 1)
}

/// Decodes `length` bytes starting at `position` as a sibling sequence.
///
/// `position == 0 && length == 0` on a non-empty buffer decodes the whole
/// buffer, so callers can pass the root's "unknown" extent.
pub fn decode_range(
    buffer: &[u8],
    position: usize,
    length: usize,
    limits: &DecodeLimits,
) -> Result<Vec<Node>> {
    if position == 0 && length == 0 && !buffer.is_empty() {
        return decode_with_limits(buffer, limits);
    }
    let end = position
        .checked_add(length)
        .ok_or_else(|| Error::corrupt(position, "range length overflows"))?;
    Decoder::new(buffer, limits).sequence(position, end, 1)
}

struct Decoder<'a> {
    data: &'a [u8],
    limits: &'a DecodeLimits,
    nodes: usize,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8], limits: &'a DecodeLimits) -> Self {
        Self {
            data,
            limits,
            nodes: 0,
        }
    }

    fn sequence(&mut self, start: usize, end: usize, depth: usize) -> Result<Vec<Node>> {
        let mut r = SliceReader::new(self.data, start, end)?;
        let mut siblings = Vec::new();
        let mut names = HashSet::new();

        while !r.is_empty() {
            let node = self.node(&mut r, depth)?;
            if !names.insert(node.name.clone()) {
                return Err(Error::corrupt(
                    node.position,
                    format!("duplicate sibling name '{}'", node.name),
                ));
            }
            siblings.push(node);
        }

        Ok(siblings)
    }

    fn node(&mut self, r: &mut SliceReader<'a>, depth: usize) -> Result<Node> {
        let position = r.position();

        if depth > self.limits.max_depth {
            return Err(Error::ResourceLimitExceeded(format!(
                "node nesting deeper than {} at offset {:#x}",
                self.limits.max_depth, position
            )));
        }
        self.nodes += 1;
        if self.nodes > self.limits.max_nodes {
            return Err(Error::ResourceLimitExceeded(format!(
                "more than {} nodes",
                self.limits.max_nodes
            )));
        }

        let tag = r.read_u8("type tag")?;
        let node_type = NodeType::from_tag(tag)
            .filter(|t| t.is_storable())
            .ok_or_else(|| Error::corrupt(position, format!("invalid type tag {:#x}", tag)))?;

        let name_len = r.read_u8("name length")? as usize;
        if name_len == 0 {
            return Err(Error::corrupt(position, "empty node name"));
        }
        let name = r.read_str(name_len, "node name")?.to_string();
        validate_name(&name).map_err(|e| Error::corrupt(position, e.to_string()))?;
        let size = r.read_u32_le("size field")?;

        let dependencies = if tag & DEPENDENCY_FLAG != 0 {
            self.dependencies(r)?
        } else {
            Vec::new()
        };

        let payload_start = r.position();
        if size as usize > r.remaining() {
            return Err(Error::corrupt(
                position,
                format!(
                    "'{}' declares {} payload bytes but only {} remain in its container",
                    name,
                    size,
                    r.remaining()
                ),
            ));
        }

        let children = if node_type.is_container() {
            self.sequence(payload_start, payload_start + size as usize, depth + 1)?
        } else {
            Vec::new()
        };
        r.skip(size as usize, "payload")?;

        Ok(Node {
            node_type,
            size,
            position,
            name,
            dependencies,
            children,
        })
    }

    fn dependencies(&mut self, r: &mut SliceReader<'a>) -> Result<Vec<String>> {
        let block_start = r.position();
        let count = r.read_u16_le("dependency count")?;
        if count == 0 {
            return Err(Error::corrupt(block_start, "empty dependency block"));
        }
        let mut dependencies = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = r.read_u16_le("dependency length")? as usize;
            dependencies.push(r.read_str(len, "dependency path")?.to_string());
        }
        Ok(dependencies)
    }
}
