//! Pack buffer format constants, node type tags, and the node codec.
//!
//! A pack buffer has no file header: the buffer is the concatenation of the
//! root container's children. Every node is stored as
//!
//! ```text
//! type:u8  name_len:u8  name:[u8; name_len]  size:u32 LE  [dependency block]  payload:[u8; size]
//! ```
//!
//! Bit 7 of the type byte marks the presence of a dependency block, which is
//! `count:u16 LE` followed by `count` entries of `len:u16 LE` + UTF-8 bytes.
//! The payload of a container kind is itself a sequence of complete nodes.

pub mod decode;
pub mod encode;
pub mod node;
pub mod reader;

pub use decode::{DecodeLimits, decode, decode_range, decode_with_limits};
pub use encode::{encode_dependency_block, encode_header, encode_node};
pub use node::Node;

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Offset of the type byte within a header.
pub const TYPE_OFFSET: usize = 0;

/// Offset of the name length byte within a header.
pub const NAME_LEN_OFFSET: usize = 1;

/// Offset of the first name byte within a header.
pub const NAME_OFFSET: usize = 2;

/// Width of the little-endian size field.
pub const SIZE_FIELD_LEN: usize = 4;

/// Header bytes that do not depend on the name or dependencies
/// (type, name length, size field).
pub const FIXED_HEADER_SIZE: usize = 2 + SIZE_FIELD_LEN;

/// Type-byte flag marking a header that carries a dependency block.
pub const DEPENDENCY_FLAG: u8 = 0x80;

/// Mask selecting the node kind from a type byte.
pub const TYPE_MASK: u8 = 0x7F;

/// Kind of a node.
///
/// `Undefined` and `Root` exist only in memory: the former reports a missing
/// node from [`get_type`](crate::edit::get_type), the latter tags the implicit
/// root container. Neither is ever written to a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum NodeType {
    /// No node.
    Undefined = 0,
    /// The implicit root container.
    Root = 1,
    /// Generic container.
    Parent = 2,
    /// UTF-8 text payload.
    String = 3,
    /// Opaque binary payload.
    BinaryData = 4,
    /// Skeleton hierarchy payload.
    BoneTree = 5,
    /// Encoded image file payload.
    ImageFile = 6,
    /// Mesh vertex/index payload.
    MeshData = 7,
    /// Material parameters payload.
    MaterialData = 8,
    /// Container grouping the parts of one imported model.
    ModelTree = 9,
}

impl NodeType {
    /// All node kinds, in tag order.
    pub const ALL: [NodeType; 10] = [
        NodeType::Undefined,
        NodeType::Root,
        NodeType::Parent,
        NodeType::String,
        NodeType::BinaryData,
        NodeType::BoneTree,
        NodeType::ImageFile,
        NodeType::MeshData,
        NodeType::MaterialData,
        NodeType::ModelTree,
    ];

    /// Returns the kind for a raw tag, ignoring the dependency flag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get((tag & TYPE_MASK) as usize).copied()
    }

    /// Returns the raw tag value.
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Returns true for kinds whose payload is a sequence of child nodes.
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, NodeType::Root | NodeType::Parent | NodeType::ModelTree)
    }

    /// Returns true for kinds that may appear in a stored header.
    #[inline]
    pub fn is_storable(self) -> bool {
        !matches!(self, NodeType::Undefined | NodeType::Root)
    }

    /// Returns the lowercase name used in listings and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Undefined => "undefined",
            NodeType::Root => "root",
            NodeType::Parent => "parent",
            NodeType::String => "string",
            NodeType::BinaryData => "binary",
            NodeType::BoneTree => "bone-tree",
            NodeType::ImageFile => "image",
            NodeType::MeshData => "mesh",
            NodeType::MaterialData => "material",
            NodeType::ModelTree => "model-tree",
        }
    }

    /// Fails with [`Error::InvalidNodeType`] unless the kind is storable.
    pub(crate) fn ensure_storable(self) -> Result<()> {
        if self.is_storable() {
            Ok(())
        } else {
            Err(Error::InvalidNodeType { tag: self.tag() })
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown node type '{}'", s))
    }
}
