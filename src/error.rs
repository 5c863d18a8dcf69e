//! Error types for pack buffer operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when decoding or editing a pack buffer, along with a
//! convenient [`Result<T>`] type alias.
//!
//! # Rejections vs. Errors
//!
//! Structural edits that are merely *not allowed* (inserting under a leaf,
//! moving a node into its own subtree, creating a duplicate sibling name)
//! are not errors: the mutators return `Ok(false)` and leave the buffer
//! untouched. An [`Error`] means the request itself was malformed (an
//! invalid name or path) or the buffer could not be trusted.
//!
//! ```rust
//! use assetpack::{Error, NodeType, edit};
//!
//! fn add_mesh(buffer: &mut Vec<u8>, bytes: &[u8]) -> assetpack::Result<()> {
//!     match edit::insert(buffer, "/meshes", NodeType::MeshData, "knight", bytes, &[] as &[&str]) {
//!         Ok(true) => Ok(()),
//!         Ok(false) => {
//!             eprintln!("'/meshes' is missing or already holds a 'knight'");
//!             Ok(())
//!         }
//!         Err(Error::CorruptArchive { offset, reason }) => {
//!             eprintln!("Pack corrupted at byte {:#x}: {}", offset, reason);
//!             Err(Error::CorruptArchive { offset, reason })
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::io;

/// The main error type for pack buffer operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | Loading or saving a pack file |
/// | Format | [`CorruptArchive`][Self::CorruptArchive] | Truncated or malformed buffer |
/// | Input | [`InvalidPath`][Self::InvalidPath], [`InvalidName`][Self::InvalidName], [`InvalidNodeType`][Self::InvalidNodeType], [`InvalidDependency`][Self::InvalidDependency] | Bad caller arguments |
/// | Lookup | [`NodeNotFound`][Self::NodeNotFound], [`NotALeaf`][Self::NotALeaf] | Payload access on a wrong path |
/// | Resources | [`ResourceLimitExceeded`][Self::ResourceLimitExceeded] | Decode limits, 32-bit size overflow |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading or writing a pack file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The buffer does not hold a well-formed node sequence.
    ///
    /// Raised during decoding when a header is truncated, a size field points
    /// past the end of its enclosing range, a type tag is unknown, or a name
    /// is not valid UTF-8. Decoding never reads out of bounds; it stops at
    /// the first inconsistency.
    #[error("Corrupt archive at offset {offset:#x}: {reason}")]
    CorruptArchive {
        /// The byte offset where corruption was detected.
        offset: u64,
        /// A description of the corruption.
        reason: String,
    },

    /// A node path could not be parsed.
    ///
    /// Paths are slash-separated names. A single leading and trailing `/` is
    /// tolerated; empty interior segments (`a//b`) and NUL bytes are not.
    #[error("Invalid node path: {0}")]
    InvalidPath(String),

    /// A node name cannot be stored in a header.
    ///
    /// Names must be 1 to 255 bytes long and must not contain `/` or NUL.
    #[error("Invalid node name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },

    /// A type tag that cannot be written to a node header.
    ///
    /// `UNDEFINED` and `ROOT` only exist in memory and are never stored.
    #[error("Invalid node type tag {tag:#x}")]
    InvalidNodeType {
        /// The raw tag value.
        tag: u8,
    },

    /// A dependency list cannot be encoded.
    #[error("Invalid dependency list: {0}")]
    InvalidDependency(String),

    /// A resource limit was exceeded.
    ///
    /// Covers [`DecodeLimits`] violations during decoding as well as
    /// payloads or container sizes that no longer fit the 32-bit size field.
    ///
    /// [`DecodeLimits`]: crate::format::DecodeLimits
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// No node exists at the requested path.
    #[error("Node not found: {path}")]
    NodeNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The node at the requested path is a container, not a payload leaf.
    #[error("Node is not a leaf: {path}")]
    NotALeaf {
        /// The container path.
        path: String,
    },
}

impl Error {
    /// Creates a [`Error::CorruptArchive`] at the given offset.
    pub fn corrupt(offset: usize, reason: impl Into<String>) -> Self {
        Error::CorruptArchive {
            offset: offset as u64,
            reason: reason.into(),
        }
    }

    /// Returns true if this error indicates a damaged buffer.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::CorruptArchive { .. })
    }

    /// Returns true if this error was caused by caller-supplied arguments.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidPath(_)
                | Error::InvalidName { .. }
                | Error::InvalidNodeType { .. }
                | Error::InvalidDependency(_)
        )
    }

    /// Returns the byte offset associated with this error, if any.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::CorruptArchive { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// A specialized Result type for pack buffer operations.
pub type Result<T> = std::result::Result<T, Error>;
