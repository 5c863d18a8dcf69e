//! # assetpack
//!
//! A relocatable, single-buffer container format for game asset payloads.
//!
//! A pack is one contiguous byte buffer holding a tree of typed, named
//! nodes. Containers hold further nodes; leaves hold opaque payloads such as
//! meshes, images or materials. Every node header records the byte length of
//! its payload, so the buffer can be walked without an index and moved or
//! memory-mapped as a whole.
//!
//! ## Quick Start
//!
//! ```rust
//! use assetpack::{NodeType, PackArchive, Result};
//!
//! fn main() -> Result<()> {
//!     let mut pack = PackArchive::new();
//!     let none: &[&str] = &[];
//!
//!     pack.insert("/", NodeType::ModelTree, "knight", &[], none)?;
//!     pack.insert("/knight", NodeType::MeshData, "body", &[0u8; 48], none)?;
//!     pack.insert("/knight", NodeType::ImageFile, "albedo", b"\x89PNG", none)?;
//!
//!     // Reorganize without touching payload bytes.
//!     pack.insert("/", NodeType::Parent, "textures", &[], none)?;
//!     pack.move_node("/knight/albedo", "/textures")?;
//!
//!     for entry in pack.entries()? {
//!         println!("{} {} ({} bytes)", entry.node.node_type, entry.path, entry.node.size);
//!     }
//!     assert_eq!(pack.payload("/textures/albedo")?.bytes, b"\x89PNG");
//!     Ok(())
//! }
//! ```
//!
//! ## Buffer-level API
//!
//! The functions in [`edit`] work on a plain `Vec<u8>` and decode it on every
//! call; [`PackArchive`] wraps the same operations with a cached tree.
//! Mutators return `Ok(true)` when applied, `Ok(false)` when structurally
//! refused, and `Err` for invalid input or a corrupt buffer. The buffer is
//! unchanged unless the result is `Ok(true)`.
//!
//! ```rust
//! use assetpack::{NodeType, edit};
//!
//! let none: &[&str] = &[];
//! let mut buffer = Vec::new();
//! edit::insert(&mut buffer, "/", NodeType::Parent, "meshes", &[], none)?;
//! assert!(!edit::insert(&mut buffer, "/", NodeType::Parent, "meshes", &[], none)?);
//! assert_eq!(edit::get_type(&buffer, "/meshes")?, NodeType::Parent);
//! # Ok::<(), assetpack::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`:
//!
//! ```rust
//! use assetpack::{Error, PackArchive};
//!
//! match PackArchive::from_bytes(vec![2, 1, b'a']) {
//!     Err(Error::CorruptArchive { offset, reason }) => {
//!         eprintln!("corrupt at {offset}: {reason}");
//!     }
//!     Err(e) => eprintln!("other error: {e}"),
//!     Ok(_) => unreachable!(),
//! }
//! ```
//!
//! ## Resource Limits
//!
//! Decoding untrusted buffers is bounded by [`DecodeLimits`] (nesting depth
//! and node count). Sizes that point past their enclosing region, unknown
//! type tags, invalid UTF-8 names and duplicate sibling names are reported
//! as [`Error::CorruptArchive`].
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod archive;
pub mod edit;
pub mod error;
pub mod format;
pub mod node_path;
pub mod propagate;
pub mod resolve;

pub use archive::{DanglingDependency, EntryRef, PackArchive, PackStats, Payload, walk};
pub use error::{Error, Result};
pub use format::{DecodeLimits, Node, NodeType, decode, decode_with_limits};
pub use node_path::NodePath;

// Re-export edit API
pub use edit::{ArchiveEditor, EditResult, Operation, OperationBuilder};
