//! Owning pack buffer with a cached decoded tree.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::edit::mutators;
use crate::format::{DecodeLimits, Node, NodeType, decode_with_limits};
use crate::resolve::{Resolved, resolve};
use crate::{Error, NodePath, Result};

/// A leaf payload handed to a payload consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload<'a> {
    /// Leaf kind.
    pub node_type: NodeType,
    /// Payload bytes.
    pub bytes: &'a [u8],
    /// Absolute buffer offset of the first payload byte.
    pub position: usize,
    /// Dependency paths recorded in the leaf's header.
    pub dependencies: &'a [String],
}

/// A node together with its full path, as produced by [`walk`].
#[derive(Debug, Clone)]
pub struct EntryRef<'a> {
    /// Full path of the node.
    pub path: NodePath,
    /// Nesting depth; top-level nodes have depth 1.
    pub depth: usize,
    /// The decoded node.
    pub node: &'a Node,
}

/// Lists every node of a tree in pre-order (parents before children,
/// siblings in storage order).
pub fn walk(tree: &[Node]) -> Vec<EntryRef<'_>> {
    fn visit<'a>(nodes: &'a [Node], parent: &NodePath, depth: usize, out: &mut Vec<EntryRef<'a>>) {
        for node in nodes {
            // The decoder rejects unaddressable names, so only a hand-built
            // tree can reach the skip.
            let Ok(path) = parent.join(&node.name) else {
                log::warn!("skipping node with invalid name {:?} under {}", node.name, parent);
                continue;
            };
            out.push(EntryRef {
                path: path.clone(),
                depth,
                node,
            });
            visit(&node.children, &path, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    visit(tree, &NodePath::root(), 1, &mut out);
    out
}

/// Aggregate numbers about a pack buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackStats {
    /// Total buffer length.
    pub total_bytes: usize,
    /// Number of stored nodes.
    pub nodes: usize,
    /// Number of container nodes.
    pub containers: usize,
    /// Number of leaf nodes.
    pub leaves: usize,
    /// Bytes spent on headers (including dependency blocks).
    pub header_bytes: usize,
    /// Bytes of leaf payload.
    pub payload_bytes: usize,
    /// Number of recorded dependency paths.
    pub dependencies: usize,
    /// Deepest nesting level; 0 for an empty buffer.
    pub max_depth: usize,
    /// Node count per kind.
    pub by_type: BTreeMap<NodeType, usize>,
}

/// A dependency path that does not resolve to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingDependency {
    /// The node recording the dependency.
    pub node: NodePath,
    /// The unresolved dependency path.
    pub dependency: String,
}

/// An owned pack buffer.
///
/// `PackArchive` wraps the buffer-in/buffer-out API of [`edit`] and keeps the
/// decoded tree between calls. The cache is dropped by every applied
/// mutation and rebuilt lazily, and [`revision`](Self::revision) counts the
/// applied mutations.
///
/// # Example
///
/// ```rust
/// use assetpack::{NodeType, PackArchive};
///
/// let mut pack = PackArchive::new();
/// pack.insert("/", NodeType::Parent, "materials", &[], &[] as &[&str])?;
/// pack.insert("/materials", NodeType::MaterialData, "stone", b"rough", &[] as &[&str])?;
/// pack.insert("/", NodeType::MeshData, "rock", b"verts", &["/materials/stone"])?;
///
/// let rock = pack.payload("/rock")?;
/// assert_eq!(rock.bytes, b"verts");
/// assert_eq!(rock.dependencies, ["/materials/stone".to_string()]);
/// assert!(pack.dangling_dependencies()?.is_empty());
/// # Ok::<(), assetpack::Error>(())
/// ```
///
/// [`edit`]: crate::edit
#[derive(Debug, Clone, Default)]
pub struct PackArchive {
    buffer: Vec<u8>,
    limits: DecodeLimits,
    revision: u64,
    cache: Option<Vec<Node>>,
}

impl PackArchive {
    /// Creates an empty pack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `bytes` after checking that they decode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptArchive`] or [`Error::ResourceLimitExceeded`]
    /// if the bytes are not a valid pack under the default limits.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_limits(bytes, DecodeLimits::default())
    }

    /// Takes ownership of `bytes` after checking them against `limits`.
    pub fn from_bytes_with_limits(bytes: Vec<u8>, limits: DecodeLimits) -> Result<Self> {
        let tree = decode_with_limits(&bytes, &limits)?;
        Ok(Self {
            buffer: bytes,
            limits,
            revision: 0,
            cache: Some(tree),
        })
    }

    /// Replaces the decode limits used by later calls.
    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self.cache = None;
        self
    }

    /// Reads and validates a pack file.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_path_with_limits(path, DecodeLimits::default())
    }

    /// Reads a pack file and validates it against `limits`.
    pub fn open_path_with_limits(path: impl AsRef<Path>, limits: DecodeLimits) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        log::debug!("read {} bytes from '{}'", bytes.len(), path.display());
        Self::from_bytes_with_limits(bytes, limits)
    }

    /// Writes the buffer to `path`, replacing any existing file.
    pub fn save_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, &self.buffer)?;
        log::debug!("wrote {} bytes to '{}'", self.buffer.len(), path.display());
        Ok(())
    }

    /// Returns the raw buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the pack and returns the raw buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Returns the buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the pack holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the number of mutations applied since the pack was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the decode limits in effect.
    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Returns the buffer and its decoded tree, decoding if needed.
    fn view(&mut self) -> Result<(&[u8], &[Node])> {
        if self.cache.is_none() {
            log::trace!("decoding revision {}", self.revision);
            self.cache = Some(decode_with_limits(&self.buffer, &self.limits)?);
        }
        Ok((&self.buffer, self.cache.as_deref().unwrap_or(&[])))
    }

    /// Swaps in a buffer produced by a committed batch of `applied` edits.
    pub(crate) fn replace_buffer(&mut self, buffer: Vec<u8>, applied: u64) {
        self.buffer = buffer;
        self.cache = None;
        self.revision += applied;
    }

    /// Returns the decoded root children.
    pub fn tree(&mut self) -> Result<&[Node]> {
        self.view().map(|(_, tree)| tree)
    }

    /// Runs a mutator against the cached tree.
    fn mutate<F>(&mut self, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<u8>, &[Node], &DecodeLimits) -> Result<bool>,
    {
        let tree = match self.cache.take() {
            Some(tree) => tree,
            None => decode_with_limits(&self.buffer, &self.limits)?,
        };
        let outcome = edit(&mut self.buffer, &tree, &self.limits);
        if matches!(outcome, Ok(true)) {
            self.revision += 1;
        } else {
            self.cache = Some(tree);
        }
        outcome
    }

    /// Inserts a node; see [`edit::insert`](crate::edit::insert).
    pub fn insert<S: AsRef<str>>(
        &mut self,
        container_path: &str,
        node_type: NodeType,
        name: &str,
        payload: &[u8],
        dependencies: &[S],
    ) -> Result<bool> {
        let container = NodePath::parse(container_path)?;
        self.mutate(|buffer, tree, limits| {
            mutators::insert_in(
                buffer,
                tree,
                &container,
                node_type,
                name,
                payload,
                dependencies,
                limits,
            )
        })
    }

    /// Removes a node; see [`edit::remove`](crate::edit::remove).
    pub fn remove(&mut self, path: &str) -> Result<bool> {
        let path = NodePath::parse(path)?;
        self.mutate(|buffer, tree, _| mutators::remove_in(buffer, tree, &path))
    }

    /// Renames a node; see [`edit::rename`](crate::edit::rename).
    pub fn rename(&mut self, path: &str, new_name: &str) -> Result<bool> {
        let path = NodePath::parse(path)?;
        self.mutate(|buffer, tree, _| mutators::rename_in(buffer, tree, &path, new_name))
    }

    /// Retypes a node; see [`edit::retype`](crate::edit::retype).
    pub fn retype(&mut self, path: &str, new_type: NodeType) -> Result<bool> {
        let path = NodePath::parse(path)?;
        self.mutate(|buffer, tree, limits| {
            mutators::retype_in(buffer, tree, &path, new_type, limits)
        })
    }

    /// Moves a node; see [`edit::move_node`](crate::edit::move_node).
    pub fn move_node(&mut self, source_path: &str, dest_path: &str) -> Result<bool> {
        let source = NodePath::parse(source_path)?;
        let dest = NodePath::parse(dest_path)?;
        self.mutate(|buffer, tree, limits| {
            mutators::move_in(buffer, tree, &source, &dest, limits)
        })
    }

    /// Returns the node kind at `path`; see [`edit::get_type`](crate::edit::get_type).
    pub fn get_type(&mut self, path: &str) -> Result<NodeType> {
        let path = NodePath::parse(path)?;
        let tree = self.tree()?;
        Ok(mutators::type_of(tree, &path))
    }

    /// Returns the stored node at `path`, or `None` for a missing path or
    /// the root.
    pub fn node(&mut self, path: &str) -> Result<Option<&Node>> {
        let path = NodePath::parse(path)?;
        let tree = self.tree()?;
        Ok(resolve(tree, &path).and_then(|r| r.as_node()))
    }

    /// Returns the payload of the leaf at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::NodeNotFound`] if nothing is stored at `path`
    /// - [`Error::NotALeaf`] if `path` is the root or a container
    pub fn payload(&mut self, path: &str) -> Result<Payload<'_>> {
        let path = NodePath::parse(path)?;
        let (buffer, tree) = self.view()?;
        match resolve(tree, &path) {
            None => Err(Error::NodeNotFound {
                path: path.to_string(),
            }),
            Some(Resolved::Node(node)) if !node.is_container() => Ok(Payload {
                node_type: node.node_type,
                bytes: node.payload(buffer),
                position: node.payload_start(),
                dependencies: &node.dependencies,
            }),
            Some(_) => Err(Error::NotALeaf {
                path: path.to_string(),
            }),
        }
    }

    /// Lists every node in pre-order.
    pub fn entries(&mut self) -> Result<Vec<EntryRef<'_>>> {
        self.tree().map(walk)
    }

    /// Computes aggregate statistics.
    pub fn stats(&mut self) -> Result<PackStats> {
        let total_bytes = self.len();
        let mut stats = PackStats {
            total_bytes,
            ..PackStats::default()
        };
        for entry in self.entries()? {
            let node = entry.node;
            stats.nodes += 1;
            stats.header_bytes += node.header_size();
            stats.dependencies += node.dependencies.len();
            stats.max_depth = stats.max_depth.max(entry.depth);
            *stats.by_type.entry(node.node_type).or_default() += 1;
            if node.is_container() {
                stats.containers += 1;
            } else {
                stats.leaves += 1;
                stats.payload_bytes += node.size as usize;
            }
        }
        Ok(stats)
    }

    /// Lists dependency paths that do not resolve to a stored node.
    pub fn dangling_dependencies(&mut self) -> Result<Vec<DanglingDependency>> {
        let tree = self.tree()?;
        let mut dangling = Vec::new();
        for entry in walk(tree) {
            for dependency in &entry.node.dependencies {
                let resolves = NodePath::parse(dependency)
                    .ok()
                    .and_then(|p| resolve(tree, &p))
                    .is_some_and(|r| !r.is_root());
                if !resolves {
                    log::warn!("{} depends on missing '{}'", entry.path, dependency);
                    dangling.push(DanglingDependency {
                        node: entry.path.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }
        Ok(dangling)
    }
}

impl From<PackArchive> for Vec<u8> {
    fn from(pack: PackArchive) -> Self {
        pack.into_bytes()
    }
}
