//! Batched, all-or-nothing editing of a pack.

use crate::archive::PackArchive;
use crate::format::{DecodeLimits, NodeType, decode_with_limits};
use crate::{NodePath, Result};

use super::operation::Operation;

/// Result of applying a batch of operations.
#[must_use = "edit result should be checked to see whether the batch was committed"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditResult {
    /// Number of operations applied before the batch finished or stopped.
    pub applied: usize,
    /// The first refused operation and its index in the batch, if any.
    pub rejected: Option<(usize, Operation)>,
    /// Buffer length before the batch.
    pub bytes_before: usize,
    /// Buffer length after the batch; equal to `bytes_before` when the
    /// batch was not committed.
    pub bytes_after: usize,
}

impl EditResult {
    /// Returns true if every operation was applied and the buffer replaced.
    pub fn is_committed(&self) -> bool {
        self.rejected.is_none()
    }

    /// Returns the change in buffer length.
    pub fn size_delta(&self) -> i64 {
        let after = i64::try_from(self.bytes_after).unwrap_or(i64::MAX);
        let before = i64::try_from(self.bytes_before).unwrap_or(i64::MAX);
        after.saturating_sub(before)
    }
}

/// Queues pack edits and applies them as one unit.
///
/// Each operation sees the result of the previous ones. The batch runs on a
/// scratch copy of the buffer, which replaces the original only when every
/// operation was applied; a refused operation or an error leaves the
/// original bytes untouched.
///
/// # Example
///
/// ```rust
/// use assetpack::NodeType;
/// use assetpack::edit::ArchiveEditor;
///
/// let mut buffer = Vec::new();
/// let mut editor = ArchiveEditor::new();
/// editor.insert("/", NodeType::Parent, "meshes", Vec::new(), &[] as &[&str])?;
/// editor.insert("/meshes", NodeType::MeshData, "knight", b"verts".to_vec(), &[] as &[&str])?;
/// editor.rename("/meshes/knight", "paladin")?;
///
/// let result = editor.apply(&mut buffer)?;
/// assert!(result.is_committed());
/// assert_eq!(result.applied, 3);
/// assert_eq!(assetpack::edit::get_type(&buffer, "/meshes/paladin")?, NodeType::MeshData);
/// # Ok::<(), assetpack::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveEditor {
    operations: Vec<Operation>,
    limits: DecodeLimits,
}

impl ArchiveEditor {
    /// Creates an editor with no pending operations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the decode limits used while applying the batch.
    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Creates an editor pre-loaded with `operations`.
    pub fn from_operations(operations: Vec<Operation>) -> Self {
        Self {
            operations,
            limits: DecodeLimits::default(),
        }
    }

    /// Returns the number of pending operations.
    pub fn pending_operations(&self) -> usize {
        self.operations.len()
    }

    /// Returns whether there are any pending operations.
    pub fn has_pending_operations(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Returns the pending operations in queue order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Clears all pending operations.
    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }

    /// Queues an already built operation.
    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Queues an insert.
    ///
    /// The container path is parsed now; the name, payload and container
    /// are checked when the batch is applied.
    pub fn insert<S: AsRef<str>>(
        &mut self,
        container: &str,
        node_type: NodeType,
        name: &str,
        payload: impl Into<Vec<u8>>,
        dependencies: &[S],
    ) -> Result<()> {
        self.operations.push(Operation::Insert {
            container: NodePath::parse(container)?,
            node_type,
            name: name.to_string(),
            payload: payload.into(),
            dependencies: dependencies
                .iter()
                .map(|d| d.as_ref().to_string())
                .collect(),
        });
        Ok(())
    }

    /// Queues a removal.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        self.operations.push(Operation::Remove {
            path: NodePath::parse(path)?,
        });
        Ok(())
    }

    /// Queues a rename.
    pub fn rename(&mut self, path: &str, new_name: &str) -> Result<()> {
        crate::node_path::validate_name(new_name)?;
        self.operations.push(Operation::Rename {
            path: NodePath::parse(path)?,
            new_name: new_name.to_string(),
        });
        Ok(())
    }

    /// Queues a retype.
    pub fn retype(&mut self, path: &str, node_type: NodeType) -> Result<()> {
        node_type.ensure_storable()?;
        self.operations.push(Operation::Retype {
            path: NodePath::parse(path)?,
            node_type,
        });
        Ok(())
    }

    /// Queues a move.
    pub fn move_node(&mut self, source: &str, dest: &str) -> Result<()> {
        self.operations.push(Operation::Move {
            source: NodePath::parse(source)?,
            dest: NodePath::parse(dest)?,
        });
        Ok(())
    }

    /// Applies all pending operations to `buffer`.
    ///
    /// The queue is drained whether or not the batch commits.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an operation; `buffer` is then
    /// unchanged.
    pub fn apply(&mut self, buffer: &mut Vec<u8>) -> Result<EditResult> {
        let operations = std::mem::take(&mut self.operations);
        let bytes_before = buffer.len();
        let mut scratch = buffer.clone();
        let mut applied = 0;

        for (index, operation) in operations.into_iter().enumerate() {
            let tree = decode_with_limits(&scratch, &self.limits)?;
            if !operation.apply_in(&mut scratch, &tree, &self.limits)? {
                log::debug!(
                    "batch stopped at operation {} ({} {}), nothing committed",
                    index,
                    operation.operation_type(),
                    operation.target_path()
                );
                return Ok(EditResult {
                    applied,
                    rejected: Some((index, operation)),
                    bytes_before,
                    bytes_after: bytes_before,
                });
            }
            applied += 1;
        }

        *buffer = scratch;
        log::debug!(
            "committed {} operations, {} -> {} bytes",
            applied,
            bytes_before,
            buffer.len()
        );
        Ok(EditResult {
            applied,
            rejected: None,
            bytes_before,
            bytes_after: buffer.len(),
        })
    }

    /// Applies all pending operations to an owned pack.
    ///
    /// On commit the pack's revision advances by the number of operations.
    pub fn apply_to(&mut self, pack: &mut PackArchive) -> Result<EditResult> {
        let mut buffer = pack.as_bytes().to_vec();
        let result = self.apply(&mut buffer)?;
        if result.is_committed() && result.applied > 0 {
            pack.replace_buffer(buffer, result.applied as u64);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const NONE: &[&str] = &[];

    fn seeded() -> Vec<u8> {
        let mut editor = ArchiveEditor::new();
        editor.insert("/", NodeType::Parent, "a", Vec::new(), NONE).unwrap();
        editor.insert("/", NodeType::Parent, "b", Vec::new(), NONE).unwrap();
        editor
            .insert("/a", NodeType::String, "s", b"hello".to_vec(), NONE)
            .unwrap();
        let mut buffer = Vec::new();
        let result = editor.apply(&mut buffer).unwrap();
        assert!(result.is_committed());
        buffer
    }

    #[test]
    fn test_editor_queue() {
        let mut editor = ArchiveEditor::new();
        assert!(!editor.has_pending_operations());
        editor.remove("/a").unwrap();
        editor.move_node("/a", "/b").unwrap();
        assert_eq!(editor.pending_operations(), 2);
        editor.clear_operations();
        assert_eq!(editor.pending_operations(), 0);
    }

    #[test]
    fn test_invalid_arguments_fail_when_queued() {
        let mut editor = ArchiveEditor::new();
        assert!(matches!(editor.remove("//"), Err(Error::InvalidPath(_))));
        assert!(matches!(
            editor.rename("/a", "x/y"),
            Err(Error::InvalidName { .. })
        ));
        assert!(matches!(
            editor.retype("/a", NodeType::Root),
            Err(Error::InvalidNodeType { .. })
        ));
        assert!(!editor.has_pending_operations());
    }

    #[test]
    fn test_batch_commits() {
        let mut buffer = seeded();
        let mut editor = ArchiveEditor::new();
        editor.move_node("/a/s", "/b").unwrap();
        editor.rename("/b/s", "greeting").unwrap();
        editor.remove("/a").unwrap();

        let result = editor.apply(&mut buffer).unwrap();
        assert!(result.is_committed());
        assert_eq!(result.applied, 3);
        assert_eq!(result.bytes_after, buffer.len());
        assert!(result.size_delta() < 0);
        assert_eq!(
            crate::edit::get_type(&buffer, "/b/greeting").unwrap(),
            NodeType::String
        );
        assert!(!editor.has_pending_operations());
    }

    #[test]
    fn test_rejection_rolls_back_batch() {
        let mut buffer = seeded();
        let before = buffer.clone();
        let mut editor = ArchiveEditor::new();
        editor.remove("/a/s").unwrap();
        editor.remove("/a/s").unwrap();

        let result = editor.apply(&mut buffer).unwrap();
        assert!(!result.is_committed());
        assert_eq!(result.applied, 1);
        let (index, op) = result.rejected.unwrap();
        assert_eq!(index, 1);
        assert_eq!(op.operation_type(), "remove");
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_error_rolls_back_batch() {
        let mut buffer = seeded();
        let before = buffer.clone();
        let mut editor = ArchiveEditor::new();
        editor.remove("/b").unwrap();
        editor
            .insert("/a", NodeType::Parent, "bad", vec![0xFF], NONE)
            .unwrap();

        assert!(editor.apply(&mut buffer).unwrap_err().is_corruption());
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_apply_to_pack() {
        let mut pack = PackArchive::from_bytes(seeded()).unwrap();
        let mut editor = ArchiveEditor::new();
        editor.retype("/a/s", NodeType::BinaryData).unwrap();
        editor.move_node("/a/s", "/").unwrap();

        let result = editor.apply_to(&mut pack).unwrap();
        assert!(result.is_committed());
        assert_eq!(pack.revision(), 2);
        assert_eq!(pack.get_type("/s").unwrap(), NodeType::BinaryData);
        assert_eq!(pack.payload("/s").unwrap().bytes, b"hello");
    }

    #[test]
    fn test_size_delta_saturates() {
        let grown = EditResult {
            bytes_before: 10,
            bytes_after: 25,
            ..Default::default()
        };
        assert_eq!(grown.size_delta(), 15);

        let huge = EditResult {
            bytes_before: 0,
            bytes_after: usize::MAX,
            ..Default::default()
        };
        assert_eq!(huge.size_delta(), i64::MAX);
    }
}
