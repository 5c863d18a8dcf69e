//! Node path type with validation for addressing nodes in a pack buffer.

use crate::{Error, Result};
use std::fmt;

/// Maximum length for node paths (in bytes).
///
/// Each segment is bounded by the one-byte name length in a node header, so
/// this only caps pathological nesting.
const MAX_PATH_LENGTH: usize = 32768;

/// Maximum length of a single node name (in bytes).
pub const MAX_NAME_LENGTH: usize = u8::MAX as usize;

/// Checks that `name` can be stored as a node name.
///
/// A valid name is 1 to [`MAX_NAME_LENGTH`] bytes long, contains neither `/`
/// nor NUL, and is not `.` or `..`.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "empty name"
    } else if name.len() > MAX_NAME_LENGTH {
        "longer than 255 bytes"
    } else if name.contains('/') {
        "contains '/'"
    } else if name.contains('\0') {
        "contains NUL byte"
    } else if name == "." || name == ".." {
        "reserved name"
    } else {
        return Ok(());
    };
    Err(Error::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// A validated, normalized path to a node inside a pack buffer.
///
/// `NodePath` accepts the forms used by callers of the pack API:
/// - `""` and `"/"` denote the root container
/// - `"/a/b"`, `"a/b"` and `"a/b/"` all denote the same nested node
///
/// A single leading and a single trailing `/` are stripped. Every remaining
/// segment must be a valid node name (see [`validate_name`]).
///
/// # Examples
///
/// ```
/// use assetpack::NodePath;
///
/// let path = NodePath::parse("/meshes/knight").unwrap();
/// assert_eq!(path.as_str(), "meshes/knight");
/// assert_eq!(path.to_string(), "/meshes/knight");
///
/// assert!(NodePath::parse("/").unwrap().is_root());
/// assert!(NodePath::parse("a//b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodePath(String);

impl NodePath {
    /// Returns the path of the root container.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parses and normalizes a path string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the path:
    /// - Contains NUL bytes
    /// - Exceeds the maximum path length
    /// - Contains empty segments (e.g., `a//b` or `//`)
    /// - Contains a segment longer than 255 bytes or equal to `.`/`..`
    pub fn parse(s: &str) -> Result<Self> {
        if s.contains('\0') {
            return Err(Error::InvalidPath("contains NUL byte".into()));
        }

        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidPath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }

        let trimmed = s.strip_prefix('/').unwrap_or(s);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        if trimmed.is_empty() {
            if s.len() > 1 {
                return Err(Error::InvalidPath(format!("'{}' has an empty segment", s)));
            }
            return Ok(Self::root());
        }

        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidPath(format!(
                    "'{}' has an empty segment",
                    s
                )));
            }
            validate_name(segment)
                .map_err(|e| Error::InvalidPath(format!("segment of '{}': {}", s, e)))?;
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns true if this path denotes the root container.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the normalized path without leading or trailing slashes.
    ///
    /// The root path is the empty string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns an iterator over the path segments.
    ///
    /// The root path has no segments.
    ///
    /// ```
    /// use assetpack::NodePath;
    ///
    /// let path = NodePath::parse("a/b/c").unwrap();
    /// assert_eq!(path.components().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    /// assert_eq!(NodePath::root().components().count(), 0);
    /// ```
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Returns the number of segments.
    pub fn depth(&self) -> usize {
        self.components().count()
    }

    /// Appends a child name to this path.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid node name.
    pub fn join(&self, name: &str) -> Result<Self> {
        validate_name(name)?;
        if self.is_root() {
            Ok(Self(name.to_string()))
        } else {
            Ok(Self(format!("{}/{}", self.0, name)))
        }
    }

    /// Returns the path of the enclosing container.
    ///
    /// Top-level nodes have the root as parent; the root itself has none.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rfind('/') {
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        })
    }

    /// Returns the last segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit('/').next()
        }
    }

    /// Returns true if `prefix` is this path or one of its ancestors.
    ///
    /// The comparison is component-wise: `"ab/c"` does not start with `"a"`.
    /// Every path starts with the root.
    ///
    /// ```
    /// use assetpack::NodePath;
    ///
    /// let path = NodePath::parse("a/sub/leaf").unwrap();
    /// assert!(path.starts_with(&NodePath::parse("a").unwrap()));
    /// assert!(path.starts_with(&NodePath::parse("a/sub").unwrap()));
    /// assert!(!path.starts_with(&NodePath::parse("a/su").unwrap()));
    /// ```
    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        let mut own = self.components();
        prefix.components().all(|p| own.next() == Some(p))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl std::str::FromStr for NodePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for NodePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for NodePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
