//! Encoding of node headers and complete nodes.

use super::{DEPENDENCY_FLAG, NodeType};
use crate::node_path::validate_name;
use crate::{Error, Result};

/// Encodes a dependency block, or nothing for an empty list.
///
/// # Errors
///
/// Returns [`Error::InvalidDependency`] if there are more than 65535 entries
/// or an entry is longer than 65535 bytes.
pub fn encode_dependency_block<S: AsRef<str>>(dependencies: &[S]) -> Result<Vec<u8>> {
    if dependencies.is_empty() {
        return Ok(Vec::new());
    }

    let count = u16::try_from(dependencies.len()).map_err(|_| {
        Error::InvalidDependency(format!(
            "{} dependencies exceed the limit of {}",
            dependencies.len(),
            u16::MAX
        ))
    })?;

    let mut block = Vec::new();
    block.extend_from_slice(&count.to_le_bytes());
    for dep in dependencies {
        let dep = dep.as_ref();
        let len = u16::try_from(dep.len()).map_err(|_| {
            Error::InvalidDependency(format!(
                "dependency of {} bytes exceeds the limit of {}",
                dep.len(),
                u16::MAX
            ))
        })?;
        block.extend_from_slice(&len.to_le_bytes());
        block.extend_from_slice(dep.as_bytes());
    }
    Ok(block)
}

/// Encodes a node header with the given payload size.
///
/// # Errors
///
/// Returns an error if the type is not storable, the name is invalid, or the
/// dependency list cannot be encoded.
pub fn encode_header<S: AsRef<str>>(
    node_type: NodeType,
    name: &str,
    size: u32,
    dependencies: &[S],
) -> Result<Vec<u8>> {
    node_type.ensure_storable()?;
    validate_name(name)?;
    let block = encode_dependency_block(dependencies)?;

    let mut tag = node_type.tag();
    if !block.is_empty() {
        tag |= DEPENDENCY_FLAG;
    }

    let mut header = Vec::with_capacity(super::FIXED_HEADER_SIZE + name.len() + block.len());
    header.push(tag);
    header.push(name.len() as u8);
    header.extend_from_slice(name.as_bytes());
    header.extend_from_slice(&size.to_le_bytes());
    header.extend_from_slice(&block);
    Ok(header)
}

/// Encodes a complete node: header followed by `payload`.
///
/// # Errors
///
/// In addition to the [`encode_header`] errors, returns
/// [`Error::ResourceLimitExceeded`] if the payload does not fit the 32-bit
/// size field.
pub fn encode_node<S: AsRef<str>>(
    node_type: NodeType,
    name: &str,
    payload: &[u8],
    dependencies: &[S],
) -> Result<Vec<u8>> {
    let size = u32::try_from(payload.len()).map_err(|_| {
        Error::ResourceLimitExceeded(format!(
            "payload of {} bytes does not fit a 32-bit size field",
            payload.len()
        ))
    })?;
    let mut bytes = encode_header(node_type, name, size, dependencies)?;
    bytes.extend_from_slice(payload);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::node::dependency_block_size;

    #[test]
    fn test_header_layout() {
        let header = encode_header(NodeType::Parent, "meshes", 0x0102, &[] as &[&str]).unwrap();
        assert_eq!(header[0], NodeType::Parent.tag());
        assert_eq!(header[1], 6);
        assert_eq!(&header[2..8], b"meshes");
        assert_eq!(&header[8..12], &[0x02, 0x01, 0x00, 0x00]);
        assert_eq!(header.len(), 12);
    }

    #[test]
    fn test_dependency_flag_and_block() {
        let deps = ["/materials/stone"];
        let header = encode_header(NodeType::MeshData, "cube", 0, &deps).unwrap();
        assert_eq!(header[0], NodeType::MeshData.tag() | DEPENDENCY_FLAG);
        assert_eq!(header.len(), 10 + dependency_block_size(&deps));
        assert_eq!(&header[10..12], &[1, 0]);
        assert_eq!(&header[12..14], &[16, 0]);
        assert_eq!(&header[14..], b"/materials/stone");
    }

    #[test]
    fn test_rejects_bad_input() {
        let none: &[&str] = &[];
        assert!(matches!(
            encode_header(NodeType::Root, "x", 0, none),
            Err(Error::InvalidNodeType { .. })
        ));
        assert!(matches!(
            encode_header(NodeType::Parent, "", 0, none),
            Err(Error::InvalidName { .. })
        ));
        let long = "d".repeat(u16::MAX as usize + 1);
        assert!(matches!(
            encode_header(NodeType::MeshData, "m", 0, &[long]),
            Err(Error::InvalidDependency(_))
        ));
    }

    #[test]
    fn test_encode_node_appends_payload() {
        let node = encode_node(NodeType::String, "greeting", b"hello", &[] as &[&str]).unwrap();
        assert_eq!(node.len(), 6 + 8 + 5);
        assert_eq!(&node[node.len() - 5..], b"hello");
    }
}
