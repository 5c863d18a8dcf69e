//! Tests for malformed and corrupted pack handling.
//!
//! These tests verify that assetpack detects and reports errors when
//! decoding truncated, inconsistent or malicious buffers, and that mutators
//! refuse to touch such buffers.

mod common;

use assetpack::format::{DEPENDENCY_FLAG, encode_header};
use assetpack::{Error, NodeType, PackArchive, decode, edit};

use common::{NONE, knight_pack};

fn assert_corrupt(buffer: &[u8]) -> u64 {
    match decode(buffer) {
        Err(Error::CorruptArchive { offset, .. }) => offset,
        other => panic!("expected corruption, got {other:?}"),
    }
}

#[test]
fn test_every_truncation_is_detected() {
    let buffer = knight_pack();
    // Cutting inside a node always breaks a size or header; cutting exactly
    // between two top-level nodes yields a shorter valid pack.
    let boundaries: Vec<usize> = decode(&buffer).unwrap().iter().map(|n| n.end()).collect();
    for len in 1..buffer.len() {
        if boundaries.contains(&len) {
            assert!(decode(&buffer[..len]).is_ok(), "prefix {len}");
        } else {
            assert_corrupt(&buffer[..len]);
        }
    }
}

#[test]
fn test_size_overrunning_parent() {
    let mut child = encode_header(NodeType::String, "s", 50, NONE).unwrap();
    child.extend_from_slice(&[0; 50]);
    // Parent claims fewer bytes than its child needs.
    let mut buffer = encode_header(NodeType::Parent, "p", 20, NONE).unwrap();
    buffer.extend_from_slice(&child[..20]);
    let offset = assert_corrupt(&buffer);
    assert!(offset as usize >= 7);
}

#[test]
fn test_reserved_and_unknown_tags() {
    for tag in [NodeType::Undefined.tag(), NodeType::Root.tag(), 0x0A, 0x7F] {
        let buffer = [tag, 1, b'x', 0, 0, 0, 0];
        assert_corrupt(&buffer);
    }
}

#[test]
fn test_bad_names() {
    // Zero-length name.
    assert_corrupt(&[NodeType::String.tag(), 0, 0, 0, 0, 0]);
    // Invalid UTF-8.
    assert_corrupt(&[NodeType::String.tag(), 1, 0xFF, 0, 0, 0, 0]);

    // Names that no path can address.
    for name in [&b"a/b"[..], b"..", b".", b"a\0b"] {
        let mut buffer = vec![NodeType::String.tag(), name.len() as u8];
        buffer.extend_from_slice(name);
        buffer.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(assert_corrupt(&buffer), 0);
        assert!(PackArchive::from_bytes(buffer).unwrap_err().is_corruption());
    }

    // Nested inside a valid container, the offset points at the bad child.
    let mut buffer = vec![NodeType::Parent.tag(), 1, b'p', 9, 0, 0, 0];
    buffer.extend_from_slice(&[NodeType::String.tag(), 3, b'a', b'/', b'b', 0, 0, 0, 0]);
    assert_eq!(assert_corrupt(&buffer), 7);
}

#[test]
fn test_duplicate_sibling_names() {
    let mut buffer = encode_header(NodeType::String, "same", 0, NONE).unwrap();
    buffer.extend(encode_header(NodeType::BinaryData, "same", 0, NONE).unwrap());
    assert_corrupt(&buffer);
}

#[test]
fn test_dependency_block_damage() {
    let good = encode_header(NodeType::MeshData, "m", 0, &["/dep"]).unwrap();
    assert!(good[0] & DEPENDENCY_FLAG != 0);
    assert!(decode(&good).is_ok());

    // Truncated dependency path.
    assert_corrupt(&good[..good.len() - 1]);

    // Flag set but count of zero.
    let mut empty = encode_header(NodeType::MeshData, "m", 0, NONE).unwrap();
    empty[0] |= DEPENDENCY_FLAG;
    empty.extend_from_slice(&[0, 0]);
    assert_corrupt(&empty);
}

#[test]
fn test_mutators_refuse_corrupt_buffers() {
    let mut buffer = knight_pack();
    buffer.truncate(buffer.len() - 3);
    let before = buffer.clone();

    assert!(edit::insert(&mut buffer, "/", NodeType::String, "x", b"", NONE).unwrap_err().is_corruption());
    assert!(edit::remove(&mut buffer, "/readme").unwrap_err().is_corruption());
    assert!(edit::rename(&mut buffer, "/models", "m").unwrap_err().is_corruption());
    assert!(edit::retype(&mut buffer, "/models", NodeType::ModelTree).unwrap_err().is_corruption());
    assert!(edit::move_node(&mut buffer, "/models", "/materials").unwrap_err().is_corruption());
    assert!(edit::get_type(&buffer, "/models").unwrap_err().is_corruption());
    assert_eq!(buffer, before);
}

#[test]
fn test_pack_archive_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.pak");
    std::fs::write(&file, [NodeType::Parent.tag(), 200]).unwrap();

    let err = PackArchive::open_path(&file).unwrap_err();
    assert!(err.is_corruption());
    assert_eq!(err.offset(), Some(2));
}
