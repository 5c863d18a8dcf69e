//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use assetpack::format::node::sequence_size;
use assetpack::format::reader::read_u32_le_at;
use assetpack::{Node, NodeType, PackArchive, decode, edit};

/// Empty dependency list.
pub const NONE: &[&str] = &[];

/// Installs a test logger so `RUST_LOG=debug` shows rejection reasons.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds a buffer from `(container, type, name, payload)` inserts.
///
/// Panics if any insert is refused, so fixtures cannot silently drift.
pub fn build(steps: &[(&str, NodeType, &str, &[u8])]) -> Vec<u8> {
    let mut buffer = Vec::new();
    for (container, node_type, name, payload) in steps {
        let applied = edit::insert(&mut buffer, container, *node_type, name, payload, NONE)
            .unwrap_or_else(|e| panic!("insert {container}/{name}: {e}"));
        assert!(applied, "insert {container}/{name} was refused");
    }
    buffer
}

/// A small model-shaped pack used by several tests.
///
/// ```text
/// /models/knight/{mesh, skeleton, albedo}
/// /materials/steel
/// /readme
/// ```
pub fn knight_pack() -> Vec<u8> {
    build(&[
        ("/", NodeType::Parent, "models", b"" as &[u8]),
        ("/models", NodeType::ModelTree, "knight", b""),
        ("/models/knight", NodeType::MeshData, "mesh", &[0x11; 96]),
        ("/models/knight", NodeType::BoneTree, "skeleton", &[0x22; 40]),
        ("/models/knight", NodeType::ImageFile, "albedo", &[0x33; 64]),
        ("/", NodeType::Parent, "materials", b""),
        ("/materials", NodeType::MaterialData, "steel", b"metal=1"),
        ("/", NodeType::String, "readme", b"knight demo"),
    ])
}

/// Same as [`knight_pack`], wrapped in a [`PackArchive`].
pub fn knight_archive() -> PackArchive {
    PackArchive::from_bytes(knight_pack()).expect("fixture decodes")
}

/// Decodes `buffer` and checks every structural invariant:
/// container sizes equal the summed extents of their children, children are
/// contiguous, stored size fields match the decoded ones, sibling names are
/// unique, and the root spans the whole buffer.
pub fn assert_consistent(buffer: &[u8]) -> Vec<Node> {
    let tree = decode(buffer).expect("buffer decodes");
    assert_eq!(sequence_size(&tree), buffer.len(), "root extent");
    check_sequence(buffer, &tree, 0);
    tree
}

fn check_sequence(buffer: &[u8], nodes: &[Node], start: usize) {
    let mut cursor = start;
    let mut names = std::collections::HashSet::new();
    for node in nodes {
        assert_eq!(node.position, cursor, "gap before '{}'", node.name);
        assert!(names.insert(node.name.as_str()), "duplicate '{}'", node.name);
        assert_eq!(
            read_u32_le_at(buffer, node.size_field_offset()).unwrap(),
            node.size,
            "size field of '{}'",
            node.name
        );
        if node.is_container() {
            assert_eq!(
                sequence_size(&node.children),
                node.size as usize,
                "children of '{}'",
                node.name
            );
            check_sequence(buffer, &node.children, node.payload_start());
        }
        cursor = node.end();
    }
}

/// Returns the payload bytes at `path`, panicking if it is not a leaf.
pub fn payload_of(buffer: &[u8], path: &str) -> Vec<u8> {
    let mut pack = PackArchive::from_bytes(buffer.to_vec()).expect("buffer decodes");
    pack.payload(path)
        .unwrap_or_else(|e| panic!("payload {path}: {e}"))
        .bytes
        .to_vec()
}
