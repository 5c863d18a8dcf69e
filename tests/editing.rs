//! Integration tests for pack editing operations.
//!
//! These tests verify that the editing API correctly:
//! - Inserts, removes, renames, retypes and moves nodes
//! - Keeps every ancestor size field consistent
//! - Leaves the buffer untouched when an edit is refused or fails
//! - Applies queued batches all-or-nothing

mod common;

use assetpack::edit::{self, ArchiveEditor};
use assetpack::resolve::resolve;
use assetpack::{Error, NodePath, NodeType, OperationBuilder, PackArchive, decode};

use common::{NONE, assert_consistent, build, knight_archive, knight_pack, payload_of};

fn path(s: &str) -> NodePath {
    NodePath::parse(s).unwrap()
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_scenario_insert_container_into_empty_buffer() {
    common::init_logging();
    let mut buffer = Vec::new();
    assert!(edit::insert(&mut buffer, "/", NodeType::Parent, "meshes", &[], NONE).unwrap());

    let tree = assert_consistent(&buffer);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].name, "meshes");
    assert_eq!(tree[0].node_type, NodeType::Parent);
    assert_eq!(tree[0].size, 0);
}

#[test]
fn test_scenario_insert_leaf_grows_container() {
    let mut buffer = build(&[("/", NodeType::Parent, "meshes", b"" as &[u8])]);
    let root_before = buffer.len();

    assert!(edit::insert(&mut buffer, "/meshes", NodeType::MeshData, "cube", &[9; 100], NONE).unwrap());

    let tree = assert_consistent(&buffer);
    let cube = &tree[0].children[0];
    assert_eq!(cube.header_size(), 6 + 4);
    assert_eq!(tree[0].size as usize, cube.header_size() + 100);
    assert_eq!(buffer.len() - root_before, cube.header_size() + 100);
}

// The documented example renames `cube` to `box` and expects +1, but that
// name is one byte shorter; `cubes` exercises the +1 case.
#[test]
fn test_scenario_rename_longer_name() {
    let mut buffer = build(&[
        ("/", NodeType::Parent, "meshes", b"" as &[u8]),
        ("/meshes", NodeType::MeshData, "cube", &[4; 100]),
    ]);
    let meshes_before = decode(&buffer).unwrap()[0].size;

    assert!(edit::rename(&mut buffer, "/meshes/cube", "cubes").unwrap());

    let tree = assert_consistent(&buffer);
    assert_eq!(tree[0].size, meshes_before + 1);
    assert_eq!(payload_of(&buffer, "/meshes/cubes"), vec![4; 100]);
    assert_eq!(edit::get_type(&buffer, "/meshes/cube").unwrap(), NodeType::Undefined);
}

#[test]
fn test_scenario_remove_container() {
    let mut buffer = build(&[
        ("/", NodeType::Parent, "meshes", b"" as &[u8]),
        ("/meshes", NodeType::MeshData, "cube", &[4; 100]),
        ("/", NodeType::String, "notes", b"keep"),
    ]);
    let meshes = decode(&buffer).unwrap()[0].clone();
    let len_before = buffer.len();

    assert!(edit::remove(&mut buffer, "/meshes").unwrap());

    assert_eq!(len_before - buffer.len(), meshes.header_size() + meshes.size as usize);
    let tree = assert_consistent(&buffer);
    assert!(resolve(&tree, &path("/meshes")).is_none());
    assert_eq!(payload_of(&buffer, "/notes"), b"keep");
}

#[test]
fn test_scenario_move_between_siblings() {
    let mut buffer = build(&[
        ("/", NodeType::Parent, "a", b"" as &[u8]),
        ("/", NodeType::Parent, "b", b""),
        ("/a", NodeType::BinaryData, "x", b"payload-x"),
    ]);
    let x = decode(&buffer).unwrap()[0].children[0].clone();
    let b_before = decode(&buffer).unwrap()[1].size;

    assert!(edit::move_node(&mut buffer, "/a/x", "/b").unwrap());

    let tree = assert_consistent(&buffer);
    assert_eq!(tree[0].size, 0);
    assert_eq!(tree[1].size as usize, b_before as usize + x.total_size());
    assert_eq!(payload_of(&buffer, "/b/x"), b"payload-x");
}

#[test]
fn test_scenario_move_into_own_descendant_refused() {
    let mut buffer = build(&[
        ("/", NodeType::Parent, "a", b"" as &[u8]),
        ("/a", NodeType::Parent, "sub", b""),
    ]);
    let before = buffer.clone();

    assert!(!edit::move_node(&mut buffer, "/a", "/a/sub").unwrap());
    assert_eq!(buffer, before);
}

// ============================================================================
// No-op and rejection behaviour
// ============================================================================

#[test]
fn test_noop_edits_leave_buffer_unchanged() {
    let mut buffer = knight_pack();
    let before = buffer.clone();

    assert!(!edit::move_node(&mut buffer, "/models/knight", "/models/knight").unwrap());
    assert!(!edit::rename(&mut buffer, "/models/knight/mesh", "mesh").unwrap());
    assert!(!edit::move_node(&mut buffer, "/models/knight/mesh", "/models/knight").unwrap());
    assert!(!edit::remove(&mut buffer, "/models/dragon").unwrap());
    assert!(!edit::retype(&mut buffer, "/", NodeType::Parent).unwrap());
    assert_eq!(buffer, before);
}

#[test]
fn test_invalid_input_leaves_buffer_unchanged() {
    let mut buffer = knight_pack();
    let before = buffer.clone();

    assert!(matches!(
        edit::insert(&mut buffer, "/models//knight", NodeType::String, "x", b"", NONE),
        Err(Error::InvalidPath(_))
    ));
    assert!(matches!(
        edit::insert(&mut buffer, "/", NodeType::String, &"n".repeat(256), b"", NONE),
        Err(Error::InvalidName { .. })
    ));
    assert!(matches!(
        edit::insert(&mut buffer, "/", NodeType::Undefined, "x", b"", NONE),
        Err(Error::InvalidNodeType { .. })
    ));
    assert!(matches!(
        edit::rename(&mut buffer, "/readme", "a/b"),
        Err(Error::InvalidName { .. })
    ));
    assert!(matches!(
        edit::retype(&mut buffer, "/readme", NodeType::Root),
        Err(Error::InvalidNodeType { .. })
    ));
    assert_eq!(buffer, before);
}

#[test]
fn test_remove_root_clears_buffer() {
    let mut buffer = knight_pack();
    assert!(edit::remove(&mut buffer, "/").unwrap());
    assert!(buffer.is_empty());
    assert_eq!(edit::get_type(&buffer, "/").unwrap(), NodeType::Root);
}

// ============================================================================
// Deeper structural edits
// ============================================================================

#[test]
fn test_move_subtree_preserves_every_payload() {
    let mut buffer = knight_pack();
    let originals: Vec<_> = ["mesh", "skeleton", "albedo"]
        .iter()
        .map(|n| payload_of(&buffer, &format!("/models/knight/{n}")))
        .collect();

    assert!(edit::move_node(&mut buffer, "/models/knight", "/materials").unwrap());
    assert_consistent(&buffer);

    for (name, original) in ["mesh", "skeleton", "albedo"].iter().zip(&originals) {
        assert_eq!(&payload_of(&buffer, &format!("/materials/knight/{name}")), original);
    }
    assert_eq!(decode(&buffer).unwrap()[0].size, 0);
}

#[test]
fn test_move_to_later_and_earlier_containers() {
    let mut buffer = knight_pack();

    // Towards the end of the buffer.
    assert!(edit::move_node(&mut buffer, "/models/knight/albedo", "/materials").unwrap());
    assert_consistent(&buffer);
    // Back towards the start.
    assert!(edit::move_node(&mut buffer, "/materials/albedo", "/models").unwrap());
    assert_consistent(&buffer);
    // Up to the root, past every other node.
    assert!(edit::move_node(&mut buffer, "/models/albedo", "/").unwrap());
    let tree = assert_consistent(&buffer);

    assert_eq!(tree.last().unwrap().name, "albedo");
    assert_eq!(payload_of(&buffer, "/albedo"), vec![0x33; 64]);
}

#[test]
fn test_insert_then_remove_restores_buffer() {
    let mut buffer = knight_pack();
    let before = buffer.clone();

    assert!(edit::insert(&mut buffer, "/models/knight", NodeType::MaterialData, "paint", b"red", &["/materials/steel"]).unwrap());
    assert_consistent(&buffer);
    assert!(edit::remove(&mut buffer, "/models/knight/paint").unwrap());
    assert_eq!(buffer, before);
}

#[test]
fn test_container_insert_with_child_payload() {
    let none: &[&str] = &[];
    let child = assetpack::format::encode_node(NodeType::String, "inner", b"txt", none).unwrap();
    let mut buffer = knight_pack();

    assert!(edit::insert(&mut buffer, "/", NodeType::ModelTree, "prefab", &child, NONE).unwrap());
    assert_consistent(&buffer);
    assert_eq!(payload_of(&buffer, "/prefab/inner"), b"txt");
}

#[test]
fn test_retype_keeps_dependencies() {
    let mut buffer = build(&[("/", NodeType::BinaryData, "blob", b"xyz" as &[u8])]);
    assert!(edit::insert(&mut buffer, "/", NodeType::MeshData, "mesh", b"v", &["/blob"]).unwrap());

    assert!(edit::retype(&mut buffer, "/mesh", NodeType::BoneTree).unwrap());

    let tree = assert_consistent(&buffer);
    assert_eq!(tree[1].node_type, NodeType::BoneTree);
    assert_eq!(tree[1].dependencies, vec!["/blob".to_string()]);
}

// ============================================================================
// PackArchive and batch editing
// ============================================================================

#[test]
fn test_pack_archive_matches_free_functions() {
    let mut pack = knight_archive();
    let mut buffer = knight_pack();

    assert!(pack.move_node("/models/knight/skeleton", "/").unwrap());
    assert!(edit::move_node(&mut buffer, "/models/knight/skeleton", "/").unwrap());
    assert!(pack.rename("/skeleton", "rig").unwrap());
    assert!(edit::rename(&mut buffer, "/skeleton", "rig").unwrap());

    assert_eq!(pack.as_bytes(), buffer.as_slice());
    assert_eq!(pack.revision(), 2);
}

#[test]
fn test_batch_from_builder() {
    let mut pack = knight_archive();
    let ops = OperationBuilder::new()
        .insert(NodePath::root(), NodeType::Parent, "textures", Vec::new())
        .move_node(path("/models/knight/albedo"), path("/textures"))
        .rename(path("/textures/albedo"), "knight_albedo")
        .retype(path("/readme"), NodeType::BinaryData)
        .build();

    let result = ArchiveEditor::from_operations(ops).apply_to(&mut pack).unwrap();
    assert!(result.is_committed());
    assert_eq!(result.applied, 4);
    assert_consistent(pack.as_bytes());
    assert_eq!(
        pack.payload("/textures/knight_albedo").unwrap().bytes,
        &[0x33; 64]
    );
    assert_eq!(pack.get_type("/readme").unwrap(), NodeType::BinaryData);
}

#[test]
fn test_batch_is_all_or_nothing() {
    let mut pack = knight_archive();
    let before = pack.as_bytes().to_vec();

    let mut editor = ArchiveEditor::new();
    editor.remove("/readme").unwrap();
    editor.move_node("/materials", "/materials/steel").unwrap();
    let result = editor.apply_to(&mut pack).unwrap();

    assert!(!result.is_committed());
    assert_eq!(result.applied, 1);
    assert_eq!(pack.as_bytes(), before.as_slice());
    assert_eq!(pack.revision(), 0);
}

#[test]
fn test_file_roundtrip_after_edits() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("knight.pak");

    let mut pack = knight_archive();
    pack.remove("/readme").unwrap();
    pack.save_path(&file).unwrap();

    let mut reopened = PackArchive::open_path(&file).unwrap();
    assert_eq!(reopened.as_bytes(), pack.as_bytes());
    assert_eq!(reopened.get_type("/readme").unwrap(), NodeType::Undefined);
    assert_eq!(reopened.stats().unwrap().leaves, 4);
}
