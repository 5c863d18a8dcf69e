//! Fuzz target for random edit sequences.
//!
//! Each input byte pair selects an operation and its arguments from small
//! pools. After every applied edit the buffer must still decode and every
//! refused edit must leave it untouched.
//!
//! Run with: cargo +nightly fuzz run edit_ops

#![no_main]

use assetpack::{NodeType, decode, edit};
use libfuzzer_sys::fuzz_target;

const PATHS: &[&str] = &["/", "/a", "/b", "/a/b", "/b/a", "/a/a", "/a/b/a"];
const NAMES: &[&str] = &["a", "b", "c"];
const TYPES: &[NodeType] = &[NodeType::Parent, NodeType::ModelTree, NodeType::MeshData, NodeType::String];

fuzz_target!(|data: &[u8]| {
    let none: &[&str] = &[];
    let mut buffer = Vec::new();

    for chunk in data.chunks_exact(2) {
        let (op, arg) = (chunk[0], chunk[1] as usize);
        let path = PATHS[arg % PATHS.len()];
        let other = PATHS[(arg / PATHS.len()) % PATHS.len()];
        let name = NAMES[arg % NAMES.len()];
        let node_type = TYPES[(arg / 3) % TYPES.len()];

        let before = buffer.clone();
        let outcome = match op % 5 {
            0 => {
                let payload: &[u8] = if node_type.is_container() { &[] } else { &chunk[..] };
                edit::insert(&mut buffer, path, node_type, name, payload, none)
            }
            1 if path != "/" => edit::remove(&mut buffer, path),
            2 => edit::rename(&mut buffer, path, name),
            3 => edit::retype(&mut buffer, path, node_type),
            4 => edit::move_node(&mut buffer, path, other),
            _ => Ok(false),
        };

        match outcome {
            Ok(true) => {
                decode(&buffer).expect("applied edit keeps the buffer decodable");
            }
            Ok(false) => assert_eq!(buffer, before, "refused edit changed the buffer"),
            Err(e) => panic!("edit on a valid buffer failed: {e}"),
        }
    }
});
