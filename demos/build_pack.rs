//! Build a small asset pack and reorganize it.
//!
//! This example demonstrates the editing workflow:
//! - Inserting containers and leaves with dependency paths
//! - Moving, renaming and retyping nodes
//! - Reading payloads back the way a loader would
//! - Saving the buffer to disk
//!
//! # Usage
//!
//! ```bash
//! cargo run --example build_pack -- output.pak
//! ```

use assetpack::{NodeType, PackArchive, Result};
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <output.pak>", args[0]);
        eprintln!();
        eprintln!("Builds a demo pack with one model and its materials.");
        std::process::exit(1);
    }
    let output_path = &args[1];
    let none: &[&str] = &[];

    let mut pack = PackArchive::new();

    // A model import produces one model tree with its parts.
    pack.insert("/", NodeType::ModelTree, "knight", &[], none)?;
    pack.insert("/knight", NodeType::MeshData, "body", &[0u8; 256], &["/knight/albedo"])?;
    pack.insert("/knight", NodeType::BoneTree, "rig", &[1u8; 64], none)?;
    pack.insert("/knight", NodeType::ImageFile, "albedo", &[2u8; 128], none)?;

    // Move the texture into a shared folder, then list the dependency paths
    // that no longer resolve.
    pack.insert("/", NodeType::Parent, "textures", &[], none)?;
    pack.move_node("/knight/albedo", "/textures")?;
    pack.rename("/textures/albedo", "knight_albedo")?;
    for dangling in pack.dangling_dependencies()? {
        println!("stale dependency: {} -> {}", dangling.node, dangling.dependency);
    }

    // A plain blob that turns out to be a skeleton.
    pack.insert("/", NodeType::BinaryData, "extra_rig", &[3u8; 32], none)?;
    pack.retype("/extra_rig", NodeType::BoneTree)?;

    println!("{:>8}  {:<10} Path", "Size", "Type");
    for entry in pack.entries()? {
        println!("{:>8}  {:<10} {}", entry.node.size, entry.node.node_type, entry.path);
    }

    let body = pack.payload("/knight/body")?;
    println!();
    println!(
        "/knight/body: {} bytes at offset {:#x}",
        body.bytes.len(),
        body.position
    );

    pack.save_path(output_path)?;
    let stats = pack.stats()?;
    println!(
        "Wrote {} ({} nodes, {} bytes)",
        output_path, stats.nodes, stats.total_bytes
    );
    Ok(())
}
