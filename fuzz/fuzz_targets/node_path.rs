//! Fuzz target for NodePath::parse with arbitrary string input.
//!
//! Run with: cargo +nightly fuzz run node_path
//!
//! Properties being tested:
//! - Normalized paths carry no leading or trailing slash
//! - Parsing the display form yields the same path
//! - `parent` and `join` are inverses

#![no_main]

use assetpack::NodePath;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(path) = NodePath::parse(s) else {
        return;
    };

    let normalized = path.as_str();
    assert!(!normalized.starts_with('/'), "leading slash: {:?}", normalized);
    assert!(!normalized.ends_with('/'), "trailing slash: {:?}", normalized);
    assert!(!normalized.contains('\0'), "NUL byte: {:?}", normalized);

    let reparsed = NodePath::parse(&path.to_string()).expect("display form parses");
    assert_eq!(reparsed, path);

    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        assert_eq!(parent.join(name).expect("segment is a valid name"), path);
        assert!(path.starts_with(&parent));
    }
});
