//! Fuzz target for decoding arbitrary bytes as a pack buffer.
//!
//! This target exercises the header and dependency-block parsing with
//! malformed or adversarial input, looking for panics, out-of-bounds reads
//! or unbounded recursion.
//!
//! Run with: cargo +nightly fuzz run decode

#![no_main]

use assetpack::{DecodeLimits, PackArchive, decode_with_limits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = DecodeLimits::new().max_depth(32).max_nodes(4096);

    let Ok(tree) = decode_with_limits(data, &limits) else {
        return;
    };

    // A successful decode must describe the buffer exactly.
    let total: usize = tree.iter().map(|n| n.total_size()).sum();
    assert_eq!(total, data.len(), "root extent mismatch");

    // Walking and auditing a valid pack must not fail.
    if let Ok(mut pack) = PackArchive::from_bytes_with_limits(data.to_vec(), limits) {
        let stats = pack.stats().expect("stats of a decoded pack");
        assert_eq!(stats.header_bytes + stats.payload_bytes, data.len());
        let _ = pack.dangling_dependencies();
    }
});
