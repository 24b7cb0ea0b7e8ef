//
// Copyright (c) 2025 Nathan Fiedler
//

//! The digest hook: an injected, hash-algorithm-agnostic capability.
//!
//! The core never chooses a hash algorithm. Callers pass a closure; common
//! choices are SHA-256, BLAKE3, or xxHash, wired up exactly as in
//! `demos/checksum.rs`.

/// A digest producer: given a chunk's raw bytes, returns its digest as a
/// hexadecimal string. Must be deterministic and side-effect free from the
/// chunker's point of view; it is invoked exactly once per emitted chunk,
/// after the chunk length has been decided and before the record is handed
/// to the caller.
pub type Digest = dyn Fn(&[u8]) -> String + Send + Sync;

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_sum(bytes: &[u8]) -> String {
        let sum: u32 = bytes.iter().map(|b| *b as u32).sum();
        format!("{sum:08x}")
    }

    #[test]
    fn test_digest_as_trait_object() {
        let producer: Box<Digest> = Box::new(hex_sum);
        assert_eq!(producer(&[1, 2, 3]), hex_sum(&[1, 2, 3]));
    }
}
