//
// Copyright (c) 2025 Nathan Fiedler
//

//! The record type yielded by the stream chunker.

/// A single content-defined chunk.
///
/// `data` is only populated when the chunker was asked for "fat" chunks;
/// `hash` is only populated when a digest producer was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chunk {
    /// Starting byte position within the original source.
    pub offset: u64,
    /// Length of the chunk in bytes.
    pub length: u64,
    /// Raw bytes of the chunk, present only when fat chunks were requested.
    pub data: Option<Vec<u8>>,
    /// Hexadecimal digest of the chunk bytes, present only when a digest
    /// producer was supplied to the chunker.
    pub hash: Option<String>,
}

impl Chunk {
    pub(crate) fn new(offset: u64, length: u64) -> Self {
        Self {
            offset,
            length,
            data: None,
            hash: None,
        }
    }
}
