//
// Copyright (c) 2025 Nathan Fiedler
//

//! FastCDC: fast content-defined chunking.
//!
//! Splits a byte stream into variable-length chunks at boundaries
//! determined by the content itself, so that inserting or deleting bytes
//! anywhere in the stream only perturbs the chunks adjacent to the edit —
//! the property that makes content-defined chunking useful for
//! deduplicating storage. See "FastCDC: a Fast and Efficient
//! Content-Defined Chunking Approach for Data Deduplication"
//! ([paper](https://www.usenix.org/system/files/conference/atc16/atc16-paper-xia.pdf)).
//!
//! The entry point is [`chunker`], which accepts any [`Source`] (borrowed
//! bytes, owned bytes, a path, an open file, or a pre-built memory map) and
//! returns a [`StreamChunker`]: a lazy iterator of [`Chunk`] records.
//!
//! ```
//! use fastcdc::{chunker, ChunkerOptions, Source};
//!
//! let data = vec![0u8; 100_000];
//! let chunks = chunker(Source::Bytes(&data), 16_384, ChunkerOptions::default()).unwrap();
//! for chunk in chunks {
//!     let chunk = chunk.unwrap();
//!     println!("{}..{}", chunk.offset, chunk.offset + chunk.length);
//! }
//! ```
//!
//! ### Choosing parameters
//!
//! Callers supply only the desired average chunk size; minimum and maximum
//! follow the common convention of one quarter and eight times the
//! average, respectively. Use [`Params::new`] directly when finer control
//! over the bounds is needed, then [`chunker_with_params`].
//!
//! ### Fat chunks and digests
//!
//! By default a [`Chunk`] carries only its offset and length. Set
//! [`ChunkerOptions::include_data`] to also receive the raw bytes, and
//! supply [`ChunkerOptions::digest`] to have a digest computed per chunk —
//! this crate never picks a hash algorithm itself; see `demos/checksum.rs`
//! for wiring up BLAKE3 or MD5.

mod chunk;
mod cut;
mod digest;
mod error;
mod gear;
mod params;
mod source;
mod stream;

#[cfg(any(feature = "tokio", feature = "futures"))]
mod async_stream;

pub use chunk::Chunk;
pub use cut::find_cut;
pub use digest::Digest;
pub use error::Error;
pub use params::{
    ceil_div, center_size, log2_rounded, mask, Params, AVERAGE_MAX, AVERAGE_MIN, MAXIMUM_MAX,
    MAXIMUM_MIN, MINIMUM_MAX, MINIMUM_MIN,
};
pub use source::{Opened, Source};
pub use stream::{ChunkerOptions, StreamChunker};

#[cfg(any(feature = "tokio", feature = "futures"))]
pub use async_stream::AsyncStreamChunker;

/// Build a chunker using the conventional `avg_size / 4` minimum and
/// `avg_size * 8` maximum.
///
/// This is the common case; reach for [`chunker_with_params`] when the
/// defaults don't fit (e.g. a known-small average that would otherwise
/// underflow the minimum-chunk-size floor, or a large enough average that
/// `avg_size * 8` would exceed [`params::MAXIMUM_MAX`] and get rejected).
pub fn chunker<'a>(
    source: Source<'a>,
    avg_size: usize,
    options: ChunkerOptions,
) -> Result<StreamChunker<Opened<'a>>, Error> {
    let min_size = (avg_size / 4).max(params::MINIMUM_MIN);
    let max_size = avg_size * 8;
    let params = Params::new(min_size, avg_size, max_size)?;
    chunker_with_params(source, params, options)
}

/// Build a chunker with fully explicit parameters.
pub fn chunker_with_params<'a>(
    source: Source<'a>,
    params: Params,
    options: ChunkerOptions,
) -> Result<StreamChunker<Opened<'a>>, Error> {
    let opened = source.open()?;
    Ok(StreamChunker::new(opened, params, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_all_zeros() {
        let data = vec![0u8; 100_000];
        let params = Params::new(4096, 16_384, 65_536).unwrap();
        let chunks: Vec<Chunk> =
            chunker_with_params(Source::Bytes(&data), params, ChunkerOptions::default())
                .unwrap()
                .map(Result::unwrap)
                .collect();
        assert!(!chunks.is_empty());
        let total: u64 = chunks.iter().map(|c| c.length).sum();
        assert_eq!(total, data.len() as u64);
        for window in chunks.windows(2) {
            assert_eq!(window[0].offset + window[0].length, window[1].offset);
        }
    }

    #[test]
    fn test_public_api_short_input_single_chunk() {
        let data = b"too short to split".to_vec();
        let chunks: Vec<Chunk> = chunker(Source::Bytes(&data), 16_384, ChunkerOptions::default())
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].offset, 0);
        assert_eq!(chunks[0].length, data.len() as u64);
    }

    #[test]
    fn test_public_api_rejects_bad_average() {
        // avg_size below AVERAGE_MIN must surface as a typed error, not a
        // panic, even through the convenience entry point.
        let data = vec![0u8; 10];
        let err = chunker(Source::Bytes(&data), 10, ChunkerOptions::default());
        assert!(matches!(err, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_public_api_large_average_overflows_default_max_rejected() {
        // avg_size * 8 exceeds MAXIMUM_MAX here; the default must be
        // rejected by Params::new rather than silently clamped down to a
        // max_size smaller than the documented avg_size*8 convention.
        let data = vec![0u8; 10];
        let avg_size = 200_000_000;
        assert!(avg_size * 8 > params::MAXIMUM_MAX);
        let err = chunker(Source::Bytes(&data), avg_size, ChunkerOptions::default());
        assert!(matches!(err, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_public_api_owned_and_path_sources_agree() {
        let data: Vec<u8> = (0..64_000u32).map(|i| (i % 256) as u8).collect();
        let from_bytes: Vec<(u64, u64)> =
            chunker(Source::Bytes(&data), 8192, ChunkerOptions::default())
                .unwrap()
                .map(|c| {
                    let c = c.unwrap();
                    (c.offset, c.length)
                })
                .collect();
        let from_owned: Vec<(u64, u64)> =
            chunker(Source::Owned(data.clone()), 8192, ChunkerOptions::default())
                .unwrap()
                .map(|c| {
                    let c = c.unwrap();
                    (c.offset, c.length)
                })
                .collect();
        assert_eq!(from_bytes, from_owned);

        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), &data).unwrap();
        let from_path: Vec<(u64, u64)> =
            chunker(Source::from_path(tmp.path()), 8192, ChunkerOptions::default())
                .unwrap()
                .map(|c| {
                    let c = c.unwrap();
                    (c.offset, c.length)
                })
                .collect();
        assert_eq!(from_bytes, from_path);
    }
}
