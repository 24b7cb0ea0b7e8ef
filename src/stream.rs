//
// Copyright (c) 2025 Nathan Fiedler
//

//! The streaming driver: maintains a sliding buffer over an arbitrary byte
//! source, repeatedly invokes the boundary finder, and yields [`Chunk`]
//! records lazily.
//!
//! The buffer is kept as a `(buf, start, end)` window rather than copied on
//! every emitted chunk: bytes are only shifted when a refill is actually
//! needed, so advancing past a chunk that doesn't require fresh data from
//! the source is a real zero-copy operation.

use std::io::Read;

use crate::chunk::Chunk;
use crate::cut::find_cut;
use crate::digest::Digest;
use crate::error::Error;
use crate::params::Params;

/// Minimum refill quantum regardless of `max_size`, so small `max_size`
/// values don't force a read for every few bytes.
const MIN_REFILL: usize = 64 * 1024;

/// Options controlling what a chunker attaches to each emitted [`Chunk`].
#[derive(Default)]
pub struct ChunkerOptions {
    /// Copy each chunk's raw bytes into `Chunk::data`.
    pub include_data: bool,
    /// Compute a digest for each chunk and attach it as `Chunk::hash`.
    pub digest: Option<Box<Digest>>,
}

/// Lazily splits a byte source into content-defined chunks.
///
/// Construct via [`crate::chunker`]; advance via the [`Iterator`] impl.
/// A single instance is not safe for concurrent use by multiple consumers —
/// it carries mutable buffer and offset state, same as any other pull-based
/// iterator.
pub struct StreamChunker<R> {
    source: R,
    params: Params,
    options: ChunkerOptions,
    buf: Vec<u8>,
    start: usize,
    end: usize,
    eof: bool,
    processed_offset: u64,
    refill_quantum: usize,
}

impl<R: Read> StreamChunker<R> {
    pub(crate) fn new(source: R, params: Params, options: ChunkerOptions) -> Self {
        let refill_quantum = params.max_size.max(MIN_REFILL);
        Self {
            source,
            params,
            options,
            buf: Vec::new(),
            start: 0,
            end: 0,
            eof: false,
            processed_offset: 0,
            refill_quantum,
        }
    }

    /// Bytes emitted as chunks so far, i.e. the offset of the next
    /// unconsumed byte.
    pub fn bytes_processed(&self) -> u64 {
        self.processed_offset
    }

    fn live_len(&self) -> usize {
        self.end - self.start
    }

    /// Ensure the live window holds more than `max_size` bytes, unless the
    /// source is exhausted. Compacts the buffer (a single `copy_within`)
    /// only when it actually needs room to read more — not on every chunk.
    fn refill(&mut self) -> Result<(), Error> {
        while self.live_len() <= self.params.max_size && !self.eof {
            if self.start > 0 {
                self.buf.copy_within(self.start..self.end, 0);
                self.end -= self.start;
                self.start = 0;
            }
            let want = self.end + self.refill_quantum;
            if self.buf.len() < want {
                self.buf.resize(want, 0);
            }
            let mut read_any = false;
            while self.end < want {
                let n = self.source.read(&mut self.buf[self.end..want])?;
                if n == 0 {
                    self.eof = true;
                    break;
                }
                self.end += n;
                read_any = true;
            }
            if !read_any && !self.eof {
                // zero-length Ok(0) with room remaining: treat as eof per
                // `Read` contract (no forward progress is possible).
                self.eof = true;
            }
        }
        self.buf.truncate(self.end);
        Ok(())
    }
}

impl<R: Read> Iterator for StreamChunker<R> {
    type Item = Result<Chunk, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(err) = self.refill() {
            return Some(Err(err));
        }
        if self.live_len() == 0 {
            return None;
        }
        let slice = &self.buf[self.start..self.end];
        let cut = find_cut(slice, &self.params);
        let offset = self.processed_offset;
        let length = cut as u64;

        let mut chunk = Chunk::new(offset, length);
        if self.options.include_data {
            chunk.data = Some(slice[..cut].to_vec());
        }
        if let Some(digest) = &self.options.digest {
            chunk.hash = Some(digest(&slice[..cut]));
        }

        self.start += cut;
        self.processed_offset += length;
        log::trace!("emitted chunk offset={offset} length={length}");
        Some(Ok(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;
    use std::io::Cursor;

    fn chunker(data: Vec<u8>, min: usize, avg: usize, max: usize) -> StreamChunker<Cursor<Vec<u8>>> {
        let params = Params::new(min, avg, max).unwrap();
        StreamChunker::new(Cursor::new(data), params, ChunkerOptions::default())
    }

    #[test]
    fn test_all_zeros_forced_max_chunks() {
        let data = vec![0u8; 10240];
        let chunker = chunker(data, 64, 256, 1024);
        let chunks: Vec<Chunk> = chunker.map(Result::unwrap).collect();
        assert_eq!(chunks.len(), 10);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.length, 1024);
            assert_eq!(c.offset, 1024 * i as u64);
        }
    }

    #[test]
    fn test_short_input_single_chunk() {
        let data: Vec<u8> = (0..20u8).collect();
        let chunker = chunker(data.clone(), 1024, 4096, 16384);
        let chunks: Vec<Chunk> = chunker.map(Result::unwrap).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].offset, 0);
        assert_eq!(chunks[0].length, 20);
    }

    #[test]
    fn test_partition_is_exact() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let chunker = chunker(data.clone(), 256, 1024, 4096);
        let mut total = 0u64;
        let mut prev_end = 0u64;
        for chunk in chunker {
            let chunk = chunk.unwrap();
            assert_eq!(chunk.offset, prev_end);
            prev_end = chunk.offset + chunk.length;
            total += chunk.length;
        }
        assert_eq!(total, data.len() as u64);
    }

    #[test]
    fn test_stable_regardless_of_read_granularity() {
        let data: Vec<u8> = (0..200_000u32).map(|i| ((i * 7) % 251) as u8).collect();
        let whole = chunker(data.clone(), 256, 1024, 4096);
        let whole_chunks: Vec<(u64, u64)> = whole
            .map(|c| {
                let c = c.unwrap();
                (c.offset, c.length)
            })
            .collect();

        struct OneByteAtATime(Cursor<Vec<u8>>);
        impl Read for OneByteAtATime {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                self.0.read(&mut buf[..1.min(buf.len())])
            }
        }
        let params = Params::new(256, 1024, 4096).unwrap();
        let trickle = StreamChunker::new(
            OneByteAtATime(Cursor::new(data)),
            params,
            ChunkerOptions::default(),
        );
        let trickle_chunks: Vec<(u64, u64)> = trickle
            .map(|c| {
                let c = c.unwrap();
                (c.offset, c.length)
            })
            .collect();

        assert_eq!(whole_chunks, trickle_chunks);
    }

    #[test]
    fn test_fat_chunks_contain_exact_bytes() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 200) as u8).collect();
        let params = Params::new(256, 1024, 4096).unwrap();
        let options = ChunkerOptions {
            include_data: true,
            digest: None,
        };
        let chunker = StreamChunker::new(Cursor::new(data.clone()), params, options);
        for chunk in chunker {
            let chunk = chunk.unwrap();
            let expected = &data[chunk.offset as usize..(chunk.offset + chunk.length) as usize];
            assert_eq!(chunk.data.as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_digest_hook_invoked_once_per_chunk() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 200) as u8).collect();
        let params = Params::new(256, 1024, 4096).unwrap();
        let options = ChunkerOptions {
            include_data: true,
            digest: Some(Box::new(|bytes: &[u8]| format!("{:x}", bytes.len()))),
        };
        let chunker = StreamChunker::new(Cursor::new(data), params, options);
        for chunk in chunker {
            let chunk = chunk.unwrap();
            assert_eq!(chunk.hash, Some(format!("{:x}", chunk.length)));
        }
    }
}
