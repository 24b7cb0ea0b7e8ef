//
// Copyright (c) 2025 Nathan Fiedler
//

//! Async counterpart to [`crate::StreamChunker`], feature-gated behind
//! `tokio` or `futures`.
//!
//! Uses a `try_stream!` generator when the `tokio` feature is active and a
//! `futures::stream::unfold` otherwise, both built around the same
//! sliding-window buffer as the synchronous chunker rather than copying the
//! buffer on every emitted chunk.

use crate::chunk::Chunk;
use crate::cut::find_cut;
use crate::error::Error;
use crate::params::Params;
use crate::stream::ChunkerOptions;

#[cfg(all(feature = "futures", not(feature = "tokio")))]
use futures::{
    io::{AsyncRead, AsyncReadExt},
    stream::Stream,
};

#[cfg(all(feature = "tokio", not(feature = "futures")))]
use tokio::io::{AsyncRead, AsyncReadExt};
#[cfg(all(feature = "tokio", not(feature = "futures")))]
use tokio_stream::Stream;

#[cfg(all(feature = "tokio", not(feature = "futures")))]
use async_stream::try_stream;

const MIN_REFILL: usize = 64 * 1024;

/// Async analog of [`crate::StreamChunker`]; construct with
/// [`AsyncStreamChunker::new`] and drive via [`AsyncStreamChunker::as_stream`].
pub struct AsyncStreamChunker<R> {
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

impl<R: AsyncRead + Unpin> AsyncStreamChunker<R> {
    pub fn new(source: R, params: Params, options: ChunkerOptions) -> Self {
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

    fn live_len(&self) -> usize {
        self.end - self.start
    }

    async fn refill(&mut self) -> Result<(), Error> {
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
                let n = self.source.read(&mut self.buf[self.end..want]).await?;
                if n == 0 {
                    self.eof = true;
                    break;
                }
                self.end += n;
                read_any = true;
            }
            if !read_any && !self.eof {
                self.eof = true;
            }
        }
        self.buf.truncate(self.end);
        Ok(())
    }

    async fn read_chunk(&mut self) -> Result<Option<Chunk>, Error> {
        self.refill().await?;
        if self.live_len() == 0 {
            return Ok(None);
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
        Ok(Some(chunk))
    }

    #[cfg(all(feature = "tokio", not(feature = "futures")))]
    pub fn as_stream(&mut self) -> impl Stream<Item = Result<Chunk, Error>> + '_ {
        try_stream! {
            loop {
                match self.read_chunk().await {
                    Ok(Some(chunk)) => yield chunk,
                    Ok(None) => break,
                    Err(err) => Err(err)?,
                }
            }
        }
    }

    #[cfg(all(feature = "futures", not(feature = "tokio")))]
    pub fn as_stream(&mut self) -> impl Stream<Item = Result<Chunk, Error>> + '_ {
        futures::stream::unfold(self, |this| async {
            match this.read_chunk().await {
                Ok(Some(chunk)) => Some((Ok(chunk), this)),
                Ok(None) => None,
                Err(err) => Some((Err(err), this)),
            }
        })
    }
}

#[cfg(test)]
#[cfg(any(
    all(feature = "tokio", not(feature = "futures")),
    all(feature = "futures", not(feature = "tokio"))
))]
mod tests {
    use super::*;

    #[cfg(all(feature = "tokio", not(feature = "futures")))]
    use tokio_stream::StreamExt;

    #[cfg(all(feature = "futures", not(feature = "tokio")))]
    use futures::stream::StreamExt;

    #[cfg_attr(all(feature = "tokio", not(feature = "futures")), tokio::test)]
    #[cfg_attr(all(feature = "futures", not(feature = "tokio")), futures_test::test)]
    async fn test_async_matches_sync_partition() {
        let data: Vec<u8> = (0..64_000u32).map(|i| (i % 256) as u8).collect();
        let params = Params::new(2048, 8192, 32768).unwrap();
        let mut chunker =
            AsyncStreamChunker::new(data.as_slice(), params, ChunkerOptions::default());
        let stream = chunker.as_stream();
        let chunks: Vec<Chunk> = stream.map(Result::unwrap).collect().await;
        let total: u64 = chunks.iter().map(|c| c.length).sum();
        assert_eq!(total, data.len() as u64);

        let sync_chunks: Vec<Chunk> =
            crate::StreamChunker::new(data.as_slice(), params, ChunkerOptions::default())
                .map(Result::unwrap)
                .collect();
        assert_eq!(chunks, sync_chunks);
    }
}
