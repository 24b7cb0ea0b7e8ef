//
// Copyright (c) 2025 Nathan Fiedler
//

//! Normalizes the caller's input — a byte buffer, a path, an open file
//! handle, or a pre-materialized memory map — into a single uniform
//! `Read` capability, preferring to memory-map a file over buffering it
//! whenever a file descriptor is available.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::Error;

/// The input accepted by the public [`crate::chunker`] entry point.
pub enum Source<'a> {
    /// Borrowed in-memory bytes; zero-copy for the caller.
    Bytes(&'a [u8]),
    /// Owned in-memory bytes.
    Owned(Vec<u8>),
    /// A filesystem path; opened and memory-mapped read-only.
    Path(PathBuf),
    /// An already-open file handle; memory-mapped when possible.
    Handle(File),
    /// A pre-materialized memory map.
    Mmap(Mmap),
}

impl<'a> Source<'a> {
    /// Convenience constructor for the path variant.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Source::Path(path.as_ref().to_path_buf())
    }

    /// Open this source, producing a single concrete type implementing
    /// [`Read`] regardless of which variant was supplied.
    pub fn open(self) -> Result<Opened<'a>, Error> {
        match self {
            Source::Bytes(b) => Ok(Opened {
                size_hint: Some(b.len() as u64),
                kind: OpenedKind::Slice(Cursor::new(b)),
            }),
            Source::Owned(v) => Ok(Opened {
                size_hint: Some(v.len() as u64),
                kind: OpenedKind::Owned(Cursor::new(v)),
            }),
            Source::Mmap(mmap) => {
                let size = mmap.len() as u64;
                Ok(Opened {
                    size_hint: Some(size),
                    kind: OpenedKind::Mmap(MmapReader { mmap, pos: 0 }),
                })
            }
            Source::Path(path) => {
                let file = File::open(&path).map_err(|source| Error::SourceOpenFailure {
                    path: Some(path.clone()),
                    source,
                })?;
                Self::open_file(file, Some(path))
            }
            Source::Handle(file) => Self::open_file(file, None),
        }
    }

    fn open_file(file: File, path: Option<PathBuf>) -> Result<Opened<'a>, Error> {
        let size_hint = file.metadata().ok().map(|m| m.len());
        match unsafe { Mmap::map(&file) } {
            Ok(mmap) => {
                log::debug!("mapped source into memory ({} bytes)", mmap.len());
                Ok(Opened {
                    size_hint: Some(mmap.len() as u64),
                    kind: OpenedKind::Mmap(MmapReader { mmap, pos: 0 }),
                })
            }
            Err(err) => {
                log::debug!("mmap failed ({err}), falling back to buffered reads");
                let _ = path;
                Ok(Opened {
                    size_hint,
                    kind: OpenedKind::File(file),
                })
            }
        }
    }
}

/// A normalized, readable source produced by [`Source::open`].
pub struct Opened<'a> {
    size_hint: Option<u64>,
    kind: OpenedKind<'a>,
}

enum OpenedKind<'a> {
    Slice(Cursor<&'a [u8]>),
    Owned(Cursor<Vec<u8>>),
    Mmap(MmapReader),
    File(File),
}

impl Opened<'_> {
    /// The total size of the source, if known up front. `None` for
    /// non-seekable streams where the size can only be discovered by
    /// reading to the end.
    pub fn size_hint(&self) -> Option<u64> {
        self.size_hint
    }
}

impl Read for Opened<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.kind {
            OpenedKind::Slice(c) => c.read(buf),
            OpenedKind::Owned(c) => c.read(buf),
            OpenedKind::Mmap(m) => m.read(buf),
            OpenedKind::File(f) => f.read(buf),
        }
    }
}

/// Reads sequentially from a memory map without requiring the self-borrow a
/// `Cursor<&[u8]>` over an owned `Mmap` would need.
struct MmapReader {
    mmap: Mmap,
    pos: usize,
}

impl Read for MmapReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = &self.mmap[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}
