//
// Copyright (c) 2019 Nathan Fiedler
//

//! The boundary finder: the pure, total function at the heart of the
//! algorithm. Given a buffer and validated parameters it returns the offset
//! at which to cut the next chunk.

use crate::gear::GEAR;
use crate::params::Params;

/// Find the next chunk cut point within `buf`.
///
/// Returns an offset in `[min(params.min_size, buf.len()), min(params.max_size, buf.len())]`.
/// Total and infallible over any `buf` and validated `params`: there is no
/// failure mode once parameters have passed [`Params::new`].
pub fn find_cut(buf: &[u8], params: &Params) -> usize {
    let n = buf.len();
    if n <= params.min_size {
        return n;
    }
    let capped = if n > params.max_size { params.max_size } else { n };
    let center = params.center_size(capped);
    let barrier1 = (params.min_size + center).min(capped);
    let barrier2 = capped;

    let mut hash: u32 = 0;
    let mut i = params.min_size;

    // Phase A: strict mask, runs from min_size to the center point. Finding
    // a match here means the chunk ran shorter than the desired average.
    while i < barrier1 {
        hash = (hash >> 1).wrapping_add(GEAR[buf[i] as usize]);
        if hash & params.mask_s == 0 {
            return i + 1;
        }
        i += 1;
    }
    // Phase B: lenient mask, runs from the center point to max_size. Hash
    // state carries over from phase A; it is never reset mid-chunk.
    while i < barrier2 {
        hash = (hash >> 1).wrapping_add(GEAR[buf[i] as usize]);
        if hash & params.mask_l == 0 {
            return i + 1;
        }
        i += 1;
    }
    // Neither mask matched (pathological data, e.g. all zeroes): force a
    // cut at the capped length.
    capped
}
