//
// Copyright (c) 2019 Nathan Fiedler
//

//! Parameter validation and mask/center-size derivation.
//!
//! This is the "normalized chunking" half of the algorithm: two masks are
//! derived from the desired average chunk size, one stricter than average
//! and one more lenient, so that the boundary finder is less likely to cut
//! before the chunk has grown past the center point and more likely to cut
//! once it has.

use crate::error::Error;

/// Smallest acceptable value for the minimum chunk size.
pub const MINIMUM_MIN: usize = 64;
/// Largest acceptable value for the minimum chunk size.
pub const MINIMUM_MAX: usize = 67_108_864;
/// Smallest acceptable value for the average chunk size.
pub const AVERAGE_MIN: usize = 256;
/// Largest acceptable value for the average chunk size.
pub const AVERAGE_MAX: usize = 268_435_456;
/// Smallest acceptable value for the maximum chunk size.
pub const MAXIMUM_MIN: usize = 1024;
/// Largest acceptable value for the maximum chunk size.
pub const MAXIMUM_MAX: usize = 1_073_741_824;

/// Validated chunking parameters plus their derived masks.
///
/// Construct with [`Params::new`]; all three sizes are validated against the
/// bounds in the module constants and `bits`/`mask_s`/`mask_l` are derived
/// once up front so the boundary finder never has to recompute them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub min_size: usize,
    pub avg_size: usize,
    pub max_size: usize,
    pub(crate) bits: u32,
    pub(crate) mask_s: u32,
    pub(crate) mask_l: u32,
}

impl Params {
    /// Validate `(min_size, avg_size, max_size)` and derive the masks used by
    /// the boundary finder.
    ///
    /// Returns [`Error::InvalidParameter`] rather than panicking: unlike the
    /// assertion-based validation in the algorithm this crate descends from,
    /// callers in a systems language need a typed error they can recover
    /// from, not an abort.
    pub fn new(min_size: usize, avg_size: usize, max_size: usize) -> Result<Self, Error> {
        if !(MINIMUM_MIN..=MINIMUM_MAX).contains(&min_size) {
            return Err(Error::InvalidParameter(format!(
                "min_size {min_size} out of range [{MINIMUM_MIN}, {MINIMUM_MAX}]"
            )));
        }
        if !(AVERAGE_MIN..=AVERAGE_MAX).contains(&avg_size) {
            return Err(Error::InvalidParameter(format!(
                "avg_size {avg_size} out of range [{AVERAGE_MIN}, {AVERAGE_MAX}]"
            )));
        }
        if !(MAXIMUM_MIN..=MAXIMUM_MAX).contains(&max_size) {
            return Err(Error::InvalidParameter(format!(
                "max_size {max_size} out of range [{MAXIMUM_MIN}, {MAXIMUM_MAX}]"
            )));
        }
        if !(min_size <= avg_size && avg_size <= max_size) {
            return Err(Error::InvalidParameter(format!(
                "parameters must satisfy min_size <= avg_size <= max_size, got {min_size}, {avg_size}, {max_size}"
            )));
        }
        let bits = log2_rounded(avg_size as u32);
        let mask_s = mask(bits + 1);
        let mask_l = mask(bits - 1);
        Ok(Self {
            min_size,
            avg_size,
            max_size,
            bits,
            mask_s,
            mask_l,
        })
    }

    /// Compute the center size (width of the strict-mask region) for a
    /// source of the given total size. Pass `usize::MAX` when the source
    /// size is not known up front (e.g. a non-seekable stream); the center
    /// size is then only bounded by `avg_size`.
    pub fn center_size(&self, source_size: usize) -> usize {
        center_size(self.avg_size, self.min_size, source_size)
    }
}

/// Base-2 logarithm, rounded to nearest, for unsigned 32-bit integers.
pub fn log2_rounded(value: u32) -> u32 {
    f64::from(value).log2().round() as u32
}

/// Integer division that rounds up instead of down.
pub fn ceil_div(x: usize, y: usize) -> usize {
    (x + y - 1) / y
}

/// Find the width of the "center size" region: the strict-mask phase runs
/// from `min_size` up to `min_size + center_size(..)`.
pub fn center_size(average: usize, minimum: usize, source_size: usize) -> usize {
    let mut offset = minimum + ceil_div(minimum, 2);
    if offset > average {
        offset = average;
    }
    let size = average - offset;
    if size > source_size {
        source_size
    } else {
        size
    }
}

/// Returns a bit mask with the low `bits` bits set to 1, i.e. `2^bits - 1`.
///
/// # Panics
///
/// Panics if `bits` is 0 or greater than 31. Both parameter validation
/// (`Params::new`) and the caller-facing [`crate::find_cut`] function
/// guarantee `bits` stays within `1..=31` for any validated [`Params`], so
/// this is only reachable by calling `mask` directly with an out-of-range
/// value.
pub fn mask(bits: u32) -> u32 {
    assert!(bits >= 1);
    assert!(bits <= 31);
    2u32.pow(bits) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log2_rounded() {
        assert_eq!(log2_rounded(32767), 15);
        assert_eq!(log2_rounded(32768), 15);
        assert_eq!(log2_rounded(32769), 15);
        assert_eq!(log2_rounded(65535), 16);
        assert_eq!(log2_rounded(65536), 16);
        assert_eq!(log2_rounded(65537), 16);
    }

    #[test]
    fn test_ceil_div() {
        assert_eq!(ceil_div(10, 5), 2);
        assert_eq!(ceil_div(11, 5), 3);
        assert_eq!(ceil_div(10, 3), 4);
        assert_eq!(ceil_div(9, 3), 3);
        assert_eq!(ceil_div(6, 2), 3);
        assert_eq!(ceil_div(5, 2), 3);
    }

    #[test]
    fn test_center_size() {
        assert_eq!(center_size(50, 100, 50), 0);
        assert_eq!(center_size(200, 100, 50), 50);
        assert_eq!(center_size(200, 100, 40), 40);
    }

    #[test]
    #[should_panic]
    fn test_mask_low() {
        mask(0);
    }

    #[test]
    #[should_panic]
    fn test_mask_high() {
        mask(32);
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask(24), 16_777_215);
        assert_eq!(mask(16), 65535);
        assert_eq!(mask(10), 1023);
        assert_eq!(mask(8), 255);
    }

    #[test]
    fn test_minimum_too_low() {
        assert!(matches!(
            Params::new(63, 256, 1024),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_minimum_too_high() {
        assert!(matches!(
            Params::new(67_108_867, 256, 1024),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_average_too_low() {
        assert!(matches!(
            Params::new(64, 255, 1024),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_average_too_high() {
        assert!(matches!(
            Params::new(64, 268_435_457, 1024),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_maximum_too_low() {
        assert!(matches!(
            Params::new(64, 256, 1023),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_maximum_too_high() {
        assert!(matches!(
            Params::new(64, 256, 1_073_741_825),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_valid_params_idempotent() {
        let a = Params::new(8192, 16384, 32768).unwrap();
        let b = Params::new(8192, 16384, 32768).unwrap();
        assert_eq!(a.bits, b.bits);
        assert_eq!(a.mask_s, b.mask_s);
        assert_eq!(a.mask_l, b.mask_l);
        assert_eq!(a.center_size(usize::MAX), b.center_size(usize::MAX));
    }
}
