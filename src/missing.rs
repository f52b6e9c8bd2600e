//! The reserved missing-value sentinel.
//!
//! Node-level output arrays mix genuine probabilities with "not applicable"
//! entries (founder nodes, zero-depth nodes). The sentinel is a dedicated
//! NaN bit pattern (the BCF float-missing value), so it survives bit-level
//! serialization and can never be confused with `0.0` or with an ordinary
//! NaN produced by a computation. Consumers must check [`is_missing`]
//! before doing arithmetic on any node-level value.

const MISSING_BITS: u32 = 0x7F80_0001;

/// The sentinel marking a "not applicable" entry in node-level outputs.
pub const FLOAT_MISSING: f32 = f32::from_bits(MISSING_BITS);

/// Companion predicate for [`FLOAT_MISSING`].
///
/// Matches the exact sentinel bit pattern only: ordinary NaNs, zeros and
/// infinities are not missing.
pub fn is_missing(value: f32) -> bool {
    value.to_bits() == MISSING_BITS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_recognized() {
        assert!(is_missing(FLOAT_MISSING));
    }

    #[test]
    fn sentinel_is_not_zero_nor_nan() {
        assert!(!is_missing(0.0));
        assert!(!is_missing(-0.0));
        assert!(!is_missing(f32::NAN));
        assert!(!is_missing(f32::INFINITY));
        assert!(FLOAT_MISSING.is_nan()); // NaN payload, but a specific one
    }

    #[test]
    fn sentinel_roundtrips_through_bits() {
        let bits = FLOAT_MISSING.to_bits();
        assert!(is_missing(f32::from_bits(bits)));
    }
}
