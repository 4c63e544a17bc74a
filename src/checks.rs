use subtle::ConstantTimeEq;

use crate::attributes::*;
use crate::error::*;

// check_size returns ErrAttributeSizeInvalid if got is not equal to expected.
pub fn check_size(_at: AttrType, got: usize, expected: usize) -> Result<()> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::ErrAttributeSizeInvalid)
    }
}

// check_overflow returns ErrAttributeSizeOverflow if got is bigger than max.
pub fn check_overflow(_at: AttrType, got: usize, max: usize) -> Result<()> {
    if got <= max {
        Ok(())
    } else {
        Err(Error::ErrAttributeSizeOverflow)
    }
}

// check_hmac compares two HMAC values in constant time, returning
// ErrIntegrityMismatch if they differ.
pub fn check_hmac(got: &[u8], expected: &[u8]) -> Result<()> {
    if got.ct_eq(expected).unwrap_u8() != 1 {
        Err(Error::ErrIntegrityMismatch)
    } else {
        Ok(())
    }
}

// check_fingerprint compares fingerprint values, returning
// ErrFingerprintMismatch if they differ.
pub fn check_fingerprint(got: u32, expected: u32) -> Result<()> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::ErrFingerprintMismatch)
    }
}
