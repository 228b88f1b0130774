//! PKCS7 block padding.
//!
//! The pad length is always in `[1, block_size]`: plaintext that is already
//! block-aligned gains a full block of padding, so every padded message ends
//! with an unambiguous pad-length byte.

use crate::error::EnvelopeError;

/// Append PKCS7 padding, returning a block-aligned copy of `plaintext`.
///
/// # Errors
///
/// Returns [`EnvelopeError::UnsupportedBlockSize`] unless
/// `0 < block_size < 256` (the pad length must fit in one byte).
pub fn pad(plaintext: &[u8], block_size: usize) -> Result<Vec<u8>, EnvelopeError> {
    check_block_size(block_size)?;
    let pad_len = block_size - (plaintext.len() % block_size);
    let mut padded = Vec::with_capacity(plaintext.len() + pad_len);
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + pad_len, pad_len as u8);
    Ok(padded)
}

/// Strip PKCS7 padding, returning the original plaintext.
///
/// The last byte is read as the claimed pad length, and exactly that many
/// trailing bytes must all equal it. Anything else is rejected outright —
/// padding is never guessed at or repaired.
///
/// Callers must only invoke this on data whose MAC has already verified; an
/// unpad failure is still a hard decryption failure, not a separate outcome.
///
/// # Errors
///
/// Returns [`EnvelopeError::UnsupportedBlockSize`] for block sizes outside
/// `1..=255`, and [`EnvelopeError::InvalidPadding`] if the input is empty,
/// not block-aligned, or carries a malformed pad.
pub fn unpad(padded: &[u8], block_size: usize) -> Result<Vec<u8>, EnvelopeError> {
    check_block_size(block_size)?;
    if padded.is_empty() || padded.len() % block_size != 0 {
        return Err(EnvelopeError::InvalidPadding);
    }

    let pad_len = padded[padded.len() - 1] as usize;
    if pad_len == 0 || pad_len > block_size {
        return Err(EnvelopeError::InvalidPadding);
    }
    let (plaintext, pad) = padded.split_at(padded.len() - pad_len);
    if pad.iter().any(|&b| b as usize != pad_len) {
        return Err(EnvelopeError::InvalidPadding);
    }
    Ok(plaintext.to_vec())
}

fn check_block_size(block_size: usize) -> Result<(), EnvelopeError> {
    if block_size == 0 || block_size > 255 {
        return Err(EnvelopeError::UnsupportedBlockSize(block_size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_block_boundary() {
        let padded = pad(b"FooBar ", 32).unwrap();
        assert_eq!(padded.len(), 32);
        assert_eq!(&padded[..7], b"FooBar ");
        assert!(padded[7..].iter().all(|&b| b == 25));
    }

    #[test]
    fn aligned_input_gains_a_full_block() {
        let padded = pad(&[0xAA; 16], 16).unwrap();
        assert_eq!(padded.len(), 32);
        assert!(padded[16..].iter().all(|&b| b == 16));
    }

    #[test]
    fn empty_input_pads_to_one_block() {
        let padded = pad(b"", 8).unwrap();
        assert_eq!(padded, vec![8u8; 8]);
    }

    #[test]
    fn round_trip() {
        for len in 0..=65 {
            let plaintext: Vec<u8> = (0..len as u8).collect();
            let padded = pad(&plaintext, 32).unwrap();
            assert_eq!(unpad(&padded, 32).unwrap(), plaintext);
        }
    }

    #[test]
    fn rejects_unsupported_block_sizes() {
        assert_eq!(pad(b"x", 0), Err(EnvelopeError::UnsupportedBlockSize(0)));
        assert_eq!(pad(b"x", 256), Err(EnvelopeError::UnsupportedBlockSize(256)));
        assert_eq!(unpad(&[1], 0), Err(EnvelopeError::UnsupportedBlockSize(0)));
        assert_eq!(
            unpad(&[1], 256),
            Err(EnvelopeError::UnsupportedBlockSize(256))
        );
    }

    #[test]
    fn unpad_rejects_empty_and_misaligned_input() {
        assert_eq!(unpad(&[], 16), Err(EnvelopeError::InvalidPadding));
        assert_eq!(unpad(&[1u8; 15], 16), Err(EnvelopeError::InvalidPadding));
    }

    #[test]
    fn unpad_rejects_zero_pad_length() {
        let mut block = vec![7u8; 16];
        block[15] = 0;
        assert_eq!(unpad(&block, 16), Err(EnvelopeError::InvalidPadding));
    }

    #[test]
    fn unpad_rejects_pad_length_beyond_block() {
        let mut block = vec![7u8; 16];
        block[15] = 17;
        assert_eq!(unpad(&block, 16), Err(EnvelopeError::InvalidPadding));
    }

    #[test]
    fn unpad_rejects_inconsistent_pad_bytes() {
        let mut padded = pad(b"FooBar ", 32).unwrap();
        padded[30] ^= 0x01;
        assert_eq!(unpad(&padded, 32), Err(EnvelopeError::InvalidPadding));
    }
}
