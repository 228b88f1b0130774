//! Error types for envelope construction, parsing, and decryption.

use thiserror::Error;

/// Which of the two independent keys failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// The block-cipher encryption key.
    Encryption,
    /// The MAC key.
    Mac,
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyKind::Encryption => f.write_str("encryption"),
            KeyKind::Mac => f.write_str("MAC"),
        }
    }
}

/// Errors produced by the envelope layer.
///
/// All variants are terminal and non-retryable: they indicate caller misuse or
/// tampered/corrupt data, never a transient condition. Errors are surfaced
/// immediately to the caller; nothing is logged or swallowed internally.
///
/// [`InvalidSignature`](EnvelopeError::InvalidSignature) and
/// [`InvalidPadding`](EnvelopeError::InvalidPadding) are kept as distinct
/// variants with distinct messages. Callers exposing decryption to untrusted
/// peers may merge the two at their own boundary; the library keeps them apart
/// so the verify-then-decrypt ordering stays testable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// A key decoded to the wrong number of bytes (or failed to decode).
    #[error("{kind} key must be exactly {expected} bytes long")]
    InvalidKeySize {
        /// Which key failed the check.
        kind: KeyKind,
        /// The construction's required key size in bytes.
        expected: usize,
    },

    /// A caller-supplied IV decoded to the wrong number of bytes.
    #[error("IV must be exactly {expected} bytes long")]
    InvalidIvLength {
        /// The construction's block size in bytes.
        expected: usize,
    },

    /// PKCS7 is undefined for this block size (it must fit in one byte).
    #[error("unsupported block size: {0}")]
    UnsupportedBlockSize(usize),

    /// The wire form is not a well-formed envelope: bad base64 at either
    /// layer, wrong field count, or field lengths inconsistent with the
    /// construction.
    #[error("invalid envelope encoding")]
    MalformedEnvelope,

    /// The envelope names a construction this instance does not speak.
    /// Raised before any MAC or decryption work.
    #[error("unknown construction: {0:?}")]
    UnknownConstruction(String),

    /// The MAC did not verify. The ciphertext was never decrypted.
    #[error("invalid signature")]
    InvalidSignature,

    /// The authenticated plaintext carried malformed PKCS7 padding.
    #[error("invalid padding")]
    InvalidPadding,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_size_message_names_kind_and_size() {
        let e = EnvelopeError::InvalidKeySize {
            kind: KeyKind::Encryption,
            expected: 32,
        };
        assert_eq!(e.to_string(), "encryption key must be exactly 32 bytes long");

        let e = EnvelopeError::InvalidKeySize {
            kind: KeyKind::Mac,
            expected: 32,
        };
        assert_eq!(e.to_string(), "MAC key must be exactly 32 bytes long");
    }

    #[test]
    fn unknown_construction_names_received_tag() {
        let e = EnvelopeError::UnknownConstruction("rjd-256-hmac-sha256/128".into());
        assert!(e.to_string().contains("rjd-256-hmac-sha256/128"));
    }

    #[test]
    fn signature_and_padding_failures_are_distinct() {
        assert_ne!(
            EnvelopeError::InvalidSignature.to_string(),
            EnvelopeError::InvalidPadding.to_string()
        );
    }
}
