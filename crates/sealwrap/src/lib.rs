//! Symmetric authenticated-encryption envelopes.
//!
//! Given a shared encryption key and a shared MAC key, [`EnvelopeCipher`]
//! turns plaintext into a self-describing, tamper-evident blob and reverses
//! the process with integrity verification. The construction is
//! encrypt-then-MAC: the MAC covers `IV ‖ cipher output`, and decryption
//! verifies it in constant time before any block is decrypted.
//!
//! # Wire format
//!
//! ```text
//! base64( rjd-256-hmac-sha256 | base64(IV ‖ cipher output) | base64(MAC) )
//! ```
//!
//! The leading tag names the exact cipher/mode/MAC combination — Rijndael
//! with a 256-bit block in CBC mode, PKCS7 padding, untruncated HMAC-SHA256 —
//! so an envelope from an incompatible revision fails explicitly with
//! [`EnvelopeError::UnknownConstruction`] instead of decrypting to garbage.
//!
//! # Example
//!
//! ```
//! use sealwrap::EnvelopeCipher;
//!
//! let cipher = EnvelopeCipher::new(
//!     "nXA5gXtlOgHgxl6EZTfkfDmIzWaRqxZ1rq7DRNCIQ/Q=",
//!     "K9iPmOMowXUvcQTd7ehfcxvvHd4OtzyztQp+wuQwb6U=",
//! )?;
//! let envelope = cipher.encrypt(b"FooBar ", None)?;
//! assert_eq!(cipher.decrypt(&envelope)?, b"FooBar ");
//! # Ok::<(), sealwrap::EnvelopeError>(())
//! ```
//!
//! # Failure policy
//!
//! Every error is terminal and surfaced immediately; the library never logs,
//! retries, or repairs. Signature and padding failures stay distinct
//! variants — callers serving untrusted peers may collapse the two into one
//! message at their own boundary.

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod padding;
pub mod rijndael;

pub use cipher::EnvelopeCipher;
pub use envelope::{Construction, Envelope, RJD_256_HMAC_SHA256};
pub use error::{EnvelopeError, KeyKind};
pub use keys::KeyMaterial;
