//! [`KeyMaterial`]: the validated encryption/MAC key pair.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{EnvelopeError, KeyKind};

/// The two independent keys an [`EnvelopeCipher`](crate::EnvelopeCipher) owns
/// for its entire lifetime.
///
/// Construction validates both key sizes; no partial object exists on failure.
/// When this type is dropped, both buffers are overwritten with zeroes to
/// minimise the window during which key material lives in RAM.
pub struct KeyMaterial {
    encryption_key: Vec<u8>,
    mac_key: Vec<u8>,
}

impl KeyMaterial {
    /// Decode and size-check a base64 key pair.
    ///
    /// The two checks are independent and produce distinct messages: a bad
    /// encryption key is reported even when the MAC key is also bad. A key
    /// that is not valid base64 fails the same way as a wrongly sized one —
    /// it is never truncated, padded, or repaired.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidKeySize`] naming the offending key and
    /// the required size.
    pub fn from_base64(
        encryption_key_b64: &str,
        mac_key_b64: &str,
        required: usize,
    ) -> Result<Self, EnvelopeError> {
        let encryption_key = decode_key(encryption_key_b64, KeyKind::Encryption, required)?;
        let mac_key = decode_key(mac_key_b64, KeyKind::Mac, required)?;
        Ok(Self {
            encryption_key,
            mac_key,
        })
    }

    /// Raw encryption key bytes.
    pub fn encryption_key(&self) -> &[u8] {
        &self.encryption_key
    }

    /// Raw MAC key bytes.
    pub fn mac_key(&self) -> &[u8] {
        &self.mac_key
    }
}

fn decode_key(key_b64: &str, kind: KeyKind, required: usize) -> Result<Vec<u8>, EnvelopeError> {
    let invalid = || EnvelopeError::InvalidKeySize {
        kind,
        expected: required,
    };
    let key = STANDARD.decode(key_b64).map_err(|_| invalid())?;
    if key.len() != required {
        return Err(invalid());
    }
    Ok(key)
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.encryption_key.iter_mut().for_each(|b| *b = 0);
        self.mac_key.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("KeyMaterial([REDACTED])")
    }
}
