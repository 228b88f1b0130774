//! [`EnvelopeCipher`]: encrypt-then-MAC orchestration.
//!
//! Encryption pads and CBC-encrypts the plaintext, prepends the raw IV, and
//! authenticates the whole `IV ‖ cipher output` with HMAC-SHA256. Decryption
//! runs the other way around and **verifies before it decrypts**: a tampered
//! envelope fails the MAC check and is never decrypted or unpadded, so there
//! is no padding-oracle or decryption-oracle surface.
//!
//! The cipher is stateless beyond its immutable keys and construction
//! parameters; `&self` calls are safe to run concurrently.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::envelope::{Construction, Envelope, RJD_256_HMAC_SHA256};
use crate::error::{EnvelopeError, KeyKind};
use crate::keys::KeyMaterial;
use crate::padding;
use crate::rijndael::{Rijndael256, BLOCK_SIZE, KEY_SIZE};

type HmacSha256 = Hmac<Sha256>;

/// A symmetric authenticated-encryption envelope cipher.
///
/// Owns its [`KeyMaterial`] for its entire lifetime; all other state is the
/// fixed [`Construction`].
#[derive(Debug)]
pub struct EnvelopeCipher {
    keys: KeyMaterial,
    params: Construction,
}

impl EnvelopeCipher {
    /// Build a cipher for the canonical construction from a base64 key pair.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidKeySize`] if either key does not
    /// decode to exactly the construction's key size.
    pub fn new(encryption_key_b64: &str, mac_key_b64: &str) -> Result<Self, EnvelopeError> {
        let params = RJD_256_HMAC_SHA256;
        let keys = KeyMaterial::from_base64(encryption_key_b64, mac_key_b64, params.key_size)?;
        Ok(Self { keys, params })
    }

    /// The construction this instance encrypts under and accepts on decrypt.
    pub fn construction(&self) -> &Construction {
        &self.params
    }

    /// Encrypt `plaintext` into a wire-form envelope.
    ///
    /// With `iv_b64` absent, one block of fresh randomness is drawn from the
    /// OS CSPRNG. Supplying an IV exists for reproducing test vectors; an IV
    /// must never be reused under the same key in production.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidIvLength`] if a supplied IV does not
    /// decode to exactly one block.
    pub fn encrypt(&self, plaintext: &[u8], iv_b64: Option<&str>) -> Result<String, EnvelopeError> {
        let iv = match iv_b64 {
            Some(iv_b64) => self.decode_iv(iv_b64)?,
            None => self.random_iv(),
        };

        let mut body = padding::pad(plaintext, self.params.block_size)?;
        cbc_encrypt(&self.block_cipher()?, &iv, &mut body);

        let mut ciphertext = iv;
        ciphertext.extend_from_slice(&body);
        let mac = self.compute_mac(&ciphertext)?;

        let envelope = Envelope {
            tag: self.params.tag.to_owned(),
            ciphertext,
            mac,
        };
        Ok(envelope.to_wire())
    }

    /// Verify and decrypt a wire-form envelope back to plaintext.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::MalformedEnvelope`] for anything that does not
    ///   parse as an envelope of this construction.
    /// - [`EnvelopeError::UnknownConstruction`] for a foreign tag; nothing
    ///   is decrypted.
    /// - [`EnvelopeError::InvalidSignature`] if the MAC does not verify;
    ///   nothing is decrypted.
    /// - [`EnvelopeError::InvalidPadding`] if the authenticated plaintext
    ///   carries malformed padding.
    pub fn decrypt(&self, wire: &str) -> Result<Vec<u8>, EnvelopeError> {
        let envelope = Envelope::from_wire(wire, &self.params)?;

        let expected_mac = self.compute_mac(&envelope.ciphertext)?;
        // Both values are exactly `mac_len` bytes (enforced at parse time);
        // `ct_eq` XOR-accumulates over the full length with no early exit.
        if !bool::from(expected_mac.ct_eq(&envelope.mac)) {
            return Err(EnvelopeError::InvalidSignature);
        }

        let (iv, body) = envelope.ciphertext.split_at(self.params.block_size);
        let mut body = body.to_vec();
        cbc_decrypt(&self.block_cipher()?, iv, &mut body);
        padding::unpad(&body, self.params.block_size)
    }

    /// Generate a fresh base64-encoded IV of one block.
    pub fn generate_iv(&self) -> String {
        STANDARD.encode(self.random_iv())
    }

    fn random_iv(&self) -> Vec<u8> {
        let mut iv = vec![0u8; self.params.block_size];
        OsRng.fill_bytes(&mut iv);
        iv
    }

    fn decode_iv(&self, iv_b64: &str) -> Result<Vec<u8>, EnvelopeError> {
        let expected = self.params.block_size;
        let iv = STANDARD
            .decode(iv_b64)
            .map_err(|_| EnvelopeError::InvalidIvLength { expected })?;
        if iv.len() != expected {
            return Err(EnvelopeError::InvalidIvLength { expected });
        }
        Ok(iv)
    }

    fn block_cipher(&self) -> Result<Rijndael256, EnvelopeError> {
        let key: &[u8; KEY_SIZE] =
            self.keys
                .encryption_key()
                .try_into()
                .map_err(|_| EnvelopeError::InvalidKeySize {
                    kind: KeyKind::Encryption,
                    expected: KEY_SIZE,
                })?;
        Ok(Rijndael256::new(key))
    }

    fn compute_mac(&self, ciphertext: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let mut mac = HmacSha256::new_from_slice(self.keys.mac_key()).map_err(|_| {
            EnvelopeError::InvalidKeySize {
                kind: KeyKind::Mac,
                expected: self.params.key_size,
            }
        })?;
        mac.update(ciphertext);
        let digest = mac.finalize().into_bytes();
        Ok(digest[..self.params.mac_len].to_vec())
    }
}

/// CBC-encrypt block-aligned `data` in place.
fn cbc_encrypt(cipher: &Rijndael256, iv: &[u8], data: &mut [u8]) {
    let mut prev = [0u8; BLOCK_SIZE];
    prev.copy_from_slice(iv);

    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        for (b, p) in block.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        cipher.encrypt_block(&mut block);
        chunk.copy_from_slice(&block);
        prev = block;
    }
}

/// CBC-decrypt block-aligned `data` in place. No padding removal.
fn cbc_decrypt(cipher: &Rijndael256, iv: &[u8], data: &mut [u8]) {
    let mut prev = [0u8; BLOCK_SIZE];
    prev.copy_from_slice(iv);

    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        let ciphertext_block = block;
        cipher.decrypt_block(&mut block);
        for (b, p) in block.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        chunk.copy_from_slice(&block);
        prev = ciphertext_block;
    }
}
