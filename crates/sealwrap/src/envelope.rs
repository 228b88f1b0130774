//! The tagged `tag|ciphertext|mac` wire format.
//!
//! Serialized form, outermost layer first:
//!
//! ```text
//! base64( <tag> | base64(IV ‖ cipher output) | base64(MAC) )
//! ```
//!
//! The tag names the exact algorithm/mode/MAC/truncation combination that
//! produced the envelope, so incompatible revisions can coexist and be told
//! apart on read instead of silently reinterpreting each other's bytes.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::EnvelopeError;

/// Field delimiter inside the outer base64 layer.
const DELIMITER: char = '|';

/// The fixed parameters of one envelope construction.
///
/// A future revision becomes a new constant with a new tag; decryption of a
/// foreign tag fails explicitly rather than guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Construction {
    /// ASCII identifier embedded in every envelope.
    pub tag: &'static str,
    /// Cipher block size in bytes; also the IV length.
    pub block_size: usize,
    /// Required size of each key in bytes.
    pub key_size: usize,
    /// MAC length in bytes after any truncation.
    pub mac_len: usize,
}

/// The canonical construction: Rijndael-256 in CBC mode with PKCS7 padding,
/// authenticated by untruncated HMAC-SHA256 over `IV ‖ cipher output`.
pub const RJD_256_HMAC_SHA256: Construction = Construction {
    tag: "rjd-256-hmac-sha256",
    block_size: crate::rijndael::BLOCK_SIZE,
    key_size: crate::rijndael::KEY_SIZE,
    mac_len: 32,
};

/// A parsed envelope: construction tag, `IV ‖ cipher output`, and MAC.
///
/// Produced only by encryption or by [`Envelope::from_wire`]; a value,
/// constructed once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Construction tag this envelope was produced under.
    pub tag: String,
    /// Raw IV followed by the cipher output.
    pub ciphertext: Vec<u8>,
    /// MAC over `ciphertext`.
    pub mac: Vec<u8>,
}

impl Envelope {
    /// Serialize to the outer base64 transport form.
    pub fn to_wire(&self) -> String {
        let joined = format!(
            "{}{DELIMITER}{}{DELIMITER}{}",
            self.tag,
            STANDARD.encode(&self.ciphertext),
            STANDARD.encode(&self.mac),
        );
        STANDARD.encode(joined)
    }

    /// Parse and validate the wire form against an expected construction.
    ///
    /// The tag is compared before the field payloads are decoded: a foreign
    /// tag may imply a different MAC or cipher entirely, so no MAC or
    /// decryption work happens for it.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::MalformedEnvelope`] if base64 decoding fails at
    ///   either layer, the field count is not three, the ciphertext is
    ///   shorter than the IV plus one block (or not block-aligned), or the
    ///   MAC length does not match the construction.
    /// - [`EnvelopeError::UnknownConstruction`] if the tag differs from
    ///   `expected.tag`, carrying the received tag.
    pub fn from_wire(wire: &str, expected: &Construction) -> Result<Self, EnvelopeError> {
        let joined = STANDARD
            .decode(wire)
            .map_err(|_| EnvelopeError::MalformedEnvelope)?;
        let joined = String::from_utf8(joined).map_err(|_| EnvelopeError::MalformedEnvelope)?;

        let mut fields = joined.split(DELIMITER);
        let (tag, ciphertext_b64, mac_b64) = match (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) {
            (Some(tag), Some(ciphertext), Some(mac), None) => (tag, ciphertext, mac),
            _ => return Err(EnvelopeError::MalformedEnvelope),
        };

        if tag != expected.tag {
            return Err(EnvelopeError::UnknownConstruction(tag.to_owned()));
        }

        let ciphertext = STANDARD
            .decode(ciphertext_b64)
            .map_err(|_| EnvelopeError::MalformedEnvelope)?;
        let mac = STANDARD
            .decode(mac_b64)
            .map_err(|_| EnvelopeError::MalformedEnvelope)?;

        // IV plus at least one full block, block-aligned throughout.
        if ciphertext.len() < 2 * expected.block_size
            || ciphertext.len() % expected.block_size != 0
        {
            return Err(EnvelopeError::MalformedEnvelope);
        }
        // A wrong-length MAC can never verify; reject it here so the
        // constant-time comparison only ever sees two fixed-length values.
        if mac.len() != expected.mac_len {
            return Err(EnvelopeError::MalformedEnvelope);
        }

        Ok(Self {
            tag: tag.to_owned(),
            ciphertext,
            mac,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope {
            tag: RJD_256_HMAC_SHA256.tag.to_owned(),
            ciphertext: vec![0xA5; 64],
            mac: vec![0x5A; 32],
        }
    }

    #[test]
    fn wire_round_trip() {
        let envelope = sample();
        let parsed = Envelope::from_wire(&envelope.to_wire(), &RJD_256_HMAC_SHA256).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn rejects_outer_base64_garbage() {
        assert_eq!(
            Envelope::from_wire("!!not base64!!", &RJD_256_HMAC_SHA256),
            Err(EnvelopeError::MalformedEnvelope)
        );
    }

    #[test]
    fn rejects_wrong_field_count() {
        for joined in ["only-one-field", "two|fields", "a|b|c|d"] {
            let wire = STANDARD.encode(joined);
            assert_eq!(
                Envelope::from_wire(&wire, &RJD_256_HMAC_SHA256),
                Err(EnvelopeError::MalformedEnvelope),
                "{joined:?} should not parse"
            );
        }
    }

    #[test]
    fn rejects_inner_base64_garbage() {
        let wire = STANDARD.encode(format!("{}|@@@@|{}", RJD_256_HMAC_SHA256.tag, "AAAA"));
        assert_eq!(
            Envelope::from_wire(&wire, &RJD_256_HMAC_SHA256),
            Err(EnvelopeError::MalformedEnvelope)
        );
    }

    #[test]
    fn foreign_tag_fails_with_received_tag() {
        let mut envelope = sample();
        envelope.tag = "rjd-256-hmac-sha256/128".to_owned();
        assert_eq!(
            Envelope::from_wire(&envelope.to_wire(), &RJD_256_HMAC_SHA256),
            Err(EnvelopeError::UnknownConstruction(
                "rjd-256-hmac-sha256/128".to_owned()
            ))
        );
    }

    #[test]
    fn tag_checked_before_field_payloads() {
        // Undecodable payload fields behind a foreign tag: the tag mismatch
        // must win, proving nothing was decoded past it.
        let wire = STANDARD.encode("some-other-tag|@@@@|@@@@");
        assert_eq!(
            Envelope::from_wire(&wire, &RJD_256_HMAC_SHA256),
            Err(EnvelopeError::UnknownConstruction("some-other-tag".to_owned()))
        );
    }

    #[test]
    fn rejects_ciphertext_shorter_than_iv_plus_block() {
        let mut envelope = sample();
        envelope.ciphertext.truncate(32);
        assert_eq!(
            Envelope::from_wire(&envelope.to_wire(), &RJD_256_HMAC_SHA256),
            Err(EnvelopeError::MalformedEnvelope)
        );
    }

    #[test]
    fn rejects_misaligned_ciphertext() {
        let mut envelope = sample();
        envelope.ciphertext.push(0x00);
        assert_eq!(
            Envelope::from_wire(&envelope.to_wire(), &RJD_256_HMAC_SHA256),
            Err(EnvelopeError::MalformedEnvelope)
        );
    }

    #[test]
    fn rejects_wrong_mac_length() {
        let mut envelope = sample();
        envelope.mac.truncate(16);
        assert_eq!(
            Envelope::from_wire(&envelope.to_wire(), &RJD_256_HMAC_SHA256),
            Err(EnvelopeError::MalformedEnvelope)
        );
    }
}
