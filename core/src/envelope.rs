//! Envelope encoding of ciphertexts
//!
//! An envelope carries everything the recipient needs to decrypt: the
//! ephemeral public key, the nonce, the ciphertext body, and the
//! authentication tag. The binary layout is order-fixed with the single
//! variable-length field in the middle, so distinct field sets can never
//! encode to the same string:
//!
//! ```text
//! version(1) || ephemeral_public(33) || nonce(12) || ciphertext(N) || tag(16)
//! ```
//!
//! The whole thing travels as one standard base64 string the caller treats
//! as opaque.

use alloc::string::String;
use alloc::vec::Vec;

use base64::{engine::general_purpose, Engine as _};

use crate::cipher::{AesNonce, AesTag, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Reason};
use crate::keys::{PublicKey, POINT_SIZE};
use crate::VERSION;

/// Smallest well-formed envelope: empty ciphertext
const MIN_ENVELOPE_SIZE: usize = 1 + POINT_SIZE + NONCE_SIZE + TAG_SIZE;

/// Ciphertext on the wire
///
/// Produced by [`PublicKey::encrypt`](crate::PublicKey::encrypt), consumed
/// by [`SecretKey::decrypt`](crate::SecretKey::decrypt). Any corruption of
/// any field makes the tag check fail on decryption.
pub struct Envelope {
    pub(crate) ephemeral_public: PublicKey,
    pub(crate) nonce: AesNonce,
    pub(crate) ciphertext: Vec<u8>,
    pub(crate) tag: AesTag,
}

impl Envelope {
    /// Serializes the envelope to its base64 string form
    pub fn pack(&self) -> String {
        let mut bytes = Vec::with_capacity(MIN_ENVELOPE_SIZE + self.ciphertext.len());
        bytes.push(VERSION);
        bytes.extend_from_slice(&self.ephemeral_public.to_point_bytes());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes.extend_from_slice(&self.tag);
        general_purpose::STANDARD.encode(bytes)
    }

    /// Parses an envelope from its base64 string form
    ///
    /// Strict parse: invalid base64, a short buffer, a version mismatch or
    /// a ephemeral key that isn't a valid non-identity curve point are all
    /// rejected here, before any cryptographic step runs. Corruption within
    /// the ciphertext body is not detectable at this layer; it surfaces as
    /// an authentication failure on decryption.
    pub fn unpack(envelope: &str) -> Result<Self, Error> {
        let bytes = general_purpose::STANDARD
            .decode(envelope)
            .map_err(|_| Reason::MalformedEnvelope)?;
        if bytes.len() < MIN_ENVELOPE_SIZE {
            return Err(Reason::MalformedEnvelope.into());
        }
        if bytes[0] != VERSION {
            return Err(Reason::VersionMismatched(bytes[0]).into());
        }

        let (ephemeral_public, rest) = bytes[1..].split_at(POINT_SIZE);
        let (nonce_bytes, rest) = rest.split_at(NONCE_SIZE);
        let (ciphertext, tag_bytes) = rest.split_at(rest.len() - TAG_SIZE);

        let ephemeral_public =
            PublicKey::from_point_bytes(ephemeral_public).map_err(|_| Reason::MalformedEnvelope)?;
        let mut nonce = AesNonce::default();
        nonce.copy_from_slice(nonce_bytes);
        let mut tag = AesTag::default();
        tag.copy_from_slice(tag_bytes);

        Ok(Self {
            ephemeral_public,
            nonce,
            ciphertext: ciphertext.to_vec(),
            tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;

    use base64::{engine::general_purpose, Engine as _};
    use rand_core::RngCore;

    use super::Envelope;
    use crate::keys::SecretKey;

    fn sample_envelope(rng: &mut rand_dev::DevRng) -> Envelope {
        let pk = SecretKey::generate(rng).public_key();
        pk.encrypt(rng, b"some message").unwrap()
    }

    #[test]
    fn pack_unpack_roundtrip() {
        let mut rng = rand_dev::DevRng::new();

        let envelope = sample_envelope(&mut rng);
        let restored = Envelope::unpack(&envelope.pack()).unwrap();

        assert_eq!(restored.ephemeral_public, envelope.ephemeral_public);
        assert_eq!(restored.nonce, envelope.nonce);
        assert_eq!(restored.ciphertext, envelope.ciphertext);
        assert_eq!(restored.tag, envelope.tag);
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(Envelope::unpack("not base64 !!!").is_err());
    }

    #[test]
    fn rejects_truncated_envelopes() {
        let mut rng = rand_dev::DevRng::new();

        // Every prefix strictly below the minimum size must be rejected
        let envelope = sample_envelope(&mut rng);
        let bytes = general_purpose::STANDARD.decode(envelope.pack()).unwrap();
        for len in 0..62 {
            let truncated = general_purpose::STANDARD.encode(&bytes[..len]);
            assert!(Envelope::unpack(&truncated).is_err(), "accepted length {len}");
        }
    }

    #[test]
    fn rejects_wrong_version() {
        let mut rng = rand_dev::DevRng::new();

        let envelope = sample_envelope(&mut rng);
        let mut bytes = general_purpose::STANDARD.decode(envelope.pack()).unwrap();
        bytes[0] = 2;
        let repacked = general_purpose::STANDARD.encode(bytes);
        assert!(Envelope::unpack(&repacked).is_err());
    }

    #[test]
    fn rejects_invalid_embedded_key() {
        let mut rng = rand_dev::DevRng::new();

        let envelope = sample_envelope(&mut rng);
        let mut bytes = general_purpose::STANDARD.decode(envelope.pack()).unwrap();
        // Overwrite the ephemeral key with bytes that encode no curve point
        for byte in bytes[1..34].iter_mut() {
            *byte = 0;
        }
        let repacked = general_purpose::STANDARD.encode(bytes);
        assert!(Envelope::unpack(&repacked).is_err());
    }

    #[test]
    fn empty_ciphertext_has_minimal_size() {
        let mut rng = rand_dev::DevRng::new();

        let pk = SecretKey::generate(&mut rng).public_key();
        let envelope = pk.encrypt(&mut rng, b"").unwrap();
        let bytes = general_purpose::STANDARD.decode(envelope.pack()).unwrap();
        assert_eq!(bytes.len(), 62);
    }

    #[test]
    fn random_garbage_does_not_panic() {
        let mut rng = rand_dev::DevRng::new();

        let mut garbage = vec![0u8; 200];
        rng.fill_bytes(&mut garbage);
        let _ = Envelope::unpack(&general_purpose::STANDARD.encode(&garbage));
        let _ = Envelope::unpack(&String::from_utf8_lossy(&garbage));
    }
}
