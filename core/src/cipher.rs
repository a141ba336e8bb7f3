//! Authenticated symmetric cipher
//!
//! Thin layer over AES256-GCM with a detached tag. Every key handed to
//! [`seal`] is single-use (derived from a fresh ephemeral agreement), and
//! the nonce is drawn fresh from the caller's RNG per call; a (key, nonce)
//! pair is never reused.

use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit};
use rand_core::{CryptoRng, RngCore};

use crate::error::{Error, Reason};

/// Symmetric encryption scheme is fixed to AES256-GCM
type Aes = aes_gcm::Aes256Gcm;
type AesKey = aes_gcm::Key<Aes>;
pub(crate) type AesNonce = aes_gcm::Nonce<<Aes as AeadCore>::NonceSize>;
pub(crate) type AesTag = aes_gcm::Tag;

/// Size of the AEAD key
pub(crate) const KEY_SIZE: usize = 32;
/// Size of the serialized nonce
pub(crate) const NONCE_SIZE: usize = 12;
/// Size of the serialized authentication tag
pub(crate) const TAG_SIZE: usize = 16;

/// Draws a fresh nonce from the given RNG
pub(crate) fn random_nonce(rng: &mut (impl RngCore + CryptoRng)) -> AesNonce {
    let mut nonce = AesNonce::default();
    rng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypts `buffer` in place, returning the detached authentication tag
pub(crate) fn seal(
    key: &[u8; KEY_SIZE],
    nonce: &AesNonce,
    buffer: &mut [u8],
) -> Result<AesTag, Error> {
    let aes = Aes::new(AesKey::from_slice(key));
    let tag = aes
        .encrypt_in_place_detached(nonce, &[], buffer)
        .map_err(|_| Reason::Encrypt)?;
    Ok(tag)
}

/// Verifies the tag and decrypts `buffer` in place
///
/// The tag is checked (in constant time, inside `aes-gcm`) before the
/// keystream is applied; on mismatch the buffer still holds ciphertext and
/// the caller must discard it.
pub(crate) fn open(
    key: &[u8; KEY_SIZE],
    nonce: &AesNonce,
    buffer: &mut [u8],
    tag: &AesTag,
) -> Result<(), Error> {
    let aes = Aes::new(AesKey::from_slice(key));
    aes.decrypt_in_place_detached(nonce, &[], buffer, tag)
        .map_err(|_| Reason::AuthenticationFailed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand_core::RngCore;

    use super::{open, random_nonce, seal, KEY_SIZE};

    #[test]
    fn seal_open_roundtrip() {
        let mut rng = rand_dev::DevRng::new();

        let mut key = [0u8; KEY_SIZE];
        rng.fill_bytes(&mut key);
        let nonce = random_nonce(&mut rng);

        let plaintext = *b"attack at dawn";
        let mut buffer = plaintext;
        let tag = seal(&key, &nonce, &mut buffer).unwrap();
        assert_ne!(buffer, plaintext);

        open(&key, &nonce, &mut buffer, &tag).unwrap();
        assert_eq!(buffer, plaintext);
    }

    #[test]
    fn tampered_tag_is_rejected() {
        let mut rng = rand_dev::DevRng::new();

        let mut key = [0u8; KEY_SIZE];
        rng.fill_bytes(&mut key);
        let nonce = random_nonce(&mut rng);

        let mut buffer = *b"attack at dawn";
        let mut tag = seal(&key, &nonce, &mut buffer).unwrap();
        tag[0] ^= 1;
        assert!(open(&key, &nonce, &mut buffer, &tag).is_err());
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let mut rng = rand_dev::DevRng::new();

        let mut key = [0u8; KEY_SIZE];
        rng.fill_bytes(&mut key);
        let nonce = random_nonce(&mut rng);

        let mut buffer = *b"attack at dawn";
        let tag = seal(&key, &nonce, &mut buffer).unwrap();
        buffer[0] ^= 1;
        assert!(open(&key, &nonce, &mut buffer, &tag).is_err());
    }
}
