//! ECIES encryption over secp256k1
//!
//! This library implements one hybrid public-key encryption construction:
//! an ephemeral ECDH key agreement on secp256k1, HKDF-SHA2-256 key
//! derivation, and AES256-GCM authenticated encryption. Keys and
//! ciphertexts cross the API as text strings, so the scheme can be exposed
//! over a foreign-function boundary without any shared type definitions.
//!
//! # Wire format
//!
//! This is the interoperability contract; independent implementations that
//! follow it can exchange keys and ciphertexts with this one.
//!
//! * Secret key: lowercase hex of `version(1) || scalar(32)`, where the
//!   scalar is big-endian, nonzero, and below the curve order (66 hex chars).
//! * Public key: lowercase hex of `version(1) || point(33)`, where the point
//!   is SEC1 compressed and never the identity (68 hex chars).
//! * Envelope: standard base64 (with padding) of
//!   `version(1) || ephemeral_public(33) || nonce(12) || ciphertext(N) || tag(16)`.
//!
//! The AEAD key is `HKDF-SHA256(salt = "ECIES_SECP256K1_HKDF",
//! ikm = ephemeral_public || compressed_shared_point)` expanded under the
//! `"ENCRYPTION_KEY"` label. No associated data is passed to the AEAD.
//!
//! Operations that parse untrusted input return an [`Error`]; callers that
//! sit on a trust boundary should collapse it to an opaque failure instead
//! of forwarding the reason.

#![forbid(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use rand_core;

pub mod envelope;
pub mod error;
pub mod keys;

mod agree;
mod cipher;

pub use error::Error;
pub use keys::{PublicKey, SecretKey};

use alloc::string::String;
use alloc::vec::Vec;

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// We fix our encryption scheme to secp256k1 curve
pub(crate) type Curve = generic_ec::curves::Secp256k1;
pub(crate) type Point = generic_ec::Point<Curve>;
pub(crate) type Scalar = generic_ec::Scalar<Curve>;
pub(crate) type SecretScalar = generic_ec::SecretScalar<Curve>;

/// Version number, embedded in every serialized key and envelope, ensures
/// that both sides of an exchange use the same wire format.
pub(crate) const VERSION: u8 = 1;

/// Checks that the given randomness source is operational
///
/// Samples a few bytes from the source and fails with an error if it cannot
/// deliver them. Boundary code that works with an OS-provided generator
/// should call this once before generating any key material.
pub fn ensure_entropy(rng: &mut impl RngCore) -> Result<(), Error> {
    let mut sample = [0u8; 10];
    rng.try_fill_bytes(&mut sample)
        .map_err(|_| error::Reason::Entropy)?;
    Ok(())
}

/// Generates a fresh secret key and returns it hex-encoded
pub fn generate_secret_key(rng: &mut (impl RngCore + CryptoRng)) -> String {
    SecretKey::generate(rng).to_hex()
}

/// Derives the public key matching a hex-encoded secret key
///
/// The derivation is deterministic: the same secret key always yields the
/// same public key. Fails if the secret key doesn't parse.
pub fn public_key_from(secret_key: &str) -> Result<String, Error> {
    let secret_key = SecretKey::from_hex(secret_key)?;
    Ok(secret_key.public_key().to_hex())
}

/// Encrypts a message under a hex-encoded public key
///
/// Generates a fresh ephemeral key pair and nonce on every call, so
/// encrypting the same message twice yields two different envelopes.
/// Returns the envelope string described in the crate docs.
pub fn encrypt(
    rng: &mut (impl RngCore + CryptoRng),
    public_key: &str,
    message: &[u8],
) -> Result<String, Error> {
    let public_key = PublicKey::from_hex(public_key)?;
    Ok(public_key.encrypt(rng, message)?.pack())
}

/// Decrypts an envelope string with a hex-encoded secret key
///
/// Fails if the secret key or the envelope doesn't parse, or if the
/// authentication tag doesn't verify (tampering, or a key that doesn't
/// match the envelope). No plaintext is ever returned in these cases.
pub fn decrypt(secret_key: &str, envelope: &str) -> Result<Zeroizing<Vec<u8>>, Error> {
    let secret_key = SecretKey::from_hex(secret_key)?;
    let envelope = envelope::Envelope::unpack(envelope)?;
    secret_key.decrypt(&envelope)
}
