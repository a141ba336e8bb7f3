//! ECDH key agreement and key derivation
//!
//! The shared secret never leaves this module: it is produced by [`agree`],
//! fed to [`derive_key`], and zeroized when dropped.

use zeroize::Zeroizing;

use crate::cipher::KEY_SIZE;
use crate::error::{Error, Reason};
use crate::keys::PublicKey;
use crate::{Point, SecretScalar};

/// HKDF is fixed to HKDF-SHA2-256
type Hkdf = hkdf::Hkdf<sha2::Sha256>;
const HKDF_SALT: &[u8] = b"ECIES_SECP256K1_HKDF";
const HKDF_KEY_LABEL: &[u8] = b"ENCRYPTION_KEY";

/// Size of the compressed shared point
const SHARED_SIZE: usize = 33;

/// Compressed encoding of the agreed point, consumed by [`derive_key`]
pub(crate) struct SharedSecret(Zeroizing<[u8; SHARED_SIZE]>);

/// Computes `secret · peer`
///
/// secp256k1 is a prime-order group and [`PublicKey`] rejects the identity
/// at construction, so the only degenerate product left to guard against is
/// the identity itself.
pub(crate) fn agree(secret: &SecretScalar, peer: &PublicKey) -> Result<SharedSecret, Error> {
    let shared_point = peer.point() * secret;
    if shared_point == Point::zero() {
        return Err(Reason::InvalidPeerKey.into());
    }
    let mut bytes = Zeroizing::new([0u8; SHARED_SIZE]);
    bytes.copy_from_slice(&shared_point.to_bytes(true));
    Ok(SharedSecret(bytes))
}

/// Derives the AEAD key from a shared secret
///
/// The serialized ephemeral public key is mixed into the IKM so the derived
/// key is bound to the envelope it belongs to.
pub(crate) fn derive_key(
    ephemeral_public: &[u8; SHARED_SIZE],
    shared: &SharedSecret,
) -> Result<Zeroizing<[u8; KEY_SIZE]>, Error> {
    let mut ikm = Zeroizing::new([0u8; 2 * SHARED_SIZE]);
    ikm[..SHARED_SIZE].copy_from_slice(ephemeral_public);
    ikm[SHARED_SIZE..].copy_from_slice(&shared.0[..]);

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    let kdf = Hkdf::new(Some(HKDF_SALT), &ikm[..]);
    kdf.expand(HKDF_KEY_LABEL, &mut key[..])
        .map_err(|_| Reason::Kdf)?;
    Ok(key)
}
