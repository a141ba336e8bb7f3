//! Secret and public keys
//!
//! Both key types serialize to a versioned fixed-length byte string and,
//! on top of that, to lowercase hex. Parsing validates everything (length,
//! charset, version, scalar range, curve membership) before a key value
//! exists; there are no partially-constructed keys.

use alloc::string::String;
use alloc::vec::Vec;

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::envelope::Envelope;
use crate::error::{Error, Reason};
use crate::{agree, cipher};
use crate::{Point, Scalar, SecretScalar, VERSION};

/// Size of a serialized secret key: version byte + 32-byte big-endian scalar
pub const SECRET_KEY_SIZE: usize = 33;
/// Size of a serialized public key: version byte + 33-byte compressed point
pub const PUBLIC_KEY_SIZE: usize = 34;

/// Size of a compressed curve point
pub(crate) const POINT_SIZE: usize = 33;

/// Secret decryption key
///
/// The underlying scalar is zeroized when the key is dropped.
#[derive(Debug)]
pub struct SecretKey {
    scalar: SecretScalar,
}

/// Public encryption key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    point: Point,
}

impl SecretKey {
    /// Generates a secret key from the given randomness source
    ///
    /// The scalar is sampled uniformly from the valid range; zero is
    /// rejected and resampled so the derived public key can never be the
    /// identity.
    pub fn generate(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        let scalar = loop {
            let candidate = SecretScalar::random(rng);
            if candidate.as_ref() != &Scalar::zero() {
                break candidate;
            }
        };
        Self { scalar }
    }

    /// Returns the public key corresponding to this secret key
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            point: Point::generator() * &self.scalar,
        }
    }

    /// Decrypts an envelope addressed to this key
    ///
    /// Verifies the authentication tag before any plaintext is released; a
    /// tampered envelope or a non-matching key yields an error and no
    /// output. The returned buffer is zeroized when dropped.
    pub fn decrypt(&self, envelope: &Envelope) -> Result<Zeroizing<Vec<u8>>, Error> {
        let shared = agree::agree(&self.scalar, &envelope.ephemeral_public)?;
        let key = agree::derive_key(&envelope.ephemeral_public.to_point_bytes(), &shared)?;

        let mut buffer = Zeroizing::new(envelope.ciphertext.clone());
        cipher::open(&key, &envelope.nonce, &mut buffer, &envelope.tag)?;
        Ok(buffer)
    }

    /// Serializes the secret key to bytes
    pub fn to_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_SIZE]> {
        let mut output = Zeroizing::new([0u8; SECRET_KEY_SIZE]);
        output[0] = VERSION;
        output[1..].copy_from_slice(&self.scalar.as_ref().to_be_bytes());
        output
    }

    /// Parses a secret key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SECRET_KEY_SIZE {
            return Err(Reason::MalformedKey.into());
        }
        if bytes[0] != VERSION {
            return Err(Reason::VersionMismatched(bytes[0]).into());
        }
        let scalar = SecretScalar::from_be_bytes(&bytes[1..]).map_err(|_| Reason::MalformedKey)?;
        if scalar.as_ref() == &Scalar::zero() {
            return Err(Reason::MalformedKey.into());
        }
        Ok(Self { scalar })
    }

    /// Serializes the secret key to lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(&self.to_bytes()[..])
    }

    /// Parses a secret key from hex
    pub fn from_hex(secret_key: &str) -> Result<Self, Error> {
        let bytes =
            Zeroizing::new(hex::decode(secret_key).map_err(|_| Reason::MalformedKey)?);
        Self::from_bytes(&bytes)
    }

    pub(crate) fn scalar(&self) -> &SecretScalar {
        &self.scalar
    }
}

impl PublicKey {
    /// Encrypts a message so that only the holder of the matching secret
    /// key can read it
    ///
    /// A fresh ephemeral key pair and nonce are drawn from `rng` on every
    /// call; the ephemeral secret is dropped (and zeroized) before this
    /// function returns.
    pub fn encrypt(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        message: &[u8],
    ) -> Result<Envelope, Error> {
        let ephemeral = SecretKey::generate(rng);
        let ephemeral_public = ephemeral.public_key();

        let shared = agree::agree(&ephemeral.scalar, self)?;
        let key = agree::derive_key(&ephemeral_public.to_point_bytes(), &shared)?;

        let nonce = cipher::random_nonce(rng);
        let mut buffer = message.to_vec();
        let tag = cipher::seal(&key, &nonce, &mut buffer)?;

        Ok(Envelope {
            ephemeral_public,
            nonce,
            ciphertext: buffer,
            tag,
        })
    }

    /// Serializes the public key to bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        let mut output = [0u8; PUBLIC_KEY_SIZE];
        output[0] = VERSION;
        output[1..].copy_from_slice(&self.point.to_bytes(true));
        output
    }

    /// Parses a public key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(Reason::MalformedKey.into());
        }
        if bytes[0] != VERSION {
            return Err(Reason::VersionMismatched(bytes[0]).into());
        }
        Self::from_point_bytes(&bytes[1..])
    }

    /// Serializes the public key to lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parses a public key from hex
    pub fn from_hex(public_key: &str) -> Result<Self, Error> {
        let bytes = hex::decode(public_key).map_err(|_| Reason::MalformedKey)?;
        Self::from_bytes(&bytes)
    }

    /// Parses a bare compressed point, as embedded in envelopes
    pub(crate) fn from_point_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let point = Point::from_bytes(bytes).map_err(|_| Reason::MalformedKey)?;
        if point == Point::zero() {
            return Err(Reason::InvalidPeerKey.into());
        }
        Ok(Self { point })
    }

    pub(crate) fn to_point_bytes(&self) -> [u8; POINT_SIZE] {
        let mut output = [0u8; POINT_SIZE];
        output.copy_from_slice(&self.point.to_bytes(true));
        output
    }

    pub(crate) fn point(&self) -> Point {
        self.point
    }
}

impl serde::Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_hex().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let encoded = alloc::string::String::deserialize(deserializer)?;
        Self::from_hex(&encoded).map_err(|e| {
            <D::Error as serde::de::Error>::custom(alloc::format!("invalid public key: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::{PublicKey, SecretKey};

    #[test]
    fn secret_key_hex_roundtrip() {
        let mut rng = rand_dev::DevRng::new();

        let sk = SecretKey::generate(&mut rng);
        let restored = SecretKey::from_hex(&sk.to_hex()).unwrap();

        assert_eq!(restored.to_hex(), sk.to_hex());
        assert_eq!(restored.public_key(), sk.public_key());
    }

    #[test]
    fn public_key_hex_roundtrip() {
        let mut rng = rand_dev::DevRng::new();

        let pk = SecretKey::generate(&mut rng).public_key();
        assert_eq!(PublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
    }

    #[test]
    fn public_key_derivation_is_deterministic() {
        let mut rng = rand_dev::DevRng::new();

        let sk = SecretKey::generate(&mut rng);
        assert_eq!(sk.public_key(), sk.public_key());
    }

    #[test]
    fn rejects_malformed_secret_keys() {
        let mut rng = rand_dev::DevRng::new();
        let valid = SecretKey::generate(&mut rng).to_hex();

        let mut bad_charset = valid.clone();
        bad_charset.replace_range(0..2, "zz");
        let wrong_version = {
            let mut s = String::from("02");
            s.push_str(&valid[2..]);
            s
        };
        let zero_scalar = {
            let mut s = String::from("01");
            s.push_str(&"00".repeat(32));
            s
        };
        let out_of_range = {
            let mut s = String::from("01");
            s.push_str(&"ff".repeat(32));
            s
        };

        let cases = [
            String::new(),
            String::from("00"),
            String::from(&valid[..valid.len() - 2]),
            bad_charset,
            wrong_version,
            zero_scalar,
            out_of_range,
        ];
        for bad in &cases {
            assert!(SecretKey::from_hex(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_malformed_public_keys() {
        let mut rng = rand_dev::DevRng::new();
        let valid = SecretKey::generate(&mut rng).public_key().to_hex();

        let wrong_version = {
            let mut s = String::from("02");
            s.push_str(&valid[2..]);
            s
        };
        // 33 zero bytes is no valid compressed point
        let not_a_point = {
            let mut s = String::from("01");
            s.push_str(&"00".repeat(33));
            s
        };

        let cases = [
            String::new(),
            String::from(&valid[..valid.len() - 2]),
            String::from(&valid[..valid.len() - 1]),
            wrong_version,
            not_a_point,
        ];
        for bad in &cases {
            assert!(PublicKey::from_hex(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn serialize_deserialize() {
        let mut rng = rand_dev::DevRng::new();

        let pk = SecretKey::generate(&mut rng).public_key();
        let pk_json = serde_json::to_string(&pk).unwrap();
        let pk_deserialized: PublicKey = serde_json::from_str(&pk_json).unwrap();
        assert_eq!(pk, pk_deserialized);
    }
}
