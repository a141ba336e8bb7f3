//! Errors reported by this library
//!
//! The public [`Error`] is deliberately opaque: the reason is available
//! through its `Display` impl for diagnostics, but there is no API to match
//! on it. Code at a trust boundary must not forward even the displayed
//! reason to the peer, as distinguishing "malformed input" from "bad
//! authentication tag" is oracle material.

/// Describes what went wrong
#[derive(Debug, Clone, Copy)]
pub struct Error(Reason);

#[derive(Debug, Clone, Copy)]
pub(crate) enum Reason {
    VersionMismatched(u8),
    MalformedKey,
    MalformedEnvelope,
    InvalidPeerKey,
    AuthenticationFailed,
    Kdf,
    Encrypt,
    Entropy,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error(Reason::VersionMismatched(v)) => f.write_fmt(core::format_args!(
                "parsing failed: version of data (v{v}) doesn't match version supported by the library (v{})",
                crate::VERSION
            )),
            Error(Reason::MalformedKey) => f.write_str("malformed key"),
            Error(Reason::MalformedEnvelope) => f.write_str("malformed envelope"),
            Error(Reason::InvalidPeerKey) => f.write_str("invalid peer public key"),
            Error(Reason::AuthenticationFailed) => f.write_str("ciphertext authentication failed"),
            Error(Reason::Kdf) => f.write_str("key derivation error"),
            Error(Reason::Encrypt) => f.write_str("encryption error"),
            Error(Reason::Entropy) => f.write_str("secure randomness source is not available"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<Reason> for Error {
    fn from(err: Reason) -> Self {
        Error(err)
    }
}
