//! C boundary of the ECIES library
//!
//! Four entry points, all operating on NUL-terminated UTF-8 strings:
//! generate a secret key, derive a public key, encrypt, decrypt. Every
//! returned string is freshly allocated and ownership transfers to the
//! caller, who must release it with [`ecies_free_string`].
//!
//! NULL is the only failure signal. The boundary deliberately does not
//! report *why* an operation failed: distinguishing a malformed envelope
//! from a failed authentication tag hands an oracle to whoever feeds input
//! to the caller. Rust callers who want diagnostics should use the
//! `ecies-core` API directly.

#![forbid(missing_docs)]

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use rand_core::OsRng;

/// Borrows a C string as UTF-8, rejecting NULL and invalid encodings.
///
/// # Safety
///
/// `string` must be NULL or a valid NUL-terminated string that outlives the
/// returned reference.
unsafe fn utf8_input<'a>(string: *const c_char) -> Option<&'a str> {
    if string.is_null() {
        return None;
    }
    CStr::from_ptr(string).to_str().ok()
}

/// Moves a string out to the caller. NULL if it cannot be represented as a
/// C string (interior NUL byte).
fn utf8_output(string: String) -> *mut c_char {
    match CString::new(string) {
        Ok(string) => string.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Returns the OS randomness source, or `None` if it cannot deliver bytes
fn secure_rng() -> Option<OsRng> {
    let mut rng = OsRng;
    ecies_core::ensure_entropy(&mut rng).ok()?;
    Some(rng)
}

/// Generates a new secret key, hex-encoded.
///
/// Returns NULL only if the OS randomness source is unavailable.
#[no_mangle]
pub extern "C" fn ecies_generate_secret_key() -> *mut c_char {
    let Some(mut rng) = secure_rng() else {
        return ptr::null_mut();
    };
    utf8_output(ecies_core::generate_secret_key(&mut rng))
}

/// Derives the hex-encoded public key of a hex-encoded secret key.
///
/// Returns NULL if the secret key is NULL, not UTF-8, or malformed.
///
/// # Safety
///
/// `secret_key` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn ecies_public_key_from(secret_key: *const c_char) -> *mut c_char {
    let Some(secret_key) = utf8_input(secret_key) else {
        return ptr::null_mut();
    };
    match ecies_core::public_key_from(secret_key) {
        Ok(public_key) => utf8_output(public_key),
        Err(_) => ptr::null_mut(),
    }
}

/// Encrypts a message under a hex-encoded public key, returning the
/// base64-encoded envelope.
///
/// Returns NULL if either argument is NULL or not UTF-8, the public key is
/// malformed or the identity, or the randomness source is unavailable.
///
/// # Safety
///
/// `public_key` and `message` must each be NULL or a valid NUL-terminated
/// string.
#[no_mangle]
pub unsafe extern "C" fn ecies_encrypt(
    public_key: *const c_char,
    message: *const c_char,
) -> *mut c_char {
    let (Some(public_key), Some(message)) = (utf8_input(public_key), utf8_input(message)) else {
        return ptr::null_mut();
    };
    let Some(mut rng) = secure_rng() else {
        return ptr::null_mut();
    };
    match ecies_core::encrypt(&mut rng, public_key, message.as_bytes()) {
        Ok(envelope) => utf8_output(envelope),
        Err(_) => ptr::null_mut(),
    }
}

/// Decrypts a base64-encoded envelope with a hex-encoded secret key,
/// returning the plaintext.
///
/// Returns NULL if either argument is NULL or not UTF-8, the secret key or
/// envelope is malformed, the authentication tag doesn't verify, or the
/// plaintext cannot cross the boundary as a C string (not UTF-8, or
/// contains a NUL byte).
///
/// # Safety
///
/// `secret_key` and `message` must each be NULL or a valid NUL-terminated
/// string.
#[no_mangle]
pub unsafe extern "C" fn ecies_decrypt(
    secret_key: *const c_char,
    message: *const c_char,
) -> *mut c_char {
    let (Some(secret_key), Some(message)) = (utf8_input(secret_key), utf8_input(message)) else {
        return ptr::null_mut();
    };
    match ecies_core::decrypt(secret_key, message) {
        Ok(plaintext) => match std::str::from_utf8(&plaintext) {
            Ok(plaintext) => utf8_output(plaintext.into()),
            Err(_) => ptr::null_mut(),
        },
        Err(_) => ptr::null_mut(),
    }
}

/// Releases a string previously returned by this library.
///
/// Passing NULL is a no-op. Passing any other pointer not obtained from
/// this library is undefined behavior.
///
/// # Safety
///
/// `string` must be NULL or a pointer returned by one of the functions of
/// this library, not freed before.
#[no_mangle]
pub unsafe extern "C" fn ecies_free_string(string: *mut c_char) {
    if !string.is_null() {
        drop(CString::from_raw(string));
    }
}
