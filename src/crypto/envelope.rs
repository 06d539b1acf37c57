//! # Sealed Tokens
//!
//! Password-only envelope encryption of a single string.
//!
//! ## Token Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SEALED TOKEN                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  offset  0 .. 15  │ salt   (16 bytes, random, PBKDF2 input)             │
//! │  offset 16 .. 27  │ nonce  (12 bytes, random, AES-GCM IV)               │
//! │  offset 28 .. end │ AES-256-GCM ciphertext ‖ 16-byte tag                │
//! │                                                                         │
//! │  The whole buffer is standard base64 encoded for transport.             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The salt and nonce travel with the ciphertext, so the password is the
//! only thing a reader needs. No additional authenticated data is bound.

use super::encryption::{decrypt, encrypt, Nonce, NONCE_SIZE};
use super::kdf::{derive_key, Salt, SALT_SIZE};
use crate::config::KdfParams;
use crate::encoding::{decode_base64, encode_base64};
use crate::error::{Error, Result};

/// Bytes preceding the ciphertext in a decoded token
pub const HEADER_SIZE: usize = SALT_SIZE + NONCE_SIZE;

/// Seal `plaintext` under `password` with the default KDF parameters
///
/// A new salt and nonce are drawn on every call, so sealing the same text
/// twice never yields the same token.
pub fn seal(password: &str, plaintext: &str) -> Result<String> {
    seal_with_params(password, plaintext, &KdfParams::default())
}

/// Open a token produced by [`seal`]
pub fn open(password: &str, token: &str) -> Result<String> {
    open_with_params(password, token, &KdfParams::default())
}

/// Seal `plaintext` under `password` with explicit KDF parameters
pub fn seal_with_params(password: &str, plaintext: &str, params: &KdfParams) -> Result<String> {
    let salt = Salt::random();
    let key = derive_key(password, &salt, params);
    let (nonce, ciphertext) = encrypt(&key, plaintext.as_bytes())?;

    let mut payload = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    payload.extend_from_slice(salt.as_bytes());
    payload.extend_from_slice(nonce.as_bytes());
    payload.extend_from_slice(&ciphertext);

    tracing::trace!(
        plaintext_len = plaintext.len(),
        token_bytes = payload.len(),
        "Sealed field"
    );

    Ok(encode_base64(&payload))
}

/// Open a token with explicit KDF parameters
///
/// ## Errors
///
/// - `MalformedToken`: not base64, or fewer than 28 bytes once decoded
/// - `AuthenticationFailed`: wrong password or modified token
/// - `InvalidEncoding`: the authenticated plaintext is not UTF-8
pub fn open_with_params(password: &str, token: &str, params: &KdfParams) -> Result<String> {
    let payload = decode_base64(token)?;

    if payload.len() < HEADER_SIZE {
        return Err(Error::MalformedToken(format!(
            "Token is {} bytes, shorter than the {}-byte salt and nonce header",
            payload.len(),
            HEADER_SIZE
        )));
    }

    let (header, ciphertext) = payload.split_at(HEADER_SIZE);
    let (salt_bytes, nonce_bytes) = header.split_at(SALT_SIZE);

    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(salt_bytes);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(nonce_bytes);

    let key = derive_key(password, &Salt::from_bytes(salt), params);
    let plaintext = decrypt(&key, &Nonce::from_bytes(nonce), ciphertext)?;

    tracing::trace!(
        token_bytes = payload.len(),
        plaintext_len = plaintext.len(),
        "Opened field"
    );

    Ok(String::from_utf8(plaintext)?)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::encryption::{encrypt_with_nonce, TAG_SIZE};
    use proptest::prelude::*;

    #[test]
    fn test_seal_open_round_trip() {
        let token = seal("correct horse", "print(1)").unwrap();
        assert_eq!(open("correct horse", &token).unwrap(), "print(1)");
    }

    #[test]
    fn test_seal_open_empty_and_unicode() {
        let token = seal("pw", "").unwrap();
        assert_eq!(open("pw", &token).unwrap(), "");

        let text = "let π = 3.14; // ✓ 日本語";
        let token = seal("pässwörd", text).unwrap();
        assert_eq!(open("pässwörd", &token).unwrap(), text);
    }

    #[test]
    fn test_token_layout() {
        let token = seal("pw", "abc").unwrap();
        let payload = decode_base64(&token).unwrap();
        assert_eq!(payload.len(), HEADER_SIZE + 3 + TAG_SIZE);
    }

    #[test]
    fn test_wrong_password_fails() {
        let token = seal("alpha", "secret").unwrap();
        assert_eq!(open("beta", &token), Err(Error::AuthenticationFailed));
    }

    #[test]
    fn test_every_ciphertext_bit_flip_is_detected() {
        let token = seal("pw", "hi").unwrap();
        let payload = decode_base64(&token).unwrap();

        for byte in HEADER_SIZE..payload.len() {
            let bit = byte % 8;
            let mut tampered = payload.clone();
            tampered[byte] ^= 1 << bit;
            let result = open("pw", &encode_base64(&tampered));
            assert_eq!(result, Err(Error::AuthenticationFailed), "byte {} bit {}", byte, bit);
        }
    }

    #[test]
    fn test_tampered_salt_or_nonce_fails() {
        let token = seal("pw", "data").unwrap();
        let payload = decode_base64(&token).unwrap();

        let mut bad_salt = payload.clone();
        bad_salt[0] ^= 0x80;
        assert_eq!(open("pw", &encode_base64(&bad_salt)), Err(Error::AuthenticationFailed));

        let mut bad_nonce = payload;
        bad_nonce[SALT_SIZE] ^= 0x80;
        assert_eq!(open("pw", &encode_base64(&bad_nonce)), Err(Error::AuthenticationFailed));
    }

    #[test]
    fn test_sealing_is_not_deterministic() {
        let t1 = seal("pw", "same text").unwrap();
        let t2 = seal("pw", "same text").unwrap();
        assert_ne!(t1, t2);

        let p1 = decode_base64(&t1).unwrap();
        let p2 = decode_base64(&t2).unwrap();
        assert_ne!(p1[..SALT_SIZE], p2[..SALT_SIZE]);
        assert_ne!(p1[SALT_SIZE..HEADER_SIZE], p2[SALT_SIZE..HEADER_SIZE]);
    }

    #[test]
    fn test_short_token_is_malformed() {
        let short = encode_base64(&[0u8; HEADER_SIZE - 1]);
        assert!(matches!(open("pw", &short), Err(Error::MalformedToken(_))));
        assert!(matches!(open("pw", ""), Err(Error::MalformedToken(_))));
    }

    #[test]
    fn test_header_only_token_fails_authentication() {
        // 28 bytes passes the length check but has no tag to verify
        let header_only = encode_base64(&[0u8; HEADER_SIZE]);
        assert_eq!(open("pw", &header_only), Err(Error::AuthenticationFailed));
    }

    #[test]
    fn test_non_base64_token_is_malformed() {
        assert!(matches!(open("pw", "not*base64"), Err(Error::MalformedToken(_))));
    }

    #[test]
    fn test_non_utf8_plaintext_is_invalid_encoding() {
        let params = KdfParams::default();
        let salt = Salt::random();
        let nonce = Nonce::random();
        let key = derive_key("pw", &salt, &params);
        let ciphertext = encrypt_with_nonce(&key, &nonce, &[0xff, 0xfe, 0x00]).unwrap();

        let mut payload = salt.as_bytes().to_vec();
        payload.extend_from_slice(nonce.as_bytes());
        payload.extend_from_slice(&ciphertext);

        let result = open("pw", &encode_base64(&payload));
        assert!(matches!(result, Err(Error::InvalidEncoding(_))));
    }

    #[test]
    fn test_unpadded_token_opens() {
        let token = seal("pw", "x").unwrap();
        let trimmed = token.trim_end_matches('=');
        assert_eq!(open("pw", trimmed).unwrap(), "x");
    }

    #[test]
    fn test_large_plaintext_round_trip() {
        let line = "fn add(a: i32, b: i32) -> i32 { a + b } // padding padding\n";
        let big = line.repeat(4 * 1024 * 1024 / line.len());
        assert!(big.len() > 4_000_000);

        let token = seal("pw", &big).unwrap();
        assert_eq!(open("pw", &token).unwrap(), big);
    }

    #[test]
    fn test_higher_iteration_count_must_match() {
        let params = KdfParams::new(300_000).unwrap();
        let token = seal_with_params("pw", "text", &params).unwrap();

        assert_eq!(open_with_params("pw", &token, &params).unwrap(), "text");
        assert_eq!(open("pw", &token), Err(Error::AuthenticationFailed));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn seal_open_always_roundtrips(password in ".{0,24}", text in ".{0,128}") {
            let token = seal(&password, &text).unwrap();
            prop_assert_eq!(open(&password, &token).unwrap(), text);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(4))]

        #[test]
        fn open_with_other_password_always_fails(
            p1 in ".{0,24}",
            p2 in ".{0,24}",
            text in ".{0,64}",
        ) {
            prop_assume!(p1 != p2);
            let token = seal(&p1, &text).unwrap();
            prop_assert_eq!(open(&p2, &token), Err(Error::AuthenticationFailed));
        }
    }
}
