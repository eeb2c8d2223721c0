//! The vault ciphertext codec.
//!
//! Values are serialized to JSON, PKCS#7-padded and encrypted with
//! AES-256-CBC under a fresh random IV, then wrapped in a versioned JSON
//! envelope (`{"iv": ..., "ciphertext": ..., "version": "1.0"}`). Vaults
//! written before versioning was introduced use a raw layout instead:
//! base64 of `[16-byte IV][ciphertext]` with no wrapper. Both formats
//! remain readable; only the versioned envelope is ever written.

use aes::Aes256;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretBox};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::kdf::KEY_LEN;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Envelope IV length; equals the AES block size.
pub const IV_LEN: usize = 16;

/// Format version written by [`encrypt_value`].
pub const ENVELOPE_VERSION: &str = "1.0";

/// Errors that can occur while encrypting a value.
#[derive(Error, Debug)]
pub enum EncryptError {
    /// The plaintext value could not be serialized to JSON.
    #[error("failed to serialize plaintext: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The system RNG failed to produce an IV.
    #[error("system RNG failed to produce an IV")]
    Rng,
}

/// Errors that can occur while decrypting a persisted ciphertext.
#[derive(Error, Debug)]
pub enum DecryptError {
    /// The input is neither a JSON envelope nor a legacy base64 blob.
    #[error("ciphertext is neither a versioned envelope nor a legacy blob")]
    UnrecognizedFormat,

    /// The envelope carries a version this build cannot read.
    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(String),

    /// An envelope field is not valid base64.
    #[error("envelope field is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The IV has the wrong length for the cipher.
    #[error("invalid IV length: expected {IV_LEN} bytes, got {0}")]
    InvalidIvLength(usize),

    /// Padding verification failed after decryption.
    ///
    /// A wrong key and corrupted ciphertext are cryptographically
    /// indistinguishable here: both decrypt to garbage whose padding
    /// fails to verify.
    #[error("decryption failed - wrong key or corrupted ciphertext")]
    InvalidPadding,

    /// Decryption succeeded but the plaintext is not the expected JSON.
    #[error("decrypted bytes are not valid JSON: {0}")]
    Plaintext(#[source] serde_json::Error),
}

/// The versioned ciphertext envelope stored in the vault file.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    /// Base64 of the 16-byte CBC IV.
    pub iv: String,
    /// Base64 of the padded ciphertext.
    pub ciphertext: String,
    /// Format version. Envelopes written before the tag was introduced
    /// omit it and are treated as "1.0".
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    ENVELOPE_VERSION.to_string()
}

/// Decoded shape of a persisted ciphertext.
///
/// The fallback from versioned envelope to the legacy raw layout is a
/// visible branch on this enum rather than a catch-all error path: the
/// format decision is structural and happens before any key touches the
/// data, so a decrypt failure never silently retries the other format.
#[derive(Debug)]
pub enum EnvelopeFormat {
    /// JSON envelope with an explicit (or defaulted) version tag.
    Versioned(Envelope),
    /// Pre-versioning layout: `[16-byte IV][ciphertext]`, base64-encoded.
    Legacy(Vec<u8>),
}

impl EnvelopeFormat {
    /// Classify a persisted ciphertext string.
    pub fn classify(text: &str) -> Result<Self, DecryptError> {
        if let Ok(envelope) = serde_json::from_str::<Envelope>(text) {
            return Ok(EnvelopeFormat::Versioned(envelope));
        }
        match BASE64.decode(text.trim()) {
            // A legacy blob must at least contain the IV plus one cipher block.
            Ok(raw) if raw.len() >= IV_LEN * 2 => Ok(EnvelopeFormat::Legacy(raw)),
            _ => Err(DecryptError::UnrecognizedFormat),
        }
    }
}

/// Encrypt a serializable value into an envelope string.
///
/// A fresh random IV is drawn for every call, so encrypting the same
/// value twice yields different ciphertext; both decrypt to the same
/// value. The returned string is the JSON-encoded [`Envelope`].
pub fn encrypt_value<T: Serialize>(
    key: &SecretBox<[u8; KEY_LEN]>,
    value: &T,
) -> Result<String, EncryptError> {
    let plaintext = serde_json::to_vec(value)?;

    let mut iv = [0u8; IV_LEN];
    SystemRandom::new()
        .fill(&mut iv)
        .map_err(|_| EncryptError::Rng)?;

    let ciphertext = Aes256CbcEnc::new(key.expose_secret().into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(&plaintext);

    let envelope = Envelope {
        iv: BASE64.encode(iv),
        ciphertext: BASE64.encode(ciphertext),
        version: ENVELOPE_VERSION.to_string(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decrypt an envelope string (either format) back into a value.
///
/// # Errors
///
/// * [`DecryptError::UnrecognizedFormat`] - input matches neither format
/// * [`DecryptError::UnsupportedVersion`] - envelope from a newer writer
/// * [`DecryptError::InvalidPadding`] - wrong key or corrupted ciphertext
/// * [`DecryptError::Plaintext`] - decrypted bytes are not the expected JSON
pub fn decrypt_value<T: DeserializeOwned>(
    key: &SecretBox<[u8; KEY_LEN]>,
    text: &str,
) -> Result<T, DecryptError> {
    let (iv, ciphertext) = match EnvelopeFormat::classify(text)? {
        EnvelopeFormat::Versioned(envelope) => {
            if envelope.version != ENVELOPE_VERSION {
                return Err(DecryptError::UnsupportedVersion(envelope.version));
            }
            (
                BASE64.decode(&envelope.iv)?,
                BASE64.decode(&envelope.ciphertext)?,
            )
        }
        EnvelopeFormat::Legacy(raw) => {
            let (iv, ciphertext) = raw.split_at(IV_LEN);
            (iv.to_vec(), ciphertext.to_vec())
        }
    };

    let iv_len = iv.len();
    let iv: [u8; IV_LEN] = iv
        .as_slice()
        .try_into()
        .map_err(|_| DecryptError::InvalidIvLength(iv_len))?;

    let plaintext = Aes256CbcDec::new(key.expose_secret().into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| DecryptError::InvalidPadding)?;

    serde_json::from_slice(&plaintext).map_err(DecryptError::Plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::{SALT_LEN, derive_key};
    use proptest::prelude::*;

    fn test_key() -> SecretBox<[u8; KEY_LEN]> {
        derive_key("Test-Password-1!", &[42u8; SALT_LEN])
    }

    fn other_key() -> SecretBox<[u8; KEY_LEN]> {
        derive_key("Other-Password-2@", &[42u8; SALT_LEN])
    }

    #[test]
    fn roundtrip() {
        let key = test_key();
        let value = vec!["alpha".to_string(), "beta".to_string()];
        let envelope = encrypt_value(&key, &value).unwrap();
        let decrypted: Vec<String> = decrypt_value(&key, &envelope).unwrap();
        assert_eq!(decrypted, value);
    }

    #[test]
    fn same_plaintext_encrypts_differently() {
        let key = test_key();
        let value = "identical plaintext".to_string();
        let a = encrypt_value(&key, &value).unwrap();
        let b = encrypt_value(&key, &value).unwrap();
        assert_ne!(a, b, "random IV must differentiate ciphertexts");

        let da: String = decrypt_value(&key, &a).unwrap();
        let db: String = decrypt_value(&key, &b).unwrap();
        assert_eq!(da, db);
    }

    #[test]
    fn wrong_key_fails_with_padding_error() {
        let envelope = encrypt_value(&test_key(), &"secret".to_string()).unwrap();
        let result = decrypt_value::<String>(&other_key(), &envelope);
        assert!(matches!(result, Err(DecryptError::InvalidPadding)));
    }

    #[test]
    fn legacy_blob_decrypts_via_fallback() {
        let key = test_key();
        let value = vec!["legacy entry".to_string()];
        let plaintext = serde_json::to_vec(&value).unwrap();

        // Handcraft the pre-versioning layout: base64([iv][ciphertext]).
        let iv = [9u8; IV_LEN];
        let ciphertext = Aes256CbcEnc::new(key.expose_secret().into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(&plaintext);
        let mut raw = iv.to_vec();
        raw.extend_from_slice(&ciphertext);
        let blob = BASE64.encode(raw);

        assert!(matches!(
            EnvelopeFormat::classify(&blob),
            Ok(EnvelopeFormat::Legacy(_))
        ));
        let decrypted: Vec<String> = decrypt_value(&key, &blob).unwrap();
        assert_eq!(decrypted, value);
    }

    #[test]
    fn envelope_without_version_defaults_to_current() {
        let key = test_key();
        let written = encrypt_value(&key, &"v".to_string()).unwrap();
        let mut parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        parsed.as_object_mut().unwrap().remove("version");
        let stripped = serde_json::to_string(&parsed).unwrap();

        let decrypted: String = decrypt_value(&key, &stripped).unwrap();
        assert_eq!(decrypted, "v");
    }

    #[test]
    fn unknown_version_is_rejected() {
        let key = test_key();
        let written = encrypt_value(&key, &"v".to_string()).unwrap();
        let mut parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        parsed["version"] = serde_json::Value::String("9.9".to_string());
        let bumped = serde_json::to_string(&parsed).unwrap();

        let result = decrypt_value::<String>(&key, &bumped);
        assert!(matches!(result, Err(DecryptError::UnsupportedVersion(v)) if v == "9.9"));
    }

    #[test]
    fn garbage_input_is_unrecognized() {
        let result = decrypt_value::<String>(&test_key(), "not an envelope at all");
        assert!(matches!(result, Err(DecryptError::UnrecognizedFormat)));
    }

    proptest! {
        #[test]
        fn roundtrip_arbitrary_values(entries in proptest::collection::vec(".*", 0..8)) {
            let key = test_key();
            let envelope = encrypt_value(&key, &entries).unwrap();
            let decrypted: Vec<String> = decrypt_value(&key, &envelope).unwrap();
            prop_assert_eq!(decrypted, entries);
        }
    }
}
