//! Cryptographic primitives for vault storage.

pub mod cipher;
pub mod kdf;

pub use cipher::{
    DecryptError, EncryptError, ENVELOPE_VERSION, Envelope, EnvelopeFormat, IV_LEN, decrypt_value,
    encrypt_value,
};
pub use kdf::{KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN, derive_key};
