//! Secret Cipher 모듈
//!
//! 머신 종속 마스터키 + AEAD 구조로 계정 비밀번호를 암호화합니다.
//!
//! - Keychain에는 마스터키 1개만 저장 (`riot-launcher:master_key_v1`)
//! - 비밀번호는 XChaCha20-Poly1305로 암호화 후 hex 문자열로 보관
//! - 다른 PC(다른 마스터키)에서 만든 암호문은 복호화되지 않음

pub mod aead;
pub mod cipher;
pub mod keychain;

pub use cipher::{SecretCipher, SecureStorage};
pub use keychain::KeychainStorage;

/// Secret Cipher 오류
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("Secure storage is not available on this machine")]
    Unavailable,

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("Invalid master key format")]
    InvalidMasterKey,

    #[error("Malformed ciphertext: {0}")]
    Malformed(String),

    #[error("Decryption failed (corrupted data or different machine)")]
    DecryptionFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
}
