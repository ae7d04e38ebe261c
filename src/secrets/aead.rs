//! 암호문 포맷 및 암호화/복호화
//!
//! 포맷 (v1):
//! - magic: `RLSECR01` (8 bytes)
//! - nonce: 24 bytes (XChaCha20-Poly1305)
//! - ciphertext: AEAD 결과 (= 암호문 + 태그)
//!
//! AAD: magic를 AAD로 사용 (포맷 바인딩)

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::Rng;

use super::CipherError;

/// 암호문 매직 (8 bytes)
pub const SECRET_MAGIC: &[u8; 8] = b"RLSECR01";

/// 마스터키 길이 (256-bit)
pub const MASTER_KEY_LEN: usize = 32;

/// Nonce 길이 (XChaCha20-Poly1305용 24 bytes)
pub const NONCE_LEN: usize = 24;

const TAG_LEN: usize = 16;

/// 평문을 마스터키로 암호화 (`magic || nonce || ciphertext`)
pub fn seal(master_key: &[u8; MASTER_KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill(&mut nonce);

    let cipher = XChaCha20Poly1305::new(master_key.into());
    let ciphertext = cipher
        .encrypt(
            XNonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: SECRET_MAGIC,
            },
        )
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

    let mut out = Vec::with_capacity(SECRET_MAGIC.len() + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(SECRET_MAGIC);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// `seal`로 만든 바이트열을 복호화
pub fn open(master_key: &[u8; MASTER_KEY_LEN], sealed: &[u8]) -> Result<Vec<u8>, CipherError> {
    let header_len = SECRET_MAGIC.len() + NONCE_LEN;
    if sealed.len() < header_len + TAG_LEN {
        return Err(CipherError::Malformed(format!(
            "ciphertext too short ({} bytes)",
            sealed.len()
        )));
    }

    let (magic, rest) = sealed.split_at(SECRET_MAGIC.len());
    if magic != SECRET_MAGIC {
        return Err(CipherError::Malformed("invalid magic".to_string()));
    }
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let cipher = XChaCha20Poly1305::new(master_key.into());
    cipher
        .decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: SECRET_MAGIC,
            },
        )
        .map_err(|_| CipherError::DecryptionFailed)
}
