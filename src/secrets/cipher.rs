//! Secret Cipher
//!
//! 호스트 보안 저장소 위에서 비밀번호를 hex 문자열로 암호화/복호화합니다.

use std::sync::Arc;

use super::CipherError;

/// 호스트가 제공하는 가역 암호화 기능
pub trait SecureStorage: Send + Sync {
    /// 현재 세션에서 암호화를 사용할 수 있는지
    fn is_available(&self) -> bool;
    fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, CipherError>;
    fn decrypt(&self, ciphertext: &[u8]) -> Result<String, CipherError>;
}

/// 저장 가능한 형태로 변환된 비밀번호
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSecret {
    pub value: String,
    pub encrypted: bool,
}

#[derive(Clone)]
pub struct SecretCipher {
    storage: Arc<dyn SecureStorage>,
}

impl SecretCipher {
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self { storage }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_available()
    }

    /// 평문 → hex 암호문. 호출 전 `is_available()` 확인 필요
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        if !self.storage.is_available() {
            return Err(CipherError::Unavailable);
        }
        Ok(hex::encode(self.storage.encrypt(plaintext)?))
    }

    pub fn decrypt(&self, ciphertext_hex: &str) -> Result<String, CipherError> {
        let bytes = hex::decode(ciphertext_hex.trim())
            .map_err(|e| CipherError::Malformed(e.to_string()))?;
        self.storage.decrypt(&bytes)
    }

    /// 암호화가 가능하면 암호화하고, 불가능하면 평문 그대로 저장 (degraded mode)
    pub fn protect(&self, plaintext: &str) -> Result<ProtectedSecret, CipherError> {
        if self.storage.is_available() {
            Ok(ProtectedSecret {
                value: self.encrypt(plaintext)?,
                encrypted: true,
            })
        } else {
            tracing::warn!("encryption unavailable, storing secret without encryption");
            Ok(ProtectedSecret {
                value: plaintext.to_string(),
                encrypted: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::KeychainStorage;

    fn cipher_with_key(byte: u8) -> SecretCipher {
        SecretCipher::new(Arc::new(KeychainStorage::with_master_key([byte; 32])))
    }

    #[test]
    fn test_roundtrip_various_strings() {
        let cipher = cipher_with_key(1);
        for input in ["", "hunter2", "Pa$$w0rd!{test}", "비밀번호 🔑", "  spaced  "] {
            let hex_value = cipher.encrypt(input).unwrap();
            assert!(hex_value.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(cipher.decrypt(&hex_value).unwrap(), input);
        }
    }

    #[test]
    fn test_decrypt_on_other_machine_fails() {
        let hex_value = cipher_with_key(1).encrypt("secret").unwrap();
        let result = cipher_with_key(2).decrypt(&hex_value);
        assert!(matches!(result, Err(CipherError::DecryptionFailed)));
    }

    #[test]
    fn test_decrypt_rejects_non_hex() {
        let result = cipher_with_key(1).decrypt("zz-not-hex");
        assert!(matches!(result, Err(CipherError::Malformed(_))));
    }

    #[test]
    fn test_protect_degrades_to_plaintext() {
        let cipher = SecretCipher::new(Arc::new(KeychainStorage::disabled()));
        let protected = cipher.protect("plain").unwrap();
        assert_eq!(
            protected,
            ProtectedSecret {
                value: "plain".to_string(),
                encrypted: false
            }
        );
        assert!(matches!(cipher.encrypt("plain"), Err(CipherError::Unavailable)));
    }

    #[test]
    fn test_protect_encrypts_when_available() {
        let cipher = cipher_with_key(9);
        let protected = cipher.protect("plain").unwrap();
        assert!(protected.encrypted);
        assert_ne!(protected.value, "plain");
        assert_eq!(cipher.decrypt(&protected.value).unwrap(), "plain");
    }
}
