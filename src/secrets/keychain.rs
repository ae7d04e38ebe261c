//! Keychain 기반 보안 저장소
//!
//! - 마스터키는 Keychain에서 1회 로드 (`riot-launcher:master_key_v1`)
//! - 없으면 CSPRNG로 생성 후 저장
//! - 로드/생성 모두 실패하면 이번 세션 동안 "암호화 불가"로 취급

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use keyring::Entry;
use once_cell::sync::OnceCell;
use rand::Rng;
use zeroize::Zeroize;

use super::aead::{self, MASTER_KEY_LEN};
use super::cipher::SecureStorage;
use super::CipherError;

/// Keychain 서비스 이름
pub const KEYCHAIN_SERVICE: &str = "com.riot-launcher.app";
/// 마스터키 Keychain 키
const MASTER_KEY_KEYCHAIN_KEY: &str = "riot-launcher:master_key_v1";

/// Zeroize가 적용된 마스터키 래퍼
struct MasterKey {
    bytes: [u8; MASTER_KEY_LEN],
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

enum KeySource {
    Keychain { service: String },
    Fixed,
    Disabled,
}

/// OS Keychain에 마스터키를 두는 `SecureStorage` 구현
pub struct KeychainStorage {
    source: KeySource,
    master_key: OnceCell<Option<MasterKey>>,
}

impl KeychainStorage {
    /// 기본 서비스 이름으로 생성 (마스터키는 첫 사용 시 로드)
    pub fn new() -> Self {
        Self::with_service(KEYCHAIN_SERVICE)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            source: KeySource::Keychain {
                service: service.to_string(),
            },
            master_key: OnceCell::new(),
        }
    }

    /// 이미 알고 있는 마스터키로 생성 (Keychain 미사용)
    pub fn with_master_key(bytes: [u8; MASTER_KEY_LEN]) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Some(MasterKey { bytes }));
        Self {
            source: KeySource::Fixed,
            master_key: cell,
        }
    }

    /// 암호화가 불가능한 환경을 흉내냄 (평문 저장 모드)
    pub fn disabled() -> Self {
        Self {
            source: KeySource::Disabled,
            master_key: OnceCell::new(),
        }
    }

    fn master_key(&self) -> Option<&MasterKey> {
        self.master_key
            .get_or_init(|| match &self.source {
                KeySource::Keychain { service } => match load_or_create_master_key(service) {
                    Ok(bytes) => Some(MasterKey { bytes }),
                    Err(e) => {
                        tracing::warn!(error = %e, "secure storage unavailable, secrets will be stored in plain text");
                        None
                    }
                },
                KeySource::Fixed | KeySource::Disabled => None,
            })
            .as_ref()
    }
}

impl Default for KeychainStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureStorage for KeychainStorage {
    fn is_available(&self) -> bool {
        self.master_key().is_some()
    }

    fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, CipherError> {
        let key = self.master_key().ok_or(CipherError::Unavailable)?;
        aead::seal(&key.bytes, plaintext.as_bytes())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<String, CipherError> {
        let key = self.master_key().ok_or(CipherError::Unavailable)?;
        let plaintext = aead::open(&key.bytes, ciphertext)?;
        String::from_utf8(plaintext).map_err(|e| {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            CipherError::Malformed("plaintext is not valid UTF-8".to_string())
        })
    }
}

/// Keychain에서 마스터키 로드, 없으면 생성하여 저장
fn load_or_create_master_key(service: &str) -> Result<[u8; MASTER_KEY_LEN], CipherError> {
    let entry = Entry::new(service, MASTER_KEY_KEYCHAIN_KEY)
        .map_err(|e| CipherError::Keychain(e.to_string()))?;

    match entry.get_password() {
        Ok(encoded) => {
            tracing::debug!("master key loaded from keychain");
            decode_master_key(&encoded)
        }
        Err(keyring::Error::NoEntry) => {
            tracing::info!("no master key found, generating a new one");
            let mut key = [0u8; MASTER_KEY_LEN];
            rand::thread_rng().fill(&mut key);
            entry
                .set_password(&BASE64.encode(key))
                .map_err(|e| CipherError::Keychain(e.to_string()))?;
            Ok(key)
        }
        Err(e) => Err(CipherError::Keychain(e.to_string())),
    }
}

fn decode_master_key(encoded: &str) -> Result<[u8; MASTER_KEY_LEN], CipherError> {
    let mut bytes = BASE64
        .decode(encoded)
        .map_err(|_| CipherError::InvalidMasterKey)?;

    if bytes.len() != MASTER_KEY_LEN {
        bytes.zeroize();
        return Err(CipherError::InvalidMasterKey);
    }

    let mut key = [0u8; MASTER_KEY_LEN];
    key.copy_from_slice(&bytes);
    bytes.zeroize();
    Ok(key)
}
