//! Launcher Error Types
//!
//! 애플리케이션 전역 에러 타입 정의

use serde::Serialize;
use thiserror::Error;

use crate::accounts::VaultError;
use crate::launcher::LaunchError;
use crate::license::LicenseError;
use crate::secrets::CipherError;

/// 영속 저장소(key-value) 에러
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// 런처 전역 에러 (부트스트랩, CLI 등 최상위에서 사용)
#[derive(Error, Debug)]
pub enum LauncherError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    License(#[from] LicenseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// 명령 응답용 직렬화 가능한 에러
#[derive(Debug, Clone, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl CommandError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        CommandError {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new("INVALID_INPUT", message)
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<StoreError> for CommandError {
    fn from(error: StoreError) -> Self {
        let code = match &error {
            StoreError::Database(_) => "DB_ERROR",
            StoreError::Io(_) => "IO_ERROR",
            StoreError::Serialization(_) => "SERIALIZATION_ERROR",
            StoreError::LockPoisoned => "LOCK_ERROR",
        };
        CommandError::new(code, error.to_string())
    }
}

impl From<CipherError> for CommandError {
    fn from(error: CipherError) -> Self {
        let code = match &error {
            CipherError::DecryptionFailed | CipherError::Malformed(_) => "DECRYPTION_ERROR",
            _ => "CIPHER_ERROR",
        };
        CommandError::new(code, error.to_string())
    }
}

impl From<VaultError> for CommandError {
    fn from(error: VaultError) -> Self {
        match error {
            VaultError::LimitReached { limit } => CommandError {
                code: "LIMIT_REACHED".to_string(),
                message: format!("Free version is limited to {} accounts.", limit),
                details: Some(limit.to_string()),
            },
            VaultError::NotFound(id) => {
                CommandError::new("NOT_FOUND", format!("Account not found: {}", id))
            }
            VaultError::Cipher(e) => e.into(),
            VaultError::Store(e) => e.into(),
        }
    }
}

impl From<LicenseError> for CommandError {
    fn from(error: LicenseError) -> Self {
        let code = match &error {
            LicenseError::EmptyKey => "EMPTY_KEY",
            LicenseError::Store(_) => "STORE_ERROR",
            _ => "LICENSE_ERROR",
        };
        CommandError::new(code, error.to_string())
    }
}

impl From<LaunchError> for CommandError {
    fn from(error: LaunchError) -> Self {
        let code = match &error {
            LaunchError::InvalidPath
            | LaunchError::AccountNotFound(_)
            | LaunchError::InvalidProduct(_) => "INVALID_INPUT",
            LaunchError::Decryption(_) => "DECRYPTION_ERROR",
            LaunchError::Macro(_) => "MACRO_FAILED",
            LaunchError::Spawn(_) => "SPAWN_ERROR",
            LaunchError::Store(_) | LaunchError::Vault(_) => "STORE_ERROR",
            LaunchError::Busy => "LAUNCH_BUSY",
        };
        CommandError::new(code, error.to_string())
    }
}

impl From<LauncherError> for CommandError {
    fn from(error: LauncherError) -> Self {
        match error {
            LauncherError::Store(e) => e.into(),
            LauncherError::Vault(e) => e.into(),
            LauncherError::Launch(e) => e.into(),
            LauncherError::License(e) => e.into(),
            LauncherError::Io(e) => CommandError::new("IO_ERROR", e.to_string()),
            LauncherError::InvalidInput(msg) => CommandError::invalid_input(msg),
        }
    }
}

/// 명령 결과 타입
pub type CommandResult<T> = Result<T, CommandError>;
