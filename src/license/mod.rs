//! License 모듈
//!
//! 외부 라이선스 검증 서비스 클라이언트와 세션 단위 Entitlement 상태

pub mod client;
pub mod entitlement;

pub use client::{GumroadVerifier, LicenseCheck, LicenseVerifier};
pub use entitlement::Entitlement;

use crate::error::StoreError;

/// 라이선스 검증 오류
#[derive(Debug, thiserror::Error)]
pub enum LicenseError {
    #[error("License key is empty")]
    EmptyKey,

    #[error("Invalid license key")]
    Invalid,

    #[error("This license has been refunded")]
    Refunded,

    #[error("License server unreachable: {0}")]
    Transport(String),

    #[error("Failed to persist license key: {0}")]
    Store(#[from] StoreError),
}

impl LicenseError {
    /// 서버가 명시적으로 거부한 경우 (네트워크 오류와 구분)
    pub fn is_rejection(&self) -> bool {
        matches!(self, LicenseError::Invalid | LicenseError::Refunded)
    }
}
