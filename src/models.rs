//! Launcher Data Models
//!
//! 프론트엔드(IPC/CLI) JSON 페이로드와 매핑되는 Rust 데이터 모델

use serde::{Deserialize, Serialize};

/// 저장된 계정 1건
///
/// `secret`은 `encrypted` 플래그에 따라 평문 또는 hex 암호문입니다.
/// 플래그는 저장 시점의 암호화 가능 여부로 결정되며 이후 재계산하지 않습니다.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub display_name: String,
    pub username: String,
    #[serde(alias = "password")]
    pub secret: String,
    pub encrypted: bool,
    #[serde(default)]
    pub rank: String,
}

// secret은 로그에 남기지 않음
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .field("encrypted", &self.encrypted)
            .field("rank", &self.rank)
            .finish()
    }
}

/// 계정 추가 요청
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAccount {
    pub display_name: Option<String>,
    pub username: String,
    #[serde(alias = "password")]
    pub secret: String,
    pub rank: Option<String>,
}

/// 계정 수정 요청
///
/// `secret`이 비어 있으면 기존 비밀번호/암호화 플래그를 유지합니다.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountPatch {
    pub id: String,
    pub display_name: Option<String>,
    pub username: Option<String>,
    #[serde(alias = "password")]
    pub secret: Option<String>,
    pub rank: Option<String>,
}

/// 실행 요청 (저장하지 않음)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    #[serde(alias = "id")]
    pub account_id: String,
    #[serde(alias = "game")]
    pub product_id: String,
}

/// 라이선스 검증 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// 설정 화면에 표시되는 값 묶음
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherSettings {
    pub riot_path: Option<String>,
    pub stay_signed_in: bool,
    pub typing_delay_ms: u64,
    pub premium: bool,
}
