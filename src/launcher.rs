//! Launch Orchestrator
//!
//! 계정 1개로 Riot 클라이언트를 재시작하고 자동 로그인하는 선형 파이프라인:
//!
//! `ValidatingInputs → Decrypting → ClearingStaleCache → Terminating → Waiting(2s)
//!  → Starting → RunningLoginMacro → [ProductSpecificRepeat] → Done`
//!
//! 어느 단계에서든 실패하면 해당 실행만 종료되며 계정/라이선스 상태는 바뀌지 않습니다.
//! 동시에 하나의 실행만 허용합니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use zeroize::Zeroizing;

use crate::accounts::{CredentialVault, VaultError};
use crate::automation::{LoginMacro, MacroError, MacroRunner, MacroTimings};
use crate::db::Settings;
use crate::error::StoreError;
use crate::models::LaunchRequest;
use crate::process::{ProcessController, ProcessError, RIOT_PROCESS_IMAGES};
use crate::secrets::{CipherError, SecretCipher};

/// 로그인 후 실행 명령을 한 번 더 보내야 하는 제품
pub const VALORANT_PRODUCT: &str = "valorant";
pub const LAUNCH_PATCHLINE: &str = "live";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchTimings {
    /// 프로세스 종료 후 재실행까지 대기
    pub teardown_grace: Duration,
    /// 로그인 완료 후 재실행 명령까지 대기 (Valorant)
    pub repeat_grace: Duration,
    pub macro_timings: MacroTimings,
}

impl Default for LaunchTimings {
    fn default() -> Self {
        Self {
            teardown_grace: Duration::from_secs(2),
            repeat_grace: Duration::from_secs(7),
            macro_timings: MacroTimings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStage {
    ValidatingInputs,
    Decrypting,
    ClearingStaleCache,
    Terminating,
    Waiting,
    Starting,
    RunningLoginMacro,
    ProductSpecificRepeat,
    Done,
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Error: invalid Riot Client path")]
    InvalidPath,

    #[error("Error: account not found ({0})")]
    AccountNotFound(String),

    #[error("Error: invalid product '{0}'")]
    InvalidProduct(String),

    #[error("Error: unable to decrypt the password (corrupted data or different PC?)")]
    Decryption(#[source] CipherError),

    #[error("Error: keyboard macro failed")]
    Macro(#[source] MacroError),

    #[error("Error: could not start the Riot Client")]
    Spawn(#[source] ProcessError),

    #[error("Error: {0}")]
    Store(#[from] StoreError),

    #[error("Error: {0}")]
    Vault(#[from] VaultError),

    #[error("Error: a launch is already in progress")]
    Busy,
}

pub struct Launcher {
    settings: Settings,
    vault: Arc<CredentialVault>,
    cipher: SecretCipher,
    processes: Arc<dyn ProcessController>,
    macro_runner: Arc<dyn MacroRunner>,
    session_cache_file: Option<PathBuf>,
    timings: LaunchTimings,
    in_flight: Mutex<()>,
}

impl Launcher {
    pub fn new(
        settings: Settings,
        vault: Arc<CredentialVault>,
        cipher: SecretCipher,
        processes: Arc<dyn ProcessController>,
        macro_runner: Arc<dyn MacroRunner>,
    ) -> Self {
        Self {
            settings,
            vault,
            cipher,
            processes,
            macro_runner,
            session_cache_file: None,
            timings: LaunchTimings::default(),
            in_flight: Mutex::new(()),
        }
    }

    /// 로그인 전에 지울 클라이언트 세션 캐시 파일
    pub fn with_session_cache_file(mut self, path: Option<PathBuf>) -> Self {
        self.session_cache_file = path;
        self
    }

    pub fn with_timings(mut self, timings: LaunchTimings) -> Self {
        self.timings = timings;
        self
    }

    /// 실행 1회. 성공 시 사용자에게 보여줄 메시지를 반환
    pub async fn launch(&self, request: &LaunchRequest) -> Result<String, LaunchError> {
        let _guard = self.in_flight.try_lock().map_err(|_| {
            tracing::warn!(account = %request.account_id, "launch rejected, another launch is running");
            LaunchError::Busy
        })?;

        match self.run_pipeline(request).await {
            Ok(message) => {
                enter(LaunchStage::Done);
                Ok(message)
            }
            Err(e) => {
                tracing::error!(error = %e, account = %request.account_id, "launch failed");
                Err(e)
            }
        }
    }

    async fn run_pipeline(&self, request: &LaunchRequest) -> Result<String, LaunchError> {
        enter(LaunchStage::ValidatingInputs);
        let riot_path = self
            .settings
            .riot_path()?
            .filter(|p| p.is_file())
            .ok_or(LaunchError::InvalidPath)?;
        let account = self
            .vault
            .find(&request.account_id)?
            .ok_or_else(|| LaunchError::AccountNotFound(request.account_id.clone()))?;
        let product = normalize_product(&request.product_id)?;

        enter(LaunchStage::Decrypting);
        let secret = self.reveal_secret(&account.secret, account.encrypted)?;
        let username = account.username.trim().to_string();
        tracing::info!(account = %account.display_name, product = %product, "launching");

        enter(LaunchStage::ClearingStaleCache);
        self.clear_session_cache().await;

        enter(LaunchStage::Terminating);
        self.processes
            .terminate_by_image_names(RIOT_PROCESS_IMAGES)
            .await;

        enter(LaunchStage::Waiting);
        tokio::time::sleep(self.timings.teardown_grace).await;

        enter(LaunchStage::Starting);
        let args = launch_args(&product);
        let working_dir = riot_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        self.processes
            .spawn(&riot_path, &args, &working_dir)
            .await
            .map_err(LaunchError::Spawn)?;

        enter(LaunchStage::RunningLoginMacro);
        let login = LoginMacro::new(
            &username,
            secret.trim(),
            self.settings.stay_signed_in()?,
            self.settings.typing_delay_ms()?,
        )
        .with_timings(self.timings.macro_timings);
        drop(secret);
        // 매크로 실패 시 이미 띄운 클라이언트는 그대로 둠
        self.macro_runner
            .run(&login)
            .await
            .map_err(LaunchError::Macro)?;

        if product == VALORANT_PRODUCT {
            enter(LaunchStage::ProductSpecificRepeat);
            tokio::time::sleep(self.timings.repeat_grace).await;
            // 이미 로그인된 클라이언트에서는 "계속" 동작을 트리거함
            self.processes
                .spawn(&riot_path, &args, &working_dir)
                .await
                .map_err(LaunchError::Spawn)?;
        }

        Ok(format!("Connecting {}...", account.display_name))
    }

    fn reveal_secret(&self, stored: &str, encrypted: bool) -> Result<Zeroizing<String>, LaunchError> {
        if !encrypted {
            return Ok(Zeroizing::new(stored.to_string()));
        }
        if !self.cipher.is_available() {
            return Err(LaunchError::Decryption(CipherError::Unavailable));
        }
        self.cipher
            .decrypt(stored)
            .map(Zeroizing::new)
            .map_err(LaunchError::Decryption)
    }

    async fn clear_session_cache(&self) {
        let Some(path) = &self.session_cache_file else {
            return;
        };
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "stale session cache removed"),
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "session cache not removed"),
        }
    }
}

fn enter(stage: LaunchStage) {
    tracing::debug!(?stage, "launch stage");
}

/// 제품 id는 소문자로 정규화, 영숫자/`_`/`-`만 허용
fn normalize_product(product_id: &str) -> Result<String, LaunchError> {
    let product = product_id.trim().to_lowercase();
    let valid = !product.is_empty()
        && product
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(product)
    } else {
        Err(LaunchError::InvalidProduct(product_id.to_string()))
    }
}

fn launch_args(product: &str) -> Vec<String> {
    vec![
        format!("--launch-product={}", product),
        format!("--launch-patchline={}", LAUNCH_PATCHLINE),
    ]
}
