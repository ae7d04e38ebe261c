//! Riot Launcher - Backend Library
//!
//! Riot 클라이언트 멀티 계정 런처의 백엔드. 계정 보관(암호화), 라이선스 검증,
//! 클라이언트 재시작 및 자동 로그인 매크로 실행을 담당합니다.

pub mod accounts;
pub mod automation;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod launcher;
pub mod license;
pub mod models;
pub mod process;
pub mod secrets;
pub mod state;
pub mod utils;

pub use config::LauncherConfig;
pub use error::{CommandError, CommandResult, LauncherError};
pub use state::AppState;

/// `RUST_LOG`가 없으면 `info` 레벨로 로그를 남깁니다.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// env 파일 로드 → 설정 → 세션 부트스트랩
pub async fn bootstrap() -> Result<AppState, LauncherError> {
    config::load_env();
    let config = LauncherConfig::from_env();
    tracing::debug!(data_dir = %config.data_dir.display(), "configuration loaded");
    AppState::bootstrap(config).await
}
