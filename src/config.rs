//! 런타임 설정
//!
//! `.env` / `.env.local`을 먼저 로드한 뒤 `RIOT_LAUNCHER_*` 환경 변수로 `LauncherConfig`를 만듭니다.

use std::path::{Path, PathBuf};

use crate::launcher::LaunchTimings;
use crate::license::client::DEFAULT_LICENSE_ENDPOINT;
use crate::license::entitlement::DEFAULT_DEV_KEY;

pub const ENV_DATA_DIR: &str = "RIOT_LAUNCHER_DATA_DIR";
pub const ENV_LICENSE_URL: &str = "RIOT_LAUNCHER_LICENSE_URL";
pub const ENV_PRODUCT_ID: &str = "RIOT_LAUNCHER_PRODUCT_ID";
pub const ENV_DEV_KEY: &str = "RIOT_LAUNCHER_DEV_KEY";
pub const ENV_SESSION_FILE: &str = "RIOT_LAUNCHER_SESSION_FILE";

pub const APP_DIR_NAME: &str = "riot-launcher";
pub const DB_FILE_NAME: &str = "launcher.db";
pub const DEFAULT_PRODUCT_ID: &str = "riot-account-launcher";

/// 로그인 전에 지우는 Riot 클라이언트 세션 캐시 (LOCALAPPDATA 기준)
const SESSION_CACHE_RELATIVE: &[&str] = &[
    "Riot Games",
    "Riot Client",
    "Data",
    "RiotGamesPrivateSettings.yaml",
];

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub data_dir: PathBuf,
    pub license_endpoint: String,
    pub product_id: String,
    pub dev_key: String,
    pub session_cache_file: Option<PathBuf>,
    pub timings: LaunchTimings,
}

impl LauncherConfig {
    /// 환경 변수에서 설정을 읽습니다. 비어 있는 값은 설정되지 않은 것으로 봅니다.
    pub fn from_env() -> Self {
        let data_dir = env_non_empty(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let session_cache_file = env_non_empty(ENV_SESSION_FILE)
            .map(PathBuf::from)
            .or_else(default_session_cache_file);

        Self {
            data_dir,
            license_endpoint: env_non_empty(ENV_LICENSE_URL)
                .unwrap_or_else(|| DEFAULT_LICENSE_ENDPOINT.to_string()),
            product_id: env_non_empty(ENV_PRODUCT_ID)
                .unwrap_or_else(|| DEFAULT_PRODUCT_ID.to_string()),
            dev_key: env_non_empty(ENV_DEV_KEY).unwrap_or_else(|| DEFAULT_DEV_KEY.to_string()),
            session_cache_file,
            timings: LaunchTimings::default(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            license_endpoint: DEFAULT_LICENSE_ENDPOINT.to_string(),
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            dev_key: DEFAULT_DEV_KEY.to_string(),
            session_cache_file: default_session_cache_file(),
            timings: LaunchTimings::default(),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

fn default_session_cache_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| {
        SESSION_CACHE_RELATIVE
            .iter()
            .fold(base, |path, part| path.join(part))
    })
}

/// `start`부터 루트까지 올라가며 처음 발견한 `filename`
fn find_env_file(start: &Path, filename: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(filename))
        .find(|candidate| candidate.is_file())
}

/// `.env.local`(CWD, 실행 파일 위치 기준으로 상위 탐색)과 `.env`를 로드합니다.
/// 이미 설정된 환경 변수는 덮어쓰지 않으며, 파일이 없으면 조용히 넘어갑니다.
pub fn load_env() {
    let bases = [
        std::env::current_dir().ok(),
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf)),
    ];

    if let Some(path) = bases
        .iter()
        .flatten()
        .find_map(|base| find_env_file(base, ".env.local"))
    {
        match dotenvy::from_path(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "loaded env file"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable env file"),
        }
    }

    let _ = dotenvy::dotenv();
}
