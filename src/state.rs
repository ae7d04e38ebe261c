//! 세션 컨텍스트
//!
//! 저장소, 암호화, 라이선스, 계정 보관소, 실행기를 하나로 묶어 명령 함수에 넘깁니다.

use std::sync::Arc;

use crate::accounts::CredentialVault;
use crate::automation::{CscriptRunner, MacroRunner};
use crate::config::LauncherConfig;
use crate::db::{Database, Settings, SettingsStore};
use crate::error::LauncherError;
use crate::launcher::Launcher;
use crate::license::{Entitlement, GumroadVerifier, LicenseVerifier};
use crate::process::{ProcessController, SystemProcessController};
use crate::secrets::{KeychainStorage, SecretCipher, SecureStorage};

/// 교체 가능한 외부 의존성 묶음
pub struct Collaborators {
    pub store: Arc<dyn SettingsStore>,
    pub secure_storage: Arc<dyn SecureStorage>,
    pub verifier: Arc<dyn LicenseVerifier>,
    pub processes: Arc<dyn ProcessController>,
    pub macro_runner: Arc<dyn MacroRunner>,
}

pub struct AppState {
    pub config: LauncherConfig,
    pub settings: Settings,
    pub cipher: SecretCipher,
    pub entitlement: Arc<Entitlement>,
    pub vault: Arc<CredentialVault>,
    pub launcher: Launcher,
}

impl AppState {
    pub fn new(config: LauncherConfig, parts: Collaborators) -> Self {
        let settings = Settings::new(parts.store);
        let cipher = SecretCipher::new(parts.secure_storage);
        let entitlement = Arc::new(Entitlement::new(
            settings.clone(),
            parts.verifier,
            config.dev_key.clone(),
        ));
        let vault = Arc::new(CredentialVault::new(
            settings.clone(),
            cipher.clone(),
            entitlement.clone(),
        ));
        let launcher = Launcher::new(
            settings.clone(),
            vault.clone(),
            cipher.clone(),
            parts.processes,
            parts.macro_runner,
        )
        .with_session_cache_file(config.session_cache_file.clone())
        .with_timings(config.timings);

        Self {
            config,
            settings,
            cipher,
            entitlement,
            vault,
            launcher,
        }
    }

    /// 실제 OS 자원(SQLite, 키체인, HTTP, 프로세스)으로 세션을 구성하고
    /// 저장된 라이선스를 재검증합니다.
    pub async fn bootstrap(config: LauncherConfig) -> Result<Self, LauncherError> {
        let db = Database::new(&config.db_path())?;
        db.initialize()?;
        tracing::info!(path = %config.db_path().display(), "settings store opened");

        let parts = Collaborators {
            store: Arc::new(db),
            secure_storage: Arc::new(KeychainStorage::new()),
            verifier: Arc::new(GumroadVerifier::new(
                config.license_endpoint.clone(),
                config.product_id.clone(),
            )?),
            processes: Arc::new(SystemProcessController::new()),
            macro_runner: Arc::new(CscriptRunner::new()),
        };
        let state = Self::new(config, parts);

        if !state.cipher.is_available() {
            tracing::warn!("secure storage unavailable, new passwords will be stored unencrypted");
        }

        // 라이선스 재검증 실패는 세션을 막지 않음 (무료 모드로 동작)
        match state.entitlement.bootstrap().await {
            Ok(premium) => tracing::info!(premium, "entitlement bootstrapped"),
            Err(e) => tracing::warn!(error = %e, "entitlement bootstrap failed"),
        }

        Ok(state)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::automation::{LoginMacro, MacroError};
    use crate::db::MemoryStore;
    use crate::license::testing::StaticVerifier;
    use crate::process::{DetachedProcess, ProcessError};
    use async_trait::async_trait;
    use std::path::Path;

    /// 아무 일도 하지 않는 프로세스 컨트롤러
    pub struct NoopProcesses;

    #[async_trait]
    impl ProcessController for NoopProcesses {
        async fn terminate_by_image_names(&self, _names: &[&str]) {}

        async fn spawn(
            &self,
            program: &Path,
            args: &[String],
            _working_dir: &Path,
        ) -> Result<DetachedProcess, ProcessError> {
            Ok(DetachedProcess {
                pid: None,
                program: program.to_path_buf(),
                args: args.to_vec(),
            })
        }
    }

    pub struct NoopMacro;

    #[async_trait]
    impl MacroRunner for NoopMacro {
        async fn run(&self, _login: &LoginMacro) -> Result<(), MacroError> {
            Ok(())
        }
    }

    /// 메모리 저장소 + 고정 마스터키 + 오프라인 라이선스 서버
    pub fn state_with(verifier: StaticVerifier) -> AppState {
        let config = LauncherConfig {
            session_cache_file: None,
            ..LauncherConfig::default()
        };
        AppState::new(
            config,
            Collaborators {
                store: Arc::new(MemoryStore::new()),
                secure_storage: Arc::new(KeychainStorage::with_master_key([3u8; 32])),
                verifier: Arc::new(verifier),
                processes: Arc::new(NoopProcesses),
                macro_runner: Arc::new(NoopMacro),
            },
        )
    }

    pub fn test_state() -> AppState {
        state_with(StaticVerifier::offline())
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use crate::license::entitlement::DEFAULT_DEV_KEY;
    use crate::license::testing::StaticVerifier;

    #[tokio::test]
    async fn test_wiring_shares_entitlement_with_vault() {
        let state = test_state();
        assert!(!state.entitlement.status().await);
        assert!(state.entitlement.verify(DEFAULT_DEV_KEY).await.success);
        assert!(state.entitlement.status().await);
        assert_eq!(state.settings.license_key().unwrap().as_deref(), Some(DEFAULT_DEV_KEY));
    }

    #[tokio::test]
    async fn test_entitlement_starts_unvalidated_until_bootstrap() {
        let state = state_with(StaticVerifier::accepting());
        state.settings.set_license_key("stored-key").unwrap();
        assert!(!state.entitlement.status().await);

        assert!(state.entitlement.bootstrap().await.unwrap());
        assert!(state.entitlement.status().await);
    }
}
