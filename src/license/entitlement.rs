//! Entitlement Gate
//!
//! 세션 동안만 유효한 `validated` 플래그를 관리합니다.
//! 영속화되는 것은 라이선스 키 문자열뿐이며, 앱을 재시작하면 항상 다시 검증합니다.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use super::{LicenseError, LicenseVerifier};
use crate::db::Settings;
use crate::models::VerifyOutcome;

/// 네트워크 호출 없이 항상 통과하는 개발용 키
pub const DEFAULT_DEV_KEY: &str = "RIOT-LAUNCHER-DEV";

/// 검증 서버 응답 대기 상한
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(20);

pub struct Entitlement {
    validated: RwLock<bool>,
    settings: Settings,
    verifier: Arc<dyn LicenseVerifier>,
    dev_key: String,
    verify_timeout: Duration,
}

impl Entitlement {
    pub fn new(settings: Settings, verifier: Arc<dyn LicenseVerifier>, dev_key: impl Into<String>) -> Self {
        Self {
            validated: RwLock::new(false),
            settings,
            verifier,
            dev_key: dev_key.into(),
            verify_timeout: VERIFY_TIMEOUT,
        }
    }

    /// 메모리 플래그만 반환 (네트워크 호출 없음)
    pub async fn status(&self) -> bool {
        *self.validated.read().await
    }

    /// 라이선스 키 검증
    ///
    /// 성공 시 키를 저장하고 플래그를 켭니다. 실패 시 플래그만 끄고
    /// 이전에 저장된 키는 건드리지 않습니다.
    /// 네트워크 호출 중에는 플래그 잠금을 잡지 않으므로 `status()`는 막히지 않습니다.
    pub async fn verify(&self, key: &str) -> VerifyOutcome {
        let key = key.trim();
        if key.is_empty() {
            return VerifyOutcome::failed(LicenseError::EmptyKey.to_string());
        }

        match self.check(key).await {
            Ok(()) => {
                if let Err(e) = self.settings.set_license_key(key) {
                    tracing::warn!(error = %e, "license accepted but could not be persisted");
                }
                *self.validated.write().await = true;
                tracing::info!("license validated");
                VerifyOutcome::ok()
            }
            Err(e) => {
                *self.validated.write().await = false;
                tracing::warn!(error = %e, "license validation failed");
                VerifyOutcome::failed(e.to_string())
            }
        }
    }

    /// 앱 시작 시 1회: 저장된 키가 있으면 재검증
    ///
    /// 서버가 명시적으로 거부한 키는 삭제합니다. 네트워크 오류나 시간 초과일 때는
    /// 이번 세션만 미인증으로 두고 키는 다음 실행을 위해 남겨둡니다.
    pub async fn bootstrap(&self) -> Result<bool, LicenseError> {
        let Some(key) = self.settings.license_key()? else {
            tracing::debug!("no stored license key");
            return Ok(false);
        };

        let valid = match self.check(key.trim()).await {
            Ok(()) => {
                tracing::info!("stored license re-validated");
                true
            }
            Err(e) if e.is_rejection() || matches!(e, LicenseError::EmptyKey) => {
                tracing::warn!(error = %e, "stored license is no longer valid, removing it");
                self.settings.delete_license_key()?;
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not re-validate stored license, keeping it for next start");
                false
            }
        };
        *self.validated.write().await = valid;
        Ok(valid)
    }

    async fn check(&self, key: &str) -> Result<(), LicenseError> {
        if key.is_empty() {
            return Err(LicenseError::EmptyKey);
        }
        if key == self.dev_key {
            tracing::debug!("developer license key used");
            return Ok(());
        }

        let check = tokio::time::timeout(self.verify_timeout, self.verifier.verify(key))
            .await
            .map_err(|_| {
                LicenseError::Transport(format!(
                    "no response within {}s",
                    self.verify_timeout.as_secs()
                ))
            })??;
        if !check.success {
            return Err(LicenseError::Invalid);
        }
        if check.refunded {
            return Err(LicenseError::Refunded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::license::testing::StaticVerifier;

    fn setup(verifier: StaticVerifier) -> (Entitlement, Settings, Arc<StaticVerifier>) {
        let settings = Settings::new(Arc::new(MemoryStore::new()));
        let verifier = Arc::new(verifier);
        let gate = Entitlement::new(settings.clone(), verifier.clone(), DEFAULT_DEV_KEY);
        (gate, settings, verifier)
    }

    #[tokio::test]
    async fn test_empty_key_fails_without_network() {
        let (gate, settings, verifier) = setup(StaticVerifier::accepting());
        let outcome = gate.verify("   ").await;
        assert!(!outcome.success);
        assert_eq!(verifier.call_count(), 0);
        assert!(settings.license_key().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dev_key_bypasses_network() {
        let (gate, settings, verifier) = setup(StaticVerifier::offline());
        let outcome = gate.verify(&format!("  {}  ", DEFAULT_DEV_KEY)).await;
        assert_eq!(outcome, VerifyOutcome::ok());
        assert!(gate.status().await);
        assert_eq!(verifier.call_count(), 0);
        assert_eq!(settings.license_key().unwrap().as_deref(), Some(DEFAULT_DEV_KEY));
    }

    #[tokio::test]
    async fn test_valid_key_is_persisted() {
        let (gate, settings, _) = setup(StaticVerifier::accepting());
        assert!(!gate.status().await);
        assert!(gate.verify("ABCD-1234").await.success);
        assert!(gate.status().await);
        assert_eq!(settings.license_key().unwrap().as_deref(), Some("ABCD-1234"));
    }

    #[tokio::test]
    async fn test_refunded_key_is_rejected() {
        let (gate, settings, _) = setup(StaticVerifier::refunded());
        let outcome = gate.verify("ABCD-1234").await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("refunded"));
        assert!(!gate.status().await);
        assert!(settings.license_key().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_verify_keeps_previous_key() {
        let (gate, settings, _) = setup(StaticVerifier::offline());
        settings.set_license_key("GOOD-KEY").unwrap();

        let outcome = gate.verify("OTHER-KEY").await;
        assert!(!outcome.success);
        assert!(!gate.status().await);
        assert_eq!(settings.license_key().unwrap().as_deref(), Some("GOOD-KEY"));
    }

    #[tokio::test]
    async fn test_bootstrap_revalidates_stored_key() {
        let (gate, settings, verifier) = setup(StaticVerifier::accepting());
        settings.set_license_key("GOOD-KEY").unwrap();

        assert!(gate.bootstrap().await.unwrap());
        assert!(gate.status().await);
        assert_eq!(verifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_deletes_rejected_key() {
        let (gate, settings, _) = setup(StaticVerifier::rejecting());
        settings.set_license_key("OLD-KEY").unwrap();

        assert!(!gate.bootstrap().await.unwrap());
        assert!(settings.license_key().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_keeps_key_when_offline() {
        let (gate, settings, _) = setup(StaticVerifier::offline());
        settings.set_license_key("GOOD-KEY").unwrap();

        assert!(!gate.bootstrap().await.unwrap());
        assert!(!gate.status().await);
        assert_eq!(settings.license_key().unwrap().as_deref(), Some("GOOD-KEY"));
    }

    #[tokio::test]
    async fn test_bootstrap_without_key_is_noop() {
        let (gate, _, verifier) = setup(StaticVerifier::accepting());
        assert!(!gate.bootstrap().await.unwrap());
        assert_eq!(verifier.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_verify_clears_validated_flag() {
        let (gate, settings, _) = setup(StaticVerifier::offline());
        assert!(gate.verify(DEFAULT_DEV_KEY).await.success);
        assert!(gate.status().await);

        let outcome = gate.verify("OTHER-KEY").await;
        assert!(!outcome.success);
        assert!(!gate.status().await);
        assert_eq!(settings.license_key().unwrap().as_deref(), Some(DEFAULT_DEV_KEY));
    }

    #[tokio::test]
    async fn test_rejected_verify_clears_validated_flag() {
        let (gate, settings, _) = setup(StaticVerifier::rejecting());
        assert!(gate.verify(DEFAULT_DEV_KEY).await.success);

        assert!(!gate.verify("BAD-KEY").await.success);
        assert!(!gate.status().await);
        assert_eq!(settings.license_key().unwrap().as_deref(), Some(DEFAULT_DEV_KEY));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_is_not_blocked_by_slow_server() {
        let (gate, _, verifier) = setup(StaticVerifier::hanging());
        let gate = Arc::new(gate);

        let pending = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.verify("SOME-KEY").await })
        };
        while verifier.call_count() == 0 {
            tokio::task::yield_now().await;
        }

        let status = tokio::time::timeout(Duration::from_millis(10), gate.status()).await;
        assert_eq!(status.ok(), Some(false));

        // 서버가 응답하지 않으면 상한 시간 뒤 실패로 끝남
        let outcome = pending.await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("unreachable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bootstrap_times_out_and_keeps_key() {
        let (gate, settings, _) = setup(StaticVerifier::hanging());
        settings.set_license_key("GOOD-KEY").unwrap();

        let started = tokio::time::Instant::now();
        assert!(!gate.bootstrap().await.unwrap());
        assert!(started.elapsed() >= VERIFY_TIMEOUT);
        assert!(started.elapsed() < Duration::from_secs(3600));
        assert!(!gate.status().await);
        assert_eq!(settings.license_key().unwrap().as_deref(), Some("GOOD-KEY"));
    }
}
