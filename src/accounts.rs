//! Credential Vault
//!
//! 순서가 있는 계정 목록의 유일한 writer.
//! 모든 변경은 "전체 읽기 → 메모리 수정 → 전체 쓰기"이므로 `write_lock`으로 직렬화합니다.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::Settings;
use crate::error::StoreError;
use crate::license::Entitlement;
use crate::models::{Account, AccountPatch, NewAccount};
use crate::secrets::{CipherError, SecretCipher};

/// 무료 버전 최대 계정 수
pub const FREE_ACCOUNT_LIMIT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Free version is limited to {limit} accounts")]
    LimitReached { limit: usize },

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CredentialVault {
    settings: Settings,
    cipher: SecretCipher,
    entitlement: Arc<Entitlement>,
    write_lock: Mutex<()>,
}

impl CredentialVault {
    pub fn new(settings: Settings, cipher: SecretCipher, entitlement: Arc<Entitlement>) -> Self {
        Self {
            settings,
            cipher,
            entitlement,
            write_lock: Mutex::new(()),
        }
    }

    /// 저장된 순서 그대로 반환
    pub fn list(&self) -> Result<Vec<Account>, VaultError> {
        Ok(self.settings.accounts()?)
    }

    pub fn find(&self, id: &str) -> Result<Option<Account>, VaultError> {
        Ok(self.list()?.into_iter().find(|acc| acc.id == id))
    }

    /// 계정 추가
    ///
    /// username/secret이 비어 있으면 아무것도 하지 않고 `None`.
    /// 무료 버전에서 이미 한도에 도달했으면 `LimitReached` (목록 변경 없음).
    pub async fn add(&self, candidate: NewAccount) -> Result<Option<Vec<Account>>, VaultError> {
        let username = candidate.username.trim();
        if username.is_empty() || candidate.secret.is_empty() {
            tracing::warn!("rejected account creation with missing username or secret");
            return Ok(None);
        }

        let _guard = self.write_lock.lock().await;
        let mut list = self.settings.accounts()?;

        if !self.entitlement.status().await && list.len() >= FREE_ACCOUNT_LIMIT {
            tracing::info!(count = list.len(), "free tier account limit reached");
            return Err(VaultError::LimitReached {
                limit: FREE_ACCOUNT_LIMIT,
            });
        }

        let protected = self.cipher.protect(&candidate.secret)?;
        let display_name = candidate
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| username.to_string());

        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            display_name,
            username: username.to_string(),
            secret: protected.value,
            encrypted: protected.encrypted,
            rank: candidate.rank.unwrap_or_default(),
        };

        tracing::info!(account = %account.display_name, encrypted = account.encrypted, "account added");
        list.push(account);
        self.settings.set_accounts(&list)?;
        Ok(Some(list))
    }

    /// 계정 수정
    ///
    /// `secret`이 비어 있지 않을 때만 비밀번호와 `encrypted`를 다시 계산합니다.
    pub async fn edit(&self, patch: AccountPatch) -> Result<Option<Vec<Account>>, VaultError> {
        if patch.id.is_empty() {
            return Ok(None);
        }
        if matches!(&patch.username, Some(name) if name.trim().is_empty()) {
            tracing::warn!(id = %patch.id, "rejected account edit with blank username");
            return Ok(None);
        }

        let _guard = self.write_lock.lock().await;
        let mut list = self.settings.accounts()?;
        let Some(account) = list.iter_mut().find(|acc| acc.id == patch.id) else {
            tracing::warn!(id = %patch.id, "account to edit not found");
            return Err(VaultError::NotFound(patch.id.clone()));
        };

        if let Some(username) = patch.username {
            account.username = username.trim().to_string();
        }
        if let Some(display_name) = patch.display_name {
            let display_name = display_name.trim();
            account.display_name = if display_name.is_empty() {
                account.username.clone()
            } else {
                display_name.to_string()
            };
        }
        account.rank = patch.rank.unwrap_or_default();

        if let Some(secret) = patch.secret.filter(|s| !s.is_empty()) {
            let protected = self.cipher.protect(&secret)?;
            account.secret = protected.value;
            account.encrypted = protected.encrypted;
            tracing::info!(account = %account.display_name, encrypted = account.encrypted, "account secret updated");
        }

        tracing::info!(account = %account.display_name, "account edited");
        self.settings.set_accounts(&list)?;
        Ok(Some(list))
    }

    /// 계정 삭제 (없는 id여도 현재 목록 반환)
    pub async fn delete(&self, id: &str) -> Result<Vec<Account>, VaultError> {
        let _guard = self.write_lock.lock().await;
        let mut list = self.settings.accounts()?;
        let before = list.len();
        list.retain(|acc| acc.id != id);

        if list.len() != before {
            self.settings.set_accounts(&list)?;
            tracing::info!(id = %id, "account deleted");
        }
        Ok(list)
    }

    /// 전체 순서 교체. 호출자가 기존 계정의 순열을 넘긴다고 가정 (검증하지 않음)
    pub async fn reorder(&self, new_order: Vec<Account>) -> Result<Vec<Account>, VaultError> {
        let _guard = self.write_lock.lock().await;
        self.settings.set_accounts(&new_order)?;
        tracing::info!(count = new_order.len(), "accounts reordered");
        Ok(new_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::license::entitlement::DEFAULT_DEV_KEY;
    use crate::license::testing::StaticVerifier;
    use crate::secrets::KeychainStorage;
    use std::collections::HashSet;

    struct Fixture {
        vault: CredentialVault,
        entitlement: Arc<Entitlement>,
        cipher: SecretCipher,
    }

    fn fixture(storage: KeychainStorage) -> Fixture {
        let settings = Settings::new(Arc::new(MemoryStore::new()));
        let cipher = SecretCipher::new(Arc::new(storage));
        let entitlement = Arc::new(Entitlement::new(
            settings.clone(),
            Arc::new(StaticVerifier::offline()),
            DEFAULT_DEV_KEY,
        ));
        Fixture {
            vault: CredentialVault::new(settings, cipher.clone(), entitlement.clone()),
            entitlement,
            cipher,
        }
    }

    fn encrypted_fixture() -> Fixture {
        fixture(KeychainStorage::with_master_key([5u8; 32]))
    }

    fn new_account(username: &str, secret: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            secret: secret.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_appends_with_unique_id() {
        let fx = encrypted_fixture();
        let mut seen = HashSet::new();

        for (i, name) in ["alpha", "beta", "gamma"].iter().enumerate() {
            let list = fx.vault.add(new_account(name, "pw")).await.unwrap().unwrap();
            assert_eq!(list.len(), i + 1);
            let added = list.last().unwrap();
            assert!(seen.insert(added.id.clone()), "duplicate id");
            assert_eq!(added.display_name, *name);
            assert!(added.encrypted);
            assert_eq!(fx.cipher.decrypt(&added.secret).unwrap(), "pw");
        }
    }

    #[tokio::test]
    async fn test_add_rejects_missing_fields() {
        let fx = encrypted_fixture();
        assert!(fx.vault.add(new_account("", "pw")).await.unwrap().is_none());
        assert!(fx.vault.add(new_account("user", "")).await.unwrap().is_none());
        assert!(fx.vault.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_free_tier_limit_leaves_list_unchanged() {
        let fx = encrypted_fixture();
        for name in ["a", "b", "c"] {
            fx.vault.add(new_account(name, "pw")).await.unwrap();
        }
        let before: Vec<String> = fx.vault.list().unwrap().into_iter().map(|a| a.id).collect();

        let result = fx.vault.add(new_account("d", "pw")).await;
        assert!(matches!(result, Err(VaultError::LimitReached { limit: 3 })));

        let after: Vec<String> = fx.vault.list().unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_premium_lifts_limit() {
        let fx = encrypted_fixture();
        assert!(fx.entitlement.verify(DEFAULT_DEV_KEY).await.success);
        for name in ["a", "b", "c", "d", "e"] {
            fx.vault.add(new_account(name, "pw")).await.unwrap().unwrap();
        }
        assert_eq!(fx.vault.list().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_add_degrades_to_plaintext() {
        let fx = fixture(KeychainStorage::disabled());
        let list = fx.vault.add(new_account("user", "pw")).await.unwrap().unwrap();
        assert!(!list[0].encrypted);
        assert_eq!(list[0].secret, "pw");
    }

    #[tokio::test]
    async fn test_edit_without_secret_keeps_secret() {
        let fx = encrypted_fixture();
        let list = fx.vault.add(new_account("user", "pw")).await.unwrap().unwrap();
        let original = list[0].clone();

        let list = fx
            .vault
            .edit(AccountPatch {
                id: original.id.clone(),
                display_name: Some("Smurf".to_string()),
                rank: Some("Gold 2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();

        let edited = &list[0];
        assert_eq!(edited.display_name, "Smurf");
        assert_eq!(edited.username, "user");
        assert_eq!(edited.rank, "Gold 2");
        assert_eq!(edited.secret, original.secret);
        assert_eq!(edited.encrypted, original.encrypted);
    }

    #[tokio::test]
    async fn test_edit_with_secret_rederives_encrypted_flag() {
        // 암호화 불가 상태에서 만든 계정
        let plain = fixture(KeychainStorage::disabled());
        let list = plain.vault.add(new_account("user", "old")).await.unwrap().unwrap();
        assert!(!list[0].encrypted);

        // 같은 저장소를 암호화 가능한 cipher로 다시 열어 수정
        let cipher = SecretCipher::new(Arc::new(KeychainStorage::with_master_key([1u8; 32])));
        let vault = CredentialVault::new(
            plain.vault.settings.clone(),
            cipher.clone(),
            plain.entitlement.clone(),
        );
        let list = vault
            .edit(AccountPatch {
                id: list[0].id.clone(),
                secret: Some("new".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();

        assert!(list[0].encrypted);
        assert_eq!(cipher.decrypt(&list[0].secret).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_edit_unknown_id_is_not_found() {
        let fx = encrypted_fixture();
        let result = fx
            .vault
            .edit(AccountPatch {
                id: "missing".to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(VaultError::NotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_idempotent() {
        let fx = encrypted_fixture();
        fx.vault.add(new_account("a", "pw")).await.unwrap();
        fx.vault.add(new_account("b", "pw")).await.unwrap();
        let before = fx.vault.list().unwrap();

        let after = fx.vault.delete("does-not-exist").await.unwrap();
        assert_eq!(before, after);

        let after = fx.vault.delete(&before[0].id).await.unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, before[1].id);
    }

    #[tokio::test]
    async fn test_reorder_replaces_order() {
        let fx = encrypted_fixture();
        for name in ["a", "b", "c"] {
            fx.vault.add(new_account(name, "pw")).await.unwrap();
        }
        let mut list = fx.vault.list().unwrap();
        list.reverse();

        let returned = fx.vault.reorder(list.clone()).await.unwrap();
        assert_eq!(returned, list);
        let names: Vec<String> = fx.vault.list().unwrap().into_iter().map(|a| a.username).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_concurrent_adds_do_not_lose_updates() {
        let fx = Arc::new(encrypted_fixture());
        fx.entitlement.verify(DEFAULT_DEV_KEY).await;

        let mut handles = Vec::new();
        for i in 0..10 {
            let fx = fx.clone();
            handles.push(tokio::spawn(async move {
                fx.vault
                    .add(new_account(&format!("user{}", i), "pw"))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(fx.vault.list().unwrap().len(), 10);
    }
}
