//! Database Module
//!
//! 영속 key-value 저장소 (SQLite) 및 타입이 지정된 설정 접근자

mod schema;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::automation::{DEFAULT_TYPING_DELAY_MS, MAX_TYPING_DELAY_MS};
use crate::error::StoreError;
use crate::models::Account;

/// 저장소 키
pub const KEY_RIOT_PATH: &str = "riotPath";
pub const KEY_ACCOUNTS: &str = "accounts";
pub const KEY_LICENSE: &str = "licenseKey";
pub const KEY_STAY_SIGNED_IN: &str = "staySignedIn";
pub const KEY_TYPING_DELAY: &str = "typingDelay";

/// 문자열 키 기반 영속 저장소
pub trait SettingsStore: Send + Sync {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_raw(&self, key: &str, value_json: &str) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// SQLite 데이터베이스 래퍼
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// 새 데이터베이스 연결 생성 (부모 디렉토리 자동 생성)
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 인메모리 SQLite (테스트용)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 데이터베이스 스키마 초기화
    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute_batch(schema::CREATE_SCHEMA)?;
        Ok(())
    }

    /// 저장된 키 목록
    pub fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut stmt = conn.prepare("SELECT key FROM settings ORDER BY key")?;
        let iter = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for key in iter {
            keys.push(key?);
        }
        Ok(keys)
    }
}

impl SettingsStore for Database {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let value = conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_raw(&self, key: &str, value_json: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value_json, updated_at) VALUES (?1, ?2, ?3)",
            (key, value_json, chrono::Utc::now().timestamp_millis()),
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// 프로세스 메모리에만 존재하는 저장소
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value_json: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::LockPoisoned)?;
        values.insert(key.to_string(), value_json.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::LockPoisoned)?;
        values.remove(key);
        Ok(())
    }
}

/// 타입이 지정된 설정 접근자
///
/// 저장소 자체는 공유(Arc)되며, 값은 모두 JSON으로 직렬화됩니다.
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn SettingsStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.store.get_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.store.set_raw(key, &raw)
    }

    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.store.delete(key)
    }

    pub fn riot_path(&self) -> Result<Option<PathBuf>, StoreError> {
        self.get::<PathBuf>(KEY_RIOT_PATH)
    }

    pub fn set_riot_path(&self, path: &Path) -> Result<(), StoreError> {
        self.set(KEY_RIOT_PATH, path)
    }

    /// 계정 목록 (순서 유지)
    pub fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.get::<Vec<Account>>(KEY_ACCOUNTS)?.unwrap_or_default())
    }

    pub fn set_accounts(&self, accounts: &[Account]) -> Result<(), StoreError> {
        self.set(KEY_ACCOUNTS, accounts)
    }

    pub fn license_key(&self) -> Result<Option<String>, StoreError> {
        self.get::<String>(KEY_LICENSE)
    }

    pub fn set_license_key(&self, key: &str) -> Result<(), StoreError> {
        self.set(KEY_LICENSE, key)
    }

    pub fn delete_license_key(&self) -> Result<(), StoreError> {
        self.delete(KEY_LICENSE)
    }

    pub fn stay_signed_in(&self) -> Result<bool, StoreError> {
        Ok(self.get::<bool>(KEY_STAY_SIGNED_IN)?.unwrap_or(false))
    }

    pub fn set_stay_signed_in(&self, value: bool) -> Result<(), StoreError> {
        self.set(KEY_STAY_SIGNED_IN, &value)
    }

    /// 입력 필드 사이 대기 시간 (ms)
    pub fn typing_delay_ms(&self) -> Result<u64, StoreError> {
        Ok(self
            .get::<u64>(KEY_TYPING_DELAY)?
            .unwrap_or(DEFAULT_TYPING_DELAY_MS)
            .min(MAX_TYPING_DELAY_MS))
    }

    /// 범위를 벗어난 값은 상한으로 잘라 저장하고, 실제 저장된 값을 반환
    pub fn set_typing_delay_ms(&self, value: u64) -> Result<u64, StoreError> {
        let clamped = value.min(MAX_TYPING_DELAY_MS);
        self.set(KEY_TYPING_DELAY, &clamped)?;
        Ok(clamped)
    }
}
