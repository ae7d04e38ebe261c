//! Database Schema
//!
//! SQLite 테이블 스키마 정의

/// 데이터베이스 스키마 생성 SQL
///
/// 모든 설정은 `settings` 테이블 하나에 JSON 값으로 저장합니다.
pub const CREATE_SCHEMA: &str = r#"
-- 설정 테이블 (key-value)
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value_json TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
"#;
