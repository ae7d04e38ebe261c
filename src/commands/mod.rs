//! Launcher Commands Module
//!
//! UI(또는 CLI)에서 호출하는 명령 함수. 모두 `CommandResult<T>`를 반환합니다.

pub mod accounts;
pub mod config;
pub mod launch;
pub mod license;
pub mod settings;
