//! Login Macro 모듈
//!
//! 로그인 창을 기다렸다가 포커스를 두 번 확인한 뒤 키 입력을 주입하는
//! 자동화 스크립트를 만들고 실행합니다.

pub mod runner;
pub mod script;

pub use runner::{CscriptRunner, MacroRunner};
pub use script::{escape_send_keys, KeyStep, LoginMacro, MacroTimings};

/// 로그인 창 제목
pub const RIOT_WINDOW_TITLE: &str = "Riot Client";

/// 아이디 입력 전 기본 대기 시간 (ms)
pub const DEFAULT_TYPING_DELAY_MS: u64 = 1500;
pub const MAX_TYPING_DELAY_MS: u64 = 10_000;

/// 스크립트 종료 코드
///
/// cscript는 스크립트 컴파일/실행 오류 시 1로 종료하므로 1, 2는 피합니다.
pub const EXIT_OK: i32 = 0;
pub const EXIT_WINDOW_NOT_FOUND: i32 = 10;
pub const EXIT_FOCUS_LOST: i32 = 11;

#[derive(Debug, thiserror::Error)]
pub enum MacroError {
    #[error("Login window was not found")]
    WindowNotFound,

    #[error("Login window lost focus, no keys were sent")]
    FocusLost,

    #[error("Macro script exited with code {0:?}")]
    ScriptFailed(Option<i32>),

    #[error("Macro IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MacroError {
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(EXIT_WINDOW_NOT_FOUND) => MacroError::WindowNotFound,
            Some(EXIT_FOCUS_LOST) => MacroError::FocusLost,
            other => MacroError::ScriptFailed(other),
        }
    }
}
