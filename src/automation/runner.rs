//! Login Macro 실행기
//!
//! 스크립트를 임시 파일로 쓰고 `cscript`로 실행한 뒤 종료 코드로 결과를 판단합니다.
//! 임시 파일은 성공/실패와 관계없이 삭제합니다.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use zeroize::Zeroize;

use super::{LoginMacro, MacroError, EXIT_OK};

#[async_trait]
pub trait MacroRunner: Send + Sync {
    async fn run(&self, login: &LoginMacro) -> Result<(), MacroError>;
}

/// Windows Script Host(`cscript`) 실행기
pub struct CscriptRunner {
    interpreter: PathBuf,
    temp_dir: PathBuf,
}

impl CscriptRunner {
    pub fn new() -> Self {
        Self::with_paths(PathBuf::from("cscript"), std::env::temp_dir())
    }

    pub fn with_paths(interpreter: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            temp_dir: temp_dir.into(),
        }
    }

    async fn execute(&self, script_path: &Path) -> Result<Option<i32>, MacroError> {
        let status = tokio::process::Command::new(&self.interpreter)
            .arg("//Nologo")
            .arg(script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;
        Ok(status.code())
    }
}

impl Default for CscriptRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// WSH는 BOM이 있는 UTF-16LE 파일을 유니코드로 읽음 (비 ASCII 비밀번호 대응)
fn encode_utf16le(script: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 + script.len() * 2);
    bytes.extend_from_slice(&[0xFF, 0xFE]);
    for unit in script.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

#[async_trait]
impl MacroRunner for CscriptRunner {
    async fn run(&self, login: &LoginMacro) -> Result<(), MacroError> {
        let script_path = self
            .temp_dir
            .join(format!("riot_login_macro_{}.vbs", uuid::Uuid::new_v4().simple()));

        let mut contents = encode_utf16le(&login.render());
        let written = tokio::fs::write(&script_path, &contents).await;
        contents.zeroize();

        let result = match written {
            Ok(()) => self.execute(&script_path).await,
            Err(e) => Err(MacroError::Io(e)),
        };

        if let Err(e) = tokio::fs::remove_file(&script_path).await {
            tracing::debug!(path = %script_path.display(), error = %e, "could not remove macro script");
        }

        match result? {
            Some(EXIT_OK) => {
                tracing::info!("login macro completed");
                Ok(())
            }
            code => {
                let err = MacroError::from_exit_code(code);
                match &err {
                    MacroError::WindowNotFound => tracing::warn!(
                        title = %login.window_title,
                        attempts = login.timings.poll_attempts,
                        "login window never appeared"
                    ),
                    MacroError::FocusLost => tracing::warn!(
                        title = %login.window_title,
                        "login window lost focus before typing, aborted"
                    ),
                    other => tracing::warn!(error = %other, "login macro failed"),
                }
                Err(err)
            }
        }
    }
}
