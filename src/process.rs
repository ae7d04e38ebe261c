//! Process Controller
//!
//! 이미지 이름으로 프로세스를 종료하고, 인자/작업 디렉토리를 지정해 새 프로세스를 띄웁니다.
//! 띄운 프로세스의 종료는 기다리지 않습니다. Unix에서는 좀비가 남지 않도록 백그라운드 태스크가 회수합니다.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;

/// 재시작 전에 종료할 Riot 클라이언트 프로세스
pub const RIOT_PROCESS_IMAGES: &[&str] = &[
    "RiotClientServices.exe",
    "RiotClientUx.exe",
    "LeagueClient.exe",
    "VALORANT.exe",
];

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// 감독하지 않는(detached) 프로세스 핸들 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedProcess {
    pub pid: Option<u32>,
    pub program: PathBuf,
    pub args: Vec<String>,
}

#[async_trait]
pub trait ProcessController: Send + Sync {
    /// best-effort 종료. 실패(대상 없음 포함)는 삼킴
    async fn terminate_by_image_names(&self, names: &[&str]);

    /// fire-and-forget 실행
    async fn spawn(
        &self,
        program: &Path,
        args: &[String],
        working_dir: &Path,
    ) -> Result<DetachedProcess, ProcessError>;
}

/// 실제 OS 프로세스 API를 사용하는 구현
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessController;

impl SystemProcessController {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
fn kill_command(names: &[&str]) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("taskkill");
    cmd.arg("/F");
    for name in names {
        cmd.arg("/IM").arg(name);
    }
    cmd
}

/// Linux `comm`은 15바이트에서 잘리므로 `pkill -x`에는 잘린 이름을 넘겨야 일치함
#[cfg(not(windows))]
const COMM_NAME_MAX: usize = 15;

#[cfg(not(windows))]
fn comm_pattern(names: &[&str]) -> String {
    let truncated: Vec<String> = names
        .iter()
        .map(|name| {
            let mut end = name.len().min(COMM_NAME_MAX);
            while !name.is_char_boundary(end) {
                end -= 1;
            }
            name[..end].replace('.', "\\.")
        })
        .collect();
    format!("^({})$", truncated.join("|"))
}

#[cfg(not(windows))]
fn kill_command(names: &[&str]) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("pkill");
    cmd.arg("-9").arg("-x").arg(comm_pattern(names));
    cmd
}

#[async_trait]
impl ProcessController for SystemProcessController {
    async fn terminate_by_image_names(&self, names: &[&str]) {
        if names.is_empty() {
            return;
        }

        let mut cmd = kill_command(names);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match cmd.status().await {
            Ok(status) => {
                tracing::debug!(?names, code = ?status.code(), "terminate requested");
            }
            Err(e) => {
                tracing::debug!(?names, error = %e, "terminate command failed, ignoring");
            }
        }
    }

    async fn spawn(
        &self,
        program: &Path,
        args: &[String],
        working_dir: &Path,
    ) -> Result<DetachedProcess, ProcessError> {
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(windows)]
        {
            const DETACHED_PROCESS: u32 = 0x0000_0008;
            cmd.creation_flags(DETACHED_PROCESS);
        }

        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: program.display().to_string(),
            source,
        })?;

        let pid = child.id();
        tracing::info!(program = %program.display(), ?pid, "process started");

        // 호출자는 기다리지 않지만 종료 상태는 회수함
        let name = program.display().to_string();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => tracing::debug!(program = %name, code = ?status.code(), "process exited"),
                Err(e) => tracing::debug!(program = %name, error = %e, "failed to wait for process"),
            }
        });

        Ok(DetachedProcess {
            pid,
            program: program.to_path_buf(),
            args: args.to_vec(),
        })
    }
}
