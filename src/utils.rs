use std::path::{Path, PathBuf};

use crate::error::{CommandError, CommandResult};

/// 클라이언트 실행 파일 경로 검증
/// - 존재하는 파일이어야 하며 canonicalize()한 경로를 반환합니다.
/// - Windows에서는 `.exe` 확장자만 허용합니다.
pub fn validate_executable_path(path_str: &str) -> CommandResult<PathBuf> {
    let trimmed = path_str.trim();
    if trimmed.is_empty() {
        return Err(CommandError::invalid_input("Path is empty"));
    }
    let path = Path::new(trimmed);

    if !path.exists() {
        return Err(CommandError {
            code: "PATH_ERROR".to_string(),
            message: "Executable not found".to_string(),
            details: Some(trimmed.to_string()),
        });
    }

    let canonical_path = path.canonicalize().map_err(|e| CommandError {
        code: "PATH_ERROR".to_string(),
        message: format!("Invalid path: {}", e),
        details: None,
    })?;

    if !canonical_path.is_file() {
        return Err(CommandError {
            code: "PATH_ERROR".to_string(),
            message: "Path is not a file".to_string(),
            details: Some(canonical_path.display().to_string()),
        });
    }

    if !has_executable_extension(&canonical_path) {
        return Err(CommandError {
            code: "PATH_ERROR".to_string(),
            message: "Select the Riot Client executable (.exe)".to_string(),
            details: Some(canonical_path.display().to_string()),
        });
    }

    Ok(canonical_path)
}

#[cfg(windows)]
fn has_executable_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("exe"))
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn has_executable_extension(_path: &Path) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_missing_and_empty() {
        assert_eq!(validate_executable_path("  ").unwrap_err().code, "INVALID_INPUT");
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("RiotClientServices.exe");
        let err = validate_executable_path(&missing.to_string_lossy()).unwrap_err();
        assert_eq!(err.code, "PATH_ERROR");
    }

    #[test]
    fn test_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_executable_path(&dir.path().to_string_lossy()).unwrap_err();
        assert_eq!(err.message, "Path is not a file");
    }

    #[test]
    fn test_accepts_existing_exe() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("RiotClientServices.exe");
        std::fs::write(&exe, b"").unwrap();

        let validated = validate_executable_path(&exe.to_string_lossy()).unwrap();
        assert_eq!(validated, exe.canonicalize().unwrap());
    }
}
