//! Client Path Commands

use crate::error::CommandResult;
use crate::state::AppState;
use crate::utils::validate_executable_path;

/// 저장된 Riot 클라이언트 경로 (없으면 `None`)
pub fn get_riot_path(state: &AppState) -> CommandResult<Option<String>> {
    Ok(state
        .settings
        .riot_path()?
        .map(|p| p.display().to_string()))
}

/// 경로를 검증한 뒤 정규화된 경로를 저장하고 반환
pub fn set_riot_path(state: &AppState, path: String) -> CommandResult<String> {
    let validated = validate_executable_path(&path)?;
    state.settings.set_riot_path(&validated)?;
    tracing::info!(path = %validated.display(), "riot client path updated");
    Ok(validated.display().to_string())
}
