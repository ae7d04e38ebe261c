//! Launch Command

use crate::error::CommandResult;
use crate::models::LaunchRequest;
use crate::state::AppState;

/// 계정으로 클라이언트를 재시작하고 자동 로그인
///
/// 성공 시 표시용 메시지, 실패 시 `Error`로 시작하는 메시지를 담은 `CommandError`
pub async fn launch_game(state: &AppState, request: LaunchRequest) -> CommandResult<String> {
    Ok(state.launcher.launch(&request).await?)
}
