//! License Commands

use crate::error::CommandResult;
use crate::models::VerifyOutcome;
use crate::state::AppState;

/// 현재 세션의 프리미엄 여부 (네트워크 호출 없음)
pub async fn get_license_status(state: &AppState) -> CommandResult<bool> {
    Ok(state.entitlement.status().await)
}

/// 실패도 `success: false`로 돌려주며 에러로 던지지 않음
pub async fn verify_license(state: &AppState, key: String) -> CommandResult<VerifyOutcome> {
    Ok(state.entitlement.verify(&key).await)
}
