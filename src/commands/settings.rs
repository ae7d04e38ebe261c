//! Launch Preference Commands

use crate::error::CommandResult;
use crate::models::LauncherSettings;
use crate::state::AppState;

pub async fn get_settings(state: &AppState) -> CommandResult<LauncherSettings> {
    Ok(LauncherSettings {
        riot_path: state.settings.riot_path()?.map(|p| p.display().to_string()),
        stay_signed_in: state.settings.stay_signed_in()?,
        typing_delay_ms: state.settings.typing_delay_ms()?,
        premium: state.entitlement.status().await,
    })
}

pub fn set_stay_signed_in(state: &AppState, enabled: bool) -> CommandResult<bool> {
    state.settings.set_stay_signed_in(enabled)?;
    Ok(enabled)
}

/// 상한을 넘는 값은 잘라서 저장하고 실제 저장된 값을 반환
pub fn set_typing_delay(state: &AppState, delay_ms: u64) -> CommandResult<u64> {
    Ok(state.settings.set_typing_delay_ms(delay_ms)?)
}
