//! Account Commands
//!
//! 계정 목록 조회/추가/수정/삭제/정렬

use crate::error::CommandResult;
use crate::models::{Account, AccountPatch, NewAccount};
use crate::state::AppState;

/// 저장된 순서대로 계정 목록 반환
pub fn get_accounts(state: &AppState) -> CommandResult<Vec<Account>> {
    Ok(state.vault.list()?)
}

/// 계정 추가
///
/// 입력이 비어 있으면 `None`, 무료 한도 초과 시 `LIMIT_REACHED` 에러
pub async fn add_account(state: &AppState, account: NewAccount) -> CommandResult<Option<Vec<Account>>> {
    Ok(state.vault.add(account).await?)
}

pub async fn edit_account(state: &AppState, patch: AccountPatch) -> CommandResult<Option<Vec<Account>>> {
    Ok(state.vault.edit(patch).await?)
}

pub async fn delete_account(state: &AppState, id: String) -> CommandResult<Vec<Account>> {
    Ok(state.vault.delete(&id).await?)
}

pub async fn reorder_accounts(state: &AppState, accounts: Vec<Account>) -> CommandResult<Vec<Account>> {
    Ok(state.vault.reorder(accounts).await?)
}
