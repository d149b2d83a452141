//! # 送信者アカウント一覧ハンドラ
//!
//! ダッシュボードの送信者選択欄に表示するアカウント一覧を返す。
//! 認証情報は含めない。
//!
//! ```text
//! GET /get-accounts
//! ```
//!
//! ```json
//! { "accounts": [{ "user": "orders@happydeel.com" }] }
//! ```

use std::sync::Arc;

use axum::{Json, extract::State};
use happydeel_infra::AccountPool;
use serde::Serialize;

/// アカウント一覧ハンドラの State
pub struct AccountsState {
    pub pool: Arc<dyn AccountPool>,
}

/// 送信者アカウントの公開情報
#[derive(Debug, Serialize)]
pub struct AccountDto {
    pub user: String,
}

/// アカウント一覧レスポンス
#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub accounts: Vec<AccountDto>,
}

/// GET /get-accounts
///
/// ローテーション順（設定順）で返す。
pub async fn get_accounts(State(state): State<Arc<AccountsState>>) -> Json<AccountsResponse> {
    let accounts = state
        .pool
        .accounts()
        .into_iter()
        .map(|identity| AccountDto {
            user: identity.address().as_str().to_string(),
        })
        .collect();

    Json(AccountsResponse { accounts })
}
