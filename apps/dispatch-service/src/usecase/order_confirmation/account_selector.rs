//! # 送信者選択
//!
//! リクエストの送信者指定を、アカウントプール内の具体的な送信者アカウントに解決する。
//!
//! - 指定なし → プールのローテーションで次のアカウント（プールが空なら `NoAccountsConfigured`）
//! - 指定あり → 完全一致で検索（見つからなければ `UnknownAccount`、プールが空でも同様）

use std::sync::Arc;

use happydeel_domain::sender::{SelectionError, SenderPreference};
use happydeel_infra::{AccountPool, SenderAccount};

/// 送信者セレクター
pub struct AccountSelector {
    pool: Arc<dyn AccountPool>,
}

impl AccountSelector {
    pub fn new(pool: Arc<dyn AccountPool>) -> Self {
        Self { pool }
    }

    /// 送信者指定から送信者アカウントを選ぶ
    ///
    /// 指定ありの場合はローテーションのカーソルを動かさない。
    pub fn select(
        &self,
        preference: Option<&SenderPreference>,
    ) -> Result<SenderAccount, SelectionError> {
        match preference {
            Some(preference) => self
                .pool
                .find(preference)
                .ok_or_else(|| SelectionError::UnknownAccount(preference.as_str().to_string())),
            None => self
                .pool
                .next_in_rotation()
                .ok_or(SelectionError::NoAccountsConfigured),
        }
    }
}
