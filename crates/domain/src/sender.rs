//! # 送信者
//!
//! 送信元として使うメールアカウントの識別情報と、送信者選択のエラーを定義する。
//!
//! 送信者アカウントそのもの（認証情報・SMTP 接続）はインフラ層のアカウントプールが
//! 所有する。ドメイン層が扱うのは「誰として送るか」を表す識別情報のみ。

use thiserror::Error;

use crate::email::EmailAddress;

/// 送信者の指定
///
/// リクエストの `senderEmail`。アカウントプール内の識別子と完全一致で照合する。
/// 空文字列・空白のみは「未指定（自動選択）」として扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderPreference(String);

impl SenderPreference {
    /// リクエストの入力値から作成する
    ///
    /// 前後の空白を除去し、空なら `None`（自動選択）を返す。
    pub fn from_input(value: String) -> Option<Self> {
        let value = value.trim();
        (!value.is_empty()).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 送信者の識別情報
///
/// From ヘッダーに載るアドレスと表示名。アドレスがアカウントの識別子を兼ねる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    address:      EmailAddress,
    display_name: Option<String>,
}

impl SenderIdentity {
    pub fn new(address: EmailAddress, display_name: Option<String>) -> Self {
        Self {
            address,
            display_name,
        }
    }

    pub fn address(&self) -> &EmailAddress {
        &self.address
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// 送信者指定と一致するか（大文字小文字を区別する完全一致）
    pub fn matches(&self, preference: &SenderPreference) -> bool {
        self.address.as_str() == preference.as_str()
    }
}

/// 送信者選択エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// 自動選択しようとしたがアカウントが 1 つも設定されていない
    #[error("No senders available")]
    NoAccountsConfigured,

    /// 指定された送信者がアカウントプールに存在しない
    #[error("Unknown sender account: {0}")]
    UnknownAccount(String),
}
