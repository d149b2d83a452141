//! # 送信
//!
//! メール送信の入力（[`OutboundEmail`]）と結果（[`DispatchResult`]）を定義する。
//!
//! ## 設計方針
//!
//! - **成功と失敗を enum で表現**: メッセージ ID は成功時のみ、エラー種別と詳細は
//!   失敗時のみ存在する。これを [`DispatchOutcome`] の形で保証する
//! - **送信は 1 回のみ**: 失敗時の再送は呼び出し元の責務。ここにリトライの概念はない
//! - **エラー詳細は加工しない**: 送信先は社内ダッシュボードのため、
//!   トランスポートのメッセージをそのまま `detail` に保持する

use std::time::Duration;

use derive_more::Display;
use serde::Serialize;
use strum::IntoStaticStr;
use thiserror::Error;

use crate::sender::SenderIdentity;

/// 送信メッセージ
///
/// テンプレートレンダリングの出力と送信者・宛先をまとめたもの。
/// `MailTransport` に渡される。
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    /// 送信元
    pub from:      SenderIdentity,
    /// 送信先メールアドレス
    pub to:        String,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
}

/// トランスポートが割り当てたメッセージ ID（`Message-ID` ヘッダー値）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Display)]
#[display("{_0}")]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 送信失敗の種別
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    IntoStaticStr,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// 設定されたタイムアウト内に応答がなかった
    Timeout,
    /// SMTP サーバーへの接続・TLS ハンドシェイクに失敗
    Connection,
    /// SMTP 認証に失敗（5xx 53x）
    Authentication,
    /// 宛先が拒否された（5xx 55x）
    RecipientRejected,
    /// メッセージの組み立てに失敗（アドレス形式など）
    Message,
    /// 上記以外のサーバー拒否
    Rejected,
}

/// 送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct TransportError {
    pub kind:   TransportErrorKind,
    pub detail: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// タイムアウトエラーを作成する
    pub fn timeout(limit: Duration) -> Self {
        Self::new(
            TransportErrorKind::Timeout,
            format!("mail transport did not respond within {}ms", limit.as_millis()),
        )
    }
}

/// 送信結果の成否
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// トランスポートが受理した
    Succeeded { message_id: MessageId },
    /// トランスポートが失敗した
    Failed { error: TransportError },
}

/// 送信結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub outcome: DispatchOutcome,
    /// 送信開始からトランスポートの応答（または失敗）までの経過時間
    pub elapsed: Duration,
}

impl DispatchResult {
    pub fn succeeded(message_id: MessageId, elapsed: Duration) -> Self {
        Self {
            outcome: DispatchOutcome::Succeeded { message_id },
            elapsed,
        }
    }

    pub fn failed(error: TransportError, elapsed: Duration) -> Self {
        Self {
            outcome: DispatchOutcome::Failed { error },
            elapsed,
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self.outcome, DispatchOutcome::Succeeded { .. })
    }

    /// 成功時のメッセージ ID
    pub fn message_id(&self) -> Option<&MessageId> {
        match &self.outcome {
            DispatchOutcome::Succeeded { message_id } => Some(message_id),
            DispatchOutcome::Failed { .. } => None,
        }
    }

    /// 失敗時のエラー
    pub fn error(&self) -> Option<&TransportError> {
        match &self.outcome {
            DispatchOutcome::Succeeded { .. } => None,
            DispatchOutcome::Failed { error } => Some(error),
        }
    }

    /// 経過時間（ミリ秒）
    pub fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}
