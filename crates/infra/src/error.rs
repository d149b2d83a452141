//! # インフラ層エラー定義
//!
//! 起動時の送信基盤の構築で発生するエラーを表現する。
//! 送信そのものの失敗はドメイン層の `TransportError` で表現する。

use thiserror::Error;

/// インフラ層で発生するエラー
#[derive(Debug, Error)]
pub enum InfraError {
    /// SMTP トランスポートの構築に失敗（TLS 設定・ホスト名不正など）
    #[error("SMTP トランスポートの構築に失敗: {0}")]
    SmtpSetup(String),

    /// 同じアドレスの送信者アカウントが複数設定されている
    #[error("送信者アカウントが重複しています: {0}")]
    DuplicateAccount(String),
}
