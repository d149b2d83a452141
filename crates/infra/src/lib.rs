//! # HappyDeel インフラ層
//!
//! 外部システム（SMTP サーバー）との接続と、送信者アカウントの管理を担う。
//!
//! ## モジュール構成
//!
//! - [`account_pool`] - 送信者アカウントの保持・検索・ローテーション
//! - [`mail_transport`] - メール送信の抽象化と SMTP / Noop 実装
//! - [`error`] - インフラ層のエラー定義
//! - `mock` - テスト用モック（`test-utils` feature）

pub mod account_pool;
pub mod error;
pub mod mail_transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use account_pool::{AccountPool, RotatingAccountPool, SenderAccount};
pub use error::InfraError;
pub use mail_transport::MailTransport;
