//! # HappyDeel ドメイン層
//!
//! 注文確認メール送信の中核となるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **純粋性**: 外部 I/O（SMTP、HTTP）には一切依存しない
//! - **型による検証済み状態の表現**: `RawOrderConfirmation` をバリデーションして
//!   `OrderConfirmation` を得る。検証済みの値は不正な状態を取り得ない
//! - **エラーの分類**: バリデーション / 送信者選択 / 送信の 3 系統を別々の型で表現
//!
//! ## 依存関係の方向
//!
//! ```text
//! dispatch-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - リクエスト検証エラー
//! - [`money`] - 金額（最小通貨単位で保持）
//! - [`email`] - メールアドレス値オブジェクト
//! - [`order`] - 注文確認リクエストとバリデーション
//! - [`sender`] - 送信者アカウントの識別情報と選択エラー
//! - [`dispatch`] - 送信メッセージと送信結果
//!
//! ## 使用例
//!
//! ```rust
//! use happydeel_domain::money::Money;
//!
//! let price = Money::parse("9.99").unwrap();
//! assert_eq!(price.to_string(), "9.99");
//! ```

#[macro_use]
mod macros;

pub mod dispatch;
pub mod email;
pub mod error;
pub mod money;
pub mod order;
pub mod sender;

pub use error::ValidationError;
