//! # ユースケース層
//!
//! Dispatch Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: アカウントプールを `Arc<dyn AccountPool>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//!
//! ## モジュール構成
//!
//! - `order_confirmation`: 注文確認メールの送信

pub mod order_confirmation;

pub use order_confirmation::{
    BrandProfile,
    MailDispatcher,
    OrderConfirmationSent,
    OrderConfirmationUseCase,
    TemplateRenderer,
};
