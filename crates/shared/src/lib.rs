//! # HappyDeel 共有ユーティリティ
//!
//! 注文確認メール送信サービスと、その周辺クレートで共通に使うユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - tracing 関連の依存は `observability` feature でのみ有効にする

pub mod event_log;
pub mod health;
pub mod observability;

pub use health::HealthResponse;
