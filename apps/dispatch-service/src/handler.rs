//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックはユースケースに委譲

pub mod accounts;
pub mod health;
pub mod order_confirmation;

pub use accounts::{AccountsState, get_accounts};
pub use health::health_check;
pub use order_confirmation::{OrderConfirmationState, send_order_confirmation};
