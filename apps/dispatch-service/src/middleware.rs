//! # ミドルウェア
//!
//! Dispatch Service 用のミドルウェアを提供する。

mod api_token;

pub use api_token::{ApiTokenState, require_api_token};
