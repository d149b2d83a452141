//! # Dispatch Service ライブラリ
//!
//! 注文確認メール送信サービスのユースケース・ハンドラ・ルーター構築を公開する。
//! 統合テストから `build_app` を直接呼び出せるよう、バイナリとは分けて提供する。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod usecase;
