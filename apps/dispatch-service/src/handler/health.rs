//! # ヘルスチェックハンドラ
//!
//! ロードバランサー・コンテナオーケストレーターからの死活確認用。
//! API トークンなしでアクセスできる。
//!
//! ```text
//! GET /health
//! ```

use axum::Json;
use happydeel_shared::HealthResponse;

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}
