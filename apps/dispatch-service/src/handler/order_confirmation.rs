//! # 注文確認メールハンドラ
//!
//! ```text
//! POST /send-order-confirmation
//! ```
//!
//! ボディのパースと検証はユースケースが行う（未知のフィールドは拒否）。
//! 失敗時のレスポンスは [`DispatchError`] の `IntoResponse` 実装が組み立てる。

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;

use crate::{error::DispatchError, usecase::OrderConfirmationUseCase};

const SUCCESS_MESSAGE: &str = "Order confirmation email sent successfully!";

/// 注文確認メールハンドラの State
pub struct OrderConfirmationState {
    pub usecase: OrderConfirmationUseCase,
}

/// 送信成功レスポンス
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOrderConfirmationResponse {
    pub success:        bool,
    pub message:        &'static str,
    pub message_id:     String,
    pub sender:         String,
    pub elapsed_millis: u64,
}

/// POST /send-order-confirmation
///
/// JSON 抽出器ではなく生のボディを受け取り、パース失敗も
/// `ValidationError` としてアプリケーションの形式で返す。
pub async fn send_order_confirmation(
    State(state): State<Arc<OrderConfirmationState>>,
    body: Bytes,
) -> Result<Json<SendOrderConfirmationResponse>, DispatchError> {
    let sent = state.usecase.execute(&body).await?;

    Ok(Json(SendOrderConfirmationResponse {
        success:        true,
        message:        SUCCESS_MESSAGE,
        message_id:     sent.message_id.as_str().to_string(),
        sender:         sent.sender.address().as_str().to_string(),
        elapsed_millis: sent.elapsed_millis,
    }))
}
