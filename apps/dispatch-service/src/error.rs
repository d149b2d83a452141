//! # Dispatch Service エラー定義
//!
//! 注文確認メール送信で発生するエラーと、HTTP レスポンスへの変換を定義する。
//!
//! ## レスポンス対応表
//!
//! | エラー | ステータス | `errorKind` |
//! |--------|-----------|-------------|
//! | 認証失敗 | 401 | `Unauthorized` |
//! | 入力不備 | 400 | `ValidationError` |
//! | 存在しない送信者 | 400 | `UnknownAccount` |
//! | 送信者が未設定 | 503 | `NoAccountsConfigured` |
//! | テンプレート失敗 | 500 | `RenderError` |
//! | 送信失敗 | 500 | `TransportError` |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use happydeel_domain::{
    ValidationError,
    dispatch::{TransportError, TransportErrorKind},
    sender::SelectionError,
};
use serde::Serialize;
use thiserror::Error;

use crate::usecase::order_confirmation::RenderError;

/// エラーレスポンス
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error:                String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details:              Option<String>,
    pub error_kind:           &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_error_kind: Option<TransportErrorKind>,
}

/// Dispatch Service で発生するエラー
#[derive(Debug, Error)]
pub enum DispatchError {
    /// API トークンがない・一致しない
    #[error("認証に失敗しました")]
    Unauthorized,

    /// リクエストの入力不備
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 送信者を決められない
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// テンプレートのレンダリング失敗
    #[error(transparent)]
    Render(#[from] RenderError),

    /// トランスポートの送信失敗
    #[error("送信に失敗しました: {0}")]
    Transport(TransportError),
}

impl DispatchError {
    /// レスポンスの `errorKind`
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Unauthorized => "Unauthorized",
            DispatchError::Validation(_) => "ValidationError",
            DispatchError::Selection(SelectionError::UnknownAccount(_)) => "UnknownAccount",
            DispatchError::Selection(SelectionError::NoAccountsConfigured) => {
                "NoAccountsConfigured"
            }
            DispatchError::Render(_) => "RenderError",
            DispatchError::Transport(_) => "TransportError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Unauthorized => StatusCode::UNAUTHORIZED,
            DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::Selection(SelectionError::UnknownAccount(_)) => StatusCode::BAD_REQUEST,
            DispatchError::Selection(SelectionError::NoAccountsConfigured) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DispatchError::Render(_) | DispatchError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        let (error, details, transport_error_kind) = match self {
            DispatchError::Unauthorized => ("Unauthorized".to_string(), None, None),
            DispatchError::Validation(e) => (e.to_string(), None, None),
            DispatchError::Selection(e) => (e.to_string(), None, None),
            DispatchError::Render(_) => ("Failed to render email".to_string(), None, None),
            DispatchError::Transport(e) => (
                "Failed to send email".to_string(),
                Some(e.detail.clone()),
                Some(e.kind),
            ),
        };

        ErrorResponse {
            error,
            details,
            error_kind: self.kind(),
            transport_error_kind,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_error_response())).into_response()
    }
}
