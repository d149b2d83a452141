//! # API トークン検証ミドルウェア
//!
//! `Authorization: Bearer <token>` ヘッダーを検証し、一致しないリクエストを
//! ハンドラに到達する前に 401 で拒否する。

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use happydeel_shared::{
    event_log::{error, event},
    log_business_event,
};
use subtle::ConstantTimeEq;

use crate::error::DispatchError;

const BEARER_PREFIX: &str = "Bearer ";

/// API トークン検証の状態
#[derive(Clone)]
pub struct ApiTokenState {
    token: Arc<str>,
}

impl ApiTokenState {
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// 提示されたトークンが一致するか
    ///
    /// タイミング攻撃対策として定数時間比較を使用する。
    fn verify(&self, provided: &str) -> bool {
        self.token.as_bytes().ct_eq(provided.as_bytes()).into()
    }
}

impl std::fmt::Debug for ApiTokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiTokenState")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// `Authorization` ヘッダーから Bearer トークンを取り出す
fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
}

/// API トークン検証ミドルウェア
pub async fn require_api_token(
    State(state): State<ApiTokenState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let authorized = bearer_token(&request).is_some_and(|token| state.verify(token));

    if !authorized {
        log_business_event!(
            event.category = event::category::AUTH,
            event.action = event::action::API_TOKEN_REJECTED,
            event.result = event::result::FAILURE,
            error.category = error::category::VALIDATION,
            http.method = %request.method(),
            http.path = %request.uri().path(),
            "API トークンが無効なリクエストを拒否"
        );
        return DispatchError::Unauthorized.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::to_bytes,
        http::{StatusCode, header::AUTHORIZATION},
        middleware::from_fn_with_state,
        routing::get,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .layer(from_fn_with_state(
                ApiTokenState::new("secret-token"),
                require_api_token,
            ))
    }

    fn request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn 正しいトークンはハンドラに到達する() {
        let response = app()
            .oneshot(request(Some("Bearer secret-token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Bearer wrong-token"))]
    #[case(Some("Bearer secret-token-extra"))]
    #[case(Some("Basic secret-token"))]
    #[case(Some("secret-token"))]
    #[case(Some("Bearer "))]
    #[tokio::test]
    async fn 不正なトークンは401になる(#[case] authorization: Option<&str>) {
        let response = app().oneshot(request(authorization)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": "Unauthorized", "errorKind": "Unauthorized" })
        );
    }

    #[test]
    fn debug出力にトークンを含めない() {
        let state = ApiTokenState::new("secret-token");
        assert!(!format!("{state:?}").contains("secret-token"));
    }
}
