//! # Dispatch Service アプリケーション構築
//!
//! 送信者アカウントプールの構築（DI）とルーター構築を担当する。
//! `main.rs` は設定読み込みとサーバー起動に集中する。
//!
//! ## ルート
//!
//! | メソッド | パス | 認証 |
//! |----------|------|------|
//! | GET | `/health` | 不要 |
//! | POST | `/send-order-confirmation` | API トークン |
//! | GET | `/get-accounts` | API トークン |

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use happydeel_domain::{order::ValidationPolicy, sender::SenderIdentity};
use happydeel_infra::{
    AccountPool,
    InfraError,
    MailTransport,
    RotatingAccountPool,
    SenderAccount,
    mail_transport::{NoopMailTransport, SmtpCredentials, SmtpMailTransport},
};
use happydeel_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::{DispatchConfig, TransportBackend},
    handler::{
        AccountsState,
        OrderConfirmationState,
        get_accounts,
        health_check,
        send_order_confirmation,
    },
    middleware::{ApiTokenState, require_api_token},
    usecase::{
        MailDispatcher,
        OrderConfirmationUseCase,
        TemplateRenderer,
        order_confirmation::RenderError,
    },
};

/// 設定から送信者アカウントプールを構築する
///
/// アカウントごとに、そのアカウントの認証情報でトランスポートを生成する。
/// SMTP 接続は送信時に確立するため、ここではネットワークに触れない。
pub fn build_account_pool(config: &DispatchConfig) -> Result<RotatingAccountPool, InfraError> {
    let accounts = config
        .accounts
        .iter()
        .map(|account| -> Result<SenderAccount, InfraError> {
            let transport: Arc<dyn MailTransport> = match config.transport {
                TransportBackend::Smtp => Arc::new(SmtpMailTransport::new(
                    &config.smtp,
                    SmtpCredentials {
                        user:     account.user.as_str().to_string(),
                        password: account.password.clone(),
                    },
                )?),
                TransportBackend::Noop => Arc::new(NoopMailTransport),
            };
            let identity = SenderIdentity::new(account.user.clone(), Some(config.from_name.clone()));
            Ok(SenderAccount::new(identity, transport))
        })
        .collect::<Result<Vec<_>, _>>()?;

    RotatingAccountPool::new(accounts)
}

/// ルーターを構築する
///
/// アカウントプールは外部から注入する（統合テストではモックトランスポートのプールを渡す）。
///
/// # エラー
///
/// メールテンプレートの読み込みに失敗した場合は `RenderError` を返す。
pub fn build_app(config: &DispatchConfig, pool: Arc<dyn AccountPool>) -> Result<Router, RenderError> {
    let usecase = OrderConfirmationUseCase::new(
        ValidationPolicy {
            strict_totals: config.strict_totals,
        },
        pool.clone(),
        TemplateRenderer::new(config.brand.clone())?,
        MailDispatcher::new(config.smtp.timeout),
    );

    let order_confirmation_state = Arc::new(OrderConfirmationState { usecase });
    let accounts_state = Arc::new(AccountsState { pool });
    let api_token_state = ApiTokenState::new(config.api_token.as_str());

    let protected = Router::new()
        .route("/send-order-confirmation", post(send_order_confirmation))
        .with_state(order_confirmation_state)
        .merge(
            Router::new()
                .route("/get-accounts", get(get_accounts))
                .with_state(accounts_state),
        )
        .layer(from_fn_with_state(api_token_state, require_api_token));

    Ok(Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7)))
}
