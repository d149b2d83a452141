//! # Dispatch Service サーバー
//!
//! ショップのバックオフィスから呼び出され、注文確認メールを送信する API サーバー。
//!
//! ## 役割
//!
//! - **入力検証**: 注文内容・金額・メールアドレスを送信前に検証
//! - **送信者選択**: 指定された送信者アカウント、または設定順のローテーション
//! - **メール生成**: tera テンプレートによる HTML / テキスト本文の生成
//! - **送信**: 選択したアカウントの認証情報で SMTP 送信
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │  Back office │────▶│ Dispatch Service │────▶│ SMTP server  │
//! │              │     │   port: 3000     │     │              │
//! └──────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! 一覧は [`config`](happydeel_dispatch_service::config) モジュールを参照。
//! 最低限 `DISPATCH_API_TOKEN` と 1 つ以上の `MAIL_ACCOUNT_<N>_USER` /
//! `MAIL_ACCOUNT_<N>_PASSWORD` を設定する。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用、送信はログ出力のみ）
//! MAIL_TRANSPORT=noop cargo run -p happydeel-dispatch-service
//!
//! # ローカル SMTP（Mailpit 等）
//! SMTP_HOST=localhost SMTP_PORT=1025 SMTP_TLS=none cargo run -p happydeel-dispatch-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use happydeel_dispatch_service::{
    app_builder::{build_account_pool, build_app},
    config::DispatchConfig,
};
use happydeel_infra::AccountPool;
use happydeel_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Dispatch Service サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. 送信者アカウントプールとルーターの構築
/// 5. HTTP サーバーの起動（SIGINT / SIGTERM でグレースフルシャットダウン）
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("dispatch-service");
    init_tracing(&tracing_config);

    let config = DispatchConfig::from_env().context("設定の読み込みに失敗")?;
    tracing::info!(
        transport = ?config.transport,
        smtp_host = %config.smtp.host,
        accounts = config.accounts.len(),
        strict_totals = config.strict_totals,
        "Dispatch Service を初期化中"
    );

    let pool = build_account_pool(&config).context("送信者アカウントの構築に失敗")?;
    if pool.is_empty() {
        tracing::warn!("送信者アカウントが設定されていません。送信リクエストはすべて 503 を返します");
    }
    for identity in pool.accounts() {
        tracing::info!(sender = %identity.address(), "送信者アカウントを登録");
    }

    let app = build_app(&config, Arc::new(pool)).context("メールテンプレートの読み込みに失敗")?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスが不正です")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("{addr} へのバインドに失敗"))?;

    tracing::info!("Dispatch Service サーバーを起動します: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("サーバーの実行に失敗")?;

    tracing::info!("Dispatch Service サーバーを停止しました");
    Ok(())
}

/// SIGINT（Ctrl+C）または SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Ctrl+C ハンドラの登録に失敗: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("SIGTERM ハンドラの登録に失敗: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("シャットダウンシグナルを受信しました");
}
