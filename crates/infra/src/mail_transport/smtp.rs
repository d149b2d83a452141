//! SMTP メール送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 送信者アカウントごとに認証情報を持つトランスポートを 1 つずつ構築する。
//! 開発環境では Mailpit（ローカル SMTP サーバー、TLS なし）に接続する。

use std::time::Duration;

use async_trait::async_trait;
use happydeel_domain::dispatch::{MessageId, OutboundEmail, TransportError, TransportErrorKind};
use lettre::{
    Address,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{self, authentication::Credentials},
};

use super::{MailTransport, generate_message_id};
use crate::InfraError;

/// SMTP 接続の TLS モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpTls {
    /// 平文で接続後に STARTTLS で昇格（587 番ポート）
    #[default]
    StartTls,
    /// 接続時点から TLS（465 番ポート）
    Implicit,
    /// TLS なし（Mailpit 等のローカル SMTP 向け）
    None,
}

impl SmtpTls {
    /// 設定値（`starttls` / `tls` / `none`）からパースする
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "starttls" => Some(Self::StartTls),
            "tls" => Some(Self::Implicit),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// 全アカウント共通の SMTP 接続設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host:    String,
    pub port:    u16,
    pub tls:     SmtpTls,
    /// 接続・コマンド単位のタイムアウト
    pub timeout: Duration,
}

/// 送信者アカウントの SMTP 認証情報
#[derive(Clone)]
pub struct SmtpCredentials {
    pub user:     String,
    pub password: String,
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// SMTP メール送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// 接続はこの時点では行わず、送信時に確立する。
    ///
    /// # エラー
    ///
    /// TLS パラメータの構築に失敗した場合は `InfraError::SmtpSetup` を返す。
    pub fn new(settings: &SmtpSettings, credentials: SmtpCredentials) -> Result<Self, InfraError> {
        let builder = match settings.tls {
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| InfraError::SmtpSetup(e.to_string()))?,
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| InfraError::SmtpSetup(e.to_string()))?,
            // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host),
        };

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(credentials.user, credentials.password))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn submit(&self, email: &OutboundEmail) -> Result<MessageId, TransportError> {
        let message_id = generate_message_id(&email.from);
        let message = build_message(email, &message_id)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| TransportError::new(classify(&e), e.to_string()))?;

        Ok(message_id)
    }
}

/// lettre の `Message` を組み立てる
///
/// text/plain と text/html の multipart/alternative で構成する。
fn build_message(email: &OutboundEmail, message_id: &MessageId) -> Result<Message, TransportError> {
    let from_address: Address = email.from.address().as_str().parse().map_err(|e| {
        TransportError::new(
            TransportErrorKind::Message,
            format!("invalid sender address: {e}"),
        )
    })?;
    let from = Mailbox::new(email.from.display_name().map(str::to_string), from_address);

    let to: Mailbox = email.to.parse().map_err(|e| {
        TransportError::new(
            TransportErrorKind::Message,
            format!("invalid recipient address: {e}"),
        )
    })?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(&email.subject)
        .message_id(Some(message_id.as_str().to_string()))
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.text_body.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(email.html_body.clone()),
                ),
        )
        .map_err(|e| {
            TransportError::new(
                TransportErrorKind::Message,
                format!("failed to build message: {e}"),
            )
        })
}

/// SMTP エラーを送信失敗の種別に分類する
///
/// - タイムアウト → `Timeout`
/// - 53x（認証要求・認証失敗）→ `Authentication`
/// - 550 / 551 / 553（宛先不可）→ `RecipientRejected`
/// - その他の応答コード → `Rejected`
/// - 応答コードなし → `Connection`
fn classify(error: &smtp::Error) -> TransportErrorKind {
    if error.is_timeout() {
        return TransportErrorKind::Timeout;
    }

    match error.status().map(|code| code.to_string()) {
        Some(code) => classify_code(&code),
        None => TransportErrorKind::Connection,
    }
}

fn classify_code(code: &str) -> TransportErrorKind {
    match code {
        "550" | "551" | "553" => TransportErrorKind::RecipientRejected,
        c if c.starts_with("53") => TransportErrorKind::Authentication,
        _ => TransportErrorKind::Rejected,
    }
}
