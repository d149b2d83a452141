//! Noop メール送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! ローカル開発や、SMTP を用意できない環境での動作確認に使用する。

use async_trait::async_trait;
use happydeel_domain::dispatch::{MessageId, OutboundEmail, TransportError};

use super::{MailTransport, generate_message_id};

/// Noop メール送信（ログ出力のみ）
#[derive(Debug, Clone, Default)]
pub struct NoopMailTransport;

#[async_trait]
impl MailTransport for NoopMailTransport {
    async fn submit(&self, email: &OutboundEmail) -> Result<MessageId, TransportError> {
        let message_id = generate_message_id(&email.from);
        tracing::info!(
            from = %email.from.address(),
            to = %email.to,
            subject = %email.subject,
            message_id = %message_id,
            "Noop: メール送信をスキップ"
        );
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use happydeel_domain::{email::EmailAddress, sender::SenderIdentity};

    use super::*;

    #[tokio::test]
    async fn submitはエラーを返さずメッセージidを返す() {
        let transport = NoopMailTransport;
        let email = OutboundEmail {
            from:      SenderIdentity::new(
                EmailAddress::parse("user", "shop@happydeel.com").unwrap(),
                None,
            ),
            to:        "jane@x.com".to_string(),
            subject:   "Order Confirmation - ORD-1".to_string(),
            html_body: "<p>test</p>".to_string(),
            text_body: "test".to_string(),
        };

        let message_id = transport.submit(&email).await.unwrap();
        assert!(message_id.as_str().ends_with("@happydeel.com>"));
    }
}
