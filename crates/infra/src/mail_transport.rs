//! # メール送信トランスポート
//!
//! 送信者アカウントに紐づくメール送信手段を抽象化する。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `MailTransport` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（本番・開発の Mailpit）、Noop（送信しない）
//! - **アカウント単位**: 1 インスタンスが 1 送信者アカウントの認証情報を持つ
//! - **メッセージ ID はトランスポートが割り当てる**: `Message-ID` ヘッダーの値を
//!   送信成功時に返す

mod noop;
mod smtp;

use async_trait::async_trait;
use happydeel_domain::{
    dispatch::{MessageId, OutboundEmail, TransportError},
    sender::SenderIdentity,
};
pub use noop::NoopMailTransport;
pub use smtp::{SmtpCredentials, SmtpMailTransport, SmtpSettings, SmtpTls};

/// メール送信トレイト
///
/// 送信基盤の中核。1 回の呼び出しで 1 通を送信し、リトライは行わない。
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// メールを送信し、割り当てたメッセージ ID を返す
    async fn submit(&self, email: &OutboundEmail) -> Result<MessageId, TransportError>;
}

/// `Message-ID` ヘッダー値を生成する
///
/// 形式は `<{UUID v7}@{送信者ドメイン}>`。
pub(crate) fn generate_message_id(from: &SenderIdentity) -> MessageId {
    MessageId::new(format!(
        "<{}@{}>",
        uuid::Uuid::now_v7(),
        from.address().domain()
    ))
}

#[cfg(test)]
mod tests {
    use happydeel_domain::email::EmailAddress;

    use super::*;

    #[test]
    fn メッセージidは送信者ドメインを含む山括弧形式になる() {
        let from = SenderIdentity::new(
            EmailAddress::parse("user", "shop@happydeel.com").unwrap(),
            None,
        );

        let id = generate_message_id(&from);

        assert!(id.as_str().starts_with('<'));
        assert!(id.as_str().ends_with("@happydeel.com>"));
    }

    #[test]
    fn メッセージidは呼び出しごとに異なる() {
        let from = SenderIdentity::new(
            EmailAddress::parse("user", "shop@happydeel.com").unwrap(),
            None,
        );

        assert_ne!(generate_message_id(&from), generate_message_id(&from));
    }
}
