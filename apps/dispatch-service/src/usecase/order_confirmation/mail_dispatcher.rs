//! # メール送信
//!
//! レンダリング結果と選択した送信者アカウントから送信メッセージを組み立て、
//! アカウントに紐づくトランスポートでタイムアウト付きで 1 回だけ送信する。
//!
//! 送信の成否にかかわらず `DispatchResult` を返し、ビジネスイベントログを出力する。

use std::time::{Duration, Instant};

use happydeel_domain::{
    dispatch::{DispatchOutcome, DispatchResult, OutboundEmail, TransportError},
    order::OrderConfirmation,
};
use happydeel_infra::SenderAccount;
use happydeel_shared::{
    event_log::{error, event},
    log_business_event,
};

use super::template_renderer::RenderedEmail;

/// メール送信器
pub struct MailDispatcher {
    timeout: Duration,
}

impl MailDispatcher {
    /// # 引数
    ///
    /// - `timeout`: 送信 1 回あたりの上限時間
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// メールを送信する
    ///
    /// 失敗しても `Err` は返さず、`DispatchResult` の失敗として返す。
    pub async fn dispatch(
        &self,
        rendered: RenderedEmail,
        sender: &SenderAccount,
        order: &OrderConfirmation,
    ) -> DispatchResult {
        let email = OutboundEmail {
            from:      sender.identity().clone(),
            to:        order.customer_email().as_str().to_string(),
            subject:   rendered.subject,
            html_body: rendered.html_body,
            text_body: rendered.text_body,
        };

        let started = Instant::now();
        let submitted = tokio::time::timeout(self.timeout, sender.transport().submit(&email)).await;
        let elapsed = started.elapsed();

        let result = match submitted {
            Ok(Ok(message_id)) => DispatchResult::succeeded(message_id, elapsed),
            Ok(Err(e)) => DispatchResult::failed(e, elapsed),
            Err(_) => DispatchResult::failed(TransportError::timeout(self.timeout), elapsed),
        };

        log_dispatch(&email, order, &result);
        result
    }
}

fn log_dispatch(email: &OutboundEmail, order: &OrderConfirmation, result: &DispatchResult) {
    match &result.outcome {
        DispatchOutcome::Succeeded { message_id } => {
            log_business_event!(
                event.category = event::category::ORDER_CONFIRMATION,
                event.action = event::action::ORDER_CONFIRMATION_SENT,
                event.entity_type = event::entity_type::ORDER,
                event.entity_id = %order.order_number(),
                event.result = event::result::SUCCESS,
                mail.sender = %email.from.address(),
                mail.recipient = %email.to,
                mail.message_id = %message_id,
                mail.elapsed_ms = result.elapsed_millis(),
                "注文確認メール送信成功"
            );
        }
        DispatchOutcome::Failed {
            error: transport_error,
        } => {
            let transport_error_kind: &str = transport_error.kind.into();
            log_business_event!(
                event.category = event::category::ORDER_CONFIRMATION,
                event.action = event::action::ORDER_CONFIRMATION_FAILED,
                event.entity_type = event::entity_type::ORDER,
                event.entity_id = %order.order_number(),
                event.result = event::result::FAILURE,
                error.category = error::category::EXTERNAL_SERVICE,
                error.kind = error::kind::MAIL_TRANSPORT,
                error.transport_kind = transport_error_kind,
                error.detail = %transport_error.detail,
                mail.sender = %email.from.address(),
                mail.recipient = %email.to,
                mail.elapsed_ms = result.elapsed_millis(),
                "注文確認メール送信失敗"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use happydeel_domain::{
        dispatch::TransportErrorKind,
        email::EmailAddress,
        order::{RawOrderConfirmation, ValidationPolicy},
        sender::SenderIdentity,
    };
    use happydeel_infra::mock::MockMailTransport;
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_order() -> OrderConfirmation {
        let body = serde_json::json!({
            "customerName": "Jane Doe",
            "customerEmail": "jane@x.com",
            "orderNumber": "ORD-1",
            "orderDate": "2024-01-01",
            "items": [{ "name": "Widget", "quantity": 2, "price": "9.99" }],
            "subtotal": "19.98",
            "total": "19.98"
        });
        let raw = RawOrderConfirmation::from_json(body.to_string().as_bytes()).unwrap();
        OrderConfirmation::validate(raw, ValidationPolicy::default()).unwrap()
    }

    fn make_account(transport: MockMailTransport) -> SenderAccount {
        SenderAccount::new(
            SenderIdentity::new(
                EmailAddress::parse("user", "shop@happydeel.com").unwrap(),
                Some("HappyDeel".to_string()),
            ),
            Arc::new(transport),
        )
    }

    fn make_rendered() -> RenderedEmail {
        RenderedEmail {
            subject:   "Order Confirmation - ORD-1 🎉".to_string(),
            html_body: "<p>Thanks</p>".to_string(),
            text_body: "Thanks".to_string(),
        }
    }

    #[tokio::test]
    async fn 送信成功時はメッセージidを返す() {
        let transport = MockMailTransport::new();
        let dispatcher = MailDispatcher::new(Duration::from_secs(5));

        let result = dispatcher
            .dispatch(make_rendered(), &make_account(transport.clone()), &make_order())
            .await;

        assert!(result.is_succeeded());
        assert_eq!(
            result.message_id().unwrap().as_str(),
            "<mock-1@happydeel.com>"
        );

        let sent = transport.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@x.com");
        assert_eq!(sent[0].from.address().as_str(), "shop@happydeel.com");
        assert_eq!(sent[0].from.display_name(), Some("HappyDeel"));
        assert_eq!(sent[0].subject, "Order Confirmation - ORD-1 🎉");
    }

    #[tokio::test]
    async fn 送信失敗時はトランスポートのエラーをそのまま返す() {
        let transport = MockMailTransport::failing(TransportError::new(
            TransportErrorKind::Authentication,
            "535 5.7.8 Username and Password not accepted",
        ));
        let dispatcher = MailDispatcher::new(Duration::from_secs(5));

        let result = dispatcher
            .dispatch(make_rendered(), &make_account(transport), &make_order())
            .await;

        assert!(!result.is_succeeded());
        assert!(result.message_id().is_none());
        let error = result.error().unwrap();
        assert_eq!(error.kind, TransportErrorKind::Authentication);
        assert_eq!(error.detail, "535 5.7.8 Username and Password not accepted");
    }

    #[tokio::test]
    async fn タイムアウトを超えるとtimeoutエラーになる() {
        let transport = MockMailTransport::new().with_delay(Duration::from_secs(5));
        let dispatcher = MailDispatcher::new(Duration::from_millis(50));

        let result = dispatcher
            .dispatch(
                make_rendered(),
                &make_account(transport.clone()),
                &make_order(),
            )
            .await;

        let error = result.error().unwrap();
        assert_eq!(error.kind, TransportErrorKind::Timeout);
        assert_eq!(error.detail, "mail transport did not respond within 50ms");
        assert!(transport.sent_emails().is_empty());
    }
}
