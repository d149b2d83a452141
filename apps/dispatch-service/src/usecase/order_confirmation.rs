//! # 注文確認メールユースケース
//!
//! 検証 → 送信者選択 → テンプレートレンダリング → 送信 を統合する。
//!
//! ## モジュール構成
//!
//! - [`account_selector`] - 送信者指定をアカウントプールのアカウントに解決
//! - [`template_renderer`] - tera テンプレートエンジンによるメール生成
//! - [`mail_dispatcher`] - タイムアウト付きの送信と結果の計測
//!
//! ## 副作用の順序
//!
//! 検証と送信者選択の失敗は外部呼び出しの前に確定する。送信者選択で
//! ローテーションのカーソルが進むのは、検証を通過したリクエストだけ。

pub mod account_selector;
pub mod mail_dispatcher;
pub mod template_renderer;

use std::sync::Arc;

pub use account_selector::AccountSelector;
use happydeel_domain::{
    ValidationError,
    dispatch::{DispatchOutcome, MessageId},
    order::{OrderConfirmation, RawOrderConfirmation, ValidationPolicy},
    sender::{SelectionError, SenderIdentity},
};
use happydeel_infra::AccountPool;
use happydeel_shared::{
    event_log::{error, event},
    log_business_event,
};
pub use mail_dispatcher::MailDispatcher;
pub use template_renderer::{BrandProfile, RenderError, RenderedEmail, TemplateRenderer};

use crate::error::DispatchError;

/// 送信成功の結果
#[derive(Debug, Clone)]
pub struct OrderConfirmationSent {
    pub message_id:     MessageId,
    pub sender:         SenderIdentity,
    pub elapsed_millis: u64,
}

/// 注文確認メールユースケース
pub struct OrderConfirmationUseCase {
    policy:     ValidationPolicy,
    selector:   AccountSelector,
    renderer:   TemplateRenderer,
    dispatcher: MailDispatcher,
}

impl OrderConfirmationUseCase {
    pub fn new(
        policy: ValidationPolicy,
        pool: Arc<dyn AccountPool>,
        renderer: TemplateRenderer,
        dispatcher: MailDispatcher,
    ) -> Self {
        Self {
            policy,
            selector: AccountSelector::new(pool),
            renderer,
            dispatcher,
        }
    }

    /// 注文確認メールを送信する
    ///
    /// `body` はリクエストボディの JSON。パース失敗も入力不備として扱う。
    ///
    /// # エラー
    ///
    /// - 入力不備（JSON 不正・未知のフィールドを含む）: `DispatchError::Validation`
    /// - 送信者を決められない: `DispatchError::Selection`
    /// - テンプレート失敗: `DispatchError::Render`
    /// - トランスポート失敗・タイムアウト: `DispatchError::Transport`
    pub async fn execute(
        &self,
        body: &[u8],
    ) -> Result<OrderConfirmationSent, DispatchError> {
        let order = RawOrderConfirmation::from_json(body)
            .and_then(|raw| OrderConfirmation::validate(raw, self.policy))
            .inspect_err(log_validation_rejected)?;

        let account = self
            .selector
            .select(order.sender_preference())
            .inspect_err(|e| log_selection_rejected(&order, e))?;

        let rendered = self
            .renderer
            .render(&order, account.identity())
            .inspect_err(|e| {
                tracing::error!(
                    error.category = error::category::INTERNAL,
                    error.kind = error::kind::TEMPLATE,
                    order_number = %order.order_number(),
                    "注文確認テンプレートのレンダリングに失敗: {}",
                    e
                );
            })?;

        let result = self.dispatcher.dispatch(rendered, &account, &order).await;
        let elapsed_millis = result.elapsed_millis();

        match result.outcome {
            DispatchOutcome::Succeeded { message_id } => Ok(OrderConfirmationSent {
                message_id,
                sender: account.identity().clone(),
                elapsed_millis,
            }),
            DispatchOutcome::Failed { error } => Err(DispatchError::Transport(error)),
        }
    }
}

fn log_validation_rejected(e: &ValidationError) {
    log_business_event!(
        event.category = event::category::ORDER_CONFIRMATION,
        event.action = event::action::ORDER_CONFIRMATION_REJECTED,
        event.entity_type = event::entity_type::ORDER,
        event.result = event::result::FAILURE,
        error.category = error::category::VALIDATION,
        error.detail = %e,
        "注文確認リクエストを拒否（入力不備）"
    );
}

fn log_selection_rejected(order: &OrderConfirmation, e: &SelectionError) {
    log_business_event!(
        event.category = event::category::ORDER_CONFIRMATION,
        event.action = event::action::ORDER_CONFIRMATION_REJECTED,
        event.entity_type = event::entity_type::SENDER_ACCOUNT,
        event.entity_id = %order.order_number(),
        event.result = event::result::FAILURE,
        error.category = error::category::SENDER_SELECTION,
        error.detail = %e,
        "注文確認リクエストを拒否（送信者選択）"
    );
}
