//! # ビジネスイベントログの構造化ヘルパー
//!
//! `jq` で送信履歴を追えるよう、ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.entity_id`: エンティティ ID（注文番号など）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const ORDER_CONFIRMATION: &str = "order_confirmation";
        pub const AUTH: &str = "auth";
    }

    /// イベントアクション
    pub mod action {
        // 注文確認メール
        pub const ORDER_CONFIRMATION_SENT: &str = "order_confirmation.sent";
        pub const ORDER_CONFIRMATION_FAILED: &str = "order_confirmation.failed";
        pub const ORDER_CONFIRMATION_REJECTED: &str = "order_confirmation.rejected";

        // 認証
        pub const API_TOKEN_REJECTED: &str = "auth.api_token_rejected";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const ORDER: &str = "order";
        pub const SENDER_ACCOUNT: &str = "sender_account";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 入力値の不備
        pub const VALIDATION: &str = "validation";
        /// 送信者アカウントの選択
        pub const SENDER_SELECTION: &str = "sender_selection";
        /// 外部サービス呼び出し（SMTP サーバー）
        pub const EXTERNAL_SERVICE: &str = "external_service";
        /// サービス内部（テンプレートなど）
        pub const INTERNAL: &str = "internal";
    }

    /// エラー種別
    pub mod kind {
        pub const TEMPLATE: &str = "template";
        pub const MAIL_TRANSPORT: &str = "mail_transport";
    }
}
