//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで注文確認メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **件名パターン**: `Order Confirmation - {orderNumber} 🎉`
//! - **エスケープは 1 回だけ**: tera の自動エスケープは無効化し、HTML 用コンテキストに
//!   入れる値だけを [`escape_html`] に通す。plaintext 用コンテキストには生の値を渡す
//! - **決定的**: 同じ入力からは常に同じ出力（現在時刻・乱数を含めない）

use chrono::NaiveDate;
use happydeel_domain::{order::OrderConfirmation, sender::SenderIdentity};
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

const HTML_TEMPLATE: &str = "order_confirmation.html";
const TEXT_TEMPLATE: &str = "order_confirmation.txt";

/// 注文日の表示形式（例: `January 1, 2024`）
const ORDER_DATE_DISPLAY_FORMAT: &str = "%B %-d, %Y";

/// テンプレートのレンダリング失敗
#[derive(Debug, Error)]
#[error("テンプレートのレンダリングに失敗: {0}")]
pub struct RenderError(String);

/// メール本文に載せるブランド情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandProfile {
    pub name:          String,
    pub support_email: String,
    pub support_phone: String,
    /// フッターのキャッチコピー
    pub tagline:       String,
}

impl Default for BrandProfile {
    fn default() -> Self {
        Self {
            name:          "HappyDeel".to_string(),
            support_email: "support@happydeel.com".to_string(),
            support_phone: "+17176484487".to_string(),
            tagline:       "The smart way to buy quality items — for less.".to_string(),
        }
    }
}

/// レンダリング結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject:   String,
    pub html_body: String,
    pub text_body: String,
}

/// テンプレートに渡す明細行
#[derive(Debug, Serialize)]
struct ItemView {
    name:       String,
    quantity:   u32,
    unit_price: String,
    line_total: String,
}

/// HTML 本文に埋め込む文字列をエスケープする
///
/// tera の自動エスケープと同じ変換（`&` `<` `>` `"` `'` `/`）を、
/// HTML 用コンテキストに入れる値へ明示的に適用する。
pub fn escape_html(value: &str) -> String {
    tera::escape_html(value)
}

/// 注文日を長い形式で表示する
fn format_order_date(date: NaiveDate) -> String {
    date.format(ORDER_DATE_DISPLAY_FORMAT).to_string()
}

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`OrderConfirmation` から
/// `RenderedEmail` を生成する。
pub struct TemplateRenderer {
    engine: Tera,
    brand:  BrandProfile,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new(brand: BrandProfile) -> Result<Self, RenderError> {
        let mut engine = Tera::default();
        engine.autoescape_on(Vec::new());

        engine
            .add_raw_templates(vec![
                (
                    HTML_TEMPLATE,
                    include_str!("../../../templates/order_confirmation.html"),
                ),
                (
                    TEXT_TEMPLATE,
                    include_str!("../../../templates/order_confirmation.txt"),
                ),
            ])
            .map_err(|e| RenderError(e.to_string()))?;

        Ok(Self { engine, brand })
    }

    /// 注文確認メールを生成する
    ///
    /// # 引数
    ///
    /// - `order`: 検証済みの注文確認
    /// - `sender`: 送信者（署名に表示名を使う）
    pub fn render(
        &self,
        order: &OrderConfirmation,
        sender: &SenderIdentity,
    ) -> Result<RenderedEmail, RenderError> {
        let html_context = self.build_context(order, sender, escape_html)?;
        let text_context = self.build_context(order, sender, str::to_string)?;

        let html_body = self
            .engine
            .render(HTML_TEMPLATE, &html_context)
            .map_err(|e| RenderError(e.to_string()))?;

        let text_body = self
            .engine
            .render(TEXT_TEMPLATE, &text_context)
            .map_err(|e| RenderError(e.to_string()))?;

        Ok(RenderedEmail {
            subject: format!("Order Confirmation - {} 🎉", order.order_number().as_str()),
            html_body,
            text_body,
        })
    }

    /// テンプレートコンテキストを構築する
    ///
    /// 利用者が入力した文字列とブランド設定はすべて `encode` を通す。
    /// 金額・数量・日付は書式化済みで記号を含まないため、そのまま渡す。
    fn build_context(
        &self,
        order: &OrderConfirmation,
        sender: &SenderIdentity,
        encode: fn(&str) -> String,
    ) -> Result<Context, RenderError> {
        let items = order
            .items()
            .iter()
            .map(|item| {
                let line_total = item.line_total().ok_or_else(|| {
                    RenderError(format!("line total overflow: {}", item.name().as_str()))
                })?;
                Ok(ItemView {
                    name:       encode(item.name().as_str()),
                    quantity:   item.quantity(),
                    unit_price: item.unit_price().to_string(),
                    line_total: line_total.to_string(),
                })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        let signature = sender.display_name().unwrap_or(&self.brand.name);

        let mut context = Context::new();
        context.insert("brand_name", &encode(&self.brand.name));
        context.insert("support_email", &encode(&self.brand.support_email));
        context.insert("support_phone", &encode(&self.brand.support_phone));
        context.insert("tagline", &encode(&self.brand.tagline));
        context.insert("signature", &encode(signature));
        context.insert("customer_name", &encode(order.customer_name().as_str()));
        context.insert("customer_email", &encode(order.customer_email().as_str()));
        context.insert("order_number", &encode(order.order_number().as_str()));
        context.insert("order_date", &format_order_date(order.order_date()));
        context.insert("items", &items);
        context.insert("subtotal", &order.subtotal().to_string());
        context.insert("shipping", &order.shipping().to_string());
        context.insert("total", &order.total().to_string());

        Ok(context)
    }
}
