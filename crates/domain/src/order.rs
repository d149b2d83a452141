//! # 注文確認
//!
//! 社内ダッシュボードから届く注文確認リクエストと、そのバリデーションを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`RawOrderConfirmation`] | 未検証リクエスト | HTTP ボディをそのままデシリアライズしたもの |
//! | [`OrderConfirmation`] | 注文確認 | 検証・正規化済みの注文。メール生成の入力 |
//! | [`LineItem`] | 明細 | 商品名・数量・単価 |
//! | [`ValidationPolicy`] | 検証ポリシー | 金額整合性チェックの有無 |
//!
//! ## 設計方針
//!
//! - **境界で型付け**: 未知のフィールドはデシリアライズ時点で拒否する
//! - **数値の正規化**: 数量・金額は JSON 数値と数値文字列の両方を受け付け、
//!   金額は小数第 2 位に丸める
//! - **金額の再計算はしない**: 既定では小計・合計はフォーム側の計算を信頼する。
//!   [`ValidationPolicy::strict_totals`] を有効にした場合のみ整合性を検証する
//! - **純粋関数**: [`OrderConfirmation::validate`] は副作用を持たない

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    ValidationError,
    email::EmailAddress,
    money::{Money, NumericInput},
    sender::SenderPreference,
};

/// `orderDate` の受け付け形式
const ORDER_DATE_FORMAT: &str = "%Y-%m-%d";

define_validated_string! {
    /// 顧客名
    ///
    /// 氏名は PII のため Debug 出力をマスクする。
    pub struct CustomerName {
        label: "customerName",
        max_length: 200,
        pii: true,
    }
}

define_validated_string! {
    /// 注文番号（例: `ORD-1`）
    pub struct OrderNumber {
        label: "orderNumber",
        max_length: 100,
    }
}

define_validated_string! {
    /// 商品名
    pub struct ItemName {
        label: "name",
        max_length: 200,
    }
}

/// 未検証の明細
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLineItem {
    pub name:     Option<String>,
    pub quantity: Option<NumericInput>,
    pub price:    Option<NumericInput>,
}

/// 未検証の注文確認リクエスト
///
/// `POST /send-order-confirmation` のボディ。フィールド名は camelCase。
/// 必須チェックはバリデーション時に行うため、すべて `Option` で受ける。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawOrderConfirmation {
    pub customer_name:  Option<String>,
    pub customer_email: Option<String>,
    pub order_number:   Option<String>,
    pub order_date:     Option<String>,
    pub items:          Option<Vec<RawLineItem>>,
    pub subtotal:       Option<NumericInput>,
    pub shipping:       Option<NumericInput>,
    pub total:          Option<NumericInput>,
    pub sender_email:   Option<String>,
}

impl RawOrderConfirmation {
    /// JSON バイト列からデシリアライズする
    ///
    /// 構文エラー・型不一致・未知のフィールドはすべて
    /// `ValidationError::Malformed` になる。
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))
    }
}

/// 検証ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationPolicy {
    /// 小計 = Σ(数量 × 単価)、合計 = 小計 + 送料 を検証する
    pub strict_totals: bool,
}

/// 明細（検証済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    name:       ItemName,
    quantity:   u32,
    unit_price: Money,
}

impl LineItem {
    pub fn new(name: ItemName, quantity: u32, unit_price: Money) -> Self {
        Self {
            name,
            quantity,
            unit_price,
        }
    }

    pub fn name(&self) -> &ItemName {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// 明細金額（数量 × 単価）
    ///
    /// 金額が `u64` セントを超える場合は `None`。
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// 注文確認（検証済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    customer_name:     CustomerName,
    customer_email:    EmailAddress,
    order_number:      OrderNumber,
    order_date:        NaiveDate,
    items:             Vec<LineItem>,
    subtotal:          Money,
    shipping:          Money,
    total:             Money,
    sender_preference: Option<SenderPreference>,
}

impl OrderConfirmation {
    /// 未検証リクエストを検証・正規化する
    ///
    /// # 検証内容
    ///
    /// - `customerName`, `customerEmail`, `orderNumber`, `orderDate`, `items` は必須
    /// - `customerEmail` は `local@domain.tld` 形式
    /// - 各明細の `quantity` は 1 以上の整数、`price` は非負の数値
    /// - `subtotal`, `total` は必須の非負数値、`shipping` は省略時 0
    /// - `policy.strict_totals` が有効なら金額の整合性
    ///
    /// # エラー
    ///
    /// 最初に見つかった違反を `ValidationError` で返す。
    pub fn validate(
        raw: RawOrderConfirmation,
        policy: ValidationPolicy,
    ) -> Result<Self, ValidationError> {
        let customer_name = CustomerName::new(required(raw.customer_name, "customerName")?)?;
        let customer_email =
            EmailAddress::parse("customerEmail", required(raw.customer_email, "customerEmail")?)?;
        let order_number = OrderNumber::new(required(raw.order_number, "orderNumber")?)?;
        let order_date = parse_order_date(&required(raw.order_date, "orderDate")?)?;

        let raw_items = raw
            .items
            .ok_or_else(|| ValidationError::MissingField("items".to_string()))?;
        if raw_items.is_empty() {
            return Err(ValidationError::EmptyItems);
        }
        let items = raw_items
            .into_iter()
            .enumerate()
            .map(|(index, item)| validate_line_item(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        let subtotal = required_amount(raw.subtotal, "subtotal")?;
        let shipping = optional_amount(raw.shipping, "shipping")?.unwrap_or(Money::ZERO);
        let total = required_amount(raw.total, "total")?;

        let sender_preference = raw.sender_email.and_then(SenderPreference::from_input);

        let order = Self {
            customer_name,
            customer_email,
            order_number,
            order_date,
            items,
            subtotal,
            shipping,
            total,
            sender_preference,
        };

        if policy.strict_totals {
            order.check_totals()?;
        }

        Ok(order)
    }

    /// 金額の整合性を検証する
    ///
    /// - 小計 = Σ(数量 × 単価)
    /// - 合計 = 小計 + 送料
    ///
    /// 金額はすべて小数第 2 位に丸め済みのため、セント単位の完全一致で比較する。
    pub fn check_totals(&self) -> Result<(), ValidationError> {
        let expected_subtotal = self
            .computed_subtotal()
            .ok_or_else(|| ValidationError::InvalidAmount("subtotal".to_string()))?;
        if expected_subtotal != self.subtotal {
            return Err(ValidationError::InconsistentTotals {
                field:    "subtotal".to_string(),
                expected: expected_subtotal,
                actual:   self.subtotal,
            });
        }

        let expected_total = self
            .subtotal
            .checked_add(self.shipping)
            .ok_or_else(|| ValidationError::InvalidAmount("total".to_string()))?;
        if expected_total != self.total {
            return Err(ValidationError::InconsistentTotals {
                field:    "total".to_string(),
                expected: expected_total,
                actual:   self.total,
            });
        }

        Ok(())
    }

    /// 明細から計算した小計（オーバーフロー時は `None`）
    pub fn computed_subtotal(&self) -> Option<Money> {
        self.items.iter().try_fold(Money::ZERO, |sum, item| {
            item.line_total().and_then(|line| sum.checked_add(line))
        })
    }

    pub fn customer_name(&self) -> &CustomerName {
        &self.customer_name
    }

    pub fn customer_email(&self) -> &EmailAddress {
        &self.customer_email
    }

    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    pub fn order_date(&self) -> NaiveDate {
        self.order_date
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn shipping(&self) -> Money {
        self.shipping
    }

    pub fn total(&self) -> Money {
        self.total
    }

    /// 送信者の指定（未指定なら自動選択）
    pub fn sender_preference(&self) -> Option<&SenderPreference> {
        self.sender_preference.as_ref()
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

fn parse_order_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), ORDER_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate("orderDate".to_string()))
}

fn optional_amount(
    value: Option<NumericInput>,
    field: &str,
) -> Result<Option<Money>, ValidationError> {
    match value {
        None => Ok(None),
        Some(input) if input.is_blank() => Ok(None),
        Some(input) => input
            .to_money()
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidAmount(field.to_string())),
    }
}

fn required_amount(value: Option<NumericInput>, field: &str) -> Result<Money, ValidationError> {
    optional_amount(value, field)?.ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

fn validate_line_item(index: usize, raw: RawLineItem) -> Result<LineItem, ValidationError> {
    let field = |name: &str| format!("items[{index}].{name}");

    let name_field = field("name");
    let name = ItemName::parse(&name_field, required(raw.name, &name_field)?)?;

    let quantity_field = field("quantity");
    let quantity = match raw.quantity {
        Some(input) if !input.is_blank() => input
            .to_quantity()
            .ok_or_else(|| ValidationError::InvalidQuantity(quantity_field.clone()))?,
        _ => return Err(ValidationError::MissingField(quantity_field)),
    };

    let price_field = field("price");
    let unit_price = required_amount(raw.price, &price_field)?;

    let item = LineItem::new(name, quantity, unit_price);
    if item.line_total().is_none() {
        return Err(ValidationError::InvalidAmount(price_field));
    }

    Ok(item)
}
