//! # 金額
//!
//! 注文金額を最小通貨単位（セント）の整数で保持する値オブジェクト。
//!
//! ## 設計方針
//!
//! - **浮動小数点を使わない**: `"9.99"` のような 10 進文字列を直接セントに変換する
//! - **小数第 2 位で四捨五入**: 第 3 位以下は half-up で丸める（`"1.005"` → `1.01`）
//! - **非負のみ**: 負の金額は表現できない
//! - **入力の柔軟性**: JSON の数値と数値文字列の両方を受け付ける（[`NumericInput`]）

use std::fmt;

use serde::{Deserialize, Serialize};

/// 1 単位あたりのセント数
const CENTS_PER_UNIT: u64 = 100;

/// 金額（セント単位、非負）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(into = "String")]
pub struct Money(u64);

impl Money {
    /// 0 円
    pub const ZERO: Self = Self(0);

    /// セント数から作成する
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// セント数を返す
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// 10 進文字列をパースする
    ///
    /// 受け付ける形式: `"12"`, `"12.3"`, `"12.345"`, `".5"`, `"+1.00"`。
    /// 前後の空白は無視する。負数・指数表記・数字以外の文字を含む場合は `None`。
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let unsigned = input.strip_prefix('+').unwrap_or(input);

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (unsigned, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let units = if int_part.is_empty() {
            0
        } else {
            int_part.parse::<u64>().ok()?
        };

        let mut digits = frac_part.bytes().map(|b| u64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);

        let cents = units
            .checked_mul(CENTS_PER_UNIT)?
            .checked_add(tenths * 10 + hundredths)?
            .checked_add(u64::from(round_up))?;

        Some(Self(cents))
    }

    /// 数量を掛ける（オーバーフロー時は `None`）
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(u64::from(quantity)).map(Self)
    }

    /// 金額を加算する（オーバーフロー時は `None`）
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / CENTS_PER_UNIT,
            self.0 % CENTS_PER_UNIT
        )
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.to_string()
    }
}

/// 数値入力
///
/// フォームは金額を `"9.99"` のような文字列で、数量を `2` のような数値で送ってくる。
/// どちらの表現でも受け付け、変換はバリデーション時に行う。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(serde_json::Number),
    Text(String),
}

impl NumericInput {
    /// 空文字列（未入力扱い）かどうか
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    /// 金額として解釈する
    pub fn to_money(&self) -> Option<Money> {
        match self {
            Self::Number(number) => Money::parse(&number.to_string()),
            Self::Text(text) => Money::parse(text),
        }
    }

    /// 1 以上の整数として解釈する
    ///
    /// `2`, `"2"`, `2.0` は 2 として受け付け、`2.5` や `0` は拒否する。
    pub fn to_quantity(&self) -> Option<u32> {
        if let Some(value) = self.as_u64() {
            return u32::try_from(value).ok().filter(|q| *q >= 1);
        }

        let money = self.to_money()?;
        if money.cents() % CENTS_PER_UNIT != 0 {
            return None;
        }
        u32::try_from(money.cents() / CENTS_PER_UNIT)
            .ok()
            .filter(|q| *q >= 1)
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(number) => number.as_u64(),
            Self::Text(_) => None,
        }
    }
}
