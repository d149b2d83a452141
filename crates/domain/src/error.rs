//! # リクエスト検証エラー
//!
//! 注文確認リクエストのバリデーション失敗を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **フィールド名を必ず含める**: 呼び出し元（社内ダッシュボード）がどの入力を
//!   直せばよいか分かるよう、メッセージはリクエスト JSON のフィールド名で表記する
//! - **副作用なしで検出**: すべて外部呼び出し前に検出され、HTTP 400 に変換される
//!
//! ## エラーの種類
//!
//! | エラー種別 | 用途 |
//! |-----------|------|
//! | `Malformed` | JSON として不正、または未知のフィールドを含む |
//! | `MissingField` | 必須フィールドが未入力 |
//! | `InvalidEmail` | メールアドレスの形式不正 |
//! | `TooLong` / `ControlCharacters` | 文字列フィールドの制約違反 |
//! | `EmptyItems` | 明細が 0 件 |
//! | `InvalidQuantity` / `InvalidAmount` / `InvalidDate` | 数値・日付の変換失敗 |
//! | `InconsistentTotals` | 厳格モードでの金額整合性違反 |

use thiserror::Error;

use crate::money::Money;

/// 注文確認リクエストのバリデーションエラー
///
/// メッセージは API レスポンスの `error` にそのまま載るため英語で記述する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// リクエストボディが JSON として解釈できない
    #[error("Invalid request body: {0}")]
    Malformed(String),

    /// 必須フィールドが未入力
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// メールアドレスの形式が不正
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    /// 最大文字数を超過
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// 改行などの制御文字を含む
    #[error("{0} must not contain control characters")]
    ControlCharacters(String),

    /// 明細が空
    #[error("At least one item is required: items")]
    EmptyItems,

    /// 数量が 1 以上の整数でない
    #[error("{0} must be a whole number of at least 1")]
    InvalidQuantity(String),

    /// 金額が非負の数値でない
    #[error("{0} must be a non-negative number")]
    InvalidAmount(String),

    /// 日付が `YYYY-MM-DD` 形式でない
    #[error("{0} must be a date in YYYY-MM-DD format")]
    InvalidDate(String),

    /// 金額の整合性違反（厳格モードのみ）
    #[error("{field} does not match the order items: expected {expected}, got {actual}")]
    InconsistentTotals {
        field:    String,
        expected: Money,
        actual:   Money,
    },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn メッセージにフィールド名が含まれる() {
        let error = ValidationError::InvalidQuantity("items[0].quantity".to_string());
        assert_eq!(
            error.to_string(),
            "items[0].quantity must be a whole number of at least 1"
        );
    }

    #[test]
    fn 金額不整合のメッセージに期待値と実際の値が含まれる() {
        let error = ValidationError::InconsistentTotals {
            field:    "subtotal".to_string(),
            expected: Money::from_cents(1998),
            actual:   Money::from_cents(2000),
        };
        assert_eq!(
            error.to_string(),
            "subtotal does not match the order items: expected 19.98, got 20.00"
        );
    }
}
