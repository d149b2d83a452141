//! # メールアドレス
//!
//! 宛先（顧客）と送信元（送信者アカウント）の両方で使うメールアドレス値オブジェクト。
//!
//! 受け付ける形式は `local@domain.tld`:
//!
//! - `@` をちょうど 1 つ含む
//! - ローカル部が空でない
//! - ドメイン部に `.` を 1 つ以上含み、`.` で区切られた各ラベルが空でない
//! - 空白・制御文字を含まない
//! - 最大 254 文字

use std::fmt;

use serde::Serialize;

use crate::ValidationError;

/// メールアドレスの最大長（RFC 5321 の path 長制限に合わせる）
const MAX_EMAIL_LENGTH: usize = 254;

/// メールアドレス
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// フィールド名を指定してメールアドレスを検証する
    ///
    /// 前後の空白は除去してから検証する。
    ///
    /// # エラー
    ///
    /// - 空文字列: `ValidationError::MissingField`
    /// - 長すぎる: `ValidationError::TooLong`
    /// - 形式不正: `ValidationError::InvalidEmail`
    pub fn parse(field: &str, value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(ValidationError::MissingField(field.to_string()));
        }

        if value.chars().count() > MAX_EMAIL_LENGTH {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max:   MAX_EMAIL_LENGTH,
            });
        }

        if !is_valid_shape(&value) {
            return Err(ValidationError::InvalidEmail(field.to_string()));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ドメイン部を返す
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_shape(value: &str) -> bool {
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }

    domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("a@b.co")]
    #[case("jane@x.com")]
    #[case("first.last+tag@mail.example.co.jp")]
    fn 正しい形式のメールアドレスを受け付ける(#[case] input: &str) {
        assert!(EmailAddress::parse("customerEmail", input).is_ok());
    }

    #[rstest]
    #[case("foo", "@ なし")]
    #[case("foo@bar", "ドメインに . なし")]
    #[case("@bar.com", "ローカル部が空")]
    #[case("foo@.com", "ドメインラベルが空")]
    #[case("foo@bar.", "TLD が空")]
    #[case("foo bar@x.com", "空白を含む")]
    #[case("a@b@c.com", "@ が複数")]
    fn 不正な形式のメールアドレスを拒否する(#[case] input: &str, #[case] _reason: &str) {
        assert_eq!(
            EmailAddress::parse("customerEmail", input),
            Err(ValidationError::InvalidEmail("customerEmail".to_string()))
        );
    }

    #[test]
    fn 空文字列は必須エラーになる() {
        assert_eq!(
            EmailAddress::parse("customerEmail", "   "),
            Err(ValidationError::MissingField("customerEmail".to_string()))
        );
    }

    #[test]
    fn 前後の空白は除去される() {
        let email = EmailAddress::parse("customerEmail", "  jane@x.com ").unwrap();
        assert_eq!(email.as_str(), "jane@x.com");
    }

    #[test]
    fn 長すぎるメールアドレスを拒否する() {
        let input = format!("{}@x.com", "a".repeat(250));
        assert!(matches!(
            EmailAddress::parse("customerEmail", input),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn domainはドメイン部を返す() {
        let email = EmailAddress::parse("senderEmail", "shop@happydeel.com").unwrap();
        assert_eq!(email.domain(), "happydeel.com");
    }
}
