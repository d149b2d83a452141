/// バリデーション付き String Newtype の共通メソッドを生成する内部マクロ
///
/// `define_validated_string!` の PII / 非 PII 両アームで共有される
/// `new()`, `parse()`, `as_str()`, `into_string()` を一括生成する。
macro_rules! _validated_string_common {
    ($Name:ident, $label:expr, $max_length:expr) => {
        impl $Name {
            /// 既定のフィールド名でバリデーションして作成する
            pub fn new(value: impl Into<String>) -> Result<Self, $crate::ValidationError> {
                Self::parse($label, value)
            }

            /// フィールド名を指定してバリデーションする
            ///
            /// 明細行のように、エラーメッセージに添字付きのフィールド名
            /// （例: `items[2].name`）を出したい場合に使う。
            pub fn parse(
                field: &str,
                value: impl Into<String>,
            ) -> Result<Self, $crate::ValidationError> {
                let value = value.into().trim().to_string();

                if value.is_empty() {
                    return Err($crate::ValidationError::MissingField(field.to_string()));
                }

                if value.chars().count() > $max_length {
                    return Err($crate::ValidationError::TooLong {
                        field: field.to_string(),
                        max:   $max_length,
                    });
                }

                // 件名ヘッダーに入る値もあるため、改行を含む制御文字は拒否する
                if value.chars().any(char::is_control) {
                    return Err($crate::ValidationError::ControlCharacters(
                        field.to_string(),
                    ));
                }

                Ok(Self(value))
            }

            /// 文字列参照を取得する
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// 所有権を持つ文字列に変換する
            pub fn into_string(self) -> String {
                self.0
            }
        }
    };
}

/// バリデーション付き String Newtype を定義する宣言型マクロ
///
/// 以下のボイラープレートを一括生成する:
/// - Newtype 構造体（`String` をラップ）
/// - `new()` / `parse()`: trim + 空チェック + 最大長チェック + 制御文字チェック
/// - `as_str()`: 文字列参照
/// - `into_string()`: 所有権を持つ文字列に変換
///
/// # PII モード
///
/// `pii: true` を指定すると PII 保護モードになる:
/// - `Debug` 出力を `[REDACTED]` にマスクする
/// - `Display` impl を生成しない（平文出力を防止）
///
/// # 引数
///
/// - `$label`: エラーメッセージに使うフィールド名（例: `"customerName"`）
/// - `$max_length`: 最大文字数（`chars().count()` でカウント）
/// - `pii`: （任意）`true` を指定すると PII 保護モード
///
/// # 使用例
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use happydeel_domain::order::CustomerName;
///
/// let name = CustomerName::new("Jane Doe")?;
/// assert_eq!(name.as_str(), "Jane Doe");
/// // Debug 出力はマスクされる（PII 保護）
/// assert!(format!("{:?}", name).contains("[REDACTED]"));
/// # Ok(())
/// # }
/// ```
macro_rules! define_validated_string {
    // PII アーム: Debug をマスク、Display を生成しない
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:expr,
            max_length: $max_length:expr,
            pii: true $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, serde::Serialize)]
        $vis struct $Name(String);

        impl std::fmt::Debug for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($Name)).field(&"[REDACTED]").finish()
            }
        }

        _validated_string_common!($Name, $label, $max_length);
    };
    // 非 PII アーム: derive(Debug) + Display 生成
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:expr,
            max_length: $max_length:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
        $vis struct $Name(String);

        _validated_string_common!($Name, $label, $max_length);

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}
