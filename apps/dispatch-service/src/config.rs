//! # Dispatch Service 設定
//!
//! 環境変数から Dispatch Service の設定を読み込む。
//!
//! 読み込みは変数表（`HashMap`）を受け取る純粋関数 [`DispatchConfig::from_vars`] で行い、
//! [`DispatchConfig::from_env`] はプロセスの環境変数を渡すだけのラッパーとする。
//! 値が空文字列の変数は未設定として扱う。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DISPATCH_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `DISPATCH_PORT` | No | ポート番号（デフォルト: `3000`） |
//! | `DISPATCH_API_TOKEN` | **Yes** | 呼び出し元が `Authorization: Bearer` で提示するトークン |
//! | `DISPATCH_STRICT_TOTALS` | No | 金額の整合性検証（デフォルト: `false`） |
//! | `MAIL_TRANSPORT` | No | `smtp` または `noop`（デフォルト: `smtp`） |
//! | `SMTP_HOST` | No | SMTP ホスト（デフォルト: `smtp.gmail.com`） |
//! | `SMTP_PORT` | No | SMTP ポート（デフォルト: `587`） |
//! | `SMTP_TLS` | No | `starttls` / `tls` / `none`（デフォルト: `starttls`） |
//! | `SMTP_TIMEOUT_SECS` | No | 送信 1 回あたりのタイムアウト秒（デフォルト: `30`） |
//! | `MAIL_FROM_NAME` | No | From ヘッダーの表示名（デフォルト: `HappyDeel`） |
//! | `MAIL_ACCOUNT_<N>_USER` | No | 送信者アカウントのアドレス（N の昇順がローテーション順） |
//! | `MAIL_ACCOUNT_<N>_PASSWORD` | USER 設定時 | 送信者アカウントのパスワード |
//! | `BRAND_NAME` | No | ブランド名（デフォルト: `HappyDeel`） |
//! | `BRAND_SUPPORT_EMAIL` | No | サポート窓口メール（デフォルト: `support@happydeel.com`） |
//! | `BRAND_SUPPORT_PHONE` | No | サポート窓口電話（デフォルト: `+17176484487`） |
//! | `BRAND_TAGLINE` | No | フッターのキャッチコピー |

use std::{
    collections::{BTreeMap, HashMap},
    env,
    fmt,
    str::FromStr,
    time::Duration,
};

use happydeel_domain::email::EmailAddress;
use happydeel_infra::mail_transport::{SmtpSettings, SmtpTls};
use thiserror::Error;

use crate::usecase::BrandProfile;

const ACCOUNT_PREFIX: &str = "MAIL_ACCOUNT_";
const ACCOUNT_USER_SUFFIX: &str = "_USER";

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が設定されていない
    #[error("{0} が設定されていません")]
    Missing(String),

    /// 値を解釈できない
    #[error("{name} の値が不正です: {value:?}（{expected}）")]
    Invalid {
        name:     String,
        value:    String,
        expected: &'static str,
    },
}

/// メール送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportBackend {
    /// SMTP サーバー経由で送信
    Smtp,
    /// 送信しない（ログ出力のみ）
    Noop,
}

/// 送信者アカウントの設定
#[derive(Clone, PartialEq, Eq)]
pub struct AccountConfig {
    pub user:     EmailAddress,
    pub password: String,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Dispatch Service サーバーの設定
#[derive(Clone)]
pub struct DispatchConfig {
    /// バインドアドレス
    pub host:          String,
    /// ポート番号
    pub port:          u16,
    /// API トークン
    pub api_token:     String,
    /// 金額の整合性を検証するか
    pub strict_totals: bool,
    /// 送信バックエンド
    pub transport:     TransportBackend,
    /// SMTP 接続設定（全アカウント共通）
    pub smtp:          SmtpSettings,
    /// From ヘッダーの表示名
    pub from_name:     String,
    /// 送信者アカウント（ローテーション順）
    pub accounts:      Vec<AccountConfig>,
    /// メール本文のブランド情報
    pub brand:         BrandProfile,
}

impl fmt::Debug for DispatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_token", &"[REDACTED]")
            .field("strict_totals", &self.strict_totals)
            .field("transport", &self.transport)
            .field("smtp", &self.smtp)
            .field("from_name", &self.from_name)
            .field("accounts", &self.accounts)
            .field("brand", &self.brand)
            .finish()
    }
}

impl DispatchConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// 変数表から設定を読み込む
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let lookup = Lookup(vars);

        let api_token = lookup
            .get("DISPATCH_API_TOKEN")
            .ok_or_else(|| ConfigError::Missing("DISPATCH_API_TOKEN".to_string()))?
            .to_string();

        let smtp = SmtpSettings {
            host:    lookup.get_or("SMTP_HOST", "smtp.gmail.com"),
            port:    lookup.parse_or("SMTP_PORT", 587, "ポート番号")?,
            tls:     match lookup.get("SMTP_TLS") {
                None => SmtpTls::default(),
                Some(value) => SmtpTls::parse(value).ok_or_else(|| ConfigError::Invalid {
                    name:     "SMTP_TLS".to_string(),
                    value:    value.to_string(),
                    expected: "starttls / tls / none",
                })?,
            },
            timeout: parse_timeout(&lookup)?,
        };

        Ok(Self {
            host: lookup.get_or("DISPATCH_HOST", "0.0.0.0"),
            port: lookup.parse_or("DISPATCH_PORT", 3000, "ポート番号")?,
            api_token,
            strict_totals: lookup.bool_or("DISPATCH_STRICT_TOTALS", false)?,
            transport: parse_transport(lookup.get("MAIL_TRANSPORT"))?,
            smtp,
            from_name: lookup.get_or("MAIL_FROM_NAME", "HappyDeel"),
            accounts: parse_accounts(&lookup)?,
            brand: BrandProfile {
                name:          lookup.get_or("BRAND_NAME", "HappyDeel"),
                support_email: lookup.get_or("BRAND_SUPPORT_EMAIL", "support@happydeel.com"),
                support_phone: lookup.get_or("BRAND_SUPPORT_PHONE", "+17176484487"),
                tagline:       lookup.get_or(
                    "BRAND_TAGLINE",
                    "The smart way to buy quality items — for less.",
                ),
            },
        })
    }
}

/// 空文字列を未設定とみなす変数表
struct Lookup<'a>(&'a HashMap<String, String>);

impl Lookup<'_> {
    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or(default).to_string()
    }

    fn parse_or<T: FromStr>(
        &self,
        name: &str,
        default: T,
        expected: &'static str,
    ) -> Result<T, ConfigError> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: name.to_string(),
                value: value.to_string(),
                expected,
            }),
        }
    }

    fn bool_or(&self, name: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(name).map(str::to_ascii_lowercase).as_deref() {
            None => Ok(default),
            Some("true" | "1" | "yes") => Ok(true),
            Some("false" | "0" | "no") => Ok(false),
            Some(other) => Err(ConfigError::Invalid {
                name:     name.to_string(),
                value:    other.to_string(),
                expected: "true / false",
            }),
        }
    }
}

/// `SMTP_TIMEOUT_SECS` を読み込む（1 秒以上）
fn parse_timeout(lookup: &Lookup<'_>) -> Result<Duration, ConfigError> {
    const NAME: &str = "SMTP_TIMEOUT_SECS";
    const EXPECTED: &str = "1 以上の秒数";

    let secs: u64 = lookup.parse_or(NAME, 30, EXPECTED)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name:     NAME.to_string(),
            value:    secs.to_string(),
            expected: EXPECTED,
        });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_transport(value: Option<&str>) -> Result<TransportBackend, ConfigError> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("smtp") => Ok(TransportBackend::Smtp),
        Some("noop") => Ok(TransportBackend::Noop),
        Some(other) => Err(ConfigError::Invalid {
            name:     "MAIL_TRANSPORT".to_string(),
            value:    other.to_string(),
            expected: "smtp / noop",
        }),
    }
}

/// `MAIL_ACCOUNT_<N>_USER` / `MAIL_ACCOUNT_<N>_PASSWORD` を N の昇順で読み込む
///
/// 番号は連番でなくてもよい。`01` と `1` のように同じ番号を指す変数が
/// 複数ある場合はエラー。パスワードは USER 変数と同じ番号表記の
/// `_PASSWORD` から読む。
fn parse_accounts(lookup: &Lookup<'_>) -> Result<Vec<AccountConfig>, ConfigError> {
    let mut numbered: BTreeMap<u32, (&str, &str)> = BTreeMap::new();
    for name in lookup.0.keys() {
        let Some(digits) = name
            .strip_prefix(ACCOUNT_PREFIX)
            .and_then(|rest| rest.strip_suffix(ACCOUNT_USER_SUFFIX))
        else {
            continue;
        };
        let number: u32 = digits.parse().map_err(|_| ConfigError::Invalid {
            name:     name.clone(),
            value:    digits.to_string(),
            expected: "MAIL_ACCOUNT_<番号>_USER",
        })?;
        let Some(user) = lookup.get(name) else {
            continue;
        };
        if numbered.insert(number, (digits, user)).is_some() {
            return Err(ConfigError::Invalid {
                name:     name.clone(),
                value:    digits.to_string(),
                expected: "他のアカウントと重複しない番号",
            });
        }
    }

    numbered
        .into_values()
        .map(|(digits, user)| {
            let user_var = format!("{ACCOUNT_PREFIX}{digits}{ACCOUNT_USER_SUFFIX}");
            let password_var = format!("{ACCOUNT_PREFIX}{digits}_PASSWORD");

            let user = EmailAddress::parse(&user_var, user).map_err(|_| ConfigError::Invalid {
                name:     user_var.clone(),
                value:    user.to_string(),
                expected: "メールアドレス",
            })?;
            let password = lookup
                .get(&password_var)
                .ok_or(ConfigError::Missing(password_var))?
                .to_string();

            Ok(AccountConfig { user, password })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![("DISPATCH_API_TOKEN", "secret")]
    }

    #[test]
    fn 未設定の変数はデフォルト値になる() {
        let config = DispatchConfig::from_vars(&vars(&minimal())).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.api_token, "secret");
        assert!(!config.strict_totals);
        assert_eq!(config.transport, TransportBackend::Smtp);
        assert_eq!(
            config.smtp,
            SmtpSettings {
                host:    "smtp.gmail.com".to_string(),
                port:    587,
                tls:     SmtpTls::StartTls,
                timeout: Duration::from_secs(30),
            }
        );
        assert_eq!(config.from_name, "HappyDeel");
        assert!(config.accounts.is_empty());
        assert_eq!(config.brand, BrandProfile::default());
    }

    #[rstest]
    #[case(&[])]
    #[case(&[("DISPATCH_API_TOKEN", "")])]
    #[case(&[("DISPATCH_API_TOKEN", "   ")])]
    fn apiトークンがなければ起動できない(#[case] pairs: &[(&str, &str)]) {
        assert_eq!(
            DispatchConfig::from_vars(&vars(pairs)).unwrap_err(),
            ConfigError::Missing("DISPATCH_API_TOKEN".to_string())
        );
    }

    #[test]
    fn 指定した値が反映される() {
        let mut pairs = minimal();
        pairs.extend([
            ("DISPATCH_HOST", "127.0.0.1"),
            ("DISPATCH_PORT", "8080"),
            ("DISPATCH_STRICT_TOTALS", "true"),
            ("MAIL_TRANSPORT", "noop"),
            ("SMTP_HOST", "localhost"),
            ("SMTP_PORT", "1025"),
            ("SMTP_TLS", "none"),
            ("SMTP_TIMEOUT_SECS", "5"),
            ("MAIL_FROM_NAME", "HappyDeel Orders"),
            ("BRAND_NAME", "Acme"),
        ]);

        let config = DispatchConfig::from_vars(&vars(&pairs)).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.strict_totals);
        assert_eq!(config.transport, TransportBackend::Noop);
        assert_eq!(config.smtp.host, "localhost");
        assert_eq!(config.smtp.port, 1025);
        assert_eq!(config.smtp.tls, SmtpTls::None);
        assert_eq!(config.smtp.timeout, Duration::from_secs(5));
        assert_eq!(config.from_name, "HappyDeel Orders");
        assert_eq!(config.brand.name, "Acme");
        assert_eq!(config.brand.support_email, "support@happydeel.com");
    }

    #[test]
    fn アカウントは番号の昇順で読み込まれる() {
        let mut pairs = minimal();
        pairs.extend([
            ("MAIL_ACCOUNT_10_USER", "c@happydeel.com"),
            ("MAIL_ACCOUNT_10_PASSWORD", "pw-c"),
            ("MAIL_ACCOUNT_2_USER", "b@happydeel.com"),
            ("MAIL_ACCOUNT_2_PASSWORD", "pw-b"),
            ("MAIL_ACCOUNT_1_USER", "a@happydeel.com"),
            ("MAIL_ACCOUNT_1_PASSWORD", "pw-a"),
        ]);

        let config = DispatchConfig::from_vars(&vars(&pairs)).unwrap();

        let users: Vec<&str> = config
            .accounts
            .iter()
            .map(|account| account.user.as_str())
            .collect();
        assert_eq!(
            users,
            vec!["a@happydeel.com", "b@happydeel.com", "c@happydeel.com"]
        );
        assert_eq!(config.accounts[0].password, "pw-a");
    }

    #[test]
    fn パスワードのないアカウントはエラーになる() {
        let mut pairs = minimal();
        pairs.push(("MAIL_ACCOUNT_1_USER", "a@happydeel.com"));

        assert_eq!(
            DispatchConfig::from_vars(&vars(&pairs)).unwrap_err(),
            ConfigError::Missing("MAIL_ACCOUNT_1_PASSWORD".to_string())
        );
    }

    #[rstest]
    #[case("DISPATCH_PORT", "not-a-port")]
    #[case("SMTP_PORT", "70000")]
    #[case("SMTP_TLS", "ssl")]
    #[case("SMTP_TIMEOUT_SECS", "-1")]
    #[case("SMTP_TIMEOUT_SECS", "0")]
    #[case("DISPATCH_STRICT_TOTALS", "maybe")]
    #[case("MAIL_TRANSPORT", "ses")]
    #[case("MAIL_ACCOUNT_1_USER", "not-an-email")]
    #[case("MAIL_ACCOUNT_X_USER", "a@happydeel.com")]
    fn 不正な値はエラーになる(#[case] name: &str, #[case] value: &str) {
        let mut pairs = minimal();
        pairs.extend([(name, value), ("MAIL_ACCOUNT_1_PASSWORD", "pw")]);

        let error = DispatchConfig::from_vars(&vars(&pairs)).unwrap_err();

        assert!(
            matches!(&error, ConfigError::Invalid { name: n, .. } if n == name),
            "{error:?}"
        );
    }

    #[test]
    fn 同じ番号を指すアカウント変数はエラーになる() {
        let mut pairs = minimal();
        pairs.extend([
            ("MAIL_ACCOUNT_1_USER", "a@happydeel.com"),
            ("MAIL_ACCOUNT_1_PASSWORD", "pw-a"),
            ("MAIL_ACCOUNT_01_USER", "b@happydeel.com"),
            ("MAIL_ACCOUNT_01_PASSWORD", "pw-b"),
        ]);

        let error = DispatchConfig::from_vars(&vars(&pairs)).unwrap_err();

        assert!(
            matches!(
                &error,
                ConfigError::Invalid { name, .. }
                    if name == "MAIL_ACCOUNT_1_USER" || name == "MAIL_ACCOUNT_01_USER"
            ),
            "{error:?}"
        );
    }

    #[test]
    fn ゼロ埋めの番号はその表記のパスワードを読む() {
        let mut pairs = minimal();
        pairs.extend([
            ("MAIL_ACCOUNT_02_USER", "b@happydeel.com"),
            ("MAIL_ACCOUNT_02_PASSWORD", "pw-b"),
            ("MAIL_ACCOUNT_1_USER", "a@happydeel.com"),
            ("MAIL_ACCOUNT_1_PASSWORD", "pw-a"),
        ]);

        let config = DispatchConfig::from_vars(&vars(&pairs)).unwrap();

        let accounts: Vec<(&str, &str)> = config
            .accounts
            .iter()
            .map(|account| (account.user.as_str(), account.password.as_str()))
            .collect();
        assert_eq!(
            accounts,
            vec![("a@happydeel.com", "pw-a"), ("b@happydeel.com", "pw-b")]
        );
    }

    #[test]
    fn debug出力に秘密情報を含めない() {
        let mut pairs = minimal();
        pairs.extend([
            ("MAIL_ACCOUNT_1_USER", "a@happydeel.com"),
            ("MAIL_ACCOUNT_1_PASSWORD", "hunter2"),
        ]);
        let config = DispatchConfig::from_vars(&vars(&pairs)).unwrap();

        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(!debug.contains("hunter2"));
    }
}
