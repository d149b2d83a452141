//! # 送信者アカウントプール
//!
//! 起動時に設定された送信者アカウント（識別情報 + メール送信トランスポート）を
//! 保持し、完全一致による検索とラウンドロビンによる自動選択を提供する。
//!
//! ## 設計方針
//!
//! - **起動後は不変**: アカウント一覧は構築時に確定し、以降は読み取りのみ
//! - **カーソルは排他制御**: ローテーション位置は `Mutex<usize>` で保護し、
//!   並行リクエスト間で同じ位置が二重に払い出されないようにする
//! - **ポイズン耐性**: カーソルのロックがポイズンしても値をそのまま回収して続行する

use std::{
    collections::HashSet,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use happydeel_domain::sender::{SenderIdentity, SenderPreference};

use crate::{InfraError, MailTransport};

/// 送信者アカウント
///
/// 識別情報と、そのアカウントの認証情報で構築したトランスポートの組。
#[derive(Clone)]
pub struct SenderAccount {
    identity:  SenderIdentity,
    transport: Arc<dyn MailTransport>,
}

impl SenderAccount {
    pub fn new(identity: SenderIdentity, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            identity,
            transport,
        }
    }

    pub fn identity(&self) -> &SenderIdentity {
        &self.identity
    }

    pub fn transport(&self) -> &Arc<dyn MailTransport> {
        &self.transport
    }
}

impl fmt::Debug for SenderAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderAccount")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// 送信者アカウントプールトレイト
pub trait AccountPool: Send + Sync {
    /// 設定順の送信者識別情報一覧
    fn accounts(&self) -> Vec<SenderIdentity>;

    /// 送信者指定と完全一致するアカウントを検索する
    fn find(&self, preference: &SenderPreference) -> Option<SenderAccount>;

    /// ローテーションの次のアカウントを払い出し、カーソルを進める
    ///
    /// アカウントが 1 つもない場合は `None` を返し、カーソルは動かさない。
    fn next_in_rotation(&self) -> Option<SenderAccount>;
}

/// ラウンドロビンで送信者を払い出すアカウントプール
pub struct RotatingAccountPool {
    accounts: Vec<SenderAccount>,
    cursor:   Mutex<usize>,
}

impl RotatingAccountPool {
    /// アカウント一覧からプールを構築する
    ///
    /// # エラー
    ///
    /// 同じアドレスのアカウントが複数ある場合は `InfraError::DuplicateAccount` を返す。
    pub fn new(accounts: Vec<SenderAccount>) -> Result<Self, InfraError> {
        let mut seen = HashSet::new();
        for account in &accounts {
            let address = account.identity().address().as_str();
            if !seen.insert(address) {
                return Err(InfraError::DuplicateAccount(address.to_string()));
            }
        }

        Ok(Self {
            accounts,
            cursor: Mutex::new(0),
        })
    }

    /// 次に払い出す位置（`0..len`、アカウントなしの場合は常に 0）
    pub fn cursor(&self) -> usize {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountPool for RotatingAccountPool {
    fn accounts(&self) -> Vec<SenderIdentity> {
        self.accounts
            .iter()
            .map(|account| account.identity().clone())
            .collect()
    }

    fn find(&self, preference: &SenderPreference) -> Option<SenderAccount> {
        self.accounts
            .iter()
            .find(|account| account.identity().matches(preference))
            .cloned()
    }

    fn next_in_rotation(&self) -> Option<SenderAccount> {
        if self.accounts.is_empty() {
            return None;
        }

        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let account = self.accounts.get(*cursor).cloned();
        *cursor = (*cursor + 1) % self.accounts.len();
        account
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, thread};

    use happydeel_domain::email::EmailAddress;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::mail_transport::NoopMailTransport;

    fn account(address: &str) -> SenderAccount {
        SenderAccount::new(
            SenderIdentity::new(EmailAddress::parse("user", address).unwrap(), None),
            Arc::new(NoopMailTransport),
        )
    }

    fn preference(value: &str) -> SenderPreference {
        SenderPreference::from_input(value.to_string()).unwrap()
    }

    fn address_of(account: &SenderAccount) -> String {
        account.identity().address().as_str().to_string()
    }

    #[fixture]
    fn pool() -> RotatingAccountPool {
        RotatingAccountPool::new(vec![
            account("a@happydeel.com"),
            account("b@happydeel.com"),
            account("c@happydeel.com"),
        ])
        .unwrap()
    }

    #[rstest]
    fn accountsは設定順の一覧を返す(pool: RotatingAccountPool) {
        let addresses: Vec<String> = pool
            .accounts()
            .iter()
            .map(|identity| identity.address().as_str().to_string())
            .collect();

        assert_eq!(
            addresses,
            vec!["a@happydeel.com", "b@happydeel.com", "c@happydeel.com"]
        );
    }

    #[rstest]
    fn ローテーションは設定順に巡回する(pool: RotatingAccountPool) {
        let picked: Vec<String> = (0..4)
            .map(|_| address_of(&pool.next_in_rotation().unwrap()))
            .collect();

        assert_eq!(
            picked,
            vec![
                "a@happydeel.com",
                "b@happydeel.com",
                "c@happydeel.com",
                "a@happydeel.com"
            ]
        );
        assert_eq!(pool.cursor(), 1);
    }

    #[rstest]
    fn findは完全一致のアカウントを返しカーソルを動かさない(pool: RotatingAccountPool) {
        let found = pool.find(&preference("b@happydeel.com")).unwrap();

        assert_eq!(address_of(&found), "b@happydeel.com");
        assert_eq!(pool.cursor(), 0);
    }

    #[rstest]
    #[case("ghost@happydeel.com")]
    #[case("B@happydeel.com")]
    fn findは一致しない指定でnoneを返す(pool: RotatingAccountPool, #[case] value: &str) {
        assert!(pool.find(&preference(value)).is_none());
    }

    #[test]
    fn 空のプールはローテーションでnoneを返す() {
        let pool = RotatingAccountPool::new(Vec::new()).unwrap();

        assert!(pool.next_in_rotation().is_none());
        assert!(pool.is_empty());
        assert_eq!(pool.cursor(), 0);
    }

    #[test]
    fn 重複したアドレスはエラーになる() {
        let result = RotatingAccountPool::new(vec![
            account("a@happydeel.com"),
            account("a@happydeel.com"),
        ]);

        assert!(matches!(
            result,
            Err(InfraError::DuplicateAccount(address)) if address == "a@happydeel.com"
        ));
    }

    #[test]
    fn ロックがポイズンしてもローテーションを続行できる() {
        let pool = Arc::new(
            RotatingAccountPool::new(vec![account("a@happydeel.com"), account("b@happydeel.com")])
                .unwrap(),
        );

        let poisoner = Arc::clone(&pool);
        let _ = thread::spawn(move || {
            let _guard = poisoner.cursor.lock().unwrap();
            panic!("ロック保持中にパニック");
        })
        .join();

        assert!(pool.cursor.is_poisoned());
        assert_eq!(address_of(&pool.next_in_rotation().unwrap()), "a@happydeel.com");
        assert_eq!(address_of(&pool.next_in_rotation().unwrap()), "b@happydeel.com");
    }

    #[test]
    fn 並行呼び出しでも各アカウントが均等に払い出される() {
        const THREADS: usize = 8;
        const CALLS_PER_THREAD: usize = 300;

        let pool = RotatingAccountPool::new(vec![
            account("a@happydeel.com"),
            account("b@happydeel.com"),
            account("c@happydeel.com"),
        ])
        .unwrap();

        let picked: Vec<String> = thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        (0..CALLS_PER_THREAD)
                            .map(|_| address_of(&pool.next_in_rotation().unwrap()))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        });

        let mut counts: HashMap<String, usize> = HashMap::new();
        for address in picked {
            *counts.entry(address).or_default() += 1;
        }

        let expected = THREADS * CALLS_PER_THREAD / 3;
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|&count| count == expected));
        assert_eq!(pool.cursor(), 0);
    }
}
