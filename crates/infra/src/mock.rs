//! # テスト用モックトランスポート
//!
//! ユースケーステスト・統合テストで使用するインメモリのメール送信モック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! happydeel-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use happydeel_domain::dispatch::{MessageId, OutboundEmail, TransportError};

use crate::MailTransport;

// ===== MockMailTransport =====

#[derive(Debug, Default)]
struct MockState {
    sent:    Vec<OutboundEmail>,
    counter: u64,
}

/// 送信したメールを記録するモックトランスポート
///
/// `Clone` しても記録は共有される。テスト側でクローンを保持しておけば、
/// プールに渡した後でも送信内容を検証できる。
#[derive(Debug, Clone, Default)]
pub struct MockMailTransport {
    state:   Arc<Mutex<MockState>>,
    failure: Option<TransportError>,
    delay:   Option<Duration>,
}

impl MockMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に指定のエラーを返すモックを作成する
    pub fn failing(error: TransportError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// 応答までに指定時間待機する
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 送信に成功したメールの一覧
    pub fn sent_emails(&self) -> Vec<OutboundEmail> {
        self.state.lock().unwrap().sent.clone()
    }
}

#[async_trait]
impl MailTransport for MockMailTransport {
    async fn submit(&self, email: &OutboundEmail) -> Result<MessageId, TransportError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let mut state = self.state.lock().unwrap();
        state.counter += 1;
        state.sent.push(email.clone());
        Ok(MessageId::new(format!(
            "<mock-{}@{}>",
            state.counter,
            email.from.address().domain()
        )))
    }
}
