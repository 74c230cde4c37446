/// Common utilities for integration tests
use bbbank_api::{
    server::http::{AppState, HttpServer},
    services::TransactionService,
    store::{InMemoryLedgerStore, LedgerSeed},
    telemetry::NoopTelemetrySink,
    types::{Account, Transaction, TransactionKind, UserId},
    Config,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";

/// Test configuration for integration tests
pub fn test_config() -> Config {
    let mut config = Config::new("127.0.0.1".to_string(), 5001, "info".to_string());
    config.rate_limit_burst = 100;
    config
}

fn account(id: &str, user: &str) -> Account {
    Account {
        id: id.to_string(),
        user_id: UserId::new(user),
    }
}

fn transaction(id: &str, account: &Account, amount: i64, days_ago: i64) -> Transaction {
    Transaction {
        id: id.to_string(),
        account_id: account.id.clone(),
        amount: Decimal::from(amount),
        transaction_date: Utc::now() - Duration::days(days_ago),
        kind: if amount < 0 {
            TransactionKind::Withdraw
        } else {
            TransactionKind::Deposit
        },
    }
}

/// Alice: 1000 deposited 3 days ago, 250 withdrawn 4 days ago, 500 deposited 400 days ago.
/// Bob: 75 deposited 3 days ago.
pub fn test_seed() -> LedgerSeed {
    let alice = account("a1", ALICE);
    let bob = account("b1", BOB);
    let transactions = vec![
        transaction("t1", &alice, 1000, 3),
        transaction("t2", &alice, -250, 4),
        transaction("t3", &alice, 500, 400),
        transaction("t4", &bob, 75, 3),
    ];

    LedgerSeed {
        accounts: vec![alice, bob],
        transactions,
    }
}

pub fn test_app_state() -> AppState {
    let store = InMemoryLedgerStore::from_seed(test_seed()).expect("valid seed");
    let service = Arc::new(TransactionService::new(Arc::new(store)));
    AppState::new(service, Arc::new(NoopTelemetrySink))
}

/// Running server bound to an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn spawn(state: AppState) -> Self {
        let config = test_config();
        let server = HttpServer::new(
            config.server_host.clone(),
            0,
            state,
            config.http_timeout_seconds,
            config.http_max_concurrency,
            config.rate_limit_rps,
            config.rate_limit_burst,
            config.cors_allow_origins.clone(),
        )
        .expect("server config");

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = server
                .serve(listener, async move {
                    let _ = rx.await;
                })
                .await;
        });

        Self {
            addr,
            shutdown: Some(tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
