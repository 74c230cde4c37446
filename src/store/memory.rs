/// In-memory ledger seeded once at start-up
use super::{LedgerStore, StoreError};
use crate::types::{Account, Transaction, TransactionKind, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument};

/// On-disk seed format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSeed {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

/// Immutable ledger kept in process memory
#[derive(Debug, Clone)]
pub struct InMemoryLedgerStore {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
}

const DEMO_USER_PRIMARY: &str = "37846734-172e-4149-8cec-6f43d1eb3f60";
const DEMO_USER_SECONDARY: &str = "2d3ba5d0-7ff2-4e1b-9c2a-6a3fa1f3c1b4";
const DEMO_HISTORY_MONTHS: u32 = 14;

impl InMemoryLedgerStore {
    /// Build a store after checking the seed for referential integrity
    pub fn from_seed(seed: LedgerSeed) -> Result<Self, StoreError> {
        validate_seed(&seed)?;
        info!(
            accounts = seed.accounts.len(),
            transactions = seed.transactions.len(),
            "Ledger seeded"
        );
        Ok(Self {
            accounts: seed.accounts,
            transactions: seed.transactions,
        })
    }

    pub fn from_seed_file(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Seed(format!("cannot read {}: {}", path.display(), e)))?;
        let seed: LedgerSeed = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Seed(format!("cannot parse {}: {}", path.display(), e)))?;
        Self::from_seed(seed)
    }

    /// Demo ledger with two users and monthly activity leading up to `now`
    pub fn with_demo_data(now: DateTime<Utc>) -> Result<Self, StoreError> {
        Self::from_seed(demo_seed(now)?)
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    #[instrument(skip(self))]
    async fn transactions(&self, user_id: Option<UserId>) -> Result<Vec<Transaction>, StoreError> {
        let selected: Vec<Transaction> = match user_id {
            None => self.transactions.clone(),
            Some(user) => {
                let owned: HashSet<&str> = self
                    .accounts
                    .iter()
                    .filter(|account| account.user_id == user)
                    .map(|account| account.id.as_str())
                    .collect();
                self.transactions
                    .iter()
                    .filter(|tx| owned.contains(tx.account_id.as_str()))
                    .cloned()
                    .collect()
            }
        };
        debug!(count = selected.len(), "Transactions loaded");
        Ok(selected)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn validate_seed(seed: &LedgerSeed) -> Result<(), StoreError> {
    let mut account_ids = HashSet::new();
    for account in &seed.accounts {
        if !account_ids.insert(account.id.as_str()) {
            return Err(StoreError::Seed(format!(
                "duplicate account id: {}",
                account.id
            )));
        }
    }

    let mut seen = HashSet::new();
    for tx in &seed.transactions {
        if !seen.insert(tx.id.as_str()) {
            return Err(StoreError::Seed(format!(
                "duplicate transaction id: {}",
                tx.id
            )));
        }

        if !account_ids.contains(tx.account_id.as_str()) {
            return Err(StoreError::Seed(format!(
                "transaction {} references unknown account {}",
                tx.id, tx.account_id
            )));
        }

        let sign_ok = match tx.kind {
            TransactionKind::Deposit => !tx.amount.is_sign_negative(),
            TransactionKind::Withdraw => !tx.amount.is_sign_positive() || tx.amount.is_zero(),
        };
        if !sign_ok {
            return Err(StoreError::Seed(format!(
                "transaction {} amount {} does not match kind {:?}",
                tx.id, tx.amount, tx.kind
            )));
        }
    }

    Ok(())
}

fn demo_seed(now: DateTime<Utc>) -> Result<LedgerSeed, StoreError> {
    let primary = UserId::new(DEMO_USER_PRIMARY);
    let secondary = UserId::new(DEMO_USER_SECONDARY);

    let accounts = vec![
        Account {
            id: "aa45e3c9-261d-41fe-a1b0-5b4dcf79cfd3".to_string(),
            user_id: primary.clone(),
        },
        Account {
            id: "c9d0a1e4-3b55-4f0e-9a7e-1c2b3d4e5f60".to_string(),
            user_id: primary,
        },
        Account {
            id: "f1e2d3c4-b5a6-4978-8695-a4b3c2d1e0f9".to_string(),
            user_id: secondary,
        },
    ];

    let mut transactions = Vec::new();
    for month in 0..DEMO_HISTORY_MONTHS {
        // Two days before the month boundary keeps each entry inside a single window
        let date = now
            .checked_sub_months(Months::new(month))
            .and_then(|d| d.checked_sub_signed(Duration::days(2)))
            .ok_or_else(|| StoreError::Seed("demo date out of range".to_string()))?;
        let step = Decimal::from(month);

        let mut push = |account: &Account, kind: TransactionKind, amount: Decimal| {
            let seq = transactions.len() + 1;
            transactions.push(Transaction {
                id: format!("demo-{}-{}", seq, month),
                account_id: account.id.clone(),
                amount,
                transaction_date: date,
                kind,
            });
        };

        push(
            &accounts[0],
            TransactionKind::Deposit,
            Decimal::from(1000) + step * Decimal::from(50),
        );
        push(
            &accounts[0],
            TransactionKind::Withdraw,
            -(Decimal::from(300) + step * Decimal::from(10)),
        );
        if month % 2 == 0 {
            push(&accounts[1], TransactionKind::Deposit, Decimal::new(20050, 2));
        }
        push(&accounts[2], TransactionKind::Deposit, Decimal::from(500));
        push(&accounts[2], TransactionKind::Withdraw, Decimal::from(-120));
    }

    Ok(LedgerSeed {
        accounts,
        transactions,
    })
}
