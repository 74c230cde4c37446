/// Ledger store module - abstracts access to accounts and transactions
/// Clean interface for dependency injection and testing
mod memory;

pub use memory::{InMemoryLedgerStore, LedgerSeed};

use crate::types::{Transaction, UserId};
use async_trait::async_trait;
use mockall::automock;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Ledger store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid ledger seed: {0}")]
    Seed(String),
}

/// Read-only ledger access
#[automock]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Transactions on accounts owned by `user_id`, or every transaction when `None`
    async fn transactions(&self, user_id: Option<UserId>) -> Result<Vec<Transaction>, StoreError>;

    /// Health check - verify the store can serve reads
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Store factory for dependency injection
pub struct StoreFactory;

impl StoreFactory {
    /// Seeded from a JSON file when a path is given, demo data otherwise
    pub fn create_ledger_store(seed_path: Option<&Path>) -> anyhow::Result<Arc<dyn LedgerStore>> {
        let store = match seed_path {
            Some(path) => InMemoryLedgerStore::from_seed_file(path)?,
            None => InMemoryLedgerStore::with_demo_data(chrono::Utc::now())?,
        };
        Ok(Arc::new(store))
    }
}
