/// Domain types for the BBBank balance API
/// Ledger entities plus the balance report handed to HTTP clients
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Opaque user identifier taken straight from the route
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// A bank account; transactions reach their user through it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

/// A single ledger movement. Deposits carry a positive amount, withdrawals a negative one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub amount: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub kind: TransactionKind,
}

/// Running monthly balances for the last 12 months
///
/// `labels[i]` names the month that `figures[i]` closes. Both are empty when
/// the ledger holds no transactions for the requested scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub total_balance: Decimal,
    pub labels: Vec<String>,
    pub figures: Vec<Decimal>,
}

impl BalanceReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn figure_count(&self) -> usize {
        self.figures.len()
    }
}

/// Named analytics event with string attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryEvent {
    pub name: String,
    pub properties: BTreeMap<String, String>,
}

impl TelemetryEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
