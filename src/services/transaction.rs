/// Transaction service implementation
/// Single Responsibility: compute the 12 month running balance report
use super::ServiceError;
use crate::store::LedgerStore;
use crate::types::{BalanceReport, Transaction, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use mockall::automock;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Number of monthly windows in a balance report
pub const REPORT_MONTHS: u32 = 12;

#[automock]
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    /// Running balances for one user, or across every user when `user_id` is `None`
    async fn get_last_12_month_balances(
        &self,
        user_id: Option<UserId>,
    ) -> Result<BalanceReport, ServiceError>;

    /// Health check - verify the underlying ledger is reachable
    async fn health_check(&self) -> Result<(), ServiceError>;
}

/// Source of the reference instant for report windows
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct TransactionService {
    ledger: Arc<dyn LedgerStore>,
    clock: Clock,
}

impl TransactionService {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self::with_clock(ledger, Arc::new(Utc::now))
    }

    pub fn with_clock(ledger: Arc<dyn LedgerStore>, clock: Clock) -> Self {
        Self { ledger, clock }
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    #[instrument(skip(self))]
    async fn get_last_12_month_balances(
        &self,
        user_id: Option<UserId>,
    ) -> Result<BalanceReport, ServiceError> {
        let transactions = self.ledger.transactions(user_id).await?;
        debug!(count = transactions.len(), "Building balance report");
        build_report(&transactions, (self.clock)())
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(self.ledger.health_check().await?)
    }
}

/// Fold transactions into `REPORT_MONTHS` half-open windows ending at `now`.
///
/// Window `i` (counting back from 12) covers `[now - i months, now - i + 1 months)`.
/// Each figure carries the running total of the windows before it, so activity
/// older than 12 months only shows up in `total_balance`.
pub fn build_report(
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> Result<BalanceReport, ServiceError> {
    if transactions.is_empty() {
        return Ok(BalanceReport::empty());
    }

    let total_balance = checked_sum(transactions.iter(), "total balance")?;

    let mut report = BalanceReport {
        total_balance,
        labels: Vec::with_capacity(REPORT_MONTHS as usize),
        figures: Vec::with_capacity(REPORT_MONTHS as usize),
    };
    let mut running = Decimal::ZERO;

    for i in (1..=REPORT_MONTHS).rev() {
        let start = now
            .checked_sub_months(Months::new(i))
            .ok_or(ServiceError::DateOutOfRange)?;
        let end = now
            .checked_sub_months(Months::new(i - 1))
            .ok_or(ServiceError::DateOutOfRange)?;
        let label = end.format("%b %Y").to_string();

        let in_window = transactions
            .iter()
            .filter(|tx| tx.transaction_date >= start && tx.transaction_date < end);
        let month_total = checked_sum(in_window, &label)?;

        running = running
            .checked_add(month_total)
            .ok_or_else(|| ServiceError::Overflow {
                scope: label.clone(),
            })?;

        report.labels.push(label);
        report.figures.push(running);
    }

    Ok(report)
}

fn checked_sum<'a>(
    mut transactions: impl Iterator<Item = &'a Transaction>,
    scope: &str,
) -> Result<Decimal, ServiceError> {
    transactions.try_fold(Decimal::ZERO, |acc, tx| {
        acc.checked_add(tx.amount).ok_or_else(|| ServiceError::Overflow {
            scope: scope.to_string(),
        })
    })
}
