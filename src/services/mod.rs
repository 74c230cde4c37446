/// Business logic services
/// Following Single Responsibility Principle
pub mod transaction;

use crate::store::StoreError;

// Re-export for convenience
pub use transaction::{MockTransactionServiceTrait, TransactionService, TransactionServiceTrait};

/// Failures raised by the balance-aggregation service
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Balance overflow while totalling {scope}")]
    Overflow { scope: String },

    #[error("Reporting window is out of the supported date range")]
    DateOutOfRange,
}

impl ServiceError {
    /// Stable identifier exposed to HTTP clients
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Store(StoreError::Unavailable(_)) => "store_unavailable",
            ServiceError::Store(StoreError::Seed(_)) => "invalid_ledger",
            ServiceError::Overflow { .. } => "balance_overflow",
            ServiceError::DateOutOfRange => "date_out_of_range",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinct() {
        let kinds = [
            ServiceError::Store(StoreError::Unavailable("down".into())).kind(),
            ServiceError::Store(StoreError::Seed("bad".into())).kind(),
            ServiceError::Overflow {
                scope: "total".into(),
            }
            .kind(),
            ServiceError::DateOutOfRange.kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }

    #[test]
    fn test_store_error_display_is_transparent() {
        let err: ServiceError = StoreError::Unavailable("connection reset".into()).into();
        assert_eq!(err.to_string(), "Ledger store unavailable: connection reset");
    }
}
