//! Financial ledger and accounting summary repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{AccountingSummary, MonthKey, Transaction, TransactionId};

/// Repository trait for financial records.
///
/// Transactions are written by external flows and read by the settlement
/// engine; summaries are written only by the settlement engine as idempotent
/// upserts keyed by year-month.
#[async_trait]
pub trait FinanceRepository: Send + Sync {
    /// Record a transaction and assign its id.
    async fn add_transaction(&self, transaction: &Transaction) -> RepositoryResult<TransactionId>;

    /// All transactions dated within the given calendar month.
    async fn transactions_in_month(&self, month: MonthKey) -> RepositoryResult<Vec<Transaction>>;

    /// Create or overwrite the summary for its year-month.
    async fn upsert_summary(&self, summary: &AccountingSummary) -> RepositoryResult<()>;

    /// Stored summary for a month, if one has been computed.
    async fn get_summary(&self, month: MonthKey) -> RepositoryResult<Option<AccountingSummary>>;
}
