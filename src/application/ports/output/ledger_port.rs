/*
Ledger Port

Read access to the distributed ledger. The application only needs account balances;
signing and submitting transactions is not part of this port.
*/

use async_trait::async_trait;

use crate::core::platform::container::ledger::{AccountId, Hbar, LedgerDomainError, LedgerNetwork};

pub type LedgerPortResult<T> = Result<T, LedgerPortError>;

#[derive(Debug, thiserror::Error)]
pub enum LedgerPortError {
    #[error("{0}")]
    Domain(#[from] LedgerDomainError),

    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error("ledger request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("ledger responded with status {0}")]
    Status(u16),
}

#[async_trait]
pub trait LedgerPort: Send + Sync {
    /// Network this port is bound to
    fn network(&self) -> LedgerNetwork;

    /// Current HBAR balance of `account`
    async fn account_balance(&self, account: &AccountId) -> LedgerPortResult<Hbar>;
}
