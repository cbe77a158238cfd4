/*
Ledger Operations

Use cases behind the ledger endpoints:
- allowance approval and transfer are placeholders; they validate the request,
  hand out a synthetic transaction id and announce the event, but sign nothing
- balance lookup passes through to the LedgerPort

Every successful placeholder operation produces exactly one notification, awaited
before returning. Notification failures never reach the caller.
*/

use crate::application::ports::output::ledger_port::{LedgerPort, LedgerPortError};
use crate::application::ports::output::notification_port::{NotificationEvent, NotificationKind, Notifier};
use crate::core::platform::container::ledger::{placeholder_transaction_id, AccountId};
use chrono::Utc;
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub const ALLOWANCE_APPROVED_MESSAGE: &str = "Allowance approved successfully";
pub const TRANSFER_COMPLETED_MESSAGE: &str = "Transfer completed successfully";

const ALLOWANCE_FIELDS: &str = "accountId, targetWallet, allowanceAmount";
const TRANSFER_FIELDS: &str = "fromAccount, toAccount, amount";

#[derive(Debug, thiserror::Error)]
pub enum LedgerOperationError {
    #[error("Missing required parameters: {0}")]
    MissingParameters(&'static str),
}

/// Body of `POST /api/allowance`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceRequest {
    pub account_id: Option<Value>,
    pub target_wallet: Option<Value>,
    pub allowance_amount: Option<Value>,
}

/// Body of `POST /api/transfer`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_account: Option<Value>,
    pub to_account: Option<Value>,
    pub amount: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub message: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub account_id: String,
    /// Display form, e.g. `12.5 ℏ`
    pub balance: String,
    pub balance_in_hbar: f64,
}

/// A required field counts as present unless it is absent, null, false, zero or empty
fn present(value: &Option<Value>) -> Option<&Value> {
    let value = value.as_ref()?;
    let truthy = match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    };
    truthy.then_some(value)
}

pub struct LedgerOperations {
    ledger: Arc<dyn LedgerPort>,
    notifier: Arc<dyn Notifier>,
}

impl LedgerOperations {
    pub fn new(ledger: Arc<dyn LedgerPort>, notifier: Arc<dyn Notifier>) -> Self {
        Self { ledger, notifier }
    }

    pub async fn approve_allowance(&self, request: &AllowanceRequest) -> Result<TransactionReceipt, LedgerOperationError> {
        let (Some(account_id), Some(target_wallet), Some(amount)) = (
            present(&request.account_id),
            present(&request.target_wallet),
            present(&request.allowance_amount),
        ) else {
            return Err(LedgerOperationError::MissingParameters(ALLOWANCE_FIELDS));
        };

        let transaction_id = placeholder_transaction_id(Utc::now());
        let event = NotificationEvent::new(NotificationKind::AllowanceApproved)
            .with_field("accountId", account_id.clone())
            .with_field("targetWallet", target_wallet.clone())
            .with_field("allowanceAmount", amount.clone())
            .with_field("transactionId", transaction_id.clone());
        self.notifier.notify(&event).await;

        Ok(TransactionReceipt {
            message: ALLOWANCE_APPROVED_MESSAGE.to_string(),
            transaction_id,
        })
    }

    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransactionReceipt, LedgerOperationError> {
        let (Some(from_account), Some(to_account), Some(amount)) = (
            present(&request.from_account),
            present(&request.to_account),
            present(&request.amount),
        ) else {
            return Err(LedgerOperationError::MissingParameters(TRANSFER_FIELDS));
        };

        let transaction_id = placeholder_transaction_id(Utc::now());
        let event = NotificationEvent::new(NotificationKind::TransferSuccess)
            .with_field("fromAccount", from_account.clone())
            .with_field("toAccount", to_account.clone())
            .with_field("amount", amount.clone())
            .with_field("transactionId", transaction_id.clone());
        self.notifier.notify(&event).await;

        Ok(TransactionReceipt {
            message: TRANSFER_COMPLETED_MESSAGE.to_string(),
            transaction_id,
        })
    }

    pub async fn account_balance(&self, account_id: &str) -> Result<AccountBalance, LedgerPortError> {
        let result = self.lookup_balance(account_id).await;
        if let Err(e) = &result {
            error!("Balance check error for {} on {}: {}", account_id, self.ledger.network(), e);
        }
        result
    }

    async fn lookup_balance(&self, account_id: &str) -> Result<AccountBalance, LedgerPortError> {
        let account: AccountId = account_id.parse()?;
        let balance = self.ledger.account_balance(&account).await?;

        Ok(AccountBalance {
            account_id: account_id.to_string(),
            balance: balance.to_string(),
            balance_in_hbar: balance.to_hbar(),
        })
    }
}
