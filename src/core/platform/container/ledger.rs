/*
Ledger Container Module

Value types for talking about the Hedera ledger: which network we are bound to,
account identifiers in `shard.realm.num` form, and HBAR amounts held as tinybars.
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 1 HBAR = 100,000,000 tinybars
pub const TINYBARS_PER_HBAR: i64 = 100_000_000;

/// Payer prefix of the synthetic transaction ids handed out by the placeholder endpoints
pub const PLACEHOLDER_PAYER: &str = "0.0.123456";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerDomainError {
    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("unknown ledger network: {0}")]
    UnknownNetwork(String),
}

/// Named Hedera network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LedgerNetwork {
    #[default]
    Mainnet,
    Testnet,
    Previewnet,
}

impl LedgerNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Previewnet => "previewnet",
        }
    }

    /// Public mirror node serving this network's REST API
    pub fn mirror_node_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://mainnet-public.mirrornode.hedera.com",
            Self::Testnet => "https://testnet.mirrornode.hedera.com",
            Self::Previewnet => "https://previewnet.mirrornode.hedera.com",
        }
    }

    /// HashScan explorer root for this network
    pub fn explorer_url(&self) -> String {
        format!("https://hashscan.io/{}", self.as_str())
    }
}

impl FromStr for LedgerNetwork {
    type Err = LedgerDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "previewnet" => Ok(Self::Previewnet),
            other => Err(LedgerDomainError::UnknownNetwork(other.to_string())),
        }
    }
}

impl TryFrom<String> for LedgerNetwork {
    type Error = LedgerDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LedgerNetwork> for String {
    fn from(network: LedgerNetwork) -> Self {
        network.as_str().to_string()
    }
}

impl fmt::Display for LedgerNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account identifier in `shard.realm.num` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl FromStr for AccountId {
    type Err = LedgerDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerDomainError::InvalidAccountId(s.to_string());

        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Self {
            shard: numbers[0],
            realm: numbers[1],
            num: numbers[2],
        })
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

/// An HBAR amount, stored as tinybars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Hbar {
    tinybars: i64,
}

impl Hbar {
    pub fn from_tinybars(tinybars: i64) -> Self {
        Self { tinybars }
    }

    pub fn tinybars(&self) -> i64 {
        self.tinybars
    }

    pub fn to_hbar(&self) -> f64 {
        self.tinybars as f64 / TINYBARS_PER_HBAR as f64
    }
}

impl fmt::Display for Hbar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Small amounts read better in tinybars
        if self.tinybars.unsigned_abs() < 10_000 {
            return write!(f, "{} tℏ", self.tinybars);
        }

        let sign = if self.tinybars < 0 { "-" } else { "" };
        let abs = self.tinybars.unsigned_abs();
        let per_hbar = TINYBARS_PER_HBAR as u64;
        let whole = abs / per_hbar;
        let fraction = abs % per_hbar;

        if fraction == 0 {
            write!(f, "{sign}{whole} ℏ")
        } else {
            let digits = format!("{fraction:08}");
            write!(f, "{sign}{whole}.{} ℏ", digits.trim_end_matches('0'))
        }
    }
}

/// Synthetic transaction id of the form `0.0.123456@<unix-millis>`.
///
/// The allowance and transfer endpoints do not sign or submit anything; this id only
/// gives callers and notifications something stable to refer to.
pub fn placeholder_transaction_id(at: DateTime<Utc>) -> String {
    format!("{}@{}", PLACEHOLDER_PAYER, at.timestamp_millis())
}
