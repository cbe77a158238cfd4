/*
Mirror Node Ledger Adapter

Implements the LedgerPort using the Hedera mirror node REST API:

    GET {mirror}/api/v1/balances?account.id=<shard.realm.num>

The mirror node answers with a page of balance entries; an empty page means the
account does not exist on this network.
*/

use crate::application::ports::output::ledger_port::{LedgerPort, LedgerPortError, LedgerPortResult};
use crate::core::platform::container::ledger::{AccountId, Hbar, LedgerNetwork};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    #[serde(default)]
    balances: Vec<AccountBalanceEntry>,
}

#[derive(Debug, Deserialize)]
struct AccountBalanceEntry {
    account: String,
    /// Tinybars
    balance: i64,
}

#[derive(Debug, Clone)]
pub struct MirrorNodeLedgerAdapter {
    network: LedgerNetwork,
    base_url: String,
    client: reqwest::Client,
}

impl MirrorNodeLedgerAdapter {
    /// Adapter for `network`, using `mirror_url` instead of the public mirror when given
    pub fn new(network: LedgerNetwork, mirror_url: Option<&str>, client: reqwest::Client) -> Self {
        let base_url = mirror_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| network.mirror_node_url())
            .trim_end_matches('/')
            .to_string();

        Self {
            network,
            base_url,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn balances_url(&self) -> String {
        format!("{}/api/v1/balances", self.base_url)
    }
}

#[async_trait]
impl LedgerPort for MirrorNodeLedgerAdapter {
    fn network(&self) -> LedgerNetwork {
        self.network
    }

    async fn account_balance(&self, account: &AccountId) -> LedgerPortResult<Hbar> {
        let account_str = account.to_string();
        debug!("Querying {} balance for {}", self.network, account_str);

        let response = self
            .client
            .get(self.balances_url())
            .query(&[("account.id", account_str.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerPortError::Status(status.as_u16()));
        }

        let page: BalancesResponse = response.json().await?;
        page.balances
            .into_iter()
            .find(|entry| entry.account == account_str)
            .map(|entry| Hbar::from_tinybars(entry.balance))
            .ok_or(LedgerPortError::AccountNotFound(*account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn adapter_for(server: &Server) -> MirrorNodeLedgerAdapter {
        let url = server.url();
        MirrorNodeLedgerAdapter::new(LedgerNetwork::Testnet, Some(url.as_str()), reqwest::Client::new())
    }

    fn account(id: &str) -> AccountId {
        id.parse().unwrap()
    }

    #[test]
    fn test_defaults_to_public_mirror() {
        let adapter = MirrorNodeLedgerAdapter::new(LedgerNetwork::Mainnet, None, reqwest::Client::new());
        assert_eq!(adapter.base_url(), "https://mainnet-public.mirrornode.hedera.com");
        assert_eq!(adapter.network(), LedgerNetwork::Mainnet);
    }

    #[tokio::test]
    async fn test_account_balance() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/balances")
            .match_query(Matcher::UrlEncoded("account.id".into(), "0.0.1001".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"timestamp":"1705339845.000000000","balances":[{"account":"0.0.1001","balance":1250000000,"tokens":[]}],"links":{"next":null}}"#)
            .create_async()
            .await;

        let balance = adapter_for(&server).account_balance(&account("0.0.1001")).await.unwrap();

        assert_eq!(balance.tinybars(), 1_250_000_000);
        assert_eq!(balance.to_string(), "12.5 ℏ");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/balances")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"balances":[],"links":{"next":null}}"#)
            .create_async()
            .await;

        let result = adapter_for(&server).account_balance(&account("0.0.404")).await;

        match result {
            Err(e @ LedgerPortError::AccountNotFound(_)) => assert_eq!(e.to_string(), "account 0.0.404 not found"),
            other => panic!("expected AccountNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/balances")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let result = adapter_for(&server).account_balance(&account("0.0.1001")).await;
        assert!(matches!(result, Err(LedgerPortError::Status(503))));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/balances")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = adapter_for(&server).account_balance(&account("0.0.1001")).await;
        assert!(matches!(result, Err(LedgerPortError::Request(_))));
    }
}
