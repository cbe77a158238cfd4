// tests/common/mod.rs - shared helpers for integration tests
#![allow(dead_code)]

use std::sync::Once;

use hbar_relay::config::application_settings::{Secret, Settings};
use hbar_relay::core::platform::container::ledger::LedgerNetwork;

pub const TEST_BOT_TOKEN: &str = "123456:test-token";
pub const TEST_CHAT_ID: &str = "-100200300";

/// Path Telegram's sendMessage lives at for the test token
pub const SEND_MESSAGE_PATH: &str = "/bot123456:test-token/sendMessage";

static INIT: Once = Once::new();

/// Initialize logging once for all tests
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Testnet settings with every outbound service pointed at the given base URLs
pub fn settings_for(telegram_url: &str, geolocation_url: &str, mirror_url: &str) -> Settings {
    Settings {
        hedera_network: LedgerNetwork::Testnet,
        mirror_node_url: Some(mirror_url.to_string()),
        telegram_bot_token: Some(Secret::from(TEST_BOT_TOKEN)),
        telegram_chat_id: Some(TEST_CHAT_ID.to_string()),
        telegram_api_url: telegram_url.to_string(),
        geolocation_api_url: geolocation_url.to_string(),
        request_timeout_seconds: 5,
        ..Settings::default()
    }
}
