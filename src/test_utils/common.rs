use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::application::ports::output::geolocation_port::{
    GeolocationPort, GeolocationPortError, GeolocationPortResult,
};
use crate::application::ports::output::ledger_port::{LedgerPort, LedgerPortError, LedgerPortResult};
use crate::application::ports::output::notification_port::{NotificationEvent, Notifier};
use crate::core::platform::container::ledger::{AccountId, Hbar, LedgerNetwork};
use crate::core::platform::container::visitor::GeoLookup;
use crate::delivery::api_server::AppState;

/// Notifier that keeps every event it is handed
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &NotificationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Ledger where every account holds the same balance, or none exists
pub struct FixedLedger {
    pub tinybars: Option<i64>,
}

#[async_trait]
impl LedgerPort for FixedLedger {
    fn network(&self) -> LedgerNetwork {
        LedgerNetwork::Testnet
    }

    async fn account_balance(&self, account: &AccountId) -> LedgerPortResult<Hbar> {
        self.tinybars
            .map(Hbar::from_tinybars)
            .ok_or(LedgerPortError::AccountNotFound(*account))
    }
}

/// Answers every lookup with a canned result, or a 503 when there is none
pub struct CannedGeolocation {
    pub answer: Option<GeoLookup>,
    pub calls: Mutex<Vec<String>>,
}

impl CannedGeolocation {
    pub fn new(answer: Option<GeoLookup>) -> Self {
        Self {
            answer,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GeolocationPort for CannedGeolocation {
    async fn locate(&self, ip: &str) -> GeolocationPortResult<GeoLookup> {
        self.calls.lock().unwrap().push(ip.to_string());
        self.answer.clone().ok_or(GeolocationPortError::Status(503))
    }
}

pub fn berlin_lookup() -> GeoLookup {
    GeoLookup {
        status: "success".to_string(),
        query: Some("203.0.113.7".to_string()),
        country: Some("Germany".to_string()),
        country_code: Some("DE".to_string()),
        region: Some("BE".to_string()),
        region_name: Some("Berlin".to_string()),
        city: Some("Berlin".to_string()),
        lat: Some(52.52),
        lon: Some(13.405),
        timezone: Some("Europe/Berlin".to_string()),
        isp: Some("Example GmbH".to_string()),
        ..Default::default()
    }
}

/// Application state over in-memory ports
pub fn stub_state(
    tinybars: Option<i64>,
    geolocation: Arc<CannedGeolocation>,
    notifier: Arc<RecordingNotifier>,
) -> AppState {
    AppState::new(Arc::new(FixedLedger { tinybars }), geolocation, notifier)
}
