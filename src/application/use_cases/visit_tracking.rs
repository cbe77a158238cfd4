/*
Visit Tracking

Resolves a visitor IP to a location and announces the visit:
1. Loopback visitors get the fixed local-development record, no lookup is made
2. Everyone else goes through the GeolocationPort
3. A successful lookup produces one WebsiteVisit notification; a failed lookup
   is reported in-band and announces nothing
*/

use crate::application::ports::output::geolocation_port::{GeolocationPort, GeolocationPortError};
use crate::application::ports::output::notification_port::{NotificationEvent, NotificationKind, Notifier};
use crate::core::platform::container::visitor::{is_local_address, GeoLookup};
use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;

pub const VISIT_TRACKED_MESSAGE: &str = "Visit tracked successfully";
pub const LOCATION_UNKNOWN_MESSAGE: &str = "Could not determine location";

const UNKNOWN: &str = "Unknown";
const UNKNOWN_ISP: &str = "Unknown ISP";
const UNKNOWN_BROWSER: &str = "Unknown Browser";

#[derive(Debug, thiserror::Error)]
pub enum VisitTrackingError {
    #[error("Geolocation lookup failed: {0}")]
    Geolocation(#[from] GeolocationPortError),
}

/// What the delivery layer knows about a visitor
#[derive(Debug, Clone, Default)]
pub struct VisitRequest {
    pub ip: String,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisitOutcome {
    /// Visit announced; `location` reads `"<city>, <country>"`
    Tracked { location: String },
    /// The geolocation service could not place the IP
    Unlocated,
}

pub struct VisitTracker {
    geolocation: Arc<dyn GeolocationPort>,
    notifier: Arc<dyn Notifier>,
}

impl VisitTracker {
    pub fn new(geolocation: Arc<dyn GeolocationPort>, notifier: Arc<dyn Notifier>) -> Self {
        Self { geolocation, notifier }
    }

    pub async fn track(&self, request: &VisitRequest) -> Result<VisitOutcome, VisitTrackingError> {
        let lookup = if is_local_address(&request.ip) {
            debug!("Local visitor {}, skipping geolocation", request.ip);
            GeoLookup::local_development()
        } else {
            self.geolocation.locate(&request.ip).await?
        };

        if !lookup.is_success() {
            info!(
                "IP geolocation failed for {}: {}",
                request.ip,
                lookup.message.as_deref().unwrap_or(UNKNOWN)
            );
            return Ok(VisitOutcome::Unlocated);
        }

        let event = visit_event(&lookup, request);
        let location = format!(
            "{}, {}",
            text_or(lookup.city.as_deref(), UNKNOWN),
            text_or(lookup.country.as_deref(), UNKNOWN)
        );

        self.notifier.notify(&event).await;
        Ok(VisitOutcome::Tracked { location })
    }
}

fn visit_event(lookup: &GeoLookup, request: &VisitRequest) -> NotificationEvent {
    NotificationEvent::new(NotificationKind::WebsiteVisit)
        .with_field("ip", text_or(lookup.query.as_deref(), &request.ip))
        .with_field("city", text_or(lookup.city.as_deref(), UNKNOWN))
        .with_field("region", lookup.display_region().unwrap_or(UNKNOWN))
        .with_field("country", text_or(lookup.country.as_deref(), UNKNOWN))
        .with_field("countryCode", lookup.country_code.clone().unwrap_or_default())
        .with_field("isp", text_or(lookup.isp.as_deref(), UNKNOWN_ISP))
        .with_field("timezone", text_or(lookup.timezone.as_deref(), UNKNOWN))
        .with_field("lat", coordinate(lookup.lat))
        .with_field("lon", coordinate(lookup.lon))
        .with_field("userAgent", text_or(request.user_agent.as_deref(), UNKNOWN_BROWSER))
}

fn text_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|s| !s.is_empty()).unwrap_or(fallback)
}

/// Whole degrees render without a trailing `.0`
fn coordinate(value: Option<f64>) -> Value {
    match value {
        Some(v) if v.is_finite() && v.fract() != 0.0 => Value::from(v),
        Some(v) if v.is_finite() => Value::from(v as i64),
        _ => Value::from(0),
    }
}
