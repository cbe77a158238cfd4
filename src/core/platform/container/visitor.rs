// src/core/platform/container/visitor.rs
use serde::{Deserialize, Serialize};

pub const GEO_STATUS_SUCCESS: &str = "success";

/// Geolocation record for a visitor IP, shaped like the ip-api.com JSON response.
/// Any field may be missing from the response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeoLookup {
    pub status: String,
    pub message: Option<String>,
    /// IP address the lookup was performed for
    pub query: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub region_name: Option<String>,
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub timezone: Option<String>,
    pub isp: Option<String>,
    pub org: Option<String>,
}

impl GeoLookup {
    /// Fixed record used for loopback visitors instead of an external lookup
    pub fn local_development() -> Self {
        Self {
            status: GEO_STATUS_SUCCESS.to_string(),
            message: None,
            query: Some("127.0.0.1".to_string()),
            country: Some("Local Development".to_string()),
            country_code: Some("DEV".to_string()),
            region: Some("Local".to_string()),
            region_name: Some("Local Development".to_string()),
            city: Some("Localhost".to_string()),
            lat: Some(0.0),
            lon: Some(0.0),
            timezone: Some("Local/Time".to_string()),
            isp: Some("Local ISP".to_string()),
            org: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == GEO_STATUS_SUCCESS
    }

    /// Preferred human-readable region: full name first, then the short code
    pub fn display_region(&self) -> Option<&str> {
        non_empty(self.region_name.as_deref()).or_else(|| non_empty(self.region.as_deref()))
    }
}

/// True for addresses that never leave the developer's machine
pub fn is_local_address(ip: &str) -> bool {
    matches!(ip, "127.0.0.1" | "::1" | "::ffff:127.0.0.1") || ip.contains("localhost")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
