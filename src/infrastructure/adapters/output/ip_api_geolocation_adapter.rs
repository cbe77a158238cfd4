use crate::application::ports::output::geolocation_port::{
    GeolocationPort, GeolocationPortError, GeolocationPortResult,
};
use crate::core::platform::container::visitor::GeoLookup;
use async_trait::async_trait;

pub const DEFAULT_GEOLOCATION_API_URL: &str = "http://ip-api.com";

/// Fields requested from ip-api.com; everything `GeoLookup` knows about
const LOOKUP_FIELDS: &str =
    "status,message,country,countryCode,region,regionName,city,lat,lon,timezone,isp,org,query";

/// Geolocation adapter for the ip-api.com JSON endpoint
#[derive(Debug, Clone)]
pub struct IpApiGeolocationAdapter {
    base_url: String,
    client: reqwest::Client,
}

impl IpApiGeolocationAdapter {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn lookup_url(&self, ip: &str) -> String {
        format!(
            "{}/json/{}?fields={}",
            self.base_url,
            urlencoding::encode(ip),
            LOOKUP_FIELDS
        )
    }
}

#[async_trait]
impl GeolocationPort for IpApiGeolocationAdapter {
    async fn locate(&self, ip: &str) -> GeolocationPortResult<GeoLookup> {
        let response = self.client.get(self.lookup_url(ip)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeolocationPortError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}
