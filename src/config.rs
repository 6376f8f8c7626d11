use ip_locate::{Locator, LocatorBuilder};
use tracing::debug;

use crate::client::{GeoClient, QueryOptions, DEFAULT_ENDPOINT};
use crate::error::{Error, Result};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "IPGEOLOCATION_API_KEY";

/// Resolved settings for talking to the geolocation service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: String,
    /// Reject dotted quads with an octet above 255.
    pub strict_octets: bool,
    pub query: QueryOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            strict_octets: false,
            query: QueryOptions::default(),
        }
    }
}

impl Config {
    /// Build a client from these settings.
    ///
    /// Fails with [`Error::MissingApiKey`] when no non-blank key is configured.
    pub fn client(&self) -> Result<GeoClient> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingApiKey)?;

        debug!(endpoint = %self.endpoint, "building geolocation client");
        Ok(GeoClient::new(api_key)?.with_endpoint(self.endpoint.clone()))
    }

    /// The locator used to pick addresses out of candidate texts.
    pub fn locator(&self) -> Result<Locator> {
        if !self.strict_octets {
            return Ok(Locator::global().clone());
        }
        Ok(LocatorBuilder::new().validate_octets(true).build()?)
    }
}
