use std::fmt;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{Error, Result};
use crate::value::{Scalar, Value};

/// Production endpoint of the ipgeolocation.io v2 lookup API.
pub const DEFAULT_ENDPOINT: &str = "https://api.ipgeolocation.io/v2/ipgeo";

/// Optional response shaping parameters passed through to the service.
///
/// Each is a comma separated list in the service's own vocabulary, for example
/// `include=security,abuse`. Empty strings count as unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub include: Option<String>,
    pub fields: Option<String>,
    pub excludes: Option<String>,
}

impl QueryOptions {
    pub fn new(include: Option<String>, fields: Option<String>, excludes: Option<String>) -> Self {
        Self {
            include: include.filter(|s| !s.is_empty()),
            fields: fields.filter(|s| !s.is_empty()),
            excludes: excludes.filter(|s| !s.is_empty()),
        }
    }
}

/// A blocking client for single geolocation lookups.
///
/// Each [`GeoClient::lookup`] issues exactly one request; nothing is retried
/// or cached.
pub struct GeoClient {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl fmt::Debug for GeoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoClient")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl GeoClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Point the client at a different base URL, e.g. a staging deployment.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query string pairs for a lookup of `ip`, in the order they are sent.
    pub fn query_pairs<'a>(
        &'a self,
        ip: &'a str,
        options: &'a QueryOptions,
    ) -> Vec<(&'static str, &'a str)> {
        let mut pairs = vec![("apiKey", self.api_key.as_str()), ("ip", ip)];
        let optional = [
            ("include", &options.include),
            ("fields", &options.fields),
            ("excludes", &options.excludes),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((name, value));
            }
        }
        pairs
    }

    /// Look up `ip` and decode the response payload.
    pub fn lookup(&self, ip: &str, options: &QueryOptions) -> Result<Value> {
        debug!(ip, endpoint = %self.endpoint, ?options, "querying geolocation service");

        let response = self
            .http
            .get(&self.endpoint)
            .query(&self.query_pairs(ip, options))
            .send()?;
        let status = response.status();
        debug!(%status, "geolocation response received");

        let body = response.text()?;
        match interpret_body(&body) {
            Ok(_) | Err(Error::Decode(_)) if !status.is_success() => Err(Error::Status {
                status: status.as_u16(),
            }),
            other => other,
        }
    }
}

/// Decode a response body.
///
/// A top-level `message` field that is set (anything but `null`, `false`, `0`
/// or `""`) marks an error payload and becomes [`Error::Service`]; anything
/// that is not JSON becomes [`Error::Decode`].
pub fn interpret_body(body: &str) -> Result<Value> {
    let payload: Value = serde_json::from_str(body)?;
    if let Some(message) = service_message(payload.get("message")) {
        return Err(Error::Service { message });
    }
    Ok(payload)
}

fn service_message(message: &Value) -> Option<String> {
    match message {
        Value::Absent => None,
        Value::Scalar(Scalar::Bool(set)) => set.then(|| "true".to_string()),
        Value::Scalar(Scalar::Number(n)) if n.as_f64() == Some(0.0) => None,
        Value::Scalar(Scalar::String(text)) if text.is_empty() => None,
        Value::Scalar(scalar) => Some(scalar.to_string()),
        Value::Sequence(_) | Value::Mapping(_) => serde_json::to_string(message).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeoClient {
        GeoClient::new("secret-key").unwrap()
    }

    #[test]
    fn query_pairs_minimal() {
        let client = client();
        let options = QueryOptions::default();
        assert_eq!(
            client.query_pairs("8.8.8.8", &options),
            [("apiKey", "secret-key"), ("ip", "8.8.8.8")]
        );
    }

    #[test]
    fn query_pairs_with_options() {
        let client = client();
        let options = QueryOptions::new(
            Some("security,abuse".to_string()),
            Some(String::new()),
            Some("currency".to_string()),
        );
        assert_eq!(options.fields, None);
        assert_eq!(
            client.query_pairs("1.1.1.1", &options),
            [
                ("apiKey", "secret-key"),
                ("ip", "1.1.1.1"),
                ("include", "security,abuse"),
                ("excludes", "currency"),
            ]
        );
    }

    #[test]
    fn debug_hides_api_key() {
        let shown = format!("{:?}", client());
        assert!(!shown.contains("secret-key"));
        assert!(shown.contains(DEFAULT_ENDPOINT));
    }

    #[test]
    fn endpoint_override() {
        let client = client().with_endpoint("http://127.0.0.1:9/ipgeo");
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/ipgeo");
    }

    #[test]
    fn message_field_is_a_service_error() {
        let err = interpret_body(r#"{"message": "Provided API key is not valid."}"#).unwrap_err();
        assert!(matches!(err, Error::Service { .. }));
        assert_eq!(err.to_string(), "Provided API key is not valid.");
    }

    #[test]
    fn empty_message_is_not_an_error() {
        let payload = interpret_body(r#"{"message": "", "ip": "8.8.8.8"}"#).unwrap();
        assert_eq!(payload.get("ip").as_str(), Some("8.8.8.8"));
    }

    #[test]
    fn any_set_message_is_a_service_error() {
        let err = interpret_body(r#"{"message": 403}"#).unwrap_err();
        assert_eq!(err.to_string(), "403");

        let err = interpret_body(r#"{"message": {"code": 429, "text": "slow down"}}"#).unwrap_err();
        assert!(matches!(err, Error::Service { .. }));
        assert_eq!(err.to_string(), r#"{"code":429,"text":"slow down"}"#);

        for unset in ["null", "false", "0", "0.0", r#""""#] {
            let body = format!(r#"{{"message": {unset}, "ip": "8.8.8.8"}}"#);
            assert!(interpret_body(&body).is_ok(), "{body}");
        }
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(interpret_body("<html>502</html>"), Err(Error::Decode(_))));
    }
}
