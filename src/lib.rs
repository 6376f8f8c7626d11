//! Locate an IPv4 address in editor context and inspect its geolocation record.
//!
//! The library is split along the two jobs an inspection has:
//!
//! - finding the address the user means, among several ranked candidate texts
//!   (see [`input::Candidates`] and the [`ip_locate`] crate), and
//! - turning the schema-less JSON answer of the geolocation service into
//!   indented, human-readable lines (see [`render`] and [`report::Report`]).
//!
//! Talking to the service itself is a thin blocking wrapper in [`client`].
//!
//! # Examples
//!
//! Rendering a saved response:
//!
//! ```rust
//! use ipgeo_inspect::{Report, Value};
//!
//! let payload: Value = r#"{"ip": "8.8.8.8", "security": {"is_vpn": false}}"#.parse()?;
//! let text = Report::new(&payload).to_string();
//! assert!(text.contains("IP Address: 8.8.8.8"));
//! assert!(text.contains("  Is Vpn: No"));
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod report;
pub mod value;

pub use crate::client::{GeoClient, QueryOptions};
pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::report::Report;
pub use crate::value::{Map, Scalar, Value};
pub use ip_locate::{extract_first_ipv4, extract_ipv4, ipv4_at, ipv4_at_position, Locator, LocatorBuilder};
