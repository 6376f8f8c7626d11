use std::io;

use termcolor::WriteColor;

use crate::render::{render_primitive, render_section, Line};
use crate::value::Value;

/// Heading printed above every report.
pub const BANNER: &str = "IP GEOLOCATION INSPECTOR";

/// Width of the rule printed under the banner.
pub const BANNER_RULE_WIDTH: usize = 44;

/// Flat top-level fields, as (label, payload key).
pub const PRIMITIVES: &[(&str, &str)] = &[("IP Address", "ip"), ("Hostname", "hostname")];

/// Top-level sections in display order, as (title, payload key).
pub const SECTIONS: &[(&str, &str)] = &[
    ("Location", "location"),
    ("Country Metadata", "country_metadata"),
    ("Network", "network"),
    ("Currency", "currency"),
    ("Security", "security"),
    ("Abuse", "abuse"),
    ("Time Zone", "time_zone"),
    ("User Agent", "user_agent"),
];

/// A geolocation response laid out for reading.
///
/// The report borrows the payload; lines are produced on demand and written
/// to whatever sink the caller hands in.
#[derive(Debug)]
pub struct Report<'a> {
    payload: &'a Value,
}

impl<'a> Report<'a> {
    pub fn new(payload: &'a Value) -> Self {
        Self { payload }
    }

    /// Lines for the payload itself: the flat fields, then each known section.
    ///
    /// Keys outside the known set are not shown.
    pub fn body(&self) -> Vec<Line> {
        let mut out = Vec::new();
        for (label, key) in PRIMITIVES {
            render_primitive(&mut out, label, self.payload.get(key));
        }
        for (title, key) in SECTIONS {
            render_section(&mut out, title, self.payload.get(key));
        }
        out
    }

    /// The full report: banner, rule, a blank line, then [`Report::body`].
    pub fn lines(&self) -> Vec<Line> {
        let mut out = vec![
            Line::Title(BANNER.to_string()),
            Line::Rule(BANNER_RULE_WIDTH),
            Line::Blank,
        ];
        out.extend(self.body());
        out
    }

    /// Write the full report, one line at a time, to `wtr`.
    pub fn write<W: WriteColor + ?Sized>(&self, wtr: &mut W) -> io::Result<()> {
        for line in self.lines() {
            line.write_colored(wtr)?;
        }
        wtr.flush()
    }
}

impl std::fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_strings(json: &str) -> Vec<String> {
        let payload: Value = json.parse().unwrap();
        Report::new(&payload)
            .body()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn primitives_then_sections_in_fixed_order() {
        let lines = body_strings(
            r#"{
                "security": {"is_vpn": false},
                "ip": "8.8.8.8",
                "location": {"city": "Mountain View"},
                "hostname": "dns.google"
            }"#,
        );
        assert_eq!(
            lines,
            [
                "IP Address: 8.8.8.8",
                "Hostname: dns.google",
                "",
                "LOCATION",
                "────────────────",
                "  City: Mountain View",
                "",
                "SECURITY",
                "────────────────",
                "  Is Vpn: No",
            ]
        );
    }

    #[test]
    fn unknown_top_level_keys_are_ignored() {
        let lines = body_strings(r#"{"ip": "1.1.1.1", "extra": {"a": 1}, "hostname": ""}"#);
        assert_eq!(lines, ["IP Address: 1.1.1.1"]);
    }

    #[test]
    fn banner_precedes_body() {
        let payload: Value = r#"{"ip": "1.1.1.1"}"#.parse().unwrap();
        let text = Report::new(&payload).to_string();
        assert_eq!(
            text,
            format!("{BANNER}\n{}\n\nIP Address: 1.1.1.1\n", "─".repeat(BANNER_RULE_WIDTH))
        );
    }

    #[test]
    fn plain_writer_matches_display() {
        let payload: Value = r#"{"ip": "1.1.1.1", "time_zone": {"name": "UTC", "is_dst": false}}"#
            .parse()
            .unwrap();
        let report = Report::new(&payload);
        let mut buf = termcolor::NoColor::new(Vec::new());
        report.write(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf.into_inner()).unwrap(), report.to_string());
    }
}
