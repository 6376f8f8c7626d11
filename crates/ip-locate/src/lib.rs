//! Locate IPv4-shaped addresses in free text.
//!
//! `ip-locate` answers one question for an editor-style integration: given the
//! text around the user (an explicit argument, the current selection, the line
//! under the cursor, whatever was pasted), which IPv4 address did they mean?
//!
//! Addresses are recognised with the dotted-quad pattern: four runs of one to
//! three ASCII digits separated by dots, bounded by word boundaries. Octets are
//! **not** range checked by default, so `999.999.999.999` is located like any
//! other address. Use [`LocatorBuilder::validate_octets`] to reject them.
//!
//! ## Quick Start
//!
//! ```
//! use ip_locate::{extract_first_ipv4, extract_ipv4, ipv4_at};
//!
//! assert_eq!(extract_ipv4("ping 10.0.0.5 now"), Some("10.0.0.5"));
//!
//! // Candidates are scanned in priority order; the first hit wins.
//! let selection = None;
//! let clipboard = Some("visit 192.168.1.20 please");
//! assert_eq!(extract_first_ipv4([selection, clipboard]), Some("192.168.1.20"));
//!
//! // Resolve the address touching a cursor offset.
//! let buffer = "host a 8.8.8.8\nhost b 1.1.1.1";
//! assert_eq!(ipv4_at(buffer, 17), Some("1.1.1.1"));
//! ```

use std::net::Ipv4Addr;
use std::ops::Range;
use std::sync::OnceLock;

use regex_automata::meta::Regex;

/// The dotted-quad pattern.
///
/// `(?-u:\b)` keeps the word boundary ASCII-only, which is all the digits and
/// dots involved need and avoids pulling in Unicode word tables.
pub const IPV4_PATTERN: &str = r"(?-u:\b)(?:[0-9]{1,3}\.){3}[0-9]{1,3}(?-u:\b)";

static DEFAULT_LOCATOR: OnceLock<Locator> = OnceLock::new();

/// Errors raised while building a [`Locator`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The address pattern failed to compile.
    #[error("invalid address pattern: {0}")]
    Pattern(#[from] regex_automata::meta::BuildError),
}

/// A compiled address locator.
///
/// Locators are cheap to share and are meant to be built once and reused. The
/// free functions in this crate use a process-wide default instance.
#[derive(Clone, Debug)]
pub struct Locator {
    regex: Regex,
    validate_octets: bool,
}

impl Locator {
    /// The shared, loosely matching locator behind the free functions.
    pub fn global() -> &'static Locator {
        DEFAULT_LOCATOR.get_or_init(|| {
            LocatorBuilder::new()
                .build()
                .expect("dotted-quad pattern compiles")
        })
    }

    /// Iterate over the byte ranges of every address in `haystack`, left to right.
    #[inline]
    pub fn find_iter<'a>(&'a self, haystack: &'a str) -> impl Iterator<Item = Range<usize>> + 'a {
        self.regex
            .find_iter(haystack)
            .map(|m| m.range())
            .filter(move |range| self.accept(&haystack[range.clone()]))
    }

    /// Return the leftmost address in `haystack`.
    ///
    /// Any further addresses in the same text are ignored.
    #[inline]
    pub fn extract<'a>(&self, haystack: &'a str) -> Option<&'a str> {
        self.find_iter(haystack)
            .next()
            .map(|range| &haystack[range])
    }

    /// Scan `candidates` in priority order and return the first address found.
    ///
    /// Absent and empty candidates are skipped. Scanning stops at the first
    /// candidate that yields a match; later candidates are never inspected.
    pub fn extract_first<'a, I>(&self, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        candidates
            .into_iter()
            .flatten()
            .filter(|text| !text.is_empty())
            .find_map(|text| self.extract(text))
    }

    /// Return the address touching byte `offset` of `text`.
    ///
    /// Only the line containing `offset` is considered. A match touches the
    /// position when `start <= offset <= end`, so a cursor sitting just after
    /// the final digit still resolves to the address. Offsets past the end of
    /// the text or inside a multi-byte character yield `None`.
    pub fn at<'a>(&self, text: &'a str, offset: usize) -> Option<&'a str> {
        if offset > text.len() || !text.is_char_boundary(offset) {
            return None;
        }

        let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = text[offset..]
            .find('\n')
            .map_or(text.len(), |i| offset + i);
        let line = &text[line_start..line_end];
        let column = offset - line_start;

        self.find_iter(line)
            .take_while(|range| range.start <= column)
            .find(|range| column <= range.end)
            .map(|range| &line[range])
    }

    /// Return the address touching a zero-based `line` and byte `column`.
    ///
    /// Lines are split on `\n`. Positions outside the text yield `None`.
    pub fn at_position<'a>(&self, text: &'a str, line: usize, column: usize) -> Option<&'a str> {
        let line_start = line_offset(text, line)?;
        let line_len = text[line_start..]
            .find('\n')
            .unwrap_or(text.len() - line_start);
        if column > line_len {
            return None;
        }
        self.at(text, line_start + column)
    }

    #[inline(always)]
    fn accept(&self, candidate: &str) -> bool {
        !self.validate_octets || candidate.parse::<Ipv4Addr>().is_ok()
    }
}

impl Default for Locator {
    fn default() -> Self {
        Locator::global().clone()
    }
}

/// Builder for a [`Locator`] with non-default settings.
#[derive(Clone, Debug, Default)]
pub struct LocatorBuilder {
    validate_octets: bool,
}

impl LocatorBuilder {
    /// Create a builder for the loose dotted-quad locator.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject matches whose octets do not form a real IPv4 address.
    ///
    /// Off by default. When on, `999.1.1.1` is skipped and the search carries
    /// on to the next match.
    #[inline(always)]
    pub fn validate_octets(&mut self, validate: bool) -> &mut Self {
        self.validate_octets = validate;
        self
    }

    /// Compile the pattern.
    pub fn build(&self) -> Result<Locator, Error> {
        let regex = Regex::new(IPV4_PATTERN)?;
        Ok(Locator {
            regex,
            validate_octets: self.validate_octets,
        })
    }
}

/// Byte offset at which zero-based `line` starts, if the text has that many lines.
fn line_offset(text: &str, line: usize) -> Option<usize> {
    if line == 0 {
        return Some(0);
    }
    text.match_indices('\n')
        .nth(line - 1)
        .map(|(i, _)| i + 1)
}

/// Return the leftmost IPv4-shaped address in `text`.
#[inline]
pub fn extract_ipv4(text: &str) -> Option<&str> {
    Locator::global().extract(text)
}

/// Return the first address found across `candidates`, scanned in order.
///
/// See [`Locator::extract_first`].
#[inline]
pub fn extract_first_ipv4<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    Locator::global().extract_first(candidates)
}

/// Return the address touching byte `offset` of `text`.
///
/// See [`Locator::at`].
#[inline]
pub fn ipv4_at(text: &str, offset: usize) -> Option<&str> {
    Locator::global().at(text, offset)
}

/// Return the address touching a zero-based line and column of `text`.
#[inline]
pub fn ipv4_at_position(text: &str, line: usize, column: usize) -> Option<&str> {
    Locator::global().at_position(text, line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leftmost_match_wins() {
        assert_eq!(extract_ipv4("a 1.2.3.4 b 5.6.7.8"), Some("1.2.3.4"));
    }

    #[test]
    fn octets_not_range_checked() {
        assert_eq!(extract_ipv4("bogus 999.999.999.999"), Some("999.999.999.999"));
    }

    #[test]
    fn validated_locator_skips_bad_octets() {
        let locator = LocatorBuilder::new().validate_octets(true).build().unwrap();
        assert_eq!(locator.extract("999.1.1.1 then 8.8.4.4"), Some("8.8.4.4"));
        assert_eq!(locator.extract("256.0.0.1"), None);
    }

    #[test]
    fn requires_word_boundaries() {
        assert_eq!(extract_ipv4("1234.5.6.7"), None);
        assert_eq!(extract_ipv4("v1.2.3.4"), None);
        assert_eq!(extract_ipv4("(10.1.2.3)"), Some("10.1.2.3"));
    }

    #[test]
    fn empty_candidates_are_skipped() {
        assert_eq!(extract_first_ipv4([Some(""), None, Some("x 4.4.4.4")]), Some("4.4.4.4"));
        assert_eq!(extract_first_ipv4(Vec::<Option<&str>>::new()), None);
    }

    #[test]
    fn cursor_touching_either_edge() {
        let text = "addr 10.0.0.1 end";
        assert_eq!(ipv4_at(text, 5), Some("10.0.0.1"));
        assert_eq!(ipv4_at(text, 13), Some("10.0.0.1"));
        assert_eq!(ipv4_at(text, 4), None);
        assert_eq!(ipv4_at(text, 14), None);
    }

    #[test]
    fn cursor_stays_on_its_line() {
        let text = "1.1.1.1\nnothing here\n2.2.2.2";
        assert_eq!(ipv4_at(text, 10), None);
        assert_eq!(ipv4_at(text, 21), Some("2.2.2.2"));
        assert_eq!(ipv4_at(text, 7), Some("1.1.1.1"));
    }

    #[test]
    fn cursor_out_of_range() {
        assert_eq!(ipv4_at("1.1.1.1", 8), None);
        assert_eq!(ipv4_at("é 1.1.1.1", 1), None);
    }

    #[test]
    fn line_and_column() {
        let text = "first\nsecond 172.16.0.9 x\nthird";
        assert_eq!(ipv4_at_position(text, 1, 9), Some("172.16.0.9"));
        assert_eq!(ipv4_at_position(text, 0, 2), None);
        assert_eq!(ipv4_at_position(text, 1, 40), None);
        assert_eq!(ipv4_at_position(text, 7, 0), None);
    }
}
