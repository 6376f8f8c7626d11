use ip_locate::{extract_first_ipv4, ipv4_at, Locator, LocatorBuilder};

/// Simplified test harness to verify every located address in a haystack.
fn check_locations(haystack: &str, expected: &[&str], validate_octets: bool) {
    let locator = LocatorBuilder::new()
        .validate_octets(validate_octets)
        .build()
        .expect("Failed to build locator");

    let actual: Vec<&str> = locator
        .find_iter(haystack)
        .map(|range| &haystack[range])
        .collect();

    assert_eq!(actual, expected, "\nFailed for haystack: {}\n", haystack);
}

#[test]
fn test_log_line_variations() {
    check_locations(
        "Accepted from 8.8.8.8:53, relayed via 192.168.1.1 and 127.0.0.1",
        &["8.8.8.8", "192.168.1.1", "127.0.0.1"],
        false,
    );
}

#[test]
fn test_loose_and_strict_octets() {
    let haystack = "bad 300.1.2.3 good 10.9.8.7";
    check_locations(haystack, &["300.1.2.3", "10.9.8.7"], false);
    check_locations(haystack, &["10.9.8.7"], true);
}

#[test]
fn test_not_addresses() {
    check_locations("version 1.2.3 or build 4.5.6", &[], false);
    check_locations("no ip here at all", &[], false);
}

#[test]
fn test_trailing_dots_end_the_match() {
    // a dot is a word boundary, so longer dotted runs still yield their first four groups
    check_locations("oid 1.2.3.4.5.6", &["1.2.3.4"], false);
}

#[test]
fn test_first_candidate_with_a_match_wins() {
    let candidates = [None, Some("visit 10.0.0.5 please"), None];
    assert_eq!(extract_first_ipv4(candidates), Some("10.0.0.5"));

    let candidates = [
        Some("nothing useful"),
        Some("first 1.1.1.1 then 2.2.2.2"),
        Some("3.3.3.3"),
    ];
    assert_eq!(extract_first_ipv4(candidates), Some("1.1.1.1"));
}

#[test]
fn test_no_candidate_matches() {
    let candidates = [Some("no ip here at all"), None, Some("")];
    assert_eq!(extract_first_ipv4(candidates), None);
}

#[test]
fn test_cursor_in_json_document() {
    let buffer = "{\n  \"client\": \"203.0.113.7\",\n  \"port\": 443\n}\n";
    let offset = buffer.find("113").unwrap();
    assert_eq!(ipv4_at(buffer, offset), Some("203.0.113.7"));

    let offset = buffer.find("443").unwrap();
    assert_eq!(ipv4_at(buffer, offset), None);
}

#[test]
fn test_global_and_default_agree() {
    let text = "gateway 10.10.0.1";
    assert_eq!(Locator::default().extract(text), Locator::global().extract(text));
}
