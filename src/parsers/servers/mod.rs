//! Built-in server families
//!
//! Each family module exposes its host names and an `adapter()` constructor.
//! Grammars are compiled from literal patterns, so construction only fails if
//! one of them is malformed.

pub mod arin;
pub mod iana;
pub mod icann;
pub mod nic_at;
pub mod ripe;
pub mod verisign;

use std::sync::Arc;

use super::Adapter;

/// `key: value` with the key ending at the first colon
pub(crate) const KEY_VALUE: &str = r"^\s*(?P<key>[^:%#>][^:]*?):\s*(?P<value>.*)$";

/// Blank lines carry no data in any family
pub(crate) const BLANK: &str = r"^\s*$";

/// One built-in family and the hosts it serves
pub struct Family {
    pub hosts: &'static [&'static str],
    pub adapter: Arc<dyn Adapter>,
}

/// Every built-in family; the generic ICANN adapter is not included since it
/// is the catalog fallback
pub fn families() -> Result<Vec<Family>, regex::Error> {
    Ok(vec![
        Family { hosts: iana::HOSTS, adapter: Arc::new(iana::adapter()?) },
        Family { hosts: verisign::HOSTS, adapter: Arc::new(verisign::adapter()?) },
        Family { hosts: nic_at::HOSTS, adapter: Arc::new(nic_at::adapter()?) },
        Family { hosts: arin::HOSTS, adapter: Arc::new(arin::adapter()?) },
        Family { hosts: ripe::HOSTS, adapter: Arc::new(ripe::adapter()?) }
    ])
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::parsers::{ Answer, Catalog, Parser };

    /// Host, response, and whether the response reports an error
    const RESPONSES: &[(&str, &str, bool)] = &[
        ("whois.iana.org", "domain:       COM\nstatus:       ACTIVE\ncreated:      1985-01-01\n", false),
        ("whois.iana.org", "% This query returned 0 objects.\n", false),
        ("whois.verisign-grs.com", "   Domain Name: GOOGLE.COM\n   Registrar: MarkMonitor Inc.\n", false),
        ("whois.verisign-grs.com", "No match for \"NOPE-4242.COM\".\n", false),
        ("whois.verisign-grs.com", "The Registry database is currently unavailable.\n", false),
        ("whois.arin.net", "NetRange:       8.8.8.0 - 8.8.8.255\nNetHandle:      NET-8-8-8-0-2\n", false),
        ("whois.arin.net", "No match found for n + 192.0.2.1.\n", false),
        ("whois.example-registrar.net", "Domain Name: example.com\nCreation Date: 2015-05-05T00:00:00Z\n", false),
        ("whois.example-registrar.net", "No match for domain \"nope-4242.com\".\n", false),
        ("whois.example-registrar.net", "Too many requests, try again later\nDomain Name: example.com\n", false),
        ("whois.nic.at", "domain:         google.at\nregistrant:     GI7803022-NICAT\n", false),
        ("whois.nic.at", "% nothing found\n", false),
        ("whois.nic.at", "% Error: 55000000001 Invalid query\nStatus: free\n", true),
        ("whois.nic.at", "% Error: 55000000002 Connection refused; access control limit reached.\n", false),
        ("whois.ripe.net", "inetnum:        193.0.0.0 - 193.0.7.255\nstatus:         ASSIGNED PA\n", false),
        ("whois.ripe.net", "%ERROR:101: no entries found\n", false),
        ("whois.ripe.net", "%ERROR:102: parameter is missing\nstatus:         ASSIGNED PA\n", true),
    ];

    #[test]
    fn test_every_family_keeps_availability_consistent() {
        let catalog = Catalog::builtin().expect("catalog");
        let mut covered: BTreeSet<String> = BTreeSet::new();

        for (host, raw, expect_error) in RESPONSES {
            let parser = Parser::new(catalog.adapter_for(host), raw);
            covered.insert(parser.adapter_name().to_string());

            assert_eq!(parser.response_error(), *expect_error, "error flag for {host}: {raw:?}");
            if parser.response_error() {
                assert!(parser.invalid(), "{host} error response must be invalid");
                assert_ne!(parser.available(), Answer::Value(true), "{host} error response claims availability");
            }
            if parser.invalid() {
                assert_ne!(parser.registered(), Answer::Value(true), "{host} invalid response claims registration");
            } else if let (Answer::Value(available), Answer::Value(registered)) = (parser.available(), parser.registered()) {
                assert_ne!(available, registered, "{host} answers available={available} registered={registered}");
            }
        }

        let mut expected: BTreeSet<String> = families()
            .expect("families")
            .iter()
            .map(|family| family.adapter.name().to_string())
            .collect();
        expected.insert("icann".to_string());
        assert_eq!(covered, expected);
    }
}
