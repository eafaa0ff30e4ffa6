//! Generic ICANN registrar format, the fallback for unknown servers
//!
//! gTLD registrars answer with the `Registrant Name:` / `Admin Email:` field
//! layout required by the Registrar Accreditation Agreement, so a single
//! vocabulary covers most of them.

use super::KEY_VALUE;
use crate::parsers::{ Availability, Mapping, Property, StandardAdapter, Vocabulary };
use crate::scanner::{ Grammar, INCOMPLETE_KEY, THROTTLED_KEY, UNAVAILABLE_KEY };

const NOT_FOUND: &str = "icann:not-found";

pub fn adapter() -> Result<StandardAdapter, regex::Error> {
    let grammar = Grammar::builder()
        .skip(r"^\s*$")
        .line(
            r"(?i)^\s*(no match for|not found|domain not found|no data found|the queried object does not exist)",
            NOT_FOUND
        )
        .line(r"(?i)(rate limit exceeded|query limit exceeded|too many requests)", THROTTLED_KEY)
        .line(r"(?i)service (is )?(currently |temporarily )?unavailable", UNAVAILABLE_KEY)
        .line(r"(?i)(response|output|results?) (was |has been )?truncated", INCOMPLETE_KEY)
        .skip(r"^>>>")
        .skip(r"^(NOTICE|TERMS OF USE|For more information)")
        .key_value(KEY_VALUE)
        .build()?;

    let vocabulary = Vocabulary::new()
        .map(Property::Domain, Mapping::name(&["Domain Name", "domain"]))
        .map(Property::DomainId, Mapping::text(&["Registry Domain ID"]))
        .map(Property::Status, Mapping::tokens(&["Domain Status"]))
        .map(Property::Available, Mapping::Availability(Availability::Present(NOT_FOUND.to_string())))
        .map(Property::CreatedOn, Mapping::time(&["Creation Date"]))
        .map(Property::UpdatedOn, Mapping::time(&["Updated Date"]))
        .map(Property::ExpiresOn, Mapping::time(&["Registrar Registration Expiration Date", "Registry Expiry Date"]))
        .map(
            Property::Registrar,
            Mapping::registrar(&["Registrar"], &["Registrar IANA ID"], &[], &["Registrar URL"])
        )
        .map(Property::RegistrantContacts, Mapping::contact_prefix("Registrant "))
        .map(Property::AdminContacts, Mapping::contact_prefix("Admin "))
        .map(Property::TechnicalContacts, Mapping::contact_prefix("Tech "))
        .map(Property::Nameservers, Mapping::nameservers(&["Name Server"]))
        .referral(&["Registrar WHOIS Server"]);

    Ok(StandardAdapter::new("icann", grammar, vocabulary))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::parsers::{ Answer, ContactType, Parser };

    const REGISTRAR: &str = "\
Domain Name: google.com
Registry Domain ID: 2138514_DOMAIN_COM-VRSN
Registrar WHOIS Server: whois.markmonitor.com
Registrar URL: http://www.markmonitor.com
Updated Date: 2019-09-09T15:39:04+0000
Creation Date: 1997-09-15T07:00:00+0000
Registrar Registration Expiration Date: 2028-09-13T07:00:00+0000
Registrar: MarkMonitor, Inc.
Registrar IANA ID: 292
Domain Status: clientUpdateProhibited (https://www.icann.org/epp#clientUpdateProhibited)
Registrant Organization: Google LLC
Registrant State/Province: CA
Registrant Country: US
Registrant Email: Select Request Email Form at https://domains.markmonitor.com/whois/google.com
Admin Organization: Google LLC
Admin Country: US
Tech Organization: Google LLC
Name Server: ns1.google.com
Name Server: ns2.google.com
DNSSEC: unsigned
>>> Last update of WHOIS database: 2024-11-20T10:05:15+0000 <<<
";

    fn parse(raw: &str) -> Parser {
        Parser::new(Arc::new(adapter().expect("icann grammar")), raw)
    }

    #[test]
    fn test_registrar_record() {
        let parser = parse(REGISTRAR);

        assert_eq!(parser.domain(), Answer::Value("google.com".to_string()));
        assert_eq!(parser.registered(), Answer::Value(true));
        assert_eq!(
            parser.property(Property::ExpiresOn).value().and_then(|v| v.as_time()).map(|t| t.date_naive().to_string()),
            Some("2028-09-13".to_string())
        );
        assert_eq!(
            parser.property(Property::Status).value().and_then(|v| v.as_text_list()),
            Some(vec!["clientUpdateProhibited".to_string()])
        );

        let registrant = parser.property(Property::RegistrantContacts).value().and_then(|v| v.as_contacts()).expect("registrant");
        assert_eq!(registrant.len(), 1);
        assert_eq!(registrant[0].contact_type, Some(ContactType::Registrant));
        assert_eq!(registrant[0].organization.as_deref(), Some("Google LLC"));
        assert_eq!(registrant[0].state.as_deref(), Some("CA"));
        assert_eq!(registrant[0].country_code.as_deref(), Some("US"));

        let nameservers = parser.nameservers().into_value().expect("nameservers");
        assert_eq!(nameservers.len(), 2);

        // Registrars usually name themselves here
        assert_eq!(parser.referral(43).map(|s| s.host().to_string()), Some("whois.markmonitor.com".to_string()));
    }

    #[test]
    fn test_not_found_variants() {
        for raw in ["No match for \"EXAMPLE.COM\".", "NOT FOUND", "Domain not found.", "No Data Found"] {
            let parser = parse(raw);
            assert_eq!(parser.available(), Answer::Value(true), "{raw}");
        }
    }

    #[test]
    fn test_rate_limited() {
        let parser = parse("WHOIS LIMIT EXCEEDED - query rate limit exceeded, try again later\n");

        assert!(parser.response_throttled());
        assert_eq!(parser.available(), Answer::Value(false));
        assert_eq!(parser.registered(), Answer::Value(false));
    }

    #[test]
    fn test_service_unavailable() {
        let parser = parse("WHOIS service is temporarily unavailable, please retry\n");

        assert!(parser.response_unavailable());
        assert!(parser.invalid());
        assert_eq!(parser.registered(), Answer::Value(false));
    }

    #[test]
    fn test_truncated_output() {
        let raw = "Domain Name: google.com\nName Server: ns1.google.com\n% Output truncated, too many name servers\n";
        let parser = parse(raw);

        assert!(parser.response_incomplete());
        // Incomplete data is still data
        assert!(!parser.invalid());
        assert_eq!(parser.domain(), Answer::Value("google.com".to_string()));
        assert_eq!(parser.registered(), Answer::Value(true));
    }
}
