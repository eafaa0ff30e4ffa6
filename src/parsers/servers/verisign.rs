//! Verisign thin registries (.com, .net, .tv...)
//!
//! The registry holds dates, status and nameservers only; contacts live at the
//! registrar named by `Registrar WHOIS Server`.

use super::{ BLANK, KEY_VALUE };
use crate::parsers::{ Availability, Mapping, Property, StandardAdapter, Vocabulary };
use crate::scanner::{ Grammar, KeySource, THROTTLED_KEY, UNAVAILABLE_KEY };

pub const HOSTS: &[&str] = &["whois.verisign-grs.com", "tvwhois.verisign-grs.com", "ccwhois.verisign-grs.com"];

const NOT_FOUND: &str = "verisign:not-found";
const DISCLAIMER: &str = "disclaimer";

pub fn adapter() -> Result<StandardAdapter, regex::Error> {
    let paragraph = Grammar::builder().line(r"^\s*(.+)$", "text").build()?;

    let grammar = Grammar::builder()
        .skip(BLANK)
        .line(r#"^No match for "?(.+?)"?\.?$"#, NOT_FOUND)
        .line(r"^Your connection limit exceeded", THROTTLED_KEY)
        .line(r"(?i)^(the registry database is|whois (service|server) is) (currently |temporarily )?unavailable", UNAVAILABLE_KEY)
        .skip(r"^>>> Last update of")
        .block(r"^TERMS OF USE:", BLANK, KeySource::Fixed(DISCLAIMER.to_string()), paragraph, true)
        .skip(r"^(NOTICE|For more information|The Registry database)")
        .key_value(KEY_VALUE)
        .build()?;

    let vocabulary = Vocabulary::new()
        .map(Property::Disclaimer, Mapping::paragraph(&[DISCLAIMER]))
        .map(Property::Domain, Mapping::name(&["Domain Name"]))
        .map(Property::DomainId, Mapping::text(&["Registry Domain ID"]))
        .map(Property::Status, Mapping::tokens(&["Domain Status"]))
        .map(Property::Available, Mapping::Availability(Availability::Present(NOT_FOUND.to_string())))
        .map(Property::CreatedOn, Mapping::time(&["Creation Date"]))
        .map(Property::UpdatedOn, Mapping::time(&["Updated Date"]))
        .map(Property::ExpiresOn, Mapping::time(&["Registry Expiry Date"]))
        .map(
            Property::Registrar,
            Mapping::registrar(&["Registrar"], &["Registrar IANA ID"], &[], &["Registrar URL"])
        )
        .map(Property::Nameservers, Mapping::nameservers(&["Name Server"]))
        .referral(&["Registrar WHOIS Server"]);

    Ok(StandardAdapter::new("verisign", grammar, vocabulary))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::parsers::{ Answer, Parser, Value };

    const REGISTERED: &str = "\
   Domain Name: GOOGLE.COM
   Registry Domain ID: 2138514_DOMAIN_COM-VRSN
   Registrar WHOIS Server: whois.markmonitor.com
   Registrar URL: http://www.markmonitor.com
   Updated Date: 2019-09-09T15:39:04Z
   Creation Date: 1997-09-15T04:00:00Z
   Registry Expiry Date: 2028-09-14T04:00:00Z
   Registrar: MarkMonitor Inc.
   Registrar IANA ID: 292
   Registrar Abuse Contact Email: abusecomplaints@markmonitor.com
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited
   Domain Status: serverTransferProhibited https://icann.org/epp#serverTransferProhibited
   Name Server: NS1.GOOGLE.COM
   Name Server: NS2.GOOGLE.COM
   DNSSEC: unsigned
>>> Last update of whois database: 2024-11-20T10:12:03Z <<<

NOTICE: The expiration date displayed in this record is the date the
registrar's sponsorship of the domain name registration in the registry is
currently set to expire.

TERMS OF USE: You are not authorized to access or query our Whois
database through the use of electronic processes that are high-volume and
automated except as reasonably necessary to register domain names.
";

    const AVAILABLE: &str = "\
No match for \"U34JEDZCQ.COM\".
>>> Last update of whois database: 2024-11-20T10:12:03Z <<<
";

    const TV_NO_NAMESERVERS: &str = "\
   Domain Name: EXAMPLE-NONS.TV
   Registry Domain ID: 123456_DOMAIN_TV-VRSN
   Registrar WHOIS Server: whois.registrar.example
   Creation Date: 2010-03-04T09:11:00Z
   Registrar: Example Registrar, Inc.
   Domain Status: clientHold https://icann.org/epp#clientHold
   DNSSEC: unsigned
";

    const UNAVAILABLE: &str = "\
The Registry database is currently unavailable. Please try again later.
>>> Last update of whois database: 2024-11-20T10:12:03Z <<<
";

    fn parse(raw: &str) -> Parser {
        Parser::new(Arc::new(adapter().expect("verisign grammar")), raw)
    }

    #[test]
    fn test_registered() {
        let parser = parse(REGISTERED);

        assert_eq!(parser.domain(), Answer::Value("google.com".to_string()));
        assert_eq!(parser.available(), Answer::Value(false));
        assert_eq!(parser.registered(), Answer::Value(true));
        assert_eq!(
            parser.property(Property::Status).value().and_then(|v| v.as_text_list()),
            Some(vec!["clientDeleteProhibited".to_string(), "serverTransferProhibited".to_string()])
        );

        let registrar = parser.property(Property::Registrar).value().and_then(|v| v.as_registrar()).cloned().expect("registrar");
        assert_eq!(registrar.name.as_deref(), Some("MarkMonitor Inc."));
        assert_eq!(registrar.id.as_deref(), Some("292"));
        assert_eq!(registrar.url.as_deref(), Some("http://www.markmonitor.com"));

        assert_eq!(parser.referral(43).map(|s| s.host().to_string()), Some("whois.markmonitor.com".to_string()));
        assert!(parser.property(Property::AdminContacts).is_unsupported());

        let disclaimer = parser.property(Property::Disclaimer).value().and_then(|v| v.as_text()).map(str::to_string);
        assert!(disclaimer.is_some_and(|d| d.starts_with("TERMS OF USE: You are not authorized") && d.ends_with("register domain names.")));
    }

    #[test]
    fn test_available() {
        let parser = parse(AVAILABLE);

        assert_eq!(parser.available(), Answer::Value(true));
        assert_eq!(parser.registered(), Answer::Value(false));
        assert_eq!(parser.referral(43), None);
        assert_eq!(parser.property(Property::CreatedOn), &Answer::Absent);
    }

    #[test]
    fn test_no_nameservers_is_empty_list() {
        let parser = parse(TV_NO_NAMESERVERS);

        assert_eq!(parser.nameservers(), Answer::Value(vec![]));
        assert_eq!(parser.property(Property::Nameservers), &Answer::Value(Value::Nameservers(vec![])));
    }

    #[test]
    fn test_service_unavailable() {
        let parser = parse(UNAVAILABLE);

        assert!(parser.response_unavailable());
        assert!(!parser.response_throttled());
        assert!(parser.invalid());
        assert_eq!(parser.available(), Answer::Value(false));
        assert_eq!(parser.registered(), Answer::Value(false));
    }
}
