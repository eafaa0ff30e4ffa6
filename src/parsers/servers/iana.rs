//! whois.iana.org: root of every chain, refers on through `refer:`

use super::{ BLANK, KEY_VALUE };
use crate::parsers::{ Adapter, Answer, Availability, Mapping, Property, StandardAdapter, Value, Vocabulary };
use crate::resolver::directory::ServerId;
use crate::scanner::{ Grammar, KeySource, NodeTree };

pub const HOSTS: &[&str] = &["whois.iana.org"];

const NOT_FOUND: &str = "iana:not-found";
const REFER: &str = "refer";

/// A response carrying `refer:` describes the TLD or the allocation the
/// query falls into, not the queried object, so it answers no properties
/// and only hands the chain on.
#[derive(Debug, Clone)]
pub struct IanaAdapter {
    inner: StandardAdapter,
}

impl Adapter for IanaAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn grammar(&self) -> &Grammar {
        self.inner.grammar()
    }

    fn property(&self, nodes: &NodeTree, property: Property) -> Answer<Value> {
        if nodes.contains(REFER) {
            return Answer::Unsupported;
        }
        self.inner.property(nodes, property)
    }

    fn referral(&self, nodes: &NodeTree, default_port: u16) -> Option<ServerId> {
        self.inner.referral(nodes, default_port)
    }
}

pub fn adapter() -> Result<IanaAdapter, regex::Error> {
    let body = Grammar::builder().key_value(KEY_VALUE).build()?;

    let grammar = Grammar::builder()
        .skip(BLANK)
        .line(r"^% This query returned 0 objects", NOT_FOUND)
        .skip(r"^%")
        .block(r"^contact:\s*(?P<key>\S+)", BLANK, KeySource::Captured, body.clone(), false)
        .block(r"^organisation:", BLANK, KeySource::Fixed("organisation".to_string()), body, true)
        .key_value(KEY_VALUE)
        .build()?;

    let vocabulary = Vocabulary::new()
        .map(Property::Domain, Mapping::name(&["domain"]))
        .map(Property::Status, Mapping::text_list(&["status"]))
        .map(Property::Available, Mapping::Availability(Availability::Present(NOT_FOUND.to_string())))
        .map(Property::CreatedOn, Mapping::time(&["created"]))
        .map(Property::UpdatedOn, Mapping::time(&["changed"]))
        .map(Property::RegistrantContacts, Mapping::contact_refs(&["organisation"]))
        .map(Property::AdminContacts, Mapping::contact_refs(&["administrative"]))
        .map(Property::TechnicalContacts, Mapping::contact_refs(&["technical"]))
        .map(Property::Nameservers, Mapping::nameservers(&["nserver"]))
        .referral(&[REFER]);

    Ok(IanaAdapter {
        inner: StandardAdapter::new("iana", grammar, vocabulary),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::parsers::{ Answer, Parser };

    const TLD_COM: &str = "\
% IANA WHOIS server\r
% for more information on IANA, visit http://www.iana.org\r
% This query returned 1 object\r
\r
domain:       COM\r
\r
organisation: VeriSign Global Registry Services\r
address:      12061 Bluemont Way\r
address:      Reston VA 20190\r
address:      United States of America (the)\r
\r
contact:      administrative\r
name:         Registry Customer Service (ADMIN)\r
organisation: VeriSign Global Registry Services (ADMIN)\r
address:      12061 Bluemont Way\r
phone:        +1 703 925-6999\r
fax-no:       +1 703 948 3978\r
e-mail:       info@verisign-grs.com\r
\r
contact:      technical\r
name:         Registry Customer Service (TECH)\r
organisation: VeriSign Global Registry Services (TECH)\r
e-mail:       info@verisign-grs.com\r
\r
nserver:      A.GTLD-SERVERS.NET 192.5.6.30 2001:503:a83e:0:0:0:2:30\r
nserver:      B.GTLD-SERVERS.NET 192.33.14.30 2001:503:231d:0:0:0:2:30\r
ds-rdata:     19718 13 2 8acbb0cd28f41250a80a491389424d341522d946b0da0c0291f2d3d771d7805a\r
\r
whois:        whois.verisign-grs.com\r
\r
status:       ACTIVE\r
remarks:      Registration information: http://www.verisigninc.com\r
\r
created:      1985-01-01\r
changed:      2023-12-07\r
source:       IANA\r
";

    const REFERRAL: &str = "\
% IANA WHOIS server
% for more information on IANA, visit http://www.iana.org
% This query returned 1 object

refer:        whois.verisign-grs.com

domain:       COM
";

    const NOT_FOUND_RESPONSE: &str = "\
% IANA WHOIS server
% for more information on IANA, visit http://www.iana.org
% This query returned 0 objects.
%
% You queried for aaaaaaaa but this server does not have
% any data for aaaaaaaa.
";

    fn parse(raw: &str) -> Parser {
        Parser::new(Arc::new(adapter().expect("iana grammar")), raw)
    }

    #[test]
    fn test_tld_record() {
        let parser = parse(TLD_COM);

        assert_eq!(parser.domain(), Answer::Value("com".to_string()));
        assert_eq!(parser.available(), Answer::Value(false));
        assert_eq!(parser.registered(), Answer::Value(true));
        assert_eq!(
            parser.updated_on().into_value().map(|t| t.date_naive().to_string()),
            Some("2023-12-07".to_string())
        );

        let nameservers = parser.nameservers().into_value().expect("nameservers");
        assert_eq!(nameservers.len(), 2);
        assert_eq!(nameservers[0].name, "a.gtld-servers.net");
        assert_eq!(nameservers[0].ipv4.as_deref(), Some("192.5.6.30"));

        let admin = parser.property(Property::AdminContacts).value().and_then(|v| v.as_contacts()).expect("admin");
        assert_eq!(admin.len(), 1);
        assert_eq!(admin[0].name.as_deref(), Some("Registry Customer Service (ADMIN)"));
        assert_eq!(admin[0].email.as_deref(), Some("info@verisign-grs.com"));

        let registrant = parser.property(Property::RegistrantContacts).value().and_then(|v| v.as_contacts()).expect("registrant");
        assert_eq!(registrant[0].organization.as_deref(), Some("VeriSign Global Registry Services"));
        assert_eq!(registrant[0].address.as_deref().map(|a| a.lines().count()), Some(3));

        // The `whois:` line describes the TLD, it is not a referral
        assert_eq!(parser.referral(43), None);
        assert!(parser.nodes().unparsed().is_empty());
    }

    #[test]
    fn test_referral() {
        let parser = parse(REFERRAL);
        assert_eq!(parser.referral(43).map(|s| s.host().to_string()), Some("whois.verisign-grs.com".to_string()));

        // The TLD data next to the referral must not leak into the record
        for property in Property::ALL {
            assert!(parser.property(property).is_unsupported(), "{property} should be unsupported");
        }
        assert!(parser.registered().is_unsupported());
    }

    #[test]
    fn test_not_found() {
        let parser = parse(NOT_FOUND_RESPONSE);

        assert_eq!(parser.available(), Answer::Value(true));
        assert_eq!(parser.domain(), Answer::Absent);
        assert_eq!(parser.referral(43), None);
        assert!(parser.property(Property::Registrar).is_unsupported());
    }
}
