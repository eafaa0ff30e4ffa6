//! whois.arin.net (North American address space and ASNs)

use super::{ BLANK, KEY_VALUE };
use crate::parsers::{ Availability, Mapping, Property, StandardAdapter, Vocabulary };
use crate::scanner::{ Grammar, KeySource, THROTTLED_KEY };

pub const HOSTS: &[&str] = &["whois.arin.net"];

const NOT_FOUND: &str = "arin:not-found";
const ORGANIZATION: &str = "organization";

pub fn adapter() -> Result<StandardAdapter, regex::Error> {
    let org = Grammar::builder().key_value(KEY_VALUE).build()?;

    let grammar = Grammar::builder()
        .skip(BLANK)
        .line(r"^No match found for", NOT_FOUND)
        .line(r"^Query rate limit exceeded", THROTTLED_KEY)
        .line(r"^#\s*(.+)$", "disclaimer")
        .skip(r"^#")
        .block(r"^OrgName:", BLANK, KeySource::Fixed(ORGANIZATION.to_string()), org, true)
        .key_value(KEY_VALUE)
        .build()?;

    let vocabulary = Vocabulary::new()
        .map(Property::Disclaimer, Mapping::paragraph(&["disclaimer"]))
        .map(Property::DomainId, Mapping::text(&["NetHandle", "ASHandle"]))
        .map(Property::Status, Mapping::text_list(&["NetType"]))
        .map(Property::Available, Mapping::Availability(Availability::Present(NOT_FOUND.to_string())))
        .map(Property::CreatedOn, Mapping::time(&["RegDate"]))
        .map(Property::UpdatedOn, Mapping::time(&["Updated"]))
        .map(Property::RegistrantContacts, Mapping::contact_refs(&[ORGANIZATION]))
        .map(Property::AdminContacts, Mapping::contact_prefix("OrgAdmin"))
        .map(Property::TechnicalContacts, Mapping::contact_prefix("OrgTech"))
        .referral(&["ReferralServer", "ResourceLink"]);

    Ok(StandardAdapter::new("arin", grammar, vocabulary))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::parsers::{ Answer, Parser };

    const NETWORK: &str = "\
#
# ARIN WHOIS data and services are subject to the Terms of Use
# available at: https://www.arin.net/resources/registry/whois/tou/
#

NetRange:       8.8.8.0 - 8.8.8.255
CIDR:           8.8.8.0/24
NetName:        GOGL
NetHandle:      NET-8-8-8-0-2
Parent:         NET8 (NET-8-0-0-0-0)
NetType:        Direct Allocation
OriginAS:
Organization:   Google LLC (GOGL)
RegDate:        2023-12-28
Updated:        2023-12-28
Ref:            https://rdap.arin.net/registry/ip/8.8.8.0

OrgName:        Google LLC
OrgId:          GOGL
Address:        1600 Amphitheatre Parkway
City:           Mountain View
StateProv:      CA
PostalCode:     94043
Country:        US
RegDate:        2000-03-30
Updated:        2019-10-31
Ref:            https://rdap.arin.net/registry/entity/GOGL

OrgTechHandle: ZG39-ARIN
OrgTechName:   Google LLC
OrgTechPhone:  +1-650-253-0000
OrgTechEmail:  arin-contact@google.com
";

    const RIPE_REFERRAL: &str = "\
NetRange:       193.0.0.0 - 193.255.255.255
NetType:        Allocated to RIPE NCC
ReferralServer:  whois://whois.ripe.net
";

    const RWHOIS_REFERRAL: &str = "\
NetRange:       24.0.0.0 - 24.15.255.255
ReferralServer:  rwhois://rwhois.example.net:4321
";

    fn parse(raw: &str) -> Parser {
        Parser::new(Arc::new(adapter().expect("arin grammar")), raw)
    }

    #[test]
    fn test_network() {
        let parser = parse(NETWORK);

        assert_eq!(
            parser.property(Property::DomainId).value().and_then(|v| v.as_text()),
            Some("NET-8-8-8-0-2")
        );
        assert!(parser.property(Property::Domain).is_unsupported());
        assert_eq!(
            parser.property(Property::CreatedOn).value().and_then(|v| v.as_time()).map(|t| t.date_naive().to_string()),
            Some("2023-12-28".to_string())
        );

        let registrant = parser.property(Property::RegistrantContacts).value().and_then(|v| v.as_contacts()).expect("org");
        assert_eq!(registrant[0].organization.as_deref(), Some("Google LLC"));
        assert_eq!(registrant[0].id.as_deref(), Some("GOGL"));
        assert_eq!(registrant[0].state.as_deref(), Some("CA"));
        assert_eq!(registrant[0].country_code.as_deref(), Some("US"));

        let tech = parser.property(Property::TechnicalContacts).value().and_then(|v| v.as_contacts()).expect("tech");
        assert_eq!(tech[0].id.as_deref(), Some("ZG39-ARIN"));
        assert_eq!(tech[0].email.as_deref(), Some("arin-contact@google.com"));

        let disclaimer = parser.property(Property::Disclaimer).value().and_then(|v| v.as_text()).map(str::to_string);
        assert_eq!(
            disclaimer.as_deref(),
            Some("ARIN WHOIS data and services are subject to the Terms of Use available at: https://www.arin.net/resources/registry/whois/tou/")
        );
        assert_eq!(parser.referral(43), None);
    }

    #[test]
    fn test_referrals() {
        let parser = parse(RIPE_REFERRAL);
        assert_eq!(parser.referral(43).map(|s| s.host().to_string()), Some("whois.ripe.net".to_string()));

        // RWhois is a different protocol and is not followed
        assert_eq!(parse(RWHOIS_REFERRAL).referral(43), None);
    }

    #[test]
    fn test_not_found() {
        let parser = parse("No match found for n + 192.0.2.999.\n");
        assert_eq!(parser.available(), Answer::Value(true));
        assert_eq!(parser.registered(), Answer::Value(false));
    }
}
