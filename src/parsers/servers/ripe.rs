//! RPSL registries: RIPE NCC, APNIC and AFRINIC share one object format

use super::{ BLANK, KEY_VALUE };
use crate::parsers::{ Availability, Mapping, Property, StandardAdapter, Vocabulary };
use crate::scanner::{ ERROR_KEY, Grammar, KeySource, THROTTLED_KEY };

pub const HOSTS: &[&str] = &["whois.ripe.net", "whois.apnic.net", "whois.afrinic.net"];

const NOT_FOUND: &str = "rpsl:not-found";

pub fn adapter() -> Result<StandardAdapter, regex::Error> {
    let object = Grammar::builder().skip(r"^%").key_value(KEY_VALUE).build()?;

    let grammar = Grammar::builder()
        .skip(BLANK)
        .line(r"^%ERROR:101:", NOT_FOUND)
        .line(r"^%ERROR:201:", THROTTLED_KEY)
        .line(r"^%ERROR:", ERROR_KEY)
        .skip(r"^%")
        .block(
            r"^(person|role):",
            BLANK,
            KeySource::Field { field: "nic-hdl".to_string(), fallback: "contact".to_string() },
            object.clone(),
            true
        )
        .block(
            r"^organisation:",
            BLANK,
            KeySource::Field { field: "organisation".to_string(), fallback: "organisation".to_string() },
            object,
            true
        )
        .key_value(KEY_VALUE)
        .build()?;

    let vocabulary = Vocabulary::new()
        .map(Property::Domain, Mapping::name(&["domain"]))
        .map(Property::DomainId, Mapping::text(&["inetnum", "inet6num", "aut-num"]))
        .map(Property::Status, Mapping::text_list(&["status"]))
        .map(Property::Available, Mapping::Availability(Availability::Present(NOT_FOUND.to_string())))
        .map(Property::CreatedOn, Mapping::time(&["created"]))
        .map(Property::UpdatedOn, Mapping::time(&["last-modified", "changed"]))
        .map(Property::RegistrantContacts, Mapping::contact_refs(&["org"]))
        .map(Property::AdminContacts, Mapping::contact_refs(&["admin-c"]))
        .map(Property::TechnicalContacts, Mapping::contact_refs(&["tech-c"]))
        .map(Property::Nameservers, Mapping::nameservers(&["nserver"]));

    Ok(StandardAdapter::new("rpsl", grammar, vocabulary))
}
