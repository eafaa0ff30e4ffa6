//! whois.nic.at (.at registry, RPSL-like with handle-keyed contact blocks)

use super::{ BLANK, KEY_VALUE };
use crate::parsers::{ Adapter, Answer, Availability, Mapping, Property, StandardAdapter, Value, Vocabulary };
use crate::scanner::{ ERROR_KEY, Grammar, KeySource, NodeTree, THROTTLED_KEY };

pub const HOSTS: &[&str] = &["whois.nic.at"];

const NOTHING_FOUND: &str = "nothing found";

/// nic.at marks malformed queries with `Status: invalid` rather than an error
/// banner, so validity is checked on top of the table-driven adapter
#[derive(Debug, Clone)]
pub struct NicAtAdapter {
    inner: StandardAdapter,
}

pub fn adapter() -> Result<NicAtAdapter, regex::Error> {
    let contact = Grammar::builder().key_value(KEY_VALUE).build()?;

    let grammar = Grammar::builder()
        .skip(BLANK)
        .line(r"^% Error: \d+ Connection refused", THROTTLED_KEY)
        .line(r"^% Error:", ERROR_KEY)
        .line(r"^% nothing found", NOTHING_FOUND)
        .skip(r"^%")
        .block(
            r"^personname:",
            BLANK,
            KeySource::Field { field: "nic-hdl".to_string(), fallback: "contact".to_string() },
            contact,
            true
        )
        .key_value(KEY_VALUE)
        .build()?;

    let free = Availability::Any(vec![Availability::equals("Status", &["free"]), Availability::Present(NOTHING_FOUND.to_string())]);
    let vocabulary = Vocabulary::new()
        .map(Property::Domain, Mapping::name(&["domain"]))
        .map(Property::Status, Mapping::text_list(&["Status", NOTHING_FOUND]))
        .map(Property::Available, Mapping::Availability(free))
        .map(Property::UpdatedOn, Mapping::time(&["changed", "Changed"]))
        .map(Property::Registrar, Mapping::registrar(&["registrar"], &[], &[], &[]))
        .map(Property::RegistrantContacts, Mapping::contact_refs(&["registrant", "Holder"]))
        .map(Property::AdminContacts, Mapping::contact_refs(&["admin-c", "Admin-C"]))
        .map(Property::TechnicalContacts, Mapping::contact_refs(&["tech-c", "Tech-C"]))
        .map(Property::Nameservers, Mapping::nameservers(&["nserver", "Nserver"]));

    Ok(NicAtAdapter {
        inner: StandardAdapter::new("nic.at", grammar, vocabulary),
    })
}

impl Adapter for NicAtAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn grammar(&self) -> &Grammar {
        self.inner.grammar()
    }

    fn property(&self, nodes: &NodeTree, property: Property) -> Answer<Value> {
        self.inner.property(nodes, property)
    }

    fn invalid(&self, nodes: &NodeTree) -> bool {
        nodes.scalar("Status").is_some_and(|status| status.eq_ignore_ascii_case("invalid")) ||
            self.response_error(nodes) ||
            self.response_throttled(nodes) ||
            self.response_unavailable(nodes)
    }
}
