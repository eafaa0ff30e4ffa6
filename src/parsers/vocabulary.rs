//! Table-driven adapters
//!
//! Most server families differ only in which node keys hold which property.
//! A [`Vocabulary`] records that as data, and [`StandardAdapter`] pairs it
//! with a grammar. Families that need real logic wrap a `StandardAdapter`
//! and override the pieces that differ.

use std::collections::HashMap;

use tracing::debug;

use super::dates::parse_time;
use super::types::{ Contact, ContactType, Nameserver, Registrar };
use super::{ Adapter, Answer, Property, Value };
use crate::resolver::directory::ServerId;
use crate::scanner::{ Grammar, NodeTree, NodeValue };

/// When a response means the queried object is free
#[derive(Debug, Clone)]
pub enum Availability {
    /// The scalar under `key` equals one of `values` (case-insensitive)
    Equals { key: String, values: Vec<String> },
    /// `key` is present, typically a "no match" marker line
    Present(String),
    /// `key` is missing, typically the object's own name field
    Missing(String),
    Any(Vec<Availability>),
}

impl Availability {
    pub fn equals(key: &str, values: &[&str]) -> Self {
        Availability::Equals {
            key: key.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn holds(&self, nodes: &NodeTree) -> bool {
        match self {
            Availability::Equals { key, values } => nodes
                .scalar(key)
                .is_some_and(|value| values.iter().any(|v| v.eq_ignore_ascii_case(value))),
            Availability::Present(key) => nodes.contains(key),
            Availability::Missing(key) => !nodes.contains(key),
            Availability::Any(rules) => rules.iter().any(|rule| rule.holds(nodes)),
        }
    }
}

/// How one property is read from the node tree
#[derive(Debug, Clone)]
pub enum Mapping {
    /// First non-empty scalar among the keys
    Text(Vec<String>),
    /// Like `Text`, lowercased with any trailing dot removed
    Name(Vec<String>),
    /// Every value of every key; `first_token` keeps only each value's first word
    TextList { keys: Vec<String>, first_token: bool },
    /// Lines (or a block's lines) joined into one paragraph
    Paragraph(Vec<String>),
    /// First parseable timestamp among the keys
    Time(Vec<String>),
    /// `name [ipv4] [ipv6]` values
    Nameservers(Vec<String>),
    Registrar {
        name: Vec<String>,
        id: Vec<String>,
        organization: Vec<String>,
        url: Vec<String>,
    },
    /// Flat `"<prefix>Name"`, `"<prefix>Email"`... fields
    ContactPrefix(String),
    /// Keys holding a contact block, or handles naming one
    ContactRefs(Vec<String>),
    Availability(Availability),
}

fn owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

impl Mapping {
    pub fn text(keys: &[&str]) -> Self {
        Mapping::Text(owned(keys))
    }

    pub fn name(keys: &[&str]) -> Self {
        Mapping::Name(owned(keys))
    }

    pub fn text_list(keys: &[&str]) -> Self {
        Mapping::TextList { keys: owned(keys), first_token: false }
    }

    pub fn tokens(keys: &[&str]) -> Self {
        Mapping::TextList { keys: owned(keys), first_token: true }
    }

    pub fn paragraph(keys: &[&str]) -> Self {
        Mapping::Paragraph(owned(keys))
    }

    pub fn time(keys: &[&str]) -> Self {
        Mapping::Time(owned(keys))
    }

    pub fn nameservers(keys: &[&str]) -> Self {
        Mapping::Nameservers(owned(keys))
    }

    pub fn registrar(name: &[&str], id: &[&str], organization: &[&str], url: &[&str]) -> Self {
        Mapping::Registrar {
            name: owned(name),
            id: owned(id),
            organization: owned(organization),
            url: owned(url),
        }
    }

    pub fn contact_prefix(prefix: &str) -> Self {
        Mapping::ContactPrefix(prefix.to_string())
    }

    pub fn contact_refs(keys: &[&str]) -> Self {
        Mapping::ContactRefs(owned(keys))
    }
}

/// Property-to-key table of one server family. Properties without a
/// mapping are unsupported.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    mappings: HashMap<Property, Mapping>,
    referral_keys: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(mut self, property: Property, mapping: Mapping) -> Self {
        self.mappings.insert(property, mapping);
        self
    }

    /// Keys whose value names the next server in the chain
    pub fn referral(mut self, keys: &[&str]) -> Self {
        self.referral_keys = owned(keys);
        self
    }

    pub fn supports(&self, property: Property) -> bool {
        self.mappings.contains_key(&property)
    }

    pub fn resolve(&self, nodes: &NodeTree, property: Property) -> Answer<Value> {
        let Some(mapping) = self.mappings.get(&property) else {
            return Answer::Unsupported;
        };

        match mapping {
            Mapping::Text(keys) => Answer::from_option(
                first_scalar(nodes, keys).map(|v| Value::Text(v.to_string()))
            ),
            Mapping::Name(keys) => Answer::from_option(
                first_scalar(nodes, keys).map(|v| Value::Text(v.trim_end_matches('.').to_lowercase()))
            ),
            Mapping::TextList { keys, first_token } => {
                let values: Vec<String> = keys
                    .iter()
                    .flat_map(|key| nodes.values(key))
                    .filter_map(|value| {
                        if *first_token { value.split_whitespace().next() } else { Some(value) }
                    })
                    .map(str::to_string)
                    .collect();
                Answer::from_option(Some(values).filter(|v| !v.is_empty()).map(Value::TextList))
            }
            Mapping::Paragraph(keys) => {
                let lines: Vec<&str> = keys
                    .iter()
                    .filter_map(|key| nodes.get(key))
                    .flat_map(|node| match node {
                        NodeValue::Group(group) => group.iter().flat_map(|(_, v)| v.as_values()).collect::<Vec<&str>>(),
                        other => other.as_values(),
                    })
                    .collect();
                Answer::from_option(Some(lines.join(" ")).filter(|p| !p.is_empty()).map(Value::Text))
            }
            Mapping::Time(keys) => Answer::from_option(
                keys
                    .iter()
                    .filter_map(|key| nodes.scalar(key))
                    .find_map(parse_time)
                    .map(Value::Time)
            ),
            Mapping::Nameservers(keys) => {
                let mut nameservers: Vec<Nameserver> = Vec::new();
                for nameserver in keys.iter().flat_map(|key| nodes.values(key)).filter_map(Nameserver::parse) {
                    if !nameservers.iter().any(|ns| ns.name == nameserver.name) {
                        nameservers.push(nameserver);
                    }
                }
                Answer::Value(Value::Nameservers(nameservers))
            }
            Mapping::Registrar { name, id, organization, url } => {
                let registrar = Registrar {
                    id: first_scalar(nodes, id).map(str::to_string),
                    name: first_scalar(nodes, name).map(str::to_string),
                    organization: first_scalar(nodes, organization).map(str::to_string),
                    url: first_scalar(nodes, url).map(str::to_string),
                };
                Answer::from_option(Some(registrar).filter(|r| !r.is_empty()).map(Value::Registrar))
            }
            Mapping::ContactPrefix(prefix) => {
                let contacts = property
                    .contact_type()
                    .and_then(|contact_type| prefixed_contact(nodes, prefix, contact_type))
                    .into_iter()
                    .collect();
                Answer::Value(Value::Contacts(contacts))
            }
            Mapping::ContactRefs(keys) => {
                let contacts = property
                    .contact_type()
                    .map(|contact_type| referenced_contacts(nodes, keys, contact_type))
                    .unwrap_or_default();
                Answer::Value(Value::Contacts(contacts))
            }
            Mapping::Availability(rule) => Answer::Value(Value::Flag(rule.holds(nodes))),
        }
    }

    /// First referral value naming a WHOIS server
    pub fn find_referral(&self, nodes: &NodeTree, default_port: u16) -> Option<ServerId> {
        self.referral_keys
            .iter()
            .filter_map(|key| nodes.scalar(key))
            .find_map(|value| {
                let server = ServerId::parse_referral(value, default_port);
                if server.is_none() {
                    debug!("Ignoring referral that is not a WHOIS server: {}", value);
                }
                server
            })
    }
}

fn first_scalar<'a>(nodes: &'a NodeTree, keys: &[String]) -> Option<&'a str> {
    keys.iter().find_map(|key| nodes.scalar(key))
}

fn fields_of(group: &NodeTree) -> Vec<(&str, &str)> {
    group
        .iter()
        .flat_map(|(key, value)| value.as_values().into_iter().map(move |v| (key, v)))
        .collect()
}

fn prefixed_contact(nodes: &NodeTree, prefix: &str, contact_type: ContactType) -> Option<Contact> {
    let fields: Vec<(&str, &str)> = fields_of(nodes)
        .into_iter()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect();
    if fields.is_empty() {
        return None;
    }
    Some(Contact::from_fields(contact_type, Some(prefix), fields))
}

fn referenced_contacts(nodes: &NodeTree, keys: &[String], contact_type: ContactType) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for node in keys.iter().filter_map(|key| nodes.get(key)) {
        match node {
            NodeValue::Group(group) => contacts.push(Contact::from_fields(contact_type, None, fields_of(group))),
            other => {
                for handle in other.as_values() {
                    let contact = match nodes.group(handle) {
                        Some(group) => Contact::from_fields(contact_type, None, fields_of(group)),
                        None => Contact::from_fields(contact_type, None, [("handle", handle)]),
                    };
                    contacts.push(contact);
                }
            }
        }
    }
    contacts
}

/// A grammar plus a vocabulary: the adapter for every family whose
/// responses need no special handling
#[derive(Debug, Clone)]
pub struct StandardAdapter {
    name: String,
    grammar: Grammar,
    vocabulary: Vocabulary,
}

impl StandardAdapter {
    pub fn new(name: &str, grammar: Grammar, vocabulary: Vocabulary) -> Self {
        Self {
            name: name.to_string(),
            grammar,
            vocabulary,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

impl Adapter for StandardAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    fn property(&self, nodes: &NodeTree, property: Property) -> Answer<Value> {
        self.vocabulary.resolve(nodes, property)
    }

    fn referral(&self, nodes: &NodeTree, default_port: u16) -> Option<ServerId> {
        self.vocabulary.find_referral(nodes, default_port)
    }
}
