//! Per-server adapters mapping tokenized responses onto a fixed vocabulary
//!
//! An [`Adapter`] is the stateless, shareable description of one server
//! family: the grammar its responses are tokenized with and how each
//! semantic [`Property`] is read from the resulting node tree. A [`Parser`]
//! binds an adapter to the nodes of one response and memoizes every answer
//! for its lifetime.

pub mod dates;
pub mod registry;
pub mod servers;
pub mod types;
pub mod vocabulary;

use std::fmt;
use std::sync::Arc;

use chrono::{ DateTime, Utc };
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::error::UnsupportedProperty;
use crate::resolver::directory::ServerId;
use crate::scanner::{ self, NodeTree, ERROR_KEY, INCOMPLETE_KEY, THROTTLED_KEY, UNAVAILABLE_KEY };

pub use dates::parse_time;
pub use registry::Catalog;
pub use types::{ Contact, ContactType, Nameserver, Registrar };
pub use vocabulary::{ Availability, Mapping, StandardAdapter, Vocabulary };

/// The semantic vocabulary every adapter answers (or declines)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Disclaimer,
    Domain,
    DomainId,
    Status,
    Available,
    Registered,
    CreatedOn,
    UpdatedOn,
    ExpiresOn,
    Registrar,
    RegistrantContacts,
    AdminContacts,
    TechnicalContacts,
    Nameservers,
}

/// How a [`crate::Record`] combines the answers of its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// First part with a value wins
    FirstWins,
    /// Last part with a value wins (the most authoritative server)
    LastWins,
    /// Union of all values, in part order
    Concatenate,
}

impl Property {
    pub const ALL: [Property; 14] = [
        Property::Disclaimer,
        Property::Domain,
        Property::DomainId,
        Property::Status,
        Property::Available,
        Property::Registered,
        Property::CreatedOn,
        Property::UpdatedOn,
        Property::ExpiresOn,
        Property::Registrar,
        Property::RegistrantContacts,
        Property::AdminContacts,
        Property::TechnicalContacts,
        Property::Nameservers,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn name(self) -> &'static str {
        match self {
            Property::Disclaimer => "disclaimer",
            Property::Domain => "domain",
            Property::DomainId => "domain_id",
            Property::Status => "status",
            Property::Available => "available?",
            Property::Registered => "registered?",
            Property::CreatedOn => "created_on",
            Property::UpdatedOn => "updated_on",
            Property::ExpiresOn => "expires_on",
            Property::Registrar => "registrar",
            Property::RegistrantContacts => "registrant_contacts",
            Property::AdminContacts => "admin_contacts",
            Property::TechnicalContacts => "technical_contacts",
            Property::Nameservers => "nameservers",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim_end_matches('?');
        Self::ALL.into_iter().find(|p| p.name().trim_end_matches('?') == name)
    }

    /// Merge policy across the parts of a record
    pub fn merge_mode(self) -> MergeMode {
        match self {
            // Thin registries answer first but the registry-closest server
            // is the one that knows whether the name is taken
            Property::Available | Property::Registered => MergeMode::LastWins,
            // Contacts and nameservers are split across registry and registrar
            Property::RegistrantContacts |
            Property::AdminContacts |
            Property::TechnicalContacts |
            Property::Nameservers => MergeMode::Concatenate,
            Property::Disclaimer |
            Property::Domain |
            Property::DomainId |
            Property::Status |
            Property::CreatedOn |
            Property::UpdatedOn |
            Property::ExpiresOn |
            Property::Registrar => MergeMode::FirstWins,
        }
    }

    pub fn contact_type(self) -> Option<ContactType> {
        match self {
            Property::RegistrantContacts => Some(ContactType::Registrant),
            Property::AdminContacts => Some(ContactType::Administrative),
            Property::TechnicalContacts => Some(ContactType::Technical),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed value of a supported property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    TextList(Vec<String>),
    Flag(bool),
    Time(DateTime<Utc>),
    Registrar(Registrar),
    Contacts(Vec<Contact>),
    Nameservers(Vec<Nameserver>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::TextList(list) => list.first().map(String::as_str),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Value::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(time) => Some(*time),
            _ => None,
        }
    }

    /// List-shaped view; scalars become single-element lists
    pub fn as_text_list(&self) -> Option<Vec<String>> {
        match self {
            Value::Text(text) => Some(vec![text.clone()]),
            Value::TextList(list) => Some(list.clone()),
            _ => None,
        }
    }

    pub fn as_registrar(&self) -> Option<&Registrar> {
        match self {
            Value::Registrar(registrar) => Some(registrar),
            _ => None,
        }
    }

    pub fn as_contacts(&self) -> Option<&[Contact]> {
        match self {
            Value::Contacts(contacts) => Some(contacts),
            _ => None,
        }
    }

    pub fn as_nameservers(&self) -> Option<&[Nameserver]> {
        match self {
            Value::Nameservers(nameservers) => Some(nameservers),
            _ => None,
        }
    }

    /// Append the entries of `other` not already present; `None` when the
    /// two values are not lists of the same kind
    pub fn union(self, other: &Value) -> Option<Value> {
        fn merge<T: Clone + PartialEq>(mut into: Vec<T>, from: &[T]) -> Vec<T> {
            for item in from {
                if !into.contains(item) {
                    into.push(item.clone());
                }
            }
            into
        }

        match (self, other) {
            (Value::Contacts(a), Value::Contacts(b)) => Some(Value::Contacts(merge(a, b))),
            (Value::Nameservers(a), Value::Nameservers(b)) => Some(Value::Nameservers(merge(a, b))),
            (Value::TextList(a), Value::TextList(b)) => Some(Value::TextList(merge(a, b))),
            _ => None,
        }
    }
}

/// Three-state answer to a property query.
///
/// `Absent` means the server exposes the concept but this response carries
/// no value for it; `Unsupported` means the server never exposes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<T> {
    Value(T),
    Absent,
    Unsupported,
}

impl<T> Answer<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Answer::Value(value),
            None => Answer::Absent,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Answer::Unsupported)
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Answer::Unsupported)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Answer::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Answer::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Answer<&T> {
        match self {
            Answer::Value(value) => Answer::Value(value),
            Answer::Absent => Answer::Absent,
            Answer::Unsupported => Answer::Unsupported,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Answer<U> {
        match self {
            Answer::Value(value) => Answer::Value(f(value)),
            Answer::Absent => Answer::Absent,
            Answer::Unsupported => Answer::Unsupported,
        }
    }

    /// Like [`Answer::map`], a `None` from `f` degrades the value to absent
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Option<U>) -> Answer<U> {
        match self {
            Answer::Value(value) => Answer::from_option(f(value)),
            Answer::Absent => Answer::Absent,
            Answer::Unsupported => Answer::Unsupported,
        }
    }

    pub fn into_result(self, property: Property) -> Result<Option<T>, UnsupportedProperty> {
        match self {
            Answer::Value(value) => Ok(Some(value)),
            Answer::Absent => Ok(None),
            Answer::Unsupported => Err(UnsupportedProperty(property)),
        }
    }
}

/// Logic for one server family, shared by every response it parses
pub trait Adapter: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Grammar responses from this family are tokenized with
    fn grammar(&self) -> &scanner::Grammar;

    /// Raw answer for `property`. [`Property::Registered`] is derived from
    /// [`Property::Available`] by [`Parser`] and never asked for here.
    fn property(&self, nodes: &NodeTree, property: Property) -> Answer<Value>;

    /// Server this response refers the query on to
    fn referral(&self, _nodes: &NodeTree, _default_port: u16) -> Option<ServerId> {
        None
    }

    fn response_throttled(&self, nodes: &NodeTree) -> bool {
        nodes.contains(THROTTLED_KEY)
    }

    fn response_error(&self, nodes: &NodeTree) -> bool {
        nodes.contains(ERROR_KEY)
    }

    fn response_incomplete(&self, nodes: &NodeTree) -> bool {
        nodes.contains(INCOMPLETE_KEY)
    }

    fn response_unavailable(&self, nodes: &NodeTree) -> bool {
        nodes.contains(UNAVAILABLE_KEY)
    }

    /// Responses that must not be trusted to assert availability
    fn invalid(&self, nodes: &NodeTree) -> bool {
        self.response_error(nodes) || self.response_throttled(nodes) || self.response_unavailable(nodes)
    }
}

/// An adapter bound to the nodes of one response
pub struct Parser {
    adapter: Arc<dyn Adapter>,
    nodes: NodeTree,
    cache: [OnceCell<Answer<Value>>; Property::COUNT],
    invalid: OnceCell<bool>,
}

impl Parser {
    /// Tokenize `raw` with the adapter's grammar
    pub fn new(adapter: Arc<dyn Adapter>, raw: &str) -> Self {
        let nodes = scanner::tokenize(raw, adapter.grammar());
        Self::from_nodes(adapter, nodes)
    }

    pub fn from_nodes(adapter: Arc<dyn Adapter>, nodes: NodeTree) -> Self {
        Self {
            adapter,
            nodes,
            cache: std::array::from_fn(|_| OnceCell::new()),
            invalid: OnceCell::new(),
        }
    }

    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    pub fn nodes(&self) -> &NodeTree {
        &self.nodes
    }

    /// Memoized answer for `property`
    pub fn property(&self, property: Property) -> &Answer<Value> {
        self.cache[property.index()].get_or_init(|| self.compute(property))
    }

    fn compute(&self, property: Property) -> Answer<Value> {
        match property {
            Property::Available => {
                let answer = self.adapter.property(&self.nodes, Property::Available);
                if answer.is_supported() && self.invalid() {
                    Answer::Value(Value::Flag(false))
                } else {
                    answer
                }
            }
            Property::Registered => match self.property(Property::Available) {
                Answer::Unsupported => Answer::Unsupported,
                Answer::Absent => Answer::Absent,
                Answer::Value(available) => {
                    let available = available.as_flag().unwrap_or(false);
                    Answer::Value(Value::Flag(!self.invalid() && !available))
                }
            },
            _ => self.adapter.property(&self.nodes, property),
        }
    }

    pub fn referral(&self, default_port: u16) -> Option<ServerId> {
        self.adapter.referral(&self.nodes, default_port)
    }

    pub fn invalid(&self) -> bool {
        *self.invalid.get_or_init(|| self.adapter.invalid(&self.nodes))
    }

    pub fn response_throttled(&self) -> bool {
        self.adapter.response_throttled(&self.nodes)
    }

    pub fn response_error(&self) -> bool {
        self.adapter.response_error(&self.nodes)
    }

    pub fn response_incomplete(&self) -> bool {
        self.adapter.response_incomplete(&self.nodes)
    }

    pub fn response_unavailable(&self) -> bool {
        self.adapter.response_unavailable(&self.nodes)
    }

    pub fn available(&self) -> Answer<bool> {
        self.property(Property::Available).as_ref().and_then(Value::as_flag)
    }

    pub fn registered(&self) -> Answer<bool> {
        self.property(Property::Registered).as_ref().and_then(Value::as_flag)
    }

    pub fn domain(&self) -> Answer<String> {
        self.property(Property::Domain).as_ref().and_then(|v| v.as_text().map(str::to_string))
    }

    pub fn updated_on(&self) -> Answer<DateTime<Utc>> {
        self.property(Property::UpdatedOn).as_ref().and_then(Value::as_time)
    }

    pub fn nameservers(&self) -> Answer<Vec<Nameserver>> {
        self.property(Property::Nameservers).as_ref().and_then(|v| v.as_nameservers().map(<[_]>::to_vec))
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("adapter", &self.adapter.name())
            .field("nodes", &self.nodes)
            .finish()
    }
}
