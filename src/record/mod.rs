//! Multi-part records and per-property merge policy
//!
//! A [`Record`] is the ordered chain of [`Part`]s one query produced, entry
//! server first and most authoritative server last. Each property is resolved
//! across the parts with the [`MergeMode`] it declares.

use std::fmt;
use std::sync::Arc;

use chrono::{ DateTime, Utc };

use crate::parsers::{ Adapter, Answer, Contact, MergeMode, Nameserver, Parser, Property, Registrar, Value };
use crate::resolver::directory::ServerId;

/// One raw response, the server that sent it, and its parsed view
#[derive(Debug)]
pub struct Part {
    body: String,
    server: ServerId,
    parser: Parser,
    truncated: bool,
}

impl Part {
    pub fn new(body: String, server: ServerId, adapter: Arc<dyn Adapter>) -> Self {
        let parser = Parser::new(adapter, &body);
        Self {
            body,
            server,
            parser,
            truncated: false,
        }
    }

    /// Mark the body as cut short by the transport
    pub fn with_truncation(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn server(&self) -> &ServerId {
        &self.server
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// The server said so, or the transport stopped reading early
    pub fn response_incomplete(&self) -> bool {
        self.truncated || self.parser.response_incomplete()
    }
}

/// Every part gathered while resolving one query
#[derive(Debug)]
pub struct Record {
    query: String,
    parts: Vec<Part>,
}

impl Record {
    pub fn new(query: &str, parts: Vec<Part>) -> Self {
        Self {
            query: query.to_string(),
            parts,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The most authoritative server that answered
    pub fn server(&self) -> Option<&ServerId> {
        self.parts.last().map(Part::server)
    }

    /// Resolve `property` across all parts
    pub fn property(&self, property: Property) -> Answer<Value> {
        let supporting: Vec<&Answer<Value>> = self.parts
            .iter()
            .map(|part| part.parser.property(property))
            .filter(|answer| answer.is_supported())
            .collect();

        if supporting.is_empty() {
            return Answer::Unsupported;
        }

        match property.merge_mode() {
            MergeMode::FirstWins => Answer::from_option(supporting.iter().find_map(|answer| answer.value()).cloned()),
            MergeMode::LastWins => supporting.last().map(|answer| (*answer).clone()).unwrap_or(Answer::Absent),
            MergeMode::Concatenate => {
                let mut merged: Option<Value> = None;
                for value in supporting.iter().filter_map(|answer| answer.value()) {
                    merged = Some(match merged {
                        None => value.clone(),
                        Some(acc) => {
                            let kept = acc.clone();
                            acc.union(value).unwrap_or(kept)
                        }
                    });
                }
                Answer::from_option(merged)
            }
        }
    }

    /// Every property at least one part supports, in vocabulary order
    pub fn properties(&self) -> Vec<(Property, Option<Value>)> {
        Property::ALL.into_iter()
            .filter_map(|property| match self.property(property) {
                Answer::Unsupported => None,
                answer => Some((property, answer.into_value())),
            })
            .collect()
    }

    /// Part that decides availability: the last one able to
    fn authoritative(&self) -> Option<&Part> {
        self.parts
            .iter()
            .rev()
            .find(|part| part.parser.property(Property::Available).is_supported())
            .or(self.parts.last())
    }

    pub fn invalid(&self) -> bool {
        self.authoritative().is_some_and(|part| part.parser.invalid())
    }

    pub fn response_throttled(&self) -> bool {
        self.parts.iter().any(|part| part.parser.response_throttled())
    }

    pub fn response_error(&self) -> bool {
        self.parts.iter().any(|part| part.parser.response_error())
    }

    pub fn response_incomplete(&self) -> bool {
        self.parts.iter().any(Part::response_incomplete)
    }

    pub fn response_unavailable(&self) -> bool {
        self.parts.iter().any(|part| part.parser.response_unavailable())
    }

    /// Same servers answered with the same bodies
    pub fn unchanged(&self, other: &Record) -> bool {
        self.parts.len() == other.parts.len() &&
            self.parts
                .iter()
                .zip(&other.parts)
                .all(|(a, b)| a.server == b.server && a.body == b.body)
    }

    pub fn changed(&self, other: &Record) -> bool {
        !self.unchanged(other)
    }

    pub fn disclaimer(&self) -> Answer<String> {
        self.text(Property::Disclaimer)
    }

    pub fn domain(&self) -> Answer<String> {
        self.text(Property::Domain)
    }

    pub fn domain_id(&self) -> Answer<String> {
        self.text(Property::DomainId)
    }

    pub fn status(&self) -> Answer<Vec<String>> {
        self.property(Property::Status).and_then(|v| v.as_text_list())
    }

    pub fn available(&self) -> Answer<bool> {
        self.property(Property::Available).and_then(|v| v.as_flag())
    }

    pub fn registered(&self) -> Answer<bool> {
        self.property(Property::Registered).and_then(|v| v.as_flag())
    }

    pub fn created_on(&self) -> Answer<DateTime<Utc>> {
        self.property(Property::CreatedOn).and_then(|v| v.as_time())
    }

    pub fn updated_on(&self) -> Answer<DateTime<Utc>> {
        self.property(Property::UpdatedOn).and_then(|v| v.as_time())
    }

    pub fn expires_on(&self) -> Answer<DateTime<Utc>> {
        self.property(Property::ExpiresOn).and_then(|v| v.as_time())
    }

    pub fn registrar(&self) -> Answer<Registrar> {
        self.property(Property::Registrar).and_then(|v| v.as_registrar().cloned())
    }

    pub fn registrant_contacts(&self) -> Answer<Vec<Contact>> {
        self.contact_list(Property::RegistrantContacts)
    }

    pub fn admin_contacts(&self) -> Answer<Vec<Contact>> {
        self.contact_list(Property::AdminContacts)
    }

    pub fn technical_contacts(&self) -> Answer<Vec<Contact>> {
        self.contact_list(Property::TechnicalContacts)
    }

    /// Registrant, admin and technical contacts together
    pub fn contacts(&self) -> Vec<Contact> {
        [Property::RegistrantContacts, Property::AdminContacts, Property::TechnicalContacts]
            .into_iter()
            .filter_map(|property| self.contact_list(property).into_value())
            .flatten()
            .collect()
    }

    pub fn nameservers(&self) -> Answer<Vec<Nameserver>> {
        self.property(Property::Nameservers).and_then(|v| v.as_nameservers().map(<[_]>::to_vec))
    }

    fn text(&self, property: Property) -> Answer<String> {
        self.property(property).and_then(|v| v.as_text().map(str::to_string))
    }

    fn contact_list(&self, property: Property) -> Answer<Vec<Contact>> {
        self.property(property).and_then(|v| v.as_contacts().map(<[_]>::to_vec))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bodies: Vec<&str> = self.parts.iter().map(Part::body).collect();
        f.write_str(&bodies.join("\n"))
    }
}
