//! Error types for the resolver and its collaborators

use thiserror::Error;

use crate::parsers::Property;
use crate::record::Record;
use crate::resolver::directory::ServerId;

/// Failure of a single network round-trip
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Timed out talking to {0}")]
    Timeout(String),

    #[error("Connection refused by {0}")]
    ConnectionRefused(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Chain-level failure surfaced by [`crate::Resolver`]
#[derive(Error, Debug)]
pub enum WhoisError {
    #[error("No WHOIS server known for {0}")]
    NoServerFound(String),

    #[error("{query} has no public WHOIS interface")]
    NoInterface { query: String },

    #[error("{query} is only searchable through the web interface at {url}")]
    WebInterface { query: String, url: String },

    #[error("Unable to classify query: {0}")]
    InvalidQuery(String),

    #[error("Referral chain exceeded {limit} hops")]
    ChainTooLong { limit: usize, record: Box<Record> },

    #[error("Resolving {0} exceeded the chain timeout")]
    Timeout(String),

    #[error("Query to {server} failed: {source}")]
    Transport {
        server: ServerId,
        #[source]
        source: TransportError,
        /// Parts received from earlier servers in the chain
        record: Box<Record>,
    },
}

/// Result type for resolver operations
pub type WhoisResult<T> = Result<T, WhoisError>;

impl WhoisError {
    /// The records gathered before the chain was aborted, if any
    pub fn partial_record(&self) -> Option<&Record> {
        match self {
            Self::ChainTooLong { record, .. } => Some(record),
            Self::Transport { record, .. } if !record.parts().is_empty() => Some(record),
            _ => None,
        }
    }
}

/// The answering server does not expose this concept at all.
///
/// This is a typed "not applicable" signal rather than a failure; it is
/// what [`crate::parsers::Answer::into_result`] yields for unsupported
/// properties.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Property {0} is not supported by this server")]
pub struct UnsupportedProperty(pub Property);
