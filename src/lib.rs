//! # WHOIS Record Library
//!
//! Resolves registration data for domains, IP networks and AS numbers by
//! following WHOIS referrals from the entry server to the most authoritative
//! one, and exposes the gathered responses as one typed [`Record`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use whois_record::resolve;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let record = resolve("example.com").await?;
//!     println!("registered: {:?}", record.registered());
//!     println!("expires: {:?}", record.expires_on());
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`resolver`]: entry server lookup, transport and the referral walk
//! - [`scanner`]: grammar-driven tokenizer turning one response into a node tree
//! - [`parsers`]: per-server adapters answering a fixed property vocabulary
//! - [`record`]: parts of one chain and how each property is merged across them
//!
//! Every property answer is an [`Answer`]: a value, `Absent` when the server
//! knows the concept but the response carries nothing, or `Unsupported` when
//! the server never exposes it.

pub mod config;
pub mod core;
pub mod error;
pub mod parsers;
pub mod record;
pub mod resolver;
pub mod scanner;

pub use config::ResolverConfig;
pub use crate::core::{ QueryType, ResourceType, analyze_query };
pub use error::{ TransportError, UnsupportedProperty, WhoisError, WhoisResult };
pub use parsers::{ Adapter, Answer, Catalog, Contact, ContactType, Nameserver, Parser, Property, Registrar, Value };
pub use record::{ Part, Record };
pub use resolver::{ Resolver, Response, ServerDirectory, ServerId, StaticDirectory, TcpTransport, Transport };

/// Resolve `identifier` over TCP with the built-in directory and catalog
pub async fn resolve(identifier: &str) -> WhoisResult<Record> {
    Resolver::default().resolve(identifier).await
}
