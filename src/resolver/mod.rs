//! Referral-following query engine
//!
//! Resolution walks a strictly sequential chain: ask the entry server, look
//! for a referral in its answer, ask the referred server, and so on. The walk
//! stops when a response carries no referral, refers back to a server already
//! asked, or reports a fatal error. Exceeding the hop limit with a referral
//! still pending fails with [`WhoisError::ChainTooLong`], which carries the
//! parts gathered so far. A failed round-trip ends in [`WhoisError::Transport`]
//! carrying the same.

pub mod directory;
pub mod transport;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{ debug, warn };

use crate::config::ResolverConfig;
use crate::core::{ QueryType, analyze_query };
use crate::error::{ TransportError, WhoisError, WhoisResult };
use crate::parsers::Catalog;
use crate::record::{ Part, Record };

pub use directory::{ Interface, ServerDirectory, ServerId, StaticDirectory, entry_server };
pub use transport::{ Response, TcpTransport, Transport };

/// Query engine over a transport, a server directory and an adapter catalog
pub struct Resolver<T = TcpTransport, D = StaticDirectory> {
    transport: T,
    directory: D,
    catalog: Arc<Catalog>,
    config: ResolverConfig,
}

impl Resolver {
    /// TCP transport, built-in directory and catalog
    pub fn new(config: ResolverConfig) -> Self {
        let transport = TcpTransport::new(config.hop_timeout, config.max_response_bytes);
        let directory = StaticDirectory::new(config.port);
        Self::with_parts(transport, directory, Catalog::shared(), config)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl<T: Transport, D: ServerDirectory> Resolver<T, D> {
    pub fn with_parts(transport: T, directory: D, catalog: Arc<Catalog>, config: ResolverConfig) -> Self {
        Self {
            transport,
            directory,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Classify `identifier`, find its entry server and follow referrals
    pub async fn resolve(&self, identifier: &str) -> WhoisResult<Record> {
        let (query, server) = entry_server(&self.directory, identifier)?;
        self.follow(&query, server).await
    }

    /// Follow referrals starting at `server`, bypassing the directory
    pub async fn resolve_from(&self, identifier: &str, server: ServerId) -> WhoisResult<Record> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(WhoisError::InvalidQuery(identifier.to_string()));
        }
        self.follow(&analyze_query(identifier), server).await
    }

    async fn follow(&self, query: &QueryType, entry: ServerId) -> WhoisResult<Record> {
        match tokio::time::timeout(self.config.chain_timeout, self.walk(query, entry)).await {
            Ok(result) => result,
            Err(_) => {
                let query = query.query_string();
                warn!("Resolving {} exceeded {:?}", query, self.config.chain_timeout);
                Err(WhoisError::Timeout(query))
            }
        }
    }

    async fn walk(&self, query_type: &QueryType, entry: ServerId) -> WhoisResult<Record> {
        let query = query_type.query_string();
        let query = query.as_str();
        let mut parts: Vec<Part> = Vec::new();
        let mut visited: HashSet<ServerId> = HashSet::new();
        let mut next = Some(entry);

        while let Some(server) = next.take() {
            if parts.len() >= self.config.max_hops {
                warn!("Referral chain for {} exceeded {} hops at {}", query, self.config.max_hops, server);
                return Err(WhoisError::ChainTooLong {
                    limit: self.config.max_hops,
                    record: Box::new(Record::new(query, parts)),
                });
            }
            visited.insert(server.clone());

            let request = self.directory.query_for(&server, query_type);
            debug!("Hop {}: sending {:?} to {}", parts.len() + 1, request, server);

            let response = match tokio::time::timeout(self.config.hop_timeout, self.transport.send(&request, &server)).await {
                Ok(Ok(response)) => response,
                Ok(Err(source)) => {
                    return Err(WhoisError::Transport {
                        server,
                        source,
                        record: Box::new(Record::new(query, parts)),
                    });
                }
                Err(_) => {
                    let source = TransportError::Timeout(server.to_string());
                    return Err(WhoisError::Transport {
                        server,
                        source,
                        record: Box::new(Record::new(query, parts)),
                    });
                }
            };

            let adapter = self.catalog.adapter_for(server.host());
            let part = Part::new(response.body, server, adapter).with_truncation(response.truncated);
            let parser = part.parser();

            if parser.response_error() {
                debug!("{} answered with an error, stopping", part.server());
            } else if let Some(referral) = parser.referral(self.config.port) {
                if visited.contains(&referral) {
                    debug!("{} refers back to {}, stopping", part.server(), referral);
                } else {
                    debug!("{} refers to {}", part.server(), referral);
                    next = Some(referral);
                }
            }

            parts.push(part);
        }

        Ok(Record::new(query, parts))
    }
}
