//! Where a query starts: entry servers per resource type

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use cidr::{ Ipv4Cidr, Ipv6Cidr };
use serde::Serialize;
use tracing::{ debug, warn };

use crate::config::{ DEFAULT_WHOIS_PORT, IANA_WHOIS_SERVER, PRIVATE_IPV4_RANGES, PRIVATE_IPV6_RANGES };
use crate::core::{ QueryType, ResourceType, analyze_query };
use crate::error::{ WhoisError, WhoisResult };

/// A WHOIS server address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ServerId {
    host: String,
    port: u16,
}

impl ServerId {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.trim().trim_end_matches('.').to_lowercase(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`, ready for a socket connect
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parse a referral value: a bare host, `host:port`, or a `whois://` URI.
    /// Other schemes (`rwhois://`, `http://`) are not WHOIS servers and yield
    /// `None`.
    pub fn parse_referral(raw: &str, default_port: u16) -> Option<Self> {
        let raw = raw.trim();
        let authority = match raw.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("whois") => rest,
            Some(_) => return None,
            None => raw,
        };
        let authority = authority.split('/').next().unwrap_or(authority);

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, port.parse::<u16>().ok()?),
            None => (authority, default_port),
        };

        let valid = !host.is_empty() &&
            host.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
        valid.then(|| Self::new(host, port))
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port == DEFAULT_WHOIS_PORT {
            f.write_str(&self.host)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// How a registry can be queried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interface {
    Whois(ServerId),
    /// The registry publishes no WHOIS service
    None,
    /// The registry only offers a web form
    Web(String),
}

/// Entry-server lookup, swappable without touching the engine
pub trait ServerDirectory: Send + Sync {
    fn entry_server_for(&self, resource: ResourceType, query: &QueryType) -> WhoisResult<ServerId>;

    /// The literal string to send to `server` for `query`
    fn query_for(&self, _server: &ServerId, query: &QueryType) -> String {
        query.query_string()
    }
}

/// Request template for one server, `{}` standing for the query
#[derive(Debug, Clone)]
struct QueryFormat {
    host: String,
    /// Restricts the template to one kind of resource
    resource: Option<ResourceType>,
    template: String,
}

/// Built-in directory: a small TLD table, reserved address space, and IANA
/// for everything else (IANA answers with a referral to the registry).
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    port: u16,
    tlds: HashMap<String, Interface>,
    ipv4_reserved: Vec<Ipv4Cidr>,
    ipv6_reserved: Vec<Ipv6Cidr>,
    query_formats: Vec<QueryFormat>,
    /// Where TLDs missing from the table start, IANA unless disabled
    fallback: Option<ServerId>,
}

impl Default for StaticDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_WHOIS_PORT)
    }
}

impl StaticDirectory {
    pub fn new(port: u16) -> Self {
        let whois = |host: &str| Interface::Whois(ServerId::new(host, port));
        let tlds = [
            ("com", whois("whois.verisign-grs.com")),
            ("net", whois("whois.verisign-grs.com")),
            ("tv", whois("tvwhois.verisign-grs.com")),
            ("at", whois("whois.nic.at")),
            ("co.at", whois("whois.nic.at")),
            ("or.at", whois("whois.nic.at")),
            ("de", whois("whois.denic.de")),
            ("org", whois("whois.publicinterestregistry.org")),
            ("es", Interface::Web("https://www.nic.es/".to_string())),
            ("gov.uk", Interface::None),
            ("arpa", whois(IANA_WHOIS_SERVER)),
        ]
            .into_iter()
            .map(|(tld, interface)| (tld.to_string(), interface))
            .collect();

        let ipv4_reserved = PRIVATE_IPV4_RANGES.iter()
            .filter_map(|range| match range.parse::<Ipv4Cidr>() {
                Ok(cidr) => Some(cidr),
                Err(e) => {
                    warn!("Skipping reserved range {}: {}", range, e);
                    None
                }
            })
            .collect();
        let ipv6_reserved = PRIVATE_IPV6_RANGES.iter()
            .filter_map(|range| match range.parse::<Ipv6Cidr>() {
                Ok(cidr) => Some(cidr),
                Err(e) => {
                    warn!("Skipping reserved range {}: {}", range, e);
                    None
                }
            })
            .collect();

        // ARIN searches every object type unless told which one
        let query_formats = [
            ("whois.arin.net", Some(ResourceType::Ipv4), "n + {}"),
            ("whois.arin.net", Some(ResourceType::Ipv6), "n + {}"),
            ("whois.arin.net", Some(ResourceType::Asn16), "a + {}"),
            ("whois.arin.net", Some(ResourceType::Asn32), "a + {}"),
            ("whois.denic.de", None, "-T dn,ace {}"),
            ("whois.verisign-grs.com", None, "={}"),
        ]
            .into_iter()
            .map(|(host, resource, template)| QueryFormat {
                host: host.to_string(),
                resource,
                template: template.to_string(),
            })
            .collect();

        Self {
            port,
            tlds,
            ipv4_reserved,
            ipv6_reserved,
            query_formats,
            fallback: Some(ServerId::new(IANA_WHOIS_SERVER, port)),
        }
    }

    /// Route a TLD (or multi-label suffix such as `co.uk`) to an interface
    pub fn with_tld(mut self, tld: &str, interface: Interface) -> Self {
        self.tlds.insert(tld.trim_start_matches('.').to_lowercase(), interface);
        self
    }

    /// Send `template` to `host`, with `{}` replaced by the query
    pub fn with_query_format(self, host: &str, template: &str) -> Self {
        self.with_format(host, None, template)
    }

    /// Like [`StaticDirectory::with_query_format`], for one resource type only
    pub fn with_resource_query_format(self, host: &str, resource: ResourceType, template: &str) -> Self {
        self.with_format(host, Some(resource), template)
    }

    fn with_format(mut self, host: &str, resource: Option<ResourceType>, template: &str) -> Self {
        let host = host.to_lowercase();
        self.query_formats.retain(|format| format.host != host || format.resource != resource);
        self.query_formats.push(QueryFormat {
            host,
            resource,
            template: template.to_string(),
        });
        self
    }

    /// Fail TLDs missing from the table instead of asking IANA
    pub fn without_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    fn iana(&self) -> ServerId {
        ServerId::new(IANA_WHOIS_SERVER, self.port)
    }

    /// Longest matching suffix wins, so `co.at` beats `at`
    fn lookup_tld(&self, domain: &str) -> Option<&Interface> {
        let labels: Vec<&str> = domain.split('.').collect();
        (0..labels.len()).find_map(|start| self.tlds.get(&labels[start..].join(".")))
    }

    fn is_reserved(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => self.ipv4_reserved.iter().any(|cidr| cidr.contains(&v4)),
            IpAddr::V6(v6) => self.ipv6_reserved.iter().any(|cidr| cidr.contains(&v6)),
        }
    }
}

impl ServerDirectory for StaticDirectory {
    fn entry_server_for(&self, resource: ResourceType, query: &QueryType) -> WhoisResult<ServerId> {
        let query_string = query.query_string();
        match resource {
            ResourceType::Tld => {
                let QueryType::Domain(domain) = query else {
                    return Err(WhoisError::InvalidQuery(query_string));
                };
                match self.lookup_tld(domain) {
                    Some(Interface::Whois(server)) => Ok(server.clone()),
                    Some(Interface::None) => Err(WhoisError::NoInterface { query: query_string }),
                    Some(Interface::Web(url)) => Err(WhoisError::WebInterface {
                        query: query_string,
                        url: url.clone(),
                    }),
                    None => match &self.fallback {
                        Some(server) => {
                            debug!("No table entry for {}, starting at {}", domain, server);
                            Ok(server.clone())
                        }
                        None => Err(WhoisError::NoServerFound(query_string)),
                    },
                }
            }
            ResourceType::Ipv4 | ResourceType::Ipv6 => {
                let Some(ip) = query.address() else {
                    return Err(WhoisError::InvalidQuery(query_string));
                };
                if self.is_reserved(ip) {
                    debug!("{} is reserved address space", ip);
                    return Err(WhoisError::NoInterface { query: query_string });
                }
                Ok(self.iana())
            }
            ResourceType::Asn16 | ResourceType::Asn32 => Ok(self.iana()),
        }
    }

    fn query_for(&self, server: &ServerId, query: &QueryType) -> String {
        let resource = query.resource_type();
        // A template for the resource type beats one for the whole server
        let format = self.query_formats
            .iter()
            .filter(|format| format.host == server.host())
            .filter(|format| format.resource.is_none() || format.resource == resource)
            .max_by_key(|format| format.resource.is_some());

        let query = query.query_string();
        match format {
            Some(format) => format.template.replace("{}", &query),
            None => query,
        }
    }
}

/// Classify `identifier` and find where its chain starts
pub fn entry_server(directory: &dyn ServerDirectory, identifier: &str) -> WhoisResult<(QueryType, ServerId)> {
    let query = analyze_query(identifier);
    let Some(resource) = query.resource_type() else {
        return Err(WhoisError::InvalidQuery(identifier.to_string()));
    };
    let server = directory.entry_server_for(resource, &query)?;
    Ok((query, server))
}
