use std::net::{ IpAddr, Ipv4Addr, Ipv6Addr };

use cidr::{ Ipv4Cidr, Ipv6Cidr };
use once_cell::sync::Lazy;
use regex::Regex;

static ASN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:AS)?(\d+)$").expect("valid ASN pattern"));
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(||
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern")
);

/// Kind of resource a WHOIS server is responsible for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Tld,
    Ipv4,
    Ipv6,
    Asn16,
    Asn32,
}

// WHOIS query types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryType {
    Domain(String),
    IPv4(Ipv4Addr),
    IPv4Network(Ipv4Cidr),
    IPv6(Ipv6Addr),
    IPv6Network(Ipv6Cidr),
    Asn(u32),
    Email(String),
    Unknown(String),
}

impl QueryType {
    /// Resource type used to pick the entry server, `None` for queries no
    /// WHOIS server answers
    pub fn resource_type(&self) -> Option<ResourceType> {
        match self {
            QueryType::Domain(_) => Some(ResourceType::Tld),
            QueryType::IPv4(_) | QueryType::IPv4Network(_) => Some(ResourceType::Ipv4),
            QueryType::IPv6(_) | QueryType::IPv6Network(_) => Some(ResourceType::Ipv6),
            QueryType::Asn(asn) if *asn <= u32::from(u16::MAX) => Some(ResourceType::Asn16),
            QueryType::Asn(_) => Some(ResourceType::Asn32),
            QueryType::Email(_) | QueryType::Unknown(_) => None,
        }
    }

    /// The string sent to the server
    pub fn query_string(&self) -> String {
        match self {
            QueryType::Domain(domain) => domain.clone(),
            QueryType::IPv4(ip) => ip.to_string(),
            QueryType::IPv4Network(cidr) => cidr.to_string(),
            QueryType::IPv6(ip) => ip.to_string(),
            QueryType::IPv6Network(cidr) => cidr.to_string(),
            QueryType::Asn(asn) => format!("AS{}", asn),
            QueryType::Email(value) | QueryType::Unknown(value) => value.clone(),
        }
    }

    /// First address covered by an IP query
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            QueryType::IPv4(ip) => Some(IpAddr::V4(*ip)),
            QueryType::IPv4Network(cidr) => Some(IpAddr::V4(cidr.first_address())),
            QueryType::IPv6(ip) => Some(IpAddr::V6(*ip)),
            QueryType::IPv6Network(cidr) => Some(IpAddr::V6(cidr.first_address())),
            _ => None,
        }
    }
}

pub fn analyze_query(query: &str) -> QueryType {
    let query = query.trim();

    // Reverse DNS names describe an IPv4 address
    if let Some(ip) = parse_in_addr_arpa(query) {
        return QueryType::IPv4(ip);
    }

    if let Ok(ip) = query.parse::<IpAddr>() {
        return match ip {
            IpAddr::V4(v4) => QueryType::IPv4(v4),
            IpAddr::V6(v6) => QueryType::IPv6(v6),
        };
    }

    if query.contains('/') {
        if let Ok(cidr) = query.parse::<Ipv4Cidr>() {
            return QueryType::IPv4Network(cidr);
        }
        if let Ok(cidr) = query.parse::<Ipv6Cidr>() {
            return QueryType::IPv6Network(cidr);
        }
    }

    if let Some(caps) = ASN_REGEX.captures(query)
        && let Ok(asn) = caps[1].parse::<u32>()
    {
        return QueryType::Asn(asn);
    }

    if EMAIL_REGEX.is_match(query) {
        return QueryType::Email(query.to_string());
    }

    if is_domain(query) {
        return QueryType::Domain(query.trim_end_matches('.').to_lowercase());
    }

    QueryType::Unknown(query.to_string())
}

fn is_domain(query: &str) -> bool {
    let name = query.trim_end_matches('.');
    !name.is_empty() &&
        name.len() <= 253 &&
        name.split('.').all(|label| {
            !label.is_empty() &&
                label.len() <= 63 &&
                !label.starts_with('-') &&
                !label.ends_with('-') &&
                label.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        })
}

fn parse_in_addr_arpa(query: &str) -> Option<Ipv4Addr> {
    let lower = query.trim_end_matches('.').to_lowercase();
    let reversed = lower.strip_suffix(".in-addr.arpa")?;

    let mut octets: Vec<u8> = Vec::with_capacity(4);
    for label in reversed.split('.').rev() {
        octets.push(label.parse::<u8>().ok()?);
    }
    // Partial zones (e.g. 2.0.192.in-addr.arpa) describe the network address
    if octets.is_empty() || octets.len() > 4 {
        return None;
    }
    octets.resize(4, 0);
    Some(Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]))
}
