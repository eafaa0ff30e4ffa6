use std::time::Duration;

use clap::Parser;

// WHOIS protocol constants
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";
pub const DEFAULT_WHOIS_PORT: u16 = 43;
pub const TIMEOUT_SECONDS: u64 = 10;
pub const CHAIN_TIMEOUT_SECONDS: u64 = 30;
pub const MAX_REFERRAL_HOPS: usize = 5;
pub const MAX_RESPONSE_BYTES: usize = 1_000_000; // 1MB

// Address space that never has a public WHOIS record
pub const PRIVATE_IPV4_RANGES: &[&str] = &[
    "10.0.0.0/8",      // RFC1918
    "172.16.0.0/12",   // RFC1918
    "192.168.0.0/16",  // RFC1918
    "169.254.0.0/16",  // Link-local addresses
    "192.0.2.0/24",    // Documentation examples (TEST-NET-1)
    "198.51.100.0/24", // Documentation examples (TEST-NET-2)
    "203.0.113.0/24",  // Documentation examples (TEST-NET-3)
    "100.64.0.0/10",   // CGNAT (Carrier-grade NAT)
    "127.0.0.0/8",     // Localhost
];

pub const PRIVATE_IPV6_RANGES: &[&str] = &[
    "fc00::/7",      // Unique Local Addresses
    "fe80::/10",     // Link-local addresses
    "::1/128",       // Localhost
    "2001:db8::/32", // Documentation addresses
];

/// Limits applied to one referral chain
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Port used for entry servers and referrals that do not name one
    pub port: u16,
    /// Budget for a single round-trip (connect, write and read)
    pub hop_timeout: Duration,
    /// Budget for the whole chain
    pub chain_timeout: Duration,
    /// Maximum number of servers queried for one identifier
    pub max_hops: usize,
    /// Responses are truncated past this size
    pub max_response_bytes: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_WHOIS_PORT,
            hop_timeout: Duration::from_secs(TIMEOUT_SECONDS),
            chain_timeout: Duration::from_secs(CHAIN_TIMEOUT_SECONDS),
            max_hops: MAX_REFERRAL_HOPS,
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Resolve WHOIS records by following referrals")]
pub struct Cli {
    /// Domain name, IP address, CIDR prefix or AS number to look up
    pub identifier: String,

    /// Query this server directly instead of consulting the directory
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port for entry servers and referrals without an explicit port
    #[arg(short, long, default_value_t = DEFAULT_WHOIS_PORT)]
    pub port: u16,

    /// Per-hop timeout in seconds
    #[arg(long, default_value_t = TIMEOUT_SECONDS)]
    pub timeout: u64,

    /// Timeout for the whole referral chain in seconds
    #[arg(long, default_value_t = CHAIN_TIMEOUT_SECONDS)]
    pub chain_timeout: u64,

    /// Maximum number of servers queried
    #[arg(long, default_value_t = MAX_REFERRAL_HOPS)]
    pub max_hops: usize,

    /// Print the record summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the raw responses of every part instead of the summary
    #[arg(long)]
    pub raw: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Enable trace output (extremely verbose)
    #[arg(short, long)]
    pub trace: bool,
}

impl Cli {
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            port: self.port,
            hop_timeout: Duration::from_secs(self.timeout),
            chain_timeout: Duration::from_secs(self.chain_timeout),
            max_hops: self.max_hops,
            ..ResolverConfig::default()
        }
    }
}
