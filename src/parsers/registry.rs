//! Catalog of adapters indexed by the server host they parse

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use super::{ Adapter, Parser, servers };

static BUILTIN: Lazy<Arc<Catalog>> = Lazy::new(|| {
    // Patterns are literals covered by the family tests
    Arc::new(Catalog::builtin().expect("built-in grammars compile"))
});

/// Host to adapter map with a fallback for servers without a dedicated one
pub struct Catalog {
    adapters: HashMap<String, Arc<dyn Adapter>>,
    fallback: Arc<dyn Adapter>,
}

impl Catalog {
    /// Empty catalog answering every host with `fallback`
    pub fn new(fallback: Arc<dyn Adapter>) -> Self {
        Self {
            adapters: HashMap::new(),
            fallback,
        }
    }

    /// Catalog with every built-in family registered
    pub fn builtin() -> Result<Self, regex::Error> {
        let mut catalog = Self::new(Arc::new(servers::icann::adapter()?));
        for family in servers::families()? {
            for host in family.hosts {
                catalog.adapters.insert(host.to_string(), family.adapter.clone());
            }
        }
        Ok(catalog)
    }

    /// Process-wide built-in catalog
    pub fn shared() -> Arc<Catalog> {
        BUILTIN.clone()
    }

    /// Register an adapter for `host`
    ///
    /// # Errors
    /// Returns an error if the host already has an adapter
    pub fn register(&mut self, host: &str, adapter: Arc<dyn Adapter>) -> Result<(), anyhow::Error> {
        let host = host.trim().to_lowercase();

        if let Some(existing) = self.adapters.get(&host) {
            return Err(anyhow::anyhow!("Host {} is already handled by the {} adapter", host, existing.name()));
        }

        debug!("Registered {} adapter for {}", adapter.name(), host);
        self.adapters.insert(host, adapter);
        Ok(())
    }

    /// Adapter for `host`, case-insensitive, falling back to the generic one
    pub fn adapter_for(&self, host: &str) -> Arc<dyn Adapter> {
        match self.adapters.get(&host.to_lowercase()) {
            Some(adapter) => adapter.clone(),
            None => {
                debug!("No dedicated adapter for {}, using {}", host, self.fallback.name());
                self.fallback.clone()
            }
        }
    }

    /// Tokenize `raw` with the adapter for `host`
    pub fn parse(&self, host: &str, raw: &str) -> Parser {
        Parser::new(self.adapter_for(host), raw)
    }

    pub fn hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self.adapters.keys().cloned().collect();
        hosts.sort();
        hosts
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{ Answer, Property };

    #[test]
    fn test_builtin_families() {
        let catalog = Catalog::builtin().expect("catalog");

        assert!(!catalog.is_empty());
        assert_eq!(catalog.adapter_for("whois.nic.at").name(), "nic.at");
        assert_eq!(catalog.adapter_for("WHOIS.IANA.ORG").name(), "iana");
        assert_eq!(catalog.adapter_for("tvwhois.verisign-grs.com").name(), "verisign");
        assert_eq!(catalog.adapter_for("whois.apnic.net").name(), "rpsl");
        assert_eq!(catalog.adapter_for("whois.markmonitor.com").name(), "icann");
        assert!(catalog.hosts().contains(&"whois.arin.net".to_string()));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut catalog = Catalog::builtin().expect("catalog");
        let adapter: Arc<dyn Adapter> = Arc::new(servers::icann::adapter().expect("icann"));

        assert!(catalog.register("whois.example-registrar.net", adapter.clone()).is_ok());
        assert!(catalog.register("Whois.Example-Registrar.NET", adapter.clone()).is_err());
        assert!(catalog.register("whois.nic.at", adapter).is_err());
    }

    #[test]
    fn test_parse_dispatches_on_host() {
        let parser = Catalog::shared().parse("whois.nic.at", "Status: free\n");

        assert_eq!(parser.adapter_name(), "nic.at");
        assert_eq!(parser.available(), Answer::Value(true));
        assert!(parser.property(Property::ExpiresOn).is_unsupported());
    }
}
