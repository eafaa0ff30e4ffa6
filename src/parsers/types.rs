//! Semantic values produced by adapters

use std::collections::BTreeMap;
use std::net::IpAddr;

use chrono::{ DateTime, Utc };
use serde::Serialize;

use super::dates::parse_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Registrant,
    Administrative,
    Technical,
}

/// A contact card built from the raw fields of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Contact {
    #[serde(rename = "type")]
    pub contact_type: Option<ContactType>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    /// Every field as it appeared, repeated fields joined by newlines
    pub raw_fields: BTreeMap<String, String>,
}

impl Contact {
    /// Build a contact from `(key, value)` pairs, mapping the usual field
    /// spellings onto the named fields. `strip_prefix` removes an ICANN-style
    /// key prefix such as `"Registrant "` before matching.
    pub fn from_fields<'a>(
        contact_type: ContactType,
        strip_prefix: Option<&str>,
        fields: impl IntoIterator<Item = (&'a str, &'a str)>
    ) -> Self {
        let mut contact = Contact {
            contact_type: Some(contact_type),
            ..Contact::default()
        };

        for (key, value) in fields {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            contact.raw_fields
                .entry(key.to_string())
                .and_modify(|existing| {
                    existing.push('\n');
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());

            let bare = strip_prefix.and_then(|prefix| key.strip_prefix(prefix)).unwrap_or(key);
            contact.assign(&normalize_key(bare), value);
        }

        contact
    }

    fn assign(&mut self, key: &str, value: &str) {
        let slot = match key {
            "id" | "handle" | "nic hdl" | "registry id" | "contact" | "orgid" => &mut self.id,
            "name" | "personname" | "person" | "role" => &mut self.name,
            "org name" | "orgname" => {
                self.organization = Some(value.to_string());
                return;
            }
            "organization" | "organisation" | "org" => &mut self.organization,
            "address" | "street" | "street address" => {
                append_line(&mut self.address, value);
                return;
            }
            "city" => &mut self.city,
            "zip" | "postal code" | "zip code" | "postcode" | "postalcode" => &mut self.zip,
            "state" | "state/province" | "province" | "stateprov" => &mut self.state,
            "country" => {
                if value.len() == 2 && value.chars().all(|c| c.is_ascii_alphabetic()) {
                    self.country_code.get_or_insert_with(|| value.to_uppercase());
                }
                &mut self.country
            }
            "country code" => &mut self.country_code,
            "phone" | "phone number" | "voice" => &mut self.phone,
            "fax" | "fax no" | "fax number" => &mut self.fax,
            "email" | "e mail" => &mut self.email,
            "url" | "website" => &mut self.url,
            "created" | "creation date" | "regdate" => {
                if self.created_on.is_none() {
                    self.created_on = parse_time(value);
                }
                return;
            }
            "changed" | "last modified" | "updated" | "updated date" => {
                if self.updated_on.is_none() {
                    self.updated_on = parse_time(value);
                }
                return;
            }
            _ => return,
        };
        slot.get_or_insert_with(|| value.to_string());
    }
}

fn append_line(slot: &mut Option<String>, value: &str) {
    match slot {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(value);
        }
        None => *slot = Some(value.to_string()),
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(['-', '_'], " ")
}

/// One delegated nameserver, optionally with glue addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Nameserver {
    pub name: String,
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
}

impl Nameserver {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().trim_end_matches('.').to_lowercase(),
            ipv4: None,
            ipv6: None,
        }
    }

    /// Split a `"ns1.example. 10.0.0.1 2001:db8::1"` style value into the
    /// host name and its glue addresses. Tokens that are not addresses are
    /// ignored.
    pub fn parse(value: &str) -> Option<Self> {
        let mut tokens = value.split_whitespace();
        let mut nameserver = Self::new(tokens.next()?);
        if nameserver.name.is_empty() {
            return None;
        }

        for token in tokens {
            let token = token.trim_matches(|c: char| c == '(' || c == ')' || c == ',');
            match token.parse::<IpAddr>() {
                Ok(IpAddr::V4(ip)) if nameserver.ipv4.is_none() => nameserver.ipv4 = Some(ip.to_string()),
                Ok(IpAddr::V6(ip)) if nameserver.ipv6.is_none() => nameserver.ipv6 = Some(ip.to_string()),
                _ => {}
            }
        }
        Some(nameserver)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Registrar {
    pub id: Option<String>,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub url: Option<String>,
}

impl Registrar {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none() && self.organization.is_none() && self.url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nameserver_with_glue() {
        let ns = Nameserver::parse("ns1.example. 10.0.0.1").expect("nameserver");
        assert_eq!(ns.name, "ns1.example");
        assert_eq!(ns.ipv4.as_deref(), Some("10.0.0.1"));
        assert_eq!(ns.ipv6, None);

        let ns = Nameserver::parse("A.GTLD-SERVERS.NET 192.5.6.30 2001:503:a83e:0:0:0:2:30").expect("nameserver");
        assert_eq!(ns.name, "a.gtld-servers.net");
        assert_eq!(ns.ipv6.as_deref(), Some("2001:503:a83e::2:30"));
    }

    #[test]
    fn test_nameserver_without_glue() {
        let ns = Nameserver::parse("ns2.example.").expect("nameserver");
        assert_eq!(ns, Nameserver::new("ns2.example"));
        assert!(Nameserver::parse("   ").is_none());
    }

    #[test]
    fn test_contact_from_rpsl_fields() {
        let fields = [
            ("personname", "Domain Administrator"),
            ("organization", "Google LLC"),
            ("street address", "1600 Amphitheatre Parkway"),
            ("postal code", "94043"),
            ("city", "Mountain View"),
            ("country", "United States of America (the)"),
            ("e-mail", "dns-admin@google.com"),
            ("nic-hdl", "GL11783559-NICAT"),
            ("changed", "20180302 18:52:05"),
        ];
        let contact = Contact::from_fields(ContactType::Registrant, None, fields);

        assert_eq!(contact.contact_type, Some(ContactType::Registrant));
        assert_eq!(contact.id.as_deref(), Some("GL11783559-NICAT"));
        assert_eq!(contact.name.as_deref(), Some("Domain Administrator"));
        assert_eq!(contact.zip.as_deref(), Some("94043"));
        assert_eq!(contact.email.as_deref(), Some("dns-admin@google.com"));
        assert_eq!(contact.country_code, None);
        assert_eq!(
            contact.updated_on.map(|t| t.date_naive().to_string()),
            Some("2018-03-02".to_string())
        );
        assert_eq!(contact.raw_fields.len(), 9);
    }

    #[test]
    fn test_contact_from_prefixed_fields() {
        let fields = [
            ("Admin Name", "Jane Doe"),
            ("Admin Street", "1 Main St"),
            ("Admin Street", "Suite 2"),
            ("Admin Country", "us"),
            ("Admin Phone", ""),
        ];
        let contact = Contact::from_fields(ContactType::Administrative, Some("Admin "), fields);

        assert_eq!(contact.name.as_deref(), Some("Jane Doe"));
        assert_eq!(contact.address.as_deref(), Some("1 Main St\nSuite 2"));
        assert_eq!(contact.country_code.as_deref(), Some("US"));
        assert_eq!(contact.phone, None);
        assert_eq!(contact.raw_fields.get("Admin Street").map(String::as_str), Some("1 Main St\nSuite 2"));
    }
}
