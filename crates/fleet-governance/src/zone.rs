//! DNS zones and the records declared against them.

use crate::deferred::Deferred;
use crate::error::{GovernanceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Provider account owning the zones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountConfig {
    pub account_id: String,
    pub user_id: String,
}

/// A declared zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Domain name (e.g., "example.com").
    pub name: String,
    /// Label other declarations refer to the zone by.
    pub label: String,
}

/// Account plus its zones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonesConfig {
    pub account: AccountConfig,
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

impl ZonesConfig {
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| GovernanceError::Config(e.to_string()))
    }
}

/// Records declared for one zone label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsConfig {
    pub zone: String,
    #[serde(default)]
    pub records: Vec<DnsRecordConfig>,
}

impl DnsConfig {
    pub fn parse_list(yaml: &str) -> Result<Vec<Self>> {
        serde_yaml::from_str(yaml).map_err(|e| GovernanceError::Config(e.to_string()))
    }
}

/// A declared DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    pub ttl: u32,
    #[serde(default)]
    pub proxied: Option<bool>,
    #[serde(default)]
    pub priority: Option<u16>,
}

/// Supported DNS record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
    Ns,
    Srv,
    Caa,
}

impl RecordType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(RecordType::A),
            "AAAA" => Some(RecordType::Aaaa),
            "CNAME" => Some(RecordType::Cname),
            "MX" => Some(RecordType::Mx),
            "TXT" => Some(RecordType::Txt),
            "NS" => Some(RecordType::Ns),
            "SRV" => Some(RecordType::Srv),
            "CAA" => Some(RecordType::Caa),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
            RecordType::Ns => "NS",
            RecordType::Srv => "SRV",
            RecordType::Caa => "CAA",
        };
        write!(f, "{}", s)
    }
}

/// A resolved zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub label: String,
    pub name: String,
    pub account_id: String,
    /// Provider zone id, known once the zone is materialized.
    pub id: Deferred,
    pub ssl: String,
    pub always_use_https: bool,
}

impl Zone {
    pub fn new(account_id: impl Into<String>, cfg: &ZoneConfig) -> Self {
        Self {
            label: cfg.label.clone(),
            name: cfg.name.clone(),
            account_id: account_id.into(),
            id: Deferred::pending(format!("zone-{}.id", cfg.label)),
            ssl: "full".into(),
            always_use_https: true,
        }
    }
}

/// A DNS record bound to its zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub zone_id: Deferred,
    pub name: String,
    pub record_type: RecordType,
    pub value: String,
    pub ttl: u32,
    pub proxied: bool,
    pub priority: Option<u16>,
}

/// Zones keyed by label.
pub type ZoneRegistry = BTreeMap<String, Zone>;

/// Resolves zones and the DNS records that reference them.
#[derive(Debug, Clone)]
pub struct ZoneResolver {
    config: ZonesConfig,
}

impl ZoneResolver {
    pub fn new(config: ZonesConfig) -> Self {
        Self { config }
    }

    /// Build the zone registry.
    pub fn load(&self) -> ZoneRegistry {
        self.config
            .zones
            .iter()
            .map(|cfg| (cfg.label.clone(), Zone::new(&self.config.account.account_id, cfg)))
            .collect()
    }

    /// Bind DNS declarations to registered zones, keyed by zone label.
    pub fn resolve_dns(
        zones: &ZoneRegistry,
        dns: &[DnsConfig],
    ) -> Result<BTreeMap<String, Vec<DnsRecord>>> {
        let mut resolved = BTreeMap::new();

        for cfg in dns {
            let zone = zones
                .get(&cfg.zone)
                .ok_or_else(|| GovernanceError::ZoneNotFound(cfg.zone.clone()))?;

            let records = cfg
                .records
                .iter()
                .map(|record| Self::resolve_record(zone, record))
                .collect::<Result<Vec<_>>>()?;

            debug!(zone = %zone.label, records = records.len(), "resolved dns records");
            resolved.insert(cfg.zone.clone(), records);
        }

        Ok(resolved)
    }

    fn resolve_record(zone: &Zone, cfg: &DnsRecordConfig) -> Result<DnsRecord> {
        let record_type =
            RecordType::parse(&cfg.record_type).ok_or_else(|| GovernanceError::InvalidRecord {
                zone: zone.label.clone(),
                name: cfg.name.clone(),
                reason: format!("unsupported record type: {}", cfg.record_type),
            })?;

        Ok(DnsRecord {
            zone_id: zone.id.clone(),
            name: cfg.name.clone(),
            record_type,
            value: cfg.value.clone(),
            ttl: cfg.ttl,
            proxied: cfg.proxied.unwrap_or(false),
            // Zero means unset
            priority: cfg.priority.filter(|priority| *priority != 0),
        })
    }
}
