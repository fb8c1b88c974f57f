use crate::error::{ConfigError, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_OPTIMIZER_RUNS: u32 = 200;

/// Chain identifier a profile is allowed to deploy to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NetworkId {
    /// `"*"`, accepts whatever chain the node reports.
    #[default]
    Any,
    Id(u64),
}

impl NetworkId {
    /// Accepts `*` or plain decimal digits; no sign, no surrounding whitespace.
    pub fn parse(value: &str) -> Result<Self> {
        if value == "*" {
            return Ok(NetworkId::Any);
        }
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidNetworkId(value.to_string()));
        }
        value
            .parse::<u64>()
            .map(NetworkId::Id)
            .map_err(|_| ConfigError::InvalidNetworkId(value.to_string()))
    }

    pub fn matches(&self, chain_id: u64) -> bool {
        match self {
            NetworkId::Any => true,
            NetworkId::Id(id) => *id == chain_id,
        }
    }
}

impl FromStr for NetworkId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        NetworkId::parse(s)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkId::Any => write!(f, "*"),
            NetworkId::Id(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for NetworkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            NetworkId::Any => serializer.serialize_str("*"),
            NetworkId::Id(id) => serializer.serialize_u64(*id),
        }
    }
}

struct NetworkIdVisitor;

impl<'de> Visitor<'de> for NetworkIdVisitor {
    type Value = NetworkId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("\"*\", a non-negative integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<NetworkId, E> {
        Ok(NetworkId::Id(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<NetworkId, E> {
        u64::try_from(v)
            .map(NetworkId::Id)
            .map_err(|_| E::custom(format!("network id must not be negative: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<NetworkId, E> {
        NetworkId::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for NetworkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(NetworkIdVisitor)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Connection parameters for reaching a blockchain node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkProfile {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub network_id: NetworkId,
    /// Gas limit for deployments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    /// Gas price in wei
    #[serde(default, alias = "gasPrice", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    /// Account deployments are sent from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub websockets: bool,
}

impl NetworkProfile {
    pub fn new(host: impl Into<String>, port: u16, network_id: NetworkId) -> Self {
        NetworkProfile {
            host: host.into(),
            port,
            network_id,
            gas: None,
            gas_price: None,
            from: None,
            websockets: false,
        }
    }

    /// Hosts such as `*.*.*.*` describe a pattern rather than an address.
    pub fn is_wildcard_host(&self) -> bool {
        self.host.contains('*')
    }

    pub fn endpoint(&self) -> Result<String> {
        if self.is_wildcard_host() {
            return Err(ConfigError::WildcardHost(self.host.clone()));
        }
        let scheme = if self.websockets { "ws" } else { "http" };
        if self.host.contains(':') && !self.host.starts_with('[') {
            // IPv6 literal
            return Ok(format!("{}://[{}]:{}", scheme, self.host, self.port));
        }
        Ok(format!("{}://{}:{}", scheme, self.host, self.port))
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason: &str| ConfigError::InvalidProfile {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if self.host.is_empty() {
            return Err(invalid("host is empty"));
        }
        if self.host.chars().any(char::is_whitespace) {
            return Err(invalid("host contains whitespace"));
        }
        if self.host.contains("://") {
            return Err(invalid("host must not include a URL scheme"));
        }
        if self.port == 0 {
            return Err(invalid("port must be non-zero"));
        }
        if let Some(from) = &self.from {
            if !is_account_address(from) {
                return Err(invalid("`from` must be a 0x-prefixed 20-byte hex address"));
            }
        }
        Ok(())
    }
}

fn is_account_address(value: &str) -> bool {
    match value.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerSettings {
    pub enabled: bool,
    /// Expected number of contract executions; trades deploy cost against call cost.
    pub runs: u32,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        OptimizerSettings {
            enabled: false,
            runs: DEFAULT_OPTIMIZER_RUNS,
        }
    }
}

/// The `solc` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerOptions {
    pub optimizer: OptimizerSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl CompilerOptions {
    pub fn validate(&self) -> Result<()> {
        if let Some(version) = &self.version {
            if version.trim().is_empty() {
                return Err(ConfigError::InvalidCompiler(
                    "compiler version must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_id_parsing() {
        assert_eq!(NetworkId::parse("*").unwrap(), NetworkId::Any);
        assert_eq!(NetworkId::parse("1337").unwrap(), NetworkId::Id(1337));
        assert!(NetworkId::parse("+5").is_err());
        assert!(NetworkId::parse(" 1337 ").is_err());
        assert!(NetworkId::parse("").is_err());
        assert!(NetworkId::parse("18446744073709551616").is_err());
        assert!(matches!(
            "main".parse::<NetworkId>(),
            Err(ConfigError::InvalidNetworkId(v)) if v == "main"
        ));
        assert!(NetworkId::parse("-1").is_err());
    }

    #[test]
    fn test_network_id_matching() {
        assert!(NetworkId::Any.matches(1));
        assert!(NetworkId::Any.matches(5777));
        assert!(NetworkId::Id(1).matches(1));
        assert!(!NetworkId::Id(1).matches(3));
    }

    #[test]
    fn test_network_id_serde_forms() {
        let any: NetworkId = serde_json::from_str("\"*\"").unwrap();
        let numeric: NetworkId = serde_json::from_str("5777").unwrap();
        let quoted: NetworkId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(any, NetworkId::Any);
        assert_eq!(numeric, NetworkId::Id(5777));
        assert_eq!(quoted, NetworkId::Id(42));

        assert_eq!(serde_json::to_string(&NetworkId::Any).unwrap(), "\"*\"");
        assert_eq!(serde_json::to_string(&NetworkId::Id(42)).unwrap(), "42");
        assert!(serde_json::from_str::<NetworkId>("true").is_err());
    }

    #[test]
    fn test_endpoint() {
        let mut profile = NetworkProfile::new("127.0.0.1", 7545, NetworkId::Any);
        assert_eq!(profile.endpoint().unwrap(), "http://127.0.0.1:7545");

        profile.websockets = true;
        assert_eq!(profile.endpoint().unwrap(), "ws://127.0.0.1:7545");

        let wildcard = NetworkProfile::new("*.*.*.*", 7545, NetworkId::Any);
        assert!(wildcard.is_wildcard_host());
        assert!(matches!(wildcard.endpoint(), Err(ConfigError::WildcardHost(_))));
    }

    #[test]
    fn test_ipv6_endpoint() {
        let mut profile = NetworkProfile::new("::1", 8545, NetworkId::Any);
        assert!(profile.validate("local").is_ok());
        assert_eq!(profile.endpoint().unwrap(), "http://[::1]:8545");

        profile.host = "[fe80::1]".to_string();
        profile.websockets = true;
        assert_eq!(profile.endpoint().unwrap(), "ws://[fe80::1]:8545");
    }

    #[test]
    fn test_gas_settings_serde() {
        let json = r#"{ "host": "10.0.0.5", "port": 8545, "network_id": 3, "gas": 4612388, "gasPrice": 20000000000 }"#;
        let profile: NetworkProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.gas, Some(4_612_388));
        assert_eq!(profile.gas_price, Some(20_000_000_000));

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["gas"], 4_612_388);
        assert_eq!(value["gas_price"], 20_000_000_000u64);
        let reparsed: NetworkProfile = serde_json::from_value(value).unwrap();
        assert_eq!(reparsed, profile);

        let bare = serde_json::to_value(NetworkProfile::new("10.0.0.5", 8545, NetworkId::Any)).unwrap();
        let keys: Vec<_> = bare.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(bare.get("gas").is_none());
        assert!(bare.get("gas_price").is_none());
        assert!(bare.get("from").is_none());
        assert!(bare.get("websockets").is_none());
    }

    #[test]
    fn test_profile_validation() {
        assert!(NetworkProfile::new("localhost", 8545, NetworkId::Any)
            .validate("dev")
            .is_ok());

        let cases = [
            NetworkProfile::new("", 8545, NetworkId::Any),
            NetworkProfile::new("local host", 8545, NetworkId::Any),
            NetworkProfile::new("http://localhost", 8545, NetworkId::Any),
            NetworkProfile::new("localhost", 0, NetworkId::Any),
        ];
        for profile in cases {
            match profile.validate("dev") {
                Err(ConfigError::InvalidProfile { name, .. }) => assert_eq!(name, "dev"),
                other => panic!("expected InvalidProfile, got {:?}", other),
            }
        }

        let mut profile = NetworkProfile::new("localhost", 8545, NetworkId::Any);
        profile.from = Some("0x627306090abab3a6e1400e9345bc60c78a8bef57".to_string());
        assert!(profile.validate("dev").is_ok());
        profile.from = Some("627306090abab3a6e1400e9345bc60c78a8bef57".to_string());
        assert!(profile.validate("dev").is_err());
    }

    #[test]
    fn test_profile_rejects_unknown_fields() {
        let json = r#"{ "host": "127.0.0.1", "port": 7545, "network_id": "*", "hots": "x" }"#;
        assert!(serde_json::from_str::<NetworkProfile>(json).is_err());
    }

    #[test]
    fn test_compiler_defaults() {
        let options: CompilerOptions = serde_json::from_str("{}").unwrap();
        assert!(!options.optimizer.enabled);
        assert_eq!(options.optimizer.runs, DEFAULT_OPTIMIZER_RUNS);
        assert!(options.validate().is_ok());

        let pinned = CompilerOptions {
            version: Some(" ".to_string()),
            ..CompilerOptions::default()
        };
        assert!(matches!(pinned.validate(), Err(ConfigError::InvalidCompiler(_))));
    }
}
