use crate::error::{ConfigError, Result};
use crate::networks::{DuplicatePolicy, NetworkRegistry, ProfileBlock};
use crate::presets;
use crate::types::{CompilerOptions, NetworkProfile};
use log::{info, warn};
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Everything a build/deploy tool reads from a project: where to deploy and
/// how to compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectConfig {
    pub networks: NetworkRegistry,
    pub solc: CompilerOptions,
}

/// The top level of a configuration document with repeated keys preserved,
/// so duplicates can be resolved by policy instead of by the parser.
struct RawDocument {
    networks: Vec<ProfileBlock>,
    solc: Vec<CompilerOptions>,
}

struct RawDocumentVisitor;

impl<'de> Visitor<'de> for RawDocumentVisitor {
    type Value = RawDocument;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a configuration document with `networks` and `solc` keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<RawDocument, A::Error> {
        let mut document = RawDocument {
            networks: Vec::new(),
            solc: Vec::new(),
        };
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "networks" => document.networks.push(map.next_value()?),
                "solc" => document.solc.push(map.next_value()?),
                other => {
                    warn!("Ignoring unknown configuration key `{}`", other);
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(document)
    }
}

impl<'de> Deserialize<'de> for RawDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(RawDocumentVisitor)
    }
}

impl<'de> Deserialize<'de> for ProjectConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawDocument::deserialize(deserializer)?;
        ProjectConfig::from_raw(raw, DuplicatePolicy::Reject).map_err(de::Error::custom)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        let networks = presets::preset(presets::DEVELOPMENT)
            .map(|development| NetworkRegistry::single(presets::DEVELOPMENT, development))
            .unwrap_or_default();
        ProjectConfig {
            networks,
            solc: CompilerOptions::default(),
        }
    }
}

impl ProjectConfig {
    pub fn new(networks: NetworkRegistry, solc: CompilerOptions) -> Self {
        ProjectConfig { networks, solc }
    }

    fn from_raw(raw: RawDocument, policy: DuplicatePolicy) -> Result<Self> {
        let mut solc = raw.solc;
        if solc.len() > 1 {
            return Err(ConfigError::DuplicateKey("solc"));
        }
        let blocks = raw.networks.into_iter().map(|block| block.0).collect();
        Ok(ProjectConfig {
            networks: NetworkRegistry::from_blocks(blocks, policy)?,
            solc: solc.pop().unwrap_or_default(),
        })
    }

    /// Parses a JSON document. JSON objects may repeat `networks`; `policy`
    /// decides what happens when they do.
    pub fn from_json_str(s: &str, policy: DuplicatePolicy) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(s)?;
        let config = Self::from_raw(raw, policy)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document. The TOML parser rejects repeated tables itself.
    pub fn from_toml_str(s: &str, policy: DuplicatePolicy) -> Result<Self> {
        let raw: RawDocument = toml::from_str(s)?;
        let config = Self::from_raw(raw, policy)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>, policy: DuplicatePolicy) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        let config = match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&fs::read_to_string(path)?, policy)?,
            Some("json") => Self::from_json_str(&fs::read_to_string(path)?, policy)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        info!(
            "Loaded {} network profile(s) from {}",
            config.networks.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, profile) in self.networks.iter() {
            profile.validate(name)?;
        }
        self.solc.validate()
    }

    pub fn network(&self, name: &str) -> Result<&NetworkProfile> {
        self.networks.select(name)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
