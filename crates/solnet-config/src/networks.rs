use crate::error::{ConfigError, Result};
use crate::types::NetworkProfile;
use log::warn;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How repeated `networks` declarations are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Any repeated block or profile name is an error.
    #[default]
    Reject,
    /// Repeated blocks are unioned; repeated profile names are still an error.
    Merge,
    /// Only the last block survives, as object-literal shadowing would do.
    LastBlockWins,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Reject => write!(f, "reject"),
            DuplicatePolicy::Merge => write!(f, "merge"),
            DuplicatePolicy::LastBlockWins => write!(f, "last-block-wins"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "merge" => Ok(DuplicatePolicy::Merge),
            "last-block-wins" | "last_block_wins" => Ok(DuplicatePolicy::LastBlockWins),
            _ => Err(format!("Unknown duplicate policy: {}", s)),
        }
    }
}

/// One `networks` declaration exactly as written: order kept, duplicates kept.
pub(crate) struct ProfileBlock(pub(crate) Vec<(String, NetworkProfile)>);

struct ProfileBlockVisitor;

impl<'de> Visitor<'de> for ProfileBlockVisitor {
    type Value = ProfileBlock;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of network profile names to profiles")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<ProfileBlock, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, profile)) = map.next_entry::<String, NetworkProfile>()? {
            entries.push((name, profile));
        }
        Ok(ProfileBlock(entries))
    }
}

impl<'de> Deserialize<'de> for ProfileBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ProfileBlockVisitor)
    }
}

/// Named network profiles, keyed by profile name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NetworkRegistry {
    profiles: BTreeMap<String, NetworkProfile>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from every `networks` declaration of a document,
    /// in the order they were declared.
    pub fn from_blocks(
        blocks: Vec<Vec<(String, NetworkProfile)>>,
        policy: DuplicatePolicy,
    ) -> Result<Self> {
        if blocks.len() > 1 && policy == DuplicatePolicy::Reject {
            return Err(ConfigError::DuplicateNetworksBlock);
        }

        let mut registry = NetworkRegistry::new();
        for block in blocks {
            let mut layer = NetworkRegistry::new();
            for (name, profile) in block {
                layer.insert(name, profile)?;
            }
            registry.merge(layer, policy)?;
        }
        Ok(registry)
    }

    pub(crate) fn single(name: impl Into<String>, profile: NetworkProfile) -> Self {
        NetworkRegistry {
            profiles: BTreeMap::from([(name.into(), profile)]),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, profile: NetworkProfile) -> Result<()> {
        let name = name.into();
        if self.profiles.contains_key(&name) {
            return Err(ConfigError::DuplicateProfile(name));
        }
        self.profiles.insert(name, profile);
        Ok(())
    }

    /// Layers `other` on top of this registry.
    pub fn merge(&mut self, other: NetworkRegistry, policy: DuplicatePolicy) -> Result<()> {
        match policy {
            DuplicatePolicy::Reject | DuplicatePolicy::Merge => {
                if let Some(name) = other.profiles.keys().find(|n| self.profiles.contains_key(*n)) {
                    return Err(ConfigError::DuplicateProfile(name.clone()));
                }
                self.profiles.extend(other.profiles);
            }
            DuplicatePolicy::LastBlockWins => {
                for name in self.profiles.keys() {
                    warn!("Network profile `{}` is shadowed by a later `networks` block", name);
                }
                self.profiles = other.profiles;
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NetworkProfile> {
        self.profiles.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut NetworkProfile> {
        self.profiles.get_mut(name)
    }

    pub fn select(&self, name: &str) -> Result<&NetworkProfile> {
        self.get(name).ok_or_else(|| ConfigError::UnknownNetwork {
            name: name.to_string(),
            available: self.names().map(str::to_string).collect(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NetworkProfile)> {
        self.profiles.iter().map(|(name, profile)| (name.as_str(), profile))
    }

    /// Profiles that would accept a node reporting `chain_id`.
    pub fn matching(&self, chain_id: u64) -> impl Iterator<Item = (&str, &NetworkProfile)> {
        self.iter()
            .filter(move |(_, profile)| profile.network_id.matches(chain_id))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl<'de> Deserialize<'de> for NetworkRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let block = ProfileBlock::deserialize(deserializer)?;
        NetworkRegistry::from_blocks(vec![block.0], DuplicatePolicy::Reject).map_err(de::Error::custom)
    }
}
