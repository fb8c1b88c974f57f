use crate::types::{NetworkId, NetworkProfile};
use once_cell::sync::Lazy;

pub const DEVELOPMENT: &str = "development";
pub const MAINNET: &str = "mainnet";

/// Port the local development chain listens on.
pub const DEVELOPMENT_PORT: u16 = 7545;

pub static PRESETS: Lazy<Vec<(&'static str, NetworkProfile)>> = Lazy::new(|| {
    vec![
        (
            DEVELOPMENT,
            NetworkProfile::new("127.0.0.1", DEVELOPMENT_PORT, NetworkId::Any),
        ),
        (
            MAINNET,
            NetworkProfile::new("*.*.*.*", DEVELOPMENT_PORT, NetworkId::Any),
        ),
    ]
});

pub fn preset(name: &str) -> Option<NetworkProfile> {
    PRESETS
        .iter()
        .find(|(preset_name, _)| *preset_name == name)
        .map(|(_, profile)| profile.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let development = preset(DEVELOPMENT).unwrap();
        assert_eq!(development.endpoint().unwrap(), "http://127.0.0.1:7545");
        assert_eq!(development.network_id, NetworkId::Any);

        let mainnet = preset(MAINNET).unwrap();
        assert!(mainnet.is_wildcard_host());
        assert!(preset("kovan").is_none());
    }

    #[test]
    fn test_presets_are_valid() {
        for (name, profile) in PRESETS.iter() {
            assert!(profile.validate(name).is_ok(), "{}", name);
        }
    }
}
