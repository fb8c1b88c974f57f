use crate::error::Result;
use crate::networks::DuplicatePolicy;
use crate::project::ProjectConfig;
use crate::types::NetworkId;
use config::{Config, Environment, Map};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::env;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Environment variable naming the configuration file when none is given.
pub const CONFIG_PATH_VAR: &str = "SOLNET_CONFIG";

/// Prefix of environment overrides, e.g. `SOLNET__NETWORKS__MAINNET__PORT`.
pub const ENV_PREFIX: &str = "SOLNET";
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone)]
enum DotenvSource {
    WorkingDir,
    Path(PathBuf),
}

/// Builds a [`ProjectConfig`] from a `.env` file, a configuration file and
/// environment overrides, in that order.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    dotenv: Option<DotenvSource>,
    policy: DuplicatePolicy,
    env_source: Option<Map<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn with_dotenv(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv = Some(DotenvSource::Path(path.into()));
        self
    }

    pub fn with_default_dotenv(mut self) -> Self {
        self.dotenv = Some(DotenvSource::WorkingDir);
        self
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reads variables from `vars` instead of the process environment.
    pub fn with_env_source(mut self, vars: Map<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    pub fn load(&self) -> Result<ProjectConfig> {
        self.load_dotenv()?;

        let mut project = match self.config_path() {
            Some(path) => ProjectConfig::from_path(&path, self.policy)?,
            None => {
                info!("No configuration file given, using the default development profile");
                ProjectConfig::default()
            }
        };

        self.apply_env_overrides(&mut project)?;
        project.validate()?;
        Ok(project)
    }

    /// Only the working directory itself is consulted, never its ancestors.
    fn dotenv_path(&self) -> Result<Option<PathBuf>> {
        Ok(match &self.dotenv {
            None => None,
            Some(DotenvSource::WorkingDir) => Some(env::current_dir()?.join(".env")),
            Some(DotenvSource::Path(path)) => Some(path.clone()),
        })
    }

    fn load_dotenv(&self) -> Result<()> {
        let Some(path) = self.dotenv_path()? else {
            return Ok(());
        };

        match dotenv::from_path(&path) {
            Ok(()) => {
                info!("Loaded environment from {}", path.display());
                Ok(())
            }
            Err(dotenv::Error::Io(err)) if err.kind() == ErrorKind::NotFound => {
                debug!("No .env file found, skipping");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.file {
            return Some(path.clone());
        }
        let from_env = match &self.env_source {
            Some(vars) => vars.get(CONFIG_PATH_VAR).cloned(),
            None => env::var(CONFIG_PATH_VAR).ok(),
        };
        from_env.filter(|p| !p.is_empty()).map(PathBuf::from)
    }

    fn apply_env_overrides(&self, project: &mut ProjectConfig) -> Result<()> {
        let overrides = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .source(self.env_source.clone()),
            )
            .build()?;

        if let Some(profiles) = lookup::<Map<String, config::Value>>(&overrides, "networks")? {
            for name in profiles.keys() {
                if !project.networks.names().any(|known| known.to_lowercase() == *name) {
                    warn!("Ignoring overrides for unknown network profile `{}`", name);
                }
            }
        }

        let names: Vec<String> = project.networks.names().map(str::to_string).collect();
        for name in names {
            let key = |field: &str| format!("networks.{}.{}", name.to_lowercase(), field);
            let host = lookup::<String>(&overrides, &key("host"))?;
            let port = lookup::<u16>(&overrides, &key("port"))?;
            let network_id = lookup::<String>(&overrides, &key("network_id"))?
                .map(|id| NetworkId::parse(&id))
                .transpose()?;

            let Some(profile) = project.networks.get_mut(&name) else {
                continue;
            };
            if let Some(host) = host {
                debug!("Overriding host of `{}` from environment", name);
                profile.host = host;
            }
            if let Some(port) = port {
                debug!("Overriding port of `{}` from environment", name);
                profile.port = port;
            }
            if let Some(network_id) = network_id {
                debug!("Overriding network id of `{}` from environment", name);
                profile.network_id = network_id;
            }
        }

        if let Some(enabled) = lookup::<bool>(&overrides, "solc.optimizer.enabled")? {
            project.solc.optimizer.enabled = enabled;
        }
        if let Some(runs) = lookup::<u32>(&overrides, "solc.optimizer.runs")? {
            project.solc.optimizer.runs = runs;
        }
        Ok(())
    }
}

/// Missing keys are `None`; malformed values are errors.
fn lookup<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
