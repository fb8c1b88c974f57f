//! solnet-config crate
//!
//! This crate handles the deployment configuration for solnet projects:
//! named network profiles, compiler options and the layered loader that
//! reads them from files, `.env` and the process environment.

pub mod error;
pub mod loader;
pub mod networks;
pub mod presets;
pub mod project;
pub mod types;

pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
pub use networks::{DuplicatePolicy, NetworkRegistry};
pub use project::ProjectConfig;
pub use types::{CompilerOptions, NetworkId, NetworkProfile, OptimizerSettings};
