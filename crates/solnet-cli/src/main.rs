use clap::{Parser, Subcommand};
use log::debug;
use solnet_config::{ConfigLoader, DuplicatePolicy, ProjectConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "solnet", version, about = "Inspect and validate deployment network configuration")]
struct Cli {
    /// Configuration file (.toml or .json); falls back to SOLNET_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How repeated `networks` declarations are resolved
    #[arg(long, global = true, default_value_t = DuplicatePolicy::Reject)]
    policy: DuplicatePolicy,

    /// .env file to read before loading; defaults to ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List network profiles
    Networks,
    /// Print one network profile as JSON
    Show { name: String },
    /// Load and validate the configuration
    Check,
    /// Print the effective configuration as JSON
    Dump,
}

fn load(cli: &Cli) -> anyhow::Result<ProjectConfig> {
    let mut loader = ConfigLoader::new().with_policy(cli.policy);
    loader = match &cli.env_file {
        Some(path) => loader.with_dotenv(path),
        None => loader.with_default_dotenv(),
    };
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    Ok(loader.load()?)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load(&cli)?;
    debug!("Resolved {} network profile(s) with policy {}", config.networks.len(), cli.policy);

    match cli.command {
        Command::Networks => {
            for (name, profile) in config.networks.iter() {
                let endpoint = profile
                    .endpoint()
                    .unwrap_or_else(|_| format!("{}:{}", profile.host, profile.port));
                println!("{}\t{}\tnetwork_id={}", name, endpoint, profile.network_id);
            }
        }
        Command::Show { name } => {
            let profile = config.network(&name)?;
            println!("{}", serde_json::to_string_pretty(profile)?);
        }
        Command::Check => println!("ok"),
        Command::Dump => println!("{}", config.to_json_pretty()?),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
