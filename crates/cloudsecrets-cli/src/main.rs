//! `cloudsecrets` command-line host
//!
//! Composition root: loads settings, registers the built-in drivers and
//! dispatches subcommands to the resolver.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_yaml::{Mapping, Value};

use cloudsecrets_core::logging::LogLevel;
use cloudsecrets_core::{
    register_builtin_drivers, CancellationToken, ConsoleLogger, DriverRegistry, SecretResolver,
    SecretValue, Settings, SettingsFile, SharedLogger, GCP_SECRETMANAGER_KEY,
};

#[derive(Parser)]
#[command(name = "cloudsecrets")]
#[command(about = "Read and author secret descriptors backed by cloud secret stores")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to ~/.config/cloudsecrets/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a descriptor and print its value
    Get {
        /// Descriptor file
        file: PathBuf,

        /// Always print JSON, even for raw values
        #[arg(long)]
        json: bool,
    },

    /// Write a new descriptor template and open it in $EDITOR
    Create {
        /// Secret name
        name: String,

        /// Secret Manager reference (defaults to the secret name)
        #[arg(long)]
        secret_name: Option<String>,

        /// Driver that will own the descriptor
        #[arg(long, default_value = GCP_SECRETMANAGER_KEY)]
        driver: String,
    },

    /// Open an existing descriptor in $EDITOR
    Edit {
        /// Descriptor file
        file: PathBuf,
    },

    /// Upload the secret_data of a descriptor to its backend
    Push {
        /// Descriptor file
        file: PathBuf,
    },

    /// List registered drivers
    Drivers,
}

fn load_settings(config: Option<PathBuf>) -> Result<Settings> {
    let file = match config {
        Some(path) => SettingsFile::explicit(path),
        None => SettingsFile::user(),
    };
    let settings = file
        .load()
        .with_context(|| format!("loading {}", file.path().display()))?;
    Ok(settings.with_env())
}

/// Descriptor template for a new secret
///
/// Only the Secret Manager driver gets a prefilled spec.
fn template(name: &str, driver: &str, secret_name: &str) -> Result<String> {
    let mut spec = Mapping::new();
    if driver == GCP_SECRETMANAGER_KEY {
        let mut data = Mapping::new();
        data.insert("key".into(), "value".into());
        spec.insert("gcp_secret_name".into(), secret_name.into());
        spec.insert("secret_data".into(), Value::Mapping(data));
    }

    let mut document = Mapping::new();
    document.insert("name".into(), name.into());
    document.insert("kind".into(), "Secret".into());
    document.insert("driver".into(), driver.into());
    document.insert("spec".into(), Value::Mapping(spec));
    Ok(serde_yaml::to_string(&document)?)
}

fn render(value: &SecretValue, json: bool) -> Result<String> {
    match value {
        SecretValue::Raw(text) if !json => Ok(text.clone()),
        other => Ok(serde_json::to_string_pretty(&other.to_json())?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Info };
    let logger: SharedLogger = Arc::new(ConsoleLogger::new().with_level(level));

    let settings = load_settings(cli.config)?;

    let interrupt = CancellationToken::new();
    {
        let interrupt = interrupt.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });
    }

    let mut registry = DriverRegistry::new();
    register_builtin_drivers(&mut registry, &settings, interrupt, logger.clone())?;
    let resolver = SecretResolver::new(registry).with_logger(logger);

    match cli.command {
        Commands::Get { file, json } => {
            let (_, secret) = resolver.resolve_file(&file).await?;
            println!("{}", render(&secret.value, json)?);
        }
        Commands::Create {
            name,
            secret_name,
            driver,
        } => {
            let secret_name = secret_name.unwrap_or_else(|| name.clone());
            let mut files = BTreeMap::new();
            files.insert(
                format!("{}.yaml", name),
                template(&name, &driver, &secret_name)?.into_bytes(),
            );
            let path = resolver.driver(&driver)?.create(&files).await?;
            println!("{}", path.display());
        }
        Commands::Edit { file } => {
            resolver.edit_file(&file).await?;
        }
        Commands::Push { file } => {
            resolver.push_file(&file).await?;
        }
        Commands::Drivers => {
            for key in resolver.registry().keys() {
                println!("{}", key);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudsecrets_core::drivers::descriptor::parse_descriptor;
    use serde_json::json;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["cloudsecrets", "get", "db.yaml", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Get { json: true, .. }));
    }

    #[test]
    fn test_template_is_a_valid_descriptor() {
        let text = template("db-pass", GCP_SECRETMANAGER_KEY, "db-pass").unwrap();
        let descriptor = parse_descriptor(GCP_SECRETMANAGER_KEY, text.as_bytes()).unwrap();
        assert_eq!(descriptor.name, "db-pass");
        assert!(descriptor.spec.contains_key("gcp_secret_name"));
    }

    #[test]
    fn test_template_quotes_names() {
        let text = template("a: b", GCP_SECRETMANAGER_KEY, "#not-a-comment").unwrap();
        let descriptor = parse_descriptor(GCP_SECRETMANAGER_KEY, text.as_bytes()).unwrap();
        assert_eq!(descriptor.name, "a: b");
        assert_eq!(
            descriptor.spec.get("gcp_secret_name"),
            Some(&Value::String("#not-a-comment".to_string()))
        );
    }

    #[test]
    fn test_template_for_other_driver_has_empty_spec() {
        let text = template("db-pass", "sops", "db-pass").unwrap();
        let descriptor = parse_descriptor("sops", text.as_bytes()).unwrap();
        assert!(descriptor.spec.is_empty());
        assert_eq!(SecretResolver::driver_key(text.as_bytes()).unwrap(), "sops");
    }

    #[test]
    fn test_render() {
        let raw = SecretValue::raw("hunter2");
        assert_eq!(render(&raw, false).unwrap(), "hunter2");
        assert_eq!(render(&raw, true).unwrap(), "\"hunter2\"");

        let map = SecretValue::try_from(json!({"user": "admin"})).unwrap();
        assert!(render(&map, false).unwrap().contains("\"user\": \"admin\""));
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings(Some(dir.path().join("missing.yaml"))).is_err());
    }
}
