use std::path::Path;

use tracing::instrument;
use tsm_core::Config;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
/// Show or modify storage configuration
///
/// Configuration is stored in .tsm/config.toml.
///
/// Available configuration keys:
///   `default_operator`           Name recorded when disabling a slot without
///                                --by (empty clears it)
///   `allow_disabled_assignment`  Allow storing wheel sets in disabled slots
///                                (default: false)
///   `backup_copies`              Number of backups `tsm backup` retains
///                                (default: 10, at least 1)
pub struct Command {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show all configuration values
    Show,

    /// Get a specific configuration value
    Get {
        /// Configuration key to retrieve
        ///
        /// Available keys: `default_operator`, `allow_disabled_assignment`,
        /// `backup_copies`
        key: String,
    },

    /// Set a configuration value
    ///
    /// Examples:
    ///   tsm config set `default_operator` Tom
    ///   tsm config set `allow_disabled_assignment` true
    ///   tsm config set `backup_copies` 5
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },
}

const KEYS: &str = "default_operator, allow_disabled_assignment, backup_copies";

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = crate::cli::open_store(root)?.config_path();

        match self.command {
            ConfigCommand::Show => Self::show_config(&config_path),
            ConfigCommand::Get { key } => Self::get_config(&config_path, &key),
            ConfigCommand::Set { key, value } => Self::set_config(&config_path, &key, &value),
        }
    }

    fn load(config_path: &Path) -> anyhow::Result<Config> {
        if config_path.exists() {
            Config::load(config_path).map_err(|e| anyhow::anyhow!("{e}"))
        } else {
            Ok(Config::default())
        }
    }

    fn show_config(config_path: &Path) -> anyhow::Result<()> {
        let config = Self::load(config_path)?;

        println!("Configuration:");
        match config.default_operator() {
            Some(operator) => println!("  default_operator: {operator}"),
            None => println!("  default_operator: {}", "(not set)".dim()),
        }
        println!(
            "  allow_disabled_assignment: {}",
            config.allow_disabled_assignment
        );
        println!("  backup_copies: {}", config.backup_copies());
        Ok(())
    }

    fn get_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
        println!("{}", Self::value_of(&Self::load(config_path)?, key)?);
        Ok(())
    }

    fn value_of(config: &Config, key: &str) -> anyhow::Result<String> {
        match key {
            "default_operator" => Ok(config.default_operator().unwrap_or_default().to_string()),
            "allow_disabled_assignment" => Ok(config.allow_disabled_assignment.to_string()),
            "backup_copies" => Ok(config.backup_copies().to_string()),
            _ => anyhow::bail!("Unknown configuration key: '{key}'\nAvailable keys: {KEYS}"),
        }
    }

    fn set_config(config_path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
        let mut config = Self::load(config_path)?;
        Self::apply(&mut config, key, value)?;
        config
            .save(config_path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        match key {
            "default_operator" => match config.default_operator() {
                Some(operator) => {
                    println!("{}", format!("Default operator: {operator}").success());
                }
                None => println!("{}", "Default operator cleared".success()),
            },
            "backup_copies" => println!(
                "{}",
                format!("Keeping the {} newest backups", config.backup_copies()).success()
            ),
            _ if config.allow_disabled_assignment => {
                println!("{}", "Wheel sets may be stored in disabled slots".success());
                println!(
                    "{}",
                    "Disabled slots are still never suggested automatically.".dim()
                );
            }
            _ => println!(
                "{}",
                "Wheel sets can no longer be stored in disabled slots".success()
            ),
        }
        Ok(())
    }

    fn apply(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "default_operator" => config.set_default_operator(Some(value.to_string())),
            "allow_disabled_assignment" => {
                config.allow_disabled_assignment = value
                    .parse::<bool>()
                    .map_err(|_| anyhow::anyhow!("Value must be 'true' or 'false'"))?;
            }
            "backup_copies" => config.set_backup_copies(
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| anyhow::anyhow!("Value must be a whole number"))?,
            ),
            _ => anyhow::bail!("Unknown configuration key: '{key}'\nSupported keys: {KEYS}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use test_case::test_case;
    use tsm_core::Store;

    use super::*;

    #[test_case("default_operator", "Tom", "Tom"; "set operator")]
    #[test_case("default_operator", "   ", ""; "blank operator clears")]
    #[test_case("allow_disabled_assignment", "true", "true"; "allow disabled")]
    #[test_case("backup_copies", " 5 ", "5"; "backup copies")]
    #[test_case("backup_copies", "0", "1"; "backup copies at least one")]
    fn apply_then_read(key: &str, value: &str, expected: &str) {
        let mut config = Config::default();
        Command::apply(&mut config, key, value).unwrap();
        assert_eq!(Command::value_of(&config, key).unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_key_and_bad_bool() {
        let mut config = Config::default();
        assert!(Command::apply(&mut config, "digits", "3").is_err());
        assert!(Command::apply(&mut config, "allow_disabled_assignment", "yes").is_err());
        assert!(Command::apply(&mut config, "backup_copies", "-1").is_err());
        assert!(Command::value_of(&config, "digits").is_err());
    }

    #[test]
    fn set_persists_to_store() {
        let tmp = tempdir().unwrap();
        Store::init(tmp.path().to_path_buf()).unwrap();

        Command {
            command: ConfigCommand::Set {
                key: "allow_disabled_assignment".to_string(),
                value: "true".to_string(),
            },
        }
        .run(tmp.path())
        .unwrap();

        let store = Store::open(tmp.path().to_path_buf()).unwrap();
        assert!(store.config().allow_disabled_assignment);
    }

    #[test]
    fn set_writes_the_store_config_file() {
        let tmp = tempdir().unwrap();
        let store = Store::init(tmp.path().to_path_buf()).unwrap();

        Command {
            command: ConfigCommand::Set {
                key: "backup_copies".to_string(),
                value: "3".to_string(),
            },
        }
        .run(tmp.path())
        .unwrap();

        let config = Config::load(&store.config_path()).unwrap();
        assert_eq!(config.backup_copies(), 3);
    }

    #[test]
    fn requires_initialised_store() {
        let tmp = tempdir().unwrap();
        let error = Command {
            command: ConfigCommand::Show,
        }
        .run(tmp.path())
        .unwrap_err();
        assert!(error.to_string().contains("tsm init"));
    }
}
