use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a tire storage.
///
/// Controls who is recorded when slots are disabled, whether wheel sets may be
/// put into disabled slots, and how many backups are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Name recorded as "disabled by" when a slot is disabled without naming
    /// an operator.
    default_operator: Option<String>,

    /// Whether a wheel set may be assigned to a disabled slot.
    ///
    /// When `false` (default), disabled slots are never offered and cannot be
    /// chosen explicitly.
    pub allow_disabled_assignment: bool,

    /// How many backups are kept. Older ones are pruned. Always at least 1.
    backup_copies: usize,
}

const DEFAULT_BACKUP_COPIES: usize = 10;

impl Default for Config {
    fn default() -> Self {
        Self {
            default_operator: None,
            allow_disabled_assignment: false,
            backup_copies: DEFAULT_BACKUP_COPIES,
        }
    }
}

const fn default_backup_copies() -> usize {
    DEFAULT_BACKUP_COPIES
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the default operator, if configured.
    #[must_use]
    pub fn default_operator(&self) -> Option<&str> {
        self.default_operator.as_deref()
    }

    /// Sets or clears the default operator.
    ///
    /// An empty or whitespace-only name clears it.
    pub fn set_default_operator(&mut self, operator: Option<String>) {
        self.default_operator = operator
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
    }

    /// Returns how many backups are kept.
    #[must_use]
    pub const fn backup_copies(&self) -> usize {
        self.backup_copies
    }

    /// Sets how many backups are kept. Values below 1 are raised to 1.
    pub fn set_backup_copies(&mut self, copies: usize) {
        self.backup_copies = copies.max(1);
    }
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_operator: Option<String>,

        #[serde(default)]
        allow_disabled_assignment: bool,

        #[serde(default = "default_backup_copies")]
        backup_copies: usize,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                default_operator,
                allow_disabled_assignment,
                backup_copies,
            } => {
                let mut config = Self {
                    allow_disabled_assignment,
                    ..Self::default()
                };
                config.set_default_operator(default_operator);
                config.set_backup_copies(backup_copies);
                config
            }
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        let Config {
            default_operator,
            allow_disabled_assignment,
            backup_copies,
        } = config;

        Self::V1 {
            default_operator,
            allow_disabled_assignment,
            backup_copies,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ndefault_operator = \"Tom\"\nallow_disabled_assignment = true\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.default_operator(), Some("Tom"));
        assert!(config.allow_disabled_assignment);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nallow_disabled_assignment = \"yes\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.set_default_operator(Some("Werkstatt".into()));
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn blank_operator_clears_setting() {
        let mut config = Config::default();
        config.set_default_operator(Some("Tom".into()));
        config.set_default_operator(Some("  ".into()));
        assert_eq!(config.default_operator(), None);
    }

    #[test]
    fn backup_copies_are_at_least_one() {
        let config: Config = toml::from_str("_version = \"1\"\nbackup_copies = 0\n").unwrap();
        assert_eq!(config.backup_copies(), 1);

        let mut config = Config::default();
        assert_eq!(config.backup_copies(), 10);
        config.set_backup_copies(3);
        assert_eq!(config.backup_copies(), 3);
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }
}
