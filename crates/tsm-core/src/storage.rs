//! A filesystem backed tire storage.
//!
//! The [`Store`] keeps its data as versioned TOML files in a `.tsm` directory
//! below its root:
//!
//! - `.tsm/config.toml`
//! - `.tsm/disabled.toml`
//! - `.tsm/wheelsets.toml`
//! - `.tsm/audit.toml`
//!
//! A missing data file is treated as empty. Every mutation made through the
//! store is appended to the audit log.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::domain::{
    Config,
    audit::{Action, AuditLog},
    disabled::{DisableError, DisabledSlots},
    scheme::Snapshot,
    slot::SlotId,
    wheelset::{AssignError, Assignment, Details, WheelSet, WheelSets},
};

/// Name of the directory holding the store's files.
pub const STORE_DIR: &str = ".tsm";

const CONFIG_FILE: &str = "config.toml";
const DISABLED_FILE: &str = "disabled.toml";
const WHEELSETS_FILE: &str = "wheelsets.toml";
const AUDIT_FILE: &str = "audit.toml";

/// Directory name prefix of backup copies.
pub const BACKUP_PREFIX: &str = "tsm_backup_";

/// A tire storage loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    root: PathBuf,
    config: Config,
    disabled: DisabledSlots,
    wheel_sets: WheelSets,
    audit: AuditLog,
}

impl Store {
    /// Creates a new, empty store below `root`.
    ///
    /// # Errors
    ///
    /// Fails if a store already exists there or the files cannot be written.
    pub fn init(root: PathBuf) -> Result<Self, InitError> {
        let dir = root.join(STORE_DIR);
        if dir.exists() {
            return Err(InitError::AlreadyInitialised(dir));
        }
        fs::create_dir_all(&dir).map_err(|source| InitError::Io {
            path: dir.clone(),
            source,
        })?;

        let store = Self {
            root,
            config: Config::default(),
            disabled: DisabledSlots::default(),
            wheel_sets: WheelSets::default(),
            audit: AuditLog::default(),
        };
        store.flush()?;
        tracing::info!("initialised store in {}", dir.display());
        Ok(store)
    }

    /// Loads the store below `root`.
    ///
    /// # Errors
    ///
    /// Fails if there is no `.tsm` directory, or if one of its files cannot be
    /// read or parsed.
    pub fn open(root: PathBuf) -> Result<Self, LoadError> {
        let dir = root.join(STORE_DIR);
        if !dir.is_dir() {
            return Err(LoadError::NotInitialised(root));
        }

        let config = read_toml(&dir.join(CONFIG_FILE))?;
        let disabled: DisabledSlots = read_toml(&dir.join(DISABLED_FILE))?;
        let wheel_sets: WheelSets = read_toml(&dir.join(WHEELSETS_FILE))?;
        let audit = read_toml(&dir.join(AUDIT_FILE))?;
        tracing::debug!(
            wheel_sets = wheel_sets.len(),
            disabled = disabled.len(),
            "loaded store from {}",
            dir.display()
        );

        Ok(Self {
            root,
            config,
            disabled,
            wheel_sets,
            audit,
        })
    }

    /// Writes all files back to disk.
    ///
    /// # Errors
    ///
    /// Fails if a file cannot be serialized or written.
    pub fn flush(&self) -> Result<(), SaveError> {
        let dir = self.dir();
        write_toml(&dir.join(CONFIG_FILE), &self.config)?;
        write_toml(&dir.join(DISABLED_FILE), &self.disabled)?;
        write_toml(&dir.join(WHEELSETS_FILE), &self.wheel_sets)?;
        write_toml(&dir.join(AUDIT_FILE), &self.audit)?;
        Ok(())
    }

    /// The root the store was opened at.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding the store's files.
    #[must_use]
    pub fn dir(&self) -> PathBuf {
        self.root.join(STORE_DIR)
    }

    /// Path of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.dir().join(CONFIG_FILE)
    }

    /// The store's configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the configuration. Call [`Store::flush`] to persist.
    pub const fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// The disabled slots.
    #[must_use]
    pub const fn disabled(&self) -> &DisabledSlots {
        &self.disabled
    }

    /// The stored wheel sets.
    #[must_use]
    pub const fn wheel_sets(&self) -> &WheelSets {
        &self.wheel_sets
    }

    /// The audit log.
    #[must_use]
    pub const fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// The occupied and disabled sets as of this load.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            occupied: self.wheel_sets.occupied(),
            disabled: self.disabled.slots(),
        }
    }

    /// Disables a slot. Falls back to the configured default operator when
    /// `disabled_by` is `None`.
    ///
    /// Returns `false` if the slot was already disabled.
    ///
    /// # Errors
    ///
    /// Fails if the reason is blank.
    pub fn disable(
        &mut self,
        slot: SlotId,
        reason: &str,
        disabled_by: Option<String>,
    ) -> Result<bool, DisableError> {
        let disabled_by =
            disabled_by.or_else(|| self.config.default_operator().map(ToString::to_string));
        let created = self.disabled.disable(slot, reason, disabled_by)?;
        if created {
            tracing::info!(%slot, reason, "disabled slot");
            self.audit.record(Action::Disable, Some(slot), reason.trim());
        }
        Ok(created)
    }

    /// Enables a slot. Returns `false` if it was not disabled.
    pub fn enable(&mut self, slot: &SlotId) -> bool {
        let removed = self.disabled.enable(slot);
        if removed {
            tracing::info!(%slot, "enabled slot");
            self.audit.record(Action::Enable, Some(*slot), "");
        }
        removed
    }

    /// Stores a new wheel set, at `position` or at the suggested free slot.
    ///
    /// # Errors
    ///
    /// See [`WheelSets::add`].
    pub fn add_wheel_set(
        &mut self,
        details: Details,
        position: Option<SlotId>,
    ) -> Result<&WheelSet, AssignError> {
        let assignment = Assignment {
            disabled: &self.disabled,
            allow_disabled: self.config.allow_disabled_assignment,
        };
        let wheel_set = self.wheel_sets.add(details, position, assignment)?;
        self.audit.record(
            Action::Create,
            Some(wheel_set.position()),
            describe(wheel_set.details()),
        );
        Ok(wheel_set)
    }

    /// Replaces the customer details of the wheel set stored in a slot.
    ///
    /// # Errors
    ///
    /// Fails if the slot is empty.
    pub fn update_wheel_set(
        &mut self,
        position: &SlotId,
        details: Details,
    ) -> Result<&WheelSet, AssignError> {
        let wheel_set = self.wheel_sets.update(position, details)?;
        self.audit
            .record(Action::Update, Some(*position), describe(wheel_set.details()));
        Ok(wheel_set)
    }

    /// Moves a wheel set to another slot.
    ///
    /// # Errors
    ///
    /// See [`WheelSets::relocate`].
    pub fn move_wheel_set(&mut self, from: SlotId, to: SlotId) -> Result<&WheelSet, AssignError> {
        let assignment = Assignment {
            disabled: &self.disabled,
            allow_disabled: self.config.allow_disabled_assignment,
        };
        let wheel_set = self.wheel_sets.relocate(from, to, assignment)?;
        if from != to {
            self.audit
                .record(Action::Move, Some(to), format!("{from} -> {to}"));
        }
        Ok(wheel_set)
    }

    /// Deletes the wheel set stored in a slot.
    ///
    /// # Errors
    ///
    /// Fails if the slot is empty.
    pub fn remove_wheel_set(&mut self, position: &SlotId) -> Result<WheelSet, AssignError> {
        let wheel_set = self.wheel_sets.remove(position)?;
        self.audit
            .record(Action::Delete, Some(*position), describe(wheel_set.details()));
        Ok(wheel_set)
    }

    /// Writes the store to disk and copies its files into a new timestamped
    /// directory below `dir`.
    ///
    /// Afterwards only the `keep` newest backups in `dir` are retained. `keep`
    /// is at least one, so the backup just written always survives.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be flushed or a file cannot be copied or
    /// removed.
    pub fn backup(&mut self, dir: &Path, keep: usize) -> Result<Backup, BackupError> {
        self.flush()?;
        fs::create_dir_all(dir).map_err(|source| BackupError::io(dir, source))?;

        let stamp = Utc::now().format("%Y%m%d-%H%M%S").to_string();
        let mut path = dir.join(format!("{BACKUP_PREFIX}{stamp}"));
        let mut attempt = 1;
        while path.exists() {
            attempt += 1;
            path = dir.join(format!("{BACKUP_PREFIX}{stamp}-{attempt}"));
        }
        fs::create_dir(&path).map_err(|source| BackupError::io(&path, source))?;

        let source_dir = self.dir();
        let entries =
            fs::read_dir(&source_dir).map_err(|source| BackupError::io(&source_dir, source))?;
        for entry in entries {
            let file = entry
                .map_err(|source| BackupError::io(&source_dir, source))?
                .path();
            let Some(name) = file.file_name() else {
                continue;
            };
            if file.is_file() && file.extension().is_some_and(|ext| ext == "toml") {
                fs::copy(&file, path.join(name)).map_err(|source| BackupError::io(&file, source))?;
            }
        }
        tracing::info!("wrote backup to {}", path.display());

        let mut existing = list_backups(dir)?;
        let excess = existing.len().saturating_sub(keep.max(1));
        let pruned: Vec<PathBuf> = existing.drain(..excess).collect();
        for old in &pruned {
            fs::remove_dir_all(old).map_err(|source| BackupError::io(old, source))?;
            tracing::debug!("pruned backup {}", old.display());
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.audit.record(Action::Backup, None, name);
        self.flush()?;

        Ok(Backup { path, pruned })
    }
}

fn describe(details: &Details) -> String {
    format!("{} ({})", details.license_plate(), details.customer_name())
}

/// Backup directories found in `dir`, oldest first.
///
/// Only directories named with [`BACKUP_PREFIX`] count. A missing `dir` has no
/// backups.
///
/// # Errors
///
/// Fails if `dir` exists but cannot be read.
pub fn list_backups(dir: &Path) -> Result<Vec<PathBuf>, BackupError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(BackupError::io(dir, source)),
    };
    let mut backups = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| BackupError::io(dir, source))?.path();
        let is_backup = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(BACKUP_PREFIX));
        if is_backup && path.is_dir() {
            backups.push(path);
        }
    }
    backups.sort();
    Ok(backups)
}

/// The result of [`Store::backup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    /// Directory the files were copied to.
    pub path: PathBuf,
    /// Older backups removed to honour the retention count.
    pub pruned: Vec<PathBuf>,
}

fn read_toml<T: DeserializeOwned + Default>(path: &Path) -> Result<T, LoadError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} not found, starting empty", path.display());
            return Ok(T::default());
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), SaveError> {
    let content = toml::to_string_pretty(value).map_err(|source| SaveError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors raised when opening a store.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No `.tsm` directory below the root.
    #[error("No tire storage found in {0}. Run 'tsm init' first")]
    NotInitialised(PathBuf),

    /// A file exists but cannot be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A file is not valid TOML or contains invalid records.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        source: toml::de::Error,
    },
}

/// Errors raised when writing a store.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The data could not be rendered as TOML.
    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        source: toml::ser::Error,
    },

    /// The file could not be written.
    #[error("Failed to write {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

/// Errors raised when creating a store.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// A store already exists.
    #[error("Tire storage already initialised (found existing {0})")]
    AlreadyInitialised(PathBuf),

    /// The store directory could not be created.
    #[error("Failed to create {path}: {source}")]
    Io {
        /// The directory that failed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The initial files could not be written.
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Errors raised when writing a backup.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// The store could not be written before copying.
    #[error(transparent)]
    Save(#[from] SaveError),

    /// A file or directory could not be read, copied or removed.
    #[error("Backup failed at {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

impl BackupError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
