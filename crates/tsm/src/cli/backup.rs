use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
/// Copy the storage files into a timestamped backup directory
///
/// Older backups beyond the retention count are removed. The count defaults to
/// the `backup_copies` configuration value.
pub struct Command {
    /// Directory to write backups to (default: .tsm/backups)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Number of backups to keep, including the new one
    #[arg(long)]
    keep: Option<usize>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut store = crate::cli::open_store(root)?;
        let dir = self.dir.unwrap_or_else(|| store.dir().join("backups"));
        let keep = self.keep.unwrap_or_else(|| store.config().backup_copies());

        let backup = store.backup(&dir, keep)?;

        println!(
            "{}",
            format!("✅ Backup written to {}", backup.path.display()).success()
        );
        for old in &backup.pruned {
            println!("{}", format!("Removed old backup {}", old.display()).dim());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tsm_core::{
        Store,
        storage::{STORE_DIR, list_backups},
    };

    use super::*;

    #[test]
    fn defaults_to_store_directory_and_configured_retention() {
        let tmp = tempdir().unwrap();
        let mut store = Store::init(tmp.path().to_path_buf()).unwrap();
        store.config_mut().set_backup_copies(1);
        store.flush().unwrap();
        let backups = tmp.path().join(STORE_DIR).join("backups");
        std::fs::create_dir_all(backups.join("tsm_backup_20200101-000000")).unwrap();

        Command {
            dir: None,
            keep: None,
        }
        .run(tmp.path())
        .unwrap();

        let remaining = list_backups(&backups).unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].join("config.toml").is_file());
        assert!(!backups.join("tsm_backup_20200101-000000").exists());
    }

    #[test]
    fn explicit_directory_and_retention() {
        let tmp = tempdir().unwrap();
        Store::init(tmp.path().to_path_buf()).unwrap();
        let backups = tmp.path().join("elsewhere");
        for name in ["tsm_backup_20200101-000000", "tsm_backup_20200102-000000"] {
            std::fs::create_dir_all(backups.join(name)).unwrap();
        }

        Command {
            dir: Some(backups.clone()),
            keep: Some(3),
        }
        .run(tmp.path())
        .unwrap();

        assert_eq!(list_backups(&backups).unwrap().len(), 3);
        let store = Store::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(store.audit().len(), 1);
    }
}
