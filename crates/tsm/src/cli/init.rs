use std::path::PathBuf;

use tracing::instrument;
use tsm_core::{Store, storage::STORE_DIR};

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Name recorded when a slot is disabled without `--by`
    #[arg(long, value_name = "NAME")]
    operator: Option<String>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Store::init(root)?;

        if self.operator.is_some() {
            store.config_mut().set_default_operator(self.operator);
            store.flush()?;
        }

        println!(
            "{}",
            format!("Initialized tire storage in {}", store.root().display()).success()
        );
        println!("  Created: {STORE_DIR}/config.toml");
        println!("  Created: {STORE_DIR}/disabled.toml");
        println!("  Created: {STORE_DIR}/wheelsets.toml");
        println!("  Created: {STORE_DIR}/audit.toml");
        if let Some(operator) = store.config().default_operator() {
            println!("  Default operator: {operator}");
        }
        println!();
        println!("Next steps:");
        println!("  tsm slot next");
        println!("  tsm wheelset add --customer \"Name\" --plate \"B-XY 123\" --car \"VW Golf\"");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn init_creates_store_with_operator() {
        let tmp = tempdir().unwrap();
        let command = Command {
            operator: Some(" Tom ".to_string()),
        };

        command.run(tmp.path().to_path_buf()).unwrap();

        let store = Store::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(store.config().default_operator(), Some("Tom"));
    }

    #[test]
    fn init_twice_fails() {
        let tmp = tempdir().unwrap();
        Command { operator: None }
            .run(tmp.path().to_path_buf())
            .unwrap();

        let error = Command { operator: None }
            .run(tmp.path().to_path_buf())
            .unwrap_err();
        assert!(error.to_string().contains("already initialised"));
    }
}
