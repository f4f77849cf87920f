use std::path::Path;

use tracing::instrument;
use tsm_core::SlotId;

use crate::cli::{parse_slot, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The slot to put back into service
    #[clap(value_parser = parse_slot)]
    id: SlotId,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut store = crate::cli::open_store(root)?;

        if store.enable(&self.id) {
            store.flush()?;
            println!("{}", format!("✅ Enabled {}", self.id).success());
        } else {
            println!("{}", format!("ℹ️  {} is not disabled", self.id).dim());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tsm_core::Store;

    use super::*;

    #[test]
    fn enable_removes_entry_and_is_idempotent() {
        let tmp = tempdir().unwrap();
        let mut store = Store::init(tmp.path().to_path_buf()).unwrap();
        let slot = parse_slot("C4RUR").unwrap();
        store.disable(slot, "Leaking roof", None).unwrap();
        store.flush().unwrap();

        Command { id: slot }.run(tmp.path()).unwrap();
        Command { id: slot }.run(tmp.path()).unwrap();

        let store = Store::open(tmp.path().to_path_buf()).unwrap();
        assert!(store.disabled().is_empty());
    }
}
