use std::path::Path;

use tracing::instrument;
use tsm_core::SlotId;

use crate::cli::{parse_slot, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The slot to disable
    #[clap(value_parser = parse_slot)]
    id: SlotId,

    /// Why the slot is out of service
    #[arg(long)]
    reason: String,

    /// Who is disabling the slot (defaults to the configured operator)
    #[arg(long)]
    by: Option<String>,

    /// Disable the slot even if a wheel set is stored in it
    #[arg(long)]
    force: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut store = crate::cli::open_store(root)?;

        if let Some(wheel_set) = store.wheel_sets().find_by_position(&self.id) {
            let plate = wheel_set.details().license_plate().to_string();
            if !self.force {
                anyhow::bail!(
                    "Slot {} holds wheel set {plate}. Move it first, or pass --force",
                    self.id
                );
            }
            eprintln!(
                "{}",
                format!("⚠️  Slot {} holds wheel set {plate}", self.id).warning()
            );
        }

        if store.disable(self.id, &self.reason, self.by)? {
            store.flush()?;
            println!("{}", format!("✅ Disabled {}", self.id).success());
        } else {
            let reason = store
                .disabled()
                .get(&self.id)
                .map(|entry| entry.reason().to_string())
                .unwrap_or_default();
            println!(
                "{}",
                format!("ℹ️  {} is already disabled ({reason})", self.id).dim()
            );
        }

        Ok(())
    }
}
