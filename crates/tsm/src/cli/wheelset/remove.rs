use std::path::Path;

use tracing::instrument;
use tsm_core::SlotId;

use crate::cli::{parse_slot, prompt_for, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The slot whose wheel set should be removed
    #[clap(value_parser = parse_slot)]
    id: SlotId,

    /// Confirm by license plate instead of typing it at the prompt
    #[arg(long, value_name = "PLATE", conflicts_with = "yes")]
    confirm_plate: Option<String>,

    /// Skip confirmation prompts
    #[arg(long, short)]
    yes: bool,
}

/// The typed plate must match exactly, apart from surrounding whitespace.
fn plate_matches(expected: &str, typed: &str) -> bool {
    typed.trim() == expected.trim()
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut store = crate::cli::open_store(root)?;

        let Some(wheel_set) = store.wheel_sets().find_by_position(&self.id) else {
            anyhow::bail!("No wheel set stored in slot {}", self.id);
        };

        if !self.yes {
            let details = wheel_set.details();
            println!("Will remove the wheel set in {}:", self.id);
            println!("  • Customer: {}", details.customer_name());
            println!("  • Plate:    {}", details.license_plate());
            println!("  • Car:      {}", details.car_type());
            if let Some(note) = details.note() {
                println!("  • Note:     {note}");
            }
            let typed = match self.confirm_plate {
                Some(plate) => plate,
                None => prompt_for("Type the license plate to confirm")?,
            };
            if !plate_matches(details.license_plate(), &typed) {
                anyhow::bail!("Confirmation failed: license plate does not match");
            }
        }

        let removed = store.remove_wheel_set(&self.id)?;
        store.flush()?;

        println!(
            "{}",
            format!(
                "✅ Removed {} from {}. The slot is free again",
                removed.details().license_plate(),
                self.id
            )
            .success()
        );
        Ok(())
    }
}
