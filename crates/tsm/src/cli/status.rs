use std::path::Path;

use clap::Parser;
use tracing::instrument;
use tsm_core::{
    SlotId, SlotStatus,
    domain::{Classification, scheme},
};

use super::{
    OutputFormat,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show slot counts, the next free slot and conflicts")]
pub struct Command {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

/// Everything the status report shows, computed from one snapshot.
#[derive(Debug)]
struct Summary {
    classification: Classification,
    next_free: Option<SlotId>,
    conflicts: Vec<SlotId>,
}

impl Summary {
    fn count(&self, status: SlotStatus) -> usize {
        self.classification.count(status)
    }
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let store = super::open_store(root)?;
        let snapshot = store.snapshot();
        let universe = scheme::enumerate_universe();

        let summary = Summary {
            classification: snapshot.classify(&universe),
            next_free: snapshot.suggest_next_free(&universe),
            conflicts: snapshot.conflicts(),
        };

        for slot in &summary.conflicts {
            tracing::warn!(%slot, "slot is both occupied and disabled");
        }

        match self.output {
            OutputFormat::Json => Self::output_json(&summary)?,
            OutputFormat::Table if self.quiet => Self::output_quiet(&summary),
            OutputFormat::Table => Self::output_table(&summary),
        }

        Ok(())
    }

    fn output_json(summary: &Summary) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "total": summary.classification.len(),
            "free": summary.count(SlotStatus::Free),
            "occupied": summary.count(SlotStatus::Occupied),
            "disabled": summary.count(SlotStatus::Disabled),
            "next_free": summary.next_free.map(|slot| slot.to_string()),
            "conflicts": summary.conflicts.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(summary: &Summary) {
        println!(
            "total={} free={} occupied={} disabled={} conflicts={}",
            summary.classification.len(),
            summary.count(SlotStatus::Free),
            summary.count(SlotStatus::Occupied),
            summary.count(SlotStatus::Disabled),
            summary.conflicts.len()
        );
    }

    fn output_table(summary: &Summary) {
        const MAX_CONFLICT_DISPLAY: usize = 5;

        println!("Slot counts");
        println!("{}", "───────────".dim());

        if is_narrow() {
            for status in SlotStatus::ALL {
                println!("{status}: {}", summary.count(status));
            }
            println!("total: {}", summary.classification.len());
        } else {
            println!("{:<10} Count", "Status");
            for status in SlotStatus::ALL {
                println!("{:<10} {}", status.as_str(), summary.count(status));
            }
            println!("{:<10} {}", "total", summary.classification.len());
        }

        println!();

        match summary.next_free {
            Some(slot) => println!("Next free slot: {}", slot.to_string().success()),
            None => println!("Next free slot: {}", "none, storage is full".warning()),
        }

        if summary.conflicts.is_empty() {
            return;
        }

        println!();
        println!(
            "Conflicts: {} ⚠️",
            summary.conflicts.len().to_string().warning()
        );
        for slot in summary.conflicts.iter().take(MAX_CONFLICT_DISPLAY) {
            println!("  - {slot}");
        }
        if summary.conflicts.len() > MAX_CONFLICT_DISPLAY {
            println!(
                "  - ... and {} more",
                summary.conflicts.len() - MAX_CONFLICT_DISPLAY
            );
        }
        println!(
            "{}",
            "These slots hold a wheel set but are disabled. Move the wheel set or enable the slot."
                .dim()
        );
    }
}
