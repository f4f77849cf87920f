use std::{num::NonZeroUsize, path::Path};

use serde_json::{Value, json};
use tracing::instrument;
use tsm_core::{
    SlotId,
    domain::{Action, AuditEntry},
};

use crate::cli::{OutputFormat, parse_slot, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// How many entries to show, newest first
    #[arg(long, short = 'n', default_value = "20")]
    limit: NonZeroUsize,

    /// Only show changes to this slot
    #[arg(long, value_parser = parse_slot)]
    slot: Option<SlotId>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let store = crate::cli::open_store(root)?;
        let entries = store.audit().recent(self.limit.get(), self.slot);

        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&to_json(&entries))?);
            }
            OutputFormat::Table => {
                if entries.is_empty() {
                    println!("No changes recorded.");
                    return Ok(());
                }
                println!("{:<16} {:<8} {:<7} Details", "When (UTC)", "Action", "Slot");
                for entry in &entries {
                    println!(
                        "{:<16} {} {:<7} {}",
                        entry.timestamp().format("%Y-%m-%d %H:%M").to_string(),
                        paint(entry.action()),
                        entry.slot().as_ref().map(ToString::to_string).unwrap_or_default(),
                        entry.details()
                    );
                }
                println!();
                println!(
                    "{}",
                    format!(
                        "{} of {} change(s)",
                        entries.len(),
                        store.audit().len()
                    )
                    .dim()
                );
            }
        }

        Ok(())
    }
}

fn paint(action: Action) -> String {
    let text = format!("{:<8}", action.as_str());
    match action {
        Action::Create | Action::Enable => text.success(),
        Action::Delete | Action::Disable => text.warning(),
        Action::Update | Action::Move => text.info(),
        Action::Backup => text.dim(),
    }
}

fn to_json(entries: &[&AuditEntry]) -> Value {
    entries
        .iter()
        .map(|entry| {
            json!({
                "action": entry.action().as_str(),
                "slot": entry.slot().as_ref().map(ToString::to_string),
                "details": entry.details(),
                "timestamp": entry.timestamp().to_rfc3339(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tsm_core::{Store, domain::Details};

    use super::*;

    fn id(s: &str) -> SlotId {
        parse_slot(s).unwrap()
    }

    fn seeded_store(root: &Path) -> Store {
        let mut store = Store::init(root.to_path_buf()).unwrap();
        let details = Details::new("Erika", "B-EM 1", "VW Golf", None).unwrap();
        store.add_wheel_set(details, Some(id("C1ROLL"))).unwrap();
        store.disable(id("GR1OL"), "Leaking roof", None).unwrap();
        store.move_wheel_set(id("C1ROLL"), id("C2ROL")).unwrap();
        store.flush().unwrap();
        Store::open(root.to_path_buf()).unwrap()
    }

    #[test]
    fn json_is_newest_first() {
        let tmp = tempdir().unwrap();
        let store = seeded_store(tmp.path());

        let output = to_json(&store.audit().recent(2, None));

        assert_eq!(output.as_array().unwrap().len(), 2);
        assert_eq!(output[0]["action"], "move");
        assert_eq!(output[0]["slot"], "C2ROL");
        assert_eq!(output[0]["details"], "C1ROLL -> C2ROL");
        assert_eq!(output[1]["action"], "disable");
        assert_eq!(output[1]["details"], "Leaking roof");
    }

    #[test]
    fn json_filtered_by_slot() {
        let tmp = tempdir().unwrap();
        let store = seeded_store(tmp.path());

        let output = to_json(&store.audit().recent(20, Some(id("C1ROLL"))));

        assert_eq!(output.as_array().unwrap().len(), 1);
        assert_eq!(output[0]["action"], "create");
        assert_eq!(output[0]["details"], "B-EM 1 (Erika)");
    }

    #[test]
    fn backups_have_no_slot() {
        let tmp = tempdir().unwrap();
        let mut store = Store::init(tmp.path().to_path_buf()).unwrap();
        store.backup(&tmp.path().join("backups"), 1).unwrap();

        let output = to_json(&store.audit().recent(1, None));

        assert_eq!(output[0]["action"], "backup");
        assert_eq!(output[0]["slot"], Value::Null);
    }

    #[test]
    fn runs_against_initialised_store() {
        let tmp = tempdir().unwrap();
        seeded_store(tmp.path());

        Command {
            limit: NonZeroUsize::new(5).unwrap(),
            slot: None,
            output: OutputFormat::Table,
        }
        .run(tmp.path())
        .unwrap();
    }
}
