use std::path::Path;

use serde_json::{Value, json};
use tracing::instrument;
use tsm_core::DisabledSlots;

use crate::cli::{OutputFormat, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let store = crate::cli::open_store(root)?;
        let disabled = store.disabled();

        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&to_json(disabled))?);
            }
            OutputFormat::Table => {
                if disabled.is_empty() {
                    println!("No disabled slots.");
                    return Ok(());
                }
                println!("{:<7} {:<16} {:<12} Reason", "Slot", "Disabled at", "By");
                for entry in disabled.list() {
                    println!(
                        "{:<7} {:<16} {:<12} {}",
                        entry.slot().to_string(),
                        entry.disabled_at().format("%Y-%m-%d %H:%M").to_string(),
                        entry.disabled_by().unwrap_or("–"),
                        entry.reason()
                    );
                }
                println!();
                println!("{}", format!("{} slot(s) disabled", disabled.len()).dim());
            }
        }

        Ok(())
    }
}

fn to_json(disabled: &DisabledSlots) -> Value {
    disabled
        .list()
        .map(|entry| {
            json!({
                "id": entry.slot().to_string(),
                "reason": entry.reason(),
                "disabled_at": entry.disabled_at().to_rfc3339(),
                "disabled_by": entry.disabled_by(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tsm_core::Store;

    use super::*;
    use crate::cli::parse_slot;

    #[test]
    fn json_lists_entries_in_slot_order() {
        let tmp = tempdir().unwrap();
        let mut store = Store::init(tmp.path().to_path_buf()).unwrap();
        store
            .disable(parse_slot("GR2OL").unwrap(), "Leaking roof", Some("Tom".to_string()))
            .unwrap();
        store
            .disable(parse_slot("C3LUM").unwrap(), "Shelf bent", None)
            .unwrap();
        store.flush().unwrap();

        let store = Store::open(tmp.path().to_path_buf()).unwrap();
        let output = to_json(store.disabled());

        let entries = output.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["id"], "C3LUM");
        assert_eq!(entries[0]["disabled_by"], Value::Null);
        assert_eq!(entries[1]["id"], "GR2OL");
        assert_eq!(entries[1]["reason"], "Leaking roof");
        assert_eq!(entries[1]["disabled_by"], "Tom");
        assert!(entries[1]["disabled_at"].as_str().unwrap().ends_with("+00:00"));
    }

    #[test]
    fn json_of_empty_registry_is_an_empty_array() {
        assert_eq!(to_json(&DisabledSlots::default()), json!([]));
    }

    #[test]
    fn runs_against_initialised_store() {
        let tmp = tempdir().unwrap();
        Store::init(tmp.path().to_path_buf()).unwrap();

        Command {
            output: OutputFormat::Json,
        }
        .run(tmp.path())
        .unwrap();
    }
}
