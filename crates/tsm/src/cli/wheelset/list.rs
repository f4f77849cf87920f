use std::path::Path;

use serde_json::{Value, json};
use tracing::instrument;
use tsm_core::WheelSet;

use crate::cli::{
    OutputFormat,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Only show wheel sets whose customer, plate or car contains this text
    #[arg(long, short)]
    search: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let store = crate::cli::open_store(root)?;
        let found = store
            .wheel_sets()
            .search(self.search.as_deref().unwrap_or_default());

        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&to_json(&found))?);
            }
            OutputFormat::Table => {
                if found.is_empty() {
                    println!("No wheel sets found.");
                    return Ok(());
                }

                if is_narrow() {
                    for w in &found {
                        println!("{} {}", w.position().to_string().info(), w.details().license_plate());
                        println!("  {} · {}", w.details().customer_name(), w.details().car_type());
                    }
                } else {
                    println!(
                        "{:<7} {:<12} {:<24} {:<16} {:<10} Note",
                        "Slot", "Plate", "Customer", "Car", "Updated"
                    );
                    for w in &found {
                        println!(
                            "{:<7} {:<12} {:<24} {:<16} {:<10} {}",
                            w.position().to_string(),
                            w.details().license_plate(),
                            w.details().customer_name(),
                            w.details().car_type(),
                            w.updated_at().format("%Y-%m-%d").to_string(),
                            w.details().note().unwrap_or_default()
                        );
                    }
                }

                println!();
                println!(
                    "{}",
                    format!(
                        "{} of {} wheel set(s)",
                        found.len(),
                        store.wheel_sets().len()
                    )
                    .dim()
                );
            }
        }

        Ok(())
    }
}

fn to_json(found: &[&WheelSet]) -> Value {
    found
        .iter()
        .map(|w| {
            json!({
                "id": w.id().to_string(),
                "position": w.position().to_string(),
                "customer_name": w.details().customer_name(),
                "license_plate": w.details().license_plate(),
                "car_type": w.details().car_type(),
                "note": w.details().note(),
                "created_at": w.created_at().to_rfc3339(),
                "updated_at": w.updated_at().to_rfc3339(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tsm_core::{Store, domain::Details};

    use super::*;
    use crate::cli::parse_slot;

    fn seeded_store(root: &Path) -> Store {
        let mut store = Store::init(root.to_path_buf()).unwrap();
        for (customer, plate, car, note, slot) in [
            ("Erika Mustermann", "B-EM 1", "VW Golf", Some("Winter"), "C1ROLL"),
            ("Max Muster", "HH-MM 42", "Audi A4", None, "GR3OM"),
        ] {
            let details = Details::new(customer, plate, car, note).unwrap();
            store
                .add_wheel_set(details, Some(parse_slot(slot).unwrap()))
                .unwrap();
        }
        store.flush().unwrap();
        Store::open(root.to_path_buf()).unwrap()
    }

    #[test]
    fn json_renders_every_field() {
        let tmp = tempdir().unwrap();
        let store = seeded_store(tmp.path());

        let output = to_json(&store.wheel_sets().search("golf"));

        let entries = output.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry["position"], "C1ROLL");
        assert_eq!(entry["customer_name"], "Erika Mustermann");
        assert_eq!(entry["license_plate"], "B-EM 1");
        assert_eq!(entry["car_type"], "VW Golf");
        assert_eq!(entry["note"], "Winter");
        assert_eq!(entry["id"].as_str().unwrap().len(), 36);
        assert_eq!(entry["created_at"], entry["updated_at"]);
    }

    #[test]
    fn json_without_note_is_null() {
        let tmp = tempdir().unwrap();
        let store = seeded_store(tmp.path());

        let output = to_json(&store.wheel_sets().search("HH-MM"));

        assert_eq!(output[0]["position"], "GR3OM");
        assert_eq!(output[0]["note"], Value::Null);
    }

    #[test]
    fn empty_search_lists_everything() {
        let tmp = tempdir().unwrap();
        let store = seeded_store(tmp.path());

        let output = to_json(&store.wheel_sets().search(""));

        assert_eq!(output.as_array().unwrap().len(), 2);
    }
}
