use std::{num::NonZeroUsize, path::Path, process};

use serde_json::{Value, json};
use tracing::instrument;
use tsm_core::{SlotId, Store, domain::scheme};

use crate::cli::{OutputFormat, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// How many free slots to show, in suggestion order
    #[arg(long, short = 'n', default_value = "1")]
    count: NonZeroUsize,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let store = crate::cli::open_store(root)?;
        let free = free_slots(&store, self.count);

        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&to_json(&free))?);
            }
            OutputFormat::Table => {
                if free.is_empty() {
                    eprintln!("{}", "No free slot left".warning());
                }
                for slot in &free {
                    println!("{slot}");
                }
            }
        }

        if free.is_empty() {
            process::exit(1);
        }
        Ok(())
    }
}

/// Up to `count` free slots, in suggestion order.
fn free_slots(store: &Store, count: NonZeroUsize) -> Vec<SlotId> {
    store
        .snapshot()
        .free_slots(&scheme::enumerate_universe())
        .into_iter()
        .take(count.get())
        .collect()
}

fn to_json(free: &[SlotId]) -> Value {
    let free: Vec<String> = free.iter().map(ToString::to_string).collect();
    json!({
        "next": free.first(),
        "free": free,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tsm_core::domain::Details;

    use super::*;
    use crate::cli::parse_slot;

    fn id(s: &str) -> SlotId {
        parse_slot(s).unwrap()
    }

    #[test]
    fn skips_occupied_and_disabled_slots() {
        let tmp = tempdir().unwrap();
        let mut store = Store::init(tmp.path().to_path_buf()).unwrap();
        let details = Details::new("Erika", "B-EM 1", "VW Golf", None).unwrap();
        store.add_wheel_set(details, Some(id("C1ROLL"))).unwrap();
        store.disable(id("C1ROL"), "Broken", None).unwrap();
        store.flush().unwrap();

        let store = Store::open(tmp.path().to_path_buf()).unwrap();
        let free = free_slots(&store, NonZeroUsize::new(2).unwrap());

        assert_eq!(free, vec![id("C1ROMM"), id("C1ROM")]);
        assert_eq!(
            to_json(&free),
            json!({ "next": "C1ROMM", "free": ["C1ROMM", "C1ROM"] })
        );
    }

    #[test]
    fn json_without_free_slots_has_null_next() {
        assert_eq!(to_json(&[]), json!({ "next": null, "free": [] }));
    }
}
