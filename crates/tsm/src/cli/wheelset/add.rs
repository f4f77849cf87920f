use std::path::Path;

use tracing::instrument;
use tsm_core::{SlotId, domain::Details};

use crate::cli::{parse_slot, prompt_to_proceed, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Customer name
    #[arg(long, short)]
    customer: String,

    /// License plate of the customer's car
    #[arg(long, short)]
    plate: String,

    /// Car make and model
    #[arg(long)]
    car: String,

    /// Free-text note (e.g., tire condition)
    #[arg(long, short)]
    note: Option<String>,

    /// Store in this slot instead of the suggested one
    #[arg(long, value_parser = parse_slot)]
    position: Option<SlotId>,

    /// Skip confirmation prompts
    #[arg(long, short)]
    yes: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut store = crate::cli::open_store(root)?;
        let details = Details::new(&self.customer, &self.plate, &self.car, self.note.as_deref())?;

        let position = if let Some(position) = self.position {
            position
        } else {
            let Some(suggested) = store.wheel_sets().suggest(store.disabled()) else {
                anyhow::bail!("No free slot left");
            };
            println!("Suggested slot: {}", suggested.to_string().info());
            if !self.yes {
                prompt_to_proceed()?;
            }
            suggested
        };

        let wheel_set = store.add_wheel_set(details, Some(position))?;
        let message = format!(
            "✅ Stored {} ({}) in {}",
            wheel_set.details().license_plate(),
            wheel_set.details().customer_name(),
            wheel_set.position()
        );
        store.flush()?;

        println!("{}", message.success());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tsm_core::Store;

    use super::*;

    fn command(plate: &str, position: Option<&str>) -> Command {
        Command {
            customer: "Erika Mustermann".to_string(),
            plate: plate.to_string(),
            car: "VW Golf".to_string(),
            note: None,
            position: position.map(|p| parse_slot(p).unwrap()),
            yes: true,
        }
    }

    #[test]
    fn uses_suggested_slot() {
        let tmp = tempdir().unwrap();
        let mut store = Store::init(tmp.path().to_path_buf()).unwrap();
        store
            .disable(parse_slot("C1ROLL").unwrap(), "Broken", None)
            .unwrap();
        store.flush().unwrap();

        command("B-EM 1", None).run(tmp.path()).unwrap();

        let store = Store::open(tmp.path().to_path_buf()).unwrap();
        let stored = store
            .wheel_sets()
            .find_by_position(&parse_slot("C1ROL").unwrap())
            .unwrap();
        assert_eq!(stored.details().license_plate(), "B-EM 1");
    }

    #[test]
    fn rejects_occupied_position() {
        let tmp = tempdir().unwrap();
        Store::init(tmp.path().to_path_buf()).unwrap();

        command("A", Some("gr2om")).run(tmp.path()).unwrap();
        let error = command("B", Some("GR2OM")).run(tmp.path()).unwrap_err();

        assert_eq!(error.to_string(), "Slot GR2OM is already occupied");
    }

    #[test]
    fn rejects_blank_fields() {
        let tmp = tempdir().unwrap();
        Store::init(tmp.path().to_path_buf()).unwrap();

        let error = command(" ", None).run(tmp.path()).unwrap_err();
        assert!(error.to_string().contains("license_plate"));
    }
}
