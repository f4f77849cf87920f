use std::path::Path;

use tracing::instrument;
use tsm_core::{SlotId, domain::Details};

use crate::cli::{parse_slot, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The slot the wheel set is stored in
    #[clap(value_parser = parse_slot)]
    id: SlotId,

    /// New customer name
    #[arg(long, short)]
    customer: Option<String>,

    /// New license plate
    #[arg(long, short)]
    plate: Option<String>,

    /// New car make and model
    #[arg(long)]
    car: Option<String>,

    /// New note
    #[arg(long, short)]
    note: Option<String>,

    /// Remove the note
    #[arg(long, conflicts_with = "note")]
    clear_note: bool,
}

impl Command {
    const fn is_empty(&self) -> bool {
        self.customer.is_none()
            && self.plate.is_none()
            && self.car.is_none()
            && self.note.is_none()
            && !self.clear_note
    }

    /// The current details with the given fields replaced.
    fn merge(&self, current: &Details) -> anyhow::Result<Details> {
        let note = if self.clear_note {
            None
        } else {
            self.note.as_deref().or_else(|| current.note())
        };
        Ok(Details::new(
            self.customer.as_deref().unwrap_or(current.customer_name()),
            self.plate.as_deref().unwrap_or(current.license_plate()),
            self.car.as_deref().unwrap_or(current.car_type()),
            note,
        )?)
    }

    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        if self.is_empty() {
            anyhow::bail!("Nothing to change. Pass --customer, --plate, --car, --note or --clear-note");
        }

        let mut store = crate::cli::open_store(root)?;
        let Some(wheel_set) = store.wheel_sets().find_by_position(&self.id) else {
            anyhow::bail!("No wheel set stored in slot {}", self.id);
        };
        let details = self.merge(wheel_set.details())?;

        let updated = store.update_wheel_set(&self.id, details)?;
        let message = format!(
            "✅ Updated {} ({}) in {}",
            updated.details().license_plate(),
            updated.details().customer_name(),
            self.id
        );
        store.flush()?;

        println!("{}", message.success());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tsm_core::{Store, domain::Action};

    use super::*;

    fn blank(id: SlotId) -> Command {
        Command {
            id,
            customer: None,
            plate: None,
            car: None,
            note: None,
            clear_note: false,
        }
    }

    fn seeded(root: &Path) -> SlotId {
        let mut store = Store::init(root.to_path_buf()).unwrap();
        let details = Details::new("Erika", "B-EM 1", "Audi A4", Some("Winter")).unwrap();
        let slot = store
            .add_wheel_set(details, Some(parse_slot("C2LUM").unwrap()))
            .unwrap()
            .position();
        store.flush().unwrap();
        slot
    }

    #[test]
    fn changes_only_given_fields() {
        let tmp = tempdir().unwrap();
        let slot = seeded(tmp.path());

        Command {
            plate: Some(" B-EM 2 ".to_string()),
            car: Some("Audi A6".to_string()),
            ..blank(slot)
        }
        .run(tmp.path())
        .unwrap();

        let store = Store::open(tmp.path().to_path_buf()).unwrap();
        let wheel_set = store.wheel_sets().find_by_position(&slot).unwrap();
        let details = wheel_set.details();
        assert_eq!(details.customer_name(), "Erika");
        assert_eq!(details.license_plate(), "B-EM 2");
        assert_eq!(details.car_type(), "Audi A6");
        assert_eq!(details.note(), Some("Winter"));
        assert!(wheel_set.updated_at() >= wheel_set.created_at());
        assert_eq!(
            store.audit().recent(1, None)[0].action(),
            Action::Update
        );
    }

    #[test]
    fn clears_note() {
        let tmp = tempdir().unwrap();
        let slot = seeded(tmp.path());

        Command {
            clear_note: true,
            ..blank(slot)
        }
        .run(tmp.path())
        .unwrap();

        let store = Store::open(tmp.path().to_path_buf()).unwrap();
        let wheel_set = store.wheel_sets().find_by_position(&slot).unwrap();
        assert_eq!(wheel_set.details().note(), None);
    }

    #[test]
    fn blank_field_is_rejected() {
        let tmp = tempdir().unwrap();
        let slot = seeded(tmp.path());

        let error = Command {
            customer: Some("   ".to_string()),
            ..blank(slot)
        }
        .run(tmp.path())
        .unwrap_err();

        assert_eq!(error.to_string(), "Field 'customer_name' must not be empty");
        let store = Store::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(
            store
                .wheel_sets()
                .find_by_position(&slot)
                .unwrap()
                .details()
                .customer_name(),
            "Erika"
        );
    }

    #[test]
    fn empty_slot_is_an_error() {
        let tmp = tempdir().unwrap();
        Store::init(tmp.path().to_path_buf()).unwrap();

        let error = Command {
            plate: Some("X".to_string()),
            ..blank(parse_slot("GR7UR").unwrap())
        }
        .run(tmp.path())
        .unwrap_err();

        assert_eq!(error.to_string(), "No wheel set stored in slot GR7UR");
    }

    #[test]
    fn nothing_to_change_is_an_error() {
        let tmp = tempdir().unwrap();
        let slot = seeded(tmp.path());

        let error = blank(slot).run(tmp.path()).unwrap_err();

        assert!(error.to_string().starts_with("Nothing to change"));
    }
}
