use std::path::Path;

use tracing::instrument;
use tsm_core::SlotId;

use crate::cli::{parse_slot, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The slot the wheel set is stored in
    #[clap(value_parser = parse_slot)]
    from: SlotId,

    /// The slot to move it to
    #[clap(value_parser = parse_slot)]
    to: SlotId,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut store = crate::cli::open_store(root)?;

        let plate = store
            .move_wheel_set(self.from, self.to)?
            .details()
            .license_plate()
            .to_string();

        if self.from == self.to {
            println!(
                "{}",
                format!("ℹ️  {plate} is already in {}", self.to).dim()
            );
            return Ok(());
        }
        store.flush()?;

        println!(
            "{}",
            format!("✅ Moved {plate} from {} to {}", self.from, self.to).success()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tsm_core::{Store, domain::Details};

    use super::*;

    fn id(s: &str) -> SlotId {
        parse_slot(s).unwrap()
    }

    fn seeded_store(root: &Path) {
        let mut store = Store::init(root.to_path_buf()).unwrap();
        for (plate, slot) in [("A", "C1ROLL"), ("B", "C1ROL")] {
            let details = Details::new("Customer", plate, "Car", None).unwrap();
            store.add_wheel_set(details, Some(id(slot))).unwrap();
        }
        store.disable(id("GR1OL"), "Broken", None).unwrap();
        store.flush().unwrap();
    }

    #[test]
    fn moves_to_free_slot() {
        let tmp = tempdir().unwrap();
        seeded_store(tmp.path());

        Command {
            from: id("C1ROLL"),
            to: id("GR3UM"),
        }
        .run(tmp.path())
        .unwrap();

        let store = Store::open(tmp.path().to_path_buf()).unwrap();
        assert!(store.wheel_sets().find_by_position(&id("C1ROLL")).is_none());
        assert_eq!(
            store
                .wheel_sets()
                .find_by_position(&id("GR3UM"))
                .unwrap()
                .details()
                .license_plate(),
            "A"
        );
    }

    #[test_case::test_case("C1ROL", "Slot C1ROL is already occupied"; "occupied")]
    #[test_case::test_case("GR1OL", "Slot GR1OL is disabled"; "disabled")]
    fn refuses_unusable_target(to: &str, message: &str) {
        let tmp = tempdir().unwrap();
        seeded_store(tmp.path());

        let error = Command {
            from: id("C1ROLL"),
            to: id(to),
        }
        .run(tmp.path())
        .unwrap_err();

        assert_eq!(error.to_string(), message);
    }

    #[test]
    fn missing_source_is_an_error() {
        let tmp = tempdir().unwrap();
        seeded_store(tmp.path());

        let error = Command {
            from: id("C2ROL"),
            to: id("C2ROM"),
        }
        .run(tmp.path())
        .unwrap_err();

        assert_eq!(error.to_string(), "No wheel set stored in slot C2ROL");
    }

    #[test]
    fn missing_source_onto_itself_is_an_error() {
        let tmp = tempdir().unwrap();
        seeded_store(tmp.path());

        let error = Command {
            from: id("C2ROL"),
            to: id("C2ROL"),
        }
        .run(tmp.path())
        .unwrap_err();

        assert_eq!(error.to_string(), "No wheel set stored in slot C2ROL");
    }

    #[test]
    fn moving_onto_itself_changes_nothing() {
        let tmp = tempdir().unwrap();
        seeded_store(tmp.path());
        let before = Store::open(tmp.path().to_path_buf()).unwrap();

        Command {
            from: id("C1ROL"),
            to: id("C1ROL"),
        }
        .run(tmp.path())
        .unwrap();

        assert_eq!(Store::open(tmp.path().to_path_buf()).unwrap(), before);
    }
}
