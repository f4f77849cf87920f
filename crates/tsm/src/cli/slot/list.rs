use std::path::Path;

use serde_json::json;
use tracing::instrument;
use tsm_core::{SlotStatus, Store, domain::scheme};

use crate::cli::{OutputFormat, terminal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum StatusFilter {
    Free,
    Occupied,
    Disabled,
}

impl From<StatusFilter> for SlotStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Free => Self::Free,
            StatusFilter::Occupied => Self::Occupied,
            StatusFilter::Disabled => Self::Disabled,
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Only show slots with this status
    #[arg(long, value_name = "STATUS")]
    status: Option<StatusFilter>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

/// One row of the listing.
#[derive(Debug, PartialEq, Eq)]
struct Row {
    id: String,
    status: SlotStatus,
    detail: Option<String>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let store = crate::cli::open_store(root)?;
        let rows = rows(&store, self.status.map(SlotStatus::from));

        match self.output {
            OutputFormat::Json => {
                let output: Vec<_> = rows
                    .iter()
                    .map(|row| {
                        json!({
                            "id": row.id,
                            "status": row.status.as_str(),
                            "detail": row.detail,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                if rows.is_empty() {
                    println!("No matching slots.");
                    return Ok(());
                }
                println!("{:<7} {:<9} Detail", "Slot", "Status");
                for row in &rows {
                    // Pad before coloring so escape codes don't break alignment.
                    let status = format!("{:<9}", row.status.as_str());
                    println!(
                        "{:<7} {} {}",
                        row.id,
                        terminal::paint_status(row.status, &status),
                        row.detail.as_deref().unwrap_or_default()
                    );
                }
            }
        }
        Ok(())
    }
}

/// Classifies the universe and annotates occupied slots with the license plate
/// and disabled slots with the reason.
fn rows(store: &Store, filter: Option<SlotStatus>) -> Vec<Row> {
    let classification = store.snapshot().classify(&scheme::enumerate_universe());

    classification
        .iter()
        .filter(|(_, status)| filter.is_none_or(|wanted| wanted == *status))
        .map(|(slot, status)| {
            let detail = match status {
                SlotStatus::Free => None,
                SlotStatus::Occupied => store
                    .wheel_sets()
                    .find_by_position(&slot)
                    .map(|w| w.details().license_plate().to_string()),
                SlotStatus::Disabled => store
                    .disabled()
                    .get(&slot)
                    .map(|entry| entry.reason().to_string()),
            };
            Row {
                id: slot.to_string(),
                status,
                detail,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tsm_core::domain::{Details, slot};

    use super::*;

    #[test]
    fn rows_annotate_status() {
        let tmp = tempdir().unwrap();
        let mut store = Store::init(tmp.path().to_path_buf()).unwrap();
        let details = Details::new("Erika", "B-EM 1", "Audi A4", None).unwrap();
        store.add_wheel_set(details, None).unwrap();
        store
            .disable(slot::parse("C1ROL").unwrap(), "Bent rail", None)
            .unwrap();

        let all = rows(&store, None);
        assert_eq!(all.len(), 216);
        assert_eq!(
            all[0],
            Row {
                id: "C1ROLL".to_string(),
                status: SlotStatus::Occupied,
                detail: Some("B-EM 1".to_string()),
            }
        );
        assert_eq!(all[1].detail.as_deref(), Some("Bent rail"));

        let disabled = rows(&store, Some(SlotStatus::Disabled));
        assert_eq!(disabled.len(), 1);
        assert_eq!(rows(&store, Some(SlotStatus::Free)).len(), 214);
    }
}
