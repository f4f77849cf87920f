use std::process;

use serde_json::{Value, json};
use tracing::instrument;
use tsm_core::domain::{InvalidFormat, SlotId, slot};

use crate::cli::{OutputFormat, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The identifiers to check (e.g., C1ROLL, gr3mr)
    #[arg(num_args = 1.., required = true)]
    ids: Vec<String>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Command {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let results: Vec<(&str, Result<SlotId, InvalidFormat>)> = self
            .ids
            .iter()
            .map(|input| (input.as_str(), slot::parse(input.trim())))
            .collect();

        match self.output {
            OutputFormat::Json => {
                let output: Vec<Value> = results
                    .iter()
                    .map(|(input, result)| describe(input, result))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                for (input, result) in &results {
                    match result {
                        Ok(id) => println!(
                            "{} {:<7} {}",
                            "✓".success(),
                            id.to_string(),
                            components(id).dim()
                        ),
                        Err(e) => println!(
                            "{} {input:<7} {}",
                            "✗".error(),
                            e.reason().to_string().error()
                        ),
                    }
                }
            }
        }

        if results.iter().any(|(_, result)| result.is_err()) {
            process::exit(2);
        }
        Ok(())
    }
}

fn components(id: &SlotId) -> String {
    let side = id
        .side()
        .map(|side| format!(", side {}", side.code()))
        .unwrap_or_default();
    format!(
        "{} bay {}{side}, level {}, sub-slot {}",
        id.family(),
        id.bay(),
        id.level().code(),
        id.sub_slot().code()
    )
}

fn describe(input: &str, result: &Result<SlotId, InvalidFormat>) -> Value {
    match result {
        Ok(id) => json!({
            "input": input,
            "valid": true,
            "id": id.to_string(),
            "family": id.family().to_string(),
            "bay": id.bay(),
            "side": id.side().map(|side| side.code().to_string()),
            "level": id.level().code().to_string(),
            "sub_slot": id.sub_slot().code(),
        }),
        Err(e) => json!({
            "input": input,
            "valid": false,
            "error": e.reason().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SlotId {
        slot::parse(s).unwrap()
    }

    #[test]
    fn container_components() {
        assert_eq!(
            components(&id("C3LUM")),
            "container bay 3, side L, level U, sub-slot M"
        );
    }

    #[test]
    fn garage_components_have_no_side() {
        assert_eq!(
            components(&id("GR8UR")),
            "garage bay 8, level U, sub-slot R"
        );
    }

    #[test]
    fn describe_valid_identifier() {
        let value = describe("c1roll", &slot::parse("c1roll"));
        assert_eq!(value["valid"], true);
        assert_eq!(value["id"], "C1ROLL");
        assert_eq!(value["side"], "R");
        assert_eq!(value["sub_slot"], "LL");
    }

    #[test]
    fn describe_invalid_identifier() {
        let value = describe("C9ROLL", &slot::parse("C9ROLL"));
        assert_eq!(value["valid"], false);
        assert_eq!(value["error"], "bay 9 is out of range 1-4");
    }
}
