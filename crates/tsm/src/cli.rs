use std::{
    io::{self, BufRead},
    path::{Path, PathBuf},
};

mod backup;
mod complete;
mod config;
mod init;
mod log;
mod slot;
mod status;
mod terminal;
mod wheelset;

use clap::ArgAction;
use tsm_core::{SlotId, Store};

/// Parse a slot identifier, trimming surrounding whitespace.
///
/// This is the CLI boundary. The core parser does not trim, and handles case
/// itself.
fn parse_slot(s: &str) -> Result<SlotId, String> {
    s.trim().parse().map_err(|e| format!("{e}"))
}

fn prompt_to_proceed() -> io::Result<()> {
    eprint!("\nProceed? (y/N) ");
    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    if !line.trim().eq_ignore_ascii_case("y") {
        println!("Cancelled");
        std::process::exit(130);
    }
    Ok(())
}

fn prompt_for(label: &str) -> io::Result<String> {
    eprint!("\n{label}: ");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn open_store(root: &Path) -> anyhow::Result<Store> {
    Ok(Store::open(root.to_path_buf())?)
}

/// Output format shared by the listing commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the tire storage
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.unwrap_or_default().run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show slot counts and the next free slot (default)
    Status(status::Command),

    /// Initialize a new tire storage
    Init(init::Command),

    /// Inspect, list, disable and enable slots
    Slot(slot::Command),

    /// Store, find, move and remove wheel sets
    #[command(name = "wheelset", alias = "ws")]
    WheelSet(wheelset::Command),

    /// Show recent changes
    Log(log::Command),

    /// Copy the storage files into a timestamped backup directory
    Backup(backup::Command),

    /// Show or modify configuration settings
    Config(config::Command),

    /// Generate shell completion scripts
    Completions(complete::Command),
}

impl Default for Command {
    fn default() -> Self {
        Self::Status(status::Command::default())
    }
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(&root)?,
            Self::Init(command) => command.run(root)?,
            Self::Slot(command) => command.run(&root)?,
            Self::WheelSet(command) => command.run(&root)?,
            Self::Log(command) => command.run(&root)?,
            Self::Backup(command) => command.run(&root)?,
            Self::Config(command) => command.run(&root)?,
            Self::Completions(command) => command.run(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use test_case::test_case;

    use super::*;

    #[test_case("C1ROLL", "C1ROLL"; "canonical")]
    #[test_case("c1rol", "C1ROL"; "lowercase")]
    #[test_case("  gr8ur\n", "GR8UR"; "padded")]
    fn parse_slot_normalizes(input: &str, expected: &str) {
        assert_eq!(parse_slot(input).unwrap().to_string(), expected);
    }

    #[test]
    fn parse_slot_reports_reason() {
        let error = parse_slot("C9ROLL").unwrap_err();
        assert!(error.contains("C9ROLL"));
        assert!(error.contains("bay 9"));
    }

    #[test]
    fn parse_slot_leaves_case_folding_to_the_grammar() {
        let error = parse_slot("gr1oß").unwrap_err();
        assert!(error.contains("sub-slot 'ß'"), "{error}");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_is_the_default_command() {
        let cli = Cli::try_parse_from(["tsm"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(Command::default(), Command::Status(_)));
    }

    #[test]
    fn slot_arguments_are_normalized() {
        let cli = Cli::try_parse_from(["tsm", "wheelset", "move", "c1rol", " gr1om "]).unwrap();
        let Some(Command::WheelSet(_)) = cli.command else {
            panic!("expected wheelset command");
        };
    }

    #[test]
    fn invalid_slot_argument_is_rejected() {
        assert!(Cli::try_parse_from(["tsm", "slot", "enable", "GR9OL"]).is_err());
    }
}
