use std::path::Path;

use tracing::instrument;

mod check;
mod disable;
mod disabled;
mod enable;
mod list;
mod next;

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: SlotCommand,
}

#[derive(Debug, clap::Parser)]
enum SlotCommand {
    /// Validate slot identifiers and show their components
    ///
    /// Exits with code 2 if any identifier is invalid.
    Check(check::Command),

    /// List every slot with its status
    List(list::Command),

    /// Suggest the next free slot
    ///
    /// Exits with code 1 if the storage is full.
    Next(next::Command),

    /// Take a slot out of service
    Disable(disable::Command),

    /// Put a disabled slot back into service
    Enable(enable::Command),

    /// List disabled slots
    Disabled(disabled::Command),
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        match self.command {
            SlotCommand::Check(command) => command.run(),
            SlotCommand::List(command) => command.run(root),
            SlotCommand::Next(command) => command.run(root),
            SlotCommand::Disable(command) => command.run(root),
            SlotCommand::Enable(command) => command.run(root),
            SlotCommand::Disabled(command) => command.run(root),
        }
    }
}
