use std::path::Path;

use tracing::instrument;

mod add;
mod edit;
mod list;
mod r#move;
mod remove;

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: WheelSetCommand,
}

#[derive(Debug, clap::Parser)]
enum WheelSetCommand {
    /// Store a new wheel set
    ///
    /// Without --position, the next free slot is suggested.
    Add(add::Command),

    /// Change the customer details of a stored wheel set
    ///
    /// Only the given fields change. The wheel set stays in its slot.
    Edit(edit::Command),

    /// List wheel sets, most recently updated first
    List(list::Command),

    /// Move a wheel set to another slot
    Move(r#move::Command),

    /// Remove the wheel set stored in a slot
    Remove(remove::Command),
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        match self.command {
            WheelSetCommand::Add(command) => command.run(root),
            WheelSetCommand::Edit(command) => command.run(root),
            WheelSetCommand::List(command) => command.run(root),
            WheelSetCommand::Move(command) => command.run(root),
            WheelSetCommand::Remove(command) => command.run(root),
        }
    }
}
