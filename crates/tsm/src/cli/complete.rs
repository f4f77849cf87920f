//! Generate shell completions for the tsm CLI.
//!
//! Supports bash, zsh, fish, elvish and `PowerShell`. Save the generated
//! script to the shell's completion directory.

use std::io;

use clap::CommandFactory;
use clap_complete::Shell;

/// Generate shell completion scripts
#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

impl Command {
    /// Write the completion script to stdout.
    pub fn run(self) {
        let mut cmd = crate::cli::Cli::command();
        clap_complete::generate(self.shell, &mut cmd, "tsm", &mut io::stdout());
    }
}
