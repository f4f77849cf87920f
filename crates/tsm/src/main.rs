//! `tsm`: track which tire storage slots are free, occupied or disabled.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
