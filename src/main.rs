use std::process::ExitCode;

use clap::Parser;
use kparse::cli::{self, Cli};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli)
}
