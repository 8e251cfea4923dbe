use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, Level};

use crate::report::Settings;
use crate::{batch, repl};

const ABOUT: &str = "Lexer and parser for a small Kotlin-like statement language";

#[derive(Parser, Debug)]
#[command(name = "kparse", version, about = ABOUT, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log more (-v info, -vv debug, -vvv grammar trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print the token stream of each input before parsing it
    #[arg(long, global = true)]
    tokens: bool,

    /// Print the syntax tree of each successfully parsed input
    #[arg(long, global = true)]
    ast: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Parse lines typed at the prompt
    Repl,
    /// Parse every .txt file in a directory
    Batch {
        #[arg(long, default_value = batch::DEFAULT_DIR)]
        dir: PathBuf,
    },
    /// Parse the given files
    Check {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            tokens: self.tokens,
            ast: self.ast,
        }
    }
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let settings = cli.settings();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        None => menu(stdin.lock(), &mut out, &settings)?,
        Some(Commands::Repl) => {
            repl::start(stdin.lock(), &mut out, &settings).context("interactive mode failed")?
        }
        Some(Commands::Batch { dir }) => {
            batch::run(&dir, &mut out, &settings).context("file test mode failed")?;
        }
        Some(Commands::Check { files }) => {
            let summary = batch::check(&files, &mut out, &settings).context("checking files failed")?;
            if !summary.all_passed() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Startup menu: `1` interactive, `2` file test mode. Anything else
/// falls back to interactive mode.
pub fn menu<R: BufRead, W: Write>(mut input: R, out: &mut W, settings: &Settings) -> Result<()> {
    writeln!(out, "Choose a mode:")?;
    writeln!(out, "1. Interactive mode (terminal)")?;
    writeln!(out, "2. File test mode ({}/)", batch::DEFAULT_DIR)?;
    write!(out, "Enter 1 or 2: ")?;
    out.flush()?;

    let mut choice = String::new();
    input.read_line(&mut choice).context("reading menu choice")?;

    match choice.trim() {
        "1" => repl::start(input, out, settings)?,
        "2" => {
            batch::run(Path::new(batch::DEFAULT_DIR), out, settings)?;
        }
        other => {
            info!(choice = other, "invalid menu choice");
            writeln!(out, "Invalid option. Starting interactive mode.")?;
            repl::start(input, out, settings)?;
        }
    }
    Ok(())
}
