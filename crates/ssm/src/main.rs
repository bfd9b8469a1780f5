//! ssm - Simple SSH Manager
//!
//! Resolves a short host name against the configured candidate domains and
//! opens an ssh session to the first address that resolves.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() {
    ssm_core::logging::init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
