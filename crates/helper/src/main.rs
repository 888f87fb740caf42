use clap::error::ErrorKind;
use clap::Parser;
use gem_keychain_core::{HelperCommand, HelperExit, Host, Result};
use gem_keychain_store::{Adapter, HelperConfig};
use std::io;
use std::process::ExitCode;

mod commands;

use commands::Commands;

#[derive(Parser, Debug)]
#[command(name = "gem-keychain-helper")]
#[command(about = "Owns gem-keychain api keys and the gem signing key", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // Help and usage both go to stderr; stdout is for payloads only
            eprint!("{}", e.render());
            return HelperExit::Failure.into();
        }
    };

    if let Err(e) = gem_keychain_utils::logging::init() {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let (command, host) = cli.command.into_request();
    match run(command, &host) {
        Ok(exit) => exit.into(),
        Err(e) => {
            tracing::debug!(%command, error = ?e, "command failed");
            eprintln!("Error: {e}");
            HelperExit::Failure.into()
        }
    }
}

fn run(command: HelperCommand, host: &Host) -> Result<HelperExit> {
    let config = HelperConfig::load()?;
    let adapter = Adapter::from_config(&config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    adapter.execute(command, host, &mut stdin.lock(), &mut stdout.lock())
}
