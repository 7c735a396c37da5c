//! `cplot` entrypoint: parse arguments, wire up logging and the
//! cancellation signal, dispatch to a subcommand, and translate the
//! result into a process exit code.

mod cli;
mod config_cmd;
mod device_cmd;
mod fonts_cmd;
mod logging;
mod print_cmd;
mod profile;
mod segments;

use std::path::PathBuf;

use clap::Parser;
use cli::{Cli, Command};
use core_error::Result;

/// Well-known lock file path guarding exclusive device access, shared by
/// every device-touching subcommand.
fn lock_path() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("cplot").join("device.lock"))
        .unwrap_or_else(|| PathBuf::from("cplot-device.lock"))
}

fn main() {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose);
    logging::install_panic_hook();

    let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(1);
    let ctrlc_result = ctrlc::set_handler(move || {
        tracing::warn!(target: "cplot_bin::main", "interrupt received, requesting cancellation");
        let _ = cancel_tx.send(());
    });
    if let Err(e) = ctrlc_result {
        tracing::warn!(target: "cplot_bin::main", error = %e, "failed to install signal handler");
    }

    let result = dispatch(cli.command, cancel_rx);
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            tracing::error!(target: "cplot_bin::main", error = %e, "command failed");
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

fn dispatch(command: Command, cancel: crossbeam_channel::Receiver<()>) -> Result<()> {
    match command {
        Command::Print(args) => print_cmd::run(args, cancel),
        Command::Device { op } => device_cmd::run(op, None),
        Command::Config { op } => config_cmd::run(op),
        Command::Fonts { families } => fonts_cmd::run(families),
        Command::Version => {
            println!("{} {} - {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), "cplot authors");
            Ok(())
        }
    }
}
