//! NETIO CLI
//!
//! Command-line interface for controlling and monitoring NETIO power
//! sockets over their M2M JSON API.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use netio_core::Result;
use netioctl::cli::{handle_get, handle_info, handle_set, Cli, Commands};
use netioctl::client::NetioClient;
use netioctl::config::ResolvedConfig;
use netioctl::format::{format_error, RowOptions};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Resolution happens up front: a missing required parameter aborts
    // before any request is issued.
    let config = ResolvedConfig::resolve(cli)?;
    let client = NetioClient::new(&config)?;

    match &cli.command {
        Commands::Get {
            id,
            delimiter,
            no_header,
            action_int,
        } => {
            let opts = RowOptions {
                delimiter: delimiter.clone(),
                header: !no_header,
                action_as_int: *action_int,
            };
            handle_get(&client, id, &opts)
        }
        Commands::Set { pairs } => handle_set(&client, pairs),
        Commands::Info => handle_info(&client),
    }
}

/// Map `-v` counts onto a tracing filter; `RUST_LOG` wins when set.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
