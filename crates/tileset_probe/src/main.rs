use std::env;
use std::io;
use std::process::ExitCode;

use tileset_probe::{parse_args, run, usage_text, Invocation, LOG_ENV_VAR};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let (log_filter, command) = match parse_args(&args)? {
        Invocation::Help => {
            println!("{}", usage_text());
            return Ok(());
        }
        Invocation::Run {
            log_filter,
            command,
        } => (log_filter, command),
    };

    init_tracing(log_filter.as_deref());
    run(command, &mut io::stdout().lock()).map_err(|error| error.to_string())
}

fn init_tracing(log_filter: Option<&str>) {
    let filter = log_filter
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_env(LOG_ENV_VAR).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}
