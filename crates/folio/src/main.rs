use std::ffi::OsString;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();
    init_logging(wants_verbose(&args));
    folio::program().run_from(args)
}

/// Installs the diagnostics subscriber. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// `--verbose` (or `-V` after the subcommand) anywhere past the command name.
fn wants_verbose(args: &[OsString]) -> bool {
    args.iter()
        .skip(2)
        .any(|arg| arg == "--verbose" || arg == "-V")
}
