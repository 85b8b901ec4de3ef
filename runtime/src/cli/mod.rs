//! CLI subcommand implementations for the harvest binary.

pub mod doctor;
pub mod extract_cmd;
pub mod get_cmd;
pub mod output;
pub mod status;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
pub fn init_tracing(verbose: bool, log_json: bool) {
    let default = if verbose {
        "cortex_harvest=debug"
    } else {
        "cortex_harvest=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}
