// logging.rs - tracing subscriber setup for the binaries

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs a stderr formatter. `RUST_LOG` wins over `verbosity`
/// (0 = info, 1 = debug, 2+ = trace). A second call keeps the subscriber
/// already installed and returns `false`.
pub fn init(verbosity: u8) -> bool {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
    {
        Ok(()) => true,
        Err(e) => {
            debug!("subscriber already installed, keeping it: {e}");
            false
        }
    }
}
