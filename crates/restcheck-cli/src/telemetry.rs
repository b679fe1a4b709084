use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Install the stderr fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    // A second init (e.g. under a test harness) keeps the first subscriber.
    let _ = subscriber.try_init();
}
