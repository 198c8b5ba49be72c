//! Stderr logging through `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// `RUST_LOG` wins when no `-v` flag is given.
pub fn build_env_filter(verbosity: u8) -> EnvFilter {
    if verbosity == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(0)))
    } else {
        EnvFilter::new(level_for(verbosity))
    }
}

pub fn init_logging(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[path = "../tests/src_inline/logging.rs"]
mod tests;
