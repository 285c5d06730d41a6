//! Log subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Default filter directive for the given verbosity flags.
fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over the CLI flags.
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(0, false), "warn");
        assert_eq!(default_directive(1, false), "debug");
        assert_eq!(default_directive(3, false), "trace");
        assert_eq!(default_directive(0, true), "error");
    }
}
