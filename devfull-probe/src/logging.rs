use env_logger::{Env, Target};

/// Initialise the global logger. Logs go to stderr so stdout stays clean for
/// the report (and for `--json` consumers). `RUST_LOG` still wins when set.
pub fn init(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    let env = Env::default().default_filter_or(level.as_str());
    // A second init (e.g. from tests) is harmless; keep the first logger.
    let _ = env_logger::Builder::from_env(env)
        .target(Target::Stderr)
        .try_init();
}
