pub mod build_info;

use std::{env, path::PathBuf};

const HOME_ENV: &str = "BROKEDASH_HOME";
const DEFAULT_DIR_NAME: &str = "brokedash";
const HIDDEN_DIR_NAME: &str = ".brokedash";

/// Installs the global tracing subscriber. Call through [`crate::init`].
///
/// Logs go to stderr so scripted output on stdout stays parseable.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "brokedash=info".parse() {
        filter = filter.add_directive(directive);
    }

    if let Err(err) = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("brokedash: tracing already initialised: {err}");
    }
}

/// Returns the application base directory.
///
/// `BROKEDASH_HOME` wins; otherwise the platform data directory is used,
/// falling back to `~/.brokedash` and finally the working directory.
pub fn app_base_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    if let Some(data) = dirs::data_dir() {
        return data.join(DEFAULT_DIR_NAME);
    }
    dirs::home_dir()
        .map(|home| home.join(HIDDEN_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}
