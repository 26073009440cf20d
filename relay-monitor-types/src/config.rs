use serde::de::DeserializeOwned;
use std::{fmt, path::Path};

/// Loads and parses a TOML config file into `T`.
///
/// Every binary and debug subcommand in this workspace goes through this
/// single helper so config-loading errors are reported uniformly.
pub fn from_toml_file<P: AsRef<Path> + fmt::Display, T: DeserializeOwned>(
    path: P,
) -> eyre::Result<T> {
    use eyre::WrapErr;

    let config_data = std::fs::read(path.as_ref())
        .with_context(|| format!("could not read config from `{path}`"))?;

    toml::from_slice(&config_data).wrap_err("could not parse TOML")
}
