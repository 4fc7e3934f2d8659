use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates the TOML file at `path`
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    parse_config(&raw)
}

/// Hex SHA-256 of the file at `path`
///
/// Logged at startup so a run can be tied back to the settings it used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let raw = std::fs::read(path)?;
    Ok(digest(&raw))
}

/// Loads the config and hashes the exact bytes that were parsed
///
/// # Returns
///
/// * `Ok((Config, String))` - The validated config and its hex digest
/// * `Err(ConfigError)` - The file could not be read, parsed or validated
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let config = parse_config(&raw)?;
    Ok((config, digest(raw.as_bytes())))
}

fn parse_config(raw: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(raw)?;
    validate(&config)?;
    Ok(config)
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
