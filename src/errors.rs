use std::result::Result as StdResult;

use brokedash_config::ConfigError;
use brokedash_core::CoreError;
use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the ranking, storage and configuration layers.
#[derive(Error, Debug)]
pub enum BrokeError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(Uuid),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = StdResult<T, BrokeError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BrokeError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for BrokeError {
    fn from(err: std::io::Error) -> Self {
        BrokeError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for BrokeError {
    fn from(err: serde_json::Error) -> Self {
        BrokeError::StorageError(err.to_string())
    }
}

impl From<CoreError> for BrokeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProfileNotFound(id) => BrokeError::ProfileNotFound(id),
            CoreError::InvalidOperation(message) | CoreError::Validation(message) => {
                BrokeError::InvalidInput(message)
            }
            CoreError::Storage(message) | CoreError::Serde(message) => {
                BrokeError::StorageError(message)
            }
            CoreError::Io(err) => BrokeError::StorageError(err.to_string()),
        }
    }
}

impl From<ConfigError> for BrokeError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => BrokeError::StorageError(io.to_string()),
            ConfigError::Serde(message) | ConfigError::Invalid(message) => {
                BrokeError::ConfigError(message)
            }
            ConfigError::BackupNotFound(name) => {
                BrokeError::ConfigError(format!("backup `{}` not found", name))
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(BrokeError::from(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(BrokeError::from(err))
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_validation_maps_to_invalid_input() {
        let err = BrokeError::from(CoreError::Validation("spend must be finite".into()));
        assert!(matches!(err, BrokeError::InvalidInput(message) if message.contains("finite")));
    }

    #[test]
    fn missing_config_backup_maps_to_config_error() {
        let err = CliError::from(ConfigError::BackupNotFound("config_x.json".into()));
        assert!(err.to_string().contains("config_x.json"));
    }
}
