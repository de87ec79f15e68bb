//! CLI-specific error types and exit code mapping

use hoist_core::error::HoistError;
use hoist_docker::EngineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Cannot reach the container engine.
    #[error("engine not reachable: {0}")]
    EngineUnavailable(String),

    /// The engine rejected or failed a request.
    #[error("engine error: {0}")]
    Engine(String),

    /// JSON (de)serialisation failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped error from hoist-core.
    #[error("{0}")]
    Core(#[from] HoistError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                      |
    /// |------|------------------------------|
    /// | 0    | Success                      |
    /// | 1    | General / command error      |
    /// | 2    | Configuration error          |
    /// | 3    | Engine unreachable           |
    /// | 10   | IO error                     |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(HoistError::Config(_)) => 2,
            Self::EngineUnavailable(_) => 3,
            Self::Io(_) | Self::Core(HoistError::Io(_)) => 10,
            Self::Json(_) | Self::Command(_) | Self::Engine(_) | Self::Core(_) => 1,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Connection(msg) => Self::EngineUnavailable(msg),
            EngineError::Config { .. } => Self::Config(e.to_string()),
            other => Self::Engine(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_core::error::ConfigError;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err = CliError::Core(HoistError::Config(ConfigError::FileNotFound {
            path: "hoist.toml".to_owned(),
        }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_engine_unavailable() {
        let err = CliError::EngineUnavailable("socket missing".to_owned());
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_command_and_engine_errors() {
        assert_eq!(CliError::Command("x".to_owned()).exit_code(), 1);
        assert_eq!(CliError::Engine("x".to_owned()).exit_code(), 1);
    }

    #[test]
    fn test_from_engine_connection_error() {
        let err: CliError = EngineError::Connection("ping failed".to_owned()).into();
        assert!(matches!(err, CliError::EngineUnavailable(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_from_engine_config_error() {
        let err: CliError = EngineError::Config {
            field: "socket".to_owned(),
            reason: "must not be empty".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("socket"));
    }

    #[test]
    fn test_from_engine_not_found() {
        let err: CliError = EngineError::NotFound("hello-world:latest".to_owned()).into();
        match err {
            CliError::Engine(msg) => assert!(msg.contains("hello-world:latest")),
            other => panic!("expected Engine variant, got {other:?}"),
        }
    }

    #[test]
    fn test_error_display_command() {
        let err = CliError::Command("no container matches 'web'".to_owned());
        assert_eq!(err.to_string(), "no container matches 'web'");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let cli_err: CliError = io_err.into();
        match cli_err {
            CliError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied),
            _ => panic!("expected Io error variant"),
        }
    }
}
