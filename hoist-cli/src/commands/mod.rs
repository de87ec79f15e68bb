//! Command handlers -- one module per subcommand

pub mod config;
pub mod container;
pub mod decode;
pub mod image;
pub mod network;
pub mod volume;

use std::path::Path;

use tracing::debug;

use hoist_core::config::HoistConfig;
use hoist_docker::{BollardEngine, DockerManager, ManagerConfig};

use crate::error::CliError;

/// Builds a manager from the `[docker]` section and checks the engine answers.
pub(crate) async fn connect(config: &HoistConfig) -> Result<DockerManager<BollardEngine>, CliError> {
    let manager =
        DockerManager::<BollardEngine>::connect(ManagerConfig::from_core(&config.docker))?;
    manager
        .ping()
        .await
        .map_err(|e| CliError::EngineUnavailable(format!("{}: {e}", config.docker.socket)))?;
    debug!(socket = %config.docker.socket, "engine reachable");
    Ok(manager)
}

/// Reads an engine-shaped JSON parameter file.
pub(crate) async fn read_params(path: &Path) -> Result<serde_json::Value, CliError> {
    let content = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&content).map_err(|e| {
        CliError::Command(format!("invalid parameter file {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_params_parses_json_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"Image":"alpine","Cmd":["true"]}"#).expect("write");

        let value = read_params(&path).await.expect("valid json");
        assert_eq!(value["Image"], "alpine");
    }

    #[tokio::test]
    async fn read_params_rejects_malformed_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("params.json");
        std::fs::write(&path, "{not json").expect("write");

        let err = read_params(&path).await.expect_err("malformed");
        assert!(matches!(err, CliError::Command(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn read_params_missing_file_is_io_error() {
        let err = read_params(Path::new("/nonexistent/params.json"))
            .await
            .expect_err("missing");
        assert_eq!(err.exit_code(), 10);
    }
}
