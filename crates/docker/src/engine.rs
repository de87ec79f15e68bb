//! Container engine API abstraction.
//!
//! The [`ContainerEngine`] trait is the only way hoist talks to an engine.
//! Production code uses [`BollardEngine`]; unit tests use `MockEngine`.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ DockerManager │
//! └───────┬───────┘
//!         │
//!         ▼
//!  ┌───────────────┐
//!  │ContainerEngine│ (trait)
//!  └───────────────┘
//!       │      │
//!       ▼      ▼
//!  ┌───────┐ ┌────┐
//!  │Bollard│ │Mock│
//!  └───┬───┘ └────┘
//!      │
//!      ▼
//!  Docker daemon
//! ```
//!
//! # Identifier validation
//!
//! Methods that address a container or exec instance validate the identifier
//! before calling the engine. Identifiers must be 1-256 characters of
//! `[A-Za-z0-9_.-]`, which covers full IDs, ID prefixes and container names.
//!
//! # Output streams
//!
//! Log and exec output is returned as an [`OutputStream`] of raw chunks in the
//! multiplexed wire format (8-byte header plus payload), ready for
//! [`crate::frame`] to decode.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tracing::trace;

use crate::entity::{
    ContainerDetails, ContainerSummary, CreatedContainer, EndpointInfo, ImageDetails,
    NetworkSummary, VolumeSummary,
};
use crate::error::EngineError;
use crate::frame::{StreamKind, encode_frame};
use crate::params::{ContainerParams, ExecParams, NetworkParams, RegistryAuth, VolumeParams};

/// Raw multiplexed output chunks from a container or exec instance.
pub type OutputStream = BoxStream<'static, Result<Bytes, EngineError>>;

const MAX_IDENTIFIER_LEN: usize = 256;

/// Validates a container, exec or network identifier.
fn validate_identifier(kind: &str, id: &str) -> Result<(), EngineError> {
    if id.is_empty() || id.len() > MAX_IDENTIFIER_LEN {
        return Err(EngineError::InvalidParams {
            operation: kind.to_owned(),
            reason: format!(
                "identifier length {} (must be 1-{MAX_IDENTIFIER_LEN})",
                id.len()
            ),
        });
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(EngineError::InvalidParams {
            operation: kind.to_owned(),
            reason: format!("identifier '{id}' contains invalid characters"),
        });
    }
    Ok(())
}

/// Trait abstracting container engine operations.
///
/// The trait is `Send + Sync + 'static` so an engine can be shared behind an
/// `Arc` across tasks, including the background cleanup of temporary runs.
///
/// # Error handling
///
/// - **404 responses**: [`EngineError::NotFound`]
/// - **Unreachable daemon**: [`EngineError::Connection`]
/// - **Malformed parameters or identifiers**: [`EngineError::InvalidParams`]
/// - **Anything else**: [`EngineError::Api`]
pub trait ContainerEngine: Send + Sync + 'static {
    /// Checks daemon connectivity.
    fn ping(&self) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Pulls `name:tag` (or `name@digest` when `tag` is a digest), consuming the
    /// progress stream until it ends.
    ///
    /// Registry credentials are passed through unchanged when present.
    fn pull_image(
        &self,
        name: &str,
        tag: &str,
        auth: Option<&RegistryAuth>,
    ) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Inspects an image by reference (`name:tag`, `name@digest`) or ID.
    fn inspect_image(
        &self,
        reference: &str,
    ) -> impl Future<Output = Result<ImageDetails, EngineError>> + Send;

    /// Lists containers. With `all == false` only running containers are returned.
    fn list_containers(
        &self,
        all: bool,
    ) -> impl Future<Output = Result<Vec<ContainerSummary>, EngineError>> + Send;

    /// Inspects a container by ID, ID prefix or name.
    fn inspect_container(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<ContainerDetails, EngineError>> + Send;

    /// Creates a container without starting it.
    fn create_container(
        &self,
        params: &ContainerParams,
    ) -> impl Future<Output = Result<CreatedContainer, EngineError>> + Send;

    fn start_container(&self, id: &str) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Waits until the container reaches a terminal state and returns its exit code.
    ///
    /// A non-zero exit code is a successful wait, not an error.
    fn wait_container(&self, id: &str) -> impl Future<Output = Result<i64, EngineError>> + Send;

    fn remove_container(&self, id: &str)
    -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Opens a following stream of the container's stdout and stderr.
    fn container_logs(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<OutputStream, EngineError>> + Send;

    /// Creates an exec instance and returns its ID.
    fn create_exec(
        &self,
        container_id: &str,
        params: &ExecParams,
    ) -> impl Future<Output = Result<String, EngineError>> + Send;

    /// Starts an exec instance attached and returns its output stream.
    fn start_exec(
        &self,
        exec_id: &str,
    ) -> impl Future<Output = Result<OutputStream, EngineError>> + Send;

    fn list_networks(&self)
    -> impl Future<Output = Result<Vec<NetworkSummary>, EngineError>> + Send;

    fn inspect_network(
        &self,
        name_or_id: &str,
    ) -> impl Future<Output = Result<NetworkSummary, EngineError>> + Send;

    fn create_network(
        &self,
        params: &NetworkParams,
    ) -> impl Future<Output = Result<NetworkSummary, EngineError>> + Send;

    fn list_volumes(&self) -> impl Future<Output = Result<Vec<VolumeSummary>, EngineError>> + Send;

    fn create_volume(
        &self,
        params: &VolumeParams,
    ) -> impl Future<Output = Result<VolumeSummary, EngineError>> + Send;
}

/// Production engine client backed by `bollard`.
///
/// Talks to the daemon over a Unix socket. The inner client is shared through
/// an `Arc`, so cloning a `BollardEngine` is cheap.
///
/// ```ignore
/// use hoist_docker::BollardEngine;
///
/// let engine = BollardEngine::connect_local()?;
/// let engine = BollardEngine::connect_with_socket("/run/docker.sock", 30)?;
/// # Ok::<(), hoist_docker::EngineError>(())
/// ```
#[derive(Clone)]
pub struct BollardEngine {
    docker: Arc<bollard::Docker>,
}

impl BollardEngine {
    /// Connects using the platform's default local socket.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Connection`] if the client cannot be built.
    pub fn connect_local() -> Result<Self, EngineError> {
        let docker = bollard::Docker::connect_with_local_defaults()
            .map_err(|e| EngineError::Connection(format!("failed to connect to docker: {e}")))?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects to a specific socket path with a request timeout in seconds.
    pub fn connect_with_socket(socket_path: &str, timeout_secs: u64) -> Result<Self, EngineError> {
        let docker = bollard::Docker::connect_with_socket(
            socket_path,
            timeout_secs,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| {
            EngineError::Connection(format!("failed to connect to docker at {socket_path}: {e}"))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects using the `[docker]` section of the configuration.
    pub fn from_config(config: &hoist_core::DockerConfig) -> Result<Self, EngineError> {
        Self::connect_with_socket(&config.socket, config.connect_timeout_secs)
    }
}

fn api_error(operation: &str, target: &str, err: bollard::errors::Error) -> EngineError {
    match err {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => EngineError::NotFound(target.to_owned()),
        other => EngineError::Api(format!("{operation} '{target}' failed: {other}")),
    }
}

fn invalid_params(operation: &str, err: serde_json::Error) -> EngineError {
    EngineError::InvalidParams {
        operation: operation.to_owned(),
        reason: err.to_string(),
    }
}

/// Re-encodes a demultiplexed bollard log item as a wire frame.
fn log_output_to_frame(output: bollard::container::LogOutput) -> Bytes {
    use bollard::container::LogOutput;

    match output {
        LogOutput::StdErr { message } => encode_frame(StreamKind::Stderr, &message),
        LogOutput::StdIn { message } => encode_frame(StreamKind::Stdin, &message),
        LogOutput::StdOut { message } | LogOutput::Console { message } => {
            encode_frame(StreamKind::Stdout, &message)
        }
    }
}

fn to_container_summary(c: bollard::models::ContainerSummary) -> ContainerSummary {
    ContainerSummary {
        id: c.id.unwrap_or_default(),
        names: c.names.unwrap_or_default(),
        image: c.image.unwrap_or_default(),
        state: c.state.unwrap_or_default(),
        labels: c.labels.unwrap_or_default(),
    }
}

fn to_container_details(d: bollard::models::ContainerInspectResponse) -> ContainerDetails {
    let config = d.config.unwrap_or_default();
    let state = d.state.unwrap_or_default();
    let networks = d
        .network_settings
        .and_then(|s| s.networks)
        .unwrap_or_default()
        .into_iter()
        .map(|(name, endpoint)| {
            (
                name,
                EndpointInfo {
                    network_id: endpoint.network_id,
                    ip_address: endpoint.ip_address,
                },
            )
        })
        .collect();

    ContainerDetails {
        id: d.id.unwrap_or_default(),
        name: d
            .name
            .map(|n| n.trim_start_matches('/').to_owned())
            .unwrap_or_default(),
        image: config.image.unwrap_or_default(),
        hostname: config.hostname,
        running: state.running.unwrap_or(false),
        exit_code: state.exit_code,
        networks,
    }
}

fn to_network_summary(n: bollard::models::Network) -> NetworkSummary {
    NetworkSummary {
        id: n.id.unwrap_or_default(),
        name: n.name.unwrap_or_default(),
        driver: n.driver.unwrap_or_default(),
        labels: n.labels.unwrap_or_default(),
    }
}

fn to_volume_summary(v: bollard::models::Volume) -> VolumeSummary {
    VolumeSummary {
        name: v.name,
        driver: v.driver,
        mountpoint: v.mountpoint,
        labels: v.labels,
    }
}

impl ContainerEngine for BollardEngine {
    async fn ping(&self) -> Result<(), EngineError> {
        self.docker
            .ping()
            .await
            .map_err(|e| EngineError::Connection(format!("ping failed: {e}")))?;
        Ok(())
    }

    async fn pull_image(
        &self,
        name: &str,
        tag: &str,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), EngineError> {
        use bollard::image::CreateImageOptions;

        let options = CreateImageOptions::<String> {
            from_image: name.to_owned(),
            tag: tag.to_owned(),
            ..Default::default()
        };
        let credentials = auth.map(|a| bollard::auth::DockerCredentials {
            username: a.username.clone(),
            password: a.password.clone(),
            serveraddress: a.serveraddress.clone(),
            identitytoken: a.identitytoken.clone(),
            ..Default::default()
        });

        // tags never contain ':', digests always do
        let separator = if tag.contains(':') { '@' } else { ':' };
        let reference = format!("{name}{separator}{tag}");
        let mut stream = self.docker.create_image(Some(options), None, credentials);
        while let Some(progress) = stream.next().await {
            let info = progress.map_err(|e| api_error("pull image", &reference, e))?;
            trace!(image = %reference, status = ?info.status, progress = ?info.progress, "pull progress");
        }
        Ok(())
    }

    async fn inspect_image(&self, reference: &str) -> Result<ImageDetails, EngineError> {
        let image = self
            .docker
            .inspect_image(reference)
            .await
            .map_err(|e| api_error("inspect image", reference, e))?;
        Ok(ImageDetails {
            id: image.id.unwrap_or_default(),
            repo_tags: image.repo_tags.unwrap_or_default(),
            repo_digests: image.repo_digests.unwrap_or_default(),
            size: image.size,
        })
    }

    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>, EngineError> {
        use bollard::container::ListContainersOptions;

        let options = ListContainersOptions::<String> {
            all,
            ..Default::default()
        };
        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| EngineError::Api(format!("list containers failed: {e}")))?;
        Ok(containers.into_iter().map(to_container_summary).collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerDetails, EngineError> {
        validate_identifier("inspect_container", id)?;

        let details = self
            .docker
            .inspect_container(id, None)
            .await
            .map_err(|e| api_error("inspect container", id, e))?;
        Ok(to_container_details(details))
    }

    async fn create_container(
        &self,
        params: &ContainerParams,
    ) -> Result<CreatedContainer, EngineError> {
        use bollard::container::{Config, CreateContainerOptions, NetworkingConfig};
        use bollard::models::{EndpointSettings, HostConfig};

        let host_config = params
            .host_config
            .clone()
            .map(serde_json::from_value::<HostConfig>)
            .transpose()
            .map_err(|e| invalid_params("create_container", e))?;

        let networking_config = match &params.networking_config {
            Some(value) => {
                let endpoints = value
                    .get("EndpointsConfig")
                    .cloned()
                    .map(serde_json::from_value::<HashMap<String, EndpointSettings>>)
                    .transpose()
                    .map_err(|e| invalid_params("create_container", e))?
                    .unwrap_or_default();
                Some(NetworkingConfig {
                    endpoints_config: endpoints,
                })
            }
            None => None,
        };

        let config = Config::<String> {
            image: Some(params.image.clone()),
            cmd: params.cmd.clone(),
            entrypoint: params.entrypoint.clone(),
            env: params.env.clone(),
            labels: params.labels.clone(),
            working_dir: params.working_dir.clone(),
            user: params.user.clone(),
            tty: params.tty,
            attach_stdout: params.attach_stdout,
            attach_stderr: params.attach_stderr,
            host_config,
            networking_config,
            ..Default::default()
        };
        let options = params.name.clone().map(|name| CreateContainerOptions {
            name,
            platform: None,
        });

        let response = self
            .docker
            .create_container(options, config)
            .await
            .map_err(|e| api_error("create container", &params.image, e))?;
        Ok(CreatedContainer {
            id: response.id,
            warnings: response.warnings,
        })
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        validate_identifier("start_container", id)?;

        use bollard::container::StartContainerOptions;

        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| api_error("start container", id, e))
    }

    async fn wait_container(&self, id: &str) -> Result<i64, EngineError> {
        validate_identifier("wait_container", id)?;

        use bollard::container::WaitContainerOptions;

        let mut stream = self
            .docker
            .wait_container(id, None::<WaitContainerOptions<String>>);
        let mut status_code = 0;
        while let Some(item) = stream.next().await {
            match item {
                Ok(response) => status_code = response.status_code,
                // bollard reports a non-zero exit as an error item
                Err(bollard::errors::Error::DockerContainerWaitError { code, .. }) => {
                    status_code = code;
                }
                Err(e) => return Err(api_error("wait container", id, e)),
            }
        }
        Ok(status_code)
    }

    async fn remove_container(&self, id: &str) -> Result<(), EngineError> {
        validate_identifier("remove_container", id)?;

        use bollard::container::RemoveContainerOptions;

        self.docker
            .remove_container(id, None::<RemoveContainerOptions>)
            .await
            .map_err(|e| api_error("remove container", id, e))
    }

    async fn container_logs(&self, id: &str) -> Result<OutputStream, EngineError> {
        validate_identifier("container_logs", id)?;

        use bollard::container::LogsOptions;

        let options = LogsOptions::<String> {
            follow: true,
            stdout: true,
            stderr: true,
            ..Default::default()
        };
        let stream = self
            .docker
            .logs(id, Some(options))
            .map(|item| {
                item.map(log_output_to_frame)
                    .map_err(|e| EngineError::Stream(e.to_string()))
            })
            .boxed();
        Ok(stream)
    }

    async fn create_exec(
        &self,
        container_id: &str,
        params: &ExecParams,
    ) -> Result<String, EngineError> {
        validate_identifier("create_exec", container_id)?;

        use bollard::exec::CreateExecOptions;

        let options = CreateExecOptions::<String> {
            cmd: Some(params.cmd.clone()),
            env: params.env.clone(),
            working_dir: params.working_dir.clone(),
            user: params.user.clone(),
            privileged: params.privileged,
            tty: params.tty,
            attach_stdout: params.attach_stdout,
            attach_stderr: params.attach_stderr,
            ..Default::default()
        };
        let created = self
            .docker
            .create_exec(container_id, options)
            .await
            .map_err(|e| api_error("create exec", container_id, e))?;
        Ok(created.id)
    }

    async fn start_exec(&self, exec_id: &str) -> Result<OutputStream, EngineError> {
        validate_identifier("start_exec", exec_id)?;

        use bollard::exec::{StartExecOptions, StartExecResults};

        let options = StartExecOptions {
            detach: false,
            ..Default::default()
        };
        let results = self
            .docker
            .start_exec(exec_id, Some(options))
            .await
            .map_err(|e| api_error("start exec", exec_id, e))?;

        match results {
            StartExecResults::Attached { output, .. } => Ok(output
                .map(|item| {
                    item.map(log_output_to_frame)
                        .map_err(|e| EngineError::Stream(e.to_string()))
                })
                .boxed()),
            StartExecResults::Detached => {
                Ok(futures_util::stream::empty::<Result<Bytes, EngineError>>().boxed())
            }
        }
    }

    async fn list_networks(&self) -> Result<Vec<NetworkSummary>, EngineError> {
        use bollard::network::ListNetworksOptions;

        let networks = self
            .docker
            .list_networks(None::<ListNetworksOptions<String>>)
            .await
            .map_err(|e| EngineError::Api(format!("list networks failed: {e}")))?;
        Ok(networks.into_iter().map(to_network_summary).collect())
    }

    async fn inspect_network(&self, name_or_id: &str) -> Result<NetworkSummary, EngineError> {
        validate_identifier("inspect_network", name_or_id)?;

        use bollard::network::InspectNetworkOptions;

        let network = self
            .docker
            .inspect_network(name_or_id, None::<InspectNetworkOptions<String>>)
            .await
            .map_err(|e| api_error("inspect network", name_or_id, e))?;
        Ok(to_network_summary(network))
    }

    async fn create_network(&self, params: &NetworkParams) -> Result<NetworkSummary, EngineError> {
        validate_identifier("create_network", &params.name)?;

        use bollard::network::CreateNetworkOptions;

        let options = CreateNetworkOptions::<String> {
            name: params.name.clone(),
            driver: params
                .driver
                .clone()
                .unwrap_or_else(|| "bridge".to_owned()),
            internal: params.internal,
            attachable: params.attachable,
            labels: params.labels.clone(),
            options: params.options.clone(),
            ..Default::default()
        };
        self.docker
            .create_network(options)
            .await
            .map_err(|e| api_error("create network", &params.name, e))?;

        // the create response carries only the ID; inspect for the full entity
        self.inspect_network(&params.name).await
    }

    async fn list_volumes(&self) -> Result<Vec<VolumeSummary>, EngineError> {
        use bollard::volume::ListVolumesOptions;

        let response = self
            .docker
            .list_volumes(None::<ListVolumesOptions<String>>)
            .await
            .map_err(|e| EngineError::Api(format!("list volumes failed: {e}")))?;
        Ok(response
            .volumes
            .unwrap_or_default()
            .into_iter()
            .map(to_volume_summary)
            .collect())
    }

    async fn create_volume(&self, params: &VolumeParams) -> Result<VolumeSummary, EngineError> {
        use bollard::volume::CreateVolumeOptions;

        let options = CreateVolumeOptions::<String> {
            name: params.name.clone().unwrap_or_default(),
            driver: params
                .driver
                .clone()
                .unwrap_or_else(|| "local".to_owned()),
            driver_opts: params.driver_opts.clone(),
            labels: params.labels.clone(),
            ..Default::default()
        };
        let target = params.name.as_deref().unwrap_or("<generated>");
        let volume = self
            .docker
            .create_volume(options)
            .await
            .map_err(|e| api_error("create volume", target, e))?;
        Ok(to_volume_summary(volume))
    }
}

/// Mock engine for tests
///
/// Returns the configured entities and records every call.
/// Operations registered in `fail_on` fail with `EngineError::Api`.
#[cfg(test)]
#[derive(Default)]
pub struct MockEngine {
    pub containers: Vec<(ContainerSummary, ContainerDetails)>,
    pub networks: Vec<NetworkSummary>,
    pub volumes: Vec<VolumeSummary>,
    pub images: Vec<ImageDetails>,
    /// Raw chunks returned by logs and exec
    pub output: Vec<Bytes>,
    pub exit_code: i64,
    pub fail_on: std::collections::HashSet<&'static str>,
    calls: std::sync::Mutex<Vec<String>>,
    created: std::sync::Mutex<Vec<ContainerParams>>,
    execs: std::sync::Mutex<Vec<ExecParams>>,
    removal_attempted: tokio::sync::Notify,
}

#[cfg(test)]
impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, summary: ContainerSummary, details: ContainerDetails) -> Self {
        self.containers.push((summary, details));
        self
    }

    pub fn with_networks(mut self, networks: Vec<NetworkSummary>) -> Self {
        self.networks = networks;
        self
    }

    pub fn with_volumes(mut self, volumes: Vec<VolumeSummary>) -> Self {
        self.volumes = volumes;
        self
    }

    pub fn with_images(mut self, images: Vec<ImageDetails>) -> Self {
        self.images = images;
        self
    }

    pub fn with_output(mut self, chunks: Vec<Bytes>) -> Self {
        self.output = chunks;
        self
    }

    pub fn with_exit_code(mut self, code: i64) -> Self {
        self.exit_code = code;
        self
    }

    /// Makes the given operation fail.
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on.insert(operation);
        self
    }

    /// Recorded calls (`operation` or `operation:target`)
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count_calls(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(':').next() == Some(operation))
            .count()
    }

    pub fn created_params(&self) -> Vec<ContainerParams> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn exec_params(&self) -> Vec<ExecParams> {
        self.execs.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Waits until remove_container has been called once.
    pub async fn removal_attempted(&self) {
        self.removal_attempted.notified().await;
    }

    fn record(&self, operation: &str, target: &str) -> Result<(), EngineError> {
        if let Ok(mut calls) = self.calls.lock() {
            if target.is_empty() {
                calls.push(operation.to_owned());
            } else {
                calls.push(format!("{operation}:{target}"));
            }
        }
        if self.fail_on.contains(operation) {
            return Err(EngineError::Api(format!("mock failure in {operation}")));
        }
        Ok(())
    }

    fn output_stream(&self) -> OutputStream {
        let chunks: Vec<Result<Bytes, EngineError>> =
            self.output.iter().cloned().map(Ok).collect();
        futures_util::stream::iter(chunks).boxed()
    }
}

#[cfg(test)]
impl ContainerEngine for MockEngine {
    async fn ping(&self) -> Result<(), EngineError> {
        self.record("ping", "")
    }

    async fn pull_image(
        &self,
        name: &str,
        tag: &str,
        _auth: Option<&RegistryAuth>,
    ) -> Result<(), EngineError> {
        self.record("pull_image", &format!("{name}@{tag}"))
    }

    async fn inspect_image(&self, reference: &str) -> Result<ImageDetails, EngineError> {
        self.record("inspect_image", reference)?;
        self.images
            .iter()
            .find(|i| {
                i.id == reference
                    || i.repo_tags.iter().any(|t| t == reference)
                    || i.repo_digests.iter().any(|d| d == reference)
            })
            .cloned()
            .ok_or_else(|| EngineError::NotFound(reference.to_owned()))
    }

    async fn list_containers(&self, _all: bool) -> Result<Vec<ContainerSummary>, EngineError> {
        self.record("list_containers", "")?;
        Ok(self.containers.iter().map(|(s, _)| s.clone()).collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerDetails, EngineError> {
        self.record("inspect_container", id)?;
        self.containers
            .iter()
            .find(|(s, d)| s.id == id || d.name == id)
            .map(|(_, d)| d.clone())
            .ok_or_else(|| EngineError::NotFound(id.to_owned()))
    }

    async fn create_container(
        &self,
        params: &ContainerParams,
    ) -> Result<CreatedContainer, EngineError> {
        self.record("create_container", &params.image)?;
        let id = if let Ok(mut created) = self.created.lock() {
            created.push(params.clone());
            format!("mock{}", created.len())
        } else {
            "mock0".to_owned()
        };
        Ok(CreatedContainer {
            id,
            warnings: Vec::new(),
        })
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        self.record("start_container", id)
    }

    async fn wait_container(&self, id: &str) -> Result<i64, EngineError> {
        self.record("wait_container", id)?;
        Ok(self.exit_code)
    }

    async fn remove_container(&self, id: &str) -> Result<(), EngineError> {
        let result = self.record("remove_container", id);
        self.removal_attempted.notify_one();
        result
    }

    async fn container_logs(&self, id: &str) -> Result<OutputStream, EngineError> {
        self.record("container_logs", id)?;
        Ok(self.output_stream())
    }

    async fn create_exec(
        &self,
        container_id: &str,
        params: &ExecParams,
    ) -> Result<String, EngineError> {
        self.record("create_exec", container_id)?;
        if let Ok(mut execs) = self.execs.lock() {
            execs.push(params.clone());
        }
        Ok(format!("exec-{container_id}"))
    }

    async fn start_exec(&self, exec_id: &str) -> Result<OutputStream, EngineError> {
        self.record("start_exec", exec_id)?;
        Ok(self.output_stream())
    }

    async fn list_networks(&self) -> Result<Vec<NetworkSummary>, EngineError> {
        self.record("list_networks", "")?;
        Ok(self.networks.clone())
    }

    async fn inspect_network(&self, name_or_id: &str) -> Result<NetworkSummary, EngineError> {
        self.record("inspect_network", name_or_id)?;
        self.networks
            .iter()
            .find(|n| n.id == name_or_id || n.name == name_or_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(name_or_id.to_owned()))
    }

    async fn create_network(&self, params: &NetworkParams) -> Result<NetworkSummary, EngineError> {
        self.record("create_network", &params.name)?;
        Ok(NetworkSummary {
            id: format!("net-{}", params.name),
            name: params.name.clone(),
            driver: params.driver.clone().unwrap_or_else(|| "bridge".to_owned()),
            labels: params.labels.clone(),
        })
    }

    async fn list_volumes(&self) -> Result<Vec<VolumeSummary>, EngineError> {
        self.record("list_volumes", "")?;
        Ok(self.volumes.clone())
    }

    async fn create_volume(&self, params: &VolumeParams) -> Result<VolumeSummary, EngineError> {
        let name = params.name.clone().unwrap_or_else(|| "generated".to_owned());
        self.record("create_volume", &name)?;
        Ok(VolumeSummary {
            mountpoint: format!("/var/lib/docker/volumes/{name}/_data"),
            name,
            driver: params.driver.clone().unwrap_or_else(|| "local".to_owned()),
            labels: params.labels.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, name: &str) -> ContainerSummary {
        ContainerSummary {
            id: id.to_owned(),
            names: vec![format!("/{name}")],
            image: "nginx:latest".to_owned(),
            state: "running".to_owned(),
            labels: Default::default(),
        }
    }

    fn details(id: &str, name: &str) -> ContainerDetails {
        ContainerDetails {
            id: id.to_owned(),
            name: name.to_owned(),
            image: "nginx:latest".to_owned(),
            running: true,
            ..Default::default()
        }
    }

    #[test]
    fn validate_identifier_accepts_ids_and_names() {
        assert!(validate_identifier("t", "abc123def456").is_ok());
        assert!(validate_identifier("t", "web-server_1.blue").is_ok());
        assert!(validate_identifier("t", &"a".repeat(MAX_IDENTIFIER_LEN)).is_ok());
    }

    #[test]
    fn validate_identifier_rejects_empty() {
        let err = validate_identifier("inspect_container", "").unwrap_err();
        assert!(err.to_string().contains("inspect_container"));
    }

    #[test]
    fn validate_identifier_rejects_too_long() {
        assert!(validate_identifier("t", &"a".repeat(MAX_IDENTIFIER_LEN + 1)).is_err());
    }

    #[test]
    fn validate_identifier_rejects_path_and_query_characters() {
        for id in ["../etc", "abc?all=1", "a b", "abc/def", "id;rm"] {
            assert!(validate_identifier("t", id).is_err(), "accepted {id}");
        }
    }

    #[test]
    fn log_output_maps_to_wire_frames() {
        use bollard::container::LogOutput;

        let frame = log_output_to_frame(LogOutput::StdErr {
            message: Bytes::from_static(b"oops"),
        });
        assert_eq!(frame[0], 2);
        assert_eq!(&frame[4..8], &4u32.to_be_bytes());
        assert_eq!(&frame[8..], b"oops");

        let console = log_output_to_frame(LogOutput::Console {
            message: Bytes::from_static(b"tty"),
        });
        assert_eq!(console[0], 1);
    }

    #[tokio::test]
    async fn mock_lists_and_inspects_containers() {
        let engine = MockEngine::new().with_container(summary("abc", "web"), details("abc", "web"));
        let containers = engine.list_containers(true).await.unwrap();
        assert_eq!(containers.len(), 1);

        let by_name = engine.inspect_container("web").await.unwrap();
        assert_eq!(by_name.id, "abc");
        assert_eq!(engine.count_calls("inspect_container"), 1);
    }

    #[tokio::test]
    async fn mock_inspect_unknown_is_not_found() {
        let engine = MockEngine::new();
        let err = engine.inspect_container("nope").await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn mock_failure_is_recorded_and_returned() {
        let engine = MockEngine::new().failing_on("start_container");
        assert!(engine.start_container("abc").await.is_err());
        assert_eq!(engine.calls(), vec!["start_container:abc".to_owned()]);
    }

    #[tokio::test]
    async fn mock_output_stream_yields_chunks() {
        let chunk = encode_frame(StreamKind::Stdout, b"hello");
        let engine = MockEngine::new().with_output(vec![chunk.clone()]);
        let items: Vec<_> = engine.container_logs("abc").await.unwrap().collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), &chunk);
    }

    #[tokio::test]
    async fn mock_create_assigns_sequential_ids() {
        let engine = MockEngine::new();
        let a = engine
            .create_container(&ContainerParams::new("busybox"))
            .await
            .unwrap();
        let b = engine
            .create_container(&ContainerParams::new("alpine"))
            .await
            .unwrap();
        assert_eq!(a.id, "mock1");
        assert_eq!(b.id, "mock2");
        assert_eq!(engine.created_params()[1].image, "alpine");
    }
}
