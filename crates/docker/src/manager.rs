//! Query façade over a [`ContainerEngine`].
//!
//! [`DockerManager`] composes engine calls with the pure matchers in
//! [`crate::resolve`] and the temporary-run orchestration in
//! [`crate::lifecycle`]. Every search lists the full collection (stopped
//! containers included) and filters locally, so results keep the engine's
//! list order.
//!
//! The engine handle can be swapped at runtime with
//! [`DockerManager::set_engine`]. Each operation takes one snapshot of the
//! handle when it starts; a swap only affects operations started afterwards.

use std::sync::{Arc, RwLock};

use futures_util::{StreamExt, TryStreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ManagerConfig;
use crate::engine::{BollardEngine, ContainerEngine};
use crate::entity::{
    ContainerDetails, ContainerSummary, CreatedContainer, ImageDetails, NetworkSummary,
    VolumeSummary,
};
use crate::error::EngineError;
use crate::frame::{DecodedOutput, collect_output};
use crate::image::ImageRef;
use crate::lifecycle;
use crate::params::{ContainerParams, ExecParams, NetworkParams, RegistryAuth, VolumeParams};
use crate::resolve::{self, NetworkSet};

/// Convenience layer over a container engine.
pub struct DockerManager<E: ContainerEngine> {
    engine: RwLock<Arc<E>>,
    config: ManagerConfig,
}

impl DockerManager<BollardEngine> {
    /// Connects to the engine socket named in `config`.
    pub fn connect(config: ManagerConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let engine =
            BollardEngine::connect_with_socket(&config.socket, config.connect_timeout_secs)?;
        Self::new(engine, config)
    }
}

impl<E: ContainerEngine> DockerManager<E> {
    pub fn new(engine: E, config: ManagerConfig) -> Result<Self, EngineError> {
        Self::with_shared_engine(Arc::new(engine), config)
    }

    pub fn with_shared_engine(engine: Arc<E>, config: ManagerConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            engine: RwLock::new(engine),
            config,
        })
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Current engine handle.
    pub fn engine(&self) -> Arc<E> {
        match self.engine.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the engine used by operations started after this call.
    pub fn set_engine(&self, engine: Arc<E>) {
        match self.engine.write() {
            Ok(mut guard) => *guard = engine,
            Err(poisoned) => *poisoned.into_inner() = engine,
        }
        debug!("engine handle replaced");
    }

    pub async fn ping(&self) -> Result<(), EngineError> {
        self.engine().ping().await
    }

    /// Pulls `name[:tag][@digest]` to completion and returns the pulled image.
    pub async fn pull_image(
        &self,
        auth: Option<&RegistryAuth>,
        name: &str,
        tag: Option<&str>,
    ) -> Result<ImageDetails, EngineError> {
        let engine = self.engine();
        let image = ImageRef::parse(name, tag);
        info!(image = %image, "pulling image");
        engine.pull_image(&image.name, image.pull_tag(), auth).await?;
        engine.inspect_image(&image.to_string()).await
    }

    /// Inspects a local image by `name[:tag][@digest]`.
    pub async fn get_image(&self, name: &str, tag: Option<&str>) -> Result<ImageDetails, EngineError> {
        let image = ImageRef::parse(name, tag);
        self.engine().inspect_image(&image.to_string()).await
    }

    /// Finds the container this process runs in.
    ///
    /// Containers are inspected one at a time in list order and the scan stops
    /// at the first whose hostname equals ours. Returns `None` when no
    /// container matches, which is the normal result outside a container.
    pub async fn get_own_container(&self) -> Result<Option<ContainerDetails>, EngineError> {
        let engine = self.engine();
        let hostname = self.own_hostname()?;
        let containers = engine.list_containers(true).await?;

        for container in &containers {
            let details = engine.inspect_container(&container.id).await?;
            if details.hostname.as_deref() == Some(hostname.as_str()) {
                debug!(container_id = %details.id, hostname = %hostname, "own container found");
                return Ok(Some(details));
            }
        }
        debug!(hostname = %hostname, scanned = containers.len(), "no container matches own hostname");
        Ok(None)
    }

    fn own_hostname(&self) -> Result<String, EngineError> {
        if let Some(hostname) = &self.config.hostname {
            return Ok(hostname.clone());
        }
        hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .map_err(|e| EngineError::Config {
                field: "hostname".to_owned(),
                reason: format!("failed to read system hostname: {e}"),
            })
    }

    /// Returns containers attached to at least one network in `networks`.
    ///
    /// Every container is inspected, up to `max_concurrent_inspections` at a
    /// time; the first inspect error aborts the search.
    pub async fn get_containers_in_networks(
        &self,
        networks: &NetworkSet,
    ) -> Result<Vec<ContainerDetails>, EngineError> {
        if networks.is_empty() {
            return Ok(Vec::new());
        }

        let engine = self.engine();
        let containers = engine.list_containers(true).await?;
        let details: Vec<ContainerDetails> = futures_util::stream::iter(containers)
            .map(|container| {
                let engine = Arc::clone(&engine);
                async move { engine.inspect_container(&container.id).await }
            })
            .buffered(self.config.max_concurrent_inspections)
            .try_collect()
            .await?;

        Ok(details
            .into_iter()
            .filter(|d| resolve::in_networks(d.networks.keys().map(String::as_str), networks))
            .collect())
    }

    pub async fn create_container(
        &self,
        params: &ContainerParams,
    ) -> Result<CreatedContainer, EngineError> {
        let created = self.engine().create_container(params).await?;
        info!(container_id = %created.id, image = %params.image, "container created");
        Ok(created)
    }

    pub async fn create_network(&self, params: &NetworkParams) -> Result<NetworkSummary, EngineError> {
        let network = self.engine().create_network(params).await?;
        info!(network_id = %network.id, name = %network.name, "network created");
        Ok(network)
    }

    pub async fn create_volume(&self, params: &VolumeParams) -> Result<VolumeSummary, EngineError> {
        let volume = self.engine().create_volume(params).await?;
        info!(name = %volume.name, "volume created");
        Ok(volume)
    }

    /// All containers, running or not.
    pub async fn list_containers(&self) -> Result<Vec<ContainerSummary>, EngineError> {
        self.engine().list_containers(true).await
    }

    pub async fn list_networks(&self) -> Result<Vec<NetworkSummary>, EngineError> {
        self.engine().list_networks().await
    }

    pub async fn list_volumes(&self) -> Result<Vec<VolumeSummary>, EngineError> {
        self.engine().list_volumes().await
    }

    pub async fn get_containers_for_label(
        &self,
        name: &str,
        value: &str,
    ) -> Result<Vec<ContainerSummary>, EngineError> {
        let containers = self.list_containers().await?;
        Ok(resolve::filter_by_label(&containers, name, value)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn get_networks_for_label(
        &self,
        name: &str,
        value: &str,
    ) -> Result<Vec<NetworkSummary>, EngineError> {
        let networks = self.list_networks().await?;
        Ok(resolve::filter_by_label(&networks, name, value)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn get_volumes_for_label(
        &self,
        name: &str,
        value: &str,
    ) -> Result<Vec<VolumeSummary>, EngineError> {
        let volumes = self.list_volumes().await?;
        Ok(resolve::filter_by_label(&volumes, name, value)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Containers created from exactly `image`.
    pub async fn get_containers_for_image(
        &self,
        image: &str,
    ) -> Result<Vec<ContainerSummary>, EngineError> {
        let containers = self.list_containers().await?;
        Ok(resolve::filter_containers_by_image(&containers, image)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn get_container_for_name_or_id(
        &self,
        key: &str,
    ) -> Result<Option<ContainerSummary>, EngineError> {
        let containers = self.list_containers().await?;
        Ok(resolve::find_container_by_name_or_id(&containers, key).cloned())
    }

    pub async fn get_network_for_name_or_id(
        &self,
        key: &str,
    ) -> Result<Option<NetworkSummary>, EngineError> {
        let networks = self.list_networks().await?;
        Ok(resolve::find_by_name_or_id(&networks, key).cloned())
    }

    pub async fn get_volume_for_name(&self, name: &str) -> Result<Option<VolumeSummary>, EngineError> {
        let volumes = self.list_volumes().await?;
        Ok(resolve::find_by_name_or_id(&volumes, name).cloned())
    }

    /// Creates and starts a container, returning its ID.
    pub async fn run_container(&self, params: &ContainerParams) -> Result<String, EngineError> {
        let engine = self.engine();
        lifecycle::run_container(engine.as_ref(), params).await
    }

    /// Runs a disposable container to completion and returns its output.
    ///
    /// The container is removed in the background after the result is returned.
    pub async fn run_temporary_container(
        &self,
        params: &ContainerParams,
    ) -> Result<DecodedOutput, EngineError> {
        lifecycle::run_temporary(self.engine(), params).await
    }

    /// Like [`run_temporary_container`](Self::run_temporary_container), also
    /// returning the background cleanup task so the caller can await it.
    pub async fn run_temporary_container_tracked(
        &self,
        params: &ContainerParams,
    ) -> (Result<DecodedOutput, EngineError>, JoinHandle<()>) {
        lifecycle::run_and_schedule_cleanup(self.engine(), params).await
    }

    /// Runs a command in a running container and returns its decoded output.
    ///
    /// stdout and stderr are always attached, whatever `params` says.
    pub async fn exec_in_container(
        &self,
        container_id: &str,
        params: &ExecParams,
    ) -> Result<DecodedOutput, EngineError> {
        let engine = self.engine();
        let params = ExecParams {
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..params.clone()
        };

        let exec_id = engine.create_exec(container_id, &params).await?;
        debug!(container_id = %container_id, exec_id = %exec_id, cmd = ?params.cmd, "exec created");
        let stream = engine.start_exec(&exec_id).await?;
        collect_output(stream).await
    }
}
