//! Convenience layer over the Docker engine API.
//!
//! Pull images, run disposable containers, exec into running ones and find
//! containers, networks and volumes by ID, name, label, image or network
//! membership.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error type (`EngineError`)
//! - [`config`]: Manager configuration (`ManagerConfig`, builder)
//! - [`engine`]: Engine API abstraction (`ContainerEngine` trait, `BollardEngine`)
//! - [`entity`]: Engine-independent snapshots of containers, networks, volumes, images
//! - [`params`]: Creation parameters in the engine's JSON shape
//! - [`frame`]: Multiplexed output stream decoding (`decode_chunks`, `FrameCodec`)
//! - [`image`]: `name[:tag][@digest]` normalisation (`ImageRef`)
//! - [`resolve`]: Matching entities by identity, label, image or network
//! - [`lifecycle`]: Temporary container runs with exactly-once cleanup
//! - [`manager`]: Query façade (`DockerManager`)
//!
//! # Architecture
//!
//! ```text
//! DockerManager ──list/inspect──> ContainerEngine ──> Docker daemon
//!      │                               │
//!      │ resolve::*                    │ OutputStream (wire frames)
//!      │                               ▼
//!      └── lifecycle::run_temporary ─> frame::collect_output ─> DecodedOutput
//!                │
//!                └─ tokio::spawn(cleanup: wait -> remove)
//! ```

pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod frame;
pub mod image;
pub mod lifecycle;
pub mod manager;
pub mod params;
pub mod resolve;

// --- Public API Re-exports ---

// Façade
pub use manager::DockerManager;

// Configuration
pub use config::{ManagerConfig, ManagerConfigBuilder};

// Error
pub use error::EngineError;

// Engine API
pub use engine::{BollardEngine, ContainerEngine, OutputStream};

// Entities and parameters
pub use entity::{
    ContainerDetails, ContainerSummary, CreatedContainer, EndpointInfo, ImageDetails, Labels,
    NetworkSummary, VolumeSummary,
};
pub use params::{ContainerParams, ExecParams, NetworkParams, RegistryAuth, VolumeParams};

// Frame decoding
pub use frame::{
    DecodedOutput, Frame, FrameCodec, StreamKind, chunks_to_text, collect_output, decode_chunk,
    decode_chunks, encode_frame, frames_to_text,
};

// Image references
pub use image::{DEFAULT_TAG, ImageRef};

// Resolution
pub use resolve::{Labeled, NamedEntity, NetworkSet};

// Lifecycle
pub use lifecycle::{RunPhase, TemporaryContainerRun};
