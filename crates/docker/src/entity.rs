//! Engine entity snapshots
//!
//! Container, network, volume and image data returned by the engine client,
//! in a form independent of the engine library.
//! Every type is a snapshot taken at query time and is never kept in sync afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Label map
pub type Labels = HashMap<String, String>;

/// One entry of a container listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    /// Full container ID
    pub id: String,
    /// Names as reported by the engine, with a leading `/`
    pub names: Vec<String>,
    /// Image reference the container was created from
    pub image: String,
    /// State string such as `running` or `exited`
    pub state: String,
    pub labels: Labels,
}

impl ContainerSummary {
    /// First name with the leading `/` removed
    pub fn primary_name(&self) -> &str {
        self.names
            .first()
            .map(|n| n.trim_start_matches('/'))
            .unwrap_or_default()
    }
}

/// Network endpoint of a container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub network_id: Option<String>,
    pub ip_address: Option<String>,
}

/// Container details from inspect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDetails {
    pub id: String,
    /// Name with the leading `/` removed
    pub name: String,
    pub image: String,
    /// Hostname from the container config
    pub hostname: Option<String>,
    pub running: bool,
    pub exit_code: Option<i64>,
    /// Attached network name -> endpoint
    pub networks: HashMap<String, EndpointInfo>,
}

/// Network summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub id: String,
    pub name: String,
    pub driver: String,
    pub labels: Labels,
}

/// Volume summary
///
/// Volumes have no separate ID; the name is the identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSummary {
    pub name: String,
    pub driver: String,
    pub mountpoint: String,
    pub labels: Labels,
}

/// Image details from inspect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetails {
    pub id: String,
    pub repo_tags: Vec<String>,
    /// `name@digest` references the image is known by
    #[serde(default)]
    pub repo_digests: Vec<String>,
    pub size: Option<i64>,
}

/// Result of container creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedContainer {
    pub id: String,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_name_strips_slash() {
        let c = ContainerSummary {
            id: "abc".to_owned(),
            names: vec!["/web".to_owned(), "/alias".to_owned()],
            ..Default::default()
        };
        assert_eq!(c.primary_name(), "web");
    }

    #[test]
    fn primary_name_empty_when_unnamed() {
        assert_eq!(ContainerSummary::default().primary_name(), "");
    }

    #[test]
    fn details_serialize_networks_as_map() {
        let mut details = ContainerDetails {
            id: "abc".to_owned(),
            name: "web".to_owned(),
            ..Default::default()
        };
        details
            .networks
            .insert("frontend".to_owned(), EndpointInfo::default());
        let json = serde_json::to_value(&details).unwrap();
        assert!(json["networks"]["frontend"].is_object());
    }
}
