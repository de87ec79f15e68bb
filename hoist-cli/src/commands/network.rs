//! `hoist network` command handler

use std::io::Write;

use serde::Serialize;

use hoist_core::config::HoistConfig;
use hoist_docker::{NetworkParams, NetworkSummary};

use crate::cli::{NetworkAction, NetworkArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, format_labels, short_id};

/// Execute the `network` command.
pub async fn execute(
    args: NetworkArgs,
    config: &HoistConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        NetworkAction::Ls { label } => {
            let manager = super::connect(config).await?;
            let networks = match label {
                Some((key, value)) => manager.get_networks_for_label(&key, &value).await?,
                None => manager.list_networks().await?,
            };
            writer.render(&NetworkList { networks })
        }
        NetworkAction::Find { key } => {
            let manager = super::connect(config).await?;
            let network = manager
                .get_network_for_name_or_id(&key)
                .await?
                .ok_or_else(|| CliError::Command(format!("no network matches '{key}'")))?;
            writer.render(&NetworkList {
                networks: vec![network],
            })
        }
        NetworkAction::Create {
            name,
            driver,
            labels,
            params,
        } => {
            let mut params = match params {
                Some(path) => {
                    let mut value = super::read_params(&path).await?;
                    // the file may omit Name; fill it from the argument
                    if let Some(body) = value.as_object_mut() {
                        body.insert("Name".to_owned(), serde_json::Value::from(name.as_str()));
                    }
                    NetworkParams::from_json(value)?
                }
                None => NetworkParams::default(),
            };
            params.name = name;
            if driver.is_some() {
                params.driver = driver;
            }
            params.labels.extend(labels);

            let manager = super::connect(config).await?;
            let network = manager.create_network(&params).await?;
            writer.render(&NetworkList {
                networks: vec![network],
            })
        }
    }
}

#[derive(Serialize)]
pub struct NetworkList {
    pub networks: Vec<NetworkSummary>,
}

impl Render for NetworkList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.networks.is_empty() {
            writeln!(w, "No networks found.")?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<14} {:<24} {:<10} {}",
            "ID".bold(),
            "NAME".bold(),
            "DRIVER".bold(),
            "LABELS".bold()
        )?;
        for n in &self.networks {
            writeln!(
                w,
                "{:<14} {:<24} {:<10} {}",
                short_id(&n.id),
                n.name,
                n.driver,
                format_labels(&n.labels)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_list_render() {
        let list = NetworkList {
            networks: vec![NetworkSummary {
                id: "f00dfeedbeef00112233".to_owned(),
                name: "backend".to_owned(),
                driver: "bridge".to_owned(),
                labels: [("env".to_owned(), "prod".to_owned())].into_iter().collect(),
            }],
        };
        let mut buffer = Vec::new();
        list.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");

        assert!(output.contains("f00dfeedbeef"));
        assert!(output.contains("backend"));
        assert!(output.contains("bridge"));
        assert!(output.contains("env=prod"));
    }

    #[test]
    fn test_network_list_render_empty() {
        let mut buffer = Vec::new();
        NetworkList {
            networks: Vec::new(),
        }
        .render_text(&mut buffer)
        .expect("render");
        assert!(String::from_utf8_lossy(&buffer).contains("No networks found"));
    }

    #[test]
    fn test_network_list_json() {
        let list = NetworkList {
            networks: vec![NetworkSummary {
                id: "n1".to_owned(),
                name: "front".to_owned(),
                ..NetworkSummary::default()
            }],
        };
        let json = serde_json::to_value(&list).expect("serialize");
        assert_eq!(json["networks"][0]["name"], "front");
    }
}
