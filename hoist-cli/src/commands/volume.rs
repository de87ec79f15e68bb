//! `hoist volume` command handler

use std::io::Write;

use serde::Serialize;

use hoist_core::config::HoistConfig;
use hoist_docker::{VolumeParams, VolumeSummary};

use crate::cli::{VolumeAction, VolumeArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, format_labels};

/// Execute the `volume` command.
pub async fn execute(
    args: VolumeArgs,
    config: &HoistConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let manager = super::connect(config).await?;

    let volumes = match args.action {
        VolumeAction::Ls { label } => match label {
            Some((key, value)) => manager.get_volumes_for_label(&key, &value).await?,
            None => manager.list_volumes().await?,
        },
        VolumeAction::Find { name } => {
            let volume = manager
                .get_volume_for_name(&name)
                .await?
                .ok_or_else(|| CliError::Command(format!("no volume named '{name}'")))?;
            vec![volume]
        }
        VolumeAction::Create {
            name,
            driver,
            labels,
        } => {
            let params = VolumeParams {
                name,
                driver,
                labels: labels.into_iter().collect(),
                ..VolumeParams::default()
            };
            vec![manager.create_volume(&params).await?]
        }
    };

    writer.render(&VolumeList { volumes })
}

#[derive(Serialize)]
pub struct VolumeList {
    pub volumes: Vec<VolumeSummary>,
}

impl Render for VolumeList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.volumes.is_empty() {
            writeln!(w, "No volumes found.")?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<32} {:<8} {:<48} {}",
            "NAME".bold(),
            "DRIVER".bold(),
            "MOUNTPOINT".bold(),
            "LABELS".bold()
        )?;
        for v in &self.volumes {
            writeln!(
                w,
                "{:<32} {:<8} {:<48} {}",
                v.name,
                v.driver,
                v.mountpoint,
                format_labels(&v.labels)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_list_render() {
        let list = VolumeList {
            volumes: vec![VolumeSummary {
                name: "pgdata".to_owned(),
                driver: "local".to_owned(),
                mountpoint: "/var/lib/docker/volumes/pgdata/_data".to_owned(),
                labels: Default::default(),
            }],
        };
        let mut buffer = Vec::new();
        list.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");

        assert!(output.contains("pgdata"));
        assert!(output.contains("local"));
        assert!(output.contains("/var/lib/docker/volumes/pgdata/_data"));
    }

    #[test]
    fn test_volume_list_render_empty() {
        let mut buffer = Vec::new();
        VolumeList {
            volumes: Vec::new(),
        }
        .render_text(&mut buffer)
        .expect("render");
        assert!(String::from_utf8_lossy(&buffer).contains("No volumes found"));
    }
}
