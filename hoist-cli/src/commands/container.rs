//! Container command handlers: `ps`, `find`, `run`, `run-temp`, `exec`, `whoami`

use std::io::Write;

use serde::Serialize;
use tracing::{info, warn};

use hoist_core::config::HoistConfig;
use hoist_docker::{
    ContainerDetails, ContainerParams, ContainerSummary, DecodedOutput, ExecParams, Labels,
    NetworkSet,
};

use crate::cli::{ExecArgs, FindArgs, PsArgs, RunArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, format_labels, short_id};

/// Execute the `ps` command.
///
/// At most one filter applies: label, image, or network membership.
pub async fn execute_ps(
    args: PsArgs,
    config: &HoistConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let manager = super::connect(config).await?;

    let rows: Vec<ContainerRow> = if let Some((key, value)) = &args.label {
        manager
            .get_containers_for_label(key, value)
            .await?
            .iter()
            .map(ContainerRow::from)
            .collect()
    } else if let Some(image) = &args.image {
        manager
            .get_containers_for_image(image)
            .await?
            .iter()
            .map(ContainerRow::from)
            .collect()
    } else if !args.network.is_empty() {
        let networks = NetworkSet::new(&args.network);
        manager
            .get_containers_in_networks(&networks)
            .await?
            .iter()
            .map(ContainerRow::from)
            .collect()
    } else {
        manager
            .list_containers()
            .await?
            .iter()
            .map(ContainerRow::from)
            .collect()
    };

    writer.render(&ContainerList { containers: rows })
}

/// Execute the `find` command.
pub async fn execute_find(
    args: FindArgs,
    config: &HoistConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let manager = super::connect(config).await?;
    let container = manager
        .get_container_for_name_or_id(&args.key)
        .await?
        .ok_or_else(|| CliError::Command(format!("no container matches '{}'", args.key)))?;

    writer.render(&ContainerList {
        containers: vec![ContainerRow::from(&container)],
    })
}

/// Execute the `run` command: create and start, then print the ID.
pub async fn execute_run(
    args: RunArgs,
    config: &HoistConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let params = build_params(args).await?;
    let manager = super::connect(config).await?;
    let id = manager.run_container(&params).await?;
    info!(container_id = %id, image = %params.image, "container started");

    writer.render(&StartedReport {
        id,
        image: params.image,
    })
}

/// Execute the `run-temp` command: run to completion and print the output.
pub async fn execute_run_temp(
    args: RunArgs,
    config: &HoistConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let params = build_params(args).await?;
    let manager = super::connect(config).await?;
    let (result, cleanup) = manager.run_temporary_container_tracked(&params).await;
    let rendered = result.map_err(CliError::from).and_then(|output| {
        writer.render(&OutputReport {
            container: None,
            output,
        })
    });

    // finish removing the container before the process exits
    if let Err(e) = cleanup.await {
        warn!(error = %e, "cleanup task did not complete");
    }
    rendered
}

/// Execute the `exec` command.
pub async fn execute_exec(
    args: ExecArgs,
    config: &HoistConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let manager = super::connect(config).await?;
    let container = manager
        .get_container_for_name_or_id(&args.container)
        .await?
        .ok_or_else(|| CliError::Command(format!("no container matches '{}'", args.container)))?;

    let params = ExecParams {
        user: args.user,
        working_dir: args.workdir,
        ..ExecParams::new(args.cmd)
    };
    let output = manager.exec_in_container(&container.id, &params).await?;

    writer.render(&OutputReport {
        container: Some(container.id),
        output,
    })
}

/// Execute the `whoami` command.
pub async fn execute_whoami(config: &HoistConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let manager = super::connect(config).await?;
    let container = manager.get_own_container().await?;

    writer.render(&WhoamiReport { container })
}

/// Merges the parameter file (if any) with command-line values.
///
/// Command-line values win over the file; labels from both are kept.
async fn build_params(args: RunArgs) -> Result<ContainerParams, CliError> {
    let mut params = match &args.params {
        Some(path) => ContainerParams::from_json(super::read_params(path).await?)?,
        None => ContainerParams::default(),
    };

    params.image = args.image;
    if let Some(name) = args.name {
        params.name = Some(name);
    }
    if !args.cmd.is_empty() {
        params.cmd = Some(args.cmd);
    }
    for (key, value) in args.labels {
        params = params.with_label(key, value);
    }
    Ok(params)
}

// ---- reports ----

/// One line of container listing.
#[derive(Debug, Serialize)]
pub struct ContainerRow {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: String,
    pub labels: Labels,
}

impl From<&ContainerSummary> for ContainerRow {
    fn from(c: &ContainerSummary) -> Self {
        Self {
            id: c.id.clone(),
            name: c.primary_name().to_owned(),
            image: c.image.clone(),
            state: c.state.clone(),
            labels: c.labels.clone(),
        }
    }
}

impl From<&ContainerDetails> for ContainerRow {
    fn from(c: &ContainerDetails) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            image: c.image.clone(),
            state: if c.running { "running" } else { "exited" }.to_owned(),
            labels: Labels::new(),
        }
    }
}

#[derive(Serialize)]
pub struct ContainerList {
    pub containers: Vec<ContainerRow>,
}

impl Render for ContainerList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.containers.is_empty() {
            writeln!(w, "No containers found.")?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<14} {:<24} {:<28} {:<10} {}",
            "ID".bold(),
            "NAME".bold(),
            "IMAGE".bold(),
            "STATE".bold(),
            "LABELS".bold()
        )?;
        for c in &self.containers {
            let state = if c.state == "running" {
                c.state.green()
            } else {
                c.state.normal()
            };
            writeln!(
                w,
                "{:<14} {:<24} {:<28} {:<10} {}",
                short_id(&c.id),
                c.name,
                c.image,
                state,
                format_labels(&c.labels)
            )?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct StartedReport {
    pub id: String,
    pub image: String,
}

impl Render for StartedReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", self.id)
    }
}

/// Decoded output of a temporary run or an exec.
#[derive(Serialize)]
pub struct OutputReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    pub output: DecodedOutput,
}

impl Render for OutputReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write!(w, "{}", self.output.to_text())
    }
}

#[derive(Serialize)]
pub struct WhoamiReport {
    pub container: Option<ContainerDetails>,
}

impl Render for WhoamiReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let Some(c) = &self.container else {
            writeln!(w, "Not running inside a known container.")?;
            return Ok(());
        };

        writeln!(w, "Container: {}", c.name.bold())?;
        writeln!(w, "  ID:    {}", c.id)?;
        writeln!(w, "  Image: {}", c.image)?;
        let mut networks: Vec<&String> = c.networks.keys().collect();
        networks.sort();
        for name in networks {
            let ip = c.networks[name].ip_address.as_deref().unwrap_or("-");
            writeln!(w, "  Network: {} ({})", name, ip)?;
        }
        Ok(())
    }
}
