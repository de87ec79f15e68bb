//! `hoist pull` and `hoist image` command handlers

use std::io::Write;

use serde::Serialize;
use tracing::info;

use hoist_core::config::HoistConfig;
use hoist_docker::{ImageDetails, ImageRef, RegistryAuth};

use crate::cli::{ImageArgs, PullArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, short_id};

/// Execute the `pull` command.
pub async fn execute_pull(
    args: PullArgs,
    config: &HoistConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let manager = super::connect(config).await?;
    let auth = registry_auth(&args);
    let reference = ImageRef::parse(&args.name, args.tag.as_deref());

    info!(image = %reference, authenticated = auth.is_some(), "pulling image");
    let details = manager
        .pull_image(auth.as_ref(), &args.name, args.tag.as_deref())
        .await?;

    writer.render(&ImageReport::new(reference, details, true))
}

/// Execute the `image` command.
pub async fn execute_image(
    args: ImageArgs,
    config: &HoistConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let manager = super::connect(config).await?;
    let reference = ImageRef::parse(&args.name, args.tag.as_deref());
    let details = manager.get_image(&args.name, args.tag.as_deref()).await?;

    writer.render(&ImageReport::new(reference, details, false))
}

/// Credentials are only sent when at least one flag was given.
fn registry_auth(args: &PullArgs) -> Option<RegistryAuth> {
    if args.username.is_none() && args.password.is_none() && args.server.is_none() {
        return None;
    }
    Some(RegistryAuth {
        username: args.username.clone(),
        password: args.password.clone(),
        serveraddress: args.server.clone(),
        identitytoken: None,
    })
}

/// Image lookup or pull result.
#[derive(Serialize)]
pub struct ImageReport {
    pub reference: String,
    pub pulled: bool,
    pub image: ImageDetails,
}

impl ImageReport {
    fn new(reference: ImageRef, image: ImageDetails, pulled: bool) -> Self {
        Self {
            reference: reference.to_string(),
            pulled,
            image,
        }
    }
}

impl Render for ImageReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let status = if self.pulled { "Pulled" } else { "Image" };
        writeln!(w, "{}: {}", status, self.reference.bold())?;
        writeln!(w, "  ID:   {}", short_id(&self.image.id))?;
        if !self.image.repo_tags.is_empty() {
            writeln!(w, "  Tags: {}", self.image.repo_tags.join(", "))?;
        }
        if let Some(size) = self.image.size {
            writeln!(w, "  Size: {} bytes", size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pull_args(username: Option<&str>, server: Option<&str>) -> PullArgs {
        PullArgs {
            name: "alpine".to_owned(),
            tag: None,
            username: username.map(str::to_owned),
            password: None,
            server: server.map(str::to_owned),
        }
    }

    fn report(pulled: bool) -> ImageReport {
        ImageReport::new(
            ImageRef::parse("alpine", None),
            ImageDetails {
                id: "sha256:aabbccddeeff00112233".to_owned(),
                repo_tags: vec!["alpine:latest".to_owned()],
                repo_digests: vec!["alpine@sha256:77726ef6".to_owned()],
                size: Some(7_800_000),
            },
            pulled,
        )
    }

    #[test]
    fn test_registry_auth_absent_without_flags() {
        assert!(registry_auth(&pull_args(None, None)).is_none());
    }

    #[test]
    fn test_registry_auth_from_flags() {
        let auth = registry_auth(&pull_args(Some("bob"), Some("registry.local"))).expect("auth");
        assert_eq!(auth.username.as_deref(), Some("bob"));
        assert_eq!(auth.serveraddress.as_deref(), Some("registry.local"));
        assert!(auth.password.is_none());
    }

    #[test]
    fn test_image_report_render_text() {
        let mut buffer = Vec::new();
        report(true).render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");

        assert!(output.contains("Pulled"));
        assert!(output.contains("alpine:latest"));
        assert!(output.contains("aabbccddeeff"));
        assert!(!output.contains("sha256:"), "ID should be shortened");
        assert!(output.contains("7800000 bytes"));
    }

    #[test]
    fn test_image_report_json() {
        let json = serde_json::to_value(report(false)).expect("serialize");
        assert_eq!(json["reference"], "alpine:latest");
        assert_eq!(json["pulled"], false);
        assert_eq!(json["image"]["repo_tags"][0], "alpine:latest");
    }
}
