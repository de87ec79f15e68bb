//! `hoist decode` command handler
//!
//! Decodes a captured multiplexed stream without talking to an engine.

use std::io::Write;

use serde::Serialize;
use tracing::debug;

use hoist_docker::{Frame, StreamKind, decode_chunk};

use crate::cli::{DecodeArgs, StreamFilter};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `decode` command.
pub async fn execute(args: DecodeArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let data = tokio::fs::read(&args.file).await?;
    let report = DecodeReport::new(args.file.display().to_string(), &data, args.stream);
    debug!(
        path = %report.source,
        total_bytes = report.total_bytes,
        frames = report.frames.len(),
        "decoded captured stream"
    );

    writer.render(&report)
}

/// Frames decoded from one captured file.
///
/// The file is decoded as a single chunk, so a frame cut short at the end of
/// the file is kept with whatever payload is present.
#[derive(Debug, Serialize)]
pub struct DecodeReport {
    pub source: String,
    pub total_bytes: usize,
    pub frames: Vec<Frame>,
}

impl DecodeReport {
    fn new(source: String, data: &[u8], filter: Option<StreamFilter>) -> Self {
        let frames = decode_chunk(data);
        let wanted = filter.map(|f| match f {
            StreamFilter::Stdout => StreamKind::Stdout,
            StreamFilter::Stderr => StreamKind::Stderr,
        });

        Self {
            source,
            total_bytes: data.len(),
            frames: frames
                .into_iter()
                .filter(|f| wanted.is_none_or(|kind| f.kind == kind))
                .collect(),
        }
    }
}

impl Render for DecodeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        for frame in &self.frames {
            write!(w, "{}", frame.payload)?;
        }
        Ok(())
    }
}
