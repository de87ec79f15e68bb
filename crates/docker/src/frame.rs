//! Multiplexed output stream decoding.
//!
//! The engine's logs, exec and attach endpoints interleave stdout and stderr on
//! one channel. Every payload is prefixed with an 8-byte header:
//!
//! ```text
//! offset  0      1   2   3   4   5   6   7   8 ...
//!        +------+-----------+---------------+-----------------+
//!        | type | reserved  | size (u32 BE) | payload (size)  |
//!        +------+-----------+---------------+-----------------+
//! type: 0 = stdin, 1 = stdout, 2 = stderr
//! ```
//!
//! Two decoding paths are provided:
//!
//! - [`decode_chunks`] decodes already-delivered buffers one by one. Each chunk
//!   must hold whole frames; a frame split across two chunks is not reassembled
//!   (the tail of the first chunk is reported and dropped). Use it for buffers
//!   whose boundaries are known to follow frame boundaries.
//! - [`FrameCodec`] is a stateful [`Decoder`] that buffers partial headers and
//!   payloads across chunks. [`collect_output`] drives it over a live engine
//!   stream, so arbitrary network chunking is handled there.
//!
//! Malformed input never fails a decode. Anomalies are logged with `tracing`
//! and counted under [`FRAME_ANOMALIES_TOTAL`].

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use futures_util::StreamExt;
use metrics::counter;
use serde::Serialize;
use tokio_util::codec::Decoder;
use tracing::{trace, warn};

use hoist_core::metrics::{FRAME_ANOMALIES_TOTAL, FRAMES_DECODED_TOTAL, LABEL_ANOMALY};

use crate::engine::OutputStream;
use crate::error::EngineError;

/// Size of the frame header in bytes.
pub const HEADER_LEN: usize = 8;

const TYPE_OFFSET: usize = 0;
const SIZE_OFFSET: usize = 4;

/// Which standard stream a frame was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdin,
    Stdout,
    Stderr,
    /// A type byte outside 0..=2. Kept rather than dropped so no output is lost.
    Unknown(u8),
}

impl StreamKind {
    /// Wire value of the type byte.
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Stdin => 0,
            Self::Stdout => 1,
            Self::Stderr => 2,
            Self::Unknown(b) => b,
        }
    }
}

impl From<u8> for StreamKind {
    fn from(byte: u8) -> Self {
        match byte {
            0 => Self::Stdin,
            1 => Self::Stdout,
            2 => Self::Stderr,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "stdin"),
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
            Self::Unknown(b) => write!(f, "unknown({b})"),
        }
    }
}

/// One typed, length-prefixed unit of container output.
///
/// `size` is the byte length of the payload as it was carried on the wire.
/// The payload is decoded as UTF-8; invalid sequences are replaced with U+FFFD,
/// so `payload.len()` can exceed `size` for non-UTF-8 output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub kind: StreamKind,
    pub size: u32,
    pub payload: String,
}

impl Frame {
    /// Builds a frame from already-decoded text.
    pub fn new(kind: StreamKind, payload: impl Into<String>) -> Self {
        let payload = payload.into();
        Self {
            kind,
            size: wire_len(payload.len()),
            payload,
        }
    }

    fn from_wire(kind: StreamKind, payload: &[u8]) -> Self {
        Self {
            kind,
            size: wire_len(payload.len()),
            payload: String::from_utf8_lossy(payload).into_owned(),
        }
    }
}

/// Ordered frames produced by one run or exec call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecodedOutput {
    frames: Vec<Frame>,
}

impl DecodedOutput {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Combined output: every payload in decode order, stdout and stderr interleaved.
    pub fn to_text(&self) -> String {
        frames_to_text(&self.frames)
    }

    /// Payloads of a single stream only, in decode order.
    pub fn text_for(&self, kind: StreamKind) -> String {
        self.frames
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.payload.as_str())
            .collect()
    }
}

impl From<Vec<Frame>> for DecodedOutput {
    fn from(frames: Vec<Frame>) -> Self {
        Self::new(frames)
    }
}

impl IntoIterator for DecodedOutput {
    type Item = Frame;
    type IntoIter = std::vec::IntoIter<Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

/// Decodes every frame in a single chunk.
///
/// A chunk shorter than [`HEADER_LEN`] yields no frames. Bytes left over after
/// the last whole frame are dropped. Both cases are logged, neither is an error.
pub fn decode_chunk(chunk: &[u8]) -> Vec<Frame> {
    if chunk.len() < HEADER_LEN {
        warn!(
            len = chunk.len(),
            "bad container output: chunk shorter than frame header, skipping"
        );
        record_anomaly("short_chunk");
        return Vec::new();
    }

    let mut frames = Vec::new();
    let mut cursor = 0;

    while cursor < chunk.len() {
        let rest = &chunk[cursor..];
        if rest.len() < HEADER_LEN {
            break;
        }

        let (kind, size) = read_header(rest);
        let end = HEADER_LEN.saturating_add(size as usize);

        if end > rest.len() {
            let available = &rest[HEADER_LEN..];
            warn!(
                declared = size,
                available = available.len(),
                "frame payload runs past end of chunk, keeping truncated payload"
            );
            record_anomaly("truncated_payload");
            frames.push(Frame::from_wire(kind, available));
            cursor = chunk.len();
            break;
        }

        frames.push(Frame::from_wire(kind, &rest[HEADER_LEN..end]));
        cursor += end;
    }

    if cursor != chunk.len() {
        warn!(
            consumed = cursor,
            len = chunk.len(),
            "container output chunk not entirely read, dropping trailing bytes"
        );
        record_anomaly("trailing_bytes");
    }

    counter!(FRAMES_DECODED_TOTAL).increment(frames.len() as u64);
    frames
}

/// Decodes a sequence of chunks, concatenating their frames in chunk order.
pub fn decode_chunks<I, B>(chunks: I) -> Vec<Frame>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    chunks
        .into_iter()
        .flat_map(|chunk| decode_chunk(chunk.as_ref()))
        .collect()
}

/// Joins frame payloads in order into one string.
pub fn frames_to_text(frames: &[Frame]) -> String {
    frames.iter().map(|f| f.payload.as_str()).collect()
}

/// Decodes raw output buffers and flattens them into the combined output text.
pub fn chunks_to_text<I, B>(chunks: I) -> String
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    frames_to_text(&decode_chunks(chunks))
}

/// Encodes one frame in the engine's wire format.
///
/// Payloads longer than `u32::MAX` bytes are cut to fit the size field.
pub fn encode_frame(kind: StreamKind, payload: &[u8]) -> Bytes {
    let size = wire_len(payload.len());
    let payload = &payload[..size as usize];

    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_u8(kind.as_byte());
    buf.put_bytes(0, SIZE_OFFSET - TYPE_OFFSET - 1);
    buf.put_u32(size);
    buf.put_slice(payload);
    buf.freeze()
}

const MAX_RESERVE: usize = 64 * 1024;

/// Stateful frame decoder that reassembles frames split across chunks.
#[derive(Debug, Default)]
pub struct FrameCodec {
    decoded: u64,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames produced so far.
    pub fn decoded(&self) -> u64 {
        self.decoded
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, Self::Error> {
        if src.len() < HEADER_LEN {
            src.reserve(HEADER_LEN - src.len());
            return Ok(None);
        }

        let (kind, size) = read_header(&src[..HEADER_LEN]);
        let total = HEADER_LEN.saturating_add(size as usize);
        if src.len() < total {
            // the declared size is untrusted, so never pre-allocate all of it
            src.reserve((total - src.len()).min(MAX_RESERVE));
            return Ok(None);
        }

        src.advance(HEADER_LEN);
        let payload = src.split_to(size as usize);
        self.decoded += 1;
        counter!(FRAMES_DECODED_TOTAL).increment(1);
        Ok(Some(Frame::from_wire(kind, &payload)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if !src.is_empty() {
            warn!(
                leftover = src.len(),
                "output stream ended inside a frame, dropping trailing bytes"
            );
            record_anomaly("trailing_bytes");
            src.clear();
        }
        Ok(None)
    }
}

/// Drains an engine output stream to its end and decodes it.
///
/// A transport error aborts collection immediately; frames decoded so far are
/// discarded and the error is returned as is.
pub async fn collect_output(mut stream: OutputStream) -> Result<DecodedOutput, EngineError> {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::new();
    let mut frames = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        trace!(len = chunk.len(), "output chunk received");
        buf.extend_from_slice(&chunk);
        while let Some(frame) = codec
            .decode(&mut buf)
            .map_err(|e| EngineError::Stream(e.to_string()))?
        {
            frames.push(frame);
        }
    }

    while let Some(frame) = codec
        .decode_eof(&mut buf)
        .map_err(|e| EngineError::Stream(e.to_string()))?
    {
        frames.push(frame);
    }

    Ok(DecodedOutput::new(frames))
}

fn read_header(buf: &[u8]) -> (StreamKind, u32) {
    let kind = StreamKind::from(buf[TYPE_OFFSET]);
    let size = u32::from_be_bytes([
        buf[SIZE_OFFSET],
        buf[SIZE_OFFSET + 1],
        buf[SIZE_OFFSET + 2],
        buf[SIZE_OFFSET + 3],
    ]);
    (kind, size)
}

fn wire_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn record_anomaly(kind: &'static str) {
    counter!(FRAME_ANOMALIES_TOTAL, LABEL_ANOMALY => kind).increment(1);
}
