#![no_main]

use arbitrary::Arbitrary;
use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use tokio_util::codec::Decoder;

use hoist_docker::{Frame, FrameCodec};

/// Structured fuzzer input
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    data: Vec<u8>,
    /// Chunk boundaries (each value is the next chunk's length)
    splits: Vec<u8>,
}

fn decode_all<'a>(chunks: impl Iterator<Item = &'a [u8]>) -> (Vec<Frame>, usize) {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::new();
    let mut frames = Vec::new();
    for chunk in chunks {
        buf.extend_from_slice(chunk);
        while let Ok(Some(frame)) = codec.decode(&mut buf) {
            frames.push(frame);
        }
    }
    (frames, buf.len())
}

fuzz_target!(|input: FuzzInput| {
    let (whole, whole_left) = decode_all(std::iter::once(input.data.as_slice()));

    let mut pieces = Vec::new();
    let mut rest = input.data.as_slice();
    for &n in &input.splits {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at((n as usize).min(rest.len()));
        pieces.push(head);
        rest = tail;
    }
    pieces.push(rest);
    let (split, split_left) = decode_all(pieces.into_iter());

    // the split must not change the result
    assert_eq!(whole, split);
    assert_eq!(whole_left, split_left);
});
