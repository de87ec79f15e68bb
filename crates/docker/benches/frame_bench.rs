//! Output stream decoding benchmarks
//!
//! Measures per-chunk decoding, codec reassembly, and name/label lookups.

use bytes::BytesMut;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hoist_docker::resolve::{filter_by_label, find_container_by_name_or_id};
use hoist_docker::{ContainerSummary, FrameCodec, StreamKind, decode_chunk, encode_frame};
use tokio_util::codec::Decoder;

fn build_chunk(frames: usize, payload_len: usize) -> Vec<u8> {
    let line = "x".repeat(payload_len.saturating_sub(1)) + "\n";
    let mut buf = Vec::with_capacity(frames * (payload_len + 8));
    for i in 0..frames {
        let kind = if i % 4 == 3 {
            StreamKind::Stderr
        } else {
            StreamKind::Stdout
        };
        buf.extend_from_slice(&encode_frame(kind, line.as_bytes()));
    }
    buf
}

fn bench_decode_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_chunk");

    for frames in [1usize, 16, 256] {
        let chunk = build_chunk(frames, 80);
        group.throughput(Throughput::Bytes(chunk.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(frames), &chunk, |b, chunk| {
            b.iter(|| decode_chunk(black_box(chunk)))
        });
    }

    group.finish();
}

fn bench_codec_reassembly(c: &mut Criterion) {
    let data = build_chunk(256, 80);
    let mut group = c.benchmark_group("frame_codec");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for split in [7usize, 512, 16 * 1024] {
        group.bench_with_input(BenchmarkId::new("split", split), &split, |b, &split| {
            b.iter(|| {
                let mut codec = FrameCodec::new();
                let mut buf = BytesMut::new();
                let mut count = 0usize;
                for piece in data.chunks(split) {
                    buf.extend_from_slice(piece);
                    while let Ok(Some(frame)) = codec.decode(&mut buf) {
                        count += frame.payload.len();
                    }
                }
                black_box(count)
            })
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let containers: Vec<ContainerSummary> = (0..1000)
        .map(|i| ContainerSummary {
            id: format!("{i:064x}"),
            names: vec![format!("/svc-{i}")],
            image: "nginx:latest".to_owned(),
            state: "running".to_owned(),
            labels: [("tier".to_owned(), if i % 2 == 0 { "front" } else { "back" }.to_owned())]
                .into_iter()
                .collect(),
        })
        .collect();

    let mut group = c.benchmark_group("resolve");
    group.throughput(Throughput::Elements(containers.len() as u64));

    group.bench_function("find_by_name_last", |b| {
        b.iter(|| find_container_by_name_or_id(black_box(&containers), "svc-999"))
    });

    group.bench_function("filter_by_label", |b| {
        b.iter(|| filter_by_label(black_box(&containers), "tier", "front").len())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_chunk,
    bench_codec_reassembly,
    bench_resolve
);
criterion_main!(benches);
