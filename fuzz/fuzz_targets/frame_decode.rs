#![no_main]

use libfuzzer_sys::fuzz_target;
use hoist_docker::decode_chunk;
use hoist_docker::frame::HEADER_LEN;

fuzz_target!(|data: &[u8]| {
    let frames = decode_chunk(data);

    // header plus payload can never exceed the input
    let consumed: usize = frames
        .iter()
        .map(|f| HEADER_LEN + f.size as usize)
        .sum();
    assert!(consumed <= data.len());
});
