#![no_main]

use libfuzzer_sys::fuzz_target;

use hoist_docker::{ContainerParams, ExecParams, NetworkParams, VolumeParams};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let _ = ContainerParams::from_json(value.clone());
    let _ = NetworkParams::from_json(value.clone());
    let _ = VolumeParams::from_json(value.clone());
    let _ = ExecParams::from_json(value);
});
