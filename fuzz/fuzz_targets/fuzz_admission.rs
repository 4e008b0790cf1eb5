#![no_main]

use std::net::IpAddr;
use std::time::{Duration, Instant};

use libfuzzer_sys::fuzz_target;

use domain::admission::engine::AdmissionEngine;
use domain::admission::entity::AdmissionPolicy;

const MAX_EVENTS: usize = 512;

// Fuzz admission sequences against a small bucket map.
//
// Layout:
//   [0]     = burst (clamped to 1..=64)
//   [1]     = refill interval in milliseconds (clamped to >= 1)
//   [2]     = map capacity (clamped to 1..=32)
//   rest    = events, 3 bytes each: [ip tail, ip tail, time step in ms]
fuzz_target!(|data: &[u8]| {
    if data.len() < 6 {
        return;
    }

    let burst = u64::from(data[0] % 64) + 1;
    let refill_interval = Duration::from_millis(u64::from(data[1].max(1)));
    let capacity = usize::from(data[2] % 32) + 1;

    let policy = AdmissionPolicy {
        burst,
        refill_interval,
    };
    let mut engine = AdmissionEngine::new(policy, capacity);

    let mut now = Instant::now();
    for chunk in data[3..].chunks_exact(3).take(MAX_EVENTS) {
        let ip = IpAddr::from([10, 0, chunk[0], chunk[1]]);
        now += Duration::from_millis(u64::from(chunk[2]));

        let _admitted = engine.admit(ip, now);

        // The map never exceeds its configured bound, whatever the
        // admission sequence looks like.
        assert!(engine.tracked_clients() <= capacity);
    }
});
