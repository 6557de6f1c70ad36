// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Recorder;
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound for waits on signals that are expected to arrive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Panic if `recorder` receives any signal within `window`.
pub fn assert_no_event_within<T: Send + 'static>(recorder: &Recorder<T>, window: Duration) {
    let before = recorder.event_count();
    thread::sleep(window);
    let after = recorder.event_count();
    assert_eq!(
        before, after,
        "unexpected signal: {} event(s) arrived within {:?}",
        after - before,
        window
    );
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
