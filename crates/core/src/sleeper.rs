// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sleep abstraction for the control loop's one suspension point.
//!
//! The driver (spec.md §5) is single-threaded and cooperative: between
//! polls it suspends for a configured interval and nothing else. Routing
//! that suspension through a trait, rather than calling
//! `std::thread::sleep` directly, lets tests run the loop at full speed
//! while still observing how long it asked to wait.

use std::sync::{Arc, Mutex};
use std::time::Duration;

pub trait Sleeper: Clone + Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps for real.
#[derive(Clone, Default)]
pub struct RealSleeper;

impl Sleeper for RealSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records requested durations instead of blocking, for tests that need
/// to assert on the driver's polling cadence without paying for it.
#[derive(Clone, Default)]
pub struct FakeSleeper {
    requested: Arc<Mutex<Vec<Duration>>>,
}

impl FakeSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> Vec<Duration> {
        self.requested.lock().expect("fake sleeper mutex poisoned").clone()
    }
}

impl Sleeper for FakeSleeper {
    fn sleep(&self, duration: Duration) {
        self.requested.lock().expect("fake sleeper mutex poisoned").push(duration);
    }
}
