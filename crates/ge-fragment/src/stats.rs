use std::sync::atomic::{AtomicU64, Ordering};

/// Sink for the per-draw alpha-test telemetry recorded while computing fragment shader IDs.
pub trait DrawCounter {
    fn record_draw(&self, alpha_tested: bool);
}

/// Discards every sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDrawCounter;

impl DrawCounter for NoopDrawCounter {
    fn record_draw(&self, _alpha_tested: bool) {}
}

impl<F: Fn(bool)> DrawCounter for F {
    fn record_draw(&self, alpha_tested: bool) {
        self(alpha_tested)
    }
}

/// Draw counters split by whether the fragment shader kept an alpha test.
///
/// Cheap to update from any thread; readers take a [`DrawStatsSnapshot`].
#[derive(Debug, Default)]
pub struct DrawStats {
    alpha_tested_draws: AtomicU64,
    non_alpha_tested_draws: AtomicU64,
}

impl DrawStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_alpha_tested_draws(&self) {
        self.alpha_tested_draws.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_non_alpha_tested_draws(&self) {
        self.non_alpha_tested_draws.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DrawStatsSnapshot {
        DrawStatsSnapshot {
            alpha_tested_draws: self.alpha_tested_draws.load(Ordering::Relaxed),
            non_alpha_tested_draws: self.non_alpha_tested_draws.load(Ordering::Relaxed),
        }
    }

    /// Zeroes both counters and returns the values they held.
    pub fn reset(&self) -> DrawStatsSnapshot {
        DrawStatsSnapshot {
            alpha_tested_draws: self.alpha_tested_draws.swap(0, Ordering::Relaxed),
            non_alpha_tested_draws: self.non_alpha_tested_draws.swap(0, Ordering::Relaxed),
        }
    }
}

impl DrawCounter for DrawStats {
    fn record_draw(&self, alpha_tested: bool) {
        if alpha_tested {
            self.inc_alpha_tested_draws();
        } else {
            self.inc_non_alpha_tested_draws();
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStatsSnapshot {
    pub alpha_tested_draws: u64,
    pub non_alpha_tested_draws: u64,
}

impl DrawStatsSnapshot {
    pub fn total_draws(self) -> u64 {
        self.alpha_tested_draws + self.non_alpha_tested_draws
    }

    pub fn to_json(self) -> String {
        format!(
            "{{\"alpha_tested_draws\":{},\"non_alpha_tested_draws\":{}}}",
            self.alpha_tested_draws, self.non_alpha_tested_draws,
        )
    }
}
