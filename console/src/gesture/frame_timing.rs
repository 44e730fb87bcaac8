//! Tick timing instrumentation.
//!
//! The HUD frame rate is derived from the time spent inside one tick,
//! rounded to a whole number.  Rolling windows of work times and of the
//! intervals between ticks back the percentile stats reported over the
//! status line.

/// Rolling tick interval statistics over a window of samples.
#[derive(Debug)]
pub struct FrameTiming {
    /// Interval samples in milliseconds, oldest first.
    pub intervals: Vec<f64>,
    /// Per-tick work time in milliseconds, oldest first.
    pub work_times: Vec<f64>,
    /// Maximum number of samples to keep.
    pub window_size: usize,
    /// Tick interval budget in milliseconds (e.g. 33.3 for 30 Hz).
    pub budget_ms: f64,
    /// Total ticks recorded.
    pub total_frames: u64,
    /// Ticks whose interval exceeded the budget.
    pub missed_frames: u64,
    last_tick_s: Option<f64>,
    last_fps: f64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(300, 1000.0 / 30.0)
    }
}

impl FrameTiming {
    pub fn new(window_size: usize, budget_ms: f64) -> Self {
        Self {
            intervals: Vec::with_capacity(window_size),
            work_times: Vec::with_capacity(window_size),
            window_size,
            budget_ms,
            total_frames: 0,
            missed_frames: 0,
            last_tick_s: None,
            last_fps: 0.0,
        }
    }

    /// Record the start of a tick at `now_s`.
    ///
    /// The first tick has no interval, and a tick whose clock did not move
    /// forward is counted but not sampled.
    pub fn record_tick(&mut self, now_s: f64) {
        self.total_frames += 1;
        let Some(prev) = self.last_tick_s.replace(now_s) else {
            return;
        };

        let elapsed_ms = (now_s - prev) * 1000.0;
        if elapsed_ms <= 0.0 {
            return;
        }

        Self::push_sample(&mut self.intervals, elapsed_ms, self.window_size);
        if elapsed_ms > self.budget_ms {
            self.missed_frames += 1;
        }
    }

    /// Record how long one tick's work took and return the frame rate
    /// it implies, rounded.  A zero or negative duration reports 0.
    pub fn record_work(&mut self, work_ms: f64) -> f64 {
        if work_ms <= 0.0 || !work_ms.is_finite() {
            self.last_fps = 0.0;
            return 0.0;
        }
        Self::push_sample(&mut self.work_times, work_ms, self.window_size);
        self.last_fps = (1000.0 / work_ms).round();
        self.last_fps
    }

    fn push_sample(samples: &mut Vec<f64>, value: f64, window_size: usize) {
        samples.push(value);
        if samples.len() > window_size {
            samples.remove(0);
        }
    }

    /// Frame rate from the most recent tick's work time.
    pub fn fps(&self) -> f64 {
        self.last_fps
    }

    /// Compute percentile from a sorted slice.
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    fn sorted(samples: &[f64]) -> Vec<f64> {
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    pub fn stats(&self) -> FrameTimingStats {
        let intervals = Self::sorted(&self.intervals);
        let work = Self::sorted(&self.work_times);

        let interval_p50 = Self::percentile(&intervals, 50.0);
        FrameTimingStats {
            interval_p50,
            interval_p99: Self::percentile(&intervals, 99.0),
            tick_rate_p50: if interval_p50 > 0.0 { 1000.0 / interval_p50 } else { 0.0 },
            work_p50: Self::percentile(&work, 50.0),
            work_p99: Self::percentile(&work, 99.0),
            missed_pct: if self.total_frames > 0 {
                (self.missed_frames as f64 / self.total_frames as f64) * 100.0
            } else {
                0.0
            },
            total_frames: self.total_frames,
            missed_frames: self.missed_frames,
        }
    }

    /// Format stats as an s-expression.
    pub fn stats_sexp(&self) -> String {
        let s = self.stats();
        format!(
            "(:interval-p50 {:.1} :interval-p99 {:.1} :tick-rate {:.0} :work-p50 {:.3} :work-p99 {:.3} :fps {:.0} :missed-pct {:.1} :total-frames {} :missed-frames {})",
            s.interval_p50,
            s.interval_p99,
            s.tick_rate_p50,
            s.work_p50,
            s.work_p99,
            self.last_fps,
            s.missed_pct,
            s.total_frames,
            s.missed_frames,
        )
    }
}

/// Computed tick timing statistics.
#[derive(Debug, Clone)]
pub struct FrameTimingStats {
    pub interval_p50: f64,
    pub interval_p99: f64,
    /// Ticks per second implied by the median interval.
    pub tick_rate_p50: f64,
    pub work_p50: f64,
    pub work_p99: f64,
    pub missed_pct: f64,
    pub total_frames: u64,
    pub missed_frames: u64,
}
