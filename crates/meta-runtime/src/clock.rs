use log::warn;

/// Tracks frame count and simulated time, and turns host timestamps into
/// bounded frame steps.
///
/// The first frame after start has `dt = 0`. Later frames use the time since
/// the previous timestamp, clamped to `max_frame_dt`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame: u64,
    elapsed: f64,
    last_timestamp: Option<f64>,
    max_frame_dt: f64,
}

impl FrameClock {
    /// Create a clock at frame 0 with the given step bound.
    pub fn new(max_frame_dt: f64) -> Self {
        Self {
            frame: 0,
            elapsed: 0.0,
            last_timestamp: None,
            max_frame_dt,
        }
    }

    /// Step for a frame observed at `now` (seconds, host clock).
    ///
    /// A timestamp earlier than the previous one yields 0 and becomes the
    /// new reference point. Non-finite timestamps yield 0 and are ignored.
    pub fn delta(&mut self, now: f64) -> f64 {
        if !now.is_finite() {
            return 0.0;
        }
        let Some(last) = self.last_timestamp.replace(now) else {
            return 0.0;
        };
        let raw = now - last;
        if raw <= 0.0 {
            return 0.0;
        }
        if raw > self.max_frame_dt {
            warn!(
                "frame step {raw:.3}s exceeds {:.3}s, clamping",
                self.max_frame_dt
            );
            return self.max_frame_dt;
        }
        raw
    }

    /// Record a completed frame of length `dt`. Returns the new frame number.
    pub fn advance(&mut self, dt: f64) -> u64 {
        self.frame += 1;
        self.elapsed += dt;
        self.frame
    }

    /// Number of completed frames.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Total simulated seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Upper bound applied to each frame step, in seconds.
    pub fn max_frame_dt(&self) -> f64 {
        self.max_frame_dt
    }
}
