use std::time::Instant;

/// Wall-clock frame timer. Deltas are not clamped, so a stalled frame
/// yields one large step.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    previous: Instant,
}

impl FrameClock {
    pub fn new(start: Instant) -> Self {
        Self { previous: start }
    }

    pub fn start() -> Self {
        Self::new(Instant::now())
    }

    /// Seconds since the previous tick. A `now` earlier than the previous
    /// tick counts as zero.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.previous).as_secs_f32();
        self.previous = now;
        delta
    }
}
