/// Implements timing for the render loop. Frame times are measured in seconds
/// relative to the moment the loop started, using the graphics context clock.
pub struct Time {
    start: f32,
    elapsed: f32,
    delta: f32,
}

impl Time {
    pub fn new(start_seconds: f32) -> Self {
        Time {
            start: start_seconds,
            elapsed: 0.0,
            delta: 0.0,
        }
    }

    /// Seconds since the loop started, as of the last [Time::step]
    #[inline(always)]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed
    }

    #[inline(always)]
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    #[inline(always)]
    pub fn delta_milliseconds(&self) -> f32 {
        self.delta_seconds() * 1000.0
    }

    /// Advance to the clock reading `now_seconds`. A reading older than the
    /// previous one is clamped so elapsed time never runs backwards.
    pub fn step(&mut self, now_seconds: f32) {
        let elapsed = (now_seconds - self.start).max(self.elapsed);
        self.delta = elapsed - self.elapsed;
        self.elapsed = elapsed;
    }
}
