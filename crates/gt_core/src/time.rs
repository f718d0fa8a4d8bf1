use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// Variable-step frame timer: one `begin_frame()` per redraw yields the
/// wall-clock delta that every object integrates with.
pub struct FrameClock {
    pub max_dt: f64,
    pub dt: f64,
    pub total_time: f64,
    pub frame_count: u64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            max_dt: 0.25,
            dt: 0.0,
            total_time: 0.0,
            frame_count: 0,
            last_instant: Instant::now(),
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Feed one frame's elapsed seconds.
    pub fn advance(&mut self, real_dt: f64) {
        self.dt = real_dt.max(0.0);
        // Stalls (window drag, breakpoint) are capped.
        if self.dt > self.max_dt {
            log::warn!(
                "Frame took {:.1}ms, capping delta to {}ms",
                self.dt * 1000.0,
                self.max_dt * 1000.0
            );
            self.dt = self.max_dt;
        }

        self.total_time += self.dt;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn dt_secs(&self) -> f32 {
        self.dt as f32
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
