use std::time::{Duration, Instant};

/// The smoothing factor for the FPS calculation.
const SMOOTHING: f32 = 0.95;

/// An exponentially smoothed frames per second (FPS) counter.
///
/// # Examples
///
/// ```
/// use stripsobel_io::fps_counter::FpsCounter;
///
/// let mut fps_counter = FpsCounter::new();
///
/// for _ in 0..100 {
///    fps_counter.update();
/// }
///
/// assert_eq!(fps_counter.frame_count(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct FpsCounter {
    last_time: Instant,
    frame_count: u64,
    fps: f32,
}

impl FpsCounter {
    /// Creates a new `FpsCounter` starting now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a new `FpsCounter` whose first interval starts at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last_time: start,
            frame_count: 0,
            fps: 0.0,
        }
    }

    /// Returns the current smoothed FPS.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Returns the number of frames counted so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Count one frame finishing now.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Count one frame finishing at `now`.
    pub fn update_at(&mut self, now: Instant) {
        self.frame_count += 1;

        let duration = now.saturating_duration_since(self.last_time);
        self.last_time = now;

        // two frames in the same clock tick carry no rate information
        if duration == Duration::ZERO {
            return;
        }

        let instant_fps = 1.0 / duration.as_secs_f32();
        self.fps = if self.fps == 0.0 {
            instant_fps
        } else {
            self.fps * SMOOTHING + instant_fps * (1.0 - SMOOTHING)
        };
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
