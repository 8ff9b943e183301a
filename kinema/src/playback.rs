//! Wall-clock driven playback
//!
//! The frame shown is derived from the time since playback started, never from how many ticks
//! have happened, so a late tick skips frames instead of slowing the animation down.

use std::time::Instant;

/// Playback position of a timeline of `total_frames` frames
#[derive(Debug, Clone)]
pub struct Playback {
    frame_rate: f64,
    total_frames: u32,
    looping: bool,
    start_frame: u32,
    started_at: Option<Instant>,
    last_frame: Option<u32>,
}

impl Playback {
    pub fn new(frame_rate: f64, total_frames: u32, looping: bool) -> Self {
        Self {
            frame_rate,
            total_frames: total_frames.max(1),
            looping,
            start_frame: 1,
            started_at: None,
            last_frame: None,
        }
    }

    /// Starts, or restarts, playing from `frame` at `now`
    pub fn play(&mut self, frame: u32, now: Instant) {
        self.start_frame = frame.clamp(1, self.total_frames);
        self.started_at = Some(now);
        self.last_frame = None;
    }

    /// Stops playing; no later call yields a frame until [`Playback::play`]
    pub fn stop(&mut self) {
        self.started_at = None;
        self.last_frame = None;
    }

    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    /// Frame to show at `now`, `None` when stopped.
    ///
    /// When not looping the last frame is held once reached.
    pub fn frame_at(&self, now: Instant) -> Option<u32> {
        let started_at = self.started_at?;
        let elapsed = now.saturating_duration_since(started_at).as_secs_f64();
        let advanced = (elapsed * self.frame_rate).floor();
        let frame = self.start_frame as f64 + advanced;
        let total = self.total_frames as f64;
        let frame = if self.looping {
            (frame - 1.0).rem_euclid(total) + 1.0
        } else {
            frame.min(total)
        };
        Some(frame as u32)
    }

    /// Called on every tick. `Some` only when the frame changed since the last tick.
    pub fn update(&mut self, now: Instant) -> Option<u32> {
        let frame = self.frame_at(now)?;
        if self.last_frame == Some(frame) {
            return None;
        }
        log::trace!("Playback frame {frame}");
        self.last_frame = Some(frame);
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::Playback;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn frame_follows_elapsed_time() {
        let start = Instant::now();
        let mut playback = Playback::new(10.0, 100, false);
        playback.play(1, start);
        assert_eq!(Some(1), playback.frame_at(start));
        assert_eq!(Some(1), playback.frame_at(start + ms(99)));
        assert_eq!(Some(2), playback.frame_at(start + ms(100)));
        // a late tick skips ahead rather than stepping by one
        assert_eq!(Some(51), playback.frame_at(start + ms(5_000)));
    }

    #[test]
    fn holds_or_wraps_at_end() {
        let start = Instant::now();
        let mut once = Playback::new(10.0, 20, false);
        once.play(15, start);
        assert_eq!(Some(20), once.frame_at(start + ms(10_000)));

        let mut looping = Playback::new(10.0, 20, true);
        looping.play(15, start);
        assert_eq!(Some(20), looping.frame_at(start + ms(500)));
        assert_eq!(Some(1), looping.frame_at(start + ms(600)));
        assert_eq!(Some(15), looping.frame_at(start + ms(2_000)));
    }

    #[test]
    fn update_reports_changes_only() {
        let start = Instant::now();
        let mut playback = Playback::new(10.0, 20, false);
        playback.play(1, start);
        assert_eq!(Some(1), playback.update(start));
        assert_eq!(None, playback.update(start + ms(50)));
        assert_eq!(Some(2), playback.update(start + ms(120)));
    }

    #[test]
    fn stopped_yields_nothing() {
        let start = Instant::now();
        let mut playback = Playback::new(24.0, 48, true);
        assert_eq!(None, playback.frame_at(start));
        playback.play(1, start);
        playback.stop();
        assert!(!playback.is_playing());
        assert_eq!(None, playback.update(start + ms(1_000)));
        assert_eq!(None, playback.frame_at(start + ms(1_000)));
    }
}
