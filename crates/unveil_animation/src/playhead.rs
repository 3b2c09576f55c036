//! Time-driven playback of a timeline
//!
//! A [`Playhead`] turns elapsed milliseconds into normalized progress for
//! triggers that are not scrubbed. It only tracks position and direction;
//! evaluation stays in [`crate::Timeline::evaluate`].

/// Playback direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// Playback state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlayState {
    /// Not started, or reset to the beginning
    #[default]
    Idle,
    Playing,
    Paused,
    /// Ran to either end and stopped there
    Finished,
}

/// Emitted by [`Playhead::tick`] when playback reaches an end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayEvent {
    Completed,
    ReverseCompleted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Playhead {
    duration_ms: f32,
    elapsed_ms: f32,
    direction: Direction,
    state: PlayState,
}

impl Playhead {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            duration_ms: duration_ms.max(0.0),
            elapsed_ms: 0.0,
            direction: Direction::Forward,
            state: PlayState::Idle,
        }
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// Normalized position, 0.0-1.0
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return if self.elapsed_ms > 0.0 { 1.0 } else { 0.0 };
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Play forward from the current position
    pub fn play(&mut self) {
        self.direction = Direction::Forward;
        self.state = PlayState::Playing;
        self.settle_instant();
    }

    /// Play backward from the current position
    pub fn reverse(&mut self) {
        self.direction = Direction::Reverse;
        self.state = PlayState::Playing;
        self.settle_instant();
    }

    pub fn pause(&mut self) {
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
        }
    }

    /// Continue in the current direction
    pub fn resume(&mut self) {
        if self.state == PlayState::Paused {
            self.state = PlayState::Playing;
        }
    }

    /// Jump to the beginning and play forward
    pub fn restart(&mut self) {
        self.elapsed_ms = 0.0;
        self.play();
    }

    /// Jump to the beginning and stop
    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
        self.direction = Direction::Forward;
        self.state = PlayState::Idle;
    }

    /// Jump to the end and stop
    pub fn complete(&mut self) {
        self.elapsed_ms = self.duration_ms.max(f32::MIN_POSITIVE);
        self.direction = Direction::Forward;
        self.state = PlayState::Finished;
    }

    /// Advance by `dt_ms`; reports reaching an end once
    pub fn tick(&mut self, dt_ms: f32) -> Option<PlayEvent> {
        if self.state != PlayState::Playing {
            return None;
        }
        let dt_ms = dt_ms.max(0.0);
        match self.direction {
            Direction::Forward => self.elapsed_ms += dt_ms,
            Direction::Reverse => self.elapsed_ms -= dt_ms,
        }
        self.settle_instant()
    }

    fn settle_instant(&mut self) -> Option<PlayEvent> {
        if self.state != PlayState::Playing {
            return None;
        }
        match self.direction {
            Direction::Forward if self.elapsed_ms >= self.duration_ms => {
                self.elapsed_ms = self.duration_ms.max(f32::MIN_POSITIVE);
                self.state = PlayState::Finished;
                Some(PlayEvent::Completed)
            }
            Direction::Reverse if self.elapsed_ms <= 0.0 => {
                self.elapsed_ms = 0.0;
                self.state = PlayState::Finished;
                Some(PlayEvent::ReverseCompleted)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_playback() {
        let mut playhead = Playhead::new(1000.0);
        assert_eq!(playhead.tick(16.0), None);
        assert_eq!(playhead.progress(), 0.0);

        playhead.play();
        assert_eq!(playhead.tick(250.0), None);
        assert!((playhead.progress() - 0.25).abs() < 1e-6);

        assert_eq!(playhead.tick(800.0), Some(PlayEvent::Completed));
        assert_eq!(playhead.progress(), 1.0);
        assert_eq!(playhead.state(), PlayState::Finished);
        // Only reported once
        assert_eq!(playhead.tick(16.0), None);
    }

    #[test]
    fn test_reverse_from_midpoint() {
        let mut playhead = Playhead::new(1000.0);
        playhead.play();
        playhead.tick(600.0);
        playhead.reverse();
        playhead.tick(100.0);
        assert!((playhead.progress() - 0.5).abs() < 1e-6);
        assert_eq!(playhead.tick(1000.0), Some(PlayEvent::ReverseCompleted));
        assert_eq!(playhead.progress(), 0.0);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut playhead = Playhead::new(1000.0);
        playhead.play();
        playhead.tick(300.0);
        playhead.pause();
        playhead.tick(300.0);
        assert!((playhead.progress() - 0.3).abs() < 1e-6);

        playhead.resume();
        playhead.tick(200.0);
        assert!((playhead.progress() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_restart_reset_complete() {
        let mut playhead = Playhead::new(500.0);
        playhead.complete();
        assert_eq!(playhead.progress(), 1.0);

        playhead.restart();
        assert_eq!(playhead.progress(), 0.0);
        assert!(playhead.is_playing());

        playhead.tick(100.0);
        playhead.reset();
        assert_eq!(playhead.progress(), 0.0);
        assert_eq!(playhead.state(), PlayState::Idle);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut playhead = Playhead::new(0.0);
        playhead.play();
        assert_eq!(playhead.progress(), 1.0);
        assert_eq!(playhead.state(), PlayState::Finished);
    }
}
