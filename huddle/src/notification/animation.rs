use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Horizontal inset of the banner on both sides
pub const BANNER_X: f32 = 16.0;
/// Banner offset while off-screen above the top edge
pub const HIDDEN_Y: f32 = -150.0;
/// Banner offset while shown
pub const VISIBLE_Y: f32 = 60.0;

/// Screen offset of the notification banner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimatedPosition {
    pub x: f32,
    pub y: f32,
}

impl AnimatedPosition {
    pub const HIDDEN: AnimatedPosition = AnimatedPosition {
        x: BANNER_X,
        y: HIDDEN_Y,
    };

    pub const VISIBLE: AnimatedPosition = AnimatedPosition {
        x: BANNER_X,
        y: VISIBLE_Y,
    };

    pub fn is_on_screen(&self) -> bool {
        self.y >= 0.0
    }

    fn lerp(self, to: AnimatedPosition, t: f32) -> AnimatedPosition {
        AnimatedPosition {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

impl Default for AnimatedPosition {
    fn default() -> Self {
        Self::HIDDEN
    }
}

/// Linear timing of a position from `from` to `to`, held at `from` for `delay`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    from: AnimatedPosition,
    to: AnimatedPosition,
    delay: Duration,
    duration: Duration,
}

impl Animation {
    pub fn new(from: AnimatedPosition, to: AnimatedPosition, duration: Duration) -> Self {
        Self {
            from,
            to,
            delay: Duration::ZERO,
            duration,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn target(&self) -> AnimatedPosition {
        self.to
    }

    /// Time from start until the target is reached
    pub fn total(&self) -> Duration {
        self.delay + self.duration
    }

    /// Position `elapsed` after the animation started
    pub fn sample(&self, elapsed: Duration) -> AnimatedPosition {
        if elapsed <= self.delay {
            return self.from;
        }
        if self.duration.is_zero() {
            return self.to;
        }
        let t = (elapsed - self.delay).as_secs_f32() / self.duration.as_secs_f32();
        self.from.lerp(self.to, t.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sample_holds_during_delay() {
        let animation = Animation::new(
            AnimatedPosition::VISIBLE,
            AnimatedPosition::HIDDEN,
            Duration::from_millis(400),
        )
        .with_delay(Duration::from_millis(6000));

        assert_eq!(animation.total(), Duration::from_millis(6400));
        assert_eq!(
            animation.sample(Duration::from_millis(5999)),
            AnimatedPosition::VISIBLE
        );
        assert_eq!(
            animation.sample(Duration::from_millis(6200)).y,
            (VISIBLE_Y + HIDDEN_Y) / 2.0
        );
        assert_eq!(
            animation.sample(Duration::from_secs(60)),
            AnimatedPosition::HIDDEN
        );
    }

    #[test]
    fn zero_duration_jumps() {
        let animation = Animation::new(
            AnimatedPosition::HIDDEN,
            AnimatedPosition::VISIBLE,
            Duration::ZERO,
        );
        assert_eq!(animation.sample(Duration::from_millis(1)), AnimatedPosition::VISIBLE);
        assert!(animation.target().is_on_screen());
        assert!(!AnimatedPosition::default().is_on_screen());
    }
}
