//! Transient warning/error banner.
//!
//! A single content slot shown by animating the banner on-screen. Unless a
//! notification is persistent it hides itself after a fixed visible window.
//! Each `show`/`dismiss` takes a new intent token; timers carry the token they
//! were scheduled under and are ignored once superseded.
mod animation;

use std::time::Duration;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

pub use animation::{AnimatedPosition, Animation, BANNER_X, HIDDEN_Y, VISIBLE_Y};

pub const REVEAL_DURATION: Duration = Duration::from_millis(400);
/// How long a non-persistent banner stays on-screen once revealed
pub const VISIBLE_WINDOW: Duration = Duration::from_millis(6000);
pub const AUTO_HIDE_DURATION: Duration = Duration::from_millis(400);
pub const DISMISS_DURATION: Duration = Duration::from_millis(200);

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[display(fmt = "Warning")]
    Warning,
    #[display(fmt = "Error")]
    Error,
}

impl Severity {
    /// Banner background color
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Warning => "gold",
            Severity::Error => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub header: String,
    pub body: String,
    pub severity: Severity,
    /// Stays on-screen until dismissed
    pub persistent: bool,
}

impl Notification {
    pub fn new(header: impl Into<String>, body: impl Into<String>, severity: Severity) -> Self {
        Self {
            header: header.into(),
            body: body.into(),
            severity,
            persistent: false,
        }
    }

    /// Notification headed by its severity name
    pub fn from_severity(severity: Severity, body: impl Into<String>) -> Self {
        Self::new(severity.to_string(), body, severity)
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }
}

#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BannerState {
    #[default]
    Hidden,
    /// Animating on-screen
    Visible,
    /// Revealed, waiting out the visible window before animating off
    AutoHiding,
    /// Revealed and persistent
    Pinned,
    /// Animating off-screen after a user dismissal
    Dismissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Reveal animation finished
    Revealed,
    /// Banner is off-screen; content can be cleared
    Hidden,
}

/// A completion callback to run `after` the moment it was scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub intent: u64,
    pub after: Duration,
    pub step: Step,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A newer show/dismiss took over; nothing changed
    Superseded,
    /// Step applied and a follow-up timer must be scheduled
    Next(Timer),
    /// Revealed a persistent notification; no follow-up
    Pinned,
    /// Content cleared and banner is hidden
    Cleared,
}

/// Snapshot of the banner for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BannerView {
    pub visible: bool,
    pub state: BannerState,
    pub position: AnimatedPosition,
    pub header: String,
    pub body: String,
    pub severity: Option<Severity>,
    pub persistent: bool,
    pub color: &'static str,
}

#[derive(Debug)]
pub struct NotificationController {
    current: Option<Notification>,
    state: BannerState,
    intent: u64,
    animation: Option<(Animation, Instant)>,
    rest: AnimatedPosition,
}

impl Default for NotificationController {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationController {
    pub fn new() -> Self {
        Self {
            current: None,
            state: BannerState::Hidden,
            intent: 0,
            animation: None,
            rest: AnimatedPosition::HIDDEN,
        }
    }

    /// Replaces the content slot and animates the banner on-screen
    pub fn show(&mut self, notification: Notification, now: Instant) -> Timer {
        tracing::trace!(header = %notification.header, persistent = notification.persistent, "showing notification");
        self.current = Some(notification);
        self.state = BannerState::Visible;
        self.animate_to(AnimatedPosition::VISIBLE, Duration::ZERO, REVEAL_DURATION, now);
        self.schedule(REVEAL_DURATION, Step::Revealed)
    }

    /// User dismissal. Overrides persistence.
    pub fn dismiss(&mut self, now: Instant) -> Timer {
        self.state = BannerState::Dismissing;
        self.animate_to(AnimatedPosition::HIDDEN, Duration::ZERO, DISMISS_DURATION, now);
        self.schedule(DISMISS_DURATION, Step::Hidden)
    }

    /// Applies an elapsed timer if it still belongs to the current intent
    pub fn complete(&mut self, timer: Timer, now: Instant) -> Completion {
        if timer.intent != self.intent {
            tracing::trace!(timer = timer.intent, current = self.intent, "ignoring superseded notification timer");
            return Completion::Superseded;
        }

        match timer.step {
            Step::Revealed => {
                self.settle(now);
                let persistent = self
                    .current
                    .as_ref()
                    .map(|n| n.persistent)
                    .unwrap_or_default();
                if persistent {
                    self.state = BannerState::Pinned;
                    return Completion::Pinned;
                }
                self.state = BannerState::AutoHiding;
                self.animate_to(
                    AnimatedPosition::HIDDEN,
                    VISIBLE_WINDOW,
                    AUTO_HIDE_DURATION,
                    now,
                );
                Completion::Next(Timer {
                    intent: self.intent,
                    after: VISIBLE_WINDOW + AUTO_HIDE_DURATION,
                    step: Step::Hidden,
                })
            }
            Step::Hidden => {
                self.settle(now);
                self.clear();
                Completion::Cleared
            }
        }
    }

    pub fn position(&self, now: Instant) -> AnimatedPosition {
        match &self.animation {
            Some((animation, started)) => animation.sample(now.saturating_duration_since(*started)),
            None => self.rest,
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn state(&self) -> BannerState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn view(&self, now: Instant) -> BannerView {
        let severity = self.current.as_ref().map(|n| n.severity);
        BannerView {
            visible: self.is_visible(),
            state: self.state,
            position: self.position(now),
            header: self
                .current
                .as_ref()
                .map(|n| n.header.clone())
                .unwrap_or_default(),
            body: self
                .current
                .as_ref()
                .map(|n| n.body.clone())
                .unwrap_or_default(),
            severity,
            persistent: self
                .current
                .as_ref()
                .map(|n| n.persistent)
                .unwrap_or_default(),
            color: severity.unwrap_or(Severity::Error).color(),
        }
    }

    // Clearing is idempotent; both the dismiss and auto-hide paths end here.
    fn clear(&mut self) {
        self.current = None;
        self.state = BannerState::Hidden;
    }

    fn schedule(&mut self, after: Duration, step: Step) -> Timer {
        self.intent += 1;
        Timer {
            intent: self.intent,
            after,
            step,
        }
    }

    // Re-targets from wherever the banner currently is.
    fn animate_to(
        &mut self,
        to: AnimatedPosition,
        delay: Duration,
        duration: Duration,
        now: Instant,
    ) {
        let from = self.position(now);
        self.animation = Some((Animation::new(from, to, duration).with_delay(delay), now));
    }

    fn settle(&mut self, now: Instant) {
        self.rest = self.position(now);
        if let Some((animation, started)) = &self.animation {
            if now.saturating_duration_since(*started) >= animation.total() {
                self.rest = animation.target();
                self.animation = None;
            }
        }
    }
}
