use tokio::time::Instant;

use crate::error::Error;
use crate::notification::{Completion, Notification, NotificationController, Severity, Timer};
use crate::roster::PeerRoster;
use crate::session::{CallSession, SessionEvent, SessionFault};
use crate::utils::{dev_log, truncate, MAX_MESSAGE_LEN};

use super::boundary::FaultBoundary;
use super::view::{Control, RemoteStrip, ScreenBody, ScreenView, VideoArea};

/// Everything the screen owns, mutated only from the screen's event loop
#[derive(Debug)]
pub struct ScreenState {
    channel: String,
    roster: PeerRoster,
    notifications: NotificationController,
    boundary: FaultBoundary,
}

impl ScreenState {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            roster: PeerRoster::new(),
            notifications: NotificationController::new(),
            boundary: FaultBoundary::new(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn roster(&self) -> &PeerRoster {
        &self.roster
    }

    pub fn notifications(&self) -> &NotificationController {
        &self.notifications
    }

    pub fn boundary(&self) -> &FaultBoundary {
        &self.boundary
    }

    /// Applies a collaborator event. Returns a timer when a notification was shown.
    pub fn handle_event(&mut self, event: &SessionEvent, now: Instant) -> Option<Timer> {
        match event {
            SessionEvent::Warning(fault) => Some(self.report_fault(Severity::Warning, fault, now)),
            SessionEvent::Error(fault) => Some(self.report_fault(Severity::Error, fault, now)),
            SessionEvent::UserJoined { uid, elapsed } => {
                tracing::info!(%uid, elapsed, "UserJoined");
                if !self.roster.on_user_joined(*uid) {
                    tracing::debug!(%uid, "peer already in roster");
                }
                None
            }
            SessionEvent::UserOffline { uid, reason } => {
                tracing::info!(%uid, %reason, "UserOffline");
                if !self.roster.on_user_offline(*uid) {
                    tracing::debug!(%uid, "peer was not in roster");
                }
                None
            }
            SessionEvent::JoinChannelSuccess {
                channel,
                uid,
                elapsed,
            } => {
                tracing::info!(%channel, uid, elapsed, "JoinChannelSuccess");
                self.roster.on_local_join_success();
                None
            }
        }
    }

    /// Shows `message` as a non-persistent notification after truncating and logging it
    pub fn report(&mut self, severity: Severity, message: &str, now: Instant) -> Timer {
        let body = truncate(message, MAX_MESSAGE_LEN);
        dev_log(severity, &body);
        self.notifications
            .show(Notification::from_severity(severity, body), now)
    }

    pub fn notify(&mut self, notification: Notification, now: Instant) -> Timer {
        self.notifications.show(notification, now)
    }

    pub fn dismiss(&mut self, now: Instant) -> Timer {
        self.notifications.dismiss(now)
    }

    pub fn complete(&mut self, timer: Timer, now: Instant) -> Completion {
        self.notifications.complete(timer, now)
    }

    /// Local participant ended the call
    pub fn end_call(&mut self) {
        self.roster.on_call_ended();
    }

    /// Clears a caught rendering fault. Roster and notification are left as they are.
    pub fn reset_boundary(&mut self) -> bool {
        self.boundary.reset()
    }

    /// Builds the video area from the roster. `None` while not joined.
    pub fn compose(&self, session: Option<&dyn CallSession>) -> Result<Option<VideoArea>, Error> {
        if !self.roster.joined() {
            return Ok(None);
        }
        let session = session.ok_or(Error::SessionNotInitialized)?;
        let local = session.local_surface(&self.channel)?;
        let surfaces = self
            .roster
            .peers()
            .iter()
            .map(|peer| session.remote_surface(*peer, &self.channel))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(VideoArea {
            local,
            remote: RemoteStrip {
                horizontal: true,
                surfaces,
            },
        }))
    }

    /// Renders the screen inside the fault boundary. A composition failure trips the
    /// boundary and is reported as an error notification, whose timer is returned.
    pub fn render(
        &mut self,
        session: Option<&dyn CallSession>,
        now: Instant,
    ) -> (ScreenView, Option<Timer>) {
        let mut timer = None;
        if !self.boundary.is_tripped() {
            match self.compose(session) {
                Ok(video) => {
                    let body = ScreenBody::Content {
                        controls: vec![Control::StartCall, Control::EndCall],
                        video,
                    };
                    return (self.view(body, now), None);
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::debug!("render fault caught: {message}");
                    timer = Some(self.report(Severity::Error, &message, now));
                    self.boundary.catch(message);
                }
            }
        }

        let body = ScreenBody::Fallback {
            title: "Oh no".into(),
            message: self.boundary.fault().unwrap_or_default().to_string(),
            action: Control::TryAgain,
        };
        (self.view(body, now), timer)
    }

    fn report_fault(&mut self, severity: Severity, fault: &SessionFault, now: Instant) -> Timer {
        let payload = serde_json::to_string(fault).unwrap_or_else(|_| fault.code.to_string());
        self.report(severity, &payload, now)
    }

    fn view(&self, body: ScreenBody, now: Instant) -> ScreenView {
        ScreenView {
            banner: self.notifications.view(now),
            body,
        }
    }
}

#[cfg(test)]
mod test {
    use async_trait::async_trait;

    use super::*;
    use crate::listeners::Listener;
    use crate::notification::BannerState;
    use crate::session::{PeerId, SessionEventKind, VideoSurface};

    #[derive(Default)]
    struct Surfaces {
        failing_peer: Option<PeerId>,
        local_fault: Option<String>,
    }

    #[async_trait]
    impl CallSession for Surfaces {
        async fn enable_video(&mut self) -> Result<(), Error> {
            Ok(())
        }

        fn add_listener(&mut self, _: SessionEventKind, _: Listener) -> Result<(), Error> {
            Ok(())
        }

        async fn join_channel(
            &mut self,
            _: Option<&str>,
            _: &str,
            _: Option<&str>,
            _: u32,
        ) -> Result<(), Error> {
            Ok(())
        }

        async fn leave_channel(&mut self) -> Result<(), Error> {
            Ok(())
        }

        fn local_surface(&self, channel: &str) -> Result<VideoSurface, Error> {
            if let Some(reason) = &self.local_fault {
                return Err(Error::LocalSurfaceUnavailable(reason.clone()));
            }
            Ok(VideoSurface::local(channel))
        }

        fn remote_surface(&self, peer: PeerId, channel: &str) -> Result<VideoSurface, Error> {
            if self.failing_peer == Some(peer) {
                return Err(Error::RemoteSurfaceUnavailable { peer });
            }
            Ok(VideoSurface::remote(peer, channel))
        }
    }

    fn joined(uid: u32) -> SessionEvent {
        SessionEvent::UserJoined {
            uid: PeerId::new(uid),
            elapsed: 0,
        }
    }

    fn join_success() -> SessionEvent {
        SessionEvent::JoinChannelSuccess {
            channel: "lobby".into(),
            uid: 0,
            elapsed: 5,
        }
    }

    #[test]
    fn renders_nothing_until_joined() {
        let now = Instant::now();
        let session = Surfaces::default();
        let mut state = ScreenState::new("lobby");
        state.handle_event(&joined(3), now);

        let (view, timer) = state.render(Some(&session), now);
        assert!(timer.is_none());
        assert_eq!(view.body.video(), None);
        assert!(!view.body.is_fallback());
    }

    #[test]
    fn renders_remote_surfaces_in_roster_order() {
        let now = Instant::now();
        let session = Surfaces::default();
        let mut state = ScreenState::new("lobby");
        state.handle_event(&join_success(), now);
        for uid in [9, 4, 9, 6] {
            state.handle_event(&joined(uid), now);
        }

        let (view, _) = state.render(Some(&session), now);
        let video = view.body.video().cloned();
        let video = video.expect("joined screen renders video");
        assert!(video.local.is_local());
        assert_eq!(video.local.channel, "lobby");
        assert!(video.remote.horizontal);
        let peers: Vec<_> = video
            .remote
            .surfaces
            .iter()
            .filter_map(|s| s.peer.map(|p| p.as_u32()))
            .collect();
        assert_eq!(peers, vec![9, 4, 6]);
        assert_eq!(video.surface_count(), 4);
    }

    #[test]
    fn end_call_reverts_to_nothing() {
        let now = Instant::now();
        let session = Surfaces::default();
        let mut state = ScreenState::new("lobby");
        state.handle_event(&join_success(), now);
        state.handle_event(&joined(1), now);

        state.end_call();
        let (view, _) = state.render(Some(&session), now);
        assert_eq!(view.body.video(), None);
        assert!(state.roster().is_empty());
    }

    #[test]
    fn collaborator_error_is_truncated() {
        let now = Instant::now();
        let mut state = ScreenState::new("lobby");
        let fault = SessionFault::with_message(17, "e".repeat(300));
        let payload = serde_json::to_string(&fault).expect("serializable");

        let timer = state.handle_event(&SessionEvent::Error(fault), now);
        assert!(timer.is_some());

        let current = state.notifications().current().cloned();
        let current = current.expect("notification shown");
        assert_eq!(current.header, "Error");
        assert_eq!(current.severity, Severity::Error);
        assert!(!current.persistent);
        assert_eq!(current.body.chars().count(), 200);
        assert_eq!(current.body, payload[..200]);
    }

    #[test]
    fn warning_payload_is_json() {
        let now = Instant::now();
        let mut state = ScreenState::new("lobby");
        state.handle_event(&SessionEvent::Warning(SessionFault::new(104)), now);

        let view = state.notifications().view(now);
        assert_eq!(view.header, "Warning");
        assert_eq!(view.body, r#"{"code":104}"#);
        assert_eq!(view.color, "gold");
    }

    #[test]
    fn render_fault_trips_boundary_until_reset() {
        let now = Instant::now();
        let mut session = Surfaces {
            failing_peer: Some(PeerId::new(2)),
            ..Default::default()
        };
        let mut state = ScreenState::new("lobby");
        state.handle_event(&join_success(), now);
        state.handle_event(&joined(2), now);

        let (view, timer) = state.render(Some(&session), now);
        assert!(timer.is_some());
        match &view.body {
            ScreenBody::Fallback {
                title,
                message,
                action,
            } => {
                assert_eq!(title, "Oh no");
                assert_eq!(message, "Remote video surface unavailable for peer 2");
                assert_eq!(action.label(), "Try again");
            }
            other => panic!("expected fallback, got {other:?}"),
        }
        assert!(view.banner.visible);
        assert_eq!(view.banner.header, "Error");
        assert!(!view.banner.persistent);

        // still tripped even though the surface would now succeed
        session.failing_peer = None;
        let (view, timer) = state.render(Some(&session), now);
        assert!(view.body.is_fallback());
        assert!(timer.is_none());

        assert!(state.reset_boundary());
        assert!(state.roster().joined());
        assert_eq!(state.roster().len(), 1);
        assert_eq!(state.notifications().state(), BannerState::Visible);

        let (view, _) = state.render(Some(&session), now);
        assert_eq!(view.body.video().map(VideoArea::surface_count), Some(2));
    }

    #[test]
    fn long_render_fault_is_truncated() {
        let now = Instant::now();
        let session = Surfaces {
            local_fault: Some("c".repeat(300)),
            ..Default::default()
        };
        let mut state = ScreenState::new("lobby");
        state.handle_event(&join_success(), now);

        let (view, timer) = state.render(Some(&session), now);
        assert!(timer.is_some());
        assert!(view.body.is_fallback());
        assert_eq!(view.banner.header, "Error");
        assert_eq!(view.banner.body.chars().count(), 200);
        assert!(view
            .banner
            .body
            .starts_with("Local video surface unavailable: ccc"));
    }

    #[test]
    fn joined_without_session_is_a_render_fault() {
        let now = Instant::now();
        let mut state = ScreenState::new("lobby");
        state.handle_event(&join_success(), now);

        let (view, _) = state.render(None, now);
        assert!(view.body.is_fallback());
        assert!(state.boundary().is_tripped());
    }
}
