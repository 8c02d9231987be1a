//! In-memory call session.
//!
//! Implements the collaborator contract without any media or network. Channel
//! membership is confirmed immediately, and remote participants, warnings and
//! errors are injected through a [`LoopbackRemote`] handle.
use std::collections::HashSet;
use std::time::Instant;

use async_trait::async_trait;
use huddle::{
    error::Error,
    listeners::{Listener, Listeners},
    session::{
        CallSession, OfflineReason, PeerId, SessionEvent, SessionEventKind, SessionFactory,
        SessionFault, VideoSurface,
    },
    sync::{Arc, RwLock},
    Extension,
};

/// Reported through an `Error` event when a leave request is rejected
pub const ERR_LEAVE_CHANNEL_REJECTED: i32 = 18;
/// Reported through an `Error` event when a join request is rejected
pub const ERR_JOIN_CHANNEL_REJECTED: i32 = 17;

/// Local uid handed out when the caller asks the session to pick one
const FIRST_ASSIGNED_UID: u32 = 1000;

#[derive(Debug)]
struct Inner {
    app_id: Option<String>,
    created: Instant,
    video_enabled: bool,
    channel: Option<String>,
    local_uid: Option<u32>,
    token: Option<String>,
    sessions_created: usize,
    fail_create: bool,
    fail_join: bool,
    fail_leave: bool,
    fail_local_surface: bool,
    failing_peers: HashSet<PeerId>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            app_id: None,
            created: Instant::now(),
            video_enabled: false,
            channel: None,
            local_uid: None,
            token: None,
            sessions_created: 0,
            fail_create: false,
            fail_join: false,
            fail_leave: false,
            fail_local_surface: false,
            failing_peers: HashSet::new(),
        }
    }
}

impl Inner {
    fn elapsed_ms(&self) -> u64 {
        self.created.elapsed().as_millis() as u64
    }
}

/// Creates [`LoopbackSession`]s that all share one [`LoopbackRemote`]
#[derive(Clone, Default)]
pub struct LoopbackFactory {
    remote: LoopbackRemote,
}

impl LoopbackFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for driving the sessions this factory creates
    pub fn remote(&self) -> LoopbackRemote {
        self.remote.clone()
    }
}

#[async_trait]
impl SessionFactory for LoopbackFactory {
    async fn create(&self, app_id: &str) -> Result<Box<dyn CallSession>, Error> {
        {
            let mut inner = self.remote.inner.write();
            if inner.fail_create {
                return Err(Error::SessionCreateFailed(format!(
                    "app id {app_id} was rejected"
                )));
            }
            inner.app_id = Some(app_id.to_string());
            inner.sessions_created += 1;
        }
        tracing::trace!(app_id, "loopback session created");
        Ok(Box::new(LoopbackSession {
            inner: self.remote.inner.clone(),
            listeners: self.remote.listeners.clone(),
        }))
    }
}

pub struct LoopbackSession {
    inner: Arc<RwLock<Inner>>,
    listeners: Listeners,
}

impl Extension for LoopbackSession {
    fn id(&self) -> String {
        String::from("huddle-loopback")
    }

    fn name(&self) -> String {
        String::from("Loopback Call Session")
    }
}

#[async_trait]
impl CallSession for LoopbackSession {
    async fn enable_video(&mut self) -> Result<(), Error> {
        self.inner.write().video_enabled = true;
        Ok(())
    }

    fn add_listener(&mut self, kind: SessionEventKind, listener: Listener) -> Result<(), Error> {
        self.listeners.subscribe_boxed(kind, listener);
        Ok(())
    }

    async fn join_channel(
        &mut self,
        token: Option<&str>,
        channel: &str,
        _info: Option<&str>,
        local_uid: u32,
    ) -> Result<(), Error> {
        let event = {
            let mut inner = self.inner.write();
            if inner.fail_join {
                drop(inner);
                self.listeners.trigger(&SessionEvent::Error(SessionFault::with_message(
                    ERR_JOIN_CHANNEL_REJECTED,
                    "join channel rejected",
                )));
                return Err(Error::JoinFailed(channel.to_string()));
            }
            let uid = match local_uid {
                0 => FIRST_ASSIGNED_UID + inner.sessions_created as u32,
                uid => uid,
            };
            inner.channel = Some(channel.to_string());
            inner.local_uid = Some(uid);
            inner.token = token.map(str::to_string);
            SessionEvent::JoinChannelSuccess {
                channel: channel.to_string(),
                uid,
                elapsed: inner.elapsed_ms(),
            }
        };
        self.listeners.trigger(&event);
        Ok(())
    }

    async fn leave_channel(&mut self) -> Result<(), Error> {
        let rejected = {
            let mut inner = self.inner.write();
            if inner.fail_leave {
                true
            } else {
                inner.channel = None;
                inner.local_uid = None;
                false
            }
        };
        if rejected {
            self.listeners.trigger(&SessionEvent::Error(SessionFault::with_message(
                ERR_LEAVE_CHANNEL_REJECTED,
                "leave channel rejected",
            )));
            return Err(Error::LeaveFailed("rejected by loopback".into()));
        }
        Ok(())
    }

    fn local_surface(&self, channel: &str) -> Result<VideoSurface, Error> {
        let inner = self.inner.read();
        if !inner.video_enabled {
            return Err(Error::VideoUnavailable);
        }
        if inner.fail_local_surface {
            return Err(Error::LocalSurfaceUnavailable("camera is busy".into()));
        }
        Ok(VideoSurface::local(channel))
    }

    fn remote_surface(&self, peer: PeerId, channel: &str) -> Result<VideoSurface, Error> {
        let inner = self.inner.read();
        if !inner.video_enabled {
            return Err(Error::VideoUnavailable);
        }
        if inner.failing_peers.contains(&peer) {
            return Err(Error::RemoteSurfaceUnavailable { peer });
        }
        Ok(VideoSurface::remote(peer, channel))
    }
}

/// Plays the part of the remote service: emits events and injects failures
#[derive(Clone, Default)]
pub struct LoopbackRemote {
    inner: Arc<RwLock<Inner>>,
    listeners: Listeners,
}

impl LoopbackRemote {
    pub fn user_joined(&self, uid: u32) -> usize {
        let elapsed = self.inner.read().elapsed_ms();
        self.emit(SessionEvent::UserJoined {
            uid: PeerId::new(uid),
            elapsed,
        })
    }

    pub fn user_offline(&self, uid: u32, reason: OfflineReason) -> usize {
        self.emit(SessionEvent::UserOffline {
            uid: PeerId::new(uid),
            reason,
        })
    }

    pub fn warning(&self, fault: SessionFault) -> usize {
        self.emit(SessionEvent::Warning(fault))
    }

    pub fn error(&self, fault: SessionFault) -> usize {
        self.emit(SessionEvent::Error(fault))
    }

    /// Delivers `event` to its listeners, returning how many were called
    pub fn emit(&self, event: SessionEvent) -> usize {
        self.listeners.trigger(&event)
    }

    /// Delivers `event` under the name `kind`, as a misbehaving service might
    pub fn emit_as(&self, kind: SessionEventKind, event: SessionEvent) -> usize {
        self.listeners.trigger_as(kind, &event)
    }

    pub fn fail_create(&self, fail: bool) {
        self.inner.write().fail_create = fail;
    }

    pub fn fail_join(&self, fail: bool) {
        self.inner.write().fail_join = fail;
    }

    pub fn fail_leave(&self, fail: bool) {
        self.inner.write().fail_leave = fail;
    }

    pub fn fail_local_surface(&self, fail: bool) {
        self.inner.write().fail_local_surface = fail;
    }

    pub fn fail_remote_surface(&self, peer: u32, fail: bool) {
        let mut inner = self.inner.write();
        match fail {
            true => inner.failing_peers.insert(PeerId::new(peer)),
            false => inner.failing_peers.remove(&PeerId::new(peer)),
        };
    }

    pub fn app_id(&self) -> Option<String> {
        self.inner.read().app_id.clone()
    }

    pub fn channel(&self) -> Option<String> {
        self.inner.read().channel.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().token.clone()
    }

    pub fn local_uid(&self) -> Option<u32> {
        self.inner.read().local_uid
    }

    pub fn video_enabled(&self) -> bool {
        self.inner.read().video_enabled
    }

    pub fn listener_count(&self, kind: SessionEventKind) -> usize {
        self.listeners.count(kind)
    }
}
