//! Session describes the real-time-communication collaborator the call screen is built on.
//! The collaborator owns everything media related:
//! - connecting to the channel service
//! - capturing, encoding, and sending audio/video
//! - receiving, decoding, and presenting remote audio/video
//! - producing the video surfaces placed on-screen
//!
//! The screen only drives its control surface and reacts to the events it emits.
use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{error::Error, listeners::Listener};

/// Identifies a remote participant for the lifetime of their connection.
/// Assigned by the collaborator and unique within the active channel.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PeerId(u32);

impl PeerId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for PeerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Creates collaborator instances. Mirrors the SDK's `create(appId)` entry point.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self, app_id: &str) -> Result<Box<dyn CallSession>, Error>;
}

/// Control surface of the collaborator SDK consumed by the screen
#[async_trait]
pub trait CallSession: Send + Sync {
    // ------ Setup ------

    /// Enables the video module. Surfaces are only available once video is enabled.
    async fn enable_video(&mut self) -> Result<(), Error>;

    /// Registers `listener` for every event of `kind`. Listeners are invoked
    /// in registration order and stay registered for the life of the session.
    fn add_listener(&mut self, kind: SessionEventKind, listener: Listener) -> Result<(), Error>;

    // ------ Channel membership ------

    /// Requests to join `channel`. Returning `Ok` only means the request was accepted;
    /// membership is confirmed later through [`SessionEvent::JoinChannelSuccess`].
    async fn join_channel(
        &mut self,
        token: Option<&str>,
        channel: &str,
        info: Option<&str>,
        local_uid: u32,
    ) -> Result<(), Error>;

    /// Requests to leave the current channel
    async fn leave_channel(&mut self) -> Result<(), Error>;

    // ------ Surfaces ------

    /// Surface showing the local camera, bound to `channel`
    fn local_surface(&self, channel: &str) -> Result<VideoSurface, Error>;

    /// Surface showing `peer`'s video in `channel`
    fn remote_surface(&self, peer: PeerId, channel: &str) -> Result<VideoSurface, Error>;
}

/// Names of the events a session emits. Used as listener keys.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionEventKind {
    #[display(fmt = "Warning")]
    Warning,
    #[display(fmt = "Error")]
    Error,
    #[display(fmt = "UserJoined")]
    UserJoined,
    #[display(fmt = "UserOffline")]
    UserOffline,
    #[display(fmt = "JoinChannelSuccess")]
    JoinChannelSuccess,
}

impl SessionEventKind {
    pub const ALL: [SessionEventKind; 5] = [
        SessionEventKind::Warning,
        SessionEventKind::Error,
        SessionEventKind::UserJoined,
        SessionEventKind::UserOffline,
        SessionEventKind::JoinChannelSuccess,
    ];
}

/// Payload of a `Warning` or `Error` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFault {
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SessionFault {
    pub fn new(code: i32) -> Self {
        Self {
            code,
            message: None,
        }
    }

    pub fn with_message(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }
}

/// Why a remote participant went offline
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfflineReason {
    /// The participant left the channel
    #[display(fmt = "Quit")]
    Quit,
    /// No data was received from the participant for too long
    #[display(fmt = "Dropped")]
    Dropped,
    /// The participant switched to the audience role
    #[display(fmt = "BecomeAudience")]
    BecomeAudience,
    #[display(fmt = "Unknown({_0})")]
    Unknown(u32),
}

impl From<u32> for OfflineReason {
    fn from(code: u32) -> Self {
        match code {
            0 => OfflineReason::Quit,
            1 => OfflineReason::Dropped,
            2 => OfflineReason::BecomeAudience,
            other => OfflineReason::Unknown(other),
        }
    }
}

/// Drives the screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Non-fatal condition reported by the collaborator
    Warning(SessionFault),
    /// Failure reported by the collaborator. Never halts the session.
    Error(SessionFault),
    /// A remote participant joined the channel
    UserJoined { uid: PeerId, elapsed: u64 },
    /// A remote participant left the channel or dropped
    UserOffline { uid: PeerId, reason: OfflineReason },
    /// The local participant is now a member of `channel`
    JoinChannelSuccess {
        channel: String,
        uid: u32,
        elapsed: u64,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> SessionEventKind {
        match self {
            SessionEvent::Warning(_) => SessionEventKind::Warning,
            SessionEvent::Error(_) => SessionEventKind::Error,
            SessionEvent::UserJoined { .. } => SessionEventKind::UserJoined,
            SessionEvent::UserOffline { .. } => SessionEventKind::UserOffline,
            SessionEvent::JoinChannelSuccess { .. } => SessionEventKind::JoinChannelSuccess,
        }
    }
}

/// How a surface scales video into its bounds
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Fill the bounds, cropping overflow
    #[default]
    #[display(fmt = "hidden")]
    Hidden,
}

/// A platform video view produced by the collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSurface {
    pub channel: String,
    /// `None` for the local camera
    pub peer: Option<PeerId>,
    pub render_mode: RenderMode,
    /// Draw above other media surfaces
    pub z_order_media_overlay: bool,
}

impl VideoSurface {
    pub fn local(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            peer: None,
            render_mode: RenderMode::Hidden,
            z_order_media_overlay: false,
        }
    }

    pub fn remote(peer: PeerId, channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            peer: Some(peer),
            render_mode: RenderMode::Hidden,
            z_order_media_overlay: true,
        }
    }

    pub fn is_local(&self) -> bool {
        self.peer.is_none()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn event_kind_matches_variant() {
        let event = SessionEvent::UserJoined {
            uid: PeerId::new(7),
            elapsed: 12,
        };
        assert_eq!(event.kind(), SessionEventKind::UserJoined);
        assert_eq!(event.kind().to_string(), "UserJoined");
    }

    #[test]
    fn offline_reason_from_code() {
        assert_eq!(OfflineReason::from(0), OfflineReason::Quit);
        assert_eq!(OfflineReason::from(1), OfflineReason::Dropped);
        assert_eq!(OfflineReason::from(2), OfflineReason::BecomeAudience);
        assert_eq!(OfflineReason::from(9), OfflineReason::Unknown(9));
        assert_eq!(OfflineReason::Unknown(9).to_string(), "Unknown(9)");
    }

    #[test]
    fn fault_serializes_without_empty_message() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&SessionFault::new(104))?, r#"{"code":104}"#);
        assert_eq!(
            serde_json::to_string(&SessionFault::with_message(17, "no"))?,
            r#"{"code":17,"message":"no"}"#
        );
        Ok(())
    }

    #[test]
    fn remote_surface_is_tagged() {
        let surface = VideoSurface::remote(PeerId::new(3), "lobby");
        assert_eq!(surface.peer, Some(PeerId::new(3)));
        assert_eq!(surface.channel, "lobby");
        assert!(surface.z_order_media_overlay);
        assert!(!surface.is_local());
        assert!(VideoSurface::local("lobby").is_local());
    }
}
