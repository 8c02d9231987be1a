//! Errors raised by the call screen, its collaborator session and utilities.
use thiserror::Error;

use crate::session::PeerId;

#[derive(Error, Debug)]
pub enum Error {
    //Session Errors
    #[error("Call session has not been initialized")]
    SessionNotInitialized,
    #[error("Call session could not be created: {_0}")]
    SessionCreateFailed(String),
    #[error("Unable to join channel: {_0}")]
    JoinFailed(String),
    #[error("Unable to leave channel: {_0}")]
    LeaveFailed(String),
    #[error("Video could not be enabled")]
    VideoUnavailable,

    //Rendering Errors
    #[error("Local video surface unavailable: {_0}")]
    LocalSurfaceUnavailable(String),
    #[error("Remote video surface unavailable for peer {peer}")]
    RemoteSurfaceUnavailable { peer: PeerId },

    //Configuration Errors
    #[error("Missing configuration value: {_0}")]
    MissingConfig(String),
    #[error("Configuration value for '{key}' is invalid: {reason}")]
    InvalidConfig { key: String, reason: String },

    //Platform Errors
    #[error("Camera or microphone permission was denied")]
    PermissionDenied,

    //Misc
    #[error("Sender Channel Unavailable")]
    SenderChannelUnavailable,
    #[error("Receiver Channel Unavailable")]
    ReceiverChannelUnavailable,
}
