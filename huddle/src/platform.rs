use async_trait::async_trait;
use derive_more::Display;
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::sync::Arc;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    #[display(fmt = "android")]
    Android,
    #[display(fmt = "ios")]
    Ios,
    #[display(fmt = "desktop")]
    Desktop,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Desktop
        }
    }

    /// Whether camera and microphone access must be requested at runtime before a call
    pub fn requires_media_permission(&self) -> bool {
        matches!(self, Platform::Android)
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    #[display(fmt = "granted")]
    Granted,
    #[display(fmt = "denied")]
    Denied,
}

/// Asks the platform for camera and microphone access
#[async_trait]
pub trait MediaPermissions: Send + Sync {
    async fn request(&self) -> Result<PermissionStatus, Error>;
}

/// Requests camera and microphone access, treating a refusal as [`Error::PermissionDenied`]
pub async fn request_media_access(permissions: &dyn MediaPermissions) -> Result<(), Error> {
    match permissions.request().await? {
        PermissionStatus::Granted => Ok(()),
        PermissionStatus::Denied => Err(Error::PermissionDenied),
    }
}

/// Fires the permission request on platforms that need it. Nothing waits on the outcome.
pub fn request_in_background(
    platform: Platform,
    permissions: Arc<dyn MediaPermissions>,
) -> Option<JoinHandle<()>> {
    if !platform.requires_media_permission() {
        return None;
    }
    Some(tokio::spawn(async move {
        match request_media_access(permissions.as_ref()).await {
            Ok(()) => tracing::info!(%platform, "media permissions granted"),
            Err(e) => tracing::warn!(%platform, "media permission request failed: {e}"),
        }
    }))
}
