use serde::Serialize;

use crate::notification::BannerView;
use crate::session::VideoSurface;

/// What the platform UI layer draws
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenView {
    pub banner: BannerView,
    pub body: ScreenBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScreenBody {
    Content {
        controls: Vec<Control>,
        /// `None` while not joined to a channel
        video: Option<VideoArea>,
    },
    /// Shown in place of the content while the fault boundary holds a fault
    Fallback {
        title: String,
        message: String,
        action: Control,
    },
}

impl ScreenBody {
    pub fn video(&self) -> Option<&VideoArea> {
        match self {
            ScreenBody::Content { video, .. } => video.as_ref(),
            ScreenBody::Fallback { .. } => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ScreenBody::Fallback { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Control {
    StartCall,
    EndCall,
    TryAgain,
}

impl Control {
    pub fn label(&self) -> &'static str {
        match self {
            Control::StartCall => "Start Call",
            Control::EndCall => "End Call",
            Control::TryAgain => "Try again",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoArea {
    pub local: VideoSurface,
    pub remote: RemoteStrip,
}

impl VideoArea {
    /// Number of surfaces drawn, local included
    pub fn surface_count(&self) -> usize {
        1 + self.remote.surfaces.len()
    }
}

/// Scrolling row of remote surfaces in roster order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteStrip {
    pub horizontal: bool,
    pub surfaces: Vec<VideoSurface>,
}
