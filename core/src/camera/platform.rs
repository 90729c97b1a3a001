use async_trait::async_trait;
use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
    /// The platform cannot be asked without prompting the user.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    User,
    Environment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoConstraints {
    pub facing: Option<Facing>,
    pub ideal_width: Option<u32>,
    pub ideal_height: Option<u32>,
}

impl VideoConstraints {
    /// Rear camera at 1080p, what route photos want.
    pub fn preferred() -> Self {
        Self {
            facing: Some(Facing::Environment),
            ideal_width: Some(1920),
            ideal_height: Some(1080),
        }
    }

    /// Any camera at any resolution.
    pub fn relaxed() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFamily {
    Ios,
    Android,
    Desktop,
    Unknown,
}

impl DeviceFamily {
    /// Best-effort guess from a browser user agent.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let agent = user_agent.to_ascii_lowercase();
        if agent.contains("iphone") || agent.contains("ipad") || agent.contains("ipod") {
            DeviceFamily::Ios
        } else if agent.contains("android") {
            DeviceFamily::Android
        } else if agent.contains("windows") || agent.contains("macintosh") || agent.contains("linux")
        {
            DeviceFamily::Desktop
        } else {
            DeviceFamily::Unknown
        }
    }

    pub fn is_mobile(self) -> bool {
        matches!(self, DeviceFamily::Ios | DeviceFamily::Android)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireErrorKind {
    NotAllowed,
    NotFound,
    NotReadable,
    Overconstrained,
    Other,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{kind:?}: {message}")]
pub struct AcquireError {
    pub kind: AcquireErrorKind,
    pub message: String,
}

impl AcquireError {
    pub fn new(kind: AcquireErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDevice {
    pub id: String,
    pub label: String,
}

/// A live camera stream owned by the helper.
pub trait MediaStream: Send {
    /// Stops every hardware track. Must tolerate repeated calls.
    fn stop(&mut self);
    fn is_live(&self) -> bool;
}

/// Presentation surface a stream plays into, e.g. a video element.
pub trait VideoSurface: Send {
    fn bind(&mut self, stream: &dyn MediaStream) -> Result<(), AcquireError>;
    fn play(&mut self) -> Result<(), AcquireError>;
    /// Native frame size of the bound stream, once known.
    fn native_size(&self) -> Option<(u32, u32)>;
    /// Draws the current frame into `canvas`; false when nothing was drawn.
    fn draw_into(&self, canvas: &mut RgbaImage) -> bool;
    fn unbind(&mut self);
}

#[async_trait]
pub trait CameraPlatform: Send + Sync {
    /// `None` when the platform has no permissions query.
    async fn query_permission(&self) -> Option<PermissionState>;
    async fn open_stream(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, AcquireError>;
    async fn video_inputs(&self) -> Result<Vec<VideoDevice>, AcquireError>;
    fn device_family(&self) -> DeviceFamily;
}
