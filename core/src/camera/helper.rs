use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};

use crate::camera::platform::{
    AcquireError, AcquireErrorKind, CameraPlatform, MediaStream, PermissionState,
    VideoConstraints, VideoSurface,
};
use crate::telemetry::log::LogManager;

const JPEG_QUALITY: u8 = 90;

/// Result of [`CameraHelper::request_access`]. Acquisition never errors.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessOutcome {
    pub granted: bool,
    /// Access was refused in a way only the OS settings can undo.
    pub requires_platform_settings: bool,
    pub error: Option<AcquireError>,
}

impl AccessOutcome {
    fn granted() -> Self {
        Self {
            granted: true,
            requires_platform_settings: false,
            error: None,
        }
    }
}

/// Set while an access request is in flight. Clones share one flag, so it
/// can be watched from outside the borrow `request_access` holds.
#[derive(Debug, Clone, Default)]
pub struct InitializingFlag(Arc<AtomicBool>);

impl InitializingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn raise(&self) -> InitializingGuard {
        self.0.store(true, Ordering::Release);
        InitializingGuard(self.clone())
    }
}

/// Lowers the flag when dropped, including when the request is cancelled.
struct InitializingGuard(InitializingFlag);

impl Drop for InitializingGuard {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::Release);
    }
}

/// Owns at most one live stream and the surface it plays into.
pub struct CameraHelper<P> {
    platform: P,
    stream: Option<Box<dyn MediaStream>>,
    surface: Option<Box<dyn VideoSurface>>,
    initializing: InitializingFlag,
    logger: LogManager,
}

impl<P: CameraPlatform> CameraHelper<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            stream: None,
            surface: None,
            initializing: InitializingFlag::default(),
            logger: LogManager::new("camera"),
        }
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing.is_set()
    }

    pub fn initializing_flag(&self) -> InitializingFlag {
        self.initializing.clone()
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub async fn check_permission(&self) -> PermissionState {
        self.platform
            .query_permission()
            .await
            .unwrap_or(PermissionState::Unknown)
    }

    /// Opens the rear camera, falling back to any camera.
    pub async fn request_access(&mut self) -> AccessOutcome {
        self.release();
        let initializing = self.initializing.raise();

        let preferred = VideoConstraints::preferred();
        let outcome = match self.platform.open_stream(&preferred).await {
            Ok(stream) => Ok(stream),
            Err(err) => {
                self.logger.warn(&format!(
                    "preferred camera constraints failed ({err}), retrying relaxed"
                ));
                self.platform
                    .open_stream(&VideoConstraints::relaxed())
                    .await
            }
        };

        drop(initializing);
        match outcome {
            Ok(stream) => {
                self.stream = Some(stream);
                self.logger.record("camera stream acquired");
                AccessOutcome::granted()
            }
            Err(err) => {
                let requires_platform_settings = self.platform.device_family().is_mobile()
                    && err.kind == AcquireErrorKind::NotAllowed;
                self.logger.warn(&format!(
                    "camera unavailable: {err} (platform settings required: {requires_platform_settings})"
                ));
                AccessOutcome {
                    granted: false,
                    requires_platform_settings,
                    error: Some(err),
                }
            }
        }
    }

    /// Binds the live stream to `surface` and starts playback.
    pub fn attach(&mut self, mut surface: Box<dyn VideoSurface>) {
        let Some(stream) = self.stream.as_deref() else {
            return;
        };
        if let Err(err) = surface.bind(stream).and_then(|_| surface.play()) {
            self.logger.warn(&format!("surface playback failed: {err}"));
            surface.unbind();
            return;
        }
        self.surface = Some(surface);
    }

    /// JPEG of the current frame at the stream's native size.
    pub fn capture_frame(&self) -> Option<Vec<u8>> {
        let surface = self.surface.as_ref()?;
        let (width, height) = surface.native_size()?;
        if width == 0 || height == 0 {
            return None;
        }

        let mut canvas = RgbaImage::new(width, height);
        if !surface.draw_into(&mut canvas) {
            return None;
        }

        let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
        let mut encoded = Vec::new();
        let result = JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY).encode_image(&rgb);
        match result {
            Ok(()) => Some(encoded),
            Err(err) => {
                self.logger.warn(&format!("frame encoding failed: {err}"));
                None
            }
        }
    }

    /// Stops the hardware and detaches the surface. Safe to repeat.
    pub fn release(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.unbind();
        }
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            self.logger.record("camera stream released");
        }
    }

    /// Re-acquires the camera when more than one video input exists.
    ///
    /// Returns `None` when there is nothing to switch to. The platform picks
    /// the device; no specific input is requested.
    pub async fn switch_camera(&mut self) -> Option<AccessOutcome> {
        let inputs = match self.platform.video_inputs().await {
            Ok(inputs) => inputs,
            Err(err) => {
                self.logger.warn(&format!("device enumeration failed: {err}"));
                return None;
            }
        };
        if inputs.len() <= 1 {
            return None;
        }
        self.release();
        Some(self.request_access().await)
    }
}

impl<P> Drop for CameraHelper<P> {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}
