//! Camera acquisition over a platform abstraction.

pub mod helper;
pub mod platform;

pub use helper::{AccessOutcome, CameraHelper, InitializingFlag};
pub use platform::{
    AcquireError, AcquireErrorKind, CameraPlatform, DeviceFamily, Facing, MediaStream,
    PermissionState, VideoConstraints, VideoDevice, VideoSurface,
};
