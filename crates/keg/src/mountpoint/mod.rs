//! Volume mount-point operations.
//!
//! This module handles:
//! - Mount-path normalization
//! - Wide-string conversion at the OS boundary
//! - Binding and unbinding GUID-form volumes at directory mount points
//! - Reverse lookup of the volume bound at a mount point

mod api;
mod manager;
mod path;
mod wide;

pub use api::{DeviceGuard, RawVolumeHandle, SystemVolumeApi, VolumeApi};
pub use manager::{MountPointManager, VOLUME_NAME_CAPACITY};
pub use path::normalize_mount_path;
pub use wide::{decode_nul, encode_nul};
