//! Binding, unbinding, and reverse lookup of volume mount points.

use keg_common::{AttachError, DetachError, QueryError, guid};

use super::api::{DeviceGuard, SystemVolumeApi, VolumeApi};
use super::path::{SEPARATOR, normalize_mount_path};
use super::wide;

/// Wide-character capacity of the reverse-lookup buffer.
///
/// The Win32 documentation for `GetVolumeNameForVolumeMountPointW` calls 50
/// "a reasonable size" for the canonical `\\?\Volume{GUID}\` form. The OS
/// call fails rather than grow the buffer if a longer name is ever
/// returned; [`MountPointManager::with_volume_name_capacity`] widens it.
pub const VOLUME_NAME_CAPACITY: usize = 50;

// Raw OS error codes the reverse lookup reports for targets that are not
// mount points. Kept as literals so the mapping works off-Windows too.
const ERROR_FILE_NOT_FOUND: i32 = 2;
const ERROR_PATH_NOT_FOUND: i32 = 3;
const ERROR_NOT_A_REPARSE_POINT: i32 = 0x1126;

/// Binds GUID-form volumes at directory mount points and detaches them with
/// a durability guarantee.
///
/// The manager keeps no in-process mount table; every operation re-derives
/// state from the OS. It also adds no locking: callers that race operations
/// on the same target path must serialize them externally, since the
/// outcome of concurrent calls is whatever the OS mount-table locking
/// yields.
#[derive(Debug)]
pub struct MountPointManager<A: VolumeApi = SystemVolumeApi> {
    api: A,
    volume_name_capacity: usize,
}

impl MountPointManager {
    /// Manager backed by the host OS.
    #[must_use]
    pub fn new() -> Self {
        Self::with_api(SystemVolumeApi)
    }
}

impl Default for MountPointManager {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: VolumeApi> MountPointManager<A> {
    /// Manager backed by a custom [`VolumeApi`] implementation.
    pub fn with_api(api: A) -> Self {
        Self {
            api,
            volume_name_capacity: VOLUME_NAME_CAPACITY,
        }
    }

    /// Override the reverse-lookup buffer capacity, in wide characters.
    #[must_use]
    pub fn with_volume_name_capacity(mut self, capacity: usize) -> Self {
        self.volume_name_capacity = capacity;
        self
    }

    /// The underlying [`VolumeApi`] adapter.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Bind the volume named by `volume` (`\\?\Volume{GUID}` form) at the
    /// directory `target`.
    ///
    /// Binding an already-bound identical pair is surfaced as whatever the
    /// OS reports; the manager never turns it into a different binding.
    ///
    /// # Errors
    ///
    /// [`AttachError::InvalidVolumePath`] before any OS call when `volume`
    /// is not a GUID-form volume path, [`AttachError::BindFailed`] when the
    /// OS refuses the binding.
    pub fn attach(&self, target: &str, volume: &str) -> Result<(), AttachError> {
        if !guid::is_volume_path(volume) {
            return Err(AttachError::InvalidVolumePath {
                volume: volume.to_string(),
            });
        }

        // Both sides must end in a separator.
        let slashed_target = normalize_mount_path(target);
        let slashed_volume = normalize_mount_path(volume);

        let target_w = wide::encode_nul(&slashed_target)?;
        let volume_w = wide::encode_nul(&slashed_volume)?;

        self.api
            .set_volume_mount_point(&target_w, &volume_w)
            .map_err(|source| AttachError::BindFailed {
                target: slashed_target.clone(),
                volume: slashed_volume.clone(),
                source,
            })?;

        tracing::debug!(
            target = %slashed_target,
            volume = %slashed_volume,
            "Volume mount point bound"
        );
        Ok(())
    }

    /// Resolve the `\\?\Volume{GUID}\` name bound at `target`.
    ///
    /// The reverse-lookup buffer holds [`VOLUME_NAME_CAPACITY`] wide
    /// characters unless overridden; a name longer than the buffer fails in
    /// the OS and surfaces as [`QueryError::QueryFailed`], never a
    /// truncated result.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotMounted`] when `target` is not a volume mount
    /// point, [`QueryError::QueryFailed`] when the lookup fails in the OS.
    pub fn query_volume(&self, target: &str) -> Result<String, QueryError> {
        let slashed_target = normalize_mount_path(target);
        let target_w = wide::encode_nul(&slashed_target)?;

        let mut buffer = vec![0u16; self.volume_name_capacity];
        self.api
            .volume_name_for_mount_point(&target_w, &mut buffer)
            .map_err(|source| match source.raw_os_error() {
                Some(ERROR_NOT_A_REPARSE_POINT | ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND) => {
                    QueryError::NotMounted {
                        target: slashed_target.clone(),
                    }
                }
                _ => QueryError::QueryFailed {
                    target: slashed_target.clone(),
                    source,
                },
            })?;

        let volume = wide::decode_nul(&buffer)?;
        tracing::trace!(
            target = %slashed_target,
            volume = %volume,
            "Resolved volume for mount point"
        );
        Ok(volume)
    }

    /// Whether `target` currently has a volume bound at it.
    ///
    /// # Errors
    ///
    /// Propagates any [`QueryError`] other than `NotMounted`, which maps to
    /// `Ok(false)`.
    pub fn is_mount_point(&self, target: &str) -> Result<bool, QueryError> {
        match self.query_volume(target) {
            Ok(_) => Ok(true),
            Err(QueryError::NotMounted { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Remove the mount point at `target`, flushing the underlying volume
    /// before reporting success.
    ///
    /// Steps run in strict order: resolve the bound volume, remove the
    /// mapping, open the raw device, flush its buffered writes, close the
    /// handle. The handle is closed on every exit path.
    ///
    /// # Errors
    ///
    /// [`DetachError::Query`] when the bound volume cannot be resolved
    /// (nothing is unbound in that case). Errors after the unbind
    /// ([`DetachError::DeviceOpenFailed`], [`DetachError::FlushFailed`])
    /// mean the mapping is gone but durability is unconfirmed; the manager
    /// never rolls back a successful unbind.
    pub fn detach(&self, target: &str) -> Result<(), DetachError> {
        let slashed_target = normalize_mount_path(target);
        let target_w = wide::encode_nul(&slashed_target)?;

        // The post-unbind flush needs the device identifier; resolve it
        // while the mapping still exists.
        let volume = self.query_volume(&slashed_target)?;

        self.api
            .delete_volume_mount_point(&target_w)
            .map_err(|source| DetachError::UnbindFailed {
                target: slashed_target.clone(),
                source,
            })?;

        // Device-open APIs take the volume path without the trailing
        // separator.
        let device = volume.strip_suffix(SEPARATOR).unwrap_or(&volume);
        let device_w = wide::encode_nul(device)?;

        let handle =
            self.api
                .open_volume_device(&device_w)
                .map_err(|source| DetachError::DeviceOpenFailed {
                    volume: device.to_string(),
                    source,
                })?;
        let device_guard = DeviceGuard::new(&self.api, handle);

        device_guard
            .flush()
            .map_err(|source| DetachError::FlushFailed {
                volume: device.to_string(),
                source,
            })?;

        tracing::debug!(
            target = %slashed_target,
            volume = %device,
            "Volume mount point detached"
        );
        Ok(())
    }
}
