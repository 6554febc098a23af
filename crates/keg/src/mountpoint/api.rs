//! The OS boundary for volume mount-point primitives.

use std::io;

/// Raw handle to an open volume device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawVolumeHandle(isize);

impl RawVolumeHandle {
    /// Wrap a raw OS handle value.
    #[must_use]
    pub const fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    /// The raw OS handle value.
    #[must_use]
    pub const fn as_raw(self) -> isize {
        self.0
    }
}

/// The volume mount-point primitives of the host OS.
///
/// All path parameters are NUL-terminated wide strings, the form the Win32
/// ABI requires. [`SystemVolumeApi`] is the production implementation;
/// tests substitute recording fakes.
pub trait VolumeApi {
    /// Bind the volume named by `volume` at the directory `target`.
    fn set_volume_mount_point(&self, target: &[u16], volume: &[u16]) -> io::Result<()>;

    /// Remove the mount point at `target`.
    fn delete_volume_mount_point(&self, target: &[u16]) -> io::Result<()>;

    /// Write the `\\?\Volume{GUID}\` name bound at `target` into `buffer`.
    fn volume_name_for_mount_point(&self, target: &[u16], buffer: &mut [u16]) -> io::Result<()>;

    /// Open a shared read/write handle to the raw volume device.
    fn open_volume_device(&self, volume: &[u16]) -> io::Result<RawVolumeHandle>;

    /// Commit the device's buffered writes to stable storage.
    fn flush_device(&self, handle: RawVolumeHandle) -> io::Result<()>;

    /// Close a handle returned by [`VolumeApi::open_volume_device`].
    fn close_device(&self, handle: RawVolumeHandle);
}

/// Closes the wrapped device handle when dropped.
///
/// Detach holds its transient volume handle through this guard so the
/// close runs on every exit path, error or success.
pub struct DeviceGuard<'a, A: VolumeApi + ?Sized> {
    api: &'a A,
    handle: RawVolumeHandle,
}

impl<'a, A: VolumeApi + ?Sized> DeviceGuard<'a, A> {
    /// Take ownership of `handle`, closing it on drop.
    pub fn new(api: &'a A, handle: RawVolumeHandle) -> Self {
        Self { api, handle }
    }

    /// Flush the device's buffered writes.
    ///
    /// # Errors
    ///
    /// Propagates the OS flush failure; the handle is still closed on drop.
    pub fn flush(&self) -> io::Result<()> {
        self.api.flush_device(self.handle)
    }
}

impl<A: VolumeApi + ?Sized> Drop for DeviceGuard<'_, A> {
    fn drop(&mut self) {
        self.api.close_device(self.handle);
    }
}

/// [`VolumeApi`] backed by the host OS.
///
/// On non-Windows hosts every operation fails with
/// [`io::ErrorKind::Unsupported`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemVolumeApi;

#[cfg(windows)]
#[allow(unsafe_code)]
impl VolumeApi for SystemVolumeApi {
    fn set_volume_mount_point(&self, target: &[u16], volume: &[u16]) -> io::Result<()> {
        use windows_sys::Win32::Storage::FileSystem::SetVolumeMountPointW;

        let ok = unsafe { SetVolumeMountPointW(target.as_ptr(), volume.as_ptr()) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn delete_volume_mount_point(&self, target: &[u16]) -> io::Result<()> {
        use windows_sys::Win32::Storage::FileSystem::DeleteVolumeMountPointW;

        let ok = unsafe { DeleteVolumeMountPointW(target.as_ptr()) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn volume_name_for_mount_point(&self, target: &[u16], buffer: &mut [u16]) -> io::Result<()> {
        use windows_sys::Win32::Storage::FileSystem::GetVolumeNameForVolumeMountPointW;

        let ok = unsafe {
            GetVolumeNameForVolumeMountPointW(
                target.as_ptr(),
                buffer.as_mut_ptr(),
                u32::try_from(buffer.len()).unwrap_or(u32::MAX),
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn open_volume_device(&self, volume: &[u16]) -> io::Result<RawVolumeHandle> {
        use windows_sys::Win32::Foundation::{GENERIC_READ, GENERIC_WRITE, INVALID_HANDLE_VALUE};
        use windows_sys::Win32::Storage::FileSystem::{
            CreateFileW, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
        };

        let handle = unsafe {
            CreateFileW(
                volume.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                std::ptr::null(),
                OPEN_EXISTING,
                0,
                0,
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }
        Ok(RawVolumeHandle::from_raw(handle))
    }

    fn flush_device(&self, handle: RawVolumeHandle) -> io::Result<()> {
        use windows_sys::Win32::Storage::FileSystem::FlushFileBuffers;

        let ok = unsafe { FlushFileBuffers(handle.as_raw()) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn close_device(&self, handle: RawVolumeHandle) {
        use windows_sys::Win32::Foundation::CloseHandle;

        unsafe { CloseHandle(handle.as_raw()) };
    }
}

#[cfg(not(windows))]
impl VolumeApi for SystemVolumeApi {
    fn set_volume_mount_point(&self, _target: &[u16], _volume: &[u16]) -> io::Result<()> {
        Err(unsupported())
    }

    fn delete_volume_mount_point(&self, _target: &[u16]) -> io::Result<()> {
        Err(unsupported())
    }

    fn volume_name_for_mount_point(&self, _target: &[u16], _buffer: &mut [u16]) -> io::Result<()> {
        Err(unsupported())
    }

    fn open_volume_device(&self, _volume: &[u16]) -> io::Result<RawVolumeHandle> {
        Err(unsupported())
    }

    fn flush_device(&self, _handle: RawVolumeHandle) -> io::Result<()> {
        Err(unsupported())
    }

    fn close_device(&self, _handle: RawVolumeHandle) {}
}

#[cfg(not(windows))]
fn unsupported() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "volume mount points require Windows",
    )
}
