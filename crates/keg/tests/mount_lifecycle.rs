//! Integration tests for the mount-point lifecycle.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use keg::mountpoint::{
    MountPointManager, RawVolumeHandle, VolumeApi, decode_nul, normalize_mount_path,
};
use keg_common::{AttachError, DetachError, QueryError, VolumeGuid};
use proptest::prelude::*;

const ERROR_NOT_A_REPARSE_POINT: i32 = 0x1126;
const ERROR_DIR_NOT_EMPTY: i32 = 145;

/// In-memory stand-in for the OS mount table.
#[derive(Default)]
struct FakeVolumes {
    bindings: Mutex<HashMap<String, String>>,
    open_devices: Mutex<HashMap<isize, String>>,
    flushed: Mutex<Vec<String>>,
    next_handle: Mutex<isize>,
}

impl FakeVolumes {
    fn decode(wide: &[u16]) -> String {
        decode_nul(wide).expect("fake received invalid UTF-16")
    }
}

impl VolumeApi for FakeVolumes {
    fn set_volume_mount_point(&self, target: &[u16], volume: &[u16]) -> io::Result<()> {
        let mut bindings = self.bindings.lock().unwrap();
        let target = Self::decode(target);
        if bindings.contains_key(&target) {
            // The real API refuses to re-point an existing mount point.
            return Err(io::Error::from_raw_os_error(ERROR_DIR_NOT_EMPTY));
        }
        bindings.insert(target, Self::decode(volume));
        Ok(())
    }

    fn delete_volume_mount_point(&self, target: &[u16]) -> io::Result<()> {
        let mut bindings = self.bindings.lock().unwrap();
        match bindings.remove(&Self::decode(target)) {
            Some(_) => Ok(()),
            None => Err(io::Error::from_raw_os_error(ERROR_NOT_A_REPARSE_POINT)),
        }
    }

    fn volume_name_for_mount_point(&self, target: &[u16], buffer: &mut [u16]) -> io::Result<()> {
        let bindings = self.bindings.lock().unwrap();
        let Some(volume) = bindings.get(&Self::decode(target)) else {
            return Err(io::Error::from_raw_os_error(ERROR_NOT_A_REPARSE_POINT));
        };
        let units: Vec<u16> = volume.encode_utf16().chain(Some(0)).collect();
        if units.len() > buffer.len() {
            return Err(io::Error::from_raw_os_error(206));
        }
        buffer[..units.len()].copy_from_slice(&units);
        Ok(())
    }

    fn open_volume_device(&self, volume: &[u16]) -> io::Result<RawVolumeHandle> {
        let mut next = self.next_handle.lock().unwrap();
        *next += 1;
        self.open_devices
            .lock()
            .unwrap()
            .insert(*next, Self::decode(volume));
        Ok(RawVolumeHandle::from_raw(*next))
    }

    fn flush_device(&self, handle: RawVolumeHandle) -> io::Result<()> {
        let open = self.open_devices.lock().unwrap();
        let device = open
            .get(&handle.as_raw())
            .expect("flush on a handle that is not open");
        self.flushed.lock().unwrap().push(device.clone());
        Ok(())
    }

    fn close_device(&self, handle: RawVolumeHandle) {
        self.open_devices.lock().unwrap().remove(&handle.as_raw());
    }
}

#[test_log::test]
fn attach_query_detach_lifecycle() {
    let volume: VolumeGuid = r"\\?\Volume{11111111-2222-3333-4444-555555555555}"
        .parse()
        .unwrap();
    let manager = MountPointManager::with_api(FakeVolumes::default());

    manager
        .attach(r"C:\mnt\data", &volume.device_path())
        .unwrap();
    assert!(manager.is_mount_point(r"C:\mnt\data").unwrap());

    // The resolved name carries the trailing separator, as the OS returns it.
    let resolved = manager.query_volume(r"C:\mnt\data").unwrap();
    assert_eq!(resolved, volume.to_string());
    assert_eq!(resolved.parse::<VolumeGuid>().unwrap(), volume);

    manager.detach(r"C:\mnt\data").unwrap();
    assert!(!manager.is_mount_point(r"C:\mnt\data").unwrap());

    // The flush targeted the device path (no trailing separator), and the
    // transient handle was closed.
    let api = manager.api();
    assert_eq!(*api.flushed.lock().unwrap(), vec![volume.device_path()]);
    assert!(api.open_devices.lock().unwrap().is_empty());
}

#[test_log::test]
fn detach_without_binding_reports_not_mounted() {
    let manager = MountPointManager::with_api(FakeVolumes::default());
    let err = manager.detach(r"C:\mnt\data").unwrap_err();
    assert!(matches!(
        err,
        DetachError::Query(QueryError::NotMounted { .. })
    ));
}

#[test]
fn reattach_over_existing_binding_is_surfaced_not_repointed() {
    let first = r"\\?\Volume{11111111-2222-3333-4444-555555555555}";
    let second = r"\\?\Volume{aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee}";
    let manager = MountPointManager::with_api(FakeVolumes::default());

    manager.attach(r"C:\mnt\data", first).unwrap();
    let err = manager.attach(r"C:\mnt\data", second).unwrap_err();
    assert!(matches!(err, AttachError::BindFailed { .. }));

    // The original binding is untouched.
    assert_eq!(
        manager.query_volume(r"C:\mnt\data").unwrap(),
        format!(r"{first}\")
    );
}

#[test]
fn equivalent_spellings_resolve_the_same_mount_point() {
    let volume = r"\\?\Volume{11111111-2222-3333-4444-555555555555}";
    let manager = MountPointManager::with_api(FakeVolumes::default());

    manager.attach(r"C:\mnt\data", volume).unwrap();
    for spelling in [r"C:\mnt\data", r"C:\mnt\data\", "C:/mnt/data", r"C:\mnt\.\data"] {
        assert_eq!(
            manager.query_volume(spelling).unwrap(),
            format!(r"{volume}\"),
            "spelling {spelling:?} should resolve"
        );
    }
}

proptest! {
    #[test]
    fn normalized_paths_end_with_a_separator(path in ".{0,40}") {
        let normalized = normalize_mount_path(&path);
        prop_assert!(normalized.ends_with('\\'));
    }

    #[test]
    fn normalization_is_idempotent(path in ".{0,40}") {
        let normalized = normalize_mount_path(&path);
        prop_assert_eq!(normalize_mount_path(&normalized), normalized);
    }
}
