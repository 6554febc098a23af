//! GUID-form volume identifier parsing and validation.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::InvalidVolumeGuid;

/// Literal prefix of every GUID-form volume path.
pub const VOLUME_PATH_PREFIX: &str = r"\\?\Volume{";

/// Returns `true` if `path` names a volume device rather than an ordinary
/// directory.
///
/// This is the local guard the mount binder applies before any OS call:
/// only `\\?\Volume{GUID}` paths may be bound at a mount point.
#[must_use]
pub fn is_volume_path(path: &str) -> bool {
    path.starts_with(VOLUME_PATH_PREFIX)
}

/// A validated GUID-form volume identifier.
///
/// Parses from the `\\?\Volume{GUID}` form with an optional trailing
/// separator. [`fmt::Display`] renders the canonical form the mount APIs
/// return (trailing separator included); [`VolumeGuid::device_path`]
/// renders the form device-open APIs require (no trailing separator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VolumeGuid(Uuid);

impl VolumeGuid {
    /// Wrap an already-known volume GUID.
    #[must_use]
    pub const fn new(guid: Uuid) -> Self {
        Self(guid)
    }

    /// The underlying GUID.
    #[must_use]
    pub const fn guid(&self) -> Uuid {
        self.0
    }

    /// The device path form, without trailing separator.
    #[must_use]
    pub fn device_path(&self) -> String {
        format!(r"\\?\Volume{{{}}}", self.0)
    }
}

impl fmt::Display for VolumeGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r"\\?\Volume{{{}}}\", self.0)
    }
}

impl FromStr for VolumeGuid {
    type Err = InvalidVolumeGuid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reject = || InvalidVolumeGuid {
            path: s.to_string(),
        };
        let rest = s.strip_prefix(VOLUME_PATH_PREFIX).ok_or_else(reject)?;
        let rest = rest.strip_suffix('\\').unwrap_or(rest);
        let inner = rest.strip_suffix('}').ok_or_else(reject)?;
        let guid = Uuid::parse_str(inner).map_err(|_| reject())?;
        Ok(Self(guid))
    }
}

impl Serialize for VolumeGuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VolumeGuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
