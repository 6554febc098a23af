//! Error types for mount-point operations.

use miette::Diagnostic;
use thiserror::Error;

/// A path could not cross the wide-string boundary to or from the OS.
#[derive(Error, Diagnostic, Debug)]
pub enum EncodingError {
    /// The path contains an interior NUL and cannot be NUL-terminated.
    #[error("path contains an interior NUL: {path:?}")]
    #[diagnostic(code(keg::mount::interior_nul))]
    InteriorNul {
        /// The offending path.
        path: String,
    },

    /// The OS returned wide characters that are not valid UTF-16.
    #[error("OS returned invalid UTF-16 ({lossy:?})")]
    #[diagnostic(code(keg::mount::invalid_utf16))]
    InvalidUtf16 {
        /// Lossy rendering of the returned buffer, for diagnosis.
        lossy: String,
    },
}

/// A string is not a well-formed `\\?\Volume{GUID}` identifier.
#[derive(Error, Diagnostic, Debug)]
#[error("not a GUID-form volume path: {path}")]
#[diagnostic(
    code(keg::guid::parse),
    help("expected \\\\?\\Volume{{GUID}} with an optional trailing separator")
)]
pub struct InvalidVolumeGuid {
    /// The rejected string.
    pub path: String,
}

/// Errors from attaching a volume to a mount point.
#[derive(Error, Diagnostic, Debug)]
pub enum AttachError {
    /// The volume identifier does not name a volume device.
    #[error("unable to mount non-volume path: {volume}")]
    #[diagnostic(
        code(keg::mount::invalid_volume_path),
        help("volume identifiers must start with \\\\?\\Volume{{")
    )]
    InvalidVolumePath {
        /// The rejected identifier.
        volume: String,
    },

    /// A path could not be encoded for the OS call.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Encoding(#[from] EncodingError),

    /// The OS refused to create the mount point.
    #[error("failed to bind volume {volume} at {target}")]
    #[diagnostic(code(keg::mount::bind_failed))]
    BindFailed {
        /// The normalized mount target.
        target: String,
        /// The normalized volume identifier.
        volume: String,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors from resolving the volume bound at a mount point.
#[derive(Error, Diagnostic, Debug)]
pub enum QueryError {
    /// A path could not be encoded for the OS call.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Encoding(#[from] EncodingError),

    /// The target is not a volume mount point.
    #[error("not a volume mount point: {target}")]
    #[diagnostic(code(keg::mount::not_mounted))]
    NotMounted {
        /// The normalized target path.
        target: String,
    },

    /// The reverse lookup failed in the OS.
    #[error("failed to resolve volume name for {target}")]
    #[diagnostic(code(keg::mount::query_failed))]
    QueryFailed {
        /// The normalized target path.
        target: String,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors from detaching a volume mount point.
///
/// Variants after [`DetachError::UnbindFailed`] report failures that occur
/// once the mapping is already removed; they are durability warnings, not
/// signs that the detach did not happen.
#[derive(Error, Diagnostic, Debug)]
pub enum DetachError {
    /// The bound volume could not be resolved before unbinding.
    #[error("cannot detach without resolving the bound volume")]
    #[diagnostic(code(keg::mount::detach_failed))]
    Query(#[from] QueryError),

    /// A path could not be encoded for the OS call.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Encoding(#[from] EncodingError),

    /// The OS refused to remove the mount point.
    #[error("failed to remove mount point at {target}")]
    #[diagnostic(code(keg::mount::unbind_failed))]
    UnbindFailed {
        /// The normalized mount target.
        target: String,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },

    /// The raw volume device could not be opened for the post-unbind flush.
    #[error("mount point removed, but volume device {volume} could not be opened")]
    #[diagnostic(
        code(keg::mount::device_open_failed),
        help("the mapping is already gone; verify data durability manually")
    )]
    DeviceOpenFailed {
        /// The volume device path, without trailing separator.
        volume: String,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },

    /// Flushing the volume's buffered writes failed after the unbind.
    #[error("mount point removed, but flushing volume {volume} failed")]
    #[diagnostic(
        code(keg::mount::flush_failed),
        help("the mapping is already gone; verify data durability manually")
    )]
    FlushFailed {
        /// The volume device path, without trailing separator.
        volume: String,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },
}
