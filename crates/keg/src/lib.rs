//! # Keg Mount-Point Manager
//!
//! Keg binds raw storage volumes (GUID-form device paths) at directory
//! mount points, the mechanism container platforms use to expose
//! per-container volumes through a pathable location instead of a drive
//! letter.
//!
//! ## Features
//!
//! - **Attach/detach**: bind a `\\?\Volume{GUID}` device at a directory and
//!   remove the binding without losing buffered writes
//! - **Reverse lookup**: resolve which volume is bound at a mount point
//! - **Durability**: detach flushes the raw device after the unbind, before
//!   success is reported
//!
//! ## Usage
//!
//! ```no_run
//! use keg::mountpoint::MountPointManager;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = MountPointManager::new();
//!
//! // Bind a volume at a directory.
//! manager.attach(
//!     r"C:\mnt\data",
//!     r"\\?\Volume{11111111-2222-3333-4444-555555555555}",
//! )?;
//!
//! // Which volume backs the mount point?
//! let volume = manager.query_volume(r"C:\mnt\data")?;
//!
//! // Flush and unbind.
//! manager.detach(r"C:\mnt\data")?;
//! # Ok(())
//! # }
//! ```
//!
//! Operations are synchronous, blocking, and keep no in-process mount
//! table; callers that race operations on the same target path must
//! serialize them externally.

#![warn(missing_docs)]

pub mod mountpoint;

pub use mountpoint::MountPointManager;
