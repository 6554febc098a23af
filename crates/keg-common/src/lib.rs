//! # keg-common
//!
//! Shared utilities and types for the Keg mount-point manager.
//!
//! This crate provides common functionality used across the Keg crates:
//! - GUID-form volume identifier parsing and validation
//! - Error types for mount-point operations

#![warn(missing_docs)]

pub mod error;
pub mod guid;

pub use error::{AttachError, DetachError, EncodingError, InvalidVolumeGuid, QueryError};
pub use guid::{VOLUME_PATH_PREFIX, VolumeGuid, is_volume_path};
