//! Wide-string conversion at the OS boundary.

use keg_common::EncodingError;

/// Encode a path as a NUL-terminated UTF-16 string.
///
/// # Errors
///
/// Fails if the path contains an interior NUL, the only way a Rust string
/// can violate the Win32 wide-string contract.
pub fn encode_nul(path: &str) -> Result<Vec<u16>, EncodingError> {
    if path.contains('\0') {
        return Err(EncodingError::InteriorNul {
            path: path.to_string(),
        });
    }
    Ok(path.encode_utf16().chain(Some(0)).collect())
}

/// Decode a NUL-terminated UTF-16 buffer returned by the OS.
///
/// The buffer is truncated at the first NUL; anything after it is padding.
///
/// # Errors
///
/// Fails if the buffer holds unpaired surrogates, with a lossy rendering
/// embedded for diagnosis.
pub fn decode_nul(buffer: &[u16]) -> Result<String, EncodingError> {
    let len = buffer
        .iter()
        .position(|&unit| unit == 0)
        .unwrap_or(buffer.len());
    String::from_utf16(&buffer[..len]).map_err(|_| EncodingError::InvalidUtf16 {
        lossy: String::from_utf16_lossy(&buffer[..len]),
    })
}
