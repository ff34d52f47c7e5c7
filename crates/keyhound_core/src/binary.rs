//! Binary content detection utilities.

/// Number of bytes to check for null bytes when detecting binary content.
/// Matches how git handles this as binary files almost always have nulls in headers.
const BINARY_CHECK_BYTES: usize = 8000;

/// Returns `true` if the first [`BINARY_CHECK_BYTES`] of `content` contain
/// a null byte, which strongly indicates binary data.
#[must_use]
pub fn is_binary_content(content: &str) -> bool {
    is_binary_bytes(content.as_bytes())
}

/// Returns `true` if the first [`BINARY_CHECK_BYTES`] of `bytes` contain
/// a null byte, which strongly indicates binary data.
#[must_use]
pub fn is_binary_bytes(bytes: &[u8]) -> bool {
    let check_len = bytes.len().min(BINARY_CHECK_BYTES);
    bytes[..check_len].contains(&0)
}
