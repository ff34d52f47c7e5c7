/// Returns the byte offset of the start of the line containing `offset`.
#[must_use]
pub fn find_line_start(content: &str, offset: usize) -> usize {
    content[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Returns the byte offset of the next newline after `offset`, or the end
/// of `content` if there is no trailing newline.
#[must_use]
pub fn find_line_end(content: &str, offset: usize) -> usize {
    content[offset..].find('\n').map_or(content.len(), |i| offset + i)
}

/// Returns the slice of `content` extending `radius` characters before
/// `byte_start` and `radius` characters after `byte_end`, clamped to the
/// content bounds.
///
/// The radius is measured in characters, not bytes, so the returned slice
/// is always on UTF-8 boundaries regardless of surrounding multi-byte text.
#[must_use]
pub fn window_around(content: &str, byte_start: usize, byte_end: usize, radius: usize) -> &str {
    let window_start = if radius == 0 {
        byte_start
    } else {
        content[..byte_start]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map_or(0, |(i, _)| i)
    };

    let window_end = content[byte_end..]
        .char_indices()
        .nth(radius)
        .map_or(content.len(), |(i, _)| byte_end + i);

    &content[window_start..window_end]
}
