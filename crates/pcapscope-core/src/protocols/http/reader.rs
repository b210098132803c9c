use super::layout;

/// Splits CRLF-terminated lines out of a segment payload.
pub struct LineReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Bytes consumed so far, including line terminators.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Next complete line without its terminator, or `None` when the rest of
    /// the bytes hold no CRLF within [`layout::MAX_LINE_LEN`].
    pub fn next_line(&mut self) -> Option<&'a [u8]> {
        let rest = self.bytes.get(self.position..)?;
        let window = &rest[..rest.len().min(layout::MAX_LINE_LEN + layout::CRLF.len())];
        let end = window
            .windows(layout::CRLF.len())
            .position(|pair| pair == layout::CRLF)?;
        self.position += end + layout::CRLF.len();
        Some(&rest[..end])
    }
}

/// True when `bytes` open with a request method token or an HTTP version.
pub fn looks_like_http(bytes: &[u8]) -> bool {
    if bytes.starts_with(layout::VERSION_PREFIX) {
        return true;
    }
    layout::METHODS.iter().any(|method| {
        bytes.len() > method.len()
            && bytes.starts_with(method.as_bytes())
            && bytes[method.len()] == b' '
    })
}
