pub const CRLF: &[u8; 2] = b"\r\n";
pub const VERSION_PREFIX: &[u8; 5] = b"HTTP/";

/// Request methods recognized as the start of an HTTP message.
pub const METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
];

/// Longest start line or header line accepted before giving up.
pub const MAX_LINE_LEN: usize = 8 * 1024;
