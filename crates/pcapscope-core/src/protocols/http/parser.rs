use super::error::HttpError;
use super::layout;
use super::reader::{LineReader, looks_like_http};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    Request {
        method: String,
        target: String,
        version: String,
    },
    Response {
        version: String,
        status_code: u16,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub name: String,
    pub value: String,
}

/// HTTP/1.x message head as far as it is visible in one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMessage {
    pub start_line: StartLine,
    pub headers: Vec<HeaderField>,
    /// True when the blank line ending the header block was seen.
    pub headers_complete: bool,
    /// Offset of the first body byte within the frame, when known.
    pub body_offset: Option<usize>,
}

impl HttpMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
            .map(|field| field.value.as_str())
    }
}

/// Decode an HTTP/1.x message head starting at `offset` within `frame`.
///
/// Returns `Ok(None)` when the bytes do not begin like an HTTP message.
/// Only the head visible in this segment is decoded; no stream reassembly
/// takes place.
///
/// # Errors
/// Returns [`HttpError`] when the bytes start like HTTP but the start line
/// is unterminated or malformed, or a header line has no colon.
pub fn decode_http(frame: &[u8], offset: usize) -> Result<Option<HttpMessage>, HttpError> {
    let bytes = match frame.get(offset..) {
        Some(bytes) if looks_like_http(bytes) => bytes,
        _ => return Ok(None),
    };

    let mut lines = LineReader::new(bytes);
    let first = lines.next_line().ok_or(HttpError::IncompleteStartLine {
        scanned: bytes.len().min(layout::MAX_LINE_LEN),
    })?;
    let start_line = parse_start_line(first)?;

    let mut headers = Vec::new();
    let mut headers_complete = false;
    while let Some(line) = lines.next_line() {
        if line.is_empty() {
            headers_complete = true;
            break;
        }
        headers.push(parse_header_line(line)?);
    }

    let body_offset = headers_complete.then(|| offset + lines.position());
    Ok(Some(HttpMessage {
        start_line,
        headers,
        headers_complete,
        body_offset,
    }))
}

fn parse_start_line(line: &[u8]) -> Result<StartLine, HttpError> {
    let text = String::from_utf8_lossy(line);
    let invalid = || HttpError::InvalidStartLine {
        line: text.to_string(),
    };
    let mut parts = text.splitn(3, ' ');
    let first = parts.next().ok_or_else(invalid)?;
    let second = parts.next().ok_or_else(invalid)?;
    let third = parts.next().unwrap_or("");

    if first.starts_with("HTTP/") {
        let status_code = second
            .parse::<u16>()
            .ok()
            .filter(|code| (100..=999).contains(code))
            .ok_or_else(invalid)?;
        return Ok(StartLine::Response {
            version: first.to_string(),
            status_code,
            reason: third.to_string(),
        });
    }

    if !third.starts_with("HTTP/") || second.is_empty() {
        return Err(invalid());
    }
    Ok(StartLine::Request {
        method: first.to_string(),
        target: second.to_string(),
        version: third.to_string(),
    })
}

fn parse_header_line(line: &[u8]) -> Result<HeaderField, HttpError> {
    let text = String::from_utf8_lossy(line);
    let (name, value) = text
        .split_once(':')
        .filter(|(name, _)| !name.is_empty() && !name.contains(' '))
        .ok_or_else(|| HttpError::InvalidHeaderLine {
            line: text.to_string(),
        })?;
    Ok(HeaderField {
        name: name.to_string(),
        value: value.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{StartLine, decode_http};
    use crate::protocols::http::error::HttpError;

    #[test]
    fn decodes_request_head() {
        let segment = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nAccept: */*\r\n\r\nbody";
        let message = decode_http(segment, 0).unwrap().unwrap();
        assert_eq!(
            message.start_line,
            StartLine::Request {
                method: "GET".to_string(),
                target: "/index.html".to_string(),
                version: "HTTP/1.1".to_string(),
            }
        );
        assert_eq!(message.header("host"), Some("example.com"));
        assert!(message.headers_complete);
        assert_eq!(message.body_offset, Some(segment.len() - 4));
    }

    #[test]
    fn decodes_response_at_offset() {
        let mut frame = vec![0u8; 54];
        frame.extend_from_slice(b"HTTP/1.0 404 Not Found\r\nContent-Length: 0\r\n");
        let message = decode_http(&frame, 54).unwrap().unwrap();
        assert_eq!(
            message.start_line,
            StartLine::Response {
                version: "HTTP/1.0".to_string(),
                status_code: 404,
                reason: "Not Found".to_string(),
            }
        );
        assert!(!message.headers_complete);
        assert_eq!(message.body_offset, None);
        assert_eq!(message.headers.len(), 1);
    }

    #[test]
    fn non_http_payload_is_none() {
        assert_eq!(decode_http(b"\x16\x03\x01\x02\x00", 0).unwrap(), None);
        assert_eq!(decode_http(b"GET", 10).unwrap(), None);
    }

    #[test]
    fn unterminated_start_line_is_incomplete() {
        let err = decode_http(b"POST /upload HTTP/1.1", 0).unwrap_err();
        assert!(matches!(err, HttpError::IncompleteStartLine { .. }));
    }

    #[test]
    fn request_without_version_is_invalid() {
        let err = decode_http(b"GET /\r\n\r\n", 0).unwrap_err();
        assert!(matches!(err, HttpError::InvalidStartLine { .. }));
    }

    #[test]
    fn header_without_colon_is_invalid() {
        let err = decode_http(b"GET / HTTP/1.1\r\nbroken header\r\n\r\n", 0).unwrap_err();
        assert!(matches!(err, HttpError::InvalidHeaderLine { .. }));
    }
}
