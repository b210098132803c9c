//! pcapscope core library for offline libpcap decoding.
//!
//! The capture buffer is read once into memory. `source` validates the
//! global header and walks frame records lazily; `protocols` decodes
//! Ethernet, IPv4, TCP and HTTP/1.x heads from explicit offsets; `analysis`
//! chains the decoders per frame, runs the cross-frame consistency checks and
//! builds a deterministic [`Report`]. Decoders are pure and borrow from the
//! caller's buffer; the only I/O is reading the file in
//! [`analyze_pcap_file`].
//!
//! Invariants:
//! - Every multi-byte capture field is read in the byte order fixed by the
//!   magic number.
//! - No read ever goes past the end of the buffer; a short buffer is an error.
//! - Frame order in reports follows record order in the file.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use pcapscope_core::{DecodeOptions, analyze_pcap_file};
//!
//! let report = analyze_pcap_file(Path::new("capture.pcap"), &DecodeOptions::default())?;
//! println!("frames: {}", report.frames.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod protocols;
mod source;

pub use analysis::consistency::{
    PreconditionError, same_link_protocol, same_transport_protocol, unique_mac_addresses,
};
pub use analysis::frame::{DecodedFrame, decode_frame};
pub use analysis::{
    AnalysisError, CaptureAnalysis, ConsistencyOutcome, DecodeOptions, analyze_capture,
    analyze_pcap_file, build_report,
};
pub use protocols::ethernet::{EtherType, EthernetError, EthernetHeader, MacAddr, decode_ethernet};
pub use protocols::http::{HeaderField, HttpError, HttpMessage, StartLine, decode_http};
pub use protocols::ipv4::{IpProtocol, Ipv4Error, Ipv4Header, decode_ipv4};
pub use protocols::registry::{ProtocolName, protocol_name};
pub use protocols::tcp::{TcpError, TcpFlags, TcpHeader, TcpOption, decode_tcp};
pub use source::{
    ByteOrder, CaptureFileHeader, FormatError, FrameRecord, Frames, TimestampPrecision,
    TruncatedRecordError, classify_magic, frames, parse_header,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Timestamp used when the capture holds no frames.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoded capture report with deterministic ordering.
///
/// # Examples
/// ```
/// use pcapscope_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcap", 24);
/// assert_eq!(report.report_version, pcapscope_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the first frame, or [`DEFAULT_GENERATED_AT`].
    pub generated_at: String,
    pub input: InputInfo,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_header: Option<CaptureHeaderSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Frames in file order.
    pub frames: Vec<FrameSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<ConsistencySummary>,
    /// Diagnostics ordered by frame index, capture-wide entries first.
    pub diagnostics: Vec<Diagnostic>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input capture metadata embedded in reports.
///
/// # Examples
/// ```
/// use pcapscope_core::InputInfo;
///
/// let input = InputInfo {
///     path: "capture.pcap".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Global header fields as decoded from the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureHeaderSummary {
    /// Canonical magic, hex formatted.
    pub magic_number: String,
    pub byte_order: ByteOrder,
    pub timestamp_precision: TimestampPrecision,
    pub version_major: u16,
    pub version_minor: u16,
    pub timezone_offset: i32,
    pub timestamp_accuracy: u32,
    pub snapshot_length: u32,
    pub link_type: u32,
}

/// Frame totals and time bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub frames_total: u64,
    /// Sum of captured lengths.
    pub bytes_captured: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// One frame and the layers that decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSummary {
    /// Zero-based record index.
    pub index: u64,
    /// Byte offset of the record header in the file.
    pub offset: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub captured_length: u32,
    pub original_length: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Summary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp: Option<TcpSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSummary {
    pub source: String,
    pub destination: String,
    pub ether_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ipv4Summary {
    pub source: String,
    pub destination: String,
    /// Protocol name, or `Unknown(n)` for unregistered numbers.
    pub protocol: String,
    pub ttl: u8,
    pub total_length: u16,
    pub header_length: usize,
    pub checksum_valid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpSummary {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence_number: u32,
    pub acknowledgment_number: u32,
    /// Comma separated flag names.
    pub flags: String,
    pub window_size: u16,
    pub options: Vec<String>,
    pub payload_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSummary {
    /// `request` or `response`.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub version: String,
    pub header_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Cross-frame checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencySummary {
    pub same_link_protocol: bool,
    /// `None` when the IPv4 precondition did not hold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_transport_protocol: Option<bool>,
    /// Why the transport check could not run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_precondition: Option<String>,
    /// Protocol every frame carries, when uniform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_protocol: Option<String>,
    /// Distinct source and destination MACs, sorted.
    pub mac_addresses: Vec<String>,
}

/// A non-fatal decoding problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Record the problem belongs to; `None` for capture-wide problems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<u64>,
    pub kind: DiagnosticKind,
    pub layer: Layer,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    TruncatedRecord,
    MalformedHeader,
    RecordLength,
    UnsupportedLinkType,
}

/// Layer a diagnostic was raised at, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Capture,
    Link,
    Network,
    Transport,
    Application,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::TruncatedRecord => "truncated_record",
            DiagnosticKind::MalformedHeader => "malformed_header",
            DiagnosticKind::RecordLength => "record_length",
            DiagnosticKind::UnsupportedLinkType => "unsupported_link_type",
        }
    }
}

impl Layer {
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Capture => "capture",
            Layer::Link => "link",
            Layer::Network => "network",
            Layer::Transport => "transport",
            Layer::Application => "application",
        }
    }
}

/// Build a report with no decoded content.
///
/// # Examples
/// ```
/// use pcapscope_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcap", 0);
/// assert!(report.frames.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "pcapscope".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_header: None,
        capture_summary: None,
        frames: vec![],
        consistency: None,
        diagnostics: vec![],
    }
}
