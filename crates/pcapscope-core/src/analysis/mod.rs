use std::collections::BTreeSet;
use std::path::Path;

use rayon::prelude::*;
use thiserror::Error;

use crate::protocols::ethernet::MacAddr;
use crate::source::{CaptureFileHeader, FormatError, FrameRecord, frames, parse_header};
use crate::{Diagnostic, DiagnosticKind, Layer, Report};

pub mod consistency;
pub mod frame;
mod report;

use consistency::{
    PreconditionError, same_link_protocol, same_transport_protocol, unique_mac_addresses,
};
use frame::{DecodedFrame, decode_frame};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
}

/// Knobs for [`analyze_capture`].
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Decode frames on the rayon thread pool instead of the calling thread.
    pub parallel: bool,
    /// Try the HTTP decoder on TCP payloads.
    pub decode_http: bool,
    /// Stop pulling frame records after this many.
    pub max_frames: Option<usize>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            decode_http: true,
            max_frames: None,
        }
    }
}

/// Results of the cross-frame checks.
#[derive(Debug, Clone)]
pub struct ConsistencyOutcome {
    pub same_link_protocol: bool,
    pub same_transport_protocol: Result<bool, PreconditionError>,
    pub mac_addresses: BTreeSet<MacAddr>,
}

/// Everything decoded from one capture buffer.
#[derive(Debug, Clone)]
pub struct CaptureAnalysis<'a> {
    pub header: CaptureFileHeader,
    pub frames: Vec<DecodedFrame<'a>>,
    /// Diagnostics that belong to the capture rather than a decoded frame.
    pub diagnostics: Vec<Diagnostic>,
    pub consistency: ConsistencyOutcome,
}

impl CaptureAnalysis<'_> {
    /// Capture-level and per-frame diagnostics, ordered by frame index.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all: Vec<Diagnostic> = self
            .diagnostics
            .iter()
            .chain(self.frames.iter().flat_map(|frame| frame.diagnostics.iter()))
            .cloned()
            .collect();
        all.sort_by(|a, b| {
            a.frame_index
                .cmp(&b.frame_index)
                .then_with(|| a.layer.cmp(&b.layer))
        });
        all
    }
}

/// Decode a capture file from disk and build its report.
pub fn analyze_pcap_file(path: &Path, options: &DecodeOptions) -> Result<Report, AnalysisError> {
    let bytes = std::fs::read(path)?;
    let analysis = analyze_capture(&bytes, options)?;
    Ok(report::build_report(
        &analysis,
        &path.display().to_string(),
        bytes.len() as u64,
    ))
}

/// Decode a fully materialized capture buffer.
///
/// A bad global header is fatal. A truncated record ends frame iteration and
/// is reported as a capture diagnostic; frames before it are kept. Header
/// problems inside a frame are attached to that frame.
///
/// # Examples
/// ```
/// use pcapscope_core::{DecodeOptions, analyze_capture};
///
/// let mut capture = vec![0xd4, 0xc3, 0xb2, 0xa1, 2, 0, 4, 0];
/// capture.extend_from_slice(&[0; 8]);
/// capture.extend_from_slice(&65535u32.to_le_bytes());
/// capture.extend_from_slice(&1u32.to_le_bytes());
///
/// let analysis = analyze_capture(&capture, &DecodeOptions::default())?;
/// assert!(analysis.frames.is_empty());
/// assert!(analysis.consistency.same_link_protocol);
/// # Ok::<(), pcapscope_core::AnalysisError>(())
/// ```
pub fn analyze_capture<'a>(
    bytes: &'a [u8],
    options: &DecodeOptions,
) -> Result<CaptureAnalysis<'a>, AnalysisError> {
    let header = parse_header(bytes)?;
    let mut diagnostics = Vec::new();

    let limit = options.max_frames.unwrap_or(usize::MAX);
    let mut records = Vec::new();
    for result in frames(bytes, &header).take(limit) {
        match result {
            Ok(record) => records.push(record),
            Err(err) => diagnostics.push(Diagnostic {
                frame_index: Some(err.index),
                kind: DiagnosticKind::TruncatedRecord,
                layer: Layer::Capture,
                message: err.to_string(),
            }),
        }
    }

    let ethernet = header.is_ethernet();
    if !ethernet {
        tracing::warn!(link_type = header.link_type, "unsupported link type, frames left undecoded");
        diagnostics.push(Diagnostic {
            frame_index: None,
            kind: DiagnosticKind::UnsupportedLinkType,
            layer: Layer::Capture,
            message: format!("link type {} is not Ethernet", header.link_type),
        });
    }

    let snapshot_length = header.snapshot_length;
    let decode = |record: FrameRecord<'a>| {
        let mut frame = if ethernet {
            decode_frame(record, options)
        } else {
            DecodedFrame::undecoded(record)
        };
        if !record.lengths_consistent(snapshot_length) {
            tracing::warn!(
                frame = record.index,
                captured = record.captured_length,
                original = record.original_length,
                snapshot_length,
                "inconsistent record lengths"
            );
            frame.diagnostics.insert(
                0,
                Diagnostic {
                    frame_index: Some(record.index),
                    kind: DiagnosticKind::RecordLength,
                    layer: Layer::Capture,
                    message: format!(
                        "captured length {} exceeds original length {} or snapshot length {}",
                        record.captured_length, record.original_length, snapshot_length
                    ),
                },
            );
        }
        frame
    };

    let decoded: Vec<DecodedFrame<'a>> = if options.parallel {
        records.into_par_iter().map(decode).collect()
    } else {
        records.into_iter().map(decode).collect()
    };
    tracing::debug!(
        frames = decoded.len(),
        parallel = options.parallel,
        "decoded capture frames"
    );

    let consistency = ConsistencyOutcome {
        same_link_protocol: same_link_protocol(&decoded),
        same_transport_protocol: same_transport_protocol(&decoded),
        mac_addresses: unique_mac_addresses(&decoded),
    };

    Ok(CaptureAnalysis {
        header,
        frames: decoded,
        diagnostics,
        consistency,
    })
}

/// Build the serializable report for an analysis.
pub fn build_report(analysis: &CaptureAnalysis<'_>, input_path: &str, input_bytes: u64) -> Report {
    report::build_report(analysis, input_path, input_bytes)
}
