use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::CaptureAnalysis;
use super::frame::DecodedFrame;
use crate::protocols::http::StartLine;
use crate::{
    CaptureHeaderSummary, CaptureSummary, ConsistencySummary, DEFAULT_GENERATED_AT,
    FrameSummary, HttpSummary, InputInfo, Ipv4Summary, LinkSummary, REPORT_VERSION, Report,
    TcpSummary, ToolInfo,
};

pub(super) fn build_report(
    analysis: &CaptureAnalysis<'_>,
    input_path: &str,
    input_bytes: u64,
) -> Report {
    let header = &analysis.header;
    let frames: Vec<FrameSummary> = analysis.frames.iter().map(frame_summary).collect();

    let first = analysis.frames.iter().map(|f| f.record.timestamp_nanos()).min();
    let last = analysis.frames.iter().map(|f| f.record.timestamp_nanos()).max();
    let time_start = first.and_then(nanos_to_rfc3339);

    let consistency = &analysis.consistency;
    let (same_transport_protocol, transport_precondition) =
        match &consistency.same_transport_protocol {
            Ok(same) => (Some(*same), None),
            Err(err) => (None, Some(err.to_string())),
        };
    let transport_protocol = match same_transport_protocol {
        Some(true) => analysis
            .frames
            .first()
            .and_then(|frame| frame.ipv4.as_ref())
            .map(|ipv4| ipv4.protocol.name.to_string()),
        _ => None,
    };

    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "pcapscope".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: time_start
            .clone()
            .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string()),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_header: Some(CaptureHeaderSummary {
            magic_number: format!("0x{:08x}", header.magic_number),
            byte_order: header.byte_order,
            timestamp_precision: header.timestamp_precision,
            version_major: header.version_major,
            version_minor: header.version_minor,
            timezone_offset: header.timezone_offset,
            timestamp_accuracy: header.timestamp_accuracy,
            snapshot_length: header.snapshot_length,
            link_type: header.link_type,
        }),
        capture_summary: Some(CaptureSummary {
            frames_total: frames.len() as u64,
            bytes_captured: analysis
                .frames
                .iter()
                .map(|f| u64::from(f.record.captured_length))
                .sum(),
            time_start,
            time_end: last.and_then(nanos_to_rfc3339),
        }),
        frames,
        consistency: Some(ConsistencySummary {
            same_link_protocol: consistency.same_link_protocol,
            same_transport_protocol,
            transport_precondition,
            transport_protocol,
            mac_addresses: consistency
                .mac_addresses
                .iter()
                .map(|mac| mac.to_string())
                .collect(),
        }),
        diagnostics: analysis.all_diagnostics(),
    }
}

fn frame_summary(frame: &DecodedFrame<'_>) -> FrameSummary {
    let record = &frame.record;
    FrameSummary {
        index: record.index,
        offset: record.offset as u64,
        timestamp: nanos_to_rfc3339(record.timestamp_nanos()),
        captured_length: record.captured_length,
        original_length: record.original_length,
        link: frame.ethernet.as_ref().map(|eth| LinkSummary {
            source: eth.source.to_string(),
            destination: eth.destination.to_string(),
            ether_type: eth.ether_type.to_string(),
        }),
        ipv4: frame.ipv4.as_ref().map(|ip| Ipv4Summary {
            source: ip.source.to_string(),
            destination: ip.destination.to_string(),
            protocol: ip.protocol.name.to_string(),
            ttl: ip.ttl,
            total_length: ip.total_length,
            header_length: ip.header_length,
            checksum_valid: ip.checksum_valid(),
        }),
        tcp: frame.tcp.as_ref().map(|tcp| TcpSummary {
            source_port: tcp.source_port,
            destination_port: tcp.destination_port,
            sequence_number: tcp.sequence_number,
            acknowledgment_number: tcp.acknowledgment_number,
            flags: tcp.flags.to_string(),
            window_size: tcp.window_size,
            options: tcp.options.iter().map(|opt| opt.to_string()).collect(),
            payload_length: tcp.payload.len(),
        }),
        http: frame.http.as_ref().map(|http| match &http.start_line {
            StartLine::Request {
                method,
                target,
                version,
            } => HttpSummary {
                kind: "request".to_string(),
                method: Some(method.clone()),
                target: Some(target.clone()),
                status_code: None,
                version: version.clone(),
                header_count: http.headers.len(),
                host: http.header("Host").map(str::to_string),
            },
            StartLine::Response {
                version,
                status_code,
                ..
            } => HttpSummary {
                kind: "response".to_string(),
                method: None,
                target: None,
                status_code: Some(*status_code),
                version: version.clone(),
                header_count: http.headers.len(),
                host: None,
            },
        }),
    }
}

fn nanos_to_rfc3339(nanos: i128) -> Option<String> {
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use super::nanos_to_rfc3339;

    #[test]
    fn formats_epoch_offsets() {
        assert_eq!(nanos_to_rfc3339(0).as_deref(), Some("1970-01-01T00:00:00Z"));
        let formatted = nanos_to_rfc3339(1_500_000_000).unwrap();
        assert!(formatted.starts_with("1970-01-01T00:00:01.5"));
    }
}
