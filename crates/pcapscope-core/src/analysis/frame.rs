use crate::protocols::ethernet::layout::HEADER_LEN as ETHERNET_HEADER_LEN;
use crate::protocols::ethernet::{EtherType, EthernetHeader, decode_ethernet};
use crate::protocols::http::{HttpMessage, decode_http};
use crate::protocols::ipv4::{Ipv4Header, decode_ipv4};
use crate::protocols::registry::IP_PROTO_TCP;
use crate::protocols::tcp::{TcpHeader, decode_tcp};
use crate::source::FrameRecord;
use crate::{Diagnostic, DiagnosticKind, Layer};

use super::DecodeOptions;

/// A frame together with every layer that decoded successfully.
///
/// Decoding stops at the first layer that fails; the failure is kept in
/// `diagnostics` and the layers above it stay `None`.
#[derive(Debug, Clone)]
pub struct DecodedFrame<'a> {
    pub record: FrameRecord<'a>,
    pub ethernet: Option<EthernetHeader<'a>>,
    pub ipv4: Option<Ipv4Header<'a>>,
    pub tcp: Option<TcpHeader<'a>>,
    pub http: Option<HttpMessage>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> DecodedFrame<'a> {
    /// A frame whose link type is not decoded.
    pub fn undecoded(record: FrameRecord<'a>) -> Self {
        Self {
            record,
            ethernet: None,
            ipv4: None,
            tcp: None,
            http: None,
            diagnostics: Vec::new(),
        }
    }

    fn diagnose(&mut self, kind: DiagnosticKind, layer: Layer, message: String) {
        tracing::debug!(frame = self.record.index, ?layer, %message, "frame diagnostic");
        self.diagnostics.push(Diagnostic {
            frame_index: Some(self.record.index),
            kind,
            layer,
            message,
        });
    }
}

/// Decode an Ethernet frame layer by layer: Ethernet, then IPv4 when the
/// EtherType says so, then TCP when the IPv4 protocol is 6, then HTTP when
/// enabled and the segment carries payload.
pub fn decode_frame<'a>(record: FrameRecord<'a>, options: &DecodeOptions) -> DecodedFrame<'a> {
    let mut frame = DecodedFrame::undecoded(record);
    let bytes = record.payload;

    let ethernet = match decode_ethernet(bytes) {
        Ok(ethernet) => ethernet,
        Err(err) => {
            frame.diagnose(DiagnosticKind::TruncatedRecord, Layer::Link, err.to_string());
            return frame;
        }
    };
    frame.ethernet = Some(ethernet);
    if ethernet.ether_type != EtherType::Ipv4 {
        return frame;
    }

    let ipv4 = match decode_ipv4(bytes, ETHERNET_HEADER_LEN) {
        Ok(ipv4) => ipv4,
        Err(err) => {
            frame.diagnose(DiagnosticKind::MalformedHeader, Layer::Network, err.to_string());
            return frame;
        }
    };
    // Ethernet padding past the IPv4 total length is not part of the segment.
    let datagram = bytes.get(..ipv4.payload_range.end).unwrap_or(bytes);
    let transport_offset = ipv4.payload_range.start;
    // Only the first fragment carries the transport header.
    let is_tcp = ipv4.protocol.code == IP_PROTO_TCP && ipv4.fragment_offset == 0;
    frame.ipv4 = Some(ipv4);
    if !is_tcp {
        return frame;
    }

    let tcp = match decode_tcp(datagram, transport_offset) {
        Ok(tcp) => tcp,
        Err(err) => {
            frame.diagnose(DiagnosticKind::MalformedHeader, Layer::Transport, err.to_string());
            return frame;
        }
    };
    let payload_offset = tcp.payload_offset;
    let has_payload = !tcp.payload.is_empty();
    frame.tcp = Some(tcp);
    if !options.decode_http || !has_payload {
        return frame;
    }

    match decode_http(datagram, payload_offset) {
        Ok(http) => frame.http = http,
        Err(err) => {
            frame.diagnose(DiagnosticKind::MalformedHeader, Layer::Application, err.to_string())
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::decode_frame;
    use crate::analysis::DecodeOptions;
    use crate::protocols::ethernet::EtherType;
    use crate::protocols::http::StartLine;
    use crate::source::{FrameRecord, TimestampPrecision};
    use crate::{DiagnosticKind, Layer};
    use etherparse::PacketBuilder;

    fn record(payload: &[u8]) -> FrameRecord<'_> {
        FrameRecord {
            index: 3,
            offset: 24,
            timestamp_seconds: 1,
            timestamp_fraction: 0,
            precision: TimestampPrecision::Micro,
            captured_length: payload.len() as u32,
            original_length: payload.len() as u32,
            payload,
        }
    }

    fn tcp_frame(payload: &[u8]) -> Vec<u8> {
        let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [6, 5, 4, 3, 2, 1])
            .ipv4([10, 1, 1, 1], [10, 1, 1, 2], 32)
            .tcp(50123, 80, 7, 512);
        let mut frame = Vec::<u8>::with_capacity(builder.size(payload.len()));
        builder.write(&mut frame, payload).unwrap();
        frame
    }

    #[test]
    fn decodes_every_layer_of_an_http_request() {
        let bytes = tcp_frame(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n");
        let frame = decode_frame(record(&bytes), &DecodeOptions::default());
        assert!(frame.diagnostics.is_empty());
        assert_eq!(frame.ethernet.unwrap().ether_type, EtherType::Ipv4);
        assert_eq!(frame.ipv4.as_ref().unwrap().protocol.code, 6);
        assert_eq!(frame.tcp.as_ref().unwrap().destination_port, 80);
        let http = frame.http.unwrap();
        assert!(matches!(http.start_line, StartLine::Request { .. }));
    }

    #[test]
    fn http_layer_can_be_disabled() {
        let bytes = tcp_frame(b"GET / HTTP/1.1\r\n\r\n");
        let frame = decode_frame(
            record(&bytes),
            &DecodeOptions {
                decode_http: false,
                ..DecodeOptions::default()
            },
        );
        assert!(frame.tcp.is_some());
        assert!(frame.http.is_none());
    }

    #[test]
    fn udp_stops_after_network_layer() {
        let builder = PacketBuilder::ethernet2([1; 6], [2; 6])
            .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .udp(53, 53);
        let mut bytes = Vec::new();
        builder.write(&mut bytes, &[0u8; 4]).unwrap();

        let frame = decode_frame(record(&bytes), &DecodeOptions::default());
        assert!(frame.ipv4.is_some());
        assert!(frame.tcp.is_none());
        assert!(frame.diagnostics.is_empty());
    }

    #[test]
    fn later_tcp_fragment_stops_after_network_layer() {
        let mut bytes = vec![0u8; 14 + 20 + 24];
        bytes[0..6].copy_from_slice(&[2; 6]);
        bytes[6..12].copy_from_slice(&[1; 6]);
        bytes[12..14].copy_from_slice(&0x0800u16.to_be_bytes());
        bytes[14] = 0x45;
        bytes[16..18].copy_from_slice(&44u16.to_be_bytes());
        bytes[20..22].copy_from_slice(&185u16.to_be_bytes());
        bytes[22] = 64;
        bytes[23] = 6;
        bytes[26..30].copy_from_slice(&[10, 0, 0, 1]);
        bytes[30..34].copy_from_slice(&[10, 0, 0, 2]);

        let frame = decode_frame(record(&bytes), &DecodeOptions::default());
        let ipv4 = frame.ipv4.as_ref().unwrap();
        assert_eq!(ipv4.fragment_offset, 185);
        assert_eq!(ipv4.protocol.code, 6);
        assert!(frame.tcp.is_none());
        assert!(frame.diagnostics.is_empty());
    }

    #[test]
    fn short_frame_is_truncated_record() {
        let bytes = [0u8; 10];
        let frame = decode_frame(record(&bytes), &DecodeOptions::default());
        assert!(frame.ethernet.is_none());
        assert_eq!(frame.diagnostics.len(), 1);
        assert_eq!(frame.diagnostics[0].kind, DiagnosticKind::TruncatedRecord);
        assert_eq!(frame.diagnostics[0].layer, Layer::Link);
        assert_eq!(frame.diagnostics[0].frame_index, Some(3));
    }

    #[test]
    fn bad_ihl_is_malformed_and_stops_decoding() {
        let mut bytes = tcp_frame(&[]);
        bytes[14] = 0x42;
        let frame = decode_frame(record(&bytes), &DecodeOptions::default());
        assert!(frame.ethernet.is_some());
        assert!(frame.ipv4.is_none());
        assert!(frame.tcp.is_none());
        assert_eq!(frame.diagnostics[0].kind, DiagnosticKind::MalformedHeader);
        assert_eq!(frame.diagnostics[0].layer, Layer::Network);
    }

    #[test]
    fn bad_data_offset_is_malformed_transport() {
        let mut bytes = tcp_frame(&[]);
        bytes[14 + 20 + 12] = 0x30;
        let frame = decode_frame(record(&bytes), &DecodeOptions::default());
        assert!(frame.ipv4.is_some());
        assert!(frame.tcp.is_none());
        assert_eq!(frame.diagnostics[0].layer, Layer::Transport);
    }

    #[test]
    fn tcp_payload_excludes_ethernet_padding() {
        let mut bytes = tcp_frame(&[]);
        bytes.extend_from_slice(&[0u8; 6]);
        let frame = decode_frame(record(&bytes), &DecodeOptions::default());
        assert!(frame.tcp.unwrap().payload.is_empty());
        assert!(frame.http.is_none());
    }
}
