use std::fmt;

use crate::protocols::common::ByteView;

use super::error::TcpError;
use super::layout::{self, option_kind};

/// One decoded TCP option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TcpOption {
    EndOfList,
    Nop,
    MaximumSegmentSize(u16),
    WindowScale(u8),
    SackPermitted,
    /// Left and right edges of each SACK block.
    Sack(Vec<(u32, u32)>),
    Timestamp { value: u32, echo_reply: u32 },
    Unknown { kind: u8, data: Vec<u8> },
}

impl fmt::Display for TcpOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TcpOption::EndOfList => f.write_str("EOL"),
            TcpOption::Nop => f.write_str("NOP"),
            TcpOption::MaximumSegmentSize(mss) => write!(f, "MSS={mss}"),
            TcpOption::WindowScale(shift) => write!(f, "WS={shift}"),
            TcpOption::SackPermitted => f.write_str("SACK_PERM"),
            TcpOption::Sack(blocks) => write!(f, "SACK({})", blocks.len()),
            TcpOption::Timestamp { value, echo_reply } => write!(f, "TS={value}/{echo_reply}"),
            TcpOption::Unknown { kind, .. } => write!(f, "KIND{kind}"),
        }
    }
}

/// Decode the options area (the bytes between offset 20 and the data offset).
///
/// Parsing stops at an end-of-list option; any bytes after it are padding.
pub fn read_options(options: &[u8]) -> Result<Vec<TcpOption>, TcpError> {
    let view = ByteView::new(options);
    let mut decoded = Vec::new();
    let mut position = 0;

    while position < view.len() {
        let kind = view.read_u8(position)?;
        match kind {
            option_kind::END_OF_LIST => {
                decoded.push(TcpOption::EndOfList);
                break;
            }
            option_kind::NOP => {
                decoded.push(TcpOption::Nop);
                position += 1;
                continue;
            }
            _ => {}
        }

        let invalid = TcpError::InvalidOption { kind, position };
        let length = view.read_u8(position + 1).map_err(|_| invalid.clone())? as usize;
        if length < 2 {
            return Err(invalid);
        }
        let body = view
            .subview(position + 2..position + length)
            .map_err(|_| invalid.clone())?;

        let option = match (kind, length) {
            (option_kind::MSS, layout::MSS_OPTION_LEN) => {
                TcpOption::MaximumSegmentSize(body.read_u16_be(0)?)
            }
            (option_kind::WINDOW_SCALE, layout::WINDOW_SCALE_OPTION_LEN) => {
                TcpOption::WindowScale(body.read_u8(0)?)
            }
            (option_kind::SACK_PERMITTED, layout::SACK_PERMITTED_OPTION_LEN) => {
                TcpOption::SackPermitted
            }
            (option_kind::SACK, _)
                if !body.is_empty() && body.len() % layout::SACK_BLOCK_LEN == 0 =>
            {
                let mut blocks = Vec::with_capacity(body.len() / layout::SACK_BLOCK_LEN);
                for start in (0..body.len()).step_by(layout::SACK_BLOCK_LEN) {
                    blocks.push((body.read_u32_be(start)?, body.read_u32_be(start + 4)?));
                }
                TcpOption::Sack(blocks)
            }
            (option_kind::TIMESTAMP, layout::TIMESTAMP_OPTION_LEN) => TcpOption::Timestamp {
                value: body.read_u32_be(0)?,
                echo_reply: body.read_u32_be(4)?,
            },
            (
                option_kind::MSS
                | option_kind::WINDOW_SCALE
                | option_kind::SACK_PERMITTED
                | option_kind::SACK
                | option_kind::TIMESTAMP,
                _,
            ) => return Err(invalid),
            _ => TcpOption::Unknown {
                kind,
                data: body.as_slice().to_vec(),
            },
        };
        decoded.push(option);
        position += length;
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::{TcpOption, read_options};
    use crate::protocols::tcp::error::TcpError;

    #[test]
    fn decodes_syn_option_set() {
        let options = [
            0x02, 0x04, 0x05, 0xb4, // MSS 1460
            0x04, 0x02, // SACK permitted
            0x08, 0x0a, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, // TS
            0x01, // NOP
            0x03, 0x03, 0x07, // WS 7
        ];
        let decoded = read_options(&options).unwrap();
        assert_eq!(
            decoded,
            vec![
                TcpOption::MaximumSegmentSize(1460),
                TcpOption::SackPermitted,
                TcpOption::Timestamp {
                    value: 1,
                    echo_reply: 0
                },
                TcpOption::Nop,
                TcpOption::WindowScale(7),
            ]
        );
    }

    #[test]
    fn decodes_sack_blocks() {
        let mut options = vec![0x05, 0x12];
        for edge in [100u32, 200, 300, 400] {
            options.extend_from_slice(&edge.to_be_bytes());
        }
        let decoded = read_options(&options).unwrap();
        assert_eq!(decoded, vec![TcpOption::Sack(vec![(100, 200), (300, 400)])]);
    }

    #[test]
    fn options_display_compactly() {
        assert_eq!(TcpOption::MaximumSegmentSize(1460).to_string(), "MSS=1460");
        assert_eq!(TcpOption::Sack(vec![(1, 2)]).to_string(), "SACK(1)");
        assert_eq!(
            TcpOption::Unknown {
                kind: 30,
                data: Vec::new()
            }
            .to_string(),
            "KIND30"
        );
    }

    #[test]
    fn end_of_list_stops_parsing() {
        let options = [0x00, 0xFF, 0xFF, 0xFF];
        assert_eq!(read_options(&options).unwrap(), vec![TcpOption::EndOfList]);
    }

    #[test]
    fn unknown_kind_keeps_data() {
        let options = [0x1e, 0x04, 0xAA, 0xBB];
        assert_eq!(
            read_options(&options).unwrap(),
            vec![TcpOption::Unknown {
                kind: 0x1e,
                data: vec![0xAA, 0xBB]
            }]
        );
    }

    #[test]
    fn option_running_past_header_is_invalid() {
        let options = [0x01, 0x02, 0x04, 0x05];
        let err = read_options(&options).unwrap_err();
        assert_eq!(
            err,
            TcpError::InvalidOption {
                kind: 2,
                position: 1
            }
        );
    }

    #[test]
    fn zero_length_option_is_invalid() {
        let options = [0x1e, 0x00, 0x00, 0x00];
        assert!(matches!(
            read_options(&options).unwrap_err(),
            TcpError::InvalidOption { kind: 0x1e, .. }
        ));
    }

    #[test]
    fn sack_without_blocks_is_invalid() {
        let options = [0x05, 0x02, 0x01, 0x01];
        assert_eq!(
            read_options(&options).unwrap_err(),
            TcpError::InvalidOption {
                kind: 0x05,
                position: 0
            }
        );
    }

    #[test]
    fn wrong_length_for_known_kind_is_invalid() {
        let options = [0x02, 0x03, 0x05, 0x00];
        assert!(read_options(&options).is_err());
    }
}
