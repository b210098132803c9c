//! Cross-frame consistency checks.
//!
//! These run after per-frame decoding, only read the decoded frames, and may
//! be applied to any subset of them.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::protocols::ethernet::{EtherType, MacAddr};

use super::frame::DecodedFrame;

/// A check was run on frames that do not meet its precondition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport protocol comparison requires IPv4 on every frame; frame {frame_index} has {found}")]
pub struct PreconditionError {
    pub frame_index: u64,
    pub found: String,
}

/// True when every frame carries the EtherType of the first frame.
///
/// A frame without a decoded Ethernet header never matches. An empty slice
/// is trivially uniform.
pub fn same_link_protocol(frames: &[DecodedFrame<'_>]) -> bool {
    let mut ether_types = frames
        .iter()
        .map(|frame| frame.ethernet.as_ref().map(|eth| eth.ether_type));
    match ether_types.next() {
        None => true,
        Some(None) => false,
        Some(first) => ether_types.all(|ether_type| ether_type == first),
    }
}

/// True when every frame's IPv4 protocol number equals the first frame's.
///
/// # Errors
/// [`PreconditionError`] when any frame lacks a decoded IPv4 header; call
/// [`same_link_protocol`] first to tell mixed captures apart.
pub fn same_transport_protocol(frames: &[DecodedFrame<'_>]) -> Result<bool, PreconditionError> {
    let mut first = None;
    let mut uniform = true;
    for frame in frames {
        let code = match (&frame.ethernet, &frame.ipv4) {
            (_, Some(ipv4)) => ipv4.protocol.code,
            (Some(eth), None) if eth.ether_type != EtherType::Ipv4 => {
                return Err(PreconditionError {
                    frame_index: frame.record.index,
                    found: format!("EtherType {}", eth.ether_type),
                });
            }
            (Some(_), None) => {
                return Err(PreconditionError {
                    frame_index: frame.record.index,
                    found: "an undecodable IPv4 header".to_string(),
                });
            }
            (None, None) => {
                return Err(PreconditionError {
                    frame_index: frame.record.index,
                    found: "no Ethernet header".to_string(),
                });
            }
        };
        match first {
            None => first = Some(code),
            Some(expected) if expected != code => uniform = false,
            Some(_) => {}
        }
    }
    Ok(uniform)
}

/// Every source and destination MAC address seen, in sorted order.
pub fn unique_mac_addresses(frames: &[DecodedFrame<'_>]) -> BTreeSet<MacAddr> {
    frames
        .iter()
        .filter_map(|frame| frame.ethernet.as_ref())
        .flat_map(|eth| [eth.source, eth.destination])
        .collect()
}
