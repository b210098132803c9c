//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader`: safe byte access and protocol conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Every decoder takes the frame bytes and an explicit offset; there is no
//! shared cursor. Decoders are pure and contain no I/O.

pub(crate) mod common;
pub mod ethernet;
pub mod http;
pub mod ipv4;
pub mod registry;
pub mod tcp;
