use thiserror::Error;

use crate::protocols::common::OutOfBounds;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EthernetError {
    #[error("truncated Ethernet header: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
}

impl From<OutOfBounds> for EthernetError {
    fn from(err: OutOfBounds) -> Self {
        EthernetError::Truncated {
            needed: err.needed,
            actual: err.actual,
        }
    }
}
