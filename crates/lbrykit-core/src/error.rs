//! Error types for lbrykit Core.

use thiserror::Error;

use crate::amount::Amount;
use crate::types::ClaimId;

/// Errors raised while building or checking core values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid claim id {0:?}: expected 40 hexadecimal characters")]
    InvalidClaimId(String),

    #[error("invalid claim name {0:?}: names cannot be empty or contain '#', ':' or '@'")]
    InvalidName(String),

    #[error("invalid uri: {0:?}")]
    InvalidUri(String),

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("no uri, claim id or name given")]
    EmptyQuery,

    /// The claim's total stake is smaller than the caller's own supports.
    #[error(
        "inconsistent support on {claim_id}: existing {existing} is less than our support {old}"
    )]
    InconsistentSupport {
        claim_id: ClaimId,
        existing: Amount,
        old: Amount,
    },
}
