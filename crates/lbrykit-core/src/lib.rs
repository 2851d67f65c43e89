//! # lbrykit Core
//!
//! Pure data model for claims published on the LBRY network, plus the
//! computations that operate on collections of them.
//!
//! This crate contains no I/O and no networking. Everything that talks to
//! the daemon lives in `lbrykit-rpc` and the crates above it.
//!
//! ## Key Types
//!
//! - [`ClaimId`] - 40-character hexadecimal claim identifier
//! - [`ClaimRef`] - A URI, claim ID, or name used to locate a claim
//! - [`Claim`] - A claim record as returned by `resolve` and `claim_search`
//! - [`LocalFile`] - A downloaded claim as returned by `file_list`
//! - [`Amount`] - Fixed-point LBC amount with 8 decimal places
//! - [`SupportState`] - Stake breakdown of a claim (base + ours)
//!
//! ## Collections
//!
//! - [`normalize`] - Fill release times, sort, deduplicate, truncate
//! - [`aggregate`] - Total byte size and media duration

pub mod aggregate;
pub mod amount;
pub mod claim;
pub mod error;
pub mod lenient;
pub mod normalize;
pub mod support;
pub mod types;

pub use aggregate::{aggregate, AggregateSize};
pub use amount::Amount;
pub use claim::{
    Claim, ClaimMeta, ClaimRecord, ClaimValue, LocalFile, Media, ResolvedPair, Source, SourceMode,
};
pub use error::CoreError;
pub use normalize::{fill_release_times, normalize, sort_by_release};
pub use support::{plan_target, SupportAction, SupportState, TargetPlan};
pub use types::{validate_name, ClaimId, ClaimQuery, ClaimRef, RefKind};
