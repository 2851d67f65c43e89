//! # lbrykit Support
//!
//! Measures and adjusts the caller's supports (stake) on claims.
//!
//! ## Overview
//!
//! A claim's total stake is the owner's deposit plus every support on it.
//! The part placed by the caller is `old_support`; the rest is
//! `base_support`, which the caller cannot change.
//!
//! ```text
//! existing_support = claim.amount + claim.meta.support_amount
//!                  = base_support + old_support
//! ```
//!
//! ## Operations
//!
//! - [`Reconciler::create_support`] - add a new support of a fixed amount
//! - [`Reconciler::set_support`] - keep exactly this much of ours (0 = remove)
//! - [`Reconciler::target_support`] - reach a total stake, or do nothing
//! - [`Reconciler::list_supports`] - every support, split by claim validity
//! - [`Reconciler::abandon_invalid_support`] - reclaim stake from a claim
//!   that no longer resolves
//!
//! Every operation returns a [`SupportOutcome`]. A rejected transaction is
//! [`SupportError::TransactionFailed`], carrying the measured state and the
//! daemon's error.

pub mod error;
pub mod outcome;
pub mod reconciler;

pub use error::{Result, SupportError};
pub use outcome::{SupportInventory, SupportOutcome, SupportRecord};
pub use reconciler::{InvalidSelector, Reconciler, SupportConfig};
