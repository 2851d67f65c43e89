//! Stake arithmetic for supports.
//!
//! A claim's stake splits into the part the caller controls (`old_support`)
//! and everything else (`base_support`). The planner decides which single
//! daemon call, if any, moves the total to a target.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::claim::Claim;
use crate::error::CoreError;
use crate::types::ClaimId;

/// Stake on a claim, measured right before a decision.
///
/// Invariant: `existing_support == base_support + old_support` and
/// `base_support >= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportState {
    /// Absent for claims that no longer resolve.
    pub canonical_url: Option<String>,
    pub claim_id: ClaimId,
    pub name: String,
    pub existing_support: Amount,
    pub base_support: Amount,
    pub old_support: Amount,
}

impl SupportState {
    /// Measure a resolved claim given the amounts of the caller's supports
    /// on it.
    pub fn measure(
        claim: &Claim,
        our_supports: impl IntoIterator<Item = Amount>,
    ) -> Result<Self, CoreError> {
        let existing = claim.total_stake();
        let old: Amount = our_supports.into_iter().sum();
        let base = existing - old;

        if base.is_negative() {
            return Err(CoreError::InconsistentSupport {
                claim_id: claim.claim_id,
                existing,
                old,
            });
        }

        Ok(Self {
            canonical_url: claim.canonical_url.clone(),
            claim_id: claim.claim_id,
            name: claim.name.clone(),
            existing_support: existing,
            base_support: base,
            old_support: old,
        })
    }

    /// State of a claim that no longer resolves: only our stake is known.
    pub fn invalid(claim_id: ClaimId, name: impl Into<String>, old: Amount) -> Self {
        Self {
            canonical_url: None,
            claim_id,
            name: name.into(),
            existing_support: old,
            base_support: Amount::ZERO,
            old_support: old,
        }
    }
}

/// The daemon call a plan requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SupportAction {
    /// Nothing to do.
    None,
    /// `support_create` with this amount.
    Create { amount: Amount },
    /// `support_abandon` keeping this amount.
    Abandon { keep: Amount },
}

/// Result of planning a move to a target stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPlan {
    pub target: Amount,
    /// Change to the caller's stake; negative when stake is removed.
    pub must_add: Amount,
    /// Caller's stake after the action.
    pub new_support: Amount,
    pub action: SupportAction,
}

/// Plan how to bring a claim's total stake to `target`.
///
/// - Above base: our support becomes `target - base`.
/// - Below base: our support cannot help, so any we hold is removed.
/// - Equal to base: nothing is added and our support resets to zero.
///
/// No action is planned when our support would not change.
pub fn plan_target(state: &SupportState, target: Amount) -> TargetPlan {
    let target = target.abs();

    let (must_add, new_support) = if target > state.base_support {
        let must_add = target - state.existing_support;
        (must_add, state.old_support + must_add)
    } else if target == state.base_support || state.old_support.is_zero() {
        (Amount::ZERO, Amount::ZERO)
    } else {
        (-state.old_support, Amount::ZERO)
    };

    let action = if new_support == state.old_support {
        SupportAction::None
    } else if state.old_support.is_zero() && new_support.is_positive() {
        SupportAction::Create {
            amount: new_support,
        }
    } else {
        SupportAction::Abandon { keep: new_support }
    };

    TargetPlan {
        target,
        must_add,
        new_support,
        action,
    }
}
