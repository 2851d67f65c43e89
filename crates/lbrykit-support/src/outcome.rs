//! Results of support operations.

use serde::Serialize;

use lbrykit_core::{Amount, Claim, SupportAction, SupportState};
use lbrykit_rpc::{SupportEntry, Transaction};

/// What a support operation measured, decided and committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportOutcome {
    /// Stake before the operation.
    pub state: SupportState,
    /// Requested total stake, for target operations.
    pub target: Option<Amount>,
    /// Change to the caller's stake.
    pub must_add: Amount,
    /// Caller's stake after the operation.
    pub new_support: Amount,
    pub action: SupportAction,
    /// Absent when no call was needed.
    pub transaction: Option<Transaction>,
}

impl SupportOutcome {
    /// True when nothing was sent to the daemon.
    pub fn is_noop(&self) -> bool {
        self.transaction.is_none()
    }

    /// Total stake on the claim after the operation.
    pub fn new_total(&self) -> Amount {
        self.state.base_support + self.new_support
    }
}

/// One of the caller's supports and the claim it backs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportRecord {
    pub support: SupportEntry,
    /// Absent when the claim no longer resolves.
    pub claim: Option<Claim>,
}

impl SupportRecord {
    pub fn is_valid(&self) -> bool {
        self.claim.is_some()
    }

    /// Total stake on the claim; only our own for claims that are gone.
    pub fn existing_support(&self) -> Amount {
        match &self.claim {
            Some(claim) => claim.total_stake(),
            None => self.support.amount,
        }
    }

    /// Stake not placed by this support.
    pub fn base_support(&self) -> Amount {
        self.existing_support() - self.support.amount
    }
}

/// All of the caller's supports, split by whether their claim resolves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupportInventory {
    pub all: Vec<SupportRecord>,
    pub valid: Vec<SupportRecord>,
    pub invalid: Vec<SupportRecord>,
}

impl SupportInventory {
    pub fn new(all: Vec<SupportRecord>) -> Self {
        let (valid, invalid) = all.iter().cloned().partition(SupportRecord::is_valid);
        Self {
            all,
            valid,
            invalid,
        }
    }

    /// Sum of the caller's supports.
    pub fn total(&self) -> Amount {
        self.all.iter().map(|r| r.support.amount).sum()
    }

    /// Sum of the caller's supports on claims that no longer resolve.
    pub fn total_invalid(&self) -> Amount {
        self.invalid.iter().map(|r| r.support.amount).sum()
    }
}
