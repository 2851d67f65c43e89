//! Golden scenarios for deterministic verification.
//!
//! Worked examples with known answers: target-support arithmetic,
//! normalization and aggregation. Each scenario can be checked against the
//! pure functions, or seeded into a [`MemoryDaemon`] to check the full
//! client path.

use lbrykit_core::{
    aggregate, normalize, plan_target, Amount, Claim, ClaimRef, SupportAction, SupportState,
};
use lbrykit_rpc::MemoryDaemon;

use crate::fixtures::{claim_id, ClaimBuilder};

// ─────────────────────────────────────────────────────────────────────────────
// Support
// ─────────────────────────────────────────────────────────────────────────────

/// A target-support scenario. Amounts are whole LBC.
#[derive(Debug, Clone)]
pub struct SupportVector {
    pub name: &'static str,
    /// Owner deposit.
    pub claim_amount: i64,
    /// Supports by others.
    pub others_support: i64,
    /// Supports by the caller.
    pub our_support: i64,
    pub target: i64,
    pub expected_must_add: i64,
    pub expected_new_support: i64,
    pub expected_action: SupportAction,
}

impl SupportVector {
    pub fn claim(&self) -> Claim {
        ClaimBuilder::new(1, "supported")
            .stake(self.claim_amount, self.others_support + self.our_support)
            .build()
    }

    pub fn state(&self) -> SupportState {
        SupportState {
            canonical_url: self.claim().canonical_url,
            claim_id: claim_id(1),
            name: "supported".into(),
            existing_support: Amount::from_lbc(
                self.claim_amount + self.others_support + self.our_support,
            ),
            base_support: Amount::from_lbc(self.claim_amount + self.others_support),
            old_support: Amount::from_lbc(self.our_support),
        }
    }

    /// Publish the claim and the caller's support on `daemon`, returning a
    /// reference to the claim.
    pub fn seed(&self, daemon: &MemoryDaemon) -> ClaimRef {
        let mut claim = self.claim();
        claim.meta.support_amount = Amount::from_lbc(self.others_support);
        daemon.add_claim(claim);
        if self.our_support > 0 {
            daemon.add_support(claim_id(1), "supported", Amount::from_lbc(self.our_support));
        }
        ClaimRef::ClaimId(claim_id(1))
    }
}

/// Get all support scenarios.
pub fn support_vectors() -> Vec<SupportVector> {
    vec![
        SupportVector {
            name: "target above base with no support of ours",
            claim_amount: 100,
            others_support: 50,
            our_support: 0,
            target: 500,
            expected_must_add: 350,
            expected_new_support: 350,
            expected_action: SupportAction::Create {
                amount: Amount::from_lbc(350),
            },
        },
        SupportVector {
            name: "target below base removes our support",
            claim_amount: 100,
            others_support: 50,
            our_support: 300,
            target: 100,
            expected_must_add: -300,
            expected_new_support: 0,
            expected_action: SupportAction::Abandon { keep: Amount::ZERO },
        },
        SupportVector {
            name: "target below base with nothing of ours",
            claim_amount: 100,
            others_support: 50,
            our_support: 0,
            target: 100,
            expected_must_add: 0,
            expected_new_support: 0,
            expected_action: SupportAction::None,
        },
        SupportVector {
            name: "target equal to existing stake",
            claim_amount: 100,
            others_support: 50,
            our_support: 300,
            target: 450,
            expected_must_add: 0,
            expected_new_support: 300,
            expected_action: SupportAction::None,
        },
        SupportVector {
            name: "target above base lowers our support",
            claim_amount: 100,
            others_support: 50,
            our_support: 300,
            target: 200,
            expected_must_add: -250,
            expected_new_support: 50,
            expected_action: SupportAction::Abandon {
                keep: Amount::from_lbc(50),
            },
        },
        SupportVector {
            name: "target above base raises our support",
            claim_amount: 100,
            others_support: 50,
            our_support: 300,
            target: 1000,
            expected_must_add: 550,
            expected_new_support: 850,
            expected_action: SupportAction::Abandon {
                keep: Amount::from_lbc(850),
            },
        },
        SupportVector {
            name: "target equal to base",
            claim_amount: 100,
            others_support: 50,
            our_support: 20,
            target: 150,
            expected_must_add: 0,
            expected_new_support: 0,
            expected_action: SupportAction::Abandon { keep: Amount::ZERO },
        },
    ]
}

/// Check every support scenario against the planner.
pub fn verify_support_vectors() -> Result<(), String> {
    for vector in support_vectors() {
        let plan = plan_target(&vector.state(), Amount::from_lbc(vector.target));
        let got = (plan.must_add, plan.new_support, plan.action);
        let want = (
            Amount::from_lbc(vector.expected_must_add),
            Amount::from_lbc(vector.expected_new_support),
            vector.expected_action,
        );
        if got != want {
            return Err(format!("{}: got {:?}, want {:?}", vector.name, got, want));
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalization & Aggregation
// ─────────────────────────────────────────────────────────────────────────────

/// A normalization scenario over `(fixture id, release time)` pairs.
#[derive(Debug, Clone)]
pub struct NormalizeVector {
    pub name: &'static str,
    pub input: &'static [(u64, i64)],
    pub max_count: usize,
    pub newest_first: bool,
    pub expected: &'static [(u64, i64)],
}

impl NormalizeVector {
    pub fn claims(&self) -> Vec<Claim> {
        self.input
            .iter()
            .map(|&(id, release_time)| {
                ClaimBuilder::new(id, &format!("c{}", id))
                    .release_time(release_time)
                    .build()
            })
            .collect()
    }
}

/// Get all normalization scenarios.
pub fn normalize_vectors() -> Vec<NormalizeVector> {
    vec![
        NormalizeVector {
            name: "older duplicate dropped, oldest first",
            input: &[(0xA, 10), (0xB, 5), (0xA, 20)],
            max_count: 0,
            newest_first: false,
            expected: &[(0xB, 5), (0xA, 20)],
        },
        NormalizeVector {
            name: "newest first",
            input: &[(1, 10), (2, 30), (3, 20)],
            max_count: 0,
            newest_first: true,
            expected: &[(2, 30), (3, 20), (1, 10)],
        },
        NormalizeVector {
            name: "keep the newest two, oldest first",
            input: &[(1, 10), (2, 30), (3, 20), (4, 5)],
            max_count: 2,
            newest_first: false,
            expected: &[(3, 20), (2, 30)],
        },
        NormalizeVector {
            name: "empty",
            input: &[],
            max_count: 3,
            newest_first: false,
            expected: &[],
        },
    ]
}

/// Check every normalization scenario.
pub fn verify_normalize_vectors() -> Result<(), String> {
    for vector in normalize_vectors() {
        let got: Vec<(u64, i64)> = normalize(vector.claims(), vector.max_count, vector.newest_first)
            .iter()
            .map(|c| {
                let id = vector
                    .input
                    .iter()
                    .map(|&(id, _)| id)
                    .find(|&id| claim_id(id) == c.claim_id)
                    .unwrap_or(u64::MAX);
                (id, c.value.release_time.unwrap_or(i64::MIN))
            })
            .collect();
        if got != vector.expected {
            return Err(format!("{}: got {:?}, want {:?}", vector.name, got, vector.expected));
        }
    }
    Ok(())
}

/// The aggregation example: one 1 MiB video of two minutes and one
/// record without a source.
pub fn aggregate_example() -> Vec<Claim> {
    vec![
        ClaimBuilder::new(1, "video").source(1_048_576).video(120).build(),
        ClaimBuilder::new(2, "post").build(),
    ]
}

/// Check the aggregation example.
pub fn verify_aggregate_example() -> Result<(), String> {
    let size = aggregate(&aggregate_example());
    let got = (size.total_bytes, size.total_seconds, size.claim_count, size.missing_source);
    let want = (1_048_576, 120, 2, 1);
    if got != want {
        return Err(format!("aggregate: got {:?}, want {:?}", got, want));
    }
    Ok(())
}
