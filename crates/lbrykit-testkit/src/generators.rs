//! Proptest generators for property-based testing.

use proptest::prelude::*;

use lbrykit_core::{Amount, Claim, ClaimId, ClaimRef, SupportState};

use crate::fixtures::{claim_id, ClaimBuilder};

/// Generate a random ClaimId.
pub fn any_claim_id() -> impl Strategy<Value = ClaimId> {
    any::<[u8; 20]>().prop_map(ClaimId::from_bytes)
}

/// Generate a plausible release time (2016 to 2033).
pub fn release_time() -> impl Strategy<Value = i64> {
    1_460_000_000i64..2_000_000_000i64
}

/// Generate an amount between 0 and 10 000 LBC with full precision.
pub fn amount() -> impl Strategy<Value = Amount> {
    (0i64..1_000_000_000_000).prop_map(Amount::from_deweys)
}

/// Generate a claim name.
pub fn claim_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Parameters for generating a claim.
#[derive(Debug, Clone)]
pub struct ClaimParams {
    /// Small, so that collections contain repeated IDs.
    pub id: u64,
    pub name: String,
    pub release_time: Option<i64>,
    pub timestamp: i64,
    pub size: Option<u64>,
    pub duration: u64,
}

impl Arbitrary for ClaimParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            0u64..64, // id
            claim_name(),
            prop::option::of(release_time()),
            release_time(), // timestamp
            prop::option::of(0u64..(4 << 30)),
            0u64..36_000,
        )
            .prop_map(|(id, name, release_time, timestamp, size, duration)| ClaimParams {
                id,
                name,
                release_time,
                timestamp,
                size,
                duration,
            })
            .boxed()
    }
}

/// Build a claim from parameters.
pub fn claim_from_params(params: &ClaimParams) -> Claim {
    let mut builder = ClaimBuilder::new(params.id, &params.name)
        .timestamp(params.timestamp)
        .video(params.duration);
    if let Some(release_time) = params.release_time {
        builder = builder.release_time(release_time);
    }
    if let Some(size) = params.size {
        builder = builder.source(size);
    }
    builder.build()
}

/// Generate a claim collection of up to `max_len` records, with repeats.
pub fn claims(max_len: usize) -> impl Strategy<Value = Vec<Claim>> {
    prop::collection::vec(any::<ClaimParams>(), 0..=max_len)
        .prop_map(|params| params.iter().map(claim_from_params).collect())
}

/// Generate a reference of any kind, pointing at fixture claims `0..64`.
pub fn claim_ref() -> impl Strategy<Value = ClaimRef> {
    prop_oneof![
        (0u64..64).prop_map(|n| ClaimRef::ClaimId(claim_id(n))),
        claim_name().prop_map(ClaimRef::Uri),
        claim_name().prop_map(ClaimRef::Name),
    ]
}

/// Generate a consistent stake breakdown: base and ours, both
/// non-negative.
pub fn support_state() -> impl Strategy<Value = SupportState> {
    (any_claim_id(), amount(), amount()).prop_map(|(claim_id, base, old)| SupportState {
        canonical_url: None,
        claim_id,
        name: "claim".into(),
        existing_support: base + old,
        base_support: base,
        old_support: old,
    })
}
