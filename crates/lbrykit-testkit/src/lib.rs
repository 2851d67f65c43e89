//! # lbrykit Testkit
//!
//! Testing utilities for lbrykit.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: claim builders and a [`lbrykit_rpc::MemoryDaemon`]
//!   seeded with a channel and its downloads
//! - **Generators**: Proptest strategies for claims, references and stakes
//! - **Golden scenarios**: Worked examples with known answers for
//!   target-support arithmetic, normalization and aggregation
//!
//! ## Golden Scenarios
//!
//! ```rust
//! use lbrykit_testkit::vectors::{support_vectors, verify_support_vectors};
//!
//! verify_support_vectors().unwrap();
//! for vector in support_vectors() {
//!     println!("{}: must add {}", vector.name, vector.expected_must_add);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use lbrykit_testkit::generators::claims;
//!
//! proptest! {
//!     #[test]
//!     fn normalize_never_grows(claims in claims(50)) {
//!         let len = claims.len();
//!         prop_assert!(lbrykit_core::normalize(claims, 0, false).len() <= len);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use lbrykit_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new(10);
//! assert_eq!(fixture.videos.len(), 10);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{channel_videos, claim_id, local_file, noisy_listing, ClaimBuilder, TestFixture};
pub use generators::{claim_from_params, ClaimParams};
pub use vectors::{
    normalize_vectors, support_vectors, verify_aggregate_example, verify_normalize_vectors,
    verify_support_vectors, NormalizeVector, SupportVector,
};
