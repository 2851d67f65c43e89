//! # lbrykit Resolve
//!
//! Turns references (URIs, claim IDs, names) into claim records.
//!
//! ## Single references
//!
//! [`Resolver::resolve`] queries the network: URIs through `resolve`,
//! claim IDs and names through `claim_search`. A missing claim is
//! [`Resolution::NotFound`] and a claim withheld by the hub is
//! [`Resolution::Blocked`]; neither is an error. Reposts are replaced by
//! their original on request.
//!
//! [`Resolver::resolve_local`] looks among downloaded files instead.
//!
//! ## Batches
//!
//! [`Resolver::resolve_all`] resolves many references on a bounded worker
//! pool and returns one [`lbrykit_core::ResolvedPair`] per input, in input
//! order:
//!
//! ```text
//! refs     [r0, r1, r2, r3, r4]
//! queue    (0,r0) (1,r1) (2,r2) (3,r3) (4,r4)
//! workers  w0: 0, 3     w1: 1, 4     w2: 2
//! slots    [c0, None, c2, c3, None]    filled by index
//! ```

pub mod batch;
pub mod error;
pub mod resolver;

pub use batch::{BatchConfig, BatchReport, DEFAULT_CONCURRENCY};
pub use error::{ResolveError, Result};
pub use resolver::{Mode, Record, Resolution, Resolver};
