//! # lbrykit
//!
//! Client library for the LBRY daemon's JSON-RPC interface.
//!
//! ## Overview
//!
//! lbrykit resolves claims, keeps channel listings sorted and deduplicated,
//! totals their size and duration, and manages the caller's supports
//! (stake) on claims. All state lives in the daemon; the library keeps
//! none between calls.
//!
//! ```text
//!            Client
//!      ┌────────┴─────────┐
//!  Resolver ◄──────── Reconciler
//!      │                  │
//!      └────► Gateway ◄───┘
//!               │
//!        HttpGateway ──► daemon (http://localhost:5279)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use lbrykit::{Amount, Client, ClientConfig, ClaimRef};
//!
//! # async fn example() -> lbrykit::Result<()> {
//! let client = Client::connect(ClientConfig::default())?;
//!
//! let claim = ClaimRef::uri("@chan#1/video#2")?;
//! let outcome = client.target_support(&claim, Amount::from_lbc(500)).await?;
//! println!("added {}, now {}", outcome.must_add, outcome.new_total());
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! - [`core`] - claims, amounts, normalization and aggregation
//! - [`rpc`] - the gateway and wire messages
//! - [`resolve`] - single and bulk resolution
//! - [`support`] - support measurement and reconciliation

pub mod client;
pub mod config;
pub mod error;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind, Result};

// Re-export component crates
pub use lbrykit_core as core;
pub use lbrykit_resolve as resolve;
pub use lbrykit_rpc as rpc;
pub use lbrykit_support as support;

// Re-export commonly used types
pub use lbrykit_core::{
    AggregateSize, Amount, Claim, ClaimId, ClaimQuery, ClaimRecord, ClaimRef, LocalFile,
    ResolvedPair, SupportAction, SupportState,
};
pub use lbrykit_resolve::{BatchConfig, BatchReport, Mode, Record, Resolution};
pub use lbrykit_rpc::{DaemonError, Gateway, GatewayExt, HttpGateway, MemoryDaemon};
pub use lbrykit_support::{InvalidSelector, SupportInventory, SupportOutcome, SupportRecord};
