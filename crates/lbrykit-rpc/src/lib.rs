//! # lbrykit RPC
//!
//! The JSON-RPC gateway to the LBRY daemon.
//!
//! ## Overview
//!
//! [`Gateway`] is the single call primitive: one method name and one
//! parameter object in, the `result` value or a typed error out. No retries
//! happen at this layer. [`GatewayExt`] adds typed wrappers for each method
//! the library consumes.
//!
//! ## Implementations
//!
//! - [`HttpGateway`] - POSTs to the daemon endpoint (default
//!   `http://localhost:5279`)
//! - [`MemoryDaemon`] - in-memory daemon with claim, file and support
//!   tables, used by tests throughout the workspace
//!
//! ## Wire format
//!
//! ```text
//! request   {"method": "support_create", "params": {"claim_id": "...", "amount": "350.00000000"}}
//! success   {"jsonrpc": "2.0", "result": {...}}
//! failure   {"jsonrpc": "2.0",
//!            "error": {"code": -32500, "message": "...", "data": {"name": "..."}}}
//! ```

pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod messages;

pub use error::{DaemonError, Result, RpcError};
pub use gateway::{
    parse_envelope, Gateway, GatewayConfig, GatewayExt, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS,
};
pub use http::HttpGateway;
pub use memory::MemoryDaemon;
pub use messages::{
    methods, Blocked, BlockingChannel, ChannelInfo, ClaimPage, ClaimSearchParams, DaemonStatus,
    FileListParams, FilePage, Page, ResolveEntry, ResolveParams, ResolveResult,
    SupportAbandonParams, SupportCreateParams, SupportEntry, SupportListParams, SupportPage,
    Transaction, DEFAULT_PAGE_SIZE,
};
