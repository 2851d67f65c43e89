//! Typed parameters and results for the daemon methods this library uses.
//!
//! Parameter structs omit absent fields so the daemon applies its own
//! defaults. Result structs keep unknown fields in `extra`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use lbrykit_core::{Amount, Claim, ClaimId, LocalFile};

/// Method names.
pub mod methods {
    pub const STATUS: &str = "status";
    pub const RESOLVE: &str = "resolve";
    pub const CLAIM_SEARCH: &str = "claim_search";
    pub const FILE_LIST: &str = "file_list";
    pub const SUPPORT_LIST: &str = "support_list";
    pub const SUPPORT_CREATE: &str = "support_create";
    pub const SUPPORT_ABANDON: &str = "support_abandon";
}

/// Listing page size large enough to fetch everything in one page.
pub const DEFAULT_PAGE_SIZE: u64 = 99_000;

// ─────────────────────────────────────────────────────────────────────────────
// resolve
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveParams {
    pub urls: Vec<String>,
}

impl ResolveParams {
    pub fn one(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
        }
    }
}

/// One entry of a `resolve` result, keyed by the requested URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolveEntry {
    /// Per-URL failure, e.g. `{"name": "NOT_FOUND", "text": "..."}`.
    Error { error: Value },
    Claim(Box<Claim>),
}

impl ResolveEntry {
    /// Short error label, for diagnostics.
    pub fn error_name(&self) -> Option<&str> {
        match self {
            Self::Error { error } => error.get("name").and_then(Value::as_str),
            Self::Claim(_) => None,
        }
    }

    /// Human-readable error text.
    pub fn error_text(&self) -> Option<String> {
        match self {
            Self::Error { error } => Some(
                error
                    .get("text")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string()),
            ),
            Self::Claim(_) => None,
        }
    }
}

pub type ResolveResult = HashMap<String, ResolveEntry>;

// ─────────────────────────────────────────────────────────────────────────────
// claim_search / file_list / support_list
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimSearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<ClaimId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

impl ClaimSearchParams {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_claim_id(claim_id: ClaimId) -> Self {
        Self {
            claim_id: Some(claim_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<ClaimId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<ClaimId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

/// A channel that blocks claims from search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockingChannel {
    #[serde(default)]
    pub channel: ChannelInfo,
    /// Number of claims this channel blocks in the result.
    #[serde(default)]
    pub blocked: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `blocked` section of a `claim_search` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blocked {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub channels: Vec<BlockingChannel>,
}

impl Blocked {
    /// URLs of the blocking channels, without the `lbry://` scheme.
    pub fn channel_urls(&self) -> Vec<String> {
        self.channels
            .iter()
            .filter_map(|c| {
                c.channel
                    .canonical_url
                    .as_deref()
                    .or(c.channel.name.as_deref())
            })
            .map(|url| url.trim_start_matches("lbry://").to_string())
            .collect()
    }
}

/// One page of a listing method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub page_size: u64,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_pages: u64,
    /// Present on `claim_search` results only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<Blocked>,
}

impl<T> Page<T> {
    /// A single page holding every item.
    pub fn single(items: Vec<T>, page_size: u64) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            page: 1,
            page_size,
            total_items: total,
            total_pages: u64::from(total > 0),
            blocked: None,
        }
    }

    /// Number of claims withheld by blocking channels.
    pub fn blocked_total(&self) -> u64 {
        self.blocked.as_ref().map_or(0, |b| b.total)
    }
}

pub type ClaimPage = Page<Claim>;
pub type FilePage = Page<LocalFile>;
pub type SupportPage = Page<SupportEntry>;

/// One of the caller's supports as listed by `support_list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportEntry {
    pub claim_id: ClaimId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nout: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SupportEntry {
    pub fn new(claim_id: ClaimId, name: impl Into<String>, amount: Amount) -> Self {
        Self {
            claim_id,
            name: name.into(),
            amount,
            txid: None,
            nout: None,
            extra: Map::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// support_create / support_abandon
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportCreateParams {
    pub claim_id: ClaimId,
    /// Serialized with exactly 8 decimals.
    pub amount: Amount,
}

impl SupportCreateParams {
    /// The sign is dropped: a support always adds stake.
    pub fn new(claim_id: ClaimId, amount: Amount) -> Self {
        Self {
            claim_id,
            amount: amount.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportAbandonParams {
    pub claim_id: ClaimId,
    /// Amount left supported; zero abandons everything. Always sent.
    #[serde(default)]
    pub keep: Amount,
}

impl SupportAbandonParams {
    pub fn new(claim_id: ClaimId, keep: Amount) -> Self {
        Self {
            claim_id,
            keep: keep.abs(),
        }
    }
}

/// A broadcast transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: String,
    #[serde(default)]
    pub total_input: Amount,
    #[serde(default)]
    pub total_output: Amount,
    #[serde(default)]
    pub total_fee: Amount,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// status
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaemonStatus {
    #[serde(default)]
    pub is_running: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
