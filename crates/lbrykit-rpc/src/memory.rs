//! In-memory daemon for tests.
//!
//! Answers the methods this library uses from tables held in memory and
//! records every call, so tests can assert on the exact traffic a higher
//! layer produced.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use lbrykit_core::{Amount, Claim, ClaimId, LocalFile};

use crate::error::{DaemonError, Result, RpcError, METHOD_NOT_FOUND};
use crate::gateway::Gateway;
use crate::messages::{
    methods, BlockingChannel, Blocked, ChannelInfo, Page, SupportEntry, Transaction,
    DEFAULT_PAGE_SIZE,
};

/// Balance a fresh daemon starts with.
pub const DEFAULT_BALANCE: Amount = Amount::from_lbc(1_000_000);

#[derive(Debug)]
struct DaemonState {
    claims: Vec<Claim>,
    files: Vec<LocalFile>,
    supports: Vec<SupportEntry>,
    /// Claim ID -> URLs of the channels blocking it.
    blocked: HashMap<ClaimId, Vec<String>>,
    balance: Amount,
    calls: Vec<(String, Value)>,
    unreachable: bool,
    next_tx: u64,
}

/// In-memory stand-in for the daemon.
///
/// `meta.support_amount` of each claim includes the caller's supports, so
/// creating or abandoning a support moves it the way the ledger would.
#[derive(Debug)]
pub struct MemoryDaemon {
    state: RwLock<DaemonState>,
}

impl MemoryDaemon {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(DaemonState {
                claims: Vec::new(),
                files: Vec::new(),
                supports: Vec::new(),
                blocked: HashMap::new(),
                balance: DEFAULT_BALANCE,
                calls: Vec::new(),
                unreachable: false,
                next_tx: 1,
            }),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, DaemonState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, DaemonState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Setup
    // ─────────────────────────────────────────────────────────────────────────

    /// Publish a claim. Later claims with the same name come later in
    /// `claim_search` results.
    pub fn add_claim(&self, claim: Claim) {
        self.write().claims.push(claim);
    }

    /// Add a downloaded file.
    pub fn add_file(&self, file: LocalFile) {
        self.write().files.push(file);
    }

    /// Record an existing support owned by the caller.
    ///
    /// The claim's `meta.support_amount` is raised by the same amount.
    pub fn add_support(&self, claim_id: ClaimId, name: impl Into<String>, amount: Amount) {
        let mut state = self.write();
        let txid = state.new_txid();
        let mut entry = SupportEntry::new(claim_id, name, amount);
        entry.txid = Some(txid);
        entry.nout = Some(0);
        state.supports.push(entry);
        if let Some(claim) = state.claim_mut(&claim_id) {
            claim.meta.support_amount += amount;
        }
    }

    /// Withhold a claim from results, blocked by the given channels.
    pub fn block(&self, claim_id: ClaimId, channels: &[&str]) {
        self.write()
            .blocked
            .insert(claim_id, channels.iter().map(|c| c.to_string()).collect());
    }

    /// Remove a claim from the ledger; its supports and files stay.
    pub fn remove_claim(&self, claim_id: &ClaimId) {
        self.write().claims.retain(|c| c.claim_id != *claim_id);
    }

    pub fn set_balance(&self, balance: Amount) {
        self.write().balance = balance;
    }

    /// Make every call fail as if the daemon were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.write().unreachable = unreachable;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn balance(&self) -> Amount {
        self.read().balance
    }

    pub fn claim(&self, claim_id: &ClaimId) -> Option<Claim> {
        self.read()
            .claims
            .iter()
            .find(|c| c.claim_id == *claim_id)
            .cloned()
    }

    /// Sum of the caller's supports on a claim.
    pub fn our_support(&self, claim_id: &ClaimId) -> Amount {
        self.read()
            .supports
            .iter()
            .filter(|s| s.claim_id == *claim_id)
            .map(|s| s.amount)
            .sum()
    }

    /// Every call received, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.read().calls.clone()
    }

    /// Number of calls to one method.
    pub fn call_count(&self, method: &str) -> usize {
        self.read().calls.iter().filter(|(m, _)| m == method).count()
    }

    pub fn clear_calls(&self) {
        self.write().calls.clear();
    }
}

impl Default for MemoryDaemon {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for MemoryDaemon {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let mut state = self.write();
        if state.unreachable {
            return Err(RpcError::Unreachable("memory daemon is down".into()));
        }
        state.calls.push((method.to_string(), params.clone()));

        let outcome = match method {
            methods::STATUS => Ok(json!({"is_running": true})),
            methods::RESOLVE => state.resolve(&params),
            methods::CLAIM_SEARCH => state.claim_search(&params),
            methods::FILE_LIST => state.file_list(&params),
            methods::SUPPORT_LIST => state.support_list(&params),
            methods::SUPPORT_CREATE => state.support_create(&params),
            methods::SUPPORT_ABANDON => state.support_abandon(&params),
            other => Err(DaemonError::from_value(json!({
                "code": METHOD_NOT_FOUND,
                "message": format!("Invalid method requested: {}.", other),
            }))),
        };

        outcome.map_err(RpcError::Daemon)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Method handlers
// ─────────────────────────────────────────────────────────────────────────────

type Handled = std::result::Result<Value, DaemonError>;

fn param<T: DeserializeOwned>(
    params: &Value,
    key: &str,
) -> std::result::Result<Option<T>, DaemonError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| DaemonError::new("ValueError", format!("bad {}: {}", key, e))),
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Handled {
    serde_json::to_value(value).map_err(|e| DaemonError::new("EncodeError", e.to_string()))
}

fn strip_scheme(url: &str) -> &str {
    url.trim_start_matches("lbry://")
}

impl DaemonState {
    fn new_txid(&mut self) -> String {
        let txid = format!("{:064x}", self.next_tx);
        self.next_tx += 1;
        txid
    }

    fn claim_mut(&mut self, claim_id: &ClaimId) -> Option<&mut Claim> {
        self.claims.iter_mut().find(|c| c.claim_id == *claim_id)
    }

    fn page_size(params: &Value) -> u64 {
        params
            .get("page_size")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    fn resolve(&self, params: &Value) -> Handled {
        let urls: Vec<String> = match params.get("urls") {
            Some(Value::String(url)) => vec![url.clone()],
            Some(other) => serde_json::from_value(other.clone())
                .map_err(|e| DaemonError::new("ValueError", e.to_string()))?,
            None => Vec::new(),
        };

        let mut result = serde_json::Map::new();
        for url in urls {
            let wanted = strip_scheme(&url);
            // Full URLs match exactly; a bare name matches the first claim
            // published under it.
            let found = self.claims.iter().find(|c| {
                c.name == wanted
                    || [&c.canonical_url, &c.permanent_url, &c.short_url]
                        .into_iter()
                        .flatten()
                        .any(|u| strip_scheme(u) == wanted)
            });

            let entry = match found {
                Some(claim) if self.blocked.contains_key(&claim.claim_id) => json!({
                    "error": {
                        "name": "BLOCKED",
                        "text": format!(
                            "Resolve of '{}' was censored by channel with claim id '{}'.",
                            wanted,
                            self.blocked[&claim.claim_id].join(", ")
                        ),
                    }
                }),
                Some(claim) => to_value(claim)?,
                None => json!({
                    "error": {
                        "name": "NOT_FOUND",
                        "text": format!("Could not find claim at \"{}\".", url),
                    }
                }),
            };
            result.insert(url, entry);
        }

        Ok(Value::Object(result))
    }

    fn claim_search(&self, params: &Value) -> Handled {
        let claim_id: Option<ClaimId> = param(params, "claim_id")?;
        let name: Option<String> = param(params, "name")?;

        let matching = self.claims.iter().filter(|c| match (&claim_id, &name) {
            (Some(id), _) => c.claim_id == *id,
            (None, Some(name)) => c.name == *name,
            (None, None) => true,
        });

        let mut items = Vec::new();
        let mut channels: Vec<BlockingChannel> = Vec::new();
        let mut blocked_total = 0;
        for claim in matching {
            match self.blocked.get(&claim.claim_id) {
                Some(blockers) => {
                    blocked_total += 1;
                    for url in blockers {
                        channels.push(BlockingChannel {
                            channel: ChannelInfo {
                                canonical_url: Some(format!("lbry://{}", strip_scheme(url))),
                                ..ChannelInfo::default()
                            },
                            blocked: 1,
                        });
                    }
                }
                None => items.push(claim.clone()),
            }
        }

        let mut page = Page::single(items, Self::page_size(params));
        page.blocked = Some(Blocked {
            total: blocked_total,
            channels,
        });
        to_value(&page)
    }

    fn file_list(&self, params: &Value) -> Handled {
        let claim_id: Option<ClaimId> = param(params, "claim_id")?;
        let claim_name: Option<String> = param(params, "claim_name")?;
        let channel_name: Option<String> = param(params, "channel_name")?;

        let items: Vec<LocalFile> = self
            .files
            .iter()
            .filter(|f| claim_id.map_or(true, |id| f.claim_id == id))
            .filter(|f| claim_name.as_ref().map_or(true, |n| f.claim_name == *n))
            .filter(|f| {
                channel_name
                    .as_ref()
                    .map_or(true, |ch| f.channel_name.as_ref() == Some(ch))
            })
            .cloned()
            .collect();

        to_value(&Page::single(items, Self::page_size(params)))
    }

    fn support_list(&self, params: &Value) -> Handled {
        let claim_id: Option<ClaimId> = param(params, "claim_id")?;

        let items: Vec<SupportEntry> = self
            .supports
            .iter()
            .filter(|s| claim_id.map_or(true, |id| s.claim_id == id))
            .cloned()
            .collect();

        to_value(&Page::single(items, Self::page_size(params)))
    }

    fn support_create(&mut self, params: &Value) -> Handled {
        let claim_id: ClaimId = param(params, "claim_id")?
            .ok_or_else(|| DaemonError::new("ValueError", "claim_id is required"))?;
        let amount: Amount = param(params, "amount")?
            .ok_or_else(|| DaemonError::new("ValueError", "amount is required"))?;

        if !amount.is_positive() {
            return Err(DaemonError::new("ValueError", "amount must be positive"));
        }
        if amount > self.balance {
            return Err(DaemonError::new(
                "InsufficientFundsError",
                "Not enough funds to cover this transaction.",
            ));
        }
        let name = self
            .claim_mut(&claim_id)
            .map(|claim| {
                claim.meta.support_amount += amount;
                claim.name.clone()
            })
            .ok_or_else(|| {
                DaemonError::new("Exception", format!("Can't find the claim '{}'", claim_id))
            })?;

        self.balance -= amount;
        let txid = self.new_txid();
        let mut entry = SupportEntry::new(claim_id, name, amount);
        entry.txid = Some(txid.clone());
        entry.nout = Some(0);
        self.supports.push(entry);

        self.transaction(txid, amount)
    }

    fn support_abandon(&mut self, params: &Value) -> Handled {
        let claim_id: ClaimId = param(params, "claim_id")?
            .ok_or_else(|| DaemonError::new("ValueError", "claim_id is required"))?;
        let keep: Amount = param(params, "keep")?.unwrap_or(Amount::ZERO);

        let ours: Vec<SupportEntry> = self
            .supports
            .iter()
            .filter(|s| s.claim_id == claim_id)
            .cloned()
            .collect();
        let Some(first) = ours.first() else {
            return Err(DaemonError::new("Exception", "No supports found."));
        };
        let name = first.name.clone();
        let old: Amount = ours.iter().map(|s| s.amount).sum();

        if keep - old > self.balance {
            return Err(DaemonError::new(
                "InsufficientFundsError",
                "Not enough funds to cover this transaction.",
            ));
        }

        self.supports.retain(|s| s.claim_id != claim_id);
        self.balance += old - keep;
        if let Some(claim) = self.claim_mut(&claim_id) {
            claim.meta.support_amount += keep - old;
        }

        let txid = self.new_txid();
        if keep.is_positive() {
            let mut entry = SupportEntry::new(claim_id, name, keep);
            entry.txid = Some(txid.clone());
            entry.nout = Some(0);
            self.supports.push(entry);
        }

        self.transaction(txid, old.max(keep))
    }

    fn transaction(&self, txid: String, moved: Amount) -> Handled {
        to_value(&Transaction {
            txid,
            total_input: moved,
            total_output: moved,
            total_fee: Amount::ZERO,
            extra: serde_json::Map::new(),
        })
    }
}
