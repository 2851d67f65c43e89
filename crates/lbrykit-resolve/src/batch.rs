//! Bulk resolution over a bounded worker pool.
//!
//! Workers drain a shared queue of `(index, reference)` pairs and hand back
//! `(index, claim)` pairs; the results are placed by index, so the output
//! order never depends on which worker finished first.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use lbrykit_core::{Claim, ClaimId, ClaimRef, ResolvedPair};
use lbrykit_rpc::Gateway;

use crate::error::{ResolveError, Result};
use crate::resolver::{Resolution, Resolver};

/// Default worker pool width.
pub const DEFAULT_CONCURRENCY: usize = 32;

/// Settings for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Worker pool width; 0 resolves sequentially.
    pub concurrency: usize,
    /// Replace reposts by the claims they point to.
    pub follow_repost: bool,
    /// Checked before each unit of work. Items not started when it fires
    /// stay unresolved.
    #[serde(skip)]
    pub cancel: Option<CancellationToken>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            follow_repost: true,
            cancel: None,
        }
    }
}

impl BatchConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// How each item of a batch is looked up.
#[derive(Debug, Clone, Copy)]
enum Lookup {
    /// As a URI, then as a claim ID.
    Either,
    /// Through `claim_search` by claim ID only.
    Exact,
}

/// Result of a batch: one pair per input, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub pairs: Vec<ResolvedPair>,
    pub resolved: usize,
    pub unresolved: usize,
    /// The batch was cancelled before every item was attempted.
    pub cancelled: bool,
}

impl BatchReport {
    fn new(refs: Vec<ClaimRef>, slots: Vec<Option<Claim>>, cancelled: bool) -> Self {
        let pairs: Vec<ResolvedPair> = refs
            .into_iter()
            .zip(slots)
            .map(|(original, resolved)| ResolvedPair { original, resolved })
            .collect();
        let resolved = pairs.iter().filter(|p| p.is_resolved()).count();

        Self {
            unresolved: pairs.len() - resolved,
            resolved,
            pairs,
            cancelled,
        }
    }

    /// Claims that resolved, in input order.
    pub fn claims(&self) -> impl Iterator<Item = &Claim> {
        self.pairs.iter().filter_map(|p| p.resolved.as_ref())
    }

    /// Inputs that did not resolve, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &ClaimRef> {
        self.pairs
            .iter()
            .filter(|p| !p.is_resolved())
            .map(|p| &p.original)
    }
}

impl<G: Gateway + 'static> Resolver<G> {
    /// Resolve a mixed list of references.
    ///
    /// Each value is tried as a URI first and then as a claim ID; the first
    /// success wins and failures of either attempt are suppressed. Failed
    /// items come back with `resolved = None`; only a worker crash fails
    /// the batch.
    pub async fn resolve_all(
        &self,
        refs: Vec<ClaimRef>,
        config: &BatchConfig,
    ) -> Result<BatchReport> {
        self.run_batch(refs, config, Lookup::Either).await
    }

    /// Resolve a list of claim IDs through `claim_search` only, without the
    /// URI attempt of [`Self::resolve_all`].
    pub async fn resolve_claim_ids(
        &self,
        claim_ids: &[ClaimId],
        config: &BatchConfig,
    ) -> Result<BatchReport> {
        let refs = claim_ids.iter().copied().map(ClaimRef::ClaimId).collect();
        self.run_batch(refs, config, Lookup::Exact).await
    }

    async fn run_batch(
        &self,
        refs: Vec<ClaimRef>,
        config: &BatchConfig,
        lookup: Lookup,
    ) -> Result<BatchReport> {
        let total = refs.len();
        let width = config.concurrency.min(total);
        let mut slots: Vec<Option<Claim>> = vec![None; total];
        let mut attempted = 0;

        if width == 0 {
            for (index, reference) in refs.iter().enumerate() {
                if config.is_cancelled() {
                    break;
                }
                slots[index] = self.resolve_item(reference, config.follow_repost, lookup).await;
                attempted += 1;
            }
        } else {
            let queue: VecDeque<(usize, ClaimRef)> = refs.iter().cloned().enumerate().collect();
            let queue = Arc::new(Mutex::new(queue));
            let mut workers = JoinSet::new();

            for _ in 0..width {
                let queue = Arc::clone(&queue);
                let resolver = self.clone();
                let config = config.clone();

                workers.spawn(async move {
                    let mut done = Vec::new();
                    loop {
                        if config.is_cancelled() {
                            break;
                        }
                        let next = queue.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                        let Some((index, reference)) = next else {
                            break;
                        };
                        let claim = resolver
                            .resolve_item(&reference, config.follow_repost, lookup)
                            .await;
                        done.push((index, claim));
                    }
                    done
                });
            }

            while let Some(joined) = workers.join_next().await {
                let done = joined.map_err(|e| ResolveError::Worker(e.to_string()))?;
                attempted += done.len();
                for (index, claim) in done {
                    slots[index] = claim;
                }
            }
        }

        let report = BatchReport::new(refs, slots, attempted < total);
        info!(
            "resolved {}/{} claims ({} failed){}",
            report.resolved,
            total,
            report.unresolved,
            if report.cancelled { ", cancelled" } else { "" }
        );
        Ok(report)
    }

    async fn resolve_item(
        &self,
        reference: &ClaimRef,
        follow_repost: bool,
        lookup: Lookup,
    ) -> Option<Claim> {
        match lookup {
            Lookup::Either => self.resolve_either(reference, follow_repost).await,
            Lookup::Exact => match self.resolve(reference, follow_repost).await {
                Ok(resolution) => resolution.into_found(),
                Err(e) => {
                    debug!("{}: {}", reference, e);
                    None
                }
            },
        }
    }

    async fn resolve_either(&self, reference: &ClaimRef, follow_repost: bool) -> Option<Claim> {
        let raw = reference.raw();

        match self.resolve(&ClaimRef::Uri(raw.clone()), follow_repost).await {
            Ok(Resolution::Found(claim)) => return Some(claim),
            Ok(_) => {}
            Err(e) => debug!("{:?} as uri: {}", raw, e),
        }

        let claim_id = ClaimId::from_hex(&raw).ok()?;
        match self.resolve(&ClaimRef::ClaimId(claim_id), follow_repost).await {
            Ok(resolution) => resolution.into_found(),
            Err(e) => {
                debug!("{:?} as claim id: {}", raw, e);
                None
            }
        }
    }
}
