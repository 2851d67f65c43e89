//! Support reconciliation: locate, measure, decide, commit.
//!
//! Every operation measures the claim's stake right before deciding, so a
//! decision never rests on stale numbers. A failed transaction leaves the
//! ledger unchanged and reports what was measured.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lbrykit_core::{
    plan_target, Amount, Claim, ClaimId, ClaimRef, CoreError, SupportAction, SupportState,
};
use lbrykit_resolve::{BatchConfig, Resolution, Resolver};
use lbrykit_rpc::{
    Gateway, GatewayExt, RpcError, SupportAbandonParams, SupportCreateParams, SupportListParams,
    Transaction, DEFAULT_PAGE_SIZE,
};

use crate::error::{Result, SupportError};
use crate::outcome::{SupportInventory, SupportOutcome, SupportRecord};

/// Settings for support operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportConfig {
    /// `page_size` for `support_list`.
    pub page_size: u64,
    /// Pool used to resolve the claims behind the caller's supports, by
    /// claim ID. Reposts stay unfollowed so each record carries the stake
    /// of the claim the support backs.
    pub batch: BatchConfig,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            batch: BatchConfig {
                follow_repost: false,
                ..BatchConfig::default()
            },
        }
    }
}

/// Selects one of the supports on claims that no longer resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidSelector {
    ClaimId(ClaimId),
    /// Matches supports whose claim name contains this text.
    Name(String),
}

impl InvalidSelector {
    fn matches(&self, record: &SupportRecord) -> bool {
        match self {
            Self::ClaimId(claim_id) => record.support.claim_id == *claim_id,
            Self::Name(name) => record.support.name.contains(name.as_str()),
        }
    }
}

/// Support operations over a [`Gateway`].
pub struct Reconciler<G> {
    resolver: Resolver<G>,
    config: SupportConfig,
}

impl<G: Gateway + 'static> Reconciler<G> {
    pub fn new(resolver: Resolver<G>, config: SupportConfig) -> Self {
        Self { resolver, config }
    }

    pub fn config(&self) -> &SupportConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Locate & Measure
    // ─────────────────────────────────────────────────────────────────────────

    /// Find the claim a support targets. Reposts are not followed: a
    /// support backs the exact claim given.
    pub async fn locate(&self, reference: &ClaimRef) -> Result<Claim> {
        match self.resolver.resolve(reference, false).await? {
            Resolution::Found(claim) => Ok(claim),
            Resolution::NotFound { reference, reason } => {
                Err(SupportError::NotFound { reference, reason })
            }
            Resolution::Blocked {
                reference,
                channels,
            } => Err(SupportError::Blocked {
                reference,
                channels,
            }),
        }
    }

    /// Locate a claim and split its stake into base and ours.
    pub async fn measure(&self, reference: &ClaimRef) -> Result<SupportState> {
        let claim = self.locate(reference).await?;

        let page = self
            .resolver
            .gateway()
            .support_list(&SupportListParams {
                claim_id: Some(claim.claim_id),
                page_size: Some(self.config.page_size),
            })
            .await?;
        let ours = page
            .items
            .iter()
            .filter(|s| s.claim_id == claim.claim_id)
            .map(|s| s.amount);

        let state = SupportState::measure(&claim, ours)?;
        debug!(
            "{}: existing {}, base {}, ours {}",
            claim.url(),
            state.existing_support,
            state.base_support,
            state.old_support
        );
        Ok(state)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a new support of `amount`, whatever the current stake.
    pub async fn create_support(
        &self,
        reference: &ClaimRef,
        amount: Amount,
    ) -> Result<SupportOutcome> {
        let amount = amount.abs();
        if amount.is_zero() {
            return Err(CoreError::InvalidAmount("support amount must be positive".into()).into());
        }

        let state = self.measure(reference).await?;
        let action = SupportAction::Create { amount };
        let transaction = self.commit(&state, action).await?;

        Ok(SupportOutcome {
            target: None,
            must_add: amount,
            new_support: state.old_support + amount,
            action,
            transaction,
            state,
        })
    }

    /// Replace the caller's supports on a claim by a single one of `keep`;
    /// zero removes them all.
    pub async fn set_support(&self, reference: &ClaimRef, keep: Amount) -> Result<SupportOutcome> {
        let keep = keep.abs();
        let state = self.measure(reference).await?;
        let action = SupportAction::Abandon { keep };
        let transaction = self.commit(&state, action).await?;

        Ok(SupportOutcome {
            target: None,
            must_add: keep - state.old_support,
            new_support: keep,
            action,
            transaction,
            state,
        })
    }

    /// Bring the claim's total stake to `target` with as few calls as
    /// possible. Nothing is sent when our support would not change.
    pub async fn target_support(
        &self,
        reference: &ClaimRef,
        target: Amount,
    ) -> Result<SupportOutcome> {
        let state = self.measure(reference).await?;
        let plan = plan_target(&state, target);

        if plan.action == SupportAction::None {
            info!(
                "{}: stake {} already fits target {}, nothing to do",
                state.name, state.existing_support, plan.target
            );
        }
        let transaction = self.commit(&state, plan.action).await?;

        Ok(SupportOutcome {
            target: Some(plan.target),
            must_add: plan.must_add,
            new_support: plan.new_support,
            action: plan.action,
            transaction,
            state,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inventory
    // ─────────────────────────────────────────────────────────────────────────

    /// All of the caller's supports with the claims they back.
    pub async fn list_supports(&self) -> Result<SupportInventory> {
        let page = self
            .resolver
            .gateway()
            .support_list(&SupportListParams {
                claim_id: None,
                page_size: Some(self.config.page_size),
            })
            .await?;

        let claim_ids: Vec<ClaimId> = page.items.iter().map(|s| s.claim_id).collect();
        let report = self
            .resolver
            .resolve_claim_ids(&claim_ids, &self.config.batch)
            .await?;

        let records = page
            .items
            .into_iter()
            .zip(report.pairs)
            .map(|(support, pair)| SupportRecord {
                support,
                claim: pair.resolved,
            })
            .collect();

        let inventory = SupportInventory::new(records);
        info!(
            "{} supports ({} on invalid claims), total {}",
            inventory.all.len(),
            inventory.invalid.len(),
            inventory.total()
        );
        Ok(inventory)
    }

    /// Abandon the caller's support on a claim that no longer resolves,
    /// keeping `keep`.
    ///
    /// With several matches the last one wins.
    pub async fn abandon_invalid_support(
        &self,
        selector: &InvalidSelector,
        keep: Amount,
    ) -> Result<SupportOutcome> {
        let keep = keep.abs();
        let inventory = self.list_supports().await?;

        let Some(found) = inventory.invalid.iter().rev().find(|r| selector.matches(r)) else {
            let reference = match selector {
                InvalidSelector::ClaimId(claim_id) => ClaimRef::ClaimId(*claim_id),
                InvalidSelector::Name(name) => ClaimRef::Name(name.clone()),
            };
            return Err(SupportError::NotFound {
                reference,
                reason: "no support on an invalid claim matches".into(),
            });
        };

        let claim_id = found.support.claim_id;
        let old: Amount = inventory
            .invalid
            .iter()
            .filter(|r| r.support.claim_id == claim_id)
            .map(|r| r.support.amount)
            .sum();
        let state = SupportState::invalid(claim_id, found.support.name.clone(), old);

        let action = SupportAction::Abandon { keep };
        let transaction = self.commit(&state, action).await?;

        Ok(SupportOutcome {
            target: None,
            must_add: keep - old,
            new_support: keep,
            action,
            transaction,
            state,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commit
    // ─────────────────────────────────────────────────────────────────────────

    async fn commit(
        &self,
        state: &SupportState,
        action: SupportAction,
    ) -> Result<Option<Transaction>> {
        let gateway = self.resolver.gateway();
        let result = match action {
            SupportAction::None => return Ok(None),
            SupportAction::Create { amount } => {
                gateway
                    .support_create(&SupportCreateParams::new(state.claim_id, amount))
                    .await
            }
            SupportAction::Abandon { keep } => {
                gateway
                    .support_abandon(&SupportAbandonParams::new(state.claim_id, keep))
                    .await
            }
        };

        match result {
            Ok(transaction) => {
                info!(
                    "{} {:?} committed: txid {}, fee {}",
                    state.name, action, transaction.txid, transaction.total_fee
                );
                Ok(Some(transaction))
            }
            Err(RpcError::Daemon(error)) => Err(SupportError::TransactionFailed {
                state: Box::new(state.clone()),
                action,
                error,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lbrykit_rpc::MemoryDaemon;
    use std::sync::Arc;

    fn lbc(n: i64) -> Amount {
        Amount::from_lbc(n)
    }

    fn claim_id(id: u8) -> ClaimId {
        ClaimId::from_bytes([id; 20])
    }

    /// A claim with `amount` owner stake and `others` stake from third
    /// parties.
    fn publish(daemon: &MemoryDaemon, id: u8, amount: i64, others: i64) -> ClaimRef {
        let mut claim = Claim::new(claim_id(id), format!("claim-{id}"));
        claim.canonical_url = Some(format!("lbry://@chan#1/claim-{id}#{:x}", id));
        claim.amount = lbc(amount);
        claim.meta.support_amount = lbc(others);
        daemon.add_claim(claim);
        ClaimRef::ClaimId(claim_id(id))
    }

    fn setup() -> (Arc<MemoryDaemon>, Reconciler<MemoryDaemon>) {
        let daemon = Arc::new(MemoryDaemon::new());
        let reconciler = Reconciler::new(
            Resolver::new(Arc::clone(&daemon)),
            SupportConfig::default(),
        );
        (daemon, reconciler)
    }

    fn support_calls(daemon: &MemoryDaemon) -> usize {
        daemon.call_count("support_create") + daemon.call_count("support_abandon")
    }

    #[tokio::test]
    async fn test_measure_splits_stake() {
        let (daemon, reconciler) = setup();
        let reference = publish(&daemon, 1, 100, 50);
        daemon.add_support(claim_id(1), "claim-1", lbc(300));

        let state = reconciler.measure(&reference).await.unwrap();
        assert_eq!(state.existing_support, lbc(450));
        assert_eq!(state.old_support, lbc(300));
        assert_eq!(state.base_support, lbc(150));
        assert!(state.canonical_url.is_some());
    }

    #[tokio::test]
    async fn test_target_creates_support() {
        let (daemon, reconciler) = setup();
        let reference = publish(&daemon, 1, 100, 50);

        let outcome = reconciler.target_support(&reference, lbc(500)).await.unwrap();
        assert_eq!(outcome.must_add, lbc(350));
        assert_eq!(outcome.action, SupportAction::Create { amount: lbc(350) });
        assert!(outcome.transaction.is_some());

        let (_, params) = daemon
            .calls()
            .into_iter()
            .find(|(m, _)| m == "support_create")
            .unwrap();
        assert_eq!(params["amount"], "350.00000000");
        assert_eq!(daemon.claim(&claim_id(1)).unwrap().total_stake(), lbc(500));
    }

    #[tokio::test]
    async fn test_target_below_base_abandons_all() {
        let (daemon, reconciler) = setup();
        let reference = publish(&daemon, 1, 100, 50);
        daemon.add_support(claim_id(1), "claim-1", lbc(300));

        let outcome = reconciler.target_support(&reference, lbc(100)).await.unwrap();
        assert_eq!(outcome.must_add, lbc(-300));
        assert_eq!(outcome.action, SupportAction::Abandon { keep: Amount::ZERO });

        let (_, params) = daemon
            .calls()
            .into_iter()
            .find(|(m, _)| m == "support_abandon")
            .unwrap();
        assert_eq!(params["keep"], "0.00000000");
        assert_eq!(daemon.our_support(&claim_id(1)), Amount::ZERO);
    }

    #[tokio::test]
    async fn test_target_equal_base_reports_no_change() {
        let (daemon, reconciler) = setup();
        let reference = publish(&daemon, 1, 100, 80);
        daemon.add_support(claim_id(1), "claim-1", lbc(30));

        let outcome = reconciler.target_support(&reference, lbc(150)).await.unwrap();
        assert_eq!(outcome.state.base_support, lbc(150));
        assert_eq!(outcome.must_add, Amount::ZERO);
        assert_eq!(outcome.new_support, Amount::ZERO);
        assert_eq!(outcome.action, SupportAction::Abandon { keep: Amount::ZERO });
        assert_eq!(daemon.call_count("support_abandon"), 1);
        assert_eq!(daemon.our_support(&claim_id(1)), Amount::ZERO);
    }

    #[tokio::test]
    async fn test_target_equal_to_existing_sends_nothing() {
        let (daemon, reconciler) = setup();
        let reference = publish(&daemon, 1, 100, 50);
        daemon.add_support(claim_id(1), "claim-1", lbc(300));

        let outcome = reconciler.target_support(&reference, lbc(450)).await.unwrap();
        assert!(outcome.is_noop());
        assert_eq!(support_calls(&daemon), 0);
    }

    #[tokio::test]
    async fn test_target_twice_is_idempotent() {
        let (daemon, reconciler) = setup();
        let reference = publish(&daemon, 1, 100, 50);

        let first = reconciler.target_support(&reference, lbc(275)).await.unwrap();
        assert_eq!(first.must_add, lbc(125));

        let second = reconciler.target_support(&reference, lbc(275)).await.unwrap();
        assert_eq!(second.must_add, Amount::ZERO);
        assert!(second.is_noop());
        assert_eq!(support_calls(&daemon), 1);
    }

    #[tokio::test]
    async fn test_create_and_set() {
        let (daemon, reconciler) = setup();
        let reference = publish(&daemon, 1, 10, 0);

        let created = reconciler.create_support(&reference, lbc(-5)).await.unwrap();
        assert_eq!(created.action, SupportAction::Create { amount: lbc(5) });
        assert_eq!(created.new_support, lbc(5));

        let set = reconciler.set_support(&reference, lbc(2)).await.unwrap();
        assert_eq!(set.state.old_support, lbc(5));
        assert_eq!(set.must_add, lbc(-3));
        assert_eq!(daemon.our_support(&claim_id(1)), lbc(2));
    }

    #[tokio::test]
    async fn test_create_zero_is_invalid() {
        let (daemon, reconciler) = setup();
        let reference = publish(&daemon, 1, 10, 0);
        let err = reconciler.create_support(&reference, Amount::ZERO).await.unwrap_err();
        assert!(matches!(err, SupportError::InvalidInput(_)));
        assert!(daemon.calls().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_funds_is_transaction_failed() {
        let (daemon, reconciler) = setup();
        let reference = publish(&daemon, 1, 100, 50);
        daemon.set_balance(lbc(10));

        let err = reconciler.target_support(&reference, lbc(500)).await.unwrap_err();
        match err {
            SupportError::TransactionFailed {
                state,
                action,
                error,
            } => {
                assert_eq!(state.base_support, lbc(150));
                assert_eq!(action, SupportAction::Create { amount: lbc(350) });
                assert_eq!(error.name.as_deref(), Some("InsufficientFundsError"));
            }
            other => panic!("expected TransactionFailed, got {:?}", other),
        }
        assert_eq!(daemon.our_support(&claim_id(1)), Amount::ZERO);
    }

    #[tokio::test]
    async fn test_missing_claim_is_not_found() {
        let (_daemon, reconciler) = setup();
        let err = reconciler
            .target_support(&ClaimRef::ClaimId(claim_id(9)), lbc(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SupportError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_inconsistent_stake_is_reported() {
        let (daemon, reconciler) = setup();
        let reference = publish(&daemon, 1, 1, 0);
        daemon.add_support(claim_id(1), "claim-1", lbc(5));
        // Stake the daemon reports drops below ours.
        daemon.remove_claim(&claim_id(1));
        publish(&daemon, 1, 1, 0);

        let err = reconciler.measure(&reference).await.unwrap_err();
        assert!(matches!(err, SupportError::Inconsistent(_)));
    }

    #[tokio::test]
    async fn test_inventory_resolves_by_claim_id() {
        let (daemon, reconciler) = setup();
        let original = Claim::new(claim_id(1), "original");
        let mut repost = Claim::new(claim_id(2), "repost");
        repost.amount = lbc(2);
        repost.reposted_claim = Some(Box::new(original));
        daemon.add_claim(repost);
        daemon.add_support(claim_id(2), "repost", lbc(5));

        let inventory = reconciler.list_supports().await.unwrap();
        let record = &inventory.valid[0];
        assert_eq!(record.claim.as_ref().map(|c| c.claim_id), Some(claim_id(2)));
        assert_eq!(record.existing_support(), lbc(7));
        assert_eq!(daemon.call_count("resolve"), 0);
        assert_eq!(daemon.call_count("claim_search"), 1);
    }

    #[tokio::test]
    async fn test_inventory_and_invalid_abandon() {
        let (daemon, reconciler) = setup();
        publish(&daemon, 1, 10, 0);
        daemon.add_support(claim_id(1), "claim-1", lbc(3));
        daemon.add_support(claim_id(2), "gone-video", lbc(4));

        let inventory = reconciler.list_supports().await.unwrap();
        assert_eq!(inventory.all.len(), 2);
        assert_eq!(inventory.valid.len(), 1);
        assert_eq!(inventory.invalid.len(), 1);
        assert_eq!(inventory.invalid[0].existing_support(), lbc(4));

        let outcome = reconciler
            .abandon_invalid_support(&InvalidSelector::Name("gone".into()), Amount::ZERO)
            .await
            .unwrap();
        assert_eq!(outcome.state.base_support, Amount::ZERO);
        assert_eq!(outcome.state.old_support, lbc(4));
        assert_eq!(outcome.must_add, lbc(-4));
        assert!(outcome.state.canonical_url.is_none());
        assert_eq!(daemon.our_support(&claim_id(2)), Amount::ZERO);

        let err = reconciler
            .abandon_invalid_support(&InvalidSelector::ClaimId(claim_id(1)), Amount::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, SupportError::NotFound { .. }));
    }
}
