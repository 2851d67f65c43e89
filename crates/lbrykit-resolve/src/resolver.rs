//! Resolution of one reference to one claim.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use lbrykit_core::{validate_name, Claim, ClaimId, ClaimQuery, ClaimRef, CoreError, LocalFile};
use lbrykit_rpc::{
    ClaimSearchParams, FileListParams, Gateway, GatewayExt, ResolveEntry, ResolveParams, RpcError,
};

use crate::error::Result;

/// Where to look for a claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Ask the network (`resolve` / `claim_search`).
    #[default]
    Online,
    /// Look only at downloaded files (`file_list`).
    Offline,
}

/// Outcome of resolving one reference.
///
/// Only gateway failures are errors; a missing or blocked claim is a normal
/// outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T = Claim> {
    Found(T),
    /// The daemon has no such claim, or it was removed.
    NotFound { reference: ClaimRef, reason: String },
    /// The claim exists but channels on the hub block it.
    Blocked {
        reference: ClaimRef,
        /// Blocking channel URLs, without `lbry://`.
        channels: Vec<String>,
    },
}

impl<T> Resolution<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Self::Found(value) => Resolution::Found(f(value)),
            Self::NotFound { reference, reason } => Resolution::NotFound { reference, reason },
            Self::Blocked {
                reference,
                channels,
            } => Resolution::Blocked {
                reference,
                channels,
            },
        }
    }

    fn not_found(reference: &ClaimRef, reason: impl Into<String>) -> Self {
        Self::NotFound {
            reference: reference.clone(),
            reason: reason.into(),
        }
    }
}

/// A record found in either mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Online(Claim),
    Local(LocalFile),
}

impl Record {
    pub fn claim_id(&self) -> &ClaimId {
        match self {
            Self::Online(claim) => &claim.claim_id,
            Self::Local(file) => &file.claim_id,
        }
    }

    pub fn into_claim(self) -> Option<Claim> {
        match self {
            Self::Online(claim) => Some(claim),
            Self::Local(_) => None,
        }
    }

    pub fn into_local(self) -> Option<LocalFile> {
        match self {
            Self::Local(file) => Some(file),
            Self::Online(_) => None,
        }
    }
}

/// Resolves references through a [`Gateway`].
///
/// Nothing is cached: each call queries the daemon again.
pub struct Resolver<G> {
    gateway: Arc<G>,
}

impl<G> Clone for Resolver<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G: Gateway> Resolver<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Resolve on the network.
    ///
    /// URIs go through `resolve`; claim IDs and names through
    /// `claim_search`. With `follow_repost`, a repost is replaced by the
    /// claim it points to.
    pub async fn resolve(&self, reference: &ClaimRef, follow_repost: bool) -> Result<Resolution> {
        let resolution = match reference {
            ClaimRef::Uri(uri) => {
                if uri.trim().is_empty() {
                    return Err(CoreError::InvalidUri(uri.clone()).into());
                }
                self.resolve_uri(reference, uri).await?
            }
            ClaimRef::ClaimId(claim_id) => {
                self.search(reference, ClaimSearchParams::by_claim_id(*claim_id))
                    .await?
            }
            ClaimRef::Name(name) => {
                validate_name(name)?;
                self.search(reference, ClaimSearchParams::by_name(name.clone()))
                    .await?
            }
        };

        Ok(resolution.map(|claim| follow(claim, follow_repost)))
    }

    /// Resolve among downloaded files.
    ///
    /// A URI is used as the claim name filter. Reposts do not exist
    /// locally, so nothing is followed.
    pub async fn resolve_local(&self, reference: &ClaimRef) -> Result<Resolution<LocalFile>> {
        let params = match reference {
            ClaimRef::ClaimId(claim_id) => FileListParams {
                claim_id: Some(*claim_id),
                ..FileListParams::default()
            },
            ClaimRef::Uri(name) | ClaimRef::Name(name) => {
                if name.trim().is_empty() {
                    return Err(CoreError::InvalidName(name.clone()).into());
                }
                FileListParams {
                    claim_name: Some(name.clone()),
                    ..FileListParams::default()
                }
            }
        };

        let mut page = self.gateway.file_list(&params).await?;
        if page.items.len() > 1 {
            warn!(
                "{} local files match {}, using the last one",
                page.items.len(),
                reference
            );
        }
        match page.items.pop() {
            Some(file) => Ok(Resolution::Found(file)),
            None => Ok(Resolution::not_found(reference, "no downloaded file matches")),
        }
    }

    /// Resolve in either mode.
    pub async fn resolve_with_mode(
        &self,
        reference: &ClaimRef,
        follow_repost: bool,
        mode: Mode,
    ) -> Result<Resolution<Record>> {
        match mode {
            Mode::Online => Ok(self
                .resolve(reference, follow_repost)
                .await?
                .map(Record::Online)),
            Mode::Offline => Ok(self.resolve_local(reference).await?.map(Record::Local)),
        }
    }

    /// Resolve a query.
    ///
    /// Online, the URI wins over the claim ID, which wins over the name.
    /// Offline, the claim ID wins and the URI only replaces a missing name.
    pub async fn resolve_query(
        &self,
        query: &ClaimQuery,
        follow_repost: bool,
        mode: Mode,
    ) -> Result<Resolution<Record>> {
        let reference = match mode {
            Mode::Online => query.effective()?,
            Mode::Offline => query.local()?,
        };
        self.resolve_with_mode(&reference, follow_repost, mode).await
    }

    async fn resolve_uri(&self, reference: &ClaimRef, uri: &str) -> Result<Resolution> {
        let mut result = self.gateway.resolve(&ResolveParams::one(uri)).await?;

        let Some(entry) = result.remove(uri) else {
            let reason = format!("resolve: no entry for {:?}", uri);
            return Err(RpcError::InvalidResponse(reason).into());
        };

        match entry {
            ResolveEntry::Claim(claim) => Ok(Resolution::Found(*claim)),
            error => {
                let reason = error.error_text().unwrap_or_default();
                debug!("{} not resolved: {}", reference, reason);
                Ok(Resolution::not_found(reference, reason))
            }
        }
    }

    async fn search(&self, reference: &ClaimRef, params: ClaimSearchParams) -> Result<Resolution> {
        let mut page = self.gateway.claim_search(&params).await?;

        if let Some(blocked) = page.blocked.as_ref().filter(|b| b.total > 0) {
            let channels = blocked.channel_urls();
            warn!("{} blocked by hub; blocking channel: {}", reference, channels.join(" ; "));
            return Ok(Resolution::Blocked {
                reference: reference.clone(),
                channels,
            });
        }

        if page.items.len() > 1 {
            // Reposts may share the name; the original usually comes last.
            warn!(
                "claim_search returned {} items for {}, using the last one",
                page.items.len(),
                reference
            );
        }

        match page.items.pop() {
            Some(claim) => Ok(Resolution::Found(claim)),
            None => Ok(Resolution::not_found(
                reference,
                "no item found; the claim may have been removed from the network",
            )),
        }
    }
}

fn follow(claim: Claim, follow_repost: bool) -> Claim {
    if follow_repost && claim.is_repost() {
        let original = claim.into_original();
        debug!("repost redirected to {} ({})", original.url(), original.claim_id);
        original
    } else {
        claim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lbrykit_core::Amount;
    use lbrykit_rpc::MemoryDaemon;

    fn claim(id: u8, name: &str) -> Claim {
        let mut claim = Claim::new(ClaimId::from_bytes([id; 20]), name);
        claim.canonical_url = Some(format!("lbry://@chan#1/{}#{:x}", name, id));
        claim.amount = Amount::from_lbc(1);
        claim
    }

    fn setup() -> (Arc<MemoryDaemon>, Resolver<MemoryDaemon>) {
        let daemon = Arc::new(MemoryDaemon::new());
        let resolver = Resolver::new(Arc::clone(&daemon));
        (daemon, resolver)
    }

    #[tokio::test]
    async fn test_resolve_uri() {
        let (daemon, resolver) = setup();
        daemon.add_claim(claim(1, "video"));

        let reference = ClaimRef::uri("@chan#1/video#1").unwrap();
        let found = resolver.resolve(&reference, true).await.unwrap();
        assert_eq!(found.found().unwrap().name, "video");
        assert_eq!(daemon.call_count("resolve"), 1);
        assert_eq!(daemon.call_count("claim_search"), 0);
    }

    #[tokio::test]
    async fn test_resolve_uri_not_found() {
        let (_daemon, resolver) = setup();
        let reference = ClaimRef::uri("lbry://nothing-here").unwrap();

        match resolver.resolve(&reference, true).await.unwrap() {
            Resolution::NotFound { reference: r, reason } => {
                assert_eq!(r, reference);
                assert!(reason.contains("Could not find claim"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_claim_id_and_name() {
        let (daemon, resolver) = setup();
        daemon.add_claim(claim(1, "video"));

        let by_id = ClaimRef::ClaimId(ClaimId::from_bytes([1; 20]));
        assert!(resolver.resolve(&by_id, true).await.unwrap().is_found());

        let by_name = ClaimRef::name("video").unwrap();
        assert!(resolver.resolve(&by_name, true).await.unwrap().is_found());

        let missing = ClaimRef::name("absent").unwrap();
        assert!(matches!(
            resolver.resolve(&missing, true).await.unwrap(),
            Resolution::NotFound { .. }
        ));
        assert_eq!(daemon.call_count("claim_search"), 3);
    }

    #[tokio::test]
    async fn test_invalid_name_makes_no_call() {
        let (daemon, resolver) = setup();
        let bad = ClaimRef::Name("@chan:1".into());
        assert!(resolver.resolve(&bad, true).await.is_err());
        assert!(daemon.calls().is_empty());
    }

    #[tokio::test]
    async fn test_multiple_items_take_last() {
        let (daemon, resolver) = setup();
        daemon.add_claim(claim(1, "video"));
        daemon.add_claim(claim(2, "video"));

        let found = resolver
            .resolve(&ClaimRef::name("video").unwrap(), false)
            .await
            .unwrap();
        assert_eq!(found.found().unwrap().claim_id, ClaimId::from_bytes([2; 20]));
    }

    #[tokio::test]
    async fn test_blocked_claim() {
        let (daemon, resolver) = setup();
        daemon.add_claim(claim(1, "video"));
        daemon.block(ClaimId::from_bytes([1; 20]), &["lbry://@censor#c"]);

        match resolver
            .resolve(&ClaimRef::name("video").unwrap(), true)
            .await
            .unwrap()
        {
            Resolution::Blocked { channels, .. } => assert_eq!(channels, vec!["@censor#c"]),
            other => panic!("expected Blocked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_repost_following() {
        let (daemon, resolver) = setup();
        let original = claim(1, "original");
        let mut repost = claim(2, "repost");
        repost.reposted_claim = Some(Box::new(original.clone()));
        daemon.add_claim(repost);

        let reference = ClaimRef::uri("@chan#1/repost#2").unwrap();
        let followed = resolver.resolve(&reference, true).await.unwrap();
        assert_eq!(followed.into_found().unwrap(), original);

        let kept = resolver.resolve(&reference, false).await.unwrap();
        assert!(kept.found().unwrap().is_repost());
    }

    #[tokio::test]
    async fn test_gateway_failure_is_an_error() {
        let (daemon, resolver) = setup();
        daemon.set_unreachable(true);
        let err = resolver
            .resolve(&ClaimRef::name("video").unwrap(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::ResolveError::Rpc(RpcError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_offline_uses_file_list() {
        let (daemon, resolver) = setup();
        daemon.add_file(LocalFile::new(ClaimId::from_bytes([1; 20]), "video"));

        let found = resolver
            .resolve_with_mode(&ClaimRef::uri("video").unwrap(), true, Mode::Offline)
            .await
            .unwrap();
        assert!(matches!(found, Resolution::Found(Record::Local(_))));

        let by_id = ClaimRef::ClaimId(ClaimId::from_bytes([9; 20]));
        assert!(!resolver.resolve_local(&by_id).await.unwrap().is_found());
        assert_eq!(daemon.call_count("file_list"), 2);
        assert_eq!(daemon.call_count("claim_search"), 0);
    }

    #[tokio::test]
    async fn test_query_priority() {
        let (daemon, resolver) = setup();
        daemon.add_claim(claim(1, "video"));

        let query = ClaimQuery::new()
            .with_claim_id(ClaimId::from_bytes([1; 20]).to_hex())
            .with_name("ignored");
        let found = resolver.resolve_query(&query, true, Mode::Online).await.unwrap();
        assert_eq!(
            found.into_found().and_then(Record::into_claim).map(|c| c.name),
            Some("video".to_string())
        );

        let empty = resolver
            .resolve_query(&ClaimQuery::new(), true, Mode::Online)
            .await;
        assert!(empty.is_err());
    }

    #[tokio::test]
    async fn test_offline_query_claim_id_overrides() {
        let (daemon, resolver) = setup();
        let id = ClaimId::from_bytes([1; 20]);
        daemon.add_file(LocalFile::new(id, "video"));

        let query = ClaimQuery::new()
            .with_uri("@chan/other")
            .with_claim_id(id.to_hex());
        let found = resolver.resolve_query(&query, true, Mode::Offline).await.unwrap();
        assert_eq!(found.found().map(Record::claim_id), Some(&id));

        let (_, params) = daemon.calls().pop().unwrap();
        assert_eq!(params, serde_json::json!({"claim_id": id.to_hex()}));
    }

    #[tokio::test]
    async fn test_offline_query_name_over_uri() {
        let (daemon, resolver) = setup();
        daemon.add_file(LocalFile::new(ClaimId::from_bytes([1; 20]), "video"));

        let query = ClaimQuery::new().with_uri("@chan/other").with_name("video");
        let found = resolver.resolve_query(&query, true, Mode::Offline).await.unwrap();
        assert!(found.is_found());

        let (_, params) = daemon.calls().pop().unwrap();
        assert_eq!(params, serde_json::json!({"claim_name": "video"}));
    }
}
