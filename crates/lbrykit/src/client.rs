//! The Client: unified API over the daemon.
//!
//! The Client owns one gateway and hands it to the resolver and the
//! support reconciler, so every operation shares the same connection and
//! settings.

use std::sync::Arc;

use tracing::{debug, info};

use lbrykit_core::{
    aggregate, fill_release_times, normalize, sort_by_release, AggregateSize, Amount, Claim,
    ClaimQuery, ClaimRecord, ClaimRef, LocalFile,
};
use lbrykit_resolve::{BatchConfig, BatchReport, Mode, Record, Resolution, Resolver};
use lbrykit_rpc::{FileListParams, Gateway, GatewayExt, HttpGateway};
use lbrykit_support::{InvalidSelector, Reconciler, SupportInventory, SupportOutcome};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Client for the LBRY daemon.
///
/// Provides a unified API for:
/// - Resolving claims one at a time or in bulk
/// - Sorting, deduplicating and sizing claim collections
/// - Listing downloaded files
/// - Creating, setting and targeting supports
pub struct Client<G> {
    resolver: Resolver<G>,
    reconciler: Reconciler<G>,
    config: ClientConfig,
}

impl Client<HttpGateway> {
    /// Create a client talking HTTP to `config.endpoint`.
    ///
    /// No request is made; use [`Client::server_exists`] to check the
    /// daemon is up.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let gateway = HttpGateway::new(config.gateway())?;
        Ok(Self::with_gateway(Arc::new(gateway), config))
    }
}

impl<G: Gateway + 'static> Client<G> {
    /// Create a client over any gateway.
    pub fn with_gateway(gateway: Arc<G>, config: ClientConfig) -> Self {
        let resolver = Resolver::new(gateway);
        let reconciler = Reconciler::new(resolver.clone(), config.support());
        Self {
            resolver,
            reconciler,
            config,
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        self.resolver.gateway()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Resolver<G> {
        &self.resolver
    }

    /// True when the daemon answers `status`.
    pub async fn server_exists(&self) -> bool {
        match self.gateway().status().await {
            Ok(status) => status.is_running,
            Err(e) => {
                debug!("daemon not available at {}: {}", self.config.endpoint, e);
                false
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve one reference online or among downloaded files.
    ///
    /// A missing or blocked claim is a [`Resolution`], not an error.
    pub async fn resolve_one(
        &self,
        reference: &ClaimRef,
        follow_repost: bool,
        mode: Mode,
    ) -> Result<Resolution<Record>> {
        Ok(self
            .resolver
            .resolve_with_mode(reference, follow_repost, mode)
            .await?)
    }

    /// Resolve whichever of URI, claim ID or name the query carries.
    /// Online the URI has priority; offline the claim ID does.
    pub async fn resolve_query(
        &self,
        query: &ClaimQuery,
        follow_repost: bool,
        mode: Mode,
    ) -> Result<Resolution<Record>> {
        Ok(self
            .resolver
            .resolve_query(query, follow_repost, mode)
            .await?)
    }

    /// Resolve a batch with the configured pool width, following reposts.
    pub async fn resolve_batch(&self, refs: Vec<ClaimRef>) -> Result<BatchReport> {
        self.resolve_batch_with(refs, &self.config.batch()).await
    }

    /// Resolve a batch with explicit settings.
    pub async fn resolve_batch_with(
        &self,
        refs: Vec<ClaimRef>,
        config: &BatchConfig,
    ) -> Result<BatchReport> {
        Ok(self.resolver.resolve_all(refs, config).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Collections
    // ─────────────────────────────────────────────────────────────────────────

    /// Fill release times, sort, drop duplicate claim IDs and keep the
    /// newest `max_count` (0 keeps all).
    pub fn normalize_and_sort<T: ClaimRecord>(
        &self,
        records: Vec<T>,
        max_count: usize,
        newest_first: bool,
    ) -> Vec<T> {
        normalize(records, max_count, newest_first)
    }

    /// Total size and duration of a collection.
    pub fn aggregate_size_duration<T: ClaimRecord>(&self, records: &[T]) -> AggregateSize {
        aggregate(records)
    }

    /// Normalize a claim collection and size the result.
    pub fn sort_filter_size(
        &self,
        claims: Vec<Claim>,
        max_count: usize,
        newest_first: bool,
    ) -> (Vec<Claim>, AggregateSize) {
        let claims = normalize(claims, max_count, newest_first);
        let size = aggregate(&claims);
        (claims, size)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Local Files
    // ─────────────────────────────────────────────────────────────────────────

    /// Downloaded files, optionally from one channel, sorted by release
    /// time (oldest first unless `newest_first`).
    ///
    /// The channel is resolved first; the daemon only filters by channels
    /// it has seen.
    pub async fn list_local_files(
        &self,
        channel: Option<&str>,
        newest_first: bool,
    ) -> Result<Vec<LocalFile>> {
        let channel_name = match channel {
            Some(channel) => Some(self.check_channel(channel).await?),
            None => None,
        };

        let page = self
            .gateway()
            .file_list(&FileListParams {
                channel_name,
                page_size: Some(self.config.page_size),
                ..FileListParams::default()
            })
            .await?;

        let mut files = page.items;
        let filled = fill_release_times(&mut files);
        debug!("{} files listed, {} without release time", files.len(), filled);

        Ok(sort_by_release(files, newest_first))
    }

    /// Downloaded files whose claims no longer resolve online, in listing
    /// order.
    pub async fn find_invalid_local_files(
        &self,
        channel: Option<&str>,
        newest_first: bool,
    ) -> Result<Vec<LocalFile>> {
        let files = self.list_local_files(channel, newest_first).await?;
        let refs = files.iter().map(|f| ClaimRef::ClaimId(f.claim_id)).collect();
        let report = self.resolve_batch(refs).await?;

        let invalid: Vec<LocalFile> = files
            .into_iter()
            .zip(report.pairs)
            .filter(|(_, pair)| !pair.is_resolved())
            .map(|(file, _)| file)
            .collect();

        info!(
            "{} of {} downloaded files are invalid",
            invalid.len(),
            report.resolved + report.unresolved
        );
        Ok(invalid)
    }

    /// List (or list invalid) downloaded files and size them.
    pub async fn local_files_size(
        &self,
        channel: Option<&str>,
        newest_first: bool,
        invalid_only: bool,
    ) -> Result<(Vec<LocalFile>, AggregateSize)> {
        let files = if invalid_only {
            self.find_invalid_local_files(channel, newest_first).await?
        } else {
            self.list_local_files(channel, newest_first).await?
        };
        let size = aggregate(&files);
        Ok((files, size))
    }

    async fn check_channel(&self, channel: &str) -> Result<String> {
        let channel = if channel.starts_with('@') {
            channel.to_string()
        } else {
            format!("@{}", channel)
        };

        match self.resolver.resolve(&ClaimRef::uri(&channel)?, false).await? {
            Resolution::Found(_) => Ok(channel),
            Resolution::NotFound { reference, reason } => {
                Err(ClientError::NotFound { reference, reason })
            }
            Resolution::Blocked {
                reference,
                channels,
            } => Err(ClientError::Blocked {
                reference,
                channels,
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Supports
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a new support of `amount`.
    pub async fn create_support(
        &self,
        reference: &ClaimRef,
        amount: Amount,
    ) -> Result<SupportOutcome> {
        Ok(self.reconciler.create_support(reference, amount).await?)
    }

    /// Keep exactly `keep` of the caller's support; zero removes it.
    pub async fn set_support(&self, reference: &ClaimRef, keep: Amount) -> Result<SupportOutcome> {
        Ok(self.reconciler.set_support(reference, keep).await?)
    }

    /// Bring the claim's total stake to `target`, or do nothing.
    pub async fn target_support(
        &self,
        reference: &ClaimRef,
        target: Amount,
    ) -> Result<SupportOutcome> {
        Ok(self.reconciler.target_support(reference, target).await?)
    }

    /// Every support of the caller, split by whether its claim resolves.
    pub async fn list_supports(&self) -> Result<SupportInventory> {
        Ok(self.reconciler.list_supports().await?)
    }

    /// Abandon the caller's support on a claim that no longer resolves.
    pub async fn abandon_invalid_support(
        &self,
        selector: &InvalidSelector,
        keep: Amount,
    ) -> Result<SupportOutcome> {
        Ok(self.reconciler.abandon_invalid_support(selector, keep).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use lbrykit_core::ClaimId;
    use lbrykit_rpc::{methods, MemoryDaemon};

    fn id(n: u8) -> ClaimId {
        ClaimId::from_bytes([n; 20])
    }

    fn client(daemon: &Arc<MemoryDaemon>) -> Client<MemoryDaemon> {
        Client::with_gateway(Arc::clone(daemon), ClientConfig::default().with_concurrency(4))
    }

    fn channel(n: u8, name: &str) -> Claim {
        let mut claim = Claim::new(id(n), name);
        claim.canonical_url = Some(format!("lbry://{}#{:x}", name, n));
        claim
    }

    fn file(n: u8, name: &str, channel: &str, timestamp: i64) -> LocalFile {
        let mut file = LocalFile::new(id(n), name);
        file.channel_name = Some(channel.to_string());
        file.timestamp = Some(timestamp);
        file
    }

    #[tokio::test]
    async fn test_server_exists() {
        let daemon = Arc::new(MemoryDaemon::new());
        let client = client(&daemon);
        assert!(client.server_exists().await);

        daemon.set_unreachable(true);
        assert!(!client.server_exists().await);
    }

    #[tokio::test]
    async fn test_list_local_files_sorted() {
        let daemon = Arc::new(MemoryDaemon::new());
        daemon.add_claim(channel(1, "@chan"));
        daemon.add_file(file(10, "late", "@chan", 300));
        daemon.add_file(file(11, "early", "@chan", 100));
        daemon.add_file(file(12, "other", "@elsewhere", 200));
        let client = client(&daemon);

        let files = client.list_local_files(Some("chan"), false).await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.claim_name.as_str()).collect();
        assert_eq!(names, ["early", "late"]);
        assert_eq!(files[0].metadata.release_time, Some(100));

        let newest = client.list_local_files(Some("@chan"), true).await.unwrap();
        assert_eq!(newest[0].claim_name, "late");

        let all = client.list_local_files(None, false).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_channel_is_not_found() {
        let daemon = Arc::new(MemoryDaemon::new());
        let client = client(&daemon);

        let err = client.list_local_files(Some("@ghost"), false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(daemon.call_count(methods::FILE_LIST), 0);
    }

    #[tokio::test]
    async fn test_invalid_local_files() {
        let daemon = Arc::new(MemoryDaemon::new());
        daemon.add_claim(Claim::new(id(10), "kept"));
        daemon.add_file(file(10, "kept", "@chan", 100));
        daemon.add_file(file(11, "removed", "@chan", 200));
        let client = client(&daemon);

        let invalid = client.find_invalid_local_files(None, false).await.unwrap();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].claim_id, id(11));

        let (files, size) = client.local_files_size(None, false, true).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(size.claim_count, 1);
    }

    #[tokio::test]
    async fn test_unreachable_batch_fails() {
        let daemon = Arc::new(MemoryDaemon::new());
        daemon.set_unreachable(true);
        let client = client(&daemon);

        let err = client.list_supports().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GatewayUnreachable);
    }
}
