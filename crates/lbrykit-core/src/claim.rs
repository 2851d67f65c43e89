//! Claim records as the daemon returns them.
//!
//! Only the fields this library reasons about are typed. Everything else
//! the daemon sends is kept in the `extra` maps so that records survive a
//! round trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::amount::Amount;
use crate::lenient;
use crate::types::{ClaimId, ClaimRef};

/// Where a record came from, which decides where its metadata lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// `resolve` / `claim_search` results; metadata under `value`.
    Online,
    /// `file_list` results; metadata under `metadata`.
    Local,
}

/// The downloadable part of a stream claim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Declared size in bytes.
    #[serde(
        default,
        deserialize_with = "lenient::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Audio or video stream description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    /// Duration in seconds.
    #[serde(
        default,
        deserialize_with = "lenient::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `value` of an online claim, or the `metadata` of a local file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimValue {
    /// Publisher-declared release time (Unix seconds).
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_time: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Media>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Media>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClaimValue {
    /// Declared byte size; 0 when there is no source or no usable size.
    pub fn source_size(&self) -> u64 {
        self.source.as_ref().and_then(|s| s.size).unwrap_or(0)
    }

    /// Duration in seconds: video first, then audio, never both.
    pub fn duration(&self) -> u64 {
        if let Some(video) = &self.video {
            video.duration.unwrap_or(0)
        } else if let Some(audio) = &self.audio {
            audio.duration.unwrap_or(0)
        } else {
            0
        }
    }
}

/// Ranking metadata computed by the network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimMeta {
    /// Stake deposited by anyone other than the claim owner.
    #[serde(default)]
    pub support_amount: Amount,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_amount: Option<Amount>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A claim as returned by `resolve` or `claim_search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: ClaimId,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_url: Option<String>,

    /// `stream`, `channel`, `repost`, `collection`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,

    #[serde(default)]
    pub value: ClaimValue,

    /// Stake deposited by the claim owner.
    #[serde(default)]
    pub amount: Amount,

    #[serde(default)]
    pub meta: ClaimMeta,

    #[serde(default)]
    pub is_spent: bool,

    /// Ledger timestamp of the block holding the claim (Unix seconds).
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<i64>,

    /// Set when this claim is a repost pointing at another claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposted_claim: Option<Box<Claim>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claim {
    /// A minimal claim; mostly useful for building fixtures.
    pub fn new(claim_id: ClaimId, name: impl Into<String>) -> Self {
        Self {
            claim_id,
            name: name.into(),
            canonical_url: None,
            short_url: None,
            permanent_url: None,
            value_type: None,
            value: ClaimValue::default(),
            amount: Amount::ZERO,
            meta: ClaimMeta::default(),
            is_spent: false,
            timestamp: None,
            reposted_claim: None,
            extra: Map::new(),
        }
    }

    pub fn is_repost(&self) -> bool {
        self.reposted_claim.is_some()
    }

    /// Replace a repost with the claim it points to.
    pub fn into_original(self) -> Self {
        match self.reposted_claim {
            Some(original) => *original,
            None => self,
        }
    }

    /// Owner stake plus everybody else's supports.
    pub fn total_stake(&self) -> Amount {
        self.amount + self.meta.support_amount
    }

    /// A URL for display, falling back to the bare name.
    pub fn url(&self) -> &str {
        self.canonical_url
            .as_deref()
            .or(self.permanent_url.as_deref())
            .unwrap_or(&self.name)
    }
}

/// A downloaded claim as returned by `file_list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalFile {
    pub claim_id: ClaimId,

    #[serde(default)]
    pub claim_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(default)]
    pub metadata: ClaimValue,

    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_path: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LocalFile {
    pub fn new(claim_id: ClaimId, claim_name: impl Into<String>) -> Self {
        Self {
            claim_id,
            claim_name: claim_name.into(),
            channel_name: None,
            stream_name: None,
            mime_type: None,
            metadata: ClaimValue::default(),
            timestamp: None,
            download_path: None,
            extra: Map::new(),
        }
    }
}

/// Common view over online claims and local files.
///
/// Sorting, deduplication and size aggregation only need this much.
pub trait ClaimRecord {
    /// Where records of this type come from.
    const SOURCE_MODE: SourceMode;

    fn claim_id(&self) -> &ClaimId;

    /// Name shown in diagnostics.
    fn display_name(&self) -> &str;

    /// Value type (online) or MIME type (local), for diagnostics.
    fn type_label(&self) -> &str;

    /// The metadata container.
    fn media(&self) -> &ClaimValue;

    fn media_mut(&mut self) -> &mut ClaimValue;

    /// Ledger timestamp, used when no release time was declared.
    fn ledger_timestamp(&self) -> Option<i64>;
}

impl ClaimRecord for Claim {
    const SOURCE_MODE: SourceMode = SourceMode::Online;

    fn claim_id(&self) -> &ClaimId {
        &self.claim_id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn type_label(&self) -> &str {
        self.value_type.as_deref().unwrap_or("unknown")
    }

    fn media(&self) -> &ClaimValue {
        &self.value
    }

    fn media_mut(&mut self) -> &mut ClaimValue {
        &mut self.value
    }

    fn ledger_timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

impl ClaimRecord for LocalFile {
    const SOURCE_MODE: SourceMode = SourceMode::Local;

    fn claim_id(&self) -> &ClaimId {
        &self.claim_id
    }

    fn display_name(&self) -> &str {
        self.stream_name.as_deref().unwrap_or(&self.claim_name)
    }

    fn type_label(&self) -> &str {
        self.mime_type.as_deref().unwrap_or("unknown")
    }

    fn media(&self) -> &ClaimValue {
        &self.metadata
    }

    fn media_mut(&mut self) -> &mut ClaimValue {
        &mut self.metadata
    }

    fn ledger_timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

/// One input reference and what it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPair {
    pub original: ClaimRef,
    pub resolved: Option<Claim>,
}

impl ResolvedPair {
    pub fn unresolved(original: ClaimRef) -> Self {
        Self {
            original,
            resolved: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CID: &str = "b7c7082fd52a5b932b6f08c83645ac808b6ba801";

    fn daemon_claim() -> Value {
        json!({
            "claim_id": CID,
            "name": "LUKAS-LION---1984",
            "canonical_url": "lbry://@lukas#1/LUKAS-LION---1984#b",
            "value_type": "stream",
            "amount": "100.0",
            "is_spent": false,
            "timestamp": 1600000100,
            "height": 850000,
            "meta": {"support_amount": "50.0", "trending_mixed": 1.5},
            "value": {
                "release_time": "1600000000",
                "title": "1984",
                "source": {"name": "1984.mp4", "size": "1048576", "media_type": "video/mp4"},
                "video": {"duration": 120, "height": 720},
                "stream_type": "video"
            }
        })
    }

    #[test]
    fn test_parse_daemon_claim() {
        let claim: Claim = serde_json::from_value(daemon_claim()).unwrap();
        assert_eq!(claim.claim_id.to_hex(), CID);
        assert_eq!(claim.amount, Amount::from_lbc(100));
        assert_eq!(claim.meta.support_amount, Amount::from_lbc(50));
        assert_eq!(claim.total_stake(), Amount::from_lbc(150));
        assert_eq!(claim.value.release_time, Some(1_600_000_000));
        assert_eq!(claim.value.source_size(), 1_048_576);
        assert_eq!(claim.value.duration(), 120);
        assert_eq!(claim.extra.get("height"), Some(&json!(850000)));
        assert_eq!(claim.meta.extra.get("trending_mixed"), Some(&json!(1.5)));
    }

    #[test]
    fn test_claim_survives_roundtrip() {
        let claim: Claim = serde_json::from_value(daemon_claim()).unwrap();
        let again: Claim = serde_json::from_value(serde_json::to_value(&claim).unwrap()).unwrap();
        assert_eq!(claim, again);
    }

    #[test]
    fn test_repost_into_original() {
        let original: Claim = serde_json::from_value(daemon_claim()).unwrap();
        let mut repost = Claim::new(ClaimId::from_bytes([0x11; 20]), "repost");
        repost.reposted_claim = Some(Box::new(original.clone()));

        assert!(repost.is_repost());
        assert_eq!(repost.into_original(), original);
        assert_eq!(original.clone().into_original(), original);
    }

    #[test]
    fn test_duration_prefers_video() {
        let value: ClaimValue = serde_json::from_value(json!({
            "video": {"duration": 60},
            "audio": {"duration": 30}
        }))
        .unwrap();
        assert_eq!(value.duration(), 60);

        let value: ClaimValue =
            serde_json::from_value(json!({"audio": {"duration": 30}})).unwrap();
        assert_eq!(value.duration(), 30);
        assert_eq!(ClaimValue::default().duration(), 0);
    }

    #[test]
    fn test_parse_local_file() {
        let file: LocalFile = serde_json::from_value(json!({
            "claim_id": CID,
            "claim_name": "LUKAS-LION---1984",
            "stream_name": "1984.mp4",
            "mime_type": "video/mp4",
            "channel_name": "@lukas",
            "timestamp": 1600000100,
            "metadata": {"source": {"size": "2048"}, "audio": {"duration": 10}}
        }))
        .unwrap();
        assert_eq!(file.display_name(), "1984.mp4");
        assert_eq!(file.type_label(), "video/mp4");
        assert_eq!(file.media().source_size(), 2048);
        assert_eq!(file.media().duration(), 10);
        assert_eq!(<LocalFile as ClaimRecord>::SOURCE_MODE, SourceMode::Local);
    }

    #[test]
    fn test_claim_url_fallback() {
        let mut claim = Claim::new(ClaimId::from_bytes([0x22; 20]), "video");
        assert_eq!(claim.url(), "video");
        claim.canonical_url = Some("lbry://@ch#1/video#2".into());
        assert_eq!(claim.url(), "lbry://@ch#1/video#2");
    }
}
