//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use lbrykit_core::{Amount, Claim, ClaimId, LocalFile, Media, Source};
use lbrykit_rpc::MemoryDaemon;

/// Deterministic claim ID for a fixture number.
pub fn claim_id(n: u64) -> ClaimId {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&n.to_be_bytes());
    ClaimId::from_bytes(bytes)
}

/// Builder for claim records.
#[derive(Debug, Clone)]
pub struct ClaimBuilder {
    claim: Claim,
}

impl ClaimBuilder {
    /// A stream claim with canonical URL `lbry://<name>#<id>`.
    pub fn new(n: u64, name: &str) -> Self {
        let mut claim = Claim::new(claim_id(n), name);
        claim.canonical_url = Some(format!("lbry://{}#{:x}", name, n));
        claim.value_type = Some("stream".into());
        Self { claim }
    }

    /// A channel claim; `name` gets a leading `@` when missing.
    pub fn channel(n: u64, name: &str) -> Self {
        let name = if name.starts_with('@') {
            name.to_string()
        } else {
            format!("@{}", name)
        };
        let mut builder = Self::new(n, &name);
        builder.claim.value_type = Some("channel".into());
        builder
    }

    /// Place the claim under a channel: `lbry://@chan#c/<name>#<id>`.
    pub fn in_channel(mut self, channel: &Claim) -> Self {
        let channel_url = channel.url().trim_start_matches("lbry://");
        self.claim.canonical_url = Some(format!(
            "lbry://{}/{}#{:x}",
            channel_url,
            self.claim.name,
            u64_of(&self.claim.claim_id)
        ));
        self
    }

    pub fn release_time(mut self, release_time: i64) -> Self {
        self.claim.value.release_time = Some(release_time);
        self
    }

    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.claim.timestamp = Some(timestamp);
        self
    }

    /// A downloadable source of `size` bytes.
    pub fn source(mut self, size: u64) -> Self {
        self.claim.value.source = Some(Source {
            name: Some(format!("{}.mp4", self.claim.name)),
            size: Some(size),
            ..Source::default()
        });
        self
    }

    pub fn video(mut self, duration: u64) -> Self {
        self.claim.value.video = Some(Media {
            duration: Some(duration),
            ..Media::default()
        });
        self
    }

    pub fn audio(mut self, duration: u64) -> Self {
        self.claim.value.audio = Some(Media {
            duration: Some(duration),
            ..Media::default()
        });
        self
    }

    /// Owner deposit and other people's supports, in whole LBC.
    pub fn stake(mut self, amount: i64, support_amount: i64) -> Self {
        self.claim.amount = Amount::from_lbc(amount);
        self.claim.meta.support_amount = Amount::from_lbc(support_amount);
        self
    }

    /// Turn this claim into a repost of `original`.
    pub fn repost_of(mut self, original: Claim) -> Self {
        self.claim.value_type = Some("repost".into());
        self.claim.value.source = None;
        self.claim.reposted_claim = Some(Box::new(original));
        self
    }

    pub fn build(self) -> Claim {
        self.claim
    }
}

fn u64_of(claim_id: &ClaimId) -> u64 {
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&claim_id.0[12..]);
    u64::from_be_bytes(tail)
}

/// The local file a download of `claim` would produce.
pub fn local_file(claim: &Claim, channel: Option<&str>) -> LocalFile {
    let mut file = LocalFile::new(claim.claim_id, claim.name.clone());
    file.channel_name = channel.map(str::to_string);
    file.metadata = claim.value.clone();
    file.timestamp = claim.timestamp;
    file.mime_type = Some("video/mp4".into());
    file
}

/// `count` videos released one day apart, oldest first, each 1 MiB and
/// one minute long. Every third claim has no declared release time.
pub fn channel_videos(channel: &Claim, first: u64, count: u64) -> Vec<Claim> {
    (0..count)
        .map(|i| {
            let n = first + i;
            let released = 1_600_000_000 + (i as i64) * 86_400;
            let builder = ClaimBuilder::new(n, &format!("video-{}", n))
                .in_channel(channel)
                .timestamp(released)
                .source(1 << 20)
                .video(60)
                .stake(1, 0);
            if i % 3 == 2 {
                builder.build()
            } else {
                builder.release_time(released).build()
            }
        })
        .collect()
}

/// A shuffled listing with duplicates, as a channel scrape can return.
///
/// Each claim appears once or twice; the duplicate carries an older
/// release time.
pub fn noisy_listing(claims: &[Claim], seed: u64) -> Vec<Claim> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut listing = Vec::with_capacity(claims.len() * 2);
    for claim in claims {
        listing.push(claim.clone());
        if rng.gen_bool(0.25) {
            let mut stale = claim.clone();
            let released = claim.value.release_time.or(claim.timestamp).unwrap_or(0);
            stale.value.release_time = Some(released - rng.gen_range(1..86_400));
            listing.push(stale);
        }
    }
    listing.shuffle(&mut rng);
    listing
}

/// A memory daemon seeded with one channel.
pub struct TestFixture {
    pub daemon: Arc<MemoryDaemon>,
    pub channel: Claim,
    pub videos: Vec<Claim>,
}

impl TestFixture {
    /// Channel `@chan` with `count` videos; all of them downloaded.
    pub fn new(count: u64) -> Self {
        let daemon = Arc::new(MemoryDaemon::new());
        let channel = ClaimBuilder::channel(1, "chan").stake(10, 0).build();
        let videos = channel_videos(&channel, 100, count);

        daemon.add_claim(channel.clone());
        for video in &videos {
            daemon.add_claim(video.clone());
            daemon.add_file(local_file(video, Some("@chan")));
        }

        Self {
            daemon,
            channel,
            videos,
        }
    }

    /// Delete a video from the network; its download stays.
    pub fn remove(&self, index: usize) -> ClaimId {
        let claim_id = self.videos[index].claim_id;
        self.daemon.remove_claim(&claim_id);
        claim_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_ids_are_distinct() {
        assert_ne!(claim_id(1), claim_id(2));
        assert_eq!(u64_of(&claim_id(0xabcdef)), 0xabcdef);
    }

    #[test]
    fn test_channel_urls() {
        let channel = ClaimBuilder::channel(1, "chan").build();
        assert_eq!(channel.name, "@chan");

        let video = ClaimBuilder::new(0x10, "video").in_channel(&channel).build();
        assert_eq!(video.canonical_url.as_deref(), Some("lbry://@chan#1/video#10"));
    }

    #[test]
    fn test_noisy_listing_keeps_every_claim() {
        let channel = ClaimBuilder::channel(1, "chan").build();
        let videos = channel_videos(&channel, 100, 50);
        let listing = noisy_listing(&videos, 7);

        assert!(listing.len() >= videos.len());
        for video in &videos {
            assert!(listing.iter().any(|c| c.claim_id == video.claim_id));
        }
    }
}
