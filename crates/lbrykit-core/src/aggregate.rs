//! Total size and duration of claim collections.

use serde::{Deserialize, Serialize};

use crate::claim::{ClaimRecord, SourceMode};

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Totals over a claim collection. Derived values are computed from the
/// integer totals on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSize {
    pub total_bytes: u64,
    pub total_seconds: u64,
    pub claim_count: usize,
    /// Records that had no downloadable source (still counted above).
    pub missing_source: usize,
}

impl AggregateSize {
    /// Total size in GiB.
    pub fn gib(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_GIB
    }

    /// Total duration in days.
    pub fn days(&self) -> f64 {
        self.total_seconds as f64 / SECONDS_PER_DAY
    }

    /// Total duration as (hours, minutes, seconds).
    pub fn hms(&self) -> (u64, u64, u64) {
        let hours = self.total_seconds / 3600;
        let minutes = (self.total_seconds % 3600) / 60;
        let seconds = self.total_seconds % 60;
        (hours, minutes, seconds)
    }

    /// Three-line human summary.
    pub fn summary(&self) -> String {
        let (h, m, s) = self.hms();
        format!(
            "Claims: {}\nTotal size: {:.4} GB\nTotal duration: {} h {} min {} s, or {:.4} days",
            self.claim_count,
            self.gib(),
            h,
            m,
            s,
            self.days()
        )
    }
}

/// Add up byte size and media duration.
///
/// The metadata container depends on the record type (`value` for online
/// claims, `metadata` for local files). Records without a `source`
/// contribute no bytes and are counted in `missing_source`.
pub fn aggregate<T: ClaimRecord>(records: &[T]) -> AggregateSize {
    let total = records.len();
    let mut size = AggregateSize {
        claim_count: total,
        ..AggregateSize::default()
    };

    for (num, record) in records.iter().enumerate() {
        let media = record.media();

        if media.source.is_some() {
            size.total_bytes = size.total_bytes.saturating_add(media.source_size());
        } else {
            size.missing_source += 1;
            tracing::debug!(
                "{}/{} type: {}; no source: {:?}",
                num + 1,
                total,
                record.type_label(),
                record.display_name()
            );
        }

        size.total_seconds = size.total_seconds.saturating_add(media.duration());
    }

    let mode = match T::SOURCE_MODE {
        SourceMode::Online => "downloadable",
        SourceMode::Local => "downloaded",
    };
    tracing::debug!(
        "size of {} {} claims: {} bytes, {} s",
        size.claim_count,
        mode,
        size.total_bytes,
        size.total_seconds
    );

    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::{Claim, LocalFile, Media, Source};
    use crate::types::ClaimId;

    fn video_claim(id: u8, bytes: u64, seconds: u64) -> Claim {
        let mut claim = Claim::new(ClaimId::from_bytes([id; 20]), "video");
        claim.value.source = Some(Source {
            size: Some(bytes),
            ..Source::default()
        });
        claim.value.video = Some(Media {
            duration: Some(seconds),
            ..Media::default()
        });
        claim
    }

    #[test]
    fn test_single_video() {
        let size = aggregate(&[video_claim(1, 1_048_576, 120)]);
        assert_eq!(size.total_bytes, 1_048_576);
        assert_eq!(size.total_seconds, 120);
        assert_eq!(size.claim_count, 1);
        assert_eq!(size.missing_source, 0);
    }

    #[test]
    fn test_missing_source_counts_but_adds_nothing() {
        let bare = Claim::new(ClaimId::from_bytes([2; 20]), "post");
        let size = aggregate(&[video_claim(1, 100, 10), bare]);
        assert_eq!(size.total_bytes, 100);
        assert_eq!(size.claim_count, 2);
        assert_eq!(size.missing_source, 1);
    }

    #[test]
    fn test_source_without_size() {
        let mut claim = video_claim(1, 0, 5);
        claim.value.source = Some(Source::default());
        let size = aggregate(&[claim]);
        assert_eq!(size.total_bytes, 0);
        assert_eq!(size.missing_source, 0);
        assert_eq!(size.total_seconds, 5);
    }

    #[test]
    fn test_local_files_use_metadata() {
        let mut file = LocalFile::new(ClaimId::from_bytes([3; 20]), "song");
        file.metadata.source = Some(Source {
            size: Some(4096),
            ..Source::default()
        });
        file.metadata.audio = Some(Media {
            duration: Some(200),
            ..Media::default()
        });
        let size = aggregate(&[file]);
        assert_eq!(size.total_bytes, 4096);
        assert_eq!(size.total_seconds, 200);
    }

    #[test]
    fn test_out_of_range_size_counts_as_zero() {
        let huge: Claim = serde_json::from_value(serde_json::json!({
            "claim_id": "0101010101010101010101010101010101010101",
            "name": "huge",
            "value": {"source": {"size": "18446744073709551615"}}
        }))
        .unwrap();
        let size = aggregate(&[huge, video_claim(2, 1, 0)]);
        assert_eq!(size.total_bytes, 1);
        assert_eq!(size.missing_source, 0);
    }

    #[test]
    fn test_totals_saturate() {
        let size = aggregate(&[video_claim(1, u64::MAX, u64::MAX), video_claim(2, 1, 1)]);
        assert_eq!(size.total_bytes, u64::MAX);
        assert_eq!(size.total_seconds, u64::MAX);
    }

    #[test]
    fn test_empty() {
        assert_eq!(aggregate::<Claim>(&[]), AggregateSize::default());
    }

    #[test]
    fn test_derived_values() {
        let size = AggregateSize {
            total_bytes: 3 * 1024 * 1024 * 1024,
            total_seconds: 90_061,
            claim_count: 4,
            missing_source: 0,
        };
        assert_eq!(size.gib(), 3.0);
        assert_eq!(size.hms(), (25, 1, 1));
        assert!((size.days() - 1.042372685).abs() < 1e-6);
        assert_eq!(
            size.summary(),
            "Claims: 4\nTotal size: 3.0000 GB\nTotal duration: 25 h 1 min 1 s, or 1.0424 days"
        );
    }
}
