//! Sorting and deduplication of claim collections.
//!
//! The order is always decided newest-first internally: release time
//! descending, then claim ID descending for records released in the same
//! second. Breaking ties by claim ID makes the result depend only on the
//! set of records, so normalizing twice changes nothing.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::claim::ClaimRecord;

/// Give every record a release time, using the ledger timestamp when the
/// publisher did not declare one. Returns how many records were filled.
pub fn fill_release_times<T: ClaimRecord>(records: &mut [T]) -> usize {
    let total = records.len();
    let mut filled = 0;

    for (num, record) in records.iter_mut().enumerate() {
        if record.media().release_time.is_some() {
            continue;
        }
        let timestamp = record.ledger_timestamp().unwrap_or(0);
        tracing::debug!(
            "{}/{} {:?} has no release_time, using timestamp {}",
            num + 1,
            total,
            record.display_name(),
            timestamp
        );
        record.media_mut().release_time = Some(timestamp);
        filled += 1;
    }

    filled
}

fn release_time<T: ClaimRecord>(record: &T) -> i64 {
    record
        .media()
        .release_time
        .or_else(|| record.ledger_timestamp())
        .unwrap_or(0)
}

fn newest_first<T: ClaimRecord>(a: &T, b: &T) -> Ordering {
    release_time(b)
        .cmp(&release_time(a))
        .then_with(|| b.claim_id().cmp(a.claim_id()))
}

/// Sort by release time without removing anything.
///
/// Oldest first unless `newest_first` is set. Missing release times are
/// filled in first.
pub fn sort_by_release<T: ClaimRecord>(mut records: Vec<T>, newest_first_order: bool) -> Vec<T> {
    fill_release_times(&mut records);
    records.sort_by(newest_first);
    if !newest_first_order {
        records.reverse();
    }
    records
}

/// Normalize a claim collection.
///
/// 1. Fill missing release times from the ledger timestamp.
/// 2. Sort newest first.
/// 3. Keep only the first (newest) record of each claim ID.
/// 4. Keep at most `max_count` records when `max_count > 0`.
/// 5. Reverse to oldest first unless `newest_first` is set.
pub fn normalize<T: ClaimRecord>(
    mut records: Vec<T>,
    max_count: usize,
    newest_first_order: bool,
) -> Vec<T> {
    if records.is_empty() {
        return records;
    }

    let filled = fill_release_times(&mut records);
    if filled > 0 {
        tracing::debug!("filled {} release times from timestamps", filled);
    }

    records.sort_by(newest_first);

    let before = records.len();
    let mut seen = HashSet::with_capacity(records.len());
    records.retain(|record| seen.insert(*record.claim_id()));
    if records.len() < before {
        tracing::debug!("removed {} duplicate claims", before - records.len());
    }

    if max_count > 0 {
        records.truncate(max_count);
    }

    if !newest_first_order {
        records.reverse();
    }

    records
}
