use crate::models::ProcessingItem;
use std::sync::Arc;

/// How long a failed item stays visible after its error was first reported.
pub const ERROR_RETENTION_MS: i64 = 5_000;

/// Fields that count as a change for an existing item. Anything else (e.g.
/// enrichment payloads) updates silently without replacing the record.
fn significant_fields_changed(current: &ProcessingItem, incoming: &ProcessingItem) -> bool {
    current.status.cached != incoming.status.cached
        || current.status.added != incoming.status.added
        || current.status.mounted != incoming.status.mounted
        || current.status.symlinked != incoming.status.symlinked
        || current.status.status != incoming.status.status
        || current.status.error != incoming.status.error
        || current.progress != incoming.progress
}

/// True when the item should be dropped from the collection: fully linked
/// into the library, or errored longer ago than the retention window.
pub fn should_prune(item: &ProcessingItem, now_ms: i64) -> bool {
    if item.status.symlinked {
        return true;
    }
    if item.status.error {
        if let Some(error_time) = item.status.error_time {
            return now_ms - (error_time * 1000.0) as i64 > ERROR_RETENTION_MS;
        }
    }
    false
}

/// Merge a server snapshot into the tracked collection.
///
/// The snapshot is not assumed exhaustive: an id missing from `incoming` is
/// kept as-is (server omission is not a deletion signal). Items whose
/// significant fields are unchanged keep their existing `Arc`, so downstream
/// consumers can detect no-op updates by pointer equality. New ids are
/// appended, then the prune predicate is applied to the whole set.
pub fn reconcile(
    current: &[Arc<ProcessingItem>],
    incoming: Vec<ProcessingItem>,
    now_ms: i64,
) -> Vec<Arc<ProcessingItem>> {
    let mut merged: Vec<Arc<ProcessingItem>> = current
        .iter()
        .map(|existing| {
            match incoming.iter().find(|candidate| candidate.id == existing.id) {
                None => existing.clone(),
                Some(candidate) => {
                    if significant_fields_changed(existing, candidate) {
                        Arc::new(candidate.clone())
                    } else {
                        existing.clone()
                    }
                }
            }
        })
        .collect();

    for candidate in incoming {
        if !merged.iter().any(|item| item.id == candidate.id) {
            merged.push(Arc::new(candidate));
        }
    }

    merged.retain(|item| !should_prune(item, now_ms));
    merged
}
