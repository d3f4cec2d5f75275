//! Housekeeping run once when the application starts.

use crate::config::AppSettings;
use crate::store::EntryStore;
use tracing::info;

/// Entries dropped by [`apply_limits`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitReport {
    pub history_removed: usize,
    pub bookmarks_removed: usize,
}

/// Trims history and bookmarks to the caps in `settings`.
pub fn apply_limits(store: &mut EntryStore, settings: &AppSettings) -> LimitReport {
    let report = LimitReport {
        history_removed: store.enforce_history_limit(settings.max_history_items),
        bookmarks_removed: store.enforce_bookmark_limit(settings.max_bookmark_items),
    };
    if report != LimitReport::default() {
        info!(
            "Startup limits removed {} history entries and {} bookmarks",
            report.history_removed, report.bookmarks_removed
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{HistoryEntry, Operation};
    use tempfile::tempdir;

    #[test]
    fn test_apply_limits_trims_both_collections() {
        let dir = tempdir().unwrap();
        let mut store = EntryStore::open(dir.path());
        for i in 0..4 {
            store.add_entry(HistoryEntry::new(Operation::Encrypt, format!("p{}", i), "x"));
        }
        for i in 0..3 {
            store.add_entry(
                HistoryEntry::new(Operation::Encrypt, format!("f{}", i), "x").favorite(true),
            );
        }

        let settings = AppSettings {
            max_history_items: 2,
            max_bookmark_items: 1,
            ..AppSettings::default()
        };
        let report = apply_limits(&mut store, &settings);

        assert_eq!(report.history_removed, 2);
        assert_eq!(report.bookmarks_removed, 2);
        // Three favorites plus the two newest plain entries.
        assert_eq!(store.history().len(), 5);
        assert_eq!(store.bookmarks().len(), 1);
    }

    #[test]
    fn test_apply_limits_within_caps_is_noop() {
        let dir = tempdir().unwrap();
        let mut store = EntryStore::open(dir.path());
        store.add_entry(HistoryEntry::new(Operation::Decrypt, "a", "b"));

        let report = apply_limits(&mut store, &AppSettings::default());
        assert_eq!(report, LimitReport::default());
        assert_eq!(store.history().len(), 1);
    }
}
