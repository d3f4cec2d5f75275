//! EntryStore: the history log and its bookmarks subset.
//!
//! Two ordered collections are kept side by side, each persisted to its own file
//! (`history.json`, `bookmarks.json`) in the store's data directory:
//!
//! - **history** holds every recorded transform, most recent first.
//! - **bookmarks** holds a copy of every favorited entry.
//!
//! An entry is favorited iff a copy with its `id` exists in bookmarks, and the
//! history copy's `is_favorite` flag tracks that. The two copies are independent
//! values; only [`EntryStore::update_entry`] propagates note edits between them.
//! Deletion is local to one collection.
//!
//! Collections load lazily on first use and are cached for the lifetime of the
//! store. Reads of a missing or corrupt file give an empty collection; failed
//! writes are logged and dropped, so the in-memory state stays authoritative for
//! the running process.
//!
//! The store does no locking. Hosts that share one store between threads must
//! wrap it in a mutex.

pub mod entry;
pub mod file;


pub use self::entry::{HistoryEntry, Operation};

use crate::constants::{BOOKMARKS_FILE_NAME, HISTORY_FILE_NAME};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Selects one of the two collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    History,
    Bookmarks,
}

/// Owner of the history and bookmark collections for one data directory.
#[derive(Debug)]
pub struct EntryStore {
    data_dir: PathBuf,
    history: Option<Vec<HistoryEntry>>,
    bookmarks: Option<Vec<HistoryEntry>>,
}

impl EntryStore {
    /// Creates a store rooted at `data_dir`. Nothing is read until first use.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            history: None,
            bookmarks: None,
        }
    }

    /// Redirects persistence to `data_dir` and drops both cached collections.
    pub fn reset_data_location(&mut self, data_dir: impl Into<PathBuf>) {
        self.data_dir = data_dir.into();
        self.history = None;
        self.bookmarks = None;
        debug!("Entry store redirected to {:?}", self.data_dir);
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE_NAME)
    }

    fn bookmarks_path(&self) -> PathBuf {
        self.data_dir.join(BOOKMARKS_FILE_NAME)
    }

    fn history_mut(&mut self) -> &mut Vec<HistoryEntry> {
        if self.history.is_none() {
            self.history = Some(file::load_entries(&self.history_path()));
        }
        self.history.get_or_insert_with(Vec::new)
    }

    fn bookmarks_mut(&mut self) -> &mut Vec<HistoryEntry> {
        if self.bookmarks.is_none() {
            let mut loaded = file::load_entries(&self.bookmarks_path());
            for entry in &mut loaded {
                entry.is_favorite = true;
            }
            self.bookmarks = Some(loaded);
        }
        self.bookmarks.get_or_insert_with(Vec::new)
    }

    fn save_history(&self) {
        if let Some(entries) = &self.history {
            if let Err(e) = file::save_entries(&self.history_path(), entries) {
                warn!("History not persisted: {}", e);
            }
        }
    }

    fn save_bookmarks(&self) {
        if let Some(entries) = &self.bookmarks {
            if let Err(e) = file::save_entries(&self.bookmarks_path(), entries) {
                warn!("Bookmarks not persisted: {}", e);
            }
        }
    }

    /// All history entries, most recent first.
    pub fn history(&mut self) -> &[HistoryEntry] {
        self.history_mut()
    }

    /// All bookmark entries.
    pub fn bookmarks(&mut self) -> &[HistoryEntry] {
        self.bookmarks_mut()
    }

    /// The first `count` history entries.
    pub fn recent(&mut self, count: usize) -> Vec<HistoryEntry> {
        self.history_mut().iter().take(count).cloned().collect()
    }

    /// Looks up an entry by id in one collection.
    pub fn find(&mut self, collection: Collection, id: &str) -> Option<&HistoryEntry> {
        let entries = match collection {
            Collection::History => self.history_mut(),
            Collection::Bookmarks => self.bookmarks_mut(),
        };
        entries.iter().find(|e| e.id == id)
    }

    /// Records `entry` at the head of history, mirroring it into bookmarks when it
    /// is already a favorite.
    pub fn add_entry(&mut self, entry: HistoryEntry) {
        let bookmark = entry.is_favorite.then(|| entry.bookmark_copy());

        self.history_mut().insert(0, entry);
        self.save_history();

        if let Some(copy) = bookmark {
            self.bookmarks_mut().insert(0, copy);
            self.save_bookmarks();
        }
    }

    /// Applies the `note` and `is_favorite` of `entry` to the stored entry with the
    /// same id, then reconciles bookmarks.
    ///
    /// When the id is only present in bookmarks, the favorite flag decides whether
    /// that copy is kept (with the new note) or removed.
    pub fn update_entry(&mut self, entry: &HistoryEntry) {
        // Touch both collections so the reconciliation below sees loaded state.
        self.bookmarks_mut();

        let history_copy = self
            .history_mut()
            .iter_mut()
            .find(|e| e.id == entry.id)
            .map(|stored| {
                stored.note = entry.note.clone();
                stored.is_favorite = entry.is_favorite;
                stored.clone()
            });

        if let Some(stored) = history_copy {
            self.save_history();

            let bookmarks = self.bookmarks_mut();
            if entry.is_favorite {
                match bookmarks.iter_mut().find(|e| e.id == entry.id) {
                    Some(existing) => existing.note = entry.note.clone(),
                    None => bookmarks.insert(0, stored.bookmark_copy()),
                }
            } else {
                bookmarks.retain(|e| e.id != entry.id);
            }
            self.save_bookmarks();
            return;
        }

        let bookmarks = self.bookmarks_mut();
        let Some(position) = bookmarks.iter().position(|e| e.id == entry.id) else {
            debug!("Update for unknown entry {} ignored", entry.id);
            return;
        };
        if entry.is_favorite {
            bookmarks[position].note = entry.note.clone();
        } else {
            bookmarks.remove(position);
        }
        self.save_bookmarks();
    }

    /// Removes an entry from history only. Its bookmark, if any, survives.
    ///
    /// Returns whether anything was removed.
    pub fn delete_from_history(&mut self, id: &str) -> bool {
        let history = self.history_mut();
        let before = history.len();
        history.retain(|e| e.id != id);
        let removed = history.len() != before;
        self.save_history();
        removed
    }

    /// Removes an entry from bookmarks and clears the favorite flag on its history
    /// counterpart, if one exists.
    ///
    /// Returns whether anything was removed.
    pub fn delete_from_bookmarks(&mut self, id: &str) -> bool {
        let bookmarks = self.bookmarks_mut();
        let before = bookmarks.len();
        bookmarks.retain(|e| e.id != id);
        let removed = bookmarks.len() != before;
        self.save_bookmarks();

        if let Some(counterpart) = self.history_mut().iter_mut().find(|e| e.id == id) {
            counterpart.is_favorite = false;
            self.save_history();
        }
        removed
    }

    /// Batch form of [`EntryStore::delete_from_history`] with a single write.
    ///
    /// Returns the number of entries removed.
    pub fn delete_history_entries<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: HashSet<String> = ids.into_iter().map(|s| s.as_ref().to_string()).collect();
        let history = self.history_mut();
        let before = history.len();
        history.retain(|e| !ids.contains(&e.id));
        let removed = before - history.len();
        self.save_history();
        removed
    }

    /// Batch form of [`EntryStore::delete_from_bookmarks`], one write per collection.
    ///
    /// Returns the number of bookmarks removed.
    pub fn delete_bookmark_entries<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: HashSet<String> = ids.into_iter().map(|s| s.as_ref().to_string()).collect();

        let bookmarks = self.bookmarks_mut();
        let before = bookmarks.len();
        bookmarks.retain(|e| !ids.contains(&e.id));
        let removed = before - bookmarks.len();
        self.save_bookmarks();

        for entry in self.history_mut().iter_mut() {
            if ids.contains(&entry.id) {
                entry.is_favorite = false;
            }
        }
        self.save_history();
        removed
    }

    /// Drops every non-favorited history entry. Bookmarks are untouched.
    pub fn clear_history(&mut self) {
        self.history_mut().retain(|e| e.is_favorite);
        self.save_history();
        info!("History cleared, favorites kept");
    }

    /// Empties bookmarks and unfavorites every history entry.
    pub fn clear_bookmarks(&mut self) {
        for entry in self.history_mut().iter_mut() {
            entry.is_favorite = false;
        }
        self.save_history();

        self.bookmarks = Some(Vec::new());
        self.save_bookmarks();
        info!("Bookmarks cleared");
    }

    /// Caps history at `max` non-favorited entries.
    ///
    /// Favorites are never trimmed, so the result may exceed `max`. The survivors
    /// are re-sorted newest first. Returns the number of entries removed.
    pub fn enforce_history_limit(&mut self, max: usize) -> usize {
        let history = self.history_mut();
        if history.len() <= max {
            return 0;
        }

        let before = history.len();
        let (mut kept, mut others): (Vec<_>, Vec<_>) =
            history.drain(..).partition(|e| e.is_favorite);
        others.truncate(max);
        kept.append(&mut others);
        kept.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let removed = before - kept.len();
        *history = kept;
        self.save_history();

        if removed > 0 {
            info!("Trimmed {} history entries to honour limit {}", removed, max);
        }
        removed
    }

    /// Caps bookmarks at the first `max` entries in their current order.
    ///
    /// Returns the number of bookmarks removed.
    pub fn enforce_bookmark_limit(&mut self, max: usize) -> usize {
        let bookmarks = self.bookmarks_mut();
        if bookmarks.len() <= max {
            return 0;
        }
        let removed = bookmarks.len() - max;
        bookmarks.truncate(max);
        self.save_bookmarks();
        info!("Trimmed {} bookmarks to honour limit {}", removed, max);
        removed
    }

    /// Appends `items` to history as-is (no id dedup) and re-sorts newest first.
    pub fn import_history(&mut self, items: Vec<HistoryEntry>) {
        let count = items.len();
        let history = self.history_mut();
        history.extend(items);
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.save_history();
        debug!("Imported {} history entries", count);
    }

    /// Appends `items` to bookmarks as-is (no id dedup) and re-sorts newest first.
    pub fn import_bookmarks(&mut self, items: Vec<HistoryEntry>) {
        let count = items.len();
        let bookmarks = self.bookmarks_mut();
        bookmarks.extend(items);
        bookmarks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.save_bookmarks();
        debug!("Imported {} bookmarks", count);
    }

    /// Entries of `collection` whose input, output or note contains `text`,
    /// ignoring case. Blank `text` returns the whole collection.
    pub fn search(&mut self, collection: Collection, text: &str) -> Vec<HistoryEntry> {
        let entries = match collection {
            Collection::History => self.history_mut(),
            Collection::Bookmarks => self.bookmarks_mut(),
        };

        if text.trim().is_empty() {
            return entries.clone();
        }

        let needle = text.to_lowercase();
        entries
            .iter()
            .filter(|e| e.matches(&needle))
            .cloned()
            .collect()
    }
}
