//! Profile page view model and the in-flight delete set.

use crate::models::{FileInfo, UserProfile};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

pub const DELETE_FAILED: &str = "Failed to delete file";
pub const PROFILE_LOAD_FAILED: &str = "Failed to load profile data";

/// Profile and file list, merged after both calls settled.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub profile: UserProfile,
    pub files: Vec<FileInfo>,
}

/// File ids with a delete call in flight.
///
/// Every change swaps in a fresh set, so a snapshot handed to a page never
/// changes under it and concurrent deletes of different ids cannot lose
/// each other's entries.
#[derive(Debug, Default)]
pub struct DeletingSet {
    ids: Mutex<Arc<HashSet<String>>>,
}

impl DeletingSet {
    pub fn snapshot(&self) -> Arc<HashSet<String>> {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mark `file_id` as deleting. `None` when it already is.
    pub fn begin(&self, file_id: &str) -> Option<DeletingGuard<'_>> {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if ids.contains(file_id) {
            return None;
        }
        let mut next = HashSet::clone(&ids);
        next.insert(file_id.to_string());
        *ids = Arc::new(next);

        Some(DeletingGuard {
            set: self,
            file_id: file_id.to_string(),
        })
    }

    fn finish(&self, file_id: &str) {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = HashSet::clone(&ids);
        next.remove(file_id);
        *ids = Arc::new(next);
    }
}

/// Removes its id from the set when dropped, whatever the delete's outcome.
pub struct DeletingGuard<'a> {
    set: &'a DeletingSet,
    file_id: String,
}

impl Drop for DeletingGuard<'_> {
    fn drop(&mut self) {
        self.set.finish(&self.file_id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The user did not confirm; nothing was sent.
    Cancelled,
    AlreadyDeleting,
    /// Deleted and the profile was reloaded.
    Deleted(ProfileView),
    /// The delete call succeeded but the reload did not.
    DeletedReloadFailed,
    Failed(String),
    /// The API no longer accepts the session.
    Unauthorized,
}

impl DeleteOutcome {
    pub fn outcome_label(&self) -> &'static str {
        match self {
            DeleteOutcome::Cancelled => "cancelled",
            DeleteOutcome::AlreadyDeleting => "already_deleting",
            DeleteOutcome::Deleted(_) | DeleteOutcome::DeletedReloadFailed => "deleted",
            DeleteOutcome::Failed(_) => "failed",
            DeleteOutcome::Unauthorized => "unauthorized",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_deletes_do_not_clobber_each_other() {
        let set = DeletingSet::default();

        let a = set.begin("a").unwrap();
        let b = set.begin("b").unwrap();
        assert!(set.snapshot().contains("a") && set.snapshot().contains("b"));

        drop(a);
        assert!(!set.snapshot().contains("a"));
        assert!(set.snapshot().contains("b"));

        drop(b);
        assert!(set.snapshot().is_empty());
    }

    #[test]
    fn same_id_cannot_start_twice() {
        let set = DeletingSet::default();
        let guard = set.begin("a").unwrap();
        assert!(set.begin("a").is_none());

        drop(guard);
        assert!(set.begin("a").is_some());
    }

    #[test]
    fn snapshots_are_stable() {
        let set = DeletingSet::default();
        let before = set.snapshot();
        let _guard = set.begin("a").unwrap();

        assert!(before.is_empty());
        assert!(set.snapshot().contains("a"));
    }
}
