// In-memory view of the task lists, re-read after every mutation

use crate::store::TaskStore;
use crate::task::{Partitions, Task};
use eyre::{Result, eyre};
use tracing::warn;

/// The last-fetched pending and completed lists
///
/// Every action applies one store mutation and then re-reads both
/// partitions. If the re-read fails the previous lists are kept.
#[derive(Debug, Clone, Default)]
pub struct Board {
    lists: Partitions,
}

impl Board {
    /// Build a board from the current store contents
    pub fn load(store: &TaskStore) -> Result<Self> {
        let mut board = Self::default();
        board.refresh(store)?;
        Ok(board)
    }

    pub fn pending(&self) -> &[Task] {
        &self.lists.pending
    }

    pub fn completed(&self) -> &[Task] {
        &self.lists.completed
    }

    pub fn lists(&self) -> &Partitions {
        &self.lists
    }

    /// Re-read both partitions, keeping the prior lists on failure
    pub fn refresh(&mut self, store: &TaskStore) -> Result<()> {
        match store.refresh_all() {
            Ok(lists) => {
                self.lists = lists;
                Ok(())
            }
            Err(e) => {
                warn!(error = ?e, "Failed to refresh task lists, keeping previous lists");
                Err(e)
            }
        }
    }

    /// Add a task from the entry field
    pub fn submit(&mut self, store: &mut TaskStore, text: &str) -> Result<Option<i64>> {
        let id = store.create(text)?;
        self.refresh(store)?;
        Ok(id)
    }

    /// Complete a task shown in the pending list
    pub fn tap_pending(&mut self, store: &mut TaskStore, id: i64) -> Result<()> {
        if !self.lists.find(id).is_some_and(|t| !t.status().is_done()) {
            return Err(eyre!("No pending task with id {}", id));
        }
        store.mark_done(id)?;
        self.refresh(store)
    }

    /// Remove a task shown in the completed list
    pub fn tap_completed(&mut self, store: &mut TaskStore, id: i64) -> Result<()> {
        if !self.lists.find(id).is_some_and(|t| t.status().is_done()) {
            return Err(eyre!("No completed task with id {}", id));
        }
        store.delete(id)?;
        self.refresh(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteFailurePolicy;

    fn store() -> TaskStore {
        TaskStore::open_in_memory(WriteFailurePolicy::LogAndSwallow).unwrap()
    }

    #[test]
    fn test_load_reads_existing_tasks() {
        let mut store = store();
        store.create("already here").unwrap();

        let board = Board::load(&store).unwrap();
        assert_eq!(board.pending().len(), 1);
        assert!(board.completed().is_empty());
    }

    #[test]
    fn test_submit_then_tap_through_lifecycle() {
        let mut store = store();
        let mut board = Board::load(&store).unwrap();

        let id = board.submit(&mut store, "Buy milk").unwrap().unwrap();
        assert_eq!(board.pending()[0].value, "Buy milk");
        assert!(board.completed().is_empty());

        board.tap_pending(&mut store, id).unwrap();
        assert!(board.pending().is_empty());
        assert_eq!(board.completed()[0].id, id);

        board.tap_completed(&mut store, id).unwrap();
        assert!(board.lists().is_empty());
    }

    #[test]
    fn test_submit_blank_changes_nothing() {
        let mut store = store();
        let mut board = Board::load(&store).unwrap();

        assert_eq!(board.submit(&mut store, "  ").unwrap(), None);
        assert!(board.lists().is_empty());
    }

    #[test]
    fn test_tap_completed_rejects_pending_task() {
        let mut store = store();
        let mut board = Board::load(&store).unwrap();
        let id = board.submit(&mut store, "not done yet").unwrap().unwrap();

        assert!(board.tap_completed(&mut store, id).is_err());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_tap_pending_rejects_completed_task() {
        let mut store = store();
        let mut board = Board::load(&store).unwrap();
        let id = board.submit(&mut store, "finished").unwrap().unwrap();
        board.tap_pending(&mut store, id).unwrap();

        assert!(board.tap_pending(&mut store, id).is_err());
        assert_eq!(board.completed().len(), 1);
    }

    #[test]
    fn test_tap_pending_rejects_unknown_task() {
        let mut store = store();
        let mut board = Board::load(&store).unwrap();

        assert!(board.tap_pending(&mut store, 42).is_err());
    }

    #[test]
    fn test_failed_refresh_keeps_previous_lists() {
        let mut store = store();
        let mut board = Board::load(&store).unwrap();
        board.submit(&mut store, "survivor").unwrap();

        store.db().execute_batch("DROP TABLE items;").unwrap();

        assert!(board.refresh(&store).is_err());
        assert_eq!(board.pending().len(), 1);
        assert_eq!(board.pending()[0].value, "survivor");
    }

    #[test]
    fn test_swallowed_write_failure_surfaces_as_refresh_error() {
        let mut store = store();
        let mut board = Board::load(&store).unwrap();
        board.submit(&mut store, "first").unwrap();
        store.db().execute_batch("DROP TABLE items;").unwrap();

        // create swallows the insert error, the follow-up read does not
        assert!(board.submit(&mut store, "second").is_err());
        assert_eq!(board.pending().len(), 1);
    }
}
