//! Periodic persistence of the active board.

use crate::board::{Board, BoardRecord};
use crate::storage::{Storage, StorageResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Key under which the most recently saved board is mirrored.
pub const LAST_BOARD_KEY: &str = "__last_board__";

/// Writes the board to storage when it has unsaved changes and the interval has elapsed.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    current_board_id: Option<String>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
            current_board_id: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Save under this id instead of the record's own.
    pub fn set_board_id(&mut self, id: Option<String>) {
        self.current_board_id = id;
    }

    pub fn board_id(&self) -> Option<&str> {
        self.current_board_id.as_deref()
    }

    /// Dirty and either never saved or the interval has elapsed.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save `record` if [`Self::should_save`]. Returns true if it was written.
    pub async fn maybe_save(&mut self, record: &BoardRecord) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(record).await?;
        Ok(true)
    }

    /// Pick up the board's pending changes and save them when due.
    pub async fn tick(&mut self, board: &mut Board) -> StorageResult<bool> {
        if board.take_dirty() {
            self.dirty = true;
        }
        if !self.should_save() {
            return Ok(false);
        }
        self.save(&board.to_record()).await?;
        Ok(true)
    }

    /// Save immediately, also mirroring to [`LAST_BOARD_KEY`].
    pub async fn save(&mut self, record: &BoardRecord) -> StorageResult<()> {
        let id = self.current_board_id.clone().unwrap_or_else(|| record.id.clone());

        self.storage.save(&id, record).await?;
        self.storage.save(LAST_BOARD_KEY, record).await?;

        log::debug!("Saved board {}", id);
        self.last_save = Some(Instant::now());
        self.dirty = false;
        Ok(())
    }

    pub async fn load(&mut self, id: &str) -> StorageResult<BoardRecord> {
        let record = self.storage.load(id).await?;
        self.current_board_id = Some(id.to_string());
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(record)
    }

    /// Load the most recently saved board, if any.
    pub async fn load_last(&mut self) -> Option<BoardRecord> {
        match self.storage.load(LAST_BOARD_KEY).await {
            Ok(record) => {
                self.current_board_id = Some(record.id.clone());
                self.dirty = false;
                self.last_save = Some(Instant::now());
                Some(record)
            }
            Err(e) => {
                log::debug!("No last board: {}", e);
                None
            }
        }
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await
    }

    /// Saved board ids, without the last-board mirror.
    pub async fn list_boards(&self) -> StorageResult<Vec<String>> {
        let mut ids = self.storage.list().await?;
        ids.retain(|id| id != LAST_BOARD_KEY);
        Ok(ids)
    }

    pub async fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.exists(id).await
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// File storage in the default per-user location.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

/// Auto-save manager over [`create_default_storage`].
#[cfg(not(target_arch = "wasm32"))]
pub fn create_autosave_manager() -> StorageResult<AutoSaveManager<crate::storage::FileStorage>> {
    Ok(AutoSaveManager::new(create_default_storage()?))
}
