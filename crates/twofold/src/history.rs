//! History sink: the narrow interface to finished-game storage.
//!
//! The real document store lives outside this server; here is only the
//! seam and an in-memory implementation. Persistence is fire-and-forget
//! with bounded retry — a committed move never fails because storage
//! hiccuped, and clients never hear about it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};

use twofold_room::GameRecord;

/// Persistence attempts per record before it is dropped.
const MAX_SAVE_ATTEMPTS: u32 = 3;

/// Errors from a history backend.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Where finished games go.
///
/// The returned futures are `Send` so stores can be driven from spawned
/// tasks and HTTP handlers; implementations just write `async fn`.
pub trait HistoryStore: Send + Sync + 'static {
    /// Persists one finished game.
    fn save(
        &self,
        record: &GameRecord,
    ) -> impl std::future::Future<Output = Result<(), HistoryError>> + Send;

    /// Lists everything persisted so far.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<GameRecord>, HistoryError>> + Send;
}

/// In-memory store: the default for development and tests.
#[derive(Default)]
pub struct MemoryHistoryStore {
    games: Mutex<Vec<GameRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    async fn save(&self, record: &GameRecord) -> Result<(), HistoryError> {
        self.games.lock().await.push(record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<GameRecord>, HistoryError> {
        Ok(self.games.lock().await.clone())
    }
}

/// Drains the rooms' history channel into the store, retrying each
/// record a bounded number of times before giving up on it.
pub(crate) async fn run_history_worker<H: HistoryStore>(
    store: Arc<H>,
    mut rx: mpsc::UnboundedReceiver<GameRecord>,
) {
    while let Some(record) = rx.recv().await {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match store.save(&record).await {
                Ok(()) => {
                    tracing::debug!(room = %record.room, "game history persisted");
                    break;
                }
                Err(e) if attempt < MAX_SAVE_ATTEMPTS => {
                    tracing::warn!(
                        room = %record.room,
                        error = %e,
                        attempt,
                        "history save failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
                }
                Err(e) => {
                    tracing::error!(
                        room = %record.room,
                        error = %e,
                        "history save failed after retries, record dropped"
                    );
                    break;
                }
            }
        }
    }
}
