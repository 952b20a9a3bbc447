//! In-memory pending-status store, one entry per user.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use engine::chat::StatusStore;
use engine::{PendingStatus, ResultEngine};

/// A process-local [`StatusStore`]. Statuses do not survive a restart,
/// which resets every conversation to [`PendingStatus::Idle`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStatusStore {
    inner: Arc<Mutex<HashMap<i64, PendingStatus>>>,
}

impl MemoryStatusStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusStore for MemoryStatusStore {
    async fn get(&self, user_id: i64) -> ResultEngine<PendingStatus> {
        Ok(self
            .inner
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set(&self, user_id: i64, status: PendingStatus) -> ResultEngine<()> {
        self.inner.lock().await.insert(user_id, status);
        Ok(())
    }

    async fn clear(&self, user_id: i64) -> ResultEngine<()> {
        self.inner.lock().await.remove(&user_id);
        Ok(())
    }
}
