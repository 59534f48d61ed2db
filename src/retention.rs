use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};
use crate::repository::ElectionRepository;

/// Elections unused for longer than this are removed by a sweep.
pub fn retention_window() -> Duration {
    Duration::hours(24)
}

/// Evicts stale elections. Meant to be run periodically from outside the server.
pub struct RetentionSweeper {
    repository: ElectionRepository,
}

impl RetentionSweeper {
    pub fn new(repository: ElectionRepository) -> Self {
        Self { repository }
    }

    /// Sweep relative to the current time.
    pub async fn sweep(&self) -> Result<usize> {
        self.sweep_at(Utc::now()).await
    }

    /// Delete every election last used strictly more than the retention window
    /// before `now`, releasing orphaned photos. Returns how many were deleted.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = now - retention_window();
        let stale = self.repository.unused_since(cutoff).await?;
        debug!("Found {} elections unused since {cutoff}", stale.len());

        let mut deleted = 0;
        for code in stale {
            match self.repository.delete(&code).await {
                Ok(_) => deleted += 1,
                // Deleted by someone else since we looked.
                Err(Error::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
        info!("Retention sweep removed {deleted} elections");
        Ok(deleted)
    }
}
