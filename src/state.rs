use std::sync::Arc;
use std::time::Instant;

use crate::content::ContentIndex;
use crate::db::DatabaseProxy;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    db_proxy: Arc<DatabaseProxy>,
    content: Arc<ContentIndex>,
}

impl AppState {
    pub fn new(db_proxy: Arc<DatabaseProxy>, content: Arc<ContentIndex>) -> Self {
        Self {
            started_at: Instant::now(),
            db_proxy,
            content,
        }
    }

    pub fn db_proxy(&self) -> &DatabaseProxy {
        &self.db_proxy
    }

    pub fn content(&self) -> &ContentIndex {
        &self.content
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
