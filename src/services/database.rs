use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::core::Database;
use crate::core::deadline::Deadline;
use crate::core::filter::SongFilter;
use crate::core::models::{Song, SongDraft, SongId, SongUpdate};
use crate::core::pagination::Page;
use crate::error::{DatabaseError, Result};

/// Storage collaborator for the catalog. Every call carries the deadline of
/// the operation it belongs to.
#[async_trait::async_trait]
pub trait SongStore: Send + Sync {
    async fn query_songs(&self, filter: SongFilter, page: Page, deadline: Deadline) -> Result<Vec<Song>>;
    async fn find_song(&self, id: SongId, deadline: Deadline) -> Result<Option<Song>>;
    async fn find_by_group_and_title(&self, group: &str, title: &str, deadline: Deadline) -> Result<Option<Song>>;
    async fn insert_songs(&self, drafts: Vec<SongDraft>, deadline: Deadline) -> Result<Vec<Song>>;
    async fn update_song(&self, update: &SongUpdate, deadline: Deadline) -> Result<usize>;
    async fn delete_song(&self, id: SongId, deadline: Deadline) -> Result<usize>;
}

/// `SongStore` over a single SQLite connection. Statements run on the
/// blocking pool, one at a time.
#[derive(Clone)]
pub struct SqliteSongStore {
    database: Arc<Mutex<Database>>,
}

impl SqliteSongStore {
    pub fn new(database: Database) -> Self {
        Self {
            database: Arc::new(Mutex::new(database)),
        }
    }

    /// Close the connection. Fails over to dropping it when another handle is
    /// still alive.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.database) {
            Ok(mutex) => {
                let database = mutex.into_inner().map_err(|_| DatabaseError::LockPoisoned)?;
                database.close()
            }
            Err(_) => {
                warn!("Database still referenced at shutdown; connection will close on drop");
                Ok(())
            }
        }
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let database = self.database.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = database.lock().map_err(|_| DatabaseError::LockPoisoned)?;
            op(&mut guard)
        })
        .await?
    }
}

#[async_trait::async_trait]
impl SongStore for SqliteSongStore {
    async fn query_songs(&self, filter: SongFilter, page: Page, deadline: Deadline) -> Result<Vec<Song>> {
        self.run(move |db| db.query_songs(&filter, page, deadline)).await
    }

    async fn find_song(&self, id: SongId, deadline: Deadline) -> Result<Option<Song>> {
        self.run(move |db| db.find_song(id, deadline)).await
    }

    async fn find_by_group_and_title(&self, group: &str, title: &str, deadline: Deadline) -> Result<Option<Song>> {
        let group = group.to_string();
        let title = title.to_string();
        self.run(move |db| db.find_by_group_and_title(&group, &title, deadline)).await
    }

    async fn insert_songs(&self, drafts: Vec<SongDraft>, deadline: Deadline) -> Result<Vec<Song>> {
        self.run(move |db| db.insert_songs(&drafts, deadline)).await
    }

    async fn update_song(&self, update: &SongUpdate, deadline: Deadline) -> Result<usize> {
        let update = update.clone();
        self.run(move |db| db.update_song(&update, deadline)).await
    }

    async fn delete_song(&self, id: SongId, deadline: Deadline) -> Result<usize> {
        self.run(move |db| db.delete_song(id, deadline)).await
    }
}
