//! Song catalog operations
//!
//! `SongCatalog` is what the HTTP layer talks to. It composes filters, slices
//! verses and bounds every storage call by the configured timeout. Failures
//! are logged here with the operation name; callers only see the error kind.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::core::deadline::Deadline;
use crate::core::filter::{FilterCriteria, SongFilter};
use crate::core::models::{Song, SongDraft, SongId, SongUpdate};
use crate::core::pagination::Page;
use crate::core::verses::verse_window;
use crate::error::{DatabaseError, Result, SongCatalogError};
use crate::services::SongStore;

pub struct SongCatalog {
    store: Arc<dyn SongStore>,
    timeout: Duration,
}

impl SongCatalog {
    pub fn new(store: Arc<dyn SongStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Songs matching every supplied criterion, windowed by `criteria.page`.
    pub async fn list_songs(&self, criteria: FilterCriteria) -> Result<Vec<Song>> {
        let filter = SongFilter::compose(&criteria);
        debug!(
            unfiltered = filter.is_empty(),
            predicates = filter.predicates().len(),
            page = ?criteria.page,
            "Listing songs"
        );

        let store = self.store.clone();
        self.bounded("list_songs", move |deadline| async move {
            store.query_songs(filter, criteria.page, deadline).await
        })
        .await
    }

    /// Verses of one song's lyrics inside `page`. A missing song or empty
    /// lyrics yield no verses.
    pub async fn get_verses(&self, id: SongId, page: Page) -> Result<Vec<String>> {
        let store = self.store.clone();
        let song = self
            .bounded("get_verses", move |deadline| async move { store.find_song(id, deadline).await })
            .await?;

        Ok(match song {
            Some(song) => verse_window(song.text.as_deref(), page),
            None => {
                debug!(%id, "No song for verse lookup");
                Vec::new()
            }
        })
    }

    pub async fn get_details(&self, group: &str, title: &str) -> Result<Option<Song>> {
        let store = self.store.clone();
        let (group, title) = (group.to_string(), title.to_string());
        self.bounded("get_details", move |deadline| async move {
            store.find_by_group_and_title(&group, &title, deadline).await
        })
        .await
    }

    /// Persist all drafts as one batch and return them with their ids.
    pub async fn create_songs(&self, drafts: Vec<SongDraft>) -> Result<Vec<Song>> {
        for (index, draft) in drafts.iter().enumerate() {
            if draft.group.trim().is_empty() || draft.title.trim().is_empty() {
                return Err(SongCatalogError::Validation(format!(
                    "song #{} needs a non-empty group and song title",
                    index + 1
                )));
            }
        }

        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let store = self.store.clone();
        self.bounded("create_songs", move |deadline| async move {
            store.insert_songs(drafts, deadline).await
        })
        .await
    }

    /// Apply the supplied fields and echo the update back.
    pub async fn update_song(&self, update: SongUpdate) -> Result<SongUpdate> {
        if !update.has_changes() {
            debug!(id = %update.id, "Update carries no fields; nothing to do");
            return Ok(update);
        }

        let store = self.store.clone();
        let submitted = update.clone();
        let changed = self
            .bounded("update_song", move |deadline| async move {
                store.update_song(&submitted, deadline).await
            })
            .await?;

        if changed == 0 {
            debug!(id = %update.id, "Update matched no song");
        }
        Ok(update)
    }

    /// Delete by id. Deleting a song that does not exist succeeds.
    pub async fn delete_song(&self, id: SongId) -> Result<SongId> {
        let store = self.store.clone();
        let removed = self
            .bounded("delete_song", move |deadline| async move { store.delete_song(id, deadline).await })
            .await?;

        if removed == 0 {
            debug!(%id, "Delete matched no song");
        }
        Ok(id)
    }

    /// Run one storage operation under the catalog timeout. The deadline is
    /// handed to the store and also enforced here, so a store that ignores it
    /// still cannot outlive it.
    async fn bounded<T, F, Fut>(&self, operation: &'static str, op: F) -> Result<T>
    where
        F: FnOnce(Deadline) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let deadline = Deadline::after(self.timeout);

        let result = match tokio::time::timeout(deadline.remaining(), op(deadline)).await {
            Ok(Err(SongCatalogError::Database(DatabaseError::Interrupted))) | Err(_) => {
                Err(SongCatalogError::Timeout { operation })
            }
            Ok(result) => result,
        };

        match &result {
            Err(e) if e.is_retryable() => {
                warn!(operation, timeout = ?self.timeout, error = %e, "Storage operation did not complete");
            }
            Err(e) => error!(operation, error = %e, "Storage operation failed"),
            Ok(_) => {}
        }
        result
    }
}
