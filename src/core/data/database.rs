//! SQLite storage for the song catalog
//!
//! Every statement runs under a `Deadline`: a progress handler interrupts the
//! statement once the deadline passes, so a slow query is aborted rather than
//! left running after its caller has given up.

use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

use crate::core::deadline::Deadline;
use crate::core::filter::{Predicate, SongFilter, TextField};
use crate::core::models::{Song, SongDraft, SongId, SongUpdate};
use crate::core::pagination::Page;
use crate::error::{DatabaseError, Result};

const CURRENT_DB_VERSION: u32 = 1;

/// Number of SQLite VM instructions between deadline checks.
const PROGRESS_CHECK_INTERVAL: i32 = 1_000;

const SONG_COLUMNS: &str = "id, group_name, song, release_date, text, link";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        info!("Opening database at: {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DatabaseError::Migration(format!("cannot create {}: {}", parent.display(), e)))?;
        }

        let conn = Connection::open(db_path).map_err(DatabaseError::Connection)?;

        // WAL lets readers proceed while a write is in flight
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Self::prepare(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::Connection)?;
        Self::prepare(conn)
    }

    fn prepare(mut conn: Connection) -> Result<Self> {
        let existing_user_version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if existing_user_version < CURRENT_DB_VERSION {
            Self::upgrade_database(&mut conn, existing_user_version)?;
        }

        Ok(Database { conn })
    }

    fn upgrade_database(conn: &mut Connection, existing_version: u32) -> Result<()> {
        debug!("Upgrading database from version {} to {}", existing_version, CURRENT_DB_VERSION);

        if existing_version == 0 {
            let tx = conn.transaction().map_err(DatabaseError::Transaction)?;

            tx.pragma_update(None, "user_version", CURRENT_DB_VERSION)?;

            // AUTOINCREMENT keeps ids of deleted songs from being handed out again
            tx.execute_batch(r#"
                CREATE TABLE songs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    group_name TEXT NOT NULL CHECK (group_name <> ''),
                    group_name_lower TEXT NOT NULL,
                    song TEXT NOT NULL CHECK (song <> ''),
                    song_lower TEXT NOT NULL,
                    release_date TEXT,
                    text TEXT,
                    text_lower TEXT,
                    link TEXT,
                    link_lower TEXT
                );

                CREATE INDEX idx_songs_group_song ON songs(group_name, song);
                CREATE INDEX idx_songs_release_date ON songs(release_date);
            "#)
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

            tx.commit().map_err(DatabaseError::Transaction)?;
        }

        info!("Database upgraded to version {}", CURRENT_DB_VERSION);
        Ok(())
    }

    pub fn schema_version(&self) -> Result<u32> {
        let version = self.conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    pub fn query_songs(&mut self, filter: &SongFilter, page: Page, deadline: Deadline) -> Result<Vec<Song>> {
        let (where_clause, mut values) = where_clause(filter);
        let sql = format!(
            "SELECT {} FROM songs{} ORDER BY id LIMIT ? OFFSET ?",
            SONG_COLUMNS, where_clause
        );
        values.push(Box::new(clamp_to_i64(page.limit())));
        values.push(Box::new(clamp_to_i64(page.offset())));

        self.guarded(deadline, |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let songs = stmt
                .query_map(params_from_iter(values.iter()), song_from_row)?
                .collect::<rusqlite::Result<Vec<Song>>>()?;
            Ok(songs)
        })
    }

    pub fn find_song(&mut self, id: SongId, deadline: Deadline) -> Result<Option<Song>> {
        let sql = format!("SELECT {} FROM songs WHERE id = ?1", SONG_COLUMNS);
        self.guarded(deadline, |conn| {
            conn.query_row(&sql, params![id.get()], song_from_row).optional()
        })
    }

    /// First song (lowest id) with exactly this group and title.
    pub fn find_by_group_and_title(&mut self, group: &str, title: &str, deadline: Deadline) -> Result<Option<Song>> {
        let sql = format!(
            "SELECT {} FROM songs WHERE group_name = ?1 AND song = ?2 ORDER BY id LIMIT 1",
            SONG_COLUMNS
        );
        self.guarded(deadline, |conn| {
            conn.query_row(&sql, params![group, title], song_from_row).optional()
        })
    }

    /// Insert all drafts in one transaction; either every draft is stored or none.
    pub fn insert_songs(&mut self, drafts: &[SongDraft], deadline: Deadline) -> Result<Vec<Song>> {
        self.guarded(deadline, |conn| {
            let tx = conn.transaction()?;
            let mut songs = Vec::with_capacity(drafts.len());
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO songs (group_name, group_name_lower, song, song_lower) VALUES (?1, ?2, ?3, ?4)",
                )?;
                for draft in drafts {
                    stmt.execute(params![
                        draft.group,
                        draft.group.to_lowercase(),
                        draft.title,
                        draft.title.to_lowercase(),
                    ])?;
                    songs.push(Song {
                        id: SongId::from_row(tx.last_insert_rowid()),
                        group: draft.group.clone(),
                        title: draft.title.clone(),
                        release_date: None,
                        text: None,
                        link: None,
                    });
                }
            }
            tx.commit()?;
            Ok(songs)
        })
    }

    /// Apply the supplied fields of `update`. Returns the number of rows changed.
    pub fn update_song(&mut self, update: &SongUpdate, deadline: Deadline) -> Result<usize> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(group) = &update.group {
            assignments.push("group_name = ?, group_name_lower = ?");
            values.push(Box::new(group.clone()));
            values.push(Box::new(group.to_lowercase()));
        }
        if let Some(title) = &update.title {
            assignments.push("song = ?, song_lower = ?");
            values.push(Box::new(title.clone()));
            values.push(Box::new(title.to_lowercase()));
        }
        if let Some(date) = update.release_date {
            assignments.push("release_date = ?");
            values.push(Box::new(date));
        }
        if let Some(text) = &update.text {
            assignments.push("text = ?, text_lower = ?");
            values.push(Box::new(text.clone()));
            values.push(Box::new(text.to_lowercase()));
        }
        if let Some(link) = &update.link {
            assignments.push("link = ?, link_lower = ?");
            values.push(Box::new(link.clone()));
            values.push(Box::new(link.to_lowercase()));
        }

        if assignments.is_empty() {
            return Ok(0);
        }

        let sql = format!("UPDATE songs SET {} WHERE id = ?", assignments.join(", "));
        values.push(Box::new(update.id.get()));

        self.guarded(deadline, |conn| conn.execute(&sql, params_from_iter(values.iter())))
    }

    pub fn delete_song(&mut self, id: SongId, deadline: Deadline) -> Result<usize> {
        self.guarded(deadline, |conn| {
            conn.execute("DELETE FROM songs WHERE id = ?1", params![id.get()])
        })
    }

    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| DatabaseError::Connection(e))?;
        info!("Database connection closed");
        Ok(())
    }

    /// Run `op` with the progress handler armed for `deadline`.
    fn guarded<T>(
        &mut self,
        deadline: Deadline,
        op: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        if deadline.expired() {
            return Err(DatabaseError::Interrupted.into());
        }

        self.conn
            .progress_handler(PROGRESS_CHECK_INTERVAL, Some(move || deadline.expired()));
        let result = op(&mut self.conn);
        self.conn.progress_handler(0, None::<fn() -> bool>);

        result.map_err(|e| DatabaseError::from(e).into())
    }
}

fn song_from_row(row: &Row<'_>) -> rusqlite::Result<Song> {
    Ok(Song {
        id: SongId::from_row(row.get(0)?),
        group: row.get(1)?,
        title: row.get(2)?,
        release_date: row.get(3)?,
        text: row.get(4)?,
        link: row.get(5)?,
    })
}

fn lower_column(field: TextField) -> &'static str {
    match field {
        TextField::Group => "group_name_lower",
        TextField::Title => "song_lower",
        TextField::Lyrics => "text_lower",
        TextField::Link => "link_lower",
    }
}

/// Render the filter as ` WHERE a AND b ...` plus its bound values.
fn where_clause(filter: &SongFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut clauses = Vec::with_capacity(filter.predicates().len());
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    for predicate in filter.predicates() {
        match predicate {
            Predicate::IdEquals(id) => {
                clauses.push("id = ?".to_string());
                values.push(Box::new(id.get()));
            }
            Predicate::Contains { field, needle } => {
                clauses.push(format!("{} LIKE ? ESCAPE '\\'", lower_column(*field)));
                values.push(Box::new(format!("%{}%", escape_like(needle))));
            }
            Predicate::ReleasedBetween { start, end } => {
                clauses.push("release_date BETWEEN ? AND ?".to_string());
                values.push(Box::new(*start));
                values.push(Box::new(*end));
            }
            Predicate::ReleasedOnOrAfter(start) => {
                clauses.push("release_date >= ?".to_string());
                values.push(Box::new(*start));
            }
            Predicate::ReleasedOnOrBefore(end) => {
                clauses.push("release_date <= ?".to_string());
                values.push(Box::new(*end));
            }
        }
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

/// Escape LIKE wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
