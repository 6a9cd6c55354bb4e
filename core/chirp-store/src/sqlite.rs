//! SQLite-backed store.
//!
//! Mirrors the application's relational layout: `users`, `posts` and a
//! `followers` association table keyed on both user ids.

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentStore, GraphStore, User};
use chirp_types::{ContentId, ContentRecord, Timestamp, UserId};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Upper bound on bound parameters per `IN (...)` list.
const AUTHOR_CHUNK: usize = 500;

/// Persistent [`ContentStore`] and [`GraphStore`] backed by SQLite.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.lock();
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                body TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                user_id INTEGER NOT NULL REFERENCES users(id)
            );

            CREATE INDEX IF NOT EXISTS ix_posts_user_id ON posts(user_id);
            CREATE INDEX IF NOT EXISTS ix_posts_timestamp ON posts(timestamp);

            CREATE TABLE IF NOT EXISTS followers (
                follower_id INTEGER NOT NULL REFERENCES users(id),
                followed_id INTEGER NOT NULL REFERENCES users(id),
                PRIMARY KEY (follower_id, followed_id)
            );

            CREATE INDEX IF NOT EXISTS ix_followers_followed ON followers(followed_id);
            ",
        )?;
        Ok(())
    }

    // ── Users ────────────────────────────────────────────────────

    /// Registers a user. Fails with `Conflict` if the name is taken.
    pub fn create_user(&self, username: &str) -> StoreResult<User> {
        let conn = self.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (username) VALUES (?1)",
            params![username],
        )?;
        if inserted == 0 {
            return Err(StoreError::Conflict(format!("username {username:?} is taken")));
        }
        Ok(User {
            id: UserId::new(conn.last_insert_rowid()),
            username: username.to_string(),
        })
    }

    /// Looks up a user by id.
    pub fn user(&self, id: UserId) -> StoreResult<User> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id, username FROM users WHERE id = ?1",
            params![id.get()],
            |row| {
                Ok(User {
                    id: UserId::new(row.get(0)?),
                    username: row.get(1)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    /// Inserts a fully formed record, keeping its id and timestamp.
    pub fn insert_record(&self, record: &ContentRecord) -> StoreResult<()> {
        let conn = self.lock();
        require_user(&conn, record.author)?;
        conn.execute(
            "INSERT OR REPLACE INTO posts (id, body, timestamp, user_id) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id.get(),
                record.body,
                record.created_at.as_millis(),
                record.author.get()
            ],
        )?;
        Ok(())
    }
}

fn require_user(conn: &Connection, id: UserId) -> StoreResult<()> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM users WHERE id = ?1", params![id.get()], |row| row.get(0))
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::NotFound(format!("user {id}"))),
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ContentRecord> {
    Ok(ContentRecord {
        id: ContentId::new(row.get(0)?),
        body: row.get(1)?,
        created_at: Timestamp::from_millis(row.get(2)?),
        author: UserId::new(row.get(3)?),
    })
}

impl ContentStore for SqliteStore {
    fn get_record(&self, id: ContentId) -> StoreResult<ContentRecord> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id, body, timestamp, user_id FROM posts WHERE id = ?1",
            params![id.get()],
            record_from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("content {id}")))
    }

    fn list_by_authors(&self, authors: &BTreeSet<UserId>) -> StoreResult<Vec<ContentRecord>> {
        let conn = self.lock();
        let authors: Vec<i64> = authors.iter().map(UserId::get).collect();
        let mut records = Vec::new();

        for chunk in authors.chunks(AUTHOR_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT id, body, timestamp, user_id FROM posts WHERE user_id IN ({placeholders})"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), record_from_row)?;
            for row in rows {
                records.push(row?);
            }
        }
        Ok(records)
    }

    fn create_record(&self, author: UserId, body: &str) -> StoreResult<ContentRecord> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        require_user(&tx, author)?;

        let last: Option<i64> = tx.query_row("SELECT MAX(timestamp) FROM posts", [], |row| row.get(0))?;
        let created_at = match last {
            Some(millis) => Timestamp::from_millis(millis).tick(),
            None => Timestamp::now(),
        };

        tx.execute(
            "INSERT INTO posts (body, timestamp, user_id) VALUES (?1, ?2, ?3)",
            params![body, created_at.as_millis(), author.get()],
        )?;
        let id = ContentId::new(tx.last_insert_rowid());
        tx.commit()?;

        debug!(content_id = %id, author = %author, "Created record");
        Ok(ContentRecord::new(id, author, body, created_at))
    }

    fn delete_record(&self, id: ContentId) -> StoreResult<ContentRecord> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let record = tx
            .query_row(
                "SELECT id, body, timestamp, user_id FROM posts WHERE id = ?1",
                params![id.get()],
                record_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("content {id}")))?;
        tx.execute("DELETE FROM posts WHERE id = ?1", params![id.get()])?;
        tx.commit()?;
        Ok(record)
    }
}

impl GraphStore for SqliteStore {
    fn add_edge(&self, follower: UserId, followee: UserId) -> StoreResult<bool> {
        let conn = self.lock();
        require_user(&conn, follower)?;
        require_user(&conn, followee)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO followers (follower_id, followed_id) VALUES (?1, ?2)",
            params![follower.get(), followee.get()],
        )?;
        Ok(inserted > 0)
    }

    fn remove_edge(&self, follower: UserId, followee: UserId) -> StoreResult<bool> {
        let conn = self.lock();
        require_user(&conn, follower)?;
        require_user(&conn, followee)?;
        let removed = conn.execute(
            "DELETE FROM followers WHERE follower_id = ?1 AND followed_id = ?2",
            params![follower.get(), followee.get()],
        )?;
        Ok(removed > 0)
    }

    fn followees_of(&self, user: UserId) -> StoreResult<BTreeSet<UserId>> {
        let conn = self.lock();
        require_user(&conn, user)?;
        let mut stmt = conn.prepare("SELECT followed_id FROM followers WHERE follower_id = ?1")?;
        let rows = stmt.query_map(params![user.get()], |row| row.get::<_, i64>(0))?;
        let mut followees = BTreeSet::new();
        for row in rows {
            followees.insert(UserId::new(row?));
        }
        Ok(followees)
    }

    fn followers_of(&self, user: UserId) -> StoreResult<BTreeSet<UserId>> {
        let conn = self.lock();
        require_user(&conn, user)?;
        let mut stmt = conn.prepare("SELECT follower_id FROM followers WHERE followed_id = ?1")?;
        let rows = stmt.query_map(params![user.get()], |row| row.get::<_, i64>(0))?;
        let mut followers = BTreeSet::new();
        for row in rows {
            followers.insert(UserId::new(row?));
        }
        Ok(followers)
    }

    fn has_edge(&self, follower: UserId, followee: UserId) -> StoreResult<bool> {
        let conn = self.lock();
        require_user(&conn, follower)?;
        require_user(&conn, followee)?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM followers WHERE follower_id = ?1 AND followed_id = ?2",
                params![follower.get(), followee.get()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}
