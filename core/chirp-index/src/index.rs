//! The on-disk search index for one location.

use crate::error::{IndexError, IndexResult};
use crate::query::SearchQuery;
use chirp_types::{ContentId, ContentRecord, IndexDocument, PageRequest};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// File name of the index database inside its location directory.
pub const INDEX_FILE: &str = "index.sqlite3";

/// Version of the index schema written by this crate.
pub const SCHEMA_VERSION: i64 = 1;

/// How long a writer or reader waits on another process's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS index_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS documents (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        doc_id TEXT NOT NULL UNIQUE
    );

    CREATE VIRTUAL TABLE IF NOT EXISTS postings USING fts5(
        body,
        tokenize = 'porter unicode61'
    );
";

/// Identifiers for one page of ranked matches, plus the number of matches
/// across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryHits {
    /// Best match first.
    pub ids: Vec<ContentId>,
    /// Number of documents matching the query.
    pub total: usize,
    /// The page these ids belong to.
    pub request: PageRequest,
}

impl QueryHits {
    fn empty(request: PageRequest) -> Self {
        Self {
            ids: Vec::new(),
            total: 0,
            request,
        }
    }
}

/// A full-text index over content bodies, stored in one directory.
///
/// The handle owns the index's single writer connection. Share it behind
/// an `Arc` (see [`IndexRegistry`](crate::IndexRegistry)) rather than
/// opening the same location twice in one process.
pub struct SearchIndex {
    location: PathBuf,
    db_path: PathBuf,
    writer: Mutex<Connection>,
}

impl SearchIndex {
    /// Opens the index at `location`, creating the directory and schema if
    /// they do not exist yet.
    ///
    /// Existing documents are always kept.
    pub fn ensure(location: impl AsRef<Path>) -> IndexResult<Self> {
        let location = location.as_ref().to_path_buf();
        std::fs::create_dir_all(&location).map_err(|e| {
            IndexError::Unavailable(format!(
                "failed to create index directory {}: {e}",
                location.display()
            ))
        })?;

        let db_path = location.join(INDEX_FILE);
        let fresh = !db_path.exists();

        let mut conn = Connection::open(&db_path).map_err(|e| {
            IndexError::Unavailable(format!("failed to open index {}: {e}", db_path.display()))
        })?;
        init_connection(&conn)?;
        // WAL lets readers keep their snapshot while a writer commits.
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))
            .map_err(|e| IndexError::Unavailable(format!("failed to enable WAL: {e}")))?;
        init_schema(&mut conn)?;

        if fresh {
            info!(location = %location.display(), "Created search index");
        } else {
            debug!(location = %location.display(), "Opened existing search index");
        }

        Ok(Self {
            location,
            db_path,
            writer: Mutex::new(conn),
        })
    }

    /// True when `location` already holds an index file.
    pub fn exists(location: impl AsRef<Path>) -> bool {
        location.as_ref().join(INDEX_FILE).is_file()
    }

    /// The directory this index lives in.
    pub fn location(&self) -> &Path {
        &self.location
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Indexes a content record, replacing any document with the same id.
    pub fn add(&self, record: &ContentRecord) -> IndexResult<()> {
        self.add_document(&record.to_document())
    }

    /// Inserts or replaces a document.
    pub fn add_document(&self, doc: &IndexDocument) -> IndexResult<()> {
        let doc_id = doc.id.to_string();
        let replaced = self.write("add", |tx| {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT seq FROM documents WHERE doc_id = ?1",
                    params![doc_id],
                    |row| row.get(0),
                )
                .optional()?;

            match existing {
                Some(seq) => {
                    tx.execute(
                        "UPDATE postings SET body = ?2 WHERE rowid = ?1",
                        params![seq, doc.body],
                    )?;
                }
                None => {
                    tx.execute("INSERT INTO documents (doc_id) VALUES (?1)", params![doc_id])?;
                    let seq = tx.last_insert_rowid();
                    tx.execute(
                        "INSERT INTO postings (rowid, body) VALUES (?1, ?2)",
                        params![seq, doc.body],
                    )?;
                }
            }
            Ok(existing.is_some())
        })?;

        info!(
            doc_id = %doc.id,
            replaced,
            location = %self.location.display(),
            "Indexed document"
        );
        Ok(())
    }

    /// Removes the document for a content record.
    ///
    /// Returns `false` if the index held no such document, which is not an
    /// error.
    pub fn remove(&self, record: &ContentRecord) -> IndexResult<bool> {
        self.remove_id(record.id)
    }

    /// Removes the document with the given id, if present.
    pub fn remove_id(&self, id: ContentId) -> IndexResult<bool> {
        let doc_id = id.to_string();
        let removed = self.write("remove", |tx| {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT seq FROM documents WHERE doc_id = ?1",
                    params![doc_id],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(seq) = existing {
                tx.execute("DELETE FROM postings WHERE rowid = ?1", params![seq])?;
                tx.execute("DELETE FROM documents WHERE seq = ?1", params![seq])?;
            }
            Ok(existing.is_some())
        })?;

        if removed {
            info!(doc_id = %id, location = %self.location.display(), "Removed document from index");
        } else {
            debug!(doc_id = %id, "Remove skipped, document not indexed");
        }
        Ok(removed)
    }

    /// Runs `op` inside an `IMMEDIATE` transaction on the writer connection.
    ///
    /// The mutex guard and the transaction are both scoped to this call.
    /// An early return drops the transaction, which rolls it back.
    fn write<T>(
        &self,
        op: &str,
        f: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
    ) -> IndexResult<T> {
        // A panic inside `f` poisons the mutex, but the transaction was
        // rolled back while unwinding, so the connection is still clean.
        let mut conn = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| IndexError::Unavailable(format!("failed to lock index for {op}: {e}")))?;
        let value = f(&tx).map_err(|e| IndexError::WriteFailed(format!("{op}: {e}")))?;
        tx.commit()
            .map_err(|e| IndexError::WriteFailed(format!("{op}: commit failed: {e}")))?;
        Ok(value)
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Runs a free-text query and returns one page of matching ids.
    ///
    /// Ids are ordered by relevance (best first); ties keep the order in
    /// which documents were first indexed. `page` is 1-indexed and pages
    /// past the end are empty.
    pub fn query(&self, text: &str, page: u32, page_size: u32) -> IndexResult<QueryHits> {
        let request = PageRequest::new(page, page_size)?;
        self.query_page(text, request)
    }

    /// Same as [`query`](Self::query) with a pre-validated page request.
    pub fn query_page(&self, text: &str, request: PageRequest) -> IndexResult<QueryHits> {
        let parsed = SearchQuery::parse(text)?;
        let Some(expr) = parsed.to_fts5() else {
            debug!(query = text, "Empty query, nothing to match");
            return Ok(QueryHits::empty(request));
        };

        let mut conn = self.open_reader()?;
        // One read transaction so the count and the slice see the same snapshot.
        let tx = conn
            .transaction()
            .map_err(|e| IndexError::Unavailable(format!("failed to begin read: {e}")))?;

        let total: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM postings WHERE postings MATCH ?1",
                params![expr],
                |row| row.get(0),
            )
            .map_err(|e| match_error("failed to count matches", e))?;

        let range = request.range(total as usize);
        let ids = if range.is_empty() {
            Vec::new()
        } else {
            let mut stmt = tx
                .prepare(
                    "SELECT d.doc_id
                     FROM postings
                     JOIN documents d ON d.seq = postings.rowid
                     WHERE postings MATCH ?1
                     ORDER BY bm25(postings), d.seq
                     LIMIT ?2 OFFSET ?3",
                )
                .map_err(|e| match_error("failed to prepare query", e))?;

            let rows = stmt
                .query_map(
                    params![expr, range.len() as i64, range.start as i64],
                    |row| row.get::<_, String>(0),
                )
                .map_err(|e| match_error("failed to run query", e))?;

            let mut ids = Vec::with_capacity(range.len());
            for row in rows {
                let doc_id =
                    row.map_err(|e| match_error("failed to read match", e))?;
                let id = ContentId::parse(&doc_id).map_err(|e| {
                    IndexError::Unavailable(format!("corrupt document id {doc_id:?}: {e}"))
                })?;
                ids.push(id);
            }
            ids
        };

        debug!(
            query = text,
            total,
            page = request.page(),
            returned = ids.len(),
            "Search query"
        );

        Ok(QueryHits {
            ids,
            total: total as usize,
            request,
        })
    }

    /// Number of documents in the index.
    pub fn len(&self) -> IndexResult<usize> {
        let conn = self.open_reader()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(|e| IndexError::Unavailable(format!("failed to count documents: {e}")))?;
        Ok(count as usize)
    }

    /// True when the index holds no documents.
    pub fn is_empty(&self) -> IndexResult<bool> {
        Ok(self.len()? == 0)
    }

    /// True when a document with this id is indexed.
    pub fn contains(&self, id: ContentId) -> IndexResult<bool> {
        let conn = self.open_reader()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT seq FROM documents WHERE doc_id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| IndexError::Unavailable(format!("failed to look up document: {e}")))?;
        Ok(found.is_some())
    }

    /// Opens a fresh connection for a read. Never creates the file.
    fn open_reader(&self) -> IndexResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            IndexError::Unavailable(format!("failed to open index {}: {e}", self.db_path.display()))
        })?;
        init_connection(&conn)?;
        Ok(conn)
    }
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

fn init_connection(conn: &Connection) -> IndexResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| IndexError::Unavailable(format!("failed to set busy timeout: {e}")))
}

fn init_schema(conn: &mut Connection) -> IndexResult<()> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| IndexError::Unavailable(format!("failed to lock index for init: {e}")))?;

    tx.execute_batch(SCHEMA)
        .map_err(|e| IndexError::Unavailable(format!("failed to init index schema: {e}")))?;
    tx.execute(
        "INSERT OR IGNORE INTO index_meta (key, value) VALUES ('schema_version', ?1)",
        params![SCHEMA_VERSION.to_string()],
    )
    .map_err(|e| IndexError::Unavailable(format!("failed to record schema version: {e}")))?;

    let stored: String = tx
        .query_row(
            "SELECT value FROM index_meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .map_err(|e| IndexError::Unavailable(format!("failed to read schema version: {e}")))?;
    if stored != SCHEMA_VERSION.to_string() {
        return Err(IndexError::Unavailable(format!(
            "index schema version {stored} is not supported (expected {SCHEMA_VERSION})"
        )));
    }

    tx.commit()
        .map_err(|e| IndexError::Unavailable(format!("failed to init index schema: {e}")))
}

/// FTS5 reports expressions it cannot evaluate with an `fts5:` message.
/// Those are query errors; anything else means the index is unusable.
fn match_error(context: &str, e: rusqlite::Error) -> IndexError {
    let message = e.to_string();
    if message.starts_with("fts5:") {
        IndexError::InvalidQuery(message)
    } else {
        IndexError::Unavailable(format!("{context}: {e}"))
    }
}
