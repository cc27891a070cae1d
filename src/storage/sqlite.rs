//! SQLite-backed post store.
//!
//! Each concurrent page task opens its own `PostStore`, meaning its own
//! connection and its own transactional scope, so a rollback in one
//! task cannot touch another task's in-flight transaction. WAL journal
//! mode plus a busy timeout let those writers coexist on one file.

use std::path::Path;

use rusqlite::{Connection, params};

use crate::error::Result;
use crate::models::Post;
use crate::storage::BatchOutcome;

/// One connection to the posts database.
pub struct PostStore {
    conn: Connection,
}

/// Aggregate figures over the stored posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Total stored posts
    pub total: usize,
    /// Distinct school names among them
    pub schools: usize,
    /// Earliest post date (ISO), if any post carries one
    pub first_post: Option<String>,
    /// Latest post date (ISO), if any post carries one
    pub last_post: Option<String>,
}

impl PostStore {
    /// Open (and if needed create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS posts (
                id            INTEGER PRIMARY KEY CHECK (id > 0),
                school        TEXT,
                program       TEXT,
                decision      TEXT,
                medium        TEXT,
                decision_date TEXT,
                status        TEXT,
                post_date     TEXT,
                comment       TEXT,
                gpa           REAL,
                gre_verbal    REAL,
                gre_quant     REAL,
                gre_writing   REAL,
                gre_subject   TEXT,
                created_at    TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_posts_school ON posts(school);",
        )?;
        Ok(())
    }

    /// Whether a post with this id is already stored.
    pub fn exists(&self, id: i64) -> Result<bool> {
        let mut stmt = self.conn.prepare("SELECT 1 FROM posts WHERE id = ?1")?;
        Ok(stmt.exists(params![id])?)
    }

    /// Persist one page's batch.
    ///
    /// Posts already present count as duplicates and are never touched
    /// again. The remaining posts are committed in a single transaction;
    /// if that fails the whole transaction rolls back and each post is
    /// retried in its own transaction, so one poisoned record costs only
    /// itself. Individual drops are logged with the post id and never
    /// retried further.
    pub fn persist_batch(&mut self, batch: &[Post]) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        let mut fresh: Vec<&Post> = Vec::new();

        for post in batch {
            if self.exists(post.id)? {
                outcome.duplicates += 1;
            } else {
                fresh.push(post);
            }
        }

        if fresh.is_empty() {
            return Ok(outcome);
        }

        match self.insert_all(&fresh) {
            Ok(()) => outcome.inserted = fresh.len(),
            Err(e) => {
                log::warn!(
                    "Batch insert of {} posts failed, retrying record by record: {e}",
                    fresh.len()
                );
                for post in fresh {
                    match self.insert_one(post) {
                        Ok(()) => outcome.inserted += 1,
                        Err(e) => {
                            outcome.dropped += 1;
                            log::error!("Dropping post {}: {e}", post.id);
                        }
                    }
                }
            }
        }

        Ok(outcome)
    }

    fn insert_all(&mut self, posts: &[&Post]) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        for post in posts {
            Self::insert(&tx, post)?;
        }
        tx.commit()
    }

    fn insert_one(&mut self, post: &Post) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        Self::insert(&tx, post)?;
        tx.commit()
    }

    fn insert(conn: &Connection, post: &Post) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO posts (id, school, program, decision, medium, decision_date,
                                status, post_date, comment, gpa, gre_verbal, gre_quant,
                                gre_writing, gre_subject)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                post.id,
                post.school,
                post.program,
                post.decision,
                post.medium,
                post.decision_date.map(|d| d.to_string()),
                post.status,
                post.post_date.map(|d| d.to_string()),
                post.comment,
                post.gpa,
                post.gre_verbal,
                post.gre_quant,
                post.gre_writing,
                post.gre_subject,
            ],
        )?;
        Ok(())
    }

    /// All stored posts, ordered by id.
    pub fn load_all(&self) -> Result<Vec<Post>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, school, program, decision, medium, decision_date, status,
                    post_date, comment, gpa, gre_verbal, gre_quant, gre_writing,
                    gre_subject
             FROM posts ORDER BY id",
        )?;
        let posts = stmt
            .query_map([], |row| {
                Ok(Post {
                    id: row.get(0)?,
                    school: row.get(1)?,
                    program: row.get(2)?,
                    decision: row.get(3)?,
                    medium: row.get(4)?,
                    decision_date: parse_iso_date(row.get(5)?),
                    status: row.get(6)?,
                    post_date: parse_iso_date(row.get(7)?),
                    comment: row.get(8)?,
                    gpa: row.get(9)?,
                    gre_verbal: row.get(10)?,
                    gre_quant: row.get(11)?,
                    gre_writing: row.get(12)?,
                    gre_subject: row.get(13)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    /// Aggregate figures for the `stats` command.
    pub fn stats(&self) -> Result<StoreStats> {
        let stats = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT school), MIN(post_date), MAX(post_date)
             FROM posts",
            [],
            |row| {
                Ok(StoreStats {
                    total: row.get(0)?,
                    schools: row.get(1)?,
                    first_post: row.get(2)?,
                    last_post: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }
}

fn parse_iso_date(value: Option<String>) -> Option<chrono::NaiveDate> {
    value.and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_post(id: i64) -> Post {
        let mut post = Post::new(id);
        post.school = Some("Carnegie Mellon University (CMU)".to_string());
        post.program = Some("Operation Management, PhD (F21)".to_string());
        post.decision = Some("Interview".to_string());
        post.medium = Some("E-mail".to_string());
        post.decision_date = NaiveDate::from_ymd_opt(2021, 2, 12);
        post.status = Some("I".to_string());
        post.post_date = NaiveDate::from_ymd_opt(2021, 2, 26);
        post.gpa = Some(3.06);
        post.gre_verbal = Some(153.0);
        post
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let mut store = PostStore::open_in_memory().unwrap();
        let post = sample_post(789986);
        let outcome = store.persist_batch(std::slice::from_ref(&post)).unwrap();
        assert_eq!(outcome.inserted, 1);

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, vec![post]);
    }

    #[test]
    fn test_reinserting_same_id_is_idempotent() {
        let mut store = PostStore::open_in_memory().unwrap();
        let first = store.persist_batch(&[sample_post(1)]).unwrap();
        assert_eq!(first.inserted, 1);

        // Same id again, different batch: counted as duplicate, stored once.
        let second = store.persist_batch(&[sample_post(1)]).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicates, 1);
        assert!(second.no_new_records());
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_ids_within_one_batch_store_once() {
        let mut store = PostStore::open_in_memory().unwrap();
        let outcome = store
            .persist_batch(&[sample_post(5), sample_post(5)])
            .unwrap();

        // The batch transaction hits the primary key and falls back;
        // one copy commits, the other is dropped.
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.dropped, 1);
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_fallback_keeps_siblings_of_a_poisoned_record() {
        let mut store = PostStore::open_in_memory().unwrap();
        // The middle post violates the id CHECK, failing the batch
        // transaction and then its own per-record commit.
        let batch = vec![sample_post(1), sample_post(-7), sample_post(3)];
        let outcome = store.persist_batch(&batch).unwrap();

        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.dropped, 1);

        let ids: Vec<i64> = store.load_all().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_two_connections_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.sqlite");

        let mut writer = PostStore::open(&path).unwrap();
        writer.persist_batch(&[sample_post(11)]).unwrap();

        // A second task's connection sees the commit.
        let reader = PostStore::open(&path).unwrap();
        assert!(reader.exists(11).unwrap());
        assert!(!reader.exists(12).unwrap());
    }

    #[test]
    fn test_stats() {
        let mut store = PostStore::open_in_memory().unwrap();
        let mut other = sample_post(2);
        other.school = Some("MIT".to_string());
        other.post_date = NaiveDate::from_ymd_opt(2021, 3, 1);
        store.persist_batch(&[sample_post(1), other]).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.schools, 2);
        assert_eq!(stats.first_post.as_deref(), Some("2021-02-26"));
        assert_eq!(stats.last_post.as_deref(), Some("2021-03-01"));
    }
}
