//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageResult, Store};
use crate::storage::{Comment, Link, StoreStats, Submission, SubmissionFields};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const LINK_COLUMNS: &str = "url, owner_username, is_scraps, id IS NOT NULL";

const SUBMISSION_COLUMNS: &str = r#"id, url, title, "desc", tags, is_scraps, date_uploaded,
    content_url, content_name, is_content_saved, content_missing, moved_content,
    username, account_name, pretty_username, thumbnail_url, thumbnail_name,
    is_thumbnail_saved, thumbnail_missing, rating, category, owner_username, discovered_at"#;

const INCOMPLETE: &str = r#"(
        username IS NULL
        OR rating IS NULL
        OR category IS NULL
        OR COALESCE(date_uploaded, '') LIKE '%ago%'
        OR id IN (SELECT submission_id FROM comments WHERE date LIKE '%ago%')
    )"#;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open or bootstrap the database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for tests and dry runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<Link> {
    Ok(Link {
        url: row.get(0)?,
        owner_username: row.get(1)?,
        is_scraps: row.get(2)?,
        fetched: row.get(3)?,
    })
}

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        desc: row.get(3)?,
        tags: row.get(4)?,
        is_scraps: row.get(5)?,
        date_uploaded: row.get(6)?,
        content_url: row.get(7)?,
        content_name: row.get(8)?,
        is_content_saved: row.get(9)?,
        content_missing: row.get(10)?,
        moved_content: row.get(11)?,
        username: row.get(12)?,
        account_name: row.get(13)?,
        pretty_username: row.get(14)?,
        thumbnail_url: row.get(15)?,
        thumbnail_name: row.get(16)?,
        is_thumbnail_saved: row.get(17)?,
        thumbnail_missing: row.get(18)?,
        rating: row.get(19)?,
        category: row.get(20)?,
        owner_username: row.get(21)?,
        discovered_at: row.get(22)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        submission_id: row.get(1)?,
        width: row.get(2)?,
        username: row.get(3)?,
        account_name: row.get(4)?,
        desc: row.get(5)?,
        subtitle: row.get(6)?,
        date: row.get(7)?,
    })
}

impl Store for SqliteStorage {
    // ===== Links =====

    fn save_links(
        &mut self,
        links: &[String],
        is_scraps: bool,
        owner: &str,
    ) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO submissions (url, owner_username, is_scraps, discovered_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for url in links {
                inserted += stmt.execute(params![url, owner, is_scraps, now])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn get_submission_links(&self) -> StorageResult<Vec<Link>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LINK_COLUMNS} FROM submissions WHERE id IS NULL ORDER BY url DESC"
        ))?;

        let links = stmt
            .query_map([], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn delete_submission(&mut self, url: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM submissions WHERE url = ?1", params![url])?;
        Ok(())
    }

    // ===== Submissions =====

    fn save_metadata(&mut self, url: &str, fields: &SubmissionFields) -> StorageResult<usize> {
        let updated = self.conn.execute(
            r#"UPDATE submissions SET
                id = ?1,
                title = ?2,
                "desc" = ?3,
                tags = ?4,
                username = ?5,
                account_name = ?6,
                pretty_username = ?7,
                content_url = ?8,
                content_name = ?9,
                thumbnail_url = ?10,
                date_uploaded = ?11,
                rating = ?12,
                category = ?13
            WHERE url = ?14"#,
            params![
                fields.id,
                fields.title,
                fields.desc,
                fields.tags,
                fields.username,
                fields.account_name,
                fields.pretty_username,
                fields.content_url,
                fields.content_name,
                fields.thumbnail_url,
                fields.date_uploaded,
                fields.rating,
                fields.category,
                url
            ],
        )?;
        Ok(updated)
    }

    fn get_submission(&self, url: &str) -> StorageResult<Option<Submission>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE url = ?1"
        ))?;

        let submission = stmt
            .query_row(params![url], submission_from_row)
            .optional()?;

        Ok(submission)
    }

    fn needs_repair(&self, owner: Option<&str>) -> StorageResult<Vec<Link>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LINK_COLUMNS} FROM submissions
             WHERE id IS NOT NULL
             AND (?1 IS NULL OR username = ?1 OR account_name = ?1)
             AND {INCOMPLETE}
             ORDER BY url DESC"
        ))?;

        let links = stmt
            .query_map(params![owner], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    // ===== Comments =====

    fn save_comments(&mut self, comments: &[Comment]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO comments
                    (id, submission_id, width, username, account_name, "desc", subtitle, date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    "desc" = excluded."desc",
                    date = excluded.date"#,
            )?;
            for c in comments {
                stmt.execute(params![
                    c.id,
                    c.submission_id,
                    c.width,
                    c.username,
                    c.account_name,
                    c.desc,
                    c.subtitle,
                    c.date
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn get_comments(&self, submission_id: &str) -> StorageResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, submission_id, width, username, account_name, "desc", subtitle, date
             FROM comments WHERE submission_id = ?1 ORDER BY rowid"#,
        )?;

        let comments = stmt
            .query_map(params![submission_id], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    // ===== Favorites =====

    fn save_favorites(&mut self, owner: &str, links: &[String]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO favorites (id, username, url) VALUES (?1, ?2, ?3)",
            )?;
            for url in links {
                let id = format!("{owner}{url}");
                inserted += stmt.execute(params![id, owner, url])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn get_favorites(&self, owner: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM favorites WHERE username = ?1 ORDER BY url")?;

        let urls = stmt
            .query_map(params![owner], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(urls)
    }

    // ===== Statistics =====

    fn stats(&self) -> StorageResult<StoreStats> {
        Ok(StoreStats {
            links: self.count("SELECT COUNT(*) FROM submissions")?,
            pending: self.count("SELECT COUNT(*) FROM submissions WHERE id IS NULL")?,
            complete: self.count(&format!(
                "SELECT COUNT(*) FROM submissions WHERE id IS NOT NULL AND NOT {INCOMPLETE}"
            ))?,
            needs_repair: self.count(&format!(
                "SELECT COUNT(*) FROM submissions WHERE id IS NOT NULL AND {INCOMPLETE}"
            ))?,
            comments: self.count("SELECT COUNT(*) FROM comments")?,
            favorites: self.count("SELECT COUNT(*) FROM favorites")?,
        })
    }
}
