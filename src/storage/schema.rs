//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Gallery-Harvest database.
//! Upgrading older layouts is out of scope; the bootstrap only creates what is missing.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per submission link; metadata columns stay NULL until fetched
CREATE TABLE IF NOT EXISTS submissions (
    url TEXT NOT NULL UNIQUE,
    id TEXT,
    title TEXT,
    "desc" TEXT,
    tags TEXT,
    is_scraps INTEGER NOT NULL DEFAULT 0,
    date_uploaded TEXT,
    content_url TEXT,
    content_name TEXT,
    is_content_saved INTEGER NOT NULL DEFAULT 0,
    content_missing INTEGER NOT NULL DEFAULT 0,
    moved_content INTEGER NOT NULL DEFAULT 0,
    username TEXT,
    account_name TEXT,
    pretty_username TEXT,
    thumbnail_url TEXT,
    thumbnail_name TEXT,
    is_thumbnail_saved INTEGER NOT NULL DEFAULT 0,
    thumbnail_missing INTEGER NOT NULL DEFAULT 0,
    rating TEXT,
    category TEXT,
    owner_username TEXT,
    discovered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_submissions_id ON submissions(id);
CREATE INDEX IF NOT EXISTS idx_submissions_username ON submissions(username);

-- Comment threads, keyed by the site's comment anchor id
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    submission_id TEXT NOT NULL,
    width TEXT,
    username TEXT NOT NULL,
    account_name TEXT NOT NULL,
    "desc" TEXT NOT NULL,
    subtitle TEXT NOT NULL,
    date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_submission ON comments(submission_id);

-- Favorites of a user; id is username followed by url
CREATE TABLE IF NOT EXISTS favorites (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    url TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_favorites_username ON favorites(username);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
