//! `SQLite` backend: schema, pragmas, and migrations for the dashboard store.

use crate::model::types::Dashboard;
use crate::search::query::{BuiltQuery, SearchHit};
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const MIGRATION_V1: &str = r"
CREATE TABLE IF NOT EXISTS dashboards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uid TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    folder TEXT,
    views INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS dashboard_tags (
    dashboard_id INTEGER NOT NULL REFERENCES dashboards(id) ON DELETE CASCADE,
    term TEXT NOT NULL,
    PRIMARY KEY (dashboard_id, term)
);

CREATE INDEX IF NOT EXISTS idx_dashboards_title ON dashboards(title COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_dashboard_tags_term ON dashboard_tags(term);
";

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating db directory {}", parent.display()))?;
        }

        let mut conn = Connection::open(path)
            .with_context(|| format!("opening sqlite db at {}", path.display()))?;

        apply_pragmas(&conn)?;
        init_meta(&conn)?;
        migrate(&mut conn)?;

        Ok(Self { conn })
    }

    /// In-memory store, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_meta(&conn)?;
        migrate(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn raw(&self) -> &Connection {
        &self.conn
    }

    pub fn schema_version(&self) -> Result<i64> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let value = value.ok_or_else(|| anyhow!("schema_version missing from meta"))?;
        value
            .parse()
            .with_context(|| format!("parsing schema_version `{value}`"))
    }

    /// Insert a dashboard, or update the existing one with the same uid.
    /// Tags are replaced wholesale. Returns the row id.
    pub fn insert_dashboard(&mut self, dashboard: &Dashboard) -> Result<i64> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO dashboards(uid, title, folder, views, created_at, updated_at)
             VALUES(?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(uid) DO UPDATE SET
                title = excluded.title,
                folder = excluded.folder,
                views = excluded.views,
                updated_at = excluded.updated_at",
            params![
                dashboard.uid,
                dashboard.title,
                dashboard.folder,
                dashboard.views,
                dashboard.created_at,
                dashboard.updated_at,
            ],
        )?;
        let id: i64 = tx.query_row(
            "SELECT id FROM dashboards WHERE uid = ?1",
            params![dashboard.uid],
            |row| row.get(0),
        )?;

        tx.execute(
            "DELETE FROM dashboard_tags WHERE dashboard_id = ?1",
            params![id],
        )?;
        for tag in &dashboard.tags {
            tx.execute(
                "INSERT OR IGNORE INTO dashboard_tags(dashboard_id, term) VALUES(?1, ?2)",
                params![id, tag],
            )?;
        }
        tx.commit()?;
        Ok(id)
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM dashboards", [], |row| row.get(0))?)
    }

    /// Run a query produced by [`crate::search::query::build_sql`].
    pub fn search(&self, built: &BuiltQuery) -> Result<Vec<SearchHit>> {
        let mut stmt = self
            .conn
            .prepare(&built.sql)
            .context("preparing search statement")?;
        let rows = stmt.query_map(rusqlite::params_from_iter(built.params.iter()), |row| {
            Ok(SearchHit {
                id: row.get(0)?,
                uid: row.get(1)?,
                title: row.get(2)?,
                folder: row.get(3)?,
                tags: Vec::new(),
                sort_meta: row.get(4)?,
                sort_meta_name: built.meta_name.clone(),
            })
        })?;

        let mut hits = Vec::new();
        for row in rows {
            hits.push(row?);
        }
        for hit in &mut hits {
            hit.tags = self.tags_for(hit.id)?;
        }
        Ok(hits)
    }

    /// Tags of one dashboard, sorted.
    pub fn tags_for(&self, dashboard_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT term FROM dashboard_tags WHERE dashboard_id = ?1 ORDER BY term",
        )?;
        let rows = stmt.query_map(params![dashboard_id], |row| row.get::<_, String>(0))?;
        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }
}

fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch(
        r"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA temp_store = MEMORY;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

fn init_meta(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES('schema_version', '0')",
        [],
    )?;
    Ok(())
}

fn migrate(conn: &mut Connection) -> Result<()> {
    let current: i64 = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get::<_, String>(0).map(|s| s.parse().unwrap_or(0)),
        )
        .optional()?
        .unwrap_or(0);

    if current == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }
    if current > CURRENT_SCHEMA_VERSION {
        return Err(anyhow!(
            "database schema version {current} is newer than supported version {CURRENT_SCHEMA_VERSION}"
        ));
    }

    let tx = conn.transaction()?;
    if current < 1 {
        tx.execute_batch(MIGRATION_V1)?;
    }
    tx.execute(
        "UPDATE meta SET value = ?1 WHERE key = 'schema_version'",
        params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    tx.commit()?;

    info!(from = current, to = CURRENT_SCHEMA_VERSION, "migrated dashboard schema");
    Ok(())
}
