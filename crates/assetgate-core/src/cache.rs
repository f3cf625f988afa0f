//! Persistent asset cache (SQLite via sqlx).
//!
//! Path-keyed store of (body, content-type) pairs, namespaced under a fixed
//! version tag so incompatible schema changes can be rotated out by bumping
//! the tag instead of manual cleanup. Writes are last-write-wins upserts; no
//! TTL, entries live until overwritten or purged.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::time::{SystemTime, UNIX_EPOCH};

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "v1";

/// One cached asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Handle to the SQLite-backed asset cache.
///
/// The database file lives under the XDG state directory:
/// `~/.local/state/assetgate/assets.db`.
#[derive(Clone)]
pub struct AssetCache {
    pool: Pool<Sqlite>,
    namespace: String,
}

impl AssetCache {
    /// Open (or create) the default cache database under `namespace` and run
    /// migrations.
    pub async fn open_default(namespace: &str) -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("assetgate")?;
        let state_dir = xdg_dirs.get_state_home();
        let db_path = state_dir.join("assets.db");

        tokio::fs::create_dir_all(&state_dir).await?;

        let uri = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await?;

        let cache = AssetCache {
            pool,
            namespace: namespace.to_string(),
        };
        cache.migrate().await?;
        Ok(cache)
    }

    /// Open an in-memory cache (no disk I/O). Used by tests and throwaway
    /// gateways; a single connection so the pool cannot hand back a
    /// different empty database.
    pub async fn open_memory(namespace: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let cache = AssetCache {
            pool,
            namespace: namespace.to_string(),
        };
        cache.migrate().await?;
        Ok(cache)
    }

    async fn migrate(&self) -> Result<()> {
        // Composite key (namespace, path): one row per asset per namespace.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS assets (
                namespace TEXT NOT NULL,
                path TEXT NOT NULL,
                body BLOB NOT NULL,
                content_type TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (namespace, path)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Namespace this handle reads and writes under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Look up the entry for `path`, or `None` if never written.
    pub async fn get(&self, path: &str) -> Result<Option<CacheEntry>> {
        let row = sqlx::query(
            r#"
            SELECT body, content_type
            FROM assets
            WHERE namespace = ?1 AND path = ?2
            "#,
        )
        .bind(&self.namespace)
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| CacheEntry {
            body: row.get("body"),
            content_type: row.get("content_type"),
        }))
    }

    /// Insert or overwrite the entry for `path`. Idempotent, last-write-wins.
    pub async fn put(&self, path: &str, entry: &CacheEntry) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            INSERT INTO assets (namespace, path, body, content_type, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (namespace, path) DO UPDATE SET
                body = excluded.body,
                content_type = excluded.content_type,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.namespace)
        .bind(path)
        .bind(&entry.body)
        .bind(&entry.content_type)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All paths currently cached in this namespace, newest first. Used by
    /// the CLI listing.
    pub async fn list_paths(&self) -> Result<Vec<(String, String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT path, content_type, length(body) AS size
            FROM assets
            WHERE namespace = ?1
            ORDER BY updated_at DESC, path
            "#,
        )
        .bind(&self.namespace)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push((row.get("path"), row.get("content_type"), row.get("size")));
        }
        Ok(out)
    }

    /// Remove every entry in this namespace. Returns how many were deleted.
    pub async fn purge(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM assets
            WHERE namespace = ?1
            "#,
        )
        .bind(&self.namespace)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
