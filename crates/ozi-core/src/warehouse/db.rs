//! Connection, schema, and simple reads.

use anyhow::{bail, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

/// Tables created by `migrate`, one per record kind.
pub const TABLES: [&str; 5] = [
    "asn",
    "country_stat",
    "asn_neighbour",
    "country_traffic",
    "country_internet_quality",
];

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the warehouse database.
///
/// Default location is the XDG state directory:
/// `~/.local/state/ozi/warehouse.db` on Debian.
#[derive(Clone)]
pub struct Warehouse {
    pub(crate) pool: Pool<Sqlite>,
}

impl Warehouse {
    /// Open (or create) the default warehouse and create missing tables.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("ozi")?;
        let state_dir = xdg_dirs.get_state_home().join("ozi");
        Self::open_at(state_dir.join("warehouse.db")).await
    }

    /// Open (or create) the warehouse at `path`. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&uri)
            .await?;
        let wh = Warehouse { pool };
        wh.migrate().await?;
        Ok(wh)
    }

    /// In-memory warehouse (no disk I/O). Single connection so every query
    /// sees the same database.
    pub async fn open_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let wh = Warehouse { pool };
        wh.migrate().await?;
        Ok(wh)
    }

    async fn migrate(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS asn (
                a_country_iso2 TEXT NOT NULL,
                a_date TEXT NOT NULL,
                a_ripe_id INTEGER NOT NULL,
                a_is_routed INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS country_stat (
                cs_country_iso2 TEXT NOT NULL,
                cs_stats_timestamp TEXT NOT NULL,
                cs_stats_resolution TEXT NOT NULL,
                cs_v4_prefixes_ris INTEGER,
                cs_v6_prefixes_ris INTEGER,
                cs_asns_ris INTEGER,
                cs_v4_prefixes_stats INTEGER,
                cs_v6_prefixes_stats INTEGER,
                cs_asns_stats INTEGER
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS asn_neighbour (
                an_asn INTEGER NOT NULL,
                an_neighbour INTEGER NOT NULL,
                an_date TEXT NOT NULL,
                an_type TEXT NOT NULL,
                an_power INTEGER,
                an_v4_peers INTEGER,
                an_v6_peers INTEGER
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS country_traffic (
                cr_country_iso2 TEXT NOT NULL,
                cr_date TEXT NOT NULL,
                cr_traffic REAL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS country_internet_quality (
                ci_country_iso2 TEXT NOT NULL,
                ci_date TEXT NOT NULL,
                ci_p75 REAL,
                ci_p50 REAL,
                ci_p25 REAL
            )
            "#,
        ];
        for sql in statements {
            sqlx::query(sql).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Number of rows in one of `TABLES`.
    pub async fn count_rows(&self, table: &str) -> Result<i64> {
        if !TABLES.contains(&table) {
            bail!("unknown warehouse table: {}", table);
        }
        let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}
