//! Batch inserts.

use anyhow::Result;
use sqlx::{Sqlite, Transaction};

use super::db::Warehouse;
use crate::extract::{
    AsnRecord, NeighbourRecord, QualityPoint, RecordBatch, StatRecord, TrafficPoint,
};

impl Warehouse {
    /// Insert one batch for `country` in a single transaction.
    /// Returns the number of rows stored; nothing is stored on error.
    pub async fn insert(&self, country: &str, batch: &RecordBatch) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let stored = match batch {
            RecordBatch::Asns(rows) => insert_asns(&mut tx, country, rows).await?,
            RecordBatch::Stats { resolution, rows } => {
                insert_stats(&mut tx, country, resolution, rows).await?
            }
            RecordBatch::Neighbours(rows) => insert_neighbours(&mut tx, rows).await?,
            RecordBatch::Traffic(rows) => insert_traffic(&mut tx, country, rows).await?,
            RecordBatch::Quality(rows) => insert_quality(&mut tx, country, rows).await?,
        };
        tx.commit().await?;
        Ok(stored)
    }
}

async fn insert_asns(
    tx: &mut Transaction<'_, Sqlite>,
    country: &str,
    rows: &[AsnRecord],
) -> Result<u64> {
    let mut n = 0;
    for r in rows {
        n += sqlx::query(
            "INSERT INTO asn (a_country_iso2, a_date, a_ripe_id, a_is_routed) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(country)
        .bind(r.date.to_string())
        .bind(r.asn)
        .bind(r.is_routed)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(n)
}

async fn insert_stats(
    tx: &mut Transaction<'_, Sqlite>,
    country: &str,
    resolution: &str,
    rows: &[StatRecord],
) -> Result<u64> {
    let mut n = 0;
    for r in rows {
        n += sqlx::query(
            r#"
            INSERT INTO country_stat (
                cs_country_iso2, cs_stats_timestamp, cs_stats_resolution,
                cs_v4_prefixes_ris, cs_v6_prefixes_ris, cs_asns_ris,
                cs_v4_prefixes_stats, cs_v6_prefixes_stats, cs_asns_stats
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(country)
        .bind(&r.timestamp)
        .bind(resolution)
        .bind(r.v4_prefixes_ris)
        .bind(r.v6_prefixes_ris)
        .bind(r.asns_ris)
        .bind(r.v4_prefixes_stats)
        .bind(r.v6_prefixes_stats)
        .bind(r.asns_stats)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(n)
}

async fn insert_neighbours(
    tx: &mut Transaction<'_, Sqlite>,
    rows: &[NeighbourRecord],
) -> Result<u64> {
    let mut n = 0;
    for r in rows {
        n += sqlx::query(
            r#"
            INSERT INTO asn_neighbour (
                an_asn, an_neighbour, an_date, an_type, an_power, an_v4_peers, an_v6_peers
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(r.asn_req)
        .bind(r.asn)
        .bind(r.date.to_string())
        .bind(&r.kind)
        .bind(r.power)
        .bind(r.v4_peers)
        .bind(r.v6_peers)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(n)
}

async fn insert_traffic(
    tx: &mut Transaction<'_, Sqlite>,
    country: &str,
    rows: &[TrafficPoint],
) -> Result<u64> {
    let mut n = 0;
    for r in rows {
        n += sqlx::query(
            "INSERT INTO country_traffic (cr_country_iso2, cr_date, cr_traffic) VALUES (?1, ?2, ?3)",
        )
        .bind(country)
        .bind(&r.timestamp)
        .bind(r.value)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(n)
}

async fn insert_quality(
    tx: &mut Transaction<'_, Sqlite>,
    country: &str,
    rows: &[QualityPoint],
) -> Result<u64> {
    let mut n = 0;
    for r in rows {
        n += sqlx::query(
            r#"
            INSERT INTO country_internet_quality (ci_country_iso2, ci_date, ci_p75, ci_p50, ci_p25)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(country)
        .bind(&r.timestamp)
        .bind(r.p75)
        .bind(r.p50)
        .bind(r.p25)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(n)
}
