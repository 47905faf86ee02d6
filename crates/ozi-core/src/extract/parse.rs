//! Payload parsers.
//!
//! Each returns `None` when the response is well-formed JSON but lacks the
//! expected data envelope; the caller treats that as "no records for this key".

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::records::{AsnRecord, NeighbourRecord, QualityPoint, StatRecord, TrafficPoint};

/// Extract the numbers from `{AsnSingle(123), AsnSingle(456), AsnRange(...)}`.
/// Only `AsnSingle` entries count.
fn parse_asn_set(raw: &str) -> Vec<i64> {
    raw.trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split(',')
        .filter_map(|item| {
            item.trim()
                .strip_prefix("AsnSingle(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|n| n.trim().parse().ok())
        })
        .collect()
}

/// `country-asns`: `data.countries[0].routed` / `.non_routed`.
/// Routed ASNs come first, then non-routed, each in payload order.
pub fn parse_asns(payload: &Value, date: NaiveDate) -> Option<Vec<AsnRecord>> {
    let country = payload.get("data")?.get("countries")?.get(0)?;
    if !country.is_object() {
        return None;
    }
    let field = |name: &str| {
        country
            .get(name)
            .and_then(Value::as_str)
            .map(parse_asn_set)
            .unwrap_or_default()
    };
    let routed = field("routed").into_iter().map(|asn| AsnRecord {
        asn,
        date,
        is_routed: true,
    });
    let non_routed = field("non_routed").into_iter().map(|asn| AsnRecord {
        asn,
        date,
        is_routed: false,
    });
    Some(routed.chain(non_routed).collect())
}

#[derive(Deserialize)]
struct TimelineEntry {
    starttime: String,
}

#[derive(Deserialize)]
struct StatRow {
    #[serde(default)]
    timeline: Vec<TimelineEntry>,
    v4_prefixes_ris: Option<i64>,
    v6_prefixes_ris: Option<i64>,
    asns_ris: Option<i64>,
    v4_prefixes_stats: Option<i64>,
    v6_prefixes_stats: Option<i64>,
    asns_stats: Option<i64>,
}

/// `country-resource-stats`: `data.stats[]`. Rows without a timeline are dropped.
pub fn parse_stats(payload: &Value) -> Option<Vec<StatRecord>> {
    let stats = payload.get("data")?.get("stats")?;
    let rows: Vec<StatRow> = match serde_json::from_value(stats.clone()) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::debug!("unexpected stats rows: {}", e);
            return None;
        }
    };
    Some(
        rows.into_iter()
            .filter_map(|row| {
                let timestamp = row.timeline.into_iter().next()?.starttime;
                Some(StatRecord {
                    timestamp,
                    v4_prefixes_ris: row.v4_prefixes_ris,
                    v6_prefixes_ris: row.v6_prefixes_ris,
                    asns_ris: row.asns_ris,
                    v4_prefixes_stats: row.v4_prefixes_stats,
                    v6_prefixes_stats: row.v6_prefixes_stats,
                    asns_stats: row.asns_stats,
                })
            })
            .collect(),
    )
}

#[derive(Deserialize)]
struct NeighbourRow {
    asn: i64,
    #[serde(rename = "type", default)]
    kind: String,
    power: Option<i64>,
    v4_peers: Option<i64>,
    v6_peers: Option<i64>,
}

/// `asn-neighbours`: `data.neighbours[]`, tagged with the requesting ASN and date.
pub fn parse_neighbours(
    payload: &Value,
    asn_req: i64,
    date: NaiveDate,
) -> Option<Vec<NeighbourRecord>> {
    let neighbours = payload.get("data")?.get("neighbours")?;
    let rows: Vec<NeighbourRow> = match serde_json::from_value(neighbours.clone()) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::debug!(asn_req, "unexpected neighbour rows: {}", e);
            return None;
        }
    };
    Some(
        rows.into_iter()
            .map(|row| NeighbourRecord {
                asn_req,
                asn: row.asn,
                date,
                kind: row.kind,
                power: row.power,
                v4_peers: row.v4_peers,
                v6_peers: row.v6_peers,
            })
            .collect(),
    )
}

/// Radar reports values as numbers or numeric strings.
fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn series<'a>(main: &'a Value, name: &str) -> Option<&'a Vec<Value>> {
    main.get(name)?.as_array()
}

fn radar_main(payload: &Value) -> Option<(&Value, Vec<String>)> {
    let main = payload.get("result")?.get("main")?;
    let timestamps = series(main, "timestamps")?
        .iter()
        .map(|t| t.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()?;
    Some((main, timestamps))
}

/// Radar `netflows/timeseries`: `result.main{timestamps, values}`.
pub fn parse_traffic(payload: &Value) -> Option<Vec<TrafficPoint>> {
    let (main, timestamps) = radar_main(payload)?;
    let values = series(main, "values")?;
    if values.len() != timestamps.len() {
        return None;
    }
    Some(
        timestamps
            .into_iter()
            .zip(values)
            .map(|(timestamp, v)| TrafficPoint {
                timestamp,
                value: number(v),
            })
            .collect(),
    )
}

/// Radar `quality/iqi/timeseries_groups`: `result.main{timestamps, p75, p50, p25}`.
pub fn parse_quality(payload: &Value) -> Option<Vec<QualityPoint>> {
    let (main, timestamps) = radar_main(payload)?;
    let p75 = series(main, "p75")?;
    let p50 = series(main, "p50")?;
    let p25 = series(main, "p25")?;
    let n = timestamps.len();
    if p75.len() != n || p50.len() != n || p25.len() != n {
        return None;
    }
    Some(
        timestamps
            .into_iter()
            .enumerate()
            .map(|(i, timestamp)| QualityPoint {
                timestamp,
                p75: number(&p75[i]),
                p50: number(&p50[i]),
                p25: number(&p25[i]),
            })
            .collect(),
    )
}
