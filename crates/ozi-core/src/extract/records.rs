use chrono::NaiveDate;
use serde::Serialize;

/// One ASN registered to a country on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsnRecord {
    pub asn: i64,
    pub date: NaiveDate,
    pub is_routed: bool,
}

/// One row of country resource statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatRecord {
    /// Start of the sampling interval as reported by the API.
    pub timestamp: String,
    pub v4_prefixes_ris: Option<i64>,
    pub v6_prefixes_ris: Option<i64>,
    pub asns_ris: Option<i64>,
    pub v4_prefixes_stats: Option<i64>,
    pub v6_prefixes_stats: Option<i64>,
    pub asns_stats: Option<i64>,
}

/// One neighbour of `asn_req` on `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighbourRecord {
    pub asn_req: i64,
    pub asn: i64,
    pub date: NaiveDate,
    /// Position relative to `asn_req`: left, right or uncertain.
    pub kind: String,
    pub power: Option<i64>,
    pub v4_peers: Option<i64>,
    pub v6_peers: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficPoint {
    pub timestamp: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityPoint {
    pub timestamp: String,
    pub p75: Option<f64>,
    pub p50: Option<f64>,
    pub p25: Option<f64>,
}

/// A batch handed to the warehouse, tagged with its record kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBatch {
    Asns(Vec<AsnRecord>),
    Stats {
        resolution: String,
        rows: Vec<StatRecord>,
    },
    Neighbours(Vec<NeighbourRecord>),
    Traffic(Vec<TrafficPoint>),
    Quality(Vec<QualityPoint>),
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        match self {
            RecordBatch::Asns(v) => v.len(),
            RecordBatch::Stats { rows, .. } => rows.len(),
            RecordBatch::Neighbours(v) => v.len(),
            RecordBatch::Traffic(v) => v.len(),
            RecordBatch::Quality(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Warehouse table the batch lands in.
    pub fn table(&self) -> &'static str {
        match self {
            RecordBatch::Asns(_) => "asn",
            RecordBatch::Stats { .. } => "country_stat",
            RecordBatch::Neighbours(_) => "asn_neighbour",
            RecordBatch::Traffic(_) => "country_traffic",
            RecordBatch::Quality(_) => "country_internet_quality",
        }
    }
}
