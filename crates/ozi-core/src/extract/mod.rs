//! Batched extraction: query keys in, bounded record batches out.
//!
//! `BatchExtractor` is the one primitive; `jobs` builds it for each task code
//! (flat per-date, nested per-date-per-ASN, or one key per country).

mod batch;
pub mod dates;
mod jobs;
pub mod parse;
mod progress;
mod records;
pub mod report;

pub use batch::BatchExtractor;
pub use dates::{generate_dates, year_windows};
pub use jobs::{build_job, ExtractionJob, JobClients};
pub use progress::{ExtractionCounters, ExtractionProgress};
pub use records::{AsnRecord, NeighbourRecord, QualityPoint, RecordBatch, StatRecord, TrafficPoint};
