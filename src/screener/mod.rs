//! Universe screener: fans the analyzer out over a universe and ranks the results.

pub mod pipeline;
pub mod profile;

pub use pipeline::{
    rank_records, rank_volume_surges, Screener, DEFAULT_CONCURRENCY, DEFAULT_HISTORY_DAYS,
};
pub use profile::{ProfileScan, ScanProfile};
