//! Instrument analysis: indicator rules and the per-instrument analyzer.

pub mod engine;
pub mod error;
pub mod rules;

pub use engine::{
    evaluate_candles, evaluate_volume_surge, history_start, trailing_average_volume, volume_ratio,
    Analyzer,
};
pub use error::AnalysisFailure;
pub use rules::evaluate_rules;
