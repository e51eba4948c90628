//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;
pub mod universe;

pub use indicators::{Candle, Crossing, IndicatorSet, IndicatorSnapshot};
pub use signal::{ScreeningFailure, ScreeningResult, SignalKind, SignalRecord};
pub use universe::UniverseEntry;
