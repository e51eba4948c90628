//! Numeric helpers shared by the indicator library and the analyzer.

pub mod math;
