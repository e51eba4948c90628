//! Technical-analysis screener for equities and crypto assets.
//!
//! Instruments are analyzed one at a time against a fixed set of buy-interest
//! rules and the universe is ranked by how many rules fire.

pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod report;
pub mod screener;
pub mod services;
pub mod signals;
