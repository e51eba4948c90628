//! Binance spot market data (daily klines) for the crypto universe.

pub mod client;
pub mod provider;

pub use client::BinanceRestClient;
pub use provider::BinanceMarketDataProvider;
