//! External data sources: price histories and screening universes.

pub mod binance;
pub mod equity_files;
pub mod error;
pub mod market_data;

pub use binance::{BinanceMarketDataProvider, BinanceRestClient};
pub use equity_files::{CsvListingUniverse, CsvMarketDataProvider};
pub use error::ProviderError;
pub use market_data::{InMemoryMarketDataProvider, MarketDataProvider, StaticUniverse, UniverseProvider};
