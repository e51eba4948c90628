use serde::{Deserialize, Serialize};

/// One instrument in a screening universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseEntry {
    pub instrument_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
}

impl UniverseEntry {
    pub fn new(instrument_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            display_name: display_name.into(),
            market_cap: None,
        }
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }
}
