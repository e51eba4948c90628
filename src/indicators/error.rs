use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("period must be greater than zero ({0})")]
    ZeroPeriod(&'static str),

    #[error("non-finite value in candle {index}")]
    NonFiniteInput { index: usize },

    #[error("fast period {fast} must be shorter than slow period {slow}")]
    InvalidPeriods { fast: usize, slow: usize },
}
