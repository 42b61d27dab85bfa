use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("invalid market risk {0}: must be positive and finite")]
    InvalidMarketRisk(f64),

    #[error("unknown ticker: {0}")]
    UnknownTicker(String),
}
