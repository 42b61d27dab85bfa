use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use radar_core::ShareValuation;
use serde::{Deserialize, Serialize};

/// Direction of a recorded trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Buy,
    Sell,
}

/// One executed trade against a holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub ticker: String,
    pub price: f64,
    pub quantity: u32,
    pub kind: OperationKind,
    pub executed_at: DateTime<Utc>,
}

impl Operation {
    /// Validates the trade terms before anything enters the history.
    pub fn new(ticker: &str, price: f64, quantity: u32, kind: OperationKind) -> Result<Self> {
        if !price.is_finite() || price <= 0.0 {
            bail!("trade price for {ticker} must be positive, got {price}");
        }
        if quantity == 0 {
            bail!("trade quantity for {ticker} must be at least 1");
        }
        Ok(Self {
            ticker: ticker.to_string(),
            price,
            quantity,
            kind,
            executed_at: Utc::now(),
        })
    }
}

/// A position: the share's current valuation plus the accumulated cost
/// basis and the trades that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub valuation: ShareValuation,
    pub mean_price: f64,
    pub quantity: u32,
    pub history: Vec<Operation>,
}

impl Holding {
    /// Opens a position. The opening buy becomes the first history entry,
    /// so its terms go through the same validation as any later trade.
    pub fn open(valuation: ShareValuation, mean_price: f64, quantity: u32) -> Result<Self> {
        let first_buy = Operation::new(&valuation.ticker, mean_price, quantity, OperationKind::Buy)?;
        Ok(Self {
            valuation,
            mean_price,
            quantity,
            history: vec![first_buy],
        })
    }

    pub fn total_invested(&self) -> f64 {
        self.quantity as f64 * self.mean_price
    }

    /// Present value at the snapshot price.
    pub fn market_value(&self) -> f64 {
        self.quantity as f64 * self.valuation.price
    }

    pub fn return_on_investment(&self) -> f64 {
        self.valuation.price / self.mean_price - 1.0
    }

    /// Averages a new lot into the cost basis, rounded to cents.
    pub fn buy(&mut self, price: f64, quantity: u32) -> Result<()> {
        let operation = Operation::new(&self.valuation.ticker, price, quantity, OperationKind::Buy)?;

        let combined = self.quantity as f64 * self.mean_price + price * quantity as f64;
        self.mean_price = round2(combined / (self.quantity + quantity) as f64);
        self.quantity += quantity;
        self.history.push(operation);
        Ok(())
    }

    /// Sells part or all of the position. The mean price stays put; only
    /// the quantity shrinks. Overselling is rejected and leaves the
    /// holding untouched.
    pub fn sell(&mut self, price: f64, quantity: u32) -> Result<()> {
        let operation = Operation::new(&self.valuation.ticker, price, quantity, OperationKind::Sell)?;

        if quantity > self.quantity {
            bail!(
                "cannot sell {} shares of {}: only {} held",
                quantity,
                self.valuation.ticker,
                self.quantity
            );
        }
        self.quantity -= quantity;
        self.history.push(operation);
        Ok(())
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
