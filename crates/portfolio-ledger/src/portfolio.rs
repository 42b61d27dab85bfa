use anyhow::Result;
use market_ingest::{PositionRow, TransactionRow};
use radar_core::RadarError;
use screening_engine::Universe;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{round2, Holding};

/// An ordered list of holdings over one market snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves position rows against the universe. Rows whose ticker is
    /// missing from the snapshot are skipped with a warning rather than
    /// failing the whole import.
    pub fn from_rows(universe: &Universe, rows: &[PositionRow]) -> Result<Self> {
        let mut portfolio = Self::new();
        let mut skipped = 0usize;

        for row in rows {
            match universe.get(&row.ticker) {
                Some(valuation) => {
                    let holding = Holding::open(valuation.clone(), row.mean_price, row.quantity)?;
                    portfolio.holdings.push(holding);
                }
                None => {
                    warn!(ticker = %row.ticker, "ticker not in market snapshot, skipping position");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!("skipped {} of {} positions", skipped, rows.len());
        }
        Ok(portfolio)
    }

    /// Replays a trade log in file order. A ticker's first buy opens its
    /// holding, later rows average into or sell down the position, and
    /// sold-out holdings are pruned from the result. Trades that cannot
    /// apply (unknown ticker, a sale with nothing held behind it) are
    /// skipped with a warning; rows with an unrecognized operation label
    /// are ignored.
    pub fn from_transactions(universe: &Universe, rows: &[TransactionRow]) -> Self {
        let mut portfolio = Self::new();
        let mut skipped = 0usize;

        for row in rows {
            let Some(valuation) = universe.get(&row.ticker) else {
                warn!(ticker = %row.ticker, "ticker not in market snapshot, skipping trade");
                skipped += 1;
                continue;
            };
            let held = portfolio
                .holdings
                .iter()
                .position(|h| h.valuation.ticker.eq_ignore_ascii_case(&row.ticker));

            let applied = match (row.operation.to_uppercase().as_str(), held) {
                ("COMPRA", Some(idx)) => portfolio.holdings[idx].buy(row.price, row.quantity),
                ("COMPRA", None) => {
                    Holding::open(valuation.clone(), row.price, row.quantity)
                        .map(|holding| portfolio.holdings.push(holding))
                }
                ("VENDA", Some(idx)) => portfolio.holdings[idx].sell(row.price, row.quantity),
                ("VENDA", None) => {
                    warn!(ticker = %row.ticker, "sale without an open position, skipping trade");
                    skipped += 1;
                    continue;
                }
                (label, _) => {
                    debug!(ticker = %row.ticker, label, "unrecognized operation label, ignoring trade");
                    continue;
                }
            };

            if let Err(err) = applied {
                warn!(ticker = %row.ticker, %err, "trade does not apply, skipping");
                skipped += 1;
            }
        }

        if skipped > 0 {
            warn!("skipped {} of {} trades", skipped, rows.len());
        }
        portfolio.prune();
        portfolio
    }

    /// Opens a fresh position for a ticker present in the universe.
    pub fn open_position(
        &mut self,
        universe: &Universe,
        ticker: &str,
        mean_price: f64,
        quantity: u32,
    ) -> Result<()> {
        let Some(valuation) = universe.get(ticker) else {
            return Err(RadarError::UnknownTicker(ticker.to_string()).into());
        };
        let holding = Holding::open(valuation.clone(), mean_price, quantity)?;
        self.holdings.push(holding);
        Ok(())
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Case-insensitive ticker lookup.
    pub fn get(&self, ticker: &str) -> Option<&Holding> {
        self.holdings
            .iter()
            .find(|h| h.valuation.ticker.eq_ignore_ascii_case(ticker))
    }

    pub fn get_mut(&mut self, ticker: &str) -> Option<&mut Holding> {
        self.holdings
            .iter_mut()
            .find(|h| h.valuation.ticker.eq_ignore_ascii_case(ticker))
    }

    pub fn total_invested(&self) -> f64 {
        self.holdings.iter().map(Holding::total_invested).sum()
    }

    /// Present value of everything held, at snapshot prices.
    pub fn equity(&self) -> f64 {
        self.holdings.iter().map(Holding::market_value).sum()
    }

    /// Overall return, or `None` while nothing is invested.
    pub fn return_on_investment(&self) -> Option<f64> {
        let invested = self.total_invested();
        (invested > 0.0).then(|| self.equity() / invested - 1.0)
    }

    /// Percentage of equity held in one ticker, rounded to two decimals.
    pub fn position_weight(&self, ticker: &str) -> Option<f64> {
        let holding = self.get(ticker)?;
        let equity = self.equity();
        (equity > 0.0).then(|| round2(100.0 * holding.market_value() / equity))
    }

    /// Drops holdings that were sold out completely.
    pub fn prune(&mut self) {
        self.holdings.retain(|h| h.quantity != 0);
    }
}
