use serde::{Deserialize, Serialize};

/// One row of the market snapshot: raw per-share indicators as parsed by the
/// ingestion layer. Only `ticker` and `price` are required; every other
/// indicator may be unknown (`None`), which is distinct from zero.
///
/// Percentage-style inputs (dy, margins, roe, roic, cagr) arrive already
/// normalized to 0-1 fractions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIndicators {
    pub ticker: String,
    /// Last traded price, positive for any well-formed record.
    pub price: f64,
    /// Dividend yield.
    pub dy: Option<f64>,
    /// Price to earnings.
    pub pe: Option<f64>,
    /// Price to book value.
    pub pb: Option<f64>,
    pub gross_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub ebit_margin: Option<f64>,
    /// Enterprise value over EBIT.
    pub ev_ebit: Option<f64>,
    pub current_liquidity: Option<f64>,
    pub net_debt_to_equity: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub roic: Option<f64>,
    /// 5-year earnings compound annual growth rate.
    pub cagr: Option<f64>,
    /// Average daily traded value, in millions.
    pub adtv: Option<f64>,
    /// Book value per share.
    pub bvps: Option<f64>,
    /// Earnings per share.
    pub eps: Option<f64>,
    /// Market capitalization, in billions.
    pub market_cap: Option<f64>,
}

/// A share with its full set of raw and derived indicators. Built once per
/// ticker by the valuation deriver; `composite_rank` is filled in by the
/// ranking pass when the universe is assembled, and the value is read-only
/// from then on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareValuation {
    pub ticker: String,
    pub price: f64,
    pub dy: Option<f64>,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub gross_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub ebit_margin: Option<f64>,
    pub ev_ebit: Option<f64>,
    pub current_liquidity: Option<f64>,
    pub net_debt_to_equity: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub roic: Option<f64>,
    pub cagr: Option<f64>,
    pub adtv: Option<f64>,
    pub bvps: Option<f64>,
    pub eps: Option<f64>,
    pub market_cap: Option<f64>,

    /// Dividend per share (dy x price).
    pub dps: Option<f64>,
    /// Share of earnings paid out as dividends (dps / eps).
    pub payout: Option<f64>,
    pub expected_growth: Option<f64>,
    pub average_growth: Option<f64>,
    /// Price/earnings over average growth.
    pub peg: Option<f64>,
    pub fair_price_graham: Option<f64>,
    pub fair_price_bazin: Option<f64>,
    pub fair_price_gordon: Option<f64>,
    /// Fair price over market price minus one; positive means undervalued.
    pub graham_valuation: Option<f64>,
    pub bazin_valuation: Option<f64>,
    pub gordon_valuation: Option<f64>,
    /// 1-based Greenblatt-style ordinal. `None` when the share fails either
    /// sub-ranking (non-positive or unknown EV/EBIT or ROIC).
    pub composite_rank: Option<u32>,
}
