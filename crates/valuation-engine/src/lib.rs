//! Valuation deriver: turns raw per-share indicators into a fully populated
//! [`ShareValuation`].
//!
//! Every derived field degrades independently to `None` when its inputs are
//! unknown or would divide by zero; derivation itself never fails on
//! financial edge cases.

use radar_core::{RadarError, RawIndicators, ShareValuation};

/// Benjamin Graham's fair-value multiple over eps x bvps.
const GRAHAM_MULTIPLE: f64 = 22.5;

/// Minimum acceptable dividend yield in the Bazin model.
const BAZIN_MIN_YIELD: f64 = 0.06;

/// Discount-rate style scalar for the Gordon fair price. Validated on
/// construction so derivation never has to re-check the precondition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketRisk(f64);

impl MarketRisk {
    /// Rejects non-positive or non-finite values; the Gordon model divides
    /// by this number.
    pub fn new(value: f64) -> Result<Self, RadarError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(RadarError::InvalidMarketRisk(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for MarketRisk {
    fn default() -> Self {
        Self(0.15)
    }
}

/// Derive the full valuation for one share. Pure and total: any combination
/// of unknown indicators yields `None` fields, never an error.
pub fn derive(raw: &RawIndicators, market_risk: MarketRisk) -> ShareValuation {
    let price = raw.price;

    let dps = raw.dy.map(|dy| dy * price);

    let payout = match (dps, raw.eps) {
        (Some(dps), Some(eps)) if eps != 0.0 => Some(dps / eps),
        _ => None,
    };

    let expected_growth = match (raw.roe, payout) {
        // A zero payout means everything is retained; the model caps the
        // reinvestment credit at 20% of ROE in that case.
        (Some(roe), Some(payout)) if payout == 0.0 => Some(0.2 * roe),
        (Some(roe), Some(payout)) => Some((1.0 - payout) * roe),
        _ => None,
    };

    let average_growth = match (expected_growth, raw.cagr) {
        (Some(expected), Some(cagr)) => Some((expected + cagr) / 2.0),
        (Some(expected), None) => Some(expected),
        _ => None,
    };

    let peg = match (raw.pe, average_growth) {
        (Some(pe), Some(growth)) if growth != 0.0 => Some(pe / growth),
        _ => None,
    };

    // Negative earnings disqualify the Graham model outright, even when a
    // negative book value would make the product positive. Zero earnings are
    // allowed (fair price zero).
    let fair_price_graham = match (raw.eps, raw.bvps) {
        (Some(eps), Some(bvps)) if eps >= 0.0 && eps * bvps >= 0.0 && price > 0.0 => {
            Some((GRAHAM_MULTIPLE * eps * bvps).sqrt())
        }
        _ => None,
    };

    let fair_price_bazin = match dps {
        Some(dps) if price > 0.0 => Some(dps / BAZIN_MIN_YIELD),
        _ => None,
    };

    let fair_price_gordon = match (dps, raw.cagr) {
        (Some(dps), Some(cagr)) if price > 0.0 => {
            // Growth enters dampened to a tenth of the earnings CAGR.
            Some((1.0 / market_risk.value()) * dps * (1.0 + 0.1 * cagr))
        }
        _ => None,
    };

    ShareValuation {
        ticker: raw.ticker.clone(),
        price,
        dy: raw.dy,
        pe: raw.pe,
        pb: raw.pb,
        gross_margin: raw.gross_margin,
        net_margin: raw.net_margin,
        ebit_margin: raw.ebit_margin,
        ev_ebit: raw.ev_ebit,
        current_liquidity: raw.current_liquidity,
        net_debt_to_equity: raw.net_debt_to_equity,
        roe: raw.roe,
        roa: raw.roa,
        roic: raw.roic,
        cagr: raw.cagr,
        adtv: raw.adtv,
        bvps: raw.bvps,
        eps: raw.eps,
        market_cap: raw.market_cap,
        dps,
        payout,
        expected_growth,
        average_growth,
        peg,
        fair_price_graham,
        fair_price_bazin,
        fair_price_gordon,
        graham_valuation: valuation_ratio(fair_price_graham, price),
        bazin_valuation: valuation_ratio(fair_price_bazin, price),
        gordon_valuation: valuation_ratio(fair_price_gordon, price),
        composite_rank: None,
    }
}

/// Derive valuations for a whole snapshot, preserving record order.
pub fn derive_universe(records: &[RawIndicators], market_risk: MarketRisk) -> Vec<ShareValuation> {
    records
        .iter()
        .map(|raw| derive(raw, market_risk))
        .collect()
}

fn valuation_ratio(fair_price: Option<f64>, price: f64) -> Option<f64> {
    match fair_price {
        Some(fair) if price > 0.0 => Some(fair / price - 1.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn indicators(ticker: &str, price: f64) -> RawIndicators {
        RawIndicators {
            ticker: ticker.to_string(),
            price,
            ..Default::default()
        }
    }

    fn risk() -> MarketRisk {
        MarketRisk::default()
    }

    #[test]
    fn test_market_risk_rejects_non_positive() {
        assert!(MarketRisk::new(0.15).is_ok());
        assert!(MarketRisk::new(0.0).is_err());
        assert!(MarketRisk::new(-0.1).is_err());
        assert!(MarketRisk::new(f64::NAN).is_err());
        assert!(MarketRisk::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_unknown_dividend_yield_cascades() {
        let mut raw = indicators("CASC3", 10.0);
        raw.eps = Some(2.0);
        raw.bvps = Some(8.0);
        raw.roe = Some(0.15);
        raw.cagr = Some(0.10);
        raw.pe = Some(5.0);

        let share = derive(&raw, risk());

        assert_eq!(share.dps, None);
        assert_eq!(share.payout, None);
        assert_eq!(share.expected_growth, None);
        assert_eq!(share.average_growth, None);
        assert_eq!(share.peg, None);
        assert_eq!(share.fair_price_bazin, None);
        assert_eq!(share.fair_price_gordon, None);
        assert_eq!(share.bazin_valuation, None);
        assert_eq!(share.gordon_valuation, None);
        // Graham only looks at earnings and book value
        assert!(share.fair_price_graham.is_some());
    }

    #[test]
    fn test_graham_rejects_negative_earnings_unconditionally() {
        let mut raw = indicators("NEGA3", 10.0);
        raw.eps = Some(-1.0);
        raw.bvps = Some(8.0);
        assert_eq!(derive(&raw, risk()).fair_price_graham, None);

        // Two negatives make the product positive; still disqualified.
        raw.bvps = Some(-8.0);
        let share = derive(&raw, risk());
        assert_eq!(share.fair_price_graham, None);
        assert_eq!(share.graham_valuation, None);
    }

    #[test]
    fn test_graham_rejects_negative_product() {
        let mut raw = indicators("PROD3", 10.0);
        raw.eps = Some(2.0);
        raw.bvps = Some(-8.0);
        assert_eq!(derive(&raw, risk()).fair_price_graham, None);
    }

    #[test]
    fn test_graham_allows_zero_earnings() {
        let mut raw = indicators("ZERO3", 10.0);
        raw.eps = Some(0.0);
        raw.bvps = Some(8.0);

        let share = derive(&raw, risk());
        assert_relative_eq!(share.fair_price_graham.unwrap(), 0.0);
        assert_relative_eq!(share.graham_valuation.unwrap(), -1.0);
    }

    #[test]
    fn test_reference_shares() {
        let mut x = indicators("XPTO3", 10.0);
        x.eps = Some(2.0);
        x.bvps = Some(8.0);
        x.dy = Some(0.05);

        let mut y = indicators("YPTO3", 10.0);
        y.eps = Some(-1.0);
        y.bvps = Some(8.0);
        y.dy = Some(0.0);

        let x = derive(&x, risk());
        let y = derive(&y, risk());

        // sqrt(22.5 * 2 * 8) = sqrt(360)
        assert_relative_eq!(x.fair_price_graham.unwrap(), 18.9737, epsilon = 1e-4);
        assert_relative_eq!(x.graham_valuation.unwrap(), 0.8974, epsilon = 1e-4);
        assert_relative_eq!(x.dps.unwrap(), 0.5);
        assert_relative_eq!(x.fair_price_bazin.unwrap(), 0.5 / 0.06, epsilon = 1e-9);

        assert_eq!(y.fair_price_graham, None);
        // A zero yield still produces a (worthless) Bazin price
        assert_relative_eq!(y.fair_price_bazin.unwrap(), 0.0);
        assert_relative_eq!(y.bazin_valuation.unwrap(), -1.0);
    }

    #[test]
    fn test_payout_branches() {
        // Non-zero payout: expected growth is retention times ROE
        let mut raw = indicators("PAYX3", 10.0);
        raw.dy = Some(0.04); // dps = 0.4
        raw.eps = Some(2.0); // payout = 0.2
        raw.roe = Some(0.15);
        let share = derive(&raw, risk());
        assert_relative_eq!(share.payout.unwrap(), 0.2, epsilon = 1e-9);
        assert_relative_eq!(share.expected_growth.unwrap(), 0.8 * 0.15, epsilon = 1e-9);

        // Zero payout takes the 20%-of-ROE branch instead of (1 - 0) * roe
        raw.dy = Some(0.0);
        let share = derive(&raw, risk());
        assert_relative_eq!(share.payout.unwrap(), 0.0);
        assert_relative_eq!(share.expected_growth.unwrap(), 0.2 * 0.15, epsilon = 1e-9);

        // Zero earnings never divide: payout undefined, growth undefined
        raw.dy = Some(0.04);
        raw.eps = Some(0.0);
        let share = derive(&raw, risk());
        assert_eq!(share.payout, None);
        assert_eq!(share.expected_growth, None);
    }

    #[test]
    fn test_average_growth_combinations() {
        let mut raw = indicators("GROW3", 10.0);
        raw.dy = Some(0.04);
        raw.eps = Some(2.0);
        raw.roe = Some(0.15); // expected = 0.8 * 0.15 = 0.12

        // Without a CAGR the expected growth stands alone
        let share = derive(&raw, risk());
        assert_relative_eq!(share.average_growth.unwrap(), 0.12, epsilon = 1e-9);

        // With a CAGR the two are averaged
        raw.cagr = Some(0.08);
        let share = derive(&raw, risk());
        assert_relative_eq!(share.average_growth.unwrap(), 0.10, epsilon = 1e-9);

        // A CAGR alone is not enough
        raw.roe = None;
        let share = derive(&raw, risk());
        assert_eq!(share.average_growth, None);
    }

    #[test]
    fn test_peg_guards_zero_growth() {
        let mut raw = indicators("PEGG3", 10.0);
        raw.pe = Some(8.0);
        raw.dy = Some(0.1); // dps = 1.0
        raw.eps = Some(1.0); // payout = 1.0 => expected growth = 0
        raw.roe = Some(0.15);

        let share = derive(&raw, risk());
        assert_relative_eq!(share.average_growth.unwrap(), 0.0);
        assert_eq!(share.peg, None);

        // With real growth the ratio appears
        raw.eps = Some(2.0); // payout = 0.5 => expected = 0.075
        let share = derive(&raw, risk());
        assert_relative_eq!(share.peg.unwrap(), 8.0 / 0.075, epsilon = 1e-9);
    }

    #[test]
    fn test_gordon_model() {
        let mut raw = indicators("GORD3", 10.0);
        raw.dy = Some(0.06); // dps = 0.6
        raw.cagr = Some(0.20);

        let share = derive(&raw, MarketRisk::new(0.15).unwrap());
        // (1 / 0.15) * 0.6 * (1 + 0.1 * 0.2) = 4.08
        assert_relative_eq!(share.fair_price_gordon.unwrap(), 4.08, epsilon = 1e-9);
        assert_relative_eq!(share.gordon_valuation.unwrap(), -0.592, epsilon = 1e-9);

        // No CAGR, no Gordon price
        raw.cagr = None;
        let share = derive(&raw, risk());
        assert_eq!(share.fair_price_gordon, None);
    }

    #[test]
    fn test_derive_universe_preserves_order() {
        let records = vec![
            indicators("BBBB3", 10.0),
            indicators("AAAA3", 20.0),
            indicators("CCCC3", 5.0),
        ];

        let universe = derive_universe(&records, risk());
        let tickers: Vec<&str> = universe.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["BBBB3", "AAAA3", "CCCC3"]);
    }
}
