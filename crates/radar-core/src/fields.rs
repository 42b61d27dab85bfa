use crate::types::ShareValuation;

/// Closed set of numeric fields a screen can reference by name.
///
/// Config-driven criteria carry field names as strings; resolving them
/// through this enumeration makes an unknown name an explicit lookup miss
/// that callers handle as a soft failure, instead of a reflective access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenField {
    Price,
    Dy,
    Pe,
    Pb,
    GrossMargin,
    NetMargin,
    EbitMargin,
    EvEbit,
    CurrentLiquidity,
    NetDebtToEquity,
    Roe,
    Roa,
    Roic,
    Cagr,
    Adtv,
    Bvps,
    Eps,
    MarketCap,
    Dps,
    Payout,
    ExpectedGrowth,
    AverageGrowth,
    Peg,
    FairPriceGraham,
    FairPriceBazin,
    FairPriceGordon,
    GrahamValuation,
    BazinValuation,
    GordonValuation,
    CompositeRank,
}

impl ScreenField {
    /// Resolve a field name as written in criteria files. `None` for any
    /// name outside the screenable set.
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "price" => ScreenField::Price,
            "dy" => ScreenField::Dy,
            "pe" => ScreenField::Pe,
            "pb" => ScreenField::Pb,
            "gross_margin" => ScreenField::GrossMargin,
            "net_margin" => ScreenField::NetMargin,
            "ebit_margin" => ScreenField::EbitMargin,
            "ev_ebit" => ScreenField::EvEbit,
            "current_liquidity" => ScreenField::CurrentLiquidity,
            "net_debt_to_equity" => ScreenField::NetDebtToEquity,
            "roe" => ScreenField::Roe,
            "roa" => ScreenField::Roa,
            "roic" => ScreenField::Roic,
            "cagr" => ScreenField::Cagr,
            "adtv" => ScreenField::Adtv,
            "bvps" => ScreenField::Bvps,
            "eps" => ScreenField::Eps,
            "market_cap" => ScreenField::MarketCap,
            "dps" => ScreenField::Dps,
            "payout" => ScreenField::Payout,
            "expected_growth" => ScreenField::ExpectedGrowth,
            "average_growth" => ScreenField::AverageGrowth,
            "peg" => ScreenField::Peg,
            "fair_price_graham" => ScreenField::FairPriceGraham,
            "fair_price_bazin" => ScreenField::FairPriceBazin,
            "fair_price_gordon" => ScreenField::FairPriceGordon,
            "graham_valuation" => ScreenField::GrahamValuation,
            "bazin_valuation" => ScreenField::BazinValuation,
            "gordon_valuation" => ScreenField::GordonValuation,
            "composite_rank" => ScreenField::CompositeRank,
            _ => return None,
        };
        Some(field)
    }

    /// Canonical name, matching what `from_name` accepts.
    pub fn name(&self) -> &'static str {
        match self {
            ScreenField::Price => "price",
            ScreenField::Dy => "dy",
            ScreenField::Pe => "pe",
            ScreenField::Pb => "pb",
            ScreenField::GrossMargin => "gross_margin",
            ScreenField::NetMargin => "net_margin",
            ScreenField::EbitMargin => "ebit_margin",
            ScreenField::EvEbit => "ev_ebit",
            ScreenField::CurrentLiquidity => "current_liquidity",
            ScreenField::NetDebtToEquity => "net_debt_to_equity",
            ScreenField::Roe => "roe",
            ScreenField::Roa => "roa",
            ScreenField::Roic => "roic",
            ScreenField::Cagr => "cagr",
            ScreenField::Adtv => "adtv",
            ScreenField::Bvps => "bvps",
            ScreenField::Eps => "eps",
            ScreenField::MarketCap => "market_cap",
            ScreenField::Dps => "dps",
            ScreenField::Payout => "payout",
            ScreenField::ExpectedGrowth => "expected_growth",
            ScreenField::AverageGrowth => "average_growth",
            ScreenField::Peg => "peg",
            ScreenField::FairPriceGraham => "fair_price_graham",
            ScreenField::FairPriceBazin => "fair_price_bazin",
            ScreenField::FairPriceGordon => "fair_price_gordon",
            ScreenField::GrahamValuation => "graham_valuation",
            ScreenField::BazinValuation => "bazin_valuation",
            ScreenField::GordonValuation => "gordon_valuation",
            ScreenField::CompositeRank => "composite_rank",
        }
    }

    /// Read this field off a share. `None` when the indicator is unknown for
    /// that share.
    pub fn value(&self, share: &ShareValuation) -> Option<f64> {
        match self {
            ScreenField::Price => Some(share.price),
            ScreenField::Dy => share.dy,
            ScreenField::Pe => share.pe,
            ScreenField::Pb => share.pb,
            ScreenField::GrossMargin => share.gross_margin,
            ScreenField::NetMargin => share.net_margin,
            ScreenField::EbitMargin => share.ebit_margin,
            ScreenField::EvEbit => share.ev_ebit,
            ScreenField::CurrentLiquidity => share.current_liquidity,
            ScreenField::NetDebtToEquity => share.net_debt_to_equity,
            ScreenField::Roe => share.roe,
            ScreenField::Roa => share.roa,
            ScreenField::Roic => share.roic,
            ScreenField::Cagr => share.cagr,
            ScreenField::Adtv => share.adtv,
            ScreenField::Bvps => share.bvps,
            ScreenField::Eps => share.eps,
            ScreenField::MarketCap => share.market_cap,
            ScreenField::Dps => share.dps,
            ScreenField::Payout => share.payout,
            ScreenField::ExpectedGrowth => share.expected_growth,
            ScreenField::AverageGrowth => share.average_growth,
            ScreenField::Peg => share.peg,
            ScreenField::FairPriceGraham => share.fair_price_graham,
            ScreenField::FairPriceBazin => share.fair_price_bazin,
            ScreenField::FairPriceGordon => share.fair_price_gordon,
            ScreenField::GrahamValuation => share.graham_valuation,
            ScreenField::BazinValuation => share.bazin_valuation,
            ScreenField::GordonValuation => share.gordon_valuation,
            ScreenField::CompositeRank => share.composite_rank.map(|r| r as f64),
        }
    }
}
