//! radar-cli: derive valuations from a fundamentals snapshot and screen them.
//!
//! Usage:
//!   cargo run -p radar-cli -- --csv snapshot.csv
//!   cargo run -p radar-cli -- --csv snapshot.csv --params screens.json
//!   cargo run -p radar-cli -- --csv snapshot.csv --ticker WEGE3
//!   cargo run -p radar-cli -- --csv snapshot.csv --portfolio positions.csv
//!   cargo run -p radar-cli -- --csv snapshot.csv --transactions trades.csv

use std::fs;

use anyhow::{bail, Context, Result};
use portfolio_ledger::Portfolio;
use radar_core::ShareValuation;
use screening_engine::{Criterion, ScreenRequest, SortSpec, TickerScope, Universe};
use serde::Deserialize;
use valuation_engine::MarketRisk;

/// Rows shown by the default screen.
const DEFAULT_TOP: usize = 20;

/// A screens file: shared base criteria plus one entry per named screen.
/// With `union` set, each screen prints the running union of everything
/// matched so far instead of its own matches alone.
#[derive(Debug, Deserialize)]
struct ParamsFile {
    #[serde(default)]
    base: Vec<Criterion>,
    #[serde(default)]
    union: bool,
    screens: Vec<NamedScreen>,
}

#[derive(Debug, Deserialize)]
struct NamedScreen {
    name: String,
    #[serde(default)]
    filters: Vec<Criterion>,
    #[serde(default)]
    sort_by: Option<SortSpec>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    scope: TickerScope,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "radar_cli=info,screening_engine=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let Some(csv_path) = flag_value(&args, "--csv") else {
        eprintln!("Usage:");
        eprintln!("  radar-cli --csv SNAPSHOT.csv                      Top shares by Graham upside");
        eprintln!("  radar-cli --csv SNAPSHOT.csv --params FILE.json   Run the screens in FILE");
        eprintln!("  radar-cli --csv SNAPSHOT.csv --ticker WEGE3       One share in detail");
        eprintln!("  radar-cli --csv SNAPSHOT.csv --portfolio POS.csv  Positions report");
        eprintln!("  radar-cli --csv SNAPSHOT.csv --transactions T.csv Portfolio from a trade log");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --market-risk X    Gordon discount scalar (default: env MARKET_RISK or 0.15)");
        eprintln!("  --top N            Rows in the default screen (default: {DEFAULT_TOP})");
        std::process::exit(1);
    };

    let market_risk = flag_value(&args, "--market-risk")
        .and_then(|v| v.parse().ok())
        .or_else(|| {
            std::env::var("MARKET_RISK")
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .map(MarketRisk::new)
        .transpose()?
        .unwrap_or_default();

    let top: usize = flag_value(&args, "--top")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TOP);

    let records = market_ingest::read_market_csv(csv_path)?;
    tracing::info!("loaded {} shares from {}", records.len(), csv_path);
    let universe = Universe::from_raw(&records, market_risk);

    if let Some(ticker) = flag_value(&args, "--ticker") {
        return print_share_detail(&universe, ticker);
    }
    if let Some(path) = flag_value(&args, "--portfolio") {
        return print_portfolio_report(&universe, path);
    }
    if let Some(path) = flag_value(&args, "--transactions") {
        return print_transactions_report(&universe, path);
    }
    if let Some(path) = flag_value(&args, "--params") {
        return run_params_file(&universe, path);
    }

    let request = ScreenRequest {
        limit: top,
        ..Default::default()
    };
    print_screen("top graham upside", &universe.screen(&request));
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn run_params_file(universe: &Universe, path: &str) -> Result<()> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading screen parameters {path}"))?;
    let params: ParamsFile =
        serde_json::from_str(&data).with_context(|| format!("parsing screen parameters {path}"))?;

    let mut cumulative: Vec<ShareValuation> = Vec::new();
    for screen in &params.screens {
        let mut criteria = params.base.clone();
        criteria.extend(screen.filters.iter().cloned());

        let mut request = ScreenRequest {
            criteria,
            scope: screen.scope.clone(),
            ..Default::default()
        };
        if let Some(sort_by) = screen.sort_by.clone() {
            request.sort_by = sort_by;
        }
        if let Some(limit) = screen.limit {
            request.limit = limit;
        }

        let picked = universe.screen(&request);
        if params.union {
            merge_new(&mut cumulative, picked);
            print_screen(&screen.name, &cumulative);
        } else {
            print_screen(&screen.name, &picked);
        }
    }
    Ok(())
}

/// Appends the shares not seen in an earlier screen, keeping first-seen
/// order across the whole run.
fn merge_new(cumulative: &mut Vec<ShareValuation>, picked: Vec<ShareValuation>) {
    for share in picked {
        if cumulative.iter().all(|seen| seen.ticker != share.ticker) {
            cumulative.push(share);
        }
    }
}

fn print_screen(name: &str, shares: &[ShareValuation]) {
    println!("\n*** {} ***\n", name.to_uppercase());
    println!(
        "{:<8} {:>9} {:>6} {:>9} {:>9} {:>9} {:>8} {:>8}",
        "TICKER", "PRICE", "RANK", "GRAHAM", "BAZIN", "GORDON", "GROWTH", "DY"
    );
    for share in shares {
        println!(
            "{:<8} {:>9.2} {:>6} {:>9} {:>9} {:>9} {:>8} {:>8}",
            share.ticker,
            share.price,
            share
                .composite_rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            fmt_opt(share.graham_valuation),
            fmt_opt(share.bazin_valuation),
            fmt_opt(share.gordon_valuation),
            fmt_opt(share.average_growth),
            fmt_opt(share.dy),
        );
    }
    println!("\n{} shares", shares.len());
}

fn print_share_detail(universe: &Universe, ticker: &str) -> Result<()> {
    let Some(share) = universe.get(ticker) else {
        bail!("ticker {} not found in the snapshot", ticker.to_uppercase());
    };

    println!("\n>>> {}", share.ticker);
    println!("> General");
    println!(
        "  price {:>9.2}   dy {:>9}   pe {:>9}   pb {:>9}",
        share.price,
        fmt_opt(share.dy),
        fmt_opt(share.pe),
        fmt_opt(share.pb)
    );
    println!(
        "  eps {:>11}   bvps {:>7}   roe {:>8}   roic {:>7}",
        fmt_opt(share.eps),
        fmt_opt(share.bvps),
        fmt_opt(share.roe),
        fmt_opt(share.roic)
    );
    println!("> Fair prices");
    println!(
        "  graham {:>8}   bazin {:>6}   gordon {:>5}",
        fmt_opt(share.fair_price_graham),
        fmt_opt(share.fair_price_bazin),
        fmt_opt(share.fair_price_gordon)
    );
    println!("> Valuations");
    println!(
        "  graham {:>8}   bazin {:>6}   gordon {:>5}",
        fmt_opt(share.graham_valuation),
        fmt_opt(share.bazin_valuation),
        fmt_opt(share.gordon_valuation)
    );
    println!("> Growth");
    println!(
        "  dps {:>11}   payout {:>5}   expected {:>3}   average {:>4}   peg {:>8}",
        fmt_opt(share.dps),
        fmt_opt(share.payout),
        fmt_opt(share.expected_growth),
        fmt_opt(share.average_growth),
        fmt_opt(share.peg)
    );
    println!("> Composite rank");
    println!(
        "  {}",
        share
            .composite_rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unranked".to_string())
    );
    Ok(())
}

fn print_portfolio_report(universe: &Universe, path: &str) -> Result<()> {
    let rows = market_ingest::read_positions_csv(path)?;
    let mut portfolio = Portfolio::from_rows(universe, &rows)?;
    portfolio.prune();
    print_portfolio(&portfolio);
    Ok(())
}

fn print_transactions_report(universe: &Universe, path: &str) -> Result<()> {
    let rows = market_ingest::read_transactions_csv(path)?;
    let portfolio = Portfolio::from_transactions(universe, &rows);
    print_portfolio(&portfolio);
    Ok(())
}

fn print_portfolio(portfolio: &Portfolio) {
    println!("\n*** PORTFOLIO ***\n");
    println!(
        "{:<8} {:>6} {:>10} {:>10} {:>9} {:>8} {:>9}",
        "TICKER", "QTY", "MEAN", "PRICE", "RETURN", "WEIGHT", "GRAHAM"
    );
    for holding in portfolio.holdings() {
        let ticker = &holding.valuation.ticker;
        println!(
            "{:<8} {:>6} {:>10.2} {:>10.2} {:>9.4} {:>8} {:>9}",
            ticker,
            holding.quantity,
            holding.mean_price,
            holding.valuation.price,
            holding.return_on_investment(),
            portfolio
                .position_weight(ticker)
                .map(|w| format!("{w:.2}"))
                .unwrap_or_else(|| "-".to_string()),
            fmt_opt(holding.valuation.graham_valuation),
        );
    }
    println!();
    println!(
        "invested {:.2}   equity {:.2}   return {}",
        portfolio.total_invested(),
        portfolio.equity(),
        fmt_opt(portfolio.return_on_investment())
    );
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "-".to_string())
}
