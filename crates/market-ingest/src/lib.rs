//! CSV ingest for fundamentals snapshots, position exports and trade logs.
//!
//! Market snapshots come out of the screener site as semicolon-separated
//! files with comma decimal marks and occasional quoted cells. Columns are
//! located by header name, so column order never matters. Rows that cannot
//! produce a ticker and a price are skipped with a warning, everything else
//! degrades field by field to "unknown".

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use radar_core::RawIndicators;
use tracing::{debug, warn};

/// Percentage columns arrive as whole numbers ("5,32" meaning 5.32%).
const PERCENT: f64 = 100.0;
/// Average daily traded volume arrives in plain currency units.
const MILLIONS: f64 = 1_000_000.0;
/// Market cap likewise.
const BILLIONS: f64 = 1_000_000_000.0;

/// Reads and parses a market snapshot file.
pub fn read_market_csv(path: impl AsRef<Path>) -> Result<Vec<RawIndicators>> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading market snapshot {}", path.display()))?;
    parse_market_csv(&data)
}

/// Parses a semicolon-separated market snapshot into raw indicator records.
pub fn parse_market_csv(data: &str) -> Result<Vec<RawIndicators>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = header_index(reader.headers().context("market snapshot has no header row")?);
    for required in ["TICKER", "PRECO"] {
        if !headers.contains_key(required) {
            bail!("market snapshot is missing the {required} column");
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.records() {
        let row = row?;
        let cell = |name: &str| headers.get(name).and_then(|&idx| row.get(idx));
        let field = |name: &str, divisor: f64| cell(name).and_then(|raw| parse_field(raw, divisor));

        let ticker = cell("TICKER")
            .map(|t| t.trim().trim_matches('"').to_uppercase())
            .unwrap_or_default();
        if ticker.is_empty() {
            skipped += 1;
            continue;
        }
        // A record is only as good as its ticker and price; everything else
        // may be unknown.
        let Some(price) = field("PRECO", 1.0).filter(|p| *p > 0.0) else {
            warn!(ticker, "skipping row without a positive price");
            skipped += 1;
            continue;
        };

        records.push(RawIndicators {
            ticker,
            price,
            dy: field("DY", PERCENT),
            pe: field("P/L", 1.0),
            pb: field("P/VP", 1.0),
            gross_margin: field("MARGEM BRUTA", PERCENT),
            net_margin: field("MARG. LIQUIDA", PERCENT),
            ebit_margin: field("MARGEM EBIT", PERCENT),
            ev_ebit: field("EV/EBIT", 1.0),
            current_liquidity: field("LIQ. CORRENTE", 1.0),
            net_debt_to_equity: field("DIV. LIQ. / PATRI.", 1.0),
            roe: field("ROE", PERCENT),
            // ROA arrives pre-scaled in these exports.
            roa: field("ROA", 1.0),
            roic: field("ROIC", PERCENT),
            cagr: field("CAGR LUCROS 5 ANOS", PERCENT),
            adtv: field("LIQUIDEZ MEDIA DIARIA", MILLIONS),
            bvps: field("VPA", 1.0),
            eps: field("LPA", 1.0),
            market_cap: field("VALOR DE MERCADO", BILLIONS),
        });
    }

    if skipped > 0 {
        warn!(
            "skipped {} of {} snapshot rows",
            skipped,
            records.len() + skipped
        );
    }
    debug!("parsed {} market records", records.len());
    Ok(records)
}

/// One row of a positions export.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRow {
    pub ticker: String,
    pub mean_price: f64,
    pub quantity: u32,
}

/// Reads and parses a positions export file.
pub fn read_positions_csv(path: impl AsRef<Path>) -> Result<Vec<PositionRow>> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading positions file {}", path.display()))?;
    parse_positions_csv(&data)
}

/// Parses a comma-separated positions export.
/// Expected columns: TICKER, PRECO MEDIO, QTD.
pub fn parse_positions_csv(data: &str) -> Result<Vec<PositionRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = header_index(reader.headers().context("positions file has no header row")?);
    for required in ["TICKER", "PRECO MEDIO", "QTD"] {
        if !headers.contains_key(required) {
            bail!("positions file is missing the {required} column");
        }
    }

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |name: &str| headers.get(name).and_then(|&idx| row.get(idx));

        let ticker = cell("TICKER")
            .map(|t| t.trim().to_uppercase())
            .unwrap_or_default();
        let mean_price = cell("PRECO MEDIO").and_then(|raw| parse_field(raw, 1.0));
        let quantity = cell("QTD").and_then(|raw| parse_field(raw, 1.0));

        let (Some(mean_price), Some(quantity)) = (mean_price, quantity) else {
            warn!(ticker, "skipping position row with unparseable numbers");
            continue;
        };
        if ticker.is_empty() || mean_price <= 0.0 || quantity < 1.0 {
            warn!(ticker, "skipping position row with invalid values");
            continue;
        }

        rows.push(PositionRow {
            ticker,
            mean_price,
            // Fractional quantities truncate to whole shares.
            quantity: quantity as u32,
        });
    }

    Ok(rows)
}

/// One row of a TradeMap transactions export.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub ticker: String,
    pub operation: String,
    pub quantity: u32,
    pub price: f64,
}

/// Reads and parses a transactions export file.
pub fn read_transactions_csv(path: impl AsRef<Path>) -> Result<Vec<TransactionRow>> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading transactions file {}", path.display()))?;
    parse_transactions_csv(&data)
}

/// Parses a semicolon-separated trade log, one executed trade per row.
/// Expected columns: ATIVO, OPERAÇÃO, QUANTIDADE, PREÇO. Operation labels
/// pass through as written and are not interpreted here.
pub fn parse_transactions_csv(data: &str) -> Result<Vec<TransactionRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = header_index(reader.headers().context("transactions file has no header row")?);
    for required in ["ATIVO", "OPERAÇÃO", "QUANTIDADE", "PREÇO"] {
        if !headers.contains_key(required) {
            bail!("transactions file is missing the {required} column");
        }
    }

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |name: &str| headers.get(name).and_then(|&idx| row.get(idx));

        let ticker = cell("ATIVO")
            .map(|t| t.trim().to_uppercase())
            .unwrap_or_default();
        let operation = cell("OPERAÇÃO").map(str::trim).unwrap_or_default();
        let quantity = cell("QUANTIDADE").and_then(|raw| parse_field(raw, 1.0));
        let price = cell("PREÇO").and_then(|raw| parse_field(raw, 1.0));

        let (Some(quantity), Some(price)) = (quantity, price) else {
            warn!(ticker, "skipping transaction row with unparseable numbers");
            continue;
        };
        if ticker.is_empty() || price <= 0.0 || quantity < 1.0 {
            warn!(ticker, "skipping transaction row with invalid values");
            continue;
        }

        rows.push(TransactionRow {
            ticker,
            operation: operation.to_string(),
            // Fractional quantities truncate to whole shares.
            quantity: quantity as u32,
            price,
        });
    }

    Ok(rows)
}

fn header_index(headers: &csv::StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().trim_matches('"').to_uppercase(), idx))
        .collect()
}

/// Parses one numeric cell: trims whitespace and quotes, converts the comma
/// decimal mark, scales down by `divisor`. Unparseable cells are unknown.
fn parse_field(raw: &str, divisor: f64) -> Option<f64> {
    let cleaned = raw.trim().trim_matches('"').trim().replace(',', ".");
    cleaned.parse::<f64>().ok().map(|value| value / divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SNAPSHOT: &str = "\
TICKER;PRECO;DY;P/L;P/VP;MARGEM BRUTA;MARG. LIQUIDA;MARGEM EBIT;EV/EBIT;LIQ. CORRENTE;DIV. LIQ. / PATRI.;ROE;ROA;ROIC;CAGR LUCROS 5 ANOS;LIQUIDEZ MEDIA DIARIA;VPA;LPA;VALOR DE MERCADO
AAAA3;10,50;5,32;8,40;1,20;45,00;12,30;18,00;6,50;1,80;0,45;15,20;4,50;11,00;9,80;12345678,00;8,75;\"2,50\";12345678900,00
BBBB3;25,00;;;;;;;;;;;;;;;;;
";

    #[test]
    fn test_parses_snapshot_with_comma_decimals() {
        let records = parse_market_csv(SNAPSHOT).unwrap();
        assert_eq!(records.len(), 2);

        let share = &records[0];
        assert_eq!(share.ticker, "AAAA3");
        assert_relative_eq!(share.price, 10.5);
        assert_relative_eq!(share.dy.unwrap(), 0.0532, epsilon = 1e-9);
        assert_relative_eq!(share.pe.unwrap(), 8.4);
        assert_relative_eq!(share.roe.unwrap(), 0.152, epsilon = 1e-9);
        // ROA keeps the export's own scale
        assert_relative_eq!(share.roa.unwrap(), 4.5);
        assert_relative_eq!(share.adtv.unwrap(), 12.345678, epsilon = 1e-9);
        assert_relative_eq!(share.market_cap.unwrap(), 12.3456789, epsilon = 1e-9);
        // Quoted cells parse like plain ones
        assert_relative_eq!(share.eps.unwrap(), 2.5);
    }

    #[test]
    fn test_empty_cells_become_unknown() {
        let records = parse_market_csv(SNAPSHOT).unwrap();

        let bare = &records[1];
        assert_eq!(bare.ticker, "BBBB3");
        assert_relative_eq!(bare.price, 25.0);
        assert_eq!(bare.dy, None);
        assert_eq!(bare.eps, None);
        assert_eq!(bare.market_cap, None);
    }

    #[test]
    fn test_header_order_does_not_matter() {
        let data = "\
PRECO;LPA;TICKER
10,00;2,00;cccc3
";
        let records = parse_market_csv(data).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticker, "CCCC3");
        assert_relative_eq!(records[0].price, 10.0);
        assert_relative_eq!(records[0].eps.unwrap(), 2.0);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let data = "\
TICKER;PRECO;DY
AAAA3;10,00;5,00
;12,00;4,00
BBBB3;n/a;4,00
CCCC3;8,00;3,00
";
        let records = parse_market_csv(data).unwrap();

        let tickers: Vec<&str> = records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAAA3", "CCCC3"]);
    }

    #[test]
    fn test_short_rows_lose_only_their_tail() {
        let data = "\
TICKER;PRECO;DY;P/L
AAAA3;10,00
";
        let records = parse_market_csv(data).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dy, None);
        assert_eq!(records[0].pe, None);
    }

    #[test]
    fn test_non_positive_prices_are_malformed() {
        let data = "\
TICKER;PRECO
AAAA3;0,00
BBBB3;-1,50
CCCC3;2,00
";
        let records = parse_market_csv(data).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticker, "CCCC3");
    }

    #[test]
    fn test_missing_required_column_fails() {
        let result = parse_market_csv("TICKER;DY\nAAAA3;5,00\n");

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PRECO"));
    }

    #[test]
    fn test_parses_positions_export() {
        let data = "\
TICKER,PRECO MEDIO,QTD
aaaa3,\"10,50\",100
BBBB3,\"8,20\",\"50,9\"
";
        let rows = parse_positions_csv(data).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ticker, "AAAA3");
        assert_relative_eq!(rows[0].mean_price, 10.5);
        assert_eq!(rows[0].quantity, 100);
        // Fractional quantities truncate
        assert_eq!(rows[1].quantity, 50);
    }

    #[test]
    fn test_invalid_position_rows_are_skipped() {
        let data = "\
TICKER,PRECO MEDIO,QTD
AAAA3,\"10,50\",0
BBBB3,abc,10
CCCC3,\"5,00\",10
";
        let rows = parse_positions_csv(data).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker, "CCCC3");
    }

    #[test]
    fn test_positions_missing_column_fails() {
        assert!(parse_positions_csv("TICKER,QTD\nAAAA3,10\n").is_err());
    }

    #[test]
    fn test_parses_transactions_export() {
        let data = "\
ATIVO;OPERAÇÃO;QUANTIDADE;PREÇO
aaaa3;COMPRA;100;\"10,50\"
AAAA3;Venda;\"40,7\";12,00
";
        let rows = parse_transactions_csv(data).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ticker, "AAAA3");
        assert_eq!(rows[0].operation, "COMPRA");
        assert_eq!(rows[0].quantity, 100);
        assert_relative_eq!(rows[0].price, 10.5);
        // Labels keep their spelling, quantities truncate
        assert_eq!(rows[1].operation, "Venda");
        assert_eq!(rows[1].quantity, 40);
        assert_relative_eq!(rows[1].price, 12.0);
    }

    #[test]
    fn test_invalid_transaction_rows_are_skipped() {
        let data = "\
ATIVO;OPERAÇÃO;QUANTIDADE;PREÇO
AAAA3;COMPRA;0;10,00
;COMPRA;10;10,00
BBBB3;COMPRA;10;abc
CCCC3;COMPRA;10;\"0,00\"
DDDD3;VENDA;5;9,00
";
        let rows = parse_transactions_csv(data).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker, "DDDD3");
    }

    #[test]
    fn test_transactions_missing_column_fails() {
        let result = parse_transactions_csv("ATIVO;QUANTIDADE;PREÇO\nAAAA3;10;9,00\n");

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("OPERAÇÃO"));
    }
}
