use rust_decimal::Decimal;
use std::str::FromStr;

use super::mapping::ColumnMapping;

/// A holding staged from one CSV row, ready for the transactional insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHolding {
    pub symbol: String,
    pub name: Option<String>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub market_value: Option<Decimal>,
    pub sector: Option<String>,
    pub validated: bool,
    pub validation_status: String,
}

/// Convert parsed rows plus a validated mapping into staged holdings.
///
/// Row handling, in file order:
/// - rows too short to contain the symbol cell are skipped;
/// - rows whose symbol cell trims to empty are skipped silently;
/// - the name column is used when mapped and in range;
/// - quantity/price/market_value are inferred from header text, not from the
///   explicit mapping (see [`infer_numeric_fields`]).
///
/// The staged count is exactly the `holdings_created` the caller reports.
pub fn stage_holdings(
    headers: &[String],
    rows: &[Vec<String>],
    mapping: &ColumnMapping,
) -> Vec<NewHolding> {
    let mut staged = Vec::new();

    for row in rows {
        if row.len() <= mapping.symbol_column_index {
            continue;
        }

        let symbol = row[mapping.symbol_column_index].trim();
        if symbol.is_empty() {
            continue;
        }

        let name = mapping
            .name_column_index
            .and_then(|idx| row.get(idx))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .map(|cell| cell.to_string());

        let (quantity, price, market_value) = infer_numeric_fields(headers, row);

        staged.push(NewHolding {
            symbol: symbol.to_uppercase(),
            name,
            quantity,
            price,
            market_value,
            sector: None,
            validated: false,
            validation_status: "pending".to_string(),
        });
    }

    staged
}

/// Heuristic numeric-field inference over header text (lower-cased):
/// - contains "quantity" or "shares"              -> quantity
/// - contains "price" but not "market"            -> price
/// - contains both "market" and "value"           -> market_value
///
/// The arms are exclusive per header, in that order. When several headers
/// match the same field, the last one in header order wins. Cells that are
/// empty or fail to parse leave the field as-is; nothing is reported.
fn infer_numeric_fields(
    headers: &[String],
    row: &[String],
) -> (Option<Decimal>, Option<Decimal>, Option<Decimal>) {
    let mut quantity = None;
    let mut price = None;
    let mut market_value = None;

    for (col_idx, header) in headers.iter().enumerate() {
        let cell = match row.get(col_idx) {
            Some(cell) if !cell.is_empty() => cell,
            _ => continue,
        };

        let header_lower = header.to_lowercase();
        if header_lower.contains("quantity") || header_lower.contains("shares") {
            if let Some(value) = parse_decimal(cell) {
                quantity = Some(value);
            }
        } else if header_lower.contains("price") && !header_lower.contains("market") {
            if let Some(value) = parse_decimal(cell) {
                price = Some(value);
            }
        } else if header_lower.contains("market") && header_lower.contains("value") {
            if let Some(value) = parse_decimal(cell) {
                market_value = Some(value);
            }
        }
    }

    (quantity, price, market_value)
}

/// Best-effort decimal parse tolerating thousands separators and the
/// currency symbols that show up in broker exports.
fn parse_decimal(cell: &str) -> Option<Decimal> {
    let clean: String = cell
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '£' | '€'))
        .collect();
    Decimal::from_str(clean.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn mapping(symbol: usize, name: Option<usize>) -> ColumnMapping {
        ColumnMapping {
            symbol_column_index: symbol,
            name_column_index: name,
        }
    }

    #[test]
    fn stages_one_holding_per_valid_row() {
        let headers = headers(&["Ticker", "Shares", "Price ($)", "Market Value"]);
        let rows = vec![row(&["AAPL", "10", "150.00", "1500.00"])];
        let staged = stage_holdings(&headers, &rows, &mapping(0, None));

        assert_eq!(staged.len(), 1);
        let h = &staged[0];
        assert_eq!(h.symbol, "AAPL");
        assert_eq!(h.quantity, Some(dec("10")));
        assert_eq!(h.price, Some(dec("150.00")));
        assert_eq!(h.market_value, Some(dec("1500.00")));
        assert!(!h.validated);
        assert_eq!(h.validation_status, "pending");
    }

    #[test]
    fn symbol_is_uppercased_and_trimmed() {
        let headers = headers(&["Ticker"]);
        let rows = vec![row(&["  aapl  "])];
        let staged = stage_holdings(&headers, &rows, &mapping(0, None));
        assert_eq!(staged[0].symbol, "AAPL");
    }

    #[test]
    fn empty_or_missing_symbol_cells_skip_the_row() {
        let headers = headers(&["Ticker", "Name"]);
        let rows = vec![
            row(&["", "Apple"]),
            row(&["   ", "Padded"]),
            row(&["MSFT", "Microsoft"]),
            row(&[]), // narrower than the symbol index
        ];
        let staged = stage_holdings(&headers, &rows, &mapping(0, Some(1)));
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].symbol, "MSFT");
        assert_eq!(staged[0].name.as_deref(), Some("Microsoft"));
    }

    #[test]
    fn name_out_of_range_is_none() {
        let headers = headers(&["Ticker"]);
        let rows = vec![row(&["AAPL"])];
        let staged = stage_holdings(&headers, &rows, &mapping(0, Some(5)));
        assert_eq!(staged[0].name, None);
    }

    #[test]
    fn market_price_populates_neither_price_nor_market_value() {
        // "Market Price" matches the "market" exclusion for price and lacks
        // "value", so nothing is assigned; "Market Value" is assigned.
        let headers = headers(&["Ticker", "Market Price", "Market Value"]);
        let rows = vec![row(&["AAPL", "150.00", "1500.00"])];
        let staged = stage_holdings(&headers, &rows, &mapping(0, None));
        assert_eq!(staged[0].price, None);
        assert_eq!(staged[0].market_value, Some(dec("1500.00")));
    }

    #[test]
    fn last_matching_header_wins() {
        let headers = headers(&["Ticker", "Quantity", "Shares Held"]);
        let rows = vec![row(&["AAPL", "10", "20"])];
        let staged = stage_holdings(&headers, &rows, &mapping(0, None));
        assert_eq!(staged[0].quantity, Some(dec("20")));
    }

    #[test]
    fn unparseable_numeric_cells_are_ignored() {
        let headers = headers(&["Ticker", "Quantity", "Price"]);
        let rows = vec![row(&["AAPL", "n/a", "150.00"])];
        let staged = stage_holdings(&headers, &rows, &mapping(0, None));
        assert_eq!(staged[0].quantity, None);
        assert_eq!(staged[0].price, Some(dec("150.00")));
    }

    #[test]
    fn currency_symbols_and_thousands_separators_parse() {
        assert_eq!(parse_decimal("$1,500.00"), Some(dec("1500.00")));
        assert_eq!(parse_decimal("£2,000"), Some(dec("2000")));
        assert_eq!(parse_decimal(" 42.5 "), Some(dec("42.5")));
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn staging_is_deterministic_for_repeat_runs() {
        let headers = headers(&["Ticker", "Shares"]);
        let rows = vec![row(&["AAPL", "10"]), row(&["MSFT", "20"])];
        let m = mapping(0, None);
        let first = stage_holdings(&headers, &rows, &m);
        let second = stage_holdings(&headers, &rows, &m);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
