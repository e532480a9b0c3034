//! End-to-end exercise of the CSV ingestion pipeline: raw bytes through the
//! parser, a column mapping from the client, and staged holdings out the
//! other side. No server or database required.

use std::str::FromStr;

use anyhow::Result;
use rust_decimal::Decimal;
use uuid::Uuid;

use scout_portfolio_api::ingest::{
    self, file_extension, is_allowed_file, ColumnMappingRequest, UploadStore,
};

const BROKER_EXPORT: &[u8] = b"\
Ticker,Name,Shares,Price ($),Market Value
AAPL,Apple Inc.,10,150.00,1500.00
msft,Microsoft Corp,5,300.00,1500.00
,Empty Symbol Row,1,1.00,1.00
GOOG,Alphabet";

fn mapping(symbol: usize, name: Option<usize>) -> ingest::ColumnMapping {
    ColumnMappingRequest {
        symbol_column_index: Some(symbol),
        name_column_index: name,
    }
    .validate()
    .unwrap()
}

#[test]
fn upload_preview_then_process() -> Result<()> {
    let table = ingest::parse(BROKER_EXPORT, &file_extension("positions.csv"))?;

    // Preview is what the upload endpoint returns for mapping selection
    assert_eq!(
        table.headers,
        vec!["Ticker", "Name", "Shares", "Price ($)", "Market Value"]
    );
    assert_eq!(table.total_rows(), 4);
    assert_eq!(table.preview(10).len(), 4);
    assert_eq!(table.preview(2).len(), 2);

    // Process step re-parses and stages with the chosen mapping
    let staged = ingest::stage_holdings(&table.headers, &table.rows, &mapping(0, Some(1)));

    // Empty-symbol row is dropped; the ragged GOOG row survives with no numbers
    assert_eq!(staged.len(), 3);

    assert_eq!(staged[0].symbol, "AAPL");
    assert_eq!(staged[0].name.as_deref(), Some("Apple Inc."));
    assert_eq!(staged[0].quantity, Some(Decimal::from_str("10")?));
    assert_eq!(staged[0].price, Some(Decimal::from_str("150.00")?));
    assert_eq!(staged[0].market_value, Some(Decimal::from_str("1500.00")?));
    assert!(!staged[0].validated);
    assert_eq!(staged[0].validation_status, "pending");

    // Symbols are normalized to uppercase
    assert_eq!(staged[1].symbol, "MSFT");

    assert_eq!(staged[2].symbol, "GOOG");
    assert_eq!(staged[2].quantity, None);
    assert_eq!(staged[2].price, None);
    assert_eq!(staged[2].market_value, None);

    Ok(())
}

#[test]
fn semicolon_export_is_sniffed() -> Result<()> {
    let bytes = b"Symbol;Quantity;Price\nVOD.L;100;1.23\nBP.L;50;4.56\n";
    let table = ingest::parse(bytes, ".csv")?;

    assert_eq!(table.headers, vec!["Symbol", "Quantity", "Price"]);

    let staged = ingest::stage_holdings(&table.headers, &table.rows, &mapping(0, None));
    assert_eq!(staged.len(), 2);
    assert_eq!(staged[0].symbol, "VOD.L");
    assert_eq!(staged[0].name, None);
    assert_eq!(staged[0].quantity, Some(Decimal::from_str("100")?));

    Ok(())
}

#[test]
fn currency_symbols_and_thousands_separators_are_stripped() -> Result<()> {
    let bytes = b"Ticker,Shares,Market Value\nBRK.B,\"1,000\",\"$450,000.00\"\n";
    let table = ingest::parse(bytes, ".csv")?;

    let staged = ingest::stage_holdings(&table.headers, &table.rows, &mapping(0, None));
    assert_eq!(staged[0].quantity, Some(Decimal::from_str("1000")?));
    assert_eq!(
        staged[0].market_value,
        Some(Decimal::from_str("450000.00")?)
    );

    Ok(())
}

#[test]
fn mapping_without_symbol_column_is_rejected() {
    let req = ColumnMappingRequest {
        symbol_column_index: None,
        name_column_index: Some(1),
    };
    assert!(req.validate().is_err());
}

#[test]
fn excel_files_pass_the_filter_but_fail_the_parser() {
    // The filename filter accepts spreadsheets; the parser does not read them
    assert!(is_allowed_file("holdings.xlsx"));
    assert!(is_allowed_file("holdings.XLS"));
    assert!(!is_allowed_file("holdings.txt"));

    let err = ingest::parse(b"not a real workbook", ".xlsx");
    assert!(err.is_err());
}

#[tokio::test]
async fn stored_upload_round_trips_through_the_store() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = UploadStore::new(dir.path());
    let portfolio_id = Uuid::new_v4();

    let stored_path = store
        .store(portfolio_id, "positions.csv", BROKER_EXPORT)
        .await?;

    let bytes = store.retrieve(&stored_path).await?;
    let table = ingest::parse(&bytes, &file_extension(&stored_path))?;
    assert_eq!(table.total_rows(), 4);

    store.remove(&stored_path).await;
    assert!(store.retrieve(&stored_path).await.is_err());

    Ok(())
}
