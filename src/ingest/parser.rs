use thiserror::Error;

/// Parsed tabular data: the first row of the file becomes `headers`, the
/// remainder become `rows` in file order. Rows are allowed to be narrower or
/// wider than the header row; nothing is discarded at this stage.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// Truncated view used to build the upload preview response
    pub fn preview(&self, limit: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(limit)]
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported file format: {0}. Only CSV files are supported for now.")]
    UnsupportedFormat(String),

    #[error("File is not valid UTF-8: {0}")]
    DecodingError(#[from] std::str::Utf8Error),

    #[error("CSV file is empty")]
    EmptyInput,

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),
}

const SNIFF_WINDOW: usize = 1024;
const DELIMITER_CANDIDATES: [u8; 3] = [b',', b';', b'\t'];

/// Parse uploaded bytes into a [`RawTable`].
///
/// Only `.csv` is parseable; the upload filename filter also lets Excel
/// extensions through, which fail here with [`ParseError::UnsupportedFormat`].
pub fn parse(bytes: &[u8], extension: &str) -> Result<RawTable, ParseError> {
    if extension != ".csv" {
        return Err(ParseError::UnsupportedFormat(extension.to_string()));
    }

    let text = std::str::from_utf8(bytes)?;
    let delimiter = sniff_delimiter(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    if records.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut iter = records.into_iter();
    let headers = iter.next().unwrap_or_default();
    let rows = iter.collect();

    Ok(RawTable { headers, rows })
}

/// Pick the delimiter by counting candidate bytes in the first 1 KiB.
/// A unique maximum wins; zero hits or a tie falls back to comma.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];

    let mut best = b',';
    let mut best_count = 0usize;
    let mut tied = false;

    for &candidate in &DELIMITER_CANDIDATES {
        let count = window.iter().filter(|&&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
            tied = false;
        } else if count == best_count && count > 0 {
            tied = true;
        }
    }

    if best_count == 0 || tied {
        b','
    } else {
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_csv() {
        let data = b"Ticker,Name\nAAPL,Apple\nMSFT,Microsoft\n";
        let table = parse(data, ".csv").unwrap();
        assert_eq!(table.headers, vec!["Ticker", "Name"]);
        assert_eq!(table.total_rows(), 2);
        assert_eq!(table.rows[0], vec!["AAPL", "Apple"]);
    }

    #[test]
    fn sniffs_semicolon_and_tab() {
        let semi = b"Ticker;Name\nAAPL;Apple\n";
        let table = parse(semi, ".csv").unwrap();
        assert_eq!(table.headers, vec!["Ticker", "Name"]);

        let tab = b"Ticker\tName\nAAPL\tApple\n";
        let table = parse(tab, ".csv").unwrap();
        assert_eq!(table.rows[0], vec!["AAPL", "Apple"]);
    }

    #[test]
    fn ambiguous_sniff_defaults_to_comma() {
        // One semicolon and one tab apiece: tie, so comma wins and the
        // single-column rows come back whole.
        let data = b"a;b\tc\nx;y\tz\n";
        let table = parse(data, ".csv").unwrap();
        assert_eq!(table.headers.len(), 1);
    }

    #[test]
    fn ragged_rows_are_kept() {
        let data = b"a,b,c\n1,2\n1,2,3,4\n";
        let table = parse(data, ".csv").unwrap();
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[1].len(), 4);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(parse(b"", ".csv"), Err(ParseError::EmptyInput)));
    }

    #[test]
    fn header_only_file_has_zero_rows() {
        let table = parse(b"Ticker,Name\n", ".csv").unwrap();
        assert_eq!(table.total_rows(), 0);
    }

    #[test]
    fn excel_extensions_are_rejected_at_parse_time() {
        // The upload filter lets these through; the parser does not.
        assert!(matches!(
            parse(b"whatever", ".xlsx"),
            Err(ParseError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            parse(b"whatever", ".xls"),
            Err(ParseError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn invalid_utf8_is_a_decoding_error() {
        assert!(matches!(
            parse(&[0xff, 0xfe, b'a'], ".csv"),
            Err(ParseError::DecodingError(_))
        ));
    }

    #[test]
    fn total_rows_reflects_full_parse_not_preview() {
        let mut data = String::from("Ticker\n");
        for i in 0..25 {
            data.push_str(&format!("SYM{}\n", i));
        }
        let table = parse(data.as_bytes(), ".csv").unwrap();
        assert_eq!(table.total_rows(), 25);
        assert_eq!(table.preview(10).len(), 10);
    }
}
