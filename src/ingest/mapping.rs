use serde::Deserialize;
use thiserror::Error;

/// Caller-supplied column mapping for the process-holdings step. Unknown
/// JSON keys are ignored rather than rejected; these two fields are the
/// whole contract.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMappingRequest {
    pub symbol_column_index: Option<usize>,
    pub name_column_index: Option<usize>,
}

/// Validated mapping. Indices are not bounds-checked against the header
/// count; rows too narrow for the symbol index are skipped downstream.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMapping {
    pub symbol_column_index: usize,
    pub name_column_index: Option<usize>,
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Symbol/Ticker column mapping is required")]
    MissingRequiredColumn,
}

impl ColumnMappingRequest {
    pub fn validate(self) -> Result<ColumnMapping, MappingError> {
        let symbol_column_index = self
            .symbol_column_index
            .ok_or(MappingError::MissingRequiredColumn)?;

        Ok(ColumnMapping {
            symbol_column_index,
            name_column_index: self.name_column_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_symbol_index_fails_regardless_of_name() {
        let req = ColumnMappingRequest {
            symbol_column_index: None,
            name_column_index: Some(1),
        };
        assert!(matches!(
            req.validate(),
            Err(MappingError::MissingRequiredColumn)
        ));

        let req = ColumnMappingRequest {
            symbol_column_index: None,
            name_column_index: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn out_of_range_indices_are_accepted() {
        let req = ColumnMappingRequest {
            symbol_column_index: Some(99),
            name_column_index: Some(100),
        };
        let mapping = req.validate().unwrap();
        assert_eq!(mapping.symbol_column_index, 99);
    }

    #[test]
    fn unknown_json_keys_are_ignored() {
        let req: ColumnMappingRequest = serde_json::from_str(
            r#"{"symbol_column_index": 0, "name_column_index": 1, "sectorColumn": 4}"#,
        )
        .unwrap();
        let mapping = req.validate().unwrap();
        assert_eq!(mapping.symbol_column_index, 0);
        assert_eq!(mapping.name_column_index, Some(1));
    }
}
