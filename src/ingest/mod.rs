//! CSV ingestion pipeline: upload -> preview -> column mapping -> holdings.
//!
//! Pure stages (parse, map, stage) live here; the effectful edges are the
//! upload store and the transactional holdings replace in the database
//! layer.

pub mod mapping;
pub mod materialize;
pub mod parser;
pub mod store;

pub use mapping::{ColumnMapping, ColumnMappingRequest, MappingError};
pub use materialize::{stage_holdings, NewHolding};
pub use parser::{parse, ParseError, RawTable};
pub use store::{file_extension, is_allowed_file, StoreError, UploadStore};
