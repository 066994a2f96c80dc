//! SPIA distribution reading.
//!
//! Opens the distribution archive, extracts each reference set workbook and
//! parses its sheet into validated [`RefsetEntry`](spia_model::RefsetEntry)
//! values, enriched with terminology server displays.

pub mod cells;
pub mod distribution;
pub mod error;
pub mod flags;
pub mod layout;
pub mod parser;
pub mod sheet;

pub use distribution::{Distribution, DistributionLayout, sha256_hex};
pub use error::{DistributionError, IngestError, Result};
pub use flags::FlagVocabulary;
pub use layout::{CodeCell, CodeColumn, FieldColumns, HEADER_ROW, SheetLayout};
pub use parser::{ParseContext, ParsedRefset, ParserState, RefsetParser, read_all, read_refset};
pub use sheet::{Cell, Sheet, load_sheet};
