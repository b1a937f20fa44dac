//! Typed records to and from spreadsheet rows.
//!
//! A record declares its fields once, with `#[derive(Record)]`; sheetrow
//! resolves the participating fields (optionally walking embedded parent
//! records), substitutes defaults for empty cells and converts every field
//! between its Rust type and cell text.
//!
//! ```ignore
//! use sheetrow::Record;
//!
//! #[derive(Debug, Default, Record)]
//! struct Product {
//!     id: i64,
//!     #[column(name = "Product Name")]
//!     name: String,
//!     #[column(default = "0.0")]
//!     price: f64,
//!     #[datetime(pattern = "yyyy/MM/dd")]
//!     released: Option<chrono::NaiveDate>,
//! }
//!
//! let product = Product::from_row(&["1", "Widget", "", "2024/03/07"])?;
//! let row = product.to_row()?;
//! ```

pub mod cache;
pub mod coerce;
pub mod mapper;
pub mod overlay;
pub mod pattern;
pub mod resolver;
pub mod schema;

pub use sheetrow_common::*;
pub use sheetrow_macros::Record;

pub use cache::fields_of;
pub use mapper::{AsCell, RecordMapper};
pub use overlay::{FieldOverlay, OverlayError, SchemaOverlay};
pub use pattern::{PatternError, TemporalPattern};
pub use schema::{
    ColumnMeta, FieldDef, FieldDescriptor, FieldInclusionPolicy, FieldKey, FieldMeta, Record,
    RecordType,
};

pub use bigdecimal;
pub use chrono;
pub use num_bigint;
