// src/process/mod.rs

//! Row processing: header resolution, type coercion and per-row metrics.

pub mod convert;
pub mod date_parser;
pub mod derive;
pub mod raw_table;
pub mod resolve;
pub mod utils;

pub use convert::{coerce_table, NormalizedTable, TypedColumns};
pub use derive::{derive_metrics, DerivedTable};
pub use raw_table::{RawTable, RawValue};
pub use resolve::{resolve_columns, ColumnMap};
