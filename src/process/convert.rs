use crate::config::PipelineOptions;
use crate::process::raw_table::{RawTable, RawValue};
use crate::process::resolve::ColumnMap;
use crate::process::{date_parser, utils};
use crate::schema::{build_arrow_schema, Field, FieldKind, FieldSpec, CANONICAL_SCHEMA};
use anyhow::{Context, Result};
use arrow::{
    array::{
        ArrayRef, AsArray, Date32Array, Date32Builder, Float64Array, Float64Builder, StringArray,
        StringBuilder,
    },
    datatypes::{Date32Type, Float64Type},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

/// Typed, per-field access to a batch laid out in canonical field order.
pub trait TypedColumns {
    fn batch(&self) -> &RecordBatch;
    fn column_map(&self) -> &ColumnMap;

    fn num_rows(&self) -> usize {
        self.batch().num_rows()
    }

    /// Whether the source table carried a column for `field`.
    fn is_present(&self, field: Field) -> bool {
        self.column_map().is_present(field)
    }

    fn number(&self, field: Field) -> &Float64Array {
        self.batch().column(field.index()).as_primitive::<Float64Type>()
    }

    fn date(&self, field: Field) -> &Date32Array {
        self.batch().column(field.index()).as_primitive::<Date32Type>()
    }

    fn text(&self, field: Field) -> &StringArray {
        self.batch().column(field.index()).as_string::<i32>()
    }
}

/// Output of type coercion: every canonical field present as a typed column,
/// absent source columns included (all-null or all-default).
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    batch: RecordBatch,
    columns: ColumnMap,
}

impl TypedColumns for NormalizedTable {
    fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    fn column_map(&self) -> &ColumnMap {
        &self.columns
    }
}

impl NormalizedTable {
    pub fn into_parts(self) -> (RecordBatch, ColumnMap) {
        (self.batch, self.columns)
    }
}

pub fn coerce_number(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Number(v) => Some(*v).filter(|v| v.is_finite()),
        RawValue::Text(s) => utils::parse_number(s),
        RawValue::Blank | RawValue::Date(_) => None,
    }
}

pub fn coerce_date(value: &RawValue) -> Option<NaiveDate> {
    match value {
        RawValue::Date(d) => Some(*d),
        RawValue::Text(s) => date_parser::parse_date(s),
        RawValue::Blank | RawValue::Number(_) => None,
    }
}

pub fn coerce_text(value: &RawValue) -> Option<String> {
    match value {
        RawValue::Blank => None,
        RawValue::Text(s) if s.trim().is_empty() => None,
        RawValue::Text(s) => Some(s.clone()),
        RawValue::Number(v) if v.is_finite() => Some(v.to_string()),
        RawValue::Number(_) => None,
        RawValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
    }
}

/// Scenario labels: anything that reads as "no value" takes the default.
pub fn coerce_label(value: &RawValue, default_label: &str) -> String {
    coerce_text(value)
        .filter(|s| !utils::is_missing_text(s))
        .unwrap_or_else(|| default_label.to_string())
}

/// Build one typed column. Returns the column and how many non-blank cells
/// failed to parse.
fn coerce_column(
    table: &RawTable,
    source: Option<usize>,
    spec: &FieldSpec,
    options: &PipelineOptions,
) -> (ArrayRef, usize) {
    let n = table.num_rows();
    let cells = (0..n).map(|row| source.map(|col| table.cell(row, col)));
    let mut rejected = 0usize;
    let mut track = |cell: Option<&RawValue>, ok: bool| {
        if !ok && cell.is_some_and(|c| !c.is_blank()) {
            rejected += 1;
        }
    };

    let column: ArrayRef = match spec.kind {
        FieldKind::Number => {
            let mut b = Float64Builder::with_capacity(n);
            for cell in cells {
                let v = cell.and_then(coerce_number);
                track(cell, v.is_some());
                b.append_option(v);
            }
            Arc::new(b.finish())
        }
        FieldKind::Date => {
            let mut b = Date32Builder::with_capacity(n);
            for cell in cells {
                let d = cell.and_then(coerce_date);
                track(cell, d.is_some());
                b.append_option(d.map(Date32Type::from_naive_date));
            }
            Arc::new(b.finish())
        }
        FieldKind::Text => {
            let mut b = StringBuilder::with_capacity(n, n * 8);
            for cell in cells {
                b.append_option(cell.and_then(coerce_text));
            }
            Arc::new(b.finish())
        }
        FieldKind::Label => {
            let mut b = StringBuilder::with_capacity(n, n * 8);
            for cell in cells {
                let label = match cell {
                    Some(c) => coerce_label(c, &options.default_scenario_label),
                    None => options.default_scenario_label.clone(),
                };
                b.append_value(label);
            }
            Arc::new(b.finish())
        }
    };

    (column, rejected)
}

/// Convert every canonical field of `table` to its declared type.
#[tracing::instrument(level = "debug", skip_all, fields(rows = table.num_rows()))]
pub fn coerce_table(
    table: &RawTable,
    columns: ColumnMap,
    options: &PipelineOptions,
) -> Result<NormalizedTable> {
    let mut out = Vec::with_capacity(Field::COUNT);

    for spec in CANONICAL_SCHEMA.iter() {
        let source = columns.source(spec.field);
        let (column, rejected) = coerce_column(table, source, spec, options);
        if rejected > 0 {
            warn!(field = spec.name, rejected, "unparsable cells coerced to null");
        }
        if source.is_none() {
            debug!(field = spec.name, "absent column filled with missing values");
        }
        out.push(column);
    }

    let batch = RecordBatch::try_new(build_arrow_schema(), out)
        .context("building normalized record batch")?;
    Ok(NormalizedTable { batch, columns })
}
