use crate::config::PipelineOptions;
use crate::process::convert::{NormalizedTable, TypedColumns};
use crate::process::resolve::ColumnMap;
use crate::schema::{build_derived_schema, Field};
use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, AsArray, Float64Array},
    datatypes::Float64Type,
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

const VALOR_REAL_COLUMN: usize = Field::COUNT;
const MESES_COLUMN: usize = Field::COUNT + 1;

/// Normalized table plus the per-row metrics. Percent columns hold
/// fractions with no nulls.
#[derive(Debug, Clone)]
pub struct DerivedTable {
    batch: RecordBatch,
    columns: ColumnMap,
}

impl TypedColumns for DerivedTable {
    fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    fn column_map(&self) -> &ColumnMap {
        &self.columns
    }
}

impl DerivedTable {
    /// `% Lastro` × current face value, per row; never null.
    pub fn valor_real(&self) -> &Float64Array {
        self.batch.column(VALOR_REAL_COLUMN).as_primitive::<Float64Type>()
    }

    pub fn meses_desde_encerramento(&self) -> &Float64Array {
        self.batch.column(MESES_COLUMN).as_primitive::<Float64Type>()
    }
}

/// A percent stored above 1 is read as a 0–100 value. Missing counts as 0.
///
/// A ratio legitimately above 100% (e.g. 1.05) is also divided by 100; the
/// source sheets give no way to tell the two apart.
pub fn normalize_fraction(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v > 1.0 => v / 100.0,
        Some(v) => v,
        None => 0.0,
    }
}

pub fn backed_value(lastro: f64, face: Option<f64>) -> f64 {
    let v = lastro * face.unwrap_or(0.0);
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

pub fn months_since(
    closing: Option<NaiveDate>,
    today: NaiveDate,
    days_per_month: f64,
) -> Option<f64> {
    closing.map(|d| (today - d).num_days() as f64 / days_per_month)
}

fn normalize_percent_column(col: &Float64Array) -> Float64Array {
    col.iter().map(|v| Some(normalize_fraction(v))).collect()
}

/// Apply percent normalization and append `Valor Real` and
/// `Meses desde Encerramento`, evaluated at `today`.
#[tracing::instrument(level = "debug", skip(table, options), fields(rows = table.num_rows()))]
pub fn derive_metrics(
    table: NormalizedTable,
    today: NaiveDate,
    options: &PipelineOptions,
) -> Result<DerivedTable> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(Field::COUNT + 2);
    for field in Field::ALL {
        if field.is_percent() {
            columns.push(Arc::new(normalize_percent_column(table.number(field))));
        } else {
            columns.push(table.batch().column(field.index()).clone());
        }
    }

    let lastro = columns[Field::Lastro.index()].as_primitive::<Float64Type>();
    let face = table.number(Field::ValorAtualFace);
    let valor_real: Float64Array = lastro
        .values()
        .iter()
        .zip(face.iter())
        .map(|(l, f)| Some(backed_value(*l, f)))
        .collect();

    let closing = table.date(Field::Encerramento);
    let meses: Float64Array = (0..closing.len())
        .map(|i| {
            let day = closing.is_valid(i).then(|| closing.value_as_date(i)).flatten();
            months_since(day, today, options.days_per_month)
        })
        .collect();

    debug!(
        dated = closing.len() - closing.null_count(),
        "derived backed value and months since closing"
    );

    columns.push(Arc::new(valor_real));
    columns.push(Arc::new(meses));

    let (_, column_map) = table.into_parts();
    let batch = RecordBatch::try_new(build_derived_schema(), columns)
        .context("building derived record batch")?;
    Ok(DerivedTable {
        batch,
        columns: column_map,
    })
}
