//! Portfolio indicators for the dashboard cards.
//!
//! Both blocks are computed from boolean row masks over the derived batch.
//! A comparison against a null cell is false, so a mask never carries nulls.

use crate::config::PipelineOptions;
use crate::output::{finite_opt_or_null, finite_or_null};
use crate::process::{DerivedTable, TypedColumns};
use crate::schema::{Field, DISTRIBUTED_PRECEDENCE, FACE_VALUE_PRECEDENCE};
use anyhow::Result;
use arrow::{
    array::{Array, AsArray, BooleanArray, Float64Array},
    compute::{self, kernels::cmp, kernels::numeric},
    datatypes::Float64Type,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    #[serde(rename = "total_distribuido", serialize_with = "finite_or_null")]
    pub total_distributed: f64,
    #[serde(rename = "valor_real_total", serialize_with = "finite_or_null")]
    pub backed_value_total: f64,
    /// `None` when no row carries both a duration and a weight.
    #[serde(rename = "tempo_medio_meses", serialize_with = "finite_opt_or_null")]
    pub average_duration_months: Option<f64>,
    #[serde(rename = "total_tokens_registros")]
    pub active_token_rows: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAlerts {
    #[serde(rename = "tokens_sem_valor_face")]
    pub tokens_without_face_value: i64,
    #[serde(rename = "valor_em_risco", serialize_with = "finite_or_null")]
    pub value_at_risk: f64,
    /// Sum, not mean, of the eligible participations.
    #[serde(rename = "perc_sem_lastro", serialize_with = "finite_or_null")]
    pub unbacked_participation: f64,
    /// Truncated toward zero; `None` when the sum does not fit an integer.
    #[serde(rename = "qtd_pastas_sem_alocacao")]
    pub unallocated_folders: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicators {
    pub overview: Overview,
    pub risk_alerts: RiskAlerts,
}

fn all_false(len: usize) -> BooleanArray {
    BooleanArray::from(vec![false; len])
}

/// `col > 0`, with null cells reading as false.
fn positive(col: &Float64Array) -> Result<BooleanArray> {
    let mask = cmp::gt(col, &Float64Array::new_scalar(0.0))?;
    // `prep_null_mask_filter` requires a null buffer to be present.
    if mask.nulls().is_some() {
        Ok(compute::prep_null_mask_filter(&mask))
    } else {
        Ok(mask)
    }
}

/// Sum of the non-null values of `col` on rows selected by `mask`.
fn masked_sum(col: &Float64Array, mask: &BooleanArray) -> Result<f64> {
    let selected = compute::filter(col, mask)?;
    Ok(compute::sum(selected.as_primitive::<Float64Type>()).unwrap_or(0.0))
}

fn active_mask(table: &DerivedTable, active_status: &str) -> BooleanArray {
    if !table.is_present(Field::Status) {
        return all_false(table.num_rows());
    }
    let wanted = active_status.to_lowercase();
    table
        .text(Field::Status)
        .iter()
        .map(|s| Some(s.is_some_and(|s| s.to_lowercase() == wanted)))
        .collect()
}

fn face_mask(table: &DerivedTable) -> Result<BooleanArray> {
    match table.column_map().first_present(&FACE_VALUE_PRECEDENCE) {
        Some(field) => positive(table.number(field)),
        None => Ok(all_false(table.num_rows())),
    }
}

fn eligible_mask(table: &DerivedTable, active: &BooleanArray) -> Result<BooleanArray> {
    if !table.is_present(Field::ValorEstimado) {
        return Ok(all_false(table.num_rows()));
    }
    Ok(compute::and(active, &positive(table.number(Field::ValorEstimado))?)?)
}

fn whole_count(sum: f64) -> Option<i64> {
    let whole = sum.trunc();
    (whole.is_finite() && whole >= i64::MIN as f64 && whole < i64::MAX as f64)
        .then(|| whole as i64)
}

/// Participation-weighted mean duration over `base` rows that have a
/// positive duration and weight.
fn weighted_duration(table: &DerivedTable, base: &BooleanArray) -> Result<Option<f64>> {
    let duration = table.number(Field::Duration);
    let weight = table.number(Field::Participacao);

    let qualifying = compute::and(
        base,
        &compute::and(&positive(duration)?, &positive(weight)?)?,
    )?;
    if qualifying.true_count() == 0 {
        return Ok(None);
    }

    let product = numeric::mul(duration, weight)?;
    let numerator = masked_sum(product.as_primitive::<Float64Type>(), &qualifying)?;
    let denominator = masked_sum(weight, &qualifying)?;
    if denominator > 0.0 {
        Ok(Some(numerator / denominator).filter(|v| v.is_finite()))
    } else {
        Ok(None)
    }
}

/// Build the `overview` and `risk_alerts` blocks.
#[tracing::instrument(level = "debug", skip_all, fields(rows = table.num_rows()))]
pub fn compute_indicators(table: &DerivedTable, options: &PipelineOptions) -> Result<Indicators> {
    let active = active_mask(table, &options.active_status);
    let has_face = face_mask(table)?;
    let active_with_face = compute::and(&active, &has_face)?;

    let total_distributed = match table.column_map().first_present(&DISTRIBUTED_PRECEDENCE) {
        Some(field) => masked_sum(table.number(field), &active_with_face)?,
        None => 0.0,
    };

    let overview = Overview {
        total_distributed,
        backed_value_total: masked_sum(table.valor_real(), &active_with_face)?,
        average_duration_months: weighted_duration(table, &active_with_face)?,
        active_token_rows: active_with_face.true_count() as i64,
    };

    let eligible = eligible_mask(table, &active)?;
    let without_face = compute::and(&eligible, &compute::not(&has_face)?)?;

    let risk_alerts = RiskAlerts {
        tokens_without_face_value: without_face.true_count() as i64,
        value_at_risk: masked_sum(table.number(Field::ValorEstimado), &eligible)?,
        unbacked_participation: masked_sum(table.number(Field::Participacao), &eligible)?,
        unallocated_folders: whole_count(masked_sum(
            table.number(Field::NumeroPastasEstimado),
            &eligible,
        )?),
    };

    info!(
        active = active.true_count(),
        active_with_face = overview.active_token_rows,
        eligible = eligible.true_count(),
        "computed indicators"
    );

    Ok(Indicators {
        overview,
        risk_alerts,
    })
}
