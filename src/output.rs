//! Boundary encoding of the dashboard payload.
//!
//! Every float crosses the boundary through [`finite_or_null`], so NaN and
//! ±Infinity become `null`. Dates render as `YYYY-MM-DD`.

use crate::indicators::Indicators;
use crate::process::{DerivedTable, TypedColumns};
use crate::schema::Field;
use arrow::array::{Array, Date32Array, Float64Array, StringArray};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

pub fn finite_or_null<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

pub fn finite_opt_or_null<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => finite_or_null(v, serializer),
        None => serializer.serialize_none(),
    }
}

pub fn iso_date<S: Serializer>(
    value: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
        None => serializer.serialize_none(),
    }
}

/// One dashboard row. Keys are the display names the front end reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetRecord {
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Codigo")]
    pub codigo: Option<String>,
    #[serde(rename = "Emissão")]
    pub emissao: Option<String>,
    #[serde(rename = "Total Tokens", serialize_with = "finite_opt_or_null")]
    pub total_tokens: Option<f64>,
    #[serde(rename = "% Lastro", serialize_with = "finite_or_null")]
    pub lastro: f64,
    #[serde(rename = "Total Distribuido", serialize_with = "finite_opt_or_null")]
    pub total_distribuido: Option<f64>,
    #[serde(rename = "Qtd Processos", serialize_with = "finite_opt_or_null")]
    pub qtd_processos: Option<f64>,
    #[serde(rename = "Valor Atual Face", serialize_with = "finite_opt_or_null")]
    pub valor_atual_face: Option<f64>,
    #[serde(
        rename = "Valor Atual de Face Estimado da Carteira",
        serialize_with = "finite_opt_or_null"
    )]
    pub valor_face_estimado_carteira: Option<f64>,
    #[serde(rename = "% Distribuido", serialize_with = "finite_or_null")]
    pub distribuido: f64,
    #[serde(rename = "Duration", serialize_with = "finite_opt_or_null")]
    pub duration: Option<f64>,
    #[serde(rename = "Percentual PP", serialize_with = "finite_or_null")]
    pub percentual_pp: f64,
    #[serde(rename = "Cenário")]
    pub cenario: String,
    #[serde(rename = "Multiplo", serialize_with = "finite_opt_or_null")]
    pub multiplo: Option<f64>,
    #[serde(rename = "Participação", serialize_with = "finite_or_null")]
    pub participacao: f64,
    #[serde(rename = "Valor Estimado Possivel Ruim", serialize_with = "finite_opt_or_null")]
    pub valor_estimado_possivel_ruim: Option<f64>,
    #[serde(rename = "Numero de Pastas Estimado", serialize_with = "finite_opt_or_null")]
    pub numero_pastas_estimado: Option<f64>,
    #[serde(rename = "Valor Estimado", serialize_with = "finite_opt_or_null")]
    pub valor_estimado: Option<f64>,
    #[serde(rename = "Valor Individual", serialize_with = "finite_opt_or_null")]
    pub valor_individual: Option<f64>,
    #[serde(rename = "Encerramento", serialize_with = "iso_date")]
    pub encerramento: Option<NaiveDate>,
    #[serde(rename = "possiveis ruins", serialize_with = "finite_opt_or_null")]
    pub possiveis_ruins: Option<f64>,
    #[serde(rename = "Valor Real", serialize_with = "finite_or_null")]
    pub valor_real: f64,
    #[serde(rename = "Meses desde Encerramento", serialize_with = "finite_opt_or_null")]
    pub meses_desde_encerramento: Option<f64>,
}

/// The three structures handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPayload {
    #[serde(rename = "dados")]
    pub records: Vec<AssetRecord>,
    #[serde(rename = "indicadores")]
    pub indicators: Indicators,
    #[serde(rename = "codigos")]
    pub codes: Vec<String>,
}

fn opt_f64(col: &Float64Array, row: usize) -> Option<f64> {
    col.is_valid(row).then(|| col.value(row))
}

fn opt_string(col: &StringArray, row: usize) -> Option<String> {
    col.is_valid(row).then(|| col.value(row).to_string())
}

fn opt_date(col: &Date32Array, row: usize) -> Option<NaiveDate> {
    col.is_valid(row).then(|| col.value_as_date(row)).flatten()
}

/// Materialize the derived batch as boundary records, in source row order.
pub fn build_records(table: &DerivedTable) -> Vec<AssetRecord> {
    let num = |field: Field, row: usize| opt_f64(table.number(field), row);
    let frac = |field: Field, row: usize| table.number(field).value(row);
    let text = |field: Field, row: usize| opt_string(table.text(field), row);
    let valor_real = table.valor_real();
    let meses = table.meses_desde_encerramento();

    (0..table.num_rows())
        .map(|row| AssetRecord {
            status: text(Field::Status, row),
            codigo: text(Field::Codigo, row),
            emissao: text(Field::Emissao, row),
            total_tokens: num(Field::TotalTokens, row),
            lastro: frac(Field::Lastro, row),
            total_distribuido: num(Field::TotalDistribuido, row),
            qtd_processos: num(Field::QtdProcessos, row),
            valor_atual_face: num(Field::ValorAtualFace, row),
            valor_face_estimado_carteira: num(Field::ValorFaceEstimadoCarteira, row),
            distribuido: frac(Field::Distribuido, row),
            duration: num(Field::Duration, row),
            percentual_pp: frac(Field::PercentualPp, row),
            cenario: table.text(Field::Cenario).value(row).to_string(),
            multiplo: num(Field::Multiplo, row),
            participacao: frac(Field::Participacao, row),
            valor_estimado_possivel_ruim: num(Field::ValorEstimadoPossivelRuim, row),
            numero_pastas_estimado: num(Field::NumeroPastasEstimado, row),
            valor_estimado: num(Field::ValorEstimado, row),
            valor_individual: num(Field::ValorIndividual, row),
            encerramento: opt_date(table.date(Field::Encerramento), row),
            possiveis_ruins: num(Field::PossiveisRuins, row),
            valor_real: valor_real.value(row),
            meses_desde_encerramento: opt_f64(meses, row),
        })
        .collect()
}

/// Distinct trimmed asset codes, sorted.
pub fn distinct_codes(table: &DerivedTable) -> Vec<String> {
    table
        .text(Field::Codigo)
        .iter()
        .flatten()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
