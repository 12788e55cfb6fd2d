use crate::config::PipelineOptions;
use crate::indicators::compute_indicators;
use crate::output::{build_records, distinct_codes, DashboardPayload};
use crate::process::{coerce_table, derive_metrics, resolve_columns, RawTable, TypedColumns};
use crate::source::load_source;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::path::Path;
use tracing::info;

/// Supplies the evaluation date for months-since-closing.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Current UTC calendar day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Resolve, coerce, derive, aggregate and encode one table.
#[tracing::instrument(
    level = "info",
    skip_all,
    fields(rows = table.num_rows(), columns = table.headers.len())
)]
pub fn run_pipeline(
    table: &RawTable,
    clock: &dyn Clock,
    options: &PipelineOptions,
) -> Result<DashboardPayload> {
    let columns = resolve_columns(&table.headers);
    let normalized = coerce_table(table, columns, options)?;
    let derived = derive_metrics(normalized, clock.today(), options)?;

    let indicators = compute_indicators(&derived, options)?;
    let records = build_records(&derived);
    let codes = distinct_codes(&derived);

    info!(
        records = records.len(),
        codes = codes.len(),
        present = derived.column_map().present_fields().count(),
        "pipeline finished"
    );

    Ok(DashboardPayload {
        records,
        indicators,
        codes,
    })
}

/// Load `path` and run the pipeline over it. A missing or unreadable
/// source fails with [`crate::PipelineError`] before any processing.
pub fn run_from_source(
    path: impl AsRef<Path>,
    clock: &dyn Clock,
    options: &PipelineOptions,
) -> Result<DashboardPayload> {
    let table = load_source(path.as_ref())?;
    run_pipeline(&table, clock, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::raw_table::testing::text_table;
    use crate::PipelineError;
    use serde_json::Value;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,judicial_assets=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn sample() -> RawTable {
        text_table(
            &[
                "Status",
                "Código",
                "Codigo",
                "Emissao",
                "% Lastro",
                "Valor Atual Face",
                "MESES",
                "Participação",
                "Valor Estimado",
                "Numero de Pastas Estimado",
                "Encerramento",
                "CENARIO TEMPO",
                "Observação",
            ],
            &[
                vec![
                    "ativa", "T-2", "T-2", "1ª", "50", "1000", "10", "0.2", "300", "2",
                    "2024-05-02", "Base", "x",
                ],
                vec!["ativa", "T-1", "T-1", "2ª", "0.4", "", "20", "30", "200", "1.5", "", "", ""],
                vec![
                    "encerrada", "T-1 ", "T-1", "1ª", "abc", "500", "5", "0.1", "", "", "bad",
                    "nan", "",
                ],
            ],
        )
    }

    #[test]
    fn end_to_end_payload() -> Result<()> {
        init_test_logging();
        let payload = run_pipeline(&sample(), &clock(), &PipelineOptions::default())?;
        assert_eq!(payload.records.len(), 3);
        assert_eq!(payload.codes, vec!["T-1", "T-2"]);

        let ov = &payload.indicators.overview;
        assert_eq!(ov.active_token_rows, 1);
        assert_eq!(ov.backed_value_total, 500.0);
        assert!((ov.average_duration_months.unwrap() - 10.0).abs() < 1e-9);

        let risk = &payload.indicators.risk_alerts;
        assert_eq!(risk.tokens_without_face_value, 1);
        assert_eq!(risk.value_at_risk, 500.0);
        assert!((risk.unbacked_participation - 0.5).abs() < 1e-12);
        assert_eq!(risk.unallocated_folders, Some(3));

        let json = serde_json::to_value(&payload)?;
        assert_eq!(json["dados"][0]["Emissão"], Value::from("1ª"));
        assert_eq!(json["dados"][2]["Cenário"], Value::from("Sem Cenário"));
        assert_eq!(json["dados"][2]["Encerramento"], Value::Null);
        assert!(json["dados"][0].get("Observação").is_none());
        assert_eq!(json["codigos"], serde_json::json!(["T-1", "T-2"]));
        Ok(())
    }

    #[test]
    fn repeated_runs_are_byte_identical() -> Result<()> {
        let table = sample();
        let options = PipelineOptions::default();
        let first = serde_json::to_string(&run_pipeline(&table, &clock(), &options)?)?;
        let second = serde_json::to_string(&run_pipeline(&table, &clock(), &options)?)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn output_never_contains_non_finite_numbers() -> Result<()> {
        init_test_logging();
        let table = text_table(
            &[
                "Status",
                "Valor Atual Face",
                "% Lastro",
                "Valor Estimado",
                "MESES",
                "Participação",
            ],
            &[
                vec!["ativa", "1e308", "90", "1e308", "1e308", "0.9"],
                vec!["ativa", "1e308", "90", "1e308", "1e308", "0.9"],
                vec!["ativa", "inf", "NaN", "-inf", "nan", "inf"],
            ],
        );
        let payload = run_pipeline(&table, &clock(), &PipelineOptions::default())?;
        // overflowing sums and non-finite cells all encode as null
        let text = serde_json::to_string(&payload)?;
        assert!(!text.contains("NaN"));
        assert!(!text.contains("inf"));
        let json: Value = serde_json::from_str(&text)?;
        assert_eq!(json["indicadores"]["risk_alerts"]["valor_em_risco"], Value::Null);
        Ok(())
    }

    #[test]
    fn missing_source_is_reported_as_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let options = PipelineOptions::default();
        let err = run_from_source(dir.path().join("missing.csv"), &clock(), &options).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn empty_table_succeeds_with_sparse_result() -> Result<()> {
        init_test_logging();
        let payload = run_pipeline(&RawTable::default(), &clock(), &PipelineOptions::default())?;
        assert!(payload.records.is_empty());
        assert!(payload.codes.is_empty());
        assert_eq!(payload.indicators.overview.average_duration_months, None);
        Ok(())
    }
}
