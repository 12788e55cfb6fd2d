// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::canonical::{CANONICAL_SCHEMA, MESES_DESDE_ENCERRAMENTO, VALOR_REAL};
use super::types::{FieldKind, FieldSpec, MissingPolicy};

/// Map a canonical field kind into an Arrow DataType.
///
/// - Number → Float64
/// - Date   → Date32 (calendar day, no time of day)
/// - Text   → Utf8
/// - Label  → Utf8
pub fn map_to_arrow_type(kind: FieldKind) -> DataType {
    match kind {
        FieldKind::Number => DataType::Float64,
        FieldKind::Date => DataType::Date32,
        FieldKind::Text | FieldKind::Label => DataType::Utf8,
    }
}

fn arrow_field(spec: &FieldSpec) -> ArrowField {
    let nullable = spec.missing == MissingPolicy::Null;
    ArrowField::new(spec.name, map_to_arrow_type(spec.kind), nullable)
}

/// Schema of the coerced batch: one column per canonical field. Percent
/// columns stay nullable here; they are filled by the derive step.
pub fn build_arrow_schema() -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = CANONICAL_SCHEMA
        .iter()
        .map(|spec| {
            let nullable = spec.kind != FieldKind::Label;
            ArrowField::new(spec.name, map_to_arrow_type(spec.kind), nullable)
        })
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

/// Schema of the derived batch: canonical columns with the missing policy
/// fully applied, then the two per-row metrics.
pub fn build_derived_schema() -> Arc<ArrowSchema> {
    let mut fields: Vec<ArrowField> = CANONICAL_SCHEMA.iter().map(arrow_field).collect();
    fields.push(ArrowField::new(VALOR_REAL, DataType::Float64, false));
    fields.push(ArrowField::new(MESES_DESDE_ENCERRAMENTO, DataType::Float64, true));

    Arc::new(ArrowSchema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    #[test]
    fn derived_schema_appends_metrics() {
        let base = build_arrow_schema();
        let derived = build_derived_schema();
        assert_eq!(derived.fields().len(), base.fields().len() + 2);
        assert_eq!(derived.field(Field::COUNT).name(), VALOR_REAL);
        assert!(!derived.field(Field::COUNT).is_nullable());
        assert_eq!(derived.field(Field::COUNT + 1).name(), MESES_DESDE_ENCERRAMENTO);
    }

    #[test]
    fn percent_columns_become_non_nullable_after_derive() {
        let base = build_arrow_schema();
        let derived = build_derived_schema();
        let idx = Field::Lastro.index();
        assert!(base.field(idx).is_nullable());
        assert!(!derived.field(idx).is_nullable());
        assert_eq!(derived.field(Field::Encerramento.index()).data_type(), &DataType::Date32);
        assert!(!derived.field(Field::Cenario.index()).is_nullable());
    }
}
