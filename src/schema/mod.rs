pub mod arrow;
pub mod canonical;
pub mod types;

pub use self::arrow::{build_arrow_schema, build_derived_schema, map_to_arrow_type};
pub use canonical::{
    CANONICAL_SCHEMA, DISTRIBUTED_PRECEDENCE, FACE_VALUE_PRECEDENCE, MESES_DESDE_ENCERRAMENTO,
    VALOR_REAL,
};
pub use types::{AliasMatch, Field, FieldKind, FieldSpec, MissingPolicy};
