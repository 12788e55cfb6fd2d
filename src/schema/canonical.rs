// src/schema/canonical.rs

//! The canonical column table: one rule per field, declared once.

use super::types::{AliasMatch, Field, FieldKind, FieldSpec, MissingPolicy};

/// Name of the per-row backed value column appended by the derive step.
pub const VALOR_REAL: &str = "Valor Real";
/// Name of the per-row months-since-closing column appended by the derive step.
pub const MESES_DESDE_ENCERRAMENTO: &str = "Meses desde Encerramento";

const fn number(
    field: Field,
    name: &'static str,
    aliases: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        field,
        name,
        aliases,
        matching: AliasMatch::Exact,
        kind: FieldKind::Number,
        missing: MissingPolicy::Null,
    }
}

const fn percent(
    field: Field,
    name: &'static str,
    aliases: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        field,
        name,
        aliases,
        matching: AliasMatch::Exact,
        kind: FieldKind::Number,
        missing: MissingPolicy::Zero,
    }
}

const fn text(
    field: Field,
    name: &'static str,
    aliases: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        field,
        name,
        aliases,
        matching: AliasMatch::Exact,
        kind: FieldKind::Text,
        missing: MissingPolicy::Null,
    }
}

pub static CANONICAL_SCHEMA: [FieldSpec; Field::COUNT] = [
    text(Field::Status, "Status", &["Status"]),
    text(Field::Codigo, "Codigo", &["Codigo", "Código"]),
    text(Field::Emissao, "Emissão", &["Emissão", "Emissao"]),
    number(Field::TotalTokens, "Total Tokens", &["Total Tokens"]),
    percent(Field::Lastro, "% Lastro", &["% Lastro"]),
    number(Field::TotalDistribuido, "Total Distribuido", &["Total Distribuido"]),
    number(Field::QtdProcessos, "Qtd Processos", &["Qtdd Processos"]),
    number(Field::ValorAtualFace, "Valor Atual Face", &["Valor Atual Face"]),
    number(
        Field::ValorFaceEstimadoCarteira,
        "Valor Atual de Face Estimado da Carteira",
        &["Valor Atual de Face Estimado da Carteira"],
    ),
    percent(Field::Distribuido, "% Distribuido", &["% Distribuido", "% Distribuído"]),
    number(Field::Duration, "Duration", &["MESES"]),
    percent(Field::PercentualPp, "Percentual PP", &["PERCENTUAL"]),
    FieldSpec {
        field: Field::Cenario,
        name: "Cenário",
        aliases: &["CENARIO TEMPO"],
        matching: AliasMatch::Exact,
        kind: FieldKind::Label,
        missing: MissingPolicy::DefaultLabel,
    },
    number(Field::Multiplo, "Multiplo", &["Multiplo", "Múltiplo"]),
    percent(Field::Participacao, "Participação", &["Participação"]),
    number(
        Field::ValorEstimadoPossivelRuim,
        "Valor Estimado Possivel Ruim",
        &["Valor Estimado Possivel Ruim"],
    ),
    number(
        Field::NumeroPastasEstimado,
        "Numero de Pastas Estimado",
        &["Numero de Pastas Estimado"],
    ),
    number(Field::ValorEstimado, "Valor Estimado", &["Valor Estimado"]),
    number(Field::ValorIndividual, "Valor Individual", &["Valor Individual"]),
    FieldSpec {
        field: Field::Encerramento,
        name: "Encerramento",
        aliases: &["Encerramento"],
        matching: AliasMatch::Exact,
        kind: FieldKind::Date,
        missing: MissingPolicy::Null,
    },
    FieldSpec {
        field: Field::PossiveisRuins,
        name: "possiveis ruins",
        aliases: &["possiveis rui", "possiveis ruins"],
        matching: AliasMatch::CaseInsensitive,
        kind: FieldKind::Number,
        missing: MissingPolicy::Null,
    },
];

/// Face value used by the face masks: the portfolio estimate wins over the
/// per-token current face whenever its column exists.
pub const FACE_VALUE_PRECEDENCE: [Field; 2] =
    [Field::ValorFaceEstimadoCarteira, Field::ValorAtualFace];

/// Amount summed into `total_distribuido`.
pub const DISTRIBUTED_PRECEDENCE: [Field; 2] = [Field::ValorIndividual, Field::TotalDistribuido];

impl Field {
    pub const COUNT: usize = 21;

    pub const ALL: [Field; Field::COUNT] = [
        Field::Status,
        Field::Codigo,
        Field::Emissao,
        Field::TotalTokens,
        Field::Lastro,
        Field::TotalDistribuido,
        Field::QtdProcessos,
        Field::ValorAtualFace,
        Field::ValorFaceEstimadoCarteira,
        Field::Distribuido,
        Field::Duration,
        Field::PercentualPp,
        Field::Cenario,
        Field::Multiplo,
        Field::Participacao,
        Field::ValorEstimadoPossivelRuim,
        Field::NumeroPastasEstimado,
        Field::ValorEstimado,
        Field::ValorIndividual,
        Field::Encerramento,
        Field::PossiveisRuins,
    ];

    /// Column position in the typed batch.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static FieldSpec {
        &CANONICAL_SCHEMA[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Percent fields are the ones whose missing cells read as zero.
    pub fn is_percent(self) -> bool {
        self.spec().missing == MissingPolicy::Zero
    }
}
