// src/schema/types.rs

/// How a canonical field's raw cells are typed.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum FieldKind {
    Number,
    Date,
    Text,
    /// Text that is never null: missing cells take a default label.
    Label,
}

/// What a cell becomes when it is blank, unparsable, or its column is absent.
/// `Zero` marks the percent fields, stored either as a 0–1 fraction or on a
/// 0–100 scale.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum MissingPolicy {
    Null,
    Zero,
    DefaultLabel,
}

/// How a raw header is compared against a field's aliases.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum AliasMatch {
    Exact,
    CaseInsensitive,
}

/// Every column the dashboard understands. Declaration order is the column
/// order of the typed record batch.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Status,
    Codigo,
    Emissao,
    TotalTokens,
    Lastro,
    TotalDistribuido,
    QtdProcessos,
    ValorAtualFace,
    ValorFaceEstimadoCarteira,
    Distribuido,
    Duration,
    PercentualPp,
    Cenario,
    Multiplo,
    Participacao,
    ValorEstimadoPossivelRuim,
    NumeroPastasEstimado,
    ValorEstimado,
    ValorIndividual,
    Encerramento,
    PossiveisRuins,
}

/// One row of the canonical rule table.
#[derive(Debug, PartialEq, Clone)]
pub struct FieldSpec {
    pub field: Field,
    /// Name used in the typed batch and at the output boundary.
    pub name: &'static str,
    /// Raw headers accepted for this field, in precedence order.
    pub aliases: &'static [&'static str],
    pub matching: AliasMatch,
    pub kind: FieldKind,
    pub missing: MissingPolicy,
}
