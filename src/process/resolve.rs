use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::schema::{AliasMatch, Field, CANONICAL_SCHEMA};

/// Alias → (field, rank). Rank is the alias position in the field's list;
/// lower ranks win when several raw headers claim the same field.
static EXACT_ALIASES: Lazy<HashMap<&'static str, (Field, usize)>> =
    Lazy::new(|| alias_index(AliasMatch::Exact));

/// Case-insensitive aliases are declared lower-case.
static FOLDED_ALIASES: Lazy<HashMap<&'static str, (Field, usize)>> =
    Lazy::new(|| alias_index(AliasMatch::CaseInsensitive));

fn alias_index(matching: AliasMatch) -> HashMap<&'static str, (Field, usize)> {
    let mut index = HashMap::new();
    for spec in CANONICAL_SCHEMA.iter().filter(|s| s.matching == matching) {
        for (rank, alias) in spec.aliases.iter().enumerate() {
            index.insert(*alias, (spec.field, rank));
        }
    }
    index
}

fn lookup(header: &str) -> Option<(Field, usize)> {
    let header = header.trim();
    EXACT_ALIASES
        .get(header)
        .or_else(|| FOLDED_ALIASES.get(header.to_lowercase().as_str()))
        .copied()
}

/// Which raw column (if any) feeds each canonical field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    sources: [Option<usize>; Field::COUNT],
}

impl ColumnMap {
    pub fn is_present(&self, field: Field) -> bool {
        self.sources[field.index()].is_some()
    }

    /// Index of the raw column feeding `field`.
    pub fn source(&self, field: Field) -> Option<usize> {
        self.sources[field.index()]
    }

    /// First field of an ordered fallback list whose column exists.
    pub fn first_present(&self, precedence: &[Field]) -> Option<Field> {
        precedence.iter().copied().find(|f| self.is_present(*f))
    }

    pub fn present_fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(|f| self.is_present(*f))
    }
}

/// Map raw headers onto canonical fields. Headers matching no alias are
/// dropped; a field whose column is absent simply stays unmapped.
pub fn resolve_columns(headers: &[String]) -> ColumnMap {
    let mut best: [Option<(usize, usize)>; Field::COUNT] = [None; Field::COUNT];

    for (idx, header) in headers.iter().enumerate() {
        let Some((field, rank)) = lookup(header) else {
            debug!(header = %header, "dropping unmapped column");
            continue;
        };
        match best[field.index()] {
            Some((_, held)) if held <= rank => {
                warn!(header = %header, field = field.name(), "duplicate alias ignored");
            }
            Some((prev, _)) => {
                warn!(
                    header = %header,
                    shadowed = %headers[prev],
                    field = field.name(),
                    "preferred alias replaces earlier column"
                );
                best[field.index()] = Some((idx, rank));
            }
            None => best[field.index()] = Some((idx, rank)),
        }
    }

    let mut map = ColumnMap::default();
    for (field_idx, entry) in best.iter().enumerate() {
        map.sources[field_idx] = entry.map(|(idx, _)| idx);
    }

    let absent: Vec<&str> = Field::ALL
        .iter()
        .filter(|f| !map.is_present(**f))
        .map(|f| f.name())
        .collect();
    if !absent.is_empty() {
        debug!(?absent, "canonical fields without a source column");
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn maps_aliases_to_canonical_fields() {
        let map = resolve_columns(&headers(&[
            "MESES",
            "CENARIO TEMPO",
            "Qtdd Processos",
            "Status",
        ]));
        assert_eq!(map.source(Field::Duration), Some(0));
        assert_eq!(map.source(Field::Cenario), Some(1));
        assert_eq!(map.source(Field::QtdProcessos), Some(2));
        assert_eq!(map.source(Field::Status), Some(3));
        assert!(!map.is_present(Field::Encerramento));
    }

    #[test]
    fn accented_and_plain_code_headers_resolve_once() {
        let map = resolve_columns(&headers(&["Código", "Codigo"]));
        // the unaccented spelling is listed first and wins
        assert_eq!(map.source(Field::Codigo), Some(1));
        assert_eq!(map.present_fields().collect::<Vec<_>>(), vec![Field::Codigo]);

        let map = resolve_columns(&headers(&["Código"]));
        assert_eq!(map.source(Field::Codigo), Some(0));
    }

    #[test]
    fn free_text_group_matches_case_insensitively() {
        let map = resolve_columns(&headers(&["Possiveis Ruins "]));
        assert_eq!(map.source(Field::PossiveisRuins), Some(0));

        let map = resolve_columns(&headers(&["POSSIVEIS RUI"]));
        assert_eq!(map.source(Field::PossiveisRuins), Some(0));
    }

    #[test]
    fn curated_aliases_are_case_sensitive() {
        let map = resolve_columns(&headers(&["status", "meses"]));
        assert!(!map.is_present(Field::Status));
        assert!(!map.is_present(Field::Duration));
    }

    #[test]
    fn unknown_headers_are_dropped() {
        let map = resolve_columns(&headers(&["Observações", "Valor Estimado"]));
        assert_eq!(map.present_fields().collect::<Vec<_>>(), vec![Field::ValorEstimado]);
        assert_eq!(map.source(Field::ValorEstimado), Some(1));
    }

    #[test]
    fn first_present_follows_precedence() {
        let map = resolve_columns(&headers(&["Valor Atual Face", "Total Distribuido"]));
        assert_eq!(
            map.first_present(&[Field::ValorFaceEstimadoCarteira, Field::ValorAtualFace]),
            Some(Field::ValorAtualFace)
        );
        assert_eq!(
            map.first_present(&[Field::ValorIndividual, Field::TotalDistribuido]),
            Some(Field::TotalDistribuido)
        );
        assert_eq!(map.first_present(&[Field::Encerramento]), None);
    }
}
