use chrono::NaiveDate;

/// A single cell as handed over by a loader, before any typing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Blank,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl RawValue {
    /// Wrap a textual cell; empty or whitespace-only text is a blank.
    pub fn from_cell(cell: &str) -> Self {
        if cell.trim().is_empty() {
            RawValue::Blank
        } else {
            RawValue::Text(cell.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Blank => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

static BLANK: RawValue = RawValue::Blank;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names exactly as the source claims them (trimmed).
    pub headers: Vec<String>,
    /// One entry per source row, positionally aligned with `headers`.
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<RawValue>>) -> Self {
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();
        Self { headers, rows }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Cell at `(row, col)`; short rows read as blank.
    pub fn cell(&self, row: usize, col: usize) -> &RawValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&BLANK)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{RawTable, RawValue};

    /// Build a table from textual cells, the way the CSV loader would.
    pub fn text_table(headers: &[&str], rows: &[Vec<&str>]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| RawValue::from_cell(c)).collect())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_read_as_blank() {
        let table = RawTable::new(
            vec![" Status ".into(), "Codigo".into()],
            vec![vec![RawValue::Text("ativa".into())]],
        );
        assert_eq!(table.headers, vec!["Status", "Codigo"]);
        assert_eq!(table.cell(0, 1), &RawValue::Blank);
        assert_eq!(table.cell(5, 0), &RawValue::Blank);
    }

    #[test]
    fn whitespace_cells_are_blank() {
        assert_eq!(RawValue::from_cell("   "), RawValue::Blank);
        assert!(RawValue::Text(" \t".into()).is_blank());
        assert!(!RawValue::Number(0.0).is_blank());
    }
}
