use std::fmt;

/// One value in a query result.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(n) => Some(*n),
            Cell::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(n) => Some(*n as f64),
            Cell::Float(f) => Some(*f),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("-"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(n) => write!(f, "{n}"),
            Cell::Float(x) => {
                if x.fract() == 0.0 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{}", (x * 100.0).round() / 100.0)
                }
            }
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Rectangular query result with ordered, named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Keeps rows whose `column` contains `needle`, ignoring case. Null cells never match.
    pub fn filter_contains(&self, column: &str, needle: &str) -> Table {
        let Some(idx) = self.column_index(column) else {
            return Table::new(self.columns.clone());
        };
        let needle = needle.to_lowercase();
        let rows = self
            .rows
            .iter()
            .filter(|row| {
                row.get(idx)
                    .and_then(Cell::as_str)
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Largest `limit` values of `value_column`, labelled by `label_column`.
    pub fn top_by(&self, label_column: &str, value_column: &str, limit: usize) -> Vec<(String, f64)> {
        let (Some(label_idx), Some(value_idx)) =
            (self.column_index(label_column), self.column_index(value_column))
        else {
            return Vec::new();
        };
        let mut pairs: Vec<(String, f64)> = self
            .rows
            .iter()
            .filter_map(|row| {
                let value = row.get(value_idx)?.as_f64()?;
                let label = row.get(label_idx).map(Cell::to_string).unwrap_or_default();
                Some((label, value))
            })
            .collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs.truncate(limit);
        pairs
    }

    /// Plain-text rendering with padded columns.
    pub fn to_text(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::to_string).collect())
            .collect();
        for row in &rendered {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let line = |cells: &[String]| {
            cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{:<width$}", c, width = widths.get(i).copied().unwrap_or(0)))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![line(&self.columns[..])];
        out.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in &rendered {
            out.push(line(&row[..]));
        }
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> Table {
        Table {
            columns: vec!["name".into(), "runs".into()],
            rows: vec![
                vec![Cell::Text("Virat Kohli".into()), Cell::Int(13906)],
                vec![Cell::Null, Cell::Int(10)],
                vec![Cell::Text("Rohit Sharma".into()), Cell::Int(10866)],
                vec![Cell::Text("KL Rahul".into()), Cell::Float(2851.0)],
            ],
        }
    }

    #[test]
    fn filter_is_case_insensitive_and_skips_nulls() {
        let filtered = players().filter_contains("NAME", "ko");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.value(0, "name"), Some(&Cell::Text("Virat Kohli".into())));

        let all_named = players().filter_contains("name", "");
        assert_eq!(all_named.len(), 3);
    }

    #[test]
    fn top_by_orders_descending_and_truncates() {
        let top = players().top_by("name", "runs", 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "Virat Kohli");
        assert_eq!(top[1].1, 10866.0);
    }

    #[test]
    fn to_text_pads_columns() {
        let table = Table {
            columns: vec!["a".into(), "bb".into()],
            rows: vec![vec![Cell::Int(100), Cell::Null]],
        };
        assert_eq!(table.to_text(), "a   | bb\n----+---\n100 | -");
    }
}
