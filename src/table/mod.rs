//! In-memory tabular data: ordered named columns and rows of typed cells

mod value;

pub use value::Value;

use std::fmt;

/// A loaded tabular dataset
///
/// Every row always holds exactly one cell per column; rows pushed with fewer
/// cells are padded with [`Value::Null`] and extra cells are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from a header and a set of rows
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// All cells of a column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { table: self, index })
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    /// Replace the column header list wholesale. The caller keeps the length unchanged.
    pub(crate) fn set_columns(&mut self, columns: Vec<String>) {
        debug_assert_eq!(columns.len(), self.columns.len());
        self.columns = columns;
    }

    /// Rewrite every cell of a column in place. Returns false when the column is absent.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(usize, &Value) -> Value,
    {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            row[idx] = f(row_idx, &row[idx]);
        }
        true
    }

    /// Append a column, or overwrite it if a column with that name already exists
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Value>) {
        let name = name.into();
        let mut values = values.into_iter();
        match self.column_index(&name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = values.next().unwrap_or(Value::Null);
                }
            }
            None => {
                self.columns.push(name);
                for row in &mut self.rows {
                    row.push(values.next().unwrap_or(Value::Null));
                }
            }
        }
    }

    /// Insert a column at a position, shifting the rest right
    pub fn insert_column(&mut self, index: usize, name: impl Into<String>, values: Vec<Value>) {
        let index = index.min(self.columns.len());
        let mut values = values.into_iter();
        self.columns.insert(index, name.into());
        for row in &mut self.rows {
            row.insert(index, values.next().unwrap_or(Value::Null));
        }
    }

    /// Concatenate tables top to bottom
    ///
    /// Columns are the union of all inputs in first-seen order; cells for
    /// columns a table does not have are filled with [`Value::Null`].
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut combined = Table::new(columns.clone());
        for table in tables {
            let positions: Vec<Option<usize>> =
                columns.iter().map(|c| table.column_index(c)).collect();
            for mut row in table.rows {
                let merged = positions
                    .iter()
                    .map(|pos| match pos {
                        Some(idx) => std::mem::replace(&mut row[*idx], Value::Null),
                        None => Value::Null,
                    })
                    .collect();
                combined.rows.push(merged);
            }
        }
        combined
    }

    /// Cells holding a failed coercion, as (row, column, raw text)
    pub fn unparseable_cells(&self) -> Vec<(usize, &str, &str)> {
        let mut cells = Vec::new();
        for (row_idx, row) in self.rows.iter().enumerate() {
            for (col_idx, value) in row.iter().enumerate() {
                if let Value::Unparseable(raw) = value {
                    cells.push((row_idx, self.columns[col_idx].as_str(), raw.as_str()));
                }
            }
        }
        cells
    }

    /// Render the first `max_rows` rows as an aligned text grid
    pub fn preview(&self, max_rows: usize) -> String {
        let shown: Vec<Vec<String>> = self
            .rows
            .iter()
            .take(max_rows)
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                shown
                    .iter()
                    .map(|row| row[idx].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_line = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = vec![format_line(self.columns.iter().map(String::as_str).collect())];
        for row in &shown {
            lines.push(format_line(row.iter().map(String::as_str).collect()));
        }
        if self.rows.len() > max_rows {
            lines.push(format!("... {} more rows", self.rows.len() - max_rows));
        }
        lines.join("\n")
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preview(self.rows.len()))
    }
}

/// Borrowed view of one table row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let idx = self.table.column_index(column)?;
        Some(&self.table.rows[self.index][idx])
    }

    pub fn values(&self) -> &'a [Value] {
        &self.table.rows[self.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            ["ticker", "low", "high"],
            vec![
                vec!["AAPL".into(), Value::Int(10), Value::Int(12)],
                vec!["MSFT".into(), Value::Int(10), Value::Int(5)],
            ],
        )
    }

    #[test]
    fn test_push_row_pads_and_truncates() {
        let mut table = Table::new(["a", "b"]);
        table.push_row(vec![Value::Int(1)]);
        table.push_row(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(table.rows()[0], vec![Value::Int(1), Value::Null]);
        assert_eq!(table.rows()[1], vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_column_and_cell_access() {
        let table = sample();
        assert_eq!(
            table.column("high").unwrap(),
            vec![&Value::Int(12), &Value::Int(5)]
        );
        assert_eq!(table.cell(1, "ticker"), Some(&Value::from("MSFT")));
        assert!(table.column("close").is_none());

        let row = table.row(0).unwrap();
        assert_eq!(row.get("low"), Some(&Value::Int(10)));
        assert!(table.row(2).is_none());
    }

    #[test]
    fn test_concat_unions_columns_and_fills_nulls() {
        let first = Table::from_rows(["a", "b"], vec![vec![Value::Int(1), Value::Int(2)]]);
        let second = Table::from_rows(
            ["b", "c"],
            vec![
                vec![Value::Int(3), Value::Int(4)],
                vec![Value::Int(5), Value::Int(6)],
            ],
        );

        let combined = Table::concat(vec![first, second]);
        assert_eq!(combined.columns(), ["a", "b", "c"]);
        assert_eq!(combined.row_count(), 3);
        assert_eq!(
            combined.rows()[0],
            vec![Value::Int(1), Value::Int(2), Value::Null]
        );
        assert_eq!(
            combined.rows()[2],
            vec![Value::Null, Value::Int(5), Value::Int(6)]
        );
    }

    #[test]
    fn test_set_and_insert_column() {
        let mut table = sample();
        table.set_column("ok", vec![Value::Bool(true), Value::Bool(false)]);
        table.insert_column(0, "From", vec!["a".into(), "b".into()]);
        assert_eq!(table.columns(), ["From", "ticker", "low", "high", "ok"]);
        assert_eq!(table.cell(1, "ok"), Some(&Value::Bool(false)));

        table.set_column("ok", vec![Value::Null]);
        assert_eq!(table.column_count(), 5);
        assert_eq!(table.cell(0, "ok"), Some(&Value::Null));
        assert_eq!(table.cell(1, "ok"), Some(&Value::Null));
    }

    #[test]
    fn test_map_column() {
        let mut table = sample();
        assert!(table.map_column("low", |_, v| v.negated()));
        assert_eq!(table.cell(0, "low"), Some(&Value::Int(-10)));
        assert!(!table.map_column("close", |_, v| v.clone()));
    }

    #[test]
    fn test_preview_truncates() {
        let table = sample();
        let preview = table.preview(1);
        assert!(preview.starts_with("ticker"));
        assert!(preview.contains("AAPL"));
        assert!(!preview.contains("MSFT"));
        assert!(preview.ends_with("... 1 more rows"));
    }
}
