use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDateTime;
use std::path::Path;

use super::normalize_headers;
use crate::error::{DirlinError, Result};
use crate::table::{Table, Value};

/// Read one worksheet of a spreadsheet; the first row is the header
pub(super) fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(DirlinError::MissingSheet {
                    path: path.to_path_buf(),
                    sheet: name.to_string(),
                });
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| DirlinError::InvalidData {
                path: path.to_path_buf(),
                message: "workbook has no worksheets".to_string(),
            })??,
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };

    let mut table = Table::new(normalize_headers(header.iter().map(|c| c.to_string())));
    for row in rows {
        table.push_row(row.iter().map(cell_value).collect());
    }

    Ok(table)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => Value::Float(*f),
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => Value::DateTime(datetime),
            None => Value::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Value::DateTime)
            .unwrap_or_else(|_| Value::Text(s.clone())),
        Data::Error(e) => Value::Unparseable(e.to_string()),
        other => Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(cell_value(&Data::Empty), Value::Null);
        assert_eq!(cell_value(&Data::Int(4)), Value::Int(4));
        assert_eq!(cell_value(&Data::Float(1.5)), Value::Float(1.5));
        assert_eq!(
            cell_value(&Data::String("$1,000".to_string())),
            Value::Text("$1,000".to_string())
        );
        assert_eq!(cell_value(&Data::String("  ".to_string())), Value::Null);
    }

    #[test]
    fn test_cell_value_iso_datetime() {
        let value = cell_value(&Data::DateTimeIso("2025-03-01T09:30:00".to_string()));
        assert!(matches!(value, Value::DateTime(_)));
    }

    #[test]
    fn test_missing_workbook_is_an_error() {
        let result = read_workbook(Path::new("/definitely/not/here.xlsx"), None);
        assert!(result.is_err());
    }
}
