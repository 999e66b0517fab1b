use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{DirlinError, Result};
use crate::table::{Table, Value};

/// Read a JSON array of flat objects (one object per row)
pub(super) fn read_json(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    let document: JsonValue = serde_json::from_reader(BufReader::new(file))?;

    let JsonValue::Array(records) = document else {
        return Err(DirlinError::InvalidData {
            path: path.to_path_buf(),
            message: "expected an array of records".to_string(),
        });
    };

    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        let JsonValue::Object(map) = record else {
            return Err(DirlinError::InvalidData {
                path: path.to_path_buf(),
                message: format!("expected an object per record, found {record}"),
            });
        };
        for key in map.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(columns.clone());
    for record in records {
        if let JsonValue::Object(map) = record {
            let row = columns
                .iter()
                .map(|column| map.get(column).map(json_value).unwrap_or(Value::Null))
                .collect();
            table.push_row(row);
        }
    }

    Ok(table)
}

fn json_value(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::Text(s.clone()),
        nested => Value::Text(nested.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_json_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trades.json");
        fs::write(
            &path,
            r#"[{"id": 1, "amount": 10.5}, {"id": 2, "side": "sell"}]"#,
        )
        .unwrap();

        let table = read_json(&path).unwrap();
        assert_eq!(table.columns(), ["amount", "id", "side"]);
        assert_eq!(table.cell(0, "amount"), Some(&Value::Float(10.5)));
        assert_eq!(table.cell(0, "side"), Some(&Value::Null));
        assert_eq!(table.cell(1, "side"), Some(&Value::from("sell")));
    }

    #[test]
    fn test_read_json_rejects_non_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"id": [1, 2]}"#).unwrap();

        let result = read_json(&path);
        assert!(matches!(result, Err(DirlinError::InvalidData { .. })));
    }
}
