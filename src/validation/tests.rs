use super::*;
use crate::table::Value;

fn prices() -> Table {
    Table::from_rows(
        ["date", "low", "high", "close"],
        vec![
            vec!["2025-01-02".into(), Value::Int(1), Value::Int(2), Value::Int(2)],
            vec!["2025-01-03".into(), Value::Int(10), Value::Int(5), Value::Int(7)],
            vec!["2025-01-06".into(), Value::Int(4), Value::Int(6), Value::Int(9)],
        ],
    )
}

fn low_le_high() -> Check {
    Check::scalar("low_le_high", ["low", "high"], |row| {
        Ok(row.number("low")? <= row.number("high")?)
    })
}

fn close_le_high() -> Check {
    Check::vector("close_le_high", ["close", "high"], |cols| {
        let close = cols.numbers("close")?;
        let high = cols.numbers("high")?;
        Ok(close
            .into_iter()
            .zip(high)
            .map(|(c, h)| -> anyhow::Result<bool> { Ok(c? <= h?) })
            .collect())
    })
}

#[test]
fn test_low_above_high_fails() {
    let validation = Validation::from_checks([low_le_high()]).unwrap();
    let result = validation.run(&prices()).unwrap();

    assert_eq!(result.rows_passed(), vec![true, false, true]);
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.errors()[0].row, 1);
    assert_eq!(result.errors()[0].detail, FailureDetail::Failed);
}

#[test]
fn test_error_log_counts_every_failing_pair() {
    let validation = Validation::from_checks([low_le_high(), close_le_high()]).unwrap();
    let result = validation.run(&prices()).unwrap();

    // row 1 fails both checks, row 2 fails close_le_high
    let failing_pairs: usize = result.summary().iter().map(|s| s.errors).sum();
    assert_eq!(result.error_count(), failing_pairs);
    assert_eq!(result.error_count(), 3);
    assert_eq!(result.rows_passed(), vec![true, false, false]);
}

#[test]
fn test_missing_field_fails_before_any_check_runs() {
    let validation = Validation::from_checks([
        low_le_high(),
        Check::scalar("volume_positive", ["volume"], |row| {
            Ok(row.number("volume")? > 0.0)
        }),
    ])
    .unwrap();

    let err = validation.run(&prices()).unwrap_err();
    assert!(matches!(err, DirlinError::SchemaMismatch { ref column, .. } if column == "volume"));
}

#[test]
fn test_duplicate_check_names_rejected() {
    let err = Validation::from_checks([low_le_high(), low_le_high()]).unwrap_err();
    assert!(matches!(err, DirlinError::InvalidCheck { .. }));
}

#[test]
fn test_aliases_pick_first_present_candidate() {
    let table = Table::from_rows(
        ["Low Price", "high"],
        vec![vec![Value::Int(3), Value::Int(2)]],
    );
    let validation = Validation::from_checks([low_le_high()])
        .unwrap()
        .alias("low", ["low_px", "Low Price"]);

    let result = validation.run(&table).unwrap();
    assert_eq!(result.rows_passed(), vec![false]);
}

#[test]
fn test_key_column_identifies_rows() {
    let validation = Validation::from_checks([low_le_high()])
        .unwrap()
        .key_column("date");
    let result = validation.run(&prices()).unwrap();
    assert_eq!(result.errors()[0].key, Some(Value::from("2025-01-03")));

    let missing_key = Validation::from_checks([low_le_high()])
        .unwrap()
        .key_column("ticker");
    assert!(missing_key.run(&prices()).is_err());
}

#[test]
fn test_evaluation_errors_do_not_abort_the_batch() {
    let table = Table::from_rows(
        ["low", "high"],
        vec![
            vec![Value::from("abc"), Value::Int(2)],
            vec![Value::Int(10), Value::Int(5)],
        ],
    );
    let validation = Validation::from_checks([low_le_high()]).unwrap();
    let result = validation.run(&table).unwrap();

    assert_eq!(result.error_count(), 2);
    assert!(matches!(
        result.errors()[0].detail,
        FailureDetail::EvaluationError(_)
    ));
    assert_eq!(result.errors()[1].detail, FailureDetail::Failed);
}

#[test]
fn test_empty_table_passes() {
    let validation = Validation::from_checks([low_le_high(), close_le_high()]).unwrap();
    let result = validation.run(&Table::new(["low", "high", "close"])).unwrap();
    assert!(result.is_success());
    assert_eq!(result.summary()[1].total_checked, 0);
}
