use serde::Serialize;

use super::check::Outcome;
use crate::table::{Table, Value};

/// Per-row outcomes of a single check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub outcomes: Vec<Outcome>,
}

impl CheckResult {
    pub fn errors(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_pass()).count()
    }
}

/// Why a row landed in the error log
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureDetail {
    /// The predicate returned false
    Failed,
    EvaluationError(String),
}

/// One failing (row, check) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    pub row: usize,
    /// Value of the validation's key column for this row, when one is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    pub check: String,
    pub detail: FailureDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub check: String,
    pub total_checked: usize,
    pub passed: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    row_count: usize,
    checks: Vec<CheckResult>,
    errors: Vec<ErrorEntry>,
}

impl ValidationResult {
    /// Build the error log row by row, checks in declaration order within a row
    pub(crate) fn new(
        row_count: usize,
        checks: Vec<CheckResult>,
        keys: Option<Vec<Value>>,
    ) -> Self {
        let mut errors = Vec::new();
        for row in 0..row_count {
            for check in &checks {
                let detail = match &check.outcomes[row] {
                    Outcome::Pass => continue,
                    Outcome::Fail => FailureDetail::Failed,
                    Outcome::Error(message) => FailureDetail::EvaluationError(message.clone()),
                };
                errors.push(ErrorEntry {
                    row,
                    key: keys.as_ref().map(|keys| keys[row].clone()),
                    check: check.name.clone(),
                    detail,
                });
            }
        }

        Self {
            row_count,
            checks,
            errors,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn checks(&self) -> &[CheckResult] {
        &self.checks
    }

    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn outcome(&self, check: &str, row: usize) -> Option<&Outcome> {
        self.checks
            .iter()
            .find(|c| c.name == check)
            .and_then(|c| c.outcomes.get(row))
    }

    /// Whether each row passed every check
    pub fn rows_passed(&self) -> Vec<bool> {
        (0..self.row_count)
            .map(|row| self.checks.iter().all(|c| c.outcomes[row].is_pass()))
            .collect()
    }

    /// Rows checked, passed and failed per check, most failures first
    ///
    /// Checks with equal failure counts keep their declaration order.
    pub fn summary(&self) -> Vec<CheckSummary> {
        let mut summary: Vec<CheckSummary> = self
            .checks
            .iter()
            .map(|c| {
                let errors = c.errors();
                CheckSummary {
                    check: c.name.clone(),
                    total_checked: c.outcomes.len(),
                    passed: c.outcomes.len() - errors,
                    errors,
                }
            })
            .collect();
        summary.sort_by(|a, b| b.errors.cmp(&a.errors));
        summary
    }

    /// Copy of `table` with one boolean pass column per check appended
    pub fn annotate(&self, table: &Table) -> Table {
        let mut annotated = table.clone();
        for check in &self.checks {
            let values = check
                .outcomes
                .iter()
                .map(|o| Value::Bool(o.is_pass()))
                .collect();
            annotated.set_column(check.name.clone(), values);
        }
        annotated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> ValidationResult {
        ValidationResult::new(
            3,
            vec![
                CheckResult {
                    name: "positive".to_string(),
                    outcomes: vec![Outcome::Pass, Outcome::Fail, Outcome::Fail],
                },
                CheckResult {
                    name: "ordered".to_string(),
                    outcomes: vec![
                        Outcome::Pass,
                        Outcome::Error("bad".to_string()),
                        Outcome::Pass,
                    ],
                },
            ],
            Some(vec!["a".into(), "b".into(), "c".into()]),
        )
    }

    #[test]
    fn test_error_log_is_row_major() {
        let result = result();
        assert_eq!(result.error_count(), 3);
        let logged: Vec<(usize, &str)> = result
            .errors()
            .iter()
            .map(|e| (e.row, e.check.as_str()))
            .collect();
        assert_eq!(logged, vec![(1, "positive"), (1, "ordered"), (2, "positive")]);
        assert_eq!(result.errors()[0].key, Some(Value::from("b")));
        assert_eq!(
            result.errors()[1].detail,
            FailureDetail::EvaluationError("bad".to_string())
        );
    }

    #[test]
    fn test_summary_and_rows_passed() {
        let result = result();
        assert_eq!(result.rows_passed(), vec![true, false, false]);
        assert!(!result.is_success());

        let summary = result.summary();
        assert_eq!(summary[0].errors, 2);
        assert_eq!(summary[0].passed, 1);
        assert_eq!(summary[1].errors, 1);
        assert_eq!(summary[1].passed, 2);
        assert_eq!(summary[1].total_checked, 3);
    }

    #[test]
    fn test_summary_orders_by_failures() {
        let result = ValidationResult::new(
            2,
            vec![
                CheckResult {
                    name: "clean".to_string(),
                    outcomes: vec![Outcome::Pass, Outcome::Pass],
                },
                CheckResult {
                    name: "broken".to_string(),
                    outcomes: vec![Outcome::Fail, Outcome::Error("x".to_string())],
                },
                CheckResult {
                    name: "also_clean".to_string(),
                    outcomes: vec![Outcome::Pass, Outcome::Pass],
                },
            ],
            None,
        );

        let summary = result.summary();
        let order: Vec<(&str, usize, usize)> = summary
            .iter()
            .map(|s| (s.check.as_str(), s.passed, s.errors))
            .collect();
        assert_eq!(
            order,
            vec![("broken", 0, 2), ("clean", 2, 0), ("also_clean", 2, 0)]
        );
    }

    #[test]
    fn test_annotate_appends_pass_columns() {
        let table = Table::from_rows(
            ["id"],
            vec![vec!["a".into()], vec!["b".into()], vec!["c".into()]],
        );
        let annotated = result().annotate(&table);
        assert_eq!(annotated.columns(), ["id", "positive", "ordered"]);
        assert_eq!(annotated.cell(1, "ordered"), Some(&Value::Bool(false)));
        assert_eq!(annotated.cell(0, "positive"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(result()).unwrap();
        assert_eq!(json["row_count"], 3);
        assert_eq!(json["errors"][0]["detail"]["kind"], "failed");
        assert_eq!(json["errors"][1]["detail"]["message"], "bad");
        assert_eq!(json["errors"][0]["key"], "b");
    }
}
