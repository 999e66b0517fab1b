//! Built-in checks that can be declared in configuration

use anyhow::bail;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::check::{Check, Fields};
use crate::error::{DirlinError, Result};
use crate::table::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Every field is present and parsed
    NotNull,
    /// Every field is a number >= 0
    NotNegative,
    /// First field <= second field
    LessOrEqual,
    /// First field == second field
    Equal,
    InRange { min: f64, max: f64 },
    OneOf { values: Vec<String> },
    /// Every field's text matches the regular expression
    Matches { pattern: String },
}

impl Rule {
    fn name(&self) -> &'static str {
        match self {
            Rule::NotNull => "not_null",
            Rule::NotNegative => "not_negative",
            Rule::LessOrEqual => "less_or_equal",
            Rule::Equal => "equal",
            Rule::InRange { .. } => "in_range",
            Rule::OneOf { .. } => "one_of",
            Rule::Matches { .. } => "matches",
        }
    }

    /// Comparison rules take exactly two fields, the rest one or more
    fn takes_pair(&self) -> bool {
        matches!(self, Rule::LessOrEqual | Rule::Equal)
    }
}

/// A named rule over fields, as written in a pipeline file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSpec {
    pub name: String,
    pub fields: Vec<String>,
    #[serde(flatten)]
    pub rule: Rule,
}

impl CheckSpec {
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| DirlinError::InvalidCheck {
            check: self.name.clone(),
            message,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("check name cannot be empty".to_string()));
        }
        if self.rule.takes_pair() && self.fields.len() != 2 {
            return Err(invalid(format!(
                "rule '{}' takes exactly 2 fields, got {}",
                self.rule.name(),
                self.fields.len()
            )));
        }
        if self.fields.is_empty() {
            return Err(invalid(format!(
                "rule '{}' needs at least one field",
                self.rule.name()
            )));
        }

        match &self.rule {
            Rule::InRange { min, max } if min > max => Err(invalid(format!(
                "range minimum {min} is greater than maximum {max}"
            ))),
            Rule::OneOf { values } if values.is_empty() => {
                Err(invalid("one_of needs at least one value".to_string()))
            }
            Rule::Matches { pattern } => Regex::new(pattern)
                .map(|_| ())
                .map_err(|e| invalid(format!("invalid regular expression: {e}"))),
            _ => Ok(()),
        }
    }

    pub fn into_check(self) -> Result<Check> {
        self.validate()?;
        let CheckSpec { name, fields, rule } = self;

        let check = match rule {
            Rule::NotNull => Check::scalar(name, fields, |row| {
                Ok(row.iter().all(|(_, v)| !v.is_null() && !v.is_unparseable()))
            }),
            Rule::NotNegative => Check::scalar(name, fields, |row| {
                each_number(row, |n| n >= 0.0)
            }),
            Rule::LessOrEqual => Check::scalar(name, fields, |row| {
                Ok(compare_pair(row)?.is_le())
            }),
            Rule::Equal => Check::scalar(name, fields, |row| {
                Ok(compare_pair(row)?.is_eq())
            }),
            Rule::InRange { min, max } => Check::scalar(name, fields, move |row| {
                each_number(row, |n| (min..=max).contains(&n))
            }),
            Rule::OneOf { values } => Check::scalar(name, fields, move |row| {
                Ok(row.iter().all(|(_, v)| values.contains(&v.to_string())))
            }),
            Rule::Matches { pattern } => {
                let regex = Regex::new(&pattern).map_err(|e| DirlinError::InvalidCheck {
                    check: name.clone(),
                    message: format!("invalid regular expression: {e}"),
                })?;
                Check::scalar(name, fields, move |row| {
                    Ok(row.iter().all(|(_, v)| regex.is_match(&v.to_string())))
                })
            }
        };
        Ok(check)
    }
}

fn each_number(row: &Fields<'_>, test: impl Fn(f64) -> bool) -> anyhow::Result<bool> {
    for (name, _) in row.iter() {
        if !test(row.number(name)?) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn compare_pair(row: &Fields<'_>) -> anyhow::Result<Ordering> {
    let (Some(a), Some(b)) = (row.value(0), row.value(1)) else {
        bail!("comparison needs two fields");
    };
    compare(a, b)
}

/// Order two cells; exact for decimals and integers, dates by calendar, text lexically
fn compare(a: &Value, b: &Value) -> anyhow::Result<Ordering> {
    let ordering = match (a, b) {
        (Value::Date(x), Value::Date(y)) => x.partial_cmp(y),
        (Value::DateTime(x), Value::DateTime(y)) => x.partial_cmp(y),
        (Value::Text(x), Value::Text(y)) => x.partial_cmp(y),
        (Value::Float(_), _) | (_, Value::Float(_)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
        _ => match (a.as_decimal(), b.as_decimal()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    };
    match ordering {
        Some(ordering) => Ok(ordering),
        None => bail!("cannot compare {} with {}", a.kind(), b.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use crate::validation::Outcome;

    fn parse(yaml: &str) -> CheckSpec {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn outcomes(yaml: &str, table: &Table) -> Vec<Outcome> {
        parse(yaml).into_check().unwrap().evaluate(table).unwrap()
    }

    fn prices() -> Table {
        Table::from_rows(
            ["low", "high", "side"],
            vec![
                vec![Value::Int(1), Value::Int(2), "buy".into()],
                vec![Value::Int(10), Value::Int(5), "sell".into()],
                vec![Value::Int(-3), Value::Null, "hold".into()],
            ],
        )
    }

    #[test]
    fn test_parse_check_spec() {
        let parsed = parse("name: range\nrule: in_range\nfields: [low]\nmin: 0\nmax: 5\n");
        assert_eq!(parsed.rule, Rule::InRange { min: 0.0, max: 5.0 });
        assert_eq!(parsed.fields, vec!["low"]);
    }

    #[test]
    fn test_less_or_equal() {
        let result = outcomes("name: le\nrule: less_or_equal\nfields: [low, high]\n", &prices());
        assert_eq!(result[0], Outcome::Pass);
        assert_eq!(result[1], Outcome::Fail);
        assert!(matches!(result[2], Outcome::Error(_)));
    }

    #[test]
    fn test_not_null_and_not_negative() {
        let table = prices();
        let not_null = outcomes("name: nn\nrule: not_null\nfields: [high]\n", &table);
        assert_eq!(not_null, vec![Outcome::Pass, Outcome::Pass, Outcome::Fail]);

        let not_negative = outcomes("name: pos\nrule: not_negative\nfields: [low]\n", &table);
        assert_eq!(not_negative, vec![Outcome::Pass, Outcome::Pass, Outcome::Fail]);
    }

    #[test]
    fn test_one_of_and_matches() {
        let table = prices();
        let one_of = outcomes(
            "name: side\nrule: one_of\nfields: [side]\nvalues: [buy, sell]\n",
            &table,
        );
        assert_eq!(one_of, vec![Outcome::Pass, Outcome::Pass, Outcome::Fail]);

        let matches = outcomes("name: s\nrule: matches\nfields: [side]\npattern: '^s'\n", &table);
        assert_eq!(matches, vec![Outcome::Fail, Outcome::Pass, Outcome::Fail]);
    }

    #[test]
    fn test_equal_compares_numbers_exactly() {
        let table = Table::from_rows(
            ["a", "b"],
            vec![
                vec![Value::Int(5), "5".parse::<rust_decimal::Decimal>().unwrap().into()],
                vec![Value::Float(0.5), Value::Int(1)],
            ],
        );
        let result = outcomes("name: eq\nrule: equal\nfields: [a, b]\n", &table);
        assert_eq!(result, vec![Outcome::Pass, Outcome::Fail]);
    }

    #[test]
    fn test_validate_rejects_bad_specs() {
        let wrong_arity = parse("name: le\nrule: less_or_equal\nfields: [low]\n");
        assert!(matches!(
            wrong_arity.validate(),
            Err(DirlinError::InvalidCheck { .. })
        ));

        let bad_regex = parse("name: re\nrule: matches\nfields: [side]\npattern: '('\n");
        assert!(bad_regex.into_check().is_err());

        let inverted = parse("name: r\nrule: in_range\nfields: [low]\nmin: 5\nmax: 1\n");
        assert!(inverted.validate().is_err());
    }
}
