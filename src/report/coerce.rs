//! Cell coercions for report columns

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::fmt;
use std::str::FromStr;

use crate::table::Value;

/// Currency symbols, thousands separators, and whitespace
static NUMBER_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s,$€£¥₹]|USD|EUR|GBP").expect("valid regex"));

/// Spellings pandas-style exports use for a missing number
const NULL_SPELLINGS: &[&str] = &["", "-", "nan", "none", "null", "n/a", "na"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionTarget {
    Currency,
    Float,
    Int,
    Date,
}

impl fmt::Display for CoercionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoercionTarget::Currency => "currency",
            CoercionTarget::Float => "float",
            CoercionTarget::Int => "integer",
            CoercionTarget::Date => "date",
        };
        f.write_str(name)
    }
}

/// Coerce one cell. `None` means the cell could not be parsed.
pub fn coerce(value: &Value, target: CoercionTarget) -> Option<Value> {
    match target {
        CoercionTarget::Currency => to_currency(value),
        CoercionTarget::Float => to_float(value),
        CoercionTarget::Int => to_int(value),
        CoercionTarget::Date => to_date(value),
    }
}

/// A number written as text, after stripping symbols and separators
struct CleanNumber {
    digits: String,
    percent: bool,
}

fn clean_number(raw: &str) -> Option<CleanNumber> {
    let mut text = raw.trim().to_string();
    if NULL_SPELLINGS.contains(&text.to_ascii_lowercase().as_str()) {
        return Some(CleanNumber {
            digits: "0".to_string(),
            percent: false,
        });
    }

    let mut negative = false;
    // Accounting negatives: (1,234.50)
    if text.starts_with('(') && text.ends_with(')') {
        negative = true;
        text = text[1..text.len() - 1].to_string();
    }
    // Trailing minus: 1,234.50-
    if text.len() > 1 && text.ends_with('-') {
        negative = !negative;
        text.pop();
    }

    let percent = text.ends_with('%');
    if percent {
        text.pop();
    }

    let mut digits = NUMBER_NOISE.replace_all(&text, "").to_string();
    if let Some(rest) = digits.strip_prefix('+') {
        digits = rest.to_string();
    }
    if negative {
        digits = format!("-{}", digits.trim_start_matches('-'));
    }

    let valid = !digits.is_empty()
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E' | '+'))
        && digits.chars().any(|c| c.is_ascii_digit());
    valid.then_some(CleanNumber { digits, percent })
}

fn to_currency(value: &Value) -> Option<Value> {
    match value {
        Value::Null => Some(Value::Decimal(Decimal::ZERO)),
        Value::Decimal(d) => Some(Value::Decimal(*d)),
        Value::Int(i) => Some(Value::Decimal(Decimal::from(*i))),
        Value::Float(f) => Decimal::from_f64(*f).map(Value::Decimal),
        Value::Text(raw) => {
            let clean = clean_number(raw)?;
            let mut amount = Decimal::from_str(&clean.digits)
                .or_else(|_| Decimal::from_scientific(&clean.digits))
                .ok()?;
            if clean.percent {
                amount /= Decimal::ONE_HUNDRED;
            }
            Some(Value::Decimal(amount))
        }
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<Value> {
    match value {
        Value::Null => Some(Value::Float(0.0)),
        Value::Float(f) => Some(Value::Float(*f)),
        Value::Int(i) => Some(Value::Float(*i as f64)),
        Value::Decimal(d) => d.to_f64().map(Value::Float),
        Value::Text(raw) => {
            let clean = clean_number(raw)?;
            let number = clean.digits.parse::<f64>().ok().filter(|f| f.is_finite())?;
            Some(Value::Float(if clean.percent { number / 100.0 } else { number }))
        }
        _ => None,
    }
}

/// Integers truncate toward zero, matching a float-to-int cast
fn to_int(value: &Value) -> Option<Value> {
    match value {
        Value::Null => Some(Value::Int(0)),
        Value::Int(i) => Some(Value::Int(*i)),
        Value::Float(f) if f.is_finite() => Some(Value::Int(f.trunc() as i64)),
        Value::Decimal(d) => d.trunc().to_i64().map(Value::Int),
        Value::Text(raw) => {
            let clean = clean_number(raw)?;
            if clean.percent {
                return None;
            }
            clean
                .digits
                .parse::<i64>()
                .ok()
                .or_else(|| {
                    clean
                        .digits
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .map(Value::Int)
        }
        _ => None,
    }
}

/// Dates keep nulls as nulls; there is no sensible default date
fn to_date(value: &Value) -> Option<Value> {
    match value {
        Value::Null => Some(Value::Null),
        Value::Date(d) => Some(Value::Date(*d)),
        Value::DateTime(dt) => Some(Value::DateTime(*dt)),
        Value::Text(raw) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Some(Value::Null);
            }
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(Value::Date)
                .or_else(|| {
                    DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                        .map(Value::DateTime)
                })
        }
        // CSV inference turns 20250131 into an integer
        Value::Int(i) => NaiveDate::parse_from_str(&i.to_string(), "%Y%m%d")
            .ok()
            .map(Value::Date),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency(raw: &str) -> Option<Value> {
        coerce(&Value::Text(raw.to_string()), CoercionTarget::Currency)
    }

    fn dec(raw: &str) -> Value {
        Value::Decimal(Decimal::from_str(raw).unwrap())
    }

    #[test]
    fn test_currency_strips_symbols_and_separators() {
        assert_eq!(currency("$1,234.50"), Some(dec("1234.50")));
        assert_eq!(currency(" € 12 "), Some(dec("12")));
        assert_eq!(currency("1,000 USD"), Some(dec("1000")));
    }

    #[test]
    fn test_currency_negatives() {
        assert_eq!(currency("(1,234.50)"), Some(dec("-1234.50")));
        assert_eq!(currency("$-20.00"), Some(dec("-20.00")));
        assert_eq!(currency("45.10-"), Some(dec("-45.10")));
    }

    #[test]
    fn test_currency_nulls_become_zero() {
        assert_eq!(
            coerce(&Value::Null, CoercionTarget::Currency),
            Some(Value::Decimal(Decimal::ZERO))
        );
        assert_eq!(currency("nan"), Some(dec("0")));
        assert_eq!(currency("-"), Some(dec("0")));
    }

    #[test]
    fn test_currency_unparseable() {
        assert_eq!(currency("twelve dollars"), None);
        assert_eq!(currency("$"), None);
        assert_eq!(coerce(&Value::Bool(true), CoercionTarget::Currency), None);
    }

    #[test]
    fn test_currency_is_idempotent() {
        let once = currency("$99.99").unwrap();
        let twice = coerce(&once, CoercionTarget::Currency).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_float_percent() {
        assert_eq!(
            coerce(&Value::Text("12.5%".into()), CoercionTarget::Float),
            Some(Value::Float(0.125))
        );
        assert_eq!(
            coerce(&Value::Int(3), CoercionTarget::Float),
            Some(Value::Float(3.0))
        );
    }

    #[test]
    fn test_int_truncates() {
        assert_eq!(
            coerce(&Value::Float(3.7), CoercionTarget::Int),
            Some(Value::Int(3))
        );
        assert_eq!(
            coerce(&Value::Text("1,200".into()), CoercionTarget::Int),
            Some(Value::Int(1200))
        );
        assert_eq!(coerce(&Value::Text("abc".into()), CoercionTarget::Int), None);
    }

    #[test]
    fn test_dates() {
        let expected = Value::Date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        for raw in ["2025-01-31", "01/31/2025", "2025/01/31", "31-Jan-2025"] {
            assert_eq!(
                coerce(&Value::Text(raw.into()), CoercionTarget::Date),
                Some(expected.clone()),
                "{raw}"
            );
        }
        assert_eq!(
            coerce(&Value::Int(20250131), CoercionTarget::Date),
            Some(expected)
        );
        assert!(matches!(
            coerce(&Value::Text("2025-01-31 09:30:00".into()), CoercionTarget::Date),
            Some(Value::DateTime(_))
        ));
        assert_eq!(coerce(&Value::Null, CoercionTarget::Date), Some(Value::Null));
        assert_eq!(coerce(&Value::Text("soon".into()), CoercionTarget::Date), None);
    }
}
