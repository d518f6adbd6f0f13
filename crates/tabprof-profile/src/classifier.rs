//! Per-value type classification and the column-level fold.

use tabprof_model::DataType;

use crate::formats::{parse_date, parse_datetime, parse_time};

/// Decides the [`DataType`] of raw text values.
///
/// Implementors classify one value at a time; [`ValueClassifier::classify`]
/// folds a whole column sample with [`merge_types`]. Both must be
/// deterministic for a fixed input.
pub trait ValueClassifier {
    fn classify_value(&self, value: &str) -> DataType;

    /// Narrowest type every value satisfies. An empty sample is `Text`.
    fn classify(&self, values: &[&str]) -> DataType {
        let mut verdict: Option<DataType> = None;
        for value in values {
            let next = self.classify_value(value);
            let merged = verdict.map_or(next, |current| merge_types(current, next));
            if merged == DataType::Text {
                return DataType::Text;
            }
            verdict = Some(merged);
        }
        verdict.unwrap_or(DataType::Text)
    }
}

impl<F> ValueClassifier for F
where
    F: Fn(&str) -> DataType,
{
    fn classify_value(&self, value: &str) -> DataType {
        self(value)
    }
}

/// Combines two verdicts. Equal types stay, integers widen to floats, any
/// other mix falls back to `Text`.
pub fn merge_types(left: DataType, right: DataType) -> DataType {
    match (left, right) {
        (a, b) if a == b => a,
        (DataType::Integer, DataType::Float) | (DataType::Float, DataType::Integer) => {
            DataType::Float
        }
        _ => DataType::Text,
    }
}

/// The default classifier.
///
/// Checks run in this order, first match wins:
///
/// 1. `Boolean`: `true` or `false`, any case
/// 2. `Integer`: optional sign and ASCII digits that fit in an `i64`
/// 3. `Float`: decimal or exponent notation (no `inf`/`nan`)
/// 4. `Date`, `Time`, `DateTime`: see [`crate::formats`]
///
/// Values are trimmed first. Blank values are `Text`; callers drop nulls
/// before classifying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardClassifier;

impl StandardClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl ValueClassifier for StandardClassifier {
    fn classify_value(&self, value: &str) -> DataType {
        let value = value.trim();
        if value.is_empty() {
            DataType::Text
        } else if is_boolean(value) {
            DataType::Boolean
        } else if is_integer(value) {
            DataType::Integer
        } else if is_float(value) {
            DataType::Float
        } else if parse_date(value).is_some() {
            DataType::Date
        } else if parse_time(value).is_some() {
            DataType::Time
        } else if parse_datetime(value).is_some() {
            DataType::DateTime
        } else {
            DataType::Text
        }
    }
}

fn is_boolean(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) && value.parse::<i64>().is_ok()
}

fn is_float(value: &str) -> bool {
    let numeric_chars = value
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    numeric_chars
        && value.bytes().any(|b| b.is_ascii_digit())
        && value.parse::<f64>().is_ok_and(f64::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classify(values: &[&str]) -> DataType {
        StandardClassifier.classify(values)
    }

    #[test]
    fn test_single_values() {
        let cases = [
            ("true", DataType::Boolean),
            ("FALSE", DataType::Boolean),
            ("yes", DataType::Text),
            ("42", DataType::Integer),
            ("-1000", DataType::Integer),
            ("+7", DataType::Integer),
            ("007", DataType::Integer),
            ("99999999999999999999", DataType::Float),
            ("10.5", DataType::Float),
            ("1e6", DataType::Float),
            ("-2.5E-3", DataType::Float),
            (".5", DataType::Float),
            ("inf", DataType::Text),
            ("NaN", DataType::Text),
            ("1.2.3", DataType::Text),
            ("2024-01-15", DataType::Date),
            ("01/15/2024", DataType::Date),
            ("13:45:00", DataType::Time),
            ("01:45 PM", DataType::Time),
            ("2024-01-15T13:45:00", DataType::DateTime),
            ("2024-01-15 13:45:00", DataType::DateTime),
            ("01/15/2024 01:45 PM", DataType::DateTime),
            ("Alice", DataType::Text),
            ("  ", DataType::Text),
        ];
        for (value, expected) in cases {
            assert_eq!(StandardClassifier.classify_value(value), expected, "{value}");
        }
    }

    #[test]
    fn test_fold() {
        assert_eq!(classify(&["1", "2", "3"]), DataType::Integer);
        assert_eq!(classify(&["1", "2.5"]), DataType::Float);
        assert_eq!(classify(&["10.5", "20.0", "15.75"]), DataType::Float);
        assert_eq!(classify(&["true", "false", "yes"]), DataType::Text);
        assert_eq!(
            classify(&["true", "false", "yes", "no", "1", "0", "Y", "N"]),
            DataType::Text
        );
        assert_eq!(classify(&["2024-01-01", "13:00"]), DataType::Text);
        assert_eq!(classify(&["2024-01-01", "2024-01-02T10:00:00"]), DataType::Text);
        assert_eq!(classify(&["1", "invalid"]), DataType::Text);
        assert_eq!(classify(&[]), DataType::Text);
    }

    #[test]
    fn test_closure_classifier() {
        let upper = |value: &str| {
            if value.chars().all(|c| c.is_ascii_uppercase()) {
                DataType::Boolean
            } else {
                DataType::Text
            }
        };
        assert_eq!(upper.classify(&["A", "B"]), DataType::Boolean);
        assert_eq!(upper.classify(&["A", "b"]), DataType::Text);
    }

    #[test]
    fn test_merge_is_symmetric() {
        for a in DataType::ALL {
            for b in DataType::ALL {
                assert_eq!(merge_types(a, b), merge_types(b, a));
            }
        }
    }

    proptest! {
        #[test]
        fn prop_integers_classify_as_integer(n in any::<i64>()) {
            prop_assert_eq!(StandardClassifier.classify_value(&n.to_string()), DataType::Integer);
        }

        #[test]
        fn prop_floats_round_trip(x in -1.0e12f64..1.0e12) {
            let text = format!("{x:?}");
            let verdict = StandardClassifier.classify_value(&text);
            prop_assert!(verdict.is_numeric());
            let parsed: f64 = text.parse().unwrap();
            prop_assert_eq!(parsed, x);
        }

        #[test]
        fn prop_dates_round_trip(days in 0i64..80_000) {
            let date = chrono::NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
                + chrono::Duration::days(days);
            let text = date.format("%m/%d/%Y").to_string();
            prop_assert_eq!(StandardClassifier.classify_value(&text), DataType::Date);
            prop_assert_eq!(
                crate::formats::canonical_date(&text),
                Some(date.format("%Y-%m-%d").to_string())
            );
        }

        #[test]
        fn prop_appending_text_forces_text(n in proptest::collection::vec(any::<u16>(), 1..20)) {
            let mut values: Vec<String> = n.iter().map(ToString::to_string).collect();
            values.push("not a number".to_string());
            let refs: Vec<&str> = values.iter().map(String::as_str).collect();
            prop_assert_eq!(StandardClassifier.classify(&refs), DataType::Text);
        }
    }
}
