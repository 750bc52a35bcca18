//! Client-side filtering of fetched rows.
//!
//! Every criterion is a case-insensitive substring test except the age,
//! which is matched in one of three modes selected by a toggle. Rows are
//! read leniently: a missing or oddly shaped value degrades to blank rather
//! than failing the whole view.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::dataset::DatasetItem;
use crate::record::{Record, template_text};

/// Age of a row as read for filtering
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Age {
    /// No usable value (missing, null, empty, zero or `false`)
    #[default]
    Blank,
    /// Leading integer of the value's text form
    Number(i64),
    /// A value was present but held no leading integer
    NotANumber,
}

impl Age {
    /// Read an age the way the table does: falsy values are blank,
    /// everything else goes through a lenient integer parse.
    ///
    /// # Examples
    /// ```
    /// use record_table::filter::Age;
    /// use serde_json::json;
    ///
    /// assert_eq!(Age::from_value(Some(&json!(32))), Age::Number(32));
    /// assert_eq!(Age::from_value(Some(&json!("41 years"))), Age::Number(41));
    /// assert_eq!(Age::from_value(Some(&json!("old"))), Age::NotANumber);
    /// assert_eq!(Age::from_value(None), Age::Blank);
    /// ```
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Age::Blank,
            Some(Value::String(s)) if s.is_empty() => Age::Blank,
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Age::Blank,
            Some(other) => match parse_int(&template_text(Some(other))) {
                Some(n) => Age::Number(n),
                None => Age::NotANumber,
            },
        }
    }

    /// Value used by the numeric modes; blank compares as zero.
    fn numeric(self) -> Option<i64> {
        match self {
            Age::Blank => Some(0),
            Age::Number(n) => Some(n),
            Age::NotANumber => None,
        }
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Age::Blank => f.pad(""),
            Age::Number(n) => f.pad(&n.to_string()),
            Age::NotANumber => f.pad("NaN"),
        }
    }
}

/// Parse the leading integer of `text`, ignoring leading whitespace.
///
/// Returns `None` (not a number) when no digit follows the optional sign.
/// Values beyond the `i64` range saturate.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let digits: &str = match digits.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &digits[..end],
        None => digits,
    };
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits
        .bytes()
        .try_fold(0i64, |acc, d| acc.checked_mul(10)?.checked_add((d - b'0') as i64));

    Some(match (magnitude, negative) {
        (Some(n), true) => -n,
        (Some(n), false) => n,
        (None, true) => i64::MIN,
        (None, false) => i64::MAX,
    })
}

/// Read a text cell: falsy values are blank, scalars are stringified and
/// nested arrays or objects are blank.
pub fn lenient_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => template_text(value),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}

/// How the age criterion is compared against a row's age
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AgeMode {
    /// The age's text contains the filter text (`"3"` matches 32)
    #[default]
    #[serde(rename = "")]
    Contains,
    /// Age is at most the filter value
    LessThan,
    /// Age is at least the filter value
    GreaterThan,
}

impl AgeMode {
    /// Mode after the user clicks `selected` while `self` is active.
    ///
    /// Clicking the active mode deselects it.
    pub fn toggle(self, selected: AgeMode) -> AgeMode {
        if self == selected {
            AgeMode::Contains
        } else {
            selected
        }
    }
}

/// The set of user-entered filter predicates
///
/// Empty strings match everything.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub name: String,
    pub age: String,
    pub age_mode: AgeMode,
    pub address: String,
    pub field: String,
    pub income: String,
    pub profit: String,
}

impl FilterCriteria {
    /// Apply a click on one of the age mode buttons
    pub fn select_age_mode(&mut self, mode: AgeMode) {
        self.age_mode = self.age_mode.toggle(mode);
    }

    /// Reset every criterion, including the age mode
    pub fn clear(&mut self) {
        *self = FilterCriteria::default();
    }

    /// Whether a row passes every predicate
    pub fn matches(&self, row: &FilterRow) -> bool {
        contains_ignore_case(&row.name, &self.name)
            && self.age_matches(row.age)
            && contains_ignore_case(&row.address, &self.address)
            && contains_ignore_case(&row.field, &self.field)
            && contains_ignore_case(&row.income, &self.income)
            && contains_ignore_case(&row.profit, &self.profit)
    }

    fn age_matches(&self, age: Age) -> bool {
        match self.age_mode {
            AgeMode::Contains => age.to_string().contains(self.age.as_str()),
            AgeMode::LessThan => match (age.numeric(), parse_int(&self.age)) {
                (Some(age), Some(limit)) => age <= limit,
                _ => false,
            },
            AgeMode::GreaterThan => match (age.numeric(), parse_int(&self.age)) {
                (Some(age), Some(limit)) => age >= limit,
                _ => false,
            },
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// The filterable cells of one row
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterRow {
    pub name: String,
    pub age: Age,
    pub address: String,
    pub field: String,
    pub income: String,
    pub profit: String,
}

/// Rows that can be run through [`apply_filters`]
pub trait Filterable {
    fn filter_row(&self) -> FilterRow;
}

impl Filterable for Record {
    fn filter_row(&self) -> FilterRow {
        FilterRow {
            name: lenient_text(self.name()),
            age: Age::from_value(self.age()),
            address: lenient_text(self.address()),
            ..FilterRow::default()
        }
    }
}

impl Filterable for DatasetItem {
    fn filter_row(&self) -> FilterRow {
        let app = self.app.clone().unwrap_or_default();
        FilterRow {
            name: self.graph.name.clone(),
            age: self.graph.age,
            address: self.graph.address.clone(),
            field: app.field,
            income: app.income,
            profit: app.profit,
        }
    }
}

/// Keep the rows that pass every criterion, in their original order.
///
/// # Arguments
/// * `rows` - Rows as fetched
/// * `criteria` - Active filter predicates
///
/// # Returns
/// * `Vec<&T>` - The rows that matched
pub fn apply_filters<'a, T: Filterable>(rows: &'a [T], criteria: &FilterCriteria) -> Vec<&'a T> {
    rows.iter()
        .filter(|row| criteria.matches(&row.filter_row()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use serde_json::json;

    fn record(name: &str, age: Value, address: &str) -> Record {
        Record::from_submission(1, json!({"name": name, "age": age, "address": address}))
    }

    #[test]
    fn empty_criteria_keep_everything() {
        let store = RecordStore::seeded();
        let rows = apply_filters(store.list(), &FilterCriteria::default());
        assert_eq!(rows.len(), 4);

        let r = record("Ann", json!(25), "X");
        let single = [r.clone()];
        assert_eq!(apply_filters(&single, &FilterCriteria::default()), vec![&r]);
    }

    #[test]
    fn name_is_case_insensitive_substring() {
        let rows = [record("John Brown", json!(32), "New York")];

        let mut criteria = FilterCriteria {
            name: "John Brown".to_string(),
            ..Default::default()
        };
        assert_eq!(apply_filters(&rows, &criteria).len(), 1);

        criteria.name = "john b".to_string();
        assert_eq!(apply_filters(&rows, &criteria).len(), 1);

        criteria.name = "John Brownzz".to_string();
        assert!(apply_filters(&rows, &criteria).is_empty());
    }

    #[test]
    fn predicates_combine_with_and() {
        let store = RecordStore::seeded();
        let criteria = FilterCriteria {
            name: "jo".to_string(),
            address: "lake park".to_string(),
            age: "32".to_string(),
            ..Default::default()
        };

        let names: Vec<String> = apply_filters(store.list(), &criteria)
            .iter()
            .map(|r| lenient_text(r.name()))
            .collect();
        assert_eq!(names, vec!["John Brown", "Joe Black"]);
    }

    #[test]
    fn default_age_mode_matches_partial_digits() {
        let rows = [record("A", json!(32), "x"), record("B", json!(42), "x")];
        let criteria = FilterCriteria {
            age: "3".to_string(),
            ..Default::default()
        };
        let hits = apply_filters(&rows, &criteria);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].age(), Some(&json!(32)));
    }

    #[test]
    fn numeric_modes_are_inclusive() {
        let store = RecordStore::seeded();
        let mut criteria = FilterCriteria {
            age: "32".to_string(),
            age_mode: AgeMode::LessThan,
            ..Default::default()
        };
        let keys: Vec<u64> = apply_filters(store.list(), &criteria)
            .iter()
            .filter_map(|r| r.key_number())
            .collect();
        assert_eq!(keys, vec![1, 3, 4]);

        criteria.age_mode = AgeMode::GreaterThan;
        let keys: Vec<u64> = apply_filters(store.list(), &criteria)
            .iter()
            .filter_map(|r| r.key_number())
            .collect();
        assert_eq!(keys, vec![1, 2, 4]);
    }

    #[test]
    fn non_numeric_filter_in_numeric_mode_matches_nothing() {
        let store = RecordStore::seeded();
        for mode in [AgeMode::LessThan, AgeMode::GreaterThan] {
            for input in ["abc", "", "  ", "-"] {
                let criteria = FilterCriteria {
                    age: input.to_string(),
                    age_mode: mode,
                    ..Default::default()
                };
                assert!(apply_filters(store.list(), &criteria).is_empty());
            }
        }
    }

    #[test]
    fn string_ages_parse_leniently() {
        let rows = [
            record("A", json!("25"), "x"),
            record("B", json!("70 years"), "x"),
            record("C", json!("unknown"), "x"),
        ];
        let criteria = FilterCriteria {
            age: "30".to_string(),
            age_mode: AgeMode::GreaterThan,
            ..Default::default()
        };
        let hits = apply_filters(&rows, &criteria);
        assert_eq!(hits.len(), 1);
        assert_eq!(lenient_text(hits[0].name()), "B");
    }

    #[test]
    fn blank_age_compares_as_zero() {
        let rows = [Record::from_submission(1, json!({"name": "nobody"}))];
        let mut criteria = FilterCriteria {
            age: "10".to_string(),
            age_mode: AgeMode::LessThan,
            ..Default::default()
        };
        assert_eq!(apply_filters(&rows, &criteria).len(), 1);

        criteria.age_mode = AgeMode::GreaterThan;
        assert!(apply_filters(&rows, &criteria).is_empty());

        criteria.age_mode = AgeMode::Contains;
        criteria.age.clear();
        assert_eq!(apply_filters(&rows, &criteria).len(), 1);
    }

    #[test]
    fn selecting_a_mode_twice_deselects_it() {
        let mut criteria = FilterCriteria::default();
        criteria.select_age_mode(AgeMode::LessThan);
        assert_eq!(criteria.age_mode, AgeMode::LessThan);
        criteria.select_age_mode(AgeMode::LessThan);
        assert_eq!(criteria, FilterCriteria::default());

        criteria.select_age_mode(AgeMode::LessThan);
        criteria.select_age_mode(AgeMode::GreaterThan);
        assert_eq!(criteria.age_mode, AgeMode::GreaterThan);
    }

    #[test]
    fn clear_resets_everything() {
        let mut criteria = FilterCriteria {
            name: "a".to_string(),
            age: "1".to_string(),
            age_mode: AgeMode::GreaterThan,
            address: "b".to_string(),
            field: "c".to_string(),
            income: "d".to_string(),
            profit: "e".to_string(),
        };
        criteria.clear();
        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn records_fail_app_data_criteria() {
        let store = RecordStore::seeded();
        let criteria = FilterCriteria {
            field: "x".to_string(),
            ..Default::default()
        };
        assert!(apply_filters(store.list(), &criteria).is_empty());
    }

    #[test]
    fn parse_int_follows_leading_digits() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("  -7abc"), Some(-7));
        assert_eq!(parse_int("+3"), Some(3));
        assert_eq!(parse_int("12.9"), Some(12));
        assert_eq!(parse_int("x12"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("99999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn criteria_deserialize_from_camel_case() {
        let criteria: FilterCriteria =
            serde_json::from_value(json!({"name": "jo", "ageMode": "lessThan", "age": "40"}))
                .unwrap();
        assert_eq!(criteria.age_mode, AgeMode::LessThan);
        assert_eq!(criteria.name, "jo");
        assert!(criteria.profit.is_empty());
    }
}
