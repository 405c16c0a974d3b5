use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::schema::{Column, ColumnKind};

// ---------------------------------------------------------------------------
// Value – a single survey cell
// ---------------------------------------------------------------------------

/// A parsed survey cell. Categorical columns hold `Text`, numeric columns
/// hold `Integer` or `Float`, blank cells are `Null` in either case.
/// Used as a `BTreeMap` key downstream so it must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

// -- Manual Eq/Ord so Value can live in BTreeSet / BTreeMap --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        use Value::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Text(a), Text(b)) => a.cmp(b),
            // numbers sort before text, and numerically among themselves
            (Text(_), _) => Ordering::Greater,
            (_, Text(_)) => Ordering::Less,
            (a, b) => {
                let (x, y) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                // Integer(1) and Float(1.0) are distinct values; keep Ord consistent with Eq
                x.total_cmp(&y)
                    .then_with(|| matches!(a, Float(_)).cmp(&matches!(b, Float(_))))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Null => write!(f, "<blank>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl Value {
    /// Build a numeric value, keeping whole numbers as `Integer`.
    pub fn number(v: f64) -> Self {
        if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Value::Integer(v as i64)
        } else {
            Value::Float(v)
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this cell equals the categorical choice `choice`.
    ///
    /// Numeric cells compare by their display form so a choice taken from
    /// a dropdown of numbers still matches.
    pub fn matches(&self, choice: &str) -> bool {
        match self {
            Value::Text(s) => s == choice,
            Value::Null => false,
            other => other.to_string() == choice,
        }
    }
}

// ---------------------------------------------------------------------------
// SurveyRecord – one row of the survey
// ---------------------------------------------------------------------------

/// One survey response with a value for every [`Column`].
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    values: Vec<Value>,
}

impl SurveyRecord {
    /// Build a record from values laid out in [`Column::ALL`] order.
    ///
    /// Returns `None` when the number of values does not match the schema.
    pub fn from_values(values: Vec<Value>) -> Option<Self> {
        (values.len() == Column::COUNT).then_some(SurveyRecord { values })
    }

    /// Build a record from a partial column → value list; the rest stay `Null`.
    pub fn with(cells: &[(Column, Value)]) -> Self {
        let mut values = vec![Value::Null; Column::COUNT];
        for (col, val) in cells {
            values[col.index()] = val.clone();
        }
        SurveyRecord { values }
    }

    pub fn get(&self, column: Column) -> &Value {
        &self.values[column.index()]
    }

    /// Categorical text of `column`, `None` for blank or numeric cells.
    pub fn text(&self, column: Column) -> Option<&str> {
        self.get(column).as_str()
    }

    pub fn number(&self, column: Column) -> Option<f64> {
        self.get(column).as_f64()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded survey
// ---------------------------------------------------------------------------

/// The full parsed survey with pre-computed distinct values.
///
/// Built once and only read afterwards; every filter and aggregation takes
/// it by shared reference.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<SurveyRecord>,
    /// For each column the sorted set of distinct non-blank values.
    unique_values: BTreeMap<Column, BTreeSet<Value>>,
}

impl Dataset {
    /// Build the column indices from the loaded records.
    pub fn from_records(records: Vec<SurveyRecord>) -> Self {
        let mut unique_values: BTreeMap<Column, BTreeSet<Value>> = BTreeMap::new();
        for rec in &records {
            for col in Column::ALL {
                let val = rec.get(col);
                if !val.is_null() {
                    unique_values.entry(col).or_default().insert(val.clone());
                }
            }
        }
        Dataset {
            records,
            unique_values,
        }
    }

    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&SurveyRecord> {
        self.records.get(index)
    }

    /// Sorted distinct non-blank values of `column`.
    pub fn unique_values(&self, column: Column) -> impl Iterator<Item = &Value> {
        self.unique_values.get(&column).into_iter().flatten()
    }

    /// Inclusive min/max of a numeric column, `None` when it has no numbers.
    pub fn numeric_range(&self, column: Column) -> Option<(f64, f64)> {
        if column.kind() != ColumnKind::Numeric {
            return None;
        }
        let nums = self.unique_values(column).filter_map(Value::as_f64);
        nums.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
