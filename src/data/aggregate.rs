use std::collections::BTreeMap;

use thiserror::Error;

use super::cascade::{FilterChain, Selection};
use super::filter::{matching_indices, RecordFilter};
use super::model::{Dataset, Value};
use super::schema::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMode {
    /// Number of records per distinct value of `column`.
    Count { column: Column },
    /// Sum of numeric `value` per distinct value of `group_by`.
    Sum { group_by: Column, value: Column },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("column '{0}' is not numeric and cannot be summed")]
    NotNumeric(Column),
}

// ---------------------------------------------------------------------------
// AggregationResult
// ---------------------------------------------------------------------------

/// Category → count (or sum), ordered by category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResult {
    entries: BTreeMap<Value, f64>,
}

impl AggregationResult {
    /// Measure for the category whose display label is `label`.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k.matches(label))
            .map(|(_, v)| *v)
    }

    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in category order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, f64)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    /// A copy holding exactly `labels`, with 0 for labels never seen.
    pub fn only(&self, labels: &[&str]) -> AggregationResult {
        let entries = labels
            .iter()
            .map(|l| {
                let measure = self
                    .entries
                    .iter()
                    .find(|(k, _)| k.matches(l))
                    .map_or(0.0, |(_, v)| *v);
                (Value::from(*l), measure)
            })
            .collect();
        AggregationResult { entries }
    }

    /// Labels with measures, largest first; ties keep category order.
    pub fn ranked(&self) -> Vec<(String, f64)> {
        let mut out: Vec<(String, f64)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        // stable sort keeps the BTreeMap order among equal measures
        out.sort_by(|a, b| b.1.total_cmp(&a.1));
        out
    }
}

/// Aggregate the records matching `selection` and `filter`.
///
/// Count skips blank categories. Sum groups by non-blank keys and treats a
/// blank measure as zero, so every present group appears in the result.
/// No matching records gives an empty result.
pub fn aggregate(
    dataset: &Dataset,
    chain: &FilterChain,
    selection: &Selection,
    filter: &RecordFilter,
    mode: AggregateMode,
) -> Result<AggregationResult, AggregateError> {
    let indices = matching_indices(dataset, chain, selection, filter);
    aggregate_indices(dataset, &indices, mode)
}

/// Aggregate an already filtered set of record indices.
pub fn aggregate_indices(
    dataset: &Dataset,
    indices: &[usize],
    mode: AggregateMode,
) -> Result<AggregationResult, AggregateError> {
    let mut entries: BTreeMap<Value, f64> = BTreeMap::new();
    let records = indices.iter().filter_map(|&i| dataset.record(i));

    match mode {
        AggregateMode::Count { column } => {
            for rec in records {
                let key = rec.get(column);
                if !key.is_null() {
                    *entries.entry(key.clone()).or_insert(0.0) += 1.0;
                }
            }
        }
        AggregateMode::Sum { group_by, value } => {
            if !value.is_numeric() {
                return Err(AggregateError::NotNumeric(value));
            }
            for rec in records {
                let key = rec.get(group_by);
                if !key.is_null() {
                    *entries.entry(key.clone()).or_insert(0.0) += rec.number(value).unwrap_or(0.0);
                }
            }
        }
    }
    Ok(AggregationResult { entries })
}

// ---------------------------------------------------------------------------
// Two-column group sizes
// ---------------------------------------------------------------------------

/// Record counts per (row category, column category) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    pub row: Column,
    pub column: Column,
    cells: BTreeMap<(Value, Value), u64>,
}

impl CrossTab {
    pub fn get(&self, row: &str, column: &str) -> u64 {
        self.cells
            .iter()
            .find(|((r, c), _)| r.matches(row) && c.matches(column))
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// (row label, column label, count) triples in category order.
    pub fn rows(&self) -> Vec<(String, String, u64)> {
        self.cells
            .iter()
            .map(|((r, c), n)| (r.to_string(), c.to_string(), *n))
            .collect()
    }

    /// Distinct column categories, in order.
    pub fn column_labels(&self) -> Vec<String> {
        let mut labels: Vec<&Value> = self.cells.keys().map(|(_, c)| c).collect();
        labels.sort();
        labels.dedup();
        labels.into_iter().map(Value::to_string).collect()
    }

    /// Distinct row categories, in order.
    pub fn row_labels(&self) -> Vec<String> {
        let mut labels: Vec<&Value> = self.cells.keys().map(|(r, _)| r).collect();
        labels.dedup();
        labels.into_iter().map(Value::to_string).collect()
    }
}

/// Count records per pair of non-blank values of `row` and `column`.
pub fn cross_count(dataset: &Dataset, indices: &[usize], row: Column, column: Column) -> CrossTab {
    let mut cells: BTreeMap<(Value, Value), u64> = BTreeMap::new();
    for rec in indices.iter().filter_map(|&i| dataset.record(i)) {
        let (r, c) = (rec.get(row), rec.get(column));
        if r.is_null() || c.is_null() {
            continue;
        }
        *cells.entry((r.clone(), c.clone())).or_insert(0) += 1;
    }
    CrossTab { row, column, cells }
}

// ---------------------------------------------------------------------------
// Record listing
// ---------------------------------------------------------------------------

/// Display rows of `columns` for each record in `indices`. Blank cells are
/// rendered as empty strings.
pub fn list_records(dataset: &Dataset, indices: &[usize], columns: &[Column]) -> Vec<Vec<String>> {
    indices
        .iter()
        .filter_map(|&i| dataset.record(i))
        .map(|rec| {
            columns
                .iter()
                .map(|col| match rec.get(*col) {
                    Value::Null => String::new(),
                    v => v.to_string(),
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SurveyRecord;

    fn rec(cells: &[(Column, &str)]) -> SurveyRecord {
        let cells: Vec<(Column, Value)> = cells
            .iter()
            .map(|(c, v)| {
                let val = if c.is_numeric() {
                    Value::number(v.parse().unwrap())
                } else {
                    Value::from(*v)
                };
                (*c, val)
            })
            .collect();
        SurveyRecord::with(&cells)
    }

    fn worker(gender: &str, occupation: &str, district: &str) -> SurveyRecord {
        rec(&[
            (Column::Gender, gender),
            (Column::PersonOccupation, occupation),
            (Column::District, district),
        ])
    }

    fn workers() -> Dataset {
        Dataset::from_records(vec![
            worker("Female", "Teacher", "A"),
            worker("Female", "Teacher", "A"),
            worker("Female", "Farmer", "B"),
            worker("Male", "Farmer", "B"),
            rec(&[(Column::Gender, "Male"), (Column::District, "B")]),
        ])
    }

    fn count(column: Column) -> AggregateMode {
        AggregateMode::Count { column }
    }

    #[test]
    fn counts_occupations_for_selected_gender() {
        let ds = workers();
        let chain = FilterChain::location();
        let mut filter = RecordFilter::default();
        filter.set_choice(Column::Gender, Some("Female"));

        let result = aggregate(
            &ds,
            &chain,
            &Selection::new(&chain),
            &filter,
            count(Column::PersonOccupation),
        )
        .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get("Teacher"), Some(2.0));
        assert_eq!(result.get("Farmer"), Some(1.0));
    }

    #[test]
    fn empty_selection_matches_global_distribution() {
        let ds = workers();
        let chain = FilterChain::location();
        let result = aggregate(
            &ds,
            &chain,
            &Selection::new(&chain),
            &RecordFilter::default(),
            count(Column::District),
        )
        .unwrap();

        let mut expected: BTreeMap<String, f64> = BTreeMap::new();
        for r in ds.records() {
            *expected.entry(r.text(Column::District).unwrap().to_string()).or_default() += 1.0;
        }
        let got: BTreeMap<String, f64> = result.iter().map(|(k, v)| (k.to_string(), v)).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn blank_categories_are_not_counted() {
        let ds = workers();
        let idx: Vec<usize> = (0..ds.len()).collect();
        let result = aggregate_indices(&ds, &idx, count(Column::PersonOccupation)).unwrap();
        assert_eq!(result.total(), 4.0);
    }

    #[test]
    fn over_constrained_selection_yields_empty_result() {
        let ds = Dataset::from_records(vec![
            rec(&[(Column::District, "A"), (Column::Upazilla, "X")]),
            rec(&[(Column::District, "B"), (Column::Upazilla, "Z")]),
        ]);
        let chain = FilterChain::location();
        let sel = Selection::from_prefix(&chain, &[Some("A"), Some("Z")]);
        let result = aggregate(
            &ds,
            &chain,
            &sel,
            &RecordFilter::default(),
            count(Column::Union),
        )
        .unwrap();
        assert!(result.is_empty());
        assert!(result.ranked().is_empty());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let ds = workers();
        let chain = FilterChain::location();
        let sel = Selection::from_prefix(&chain, &[Some("B")]);
        let filter = RecordFilter::default();
        let first = aggregate(&ds, &chain, &sel, &filter, count(Column::Gender)).unwrap();
        let second = aggregate(&ds, &chain, &sel, &filter, count(Column::Gender)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn sums_family_members_per_occupation() {
        let ds = Dataset::from_records(vec![
            rec(&[(Column::FamilyOccupation, "Farming"), (Column::FamilyMembers, "4")]),
            rec(&[(Column::FamilyOccupation, "Farming"), (Column::FamilyMembers, "6")]),
            rec(&[(Column::FamilyOccupation, "Business"), (Column::FamilyMembers, "3")]),
            rec(&[(Column::FamilyOccupation, "Business")]),
        ]);
        let chain = FilterChain::location();
        let mode = AggregateMode::Sum {
            group_by: Column::FamilyOccupation,
            value: Column::FamilyMembers,
        };
        let result = aggregate(
            &ds,
            &chain,
            &Selection::new(&chain),
            &RecordFilter::default(),
            mode,
        )
        .unwrap();
        assert_eq!(result.get("Farming"), Some(10.0));
        assert_eq!(result.get("Business"), Some(3.0));
        assert_eq!(result.ranked()[0], ("Farming".to_string(), 10.0));
    }

    #[test]
    fn summing_a_categorical_column_is_rejected() {
        let ds = workers();
        let mode = AggregateMode::Sum {
            group_by: Column::District,
            value: Column::Gender,
        };
        assert_eq!(
            aggregate_indices(&ds, &[0], mode),
            Err(AggregateError::NotNumeric(Column::Gender))
        );
    }

    #[test]
    fn only_keeps_requested_labels_and_fills_missing_with_zero() {
        let ds = workers();
        let chain = FilterChain::location();
        let result = aggregate(
            &ds,
            &chain,
            &Selection::new(&chain),
            &RecordFilter::default(),
            count(Column::Gender),
        )
        .unwrap();
        let picked = result.only(&["Female", "Other"]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.get("Female"), Some(3.0));
        assert_eq!(picked.get("Other"), Some(0.0));
        assert_eq!(picked.get("Male"), None);
    }

    #[test]
    fn ranked_orders_by_measure_then_label() {
        let ds = workers();
        let idx: Vec<usize> = (0..ds.len()).collect();
        let result = aggregate_indices(&ds, &idx, count(Column::Gender)).unwrap();
        assert_eq!(
            result.ranked(),
            vec![("Female".to_string(), 3.0), ("Male".to_string(), 2.0)]
        );
    }

    #[test]
    fn cross_count_groups_pairs_and_skips_blanks() {
        let ds = workers();
        let idx: Vec<usize> = (0..ds.len()).collect();
        let tab = cross_count(&ds, &idx, Column::PersonOccupation, Column::Gender);
        assert_eq!(tab.get("Farmer", "Female"), 1);
        assert_eq!(tab.get("Farmer", "Male"), 1);
        assert_eq!(tab.get("Teacher", "Female"), 2);
        assert_eq!(tab.get("Teacher", "Male"), 0);
        assert_eq!(tab.column_labels(), vec!["Female", "Male"]);
        assert_eq!(tab.row_labels(), vec!["Farmer", "Teacher"]);
        assert_eq!(tab.rows().len(), 3);
    }

    #[test]
    fn list_records_renders_blank_cells_empty() {
        let ds = workers();
        let rows = list_records(&ds, &[4], &[Column::Gender, Column::PersonOccupation]);
        assert_eq!(rows, vec![vec!["Male".to_string(), String::new()]]);
    }
}
