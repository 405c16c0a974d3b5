use std::collections::BTreeMap;

use super::cascade::{FilterChain, Selection};
use super::model::{Dataset, SurveyRecord};
use super::schema::Column;

// ---------------------------------------------------------------------------
// Independent record filters
// ---------------------------------------------------------------------------

/// Filters applied on top of the cascade, identically at every depth.
///
/// All parts combine conjunctively. An absent equality entry means "All".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    /// column → required value (gender, disability card, skilled status).
    pub equals: BTreeMap<Column, String>,
    /// Inclusive age bounds; records with a blank age fail an active range.
    pub age_range: Option<(f64, f64)>,
    /// Columns that must not be blank.
    pub required: Vec<Column>,
    /// (column, value) pairs that disqualify a record.
    pub excluded: Vec<(Column, String)>,
}

impl RecordFilter {
    /// Set `column` to `value`, or back to "All" when `value` is `None`.
    pub fn set_choice(&mut self, column: Column, value: Option<&str>) {
        match value {
            Some(v) => {
                self.equals.insert(column, v.to_string());
            }
            None => {
                self.equals.remove(&column);
            }
        }
    }

    pub fn choice(&self, column: Column) -> Option<&str> {
        self.equals.get(&column).map(String::as_str)
    }

    /// Combine with another filter; both must pass.
    pub fn and(mut self, other: &RecordFilter) -> RecordFilter {
        for (col, v) in &other.equals {
            self.equals.entry(*col).or_insert_with(|| v.clone());
        }
        self.age_range = match (self.age_range, other.age_range) {
            (Some((a0, a1)), Some((b0, b1))) => Some((a0.max(b0), a1.min(b1))),
            (a, b) => a.or(b),
        };
        self.required.extend(other.required.iter().copied());
        self.excluded.extend(other.excluded.iter().cloned());
        self
    }

    pub fn admits(&self, record: &SurveyRecord) -> bool {
        let equals_ok = self
            .equals
            .iter()
            .all(|(col, want)| record.get(*col).matches(want));
        if !equals_ok {
            return false;
        }
        if let Some((lo, hi)) = self.age_range {
            match record.number(Column::Age) {
                Some(age) if age >= lo && age <= hi => {}
                _ => return false,
            }
        }
        if self.required.iter().any(|col| record.get(*col).is_null()) {
            return false;
        }
        !self
            .excluded
            .iter()
            .any(|(col, v)| record.get(*col).matches(v))
    }
}

/// Return indices of records that pass the cascade selection and `filter`.
pub fn matching_indices(
    dataset: &Dataset,
    chain: &FilterChain,
    selection: &Selection,
    filter: &RecordFilter,
) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.admits(chain, rec) && filter.admits(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn person(district: &str, gender: &str, card: &str, age: Option<i64>) -> SurveyRecord {
        SurveyRecord::with(&[
            (Column::District, Value::from(district)),
            (Column::Gender, Value::from(gender)),
            (Column::DisabilityCard, Value::from(card)),
            (Column::Age, age.map(Value::Integer).unwrap_or(Value::Null)),
        ])
    }

    fn people() -> Dataset {
        Dataset::from_records(vec![
            person("A", "Male", "Yes", Some(10)),
            person("A", "Female", "No", Some(35)),
            person("B", "Female", "Yes", Some(60)),
            person("B", "Male", "No", None),
        ])
    }

    #[test]
    fn default_filter_admits_everything() {
        let ds = people();
        let chain = FilterChain::location();
        let idx = matching_indices(&ds, &chain, &Selection::new(&chain), &RecordFilter::default());
        assert_eq!(idx, vec![0, 1, 2, 3]);
    }

    #[test]
    fn independent_filters_combine_with_the_cascade() {
        let ds = people();
        let chain = FilterChain::location();
        let sel = Selection::from_prefix(&chain, &[Some("B")]);
        let mut filter = RecordFilter::default();
        filter.set_choice(Column::Gender, Some("Female"));
        filter.set_choice(Column::DisabilityCard, Some("Yes"));
        assert_eq!(matching_indices(&ds, &chain, &sel, &filter), vec![2]);

        filter.set_choice(Column::DisabilityCard, None);
        assert_eq!(filter.choice(Column::DisabilityCard), None);
        let sel_a = Selection::from_prefix(&chain, &[Some("A")]);
        assert_eq!(matching_indices(&ds, &chain, &sel_a, &filter), vec![1]);
    }

    #[test]
    fn age_range_is_inclusive_and_drops_blank_ages() {
        let ds = people();
        let chain = FilterChain::location();
        let filter = RecordFilter {
            age_range: Some((10.0, 35.0)),
            ..Default::default()
        };
        assert_eq!(
            matching_indices(&ds, &chain, &Selection::new(&chain), &filter),
            vec![0, 1]
        );
    }

    #[test]
    fn required_and_excluded_columns() {
        let ds = Dataset::from_records(vec![
            SurveyRecord::with(&[(Column::GoesToSchool, "Yes".into())]),
            SurveyRecord::with(&[(Column::GoesToSchool, "Not Applicable".into())]),
            SurveyRecord::with(&[]),
        ]);
        let chain = FilterChain::location();
        let filter = RecordFilter {
            required: vec![Column::GoesToSchool],
            excluded: vec![(Column::GoesToSchool, "Not Applicable".to_string())],
            ..Default::default()
        };
        assert_eq!(matching_indices(&ds, &chain, &Selection::new(&chain), &filter), vec![0]);
    }

    #[test]
    fn and_intersects_age_ranges_and_keeps_every_constraint() {
        let a = RecordFilter {
            age_range: Some((0.0, 50.0)),
            required: vec![Column::PersonIncome],
            ..Default::default()
        };
        let mut b = RecordFilter {
            age_range: Some((18.0, 100.0)),
            ..Default::default()
        };
        b.set_choice(Column::Skilled, Some("Yes"));

        let both = a.and(&b);
        assert_eq!(both.age_range, Some((18.0, 50.0)));
        assert_eq!(both.required, vec![Column::PersonIncome]);
        assert_eq!(both.choice(Column::Skilled), Some("Yes"));
    }
}
