use std::collections::BTreeSet;

use super::model::{Dataset, SurveyRecord};
use super::schema::Column;

// ---------------------------------------------------------------------------
// Filter chain: ordered dependent dimensions
// ---------------------------------------------------------------------------

/// An ordered list of categorical columns where each level's options depend
/// on the choices made at every level above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChain {
    dimensions: Vec<Column>,
}

impl FilterChain {
    pub fn new(dimensions: Vec<Column>) -> Self {
        FilterChain { dimensions }
    }

    /// District → Upazilla → Union → Village.
    pub fn location() -> Self {
        FilterChain::new(Column::LOCATION.to_vec())
    }

    pub fn dimensions(&self) -> &[Column] {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// The column one level below the deepest resolved dimension.
    ///
    /// Nothing selected gives the first dimension; a fully resolved chain
    /// gives the last one.
    pub fn drilldown_column(&self, selection: &Selection) -> Option<Column> {
        let depth = selection.depth();
        self.dimensions
            .get(depth)
            .or_else(|| self.dimensions.last())
            .copied()
    }
}

// ---------------------------------------------------------------------------
// Selection: chosen values per dimension
// ---------------------------------------------------------------------------

/// Chosen values for each dimension of a [`FilterChain`].
///
/// An empty set at a level means "unselected" and does not constrain records.
/// Single-select widgets keep at most one value per level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    levels: Vec<BTreeSet<String>>,
}

impl Selection {
    /// An unselected state for `chain`.
    pub fn new(chain: &FilterChain) -> Self {
        Selection {
            levels: vec![BTreeSet::new(); chain.len()],
        }
    }

    /// Build a single-valued selection from a prefix of optional values.
    pub fn from_prefix(chain: &FilterChain, prefix: &[Option<&str>]) -> Self {
        let mut sel = Selection::new(chain);
        for (level, value) in sel.levels.iter_mut().zip(prefix) {
            if let Some(v) = value {
                level.insert(v.to_string());
            }
        }
        sel
    }

    pub fn values(&self, index: usize) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.levels.get(index).unwrap_or(&EMPTY)
    }

    /// The single chosen value at `index`, if exactly one is chosen.
    pub fn single(&self, index: usize) -> Option<&str> {
        let vals = self.values(index);
        if vals.len() == 1 {
            vals.iter().next().map(String::as_str)
        } else {
            None
        }
    }

    /// Whether no level holds more than one value.
    pub fn is_single(&self) -> bool {
        self.levels.iter().all(|l| l.len() <= 1)
    }

    pub fn is_selected(&self, index: usize) -> bool {
        !self.values(index).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(BTreeSet::is_empty)
    }

    /// Number of leading levels that have a value.
    pub fn depth(&self) -> usize {
        self.levels.iter().take_while(|l| !l.is_empty()).count()
    }

    /// Whether `record` satisfies every non-empty level before `end`.
    pub fn admits_prefix(&self, chain: &FilterChain, record: &SurveyRecord, end: usize) -> bool {
        chain
            .dimensions
            .iter()
            .zip(&self.levels)
            .take(end)
            .all(|(col, chosen)| {
                chosen.is_empty()
                    || record
                        .text(*col)
                        .map(|v| chosen.contains(v))
                        .unwrap_or(false)
            })
    }

    /// Whether `record` satisfies every non-empty level.
    pub fn admits(&self, chain: &FilterChain, record: &SurveyRecord) -> bool {
        self.admits_prefix(chain, record, chain.len())
    }

    /// Valid iff every chosen value exists under the choices above it.
    pub fn is_valid(&self, dataset: &Dataset, chain: &FilterChain) -> bool {
        (0..chain.len()).all(|i| {
            let chosen = self.values(i);
            if chosen.is_empty() {
                return true;
            }
            let options = options_for(dataset, chain, i, self);
            chosen.iter().all(|v| options.contains(v.as_str()))
        })
    }

    /// Replace the value at `index` with `value` (single-select).
    pub fn choose(&mut self, dataset: &Dataset, chain: &FilterChain, index: usize, value: &str) {
        if let Some(level) = self.levels.get_mut(index) {
            level.clear();
            level.insert(value.to_string());
            self.cascade(dataset, chain, index);
        }
    }

    /// Add or remove `value` at `index` (multi-select).
    pub fn toggle(&mut self, dataset: &Dataset, chain: &FilterChain, index: usize, value: &str) {
        if let Some(level) = self.levels.get_mut(index) {
            if !level.remove(value) {
                level.insert(value.to_string());
            }
            self.cascade(dataset, chain, index);
        }
    }

    /// Unselect `index` and every level below it.
    pub fn clear(&mut self, index: usize) {
        for level in self.levels.iter_mut().skip(index) {
            level.clear();
        }
    }

    /// Revalidate every level below `changed` after it was edited.
    ///
    /// Values no longer reachable under the new prefix are dropped. Once a
    /// level is left without any value, everything beneath it is cleared.
    fn cascade(&mut self, dataset: &Dataset, chain: &FilterChain, changed: usize) {
        if self.values(changed).is_empty() {
            self.clear(changed);
            return;
        }
        for i in changed + 1..self.levels.len() {
            if self.levels[i].is_empty() {
                continue;
            }
            let options: BTreeSet<String> = options_for(dataset, chain, i, self)
                .into_iter()
                .map(str::to_string)
                .collect();
            let before = self.levels[i].len();
            self.levels[i].retain(|v| options.contains(v));
            if self.levels[i].is_empty() {
                log::debug!(
                    "{} selection invalidated, clearing levels from {i}",
                    chain.dimensions[i]
                );
                self.clear(i);
                return;
            }
            if self.levels[i].len() != before {
                log::debug!("dropped stale {} values", chain.dimensions[i]);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Distinct values of dimension `index` among records matching the selected
/// values of dimensions `0..index`.
///
/// Blank cells are never offered. An out-of-range index yields no options.
pub fn options_for<'a>(
    dataset: &'a Dataset,
    chain: &FilterChain,
    index: usize,
    selection: &Selection,
) -> BTreeSet<&'a str> {
    let Some(&column) = chain.dimensions.get(index) else {
        return BTreeSet::new();
    };
    dataset
        .records()
        .iter()
        .filter(|rec| selection.admits_prefix(chain, rec, index))
        .filter_map(|rec| rec.text(column))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn place(d: &str, u: &str, un: &str, v: &str) -> SurveyRecord {
        SurveyRecord::with(&[
            (Column::District, Value::from(d)),
            (Column::Upazilla, Value::from(u)),
            (Column::Union, Value::from(un)),
            (Column::Village, Value::from(v)),
        ])
    }

    fn villages() -> Dataset {
        Dataset::from_records(vec![
            place("A", "X", "X1", "x1a"),
            place("A", "X", "X2", "x2a"),
            place("A", "Y", "Y1", "y1a"),
            place("B", "Z", "Z1", "z1a"),
            place("B", "Z", "Z1", "z1b"),
        ])
    }

    fn sorted<'a>(set: BTreeSet<&'a str>) -> Vec<&'a str> {
        set.into_iter().collect()
    }

    #[test]
    fn options_follow_the_district_prefix() {
        let ds = Dataset::from_records(vec![
            place("A", "X", "", ""),
            place("A", "Y", "", ""),
            place("B", "Z", "", ""),
        ]);
        let chain = FilterChain::location();

        let a = Selection::from_prefix(&chain, &[Some("A")]);
        assert_eq!(sorted(options_for(&ds, &chain, 1, &a)), vec!["X", "Y"]);

        let b = Selection::from_prefix(&chain, &[Some("B")]);
        assert_eq!(sorted(options_for(&ds, &chain, 1, &b)), vec!["Z"]);

        let c = Selection::from_prefix(&chain, &[Some("C")]);
        assert!(options_for(&ds, &chain, 1, &c).is_empty());
    }

    #[test]
    fn empty_prefix_offers_every_value() {
        let ds = villages();
        let chain = FilterChain::location();
        let sel = Selection::new(&chain);
        assert_eq!(sorted(options_for(&ds, &chain, 0, &sel)), vec!["A", "B"]);
        assert_eq!(sorted(options_for(&ds, &chain, 1, &sel)), vec!["X", "Y", "Z"]);
        assert!(options_for(&ds, &chain, 9, &sel).is_empty());
    }

    #[test]
    fn options_only_contain_values_reachable_under_prefix() {
        let ds = villages();
        let chain = FilterChain::location();
        let sel = Selection::from_prefix(&chain, &[Some("A"), Some("X")]);
        for union in options_for(&ds, &chain, 2, &sel) {
            assert!(ds.records().iter().any(|r| {
                r.text(Column::District) == Some("A")
                    && r.text(Column::Upazilla) == Some("X")
                    && r.text(Column::Union) == Some(union)
            }));
        }
        assert_eq!(sorted(options_for(&ds, &chain, 2, &sel)), vec!["X1", "X2"]);
    }

    #[test]
    fn clearing_a_parent_resets_all_descendants() {
        let ds = villages();
        let chain = FilterChain::location();
        let mut sel =
            Selection::from_prefix(&chain, &[Some("A"), Some("X"), Some("X1"), Some("x1a")]);
        assert!(sel.is_valid(&ds, &chain));

        sel.clear(1);
        assert_eq!(sel.single(0), Some("A"));
        for i in 1..4 {
            assert!(!sel.is_selected(i), "level {i} left dangling");
        }
    }

    #[test]
    fn changing_a_parent_clears_invalidated_children_transitively() {
        let ds = villages();
        let chain = FilterChain::location();
        let mut sel = Selection::new(&chain);
        sel.choose(&ds, &chain, 0, "A");
        sel.choose(&ds, &chain, 1, "X");
        sel.choose(&ds, &chain, 2, "X1");

        sel.choose(&ds, &chain, 0, "B");
        assert_eq!(sel.single(0), Some("B"));
        assert_eq!(sel.depth(), 1);
        assert!(sel.is_valid(&ds, &chain));
    }

    #[test]
    fn changing_a_parent_keeps_children_that_remain_valid() {
        let ds = Dataset::from_records(vec![
            place("A", "X", "Shared", "v1"),
            place("A", "Y", "Shared", "v2"),
        ]);
        let chain = FilterChain::location();
        let mut sel = Selection::new(&chain);
        sel.choose(&ds, &chain, 0, "A");
        sel.choose(&ds, &chain, 1, "X");
        sel.choose(&ds, &chain, 2, "Shared");
        sel.choose(&ds, &chain, 3, "v1");

        sel.choose(&ds, &chain, 1, "Y");
        assert_eq!(sel.single(2), Some("Shared"));
        // v1 only exists under X
        assert!(!sel.is_selected(3));
    }

    #[test]
    fn toggling_keeps_multiple_values_and_prunes_children() {
        let ds = villages();
        let chain = FilterChain::location();
        let mut sel = Selection::new(&chain);
        sel.toggle(&ds, &chain, 0, "A");
        sel.toggle(&ds, &chain, 0, "B");
        sel.toggle(&ds, &chain, 1, "Y");
        sel.toggle(&ds, &chain, 1, "Z");
        assert!(!sel.is_single());
        assert_eq!(sorted(options_for(&ds, &chain, 2, &sel)), vec!["Y1", "Z1"]);

        sel.toggle(&ds, &chain, 0, "B");
        assert_eq!(sel.values(1).iter().collect::<Vec<_>>(), vec!["Y"]);
        assert!(sel.is_single());

        sel.toggle(&ds, &chain, 0, "A");
        assert!(sel.is_empty());
    }

    #[test]
    fn is_valid_rejects_unreachable_values() {
        let ds = villages();
        let chain = FilterChain::location();
        let sel = Selection::from_prefix(&chain, &[Some("A"), Some("Z")]);
        assert!(!sel.is_valid(&ds, &chain));
    }

    #[test]
    fn drilldown_moves_one_level_below_the_deepest_choice() {
        let chain = FilterChain::location();
        let none = Selection::new(&chain);
        assert_eq!(chain.drilldown_column(&none), Some(Column::District));

        let district = Selection::from_prefix(&chain, &[Some("A")]);
        assert_eq!(chain.drilldown_column(&district), Some(Column::Upazilla));

        let union = Selection::from_prefix(&chain, &[Some("A"), Some("X"), Some("X1")]);
        assert_eq!(chain.drilldown_column(&union), Some(Column::Village));

        let full = Selection::from_prefix(&chain, &[Some("A"), Some("X"), Some("X1"), Some("x1a")]);
        assert_eq!(chain.drilldown_column(&full), Some(Column::Village));
    }
}
