use crate::config::DashboardConfig;
use crate::dashboard::{build_page, LocationControl, Page, View};
use crate::data::cascade::{options_for, FilterChain, Selection};
use crate::data::filter::RecordFilter;
use crate::data::model::Dataset;
use crate::data::schema::Column;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded survey (None until a load succeeds).
    pub dataset: Option<Dataset>,

    /// Active dashboard page.
    pub view: View,

    pub chain: FilterChain,

    /// Chosen location values.
    pub selection: Selection,

    /// Gender / card / skilled choices and age range.
    pub filter: RecordFilter,

    /// Charts for the current choices, rebuilt in full after every change.
    pub page: Page,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let chain = FilterChain::location();
        Self {
            config,
            dataset: None,
            view: View::default(),
            selection: Selection::new(&chain),
            chain,
            filter: RecordFilter::default(),
            page: Page::default(),
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset and reset every choice.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.selection = Selection::new(&self.chain);
        self.filter = RecordFilter::default();
        if let Some((lo, hi)) = dataset.numeric_range(Column::Age) {
            self.filter.age_range = Some((lo.min(0.0), hi.max(100.0)));
        }
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the page for the current view and choices.
    pub fn refresh(&mut self) {
        let Some(ds) = &self.dataset else {
            self.page = Page::default();
            return;
        };
        match build_page(self.view, ds, &self.chain, &self.selection, &self.filter) {
            Ok(page) => self.page = page,
            Err(e) => {
                log::error!("Failed to build {:?}: {e}", self.view);
                self.status_message = Some(format!("Error: {e}"));
                self.page = Page::default();
            }
        }
    }

    pub fn set_view(&mut self, view: View) {
        if self.view == view {
            return;
        }
        // single-select views cannot hold several values per level
        if view.controls().location == LocationControl::Single && !self.selection.is_single() {
            self.selection = Selection::new(&self.chain);
        }
        self.view = view;
        self.refresh();
    }

    /// Options for cascade level `index` under the current selection.
    pub fn location_options(&self, index: usize) -> Vec<String> {
        match &self.dataset {
            Some(ds) => options_for(ds, &self.chain, index, &self.selection)
                .into_iter()
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Choose one value at `index` (`None` clears the level).
    pub fn choose_location(&mut self, index: usize, value: Option<&str>) {
        let Some(ds) = &self.dataset else { return };
        match value {
            Some(v) => self.selection.choose(ds, &self.chain, index, v),
            None => self.selection.clear(index),
        }
        log::debug!("location selection now {:?}", self.selection);
        self.refresh();
    }

    pub fn toggle_location(&mut self, index: usize, value: &str) {
        let Some(ds) = &self.dataset else { return };
        self.selection.toggle(ds, &self.chain, index, value);
        self.refresh();
    }

    /// Choices offered for an independent filter column.
    pub fn choice_options(&self, column: Column) -> Vec<String> {
        match &self.dataset {
            Some(ds) => ds.unique_values(column).map(|v| v.to_string()).collect(),
            None => Vec::new(),
        }
    }

    pub fn set_choice(&mut self, column: Column, value: Option<&str>) {
        self.filter.set_choice(column, value);
        self.refresh();
    }

    pub fn set_age_range(&mut self, lo: f64, hi: f64) {
        self.filter.age_range = Some((lo.min(hi), hi.max(lo)));
        self.refresh();
    }
}
