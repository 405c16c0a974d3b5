use crate::data::aggregate::{
    aggregate_indices, cross_count, list_records, AggregateError, AggregateMode, AggregationResult,
};
use crate::data::cascade::{FilterChain, Selection};
use crate::data::filter::{matching_indices, RecordFilter};
use crate::data::model::Dataset;
use crate::data::schema::Column;

const NOT_APPLICABLE: &str = "Not Applicable";

/// Education columns whose "Not Applicable" answers are left out.
const EDUCATION_COLUMNS: [Column; 4] = [
    Column::GoesToSchool,
    Column::Qualification,
    Column::SchoolType,
    Column::EducationStipend,
];

/// Columns shown in the personal information table.
pub const PERSONAL_COLUMNS: [Column; 9] = [
    Column::Name,
    Column::Age,
    Column::FatherName,
    Column::MotherName,
    Column::Gender,
    Column::District,
    Column::Upazilla,
    Column::Union,
    Column::Village,
];

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    LocationSummary,
    Services,
    Education,
    FamilyIncome,
    PersonIncome,
    PersonalInformation,
}

/// How a view lets the user pick location values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationControl {
    None,
    Single,
    Multi,
}

/// Widgets a view exposes in the side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub location: LocationControl,
    /// Columns offered as "All / value" choices.
    pub choices: Vec<Column>,
    pub age_range: bool,
}

impl View {
    pub const ALL: [View; 6] = [
        View::LocationSummary,
        View::Services,
        View::Education,
        View::FamilyIncome,
        View::PersonIncome,
        View::PersonalInformation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::LocationSummary => "Baseline Survey Summary",
            View::Services => "Allowance and Services",
            View::Education => "Education Summary",
            View::FamilyIncome => "Family Income Situation",
            View::PersonIncome => "Person Income Situation",
            View::PersonalInformation => "Location-wise Personal Information",
        }
    }

    pub fn controls(self) -> Controls {
        let (location, choices, age_range) = match self {
            View::LocationSummary => (
                LocationControl::Single,
                vec![Column::Gender, Column::DisabilityCard],
                false,
            ),
            View::Services => (LocationControl::None, Vec::new(), false),
            View::Education | View::FamilyIncome => (
                LocationControl::None,
                vec![Column::Gender, Column::DisabilityCard],
                false,
            ),
            View::PersonIncome => (
                LocationControl::None,
                vec![Column::Gender, Column::DisabilityCard, Column::Skilled],
                false,
            ),
            View::PersonalInformation => (LocationControl::Multi, vec![Column::Gender], true),
        };
        Controls {
            location,
            choices,
            age_range,
        }
    }

    /// Filter every chart of the view starts from, before user choices.
    pub fn baseline(self) -> RecordFilter {
        match self {
            View::Education => RecordFilter {
                excluded: EDUCATION_COLUMNS
                    .iter()
                    .map(|c| (*c, NOT_APPLICABLE.to_string()))
                    .collect(),
                ..Default::default()
            },
            View::PersonIncome => RecordFilter {
                required: vec![Column::PersonIncome],
                ..Default::default()
            },
            _ => RecordFilter::default(),
        }
    }

    /// Restrict a user filter to the controls this view exposes.
    fn effective_filter(self, user: &RecordFilter) -> RecordFilter {
        let controls = self.controls();
        let mut filter = RecordFilter::default();
        for col in &controls.choices {
            filter.set_choice(*col, user.choice(*col));
        }
        if controls.age_range {
            filter.age_range = user.age_range;
        }
        filter.and(&self.baseline())
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// What a chart displays; the renderer adds no further logic.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    Bar(AggregationResult),
    Pie(AggregationResult),
    /// One bar group per category with a bar per series label.
    GroupedBar {
        categories: Vec<String>,
        series: Vec<(String, Vec<f64>)>,
    },
    Table(Table),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
}

impl Chart {
    fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: &str,
        kind: ChartKind,
    ) -> Self {
        Chart {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.to_string(),
            kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ChartKind::Bar(r) => r.is_empty(),
            ChartKind::Pie(r) => r.total() <= 0.0,
            ChartKind::GroupedBar { categories, .. } => categories.is_empty(),
            ChartKind::Table(t) => t.rows.is_empty(),
        }
    }
}

/// Plain rows of display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Records as JSON objects keyed by header, like a records-oriented export.
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned().map(serde_json::Value::String))
                    .collect()
            })
            .collect()
    }
}

/// Everything a view renders for the current choices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub matching: usize,
    pub charts: Vec<Chart>,
}

/// Recompute every chart of `view` from scratch.
pub fn build_page(
    view: View,
    dataset: &Dataset,
    chain: &FilterChain,
    selection: &Selection,
    user_filter: &RecordFilter,
) -> Result<Page, AggregateError> {
    let filter = view.effective_filter(user_filter);
    let location = match view.controls().location {
        LocationControl::None => Selection::new(chain),
        _ => selection.clone(),
    };
    let idx = matching_indices(dataset, chain, &location, &filter);
    let count = |column: Column| aggregate_indices(dataset, &idx, AggregateMode::Count { column });

    let charts = match view {
        View::LocationSummary => {
            let column = chain.drilldown_column(&location).unwrap_or(Column::District);
            let title = match location.depth() {
                0 => "Records per District".to_string(),
                d if d >= chain.len() => format!("Records in selected {}", column.label()),
                _ => format!("Records per {}", column.label()),
            };
            vec![Chart::new(title, column.label(), "Count", ChartKind::Bar(count(column)?))]
        }
        View::Services => Column::SERVICES
            .iter()
            .map(|col| {
                Ok(Chart::new(
                    col.header().trim(),
                    col.label(),
                    "Count",
                    ChartKind::Pie(count(*col)?.only(&["Yes", "No"])),
                ))
            })
            .collect::<Result<Vec<_>, AggregateError>>()?,
        View::Education => vec![
            Chart::new(
                "Does the child/person go to school/study?",
                "Answer",
                "Count",
                ChartKind::Bar(count(Column::GoesToSchool)?),
            ),
            Chart::new(
                "Educational Qualification",
                "Qualification",
                "Count",
                ChartKind::Pie(count(Column::Qualification)?),
            ),
            Chart::new(
                "Types of Schools Attended",
                "School type",
                "Count",
                ChartKind::Bar(count(Column::SchoolType)?),
            ),
            Chart::new(
                "Education Stipend Status",
                "Stipend",
                "Count",
                ChartKind::Bar(count(Column::EducationStipend)?),
            ),
            Chart::new(
                "Education Stipend Share",
                "Stipend",
                "Count",
                ChartKind::Pie(count(Column::EducationStipend)?),
            ),
        ],
        View::FamilyIncome => vec![
            Chart::new(
                "Main Occupation of Families",
                "Occupation",
                "Count",
                ChartKind::Bar(count(Column::FamilyOccupation)?),
            ),
            Chart::new(
                "Distribution of Family Monthly Income",
                "Income",
                "Count",
                ChartKind::Pie(count(Column::FamilyIncome)?),
            ),
            grouped(
                dataset,
                &idx,
                Column::FamilyOccupation,
                Column::FamilyIncome,
                "Occupation by Monthly Income",
            ),
            Chart::new(
                "Total Family Members by Occupation",
                "Occupation",
                "Family members",
                ChartKind::Bar(aggregate_indices(
                    dataset,
                    &idx,
                    AggregateMode::Sum {
                        group_by: Column::FamilyOccupation,
                        value: Column::FamilyMembers,
                    },
                )?),
            ),
        ],
        View::PersonIncome => vec![
            Chart::new(
                "Income Distribution",
                "Monthly income",
                "Count",
                ChartKind::Bar(count(Column::PersonIncome)?),
            ),
            Chart::new(
                "Occupation Distribution",
                "Occupation",
                "Count",
                ChartKind::Pie(count(Column::PersonOccupation)?),
            ),
            Chart::new(
                "Age for Occupation Distribution",
                "Age for occupation",
                "Count",
                ChartKind::Bar(count(Column::AgeForOccupation)?),
            ),
            occupation_table(dataset, &idx),
        ],
        View::PersonalInformation => {
            let table = Table {
                headers: PERSONAL_COLUMNS
                    .iter()
                    .map(|c| c.header().trim().to_string())
                    .collect(),
                rows: list_records(dataset, &idx, &PERSONAL_COLUMNS),
            };
            vec![Chart::new(
                format!("Total Data Records: {}", idx.len()),
                "",
                "",
                ChartKind::Table(table),
            )]
        }
    };

    log::debug!("{:?}: {} matching records, {} charts", view, idx.len(), charts.len());
    Ok(Page {
        matching: idx.len(),
        charts,
    })
}

fn grouped(dataset: &Dataset, idx: &[usize], row: Column, series: Column, title: &str) -> Chart {
    let tab = cross_count(dataset, idx, row, series);
    let categories = tab.row_labels();
    let series_labels = tab.column_labels();
    let series = series_labels
        .iter()
        .map(|s| {
            let heights = categories.iter().map(|c| tab.get(c, s) as f64).collect();
            (s.clone(), heights)
        })
        .collect();
    Chart::new(
        title,
        row.label(),
        "Count",
        ChartKind::GroupedBar { categories, series },
    )
}

fn occupation_table(dataset: &Dataset, idx: &[usize]) -> Chart {
    let tab = cross_count(dataset, idx, Column::PersonOccupation, Column::PersonIncome);
    let table = Table {
        headers: vec![
            "Occupation".to_string(),
            "Income Category".to_string(),
            "Total Count".to_string(),
        ],
        rows: tab
            .rows()
            .into_iter()
            .map(|(occ, income, n)| vec![occ, income, n.to_string()])
            .collect(),
    };
    Chart::new("Occupation Table", "", "", ChartKind::Table(table))
}
