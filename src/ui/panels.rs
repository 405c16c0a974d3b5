use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::DataSource;
use crate::dashboard::{ChartKind, LocationControl, Table, View};
use crate::data::loader;
use crate::data::schema::Column;
use crate::state::AppState;

/// A location edit collected while widgets borrow the state.
enum LocationEdit {
    Choose(usize, Option<String>),
    Toggle(usize, String),
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No survey loaded.");
        return;
    }

    let controls = state.view.controls();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            match controls.location {
                LocationControl::Single => location_combos(ui, state),
                LocationControl::Multi => location_checklists(ui, state),
                LocationControl::None => {}
            }

            if controls.age_range {
                age_sliders(ui, state);
            }

            for col in &controls.choices {
                choice_radios(ui, state, *col);
            }
        });
}

/// One dropdown per cascade level (single-select views).
fn location_combos(ui: &mut Ui, state: &mut AppState) {
    let mut edit = None;

    for (i, col) in state.chain.dimensions().iter().enumerate() {
        let options = state.location_options(i);
        let current = state.selection.single(i).map(str::to_string);
        let placeholder = format!("Select a {}", col.label());

        ui.strong(col.label());
        egui::ComboBox::from_id_salt(("location", i))
            .width(ui.available_width() - 8.0)
            .selected_text(current.clone().unwrap_or(placeholder))
            .show_ui(ui, |ui: &mut Ui| {
                if ui.selectable_label(current.is_none(), "(any)").clicked() {
                    edit = Some(LocationEdit::Choose(i, None));
                }
                for opt in &options {
                    let selected = current.as_deref() == Some(opt.as_str());
                    if ui.selectable_label(selected, opt.as_str()).clicked() {
                        edit = Some(LocationEdit::Choose(i, Some(opt.clone())));
                    }
                }
            });
        ui.add_space(4.0);
    }
    ui.separator();

    apply_location_edit(state, edit);
}

/// Collapsible checkbox lists per cascade level (multi-select views).
fn location_checklists(ui: &mut Ui, state: &mut AppState) {
    let mut edit = None;

    for (i, col) in state.chain.dimensions().iter().enumerate() {
        let options = state.location_options(i);
        let chosen = state.selection.values(i);

        // Show count of selected / total in the header
        let header_text = format!("{}  ({}/{})", col.label(), chosen.len(), options.len());

        egui::CollapsingHeader::new(RichText::new(header_text).strong())
            .id_salt(("location_list", i))
            .default_open(i == 0)
            .show(ui, |ui: &mut Ui| {
                if ui.small_button("None").clicked() {
                    edit = Some(LocationEdit::Choose(i, None));
                }
                for opt in &options {
                    let mut checked = chosen.contains(opt);
                    if ui.checkbox(&mut checked, opt.as_str()).changed() {
                        edit = Some(LocationEdit::Toggle(i, opt.clone()));
                    }
                }
            });
    }
    ui.separator();

    apply_location_edit(state, edit);
}

fn apply_location_edit(state: &mut AppState, edit: Option<LocationEdit>) {
    match edit {
        Some(LocationEdit::Choose(i, value)) => state.choose_location(i, value.as_deref()),
        Some(LocationEdit::Toggle(i, value)) => state.toggle_location(i, &value),
        None => {}
    }
}

/// "All" plus every value present in the survey.
fn choice_radios(ui: &mut Ui, state: &mut AppState, column: Column) {
    let current = state.filter.choice(column).map(str::to_string);
    let mut picked: Option<Option<String>> = None;

    ui.strong(column.label());
    if ui.radio(current.is_none(), "All").clicked() {
        picked = Some(None);
    }
    for opt in state.choice_options(column) {
        if ui.radio(current.as_deref() == Some(opt.as_str()), opt.as_str()).clicked() {
            picked = Some(Some(opt));
        }
    }
    ui.add_space(6.0);

    if let Some(value) = picked {
        state.set_choice(column, value.as_deref());
    }
}

fn age_sliders(ui: &mut Ui, state: &mut AppState) {
    let upper = state
        .dataset
        .as_ref()
        .and_then(|ds| ds.numeric_range(Column::Age))
        .map(|(_, hi)| hi.max(100.0))
        .unwrap_or(100.0);
    let (mut lo, mut hi) = state.filter.age_range.unwrap_or((0.0, upper));

    ui.strong("Age range");
    let lo_changed = ui
        .add(egui::Slider::new(&mut lo, 0.0..=upper).step_by(1.0).text("from"))
        .changed();
    let hi_changed = ui
        .add(egui::Slider::new(&mut hi, 0.0..=upper).step_by(1.0).text("to"))
        .changed();
    ui.separator();

    if lo_changed || hi_changed {
        state.set_age_range(lo, hi);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, the view tabs and the status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload").clicked() {
                let source = state.config.source.clone();
                reload(state, source);
                ui.close_menu();
            }
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let table = current_table(state).cloned();
            if ui
                .add_enabled(table.is_some(), egui::Button::new("Export table…"))
                .clicked()
            {
                if let Some(table) = table {
                    export_dialog(state, &table);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        for view in View::ALL {
            if ui.selectable_label(state.view == view, view.title()).clicked() {
                state.set_view(view);
            }
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} matching",
                ds.len(),
                state.page.matching
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

fn current_table(state: &AppState) -> Option<&Table> {
    state.page.charts.iter().find_map(|c| match &c.kind {
        ChartKind::Table(t) => Some(t),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Loading and export
// ---------------------------------------------------------------------------

/// Load from `source`, keeping the previous survey if it fails.
pub fn reload(state: &mut AppState, source: DataSource) {
    match loader::load_source(&source, state.config.fetch_timeout) {
        Ok(dataset) => {
            log::info!("Loaded {} records from {source}", dataset.len());
            state.config.source = source;
            state.set_dataset(dataset);
        }
        Err(e) => {
            log::error!("Failed to load {source}: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open survey CSV")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        reload(state, DataSource::File(path));
    }
}

fn export_dialog(state: &mut AppState, table: &Table) {
    let file = rfd::FileDialog::new()
        .set_title("Export table")
        .add_filter("JSON", &["json"])
        .set_file_name("table.json")
        .save_file();

    if let Some(path) = file {
        match export_table(table, &path) {
            Ok(()) => log::info!("Exported {} rows to {}", table.rows.len(), path.display()),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

/// Write `table` as a JSON array of records.
pub fn export_table(table: &Table, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &table.to_records())
        .context("writing table JSON")?;
    writer.flush().context("flushing table JSON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_writes_records_keyed_by_header() {
        let table = Table {
            headers: vec!["Occupation".into(), "Total Count".into()],
            rows: vec![vec!["Tailor".into(), "2".into()]],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        export_table(&table, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([{ "Occupation": "Tailor", "Total Count": "2" }])
        );
    }

    #[test]
    fn export_into_missing_directory_fails_with_context() {
        let table = Table {
            headers: vec![],
            rows: vec![],
        };
        let dir = tempfile::tempdir().unwrap();
        let err = export_table(&table, &dir.path().join("nope/out.json")).unwrap_err();
        assert!(format!("{err:#}").contains("creating"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn export_reports_a_failed_final_write() {
        // every write to /dev/full fails with ENOSPC; the small table stays buffered until flush
        let table = Table {
            headers: vec!["Occupation".into()],
            rows: vec![vec!["Tailor".into()]],
        };
        let err = export_table(&table, Path::new("/dev/full")).unwrap_err();
        assert!(format!("{err:#}").contains("flushing table JSON"));
    }
}
