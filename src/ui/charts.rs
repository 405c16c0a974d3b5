use std::f32::consts::TAU;

use eframe::egui::{self, Align2, FontId, Pos2, ScrollArea, Sense, Shape, Stroke, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::ColorMap;
use crate::dashboard::{Chart, ChartKind, Table};
use crate::data::aggregate::AggregationResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – the charts of the current view
// ---------------------------------------------------------------------------

/// Render every chart of the current page, top to bottom.
pub fn chart_page(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No survey loaded  (File → Reload or File → Open…)");
        });
        return;
    }

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(state.view.title());
    });
    ui.separator();

    let height = state.config.chart_height;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, chart) in state.page.charts.iter().enumerate() {
                ui.push_id(i, |ui: &mut Ui| chart_widget(ui, chart, height));
                ui.add_space(16.0);
            }
        });
}

fn chart_widget(ui: &mut Ui, chart: &Chart, height: f32) {
    ui.strong(chart.title.as_str());
    if chart.is_empty() {
        ui.weak("No matching records.");
        return;
    }
    match &chart.kind {
        ChartKind::Bar(result) => bar_chart(ui, chart, result, height),
        ChartKind::Pie(result) => pie_chart(ui, result, height),
        ChartKind::GroupedBar { categories, series } => {
            grouped_bar_chart(ui, chart, categories, series, height)
        }
        ChartKind::Table(table) => table_widget(ui, table, height),
    }
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

/// One coloured bar per category, largest first, named in the legend.
fn bar_chart(ui: &mut Ui, chart: &Chart, result: &AggregationResult, height: f32) {
    let ranked = result.ranked();
    let colors = ColorMap::new(ranked.iter().map(|(l, _)| l.as_str()));

    let bars: Vec<BarChart> = ranked
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            BarChart::new(vec![Bar::new(i as f64, *value).width(0.7).name(label)])
                .name(label)
                .color(colors.color_for(label))
        })
        .collect();

    Plot::new("bar_chart")
        .legend(Legend::default())
        .height(height)
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for bar in bars {
                plot_ui.bar_chart(bar);
            }
        });
}

/// Side-by-side bars: one group per category, one bar per series.
fn grouped_bar_chart(
    ui: &mut Ui,
    chart: &Chart,
    categories: &[String],
    series: &[(String, Vec<f64>)],
    height: f32,
) {
    let colors = ColorMap::new(series.iter().map(|(l, _)| l.as_str()));
    let n = series.len().max(1) as f64;
    let width = 0.8 / n;

    let charts: Vec<BarChart> = series
        .iter()
        .enumerate()
        .map(|(j, (label, heights))| {
            let offset = (j as f64 - (n - 1.0) / 2.0) * width;
            let bars = heights
                .iter()
                .zip(categories)
                .enumerate()
                .map(|(i, (h, category))| {
                    Bar::new(i as f64 + offset, *h)
                        .width(width)
                        .name(format!("{category} / {label}"))
                })
                .collect();
            BarChart::new(bars).name(label).color(colors.color_for(label))
        })
        .collect();

    Plot::new("grouped_bar_chart")
        .legend(Legend::default())
        .height(height)
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for c in charts {
                plot_ui.bar_chart(c);
            }
        });

    // category positions on the x axis
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (i, category) in categories.iter().enumerate() {
            ui.weak(format!("{i}: {category}"));
        }
    });
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

/// Painted pie with a legend of label, value and share.
fn pie_chart(ui: &mut Ui, result: &AggregationResult, height: f32) {
    let ranked = result.ranked();
    let total = result.total();
    let colors = ColorMap::new(ranked.iter().map(|(l, _)| l.as_str()));

    let (response, painter) =
        ui.allocate_painter(egui::vec2(ui.available_width(), height), Sense::hover());
    let rect = response.rect;
    let radius = (rect.height() / 2.0 - 12.0).max(8.0);
    let center = Pos2::new(rect.left() + radius + 12.0, rect.center().y);

    if total <= 0.0 {
        return;
    }

    // fan of thin triangles so every piece stays convex
    let mut start = -TAU / 4.0;
    for (label, value) in &ranked {
        let sweep = (*value / total) as f32 * TAU;
        let steps = ((sweep / TAU) * 90.0).ceil().max(1.0) as usize;
        let color = colors.color_for(label);
        for k in 0..steps {
            let a0 = start + sweep * k as f32 / steps as f32;
            let a1 = start + sweep * (k + 1) as f32 / steps as f32;
            let p0 = center + radius * egui::vec2(a0.cos(), a0.sin());
            let p1 = center + radius * egui::vec2(a1.cos(), a1.sin());
            painter.add(Shape::convex_polygon(vec![center, p0, p1], color, Stroke::NONE));
        }
        start += sweep;
    }

    let text_color = ui.visuals().text_color();
    let mut y = rect.top() + 12.0;
    let x = center.x + radius + 24.0;
    for (label, value) in &ranked {
        let swatch = egui::Rect::from_min_size(Pos2::new(x, y), egui::vec2(12.0, 12.0));
        painter.rect_filled(swatch, 2.0, colors.color_for(label));
        painter.text(
            Pos2::new(x + 18.0, y + 6.0),
            Align2::LEFT_CENTER,
            format!("{label}: {value} ({:.1}%)", value / total * 100.0),
            FontId::proportional(13.0),
            text_color,
        );
        y += 18.0;
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

fn table_widget(ui: &mut Ui, table: &Table, height: f32) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(height)
        .columns(TableColumn::auto().at_least(60.0), table.headers.len())
        .header(22.0, |mut header| {
            for h in &table.headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(h.as_str());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, table.rows.len(), |mut row| {
                let cells = &table.rows[row.index()];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell.as_str());
                    });
                }
            });
        });
}
