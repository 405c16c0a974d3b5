//! Survey dashboard over a fixed CSV export.
//!
//! The [`data`] layer is plain, synchronous and free of UI types: load a
//! [`data::model::Dataset`] once, then ask [`data::cascade::options_for`] and
//! [`data::aggregate::aggregate`] for whatever the current selection needs.
//! [`dashboard`] turns those results into chart descriptions and [`ui`]
//! draws them with egui.

pub mod app;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod state;
pub mod ui;
