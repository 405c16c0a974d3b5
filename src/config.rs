use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Published survey export the dashboards read at startup.
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/mamunalbd4/asharalo/main/asharalofinal.csv";

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where the survey CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Url(DEFAULT_DATA_URL.to_string())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Fixed settings of the dashboard window.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub source: DataSource,
    pub fetch_timeout: Duration,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    pub chart_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: DataSource::default(),
            fetch_timeout: Duration::from_secs(60),
            window_size: [1280.0, 860.0],
            min_window_size: [700.0, 450.0],
            chart_height: 360.0,
        }
    }
}
