//! Compile-time parameters for both views.
//!
//! Only the dataset URLs can be overridden at runtime (environment), every
//! other value is fixed.

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

pub const ABALONE_URL: &str = "http://vis.lab.djosix.com:2024/data/abalone.data";
pub const IRIS_URL: &str = "http://vis.lab.djosix.com:2024/data/iris.csv";

pub const ABALONE_URL_ENV: &str = "VIZMAT_ABALONE_URL";
pub const IRIS_URL_ENV: &str = "VIZMAT_IRIS_URL";

/// Abalone feature columns, in file order after the sex column.
pub const ABALONE_FEATURES: [&str; 8] = [
    "Length",
    "Diameter",
    "Height",
    "Whole_weight",
    "Shucked_weight",
    "Viscera_weight",
    "Shell_weight",
    "Rings",
];

/// Sex groups: (code in the file, label on the selector).
pub const ABALONE_GROUPS: [(&str, &str); 3] = [("M", "male"), ("F", "female"), ("I", "infant")];

pub const IRIS_FEATURES: [&str; 4] = ["sepal length", "sepal width", "petal length", "petal width"];
pub const IRIS_CLASS_COLUMN: &str = "class";

/// Iris class → hex fill.
pub const IRIS_CLASS_COLORS: [(&str, &str); 3] = [
    ("Iris-setosa", "#FFACBB"),
    ("Iris-versicolor", "#FFCC66"),
    ("Iris-virginica", "#66CCCC"),
];

// ---------------------------------------------------------------------------
// Correlogram geometry
// ---------------------------------------------------------------------------

pub const CORR_WIDTH: f32 = 700.0;
pub const CORR_HEIGHT: f32 = 700.0;
pub const CORR_MARGIN_TOP: f32 = 20.0;
pub const CORR_MARGIN_RIGHT: f32 = 20.0;
pub const CORR_MARGIN_BOTTOM: f32 = 20.0;
pub const CORR_MARGIN_LEFT: f32 = 50.0;
pub const CORR_MAX_RADIUS: f32 = 12.0;
pub const CORR_FONT_SIZE: f32 = 12.0;

pub const LEGEND_TOP: f32 = 15.0;
pub const LEGEND_HEIGHT: f32 = 15.0;

/// Diverging stops: (offset, hex, value).
pub const DIVERGING_STOPS: [(f32, &str, f64); 3] = [
    (0.0, "#B22222", -1.0),
    (0.5, "#ffffff", 0.0),
    (1.0, "#000080", 1.0),
];

pub fn corr_inner_width() -> f32 {
    CORR_WIDTH - CORR_MARGIN_LEFT - CORR_MARGIN_RIGHT
}

pub fn corr_inner_height() -> f32 {
    CORR_HEIGHT - CORR_MARGIN_TOP - CORR_MARGIN_BOTTOM
}

// ---------------------------------------------------------------------------
// Scatter-plot matrix geometry
// ---------------------------------------------------------------------------

pub const SPLOM_WIDTH: f32 = 960.0;
pub const SPLOM_HEIGHT: f32 = 960.0;
pub const SPLOM_PADDING: f32 = 28.0;
pub const SPLOM_POINT_RADIUS: f32 = 3.5;
pub const SPLOM_HIDDEN_RADIUS: f32 = 1.0;
pub const SPLOM_HISTOGRAM_BINS: usize = 10;
pub const SPLOM_AXIS_TICKS: usize = 6;
pub const SPLOM_BAR_COLOR: &str = "#FF9966";
pub const SPLOM_FRAME_COLOR: &str = "#aaaaaa";
pub const SPLOM_GRID_COLOR: &str = "#dddddd";

/// Side length of one pane, padding included.
pub fn splom_cell_size(columns: usize) -> f32 {
    (SPLOM_WIDTH - (columns as f32 + 1.0) * SPLOM_PADDING) / columns as f32 + SPLOM_PADDING
}

// ---------------------------------------------------------------------------
// Runtime overrides
// ---------------------------------------------------------------------------

/// Dataset sources, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub abalone_url: String,
    pub iris_url: String,
}

impl Sources {
    /// Read the URL overrides from the environment, falling back to the lab server.
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var(ABALONE_URL_ENV).ok(),
            std::env::var(IRIS_URL_ENV).ok(),
        )
    }

    fn resolve(abalone: Option<String>, iris: Option<String>) -> Self {
        let pick = |value: Option<String>, default: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Sources {
            abalone_url: pick(abalone, ABALONE_URL),
            iris_url: pick(iris, IRIS_URL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splom_cell_size_matches_layout() {
        assert!((splom_cell_size(4) - 233.0).abs() < f32::EPSILON);
    }

    #[test]
    fn corr_inner_area() {
        assert_eq!(corr_inner_width(), 630.0);
        assert_eq!(corr_inner_height(), 660.0);
    }

    #[test]
    fn blank_override_falls_back_to_default() {
        let sources = Sources::resolve(Some("  ".into()), Some("http://localhost/iris.csv".into()));
        assert_eq!(sources.abalone_url, ABALONE_URL);
        assert_eq!(sources.iris_url, "http://localhost/iris.csv");
    }
}
