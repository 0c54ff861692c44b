use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

use super::model::{Dataset, Layout, Measure, Record, Schema};
use crate::config;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("header has no '{0}' column")]
    MissingColumn(String),
}

// ---------------------------------------------------------------------------
// Known datasets
// ---------------------------------------------------------------------------

/// The two datasets the viewer knows how to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    /// UCI abalone: headerless, sex in column 0, eight measurements.
    Abalone,
    /// Iris CSV with a header row and a `class` column.
    Iris,
}

impl DatasetKind {
    pub fn schema(self) -> Schema {
        match self {
            DatasetKind::Abalone => Schema::headerless(&config::ABALONE_FEATURES, 0),
            DatasetKind::Iris => {
                Schema::with_header(&config::IRIS_FEATURES, config::IRIS_CLASS_COLUMN)
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DatasetKind::Abalone => "abalone",
            DatasetKind::Iris => "iris",
        }
    }

    /// Guess the dataset from a file extension (`.data`/`.txt` → abalone, `.csv` → iris).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "data" | "txt" => Some(DatasetKind::Abalone),
            "csv" => Some(DatasetKind::Iris),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse delimited text according to `schema`.
///
/// Numeric fields that fail to parse become [`Measure::NotANumber`]; only
/// structural problems (unreadable CSV, missing header column) are errors.
/// Rows whose fields are all empty are skipped.
pub fn parse_text(text: &str, schema: &Schema) -> Result<Dataset, LoadError> {
    let has_headers = matches!(schema.layout, Layout::Header { .. });
    let mut reader = ReaderBuilder::new()
        .delimiter(schema.delimiter)
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(text.as_bytes());

    let (category_col, feature_cols) = match &schema.layout {
        Layout::Headerless { category_index } => {
            let cols = (0..schema.features.len())
                .map(|k| if k < *category_index { k } else { k + 1 })
                .collect::<Vec<_>>();
            (*category_index, cols)
        }
        Layout::Header { category } => {
            let headers = reader.headers()?.clone();
            let category_col = locate(&headers, category)?;
            let cols = schema
                .features
                .iter()
                .map(|f| locate(&headers, f))
                .collect::<Result<Vec<_>, _>>()?;
            (category_col, cols)
        }
    };

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let category = row.get(category_col).unwrap_or("").trim().to_string();
        let values = feature_cols
            .iter()
            .map(|&c| row.get(c).map(Measure::parse).unwrap_or(Measure::NotANumber))
            .collect();
        records.push(Record { category, values });
    }

    Ok(Dataset::new(schema.features.clone(), records))
}

/// Load a local dataset file, choosing the schema from its extension.
pub fn load_file(path: &Path) -> Result<(DatasetKind, Dataset)> {
    let Some(kind) = DatasetKind::from_path(path) else {
        bail!(
            "Unsupported file extension: {}",
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{e}"))
                .unwrap_or_else(|| "(none)".to_string())
        );
    };
    let dataset = load_file_as(path, kind)?;
    Ok((kind, dataset))
}

/// Load a local dataset file with an explicit schema.
pub fn load_file_as(path: &Path, kind: DatasetKind) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_text(&text, &kind.schema())
        .with_context(|| format!("parsing {} as {}", path.display(), kind.label()))
}

fn locate(headers: &StringRecord, name: &str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::GroupSpec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sexes() -> Vec<GroupSpec> {
        config::ABALONE_GROUPS
            .iter()
            .map(|(k, l)| GroupSpec::new(k, l))
            .collect()
    }

    #[test]
    fn abalone_row_lands_in_its_group_only() {
        let text = "M,0.5,0.3,0.1,0.4,0.2,0.1,0.15,9\n";
        let ds = parse_text(text, &DatasetKind::Abalone.schema()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].values[0], Measure::Valid(0.5));
        assert_eq!(ds.records[0].values[7], Measure::Valid(9.0));

        let groups = ds.partition(&sexes());
        assert_eq!(groups[0].spec.key, "M");
        assert_eq!(groups[0].len(), 1);
        assert!(groups[1].is_empty());
        assert!(groups[2].is_empty());
    }

    #[test]
    fn abalone_malformed_fields_become_not_a_number() {
        let text = "F,0.4,oops,0.1,0.4,0.2,0.1,0.15,7\r\nI,0.2,0.1\n\n";
        let ds = parse_text(text, &DatasetKind::Abalone.schema()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].values[1], Measure::NotANumber);
        assert_eq!(ds.records[0].values[7], Measure::Valid(7.0));
        // short row: missing trailing fields
        assert_eq!(ds.records[1].values[1], Measure::Valid(0.1));
        assert_eq!(ds.records[1].values[2], Measure::NotANumber);
    }

    #[test]
    fn iris_columns_found_by_name() {
        let text = "class,petal width,petal length,sepal width,sepal length\n\
                    Iris-setosa,0.2,1.4,3.5,5.1\n\
                    Iris-virginica,,5.1,3.0,5.9\n";
        let ds = parse_text(text, &DatasetKind::Iris.schema()).unwrap();
        assert_eq!(ds.features[0], "sepal length");
        assert_eq!(ds.records[0].category, "Iris-setosa");
        assert_eq!(ds.records[0].values[0], Measure::Valid(5.1));
        assert_eq!(ds.records[0].values[3], Measure::Valid(0.2));
        assert_eq!(ds.records[1].values[3], Measure::NotANumber);
    }

    #[test]
    fn iris_missing_column_is_an_error() {
        let text = "sepal length,sepal width,class\n5.1,3.5,Iris-setosa\n";
        let err = parse_text(text, &DatasetKind::Iris.schema()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "petal length"));
    }

    #[test]
    fn load_file_picks_schema_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(
            b"sepal length,sepal width,petal length,petal width,class\n5.1,3.5,1.4,0.2,Iris-setosa\n",
        )
        .unwrap();

        let (kind, ds) = load_file(file.path()).unwrap();
        assert_eq!(kind, DatasetKind::Iris);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn load_file_rejects_unknown_extension() {
        let file = NamedTempFile::new().unwrap();
        assert!(load_file(file.path()).is_err());
    }
}
