use std::fmt;

// ---------------------------------------------------------------------------
// Measure – a single parsed numeric field
// ---------------------------------------------------------------------------

/// The outcome of coercing one text field to a number.
///
/// Malformed fields are data, not errors: they become `NotANumber` and every
/// aggregate decides explicitly what to do with them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Valid(f64),
    NotANumber,
}

impl Measure {
    /// Parse a field, trimming surrounding whitespace (`"15\r"` is `15`).
    /// Empty and non-finite fields are `NotANumber`.
    pub fn parse(field: &str) -> Self {
        match field.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Measure::Valid(v),
            _ => Measure::NotANumber,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Measure::Valid(v) => Some(v),
            Measure::NotANumber => None,
        }
    }

    #[cfg(test)]
    pub fn is_valid(self) -> bool {
        matches!(self, Measure::Valid(_))
    }
}

impl From<Option<f64>> for Measure {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Measure::Valid(v),
            _ => Measure::NotANumber,
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Valid(v) => write!(f, "{v}"),
            Measure::NotANumber => write!(f, "NaN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema – where features and the categorical field live in the text
// ---------------------------------------------------------------------------

/// Column layout of a delimited file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// No header row. Features fill the columns in order, skipping the
    /// categorical column.
    Headerless { category_index: usize },
    /// Header row present. Columns are located by name.
    Header { category: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered feature names; `Record::values` follows this order.
    pub features: Vec<String>,
    pub layout: Layout,
    pub delimiter: u8,
}

impl Schema {
    pub fn headerless(features: &[&str], category_index: usize) -> Self {
        Schema {
            features: features.iter().map(|f| f.to_string()).collect(),
            layout: Layout::Headerless { category_index },
            delimiter: b',',
        }
    }

    pub fn with_header(features: &[&str], category: &str) -> Self {
        Schema {
            features: features.iter().map(|f| f.to_string()).collect(),
            layout: Layout::Header {
                category: category.to_string(),
            },
            delimiter: b',',
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the source file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Categorical field (sex or class), verbatim.
    pub category: String,
    /// One measure per schema feature.
    pub values: Vec<Measure>,
}

impl Record {
    pub fn get(&self, feature: usize) -> Measure {
        self.values
            .get(feature)
            .copied()
            .unwrap_or(Measure::NotANumber)
    }
}

// ---------------------------------------------------------------------------
// Dataset / Group
// ---------------------------------------------------------------------------

/// Recognised categorical value: file code plus display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub key: String,
    pub label: String,
}

impl GroupSpec {
    pub fn new(key: &str, label: &str) -> Self {
        GroupSpec {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// Records sharing one categorical value.
#[derive(Debug, Clone)]
pub struct Group {
    pub spec: GroupSpec,
    pub records: Vec<Record>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The full parsed dataset. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(features: Vec<String>, records: Vec<Record>) -> Self {
        Dataset { features, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Iterate the measures of one feature column in record order.
    pub fn column(&self, feature: usize) -> impl Iterator<Item = Measure> + '_ {
        self.records.iter().map(move |r| r.get(feature))
    }

    /// `[min, max]` over the valid values of a feature; `None` if there are none.
    pub fn extent(&self, feature: usize) -> Option<(f64, f64)> {
        self.column(feature)
            .filter_map(Measure::value)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Split records into the given groups by exact categorical match.
    /// Records whose value matches no group are dropped.
    pub fn partition(&self, specs: &[GroupSpec]) -> Vec<Group> {
        let mut groups: Vec<Group> = specs
            .iter()
            .map(|spec| Group {
                spec: spec.clone(),
                records: Vec::new(),
            })
            .collect();

        for record in &self.records {
            if let Some(group) = groups.iter_mut().find(|g| g.spec.key == record.category) {
                group.records.push(record.clone());
            }
        }
        groups
    }
}
