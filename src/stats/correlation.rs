//! Pearson correlation matrices over groups of records.

use crate::data::model::{Measure, Record};

/// One entry of a correlation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationCell<'a> {
    pub row_feature: &'a str,
    pub col_feature: &'a str,
    pub row: usize,
    pub col: usize,
    pub value: Measure,
}

/// Full N×N matrix, both triangles stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub features: Vec<String>,
    values: Vec<Vec<Measure>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Measure {
        self.values
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(Measure::NotANumber)
    }

    /// Cells in column-major order: every row for column 0, then column 1, …
    pub fn cells(&self) -> impl Iterator<Item = CorrelationCell<'_>> + '_ {
        let n = self.len();
        (0..n).flat_map(move |col| {
            (0..n).map(move |row| CorrelationCell {
                row_feature: &self.features[row],
                col_feature: &self.features[col],
                row,
                col,
                value: self.get(row, col),
            })
        })
    }
}

/// Build the correlation matrix of `records` for the first `features.len()`
/// measures of each record.
///
/// Each pair uses only the records where both measures are valid. A pair
/// whose either side has zero variance (or fewer than two complete records)
/// is `NotANumber`, self-pairs included.
pub fn correlation_matrix(records: &[Record], features: &[String]) -> CorrelationMatrix {
    let n = features.len();
    let mut values = vec![vec![Measure::NotANumber; n]; n];

    for i in 0..n {
        for j in i..n {
            let r = pearson(records.iter().map(|rec| (rec.get(i), rec.get(j))));
            let r = match (i == j, r) {
                // exactly one, no rounding drift on the diagonal
                (true, Measure::Valid(_)) => Measure::Valid(1.0),
                (_, other) => other,
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        features: features.to_vec(),
        values,
    }
}

/// Pearson coefficient over the pairs where both sides are valid.
pub fn pearson<I>(pairs: I) -> Measure
where
    I: IntoIterator<Item = (Measure, Measure)>,
{
    let complete: Vec<(f64, f64)> = pairs
        .into_iter()
        .filter_map(|(a, b)| Some((a.value()?, b.value()?)))
        .collect();
    if complete.len() < 2 {
        return Measure::NotANumber;
    }

    // a constant side has no variance, whatever rounding the mean picks up
    let (x0, y0) = complete[0];
    if complete.iter().all(|&(x, _)| x == x0) || complete.iter().all(|&(_, y)| y == y0) {
        return Measure::NotANumber;
    }

    let n = complete.len() as f64;
    let mean_x = complete.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = complete.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (cov, var_x, var_y) = complete
        .iter()
        .fold((0.0, 0.0, 0.0), |(cov, vx, vy), &(x, y)| {
            let dx = x - mean_x;
            let dy = y - mean_y;
            (cov + dx * dy, vx + dx * dx, vy + dy * dy)
        });

    if var_x == 0.0 || var_y == 0.0 {
        return Measure::NotANumber;
    }
    Measure::Valid((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}
