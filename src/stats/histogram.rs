use crate::data::model::Measure;

/// One histogram bar: `[x0, x1)` except the last bin, which includes its upper edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
}

/// Equal-width bins over `domain`.
///
/// `NotANumber` values and values outside the domain are not counted. A zero
/// width domain yields a single bin holding every valid value equal to it.
pub fn histogram<I>(values: I, domain: (f64, f64), bins: usize) -> Vec<Bin>
where
    I: IntoIterator<Item = Measure>,
{
    let (lo, hi) = domain;
    if bins == 0 || !(lo <= hi) {
        return Vec::new();
    }

    let width = (hi - lo) / bins as f64;
    let mut out: Vec<Bin> = if width > 0.0 {
        (0..bins)
            .map(|i| Bin {
                x0: lo + i as f64 * width,
                x1: if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width },
                count: 0,
            })
            .collect()
    } else {
        vec![Bin { x0: lo, x1: hi, count: 0 }]
    };

    let last = out.len() - 1;
    for v in values.into_iter().filter_map(Measure::value) {
        if v < lo || v > hi {
            continue;
        }
        let idx = if width > 0.0 {
            (((v - lo) / width).floor() as usize).min(last)
        } else {
            0
        };
        out[idx].count += 1;
    }
    out
}

/// Largest bin count, 0 for no bins.
pub fn max_count(bins: &[Bin]) -> usize {
    bins.iter().map(|b| b.count).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measures(vals: &[f64]) -> Vec<Measure> {
        vals.iter().map(|&v| Measure::Valid(v)).collect()
    }

    #[test]
    fn counts_sum_to_valid_values() {
        let mut vals = measures(&[4.3, 4.9, 5.0, 5.8, 6.1, 6.3, 7.0, 7.9, 7.9]);
        vals.push(Measure::NotANumber);
        let bins = histogram(vals.iter().copied(), (4.3, 7.9), 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 9);
        // max lands in the last bin
        assert_eq!(bins[9].count, 2);
        assert_eq!(bins[0].x0, 4.3);
        assert_eq!(bins[9].x1, 7.9);
    }

    #[test]
    fn equal_widths() {
        let bins = histogram(measures(&[0.0, 10.0]), (0.0, 10.0), 5);
        for b in &bins {
            assert!((b.x1 - b.x0 - 2.0).abs() < 1e-12);
        }
        assert_eq!(max_count(&bins), 1);
    }

    #[test]
    fn degenerate_domain_single_bin() {
        let bins = histogram(measures(&[3.0, 3.0]), (3.0, 3.0), 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
    }

    #[test]
    fn out_of_domain_ignored() {
        let bins = histogram(measures(&[-1.0, 0.5, 2.0]), (0.0, 1.0), 2);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 1);
        assert!(histogram(measures(&[1.0]), (0.0, 1.0), 0).is_empty());
    }
}
