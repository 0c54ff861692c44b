//! Position scales: continuous linear, categorical point, and nice ticks.

use crate::data::model::Measure;

// ---------------------------------------------------------------------------
// Linear scale
// ---------------------------------------------------------------------------

/// Maps a continuous domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
    round: bool,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        LinearScale {
            domain,
            range,
            round: false,
        }
    }

    /// Same scale with outputs rounded to whole pixels.
    pub fn rounded(mut self) -> Self {
        self.round = true;
        self
    }

    /// Copy with a different range, keeping domain and rounding.
    pub fn with_range(&self, range: (f64, f64)) -> Self {
        LinearScale { range, ..*self }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// A zero-width domain maps every value to the middle of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span != 0.0 { (value - d0) / span } else { 0.5 };
        let out = r0 + t * (r1 - r0);
        if self.round { out.round() } else { out }
    }

    pub fn project(&self, value: Measure) -> Option<f64> {
        value.value().map(|v| self.apply(v))
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }
}

// ---------------------------------------------------------------------------
// Axis scales for a matrix of panes
// ---------------------------------------------------------------------------

/// One x-role and one y-role scale per feature. The y scale shares the
/// domain and has the inverted range.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScales {
    pub x: Vec<LinearScale>,
    pub y: Vec<LinearScale>,
}

impl AxisScales {
    /// `extents[k]` is the `[min, max]` of feature `k`; `None` (no valid
    /// values) falls back to `[0, 1]`.
    pub fn build(extents: &[Option<(f64, f64)>], range: (f64, f64)) -> Self {
        let x: Vec<LinearScale> = extents
            .iter()
            .map(|e| LinearScale::new(e.unwrap_or((0.0, 1.0)), range).rounded())
            .collect();
        let y = x.iter().map(|s| s.with_range((range.1, range.0))).collect();
        AxisScales { x, y }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.x.len()
    }
}

// ---------------------------------------------------------------------------
// Point scale
// ---------------------------------------------------------------------------

/// Evenly spaced positions for an ordered set of names, ends included.
#[derive(Debug, Clone, PartialEq)]
pub struct PointScale {
    domain: Vec<String>,
    range: (f64, f64),
}

impl PointScale {
    pub fn new(domain: Vec<String>, range: (f64, f64)) -> Self {
        PointScale { domain, range }
    }

    #[cfg(test)]
    pub fn position(&self, name: &str) -> Option<f64> {
        let index = self.domain.iter().position(|d| d == name)?;
        Some(self.at(index))
    }

    pub fn at(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        match self.domain.len() {
            0 | 1 => (r0 + r1) / 2.0,
            n => r0 + index as f64 * (r1 - r0) / (n - 1) as f64,
        }
    }
}

// ---------------------------------------------------------------------------
// Ticks
// ---------------------------------------------------------------------------

/// Roughly `count` round values (steps of 1, 2 or 5 × 10^k) covering `[start, stop]`.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };

    let Some((i1, i2, inc)) = tick_spec(lo, hi, count as f64) else {
        return Vec::new();
    };
    let mut out: Vec<f64> = (i1..=i2)
        .map(|i| {
            if inc < 0.0 {
                i as f64 / -inc
            } else {
                i as f64 * inc
            }
        })
        .collect();
    if reverse {
        out.reverse();
    }
    out
}

/// Decimal places needed to print ticks of `[start, stop]` without noise.
pub fn tick_decimals(start: f64, stop: f64, count: usize) -> usize {
    let step = tick_step(start, stop, count);
    if step > 0.0 && step < 1.0 {
        (-step.log10().floor()) as usize
    } else {
        0
    }
}

fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let (lo, hi) = if stop < start { (stop, start) } else { (start, stop) };
    match tick_spec(lo, hi, count as f64) {
        Some((_, _, inc)) if inc < 0.0 => 1.0 / -inc,
        Some((_, _, inc)) => inc,
        None => 0.0,
    }
}

/// `(first index, last index, increment)`; a negative increment encodes
/// `1 / -inc` so sub-unit steps stay exact.
fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count.max(0.0);
    if !(step > 0.0) || !step.is_finite() {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let scale = 10f64.powf(-power) / factor;
        i1 = (start * scale).round();
        i2 = (stop * scale).round();
        if i1 / scale < start {
            i1 += 1.0;
        }
        if i2 / scale > stop {
            i2 -= 1.0;
        }
        inc = -scale;
    } else {
        let step = 10f64.powf(power) * factor;
        i1 = (start / step).round();
        i2 = (stop / step).round();
        if i1 * step < start {
            i1 += 1.0;
        }
        if i2 * step > stop {
            i2 -= 1.0;
        }
        inc = step;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    if i2 < i1 {
        return None;
    }
    Some((i1 as i64, i2 as i64, inc))
}
