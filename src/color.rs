use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

use crate::config;
use crate::data::model::Measure;

/// 8-bit sRGB colour used throughout the scene layer.
pub type Rgb8 = Srgb<u8>;

pub fn grey() -> Rgb8 {
    Srgb::new(128, 128, 128)
}

pub fn black() -> Rgb8 {
    Srgb::new(0, 0, 0)
}

/// Parse `#rrggbb`; malformed input falls back to grey.
pub fn hex(s: &str) -> Rgb8 {
    s.parse::<Rgb8>().unwrap_or_else(|e| {
        log::warn!("bad colour literal {s:?}: {e}");
        grey()
    })
}

pub fn to_hex(c: Rgb8) -> String {
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb8> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.75, 0.55).into_color();
            rgb.into_format()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging scale: correlation → colour
// ---------------------------------------------------------------------------

/// Piecewise-linear RGB interpolation between stops sorted by value.
#[derive(Debug, Clone)]
pub struct DivergingScale {
    stops: Vec<(f64, Srgb<f32>)>,
}

impl DivergingScale {
    /// Red at -1, white at 0, navy at +1.
    pub fn correlation() -> Self {
        DivergingScale {
            stops: config::DIVERGING_STOPS
                .iter()
                .map(|&(_, color, value)| (value, hex(color).into_format()))
                .collect(),
        }
    }

    /// Values beyond the end stops clamp to the end colours.
    pub fn color(&self, value: f64) -> Rgb8 {
        let Some(&(first_v, first_c)) = self.stops.first() else {
            return grey();
        };
        if value <= first_v {
            return first_c.into_format();
        }
        for pair in self.stops.windows(2) {
            let (v0, c0) = pair[0];
            let (v1, c1) = pair[1];
            if value <= v1 {
                let t = if v1 > v0 { ((value - v0) / (v1 - v0)) as f32 } else { 0.0 };
                return lerp(c0, c1, t).into_format();
            }
        }
        self.stops
            .last()
            .map(|&(_, c)| c.into_format())
            .unwrap_or_else(grey)
    }

    pub fn color_for(&self, value: Measure) -> Option<Rgb8> {
        value.value().map(|v| self.color(v))
    }

    /// Stops as `(offset in 0..=1, colour)` for gradient legends.
    pub fn gradient_stops(&self) -> Vec<(f32, Rgb8)> {
        let (Some(&(lo, _)), Some(&(hi, _))) = (self.stops.first(), self.stops.last()) else {
            return Vec::new();
        };
        let span = hi - lo;
        self.stops
            .iter()
            .map(|&(v, c)| {
                let offset = if span > 0.0 { ((v - lo) / span) as f32 } else { 0.0 };
                (offset, c.into_format())
            })
            .collect()
    }
}

/// Component-wise interpolation in gamma-encoded sRGB.
fn lerp(a: Srgb<f32>, b: Srgb<f32>, t: f32) -> Srgb<f32> {
    Srgb::new(
        a.red + (b.red - a.red) * t,
        a.green + (b.green - a.green) * t,
        a.blue + (b.blue - a.blue) * t,
    )
}

// ---------------------------------------------------------------------------
// Categorical mapping: class label → colour
// ---------------------------------------------------------------------------

/// Fixed colours for the known classes; any other class present in the data
/// gets a generated hue.
#[derive(Debug, Clone)]
pub struct ClassColors {
    mapping: BTreeMap<String, Rgb8>,
    default_color: Rgb8,
}

impl ClassColors {
    pub fn new<'a, I>(classes: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut mapping: BTreeMap<String, Rgb8> = config::IRIS_CLASS_COLORS
            .iter()
            .map(|&(class, color)| (class.to_string(), hex(color)))
            .collect();

        let mut extra: Vec<&str> = classes
            .into_iter()
            .filter(|c| !c.is_empty() && !mapping.contains_key(*c))
            .collect();
        extra.sort_unstable();
        extra.dedup();
        for (class, color) in extra.iter().zip(generate_palette(extra.len())) {
            mapping.insert(class.to_string(), color);
        }

        ClassColors {
            mapping,
            default_color: grey(),
        }
    }

    pub fn color_for(&self, class: &str) -> Rgb8 {
        self.mapping
            .get(class)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (class → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Rgb8)> {
        self.mapping.iter().map(|(k, c)| (k.clone(), *c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diverging_hits_stops() {
        let scale = DivergingScale::correlation();
        assert_eq!(to_hex(scale.color(-1.0)), "#b22222");
        assert_eq!(to_hex(scale.color(0.0)), "#ffffff");
        assert_eq!(to_hex(scale.color(1.0)), "#000080");
        assert_eq!(to_hex(scale.color(3.0)), "#000080");
        assert_eq!(scale.color_for(Measure::NotANumber), None);
    }

    #[test]
    fn diverging_midpoint_is_between_stops() {
        let c = DivergingScale::correlation().color(0.5);
        // halfway from white to navy
        assert!(c.red > 100 && c.red < 155);
        assert!(c.blue > 180);
    }

    #[test]
    fn gradient_offsets() {
        let stops = DivergingScale::correlation().gradient_stops();
        let offsets: Vec<f32> = stops.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn class_colors_fixed_and_generated() {
        let colors = ClassColors::new(["Iris-setosa", "Iris-unknown", ""]);
        assert_eq!(to_hex(colors.color_for("Iris-setosa")), "#ffacbb");
        assert_ne!(colors.color_for("Iris-unknown"), grey());
        assert_eq!(colors.color_for("nope"), grey());
        assert_eq!(colors.legend_entries().len(), 4);
    }
}
