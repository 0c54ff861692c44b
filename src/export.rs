//! Writing scenes as SVG and brushed selections as JSON.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::color::to_hex;
use crate::data::model::{Dataset, Measure};
use crate::scene::{Anchor, FontFamily, Scene, Shape};

// ---------------------------------------------------------------------------
// SVG
// ---------------------------------------------------------------------------

pub fn to_svg(scene: &Scene) -> String {
    let vb = scene.view_box;
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
        vb.width, vb.height, vb.min_x, vb.min_y, vb.width, vb.height
    );

    let gradients: Vec<&Vec<(f32, crate::color::Rgb8)>> = scene
        .shapes
        .iter()
        .filter_map(|s| match s {
            Shape::Gradient { stops, .. } => Some(stops),
            _ => None,
        })
        .collect();
    if !gradients.is_empty() {
        out.push_str("<defs>\n");
        for (id, stops) in gradients.iter().enumerate() {
            let _ = writeln!(out, r#"<linearGradient id="gradient-{id}" x1="0%" y1="0%" x2="100%" y2="0%">"#);
            for (offset, color) in stops.iter() {
                let _ = writeln!(
                    out,
                    r#"<stop offset="{}%" stop-color="{}"/>"#,
                    offset * 100.0,
                    to_hex(*color)
                );
            }
            out.push_str("</linearGradient>\n");
        }
        out.push_str("</defs>\n");
    }

    let mut gradient_id = 0;
    for shape in &scene.shapes {
        write_shape(&mut out, shape, &mut gradient_id);
    }
    out.push_str("</svg>\n");
    out
}

fn write_shape(out: &mut String, shape: &Shape, gradient_id: &mut usize) {
    let _ = match shape {
        Shape::Rect { x, y, width, height, fill, stroke, opacity } => writeln!(
            out,
            r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}" stroke="{}" opacity="{opacity}"/>"#,
            fill.map(to_hex).unwrap_or_else(|| "none".into()),
            stroke.map(to_hex).unwrap_or_else(|| "none".into()),
        ),
        Shape::Circle { cx, cy, r, fill, opacity } => writeln!(
            out,
            r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{}" fill-opacity="{opacity}"/>"#,
            to_hex(*fill)
        ),
        Shape::Text { x, y, text, size, anchor, family, fill } => writeln!(
            out,
            r#"<text x="{x}" y="{y}" font-size="{size}" font-family="{}" text-anchor="{}" fill="{}">{}</text>"#,
            match family {
                FontFamily::SansSerif => "sans-serif",
                FontFamily::Serif => "Times New Roman, serif",
            },
            match anchor {
                Anchor::Start => "start",
                Anchor::Middle => "middle",
                Anchor::End => "end",
            },
            to_hex(*fill),
            escape(text)
        ),
        Shape::Line { x1, y1, x2, y2, stroke, width } => writeln!(
            out,
            r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}" stroke-width="{width}"/>"#,
            to_hex(*stroke)
        ),
        Shape::Gradient { x, y, width, height, .. } => {
            let id = *gradient_id;
            *gradient_id += 1;
            writeln!(
                out,
                r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="url(#gradient-{id})"/>"#
            )
        }
    };
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

pub fn write_svg(path: &Path, scene: &Scene) -> Result<()> {
    fs::write(path, to_svg(scene)).with_context(|| format!("Failed to write {}", path.display()))
}

// ---------------------------------------------------------------------------
// Selection JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SelectedRecord<'a> {
    index: usize,
    class: &'a str,
    values: FeatureValues<'a>,
}

/// `{feature: value}` in dataset column order; `NotANumber` becomes `null`.
struct FeatureValues<'a> {
    features: &'a [String],
    values: &'a [Measure],
}

impl Serialize for FeatureValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.features.len()))?;
        for (k, name) in self.features.iter().enumerate() {
            let value = self.values.get(k).copied().and_then(Measure::value);
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Selected records as a pretty-printed JSON array. Unknown indices are skipped.
pub fn selection_json(dataset: &Dataset, selection: &[usize]) -> serde_json::Result<String> {
    let rows: Vec<SelectedRecord<'_>> = selection
        .iter()
        .filter_map(|&index| {
            dataset.records.get(index).map(|r| SelectedRecord {
                index,
                class: &r.category,
                values: FeatureValues {
                    features: &dataset.features,
                    values: &r.values,
                },
            })
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}

pub fn write_selection(path: &Path, dataset: &Dataset, selection: &[usize]) -> Result<()> {
    let json = selection_json(dataset, selection).context("Failed to serialise selection")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{black, hex};
    use crate::data::model::Record;

    #[test]
    fn svg_has_view_box_and_escaped_text() {
        let mut scene = Scene::new(960.0, 960.0).with_origin(-28.0, 0.0);
        scene.push(Shape::Text {
            x: 28.0,
            y: 28.0,
            text: "a < b & c".into(),
            size: 15.0,
            anchor: Anchor::Start,
            family: FontFamily::Serif,
            fill: black(),
        });
        scene.push(Shape::Circle { cx: 1.5, cy: 2.0, r: 3.5, fill: hex("#FFACBB"), opacity: 0.7 });

        let svg = to_svg(&scene);
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="960" height="960" viewBox="-28 0 960 960">"#));
        assert!(svg.contains("a &lt; b &amp; c</text>"));
        assert!(svg.contains(r##"<circle cx="1.5" cy="2" r="3.5" fill="#ffacbb" fill-opacity="0.7"/>"##));
        assert!(!svg.contains("<defs>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn gradients_are_defined_and_referenced() {
        let mut scene = Scene::new(700.0, 50.0);
        scene.push(Shape::Gradient {
            x: 50.0,
            y: 15.0,
            width: 630.0,
            height: 15.0,
            stops: vec![(0.0, hex("#B22222")), (1.0, hex("#000080"))],
        });
        let svg = to_svg(&scene);
        assert!(svg.contains(r#"<linearGradient id="gradient-0""#));
        assert!(svg.contains(r##"<stop offset="100%" stop-color="#000080"/>"##));
        assert!(svg.contains(r#"fill="url(#gradient-0)""#));
    }

    #[test]
    fn selection_keeps_feature_order_and_nulls() {
        let ds = Dataset::new(
            vec!["sepal length".into(), "sepal width".into()],
            vec![
                Record { category: "Iris-setosa".into(), values: vec![Measure::Valid(5.1), Measure::NotANumber] },
                Record { category: "Iris-virginica".into(), values: vec![Measure::Valid(6.3), Measure::Valid(3.3)] },
            ],
        );
        let json = selection_json(&ds, &[1, 0, 9]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["index"], 1);
        assert_eq!(rows[0]["class"], "Iris-virginica");
        assert_eq!(rows[1]["values"]["sepal width"], serde_json::Value::Null);
        assert!(json.find("sepal length").unwrap() < json.find("sepal width").unwrap());
    }

    #[test]
    fn files_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        write_svg(&path, &Scene::new(10.0, 10.0)).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("<svg"));
    }
}
