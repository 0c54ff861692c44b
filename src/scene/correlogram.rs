//! Correlogram view: one cached matrix per group, one active group.

use super::{Anchor, FontFamily, Scene, Shape};
use crate::color::{DivergingScale, Rgb8, black, grey};
use crate::config;
use crate::data::model::{Group, GroupSpec, Measure};
use crate::stats::{CorrelationMatrix, PointScale, correlation_matrix};

const PLACEHOLDER: &str = "n/a";

/// The cached matrix of one group.
#[derive(Debug, Clone)]
pub struct GroupMatrix {
    pub spec: GroupSpec,
    pub records: usize,
    pub matrix: CorrelationMatrix,
}

/// Selector input for the correlogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrelogramEvent {
    /// Activate the group with this key (`M`) or label (`male`).
    SelectGroup(String),
}

/// Index of the group an event activates, `None` if it names no group or
/// the group is already active.
pub fn transition(groups: &[GroupMatrix], active: usize, event: &CorrelogramEvent) -> Option<usize> {
    match event {
        CorrelogramEvent::SelectGroup(name) => groups
            .iter()
            .position(|g| g.spec.key == *name || g.spec.label == *name)
            .filter(|&i| i != active),
    }
}

pub struct CorrelogramView {
    groups: Vec<GroupMatrix>,
    active: usize,
    color: DivergingScale,
    matrix_scene: Scene,
    legend_scene: Scene,
}

impl CorrelogramView {
    /// Compute every group's matrix once and render the first group.
    pub fn new(groups: &[Group], features: &[String]) -> Self {
        let groups: Vec<GroupMatrix> = groups
            .iter()
            .map(|g| GroupMatrix {
                spec: g.spec.clone(),
                records: g.len(),
                matrix: correlation_matrix(&g.records, features),
            })
            .collect();
        let color = DivergingScale::correlation();
        let legend_scene = render_legend(&color);
        let mut view = CorrelogramView {
            groups,
            active: 0,
            color,
            matrix_scene: Scene::new(config::CORR_WIDTH, config::CORR_HEIGHT),
            legend_scene,
        };
        view.redraw();
        view
    }

    pub fn groups(&self) -> &[GroupMatrix] {
        &self.groups
    }

    #[cfg(test)]
    pub fn active(&self) -> Option<&GroupMatrix> {
        self.groups.get(self.active)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Apply a selector event. Returns whether the active group changed.
    pub fn handle(&mut self, event: &CorrelogramEvent) -> bool {
        match transition(&self.groups, self.active, event) {
            Some(next) => {
                log::debug!("correlogram: group {} -> {}", self.active, next);
                self.active = next;
                self.redraw();
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn matrix_scene(&self) -> &Scene {
        &self.matrix_scene
    }

    /// Legend strip above the matrix, as one canvas.
    pub fn composite(&self) -> Scene {
        Scene::stacked(&[&self.legend_scene, &self.matrix_scene])
    }

    // Full redraw: clear, then rebuild from the cached matrix.
    fn redraw(&mut self) {
        self.matrix_scene.clear();
        if let Some(g) = self.groups.get(self.active) {
            self.matrix_scene = render_matrix(&g.matrix, &self.color);
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Grid of cells: names on the diagonal, values in the lower-left triangle,
/// circles in the upper-right.
pub fn render_matrix(matrix: &CorrelationMatrix, color: &DivergingScale) -> Scene {
    let mut scene = Scene::new(config::CORR_WIDTH, config::CORR_HEIGHT);
    let left = config::CORR_MARGIN_LEFT;
    let top = config::CORR_MARGIN_TOP;

    let x = PointScale::new(matrix.features.clone(), (0.0, config::corr_inner_width() as f64));
    let y = PointScale::new(matrix.features.clone(), (0.0, config::corr_inner_height() as f64));

    for cell in matrix.cells() {
        let cx = left + x.at(cell.col) as f32;
        let cy = top + y.at(cell.row) as f32;

        if cell.col <= cell.row {
            let (text, fill) = cell_label(cell.col == cell.row, cell.col_feature, cell.value, color);
            scene.push(Shape::Text {
                x: cx,
                y: cy + 5.0,
                text,
                size: config::CORR_FONT_SIZE,
                anchor: Anchor::Middle,
                family: FontFamily::SansSerif,
                fill,
            });
        } else if let Some(r) = circle_radius(cell.value) {
            scene.push(Shape::Circle {
                cx,
                cy,
                r,
                fill: color.color_for(cell.value).unwrap_or_else(grey),
                opacity: 0.8,
            });
        }
    }
    scene
}

fn cell_label(diagonal: bool, feature: &str, value: Measure, color: &DivergingScale) -> (String, Rgb8) {
    if diagonal {
        return (feature.to_string(), black());
    }
    match value {
        Measure::Valid(v) => (format!("{v:.2}"), color.color(v)),
        Measure::NotANumber => (PLACEHOLDER.to_string(), grey()),
    }
}

/// Area grows linearly with |r|.
pub fn circle_radius(value: Measure) -> Option<f32> {
    value
        .value()
        .map(|v| config::CORR_MAX_RADIUS * (v.abs().min(1.0) as f32).sqrt())
}

/// Gradient bar with `-1.00`, `0.00`, `1.00` labels.
pub fn render_legend(color: &DivergingScale) -> Scene {
    let width = config::corr_inner_width();
    let mut scene = Scene::new(
        config::CORR_WIDTH,
        config::LEGEND_HEIGHT + config::LEGEND_TOP + 20.0,
    );
    let left = config::CORR_MARGIN_LEFT;
    let top = config::LEGEND_TOP;

    scene.push(Shape::Gradient {
        x: left,
        y: top,
        width,
        height: config::LEGEND_HEIGHT,
        stops: color.gradient_stops(),
    });

    let last = config::DIVERGING_STOPS.len().saturating_sub(1);
    for (i, &(offset, _, value)) in config::DIVERGING_STOPS.iter().enumerate() {
        let anchor = match i {
            0 => Anchor::Start,
            i if i == last => Anchor::End,
            _ => Anchor::Middle,
        };
        scene.push(Shape::Text {
            x: left + width * offset,
            y: top - 3.0,
            text: format!("{value:.2}"),
            size: config::CORR_FONT_SIZE,
            anchor,
            family: FontFamily::SansSerif,
            fill: black(),
        });
    }
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{DatasetKind, parse_text};

    const SAMPLE: &str = "\
M,0.455,0.365,0.095,0.514,0.2245,0.101,0.15,15
M,0.35,0.265,0.09,0.2255,0.0995,0.0485,0.07,7
F,0.53,0.42,0.135,0.677,0.2565,0.1415,0.21,9
M,0.44,0.365,0.125,0.516,0.2155,0.114,0.155,10
I,0.33,0.255,0.08,0.205,0.0895,0.0395,0.055,7
I,0.425,0.3,0.095,0.3515,0.141,0.0775,0.12,8
F,0.53,0.415,0.15,0.7775,0.237,0.1415,0.33,20
F,0.545,0.425,0.125,0.768,0.294,0.1495,0.26,16
I,0.475,0.37,0.125,0.5095,0.2165,0.1125,0.165,9
";

    fn view() -> CorrelogramView {
        let ds = parse_text(SAMPLE, &DatasetKind::Abalone.schema()).unwrap();
        let specs: Vec<GroupSpec> = config::ABALONE_GROUPS
            .iter()
            .map(|(k, l)| GroupSpec::new(k, l))
            .collect();
        CorrelogramView::new(&ds.partition(&specs), &ds.features)
    }

    fn texts(scene: &Scene) -> Vec<&str> {
        scene
            .shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn circles(scene: &Scene) -> usize {
        scene
            .shapes
            .iter()
            .filter(|s| matches!(s, Shape::Circle { .. }))
            .count()
    }

    #[test]
    fn starts_on_first_group_with_full_grid() {
        let v = view();
        assert_eq!(v.active().unwrap().spec.key, "M");
        assert_eq!(v.groups().len(), 3);
        let scene = v.matrix_scene();
        // 8 labels + 28 values below the diagonal, 28 circles above
        assert_eq!(texts(scene).len(), 36);
        assert_eq!(circles(scene), 28);
        assert!(texts(scene).contains(&"Length"));
    }

    #[test]
    fn selecting_a_group_swaps_cached_matrix() {
        let mut v = view();
        let before = v.matrix_scene().clone();
        assert!(v.handle(&CorrelogramEvent::SelectGroup("female".into())));
        assert_eq!(v.active().unwrap().spec.key, "F");
        assert_ne!(v.matrix_scene(), &before);
        // already active, unknown: no transition
        assert!(!v.handle(&CorrelogramEvent::SelectGroup("F".into())));
        assert!(!v.handle(&CorrelogramEvent::SelectGroup("dragon".into())));
        assert_eq!(v.active_index(), 1);
    }

    #[test]
    fn not_a_number_cells_get_placeholder_and_no_circle() {
        let ds = parse_text(
            "M,0.5,0.3\nM,0.4,0.3\n",
            &crate::data::model::Schema::headerless(&["a", "b"], 0),
        )
        .unwrap();
        let groups = ds.partition(&[GroupSpec::new("M", "male")]);
        let v = CorrelogramView::new(&groups, &ds.features);
        let scene = v.matrix_scene();
        assert_eq!(texts(scene), vec!["a", "n/a", "b"]);
        assert_eq!(circles(scene), 0);
    }

    #[test]
    fn cell_placement_uses_margins() {
        let v = view();
        let Some(Shape::Text { x, y, text, .. }) = v.matrix_scene().shapes.first() else {
            panic!("first shape should be the Length label");
        };
        assert_eq!(text, "Length");
        assert_eq!(*x, 50.0);
        assert_eq!(*y, 25.0);
    }

    #[test]
    fn radius_scales_with_sqrt() {
        assert_eq!(circle_radius(Measure::Valid(1.0)), Some(12.0));
        assert_eq!(circle_radius(Measure::Valid(-0.25)), Some(6.0));
        assert_eq!(circle_radius(Measure::NotANumber), None);
    }

    #[test]
    fn legend_labels() {
        let legend = render_legend(&DivergingScale::correlation());
        assert_eq!(texts(&legend), vec!["-1.00", "0.00", "1.00"]);
        assert_eq!(legend.height(), 50.0);
    }
}
