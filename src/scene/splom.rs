//! Scatter-plot matrix view with linked rectangular brushing.

use super::{Anchor, FontFamily, Scene, Shape};
use crate::brush::{BrushCoordinator, BrushEvent, BrushRules, PaneId, Region};
use crate::color::{ClassColors, Rgb8, black, hex};
use crate::config;
use crate::data::model::Dataset;
use crate::stats::histogram::max_count;
use crate::stats::{AxisScales, LinearScale, histogram};

const AXIS_FONT_SIZE: f32 = 10.0;
const LABEL_FONT_SIZE: f32 = 15.0;
const POINT_OPACITY: f32 = 0.7;
const BAR_OPACITY: f32 = 0.7;
const BRUSH_OPACITY: f32 = 0.3;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Pane geometry in canvas coordinates. Pane `(col, row)` occupies
/// `[col·size, (col+1)·size) × [row·size, (row+1)·size)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplomLayout {
    pub columns: usize,
    pub size: f32,
}

impl SplomLayout {
    pub fn new(columns: usize) -> Self {
        SplomLayout {
            columns,
            size: config::splom_cell_size(columns.max(1)),
        }
    }

    /// Pixel range of every axis, inside one pane.
    pub fn range(&self) -> (f64, f64) {
        let half = (config::SPLOM_PADDING / 2.0) as f64;
        (half, self.size as f64 - half)
    }

    /// The brushable area of a pane, pane-local.
    pub fn extent(&self) -> Region {
        let (lo, hi) = self.range();
        Region {
            x0: lo,
            y0: lo,
            x1: hi,
            y1: hi,
        }
    }

    pub fn origin(&self, pane: PaneId) -> (f32, f32) {
        (pane.col as f32 * self.size, pane.row as f32 * self.size)
    }

    pub fn matrix_size(&self) -> f32 {
        self.columns as f32 * self.size
    }

    /// Pane under a canvas point, if any.
    pub fn pane_at(&self, x: f32, y: f32) -> Option<PaneId> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.size).floor() as usize;
        let row = (y / self.size).floor() as usize;
        (col < self.columns && row < self.columns).then_some(PaneId::new(col, row))
    }

    /// Canvas point expressed in `pane`'s local pixels.
    pub fn to_local(&self, pane: PaneId, x: f32, y: f32) -> (f64, f64) {
        let (ox, oy) = self.origin(pane);
        ((x - ox) as f64, (y - oy) as f64)
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    pane: PaneId,
    anchor: (f64, f64),
    /// Last canvas point seen, where a release without a position ends.
    last: (f32, f32),
}

pub struct SplomView {
    dataset: Dataset,
    layout: SplomLayout,
    scales: AxisScales,
    colors: ClassColors,
    brush: BrushCoordinator,
    drag: Option<Drag>,
    scene: Scene,
}

impl SplomView {
    pub fn new(dataset: Dataset, rules: BrushRules) -> Self {
        let layout = SplomLayout::new(dataset.features.len());
        let extents: Vec<Option<(f64, f64)>> =
            (0..dataset.features.len()).map(|k| dataset.extent(k)).collect();
        let scales = AxisScales::build(&extents, layout.range());
        let colors = ClassColors::new(dataset.records.iter().map(|r| r.category.as_str()));
        let mut brush = BrushCoordinator::new(dataset.len(), rules);
        brush
            .selection_mut()
            .subscribe(|selected| log::debug!("brush: {} records selected", selected.len()));

        let mut view = SplomView {
            dataset,
            layout,
            scales,
            colors,
            brush,
            drag: None,
            scene: Scene::new(config::SPLOM_WIDTH, config::SPLOM_HEIGHT),
        };
        view.redraw();
        view
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[cfg(test)]
    pub fn layout(&self) -> &SplomLayout {
        &self.layout
    }

    pub fn colors(&self) -> &ClassColors {
        &self.colors
    }

    #[cfg(test)]
    pub fn brush(&self) -> &BrushCoordinator {
        &self.brush
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Indices of the currently selected records.
    pub fn selection(&self) -> &[usize] {
        self.brush.selection().get()
    }

    #[cfg(test)]
    pub fn selection_version(&self) -> u64 {
        self.brush.selection().version()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // -- gestures (canvas coordinates) ------------------------------------

    /// Returns false when the point is outside every pane.
    pub fn begin_drag(&mut self, x: f32, y: f32) -> bool {
        let Some(pane) = self.layout.pane_at(x, y) else {
            return false;
        };
        let anchor = self.clamped_local(pane, x, y);
        self.drag = Some(Drag { pane, anchor, last: (x, y) });
        self.send(BrushEvent::Start(pane));
        true
    }

    pub fn drag_to(&mut self, x: f32, y: f32) {
        if let Some(drag) = self.drag.as_mut() {
            drag.last = (x, y);
            let drag = *drag;
            let region = self.region_to(drag, x, y);
            self.send(BrushEvent::Brush(drag.pane, region));
        }
    }

    pub fn end_drag(&mut self, x: f32, y: f32) {
        if let Some(drag) = self.drag.take() {
            let region = self.region_to(drag, x, y);
            self.send(BrushEvent::End(drag.pane, region));
        }
    }

    /// End the drag at the last point it reached.
    pub fn finish_drag(&mut self) {
        if let Some(Drag { last: (x, y), .. }) = self.drag {
            self.end_drag(x, y);
        }
    }

    /// A click without movement clears the brush.
    pub fn click(&mut self, x: f32, y: f32) {
        self.drag = None;
        if let Some(pane) = self.layout.pane_at(x, y) {
            self.brush.push(BrushEvent::Start(pane));
            self.send(BrushEvent::End(pane, None));
        }
    }

    pub fn clear(&mut self) {
        self.drag = None;
        if let Some(pane) = self.brush.state().active {
            self.send(BrushEvent::End(pane, None));
        }
    }

    fn clamped_local(&self, pane: PaneId, x: f32, y: f32) -> (f64, f64) {
        let extent = self.layout.extent();
        let (lx, ly) = self.layout.to_local(pane, x, y);
        (lx.clamp(extent.x0, extent.x1), ly.clamp(extent.y0, extent.y1))
    }

    fn region_to(&self, drag: Drag, x: f32, y: f32) -> Option<Region> {
        let here = self.layout.to_local(drag.pane, x, y);
        Region::from_corners(drag.anchor, here)?.clamp_to(&self.layout.extent())
    }

    fn send(&mut self, event: BrushEvent) {
        self.brush.dispatch(event, &self.dataset, &self.scales);
        self.redraw();
    }

    fn redraw(&mut self) {
        self.scene = render(self);
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(view: &SplomView) -> Scene {
    let layout = &view.layout;
    let mut scene = Scene::new(config::SPLOM_WIDTH, config::SPLOM_HEIGHT)
        .with_origin(-config::SPLOM_PADDING, 0.0);

    render_grid(&mut scene, layout, &view.scales);

    for col in 0..layout.columns {
        for row in 0..layout.columns {
            let pane = PaneId::new(col, row);
            let (ox, oy) = layout.origin(pane);
            let mut local = Scene::new(layout.size, layout.size);
            render_frame(&mut local, layout);
            if pane.is_diagonal() {
                render_histogram(&mut local, layout, &view.dataset, col);
            } else {
                render_points(&mut local, view, pane);
            }
            if let Some(region) = view.brush.state().region_of(pane) {
                render_brush(&mut local, &region);
            }
            scene
                .shapes
                .extend(local.shapes.iter().map(|s| s.translated(ox, oy)));
        }
    }

    render_labels(&mut scene, layout, &view.dataset.features);
    scene
}

/// Light tick lines across the whole matrix, one axis per column and row.
fn render_grid(scene: &mut Scene, layout: &SplomLayout, scales: &AxisScales) {
    let grid = hex(config::SPLOM_GRID_COLOR);
    let span = layout.matrix_size();

    for (i, sx) in scales.x.iter().enumerate() {
        let ox = i as f32 * layout.size;
        for (tick, label) in tick_labels(sx) {
            let x = ox + sx.apply(tick) as f32 + 0.5;
            scene.push(Shape::Line { x1: x, y1: 0.0, x2: x, y2: span, stroke: grid, width: 1.0 });
            scene.push(Shape::Text {
                x,
                y: span + 3.0 + AXIS_FONT_SIZE,
                text: label,
                size: AXIS_FONT_SIZE,
                anchor: Anchor::Middle,
                family: FontFamily::SansSerif,
                fill: black(),
            });
        }
    }

    for (j, sy) in scales.y.iter().enumerate() {
        let oy = j as f32 * layout.size;
        for (tick, label) in tick_labels(sy) {
            let y = oy + sy.apply(tick) as f32 + 0.5;
            scene.push(Shape::Line { x1: 0.0, y1: y, x2: span, y2: y, stroke: grid, width: 1.0 });
            scene.push(Shape::Text {
                x: -3.0,
                y: y + AXIS_FONT_SIZE * 0.32,
                text: label,
                size: AXIS_FONT_SIZE,
                anchor: Anchor::End,
                family: FontFamily::SansSerif,
                fill: black(),
            });
        }
    }
}

fn tick_labels(scale: &LinearScale) -> Vec<(f64, String)> {
    let (lo, hi) = scale.domain();
    let decimals = crate::stats::scale::tick_decimals(lo, hi, config::SPLOM_AXIS_TICKS);
    scale
        .ticks(config::SPLOM_AXIS_TICKS)
        .into_iter()
        .map(|t| (t, format!("{t:.decimals$}")))
        .collect()
}

fn render_frame(pane: &mut Scene, layout: &SplomLayout) {
    let half = config::SPLOM_PADDING / 2.0;
    pane.push(Shape::Rect {
        x: half + 0.5,
        y: half + 0.5,
        width: layout.size - config::SPLOM_PADDING,
        height: layout.size - config::SPLOM_PADDING,
        fill: None,
        stroke: Some(hex(config::SPLOM_FRAME_COLOR)),
        opacity: 1.0,
    });
}

/// Bars of the feature's distribution over the full dataset.
fn render_histogram(pane: &mut Scene, layout: &SplomLayout, dataset: &Dataset, feature: usize) {
    let Some(domain) = dataset.extent(feature) else {
        return;
    };
    let bins = histogram(dataset.column(feature), domain, config::SPLOM_HISTOGRAM_BINS);
    let top = max_count(&bins);
    if top == 0 {
        return;
    }

    let range = layout.range();
    let x = LinearScale::new(domain, range);
    let y = LinearScale::new((0.0, top as f64), (range.1, range.0));
    let width = bins
        .first()
        .map(|b| (x.apply(b.x1) - x.apply(b.x0) - 1.0).max(1.0))
        .unwrap_or(1.0) as f32;
    let fill = hex(config::SPLOM_BAR_COLOR);

    for bin in &bins {
        let bar_top = y.apply(bin.count as f64);
        pane.push(Shape::Rect {
            x: x.apply(bin.x0) as f32,
            y: bar_top as f32,
            width,
            height: (range.1 - bar_top) as f32,
            fill: Some(fill),
            stroke: None,
            opacity: BAR_OPACITY,
        });
    }
}

/// One dot per record valid on both axes; points hidden by the brush shrink
/// to black specks.
fn render_points(pane: &mut Scene, view: &SplomView, id: PaneId) {
    let sx = &view.scales.x[id.col];
    let sy = &view.scales.y[id.row];
    for (i, record) in view.dataset.records.iter().enumerate() {
        let (Some(px), Some(py)) = (sx.project(record.get(id.col)), sy.project(record.get(id.row))) else {
            continue;
        };
        let (r, fill, opacity): (f32, Rgb8, f32) = if view.brush.is_hidden(i) {
            (config::SPLOM_HIDDEN_RADIUS, black(), 1.0)
        } else {
            (config::SPLOM_POINT_RADIUS, view.colors.color_for(&record.category), POINT_OPACITY)
        };
        pane.push(Shape::Circle { cx: px as f32, cy: py as f32, r, fill, opacity });
    }
}

fn render_brush(pane: &mut Scene, region: &Region) {
    pane.push(Shape::Rect {
        x: region.x0 as f32,
        y: region.y0 as f32,
        width: (region.x1 - region.x0) as f32,
        height: (region.y1 - region.y0) as f32,
        fill: Some(hex("#777777")),
        stroke: Some(hex("#ffffff")),
        opacity: BRUSH_OPACITY,
    });
}

fn render_labels(scene: &mut Scene, layout: &SplomLayout, features: &[String]) {
    for (i, name) in features.iter().enumerate() {
        let offset = i as f32 * layout.size + config::SPLOM_PADDING;
        scene.push(Shape::Text {
            x: offset,
            y: offset,
            text: name.clone(),
            size: LABEL_FONT_SIZE,
            anchor: Anchor::Start,
            family: FontFamily::Serif,
            fill: black(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{DatasetKind, parse_text};

    const IRIS: &str = "\
sepal length,sepal width,petal length,petal width,class
5.1,3.5,1.4,0.2,Iris-setosa
4.9,3.0,1.4,0.2,Iris-setosa
7.0,3.2,4.7,1.4,Iris-versicolor
6.4,3.2,4.5,1.5,Iris-versicolor
6.3,3.3,6.0,2.5,Iris-virginica
5.8,,5.1,1.9,Iris-virginica
";

    fn view() -> SplomView {
        let ds = parse_text(IRIS, &DatasetKind::Iris.schema()).unwrap();
        SplomView::new(ds, BrushRules::default())
    }

    fn pane_shapes(view: &SplomView, pane: PaneId) -> Vec<Shape> {
        let layout = view.layout();
        let (ox, oy) = layout.origin(pane);
        view.scene()
            .shapes
            .iter()
            .filter(|s| match s {
                Shape::Circle { cx, cy, .. } => layout.pane_at(*cx, *cy) == Some(pane),
                Shape::Rect { x, y, fill: Some(_), .. } => layout.pane_at(*x, *y) == Some(pane),
                _ => false,
            })
            .map(|s| s.translated(-ox, -oy))
            .collect()
    }

    fn circles(shapes: &[Shape]) -> usize {
        shapes.iter().filter(|s| matches!(s, Shape::Circle { .. })).count()
    }

    #[test]
    fn layout_places_panes_on_a_233_grid() {
        let layout = SplomLayout::new(4);
        assert!((layout.size - 233.0).abs() < 1e-4);
        assert_eq!(layout.range(), (14.0, 219.0));
        assert_eq!(layout.pane_at(10.0, 10.0), Some(PaneId::new(0, 0)));
        assert_eq!(layout.pane_at(240.0, 700.0), Some(PaneId::new(1, 3)));
        assert_eq!(layout.pane_at(-5.0, 10.0), None);
        assert_eq!(layout.pane_at(940.0, 10.0), None);
    }

    #[test]
    fn scene_uses_padded_view_box() {
        let v = view();
        assert_eq!(v.scene().view_box.min_x, -28.0);
        assert_eq!(v.scene().width(), 960.0);
    }

    #[test]
    fn histogram_counts_only_valid_values() {
        let v = view();
        let ds = v.dataset();
        for k in 0..4 {
            let valid = ds.column(k).filter(|m| m.is_valid()).count();
            let domain = ds.extent(k).unwrap();
            let bins = histogram(ds.column(k), domain, config::SPLOM_HISTOGRAM_BINS);
            assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), valid);
        }
        // sepal width has one blank field
        assert_eq!(ds.column(1).filter(|m| m.is_valid()).count(), 5);
    }

    #[test]
    fn missing_values_drop_points_from_affected_panes_only() {
        let v = view();
        // sepal width (1) is involved: 5 points
        assert_eq!(circles(&pane_shapes(&v, PaneId::new(1, 0))), 5);
        assert_eq!(circles(&pane_shapes(&v, PaneId::new(0, 1))), 5);
        // unaffected pane keeps all six
        assert_eq!(circles(&pane_shapes(&v, PaneId::new(2, 3))), 6);
        // diagonal panes hold bars, not points
        assert_eq!(circles(&pane_shapes(&v, PaneId::new(2, 2))), 0);
    }

    #[test]
    fn diagonal_bars_share_first_bin_width() {
        let v = view();
        let bars: Vec<f32> = pane_shapes(&v, PaneId::new(0, 0))
            .iter()
            .filter_map(|s| match s {
                Shape::Rect { width, .. } => Some(*width),
                _ => None,
            })
            .collect();
        assert_eq!(bars.len(), config::SPLOM_HISTOGRAM_BINS);
        assert!(bars.windows(2).all(|w| w[0] == w[1]));
        assert!((bars[0] - 19.5).abs() < 1e-4);
    }

    #[test]
    fn labels_sit_on_the_diagonal() {
        let v = view();
        let labels: Vec<(f32, f32, &str)> = v
            .scene()
            .shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Text { x, y, text, family: FontFamily::Serif, .. } => Some((*x, *y, text.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels[0], (28.0, 28.0, "sepal length"));
        assert!((labels[1].0 - 261.0).abs() < 1e-3);
    }

    #[test]
    fn dragging_hides_points_and_publishes_selection() {
        let mut v = view();
        // whole brushable area of pane (2, 3)
        let (ox, oy) = v.layout().origin(PaneId::new(2, 3));
        assert!(v.begin_drag(ox + 14.0, oy + 14.0));
        v.drag_to(ox + 219.0, oy + 219.0);
        assert_eq!(v.selection(), &[0, 1, 2, 3, 4, 5]);

        // shrink to the lower-left corner: setosa only (small petals)
        v.drag_to(ox + 60.0, oy + 219.0);
        assert_eq!(v.selection(), &[0, 1]);
        v.end_drag(ox + 60.0, oy + 219.0);
        assert!(!v.is_dragging());
        assert_eq!(v.brush().state().hidden_count(), 4);

        let hidden = pane_shapes(&v, PaneId::new(0, 1))
            .iter()
            .filter(|s| matches!(s, Shape::Circle { r, .. } if *r == config::SPLOM_HIDDEN_RADIUS))
            .count();
        // the record without sepal width is not drawn in this pane at all
        assert_eq!(hidden, 3);
    }

    #[test]
    fn release_without_position_ends_at_last_point() {
        let mut v = view();
        let (ox, oy) = v.layout().origin(PaneId::new(2, 3));
        v.begin_drag(ox + 14.0, oy + 14.0);
        v.drag_to(ox + 60.0, oy + 219.0);
        v.finish_drag();
        assert!(!v.is_dragging());
        assert_eq!(v.selection(), &[0, 1]);
        assert!(v.brush().state().region_of(PaneId::new(2, 3)).is_some());
    }

    #[test]
    fn click_clears_and_new_pane_takes_over() {
        let mut v = view();
        let (ox, oy) = v.layout().origin(PaneId::new(0, 1));
        v.begin_drag(ox + 14.0, oy + 14.0);
        v.end_drag(ox + 219.0, oy + 219.0);
        assert_eq!(v.selection().len(), 5);

        let (bx, by) = v.layout().origin(PaneId::new(3, 2));
        v.begin_drag(bx + 20.0, by + 20.0);
        assert!(v.selection().is_empty());
        assert!(v.brush().state().region_of(PaneId::new(0, 1)).is_none());
        v.end_drag(bx + 100.0, by + 100.0);

        v.click(bx + 50.0, by + 50.0);
        assert!(v.selection().is_empty());
        assert_eq!(v.brush().state().hidden_count(), 0);
    }

    #[test]
    fn pointer_outside_panes_is_ignored() {
        let mut v = view();
        assert!(!v.begin_drag(-10.0, 5.0));
        v.drag_to(100.0, 100.0);
        assert_eq!(v.selection_version(), 0);
    }
}
