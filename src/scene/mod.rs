//! Toolkit-neutral drawing primitives.
//!
//! Views build a [`Scene`] in canvas coordinates; the egui canvas paints it
//! and the exporter turns it into SVG.

pub mod correlogram;
pub mod splom;

use crate::color::Rgb8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    SansSerif,
    Serif,
}

/// One primitive. Text `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb8>,
        stroke: Option<Rgb8>,
        opacity: f32,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Rgb8,
        opacity: f32,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        anchor: Anchor,
        family: FontFamily,
        fill: Rgb8,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Rgb8,
        width: f32,
    },
    /// Horizontal linear gradient filling a rectangle; stop offsets in `0..=1`.
    Gradient {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        stops: Vec<(f32, Rgb8)>,
    },
}

impl Shape {
    pub fn translated(&self, dx: f32, dy: f32) -> Shape {
        let mut s = self.clone();
        match &mut s {
            Shape::Rect { x, y, .. }
            | Shape::Text { x, y, .. }
            | Shape::Gradient { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
            Shape::Circle { cx, cy, .. } => {
                *cx += dx;
                *cy += dy;
            }
            Shape::Line { x1, y1, x2, y2, .. } => {
                *x1 += dx;
                *x2 += dx;
                *y1 += dy;
                *y2 += dy;
            }
        }
        s
    }
}

/// The visible window into canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub view_box: ViewBox,
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(width: f32, height: f32) -> Self {
        Scene {
            view_box: ViewBox {
                min_x: 0.0,
                min_y: 0.0,
                width,
                height,
            },
            shapes: Vec::new(),
        }
    }

    pub fn with_origin(mut self, min_x: f32, min_y: f32) -> Self {
        self.view_box.min_x = min_x;
        self.view_box.min_y = min_y;
        self
    }

    pub fn width(&self) -> f32 {
        self.view_box.width
    }

    pub fn height(&self) -> f32 {
        self.view_box.height
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Stack scenes top to bottom into one canvas, each normalised to its
    /// own view box origin.
    pub fn stacked(scenes: &[&Scene]) -> Scene {
        let width = scenes.iter().map(|s| s.width()).fold(0.0, f32::max);
        let height = scenes.iter().map(|s| s.height()).sum();
        let mut out = Scene::new(width, height);
        let mut top = 0.0;
        for scene in scenes {
            let dx = -scene.view_box.min_x;
            let dy = top - scene.view_box.min_y;
            out.shapes
                .extend(scene.shapes.iter().map(|s| s.translated(dx, dy)));
            top += scene.height();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::black;

    #[test]
    fn stacking_offsets_later_scenes() {
        let mut a = Scene::new(100.0, 50.0);
        a.push(Shape::Circle { cx: 1.0, cy: 2.0, r: 1.0, fill: black(), opacity: 1.0 });
        let mut b = Scene::new(80.0, 20.0).with_origin(-10.0, 0.0);
        b.push(Shape::Line { x1: 0.0, y1: 0.0, x2: 5.0, y2: 5.0, stroke: black(), width: 1.0 });

        let s = Scene::stacked(&[&a, &b]);
        assert_eq!(s.width(), 100.0);
        assert_eq!(s.height(), 70.0);
        assert_eq!(
            s.shapes[1],
            Shape::Line { x1: 10.0, y1: 50.0, x2: 15.0, y2: 55.0, stroke: black(), width: 1.0 }
        );
    }
}
