use eframe::egui::{self, Align2, Color32, FontId, Mesh, Painter, Pos2, Rect, Sense, Stroke, Ui, pos2, vec2};

use crate::color::Rgb8;
use crate::scene::splom::SplomView;
use crate::scene::{Anchor, Scene, Shape, ViewBox};

// ---------------------------------------------------------------------------
// Scene → screen mapping
// ---------------------------------------------------------------------------

/// Uniform scale that fits a view box into a screen rect, top-left aligned.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    screen_min: Pos2,
    scene_min: Pos2,
    scale: f32,
}

impl Transform {
    pub fn fit(rect: Rect, view_box: &ViewBox) -> Self {
        let scale = (rect.width() / view_box.width)
            .min(rect.height() / view_box.height)
            .max(0.01);
        Transform {
            screen_min: rect.min,
            scene_min: pos2(view_box.min_x, view_box.min_y),
            scale,
        }
    }

    pub fn to_screen(&self, x: f32, y: f32) -> Pos2 {
        self.screen_min + (pos2(x, y) - self.scene_min) * self.scale
    }

    pub fn to_scene(&self, pos: Pos2) -> (f32, f32) {
        let p = self.scene_min + (pos - self.screen_min) / self.scale;
        (p.x, p.y)
    }

    pub fn length(&self, v: f32) -> f32 {
        v * self.scale
    }
}

fn color32(c: Rgb8, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(c.red, c.green, c.blue, alpha)
}

// ---------------------------------------------------------------------------
// Painting
// ---------------------------------------------------------------------------

pub fn paint_scene(painter: &Painter, t: &Transform, scene: &Scene) {
    for shape in &scene.shapes {
        paint_shape(painter, t, shape);
    }
}

fn paint_shape(painter: &Painter, t: &Transform, shape: &Shape) {
    match shape {
        Shape::Rect { x, y, width, height, fill, stroke, opacity } => {
            let rect = Rect::from_min_max(t.to_screen(*x, *y), t.to_screen(x + width, y + height));
            if let Some(fill) = fill {
                painter.rect_filled(rect, 0.0, color32(*fill, *opacity));
            }
            if let Some(stroke) = stroke {
                outline(painter, rect, Stroke::new(1.0, color32(*stroke, 1.0)));
            }
        }
        Shape::Circle { cx, cy, r, fill, opacity } => {
            // keep hidden specks visible when the canvas is scaled down
            let radius = t.length(*r).max(0.75);
            painter.circle_filled(t.to_screen(*cx, *cy), radius, color32(*fill, *opacity));
        }
        Shape::Text { x, y, text, size, anchor, fill, .. } => {
            let align = match anchor {
                Anchor::Start => Align2::LEFT_BOTTOM,
                Anchor::Middle => Align2::CENTER_BOTTOM,
                Anchor::End => Align2::RIGHT_BOTTOM,
            };
            // egui ships no serif face; only the SVG export keeps the family
            let font = FontId::proportional(t.length(*size));
            // y is a baseline; egui anchors on the glyph box
            let pos = t.to_screen(*x, *y + size * 0.2);
            painter.text(pos, align, text, font, color32(*fill, 1.0));
        }
        Shape::Line { x1, y1, x2, y2, stroke, width } => {
            painter.line_segment(
                [t.to_screen(*x1, *y1), t.to_screen(*x2, *y2)],
                Stroke::new(width.max(0.5), color32(*stroke, 1.0)),
            );
        }
        Shape::Gradient { x, y, width, height, stops } => {
            paint_gradient(painter, t, Rect::from_min_size(pos2(*x, *y), vec2(*width, *height)), stops);
        }
    }
}

fn outline(painter: &Painter, rect: Rect, stroke: Stroke) {
    let [a, b, c, d] = [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()];
    for segment in [[a, b], [b, c], [c, d], [d, a]] {
        painter.line_segment(segment, stroke);
    }
}

/// One quad per pair of adjacent stops, colours interpolated by the GPU.
fn paint_gradient(painter: &Painter, t: &Transform, area: Rect, stops: &[(f32, Rgb8)]) {
    let mut mesh = Mesh::default();
    for pair in stops.windows(2) {
        let (o0, c0) = pair[0];
        let (o1, c1) = pair[1];
        let x0 = area.min.x + area.width() * o0;
        let x1 = area.min.x + area.width() * o1;
        let base = mesh.vertices.len() as u32;
        mesh.colored_vertex(t.to_screen(x0, area.min.y), color32(c0, 1.0));
        mesh.colored_vertex(t.to_screen(x1, area.min.y), color32(c1, 1.0));
        mesh.colored_vertex(t.to_screen(x1, area.max.y), color32(c1, 1.0));
        mesh.colored_vertex(t.to_screen(x0, area.max.y), color32(c0, 1.0));
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }
    painter.add(egui::Shape::mesh(mesh));
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

/// Paint a static scene scaled to the available space.
pub fn scene_canvas(ui: &mut Ui, scene: &Scene) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    let t = Transform::fit(response.rect, &scene.view_box);
    paint_scene(&painter, &t, scene);
}

/// The scatter-plot matrix, with pointer drags forwarded to the brush.
pub fn splom_canvas(ui: &mut Ui, view: &mut SplomView) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let t = Transform::fit(response.rect, &view.scene().view_box);
    let pointer = ui.input(|i| i.pointer.latest_pos());

    if response.drag_started() {
        let origin = ui.input(|i| i.pointer.press_origin()).or(pointer);
        if let Some(pos) = origin {
            let (x, y) = t.to_scene(pos);
            view.begin_drag(x, y);
        }
    }
    if response.dragged() && view.is_dragging() {
        if let Some(pos) = pointer {
            let (x, y) = t.to_scene(pos);
            view.drag_to(x, y);
        }
    }
    if response.drag_stopped() {
        match pointer {
            Some(pos) => {
                let (x, y) = t.to_scene(pos);
                view.end_drag(x, y);
            }
            // released outside the window
            None => view.finish_drag(),
        }
    }
    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = t.to_scene(pos);
            view.click(x, y);
        }
    }

    paint_scene(&painter, &t, view.scene());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_round_trips_and_keeps_aspect() {
        let vb = ViewBox { min_x: -28.0, min_y: 0.0, width: 960.0, height: 960.0 };
        let rect = Rect::from_min_size(pos2(100.0, 50.0), vec2(480.0, 800.0));
        let t = Transform::fit(rect, &vb);
        assert_eq!(t.length(2.0), 1.0);
        assert_eq!(t.to_screen(-28.0, 0.0), pos2(100.0, 50.0));
        let (x, y) = t.to_scene(t.to_screen(233.0, 466.0));
        assert!((x - 233.0).abs() < 1e-3 && (y - 466.0).abs() < 1e-3);
    }

    #[test]
    fn opacity_maps_to_alpha() {
        assert_eq!(color32(Rgb8::new(255, 0, 0), 1.0).a(), 255);
        assert_eq!(color32(Rgb8::new(255, 0, 0), 0.0), Color32::TRANSPARENT);
    }
}
