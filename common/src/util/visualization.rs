use crate::db::core::{BoardDB, DrawShape, ItemData, Layer};
use crate::geom::point::Point;
use crate::geom::rect::Rect;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut,
};
use std::path::Path;

// Debug dump of the board geometry plus a creepage path.
pub fn draw_creepage(
    db: &BoardDB,
    path: &[(Point<f64>, Point<f64>)],
    filename: &str,
    width: u32,
    height: u32,
) {
    let mut bbox = Rect::from_points(&[]);
    for item in &db.items {
        let r = item_bbox(item);
        bbox.expand_to(r.min);
        bbox.expand_to(r.max);
    }
    if !bbox.width().is_finite() || bbox.width() <= 0.0 {
        return;
    }
    let bbox = bbox.inflated(bbox.width().max(bbox.height()) * 0.05);

    let mut img = RgbaImage::from_pixel(width, height, Rgba([20, 20, 20, 255]));

    let scale_x = width as f64 / bbox.width();
    let scale_y = height as f64 / bbox.height();
    let scale = scale_x.min(scale_y);
    let map = |p: Point<f64>| {
        (
            ((p.x - bbox.min.x) * scale) as f32,
            (height as f64 - (p.y - bbox.min.y) * scale) as f32,
        )
    };

    let edge_color = Rgba([255, 215, 0, 255]);
    let copper_color = Rgba([180, 60, 60, 255]);
    let npth_color = Rgba([120, 120, 120, 255]);
    let path_color = Rgba([0, 240, 255, 255]);

    for item in &db.items {
        match item {
            ItemData::Pad(p) => {
                let (cx, cy) = map(p.position);
                let r = ((p.radius * scale) as i32).max(2);
                let color = if p.net.is_some() { copper_color } else { npth_color };
                draw_filled_circle_mut(&mut img, (cx as i32, cy as i32), r, color);
            }
            ItemData::Track(t) => {
                draw_line_segment_mut(&mut img, map(t.a), map(t.b), copper_color);
            }
            ItemData::Drawing(d) => {
                let color = match d.layer {
                    Layer::EdgeCuts => edge_color,
                    Layer::Copper(_) => copper_color,
                };
                draw_draw_shape(&mut img, &d.shape, color, &map);
            }
        }
    }

    for (a, b) in path {
        draw_line_segment_mut(&mut img, map(*a), map(*b), path_color);
    }

    let _ = img.save(Path::new(filename));
}

fn item_bbox(item: &ItemData) -> Rect {
    match item {
        ItemData::Pad(p) => Rect::new(
            Point::new(p.position.x - p.radius, p.position.y - p.radius),
            Point::new(p.position.x + p.radius, p.position.y + p.radius),
        ),
        ItemData::Track(t) => Rect::from_points(&[t.a, t.b]),
        ItemData::Drawing(d) => d.shape.bounding_box(),
    }
}

fn draw_draw_shape<F>(img: &mut RgbaImage, shape: &DrawShape, color: Rgba<u8>, map: &F)
where
    F: Fn(Point<f64>) -> (f32, f32),
{
    match shape {
        DrawShape::Segment { a, b } => {
            draw_line_segment_mut(img, map(*a), map(*b), color);
        }
        DrawShape::Circle { center, radius } => {
            let (cx, cy) = map(*center);
            let (ex, _) = map(Point::new(center.x + radius, center.y));
            let r = ((ex - cx) as i32).max(1);
            draw_hollow_circle_mut(img, (cx as i32, cy as i32), r, color);
        }
        DrawShape::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            // Flattened into short chords.
            let steps = 32;
            let span = end_angle - start_angle;
            let mut prev = Point::new(
                center.x + radius * start_angle.cos(),
                center.y + radius * start_angle.sin(),
            );
            for i in 1..=steps {
                let a = start_angle + span * (i as f64 / steps as f64);
                let next = Point::new(center.x + radius * a.cos(), center.y + radius * a.sin());
                draw_line_segment_mut(img, map(prev), map(next), color);
                prev = next;
            }
        }
        DrawShape::Polygon { points } => {
            for i in 0..points.len() {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                draw_line_segment_mut(img, map(a), map(b), color);
            }
        }
    }
}
