use crate::shapes::{CreepShape, ShapeKind};
use creepage_common::db::core::{BoardDB, DrawShape, Layer};
use creepage_common::db::indices::NetId;

// Edge-cuts drawings plus a synthetic circle per non-plated hole.
pub fn collect_edge_shapes(db: &BoardDB) -> Vec<CreepShape> {
    let mut shapes = Vec::new();

    for (id, d) in db.drawings() {
        if d.layer != Layer::EdgeCuts {
            continue;
        }
        shapes.push(CreepShape {
            kind: to_shape_kind(&d.shape),
            owner: id,
            net: None,
        });
    }

    for (id, pad) in db.pads() {
        if !pad.plated && pad.drill > 0.0 {
            shapes.push(CreepShape {
                kind: ShapeKind::Circle {
                    center: pad.position,
                    radius: pad.drill * 0.5,
                },
                owner: id,
                net: None,
            });
        }
    }

    log::debug!("Collected {} edge-layer creep shapes", shapes.len());
    shapes
}

// Pad copper as circles, track segments as centerlines.
pub fn collect_net_shapes(db: &BoardDB, net: NetId, layer: u8) -> Vec<CreepShape> {
    let mut shapes = Vec::new();

    for (id, pad) in db.pads() {
        if pad.net == Some(net) && pad.plated && pad.on_layer(layer) {
            shapes.push(CreepShape {
                kind: ShapeKind::Circle {
                    center: pad.position,
                    radius: pad.radius,
                },
                owner: id,
                net: Some(net),
            });
        }
    }

    for (id, track) in db.tracks() {
        if track.net == net && track.layer == layer {
            shapes.push(CreepShape {
                kind: ShapeKind::Segment {
                    a: track.a,
                    b: track.b,
                },
                owner: id,
                net: Some(net),
            });
        }
    }

    shapes
}

// Closed cutouts narrower than the minimum are bridged: the path walks
// straight across them, so they stop being obstacles. The outline ring
// and open edge fragments always count.
pub fn remove_bridged_grooves(shapes: &mut Vec<CreepShape>, min_groove_width: f64) {
    if min_groove_width <= 0.0 {
        return;
    }

    // Largest closed ring is taken as the board outline.
    let outline_idx = shapes
        .iter()
        .enumerate()
        .filter(|(_, s)| matches!(s.kind, ShapeKind::Polygon { .. }))
        .max_by(|(_, a), (_, b)| {
            a.bounding_box()
                .area()
                .total_cmp(&b.bounding_box().area())
        })
        .map(|(i, _)| i);

    let mut idx = 0;
    shapes.retain(|s| {
        let i = idx;
        idx += 1;
        if Some(i) == outline_idx {
            return true;
        }
        match &s.kind {
            ShapeKind::Circle { radius, .. } => 2.0 * radius >= min_groove_width,
            ShapeKind::Polygon { .. } => {
                let bb = s.bounding_box();
                bb.width().min(bb.height()) >= min_groove_width
            }
            // Open fragments have no measurable groove width.
            _ => true,
        }
    });
}

fn to_shape_kind(shape: &DrawShape) -> ShapeKind {
    match shape {
        DrawShape::Segment { a, b } => ShapeKind::Segment { a: *a, b: *b },
        DrawShape::Circle { center, radius } => ShapeKind::Circle {
            center: *center,
            radius: *radius,
        },
        DrawShape::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            let mut end = *end_angle;
            while end < *start_angle {
                end += 2.0 * std::f64::consts::PI;
            }
            ShapeKind::Arc {
                center: *center,
                radius: *radius,
                start_angle: *start_angle,
                end_angle: end,
            }
        }
        DrawShape::Polygon { points } => ShapeKind::Polygon {
            points: points.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creepage_common::db::core::{Drawing, Pad};
    use creepage_common::geom::point::Point;

    fn board_with_slot(slot_w: f64) -> BoardDB {
        let mut db = BoardDB::new();
        db.add_drawing(Drawing {
            shape: DrawShape::Polygon {
                points: vec![
                    Point::new(0.0, 0.0),
                    Point::new(20.0, 0.0),
                    Point::new(20.0, 20.0),
                    Point::new(0.0, 20.0),
                ],
            },
            layer: Layer::EdgeCuts,
            footprint: None,
        });
        db.add_drawing(Drawing {
            shape: DrawShape::Polygon {
                points: vec![
                    Point::new(10.0 - slot_w / 2.0, 5.0),
                    Point::new(10.0 + slot_w / 2.0, 5.0),
                    Point::new(10.0 + slot_w / 2.0, 15.0),
                    Point::new(10.0 - slot_w / 2.0, 15.0),
                ],
            },
            layer: Layer::EdgeCuts,
            footprint: None,
        });
        db
    }

    #[test]
    fn npth_pad_becomes_circle_obstacle() {
        let mut db = BoardDB::new();
        db.add_pad(Pad {
            position: Point::new(1.0, 1.0),
            radius: 0.0,
            drill: 2.0,
            plated: false,
            net: None,
            layer: None,
            footprint: None,
        });
        let shapes = collect_edge_shapes(&db);
        assert_eq!(shapes.len(), 1);
        match &shapes[0].kind {
            ShapeKind::Circle { radius, .. } => assert!((radius - 1.0).abs() < 1e-12),
            other => panic!("expected circle, got {:?}", other),
        }
    }

    #[test]
    fn narrow_groove_is_bridged_wide_one_is_kept() {
        let db = board_with_slot(0.2);
        let mut shapes = collect_edge_shapes(&db);
        assert_eq!(shapes.len(), 2);
        remove_bridged_grooves(&mut shapes, 0.3);
        // Outline survives, narrow slot is gone.
        assert_eq!(shapes.len(), 1);

        let db = board_with_slot(0.5);
        let mut shapes = collect_edge_shapes(&db);
        remove_bridged_grooves(&mut shapes, 0.3);
        assert_eq!(shapes.len(), 2);
    }
}
