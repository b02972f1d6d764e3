use creepage_common::db::indices::{ItemId, NetId};
use creepage_common::geom::point::Point;
use creepage_common::geom::rect::Rect;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub enum Traversal {
    Line {
        a: Point<f64>,
        b: Point<f64>,
    },
    // end_angle may be smaller than start_angle; walk goes start to end.
    Arc {
        center: Point<f64>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Polyline {
        points: Vec<Point<f64>>,
    },
}

impl Traversal {
    pub fn length(&self) -> f64 {
        match self {
            Traversal::Line { a, b } => a.dist(*b),
            Traversal::Arc {
                radius,
                start_angle,
                end_angle,
                ..
            } => radius * (end_angle - start_angle).abs(),
            Traversal::Polyline { points } => points
                .windows(2)
                .map(|w| w[0].dist(w[1]))
                .sum(),
        }
    }

    pub fn flatten(&self) -> Vec<(Point<f64>, Point<f64>)> {
        match self {
            Traversal::Line { a, b } => vec![(*a, *b)],
            Traversal::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                let steps = 16;
                let span = end_angle - start_angle;
                let mut out = Vec::with_capacity(steps);
                let at = |ang: f64| {
                    Point::new(center.x + radius * ang.cos(), center.y + radius * ang.sin())
                };
                let mut prev = at(*start_angle);
                for i in 1..=steps {
                    let next = at(start_angle + span * (i as f64 / steps as f64));
                    out.push((prev, next));
                    prev = next;
                }
                out
            }
            Traversal::Polyline { points } => {
                points.windows(2).map(|w| (w[0], w[1])).collect()
            }
        }
    }
}

#[derive(Clone, Debug)]
pub enum ShapeKind {
    Segment {
        a: Point<f64>,
        b: Point<f64>,
    },
    Arc {
        center: Point<f64>,
        radius: f64,
        // Normalized so end_angle >= start_angle.
        start_angle: f64,
        end_angle: f64,
    },
    Circle {
        center: Point<f64>,
        radius: f64,
    },
    Polygon {
        points: Vec<Point<f64>>,
    },
}

// Conductive shapes carry the owning net; board material carries none.
#[derive(Clone, Debug)]
pub struct CreepShape {
    pub kind: ShapeKind,
    pub owner: ItemId,
    pub net: Option<NetId>,
}

impl CreepShape {
    pub fn is_conductive(&self) -> bool {
        self.net.is_some()
    }

    pub fn bounding_box(&self) -> Rect {
        match &self.kind {
            ShapeKind::Segment { a, b } => Rect::from_points(&[*a, *b]),
            ShapeKind::Circle { center, radius }
            | ShapeKind::Arc { center, radius, .. } => Rect::new(
                Point::new(center.x - radius, center.y - radius),
                Point::new(center.x + radius, center.y + radius),
            ),
            ShapeKind::Polygon { points } => Rect::from_points(points),
        }
    }

    pub fn reference_point(&self) -> Point<f64> {
        match &self.kind {
            ShapeKind::Segment { a, b } => Point::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5),
            ShapeKind::Circle { center, .. } | ShapeKind::Arc { center, .. } => *center,
            ShapeKind::Polygon { points } => Rect::from_points(points).center(),
        }
    }

    pub fn nearest_point(&self, p: Point<f64>) -> Point<f64> {
        match &self.kind {
            ShapeKind::Segment { a, b } => nearest_on_segment(p, *a, *b),
            ShapeKind::Circle { center, radius } => point_on_circle_toward(*center, *radius, p),
            ShapeKind::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                let ang = (p - *center).angle();
                if angle_in_span(ang, *start_angle, *end_angle) {
                    point_at_angle(*center, *radius, ang)
                } else {
                    let s = point_at_angle(*center, *radius, *start_angle);
                    let e = point_at_angle(*center, *radius, *end_angle);
                    if p.dist(s) <= p.dist(e) { s } else { e }
                }
            }
            ShapeKind::Polygon { points } => {
                let mut best = points.first().copied().unwrap_or(p);
                let mut best_d = f64::INFINITY;
                for i in 0..points.len() {
                    let q = nearest_on_segment(p, points[i], points[(i + 1) % points.len()]);
                    let d = p.dist_sq(q);
                    if d < best_d {
                        best_d = d;
                        best = q;
                    }
                }
                best
            }
        }
    }

    // Candidate points toward `from`: nearest approach, extremities, and
    // tangent points where a line can graze a round rim.
    pub fn boundary_points_toward(&self, from: Point<f64>, out: &mut Vec<Point<f64>>) {
        match &self.kind {
            ShapeKind::Segment { a, b } => {
                out.push(*a);
                out.push(*b);
                out.push(nearest_on_segment(from, *a, *b));
            }
            ShapeKind::Circle { center, radius } => {
                out.push(point_on_circle_toward(*center, *radius, from));
                if let Some((t1, t2)) = tangent_points(*center, *radius, from) {
                    out.push(t1);
                    out.push(t2);
                }
            }
            ShapeKind::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                out.push(point_at_angle(*center, *radius, *start_angle));
                out.push(point_at_angle(*center, *radius, *end_angle));
                out.push(self.nearest_point(from));
                if let Some((t1, t2)) = tangent_points(*center, *radius, from) {
                    for t in [t1, t2] {
                        if angle_in_span((t - *center).angle(), *start_angle, *end_angle) {
                            out.push(t);
                        }
                    }
                }
            }
            ShapeKind::Polygon { points } => {
                out.extend_from_slice(points);
                out.push(self.nearest_point(from));
            }
        }
    }

    // Surface walk between two boundary points of this shape.
    pub fn hug_path(&self, p: Point<f64>, q: Point<f64>) -> Option<(f64, Traversal)> {
        match &self.kind {
            ShapeKind::Segment { a, b } => {
                let p = nearest_on_segment(p, *a, *b);
                let q = nearest_on_segment(q, *a, *b);
                Some((p.dist(q), Traversal::Line { a: p, b: q }))
            }
            ShapeKind::Circle { center, radius } => {
                if *radius <= f64::EPSILON {
                    return Some((0.0, Traversal::Line { a: *center, b: *center }));
                }
                let tp = (p - *center).angle();
                let tq = (q - *center).angle();
                let mut delta = tq - tp;
                while delta > std::f64::consts::PI {
                    delta -= 2.0 * std::f64::consts::PI;
                }
                while delta < -std::f64::consts::PI {
                    delta += 2.0 * std::f64::consts::PI;
                }
                Some((
                    radius * delta.abs(),
                    Traversal::Arc {
                        center: *center,
                        radius: *radius,
                        start_angle: tp,
                        end_angle: tp + delta,
                    },
                ))
            }
            ShapeKind::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                let tp = clamp_to_span((p - *center).angle(), *start_angle, *end_angle);
                let tq = clamp_to_span((q - *center).angle(), *start_angle, *end_angle);
                Some((
                    radius * (tq - tp).abs(),
                    Traversal::Arc {
                        center: *center,
                        radius: *radius,
                        start_angle: tp,
                        end_angle: tq,
                    },
                ))
            }
            ShapeKind::Polygon { points } => polygon_walk(points, p, q),
        }
    }

    pub fn surface_distance(&self, p: Point<f64>, q: Point<f64>) -> Option<f64> {
        self.hug_path(p, q).map(|(d, _)| d)
    }

    // Endpoint grazes within tol do not count; a path may start and end
    // on a boundary.
    pub fn blocks(&self, a: Point<f64>, b: Point<f64>, tol: f64) -> bool {
        match &self.kind {
            ShapeKind::Segment { a: s1, b: s2 } => {
                segments_properly_cross(a, b, *s1, *s2, tol)
            }
            ShapeKind::Circle { center, radius } => {
                *radius > tol && point_to_segment_dist(*center, a, b) < radius - tol
            }
            ShapeKind::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => segment_crosses_arc(a, b, *center, *radius, *start_angle, *end_angle, tol),
            ShapeKind::Polygon { points } => {
                for i in 0..points.len() {
                    let e1 = points[i];
                    let e2 = points[(i + 1) % points.len()];
                    if segments_properly_cross(a, b, e1, e2, tol) {
                        return true;
                    }
                }
                false
            }
        }
    }
}

// Overlapping edge imports produce coordinate-identical duplicates.
pub fn remove_duplicated_shapes(shapes: &mut Vec<CreepShape>, tol: f64) {
    let mut keep: Vec<CreepShape> = Vec::with_capacity(shapes.len());
    for s in shapes.drain(..) {
        if !keep.iter().any(|k| shapes_coincide(k, &s, tol)) {
            keep.push(s);
        }
    }
    *shapes = keep;
}

fn shapes_coincide(a: &CreepShape, b: &CreepShape, tol: f64) -> bool {
    if a.net != b.net {
        return false;
    }
    match (&a.kind, &b.kind) {
        (ShapeKind::Segment { a: a1, b: b1 }, ShapeKind::Segment { a: a2, b: b2 }) => {
            (a1.dist(*a2) < tol && b1.dist(*b2) < tol)
                || (a1.dist(*b2) < tol && b1.dist(*a2) < tol)
        }
        (
            ShapeKind::Circle { center: c1, radius: r1 },
            ShapeKind::Circle { center: c2, radius: r2 },
        ) => c1.dist(*c2) < tol && (r1 - r2).abs() < tol,
        (
            ShapeKind::Arc {
                center: c1,
                radius: r1,
                start_angle: s1,
                end_angle: e1,
            },
            ShapeKind::Arc {
                center: c2,
                radius: r2,
                start_angle: s2,
                end_angle: e2,
            },
        ) => {
            c1.dist(*c2) < tol
                && (r1 - r2).abs() < tol
                && (s1 - s2).abs() < tol
                && (e1 - e2).abs() < tol
        }
        (ShapeKind::Polygon { points: p1 }, ShapeKind::Polygon { points: p2 }) => {
            p1.len() == p2.len() && p1.iter().zip(p2).all(|(u, v)| u.dist(*v) < tol)
        }
        _ => false,
    }
}

pub fn nearest_on_segment(p: Point<f64>, a: Point<f64>, b: Point<f64>) -> Point<f64> {
    let l2 = a.dist_sq(b);
    if l2 <= f64::EPSILON {
        return a;
    }
    let t = ((p - a).dot(b - a) / l2).clamp(0.0, 1.0);
    a + (b - a) * t
}

pub fn point_to_segment_dist(p: Point<f64>, a: Point<f64>, b: Point<f64>) -> f64 {
    p.dist(nearest_on_segment(p, a, b))
}

fn point_at_angle(center: Point<f64>, radius: f64, ang: f64) -> Point<f64> {
    Point::new(center.x + radius * ang.cos(), center.y + radius * ang.sin())
}

fn point_on_circle_toward(center: Point<f64>, radius: f64, p: Point<f64>) -> Point<f64> {
    let dir = (p - center).normalized();
    if dir.norm() <= f64::EPSILON {
        // Degenerate query from the center itself.
        return Point::new(center.x + radius, center.y);
    }
    center + dir * radius
}

fn tangent_points(
    center: Point<f64>,
    radius: f64,
    from: Point<f64>,
) -> Option<(Point<f64>, Point<f64>)> {
    let d = from.dist(center);
    if d <= radius || radius <= f64::EPSILON {
        return None;
    }
    let base = (from - center).angle();
    let beta = (radius / d).clamp(-1.0, 1.0).acos();
    Some((
        point_at_angle(center, radius, base + beta),
        point_at_angle(center, radius, base - beta),
    ))
}

// Normalized relative to start so spans crossing the -pi/pi seam work.
fn angle_in_span(ang: f64, start: f64, end: f64) -> bool {
    let mut a = ang;
    while a < start {
        a += 2.0 * std::f64::consts::PI;
    }
    a <= end + 1e-12
}

fn clamp_to_span(ang: f64, start: f64, end: f64) -> f64 {
    let mut a = ang;
    while a < start {
        a += 2.0 * std::f64::consts::PI;
    }
    if a <= end { a } else { end }
}

fn orientation(p: Point<f64>, q: Point<f64>, r: Point<f64>, tol: f64) -> i32 {
    let val = (q - p).cross(r - p);
    if val.abs() < tol {
        return 0;
    }
    if val > 0.0 { 1 } else { 2 }
}

// Strict interior crossing; touches at or near endpoints do not count.
pub fn segments_properly_cross(
    a1: Point<f64>,
    a2: Point<f64>,
    b1: Point<f64>,
    b2: Point<f64>,
    tol: f64,
) -> bool {
    for (p, q) in [(a1, b1), (a1, b2), (a2, b1), (a2, b2)] {
        if p.dist(q) < tol {
            return false;
        }
    }
    // Endpoint of one segment lying on the other is a graze, not a cross.
    for p in [a1, a2] {
        if point_to_segment_dist(p, b1, b2) < tol {
            return false;
        }
    }
    for p in [b1, b2] {
        if point_to_segment_dist(p, a1, a2) < tol {
            return false;
        }
    }

    let o1 = orientation(a1, a2, b1, tol * tol);
    let o2 = orientation(a1, a2, b2, tol * tol);
    let o3 = orientation(b1, b2, a1, tol * tol);
    let o4 = orientation(b1, b2, a2, tol * tol);

    o1 != o2 && o3 != o4 && o1 != 0 && o2 != 0 && o3 != 0 && o4 != 0
}

fn segment_crosses_arc(
    a: Point<f64>,
    b: Point<f64>,
    center: Point<f64>,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    tol: f64,
) -> bool {
    if radius <= tol {
        return false;
    }
    // Intersect the supporting line with the circle, then filter by
    // segment range, arc span, and endpoint grazes.
    let d = b - a;
    let f = a - center;
    let qa = d.dot(d);
    if qa <= f64::EPSILON {
        return false;
    }
    let qb = 2.0 * f.dot(d);
    let qc = f.dot(f) - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return false;
    }
    let sq = disc.sqrt();
    for t in [(-qb - sq) / (2.0 * qa), (-qb + sq) / (2.0 * qa)] {
        if !(0.0..=1.0).contains(&t) {
            continue;
        }
        let x = a + d * t;
        if x.dist(a) < tol || x.dist(b) < tol {
            continue;
        }
        if angle_in_span((x - center).angle(), start_angle, end_angle) {
            return true;
        }
    }
    false
}

// Shortest walk along the rim, either direction.
fn polygon_walk(
    points: &[Point<f64>],
    p: Point<f64>,
    q: Point<f64>,
) -> Option<(f64, Traversal)> {
    let n = points.len();
    if n < 2 {
        return Some((0.0, Traversal::Line { a: p, b: p }));
    }

    let edge_len: Vec<f64> = (0..n).map(|i| points[i].dist(points[(i + 1) % n])).collect();
    let perimeter: f64 = edge_len.iter().sum();
    if perimeter <= f64::EPSILON {
        return Some((0.0, Traversal::Line { a: p, b: p }));
    }

    let locate = |x: Point<f64>| -> (usize, f64, f64) {
        let mut best = (0usize, 0.0f64, f64::INFINITY);
        let mut cum = 0.0;
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let np = nearest_on_segment(x, a, b);
            let d = x.dist_sq(np);
            if d < best.2 {
                best = (i, cum + a.dist(np), d);
            }
            cum += edge_len[i];
        }
        (best.0, best.1, best.2)
    };

    let (ep, sp, _) = locate(p);
    let (eq, sq_along, _) = locate(q);
    let forward = (sq_along - sp).rem_euclid(perimeter);
    let backward = perimeter - forward;
    let dist = forward.min(backward);

    // Polyline for reporting: walk vertex to vertex the shorter way.
    let mut pts = vec![p];
    if ep == eq && (dist - (sq_along - sp).abs()).abs() < 1e-12 {
        // Same edge, direct slide; no vertices in between.
    } else if forward <= backward {
        let mut i = (ep + 1) % n;
        loop {
            pts.push(points[i]);
            if i == eq {
                break;
            }
            i = (i + 1) % n;
        }
    } else {
        let mut i = ep;
        loop {
            pts.push(points[i]);
            if i == (eq + 1) % n {
                break;
            }
            i = (i + n - 1) % n;
        }
    }
    pts.push(q);

    Some((dist, Traversal::Polyline { points: pts }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use creepage_common::db::indices::ItemId;

    fn circle(cx: f64, cy: f64, r: f64) -> CreepShape {
        CreepShape {
            kind: ShapeKind::Circle {
                center: Point::new(cx, cy),
                radius: r,
            },
            owner: ItemId::new(0),
            net: None,
        }
    }

    #[test]
    fn circle_tangent_points_graze_not_block() {
        let c = circle(0.0, 0.0, 2.0);
        let from = Point::new(-10.0, 0.0);
        let mut pts = Vec::new();
        c.boundary_points_toward(from, &mut pts);
        let tangents: Vec<_> = pts.iter().filter(|p| p.x.abs() < 2.0).collect();
        assert!(!tangents.is_empty());
        for t in pts {
            assert!(
                !c.blocks(from, t, 1e-6),
                "tangent/nearest segment to {:?} must not be blocked",
                t
            );
        }
    }

    #[test]
    fn circle_blocks_chord_through_interior() {
        let c = circle(0.0, 0.0, 2.0);
        assert!(c.blocks(Point::new(-10.0, 0.0), Point::new(10.0, 0.0), 1e-6));
        assert!(!c.blocks(Point::new(-10.0, 5.0), Point::new(10.0, 5.0), 1e-6));
    }

    #[test]
    fn circle_hug_is_arc_length() {
        let c = circle(0.0, 0.0, 2.0);
        let p = Point::new(2.0, 0.0);
        let q = Point::new(0.0, 2.0);
        let d = c.surface_distance(p, q).unwrap();
        assert!((d - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn zero_radius_circle_degenerates_quietly() {
        let c = circle(1.0, 1.0, 0.0);
        let p = Point::new(1.0, 1.0);
        assert_eq!(c.surface_distance(p, p).unwrap(), 0.0);
        assert!(!c.blocks(Point::new(0.0, 0.0), Point::new(2.0, 2.0), 1e-6));
    }

    #[test]
    fn segment_cross_and_graze() {
        let a1 = Point::new(-1.0, 0.0);
        let a2 = Point::new(1.0, 0.0);
        assert!(segments_properly_cross(
            a1,
            a2,
            Point::new(0.0, -1.0),
            Point::new(0.0, 1.0),
            1e-6
        ));
        // Endpoint touching the other segment is a graze.
        assert!(!segments_properly_cross(
            a1,
            a2,
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            1e-6
        ));
    }

    #[test]
    fn polygon_walk_shorter_way() {
        let poly = CreepShape {
            kind: ShapeKind::Polygon {
                points: vec![
                    Point::new(0.0, 0.0),
                    Point::new(4.0, 0.0),
                    Point::new(4.0, 4.0),
                    Point::new(0.0, 4.0),
                ],
            },
            owner: ItemId::new(0),
            net: None,
        };
        // Adjacent corners: one edge.
        let d = poly
            .surface_distance(Point::new(0.0, 0.0), Point::new(4.0, 0.0))
            .unwrap();
        assert!((d - 4.0).abs() < 1e-9);
        // Opposite corners: two edges either way.
        let d = poly
            .surface_distance(Point::new(0.0, 0.0), Point::new(4.0, 4.0))
            .unwrap();
        assert!((d - 8.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_shapes_are_removed() {
        let mut shapes = vec![circle(0.0, 0.0, 1.0), circle(0.0, 0.0, 1.0), circle(3.0, 0.0, 1.0)];
        remove_duplicated_shapes(&mut shapes, 1e-6);
        assert_eq!(shapes.len(), 2);
    }
}
