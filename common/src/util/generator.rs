use crate::db::core::{BoardDB, DrawShape, Drawing, Layer, Pad};
use crate::geom::point::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Random but well-formed board; seeded so failures reproduce.
pub fn generate_random_board(
    seed: u64,
    size: f64,
    num_nets: usize,
    num_pads: usize,
    num_cutouts: usize,
) -> BoardDB {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut db = BoardDB::new();

    db.add_drawing(Drawing {
        shape: DrawShape::Polygon {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(size, 0.0),
                Point::new(size, size),
                Point::new(0.0, size),
            ],
        },
        layer: Layer::EdgeCuts,
        footprint: None,
    });

    let nets: Vec<_> = (0..num_nets.max(1))
        .map(|i| db.add_net(&format!("NET{}", i)))
        .collect();

    // Keep cutouts off the rim so the outline stays sane.
    for _ in 0..num_cutouts {
        let r = rng.gen_range(0.3..size * 0.05);
        let cx = rng.gen_range(size * 0.15..size * 0.85);
        let cy = rng.gen_range(size * 0.15..size * 0.85);
        db.add_drawing(Drawing {
            shape: DrawShape::Circle {
                center: Point::new(cx, cy),
                radius: r,
            },
            layer: Layer::EdgeCuts,
            footprint: None,
        });
    }

    for i in 0..num_pads {
        let fp = db.add_footprint(&format!("U{}", i));
        let net = nets[rng.gen_range(0..nets.len())];
        db.add_pad(Pad {
            position: Point::new(
                rng.gen_range(size * 0.05..size * 0.95),
                rng.gen_range(size * 0.05..size * 0.95),
            ),
            radius: rng.gen_range(0.2..0.8),
            drill: 0.0,
            plated: true,
            net: Some(net),
            layer: Some(0),
            footprint: Some(fp),
        });
    }

    db
}
