use crate::algo::dijkstra;
use crate::collector;
use crate::graph::builder::GraphBuilder;
use crate::shapes;
use crate::violation::CreepageViolation;
use creepage_common::db::core::BoardDB;
use creepage_common::db::indices::NetId;
use creepage_common::error::BoardError;
use creepage_common::util::check::run_board_check;
use creepage_common::util::config::CreepageConfig;
use creepage_common::util::profiler::ScopedTimer;
use creepage_common::util::visualization;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

// None means the pair is unconstrained and skipped entirely.
pub trait ClearanceProvider: Sync {
    fn required_distance(&self, a: NetId, b: NetId, layer: u8) -> Option<f64>;
}

// Called from worker threads.
pub trait ViolationReporter: Sync {
    fn report(&self, db: &BoardDB, violation: &CreepageViolation);
}

// Layers are independent and run in parallel, each with its own graph.
// A cancelled run returns Ok with whatever was reported so far.
pub fn run(
    db: &BoardDB,
    config: &CreepageConfig,
    provider: &dyn ClearanceProvider,
    reporter: &dyn ViolationReporter,
    cancel: &AtomicBool,
) -> Result<(), BoardError> {
    let _timer = ScopedTimer::new("creepage check");
    run_board_check(db)?;

    (0..db.copper_layers)
        .into_par_iter()
        .for_each(|layer| check_layer(db, config, provider, reporter, cancel, layer));

    Ok(())
}

fn check_layer(
    db: &BoardDB,
    config: &CreepageConfig,
    provider: &dyn ClearanceProvider,
    reporter: &dyn ViolationReporter,
    cancel: &AtomicBool,
    layer: u8,
) {
    let mut pairs = Vec::new();
    let mut max_required = 0.0f64;
    for a in 0..db.num_nets() {
        for b in (a + 1)..db.num_nets() {
            let (na, nb) = (NetId::new(a), NetId::new(b));
            if let Some(req) = provider.required_distance(na, nb, layer) {
                max_required = max_required.max(req);
                pairs.push((na, nb, req));
            }
        }
    }
    if pairs.is_empty() {
        return;
    }

    let mut timer = ScopedTimer::new(format!("creepage layer {}", layer));
    timer.set_count(pairs.len());

    let mut obstacles = collector::collect_edge_shapes(db);
    shapes::remove_duplicated_shapes(&mut obstacles, config.tolerance);
    collector::remove_bridged_grooves(&mut obstacles, config.min_groove_width);
    log::info!(
        "Layer {}: {} obstacle shapes, {} constrained net pairs",
        layer,
        obstacles.len(),
        pairs.len()
    );

    let mut builder = GraphBuilder::new(obstacles, config.tolerance);
    builder.generate_paths(max_required + config.budget_slack);

    for (a, b, required) in pairs {
        if cancel.load(Ordering::Relaxed) {
            log::warn!("Creepage check cancelled on layer {}", layer);
            return;
        }

        let mut scope = builder.pair_scope();
        let node_a = scope.add_net_elements(db, a, layer);
        let node_b = scope.add_net_elements(db, b, layer);
        scope.connect_net_pair(required + config.budget_slack);

        let Some(found) = dijkstra::solve(&scope.graph, node_a, node_b) else {
            continue;
        };
        // A witness needs at least one real surface traversal; a chain of
        // zero-weight anchors means the nets touch, which is a connectivity
        // problem rather than a creepage one.
        let has_real_leg = found
            .connections
            .iter()
            .any(|c| scope.graph.connections[c.index()].weight > 0.0);
        if !has_real_leg || found.distance >= required {
            continue;
        }

        let violation = CreepageViolation::from_path(
            &scope.graph,
            &scope.shapes,
            &found,
            a,
            b,
            layer,
            required,
        );
        log::warn!("{}", violation.describe(db));
        reporter.report(db, &violation);

        if config.debug_images {
            let filename = format!(
                "{}/creepage_l{}_n{}_n{}.png",
                config.debug_image_dir,
                layer,
                a.index(),
                b.index()
            );
            visualization::draw_creepage(db, &violation.flattened_path(), &filename, 1200, 1200);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creepage_common::db::core::{DrawShape, Drawing, Layer, Pad};
    use creepage_common::geom::point::Point;
    use std::sync::Mutex;

    struct FixedClearance(f64);

    impl ClearanceProvider for FixedClearance {
        fn required_distance(&self, _: NetId, _: NetId, _: u8) -> Option<f64> {
            Some(self.0)
        }
    }

    #[derive(Default)]
    struct Collecting(Mutex<Vec<CreepageViolation>>);

    impl ViolationReporter for Collecting {
        fn report(&self, _: &BoardDB, v: &CreepageViolation) {
            self.0.lock().unwrap().push(v.clone());
        }
    }

    fn simple_board(gap: f64) -> BoardDB {
        let mut db = BoardDB::new();
        db.copper_layers = 1;
        db.add_drawing(Drawing {
            shape: DrawShape::Polygon {
                points: vec![
                    Point::new(-20.0, -20.0),
                    Point::new(20.0, -20.0),
                    Point::new(20.0, 20.0),
                    Point::new(-20.0, 20.0),
                ],
            },
            layer: Layer::EdgeCuts,
            footprint: None,
        });
        let a = db.add_net("A");
        let b = db.add_net("B");
        let r = 0.5;
        for (net, x) in [(a, -gap / 2.0 - r), (b, gap / 2.0 + r)] {
            db.add_pad(Pad {
                position: Point::new(x, 0.0),
                radius: r,
                drill: 0.0,
                plated: true,
                net: Some(net),
                layer: Some(0),
                footprint: None,
            });
        }
        db
    }

    #[test]
    fn close_pads_are_reported_far_ones_are_not() {
        let reporter = Collecting::default();
        let db = simple_board(2.0);
        run(
            &db,
            &CreepageConfig::default(),
            &FixedClearance(4.0),
            &reporter,
            &AtomicBool::new(false),
        )
        .unwrap();
        let hits = reporter.0.lock().unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].actual - 2.0).abs() < 1e-6);

        let reporter = Collecting::default();
        let db = simple_board(6.0);
        run(
            &db,
            &CreepageConfig::default(),
            &FixedClearance(4.0),
            &reporter,
            &AtomicBool::new(false),
        )
        .unwrap();
        assert!(reporter.0.lock().unwrap().is_empty());
    }

    #[test]
    fn cancelled_run_reports_nothing() {
        let reporter = Collecting::default();
        let db = simple_board(2.0);
        run(
            &db,
            &CreepageConfig::default(),
            &FixedClearance(4.0),
            &reporter,
            &AtomicBool::new(true),
        )
        .unwrap();
        assert!(reporter.0.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_outline_ring_is_an_error() {
        let mut db = simple_board(2.0);
        db.add_drawing(Drawing {
            shape: DrawShape::Polygon {
                points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            },
            layer: Layer::EdgeCuts,
            footprint: None,
        });
        let reporter = Collecting::default();
        let err = run(
            &db,
            &CreepageConfig::default(),
            &FixedClearance(4.0),
            &reporter,
            &AtomicBool::new(false),
        );
        assert!(err.is_err());
    }
}
