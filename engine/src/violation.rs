use crate::algo::dijkstra::ShortestPath;
use crate::graph::CreepGraph;
use crate::shapes::{CreepShape, Traversal};
use creepage_common::db::core::BoardDB;
use creepage_common::db::indices::{ItemId, NetId};
use creepage_common::geom::point::Point;
use serde::Serialize;

// One failed net pair on one layer; the path is the witness whose total
// length came in under the requirement.
#[derive(Clone, Debug, Serialize)]
pub struct CreepageViolation {
    pub net_a: NetId,
    pub net_b: NetId,
    pub layer: u8,
    pub required: f64,
    pub actual: f64,
    // Board items at the two ends of the witness path.
    pub item_a: ItemId,
    pub item_b: ItemId,
    pub path: Vec<Traversal>,
}

impl CreepageViolation {
    // Zero-length anchor traversals are dropped from the witness.
    pub fn from_path(
        graph: &CreepGraph,
        shapes: &[CreepShape],
        found: &ShortestPath,
        net_a: NetId,
        net_b: NetId,
        layer: u8,
        required: f64,
    ) -> Self {
        let mut path = Vec::new();
        let mut items: Vec<ItemId> = Vec::new();

        for &cid in &found.connections {
            let conn = &graph.connections[cid.index()];
            if conn.weight > 0.0 {
                path.push(conn.traversal.clone());
            }
            for node in [conn.a, conn.b] {
                if let Some(shape) = graph.nodes[node.index()].shape_index() {
                    let owner = shapes[shape].owner;
                    if items.last() != Some(&owner) {
                        items.push(owner);
                    }
                }
            }
        }

        let item_a = items.first().copied().unwrap_or(ItemId::new(0));
        let item_b = items.last().copied().unwrap_or(item_a);

        Self {
            net_a,
            net_b,
            layer,
            required,
            actual: found.distance,
            item_a,
            item_b,
            path,
        }
    }

    pub fn describe(&self, db: &BoardDB) -> String {
        format!(
            "Creepage {:.4} mm < required {:.4} mm between net '{}' and net '{}' on copper layer {} ({} -> {})",
            self.actual,
            self.required,
            db.nets[self.net_a.index()].name,
            db.nets[self.net_b.index()].name,
            self.layer,
            db.describe(self.item_a),
            db.describe(self.item_b),
        )
    }

    pub fn flattened_path(&self) -> Vec<(Point<f64>, Point<f64>)> {
        self.path.iter().flat_map(|t| t.flatten()).collect()
    }
}
