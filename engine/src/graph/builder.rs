use crate::collector;
use crate::graph::{CreepGraph, GraphCheckpoint, NodeId};
use crate::shapes::{CreepShape, Traversal};
use creepage_common::db::core::BoardDB;
use creepage_common::db::indices::NetId;
use creepage_common::geom::point::Point;
use creepage_common::geom::rtree::SpatialIndex;
use std::ops::{Deref, DerefMut};

// Per-layer graph: edge shapes and their mutual connections form the
// baseline; net copper is appended per pair and rolled back afterwards.
pub struct GraphBuilder {
    pub shapes: Vec<CreepShape>,
    pub graph: CreepGraph,
    // shapes[..edge_count] is the immutable per-layer obstacle set.
    edge_count: usize,
    index: SpatialIndex,
    tol: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuilderCheckpoint {
    graph: GraphCheckpoint,
    shapes: usize,
}

impl GraphBuilder {
    pub fn new(edge_shapes: Vec<CreepShape>, tol: f64) -> Self {
        let mut index = SpatialIndex::new();
        for (i, s) in edge_shapes.iter().enumerate() {
            index.insert(s.bounding_box(), i);
        }
        Self {
            edge_count: edge_shapes.len(),
            shapes: edge_shapes,
            graph: CreepGraph::new(),
            index,
            tol,
        }
    }

    // Baseline sweep over edge-shape pairs whose separation can matter
    // at max_distance. Safe to re-invoke with a larger budget; dedup
    // makes the result match a from-scratch build.
    pub fn generate_paths(&mut self, max_distance: f64) {
        for i in 0..self.edge_count {
            let bbox = self.shapes[i].bounding_box();
            let mut near = self.index.query_within(bbox, max_distance);
            near.sort_unstable();
            for j in near {
                if j > i {
                    self.connect_shape_pair(i, j, max_distance);
                }
            }
        }
        log::debug!(
            "Baseline graph: {} nodes, {} connections ({} edge shapes)",
            self.graph.nodes.len(),
            self.graph.connections.len(),
            self.edge_count
        );
    }

    // Appends one net's conductive copper and returns its NET node.
    pub fn add_net_elements(&mut self, db: &BoardDB, net: NetId, layer: u8) -> NodeId {
        let node = self.graph.add_net_node(net);
        let copper = collector::collect_net_shapes(db, net, layer);
        self.shapes.extend(copper);
        node
    }

    // Connects the appended copper to everything within the budget: the
    // other net directly, the edge obstacles as waypoints.
    pub fn connect_net_pair(&mut self, budget: f64) {
        let total = self.shapes.len();
        for i in self.edge_count..total {
            let bbox = self.shapes[i].bounding_box();

            let mut near_edges = self.index.query_within(bbox, budget);
            near_edges.sort_unstable();
            for j in near_edges {
                self.connect_shape_pair(i, j, budget);
            }

            for j in (i + 1)..total {
                if self.shapes[i].net == self.shapes[j].net {
                    continue;
                }
                self.connect_shape_pair(i, j, budget);
            }
        }
    }

    fn connect_shape_pair(&mut self, i: usize, j: usize, budget: f64) {
        if i == j {
            return;
        }
        let gap = self.shapes[i]
            .bounding_box()
            .distance_to(&self.shapes[j].bounding_box());
        if gap > budget {
            return;
        }

        // Seed the candidate generation with the mutual nearest approach.
        let pj_seed = self.shapes[j].nearest_point(self.shapes[i].reference_point());
        let pi_seed = self.shapes[i].nearest_point(pj_seed);

        let mut cand_i = Vec::new();
        let mut cand_j = Vec::new();
        self.shapes[i].boundary_points_toward(pj_seed, &mut cand_i);
        self.shapes[j].boundary_points_toward(pi_seed, &mut cand_j);

        for &pi in &cand_i {
            for &pj in &cand_j {
                let weight = pi.dist(pj);
                if weight > budget {
                    continue;
                }
                if self.segment_blocked(pi, pj) {
                    continue;
                }
                let na = self.install_point(i, pi);
                let nb = self.install_point(j, pj);
                if na == nb || self.graph.are_connected(na, nb) {
                    continue;
                }
                self.graph
                    .connect(na, nb, Traversal::Line { a: pi, b: pj }, weight);
            }
        }
    }

    // Conductive points anchor to their NET node at zero cost; obstacle
    // points hug their siblings.
    fn install_point(&mut self, shape: usize, pos: Point<f64>) -> NodeId {
        let (node, is_new) = self.graph.get_or_add_point(shape, pos, self.tol);
        if !is_new {
            return node;
        }
        match self.shapes[shape].net {
            Some(net) => {
                let net_node = self.graph.add_net_node(net);
                self.graph.mark_connect_directly(node);
                self.graph
                    .connect(net_node, node, Traversal::Line { a: pos, b: pos }, 0.0);
            }
            None => {
                let siblings: Vec<NodeId> = self
                    .graph
                    .nodes_of_shape(shape)
                    .iter()
                    .copied()
                    .filter(|&s| s != node)
                    .collect();
                for sibling in siblings {
                    self.graph.connect_children(node, sibling, &self.shapes);
                }
            }
        }
        node
    }

    // Endpoint grazes are already tolerated by the per-shape crossing
    // tests, so a path may launch from a boundary it was generated on.
    fn segment_blocked(&self, a: Point<f64>, b: Point<f64>) -> bool {
        let bbox = creepage_common::geom::rect::Rect::from_points(&[a, b]).inflated(self.tol);
        for k in self.index.query(bbox) {
            if self.shapes[k].blocks(a, b, self.tol) {
                return true;
            }
        }
        // Per-pair copper is not in the index; linear scan with a box
        // prefilter.
        for k in self.edge_count..self.shapes.len() {
            if !self.shapes[k].bounding_box().overlaps(&bbox) {
                continue;
            }
            if self.shapes[k].blocks(a, b, self.tol) {
                return true;
            }
        }
        false
    }

    pub fn checkpoint(&self) -> BuilderCheckpoint {
        BuilderCheckpoint {
            graph: self.graph.checkpoint(),
            shapes: self.shapes.len(),
        }
    }

    pub fn rollback(&mut self, cp: BuilderCheckpoint) {
        self.graph.rollback(cp.graph);
        self.shapes.truncate(cp.shapes);
    }

    // Everything appended inside the scope is rolled back on drop,
    // early return and cancellation included.
    pub fn pair_scope(&mut self) -> PairScope<'_> {
        let cp = self.checkpoint();
        PairScope { builder: self, cp }
    }
}

pub struct PairScope<'a> {
    builder: &'a mut GraphBuilder,
    cp: BuilderCheckpoint,
}

impl Deref for PairScope<'_> {
    type Target = GraphBuilder;
    fn deref(&self) -> &GraphBuilder {
        self.builder
    }
}

impl DerefMut for PairScope<'_> {
    fn deref_mut(&mut self) -> &mut GraphBuilder {
        self.builder
    }
}

impl Drop for PairScope<'_> {
    fn drop(&mut self) {
        self.builder.rollback(self.cp);
    }
}
