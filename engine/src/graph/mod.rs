pub mod builder;

use crate::shapes::{CreepShape, Traversal};
use creepage_common::db::indices::NetId;
use creepage_common::geom::point::Point;
use std::collections::HashMap;
use std::fmt::Debug;

macro_rules! define_handle {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            #[inline(always)]
            pub fn new(id: usize) -> Self {
                Self(id as u32)
            }
            #[inline(always)]
            pub fn index(&self) -> usize {
                self.0 as usize
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_handle!(NodeId);
define_handle!(ConnId);

#[derive(Clone, Debug)]
pub enum NodeKind {
    // Anywhere on this net; reaching it costs nothing extra.
    Net(NetId),
    // A concrete boundary coordinate on a creep shape (by arena index).
    Point { pos: Point<f64>, shape: usize },
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub kind: NodeKind,
    // Set on points wired straight to a NET node; two such points must
    // never get a surface-hug shortcut between them.
    pub connect_directly: bool,
    pub connections: Vec<ConnId>,
}

impl GraphNode {
    pub fn shape_index(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Point { shape, .. } => Some(shape),
            NodeKind::Net(_) => None,
        }
    }

    pub fn position(&self) -> Option<Point<f64>> {
        match self.kind {
            NodeKind::Point { pos, .. } => Some(pos),
            NodeKind::Net(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GraphConnection {
    pub a: NodeId,
    pub b: NodeId,
    pub traversal: Traversal,
    pub weight: f64,
}

impl GraphConnection {
    pub fn other(&self, n: NodeId) -> NodeId {
        if self.a == n { self.b } else { self.a }
    }
}

// Sizes recorded before a net-pair test; rollback truncates both arenas
// to these lengths. Mutation inside the window is append-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphCheckpoint {
    pub nodes: usize,
    pub connections: usize,
}

// Flat arenas addressed by handles; rollback is a truncation plus
// adjacency cleanup, no back-pointers to dangle.
#[derive(Default)]
pub struct CreepGraph {
    pub nodes: Vec<GraphNode>,
    pub connections: Vec<GraphConnection>,
    net_nodes: HashMap<NetId, NodeId>,
    shape_nodes: HashMap<usize, Vec<NodeId>>,
}

impl CreepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn net_node(&self, net: NetId) -> Option<NodeId> {
        self.net_nodes.get(&net).copied()
    }

    pub fn add_net_node(&mut self, net: NetId) -> NodeId {
        if let Some(id) = self.net_nodes.get(&net) {
            return *id;
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(GraphNode {
            kind: NodeKind::Net(net),
            connect_directly: false,
            connections: Vec::new(),
        });
        self.net_nodes.insert(net, id);
        id
    }

    // Deduplicated within tol so the sweep does not pile coincident
    // nodes onto one coordinate.
    pub fn get_or_add_point(
        &mut self,
        shape: usize,
        pos: Point<f64>,
        tol: f64,
    ) -> (NodeId, bool) {
        if let Some(ids) = self.shape_nodes.get(&shape) {
            for &id in ids {
                if let NodeKind::Point { pos: existing, .. } = self.nodes[id.index()].kind {
                    if existing.dist(pos) < tol {
                        return (id, false);
                    }
                }
            }
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(GraphNode {
            kind: NodeKind::Point { pos, shape },
            connect_directly: false,
            connections: Vec::new(),
        });
        self.shape_nodes.entry(shape).or_default().push(id);
        (id, true)
    }

    pub fn nodes_of_shape(&self, shape: usize) -> &[NodeId] {
        self.shape_nodes
            .get(&shape)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn mark_connect_directly(&mut self, node: NodeId) {
        self.nodes[node.index()].connect_directly = true;
    }

    pub fn connect(&mut self, a: NodeId, b: NodeId, traversal: Traversal, weight: f64) -> ConnId {
        debug_assert!(weight >= 0.0);
        let id = ConnId::new(self.connections.len());
        self.connections.push(GraphConnection {
            a,
            b,
            traversal,
            weight,
        });
        self.nodes[a.index()].connections.push(id);
        self.nodes[b.index()].connections.push(id);
        id
    }

    pub fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes[a.index()]
            .connections
            .iter()
            .any(|&c| self.connections[c.index()].other(a) == b)
    }

    // Surface-hug edge between two point nodes of the same non-conductive
    // shape. None when the pair cannot hug; that is a normal outcome of
    // the all-pairs sweep, not an error.
    pub fn connect_children(
        &mut self,
        a: NodeId,
        b: NodeId,
        shapes: &[CreepShape],
    ) -> Option<ConnId> {
        if a == b {
            return None;
        }
        let (sa, sb) = (
            self.nodes[a.index()].shape_index()?,
            self.nodes[b.index()].shape_index()?,
        );
        if sa != sb {
            return None;
        }
        let shape = &shapes[sa];
        if shape.is_conductive() {
            return None;
        }
        if self.nodes[a.index()].connect_directly || self.nodes[b.index()].connect_directly {
            return None;
        }
        if self.are_connected(a, b) {
            return None;
        }
        let pa = self.nodes[a.index()].position()?;
        let pb = self.nodes[b.index()].position()?;
        let (weight, traversal) = shape.hug_path(pa, pb)?;
        Some(self.connect(a, b, traversal, weight))
    }

    // With cascade the trailing detached records are popped as well;
    // without it the arena stays sized for a bulk truncation to follow.
    pub fn remove_connection(&mut self, id: ConnId, cascade: bool) {
        let (a, b) = {
            let c = &self.connections[id.index()];
            (c.a, c.b)
        };
        self.nodes[a.index()].connections.retain(|&c| c != id);
        self.nodes[b.index()].connections.retain(|&c| c != id);

        if cascade {
            while let Some(last) = self.connections.last() {
                let last_id = ConnId::new(self.connections.len() - 1);
                let detached = !self.nodes[last.a.index()].connections.contains(&last_id)
                    && !self.nodes[last.b.index()].connections.contains(&last_id);
                if detached {
                    self.connections.pop();
                } else {
                    break;
                }
            }
        }
    }

    pub fn checkpoint(&self) -> GraphCheckpoint {
        GraphCheckpoint {
            nodes: self.nodes.len(),
            connections: self.connections.len(),
        }
    }

    pub fn rollback(&mut self, cp: GraphCheckpoint) {
        debug_assert!(cp.nodes <= self.nodes.len());
        debug_assert!(cp.connections <= self.connections.len());

        for i in cp.connections..self.connections.len() {
            let id = ConnId::new(i);
            let (a, b) = {
                let c = &self.connections[i];
                (c.a, c.b)
            };
            // Endpoints beyond the baseline disappear with the node
            // truncation; only surviving nodes need unlinking.
            if a.index() < cp.nodes {
                self.nodes[a.index()].connections.retain(|&c| c != id);
            }
            if b.index() < cp.nodes {
                self.nodes[b.index()].connections.retain(|&c| c != id);
            }
        }
        self.connections.truncate(cp.connections);
        self.nodes.truncate(cp.nodes);
        self.net_nodes.retain(|_, id| id.index() < cp.nodes);
        for ids in self.shape_nodes.values_mut() {
            ids.retain(|id| id.index() < cp.nodes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeKind;
    use creepage_common::db::indices::ItemId;

    fn hole(cx: f64, cy: f64, r: f64) -> CreepShape {
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
    fn net_node_is_created_once() {
        let mut g = CreepGraph::new();
        let a = g.add_net_node(NetId::new(3));
        let b = g.add_net_node(NetId::new(3));
        assert_eq!(a, b);
        assert_eq!(g.nodes.len(), 1);
    }

    #[test]
    fn connect_children_hugs_circle() {
        let shapes = vec![hole(0.0, 0.0, 2.0)];
        let mut g = CreepGraph::new();
        let (a, _) = g.get_or_add_point(0, Point::new(2.0, 0.0), 1e-6);
        let (b, _) = g.get_or_add_point(0, Point::new(0.0, 2.0), 1e-6);
        let conn = g.connect_children(a, b, &shapes).unwrap();
        let w = g.connections[conn.index()].weight;
        assert!((w - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn connect_children_refuses_direct_pairs() {
        let shapes = vec![hole(0.0, 0.0, 2.0)];
        let mut g = CreepGraph::new();
        let (a, _) = g.get_or_add_point(0, Point::new(2.0, 0.0), 1e-6);
        let (b, _) = g.get_or_add_point(0, Point::new(-2.0, 0.0), 1e-6);
        g.mark_connect_directly(a);
        assert!(g.connect_children(a, b, &shapes).is_none());
    }

    #[test]
    fn rollback_restores_counts_and_adjacency() {
        let shapes = vec![hole(0.0, 0.0, 2.0)];
        let mut g = CreepGraph::new();
        let (a, _) = g.get_or_add_point(0, Point::new(2.0, 0.0), 1e-6);
        let (b, _) = g.get_or_add_point(0, Point::new(0.0, 2.0), 1e-6);
        g.connect_children(a, b, &shapes);

        let cp = g.checkpoint();
        for _ in 0..5 {
            let (c, _) = g.get_or_add_point(0, Point::new(-2.0, 0.0), 1e-6);
            g.connect_children(a, c, &shapes);
            let net = g.add_net_node(NetId::new(9));
            g.connect(
                net,
                c,
                Traversal::Line {
                    a: Point::new(-2.0, 0.0),
                    b: Point::new(-2.0, 0.0),
                },
                0.0,
            );
            g.rollback(cp);
            assert_eq!(g.nodes.len(), cp.nodes);
            assert_eq!(g.connections.len(), cp.connections);
            assert!(g.net_node(NetId::new(9)).is_none());
            // Surviving node adjacency must not reference removed edges.
            for node in &g.nodes {
                for &c in &node.connections {
                    assert!(c.index() < g.connections.len());
                }
            }
        }
    }

    #[test]
    fn remove_connection_unlinks_both_sides() {
        let shapes = vec![hole(0.0, 0.0, 2.0)];
        let mut g = CreepGraph::new();
        let (a, _) = g.get_or_add_point(0, Point::new(2.0, 0.0), 1e-6);
        let (b, _) = g.get_or_add_point(0, Point::new(0.0, 2.0), 1e-6);
        let conn = g.connect_children(a, b, &shapes).unwrap();
        g.remove_connection(conn, true);
        assert!(g.nodes[a.index()].connections.is_empty());
        assert!(g.nodes[b.index()].connections.is_empty());
        assert!(g.connections.is_empty());
    }
}
