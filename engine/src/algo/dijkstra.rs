use crate::graph::{ConnId, CreepGraph, NodeId};
use priority_queue::PriorityQueue;
use std::cmp::Reverse;

// Weights scaled to integers for a total order in the queue; the
// reported distance is re-summed from the exact f64 weights.
const SCALE: f64 = 1e9;

#[derive(Debug)]
pub struct ShortestPath {
    pub distance: f64,
    // Ordered source-to-destination connection chain.
    pub connections: Vec<ConnId>,
}

// None means unreachable: at least as far apart as any finite
// requirement, not an error.
pub fn solve(graph: &CreepGraph, source: NodeId, dest: NodeId) -> Option<ShortestPath> {
    let n = graph.nodes.len();
    if source.index() >= n || dest.index() >= n {
        return None;
    }

    let mut dist = vec![i64::MAX; n];
    let mut parent: Vec<Option<(NodeId, ConnId)>> = vec![None; n];
    let mut queue: PriorityQueue<NodeId, Reverse<i64>> = PriorityQueue::new();

    dist[source.index()] = 0;
    queue.push(source, Reverse(0));

    while let Some((u, Reverse(d))) = queue.pop() {
        if u == dest {
            break;
        }
        if d > dist[u.index()] {
            continue;
        }
        for &cid in &graph.nodes[u.index()].connections {
            let conn = &graph.connections[cid.index()];
            let v = conn.other(u);
            let w = (conn.weight * SCALE).round() as i64;
            let nd = d.saturating_add(w);
            if nd < dist[v.index()] {
                dist[v.index()] = nd;
                parent[v.index()] = Some((u, cid));
                queue.push_increase(v, Reverse(nd));
            }
        }
    }

    if dist[dest.index()] == i64::MAX {
        return None;
    }

    let mut connections = Vec::new();
    let mut cur = dest;
    while let Some((prev, cid)) = parent[cur.index()] {
        connections.push(cid);
        cur = prev;
    }
    connections.reverse();

    let distance = connections
        .iter()
        .map(|c| graph.connections[c.index()].weight)
        .sum();

    Some(ShortestPath {
        distance,
        connections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Traversal;
    use creepage_common::db::indices::NetId;
    use creepage_common::geom::point::Point;

    fn line(a: Point<f64>, b: Point<f64>) -> Traversal {
        Traversal::Line { a, b }
    }

    fn p(x: f64, y: f64) -> Point<f64> {
        Point::new(x, y)
    }

    #[test]
    fn picks_the_cheaper_route() {
        let mut g = CreepGraph::new();
        let s = g.add_net_node(NetId::new(0));
        let t = g.add_net_node(NetId::new(1));
        let (m, _) = g.get_or_add_point(0, p(0.0, 0.0), 1e-6);

        g.connect(s, t, line(p(0.0, 0.0), p(10.0, 0.0)), 10.0);
        g.connect(s, m, line(p(0.0, 0.0), p(2.0, 0.0)), 2.0);
        g.connect(m, t, line(p(2.0, 0.0), p(5.0, 0.0)), 3.0);

        let path = solve(&g, s, t).unwrap();
        assert!((path.distance - 5.0).abs() < 1e-9);
        assert_eq!(path.connections.len(), 2);
    }

    #[test]
    fn unreachable_is_none() {
        let mut g = CreepGraph::new();
        let s = g.add_net_node(NetId::new(0));
        let t = g.add_net_node(NetId::new(1));
        assert!(solve(&g, s, t).is_none());
    }

    #[test]
    fn search_is_symmetric() {
        let mut g = CreepGraph::new();
        let s = g.add_net_node(NetId::new(0));
        let t = g.add_net_node(NetId::new(1));
        let (m1, _) = g.get_or_add_point(0, p(1.0, 0.0), 1e-6);
        let (m2, _) = g.get_or_add_point(0, p(2.0, 0.0), 1e-6);
        g.connect(s, m1, line(p(0.0, 0.0), p(1.0, 0.0)), 1.0);
        g.connect(m1, m2, line(p(1.0, 0.0), p(2.0, 0.0)), 1.5);
        g.connect(m2, t, line(p(2.0, 0.0), p(3.0, 0.0)), 0.5);
        g.connect(s, t, line(p(0.0, 0.0), p(3.0, 0.0)), 4.0);

        let ab = solve(&g, s, t).unwrap().distance;
        let ba = solve(&g, t, s).unwrap().distance;
        assert!((ab - ba).abs() < 1e-12);
        assert!((ab - 3.0).abs() < 1e-9);
    }
}
