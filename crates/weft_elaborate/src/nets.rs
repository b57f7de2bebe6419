//! Net extraction: partitioning connected endpoints into nets.

use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use weft_ir::{Adjacency, EndpointId, Hierarchy};

use crate::errors::ElabError;

/// A maximal set of connected endpoints and the member that drives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    /// The driving member, once resolved.
    pub writer: Option<EndpointId>,
    /// Every endpoint in the net.
    pub members: BTreeSet<EndpointId>,
}

impl Net {
    /// A net with no writer assigned yet.
    pub fn unresolved(members: BTreeSet<EndpointId>) -> Self {
        Self { writer: None, members }
    }

    /// Returns `true` if `ep` is a member.
    pub fn contains(&self, ep: EndpointId) -> bool {
        self.members.contains(&ep)
    }

    /// Member paths, in ID order.
    pub fn member_paths(&self, hier: &Hierarchy) -> Vec<String> {
        self.members.iter().map(|&ep| hier.path(ep)).collect()
    }
}

/// Partitions the endpoints of `domain` that have at least one edge into
/// connected components of `adjacency`.
///
/// Traversal is breadth-first and never leaves `domain`. Each endpoint
/// remembers the neighbor it was discovered from; meeting an already
/// visited endpoint through any other edge means the connections close a
/// loop, which is an error.
pub fn floodfill(
    domain: &BTreeSet<EndpointId>,
    adjacency: &Adjacency,
    hier: &Hierarchy,
) -> Result<Vec<BTreeSet<EndpointId>>, ElabError> {
    let mut visited: BTreeSet<EndpointId> = BTreeSet::new();
    let mut pred: HashMap<EndpointId, EndpointId> = HashMap::new();
    let mut nets = Vec::new();

    for &start in domain {
        if visited.contains(&start) || !adjacency.has_edges(start) {
            continue;
        }
        let mut members = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        visited.insert(start);

        while let Some(u) = queue.pop_front() {
            for v in adjacency.neighbors(u) {
                if !domain.contains(&v) || pred.get(&u) == Some(&v) {
                    continue;
                }
                if !visited.insert(v) {
                    return Err(ElabError::ConnectionLoop { endpoint: hier.path(v) });
                }
                pred.insert(v, u);
                members.insert(v);
                queue.push_back(v);
            }
        }
        nets.push(members);
    }

    tracing::debug!(nets = nets.len(), "extracted nets");
    Ok(nets)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Wires {
        h: Hierarchy,
        eps: Vec<EndpointId>,
    }

    fn wires(n: usize) -> Wires {
        let mut h = Hierarchy::new("top");
        let byte = h.types_mut().bits(8);
        let root = h.root();
        let eps = (0..n)
            .map(|i| h.add_wire(root, &format!("w{i}"), byte).unwrap())
            .collect();
        Wires { h, eps }
    }

    #[test]
    fn components_become_nets() {
        let w = wires(5);
        let e = &w.eps;
        let mut adj = Adjacency::new();
        adj.insert(e[0], e[1]);
        adj.insert(e[1], e[2]);
        adj.insert(e[3], e[4]);
        let domain: BTreeSet<_> = e.iter().copied().collect();
        let nets = floodfill(&domain, &adj, &w.h).unwrap();
        assert_eq!(nets.len(), 2);
        assert_eq!(nets[0], BTreeSet::from([e[0], e[1], e[2]]));
        assert_eq!(nets[1], BTreeSet::from([e[3], e[4]]));
    }

    #[test]
    fn unconnected_endpoints_are_skipped() {
        let w = wires(3);
        let mut adj = Adjacency::new();
        adj.insert(w.eps[0], w.eps[1]);
        let domain: BTreeSet<_> = w.eps.iter().copied().collect();
        let nets = floodfill(&domain, &adj, &w.h).unwrap();
        assert_eq!(nets.len(), 1);
        assert!(!nets[0].contains(&w.eps[2]));
    }

    #[test]
    fn mutual_edge_is_not_a_loop() {
        let w = wires(2);
        let mut adj = Adjacency::new();
        adj.insert(w.eps[0], w.eps[1]);
        adj.insert(w.eps[1], w.eps[0]);
        let domain: BTreeSet<_> = w.eps.iter().copied().collect();
        assert!(floodfill(&domain, &adj, &w.h).is_ok());
    }

    #[test]
    fn triangle_is_a_loop() {
        let w = wires(3);
        let e = &w.eps;
        let mut adj = Adjacency::new();
        adj.insert(e[0], e[1]);
        adj.insert(e[1], e[2]);
        adj.insert(e[2], e[0]);
        let domain: BTreeSet<_> = e.iter().copied().collect();
        let err = floodfill(&domain, &adj, &w.h).unwrap_err();
        assert!(matches!(err, ElabError::ConnectionLoop { .. }));
    }

    #[test]
    fn traversal_stays_inside_domain() {
        let w = wires(3);
        let e = &w.eps;
        let mut adj = Adjacency::new();
        adj.insert(e[0], e[1]);
        adj.insert(e[1], e[2]);
        let domain = BTreeSet::from([e[1], e[2]]);
        let nets = floodfill(&domain, &adj, &w.h).unwrap();
        assert_eq!(nets, vec![BTreeSet::from([e[1], e[2]])]);
    }

    #[test]
    fn net_serializes_ids() {
        let net = Net {
            writer: Some(EndpointId::from_raw(1)),
            members: BTreeSet::from([EndpointId::from_raw(1), EndpointId::from_raw(2)]),
        };
        let json = serde_json::to_string(&net).unwrap();
        assert_eq!(serde_json::from_str::<Net>(&json).unwrap(), net);
    }
}
