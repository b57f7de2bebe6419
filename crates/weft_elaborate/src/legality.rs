//! Port legality checking.
//!
//! Data flows out of a component through its output ports, across a scope
//! through wires, and into a component through its input ports. Every edge
//! of a resolved net is checked against that rule, with the edge oriented
//! away from the net's writer.
//!
//! | reader host vs. writer host | writer      | reader          |
//! |-----------------------------|-------------|-----------------|
//! | same component              | any         | OutPort or Wire |
//! | reader host is the parent   | OutPort     | OutPort or Wire |
//! | writer host is the parent   | any         | InPort          |
//! | siblings                    | OutPort     | InPort          |
//! | anything else               | never legal |                 |

use std::collections::BTreeSet;

use weft_ir::{Adjacency, EndpointId, EndpointKind, Hierarchy};

use crate::errors::{ElabError, LegalityRule};
use crate::nets::Net;

/// Fails with every writer-less net if there are any.
pub fn check_writers_present(hier: &Hierarchy, nets: &[Net]) -> Result<(), ElabError> {
    let headless: Vec<Vec<String>> = nets
        .iter()
        .filter(|n| n.writer.is_none())
        .map(|n| n.member_paths(hier))
        .collect();
    if headless.is_empty() {
        Ok(())
    } else {
        Err(ElabError::NoWriter { nets: headless })
    }
}

/// Checks every edge of every net against the port direction rules.
///
/// Writer-less nets are reported first, all together.
pub fn check_nets(hier: &Hierarchy, adjacency: &Adjacency, nets: &[Net]) -> Result<(), ElabError> {
    check_writers_present(hier, nets)?;
    for net in nets {
        let Some(writer) = net.writer else { continue };
        check_net(hier, adjacency, writer)?;
    }
    tracing::debug!(nets = nets.len(), "port directions checked");
    Ok(())
}

/// Walks the net depth-first from `writer`; each endpoint drives the
/// neighbors it discovers.
fn check_net(hier: &Hierarchy, adjacency: &Adjacency, writer: EndpointId) -> Result<(), ElabError> {
    let mut stack = vec![writer];
    let mut visited = BTreeSet::from([writer]);
    while let Some(u) = stack.pop() {
        for v in adjacency.neighbors(u) {
            if visited.insert(v) {
                check_edge(hier, u, v)?;
                stack.push(v);
            }
        }
    }
    Ok(())
}

/// Checks a single edge where `writer` drives `reader`.
pub fn check_edge(hier: &Hierarchy, writer: EndpointId, reader: EndpointId) -> Result<(), ElabError> {
    use EndpointKind::{InPort, OutPort, Wire};

    let (whost, rhost) = (hier.host(writer), hier.host(reader));
    let (wkind, rkind) = (hier.kind(writer), hier.kind(reader));
    let wparent = hier.parent(whost);

    let (rule, legal) = if whost == rhost {
        (LegalityRule::SameScope, matches!(rkind, OutPort | Wire))
    } else if wparent == Some(rhost) {
        (LegalityRule::DeeperDriver, wkind == OutPort && matches!(rkind, OutPort | Wire))
    } else if hier.parent(rhost) == Some(whost) {
        (LegalityRule::ShallowerDriver, rkind == InPort)
    } else if wparent.is_some() && wparent == hier.parent(rhost) {
        (LegalityRule::SiblingDriver, wkind == OutPort && rkind == InPort)
    } else {
        (LegalityRule::TooDistant, false)
    };

    if legal {
        return Ok(());
    }
    Err(ElabError::SignalType {
        rule,
        writer: hier.path(writer),
        writer_kind: wkind,
        writer_host: hier.component_path(whost),
        reader: hier.path(reader),
        reader_kind: rkind,
        reader_host: hier.component_path(rhost),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ir::ComponentId;

    struct Tree {
        h: Hierarchy,
        root: ComponentId,
        a: ComponentId,
        b: ComponentId,
        deep: ComponentId,
    }

    /// top { a { deep }, b }
    fn tree() -> Tree {
        let mut h = Hierarchy::new("top");
        let root = h.root();
        let a = h.add_component(root, "a").unwrap();
        let b = h.add_component(root, "b").unwrap();
        let deep = h.add_component(a, "deep").unwrap();
        Tree { h, root, a, b, deep }
    }

    fn port(t: &mut Tree, c: ComponentId, name: &str, kind: EndpointKind) -> EndpointId {
        let byte = t.h.types_mut().bits(8);
        match kind {
            EndpointKind::InPort => t.h.add_in_port(c, name, byte).unwrap(),
            EndpointKind::OutPort => t.h.add_out_port(c, name, byte).unwrap(),
            _ => t.h.add_wire(c, name, byte).unwrap(),
        }
    }

    fn rule_of(result: Result<(), ElabError>) -> Option<LegalityRule> {
        match result {
            Err(ElabError::SignalType { rule, .. }) => Some(rule),
            _ => None,
        }
    }

    #[test]
    fn same_scope_reader_must_be_outport_or_wire() {
        let mut t = tree();
        let root = t.root;
        let x = port(&mut t, root, "x", EndpointKind::InPort);
        let w = port(&mut t, root, "w", EndpointKind::Wire);
        let y = port(&mut t, root, "y", EndpointKind::InPort);
        assert!(check_edge(&t.h, x, w).is_ok());
        assert_eq!(rule_of(check_edge(&t.h, w, y)), Some(LegalityRule::SameScope));
    }

    #[test]
    fn deeper_driver_must_be_outport() {
        let mut t = tree();
        let (root, a) = (t.root, t.a);
        let o = port(&mut t, a, "o", EndpointKind::OutPort);
        let i = port(&mut t, a, "i", EndpointKind::InPort);
        let w = port(&mut t, root, "w", EndpointKind::Wire);
        assert!(check_edge(&t.h, o, w).is_ok());
        assert_eq!(rule_of(check_edge(&t.h, i, w)), Some(LegalityRule::DeeperDriver));
    }

    #[test]
    fn shallower_driver_must_feed_inport() {
        let mut t = tree();
        let (root, a) = (t.root, t.a);
        let w = port(&mut t, root, "w", EndpointKind::Wire);
        let i = port(&mut t, a, "i", EndpointKind::InPort);
        let o = port(&mut t, a, "o", EndpointKind::OutPort);
        assert!(check_edge(&t.h, w, i).is_ok());
        assert_eq!(rule_of(check_edge(&t.h, w, o)), Some(LegalityRule::ShallowerDriver));
    }

    #[test]
    fn siblings_connect_outport_to_inport() {
        let mut t = tree();
        let (a, b) = (t.a, t.b);
        let ao = port(&mut t, a, "o", EndpointKind::OutPort);
        let ai = port(&mut t, a, "i", EndpointKind::InPort);
        let bi = port(&mut t, b, "i", EndpointKind::InPort);
        assert!(check_edge(&t.h, ao, bi).is_ok());
        assert_eq!(rule_of(check_edge(&t.h, ai, bi)), Some(LegalityRule::SiblingDriver));
    }

    #[test]
    fn distant_hosts_never_connect() {
        let mut t = tree();
        let (deep, b) = (t.deep, t.b);
        let o = port(&mut t, deep, "o", EndpointKind::OutPort);
        let i = port(&mut t, b, "i", EndpointKind::InPort);
        assert_eq!(rule_of(check_edge(&t.h, o, i)), Some(LegalityRule::TooDistant));
    }

    #[test]
    fn headless_nets_reported_together() {
        let mut t = tree();
        let root = t.root;
        let w1 = port(&mut t, root, "w1", EndpointKind::Wire);
        let w2 = port(&mut t, root, "w2", EndpointKind::Wire);
        let w3 = port(&mut t, root, "w3", EndpointKind::Wire);
        let w4 = port(&mut t, root, "w4", EndpointKind::Wire);
        let nets = vec![
            Net::unresolved(BTreeSet::from([w1, w2])),
            Net::unresolved(BTreeSet::from([w3, w4])),
        ];
        match check_nets(&t.h, &Adjacency::new(), &nets) {
            Err(ElabError::NoWriter { nets }) => {
                assert_eq!(nets.len(), 2);
                assert_eq!(nets[0], vec!["top.w1".to_string(), "top.w2".to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn edges_are_oriented_away_from_the_writer() {
        // a.o -> top.w -> b.i, declared as (w, a.o) and (b.i, w).
        let mut t = tree();
        let (root, a, b) = (t.root, t.a, t.b);
        let ao = port(&mut t, a, "o", EndpointKind::OutPort);
        let w = port(&mut t, root, "w", EndpointKind::Wire);
        let bi = port(&mut t, b, "i", EndpointKind::InPort);
        let mut adj = Adjacency::new();
        adj.insert(w, ao);
        adj.insert(bi, w);
        let nets = vec![Net {
            writer: Some(ao),
            members: BTreeSet::from([ao, w, bi]),
        }];
        assert!(check_nets(&t.h, &adj, &nets).is_ok());
    }
}
