//! Connection declarations.
//!
//! Connecting two operands only records an edge in the declaring scope's
//! [`Adjacency`](crate::Adjacency). Nothing about writers or port
//! directions is checked here; that happens once the whole design has been
//! declared and is elaborated.

use crate::endpoint::EndpointKind;
use crate::error::ConnectError;
use crate::adjacency::Adjacency;
use crate::hierarchy::Hierarchy;
use crate::ids::{ComponentId, EndpointId};

/// One side of a connection: an endpoint or an integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// A declared endpoint or a view of one.
    Endpoint(EndpointId),
    /// A literal, turned into a constant endpoint of the other side's type.
    Literal(i64),
}

impl From<EndpointId> for Operand {
    fn from(ep: EndpointId) -> Self {
        Operand::Endpoint(ep)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Literal(value)
    }
}

impl Hierarchy {
    /// Declares a connection between `a` and `b` in the scope of `scope`.
    ///
    /// A literal operand becomes a constant endpoint of the other operand's
    /// type. The constant lives in the other operand's host, or in the
    /// host's parent when the other operand is an input port, since the
    /// value driving an input is supplied from outside the component.
    ///
    /// Returns the two endpoints that were joined.
    pub fn connect(
        &mut self,
        scope: ComponentId,
        a: impl Into<Operand>,
        b: impl Into<Operand>,
    ) -> Result<(EndpointId, EndpointId), ConnectError> {
        let (a, b) = self.prepare_connection(a.into(), b.into())?;
        self.record_connection(scope, a, b);
        Ok((a, b))
    }

    /// Adds an already validated edge to the scoped adjacency of `scope`.
    pub fn record_connection(&mut self, scope: ComponentId, a: EndpointId, b: EndpointId) {
        self.component_mut(scope).adjacency.insert(a, b);
        tracing::trace!(
            scope = %self.component_path(scope),
            a = %self.path(a),
            b = %self.path(b),
            "connect"
        );
    }

    /// Swaps the scoped adjacency of `scope` for `adjacency` and returns the
    /// one it held. Used to take back connections when a batch of edits is
    /// abandoned.
    pub fn replace_adjacency(&mut self, scope: ComponentId, adjacency: Adjacency) -> Adjacency {
        std::mem::replace(&mut self.component_mut(scope).adjacency, adjacency)
    }

    /// Connects consecutive pairs of `operands`: the 1st to the 2nd, the
    /// 3rd to the 4th, and so on.
    ///
    /// Pairs before a failing one stay connected. The error names the
    /// 1-based positions of the failing pair.
    pub fn connect_pairs(
        &mut self,
        scope: ComponentId,
        operands: &[Operand],
    ) -> Result<Vec<(EndpointId, EndpointId)>, ConnectError> {
        if operands.len() % 2 != 0 {
            return Err(ConnectError::OddArgumentCount(operands.len()));
        }
        operands
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| {
                self.connect(scope, pair[0], pair[1])
                    .map_err(|source| ConnectError::Pair {
                        first: 2 * i + 1,
                        second: 2 * i + 2,
                        source: Box::new(source),
                    })
            })
            .collect()
    }

    /// Connects `source` to every operand in `targets`, in order.
    pub fn connect_fanout(
        &mut self,
        scope: ComponentId,
        source: impl Into<Operand>,
        targets: &[Operand],
    ) -> Result<Vec<(EndpointId, EndpointId)>, ConnectError> {
        let source = source.into();
        targets
            .iter()
            .enumerate()
            .map(|(i, &target)| {
                self.connect(scope, source, target)
                    .map_err(|err| ConnectError::Fanout {
                        index: i + 1,
                        source: Box::new(err),
                    })
            })
            .collect()
    }

    /// Validates a connection request and materializes literal operands,
    /// without recording any edge.
    pub fn prepare_connection(&mut self, a: Operand, b: Operand) -> Result<(EndpointId, EndpointId), ConnectError> {
        match (a, b) {
            (Operand::Literal(x), Operand::Literal(y)) => Err(ConnectError::TwoLiterals(x, y)),
            (Operand::Endpoint(ep), Operand::Literal(value)) => {
                self.ensure_live(ep)?;
                let constant = self.constant_for(ep, value)?;
                Ok((ep, constant))
            }
            (Operand::Literal(value), Operand::Endpoint(ep)) => {
                self.ensure_live(ep)?;
                let constant = self.constant_for(ep, value)?;
                Ok((constant, ep))
            }
            (Operand::Endpoint(a), Operand::Endpoint(b)) => {
                self.ensure_live(a)?;
                self.ensure_live(b)?;
                if a == b {
                    return Err(ConnectError::SelfConnection { endpoint: self.path(a) });
                }
                let (a_ty, b_ty) = (self.endpoint(a).ty, self.endpoint(b).ty);
                if a_ty != b_ty {
                    return Err(ConnectError::TypeMismatch {
                        left: self.path(a),
                        left_ty: self.types().describe(a_ty, self.interner()),
                        right: self.path(b),
                        right_ty: self.types().describe(b_ty, self.interner()),
                    });
                }
                Ok((a, b))
            }
        }
    }

    fn ensure_live(&self, ep: EndpointId) -> Result<(), ConnectError> {
        if self.is_attached(self.host(ep)) {
            Ok(())
        } else {
            Err(ConnectError::Detached { endpoint: self.path(ep) })
        }
    }

    fn constant_for(&mut self, signal: EndpointId, value: i64) -> Result<EndpointId, ConnectError> {
        let host = self.host(signal);
        let host = if self.kind(signal) == EndpointKind::InPort {
            self.parent(host).ok_or_else(|| ConnectError::NoParentScope {
                endpoint: self.path(signal),
                value,
            })?
        } else {
            host
        };
        let ty = self.endpoint(signal).ty;
        Ok(self.add_constant(host, ty, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        h: Hierarchy,
        a_o: EndpointId,
        b_i: EndpointId,
        c_i: EndpointId,
        narrow: EndpointId,
    }

    fn fixture() -> Fixture {
        let mut h = Hierarchy::new("top");
        let byte = h.types_mut().bits(8);
        let nibble = h.types_mut().bits(4);
        let root = h.root();
        let a = h.add_component(root, "a").unwrap();
        let b = h.add_component(root, "b").unwrap();
        let c = h.add_component(root, "c").unwrap();
        let a_o = h.add_out_port(a, "o", byte).unwrap();
        let b_i = h.add_in_port(b, "i", byte).unwrap();
        let c_i = h.add_in_port(c, "i", byte).unwrap();
        let narrow = h.add_wire(root, "narrow", nibble).unwrap();
        Fixture { h, a_o, b_i, c_i, narrow }
    }

    #[test]
    fn connect_records_edge_in_scope() {
        let mut f = fixture();
        let root = f.h.root();
        f.h.connect(root, f.a_o, f.b_i).unwrap();
        assert!(f.h.component(root).adjacency.contains_edge(f.b_i, f.a_o));
    }

    #[test]
    fn type_mismatch_names_both_sides() {
        let mut f = fixture();
        let root = f.h.root();
        let err = f.h.connect(root, f.a_o, f.narrow).unwrap_err();
        assert_eq!(
            err,
            ConnectError::TypeMismatch {
                left: "top.a.o".into(),
                left_ty: "Bits8".into(),
                right: "top.narrow".into(),
                right_ty: "Bits4".into(),
            }
        );
    }

    #[test]
    fn literal_driving_input_lives_in_parent_scope() {
        let mut f = fixture();
        let root = f.h.root();
        let (constant, port) = f.h.connect(root, Operand::Literal(5), f.b_i).unwrap();
        assert_eq!(port, f.b_i);
        assert_eq!(f.h.kind(constant), EndpointKind::Const);
        assert_eq!(f.h.host(constant), root);
        assert_eq!(f.h.endpoint(constant).ty, f.h.endpoint(f.b_i).ty);
        assert_eq!(f.h.path(constant), "top.$const(5)");
    }

    #[test]
    fn literal_driving_output_lives_in_its_host() {
        let mut f = fixture();
        let root = f.h.root();
        let (_, constant) = f.h.connect(root, f.a_o, Operand::Literal(1)).unwrap();
        assert_eq!(f.h.path(constant), "top.a.$const(1)");
    }

    #[test]
    fn literal_to_root_input_has_no_parent_scope() {
        let mut h = Hierarchy::new("top");
        let byte = h.types_mut().bits(8);
        let root = h.root();
        let x = h.add_in_port(root, "x", byte).unwrap();
        let err = h.connect(root, x, Operand::Literal(3)).unwrap_err();
        assert!(matches!(err, ConnectError::NoParentScope { value: 3, .. }));
    }

    #[test]
    fn two_literals_and_self_connection_rejected() {
        let mut f = fixture();
        let root = f.h.root();
        assert_eq!(
            f.h.connect(root, Operand::Literal(1), Operand::Literal(2)),
            Err(ConnectError::TwoLiterals(1, 2))
        );
        assert!(matches!(
            f.h.connect(root, f.a_o, f.a_o),
            Err(ConnectError::SelfConnection { .. })
        ));
    }

    #[test]
    fn pairs_odd_count() {
        let mut f = fixture();
        let root = f.h.root();
        let ops = [f.a_o.into(), f.b_i.into(), f.c_i.into()];
        assert_eq!(f.h.connect_pairs(root, &ops), Err(ConnectError::OddArgumentCount(3)));
    }

    #[test]
    fn pairs_report_failing_positions() {
        let mut f = fixture();
        let root = f.h.root();
        let ops = [f.a_o.into(), f.b_i.into(), f.a_o.into(), f.narrow.into()];
        let err = f.h.connect_pairs(root, &ops).unwrap_err();
        assert!(matches!(err, ConnectError::Pair { first: 3, second: 4, .. }));
        assert!(err.to_string().starts_with("when connecting the 3rd to the 4th argument"));
        // The first pair went through before the failure.
        assert!(f.h.component(root).adjacency.contains_edge(f.a_o, f.b_i));
    }

    #[test]
    fn fanout_connects_each_target() {
        let mut f = fixture();
        let root = f.h.root();
        let joined = f.h.connect_fanout(root, f.a_o, &[f.b_i.into(), f.c_i.into()]).unwrap();
        assert_eq!(joined, vec![(f.a_o, f.b_i), (f.a_o, f.c_i)]);

        let err = f
            .h
            .connect_fanout(root, f.a_o, &[f.b_i.into(), f.narrow.into()])
            .unwrap_err();
        assert!(matches!(err, ConnectError::Fanout { index: 2, .. }));
    }

    #[test]
    fn detached_operand_rejected() {
        let mut f = fixture();
        let root = f.h.root();
        let a = f.h.child_by_name(root, "a").unwrap();
        f.h.detach_component(a).unwrap();
        assert!(matches!(
            f.h.connect(root, f.a_o, f.b_i),
            Err(ConnectError::Detached { .. })
        ));
    }
}
