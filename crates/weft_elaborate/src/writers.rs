//! Writer resolution.
//!
//! Finding a net's writer is not a local question. A net may be driven
//! because an enclosing aggregate is written somewhere else, or because an
//! overlapping slice of the same signal is. Resolving one net also turns all
//! of its readers into writers for whatever nets they take part in through
//! their fields, slices, or parents. Resolution therefore repeats over the
//! unresolved nets until a round learns nothing new.
//!
//! The facts gathered along the way live in a [`WriterMap`]:
//!
//! - `true`: the endpoint really is driven and may drive its views and
//!   overlapping slices in other nets;
//! - `false`: some part of the endpoint is driven. The endpoint counts as a
//!   writer in its own net but must not reach down into its other parts.

use std::collections::{BTreeSet, HashMap};

use weft_common::InternalError;
use weft_ir::{ComponentId, EndpointId, EndpointKind, Hierarchy};

use crate::context::ElaborationContext;
use crate::errors::ElabError;
use crate::nets::Net;

/// Writer-propagation facts: endpoint to "may propagate".
#[derive(Debug, Clone, Default)]
pub struct WriterMap {
    marks: HashMap<EndpointId, bool>,
}

impl WriterMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the map from the update blocks of `components`.
    pub fn from_blocks<'a>(hier: &Hierarchy, components: impl IntoIterator<Item = &'a ComponentId>) -> Self {
        let mut map = Self::new();
        for &c in components {
            for ep in hier.component(c).written() {
                map.mark_writer(hier, ep);
            }
        }
        map
    }

    /// `Some(true)` for a propagating writer, `Some(false)` for a blocking
    /// marker, `None` if nothing is known about `ep`.
    pub fn get(&self, ep: EndpointId) -> Option<bool> {
        self.marks.get(&ep).copied()
    }

    /// Returns `true` if `ep` is in the map at all.
    pub fn contains(&self, ep: EndpointId) -> bool {
        self.marks.contains_key(&ep)
    }

    /// Returns `true` if `ep` is a propagating writer.
    pub fn is_propagatable(&self, ep: EndpointId) -> bool {
        self.get(ep) == Some(true)
    }

    /// Number of endpoints with a known status.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Returns `true` if nothing is known yet.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Records `ep` as a propagating writer and every derivation ancestor
    /// without a status as a blocking marker.
    ///
    /// An ancestor that is already a propagating writer stays one, so the
    /// result does not depend on the order writes are recorded in.
    /// Returns `true` if the map changed.
    pub fn mark_writer(&mut self, hier: &Hierarchy, ep: EndpointId) -> bool {
        let mut changed = self.marks.insert(ep, true) != Some(true);
        for ancestor in hier.ancestors(ep) {
            if !self.marks.contains_key(&ancestor) {
                self.marks.insert(ancestor, false);
                changed = true;
            }
        }
        changed
    }
}

/// Assigns a writer to each group of connected endpoints.
///
/// `known` holds nets resolved earlier; their members already act as
/// writers. The output has one net per group, in the same order. Groups
/// whose writer could not be found keep `writer: None`; reporting them is
/// left to the legality checker.
pub fn resolve_writers(
    hier: &Hierarchy,
    ctx: &ElaborationContext,
    groups: Vec<BTreeSet<EndpointId>>,
    known: &[Net],
) -> Result<Vec<Net>, ElabError> {
    let mut map = WriterMap::from_blocks(hier, &ctx.components);
    for net in known.iter().filter(|n| n.writer.is_some()) {
        for &member in &net.members {
            map.mark_writer(hier, member);
        }
    }
    for &member in groups.iter().flatten() {
        if hier.kind(member) == EndpointKind::InPort && hier.host(member) == ctx.top {
            map.mark_writer(hier, member);
        }
    }

    let mut nets: Vec<Net> = groups.into_iter().map(Net::unresolved).collect();
    let mut pending: Vec<usize> = (0..nets.len()).collect();
    let mut rounds = 0;

    while !pending.is_empty() {
        // Every round that changes the map resolved at least one net.
        if rounds == nets.len() {
            return Err(InternalError::new("writer resolution did not reach a fixed point").into());
        }
        rounds += 1;

        let mut changed = false;
        let mut unresolved = Vec::new();
        for idx in pending {
            let Some(writer) = find_writer(hier, &map, &nets[idx].members)? else {
                unresolved.push(idx);
                continue;
            };
            tracing::trace!(writer = %hier.path(writer), members = nets[idx].members.len(), "resolved net");
            for &member in &nets[idx].members {
                if member != writer {
                    changed |= map.mark_writer(hier, member);
                }
            }
            nets[idx].writer = Some(writer);
        }
        pending = unresolved;
        if !changed {
            break;
        }
    }

    tracing::debug!(
        nets = nets.len(),
        unresolved = pending.len(),
        rounds,
        "resolved writers"
    );
    Ok(nets)
}

/// Looks for the single member of `members` that drives the net.
///
/// A member qualifies if it is in the map or is a constant, if one of its
/// ancestors propagates, or if an overlapping sibling slice propagates.
/// Two qualifying members, or one member qualifying twice, is a conflict.
fn find_writer(
    hier: &Hierarchy,
    map: &WriterMap,
    members: &BTreeSet<EndpointId>,
) -> Result<Option<EndpointId>, ElabError> {
    let mut writer = None;
    for &v in members {
        if map.contains(v) || hier.kind(v) == EndpointKind::Const {
            claim(hier, members, &mut writer, v, None)?;
        }
        if let Some(ancestor) = hier.ancestors(v).find(|&a| map.is_propagatable(a)) {
            claim(hier, members, &mut writer, v, Some(ancestor))?;
        }
        for sibling in hier.sibling_slices(v) {
            if hier.slices_overlap(sibling, v) && map.is_propagatable(sibling) {
                claim(hier, members, &mut writer, v, Some(sibling))?;
            }
        }
    }
    Ok(writer)
}

fn claim(
    hier: &Hierarchy,
    members: &BTreeSet<EndpointId>,
    writer: &mut Option<EndpointId>,
    candidate: EndpointId,
    via: Option<EndpointId>,
) -> Result<(), ElabError> {
    if let Some(existing) = *writer {
        return Err(ElabError::MultiWriter {
            endpoint: hier.path(candidate),
            via: via.map(|ep| hier.path(ep)),
            writer: hier.path(existing),
            members: members.iter().map(|&ep| hier.path(ep)).collect(),
        });
    }
    *writer = Some(candidate);
    Ok(())
}

/// Rejects update blocks whose writes collide.
///
/// Two different blocks collide when they write the same endpoint, an
/// endpoint and one of its ancestors, or two overlapping slices of one
/// signal. This holds whether or not the endpoints are connected anywhere.
pub fn check_block_writes(hier: &Hierarchy, ctx: &ElaborationContext) -> Result<(), ElabError> {
    let mut writes: Vec<(String, EndpointId)> = Vec::new();
    for &c in &ctx.components {
        for block in &hier.component(c).blocks {
            let name = format!("{}.{}", hier.component_path(c), hier.interner().resolve(block.name));
            writes.extend(block.writes.iter().map(|&ep| (name.clone(), ep)));
        }
    }

    let mut first_write: HashMap<EndpointId, usize> = HashMap::new();
    for (i, (_, ep)) in writes.iter().enumerate() {
        first_write.entry(*ep).or_insert(i);
    }

    for (i, (block, ep)) in writes.iter().enumerate() {
        let clash = std::iter::once(*ep)
            .chain(hier.ancestors(*ep))
            .chain(hier.sibling_slices(*ep).filter(|&s| hier.slices_overlap(s, *ep)))
            .filter_map(|other| first_write.get(&other).copied())
            .find(|&j| writes[j].0 != *block);
        if let Some(j) = clash {
            let (first, second) = if j < i { (&writes[j], &writes[i]) } else { (&writes[i], &writes[j]) };
            return Err(ElabError::MultiWriter {
                endpoint: hier.path(second.1),
                via: None,
                writer: hier.path(first.1),
                members: [first, second]
                    .iter()
                    .map(|(block, ep)| format!("block `{block}` writes `{}`", hier.path(*ep)))
                    .collect(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ir::{Type, TypeId};

    fn packet(h: &mut Hierarchy) -> TypeId {
        let bit = h.types_mut().bits(1);
        let byte = h.types_mut().bits(8);
        let name = h.intern("Packet");
        let valid = h.intern("valid");
        let data = h.intern("data");
        h.types_mut().intern(Type::Struct {
            name,
            fields: vec![(valid, bit), (data, byte)],
        })
    }

    fn group(eps: &[EndpointId]) -> BTreeSet<EndpointId> {
        eps.iter().copied().collect()
    }

    #[test]
    fn seeding_is_order_independent() {
        let mut h = Hierarchy::new("top");
        let pkt = packet(&mut h);
        let root = h.root();
        let x = h.add_wire(root, "x", pkt).unwrap();
        let valid = h.field(x, "valid").unwrap();

        let mut child_first = WriterMap::new();
        child_first.mark_writer(&h, valid);
        child_first.mark_writer(&h, x);
        let mut parent_first = WriterMap::new();
        parent_first.mark_writer(&h, x);
        parent_first.mark_writer(&h, valid);

        for map in [child_first, parent_first] {
            assert_eq!(map.get(x), Some(true));
            assert_eq!(map.get(valid), Some(true));
        }
    }

    #[test]
    fn ancestor_of_a_write_is_a_blocking_marker() {
        let mut h = Hierarchy::new("top");
        let pkt = packet(&mut h);
        let root = h.root();
        let x = h.add_wire(root, "x", pkt).unwrap();
        let data = h.field(x, "data").unwrap();
        let mut map = WriterMap::new();
        assert!(map.mark_writer(&h, data));
        assert!(!map.mark_writer(&h, data));
        assert_eq!(map.get(x), Some(false));
        assert!(!map.is_propagatable(x));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn nets_nothing_reaches_stay_unresolved() {
        let mut h = Hierarchy::new("top");
        let pkt = packet(&mut h);
        let bit = h.types_mut().bits(1);
        let root = h.root();
        let x = h.add_wire(root, "x", pkt).unwrap();
        let y = h.add_wire(root, "y", pkt).unwrap();
        let z = h.add_wire(root, "z", pkt).unwrap();
        let r = h.add_wire(root, "r", bit).unwrap();
        let x_valid = h.field(x, "valid").unwrap();
        h.add_update_block(root, "up", [x_valid]).unwrap();

        let ctx = ElaborationContext::collect(&h, root);
        let groups = vec![group(&[y, z]), group(&[x_valid, r])];
        let nets = resolve_writers(&h, &ctx, groups, &[]).unwrap();
        assert_eq!(nets[0].writer, None);
        assert_eq!(nets[1].writer, Some(x_valid));
    }

    #[test]
    fn partially_written_aggregate_does_not_reach_other_fields() {
        let mut h = Hierarchy::new("top");
        let pkt = packet(&mut h);
        let byte = h.types_mut().bits(8);
        let root = h.root();
        let x = h.add_wire(root, "x", pkt).unwrap();
        let r = h.add_wire(root, "r", byte).unwrap();
        let x_valid = h.field(x, "valid").unwrap();
        let x_data = h.field(x, "data").unwrap();
        h.add_update_block(root, "up", [x_valid]).unwrap();

        let ctx = ElaborationContext::collect(&h, root);
        let nets = resolve_writers(&h, &ctx, vec![group(&[x_data, r])], &[]).unwrap();
        assert_eq!(nets[0].writer, None);
    }

    #[test]
    fn readers_become_writers_for_their_views() {
        let mut h = Hierarchy::new("top");
        let pkt = packet(&mut h);
        let bit = h.types_mut().bits(1);
        let root = h.root();
        let x = h.add_wire(root, "x", pkt).unwrap();
        let y = h.add_wire(root, "y", pkt).unwrap();
        let r = h.add_wire(root, "r", bit).unwrap();
        let y_valid = h.field(y, "valid").unwrap();
        h.add_update_block(root, "up", [x]).unwrap();

        let ctx = ElaborationContext::collect(&h, root);
        let groups = vec![group(&[y_valid, r]), group(&[x, y])];
        let nets = resolve_writers(&h, &ctx, groups, &[]).unwrap();
        assert_eq!(nets[1].writer, Some(x));
        assert_eq!(nets[0].writer, Some(y_valid));
    }

    #[test]
    fn overlapping_slice_reaches_sibling() {
        let mut h = Hierarchy::new("top");
        let byte = h.types_mut().bits(8);
        let nibble = h.types_mut().bits(4);
        let root = h.root();
        let x = h.add_wire(root, "x", byte).unwrap();
        let lo = h.slice(x, 0, 4).unwrap();
        let mid = h.slice(x, 2, 6).unwrap();
        let r = h.add_wire(root, "r", nibble).unwrap();
        h.add_update_block(root, "up", [lo]).unwrap();

        let ctx = ElaborationContext::collect(&h, root);
        let nets = resolve_writers(&h, &ctx, vec![group(&[mid, r])], &[]).unwrap();
        assert_eq!(nets[0].writer, Some(mid));
    }

    #[test]
    fn two_written_members_conflict() {
        let mut h = Hierarchy::new("top");
        let byte = h.types_mut().bits(8);
        let root = h.root();
        let a = h.add_wire(root, "a", byte).unwrap();
        let b = h.add_wire(root, "b", byte).unwrap();
        h.add_update_block(root, "wa", [a]).unwrap();
        h.add_update_block(root, "wb", [b]).unwrap();

        let ctx = ElaborationContext::collect(&h, root);
        let err = resolve_writers(&h, &ctx, vec![group(&[a, b])], &[]).unwrap_err();
        match err {
            ElabError::MultiWriter { endpoint, writer, members, .. } => {
                assert_eq!(endpoint, "top.b");
                assert_eq!(writer, "top.a");
                assert_eq!(members, vec!["top.a".to_string(), "top.b".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn top_input_ports_are_writers() {
        let mut h = Hierarchy::new("top");
        let byte = h.types_mut().bits(8);
        let root = h.root();
        let child = h.add_component(root, "c").unwrap();
        let x = h.add_in_port(root, "x", byte).unwrap();
        let i = h.add_in_port(child, "i", byte).unwrap();

        let ctx = ElaborationContext::collect(&h, root);
        let nets = resolve_writers(&h, &ctx, vec![group(&[x, i])], &[]).unwrap();
        assert_eq!(nets[0].writer, Some(x));
    }

    #[test]
    fn known_nets_drive_new_groups() {
        let mut h = Hierarchy::new("top");
        let pkt = packet(&mut h);
        let bit = h.types_mut().bits(1);
        let root = h.root();
        let y = h.add_wire(root, "y", pkt).unwrap();
        let w = h.add_wire(root, "w", pkt).unwrap();
        let r = h.add_wire(root, "r", bit).unwrap();
        let y_valid = h.field(y, "valid").unwrap();

        let ctx = ElaborationContext::collect(&h, root);
        let known = vec![Net {
            writer: Some(w),
            members: group(&[w, y]),
        }];
        let nets = resolve_writers(&h, &ctx, vec![group(&[y_valid, r])], &known).unwrap();
        assert_eq!(nets[0].writer, Some(y_valid));
    }

    #[test]
    fn block_writes_to_field_and_parent_conflict() {
        let mut h = Hierarchy::new("top");
        let pkt = packet(&mut h);
        let root = h.root();
        let x = h.add_wire(root, "x", pkt).unwrap();
        let valid = h.field(x, "valid").unwrap();
        h.add_update_block(root, "whole", [x]).unwrap();
        h.add_update_block(root, "part", [valid]).unwrap();

        let ctx = ElaborationContext::collect(&h, root);
        let err = check_block_writes(&h, &ctx).unwrap_err();
        assert!(matches!(err, ElabError::MultiWriter { ref endpoint, .. } if endpoint == "top.x.valid"));
    }

    #[test]
    fn block_writes_to_disjoint_slices_are_fine() {
        let mut h = Hierarchy::new("top");
        let byte = h.types_mut().bits(8);
        let root = h.root();
        let x = h.add_wire(root, "x", byte).unwrap();
        let lo = h.slice(x, 0, 4).unwrap();
        let hi = h.slice(x, 4, 8).unwrap();
        h.add_update_block(root, "lo", [lo]).unwrap();
        h.add_update_block(root, "hi", [hi]).unwrap();
        let ctx = ElaborationContext::collect(&h, root);
        assert!(check_block_writes(&h, &ctx).is_ok());

        let mid = h.slice(x, 2, 6).unwrap();
        h.add_update_block(root, "mid", [mid]).unwrap();
        let ctx = ElaborationContext::collect(&h, root);
        assert!(check_block_writes(&h, &ctx).is_err());
    }

    #[test]
    fn one_block_may_write_a_signal_and_its_field() {
        let mut h = Hierarchy::new("top");
        let pkt = packet(&mut h);
        let root = h.root();
        let x = h.add_wire(root, "x", pkt).unwrap();
        let valid = h.field(x, "valid").unwrap();
        h.add_update_block(root, "up", [x, valid]).unwrap();
        let ctx = ElaborationContext::collect(&h, root);
        assert!(check_block_writes(&h, &ctx).is_ok());
    }
}
