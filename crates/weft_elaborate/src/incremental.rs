//! Changing an elaborated design.
//!
//! Adding or removing a sub-hierarchy only touches the nets involved:
//! additions re-extract the new endpoints together with any existing nets
//! the new connections reach, and removals re-split each net that lost
//! members. Adding a single connection
//! can merge arbitrary nets, so it re-resolves the whole design.
//!
//! None of these check port directions unless `recheck_after_mutation` is
//! set; call [`Elaborator::check`] when the edits are done.

use std::collections::BTreeSet;

use weft_ir::{Adjacency, ComponentId, Detached, EndpointId, Hierarchy, Operand};

use crate::errors::ElabError;
use crate::nets::{self, Net};
use crate::{legality, writers, ElaborationContext, Elaborator};

impl Elaborator {
    fn elaborated(&mut self) -> Result<(&mut Hierarchy, &mut ElaborationContext), ElabError> {
        let ctx = self.ctx.as_mut().ok_or(ElabError::NotElaborated)?;
        Ok((&mut self.hierarchy, ctx))
    }

    fn after_mutation(&self) -> Result<(), ElabError> {
        if self.config.recheck_after_mutation {
            self.check()
        } else {
            Ok(())
        }
    }

    /// Adds a child component named `name` under `parent` and lets `build`
    /// declare its contents.
    ///
    /// `build` may also connect into scopes that already existed or reach
    /// endpoints declared before. Nets those connections touch are merged
    /// and re-resolved together with the new endpoints; all other nets are
    /// kept as they are. If `build` or the resolution fails, the component
    /// is removed again and every scope gets its old connections back.
    pub fn add_component_by_name<F>(
        &mut self,
        parent: ComponentId,
        name: &str,
        build: F,
    ) -> Result<ComponentId, ElabError>
    where
        F: FnOnce(&mut Hierarchy, ComponentId) -> Result<(), ElabError>,
    {
        let (hier, ctx) = self.elaborated()?;
        let saved: Vec<(ComponentId, Adjacency)> = ctx
            .components
            .iter()
            .map(|&c| (c, hier.component(c).adjacency.clone()))
            .collect();
        let component = hier.add_component(parent, name)?;

        match build(&mut *hier, component).and_then(|()| absorb(hier, ctx, component)) {
            Ok(next) => *ctx = next,
            Err(err) => {
                hier.detach_component(component)?;
                for (c, adjacency) in saved {
                    hier.replace_adjacency(c, adjacency);
                }
                return Err(err);
            }
        }

        self.after_mutation()?;
        Ok(component)
    }

    /// Removes the child `name` of `parent` and everything below it.
    ///
    /// Nets that lose members are re-split over their surviving
    /// connections. A piece keeps the old writer only if the writer is in
    /// it; the other pieces become writer-less.
    pub fn delete_component_by_name(&mut self, parent: ComponentId, name: &str) -> Result<Detached, ElabError> {
        let (hier, ctx) = self.elaborated()?;
        let component = hier.child_by_name(parent, name).ok_or_else(|| ElabError::UnknownComponent {
            parent: hier.component_path(parent),
            name: name.to_string(),
        })?;
        let detached = hier.detach_component(component)?;

        ctx.components.retain(|c| !detached.components.contains(c));
        ctx.endpoints.retain(|ep| !detached.endpoints.contains(ep));
        for &ep in &detached.endpoints {
            ctx.adjacency.remove_endpoint(ep);
        }

        let old = std::mem::take(&mut ctx.nets);
        let mut affected = 0;
        for net in old {
            if net.members.is_disjoint(&detached.endpoints) {
                ctx.nets.push(net);
                continue;
            }
            affected += 1;
            let survivors: BTreeSet<EndpointId> = net.members.difference(&detached.endpoints).copied().collect();
            for piece in nets::floodfill(&survivors, &ctx.adjacency, hier)? {
                let writer = net.writer.filter(|w| piece.contains(w));
                ctx.nets.push(Net { writer, members: piece });
            }
        }
        tracing::debug!(
            components = detached.components.len(),
            endpoints = detached.endpoints.len(),
            affected_nets = affected,
            "removed sub-hierarchy"
        );

        self.after_mutation()?;
        Ok(detached)
    }

    /// Connects `a` and `b` after elaboration.
    ///
    /// The connection is recorded in the top component's scope and every
    /// net is re-resolved. If extraction or resolution fails, the design is
    /// left as it was.
    pub fn add_connection(
        &mut self,
        a: impl Into<Operand>,
        b: impl Into<Operand>,
    ) -> Result<(EndpointId, EndpointId), ElabError> {
        let (hier, ctx) = self.elaborated()?;
        let (x, y) = hier.prepare_connection(a.into(), b.into())?;

        let mut delta = Adjacency::new();
        delta.insert(x, y);
        let mut adjacency = ctx.adjacency.clone();
        adjacency.merge(&delta);

        let mut endpoints = ctx.endpoints.clone();
        endpoints.extend([x, y]);
        let groups = nets::floodfill(&endpoints, &adjacency, hier)?;
        let resolved = writers::resolve_writers(hier, ctx, groups, &[])?;

        hier.record_connection(ctx.top, x, y);
        ctx.refresh_endpoints(hier);
        ctx.adjacency = adjacency;
        ctx.nets = resolved;
        tracing::debug!(nets = ctx.nets.len(), "re-resolved after new connection");

        self.after_mutation()?;
        Ok((x, y))
    }

    /// Returns the writer-less nets left behind by mutations, as paths.
    pub fn headless_nets(&self) -> Result<Vec<Vec<String>>, ElabError> {
        match legality::check_writers_present(&self.hierarchy, self.get_all_nets()?) {
            Ok(()) => Ok(Vec::new()),
            Err(ElabError::NoWriter { nets }) => Ok(nets),
            Err(other) => Err(other),
        }
    }
}

/// Returns `ctx` with the sub-hierarchy at `component` folded in.
///
/// Besides the new endpoints, every endpoint that gained an edge and every
/// net containing one is re-extracted. That set is closed under adjacency,
/// so the untouched nets stay maximal.
fn absorb(hier: &Hierarchy, ctx: &ElaborationContext, component: ComponentId) -> Result<ElaborationContext, ElabError> {
    let mut next = ctx.clone();
    let mut fresh = next.register(hier, component);
    fresh.extend(next.refresh_endpoints(hier));
    next.adjacency = ElaborationContext::scoped_adjacency(hier, next.top);

    let grown: BTreeSet<EndpointId> = next
        .adjacency
        .endpoints()
        .filter(|&ep| next.adjacency.neighbors(ep).any(|n| !ctx.adjacency.contains_edge(ep, n)))
        .collect();
    let (touched, kept): (Vec<Net>, Vec<Net>) = std::mem::take(&mut next.nets)
        .into_iter()
        .partition(|net| !net.members.is_disjoint(&grown));

    let mut domain = fresh;
    domain.extend(&grown);
    domain.extend(touched.iter().flat_map(|net| net.members.iter().copied()));
    let groups = nets::floodfill(&domain, &next.adjacency, hier)?;
    let resolved = writers::resolve_writers(hier, &next, groups, &kept)?;
    tracing::debug!(
        component = %hier.component_path(component),
        endpoints = domain.len(),
        merged_nets = touched.len(),
        nets = resolved.len(),
        "added sub-hierarchy"
    );

    next.nets = kept;
    next.nets.extend(resolved);
    Ok(next)
}
