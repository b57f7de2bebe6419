//! Connectivity elaboration for a component hierarchy.
//!
//! Groups connected endpoints into nets, finds the single writer of every
//! net, and checks that every connection respects port directions given
//! where its two endpoints sit in the hierarchy. After a successful pass the
//! design can still be changed: sub-hierarchies can be added or removed and
//! single connections added, with the net list kept up to date.
//!
//! # Usage
//!
//! ```ignore
//! let mut elab = Elaborator::new(hierarchy);
//! elab.connect(parent, a_out, b_in)?;
//! elab.elaborate()?;
//! for net in elab.get_all_nets()? { /* ... */ }
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod errors;
pub mod incremental;
pub mod legality;
pub mod nets;
pub mod writers;

use weft_config::ElaborateConfig;
use weft_ir::{ComponentId, EndpointId, Hierarchy, Operand};

pub use context::ElaborationContext;
pub use errors::{ElabError, LegalityRule};
pub use nets::Net;

/// Owns a hierarchy and the elaboration state derived from it.
#[derive(Debug)]
pub struct Elaborator {
    hierarchy: Hierarchy,
    config: ElaborateConfig,
    ctx: Option<ElaborationContext>,
}

impl Elaborator {
    /// Wraps a hierarchy with the default checks enabled.
    pub fn new(hierarchy: Hierarchy) -> Self {
        Self::with_config(hierarchy, ElaborateConfig::default())
    }

    /// Wraps a hierarchy with explicit check settings.
    pub fn with_config(hierarchy: Hierarchy, config: ElaborateConfig) -> Self {
        Self {
            hierarchy,
            config,
            ctx: None,
        }
    }

    /// The wrapped hierarchy.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// The wrapped hierarchy, for declarations.
    pub fn hierarchy_mut(&mut self) -> &mut Hierarchy {
        &mut self.hierarchy
    }

    /// The check settings in effect.
    pub fn config(&self) -> ElaborateConfig {
        self.config
    }

    /// The elaboration state, once [`elaborate`](Self::elaborate) succeeded.
    pub fn context(&self) -> Option<&ElaborationContext> {
        self.ctx.as_ref()
    }

    /// Returns `true` after a successful [`elaborate`](Self::elaborate).
    pub fn is_elaborated(&self) -> bool {
        self.ctx.is_some()
    }

    fn ensure_declaring(&self) -> Result<(), ElabError> {
        if self.is_elaborated() {
            Err(ElabError::AlreadyElaborated)
        } else {
            Ok(())
        }
    }

    /// Declares a connection in the scope of `scope`.
    ///
    /// Only valid before elaboration; afterwards use
    /// [`add_connection`](Self::add_connection).
    pub fn connect(
        &mut self,
        scope: ComponentId,
        a: impl Into<Operand>,
        b: impl Into<Operand>,
    ) -> Result<(EndpointId, EndpointId), ElabError> {
        self.ensure_declaring()?;
        Ok(self.hierarchy.connect(scope, a, b)?)
    }

    /// Declares connections between consecutive pairs of `operands`.
    pub fn connect_pairs(
        &mut self,
        scope: ComponentId,
        operands: &[Operand],
    ) -> Result<Vec<(EndpointId, EndpointId)>, ElabError> {
        self.ensure_declaring()?;
        Ok(self.hierarchy.connect_pairs(scope, operands)?)
    }

    /// Declares connections from `source` to each of `targets`.
    pub fn connect_fanout(
        &mut self,
        scope: ComponentId,
        source: impl Into<Operand>,
        targets: &[Operand],
    ) -> Result<Vec<(EndpointId, EndpointId)>, ElabError> {
        self.ensure_declaring()?;
        Ok(self.hierarchy.connect_fanout(scope, source, targets)?)
    }

    /// Runs the full pass: collect the hierarchy, merge scoped connections,
    /// check update-block writes, extract nets, resolve writers, and check
    /// port directions.
    ///
    /// Writer-less nets and writer conflicts are reported before any port
    /// direction problem.
    pub fn elaborate(&mut self) -> Result<(), ElabError> {
        self.ctx = None;
        let hier = &self.hierarchy;
        let mut ctx = ElaborationContext::collect(hier, hier.root());

        if self.config.check_block_writes {
            writers::check_block_writes(hier, &ctx)?;
        }
        let groups = nets::floodfill(&ctx.endpoints, &ctx.adjacency, hier)?;
        ctx.nets = writers::resolve_writers(hier, &ctx, groups, &[])?;
        legality::check_writers_present(hier, &ctx.nets)?;
        if self.config.check_legality {
            legality::check_nets(hier, &ctx.adjacency, &ctx.nets)?;
        }

        tracing::debug!(
            top = %hier.component_path(ctx.top),
            nets = ctx.nets.len(),
            "elaboration complete"
        );
        self.ctx = Some(ctx);
        Ok(())
    }

    /// The resolved nets.
    pub fn get_all_nets(&self) -> Result<&[Net], ElabError> {
        self.ctx
            .as_ref()
            .map(|ctx| ctx.nets.as_slice())
            .ok_or(ElabError::NotElaborated)
    }

    /// The net containing `ep`, if it is connected to anything.
    pub fn net_of(&self, ep: EndpointId) -> Result<Option<&Net>, ElabError> {
        Ok(self.get_all_nets()?.iter().find(|net| net.contains(ep)))
    }

    /// Re-runs the writer and port direction checks on the current nets.
    ///
    /// Incremental mutations do not check legality on their own unless
    /// `recheck_after_mutation` is set.
    pub fn check(&self) -> Result<(), ElabError> {
        let ctx = self.ctx.as_ref().ok_or(ElabError::NotElaborated)?;
        legality::check_nets(&self.hierarchy, &ctx.adjacency, &ctx.nets)
    }
}
