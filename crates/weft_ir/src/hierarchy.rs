//! The component tree and its endpoints.
//!
//! [`Hierarchy`] owns every component and endpoint ever declared, the type
//! database, and the interner. It is the declaration surface used to build a
//! design (components, ports, wires, field and slice views, update blocks)
//! and the query surface the elaboration passes walk (hosts, derivation
//! ancestors, sibling slices, dotted paths).

use std::collections::{BTreeSet, HashMap};

use weft_common::{Ident, Interner};

use crate::arena::Arena;
use crate::component::{Component, UpdateBlock};
use crate::endpoint::{Endpoint, EndpointKind, Owner, View};
use crate::error::DeclError;
use crate::ids::{ComponentId, EndpointId, TypeId};
use crate::types::{Type, TypeDb};

/// Components and endpoints removed by [`Hierarchy::detach_component`].
#[derive(Debug, Clone, Default)]
pub struct Detached {
    /// The removed components, the detached root included.
    pub components: BTreeSet<ComponentId>,
    /// Every endpoint declared in, or derived from, the removed scopes.
    pub endpoints: BTreeSet<EndpointId>,
}

/// A tree of components and the endpoints declared in them.
#[derive(Debug)]
pub struct Hierarchy {
    interner: Interner,
    types: TypeDb,
    components: Arena<ComponentId, Component>,
    endpoints: Arena<EndpointId, Endpoint>,
    /// Memoized views so that asking twice for `x.a` yields one endpoint.
    views: HashMap<(EndpointId, View), EndpointId>,
    /// Views derived directly from each endpoint, in creation order.
    derived: HashMap<EndpointId, Vec<EndpointId>>,
    root: ComponentId,
}

impl Hierarchy {
    /// Creates a hierarchy containing only the root component.
    pub fn new(root_name: &str) -> Self {
        let mut interner = Interner::new();
        let name = interner.get_or_intern(root_name);
        let mut components = Arena::new();
        let root = components.alloc(Component::new(name, None));
        Self {
            interner,
            types: TypeDb::new(),
            components,
            endpoints: Arena::new(),
            views: HashMap::new(),
            derived: HashMap::new(),
            root,
        }
    }

    /// The root component.
    pub fn root(&self) -> ComponentId {
        self.root
    }

    /// The interner holding every name in this hierarchy.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Interns a name.
    pub fn intern(&mut self, s: &str) -> Ident {
        self.interner.get_or_intern(s)
    }

    /// The type database.
    pub fn types(&self) -> &TypeDb {
        &self.types
    }

    /// The type database, for declaring new types.
    pub fn types_mut(&mut self) -> &mut TypeDb {
        &mut self.types
    }

    /// Returns a component.
    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id]
    }

    pub(crate) fn component_mut(&mut self, id: ComponentId) -> &mut Component {
        &mut self.components[id]
    }

    /// Returns an endpoint.
    pub fn endpoint(&self, id: EndpointId) -> &Endpoint {
        &self.endpoints[id]
    }

    /// Kind of an endpoint.
    pub fn kind(&self, id: EndpointId) -> EndpointKind {
        self.endpoints[id].kind
    }

    /// The parent of a component; `None` for the root.
    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.components[id].parent
    }

    /// `false` once the component's sub-hierarchy has been removed.
    pub fn is_attached(&self, id: ComponentId) -> bool {
        self.components[id].attached
    }

    // ---- declaration ----------------------------------------------------

    /// Declares a child component.
    pub fn add_component(&mut self, parent: ComponentId, name: &str) -> Result<ComponentId, DeclError> {
        let name = self.declare_name(parent, name)?;
        let id = self.components.alloc(Component::new(name, Some(parent)));
        self.components[parent].children.push(id);
        Ok(id)
    }

    /// Declares an input port.
    pub fn add_in_port(&mut self, component: ComponentId, name: &str, ty: TypeId) -> Result<EndpointId, DeclError> {
        self.add_signal(component, name, EndpointKind::InPort, ty)
    }

    /// Declares an output port.
    pub fn add_out_port(&mut self, component: ComponentId, name: &str, ty: TypeId) -> Result<EndpointId, DeclError> {
        self.add_signal(component, name, EndpointKind::OutPort, ty)
    }

    /// Declares an internal wire.
    pub fn add_wire(&mut self, component: ComponentId, name: &str, ty: TypeId) -> Result<EndpointId, DeclError> {
        self.add_signal(component, name, EndpointKind::Wire, ty)
    }

    fn add_signal(
        &mut self,
        component: ComponentId,
        name: &str,
        kind: EndpointKind,
        ty: TypeId,
    ) -> Result<EndpointId, DeclError> {
        let name = self.declare_name(component, name)?;
        let id = self.endpoints.alloc(Endpoint {
            kind,
            ty,
            owner: Owner::Scope { component, name },
        });
        self.components[component].endpoints.push(id);
        Ok(id)
    }

    /// Interns `name` after checking that `scope` is live and has no child
    /// or signal of that name.
    fn declare_name(&mut self, scope: ComponentId, name: &str) -> Result<Ident, DeclError> {
        self.ensure_attached(scope)?;
        if self.child_by_name(scope, name).is_some() || self.signal_by_name(scope, name).is_some() {
            return Err(DeclError::DuplicateName {
                scope: self.component_path(scope),
                name: name.to_string(),
            });
        }
        Ok(self.interner.get_or_intern(name))
    }

    fn ensure_attached(&self, component: ComponentId) -> Result<(), DeclError> {
        if self.is_attached(component) {
            Ok(())
        } else {
            Err(DeclError::Detached {
                component: self.component_path(component),
            })
        }
    }

    /// Returns the view of struct field `name` of `ep`.
    pub fn field(&mut self, ep: EndpointId, name: &str) -> Result<EndpointId, DeclError> {
        self.ensure_viewable(ep)?;
        let ty = self.endpoints[ep].ty;
        if matches!(self.types.get(ty), Type::Bits { .. }) {
            return Err(DeclError::NotAStruct {
                endpoint: self.path(ep),
                ty: self.types.describe(ty, &self.interner),
            });
        }
        let field = self.interner.get_or_intern(name);
        let field_ty = self
            .types
            .field_type(ty, field)
            .ok_or_else(|| DeclError::UnknownField {
                endpoint: self.path(ep),
                field: name.to_string(),
            })?;
        Ok(self.derive(ep, View::Field(field), field_ty))
    }

    /// Returns the view of bits `lo..hi` of `ep`.
    pub fn slice(&mut self, ep: EndpointId, lo: u32, hi: u32) -> Result<EndpointId, DeclError> {
        self.ensure_viewable(ep)?;
        let width = self.types.width(self.endpoints[ep].ty);
        if lo >= hi || hi > width {
            return Err(DeclError::InvalidSlice {
                endpoint: self.path(ep),
                lo,
                hi,
                width,
            });
        }
        let ty = self.types.bits(hi - lo);
        Ok(self.derive(ep, View::Slice { lo, hi }, ty))
    }

    fn ensure_viewable(&self, ep: EndpointId) -> Result<(), DeclError> {
        if self.kind(ep) == EndpointKind::Const {
            return Err(DeclError::ConstantView {
                endpoint: self.path(ep),
            });
        }
        self.ensure_attached(self.host(ep))
    }

    fn derive(&mut self, parent: EndpointId, view: View, ty: TypeId) -> EndpointId {
        if let Some(&existing) = self.views.get(&(parent, view)) {
            return existing;
        }
        let kind = self.endpoints[parent].kind;
        let id = self.endpoints.alloc(Endpoint {
            kind,
            ty,
            owner: Owner::View { parent, view },
        });
        self.views.insert((parent, view), id);
        self.derived.entry(parent).or_default().push(id);
        id
    }

    /// Synthesizes a constant hosted in `host`'s scope.
    pub(crate) fn add_constant(&mut self, host: ComponentId, ty: TypeId, value: i64) -> EndpointId {
        let id = self.endpoints.alloc(Endpoint {
            kind: EndpointKind::Const,
            ty,
            owner: Owner::Literal {
                component: host,
                value,
            },
        });
        self.components[host].endpoints.push(id);
        id
    }

    /// Declares a behavioral block of `component` that writes `writes`.
    pub fn add_update_block(
        &mut self,
        component: ComponentId,
        name: &str,
        writes: impl IntoIterator<Item = EndpointId>,
    ) -> Result<(), DeclError> {
        self.ensure_attached(component)?;
        let ident = self.interner.get_or_intern(name);
        if self.components[component].blocks.iter().any(|b| b.name == ident) {
            return Err(DeclError::DuplicateName {
                scope: self.component_path(component),
                name: name.to_string(),
            });
        }
        self.components[component].blocks.push(UpdateBlock {
            name: ident,
            writes: writes.into_iter().collect(),
        });
        Ok(())
    }

    // ---- lookup ---------------------------------------------------------

    /// Finds an attached child component by name.
    pub fn child_by_name(&self, parent: ComponentId, name: &str) -> Option<ComponentId> {
        let ident = self.interner.get(name)?;
        self.components[parent]
            .children
            .iter()
            .copied()
            .find(|&c| self.components[c].name == ident)
    }

    /// Finds a port or wire declared in `component` by name.
    pub fn signal_by_name(&self, component: ComponentId, name: &str) -> Option<EndpointId> {
        let ident = self.interner.get(name)?;
        self.components[component]
            .endpoints
            .iter()
            .copied()
            .find(|&ep| matches!(self.endpoints[ep].owner, Owner::Scope { name, .. } if name == ident))
    }

    /// The component whose scope an endpoint belongs to.
    ///
    /// Views are hosted by the component of the signal they view.
    pub fn host(&self, ep: EndpointId) -> ComponentId {
        let mut cur = ep;
        loop {
            match self.endpoints[cur].owner {
                Owner::Scope { component, .. } | Owner::Literal { component, .. } => return component,
                Owner::View { parent, .. } => cur = parent,
            }
        }
    }

    /// Derivation ancestors of `ep`, nearest first, excluding `ep` itself.
    pub fn ancestors(&self, ep: EndpointId) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            next: self.endpoints[ep].parent(),
        }
    }

    /// Views derived directly from `ep`.
    pub fn views_of(&self, ep: EndpointId) -> &[EndpointId] {
        self.derived.get(&ep).map_or(&[], Vec::as_slice)
    }

    /// Other slices of the same parent as `ep`, when `ep` is itself a slice.
    pub fn sibling_slices(&self, ep: EndpointId) -> impl Iterator<Item = EndpointId> + '_ {
        let endpoint = &self.endpoints[ep];
        let siblings = match (endpoint.parent(), endpoint.view()) {
            (Some(parent), Some(View::Slice { .. })) => self.views_of(parent),
            _ => &[],
        };
        siblings
            .iter()
            .copied()
            .filter(move |&s| s != ep && matches!(self.endpoints[s].view(), Some(View::Slice { .. })))
    }

    /// `true` if `a` and `b` are slices of one parent with intersecting ranges.
    pub fn slices_overlap(&self, a: EndpointId, b: EndpointId) -> bool {
        let (a, b) = (&self.endpoints[a], &self.endpoints[b]);
        match (a.owner, b.owner) {
            (Owner::View { parent: pa, view: va }, Owner::View { parent: pb, view: vb }) => {
                pa == pb && va.overlaps(vb)
            }
            _ => false,
        }
    }

    /// Dotted path of a component, e.g. `top.a.b`.
    pub fn component_path(&self, id: ComponentId) -> String {
        let mut names = Vec::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            names.push(self.interner.resolve(self.components[c].name));
            cur = self.components[c].parent;
        }
        names.reverse();
        names.join(".")
    }

    /// Dotted identity of an endpoint: `top.a.out`, `top.x.valid`,
    /// `top.x[0:4]`, or `top.$const(5)` for a synthesized constant.
    pub fn path(&self, ep: EndpointId) -> String {
        match self.endpoints[ep].owner {
            Owner::Scope { component, name } => {
                format!("{}.{}", self.component_path(component), self.interner.resolve(name))
            }
            Owner::Literal { component, value } => {
                format!("{}.$const({value})", self.component_path(component))
            }
            Owner::View { parent, view: View::Field(name) } => {
                format!("{}.{}", self.path(parent), self.interner.resolve(name))
            }
            Owner::View { parent, view: View::Slice { lo, hi } } => {
                format!("{}[{lo}:{hi}]", self.path(parent))
            }
        }
    }

    /// `component` and all of its attached descendants, parents first.
    pub fn subtree_components(&self, component: ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut stack = vec![component];
        while let Some(c) = stack.pop() {
            out.push(c);
            stack.extend(self.components[c].children.iter().rev().copied());
        }
        out
    }

    /// Every endpoint declared in the subtree rooted at `component`, plus
    /// every field and slice view derived from them.
    pub fn subtree_endpoints(&self, component: ComponentId) -> Vec<EndpointId> {
        let mut out = Vec::new();
        for c in self.subtree_components(component) {
            for &ep in &self.components[c].endpoints {
                self.collect_views(ep, &mut out);
            }
        }
        out
    }

    fn collect_views(&self, ep: EndpointId, out: &mut Vec<EndpointId>) {
        out.push(ep);
        for &view in self.views_of(ep) {
            self.collect_views(view, out);
        }
    }

    // ---- removal --------------------------------------------------------

    /// Removes the sub-hierarchy rooted at `component`.
    ///
    /// The component is unlinked from its parent and flagged as detached
    /// together with all of its descendants. Connections that surviving
    /// scopes declared to any removed endpoint are pruned from those scopes.
    pub fn detach_component(&mut self, component: ComponentId) -> Result<Detached, DeclError> {
        let Some(parent) = self.components[component].parent else {
            return Err(DeclError::RootRemoval {
                component: self.component_path(component),
            });
        };
        self.ensure_attached(component)?;

        let detached = Detached {
            components: self.subtree_components(component).into_iter().collect(),
            endpoints: self.subtree_endpoints(component).into_iter().collect(),
        };

        self.components[parent].children.retain(|&c| c != component);
        for &c in &detached.components {
            self.components[c].attached = false;
        }

        for c in self.subtree_components(self.root) {
            let adjacency = &mut self.components[c].adjacency;
            for &ep in &detached.endpoints {
                adjacency.remove_endpoint(ep);
            }
        }

        tracing::debug!(
            component = %self.component_path(component),
            components = detached.components.len(),
            endpoints = detached.endpoints.len(),
            "detached sub-hierarchy"
        );
        Ok(detached)
    }
}

/// Iterator over the derivation ancestors of an endpoint.
pub struct Ancestors<'a> {
    hierarchy: &'a Hierarchy,
    next: Option<EndpointId>,
}

impl Iterator for Ancestors<'_> {
    type Item = EndpointId;

    fn next(&mut self) -> Option<EndpointId> {
        let cur = self.next?;
        self.next = self.hierarchy.endpoints[cur].parent();
        Some(cur)
    }
}
