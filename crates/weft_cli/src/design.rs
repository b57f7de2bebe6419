//! Loading a hierarchy from a TOML design description.
//!
//! ```toml
//! root = "top"
//!
//! [[types]]
//! name = "stream"
//! fields = [{ name = "valid", width = 1 }, { name = "data", width = 8 }]
//!
//! [[components]]
//! path = "top.src"
//!
//! [[signals]]
//! path = "top.src.out"
//! kind = "out"
//! type = "stream"
//!
//! [[blocks]]
//! component = "top.src"
//! name = "drive"
//! writes = ["top.src.out"]
//!
//! [[connections]]
//! scope = "top"
//! a = "top.src.out.data[0:4]"
//! b = 3
//! ```
//!
//! Components may be listed in any order. Struct types may only use struct
//! types declared before them. Endpoint references name a signal by its
//! dotted path and may continue with `.field` and `[lo:hi]` views.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use weft_ir::{ComponentId, DeclError, EndpointId, Hierarchy, Operand, Type, TypeId};

/// Errors raised while reading a design description.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    /// The file could not be read.
    #[error("failed to read design: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content does not match the design schema.
    #[error("failed to parse design: {0}")]
    Parse(String),

    /// A path does not start at the root component.
    #[error("`{path}` does not start at the root `{root}`")]
    OutsideRoot {
        /// The offending path.
        path: String,
        /// Name of the root component.
        root: String,
    },

    /// A path could not be split into names and slices.
    #[error("malformed path `{0}`")]
    Malformed(String),

    /// No component lives at the path.
    #[error("no component at `{0}`")]
    UnknownComponent(String),

    /// No signal lives at the path.
    #[error("no signal at `{0}`")]
    UnknownSignal(String),

    /// A struct type name was never declared.
    #[error("unknown type `{0}`")]
    UnknownType(String),

    /// A signal or field gives both or neither of `width` and `type`.
    #[error("`{0}` needs exactly one of `width` or `type`")]
    TypeSpec(String),

    /// The hierarchy rejected a declaration.
    #[error(transparent)]
    Declaration(#[from] DeclError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DesignFile {
    root: String,
    #[serde(default)]
    types: Vec<StructDecl>,
    #[serde(default)]
    components: Vec<ComponentDecl>,
    #[serde(default)]
    signals: Vec<SignalDecl>,
    #[serde(default)]
    blocks: Vec<BlockDecl>,
    #[serde(default)]
    connections: Vec<ConnectionDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StructDecl {
    name: String,
    fields: Vec<FieldDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDecl {
    name: String,
    width: Option<u32>,
    #[serde(rename = "type")]
    ty: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentDecl {
    path: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SignalKind {
    In,
    Out,
    Wire,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SignalDecl {
    path: String,
    kind: SignalKind,
    width: Option<u32>,
    #[serde(rename = "type")]
    ty: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlockDecl {
    component: String,
    name: String,
    writes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConnectionDecl {
    scope: String,
    a: OperandRef,
    b: OperandRef,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OperandRef {
    Literal(i64),
    Path(String),
}

/// A connection read from the design, not yet declared.
///
/// Connections go through the elaborator so that their failures are
/// reported like any other elaboration problem.
#[derive(Debug, Clone, Copy)]
pub struct PendingConnection {
    /// The scope the connection is declared in.
    pub scope: ComponentId,
    /// First operand.
    pub a: Operand,
    /// Second operand.
    pub b: Operand,
}

/// A loaded design: the declared hierarchy plus its connections.
#[derive(Debug)]
pub struct Design {
    /// Components, signals, and update blocks.
    pub hierarchy: Hierarchy,
    /// Connections in file order.
    pub connections: Vec<PendingConnection>,
}

/// Reads a design description from a file.
pub fn load_design(path: &Path) -> Result<Design, DesignError> {
    let content = std::fs::read_to_string(path)?;
    load_design_from_str(&content)
}

/// Reads a design description from a string.
pub fn load_design_from_str(content: &str) -> Result<Design, DesignError> {
    let file: DesignFile =
        toml::from_str(content).map_err(|e| DesignError::Parse(e.to_string()))?;
    build(file)
}

fn build(file: DesignFile) -> Result<Design, DesignError> {
    let mut hier = Hierarchy::new(&file.root);

    let mut structs: HashMap<String, TypeId> = HashMap::new();
    for decl in &file.types {
        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let what = format!("{}.{}", decl.name, field.name);
            let ty = resolve_type(&mut hier, &structs, &what, field.width, field.ty.as_deref())?;
            fields.push((hier.intern(&field.name), ty));
        }
        let name = hier.intern(&decl.name);
        let id = hier.types_mut().intern(Type::Struct { name, fields });
        structs.insert(decl.name.clone(), id);
    }

    // Parents before children, whatever the file order.
    let mut components: Vec<&ComponentDecl> = file.components.iter().collect();
    components.sort_by_key(|c| c.path.matches('.').count());
    for decl in components {
        let (parent, name) = split_last(&decl.path)?;
        let parent = component_at(&hier, parent)?;
        hier.add_component(parent, name)?;
    }

    for decl in &file.signals {
        let (owner, name) = split_last(&decl.path)?;
        let owner = component_at(&hier, owner)?;
        let ty = resolve_type(&mut hier, &structs, &decl.path, decl.width, decl.ty.as_deref())?;
        match decl.kind {
            SignalKind::In => hier.add_in_port(owner, name, ty)?,
            SignalKind::Out => hier.add_out_port(owner, name, ty)?,
            SignalKind::Wire => hier.add_wire(owner, name, ty)?,
        };
    }

    for decl in &file.blocks {
        let component = component_at(&hier, &decl.component)?;
        let writes = decl
            .writes
            .iter()
            .map(|path| endpoint_at(&mut hier, path))
            .collect::<Result<Vec<_>, _>>()?;
        hier.add_update_block(component, &decl.name, writes)?;
    }

    let mut connections = Vec::with_capacity(file.connections.len());
    for decl in &file.connections {
        connections.push(PendingConnection {
            scope: component_at(&hier, &decl.scope)?,
            a: operand(&mut hier, &decl.a)?,
            b: operand(&mut hier, &decl.b)?,
        });
    }

    tracing::debug!(
        components = file.components.len() + 1,
        signals = file.signals.len(),
        connections = connections.len(),
        "design loaded"
    );
    Ok(Design {
        hierarchy: hier,
        connections,
    })
}

fn resolve_type(
    hier: &mut Hierarchy,
    structs: &HashMap<String, TypeId>,
    what: &str,
    width: Option<u32>,
    ty: Option<&str>,
) -> Result<TypeId, DesignError> {
    match (width, ty) {
        (Some(width), None) => Ok(hier.types_mut().bits(width)),
        (None, Some(name)) => structs
            .get(name)
            .copied()
            .ok_or_else(|| DesignError::UnknownType(name.to_string())),
        _ => Err(DesignError::TypeSpec(what.to_string())),
    }
}

fn operand(hier: &mut Hierarchy, operand: &OperandRef) -> Result<Operand, DesignError> {
    Ok(match operand {
        OperandRef::Literal(value) => Operand::Literal(*value),
        OperandRef::Path(path) => Operand::Endpoint(endpoint_at(hier, path)?),
    })
}

/// Splits `top.a.b` into `("top.a", "b")`.
fn split_last(path: &str) -> Result<(&str, &str), DesignError> {
    match path.rsplit_once('.') {
        Some((head, name)) if !head.is_empty() && !name.is_empty() => Ok((head, name)),
        _ => Err(DesignError::Malformed(path.to_string())),
    }
}

fn check_root(hier: &Hierarchy, path: &str, first: Option<&str>) -> Result<(), DesignError> {
    let root = hier.component_path(hier.root());
    if first == Some(root.as_str()) {
        Ok(())
    } else {
        Err(DesignError::OutsideRoot {
            path: path.to_string(),
            root,
        })
    }
}

fn component_at(hier: &Hierarchy, path: &str) -> Result<ComponentId, DesignError> {
    let mut names = path.split('.');
    check_root(hier, path, names.next())?;
    names.try_fold(hier.root(), |component, name| {
        hier.child_by_name(component, name)
            .ok_or_else(|| DesignError::UnknownComponent(path.to_string()))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Name(&'a str),
    Slice(u32, u32),
}

/// Splits `top.x.data[0:4]` into names and slices.
fn segments(path: &str) -> Result<Vec<Segment<'_>>, DesignError> {
    let malformed = || DesignError::Malformed(path.to_string());
    let mut out = Vec::new();
    for part in path.split('.') {
        let (name, mut rest) = part.split_at(part.find('[').unwrap_or(part.len()));
        if name.is_empty() {
            return Err(malformed());
        }
        out.push(Segment::Name(name));
        while let Some(inner) = rest.strip_prefix('[') {
            let close = inner.find(']').ok_or_else(malformed)?;
            let (lo, hi) = inner[..close].split_once(':').ok_or_else(malformed)?;
            let lo = lo.trim().parse().map_err(|_| malformed())?;
            let hi = hi.trim().parse().map_err(|_| malformed())?;
            out.push(Segment::Slice(lo, hi));
            rest = &inner[close + 1..];
        }
        if !rest.is_empty() {
            return Err(malformed());
        }
    }
    Ok(out)
}

/// Resolves an endpoint reference, creating field and slice views on the
/// way.
fn endpoint_at(hier: &mut Hierarchy, path: &str) -> Result<EndpointId, DesignError> {
    let unknown = || DesignError::UnknownSignal(path.to_string());
    let mut segs = segments(path)?.into_iter();
    let first = match segs.next() {
        Some(Segment::Name(name)) => Some(name),
        _ => None,
    };
    check_root(hier, path, first)?;

    let mut component = hier.root();
    let signal = loop {
        let Some(Segment::Name(name)) = segs.next() else {
            return Err(unknown());
        };
        match hier.child_by_name(component, name) {
            Some(child) => component = child,
            None => break hier.signal_by_name(component, name).ok_or_else(unknown)?,
        }
    };

    segs.try_fold(signal, |ep, seg| -> Result<EndpointId, DesignError> {
        Ok(match seg {
            Segment::Name(field) => hier.field(ep, field)?,
            Segment::Slice(lo, hi) => hier.slice(ep, lo, hi)?,
        })
    })
}
