//! Errors raised while declaring a hierarchy or its connections.

/// A malformed declaration: a name clash, a bad view, or a change to a
/// component that has already been removed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclError {
    /// Two children or signals in one scope share a name.
    #[error("`{name}` is already declared in `{scope}`")]
    DuplicateName {
        /// Path of the scope.
        scope: String,
        /// The clashing name.
        name: String,
    },

    /// A field was requested from a signal that is not a struct.
    #[error("`{endpoint}` has type {ty}, which has no fields")]
    NotAStruct {
        /// Path of the signal.
        endpoint: String,
        /// Its type.
        ty: String,
    },

    /// The struct has no field with that name.
    #[error("`{endpoint}` has no field `{field}`")]
    UnknownField {
        /// Path of the signal.
        endpoint: String,
        /// The requested field.
        field: String,
    },

    /// A slice range is empty or exceeds the signal width.
    #[error("slice [{lo}:{hi}] is invalid for `{endpoint}` of width {width}")]
    InvalidSlice {
        /// Path of the signal.
        endpoint: String,
        /// Requested low bit.
        lo: u32,
        /// Requested high bit (exclusive).
        hi: u32,
        /// The signal width.
        width: u32,
    },

    /// Constants cannot be viewed through fields or slices.
    #[error("constant `{endpoint}` cannot be sliced or indexed")]
    ConstantView {
        /// Path of the constant.
        endpoint: String,
    },

    /// The component was removed from the hierarchy.
    #[error("component `{component}` has been removed from the hierarchy")]
    Detached {
        /// Path the component had.
        component: String,
    },

    /// The root has no parent to be removed from.
    #[error("the root component `{component}` cannot be removed")]
    RootRemoval {
        /// Path of the root.
        component: String,
    },
}

/// A malformed connection request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// Both operands are signals but their types differ.
    #[error("type mismatch: `{left}` is {left_ty} but `{right}` is {right_ty}")]
    TypeMismatch {
        /// Path of the first operand.
        left: String,
        /// Its type.
        left_ty: String,
        /// Path of the second operand.
        right: String,
        /// Its type.
        right_ty: String,
    },

    /// Both operands are integer literals.
    #[error("cannot connect two integer literals ({0} and {1})")]
    TwoLiterals(i64, i64),

    /// An endpoint was connected to itself.
    #[error("`{endpoint}` cannot be connected to itself")]
    SelfConnection {
        /// Path of the endpoint.
        endpoint: String,
    },

    /// A literal drives an input port of the root, which has no parent scope
    /// to supply the constant.
    #[error("literal {value} cannot drive `{endpoint}`: its component has no parent scope")]
    NoParentScope {
        /// Path of the input port.
        endpoint: String,
        /// The literal value.
        value: i64,
    },

    /// An operand belongs to a removed component.
    #[error("`{endpoint}` belongs to a component that has been removed")]
    Detached {
        /// Path of the endpoint.
        endpoint: String,
    },

    /// `connect_pairs` got an odd number of operands.
    #[error("odd number ({0}) of objects provided")]
    OddArgumentCount(usize),

    /// A pairwise failure inside `connect_pairs`.
    #[error("when connecting the {} to the {} argument: {source}", ordinal(.first), ordinal(.second))]
    Pair {
        /// 1-based position of the first operand of the pair.
        first: usize,
        /// 1-based position of the second operand.
        second: usize,
        /// The underlying failure.
        #[source]
        source: Box<ConnectError>,
    },

    /// A failure inside `connect_fanout`.
    #[error("when connecting fan-out target {index}: {source}")]
    Fanout {
        /// 1-based position of the target.
        index: usize,
        /// The underlying failure.
        #[source]
        source: Box<ConnectError>,
    },
}

/// `1st`, `2nd`, `3rd`, `4th`, ..., `11th`, `12th`, `13th`, `21st`, ...
fn ordinal(n: &usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
