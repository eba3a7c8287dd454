use crate::error::Span;
use crate::value::Complex;

/// A parsed input: an ordered list of top-level statements. Order matters,
/// since later statements may reference names bound by earlier ones.
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number {
        value: Complex,
        span: Span,
    },
    Identifier {
        name: String,
        span: Span,
    },
    Assign {
        name: String,
        value: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Call {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `fn name(params) = body`, or `fn name(params) native` when `body` is
    /// absent.
    FuncDef {
        name: String,
        params: Vec<Parameter>,
        body: Option<Box<Expr>>,
        span: Span,
    },
    /// `sum(var = init, upper, body)` or `product(...)`.
    SigmaPi {
        kind: AggregateKind,
        var: String,
        init: Box<Expr>,
        upper: Box<Expr>,
        body: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Number { span, .. } => span,
            Expr::Identifier { span, .. } => span,
            Expr::Assign { span, .. } => span,
            Expr::Binary { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Call { span, .. } => span,
            Expr::FuncDef { span, .. } => span,
            Expr::SigmaPi { span, .. } => span,
        }
    }

    /// Assignments and definitions mutate the session but contribute no
    /// entry to the visible result sequence.
    pub fn is_silent(&self) -> bool {
        matches!(self, Expr::Assign { .. } | Expr::FuncDef { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    IntDivide,
    Power,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnaryOp {
    /// Prefix `+`; identity.
    Plus,
    /// Prefix `-`.
    Negate,
    /// `|expr|`.
    Abs,
    /// Suffix `!`.
    Factorial,
    /// Prefix `~`, the complex conjugate.
    Conjugate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateKind {
    Sum,
    Product,
}

/// A declared function parameter; optional when it carries a default.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub default: Option<Expr>,
}

impl Parameter {
    pub fn new(name: String, default: Option<Expr>) -> Self {
        Self { name, default }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}
