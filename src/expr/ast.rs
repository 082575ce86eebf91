//! Abstract Syntax Tree types for marker expressions

/// Prefix operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation: `-x`
    Neg,
    /// Logical not: `!x`
    Not,
}

/// Infix operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+` - numeric addition, or string concatenation when either side is a string
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// An evaluable expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    /// Bare identifier, resolved against the data context by name
    Ident(String),
    /// Member access: `app.content`
    Member { object: Box<Expr>, field: String },
    /// Call to an allow-listed builtin: `include("nav")`
    Call { function: String, args: Vec<Expr> },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `cond ? a : b`
    Ternary {
        cond: Box<Expr>,
        then_value: Box<Expr>,
        else_value: Box<Expr>,
    },
}

/// Declaration keyword; all three write into the shared data context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
    Var,
}

/// Top-level content of one `{{ ... }}` marker
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerExpr {
    /// `let x = 5` - writes into the context, renders as empty output
    Declaration {
        kind: DeclKind,
        name: String,
        value: Expr,
    },
    /// `x = 5` - same context write without a declaration keyword
    Assignment { name: String, value: Expr },
    /// Plain expression whose value is substituted into the markup
    Value(Expr),
}
