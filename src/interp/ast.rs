//! Syntax tree for VibeScript programs.

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `spill_the_tea expr;`
    Print(Expr),
    /// `vibe_check name;`
    Input(String),
    /// `lit name = expr;` and friends; `init` is absent for bare declarations.
    Declare {
        ty: DeclType,
        name: String,
        init: Option<Expr>,
    },
    /// `name = expr;`
    Assign { name: String, value: Expr },
    /// `no_cap (cond) stmt` with an optional `cap stmt`.
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// `lowkey (cond) stmt`
    While { condition: Expr, body: Box<Stmt> },
    /// `highkey (init cond; update) stmt`
    For {
        init: Box<Stmt>,
        condition: Expr,
        update: Box<Stmt>,
        body: Box<Stmt>,
    },
    /// `rizz_up name(params) lets_go ... yeet`
    Function {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    /// `slay expr?;`
    Return(Option<Expr>),
    /// `and_i_oop;`
    Break,
    /// `as_if;`
    Continue,
    /// `lets_go ... yeet`
    Block(Vec<Stmt>),
    /// A bare expression followed by `;`.
    Expression(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclType {
    Lit,
    Tea,
    Mood,
    Stan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Str(String),
    Bool(bool),
    Null,
    Variable(String),
    Call { name: String, args: Vec<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}
