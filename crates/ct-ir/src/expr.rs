use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::ParamId;

/// Shared handle to an arithmetic expression. Cloning copies the reference.
pub type ArithRef = Arc<ArithExpr>;
/// Shared handle to a string expression.
pub type StrRef = Arc<StrExpr>;
/// Shared handle to a constraint. Preconditions reused across several
/// parents are held through this handle and never mutated afterwards.
pub type ConstraintRef = Arc<Constraint>;

// ── Operators ────────────────────────────────────────────────────────

/// Operator tokens as handed over by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    And,
    Or,
    Xor,
    Imply,
    Iff,
    Not,
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Neg,
    Uplus,
}

impl Operator {
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Xor => "^",
            Operator::Imply => "->",
            Operator::Iff => "<->",
            Operator::Not => "!",
            Operator::Add | Operator::Uplus => "+",
            Operator::Sub | Operator::Neg => "-",
            Operator::Mult => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
        }
    }

    pub fn arith(&self) -> Option<ArithOp> {
        match self {
            Operator::Add => Some(ArithOp::Add),
            Operator::Sub => Some(ArithOp::Sub),
            Operator::Mult => Some(ArithOp::Mult),
            Operator::Div => Some(ArithOp::Div),
            Operator::Mod => Some(ArithOp::Mod),
            _ => None,
        }
    }

    pub fn relational(&self) -> Option<RelOp> {
        match self {
            Operator::Eq => Some(RelOp::Eq),
            Operator::Ne => Some(RelOp::Ne),
            Operator::Gt => Some(RelOp::Gt),
            Operator::Ge => Some(RelOp::Ge),
            Operator::Lt => Some(RelOp::Lt),
            Operator::Le => Some(RelOp::Le),
            _ => None,
        }
    }

    /// Logical connective for this operator. `=` and `≠` between two
    /// constraints read as IFF and XOR.
    pub fn logical(&self) -> Option<LogicOp> {
        match self {
            Operator::And => Some(LogicOp::And),
            Operator::Or => Some(LogicOp::Or),
            Operator::Xor | Operator::Ne => Some(LogicOp::Xor),
            Operator::Imply => Some(LogicOp::Imply),
            Operator::Iff | Operator::Eq => Some(LogicOp::Iff),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mult,
    Div,
    Mod,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mult => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl RelOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
            RelOp::Lt => "<",
            RelOp::Le => "<=",
        }
    }

    /// Equality-class comparisons are the only ones a precision applies to.
    pub fn is_equality(&self) -> bool {
        matches!(self, RelOp::Eq | RelOp::Ne)
    }
}

/// Comparison available between string expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrRelOp {
    Eq,
    Ne,
}

impl StrRelOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            StrRelOp::Eq => "==",
            StrRelOp::Ne => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
    Xor,
    Imply,
    Iff,
}

impl LogicOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
            LogicOp::Xor => "^",
            LogicOp::Imply => "->",
            LogicOp::Iff => "<->",
        }
    }
}

// ── Arithmetic ───────────────────────────────────────────────────────

/// Static type of an arithmetic expression, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumType {
    Int,
    Double,
}

impl NumType {
    /// Result type of a binary arithmetic operator over `self` and `other`.
    pub fn join(self, other: NumType) -> NumType {
        match (self, other) {
            (NumType::Int, NumType::Int) => NumType::Int,
            _ => NumType::Double,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            NumType::Int => "int",
            NumType::Double => "double",
        }
    }
}

impl std::fmt::Display for NumType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArithExpr {
    /// Integer literal with its original spelling.
    Int { value: i64, text: String },
    /// Double literal with its original spelling.
    Double { value: f64, text: String },
    Param { pid: ParamId, ty: NumType },
    Binary {
        op: ArithOp,
        ty: NumType,
        lhs: ArithRef,
        rhs: ArithRef,
    },
    Neg(ArithRef),
    /// Explicit numeric cast; the declared type wins over the operand's.
    Cast { ty: NumType, operand: ArithRef },
    /// Truth value of a constraint read as 1 / 0.
    FromConstraint { ty: NumType, operand: ConstraintRef },
}

impl ArithExpr {
    pub fn int(value: i64) -> Self {
        ArithExpr::Int {
            value,
            text: value.to_string(),
        }
    }

    pub fn double(value: f64) -> Self {
        ArithExpr::Double {
            value,
            text: value.to_string(),
        }
    }

    pub fn num_type(&self) -> NumType {
        match self {
            ArithExpr::Int { .. } => NumType::Int,
            ArithExpr::Double { .. } => NumType::Double,
            ArithExpr::Param { ty, .. }
            | ArithExpr::Binary { ty, .. }
            | ArithExpr::Cast { ty, .. }
            | ArithExpr::FromConstraint { ty, .. } => *ty,
            ArithExpr::Neg(operand) => operand.num_type(),
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ArithExpr::Int { .. } => "int constant",
            ArithExpr::Double { .. } => "double constant",
            ArithExpr::Param { .. } => "arithmetic parameter",
            ArithExpr::Binary { .. } => "binary arithmetic expression",
            ArithExpr::Neg(_) => "negation",
            ArithExpr::Cast { .. } => "numeric cast",
            ArithExpr::FromConstraint { .. } => "constraint cast",
        }
    }
}

// ── Strings ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum StrExpr {
    Const(String),
    Param(ParamId),
    /// Terms concatenated in declared order.
    Concat(Vec<StrRef>),
}

impl StrExpr {
    pub fn class_name(&self) -> &'static str {
        match self {
            StrExpr::Const(_) => "string constant",
            StrExpr::Param(_) => "string parameter",
            StrExpr::Concat(_) => "string concatenation",
        }
    }
}

// ── Constraints ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Bool(bool),
    Param(ParamId),
    /// True while the referenced parameter is invalidated.
    Invalid(ParamId),
    Not(ConstraintRef),
    Logic {
        op: LogicOp,
        lhs: ConstraintRef,
        rhs: ConstraintRef,
    },
    Arith {
        op: RelOp,
        lhs: ArithRef,
        rhs: ArithRef,
        precision: f64,
    },
    Str {
        op: StrRelOp,
        lhs: StrRef,
        rhs: StrRef,
    },
}

impl Constraint {
    pub fn not(operand: ConstraintRef) -> ConstraintRef {
        Arc::new(Constraint::Not(operand))
    }

    pub fn logic(op: LogicOp, lhs: ConstraintRef, rhs: ConstraintRef) -> ConstraintRef {
        Arc::new(Constraint::Logic { op, lhs, rhs })
    }

    pub fn invalid(pid: ParamId) -> ConstraintRef {
        Arc::new(Constraint::Invalid(pid))
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Constraint::Bool(_) => "boolean constant",
            Constraint::Param(_) => "boolean parameter",
            Constraint::Invalid(_) => "invalidation marker",
            Constraint::Not(_) => "negation",
            Constraint::Logic { .. } => "logical constraint",
            Constraint::Arith { .. } => "arithmetic relation",
            Constraint::Str { .. } => "string relation",
        }
    }
}

// ── Nodes ────────────────────────────────────────────────────────────

/// Coarse family of a node; the Assembler dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Arith,
    Str,
    Constraint,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Arith => f.write_str("arithmetic expression"),
            NodeKind::Str => f.write_str("string expression"),
            NodeKind::Constraint => f.write_str("constraint"),
        }
    }
}

/// Any AST node handed between the parser and the Assembler.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Arith(ArithRef),
    Str(StrRef),
    Constraint(ConstraintRef),
}

impl Node {
    pub fn int(value: i64) -> Self {
        Node::Arith(Arc::new(ArithExpr::int(value)))
    }

    /// Integer literal that keeps the spelling it was parsed from.
    pub fn int_spelled(value: i64, text: impl Into<String>) -> Self {
        Node::Arith(Arc::new(ArithExpr::Int {
            value,
            text: text.into(),
        }))
    }

    pub fn double(value: f64) -> Self {
        Node::Arith(Arc::new(ArithExpr::double(value)))
    }

    pub fn double_spelled(value: f64, text: impl Into<String>) -> Self {
        Node::Arith(Arc::new(ArithExpr::Double {
            value,
            text: text.into(),
        }))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::Str(Arc::new(StrExpr::Const(value.into())))
    }

    pub fn boolean(value: bool) -> Self {
        Node::Constraint(Arc::new(Constraint::Bool(value)))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Arith(_) => NodeKind::Arith,
            Node::Str(_) => NodeKind::Str,
            Node::Constraint(_) => NodeKind::Constraint,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Node::Arith(e) => e.class_name(),
            Node::Str(e) => e.class_name(),
            Node::Constraint(c) => c.class_name(),
        }
    }

    /// Textual value of a literal node, used to match it against a
    /// parameter's value set. Non-literal nodes have an empty text.
    pub fn text(&self) -> &str {
        match self {
            Node::Arith(e) => match e.as_ref() {
                ArithExpr::Int { text, .. } | ArithExpr::Double { text, .. } => text,
                _ => "",
            },
            Node::Str(e) => match e.as_ref() {
                StrExpr::Const(s) => s,
                _ => "",
            },
            Node::Constraint(c) => match c.as_ref() {
                Constraint::Bool(true) => "true",
                Constraint::Bool(false) => "false",
                _ => "",
            },
        }
    }

    pub fn is_literal(&self) -> bool {
        match self {
            Node::Arith(e) => matches!(e.as_ref(), ArithExpr::Int { .. } | ArithExpr::Double { .. }),
            Node::Str(e) => matches!(e.as_ref(), StrExpr::Const(_)),
            Node::Constraint(c) => matches!(c.as_ref(), Constraint::Bool(_)),
        }
    }

    pub fn as_constraint(&self) -> Option<&ConstraintRef> {
        match self {
            Node::Constraint(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_arith(&self) -> Option<&ArithRef> {
        match self {
            Node::Arith(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_str_expr(&self) -> Option<&StrRef> {
        match self {
            Node::Str(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArithRef> for Node {
    fn from(e: ArithRef) -> Self {
        Node::Arith(e)
    }
}

impl From<StrRef> for Node {
    fn from(e: StrRef) -> Self {
        Node::Str(e)
    }
}

impl From<ConstraintRef> for Node {
    fn from(c: ConstraintRef) -> Self {
        Node::Constraint(c)
    }
}
