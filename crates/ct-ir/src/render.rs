//! Human-readable infix rendering of AST nodes, with parameter ids
//! resolved to names through the spec list.

use std::fmt;

use crate::expr::{ArithExpr, Constraint, Node, StrExpr};
use crate::types::{ParamId, ParamSpec};

/// Anything that can be rendered against a parameter spec list.
pub trait Render {
    fn render(&self, f: &mut fmt::Formatter<'_>, specs: &[ParamSpec]) -> fmt::Result;

    fn display<'a>(&'a self, specs: &'a [ParamSpec]) -> Rendered<'a, Self> {
        Rendered { node: self, specs }
    }
}

/// `Display` adapter returned by [`Render::display`].
pub struct Rendered<'a, T: ?Sized> {
    node: &'a T,
    specs: &'a [ParamSpec],
}

impl<T: Render + ?Sized> fmt::Display for Rendered<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.node.render(f, self.specs)
    }
}

fn param_name(f: &mut fmt::Formatter<'_>, specs: &[ParamSpec], pid: ParamId) -> fmt::Result {
    match specs.get(pid) {
        Some(spec) => f.write_str(&spec.name),
        None => write!(f, "#{pid}"),
    }
}

impl Render for ArithExpr {
    fn render(&self, f: &mut fmt::Formatter<'_>, specs: &[ParamSpec]) -> fmt::Result {
        match self {
            ArithExpr::Int { text, .. } | ArithExpr::Double { text, .. } => f.write_str(text),
            ArithExpr::Param { pid, .. } => param_name(f, specs, *pid),
            ArithExpr::Binary { op, lhs, rhs, .. } => {
                write!(f, "({} {} {})", lhs.display(specs), op.symbol(), rhs.display(specs))
            }
            ArithExpr::Neg(operand) => write!(f, "-{}", operand.display(specs)),
            ArithExpr::Cast { ty, operand } => write!(f, "{ty}({})", operand.display(specs)),
            ArithExpr::FromConstraint { ty, operand } => {
                write!(f, "{ty}({})", operand.display(specs))
            }
        }
    }
}

impl Render for StrExpr {
    fn render(&self, f: &mut fmt::Formatter<'_>, specs: &[ParamSpec]) -> fmt::Result {
        match self {
            StrExpr::Const(s) => write!(f, "{s:?}"),
            StrExpr::Param(pid) => param_name(f, specs, *pid),
            StrExpr::Concat(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" + ")?;
                    }
                    term.render(f, specs)?;
                }
                Ok(())
            }
        }
    }
}

impl Render for Constraint {
    fn render(&self, f: &mut fmt::Formatter<'_>, specs: &[ParamSpec]) -> fmt::Result {
        match self {
            Constraint::Bool(b) => write!(f, "{b}"),
            Constraint::Param(pid) => param_name(f, specs, *pid),
            Constraint::Invalid(pid) => {
                f.write_str("IVLD(")?;
                param_name(f, specs, *pid)?;
                f.write_str(")")
            }
            Constraint::Not(operand) => write!(f, "!{}", operand.display(specs)),
            Constraint::Logic { op, lhs, rhs } => {
                write!(f, "({} {} {})", lhs.display(specs), op.symbol(), rhs.display(specs))
            }
            Constraint::Arith {
                op,
                lhs,
                rhs,
                precision,
            } => {
                if op.is_equality() && *precision != 0.0 {
                    write!(
                        f,
                        "{} {}[{precision}] {}",
                        lhs.display(specs),
                        op.symbol(),
                        rhs.display(specs)
                    )
                } else {
                    write!(f, "{} {} {}", lhs.display(specs), op.symbol(), rhs.display(specs))
                }
            }
            Constraint::Str { op, lhs, rhs } => {
                write!(f, "{} {} {}", lhs.display(specs), op.symbol(), rhs.display(specs))
            }
        }
    }
}

impl Render for Node {
    fn render(&self, f: &mut fmt::Formatter<'_>, specs: &[ParamSpec]) -> fmt::Result {
        match self {
            Node::Arith(e) => e.render(f, specs),
            Node::Str(e) => e.render(f, specs),
            Node::Constraint(c) => c.render(f, specs),
        }
    }
}

